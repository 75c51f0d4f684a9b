//! Values exchanged with callers at the method-call boundary.
//!
//! Every octet string crosses this boundary as uppercase hex.

use crate::apdu::Response;
use crate::codec::encode_hex;
use crate::Error;

/// Whether the platform radio can read tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Availability {
    Available,
    Disabled,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Disabled => "disabled",
        }
    }
}

impl From<bool> for Availability {
    fn from(available: bool) -> Self {
        match available {
            true => Availability::Available,
            _ => Availability::Disabled,
        }
    }
}

/// Options for starting a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PollConfig {
    /// Shown while the reader is polling.
    pub alert_message: Option<String>,

    /// Shown when the session is abandoned because more than one tag answered.
    pub multiple_tag_message: Option<String>,
}

/// Options for closing a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FinishConfig {
    /// Final message, ignored when `error_message` is set.
    pub alert_message: Option<String>,

    /// Closes the session as failed, with this message.
    pub error_message: Option<String>,
}

/// A response APDU as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ApduReply {
    pub sw1: String,
    pub sw2: String,
    pub data: String,
}

impl From<&Response> for ApduReply {
    fn from(response: &Response) -> Self {
        Self {
            sw1: encode_hex([response.sw1()]),
            sw2: encode_hex([response.sw2()]),
            data: encode_hex(response.payload()),
        }
    }
}

/// A failed operation as seen by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ErrorReply {
    pub code: String,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub details: Option<String>,
}

impl From<&Error> for ErrorReply {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.to_string(),
            details: error.detail().map(ToOwned::to_owned),
        }
    }
}
