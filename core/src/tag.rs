//! Proximity tags reported by the reader.

/// Technology families a reader can detect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Technology {
    Iso7816,
    FeliCa,
    MiFare,
    Iso15693,
}

/// A tag found while polling, carrying the reader's handle to it.
/// Only ISO 7816 tags accept APDUs; everything else is connectable but not transceivable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tag<H> {
    Iso7816(H),
    Unsupported { technology: Technology, handle: H },
}

impl<H> Tag<H> {
    /// Wraps the handle into the variant matching the technology.
    pub fn new(technology: Technology, handle: H) -> Self {
        match technology {
            Technology::Iso7816 => Tag::Iso7816(handle),
            technology => Tag::Unsupported { technology, handle },
        }
    }

    pub fn technology(&self) -> Technology {
        match self {
            Tag::Iso7816(_) => Technology::Iso7816,
            Tag::Unsupported { technology, .. } => *technology,
        }
    }

    pub fn handle(&self) -> &H {
        match self {
            Tag::Iso7816(handle) | Tag::Unsupported { handle, .. } => handle,
        }
    }
}
