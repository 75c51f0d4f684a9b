//! ISO/IEC 7816-4 command and response frames.

mod command;
mod response;

pub use command::Command;
pub use response::Response;

/// Largest `Le` expressible in a short frame.
pub const SHORT_LE_MAX: usize = 0x100;

/// Largest `Le` expressible in an extended frame.
pub const EXTENDED_LE_MAX: usize = 0x10000;
