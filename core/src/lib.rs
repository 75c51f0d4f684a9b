//! A crate to drive a single-tag contactless session through a reader delegate.
//!
//! The [`Controller`] owns the only session, the only connected tag and the only
//! pending request. Callers talk to it with plain method calls, the reader reports
//! back through [`reader::Event`]s, and every APDU crosses the boundary as hex.

#[macro_use]
mod log;

#[cfg(feature = "pcsc")]
pub mod pcsc;

pub mod apdu;
pub mod api;
pub mod codec;
pub mod error;
pub mod reader;
pub mod session;
pub mod tag;

pub use apdu::{Command, Response};
pub use error::{Error, Result};
pub use reader::{Event, Reader};
pub use session::{Controller, Pending, SessionState};
pub use tag::{Tag, Technology};
