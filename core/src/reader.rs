//! The reader delegate the controller talks to.
//!
//! Implementations own the radio. Calls into the reader never block waiting for a
//! tag: discovery and connection outcomes come back later as [`Event`]s, which the
//! caller feeds to [`Controller::handle_event`](crate::Controller::handle_event)
//! or lets [`Controller::pump`](crate::Controller::pump) drain from
//! [`Reader::next_event`].

use crate::tag::Tag;

/// Something the reader observed on its own schedule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<H> {
    /// One or more tags came into the field while polling.
    TagsDetected(Vec<Tag<H>>),

    /// Outcome of the last [`Reader::connect`], with the reader's reason on failure.
    ConnectResult(Result<(), String>),

    /// The reader session ended on its own, e.g. a timeout or the user cancelling.
    Invalidated(Option<String>),
}

impl<H> Event<H> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Event::TagsDetected(_) => "TagsDetected",
            Event::ConnectResult(_) => "ConnectResult",
            Event::Invalidated(_) => "Invalidated",
        }
    }
}

/// A delegate to communicate with the tags outside
pub trait Reader {
    /// Reader-specific reference to a detected tag.
    type Handle;

    /// Failure while exchanging frames with a connected tag.
    type Error: std::error::Error;

    /// Determines whether the platform can read tags at all.
    fn is_available(&self) -> bool;

    /// Opens a reader session and starts polling, showing the message if given.
    fn begin(&mut self, alert_message: Option<&str>);

    /// Replaces the message shown while the session is open.
    fn set_alert_message(&mut self, message: &str);

    /// Starts connecting to the tag. The outcome is reported as [`Event::ConnectResult`].
    fn connect(&mut self, tag: &Tag<Self::Handle>);

    /// Transmits a command frame to the connected tag, then receives the raw response.
    fn transmit(&mut self, handle: &Self::Handle, command: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// Closes the reader session, with an error message if the session failed.
    fn invalidate(&mut self, error_message: Option<&str>);

    /// Returns the next event the reader has pending, if any.
    fn next_event(&mut self) -> Option<Event<Self::Handle>> {
        None
    }
}
