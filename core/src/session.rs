//! The session state machine.
//!
//! A [`Controller`] moves through `Idle → Polling → Connected → Idle`. It holds
//! at most one session, at most one connected tag and at most one pending
//! request, all inside a single state value so none of them can outlive the
//! session they belong to. Every operation and every reader event takes
//! `&mut self`, so transitions never interleave.

use std::mem;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

use crate::api::{Availability, FinishConfig, PollConfig};
use crate::apdu::Response;
use crate::codec::{build_command, decode_hex, encode_hex, parse_response};
use crate::reader::{Event, Reader};
use crate::tag::Tag;
use crate::Error;

/// Caller side of a request that resolves after the reader reports back.
pub struct Pending {
    rx: Receiver<Result<(), Error>>,
    outcome: Option<Result<(), Error>>,
}

impl Pending {
    fn channel() -> (Self, PendingRequest) {
        let (tx, rx) = channel();

        (Self { rx, outcome: None }, PendingRequest { tx })
    }

    /// Returns the outcome if the request has been resolved, without blocking.
    pub fn try_result(&mut self) -> Option<&Result<(), Error>> {
        if self.outcome.is_none() {
            self.outcome = match self.rx.try_recv() {
                Ok(result) => Some(result),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => Some(Err(Error::SessionNotActive)),
            };
        }

        self.outcome.as_ref()
    }

    /// Blocks until the request is resolved.
    /// Only useful when another thread drives the controller.
    pub fn wait(mut self) -> Result<(), Error> {
        match self.outcome.take() {
            Some(result) => result,
            None => self.rx.recv().unwrap_or(Err(Error::SessionNotActive)),
        }
    }
}

/// Controller side of the pending slot. Resolving consumes it.
struct PendingRequest {
    tx: Sender<Result<(), Error>>,
}

impl PendingRequest {
    fn resolve(self, result: Result<(), Error>) {
        if self.tx.send(result).is_err() {
            debug!("Pending request was dropped by the caller");
        }
    }
}

/// An open reader session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    alert_message: Option<String>,
    multiple_tag_message: Option<String>,
}

impl Session {
    pub fn alert_message(&self) -> Option<&str> {
        self.alert_message.as_deref()
    }

    pub fn multiple_tag_message(&self) -> Option<&str> {
        self.multiple_tag_message.as_deref()
    }
}

impl From<PollConfig> for Session {
    fn from(config: PollConfig) -> Self {
        Self {
            alert_message: config.alert_message,
            multiple_tag_message: config.multiple_tag_message,
        }
    }
}

/// Externally visible phase of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Polling,
    Connected,
}

enum State<H> {
    Idle,
    Polling {
        session: Session,
        pending: PendingRequest,
        connecting: Option<Tag<H>>,
    },
    Connected {
        session: Session,
        tag: Tag<H>,
    },
}

impl<H> State<H> {
    fn phase(&self) -> SessionState {
        match self {
            State::Idle => SessionState::Idle,
            State::Polling { .. } => SessionState::Polling,
            State::Connected { .. } => SessionState::Connected,
        }
    }
}

/// Owner of the single session, tag and pending request.
pub struct Controller<R>
where
    R: Reader,
{
    reader: R,
    state: State<R::Handle>,
}

impl<R> Controller<R>
where
    R: Reader,
{
    /// Initiates an idle controller with the reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            state: State::Idle,
        }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn reader_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    pub fn state(&self) -> SessionState {
        self.state.phase()
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Idle => None,
            State::Polling { session, .. } | State::Connected { session, .. } => Some(session),
        }
    }

    /// The connected tag, if any.
    pub fn tag(&self) -> Option<&Tag<R::Handle>> {
        match &self.state {
            State::Connected { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Queries the reader without touching the session.
    pub fn availability(&self) -> Availability {
        self.reader.is_available().into()
    }

    /// Opens a reader session and starts polling.
    /// The returned request resolves once a single tag is connected or the attempt fails.
    pub fn start_session(&mut self, config: PollConfig) -> Result<Pending, Error> {
        if !matches!(self.state, State::Idle) {
            warn!("Cannot start a session in {:?} state", self.state());
            return Err(Error::SessionAlreadyActive);
        }

        let session = Session::from(config);
        let (pending, request) = Pending::channel();

        self.reader.begin(session.alert_message());
        self.state = State::Polling {
            session,
            pending: request,
            connecting: None,
        };

        info!("Session started, polling for a tag");

        Ok(pending)
    }

    /// Transmits a hex-encoded command APDU to the connected tag.
    pub fn transceive(&mut self, data: &str) -> Result<Response, Error> {
        let handle = match &self.state {
            State::Connected {
                tag: Tag::Iso7816(handle),
                ..
            } => handle,
            State::Connected {
                tag: Tag::Unsupported { .. },
                ..
            } => return Err(Error::TransceiveNotSupported),
            State::Idle | State::Polling { .. } => return Err(Error::NoTagPolled),
        };

        let command = decode_hex(data)
            .and_then(|bytes| build_command(&bytes))
            .map_err(|_| Error::CommandFormat)?;
        let tx = command.to_bytes();

        debug!("TX: {}", encode_hex(&tx));

        let rx = self
            .reader
            .transmit(handle, &tx)
            .map_err(|e| Error::Communication(e.to_string()))?;

        debug!("RX: {}", encode_hex(&rx));

        parse_response(rx).map_err(|e| Error::Communication(e.to_string()))
    }

    /// Closes the session.
    /// A request still waiting for a tag is resolved with [`Error::SessionNotActive`] first.
    pub fn finish(&mut self, config: FinishConfig) -> Result<(), Error> {
        match mem::replace(&mut self.state, State::Idle) {
            State::Idle => return Err(Error::SessionNotActive),
            State::Polling { pending, .. } => pending.resolve(Err(Error::SessionNotActive)),
            State::Connected { .. } => {}
        }

        match config.error_message {
            Some(message) => self.reader.invalidate(Some(&message)),
            None => {
                if let Some(message) = config.alert_message {
                    self.reader.set_alert_message(&message);
                }

                self.reader.invalidate(None);
            }
        }

        info!("Session finished");

        Ok(())
    }

    /// Replaces the message shown by the open session.
    pub fn set_alert_message(&mut self, message: &str) -> Result<(), Error> {
        match &mut self.state {
            State::Polling { session, .. } | State::Connected { session, .. } => {
                session.alert_message = Some(message.to_owned());
            }
            State::Idle => return Err(Error::SessionNotActive),
        }

        self.reader.set_alert_message(message);

        Ok(())
    }

    /// Applies an event reported by the reader.
    pub fn handle_event(&mut self, event: Event<R::Handle>) {
        let name = event.name();

        self.state = match (mem::replace(&mut self.state, State::Idle), event) {
            (
                State::Polling {
                    session,
                    pending,
                    connecting,
                },
                Event::TagsDetected(mut tags),
            ) => match (tags.len(), connecting) {
                (count, _) if count > 1 => {
                    warn!("{} tags detected, abandoning the session", count);
                    self.reader.invalidate(session.multiple_tag_message());
                    pending.resolve(Err(Error::MultipleTagsDetected));

                    State::Idle
                }
                (1, None) => {
                    let tag = tags.remove(0);

                    debug!("Tag detected, connecting: {:?}", tag.technology());
                    self.reader.connect(&tag);

                    State::Polling {
                        session,
                        pending,
                        connecting: Some(tag),
                    }
                }
                (_, connecting) => {
                    debug!("Ignoring {} while polling", name);

                    State::Polling {
                        session,
                        pending,
                        connecting,
                    }
                }
            },
            (
                State::Polling {
                    session,
                    pending,
                    connecting: Some(tag),
                },
                Event::ConnectResult(result),
            ) => match result {
                Ok(()) => {
                    info!("Connected to the tag");
                    pending.resolve(Ok(()));

                    State::Connected { session, tag }
                }
                Err(reason) => {
                    warn!("Failed to connect to the tag: {}", reason);
                    self.reader.invalidate(None);
                    pending.resolve(Err(Error::ConnectFailed(reason)));

                    State::Idle
                }
            },
            (State::Polling { pending, .. }, Event::Invalidated(reason)) => {
                warn!("Session invalidated while polling: {:?}", reason);
                pending.resolve(Err(Error::SessionInvalidated(reason)));

                State::Idle
            }
            (State::Connected { .. }, Event::Invalidated(reason)) => {
                warn!("Session invalidated, dropping the tag: {:?}", reason);

                State::Idle
            }
            (state, _) => {
                debug!("Ignoring {} in {:?} state", name, state.phase());

                state
            }
        };
    }

    /// Drains every event the reader has pending, returning how many were handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;

        while let Some(event) = self.reader.next_event() {
            self.handle_event(event);
            handled += 1;
        }

        handled
    }
}
