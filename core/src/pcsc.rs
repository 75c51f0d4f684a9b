//! PC/SC reader for the session controller.
//! Can be enabled by turning `pcsc` feature on.
//!
//! ## What is PC/SC?
//! PC/SC (Personal Computer/Smart Card) is an abstraction layer for communicating with Smart Cards
//! from Windows. Using this layer, applications can connect to any devices that supports PC/SC,
//! without depending on their driver implementation. Windows and macOS supports PC/SC by themselves,
//! Linux also supports by installing pcsc-lite shared library.
//!
//! ## How tags are reported
//! Every PC/SC reader with a card in its field counts as one detected tag, so two cards on two
//! readers abandon the session the same way two cards in one field would. PC/SC has no UI, so
//! alert messages only go to the log.
//!
//! ## Usage
//! ```rust,no_run
//! use nfc_session::api::PollConfig;
//! use nfc_session::pcsc::{PcscConfig, PcscReader};
//! use nfc_session::Controller;
//!
//! let reader = PcscReader::try_new(PcscConfig::default()).unwrap();
//! let mut controller = Controller::new(reader);
//! let mut pending = controller.start_session(PollConfig::default()).unwrap();
//!
//! while pending.try_result().is_none() {
//!     controller.pump();
//! }
//!
//! let response = controller.transceive("00A4040007A0000002471001").unwrap();
//! ```

use std::collections::VecDeque;
use std::ffi::CString;
use std::thread::sleep;
use std::time::{Duration, Instant};

use pcsc::{
    Card, Disposition, Protocols, ReaderState, Scope, ShareMode, State, MAX_BUFFER_SIZE_EXTENDED,
};

use crate::reader::{Event, Reader};
use crate::tag::{Tag, Technology};

/// Registered application provider identifier of PC/SC part 3, marking storage cards in the ATR.
const STORAGE_CARD_RID: [u8; 5] = [0xA0, 0x00, 0x00, 0x03, 0x06];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred while communicating with PC/SC: {0}")]
    PcscError(#[from] pcsc::Error),

    #[error("Reader not found on PC/SC service")]
    ReaderNotFound,

    #[error("No card is connected on {0:?}")]
    NotConnected(CString),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

/// Timing of the polling loop.
#[derive(Clone, Debug)]
pub struct PcscConfig {
    /// Waiting time between two polls finding no card.
    pub poll_interval: Duration,

    /// Polling gives up and invalidates the session after this long.
    pub session_timeout: Duration,
}

impl Default for PcscConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            session_timeout: Duration::from_secs(60),
        }
    }
}

/// A reader backed by every PC/SC device on the system.
pub struct PcscReader {
    ctx: pcsc::Context,
    config: PcscConfig,
    polling_since: Option<Instant>,
    card: Option<(CString, Card)>,
    events: VecDeque<Event<CString>>,
}

impl PcscReader {
    /// Creates a PC/SC context in user scope.
    pub fn try_new(config: PcscConfig) -> Result<Self> {
        Ok(Self {
            ctx: pcsc::Context::establish(Scope::User).map_err(Error::PcscError)?,
            config,
            polling_since: None,
            card: None,
            events: VecDeque::new(),
        })
    }

    /// Lists the names of the readers attached to the PC/SC service.
    pub fn readers(&self) -> Result<Vec<CString>> {
        let mut buf = [0u8; 2048];
        let readers: Vec<CString> = self
            .ctx
            .list_readers(&mut buf)
            .map_err(Error::PcscError)?
            .map(ToOwned::to_owned)
            .collect();

        match readers.is_empty() {
            true => Err(Error::ReaderNotFound),
            _ => Ok(readers),
        }
    }

    /// Finds the tags currently in the field of any reader, without waiting for them.
    fn detect(&self) -> Result<Vec<Tag<CString>>> {
        let mut states: Vec<ReaderState> = self
            .readers()?
            .into_iter()
            .map(|name| ReaderState::new(name, State::UNAWARE))
            .collect();

        match self.ctx.get_status_change(Duration::ZERO, &mut states) {
            Ok(()) | Err(pcsc::Error::Timeout) => {}
            Err(e) => return Err(Error::PcscError(e)),
        }

        Ok(states
            .iter()
            .filter(|state| state.event_state().contains(State::PRESENT))
            .map(|state| Tag::new(classify_atr(state.atr()), state.name().to_owned()))
            .collect())
    }

    fn disconnect(&mut self) {
        if let Some((name, card)) = self.card.take() {
            debug!("Disconnecting from {:?}", name);

            if let Err((_, e)) = card.disconnect(Disposition::LeaveCard) {
                warn!("Failed to disconnect from {:?}: {}", name, e);
            }
        }
    }
}

impl Reader for PcscReader {
    type Handle = CString;
    type Error = Error;

    fn is_available(&self) -> bool {
        self.readers().is_ok()
    }

    fn begin(&mut self, alert_message: Option<&str>) {
        if let Some(message) = alert_message {
            info!("{}", message);
        }

        self.disconnect();
        self.events.clear();
        self.polling_since = Some(Instant::now());
    }

    fn set_alert_message(&mut self, message: &str) {
        info!("{}", message);
    }

    fn connect(&mut self, tag: &Tag<CString>) {
        self.polling_since = None;

        let name = tag.handle();
        let result = match self.ctx.connect(name, ShareMode::Shared, Protocols::ANY) {
            Ok(card) => {
                debug!("Connected to the card on {:?}", name);
                self.card = Some((name.clone(), card));
                Ok(())
            }
            Err(e) => Err(e.to_string()),
        };

        self.events.push_back(Event::ConnectResult(result));
    }

    fn transmit(&mut self, handle: &CString, command: &[u8]) -> Result<Vec<u8>> {
        let card = match &self.card {
            Some((name, card)) if name == handle => card,
            _ => return Err(Error::NotConnected(handle.clone())),
        };

        let mut rx = vec![0u8; MAX_BUFFER_SIZE_EXTENDED];
        let rx = card.transmit(command, &mut rx).map_err(Error::PcscError)?;

        Ok(Vec::from(rx))
    }

    fn invalidate(&mut self, error_message: Option<&str>) {
        if let Some(message) = error_message {
            warn!("{}", message);
        }

        self.polling_since = None;
        self.disconnect();
    }

    fn next_event(&mut self) -> Option<Event<CString>> {
        if let Some(event) = self.events.pop_front() {
            return Some(event);
        }

        let since = self.polling_since?;
        if since.elapsed() >= self.config.session_timeout {
            self.polling_since = None;
            return Some(Event::Invalidated(Some("Session timeout".to_owned())));
        }

        match self.detect() {
            Ok(tags) if tags.is_empty() => {
                info!("Still waiting for your card...");
                sleep(self.config.poll_interval);
                None
            }
            Ok(tags) => Some(Event::TagsDetected(tags)),
            Err(e) => {
                self.polling_since = None;
                Some(Event::Invalidated(Some(e.to_string())))
            }
        }
    }
}

/// Tells the technology of a contactless card from its ATR.
/// Storage cards carry the PC/SC part 3 RID followed by the card standard byte,
/// anything else is handled as an ISO 7816-4 card.
pub fn classify_atr(atr: &[u8]) -> Technology {
    let standard = atr
        .windows(STORAGE_CARD_RID.len() + 1)
        .find(|window| window.starts_with(&STORAGE_CARD_RID))
        .map(|window| window[STORAGE_CARD_RID.len()]);

    match standard {
        None => Technology::Iso7816,
        Some(0x09..=0x0C) => Technology::Iso15693,
        Some(0x11) => Technology::FeliCa,
        Some(_) => Technology::MiFare,
    }
}
