mod session;

use std::time::Duration;

use clap::{Parser, Subcommand};
use dialoguer::Input;
use nfc_session::pcsc::{PcscConfig, PcscReader};
use nfc_session::Controller;
use tracing_subscriber::EnvFilter;

use crate::session::SessionArgs;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error occurred on communicating with PC/SC: {0}")]
    Pcsc(#[from] nfc_session::pcsc::Error),

    #[error("The session failed: {0}")]
    Session(#[from] nfc_session::Error),

    #[error("Failed to serialize the reply: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read the input: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Raises the log verbosity, repeat for more. RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Milliseconds to wait between two polls that found no card.
    #[arg(long, default_value_t = 1000, global = true)]
    poll_interval_ms: u64,

    /// Seconds to wait for a card before giving up.
    #[arg(long, default_value_t = 60, global = true)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tells whether a PC/SC reader is attached.
    Availability,

    /// Sends the APDUs to a card, printing each response as JSON.
    Transceive {
        #[command(flatten)]
        session: SessionArgs,

        /// Command APDUs in hex.
        #[arg(required = true)]
        apdus: Vec<String>,
    },

    /// Prompts for APDUs until an empty line is entered.
    Shell {
        #[command(flatten)]
        session: SessionArgs,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let reader = PcscReader::try_new(PcscConfig {
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        session_timeout: Duration::from_secs(cli.timeout_secs),
    })?;
    let mut controller = Controller::new(reader);

    match cli.command {
        Command::Availability => {
            println!("{}", controller.availability().as_str());
        }
        Command::Transceive { session, apdus } => {
            session::open(&mut controller, &session)?;

            for apdu in &apdus {
                session::send(&mut controller, apdu)?;
            }

            session::finish(&mut controller, &session)?;
        }
        Command::Shell { session } => {
            session::open(&mut controller, &session)?;

            loop {
                let apdu: String = Input::new()
                    .with_prompt("APDU")
                    .allow_empty(true)
                    .interact_text()?;

                if apdu.trim().is_empty() {
                    break;
                }

                session::send(&mut controller, &apdu)?;
            }

            session::finish(&mut controller, &session)?;
        }
    }

    Ok(())
}
