use clap::Args;
use nfc_session::api::{ApduReply, ErrorReply, FinishConfig, PollConfig};
use nfc_session::pcsc::PcscReader;
use nfc_session::Controller;
use tracing::{info, warn};

use crate::{Error, Result};

#[derive(Args)]
pub struct SessionArgs {
    /// Message shown while waiting for a card.
    #[arg(long)]
    alert: Option<String>,

    /// Message shown when more than one card is presented.
    #[arg(long)]
    multiple_tag_message: Option<String>,

    /// Message shown when the session is closed.
    #[arg(long)]
    done_message: Option<String>,

    /// Closes the session as failed with this message, replacing the done message.
    #[arg(long)]
    error_message: Option<String>,
}

impl SessionArgs {
    fn finish_config(&self) -> FinishConfig {
        FinishConfig {
            alert_message: self.done_message.clone(),
            error_message: self.error_message.clone(),
        }
    }
}

/// Starts a session and pumps the reader until a single card is connected.
pub fn open(controller: &mut Controller<PcscReader>, args: &SessionArgs) -> Result<()> {
    let mut pending = controller.start_session(PollConfig {
        alert_message: args.alert.clone(),
        multiple_tag_message: args.multiple_tag_message.clone(),
    })?;

    info!("Waiting for a card");

    let result = loop {
        controller.pump();

        if let Some(result) = pending.try_result() {
            break result.clone();
        }
    };

    if let Err(e) = &result {
        println!("{}", serde_json::to_string(&ErrorReply::from(e))?);
    }

    result.map_err(Error::Session)
}

/// Sends a command APDU and prints the reply, keeping the session open on failures.
pub fn send(controller: &mut Controller<PcscReader>, apdu: &str) -> Result<()> {
    let apdu: String = apdu.split_whitespace().collect();

    let reply = match controller.transceive(&apdu) {
        Ok(response) => {
            if !response.is_ok() {
                warn!("Card answered {:02X}{:02X}", response.sw1(), response.sw2());
            }

            serde_json::to_string(&ApduReply::from(&response))?
        }
        Err(e) => serde_json::to_string(&ErrorReply::from(&e))?,
    };

    println!("{}", reply);

    Ok(())
}

pub fn finish(controller: &mut Controller<PcscReader>, args: &SessionArgs) -> Result<()> {
    controller.finish(args.finish_config()).map_err(Error::Session)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        session: SessionArgs,
    }

    #[test]
    fn test_finish_config() {
        let cli = Cli::try_parse_from([
            "nfc-session",
            "--done-message",
            "Done",
            "--error-message",
            "Card rejected",
        ])
        .unwrap();

        assert_eq!(
            FinishConfig {
                alert_message: Some("Done".to_owned()),
                error_message: Some("Card rejected".to_owned()),
            },
            cli.session.finish_config()
        );
    }

    #[test]
    fn test_finish_config_default() {
        let cli = Cli::try_parse_from(["nfc-session"]).unwrap();

        assert_eq!(FinishConfig::default(), cli.session.finish_config());
    }
}
