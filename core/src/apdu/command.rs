use crate::apdu::{EXTENDED_LE_MAX, SHORT_LE_MAX};
use crate::Error;

/// An APDU command to be transmitted
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    le: Option<usize>,
    payload: Option<Vec<u8>>,
    extended: bool,
}

impl Command {
    /// Constructs an command with CLA, INS, P1, and P2.
    /// No payloads will be transmitted or received.
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            le: None,
            payload: None,
            extended: false,
        }
    }

    pub fn cla(&self) -> u8 {
        self.cla
    }

    pub fn ins(&self) -> u8 {
        self.ins
    }

    pub fn p1(&self) -> u8 {
        self.p1
    }

    pub fn p2(&self) -> u8 {
        self.p2
    }

    /// Expected response length. `Some(256)` or `Some(65536)` when `Le` was encoded as zero.
    pub fn le(&self) -> Option<usize> {
        self.le
    }

    /// Command data field, absent for case 1 and 2 commands.
    pub fn payload(&self) -> Option<&[u8]> {
        self.payload.as_deref()
    }

    /// Whether the length fields are encoded in the extended form.
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Converts the command into octets.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer: Vec<u8> = vec![self.cla, self.ins, self.p1, self.p2];

        if self.extended {
            if let Some(p) = &self.payload {
                buffer.push(0x00);
                buffer.extend_from_slice(&(p.len() as u16).to_be_bytes());
                buffer.extend_from_slice(p);
            }

            if let Some(l) = self.le {
                if self.payload.is_none() {
                    buffer.push(0x00);
                }

                // 65536 wraps to 0x0000 on the wire.
                buffer.extend_from_slice(&(l as u16).to_be_bytes());
            }
        } else {
            if let Some(p) = &self.payload {
                buffer.push(p.len() as u8);
                buffer.extend_from_slice(p);
            }

            if let Some(l) = self.le {
                buffer.push(l as u8);
            }
        }

        buffer
    }
}

impl From<Command> for Vec<u8> {
    fn from(command: Command) -> Self {
        command.to_bytes()
    }
}

impl TryFrom<&[u8]> for Command {
    type Error = Error;

    /// Parses a command frame, covering the four ISO 7816-4 cases in short and extended form.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let (cla, ins, p1, p2, body) = match bytes {
            [cla, ins, p1, p2, body @ ..] => (*cla, *ins, *p1, *p2, body),
            _ => return Err(Error::CommandFormat),
        };

        let (payload, le, extended) = match body {
            // Case 1
            [] => (None, None, false),
            // Case 2S
            [le] => (None, Some(short_le(*le)), false),
            // Case 2E
            [0x00, hi, lo] => (None, Some(extended_le(*hi, *lo)), true),
            // Case 3E, 4E
            [0x00, hi, lo, rest @ ..] => {
                let lc = u16::from_be_bytes([*hi, *lo]) as usize;
                match rest.len() {
                    n if lc > 0 && n == lc => (Some(rest.to_vec()), None, true),
                    n if lc > 0 && n == lc + 2 => (
                        Some(rest[..lc].to_vec()),
                        Some(extended_le(rest[lc], rest[lc + 1])),
                        true,
                    ),
                    _ => return Err(Error::CommandFormat),
                }
            }
            // Case 3S, 4S
            [lc, rest @ ..] => {
                let lc = *lc as usize;
                match rest.len() {
                    n if lc > 0 && n == lc => (Some(rest.to_vec()), None, false),
                    n if lc > 0 && n == lc + 1 => {
                        (Some(rest[..lc].to_vec()), Some(short_le(rest[lc])), false)
                    }
                    _ => return Err(Error::CommandFormat),
                }
            }
        };

        Ok(Self {
            cla,
            ins,
            p1,
            p2,
            le,
            payload,
            extended,
        })
    }
}

fn short_le(le: u8) -> usize {
    match le {
        0 => SHORT_LE_MAX,
        l => l as usize,
    }
}

fn extended_le(hi: u8, lo: u8) -> usize {
    match u16::from_be_bytes([hi, lo]) {
        0 => EXTENDED_LE_MAX,
        l => l as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_1() {
        let command = Command::try_from([0x00u8, 0xA4, 0x04, 0x00].as_slice()).unwrap();

        assert_eq!(Command::new(0x00, 0xA4, 0x04, 0x00), command);
        assert_eq!(None, command.payload());
        assert_eq!(None, command.le());
    }

    #[test]
    fn test_case_2_short_zero_le() {
        let command = Command::try_from([0x00u8, 0xB0, 0x00, 0x00, 0x00].as_slice()).unwrap();

        assert_eq!(Some(256), command.le());
        assert!(!command.is_extended());
    }

    #[test]
    fn test_case_4_short_select() {
        let bytes = [
            0x00u8, 0xA4, 0x04, 0x00, 0x07, 0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01, 0x00,
        ];
        let command = Command::try_from(bytes.as_slice()).unwrap();

        assert_eq!(0xA4, command.ins());
        assert_eq!(0x04, command.p1());
        assert_eq!(
            Some([0xA0, 0x00, 0x00, 0x02, 0x47, 0x10, 0x01].as_slice()),
            command.payload()
        );
        assert_eq!(Some(256), command.le());
        assert_eq!(bytes.to_vec(), command.to_bytes());
    }

    #[test]
    fn test_case_2_extended() {
        let bytes = [0x00u8, 0xB0, 0x00, 0x00, 0x00, 0x00, 0x00];
        let command = Command::try_from(bytes.as_slice()).unwrap();

        assert!(command.is_extended());
        assert_eq!(Some(65536), command.le());
        assert_eq!(bytes.to_vec(), command.to_bytes());
    }

    #[test]
    fn test_case_4_extended() {
        let bytes = [
            0x80u8, 0x2A, 0x00, 0x80, 0x00, 0x00, 0x03, 0x01, 0x02, 0x03, 0x01, 0x00,
        ];
        let command = Command::try_from(bytes.as_slice()).unwrap();

        assert!(command.is_extended());
        assert_eq!(Some([0x01, 0x02, 0x03].as_slice()), command.payload());
        assert_eq!(Some(0x100), command.le());
        assert_eq!(bytes.to_vec(), Vec::from(command));
    }

    #[test]
    fn test_invalid_frames() {
        // Header too short.
        assert!(Command::try_from([0x00u8, 0xA4, 0x04].as_slice()).is_err());
        // Lc larger than the data that follows.
        assert!(Command::try_from([0x00u8, 0xA4, 0x04, 0x00, 0x05, 0xA0].as_slice()).is_err());
        // Trailing garbage after Le.
        assert!(
            Command::try_from([0x00u8, 0xA4, 0x04, 0x00, 0x01, 0xA0, 0x00, 0x00].as_slice()).is_err()
        );
        // Zero Lc with data.
        assert_eq!(
            Err(Error::CommandFormat),
            Command::try_from([0x00u8, 0xA4, 0x04, 0x00, 0x00, 0xA0].as_slice())
        );
    }

    #[test]
    fn test_case_3_extended() {
        let bytes = [0x00u8, 0xDA, 0x00, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB];
        let command = Command::try_from(bytes.as_slice()).unwrap();

        assert!(command.is_extended());
        assert_eq!(Some([0xAA, 0xBB].as_slice()), command.payload());
        assert_eq!(None, command.le());
        assert_eq!(bytes.to_vec(), command.to_bytes());
    }

    #[test]
    fn test_invalid_extended_frames() {
        // Extended Lc larger than the data that follows.
        assert_eq!(
            Err(Error::CommandFormat),
            Command::try_from([0x00u8, 0xDA, 0x00, 0x00, 0x00, 0x00, 0x03, 0xAA, 0xBB].as_slice())
        );
        // Extended Lc with a one-byte Le.
        assert_eq!(
            Err(Error::CommandFormat),
            Command::try_from(
                [0x00u8, 0xDA, 0x00, 0x00, 0x00, 0x00, 0x02, 0xAA, 0xBB, 0x00].as_slice()
            )
        );
    }
}
