//! Conversions between the hex strings seen by callers and the frames seen by the tag.

use crate::apdu::{Command, Response};
use crate::Error;

/// Encodes the octets as uppercase hex, two digits per octet.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode_upper(bytes)
}

/// Decodes a hex string in either case.
/// Fails with [`Error::MalformedHex`] on odd lengths and non-hex characters.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, Error> {
    hex::decode(text).map_err(Error::MalformedHex)
}

/// Wraps raw octets into a command frame, rejecting anything that is not a valid APDU.
pub fn build_command(bytes: &[u8]) -> Result<Command, Error> {
    Command::try_from(bytes)
}

/// Splits the trailing status bytes from the data of a raw response.
pub fn parse_response(bytes: Vec<u8>) -> Result<Response, Error> {
    Response::try_from(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hex_is_uppercase() {
        assert_eq!("00A4040C", encode_hex([0x00u8, 0xA4, 0x04, 0x0C]));
        assert_eq!("", encode_hex(Vec::<u8>::new()));
    }

    #[test]
    fn test_encode_hex_concatenates() {
        let (a, b) = ([0xDEu8, 0xAD], [0xBEu8, 0xEF]);

        assert_eq!(encode_hex([0xDEu8, 0xAD, 0xBE, 0xEF]), encode_hex(a) + &encode_hex(b));
    }

    #[test]
    fn test_decode_hex_round_trip() {
        let bytes: Vec<u8> = (0..=255).collect();

        assert_eq!(bytes, decode_hex(&encode_hex(&bytes)).unwrap());
    }

    #[test]
    fn test_decode_hex_accepts_lowercase() {
        assert_eq!(vec![0xA0, 0xFF], decode_hex("a0Ff").unwrap());
    }

    #[test]
    fn test_decode_hex_malformed() {
        assert!(matches!(decode_hex("ABC"), Err(Error::MalformedHex(_))));
        assert!(matches!(decode_hex("ZZ"), Err(Error::MalformedHex(_))));
        assert!(matches!(decode_hex("00 A4"), Err(Error::MalformedHex(_))));
    }

    #[test]
    fn test_build_command() {
        let bytes = decode_hex("00A4040005A000000003").unwrap();
        let command = build_command(&bytes).unwrap();

        assert_eq!(Some([0xA0, 0x00, 0x00, 0x00, 0x03].as_slice()), command.payload());
        assert_eq!(Err(Error::CommandFormat), build_command(&[0x00]));
    }

    #[test]
    fn test_parse_response() {
        let response = parse_response(vec![0x01, 0x90, 0x00]).unwrap();

        assert_eq!((0x90, 0x00), (response.sw1(), response.sw2()));
        assert_eq!(&[0x01], response.payload());
        assert_eq!(Err(Error::ResponseFormat), parse_response(vec![0x90]));
    }
}
