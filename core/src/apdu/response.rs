use crate::Error;

/// An response that was received from the card
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    payload: Vec<u8>,
    trailer: (u8, u8),
}

impl Response {
    /// Creates a response from the data and the two status bytes.
    pub fn new(payload: Vec<u8>, sw1: u8, sw2: u8) -> Self {
        Self {
            payload,
            trailer: (sw1, sw2),
        }
    }

    /// The first status byte.
    pub fn sw1(&self) -> u8 {
        self.trailer.0
    }

    /// The second status byte.
    pub fn sw2(&self) -> u8 {
        self.trailer.1
    }

    /// Data returned ahead of the status bytes, possibly empty.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Determines whether the response indicates success or not.
    pub fn is_ok(&self) -> bool {
        matches!(self.trailer, (0x90, 0x00) | (0x91, 0x00))
    }
}

impl TryFrom<Vec<u8>> for Response {
    type Error = Error;

    /// Parses a response from the octets.
    fn try_from(mut bytes: Vec<u8>) -> Result<Self, Self::Error> {
        match (bytes.pop(), bytes.pop()) {
            (Some(sw2), Some(sw1)) => Ok(Self::new(bytes, sw1, sw2)),
            _ => Err(Error::ResponseFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_splits_trailer() {
        let response = Response::try_from(vec![0x6Fu8, 0x10, 0x90, 0x00]).unwrap();

        assert_eq!(0x90, response.sw1());
        assert_eq!(0x00, response.sw2());
        assert_eq!(&[0x6F, 0x10], response.payload());
        assert!(response.is_ok());
    }

    #[test]
    fn test_try_from_status_only() {
        let response = Response::try_from(vec![0x6Au8, 0x82]).unwrap();

        assert!(response.payload().is_empty());
        assert!(!response.is_ok());
    }

    #[test]
    fn test_try_from_too_short() {
        assert_eq!(Err(Error::ResponseFormat), Response::try_from(vec![0x90u8]));
        assert_eq!(Err(Error::ResponseFormat), Response::try_from(Vec::<u8>::new()));
    }
}
