//! Response definitions
//!
//! Represents response frames sent to clients.

use crate::error::KvError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    InvalidArgument = 0x01,
    ResourceExhausted = 0x02,
    Internal = 0x03,
}

impl Status {
    /// Map an error to the status a client will see
    pub fn from_error(error: &KvError) -> Self {
        match error {
            KvError::InvalidArgument(_) => Status::InvalidArgument,
            KvError::ResourceExhausted(_) => Status::ResourceExhausted,
            _ => Status::Internal,
        }
    }
}

impl TryFrom<u8> for Status {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(Status::Ok),
            0x01 => Ok(Status::InvalidArgument),
            0x02 => Ok(Status::ResourceExhausted),
            0x03 => Ok(Status::Internal),
            other => Err(other),
        }
    }
}

/// A response frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Encoded reply message for OK, UTF-8 error message otherwise
    pub payload: Vec<u8>,
}

impl Response {
    /// Create an OK response carrying an encoded reply
    pub fn ok(payload: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create an error response from an error
    pub fn error(error: &KvError) -> Self {
        // The status already names the kind, so only send the detail
        let message = match error {
            KvError::InvalidArgument(detail) | KvError::ResourceExhausted(detail) => {
                detail.clone()
            }
            other => other.to_string(),
        };

        Self {
            status: Status::from_error(error),
            payload: message.into_bytes(),
        }
    }

    /// Turn a non-OK response back into the error it reports
    ///
    /// Returns `None` for OK responses.
    pub fn to_error(&self) -> Option<KvError> {
        let message = String::from_utf8_lossy(&self.payload).into_owned();
        match self.status {
            Status::Ok => None,
            Status::InvalidArgument => Some(KvError::InvalidArgument(message)),
            Status::ResourceExhausted => Some(KvError::ResourceExhausted(message)),
            Status::Internal => Some(KvError::Remote(message)),
        }
    }
}
