//! Message definitions
//!
//! Requests from clients and the replies the service produces for them.
//! Keys and values are raw bytes end to end.

use serde::{Deserialize, Serialize};

/// Method identifiers carried in the request frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Method {
    Get = 0x01,
    Put = 0x02,
    Delete = 0x03,
    Ping = 0x04,
}

impl TryFrom<u8> for Method {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x01 => Ok(Method::Get),
            0x02 => Ok(Method::Put),
            0x03 => Ok(Method::Delete),
            0x04 => Ok(Method::Ping),
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    pub key: Vec<u8>,
}

/// `value` is only meaningful when `found` is true
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetResponse {
    pub found: bool,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// A decoded request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Get a value by key
    Get(GetRequest),

    /// Put a key-value pair
    Put(PutRequest),

    /// Delete a key
    Delete(DeleteRequest),

    /// Ping (readiness check)
    Ping,
}

impl Request {
    /// Get the method of this request
    pub fn method(&self) -> Method {
        match self {
            Request::Get(_) => Method::Get,
            Request::Put(_) => Method::Put,
            Request::Delete(_) => Method::Delete,
            Request::Ping => Method::Ping,
        }
    }
}

/// The successful outcome of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Get(GetResponse),
    Put(PutResponse),
    Delete(DeleteResponse),
    Pong,
}

impl Reply {
    /// Get the method this reply answers
    pub fn method(&self) -> Method {
        match self {
            Reply::Get(_) => Method::Get,
            Reply::Put(_) => Method::Put,
            Reply::Delete(_) => Method::Delete,
            Reply::Pong => Method::Ping,
        }
    }
}
