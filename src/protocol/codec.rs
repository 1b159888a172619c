//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │ Method(1) │ Len (4)  │         Payload             │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Method
//! - GET:    bincode `GetRequest { key }`
//! - PUT:    bincode `PutRequest { key, value }`
//! - DELETE: bincode `DeleteRequest { key }`
//! - PING:   empty
//!
//! ### Response Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │Status(1)  │ Len (4)  │         Payload             │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ## Error classes
//! Framing problems (short header, oversized or truncated payload) are
//! `Protocol` errors; the stream can't be trusted afterwards. A complete
//! frame with an unknown method or a payload that doesn't decode is an
//! `InvalidArgument` error and the stream stays aligned.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{KvError, Result};
use super::{
    DeleteRequest, GetRequest, Method, PutRequest, Reply, Request, Response, Status,
};

/// Header size: 1 byte method/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (64 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

// =============================================================================
// Frame Helpers
// =============================================================================

fn encode_frame(tag: u8, payload: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    frame.put_u8(tag);
    frame.put_u32(payload.len() as u32);
    frame.put_slice(payload);
    frame.freeze()
}

/// Split a buffer into (tag, payload), validating the announced length
fn split_frame(bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = check_payload_len(header.get_u32())?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(KvError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(len: u32) -> Result<usize> {
    if len > MAX_PAYLOAD_SIZE {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(len as usize)
}

/// Read one whole frame from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<(u8, Vec<u8>)> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut cursor = &header[..];
    let tag = cursor.get_u8();
    let payload_len = check_payload_len(cursor.get_u32())?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    Ok((tag, payload))
}

fn to_payload<T: Serialize>(message: &T) -> Result<Vec<u8>> {
    bincode::serialize(message).map_err(|e| KvError::Serialization(e.to_string()))
}

fn from_payload<T: DeserializeOwned>(method: Method, payload: &[u8]) -> Result<T> {
    bincode::deserialize(payload).map_err(|e| {
        KvError::InvalidArgument(format!("malformed {:?} payload: {}", method, e))
    })
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request to bytes
///
/// Format: method (1) + payload_len (4) + payload
pub fn encode_request(request: &Request) -> Result<Bytes> {
    let payload = match request {
        Request::Get(get) => to_payload(get)?,
        Request::Put(put) => to_payload(put)?,
        Request::Delete(delete) => to_payload(delete)?,
        Request::Ping => Vec::new(),
    };

    // The length field is a u32; anything past the cap would desync the stream
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    Ok(encode_frame(request.method() as u8, &payload))
}

/// Decode a request from bytes
pub fn decode_request(bytes: &[u8]) -> Result<Request> {
    let (method, payload) = split_frame(bytes)?;
    decode_request_payload(method, payload)
}

fn decode_request_payload(method_byte: u8, payload: &[u8]) -> Result<Request> {
    let method = Method::try_from(method_byte).map_err(|byte| {
        KvError::InvalidArgument(format!("Unknown method: 0x{:02x}", byte))
    })?;

    match method {
        Method::Get => Ok(Request::Get(from_payload::<GetRequest>(method, payload)?)),
        Method::Put => Ok(Request::Put(from_payload::<PutRequest>(method, payload)?)),
        Method::Delete => Ok(Request::Delete(from_payload::<DeleteRequest>(
            method, payload,
        )?)),
        Method::Ping => {
            if !payload.is_empty() {
                return Err(KvError::InvalidArgument(format!(
                    "PING: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Request::Ping)
        }
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Bytes {
    encode_frame(response.status as u8, &response.payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status, payload) = split_frame(bytes)?;
    decode_response_payload(status, payload.to_vec())
}

fn decode_response_payload(status_byte: u8, payload: Vec<u8>) -> Result<Response> {
    let status = Status::try_from(status_byte).map_err(|byte| {
        KvError::Protocol(format!("Unknown response status: 0x{:02x}", byte))
    })?;

    Ok(Response { status, payload })
}

/// Wrap a successful reply in an OK response
pub fn encode_reply(reply: &Reply) -> Result<Response> {
    let payload = match reply {
        Reply::Get(get) => to_payload(get)?,
        Reply::Put(put) => to_payload(put)?,
        Reply::Delete(delete) => to_payload(delete)?,
        Reply::Pong => Vec::new(),
    };
    Ok(Response::ok(payload))
}

/// Unwrap a response to a request of the given method
///
/// Non-OK responses come back as the error they carry.
pub fn decode_reply(method: Method, response: &Response) -> Result<Reply> {
    if let Some(error) = response.to_error() {
        return Err(error);
    }

    let malformed =
        |e: bincode::Error| KvError::Protocol(format!("malformed {:?} reply: {}", method, e));
    let payload = response.payload.as_slice();

    match method {
        Method::Get => Ok(Reply::Get(bincode::deserialize(payload).map_err(malformed)?)),
        Method::Put => Ok(Reply::Put(bincode::deserialize(payload).map_err(malformed)?)),
        Method::Delete => Ok(Reply::Delete(
            bincode::deserialize(payload).map_err(malformed)?,
        )),
        Method::Ping => Ok(Reply::Pong),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete request from a stream
///
/// Blocks until a complete frame is received or an error occurs
pub fn read_request<R: Read>(reader: &mut R) -> Result<Request> {
    let (method, payload) = read_frame(reader)?;
    decode_request_payload(method, &payload)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> Result<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let (status, payload) = read_frame(reader)?;
    decode_response_payload(status, payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
