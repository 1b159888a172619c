//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Framed Binary)
//!
//! ### Request Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │ Method(1) │ Len (4)  │         Payload             │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Methods
//! - 0x01: GET    - Payload: bincode GetRequest
//! - 0x02: PUT    - Payload: bincode PutRequest
//! - 0x03: DELETE - Payload: bincode DeleteRequest
//! - 0x04: PING   - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌───────────┬──────────┬─────────────────────────────┐
//! │Status(1)  │ Len (4)  │         Payload             │
//! └───────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK                 - Payload: bincode reply (empty for PING)
//! - 0x01: INVALID_ARGUMENT   - Payload: UTF-8 message
//! - 0x02: RESOURCE_EXHAUSTED - Payload: UTF-8 message
//! - 0x03: INTERNAL           - Payload: UTF-8 message

mod message;
mod response;
mod codec;

pub use message::{
    DeleteRequest, DeleteResponse, GetRequest, GetResponse, Method, PutRequest, PutResponse,
    Reply, Request,
};
pub use response::{Response, Status};
pub use codec::{
    decode_reply, decode_request, decode_response, encode_reply, encode_request,
    encode_response, read_request, read_response, write_request, write_response,
    HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
