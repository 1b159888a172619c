//! Client
//!
//! Blocking TCP client for a ShardKV server.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::protocol::{
    decode_reply, read_response, write_request, DeleteRequest, GetRequest, PutRequest, Reply,
    Request,
};

/// A connection to a ShardKV server
///
/// Requests are sent one at a time; each call waits for its response.
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream)
    }

    /// Connect with a timeout applied to the connect and to every read/write
    pub fn connect_timeout(addr: impl ToSocketAddrs, timeout: Duration) -> Result<Self> {
        let mut last_error = None;
        for addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(timeout))?;
                    stream.set_write_timeout(Some(timeout))?;
                    return Self::from_stream(stream);
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(match last_error {
            Some(e) => KvError::Io(e),
            None => KvError::Config("address resolved to nothing".to_string()),
        })
    }

    fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Store a value; returns the server's `success` flag
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<bool> {
        let request = Request::Put(PutRequest {
            key: key.to_vec(),
            value: value.to_vec(),
        });
        match self.call(request)? {
            Reply::Put(response) => Ok(response.success),
            other => Err(unexpected(other)),
        }
    }

    /// Look up a value; `None` when the key is absent
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let request = Request::Get(GetRequest { key: key.to_vec() });
        match self.call(request)? {
            Reply::Get(response) if response.found => Ok(Some(response.value)),
            Reply::Get(_) => Ok(None),
            other => Err(unexpected(other)),
        }
    }

    /// Remove a key; returns whether it was present
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let request = Request::Delete(DeleteRequest { key: key.to_vec() });
        match self.call(request)? {
            Reply::Delete(response) => Ok(response.success),
            other => Err(unexpected(other)),
        }
    }

    /// Check that the server answers
    pub fn ping(&mut self) -> Result<()> {
        match self.call(Request::Ping)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Send any request and wait for its reply
    pub fn call(&mut self, request: Request) -> Result<Reply> {
        let method = request.method();
        write_request(&mut self.writer, &request)?;
        let response = read_response(&mut self.reader)?;
        decode_reply(method, &response)
    }
}

fn unexpected(reply: Reply) -> KvError {
    KvError::Protocol(format!("unexpected {:?} reply", reply.method()))
}
