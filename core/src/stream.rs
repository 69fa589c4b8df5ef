//! Incremental response bodies.
//!
//! A `ByteStream` is returned by `ApiClient::request_stream` once the status
//! has been checked. Read it with `std::io::Read`, iterate raw chunks, or use
//! `text_chunks()` for token-by-token chat output.

use std::fmt;
use std::io::{self, Read};

use crate::error::ApiError;

const CHUNK_SIZE: usize = 8 * 1024;

pub struct ByteStream {
    status: u16,
    reader: Box<dyn Read>,
    done: bool,
}

impl ByteStream {
    pub fn new(status: u16, reader: Box<dyn Read>) -> Self {
        Self {
            status,
            reader,
            done: false,
        }
    }

    /// Read up to the first byte of `reader`, so an OK response that ends
    /// without sending anything fails here instead of yielding "".
    /// Bytes read while checking are replayed first.
    pub fn open(status: u16, mut reader: Box<dyn Read>) -> Result<Self, ApiError> {
        let mut first = vec![0u8; CHUNK_SIZE];
        let n = loop {
            match reader.read(&mut first) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ApiError::Transport(e.to_string())),
            }
        };
        if n == 0 {
            return Err(ApiError::EmptyStream { status });
        }
        first.truncate(n);
        Ok(Self::new(status, Box::new(io::Cursor::new(first).chain(reader))))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// UTF-8 text chunks. Multi-byte characters split across network chunks
    /// are held back until complete; invalid bytes become U+FFFD.
    pub fn text_chunks(self) -> TextChunks {
        TextChunks {
            inner: self,
            pending: Vec::new(),
        }
    }

    /// Drain the rest of the stream into one string.
    pub fn collect_text(self) -> Result<String, ApiError> {
        self.text_chunks().collect()
    }
}

impl fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteStream")
            .field("status", &self.status)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        let n = self.reader.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.done = true;
        }
        Ok(n)
    }
}

impl Iterator for ByteStream {
    type Item = Result<Vec<u8>, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            if self.done {
                return None;
            }
            match self.read(&mut buf) {
                Ok(0) => return None,
                Ok(n) => {
                    buf.truncate(n);
                    return Some(Ok(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(ApiError::Transport(e.to_string())));
                }
            }
        }
    }
}

/// Iterator returned by `ByteStream::text_chunks`.
pub struct TextChunks {
    inner: ByteStream,
    pending: Vec<u8>,
}

impl TextChunks {
    fn drain_text(&mut self) -> String {
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(s) => {
                    out.push_str(s);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // incomplete sequence at the end, wait for more bytes
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for TextChunks {
    type Item = Result<String, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next() {
                Some(Ok(bytes)) => {
                    self.pending.extend_from_slice(&bytes);
                    let text = self.drain_text();
                    if !text.is_empty() {
                        return Some(Ok(text));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None if self.pending.is_empty() => return None,
                None => {
                    let rest = std::mem::take(&mut self.pending);
                    return Some(Ok(String::from_utf8_lossy(&rest).into_owned()));
                }
            }
        }
    }
}
