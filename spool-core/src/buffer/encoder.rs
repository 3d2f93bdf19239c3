// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Incremental Base64 encoding into a text sink.
//!
//! Input may arrive in chunks of any size. Base64 consumes three bytes at a
//! time, so up to two trailing bytes of each call are carried over to the next
//! one; [`Base64Encoder::flush`] pads and emits whatever is left once the
//! logical byte stream ends.

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::pool::{BufferPool, PoolSet, PooledBuffer};
use crate::error::Error;

/// Raw bytes encoded per step.
pub const LINE_BYTES: usize = 57;
/// Characters produced per full step.
pub const LINE_CHARS: usize = 76;

/// Carry bytes plus the rented line buffer.
struct EncoderState {
    line: Option<PooledBuffer<char>>,
    ascii: [u8; LINE_CHARS],
    chars: Arc<BufferPool<char>>,
    carry: [u8; 3],
    carry_len: usize,
}

impl EncoderState {
    fn new(chars: &Arc<BufferPool<char>>) -> Self {
        EncoderState {
            line: Some(chars.rent(LINE_CHARS)),
            ascii: [0; LINE_CHARS],
            chars: Arc::clone(chars),
            carry: [0; 3],
            carry_len: 0,
        }
    }

    #[inline(always)]
    fn line(&self) -> &[char] {
        self.line.as_deref().unwrap_or(&[])
    }

    /// Moves bytes from the front of `input` into the carry until it holds a
    /// full group. Returns how many bytes were taken.
    fn top_up(&mut self, input: &[u8]) -> usize {
        let take = (3 - self.carry_len).min(input.len());
        self.carry[self.carry_len..self.carry_len + take].copy_from_slice(&input[..take]);
        self.carry_len += take;
        take
    }

    /// Encodes the carry (full or partial, padded) and clears it.
    fn drain_carry(&mut self) -> Result<usize, Error> {
        let carry = self.carry;
        let len = self.carry_len;
        self.carry_len = 0;
        self.encode_into(&carry[..len])
    }

    /// Encodes at most [`LINE_BYTES`] bytes into the line buffer.
    fn encode_chunk(&mut self, chunk: &[u8]) -> Result<usize, Error> {
        debug_assert!(chunk.len() <= LINE_BYTES);
        self.encode_into(chunk)
    }

    fn encode_into(&mut self, src: &[u8]) -> Result<usize, Error> {
        let n = STANDARD
            .encode_slice(src, &mut self.ascii[..])
            .map_err(|e| Error::encoding(format!("base64 encode failed: {e}")))?;
        let line = self.line.as_deref_mut().unwrap_or(&mut []);
        for (slot, &b) in line.iter_mut().zip(&self.ascii[..n]) {
            *slot = b as char;
        }
        Ok(n)
    }

    #[inline(always)]
    fn ascii(&self, n: usize) -> &[u8] {
        &self.ascii[..n]
    }

    fn stash(&mut self, tail: &[u8]) {
        debug_assert!(tail.len() < 3);
        self.carry[..tail.len()].copy_from_slice(tail);
        self.carry_len = tail.len();
    }
}

impl Drop for EncoderState {
    fn drop(&mut self) {
        if self.carry_len > 0 {
            warn!(
                carry_len = self.carry_len,
                "base64 encoder dropped with unflushed bytes"
            );
        }
        if let Some(line) = self.line.take() {
            let _ = self.chars.return_buffer(line);
        }
    }
}

/// Splits `input` into the part that forms whole groups and the 0-2 byte tail.
#[inline(always)]
fn split_groups(input: &[u8]) -> (&[u8], &[u8]) {
    input.split_at(input.len() - input.len() % 3)
}

#[inline(always)]
fn write_chars<W: fmt::Write>(writer: &mut W, chars: &[char]) -> Result<(), Error> {
    for &c in chars {
        writer.write_char(c)?;
    }
    Ok(())
}

/// Streaming Base64 encoder.
///
/// The encoder is not thread-safe: its carry state depends on call order, so
/// one encoder serves one output stream.
///
/// ```rust
/// use spool_core::buffer::{Base64Encoder, PoolSet};
///
/// let pools = PoolSet::default();
/// let mut encoder = Base64Encoder::new(String::new(), &pools);
/// encoder.encode(&[0x4D, 0x61]).unwrap();
/// encoder.encode(&[0x6E, 0x20]).unwrap();
/// encoder.flush().unwrap();
/// assert_eq!(encoder.into_inner(), "TWFuIA==");
/// ```
pub struct Base64Encoder<W> {
    writer: W,
    bytes: Arc<BufferPool<u8>>,
    state: EncoderState,
}

impl<W> Base64Encoder<W> {
    /// Creates an encoder writing to `writer`. The line buffer is rented from
    /// the char pool and given back when the encoder drops.
    pub fn new(writer: W, pools: &PoolSet) -> Self {
        Base64Encoder {
            writer,
            bytes: Arc::clone(pools.bytes()),
            state: EncoderState::new(pools.chars()),
        }
    }

    /// Number of bytes (0..=2) waiting for the next call or `flush`.
    #[inline(always)]
    pub fn carry_len(&self) -> usize {
        self.state.carry_len
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Returns the sink. Pending carry bytes are discarded; call `flush`
    /// first.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: fmt::Write> Base64Encoder<W> {
    /// Encodes `buffer`, deferring a trailing partial group.
    pub fn encode(&mut self, buffer: &[u8]) -> Result<(), Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        let mut input = buffer;
        if self.state.carry_len > 0 {
            let taken = self.state.top_up(input);
            input = &input[taken..];
            if self.state.carry_len < 3 {
                return Ok(());
            }
            let n = self.state.drain_carry()?;
            write_chars(&mut self.writer, &self.state.line()[..n])?;
        }
        let (body, tail) = split_groups(input);
        for chunk in body.chunks(LINE_BYTES) {
            let n = self.state.encode_chunk(chunk)?;
            write_chars(&mut self.writer, &self.state.line()[..n])?;
        }
        self.state.stash(tail);
        Ok(())
    }

    /// Encodes the first `count` bytes of `span`.
    pub fn encode_span(&mut self, span: &[u8], count: usize) -> Result<(), Error> {
        self.encode(&span[..count.min(span.len())])
    }

    /// Encodes bytes read from `reader` until end of stream, or until `length`
    /// bytes have been consumed. Returns the number of bytes consumed.
    pub fn encode_reader<R: Read>(&mut self, mut reader: R, length: Option<u64>) -> Result<u64, Error> {
        let bytes = Arc::clone(&self.bytes);
        let mut chunk = bytes.rent_scoped(1);
        let mut total = 0u64;
        loop {
            let want = match length {
                Some(limit) if total >= limit => break,
                Some(limit) => (limit - total).min(chunk.len() as u64) as usize,
                None => chunk.len(),
            };
            let n = match reader.read(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            self.encode(&chunk[..n])?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Emits the padded final group, if any, and resets the carry. Call once
    /// after the last chunk; encoding afterwards starts a new sequence.
    pub fn flush(&mut self) -> Result<(), Error> {
        if self.state.carry_len > 0 {
            let n = self.state.drain_carry()?;
            write_chars(&mut self.writer, &self.state.line()[..n])?;
        }
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin> Base64Encoder<W> {
    /// Asynchronous [`Base64Encoder::encode`]. The cancellation signal is
    /// checked before every chunk; output already written stays written.
    pub async fn encode_async(
        &mut self,
        buffer: &[u8],
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Err(Error::cancelled());
        }
        let mut input = buffer;
        if self.state.carry_len > 0 {
            let taken = self.state.top_up(input);
            input = &input[taken..];
            if self.state.carry_len < 3 {
                return Ok(());
            }
            let n = self.state.drain_carry()?;
            self.writer.write_all(self.state.ascii(n)).await?;
        }
        let (body, tail) = split_groups(input);
        for chunk in body.chunks(LINE_BYTES) {
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }
            let n = self.state.encode_chunk(chunk)?;
            self.writer.write_all(self.state.ascii(n)).await?;
        }
        self.state.stash(tail);
        Ok(())
    }

    /// Asynchronous [`Base64Encoder::encode_reader`].
    pub async fn encode_reader_async<R: AsyncRead + Unpin>(
        &mut self,
        mut reader: R,
        length: Option<u64>,
        cancel: &CancellationToken,
    ) -> Result<u64, Error> {
        let bytes = Arc::clone(&self.bytes);
        let mut chunk = bytes.rent_scoped(1);
        let mut total = 0u64;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::cancelled());
            }
            let want = match length {
                Some(limit) if total >= limit => break,
                Some(limit) => (limit - total).min(chunk.len() as u64) as usize,
                None => chunk.len(),
            };
            let n = reader.read(&mut chunk[..want]).await?;
            if n == 0 {
                break;
            }
            self.encode_async(&chunk[..n], cancel).await?;
            total += n as u64;
        }
        Ok(total)
    }

    /// Asynchronous [`Base64Encoder::flush`]. The sink itself is not flushed.
    pub async fn flush_async(&mut self) -> Result<(), Error> {
        if self.state.carry_len > 0 {
            let n = self.state.drain_carry()?;
            self.writer.write_all(self.state.ascii(n)).await?;
        }
        Ok(())
    }
}

impl<W> fmt::Debug for Base64Encoder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base64Encoder")
            .field("carry_len", &self.state.carry_len)
            .finish_non_exhaustive()
    }
}
