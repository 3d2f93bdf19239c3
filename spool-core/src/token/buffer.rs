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

use std::borrow::Cow;

use super::{PathTracker, Token, TokenKind, TokenReader, TokenValue, TokenWriter};
use crate::config::DateParseHandling;
use crate::error::Error;

static NONE_VALUE: TokenValue = TokenValue::None;

/// A recorded token sequence that can be replayed any number of times.
///
/// The materializer records a sub-tree before trying a constructor so that a
/// fallback sees the same tokens; structural nodes keep their sub-tree here.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
}

impl TokenBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the reader's current token and its sub-tree. The reader is
    /// left on the last recorded token.
    pub fn record(reader: &mut dyn TokenReader) -> Result<Self, Error> {
        let mut buffer = TokenBuffer::new();
        buffer.write_current(reader)?;
        Ok(buffer)
    }

    /// Appends a token with an explicit kind, e.g. an integer that arrived as
    /// text.
    pub fn push(&mut self, kind: TokenKind, value: TokenValue) {
        self.tokens.push(Token::new(kind, value));
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn first_kind(&self) -> TokenKind {
        self.tokens.first().map(|t| t.kind).unwrap_or_default()
    }

    pub fn reader(&self, date_parse_handling: DateParseHandling) -> TokenBufferReader<'_> {
        TokenBufferReader::new(self, date_parse_handling, usize::MAX, "")
    }

    /// A replaying reader whose paths continue from `base_path`.
    pub fn reader_at(
        &self,
        date_parse_handling: DateParseHandling,
        max_depth: usize,
        base_path: &str,
    ) -> TokenBufferReader<'_> {
        TokenBufferReader::new(self, date_parse_handling, max_depth, base_path)
    }

    /// A replaying reader that owns the recorded tokens.
    pub fn into_reader(
        self,
        date_parse_handling: DateParseHandling,
        max_depth: usize,
    ) -> TokenBufferReader<'static> {
        TokenBufferReader::from_tokens(Cow::Owned(self.tokens), date_parse_handling, max_depth, "")
    }

    /// Replays every recorded token into `writer`.
    pub fn write_to(&self, writer: &mut dyn TokenWriter) -> Result<(), Error> {
        for token in &self.tokens {
            writer.write_token(token.kind, &token.value)?;
        }
        Ok(())
    }
}

impl TokenWriter for TokenBuffer {
    fn write_start_object(&mut self) -> Result<(), Error> {
        self.push(TokenKind::StartObject, TokenValue::None);
        Ok(())
    }

    fn write_end_object(&mut self) -> Result<(), Error> {
        self.push(TokenKind::EndObject, TokenValue::None);
        Ok(())
    }

    fn write_start_array(&mut self) -> Result<(), Error> {
        self.push(TokenKind::StartArray, TokenValue::None);
        Ok(())
    }

    fn write_end_array(&mut self) -> Result<(), Error> {
        self.push(TokenKind::EndArray, TokenValue::None);
        Ok(())
    }

    fn write_property_name(&mut self, name: &str) -> Result<(), Error> {
        self.push(TokenKind::PropertyName, TokenValue::Str(name.to_owned()));
        Ok(())
    }

    fn write_value(&mut self, value: &TokenValue) -> Result<(), Error> {
        self.push(value.kind(), value.clone());
        Ok(())
    }

    fn write_token(&mut self, kind: TokenKind, value: &TokenValue) -> Result<(), Error> {
        if kind != TokenKind::None {
            self.push(kind, value.clone());
        }
        Ok(())
    }
}

/// Replays a [`TokenBuffer`].
#[derive(Debug)]
pub struct TokenBufferReader<'a> {
    tokens: Cow<'a, [Token]>,
    next: usize,
    current: Option<usize>,
    path: PathTracker,
    date_parse_handling: DateParseHandling,
    max_depth: usize,
}

impl<'a> TokenBufferReader<'a> {
    pub fn new(
        buffer: &'a TokenBuffer,
        date_parse_handling: DateParseHandling,
        max_depth: usize,
        base_path: &str,
    ) -> Self {
        Self::from_tokens(
            Cow::Borrowed(&buffer.tokens),
            date_parse_handling,
            max_depth,
            base_path,
        )
    }

    fn from_tokens(
        tokens: Cow<'a, [Token]>,
        date_parse_handling: DateParseHandling,
        max_depth: usize,
        base_path: &str,
    ) -> Self {
        TokenBufferReader {
            tokens,
            next: 0,
            current: None,
            path: PathTracker::with_base(max_depth, base_path),
            date_parse_handling,
            max_depth,
        }
    }
}

impl TokenReader for TokenBufferReader<'_> {
    fn read(&mut self) -> Result<bool, Error> {
        let Some(token) = self.tokens.get(self.next) else {
            self.current = None;
            return Ok(false);
        };
        self.next += 1;
        match token.kind {
            TokenKind::StartObject => self.path.push_object()?,
            TokenKind::StartArray => self.path.push_array()?,
            TokenKind::EndObject | TokenKind::EndArray => {
                self.path.pop();
            }
            TokenKind::PropertyName => {
                if let TokenValue::Str(name) = &token.value {
                    self.path.set_property(name);
                }
            }
            TokenKind::None => {}
            _ => self.path.before_value(),
        }
        self.current = Some(self.next - 1);
        Ok(true)
    }

    fn token_kind(&self) -> TokenKind {
        self.current
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.kind)
            .unwrap_or_default()
    }

    fn value(&self) -> &TokenValue {
        self.current
            .and_then(|i| self.tokens.get(i))
            .map(|t| &t.value)
            .unwrap_or(&NONE_VALUE)
    }

    fn depth(&self) -> usize {
        let open = self.path.open_scopes();
        if self.token_kind().is_start() {
            open.saturating_sub(1)
        } else {
            open
        }
    }

    fn path(&self) -> String {
        self.path.path()
    }

    fn date_parse_handling(&self) -> DateParseHandling {
        self.date_parse_handling
    }

    fn max_depth(&self) -> usize {
        self.max_depth
    }
}
