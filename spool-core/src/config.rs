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

/// How date-like strings are surfaced by readers and the normalizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DateParseHandling {
    /// Dates stay strings.
    None,
    /// ISO 8601 strings become offset-naive date tokens.
    #[default]
    DateTime,
    /// ISO 8601 strings become offset-aware date tokens.
    DateTimeOffset,
}

/// How non-integral numbers are surfaced by readers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FloatParseHandling {
    #[default]
    Double,
    Decimal,
}

/// Whether an existing instance is populated in place or replaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ObjectCreationHandling {
    /// Reuse existing self-serializing objects.
    #[default]
    Auto,
    Reuse,
    Replace,
}

impl ObjectCreationHandling {
    #[inline(always)]
    pub fn reuses_existing(self) -> bool {
        !matches!(self, ObjectCreationHandling::Replace)
    }
}

/// Output layout of [`crate::json::JsonWriter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Formatting {
    #[default]
    None,
    Indented,
}

/// Sizing of the buffer pools created by [`crate::buffer::PoolSet::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Bytes in one virtual-memory page; the minimum rent size of each pool is
    /// this many bytes worth of elements.
    pub page_size_bytes: usize,
}

pub const DEFAULT_PAGE_SIZE_BYTES: usize = 4096;

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            page_size_bytes: DEFAULT_PAGE_SIZE_BYTES,
        }
    }
}

/// Configuration for Spool serialization.
///
/// Shared between the [`crate::Spool`] facade and the readers and writers it
/// creates so that every component observes the same settings.
#[derive(Clone, Debug)]
pub struct Config {
    pub date_parse_handling: DateParseHandling,
    pub float_parse_handling: FloatParseHandling,
    pub object_creation_handling: ObjectCreationHandling,
    /// Maximum nesting depth accepted by readers and the normalizer.
    pub max_depth: usize,
    pub formatting: Formatting,
    pub pool: PoolConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            date_parse_handling: DateParseHandling::default(),
            float_parse_handling: FloatParseHandling::default(),
            object_creation_handling: ObjectCreationHandling::default(),
            max_depth: 64,
            formatting: Formatting::default(),
            pool: PoolConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn date_parse_handling(&self) -> DateParseHandling {
        self.date_parse_handling
    }

    #[inline(always)]
    pub fn float_parse_handling(&self) -> FloatParseHandling {
        self.float_parse_handling
    }

    #[inline(always)]
    pub fn object_creation_handling(&self) -> ObjectCreationHandling {
        self.object_creation_handling
    }

    #[inline(always)]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[inline(always)]
    pub fn formatting(&self) -> Formatting {
        self.formatting
    }
}
