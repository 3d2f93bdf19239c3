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

//! Construction of types that serialize themselves.
//!
//! A self-serializing type implements [`SelfSerialize`] (its own read and
//! write routines) and [`Materialize`], which lists the construction
//! strategies it offers. The materializer picks a strategy in a fixed order
//! and falls back to building a [`PropertyBag`] of normalized values for the
//! legacy constructor shapes.

mod materializer;
mod normalizer;
mod property_bag;

use std::fmt;

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::Error;
use crate::spool::Spool;
use crate::token::{TokenReader, TokenWriter};

pub(crate) use materializer::materialize;
pub use normalizer::{normalize, NormalizedValue, StructuralNode, VALUES_ENTRY};
pub use property_bag::{InfoContext, PropertyBag};

/// A type's own read and write routines.
///
/// Both return a count of members processed, or a bitmask of the members
/// restored or written; `0` always means nothing.
pub trait SelfSerialize: 'static {
    /// Populates `self` from the reader, which is positioned on the first
    /// token of the value and must be left on its last token.
    fn read_from(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<u32, Error>;

    fn write_to(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<u32, Error>;
}

/// Registration of the construction strategies a type supports.
///
/// ```rust
/// use spool_core::materialize::{Constructors, Materialize, SelfSerialize};
/// use spool_core::token::{TokenReader, TokenWriter};
/// use spool_core::{Error, Spool};
///
/// #[derive(Default)]
/// struct Counter(u32);
///
/// impl SelfSerialize for Counter {
///     fn read_from(&mut self, reader: &mut dyn TokenReader, spool: &Spool) -> Result<u32, Error> {
///         self.0 = spool.read(reader)?;
///         Ok(1)
///     }
///     fn write_to(&self, writer: &mut dyn TokenWriter, spool: &Spool) -> Result<u32, Error> {
///         spool.write(writer, &self.0)?;
///         Ok(1)
///     }
/// }
///
/// impl Materialize for Counter {
///     fn constructors() -> Constructors<Self> {
///         Constructors::new().parameterless(Counter::default)
///     }
/// }
/// ```
pub trait Materialize: SelfSerialize + Sized {
    fn constructors() -> Constructors<Self>;
}

/// The construction strategies the materializer recognizes. Discriminants
/// follow the preference order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ConstructorShape {
    /// Built from the reader and the active [`Spool`].
    ReaderPlusHelper = 0,
    /// Built from the reader alone.
    ReaderOnly = 1,
    /// Built empty, then populated by [`SelfSerialize::read_from`].
    Parameterless = 2,
    /// Built from a [`PropertyBag`] and an [`InfoContext`].
    LegacyInfoPlusContext = 3,
    /// Built from a [`PropertyBag`].
    LegacyInfo = 4,
}

const SHAPE_COUNT: u8 = 5;

impl ConstructorShape {
    #[inline(always)]
    pub fn is_legacy(self) -> bool {
        matches!(
            self,
            ConstructorShape::LegacyInfoPlusContext | ConstructorShape::LegacyInfo
        )
    }
}

/// Set of available [`ConstructorShape`]s.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShapeSet(u8);

impl ShapeSet {
    pub const fn empty() -> Self {
        ShapeSet(0)
    }

    #[inline(always)]
    pub fn insert(&mut self, shape: ConstructorShape) {
        self.0 |= 1 << u8::from(shape);
    }

    #[inline(always)]
    pub fn contains(self, shape: ConstructorShape) -> bool {
        self.0 & (1 << u8::from(shape)) != 0
    }

    #[inline(always)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Shapes in preference order.
    pub fn iter(self) -> impl Iterator<Item = ConstructorShape> {
        (0..SHAPE_COUNT)
            .filter_map(|bit| ConstructorShape::try_from(bit).ok())
            .filter(move |shape| self.contains(*shape))
    }

    /// The first non-legacy shape, the only one the materializer attempts.
    pub fn preferred(self) -> Option<ConstructorShape> {
        self.iter().find(|shape| !shape.is_legacy())
    }

    pub fn legacy(self) -> Option<ConstructorShape> {
        self.iter().find(|shape| shape.is_legacy())
    }
}

impl fmt::Debug for ShapeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub type ParameterlessFn<T> = fn() -> T;
pub type ReaderOnlyFn<T> = fn(&mut dyn TokenReader) -> Result<T, Error>;
pub type ReaderPlusHelperFn<T> = fn(&mut dyn TokenReader, &Spool) -> Result<T, Error>;
pub type LegacyInfoFn<T> = fn(PropertyBag) -> Result<T, Error>;
pub type LegacyInfoPlusContextFn<T> = fn(PropertyBag, &InfoContext<'_>) -> Result<T, Error>;

/// The constructors a type exposes, one per shape at most.
pub struct Constructors<T> {
    is_abstract: bool,
    pub(crate) parameterless: Option<ParameterlessFn<T>>,
    pub(crate) reader_only: Option<ReaderOnlyFn<T>>,
    pub(crate) reader_plus_helper: Option<ReaderPlusHelperFn<T>>,
    pub(crate) legacy_info: Option<LegacyInfoFn<T>>,
    pub(crate) legacy_info_context: Option<LegacyInfoPlusContextFn<T>>,
}

impl<T> Constructors<T> {
    pub const fn new() -> Self {
        Constructors {
            is_abstract: false,
            parameterless: None,
            reader_only: None,
            reader_plus_helper: None,
            legacy_info: None,
            legacy_info_context: None,
        }
    }

    /// Marks a type that cannot be instantiated. Materializing it fails with
    /// [`Error::Construction`] unless an existing instance is reused.
    pub const fn abstract_type() -> Self {
        Constructors {
            is_abstract: true,
            ..Self::new()
        }
    }

    pub fn parameterless(mut self, f: ParameterlessFn<T>) -> Self {
        self.parameterless = Some(f);
        self
    }

    pub fn reader_only(mut self, f: ReaderOnlyFn<T>) -> Self {
        self.reader_only = Some(f);
        self
    }

    pub fn reader_plus_helper(mut self, f: ReaderPlusHelperFn<T>) -> Self {
        self.reader_plus_helper = Some(f);
        self
    }

    pub fn legacy_info(mut self, f: LegacyInfoFn<T>) -> Self {
        self.legacy_info = Some(f);
        self
    }

    pub fn legacy_info_context(mut self, f: LegacyInfoPlusContextFn<T>) -> Self {
        self.legacy_info_context = Some(f);
        self
    }

    #[inline(always)]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn shapes(&self) -> ShapeSet {
        let mut set = ShapeSet::empty();
        if self.reader_plus_helper.is_some() {
            set.insert(ConstructorShape::ReaderPlusHelper);
        }
        if self.reader_only.is_some() {
            set.insert(ConstructorShape::ReaderOnly);
        }
        if self.parameterless.is_some() {
            set.insert(ConstructorShape::Parameterless);
        }
        if self.legacy_info_context.is_some() {
            set.insert(ConstructorShape::LegacyInfoPlusContext);
        }
        if self.legacy_info.is_some() {
            set.insert(ConstructorShape::LegacyInfo);
        }
        set
    }
}

impl<T: Default> Constructors<T> {
    /// Parameterless construction through `Default`.
    pub fn with_default() -> Self {
        Self::new().parameterless(T::default)
    }
}

impl<T> Default for Constructors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Constructors<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Constructors<T> {}

impl<T> fmt::Debug for Constructors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructors")
            .field("is_abstract", &self.is_abstract)
            .field("shapes", &self.shapes())
            .finish()
    }
}
