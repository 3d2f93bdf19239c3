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

//! Error type shared by every Spool component.
//!
//! Error constructors are `#[cold]` and `#[track_caller]`: they sit on the
//! failure edge of every token read, so keeping them out of line keeps the
//! successful paths small.

use std::borrow::Cow;

use thiserror::Error;

use crate::token::TokenKind;

/// Compile-time switch: build with `SPOOL_PANIC_ON_ERROR=1` to panic where an
/// error is created instead of returning it.
pub const PANIC_ON_ERROR: bool = option_env!("SPOOL_PANIC_ON_ERROR").is_some();

#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for Spool serialization, materialization and encoding.
///
/// # Always use the constructor functions
///
/// Do not build variants with enum syntax; use [`Error::construction`],
/// [`Error::token_mismatch`] and friends. They accept anything convertible
/// into `Cow<'static, str>` and honour `SPOOL_PANIC_ON_ERROR`.
///
/// ```rust
/// use spool_core::error::Error;
///
/// let err = Error::construction("no usable constructor for `Widget`");
/// let err = Error::invalid_data(format!("bad number literal `{}`", "1x"));
/// ```
///
/// ## Debugging
///
/// ```bash
/// RUST_BACKTRACE=1 SPOOL_PANIC_ON_ERROR=1 cargo test
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The target type could not be constructed: it is abstract, exposes no
    /// usable constructor shape, or every attempted strategy failed.
    #[error("{0}")]
    Construction(Cow<'static, str>),

    /// The reader is positioned at a token the operation cannot accept.
    #[error("Unexpected token {found} when expecting {expected}. Path '{path}'.")]
    TokenMismatch {
        expected: Cow<'static, str>,
        found: TokenKind,
        path: String,
    },

    /// The reader ran out of tokens in the middle of a value.
    #[error("Unexpected end of input. Path '{0}'.")]
    UnexpectedEnd(String),

    /// Malformed input value.
    #[error("{0}")]
    InvalidData(Cow<'static, str>),

    /// A value of the wrong runtime type reached a typed boundary.
    #[error("{0}")]
    TypeError(Cow<'static, str>),

    /// Writing to a text sink failed.
    #[error("{0}")]
    Encoding(Cow<'static, str>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An asynchronous encode observed its cancellation signal.
    #[error("operation was cancelled")]
    Cancelled,

    #[error("{0}")]
    Unsupported(Cow<'static, str>),

    #[error("{0}")]
    Unknown(Cow<'static, str>),
}

macro_rules! finish {
    ($err:expr) => {{
        let err = $err;
        if PANIC_ON_ERROR {
            panic!("SPOOL_PANIC_ON_ERROR: {}", err);
        }
        err
    }};
}

impl Error {
    /// Creates a new [`Error::Construction`].
    ///
    /// ```
    /// use spool_core::error::Error;
    ///
    /// let err = Error::construction("cannot create an instance of an abstract type");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn construction<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::Construction(s.into()))
    }

    /// Creates a new [`Error::TokenMismatch`] carrying the reader path.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn token_mismatch<S: Into<Cow<'static, str>>>(
        expected: S,
        found: TokenKind,
        path: impl Into<String>,
    ) -> Self {
        finish!(Error::TokenMismatch {
            expected: expected.into(),
            found,
            path: path.into(),
        })
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unexpected_end(path: impl Into<String>) -> Self {
        finish!(Error::UnexpectedEnd(path.into()))
    }

    /// Creates a new [`Error::InvalidData`].
    ///
    /// ```
    /// use spool_core::error::Error;
    ///
    /// let err = Error::invalid_data("invalid base64 payload");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn invalid_data<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::InvalidData(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_error<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::TypeError(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn encoding<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::Encoding(s.into()))
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn cancelled() -> Self {
        finish!(Error::Cancelled)
    }

    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unsupported<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::Unsupported(s.into()))
    }

    /// Creates a new [`Error::Unknown`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unknown<S: Into<Cow<'static, str>>>(s: S) -> Self {
        finish!(Error::Unknown(s.into()))
    }

    /// Appends the Rust type name to a [`Error::TypeError`] or
    /// [`Error::Construction`] message. Other errors pass through unchanged.
    ///
    /// ```
    /// use spool_core::error::Error;
    ///
    /// let err = Error::enhance_type_error::<String>(Error::type_error("converter returned a foreign value"));
    /// assert!(err.to_string().ends_with("(type: alloc::string::String)"));
    /// ```
    #[inline(never)]
    pub fn enhance_type_error<T: ?Sized + 'static>(err: Error) -> Error {
        match err {
            Error::TypeError(s) => {
                Error::TypeError(format!("{} (type: {})", s, std::any::type_name::<T>()).into())
            }
            Error::Construction(s) => {
                Error::Construction(format!("{} (type: {})", s, std::any::type_name::<T>()).into())
            }
            other => other,
        }
    }

    /// Whether the error means "the input does not fit this type" rather than
    /// an I/O or cancellation failure.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::Construction(_)
                | Error::TokenMismatch { .. }
                | Error::UnexpectedEnd(_)
                | Error::InvalidData(_)
                | Error::TypeError(_)
        )
    }
}

impl From<std::fmt::Error> for Error {
    #[cold]
    fn from(_: std::fmt::Error) -> Self {
        Error::encoding("failed to write to the text sink")
    }
}

/// Ensures a condition is true; otherwise returns an [`enum@Error`].
///
/// ```
/// use spool_core::ensure;
/// use spool_core::error::Error;
///
/// fn check_depth(depth: usize) -> Result<(), Error> {
///     ensure!(depth < 64, Error::invalid_data("nesting too deep"));
///     ensure!(depth != 13, "unlucky depth {}", depth);
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::unknown($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`enum@Error`].
///
/// ```
/// use spool_core::bail;
/// use spool_core::error::Error;
///
/// fn fail_fast() -> Result<(), Error> {
///     bail!("something went wrong");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::unknown($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::unknown(format!($fmt, $($arg)*)))
    };
}
