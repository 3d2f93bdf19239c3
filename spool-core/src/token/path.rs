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

use std::fmt::Write;

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScopeKind {
    Object,
    Array,
}

#[derive(Clone, Debug)]
struct Scope {
    kind: ScopeKind,
    name: Option<String>,
    // -1 until the first element is seen
    index: i64,
}

/// Tracks the JSON path (`items[2].id`) of the current token.
///
/// Shared by every reader and writer so that error messages and
/// [`crate::materialize::InfoContext`] report the same locations.
#[derive(Clone, Debug)]
pub struct PathTracker {
    scopes: Vec<Scope>,
    max_depth: usize,
    base: String,
}

impl Default for PathTracker {
    fn default() -> Self {
        PathTracker::new(usize::MAX)
    }
}

impl PathTracker {
    pub fn new(max_depth: usize) -> Self {
        PathTracker {
            scopes: Vec::new(),
            max_depth,
            base: String::new(),
        }
    }

    /// A tracker whose paths are reported relative to `base`, used when a
    /// recorded sub-tree is replayed.
    pub fn with_base(max_depth: usize, base: impl Into<String>) -> Self {
        PathTracker {
            scopes: Vec::new(),
            max_depth,
            base: base.into(),
        }
    }

    /// Number of open containers.
    #[inline(always)]
    pub fn open_scopes(&self) -> usize {
        self.scopes.len()
    }

    /// Called before every value (scalar or container start).
    #[inline(always)]
    pub fn before_value(&mut self) {
        if let Some(top) = self.scopes.last_mut() {
            if top.kind == ScopeKind::Array {
                top.index += 1;
            }
        }
    }

    pub fn push_object(&mut self) -> Result<(), Error> {
        self.push(ScopeKind::Object)
    }

    pub fn push_array(&mut self) -> Result<(), Error> {
        self.push(ScopeKind::Array)
    }

    fn push(&mut self, kind: ScopeKind) -> Result<(), Error> {
        self.before_value();
        if self.scopes.len() >= self.max_depth {
            return Err(Error::invalid_data(format!(
                "The reader's MaxDepth of {} has been exceeded. Path '{}'.",
                self.max_depth,
                self.path()
            )));
        }
        self.scopes.push(Scope {
            kind,
            name: None,
            index: -1,
        });
        Ok(())
    }

    /// Closes the innermost container. Returns whether it was an object, or
    /// `None` when nothing was open.
    pub fn pop(&mut self) -> Option<bool> {
        self.scopes
            .pop()
            .map(|scope| scope.kind == ScopeKind::Object)
    }

    #[inline(always)]
    pub fn in_object(&self) -> bool {
        matches!(self.scopes.last(), Some(s) if s.kind == ScopeKind::Object)
    }

    #[inline(always)]
    pub fn in_array(&self) -> bool {
        matches!(self.scopes.last(), Some(s) if s.kind == ScopeKind::Array)
    }

    pub fn set_property(&mut self, name: &str) {
        if let Some(top) = self.scopes.last_mut() {
            if top.kind == ScopeKind::Object {
                top.name = Some(name.to_owned());
            }
        }
    }

    pub fn path(&self) -> String {
        let mut path = self.base.clone();
        for scope in &self.scopes {
            match scope.kind {
                ScopeKind::Object => {
                    if let Some(name) = &scope.name {
                        push_name(&mut path, name);
                    }
                }
                ScopeKind::Array => {
                    if scope.index >= 0 {
                        let _ = write!(path, "[{}]", scope.index);
                    }
                }
            }
        }
        path
    }
}

fn push_name(path: &mut String, name: &str) {
    let plain = !name.is_empty()
        && !name
            .chars()
            .any(|c| matches!(c, '.' | '[' | ']' | '(' | ')' | '\'' | '"') || c.is_whitespace());
    if plain {
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
    } else {
        let _ = write!(path, "['{}']", name.replace('\'', "\\'"));
    }
}
