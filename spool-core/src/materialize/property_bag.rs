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

use super::NormalizedValue;
use crate::error::Error;
use crate::spool::Spool;

/// Ordered name to value collection handed to legacy constructors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBag {
    type_name: &'static str,
    entries: Vec<(String, NormalizedValue)>,
}

impl PropertyBag {
    pub fn new(type_name: &'static str) -> Self {
        PropertyBag {
            type_name,
            entries: Vec::new(),
        }
    }

    /// Name of the type being constructed.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Inserts or replaces an entry, keeping the position of the first
    /// insertion.
    pub fn insert(&mut self, name: impl Into<String>, value: NormalizedValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&NormalizedValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Like [`PropertyBag::get`], failing when the member is missing.
    pub fn require(&self, name: &str) -> Result<&NormalizedValue, Error> {
        self.get(name).ok_or_else(|| {
            Error::invalid_data(format!(
                "Member '{}' was not found for type {}.",
                name, self.type_name
            ))
        })
    }

    pub fn take(&mut self, name: &str) -> Option<NormalizedValue> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for PropertyBag {
    type Item = (String, NormalizedValue);
    type IntoIter = std::vec::IntoIter<(String, NormalizedValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Second argument of the info-plus-context constructor shape.
#[derive(Clone, Copy, Debug)]
pub struct InfoContext<'a> {
    spool: &'a Spool,
    path: &'a str,
}

impl<'a> InfoContext<'a> {
    pub fn new(spool: &'a Spool, path: &'a str) -> Self {
        InfoContext { spool, path }
    }

    pub fn spool(&self) -> &'a Spool {
        self.spool
    }

    /// Reader path of the value being constructed.
    pub fn path(&self) -> &'a str {
        self.path
    }
}
