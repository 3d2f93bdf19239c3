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

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::config::PoolConfig;

/// An array handed out by a [`BufferPool`].
///
/// The pool identifies buffers by the address of their backing allocation,
/// never by content. While a buffer is rented the caller owns the array and
/// the pool only remembers its identity as a locked entry.
pub struct PooledBuffer<T> {
    data: Box<[T]>,
}

impl<T> PooledBuffer<T> {
    /// Wraps an externally allocated array so it can be registered with a pool.
    pub fn from_boxed(data: Box<[T]>) -> Self {
        PooledBuffer { data }
    }

    pub fn empty() -> Self {
        PooledBuffer {
            data: Vec::new().into_boxed_slice(),
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Detaches the array. If it came from a pool its entry stays locked.
    pub fn into_inner(self) -> Box<[T]> {
        self.data
    }

    #[inline(always)]
    fn identity(&self) -> usize {
        self.data.as_ptr() as usize
    }
}

impl<T> From<Vec<T>> for PooledBuffer<T> {
    fn from(value: Vec<T>) -> Self {
        PooledBuffer::from_boxed(value.into_boxed_slice())
    }
}

impl<T> Deref for PooledBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

impl<T> DerefMut for PooledBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> fmt::Debug for PooledBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len())
            .field("identity", &format_args!("{:#x}", self.identity()))
            .finish()
    }
}

struct Entry<T> {
    identity: usize,
    len: usize,
    // `None` while the array is rented out.
    slot: Option<Box<[T]>>,
}

impl<T> Entry<T> {
    #[inline(always)]
    fn is_locked(&self) -> bool {
        self.slot.is_none()
    }
}

/// A reusable array pool for one element type.
///
/// Every rented buffer has a power-of-two length of at least one page worth
/// of elements. All mutation and introspection goes through one mutex per
/// pool; the lock is held only while the entry list is scanned or changed,
/// never while a caller uses a buffer.
///
/// ```rust
/// use spool_core::buffer::BufferPool;
///
/// let pool = BufferPool::<u8>::with_page_elements(4096);
/// let buffer = pool.rent(5000);
/// assert_eq!(buffer.len(), 8192);
/// assert!(pool.return_buffer(buffer).is_none());
/// assert_eq!(pool.locked_count(), 0);
/// ```
pub struct BufferPool<T> {
    entries: Mutex<Vec<Entry<T>>>,
    page_elements: usize,
}

impl<T: Copy + Default> Default for BufferPool<T> {
    fn default() -> Self {
        Self::with_config(&PoolConfig::default())
    }
}

impl<T: Copy + Default> BufferPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool whose minimum buffer holds one page of `T`.
    pub fn with_config(config: &PoolConfig) -> Self {
        let element_size = mem::size_of::<T>().max(1);
        Self::with_page_elements(config.page_size_bytes / element_size)
    }

    /// Creates a pool whose minimum buffer holds `page_elements` elements,
    /// rounded up to a power of two.
    pub fn with_page_elements(page_elements: usize) -> Self {
        let page_elements = page_elements
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(page_elements);
        BufferPool {
            entries: Mutex::new(Vec::new()),
            page_elements,
        }
    }

    #[inline(always)]
    pub fn page_elements(&self) -> usize {
        self.page_elements
    }

    /// The length `rent(min_len)` allocates when nothing can be reused.
    pub fn size_class(&self, min_len: usize) -> usize {
        min_len
            .checked_next_power_of_two()
            .unwrap_or(min_len)
            .max(self.page_elements)
    }

    /// Rents a buffer of at least `min_len` elements and marks it locked.
    ///
    /// A zero-length request yields an empty buffer that the pool does not
    /// track.
    pub fn rent(&self, min_len: usize) -> PooledBuffer<T> {
        if min_len == 0 {
            return PooledBuffer::empty();
        }
        let size = self.size_class(min_len);
        {
            let mut entries = self.entries.lock();
            // Most recently added first: freshly returned buffers are still warm.
            for entry in entries.iter_mut().rev() {
                if entry.len < size || !entry.len.is_power_of_two() {
                    continue;
                }
                if let Some(data) = entry.slot.take() {
                    trace!(requested = min_len, len = entry.len, "buffer pool hit");
                    return PooledBuffer { data };
                }
            }
        }

        let data = vec![T::default(); size].into_boxed_slice();
        let buffer = PooledBuffer { data };
        let mut entries = self.entries.lock();
        entries.push(Entry {
            identity: buffer.identity(),
            len: size,
            slot: None,
        });
        debug!(
            requested = min_len,
            len = size,
            pool_size = entries.len(),
            "buffer pool allocated a new buffer"
        );
        buffer
    }

    /// Rents a buffer that goes back to the pool when the guard drops.
    pub fn rent_scoped(&self, min_len: usize) -> Rental<'_, T> {
        Rental {
            pool: self,
            buffer: Some(self.rent(min_len)),
        }
    }

    /// Unlocks a buffer rented from this pool.
    ///
    /// A buffer the pool does not know is handed back untouched as `Some`;
    /// that is a normal outcome, not an error. Empty buffers are accepted and
    /// discarded.
    #[must_use = "a buffer handed back was not taken by this pool"]
    pub fn return_buffer(&self, buffer: PooledBuffer<T>) -> Option<PooledBuffer<T>> {
        if buffer.is_empty() {
            return None;
        }
        let identity = buffer.identity();
        let mut entries = self.entries.lock();
        match entries
            .iter_mut()
            .find(|entry| entry.identity == identity && entry.is_locked())
        {
            Some(entry) => {
                trace!(len = buffer.len(), "buffer returned to pool");
                entry.len = buffer.len();
                entry.slot = Some(buffer.data);
                None
            }
            None => Some(buffer),
        }
    }

    /// Adopts an externally allocated array as a free entry.
    ///
    /// Fails, handing the buffer back, when an entry with the same identity is
    /// already registered.
    pub fn register(&self, buffer: PooledBuffer<T>) -> Result<(), PooledBuffer<T>> {
        if buffer.is_empty() {
            return Err(buffer);
        }
        let identity = buffer.identity();
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry.identity == identity) {
            return Err(buffer);
        }
        entries.push(Entry {
            identity,
            len: buffer.len(),
            slot: Some(buffer.data),
        });
        Ok(())
    }

    /// Records an array the caller keeps using as a locked entry. Returning it
    /// later hands it to the pool.
    pub fn register_locked(&self, buffer: &PooledBuffer<T>) -> bool {
        if buffer.is_empty() {
            return false;
        }
        let identity = buffer.identity();
        let mut entries = self.entries.lock();
        if entries.iter().any(|entry| entry.identity == identity) {
            return false;
        }
        entries.push(Entry {
            identity,
            len: buffer.len(),
            slot: None,
        });
        true
    }

    /// Forgets the entry for `buffer`, locked or not.
    pub fn remove(&self, buffer: &PooledBuffer<T>) -> bool {
        let identity = buffer.identity();
        let mut entries = self.entries.lock();
        match entries
            .iter()
            .position(|entry| entry.identity == identity)
        {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops every unlocked entry and returns how many were removed.
    pub fn release(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(Entry::is_locked);
        let removed = before - entries.len();
        debug!(removed, remaining = entries.len(), "buffer pool released");
        removed
    }

    pub fn is_pooled(&self, buffer: &PooledBuffer<T>) -> bool {
        let identity = buffer.identity();
        self.entries
            .lock()
            .iter()
            .any(|entry| entry.identity == identity)
    }

    pub fn pool_size(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn locked_count(&self) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.is_locked())
            .count()
    }
}

impl<T> fmt::Debug for BufferPool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        f.debug_struct("BufferPool")
            .field("element", &std::any::type_name::<T>())
            .field("page_elements", &self.page_elements)
            .field("entries", &entries.len())
            .field(
                "locked",
                &entries.iter().filter(|entry| entry.is_locked()).count(),
            )
            .finish()
    }
}

/// A buffer that returns to its pool when dropped.
pub struct Rental<'a, T: Copy + Default> {
    pool: &'a BufferPool<T>,
    buffer: Option<PooledBuffer<T>>,
}

impl<T: Copy + Default> Deref for Rental<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.buffer.as_deref().unwrap_or(&[])
    }
}

impl<T: Copy + Default> DerefMut for Rental<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.buffer.as_deref_mut().unwrap_or(&mut [])
    }
}

impl<T: Copy + Default> Drop for Rental<'_, T> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            let _ = self.pool.return_buffer(buffer);
        }
    }
}

/// The two pool handles the engine exposes: bytes for stream reads, chars for
/// encoded text.
#[derive(Clone, Debug)]
pub struct PoolSet {
    bytes: Arc<BufferPool<u8>>,
    chars: Arc<BufferPool<char>>,
}

impl Default for PoolSet {
    fn default() -> Self {
        Self::new(&PoolConfig::default())
    }
}

impl PoolSet {
    pub fn new(config: &PoolConfig) -> Self {
        PoolSet {
            bytes: Arc::new(BufferPool::with_config(config)),
            chars: Arc::new(BufferPool::with_config(config)),
        }
    }

    pub fn from_pools(bytes: Arc<BufferPool<u8>>, chars: Arc<BufferPool<char>>) -> Self {
        PoolSet { bytes, chars }
    }

    #[inline(always)]
    pub fn bytes(&self) -> &Arc<BufferPool<u8>> {
        &self.bytes
    }

    #[inline(always)]
    pub fn chars(&self) -> &Arc<BufferPool<char>> {
        &self.chars
    }
}
