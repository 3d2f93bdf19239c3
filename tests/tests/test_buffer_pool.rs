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

use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use spool_core::buffer::{BufferPool, PoolSet, PooledBuffer};
use spool_core::config::PoolConfig;

#[test]
fn test_rent_sizes() {
    let pool = BufferPool::<u8>::with_page_elements(4096);
    let small = pool.rent(1);
    let large = pool.rent(5000);
    assert_eq!(small.len(), 4096);
    assert_eq!(large.len(), 8192);
    assert!(pool.return_buffer(small).is_none());
    assert!(pool.return_buffer(large).is_none());
}

#[test]
fn test_char_pool_page_elements() {
    let pools = PoolSet::new(&PoolConfig {
        page_size_bytes: 4096,
    });
    assert_eq!(pools.bytes().page_elements(), 4096);
    // four bytes per char
    assert_eq!(pools.chars().page_elements(), 1024);
}

#[test]
fn test_returned_buffer_is_reused() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    let first = pool.rent(10);
    let ptr = first.as_ptr();
    assert!(pool.return_buffer(first).is_none());
    let second = pool.rent(3);
    assert_eq!(second.as_ptr(), ptr);
    assert_eq!(pool.pool_size(), 1);
    assert_eq!(pool.locked_count(), 1);
}

#[test]
fn test_foreign_buffer_is_handed_back() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    let foreign = PooledBuffer::from(vec![0u8; 32]);
    let back = pool.return_buffer(foreign);
    assert!(back.is_some());
    assert_eq!(pool.pool_size(), 0);
}

#[test]
fn test_double_return_is_ignored() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    let buffer = pool.rent(16);
    let copy = PooledBuffer::from(buffer.to_vec());
    assert!(pool.return_buffer(buffer).is_none());
    // same length, different allocation
    assert!(pool.return_buffer(copy).is_some());
    assert_eq!(pool.locked_count(), 0);
}

#[test]
fn test_register_and_remove() {
    let pool = BufferPool::<char>::with_page_elements(8);
    let external = PooledBuffer::from(vec!['a'; 64]);
    assert!(pool.register_locked(&external));
    assert!(!pool.register_locked(&external));
    assert!(pool.is_pooled(&external));
    assert_eq!(pool.locked_count(), 1);
    assert!(pool.return_buffer(external).is_none());
    assert_eq!(pool.locked_count(), 0);

    let rented = pool.rent(64);
    assert_eq!(rented.len(), 64);
    assert!(pool.remove(&rented));
    assert!(!pool.is_pooled(&rented));
    assert_eq!(pool.pool_size(), 0);
}

#[test]
fn test_register_free_entry_is_rentable() {
    let pool = BufferPool::<u8>::with_page_elements(8);
    let external = PooledBuffer::from(vec![7u8; 8]);
    let ptr = external.as_ptr();
    assert!(pool.register(external).is_ok());
    let rented = pool.rent(8);
    assert_eq!(rented.as_ptr(), ptr);
}

#[test]
fn test_release_keeps_locked_buffers() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    let kept = pool.rent(16);
    let freed = pool.rent(16);
    assert!(pool.return_buffer(freed).is_none());
    assert_eq!(pool.release(), 1);
    assert_eq!(pool.pool_size(), 1);
    assert!(pool.is_pooled(&kept));
}

#[test]
fn test_scoped_rental_returns_on_drop() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    {
        let mut rental = pool.rent_scoped(4);
        rental[0] = 1;
        assert_eq!(pool.locked_count(), 1);
    }
    assert_eq!(pool.locked_count(), 0);
    assert_eq!(pool.pool_size(), 1);
}

#[test]
fn test_zero_length_rent_is_untracked() {
    let pool = BufferPool::<u8>::with_page_elements(16);
    let empty = pool.rent(0);
    assert!(empty.is_empty());
    assert_eq!(pool.pool_size(), 0);
    assert!(pool.return_buffer(empty).is_none());
}

#[test]
fn test_concurrent_rent_and_return() {
    let pool = Arc::new(BufferPool::<u8>::with_page_elements(64));
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..200 {
                    let mut buffer = pool.rent(1 + (i * 37 + t) % 300);
                    buffer[0] = t as u8;
                    assert!(buffer.len().is_power_of_two());
                    assert!(pool.return_buffer(buffer).is_none());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(pool.locked_count(), 0);
    // one buffer per thread per size class at most
    assert!(pool.pool_size() <= 8 * 4);
}

proptest! {
    #[test]
    fn prop_rent_is_power_of_two_and_large_enough(n in 1usize..100_000) {
        let pool = BufferPool::<u8>::with_page_elements(4096);
        let buffer = pool.rent(n);
        prop_assert!(buffer.len().is_power_of_two());
        prop_assert!(buffer.len() >= n.max(4096));
    }

    #[test]
    fn prop_locked_never_exceeds_outstanding(ops in proptest::collection::vec((any::<bool>(), 1usize..5000), 1..60)) {
        let pool = BufferPool::<u8>::with_page_elements(256);
        let mut outstanding = Vec::new();
        for (rent, size) in ops {
            if rent || outstanding.is_empty() {
                outstanding.push(pool.rent(size));
            } else {
                let buffer = outstanding.swap_remove(size % outstanding.len());
                prop_assert!(pool.return_buffer(buffer).is_none());
            }
            prop_assert!(pool.locked_count() <= outstanding.len());
            let locked = pool.locked_count();
            pool.release();
            prop_assert_eq!(pool.locked_count(), locked);
        }
    }
}
