// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::VecDeque,
    sync::{Condvar, Mutex},
};

/// Capacity of the work hand-off between a pass's producer and its workers.
pub(crate) const BUF_SIZE: usize = 40;

/// A fixed-capacity blocking queue between one producer and a pool of
/// consumers.
///
/// `push` blocks while the queue is full, which back-pressures the producer
/// against slow workers. Once the producer calls `close`, consumers drain the
/// remaining items and then each observe `None`, terminating the pool.
pub(crate) struct BoundedQueue<T> {
    inner: Mutex<Inner<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedQueue<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Enqueues `item`, blocking while the queue is at capacity.
    pub(crate) fn push(&self, item: T) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        while inner.items.len() == self.capacity {
            inner = self.not_full.wait(inner).expect("queue mutex poisoned");
        }
        assert!(!inner.closed, "push into a closed queue");
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
    }

    /// Dequeues the next item, blocking while the queue is empty. Returns
    /// `None` once the queue has been closed and drained.
    pub(crate) fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        loop {
            if let Some(item) = inner.items.pop_front() {
                drop(inner);
                self.not_full.notify_one();
                return Some(item);
            }
            if inner.closed {
                return None;
            }
            inner = self.not_empty.wait(inner).expect("queue mutex poisoned");
        }
    }

    /// Marks the stream complete and wakes every blocked consumer.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock().expect("queue mutex poisoned");
        inner.closed = true;
        drop(inner);
        self.not_empty.notify_all();
    }
}
