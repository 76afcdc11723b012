//! Ring Buffer Implementation

use crate::{PushError, RingBufferError};
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default number of slots (127 usable)
pub const DEFAULT_CAPACITY: usize = 128;

/// Fixed-capacity SPSC circular FIFO
///
/// `head` is only advanced by the [`Producer`] and `tail` only by the
/// [`Consumer`]. Both indices are atomics, so either side can read the fill
/// level without blocking. Slot copies and index updates happen under a short
/// internal lock which is also what makes [`RingBuffer::reset`] (the one
/// operation that rewinds both indices) a proper critical section. The lock
/// is never held while a caller is doing I/O with an item.
#[derive(Debug)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    slots: Mutex<Box<[T]>>,
    /// Number of slots, including the one kept free
    capacity: usize,
    /// Head position (next write index)
    head: AtomicUsize,
    /// Tail position (next read index)
    tail: AtomicUsize,
    /// Bumped on every reset; invalidates outstanding peeks and stale pushes
    generation: AtomicU64,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// Create a new ring buffer with the given number of slots
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity < 2 {
            return Err(RingBufferError::InvalidCapacity(capacity));
        }

        Ok(Self {
            slots: Mutex::new(vec![T::default(); capacity].into_boxed_slice()),
            capacity,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        })
    }

    /// Create a buffer with default capacity (128 slots)
    pub fn with_default_capacity() -> Self {
        Self {
            slots: Mutex::new(vec![T::default(); DEFAULT_CAPACITY].into_boxed_slice()),
            capacity: DEFAULT_CAPACITY,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            generation: AtomicU64::new(0),
        }
    }

    /// Split into the producer and consumer handles
    pub fn split(self) -> (Producer<T>, Consumer<T>) {
        let ring = Arc::new(self);
        (
            Producer {
                ring: Arc::clone(&ring),
            },
            Consumer { ring },
        )
    }

    /// Copy of the queued items, oldest first
    pub fn snapshot(&self) -> Vec<T> {
        let slots = self.lock();
        let head = self.head.load(Ordering::Relaxed);
        let mut pos = self.tail.load(Ordering::Relaxed);

        let mut items = Vec::with_capacity(self.len());
        while pos != head {
            items.push(slots[pos]);
            pos = self.next(pos);
        }
        items
    }
}

impl<T> RingBuffer<T> {
    /// Number of slots, including the one kept free
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Maximum number of items the buffer can hold at once
    pub fn usable_capacity(&self) -> usize {
        self.capacity - 1
    }

    /// Get the number of items currently queued
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head - tail
        } else {
            self.capacity - tail + head
        }
    }

    /// Slots still available to the producer
    pub fn free_slots(&self) -> usize {
        self.usable_capacity() - self.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.next(self.head.load(Ordering::Acquire)) == self.tail.load(Ordering::Acquire)
    }

    /// Current write index
    pub fn head(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Current read index
    pub fn tail(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Number of resets so far
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Rewind both indices to zero
    ///
    /// Stored items are left in place but become unreachable. Safe to call
    /// from either side while the other is mid-operation.
    pub fn reset(&self) {
        let _slots = self.lock();
        self.head.store(0, Ordering::Release);
        self.tail.store(0, Ordering::Release);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn next(&self, index: usize) -> usize {
        (index + 1) % self.capacity
    }

    fn lock(&self) -> MutexGuard<'_, Box<[T]>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Writing half; advances `head`
#[derive(Debug)]
pub struct Producer<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy> Producer<T> {
    /// Write one item, handing it back if the buffer is full
    pub fn push(&mut self, item: T) -> Result<(), T> {
        let mut slots = self.ring.lock();
        let head = self.ring.head.load(Ordering::Relaxed);
        let next = self.ring.next(head);
        if next == self.ring.tail.load(Ordering::Relaxed) {
            return Err(item);
        }

        slots[head] = item;
        self.ring.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Write every item or none of them
    pub fn push_all<I>(&mut self, items: I) -> Result<(), PushError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let generation = self.ring.generation();
        self.push_all_in(generation, items)
    }

    /// Write every item or none of them, provided no reset happened since
    /// `generation` was read
    ///
    /// Items are only pulled from the iterator once the batch is admitted.
    pub fn push_all_in<I>(&mut self, generation: u64, items: I) -> Result<(), PushError>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: ExactSizeIterator,
    {
        let items = items.into_iter();
        let mut slots = self.ring.lock();

        if self.ring.generation.load(Ordering::Acquire) != generation {
            return Err(PushError::Reset);
        }

        let free = self.ring.free_slots();
        if free < items.len() {
            return Err(PushError::Full {
                requested: items.len(),
                free,
            });
        }

        let mut head = self.ring.head.load(Ordering::Relaxed);
        for item in items.take(free) {
            slots[head] = item;
            head = self.ring.next(head);
        }
        self.ring.head.store(head, Ordering::Release);
        Ok(())
    }
}

impl<T> Deref for Producer<T> {
    type Target = RingBuffer<T>;

    fn deref(&self) -> &Self::Target {
        &self.ring
    }
}

/// Item copied out by [`Consumer::peek`], not yet removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peeked<T> {
    /// The item at the tail
    pub item: T,
    generation: u64,
}

/// Reading half; advances `tail`
#[derive(Debug)]
pub struct Consumer<T> {
    ring: Arc<RingBuffer<T>>,
}

impl<T: Copy> Consumer<T> {
    /// Remove and return the item at `tail`
    pub fn pop(&mut self) -> Option<T> {
        let slots = self.ring.lock();
        let tail = self.ring.tail.load(Ordering::Relaxed);
        if tail == self.ring.head.load(Ordering::Relaxed) {
            return None;
        }

        let item = slots[tail];
        self.ring.tail.store(self.ring.next(tail), Ordering::Release);
        Some(item)
    }

    /// Copy the item at `tail` without removing it
    pub fn peek(&self) -> Option<Peeked<T>> {
        let slots = self.ring.lock();
        let tail = self.ring.tail.load(Ordering::Relaxed);
        if tail == self.ring.head.load(Ordering::Relaxed) {
            return None;
        }

        Some(Peeked {
            item: slots[tail],
            generation: self.ring.generation.load(Ordering::Relaxed),
        })
    }

    /// Remove a previously peeked item
    ///
    /// Returns `false` (and leaves the buffer alone) if a reset happened
    /// since the peek.
    pub fn commit(&mut self, peeked: Peeked<T>) -> bool {
        let _slots = self.ring.lock();
        if self.ring.generation.load(Ordering::Relaxed) != peeked.generation {
            return false;
        }

        let tail = self.ring.tail.load(Ordering::Relaxed);
        self.ring.tail.store(self.ring.next(tail), Ordering::Release);
        true
    }
}

impl<T> Deref for Consumer<T> {
    type Target = RingBuffer<T>;

    fn deref(&self) -> &Self::Target {
        &self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::thread;

    #[test]
    fn test_rejects_tiny_capacity() {
        assert_eq!(
            RingBuffer::<u32>::new(1).unwrap_err(),
            RingBufferError::InvalidCapacity(1)
        );
        assert!(RingBuffer::<u32>::new(0).is_err());
        assert!(RingBuffer::<u32>::new(2).is_ok());
    }

    #[test]
    fn test_default_capacity() {
        let buffer = RingBuffer::<u32>::with_default_capacity();
        assert_eq!(buffer.capacity(), 128);
        assert_eq!(buffer.free_slots(), 127);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_push_and_pop_fifo() {
        let (mut producer, mut consumer) = RingBuffer::new(10).unwrap().split();
        for i in 0..5u32 {
            producer.push(i * 100).unwrap();
        }

        assert_eq!(consumer.len(), 5);
        assert_eq!(consumer.peek().map(|p| p.item), Some(0));
        let popped: Vec<u32> = std::iter::from_fn(|| consumer.pop()).collect();
        assert_eq!(popped, vec![0, 100, 200, 300, 400]);
        assert!(producer.is_empty());
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_one_slot_kept_free() {
        let (mut producer, _consumer) = RingBuffer::new(4).unwrap().split();
        producer.push(1u32).unwrap();
        producer.push(2).unwrap();
        producer.push(3).unwrap();

        assert!(producer.is_full());
        assert_eq!(producer.len(), 3);
        assert_eq!(producer.free_slots(), 0);
        assert_eq!(producer.push(4), Err(4));
    }

    #[test]
    fn test_push_all_is_all_or_nothing() {
        let (mut producer, _consumer) = RingBuffer::new(4).unwrap().split();
        producer.push_all([1u32]).unwrap();

        assert_eq!(
            producer.push_all([2, 3, 4]),
            Err(PushError::Full { requested: 3, free: 2 })
        );
        assert_eq!(producer.snapshot(), vec![1]);

        producer.push_all([2, 3]).unwrap();
        assert_eq!(producer.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_push_after_reset_is_rejected() {
        let (mut producer, consumer) = RingBuffer::new(8).unwrap().split();
        let generation = producer.generation();

        consumer.reset();

        assert_eq!(producer.push_all_in(generation, [1u32]), Err(PushError::Reset));
        assert!(producer.is_empty());
        let generation = producer.generation();
        producer.push_all_in(generation, [1u32]).unwrap();
        assert_eq!(producer.len(), 1);
    }

    #[test]
    fn test_wraparound() {
        let (mut producer, mut consumer) = RingBuffer::new(4).unwrap().split();
        for round in 0..10u32 {
            producer.push(round).unwrap();
            producer.push(round + 100).unwrap();
            assert_eq!(consumer.pop(), Some(round));
            assert_eq!(consumer.pop(), Some(round + 100));
        }
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_snapshot_oldest_first_across_wrap() {
        let (mut producer, mut consumer) = RingBuffer::new(4).unwrap().split();
        producer.push(1u32).unwrap();
        producer.push(2).unwrap();
        consumer.pop();
        producer.push(3).unwrap();
        producer.push(4).unwrap();

        assert_eq!(consumer.snapshot(), vec![2, 3, 4]);
    }

    #[test]
    fn test_peek_then_commit() {
        let (mut producer, mut consumer) = RingBuffer::new(4).unwrap().split();
        producer.push(7u32).unwrap();

        let peeked = consumer.peek().unwrap();
        assert_eq!(peeked.item, 7);
        assert_eq!(consumer.len(), 1);
        assert!(consumer.commit(peeked));
        assert!(consumer.is_empty());
    }

    #[test]
    fn test_commit_after_reset_is_ignored() {
        let (mut producer, mut consumer) = RingBuffer::new(8).unwrap().split();
        producer.push(1u32).unwrap();
        let peeked = consumer.peek().unwrap();

        producer.reset();
        producer.push(2).unwrap();

        assert!(!consumer.commit(peeked));
        assert_eq!(consumer.snapshot(), vec![2]);
    }

    #[test]
    fn test_reset_rewinds_indices() {
        let (mut producer, mut consumer) = RingBuffer::new(8).unwrap().split();
        producer.push(7u32).unwrap();
        producer.push(8).unwrap();
        consumer.pop();
        producer.reset();

        assert!(consumer.is_empty());
        assert_eq!((consumer.head(), consumer.tail()), (0, 0));
        assert_eq!(producer.free_slots(), 7);
        assert_eq!(producer.generation(), 1);
    }

    #[test]
    fn test_producer_and_consumer_on_separate_threads() {
        let (mut producer, mut consumer) = RingBuffer::new(16).unwrap().split();

        let writer = thread::spawn(move || {
            for i in 0..10_000u32 {
                while producer.push(i).is_err() {
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0u32;
        while expected < 10_000 {
            match consumer.pop() {
                Some(v) => {
                    assert_eq!(v, expected);
                    expected += 1;
                }
                None => thread::yield_now(),
            }
        }
        writer.join().unwrap();
        assert!(consumer.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u32),
        Pop,
        Reset,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => any::<u32>().prop_map(Op::Push),
            3 => Just(Op::Pop),
            1 => Just(Op::Reset),
        ]
    }

    proptest! {
        #[test]
        fn behaves_like_bounded_fifo(capacity in 2usize..16, ops in proptest::collection::vec(op(), 0..200)) {
            let (mut producer, mut consumer) = RingBuffer::new(capacity).unwrap().split();
            let mut model = std::collections::VecDeque::new();

            for op in ops {
                match op {
                    Op::Push(v) => {
                        if producer.push(v).is_ok() {
                            model.push_back(v);
                        } else {
                            prop_assert_eq!(model.len(), capacity - 1);
                        }
                    }
                    Op::Pop => prop_assert_eq!(consumer.pop(), model.pop_front()),
                    Op::Reset => {
                        producer.reset();
                        model.clear();
                    }
                }

                prop_assert_eq!(consumer.free_slots() + consumer.len(), capacity - 1);
                prop_assert_eq!(consumer.is_empty(), model.is_empty());
                prop_assert_eq!(consumer.is_full(), model.len() == capacity - 1);
                prop_assert_eq!(consumer.snapshot(), model.iter().copied().collect::<Vec<_>>());
            }
        }
    }
}
