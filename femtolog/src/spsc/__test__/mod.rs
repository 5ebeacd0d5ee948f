#[cfg(test)]
mod __test__ {

  use crate::spsc::{SpscQueue, SpscStatus};
  use std::sync::Arc;
  use std::thread;

  #[test]
  fn test_uninitialized_queue() {
    let queue = SpscQueue::new();
    let mut out = [0u8; 4];
    assert_eq!(queue.enqueue_bytes(b"data"), SpscStatus::Uninitialized);
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Uninitialized);
    assert_eq!(queue.peek_bytes(&mut out), SpscStatus::Uninitialized);
    assert_eq!(queue.capacity(), 0);
  }

  #[test]
  fn test_reserve_rounds_to_power_of_two() {
    for (requested, expected) in [(1, 2), (2, 2), (3, 4), (64, 64), (100, 128), (4096, 4096)] {
      let queue = SpscQueue::with_capacity(requested);
      assert_eq!(queue.capacity(), expected, "requested {requested}");
      assert!(queue.is_empty());
      assert_eq!(queue.available_space(), expected);
    }
  }

  #[test]
  fn test_zero_size_transfers() {
    let queue = SpscQueue::with_capacity(64);
    assert_eq!(queue.enqueue_bytes(b""), SpscStatus::SizeIsZero);
    assert_eq!(queue.dequeue_bytes(&mut []), SpscStatus::SizeIsZero);
    assert_eq!(queue.peek_bytes(&mut []), SpscStatus::SizeIsZero);
  }

  #[test]
  fn test_enqueue_dequeue_round_trip() {
    let queue = SpscQueue::with_capacity(64);
    assert_eq!(queue.enqueue_bytes(b"hello ring"), SpscStatus::Ok);
    assert_eq!(queue.size(), 10);

    let mut out = [0u8; 10];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
    assert_eq!(&out, b"hello ring");
    assert!(queue.is_empty());
  }

  #[test]
  fn test_overflow() {
    let queue = SpscQueue::with_capacity(16);
    assert_eq!(queue.enqueue_bytes(&[1u8; 16]), SpscStatus::Ok);
    assert_eq!(queue.enqueue_bytes(&[2u8; 1]), SpscStatus::Overflow);

    // Consuming frees exactly the bytes dequeued.
    let mut out = [0u8; 8];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
    assert_eq!(queue.enqueue_bytes(&[3u8; 8]), SpscStatus::Ok);
    assert_eq!(queue.enqueue_bytes(&[4u8; 1]), SpscStatus::Overflow);
  }

  #[test]
  fn test_underflow() {
    let queue = SpscQueue::with_capacity(16);
    let mut out = [0u8; 4];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Underflow);

    queue.enqueue_bytes(&[9u8; 2]);
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Underflow);
    assert_eq!(queue.size(), 2);
  }

  #[test]
  fn test_peek_does_not_advance() {
    let queue = SpscQueue::with_capacity(32);
    queue.enqueue_bytes(b"abcd");

    let mut peeked = [0u8; 4];
    assert_eq!(queue.peek_bytes(&mut peeked), SpscStatus::Ok);
    assert_eq!(&peeked, b"abcd");
    assert_eq!(queue.size(), 4);

    let mut out = [0u8; 4];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
    assert_eq!(&out, b"abcd");
  }

  #[test]
  fn test_wraparound_interleaved() {
    // 10 records of 12 bytes through a 64-byte ring, dequeued in lockstep;
    // every record wraps eventually and order is preserved.
    let queue = SpscQueue::with_capacity(64);
    for i in 0..10u8 {
      let record = [i; 12];
      assert_eq!(queue.enqueue_bytes(&record), SpscStatus::Ok);

      let mut out = [0xffu8; 12];
      assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
      assert_eq!(out, record);
    }
    assert!(queue.is_empty());
  }

  #[test]
  fn test_wraparound_split_copy() {
    // Force a record to straddle the physical end of the buffer.
    let queue = SpscQueue::with_capacity(16);
    queue.enqueue_bytes(&[0u8; 12]);
    let mut sink = [0u8; 12];
    queue.dequeue_bytes(&mut sink);

    // Next record starts at offset 12 and wraps after 4 bytes.
    let record: Vec<u8> = (0..10).collect();
    assert_eq!(queue.enqueue_bytes(&record), SpscStatus::Ok);
    let mut out = [0u8; 10];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Ok);
    assert_eq!(&out[..], &record[..]);
  }

  #[test]
  fn test_bulk_all_or_none() {
    let queue = SpscQueue::with_capacity(16);
    let chunks: [&[u8]; 2] = [&[1; 8], &[2; 8]];
    assert_eq!(queue.enqueue_bulk(&chunks), SpscStatus::Ok);

    // Batch exceeding the free space transfers nothing.
    let too_big: [&[u8]; 2] = [&[3; 1], &[4; 1]];
    assert_eq!(queue.enqueue_bulk(&too_big), SpscStatus::Overflow);
    assert_eq!(queue.size(), 16);

    let mut first = [0u8; 8];
    let mut second = [0u8; 8];
    {
      let mut outs: [&mut [u8]; 2] = [&mut first, &mut second];
      assert_eq!(queue.dequeue_bulk(&mut outs), SpscStatus::Ok);
    }
    assert_eq!(first, [1; 8]);
    assert_eq!(second, [2; 8]);

    let mut more = [0u8; 1];
    let mut outs: [&mut [u8]; 1] = [&mut more];
    assert_eq!(queue.dequeue_bulk(&mut outs), SpscStatus::Underflow);
  }

  #[test]
  fn test_cross_thread_fifo() {
    let queue = Arc::new(SpscQueue::with_capacity(1024));
    let record_count = 10_000u32;

    let producer = {
      let queue = Arc::clone(&queue);
      thread::spawn(move || {
        for i in 0..record_count {
          let record = i.to_ne_bytes();
          loop {
            if queue.enqueue_bytes(&record) == SpscStatus::Ok {
              break;
            }
            std::hint::spin_loop();
          }
        }
      })
    };

    let mut received = 0u32;
    while received < record_count {
      let mut out = [0u8; 4];
      if queue.dequeue_bytes(&mut out) == SpscStatus::Ok {
        // FIFO per producer: values arrive in exactly the order enqueued.
        assert_eq!(u32::from_ne_bytes(out), received);
        received += 1;
      } else {
        std::hint::spin_loop();
      }
    }

    producer.join().unwrap();
    assert!(queue.is_empty());
  }

  #[test]
  fn test_reserve_resets_state() {
    let mut queue = SpscQueue::with_capacity(32);
    queue.enqueue_bytes(b"stale");
    queue.reserve(64);
    assert!(queue.is_empty());
    assert_eq!(queue.capacity(), 64);

    let mut out = [0u8; 5];
    assert_eq!(queue.dequeue_bytes(&mut out), SpscStatus::Underflow);
  }
}
