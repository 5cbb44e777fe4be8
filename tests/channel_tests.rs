//! Threaded channel tests: the producer and consumer run as independent
//! threads, the way a network callback and a decoder driver do in a real
//! playback session.

use chunk_channel::{ChannelError, ChannelState, ChunkChannel, ReadOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Deterministic pseudo-random sequence for chunk/slice sizing.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn in_range(&mut self, min: usize, max: usize) -> usize {
        min + (self.next() as usize) % (max - min + 1)
    }
}

fn drain_all(channel: &ChunkChannel, slice_len: usize) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        match channel.read(slice_len).unwrap() {
            ReadOutcome::Data(bytes) => out.extend_from_slice(&bytes),
            ReadOutcome::EndOfStream => return out,
        }
    }
}

#[test]
fn test_clean_finish_with_oversized_write() {
    // A 2000-byte write into a 1024-byte channel only completes as the
    // consumer frees space.
    let channel = ChunkChannel::open(1024).unwrap();
    let producer = channel.clone();

    let writer = thread::spawn(move || {
        let payload = vec![0x00u8; 2000];
        producer.write(&payload).unwrap();
        producer.signal_complete();
    });

    let received = drain_all(&channel, 256);
    writer.join().unwrap();

    assert_eq!(received.len(), 2000);
    assert!(received.iter().all(|&b| b == 0x00));

    let stats = channel.stats();
    assert_eq!(stats.bytes_written, 2000);
    assert_eq!(stats.bytes_read, 2000);
    assert_eq!(stats.backlog_bytes, 0);
    assert_eq!(stats.state, ChannelState::Closed);
}

#[test]
fn test_order_preserved_under_random_slicing() {
    // Total volume is far larger than capacity, so the producer is
    // repeatedly throttled; the consumer must still reconstruct the exact
    // byte sequence.
    const CAPACITY: usize = 1024;
    let channel = ChunkChannel::open(CAPACITY).unwrap();
    let producer = channel.clone();

    let mut rng = Lcg(0x5EED);
    let mut expected = Vec::new();
    let mut chunks = Vec::new();
    let mut counter = 0u8;
    for _ in 0..200 {
        let len = rng.in_range(1, 2048);
        let chunk: Vec<u8> = (0..len)
            .map(|_| {
                counter = counter.wrapping_add(1);
                counter
            })
            .collect();
        expected.extend_from_slice(&chunk);
        chunks.push(chunk);
    }

    let writer = thread::spawn(move || {
        for chunk in &chunks {
            producer.write(chunk).unwrap();
        }
        producer.signal_complete();
    });

    let consumer = channel.clone();
    let reader = thread::spawn(move || {
        let mut rng = Lcg(0xFACE);
        let mut out = Vec::new();
        loop {
            // The backpressure bound must hold at every observation point.
            assert!(consumer.stats().backlog_bytes <= CAPACITY);
            match consumer.read(rng.in_range(1, 512)).unwrap() {
                ReadOutcome::Data(bytes) => out.extend_from_slice(&bytes),
                ReadOutcome::EndOfStream => return out,
            }
        }
    });

    writer.join().unwrap();
    let received = reader.join().unwrap();
    assert_eq!(received, expected);
}

#[test]
fn test_full_buffer_blocks_writer_until_read() {
    let channel = ChunkChannel::open(64).unwrap();
    channel.write(&[1u8; 64]).unwrap();

    let producer = channel.clone();
    let finished = Arc::new(AtomicBool::new(false));
    let finished_flag = finished.clone();

    let writer = thread::spawn(move || {
        producer.write(&[2u8; 16]).unwrap();
        finished_flag.store(true, Ordering::SeqCst);
    });

    // The writer has nowhere to put its chunk yet.
    thread::sleep(Duration::from_millis(100));
    assert!(!finished.load(Ordering::SeqCst));
    assert_eq!(channel.stats().backlog_bytes, 64);

    // Freeing space releases it.
    let bytes = channel.read(32).unwrap().into_data().unwrap();
    assert_eq!(bytes.len(), 32);
    writer.join().unwrap();
    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(channel.stats().bytes_written, 80);
}

#[test]
fn test_close_wakes_blocked_reader() {
    let channel = ChunkChannel::open(64).unwrap();

    let consumer = channel.clone();
    let reader = thread::spawn(move || consumer.read(16));

    thread::sleep(Duration::from_millis(50));
    channel.close();

    assert_eq!(reader.join().unwrap(), Err(ChannelError::Aborted));
}

#[test]
fn test_close_wakes_blocked_writer() {
    let channel = ChunkChannel::open(32).unwrap();
    channel.write(&[0u8; 32]).unwrap();

    let producer = channel.clone();
    let writer = thread::spawn(move || producer.write(&[1u8; 8]));

    thread::sleep(Duration::from_millis(50));
    channel.close();

    assert_eq!(writer.join().unwrap(), Err(ChannelError::Aborted));
}

#[test]
fn test_signal_complete_wakes_blocked_reader_with_end_of_stream() {
    let channel = ChunkChannel::open(64).unwrap();

    let consumer = channel.clone();
    let reader = thread::spawn(move || consumer.read(16));

    thread::sleep(Duration::from_millis(50));
    channel.signal_complete();

    assert!(reader.join().unwrap().unwrap().is_end_of_stream());
    assert_eq!(channel.state(), ChannelState::Closed);
}

#[test]
fn test_abort_with_buffered_data_is_never_end_of_stream() {
    let channel = ChunkChannel::open(64).unwrap();
    channel.write(&[0xFFu8; 32]).unwrap();

    let consumer = channel.clone();
    let reader = thread::spawn(move || {
        // Both a read racing the close and reads issued afterwards must
        // report the abort.
        let first = consumer.read(16);
        let second = consumer.read(16);
        (first, second)
    });

    channel.close();
    let (first, second) = reader.join().unwrap();

    for outcome in [first, second] {
        match outcome {
            Ok(ReadOutcome::Data(_)) => {} // close may have lost the race once
            Ok(ReadOutcome::EndOfStream) => panic!("abort reported as clean finish"),
            Err(err) => assert!(err.is_abort()),
        }
    }
    assert_eq!(channel.read(16), Err(ChannelError::Aborted));
}

#[test]
fn test_io_read_drives_channel_across_threads() {
    use std::io::Read;

    let channel = ChunkChannel::open(128).unwrap();
    let producer = channel.clone();

    let writer = thread::spawn(move || {
        for i in 0u8..8 {
            producer.write(&[i; 100]).unwrap();
        }
        producer.signal_complete();
    });

    let mut reader = channel.clone();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    writer.join().unwrap();

    assert_eq!(out.len(), 800);
    for (i, window) in out.chunks(100).enumerate() {
        assert!(window.iter().all(|&b| b == i as u8));
    }
}

#[test]
fn test_stats_readable_while_both_sides_run() {
    let channel = ChunkChannel::open(256).unwrap();
    let producer = channel.clone();
    let consumer = channel.clone();

    let writer = thread::spawn(move || {
        for _ in 0..50 {
            producer.write(&[7u8; 64]).unwrap();
        }
        producer.signal_complete();
    });

    let reader = thread::spawn(move || drain_all(&consumer, 48).len());

    // Snapshots from a third thread must always be coherent.
    for _ in 0..20 {
        let stats = channel.stats();
        assert!(stats.backlog_bytes <= 256);
        assert!(stats.bytes_written >= stats.bytes_read);
        assert_eq!(
            stats.bytes_written - stats.bytes_read,
            stats.backlog_bytes as u64
        );
        thread::sleep(Duration::from_millis(1));
    }

    writer.join().unwrap();
    assert_eq!(reader.join().unwrap(), 3200);
    assert_eq!(channel.stats().bytes_read, 3200);
}
