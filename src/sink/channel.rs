//! Bounded hand-off between the round loop and a consumer thread
//!
//! The producer's `emit` suspends once `capacity` frames are queued (or,
//! with capacity 0, until the consumer takes the frame). The consumer thread
//! owns the wrapped sink; when it fails the channel closes and the producer
//! sees the consumer's error on its next send.

use std::thread::JoinHandle;

use crossbeam::channel::{Receiver, Sender, bounded};
use image::RgbImage;

use super::FrameSink;
use crate::engine::RoundReport;
use crate::error::SinkError;

enum Message {
    Frame(u64, RgbImage),
    RoundEnd(RoundReport),
}

pub struct ChannelSink {
    tx: Option<Sender<Message>>,
    worker: Option<JoinHandle<Result<(), SinkError>>>,
}

impl ChannelSink {
    /// Move `inner` onto a consumer thread behind a channel of `capacity` frames
    pub fn spawn<S>(inner: S, capacity: usize) -> Result<Self, SinkError>
    where
        S: FrameSink + Send + 'static,
    {
        let (tx, rx) = bounded(capacity);
        let worker = std::thread::Builder::new()
            .name("frame-sink".to_string())
            .spawn(move || consume(inner, rx))?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    fn send(&mut self, message: Message) -> Result<(), SinkError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| SinkError::unavailable("channel already finished"))?;
        if tx.send(message).is_err() {
            self.tx = None;
            return Err(self.join().err().unwrap_or_else(|| {
                SinkError::unavailable("consumer stopped receiving frames")
            }));
        }
        Ok(())
    }

    fn join(&mut self) -> Result<(), SinkError> {
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| SinkError::unavailable("consumer thread panicked"))?,
            None => Ok(()),
        }
    }
}

fn consume<S: FrameSink>(mut inner: S, rx: Receiver<Message>) -> Result<(), SinkError> {
    for message in rx {
        match message {
            Message::Frame(index, frame) => inner.emit(index, &frame)?,
            Message::RoundEnd(report) => inner.end_round(&report)?,
        }
    }
    inner.finish()
}

impl FrameSink for ChannelSink {
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
        self.send(Message::Frame(index, frame.clone()))
    }

    fn end_round(&mut self, report: &RoundReport) -> Result<(), SinkError> {
        self.send(Message::RoundEnd(report.clone()))
    }

    /// Drain the queue, finish the inner sink and surface its result
    fn finish(&mut self) -> Result<(), SinkError> {
        self.tx = None;
        self.join()
    }
}

impl Drop for ChannelSink {
    fn drop(&mut self) {
        self.tx = None;
        if let Err(e) = self.join() {
            log::warn!("Frame consumer shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;
    use image::Rgb;
    use std::sync::{Arc, Mutex};

    /// Forwards into a shared memory sink so the test can inspect it afterwards
    struct Shared(Arc<Mutex<MemorySink>>);

    impl FrameSink for Shared {
        fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
            self.0.lock().unwrap().emit(index, frame)
        }

        fn finish(&mut self) -> Result<(), SinkError> {
            self.0.lock().unwrap().finish()
        }
    }

    fn frame(v: u8) -> RgbImage {
        RgbImage::from_pixel(2, 2, Rgb([v, v, v]))
    }

    #[test]
    fn test_frames_arrive_in_order() {
        let shared = Arc::new(Mutex::new(MemorySink::new()));
        let mut sink = ChannelSink::spawn(Shared(shared.clone()), 0).unwrap();
        for i in 0..5u8 {
            sink.emit(i as u64, &frame(i)).unwrap();
        }
        sink.finish().unwrap();

        let inner = shared.lock().unwrap();
        assert!(inner.finished);
        let indices: Vec<u64> = inner.frames.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(*inner.frames[3].1.get_pixel(0, 0), Rgb([3, 3, 3]));
    }

    /// Holds each frame until the gate opens (or its sender is dropped)
    struct Gated {
        gate: Receiver<()>,
        seen: Arc<Mutex<Vec<u64>>>,
    }

    impl FrameSink for Gated {
        fn emit(&mut self, index: u64, _frame: &RgbImage) -> Result<(), SinkError> {
            let _ = self.gate.recv();
            self.seen.lock().unwrap().push(index);
            Ok(())
        }
    }

    #[test]
    fn test_queue_fills_while_consumer_is_busy() {
        let (open, gate) = bounded::<()>(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut sink = ChannelSink::spawn(
            Gated {
                gate,
                seen: seen.clone(),
            },
            1,
        )
        .unwrap();

        sink.emit(0, &frame(0)).unwrap();
        sink.emit(1, &frame(1)).unwrap();
        // Consumer is stuck on frame 0 and frame 1 occupies the only slot
        let tx = sink.tx.as_ref().unwrap();
        assert!(tx.is_full());
        assert!(seen.lock().unwrap().is_empty());

        drop(open);
        sink.finish().unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_consumer_failure_reaches_producer() {
        let mut sink = ChannelSink::spawn(MemorySink::failing_after(2), 1).unwrap();
        let mut result = Ok(());
        for i in 0..10 {
            result = sink.emit(i, &frame(0));
            if result.is_err() {
                break;
            }
        }
        let err = result.unwrap_err();
        assert!(err.is_unavailable());
        // Session is over; later sends fail too
        assert!(sink.emit(99, &frame(0)).is_err());
    }
}
