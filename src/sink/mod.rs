//! Frame sinks
//!
//! A sink receives every rendered frame in order and is told when a round
//! ends. `emit` may block; that is the only pacing the round loop gets.
//! Any error is terminal for the session.

pub mod channel;
pub mod encoder;
pub mod file;
pub mod stream;

pub use channel::ChannelSink;
pub use encoder::EncoderCommand;
pub use file::{FileSink, OneShotEncode};
pub use stream::StreamSink;

use image::RgbImage;

use crate::engine::RoundReport;
use crate::error::SinkError;

pub trait FrameSink {
    /// Accept frame `index` (global across rounds). May block.
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError>;

    /// A round finished and its banner frames have been emitted
    fn end_round(&mut self, _report: &RoundReport) -> Result<(), SinkError> {
        Ok(())
    }

    /// No more frames will follow
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
        (**self).emit(index, frame)
    }

    fn end_round(&mut self, report: &RoundReport) -> Result<(), SinkError> {
        (**self).end_round(report)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Discards frames (headless runs)
#[derive(Debug, Default)]
pub struct NullSink {
    pub frames: u64,
}

impl FrameSink for NullSink {
    fn emit(&mut self, _index: u64, _frame: &RgbImage) -> Result<(), SinkError> {
        self.frames += 1;
        Ok(())
    }
}

/// Keeps frames and round reports in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<(u64, RgbImage)>,
    pub rounds: Vec<RoundReport>,
    pub finished: bool,
    /// Simulated consumer exit after this many frames
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `frames` frames, then report the consumer as gone
    pub fn failing_after(frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::default()
        }
    }
}

impl FrameSink for MemorySink {
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
        if self.fail_after.is_some_and(|n| self.frames.len() >= n) {
            return Err(SinkError::unavailable("memory sink closed"));
        }
        self.frames.push((index, frame.clone()));
        Ok(())
    }

    fn end_round(&mut self, report: &RoundReport) -> Result<(), SinkError> {
        self.rounds.push(report.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_memory_sink_fails_after_limit() {
        let mut sink = MemorySink::failing_after(2);
        let frame = RgbImage::from_pixel(2, 2, Rgb([1, 2, 3]));
        assert!(sink.emit(0, &frame).is_ok());
        assert!(sink.emit(1, &frame).is_ok());
        let err = sink.emit(2, &frame).unwrap_err();
        assert!(err.is_unavailable());
        assert_eq!(sink.frames.len(), 2);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut sink: Box<dyn FrameSink> = Box::new(NullSink::default());
        let frame = RgbImage::new(1, 1);
        sink.emit(0, &frame).unwrap();
        sink.finish().unwrap();
    }
}
