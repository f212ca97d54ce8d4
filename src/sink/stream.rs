//! Streaming sink: raw rgb24 frames into an encoder's stdin
//!
//! The write blocks while the encoder's pipe buffer is full, which paces the
//! simulation to the encoder. A closed pipe or exited encoder ends the session.

use std::io::Write;
use std::process::Child;

use image::RgbImage;

use super::FrameSink;
use super::encoder::EncoderCommand;
use crate::error::SinkError;

pub struct StreamSink {
    writer: Option<Box<dyn Write + Send>>,
    child: Option<Child>,
    frame_bytes: usize,
}

impl StreamSink {
    /// Start the encoder process and stream into its stdin
    pub fn spawn(command: &EncoderCommand, frame_bytes: usize) -> Result<Self, SinkError> {
        let mut child = command.spawn_piped()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SinkError::unavailable("encoder stdin not captured"))?;
        Ok(Self {
            writer: Some(Box::new(stdin)),
            child: Some(child),
            frame_bytes,
        })
    }

    /// Stream into an arbitrary byte sink (no process to supervise)
    pub fn from_writer(writer: impl Write + Send + 'static, frame_bytes: usize) -> Self {
        Self {
            writer: Some(Box::new(writer)),
            child: None,
            frame_bytes,
        }
    }

    fn check_child(&mut self) -> Result<(), SinkError> {
        if let Some(child) = self.child.as_mut() {
            if let Some(status) = child.try_wait()? {
                return Err(SinkError::unavailable(format!("encoder exited with {status}")));
            }
        }
        Ok(())
    }

    /// Close the pipe and reap the encoder
    fn close(&mut self) -> Result<(), SinkError> {
        if let Some(mut writer) = self.writer.take() {
            // Encoder may already be gone; its status below is what matters
            let _ = writer.flush();
        }
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(SinkError::Encoder {
                    stage: "stream",
                    status,
                });
            }
        }
        Ok(())
    }
}

impl FrameSink for StreamSink {
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
        let bytes = frame.as_raw();
        if bytes.len() != self.frame_bytes {
            return Err(SinkError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "frame {} is {} bytes, stream expects {}",
                    index,
                    bytes.len(),
                    self.frame_bytes
                ),
            )));
        }

        self.check_child()?;
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| SinkError::unavailable("stream already closed"))?;
        writer.write_all(bytes).map_err(|e| {
            log::error!("Stream write failed at frame {}: {}", index, e);
            SinkError::unavailable(format!("encoder pipe closed: {e}"))
        })
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.close()
    }
}

impl Drop for StreamSink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("Stream encoder shutdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::sync::{Arc, Mutex};

    /// Accepts `limit` bytes, then behaves like a broken pipe
    struct LimitedPipe {
        buf: Arc<Mutex<Vec<u8>>>,
        limit: usize,
    }

    impl Write for LimitedPipe {
        fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
            let mut buf = self.buf.lock().unwrap();
            if buf.len() >= self.limit {
                return Err(std::io::ErrorKind::BrokenPipe.into());
            }
            let n = data.len().min(self.limit - buf.len());
            buf.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn frame() -> RgbImage {
        RgbImage::from_pixel(4, 2, Rgb([1, 2, 3]))
    }

    #[test]
    fn test_writes_raw_rgb24() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let pipe = LimitedPipe {
            buf: buf.clone(),
            limit: usize::MAX,
        };
        let mut sink = StreamSink::from_writer(pipe, 24);
        sink.emit(0, &frame()).unwrap();
        sink.emit(1, &frame()).unwrap();
        sink.finish().unwrap();

        let bytes = buf.lock().unwrap();
        assert_eq!(bytes.len(), 48);
        assert_eq!(&bytes[..3], &[1, 2, 3]);
    }

    #[test]
    fn test_broken_pipe_is_unavailable() {
        let pipe = LimitedPipe {
            buf: Arc::new(Mutex::new(Vec::new())),
            limit: 30,
        };
        let mut sink = StreamSink::from_writer(pipe, 24);
        sink.emit(0, &frame()).unwrap();
        let err = sink.emit(1, &frame()).unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_rejects_wrong_frame_size() {
        let mut sink = StreamSink::from_writer(std::io::sink(), 100);
        assert!(matches!(sink.emit(0, &frame()), Err(SinkError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_exited_encoder_is_unavailable() {
        let command = EncoderCommand {
            stage: "stream",
            program: "true".to_string(),
            args: Vec::new(),
        };
        let mut sink = StreamSink::spawn(&command, 24).unwrap();
        // Give `true` time to exit
        if let Some(child) = sink.child.as_mut() {
            child.wait().unwrap();
        }
        let err = sink.emit(0, &frame()).unwrap_err();
        assert!(err.is_unavailable());
    }
}
