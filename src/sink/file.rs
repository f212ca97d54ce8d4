//! One-shot sink: numbered PNG frames, encoded once at the end

use std::path::{Path, PathBuf};

use image::RgbImage;

use super::FrameSink;
use super::encoder::EncoderCommand;
use crate::error::SinkError;

/// Final encode settings for a one-shot run
#[derive(Debug, Clone)]
pub struct OneShotEncode {
    pub program: String,
    pub fps: u32,
    /// Looping audio mixed under the video
    pub audio: PathBuf,
    /// Intermediate silent video
    pub video: PathBuf,
    /// Finished artifact
    pub output: PathBuf,
}

impl OneShotEncode {
    /// The two encoder passes, in order
    pub fn commands(&self, frames_dir: &Path) -> [EncoderCommand; 2] {
        [
            EncoderCommand::frames_to_video(&self.program, self.fps, frames_dir, &self.video),
            EncoderCommand::mux_audio(&self.program, &self.video, &self.audio, &self.output),
        ]
    }
}

/// Writes `frame_NNNN.png` synchronously per frame
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
    frames: u64,
    encode: Option<OneShotEncode>,
}

impl FileSink {
    /// Create (or reuse) the frames directory and drop stale frames from an earlier run
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        let mut stale = 0;
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.file_name().and_then(|n| n.to_str()).is_some_and(is_frame_file) {
                std::fs::remove_file(&path)?;
                stale += 1;
            }
        }
        if stale > 0 {
            log::info!("Removed {} stale frames from {}", stale, dir.display());
        }

        Ok(Self {
            dir,
            frames: 0,
            encode: None,
        })
    }

    /// Encode the sequence into a finished video on `finish`
    pub fn with_encoder(mut self, encode: OneShotEncode) -> Self {
        self.encode = Some(encode);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:04}.png"))
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }
}

impl FrameSink for FileSink {
    fn emit(&mut self, index: u64, frame: &RgbImage) -> Result<(), SinkError> {
        frame
            .save(self.frame_path(index))
            .map_err(|source| SinkError::Frame { index, source })?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        let Some(encode) = &self.encode else {
            log::info!("Saved {} frames to {}", self.frames, self.dir.display());
            return Ok(());
        };
        for command in encode.commands(&self.dir) {
            command.run()?;
        }
        log::info!("Encoded {} frames into {}", self.frames, encode.output.display());
        Ok(())
    }
}

/// `frame_` followed by digits and `.png`
fn is_frame_file(name: &str) -> bool {
    name.strip_prefix("frame_")
        .and_then(|rest| rest.strip_suffix(".png"))
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_frame_file() {
        assert!(is_frame_file("frame_0001.png"));
        assert!(is_frame_file("frame_12345.png"));
        assert!(!is_frame_file("frame_.png"));
        assert!(!is_frame_file("frame_01a.png"));
        assert!(!is_frame_file("flag.png"));
    }

    #[test]
    fn test_frame_path_is_zero_padded() {
        let sink = FileSink {
            dir: PathBuf::from("frames"),
            frames: 0,
            encode: None,
        };
        assert_eq!(sink.frame_path(7), PathBuf::from("frames").join("frame_0007.png"));
        assert_eq!(sink.frame_path(12345), PathBuf::from("frames").join("frame_12345.png"));
    }
}
