//! External encoder invocations (ffmpeg command lines)

use std::path::Path;
use std::process::{Child, Command, Stdio};

use crate::config::Config;
use crate::error::SinkError;

/// File name pattern of saved frames, as understood by the encoder
pub const FRAME_PATTERN: &str = "frame_%04d.png";

/// One encoder process invocation
#[derive(Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Short name used in logs and errors
    pub stage: &'static str,
    pub program: String,
    pub args: Vec<String>,
}

// The stream destination may carry a key; never print the arguments.
impl std::fmt::Debug for EncoderCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderCommand")
            .field("stage", &self.stage)
            .field("program", &self.program)
            .field("args", &format_args!("[{} args]", self.args.len()))
            .finish()
    }
}

impl EncoderCommand {
    /// Raw rgb24 frames on stdin, looping audio, live FLV output to `url`
    pub fn stream(program: &str, config: &Config, audio: &Path, url: &str) -> Self {
        Self::new(
            "stream",
            program,
            &[
                "-y",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-s",
                &format!("{}x{}", config.width, config.height),
                "-r",
                &config.fps.to_string(),
                "-i",
                "-",
                "-stream_loop",
                "-1",
                "-i",
                &audio.to_string_lossy(),
                "-shortest",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-preset",
                "veryfast",
                "-g",
                "60",
                "-c:a",
                "aac",
                "-b:a",
                "128k",
                "-f",
                "flv",
                url,
            ],
        )
    }

    /// Numbered PNG sequence to an H.264 video
    pub fn frames_to_video(program: &str, fps: u32, frames_dir: &Path, video: &Path) -> Self {
        Self::new(
            "video",
            program,
            &[
                "-y",
                "-r",
                &fps.to_string(),
                "-i",
                &frames_dir.join(FRAME_PATTERN).to_string_lossy(),
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                &video.to_string_lossy(),
            ],
        )
    }

    /// Lay a looping audio clip under the silent video
    ///
    /// The video pass has no audio stream, so the clip is mapped in as the
    /// only audio track and the video stream is copied untouched.
    pub fn mux_audio(program: &str, video: &Path, audio: &Path, output: &Path) -> Self {
        Self::new(
            "audio",
            program,
            &[
                "-y",
                "-i",
                &video.to_string_lossy(),
                "-stream_loop",
                "-1",
                "-i",
                &audio.to_string_lossy(),
                "-map",
                "0:v",
                "-map",
                "1:a",
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                "-shortest",
                &output.to_string_lossy(),
            ],
        )
    }

    fn new(stage: &'static str, program: &str, args: &[&str]) -> Self {
        Self {
            stage,
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Run to completion; a failing exit status is an error
    pub fn run(&self) -> Result<(), SinkError> {
        log::info!("Running encoder stage `{}`", self.stage);
        let status = self.command().status()?;
        if !status.success() {
            log::error!("Encoder stage `{}` failed: {}", self.stage, status);
            return Err(SinkError::Encoder {
                stage: self.stage,
                status,
            });
        }
        Ok(())
    }

    /// Start with a piped stdin for raw frames
    pub fn spawn_piped(&self) -> Result<Child, SinkError> {
        log::info!("Starting encoder stage `{}`", self.stage);
        Ok(self.command().stdin(Stdio::piped()).spawn()?)
    }
}
