//! Flag Royale command-line entry point
//!
//! `oneshot` renders a single round to numbered frames and encodes a video.
//! `stream` pipes round after round into a live encoder until it goes away.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use flag_royale::assets::{FlagSprite, load_flags};
use flag_royale::error::ConfigError;
use flag_royale::renderer::banner_text;
use flag_royale::sink::{
    ChannelSink, EncoderCommand, FileSink, FrameSink, NullSink, OneShotEncode, StreamSink,
};
use flag_royale::{Config, Engine, Mode, Result, RoundReport};

#[derive(Parser, Debug)]
#[command(name = "flag-royale", version)]
#[command(about = "Last flag standing in a circular arena", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play one round, save its frames and encode a video with audio
    Oneshot {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory for the numbered PNG frames
        #[arg(long, default_value = "frames")]
        frames_dir: PathBuf,

        /// Intermediate silent video
        #[arg(long, default_value = "video.mp4")]
        video: PathBuf,

        /// Finished video
        #[arg(short, long, default_value = "final.mp4")]
        output: PathBuf,

        /// Keep the frames but skip both encoder passes
        #[arg(long)]
        no_encode: bool,
    },

    /// Stream rounds back to back to a live endpoint
    Stream {
        #[command(flatten)]
        common: CommonArgs,

        /// Live destination, including any stream key. Never logged.
        #[arg(long, env = "FLAG_ROYALE_STREAM_URL", hide_env_values = true)]
        stream_url: Option<String>,

        /// Stop after this many rounds (default: run until the encoder exits)
        #[arg(long)]
        rounds: Option<u32>,

        /// Frames queued between the round loop and the encoder
        #[arg(long, default_value = "60")]
        buffer: usize,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Directory of flag PNGs
    #[arg(long, default_value = "flags")]
    flags_dir: PathBuf,

    /// Audio clip looped under the video
    #[arg(long, default_value = "hit.wav")]
    audio: PathBuf,

    /// JSON config file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed (random when absent)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Tick cap for one-shot rounds
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Encoder executable
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: String,

    /// Simulate and render but discard every frame
    #[arg(long)]
    headless: bool,
}

impl CommonArgs {
    /// Defaults, then the config file, then command-line overrides
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        config.validate()?;
        Ok(config)
    }

    fn flags(&self, config: &Config) -> Result<Vec<FlagSprite>> {
        load_flags(&self.flags_dir, config.token_size)
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Oneshot {
            common,
            frames_dir,
            video,
            output,
            no_encode,
        } => {
            let config = common.config()?;
            let flags = common.flags(&config)?;

            let report = if common.headless {
                play(config, flags, NullSink::default(), Mode::OneShot, None)?
            } else {
                let mut sink = FileSink::new(frames_dir)?;
                if !no_encode {
                    sink = sink.with_encoder(OneShotEncode {
                        program: common.ffmpeg.clone(),
                        fps: config.fps,
                        audio: common.audio.clone(),
                        video,
                        output,
                    });
                }
                play(config, flags, sink, Mode::OneShot, None)?
            };

            if let Some(report) = report {
                println!("{}", banner_text(report.winner.as_deref()));
            }
        }

        Command::Stream {
            common,
            stream_url,
            rounds,
            buffer,
        } => {
            let config = common.config()?;

            if common.headless {
                let flags = common.flags(&config)?;
                play(config, flags, NullSink::default(), Mode::Continuous, rounds)?;
                return Ok(());
            }

            let url = stream_url
                .filter(|url| !url.trim().is_empty())
                .ok_or(ConfigError::MissingStreamUrl)?;
            let flags = common.flags(&config)?;

            let command = EncoderCommand::stream(&common.ffmpeg, &config, &common.audio, &url);
            let stream = StreamSink::spawn(&command, config.frame_bytes())?;
            let sink = ChannelSink::spawn(stream, buffer)?;
            play(config, flags, sink, Mode::Continuous, rounds)?;
        }
    }
    Ok(())
}

fn play<S: FrameSink>(
    config: Config,
    flags: Vec<FlagSprite>,
    sink: S,
    mode: Mode,
    rounds: Option<u32>,
) -> Result<Option<RoundReport>> {
    let mut engine = Engine::new(config, flags, sink, mode)?.on_round_end(|report| {
        log::info!(
            "Round {} over: {} eliminations, {} hits{}",
            report.round,
            report.eliminations.len(),
            report.hits.len(),
            if report.timed_out { " (tick cap)" } else { "" }
        );
    });
    log::info!("Session seed {}", engine.seed());
    engine.run(rounds)
}
