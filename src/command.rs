//! Command Builder: maps destination, configuration and source format to
//! an ffmpeg invocation.
//!
//! Pure construction only; nothing here spawns the encoder. The encoder
//! reads raw interleaved little-endian f32 PCM from its standard input
//! and writes the encoded container to the destination path.

use crate::error::{ExportError, Result};
use crate::options::{BitDepth, Container, EncodingConfig};
use crate::source::SourceFormat;
use std::path::Path;
use std::process::{Command, Stdio};

/// Name of the external encoder binary, resolved via the search path.
pub const ENCODER_PROGRAM: &str = "ffmpeg";

/// A fully built encoder invocation: program plus argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    /// Program name or path.
    pub program: String,
    /// Arguments in order, destination path last.
    pub args: Vec<String>,
}

impl EncoderCommand {
    /// Turn the invocation into a spawnable [`std::process::Command`].
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Render the invocation as a single line for diagnostics.
    ///
    /// Only the final argument (the destination path) is wrapped in double
    /// quotes, matching how the command would be typed by hand. Paths that
    /// themselves contain double quotes are not escaped; this is a
    /// documented limitation of the rendering, not of the spawn path
    /// (arguments are passed as discrete argv elements, never through a
    /// shell).
    pub fn shell_string(&self) -> String {
        let mut line = self.program.clone();
        for (i, arg) in self.args.iter().enumerate() {
            line.push(' ');
            if i == self.args.len() - 1 {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Build the encoder command line for one export.
///
/// The container is resolved from `target`'s extension (case-insensitive,
/// defaulting to WAV). Configuration values are passed through without
/// validation; out-of-range settings surface as encoder failure.
///
/// Fails with [`ExportError::InvalidPath`] when the destination cannot be
/// represented as UTF-8, before any process is spawned.
pub fn build_command(
    target: &Path,
    config: &EncodingConfig,
    source: &SourceFormat,
) -> Result<EncoderCommand> {
    let target_str = target
        .to_str()
        .ok_or_else(|| ExportError::InvalidPath(target.to_path_buf()))?;

    let mut args: Vec<String> = vec![
        "-threads".into(),
        "0".into(),
        "-y".into(),
        // Input framing: raw interleaved little-endian f32 on stdin.
        "-f".into(),
        "f32le".into(),
        "-sample_fmt".into(),
        "flt".into(),
        "-ar".into(),
        source.sample_rate.to_string(),
        "-ac".into(),
        source.channels.to_string(),
        "-i".into(),
        "-".into(),
        // Output resample target.
        "-ar".into(),
        config.output_sample_rate.to_string(),
    ];

    match Container::from_path(target) {
        Container::Mp3 => {
            args.extend([
                "-c:a".into(),
                "libmp3lame".into(),
                "-b:a".into(),
                format!("{}k", config.mp3_bitrate),
            ]);
        }
        Container::Opus => {
            args.extend([
                "-c:a".into(),
                "libopus".into(),
                "-b:a".into(),
                format!("{}k", config.opus_bitrate),
            ]);
        }
        Container::Flac => {
            args.extend([
                "-c:a".into(),
                "flac".into(),
                "-compression_level".into(),
                config.flac_compression_level.to_string(),
            ]);
        }
        Container::Vorbis => {
            args.extend([
                "-c:a".into(),
                "libvorbis".into(),
                "-b:a".into(),
                format!("{}k", config.ogg_bitrate),
            ]);
        }
        Container::Wav => {
            let codec = match config.wav_bit_depth {
                BitDepth::Int16 => "pcm_s16le",
                BitDepth::Int24 => "pcm_s24le",
                BitDepth::Float32 => "pcm_f32le",
            };
            args.extend(["-c:a".into(), codec.into()]);
        }
    }

    args.push(target_str.to_string());

    Ok(EncoderCommand {
        program: ENCODER_PROGRAM.into(),
        args,
    })
}

/// Check whether the encoder binary is reachable on the search path.
pub fn encoder_available() -> bool {
    Command::new(ENCODER_PROGRAM)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
