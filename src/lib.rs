//! # audioenc
//!
//! FFmpeg-backed audio export. The crate does no encoding itself; it
//! builds an `ffmpeg` invocation from a small set of user-chosen
//! parameters and streams raw interleaved little-endian f32 PCM into the
//! spawned encoder's standard input in bounded chunks, honoring
//! cooperative cancellation.
//!
//! Two cooperating pieces:
//! - **Command Builder** ([`build_command`]): pure mapping from
//!   (destination path, [`EncodingConfig`], [`SourceFormat`]) to an
//!   encoder invocation. The container is chosen by file extension;
//!   anything unrecognized becomes PCM WAV.
//! - **Streaming Writer** ([`run_export`], [`ExportSession`]): pulls
//!   fixed-size chunks from a [`SampleSource`] and forwards them to the
//!   encoder pipe, polling an abort callback at every chunk boundary.
//!
//! ```no_run
//! use audioenc::{export_to_file, BufferSource, EncodingConfig, SourceFormat};
//!
//! let samples = vec![0.0f32; 48000 * 2];
//! let mut source = BufferSource::new(samples, 2);
//! let format = SourceFormat::new(2, 48000, source.frames());
//!
//! export_to_file(
//!     "output.flac",
//!     &EncodingConfig::default(),
//!     &format,
//!     &mut source,
//!     || false,
//! )?;
//! # Ok::<(), audioenc::ExportError>(())
//! ```

pub mod command;
pub mod error;
pub mod options;
pub mod preset;
pub mod session;
pub mod source;

pub use command::{build_command, encoder_available, EncoderCommand, ENCODER_PROGRAM};
pub use error::{ExportError, Result};
pub use options::{BitDepth, Container, EncodingConfig, BITRATES_KBPS, FILE_TYPES, SAMPLE_RATES};
pub use preset::{PresetStore, DEFAULT_PRESET};
pub use session::{
    run_export, run_export_with_progress, stream_frames, ExportSession, CHUNK_FRAMES,
};
pub use source::{BufferSource, SampleSource, SourceFormat};

use std::path::Path;

/// Export a source to a file, choosing the container from the extension.
///
/// Convenience wrapper: builds the command for `path` and runs one
/// blocking export session against it. `is_aborted` is polled once per
/// chunk; returning `true` cancels the export cleanly.
pub fn export_to_file(
    path: impl AsRef<Path>,
    config: &EncodingConfig,
    format: &SourceFormat,
    source: &mut dyn SampleSource,
    is_aborted: impl FnMut() -> bool,
) -> Result<()> {
    let command = build_command(path.as_ref(), config, format)?;
    run_export(&command, format, source, is_aborted)
}
