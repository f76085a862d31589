//! Streaming Writer: drives one export session against a spawned encoder.
//!
//! The session owns the child process and its input pipe for its whole
//! lifetime. The pipe is closed exactly once on every exit path; closing
//! it is what signals end-of-input and lets the encoder finalize the
//! output file. Everything here is synchronous and blocks the calling
//! thread; cancellation is cooperative, polled once per chunk.

use crate::command::EncoderCommand;
use crate::error::{ExportError, Result};
use crate::source::{SampleSource, SourceFormat};
use log::{debug, info, warn};
use std::io::{self, Write};
use std::process::{Child, ChildStdin, ExitStatus, Stdio};

/// Frames transferred per streaming iteration.
pub const CHUNK_FRAMES: u32 = 4096;

/// Pump the source through the chunk loop into an arbitrary byte sink.
///
/// Iterates from frame 0 to `format.total_frames` in [`CHUNK_FRAMES`]
/// steps, the final chunk clipped to the remainder. Before each chunk the
/// abort poll runs; a positive poll stops the loop with
/// [`ExportError::Cancelled`] and no partial chunk is written after it.
/// A source miss (`None` or empty) skips the write but still advances by
/// the requested chunk size. A write that accepts fewer bytes than
/// submitted is fatal and is not retried.
///
/// `on_progress` is invoked after each chunk with the completed fraction
/// (0.0 to 1.0). Returns the number of frames actually written.
pub fn stream_frames<W: Write>(
    sink: &mut W,
    format: &SourceFormat,
    source: &mut dyn SampleSource,
    mut is_aborted: impl FnMut() -> bool,
    on_progress: impl Fn(f32),
) -> Result<u64> {
    let channels = format.channels.max(1) as usize;
    let mut bytes = Vec::with_capacity(CHUNK_FRAMES as usize * channels * 4);
    let mut offset: u64 = 0;
    let mut written_frames: u64 = 0;

    while offset < format.total_frames {
        if is_aborted() {
            debug!("abort observed at frame {}", offset);
            return Err(ExportError::Cancelled);
        }

        let requested = (format.total_frames - offset).min(CHUNK_FRAMES as u64) as u32;

        if let Some(samples) = source.read(offset, requested) {
            if !samples.is_empty() {
                bytes.clear();
                for sample in samples {
                    bytes.extend_from_slice(&sample.to_le_bytes());
                }

                let accepted = sink.write(&bytes).map_err(ExportError::Write)?;
                if accepted < bytes.len() {
                    return Err(ExportError::Write(io::Error::new(
                        io::ErrorKind::WriteZero,
                        format!("short write: {} of {} bytes accepted", accepted, bytes.len()),
                    )));
                }
                written_frames += (samples.len() / channels) as u64;
            }
        }

        // The offset advances by the requested count even when the source
        // had no data for the range.
        offset += requested as u64;
        on_progress(offset as f32 / format.total_frames as f32);
    }

    Ok(written_frames)
}

/// Runtime state of one export: the spawned encoder and its input pipe.
///
/// Created by [`ExportSession::spawn`], consumed by
/// [`finish`](ExportSession::finish) or [`abort`](ExportSession::abort).
/// Dropping the session without either still closes the pipe and reaps
/// the child. Sessions are never reused; a new export starts fresh.
pub struct ExportSession {
    child: Child,
    stdin: Option<ChildStdin>,
    reaped: bool,
}

impl ExportSession {
    /// Spawn the encoder with its standard input piped.
    ///
    /// Fails with [`ExportError::Spawn`] when the process cannot be
    /// created (encoder missing from the search path, permission denied).
    /// Checked before any data transfer begins.
    pub fn spawn(command: &EncoderCommand) -> Result<Self> {
        info!("starting encoder: {}", command.shell_string());

        let mut child = command
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ExportError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExportError::Spawn(io::Error::other("encoder stdin not captured")))?;

        Ok(Self {
            child,
            stdin: Some(stdin),
            reaped: false,
        })
    }

    /// Stream the whole source into the encoder's input pipe.
    pub fn stream(
        &mut self,
        format: &SourceFormat,
        source: &mut dyn SampleSource,
        is_aborted: impl FnMut() -> bool,
        on_progress: impl Fn(f32),
    ) -> Result<u64> {
        let stdin = self.stdin.as_mut().ok_or_else(|| {
            ExportError::Write(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "encoder input already closed",
            ))
        })?;
        stream_frames(stdin, format, source, is_aborted, on_progress)
    }

    /// Close the input pipe, wait for the encoder and check its exit.
    ///
    /// A nonzero exit status after end-of-input means the encoder failed
    /// to finalize the output and is surfaced as
    /// [`ExportError::EncoderFailed`].
    pub fn finish(mut self) -> Result<()> {
        self.close_input();
        let status = self.wait()?;
        if status.success() {
            debug!("encoder finished: {}", status);
            Ok(())
        } else {
            warn!("encoder failed: {}", status);
            Err(ExportError::EncoderFailed(status))
        }
    }

    /// Teardown after cancellation or a streaming failure.
    ///
    /// Closes the input pipe and reaps the child, ignoring its exit
    /// status; the encoder is left to finalize whatever partial output it
    /// can.
    pub fn abort(mut self) {
        self.close_input();
        if let Err(err) = self.wait() {
            warn!("failed to reap encoder after abort: {}", err);
        }
    }

    // Dropping the handle closes the pipe; signals EOF to the encoder.
    fn close_input(&mut self) {
        self.stdin.take();
    }

    fn wait(&mut self) -> Result<ExitStatus> {
        let status = self.child.wait()?;
        self.reaped = true;
        Ok(status)
    }
}

impl Drop for ExportSession {
    fn drop(&mut self) {
        self.stdin.take();
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Run one complete export: spawn, stream, teardown.
///
/// Blocks the calling thread for the full transfer. `is_aborted` is
/// polled once per chunk boundary; cancellation latency is up to one
/// chunk of audio.
pub fn run_export(
    command: &EncoderCommand,
    format: &SourceFormat,
    source: &mut dyn SampleSource,
    is_aborted: impl FnMut() -> bool,
) -> Result<()> {
    run_export_with_progress(command, format, source, is_aborted, |_| {})
}

/// [`run_export`] with a progress callback (0.0 to 1.0 per chunk).
pub fn run_export_with_progress(
    command: &EncoderCommand,
    format: &SourceFormat,
    source: &mut dyn SampleSource,
    is_aborted: impl FnMut() -> bool,
    on_progress: impl Fn(f32),
) -> Result<()> {
    let mut session = ExportSession::spawn(command)?;
    match session.stream(format, source, is_aborted, on_progress) {
        Ok(frames) => {
            debug!("streamed {} frames to encoder", frames);
            session.finish()
        }
        Err(err) => {
            session.abort();
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BufferSource;
    use std::cell::Cell;

    /// Source that records every requested range and synthesizes
    /// deterministic samples for it.
    struct RecordingSource {
        channels: u16,
        calls: Vec<(u64, u32)>,
        buf: Vec<f32>,
        /// Ranges for which the source pretends to have no data.
        holes: Vec<u64>,
    }

    impl RecordingSource {
        fn new(channels: u16) -> Self {
            Self {
                channels,
                calls: Vec::new(),
                buf: Vec::new(),
                holes: Vec::new(),
            }
        }
    }

    impl SampleSource for RecordingSource {
        fn read(&mut self, start_frame: u64, frames: u32) -> Option<&[f32]> {
            self.calls.push((start_frame, frames));
            if self.holes.contains(&start_frame) {
                return None;
            }
            self.buf.clear();
            for frame in 0..frames as u64 {
                for ch in 0..self.channels {
                    self.buf
                        .push((start_frame + frame) as f32 + ch as f32 * 0.5);
                }
            }
            Some(&self.buf)
        }
    }

    /// Sink that accepts only a limited number of bytes, then shorts.
    struct ShortSink {
        data: Vec<u8>,
        capacity: usize,
    }

    impl Write for ShortSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity - self.data.len();
            let n = buf.len().min(room);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_chunk_schedule() {
        // 2 channels, 10000 frames, chunk 4096: offsets 0/4096/8192,
        // requests 4096/4096/1808.
        let format = SourceFormat::new(2, 48000, 10000);
        let mut source = RecordingSource::new(2);
        let mut sink = Vec::new();

        let written =
            stream_frames(&mut sink, &format, &mut source, || false, |_| {}).unwrap();

        assert_eq!(source.calls, vec![(0, 4096), (4096, 4096), (8192, 1808)]);
        assert_eq!(written, 10000);
        assert_eq!(sink.len(), 10000 * 2 * 4);
    }

    #[test]
    fn test_chunk_schedule_even_division() {
        let format = SourceFormat::new(1, 48000, 8192);
        let mut source = RecordingSource::new(1);
        let mut sink = Vec::new();

        stream_frames(&mut sink, &format, &mut source, || false, |_| {}).unwrap();

        assert_eq!(source.calls, vec![(0, 4096), (4096, 4096)]);
    }

    #[test]
    fn test_abort_before_second_chunk() {
        let format = SourceFormat::new(2, 48000, 10000);
        let mut source = RecordingSource::new(2);
        let mut sink = Vec::new();
        let polls = Cell::new(0u32);

        let result = stream_frames(
            &mut sink,
            &format,
            &mut source,
            || {
                polls.set(polls.get() + 1);
                polls.get() > 1
            },
            |_| {},
        );

        assert!(matches!(result, Err(ExportError::Cancelled)));
        // Exactly one chunk written, nothing after the abort.
        assert_eq!(source.calls, vec![(0, 4096)]);
        assert_eq!(sink.len(), 4096 * 2 * 4);
    }

    #[test]
    fn test_abort_before_first_chunk_writes_nothing() {
        let format = SourceFormat::new(2, 48000, 10000);
        let mut source = RecordingSource::new(2);
        let mut sink = Vec::new();

        let result = stream_frames(&mut sink, &format, &mut source, || true, |_| {});

        assert!(matches!(result, Err(ExportError::Cancelled)));
        assert!(source.calls.is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn test_source_miss_advances_offset() {
        let format = SourceFormat::new(2, 48000, 10000);
        let mut source = RecordingSource::new(2);
        source.holes.push(4096);
        let mut sink = Vec::new();

        let written =
            stream_frames(&mut sink, &format, &mut source, || false, |_| {}).unwrap();

        // The missing chunk is skipped, not an error, and later ranges are
        // still requested at their original offsets.
        assert_eq!(source.calls, vec![(0, 4096), (4096, 4096), (8192, 1808)]);
        assert_eq!(written, 10000 - 4096);
        assert_eq!(sink.len(), (10000 - 4096) * 2 * 4);
    }

    #[test]
    fn test_short_write_is_fatal() {
        let format = SourceFormat::new(2, 48000, 10000);
        let mut source = RecordingSource::new(2);
        // Room for the first chunk plus a fragment of the second.
        let mut sink = ShortSink {
            data: Vec::new(),
            capacity: 4096 * 2 * 4 + 100,
        };

        let result = stream_frames(&mut sink, &format, &mut source, || false, |_| {});

        match result {
            Err(ExportError::Write(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::WriteZero)
            }
            other => panic!("expected write error, got {:?}", other),
        }
        // No retry after the shortfall.
        assert_eq!(source.calls.len(), 2);
    }

    #[test]
    fn test_roundtrip_bytes_match_source() {
        let samples: Vec<f32> = (0..10000 * 2).map(|i| i as f32 * 0.001).collect();
        let mut source = BufferSource::new(samples.clone(), 2);
        let format = SourceFormat::new(2, 48000, source.frames());
        let mut sink = Vec::new();

        stream_frames(&mut sink, &format, &mut source, || false, |_| {}).unwrap();

        let expected: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(sink, expected);
    }

    #[test]
    fn test_progress_reaches_one() {
        let format = SourceFormat::new(1, 48000, 5000);
        let mut source = RecordingSource::new(1);
        let mut sink = Vec::new();
        let last = Cell::new(0.0f32);

        stream_frames(&mut sink, &format, &mut source, || false, |p| {
            assert!(p >= last.get());
            last.set(p);
        })
        .unwrap();

        assert_eq!(last.get(), 1.0);
    }

    #[test]
    fn test_empty_source_completes() {
        let format = SourceFormat::new(2, 48000, 0);
        let mut source = RecordingSource::new(2);
        let mut sink = Vec::new();

        let written =
            stream_frames(&mut sink, &format, &mut source, || false, |_| {}).unwrap();

        assert_eq!(written, 0);
        assert!(source.calls.is_empty());
        assert!(sink.is_empty());
    }
}
