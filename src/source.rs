//! Source audio description and the host-side sample capability.

/// Format of the audio the caller will deliver.
///
/// Samples are always 32-bit float, interleaved by frame. Supplied once
/// per export and immutable for its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFormat {
    /// Number of channels.
    pub channels: u16,
    /// Input sample rate in Hz.
    pub sample_rate: u32,
    /// Total number of sample frames the source will provide.
    pub total_frames: u64,
}

impl SourceFormat {
    /// Create a new source format description.
    pub fn new(channels: u16, sample_rate: u32, total_frames: u64) -> Self {
        Self {
            channels,
            sample_rate,
            total_frames,
        }
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.total_frames as f64 / self.sample_rate as f64
    }

    /// Bytes per interleaved frame (f32 per channel).
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * std::mem::size_of::<f32>()
    }
}

/// Supplies raw interleaved f32 audio for requested frame ranges.
///
/// This is the injected replacement for the host's sample-retrieval
/// callback, so exports can run against deterministic in-memory sources
/// in tests as well as against a live host.
pub trait SampleSource {
    /// Return interleaved samples for `frames` frames starting at
    /// `start_frame`, or `None` when no data is available for the range.
    ///
    /// The returned slice holds `actual_frames * channels` values and may
    /// cover fewer frames than requested. A `None` or empty result is not
    /// an error; the caller skips the range and moves on.
    fn read(&mut self, start_frame: u64, frames: u32) -> Option<&[f32]>;
}

/// [`SampleSource`] over an owned interleaved buffer.
#[derive(Debug, Clone)]
pub struct BufferSource {
    samples: Vec<f32>,
    channels: u16,
}

impl BufferSource {
    /// Wrap an interleaved sample buffer.
    ///
    /// `samples.len()` must be a multiple of `channels`.
    pub fn new(samples: Vec<f32>, channels: u16) -> Self {
        debug_assert_eq!(samples.len() % channels.max(1) as usize, 0);
        Self { samples, channels }
    }

    /// Number of frames in the buffer.
    pub fn frames(&self) -> u64 {
        (self.samples.len() / self.channels.max(1) as usize) as u64
    }
}

impl SampleSource for BufferSource {
    fn read(&mut self, start_frame: u64, frames: u32) -> Option<&[f32]> {
        let channels = self.channels as usize;
        let start = start_frame as usize * channels;
        if start >= self.samples.len() {
            return None;
        }
        let end = (start + frames as usize * channels).min(self.samples.len());
        Some(&self.samples[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_format_helpers() {
        let format = SourceFormat::new(2, 48000, 96000);
        assert_eq!(format.duration_seconds(), 2.0);
        assert_eq!(format.bytes_per_frame(), 8);
    }

    #[test]
    fn test_buffer_source_full_range() {
        let mut source = BufferSource::new(vec![0.0, 1.0, 2.0, 3.0], 2);
        assert_eq!(source.frames(), 2);
        assert_eq!(source.read(0, 2), Some(&[0.0, 1.0, 2.0, 3.0][..]));
    }

    #[test]
    fn test_buffer_source_clips_tail() {
        let mut source = BufferSource::new(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0], 2);
        // Request past the end returns only what exists.
        assert_eq!(source.read(2, 4), Some(&[4.0, 5.0][..]));
        assert_eq!(source.read(3, 1), None);
    }
}
