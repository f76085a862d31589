//! Encoding configuration and container selection.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sample rates offered by the configuration surface (Hz).
pub const SAMPLE_RATES: [u32; 5] = [32000, 44100, 48000, 88200, 96000];

/// Bitrates offered for the lossy codecs (kbps).
pub const BITRATES_KBPS: [u32; 8] = [64, 80, 96, 128, 160, 192, 256, 320];

/// Output container, selected by destination file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Container {
    /// PCM WAV at the configured bit depth. Also the fallback for
    /// unrecognized or missing extensions.
    #[default]
    Wav,
    Mp3,
    Opus,
    Flac,
    Vorbis,
}

impl Container {
    /// Resolve the container from a destination path, case-insensitively.
    ///
    /// Anything that is not `.mp3`, `.opus`, `.flac` or `.ogg` (including
    /// a missing extension) falls back to [`Container::Wav`].
    pub fn from_path(path: &Path) -> Self {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(e) => e.to_ascii_lowercase(),
            None => return Container::Wav,
        };
        match ext.as_str() {
            "mp3" => Container::Mp3,
            "opus" => Container::Opus,
            "flac" => Container::Flac,
            "ogg" => Container::Vorbis,
            _ => Container::Wav,
        }
    }

    /// Canonical file extension (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Container::Wav => "wav",
            Container::Mp3 => "mp3",
            Container::Opus => "opus",
            Container::Flac => "flac",
            Container::Vorbis => "ogg",
        }
    }

    /// Human-readable name for file dialogs.
    pub fn description(&self) -> &'static str {
        match self {
            Container::Wav => "WAV",
            Container::Mp3 => "MP3",
            Container::Opus => "Opus",
            Container::Flac => "FLAC",
            Container::Vorbis => "OGG",
        }
    }
}

/// File-type filter entries for save dialogs: (description, glob pattern).
pub const FILE_TYPES: [(&str, &str); 5] = [
    ("WAV (*.wav)", "*.wav"),
    ("MP3 (*.mp3)", "*.mp3"),
    ("FLAC (*.flac)", "*.flac"),
    ("Opus (*.opus)", "*.opus"),
    ("OGG (*.ogg)", "*.ogg"),
];

/// WAV bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
pub enum BitDepth {
    #[default]
    Int16,
    Int24,
    Float32,
}

impl BitDepth {
    /// Bits per sample.
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    /// Bit depth from a bits-per-sample value, if it is a supported one.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(BitDepth::Int16),
            24 => Some(BitDepth::Int24),
            32 => Some(BitDepth::Float32),
            _ => None,
        }
    }
}

impl From<BitDepth> for u16 {
    fn from(depth: BitDepth) -> u16 {
        depth.bits()
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = String;

    fn try_from(bits: u16) -> std::result::Result<Self, Self::Error> {
        BitDepth::from_bits(bits).ok_or_else(|| format!("unsupported bit depth: {}", bits))
    }
}

/// Per-format encoding knobs, read-only during an export run.
///
/// Values are handed to the encoder as-is; out-of-range settings surface
/// as encoder failure rather than being validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingConfig {
    /// MP3 bitrate in kbps.
    #[serde(default = "default_mp3_bitrate")]
    pub mp3_bitrate: u32,
    /// Opus bitrate in kbps.
    #[serde(default = "default_opus_bitrate")]
    pub opus_bitrate: u32,
    /// Ogg/Vorbis bitrate in kbps.
    #[serde(default = "default_ogg_bitrate")]
    pub ogg_bitrate: u32,
    /// FLAC compression level (0-8 conventional).
    #[serde(default = "default_flac_level")]
    pub flac_compression_level: u32,
    /// WAV bit depth.
    #[serde(default)]
    pub wav_bit_depth: BitDepth,
    /// Output sample rate in Hz. The encoder resamples to this rate.
    #[serde(default = "default_sample_rate")]
    pub output_sample_rate: u32,
}

fn default_mp3_bitrate() -> u32 {
    192
}

fn default_opus_bitrate() -> u32 {
    128
}

fn default_ogg_bitrate() -> u32 {
    160
}

fn default_flac_level() -> u32 {
    5
}

fn default_sample_rate() -> u32 {
    48000
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            mp3_bitrate: default_mp3_bitrate(),
            opus_bitrate: default_opus_bitrate(),
            ogg_bitrate: default_ogg_bitrate(),
            flac_compression_level: default_flac_level(),
            wav_bit_depth: BitDepth::default(),
            output_sample_rate: default_sample_rate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_extension() {
        assert_eq!(Container::from_path(Path::new("out.mp3")), Container::Mp3);
        assert_eq!(Container::from_path(Path::new("out.opus")), Container::Opus);
        assert_eq!(Container::from_path(Path::new("out.flac")), Container::Flac);
        assert_eq!(Container::from_path(Path::new("out.ogg")), Container::Vorbis);
        assert_eq!(Container::from_path(Path::new("out.wav")), Container::Wav);
    }

    #[test]
    fn test_container_case_insensitive() {
        assert_eq!(Container::from_path(Path::new("out.MP3")), Container::Mp3);
        assert_eq!(Container::from_path(Path::new("out.Opus")), Container::Opus);
        assert_eq!(Container::from_path(Path::new("out.FlAc")), Container::Flac);
    }

    #[test]
    fn test_container_fallback_to_wav() {
        assert_eq!(Container::from_path(Path::new("out")), Container::Wav);
        assert_eq!(Container::from_path(Path::new("out.xyz")), Container::Wav);
        assert_eq!(Container::from_path(Path::new("out.")), Container::Wav);
    }

    #[test]
    fn test_bit_depth_bits() {
        assert_eq!(BitDepth::Int16.bits(), 16);
        assert_eq!(BitDepth::Int24.bits(), 24);
        assert_eq!(BitDepth::Float32.bits(), 32);
        assert_eq!(BitDepth::from_bits(24), Some(BitDepth::Int24));
        assert_eq!(BitDepth::from_bits(20), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = EncodingConfig::default();
        assert_eq!(config.mp3_bitrate, 192);
        assert_eq!(config.opus_bitrate, 128);
        assert_eq!(config.ogg_bitrate, 160);
        assert_eq!(config.flac_compression_level, 5);
        assert_eq!(config.wav_bit_depth, BitDepth::Int16);
        assert_eq!(config.output_sample_rate, 48000);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EncodingConfig {
            wav_bit_depth: BitDepth::Float32,
            output_sample_rate: 96000,
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: EncodingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_config_serde_fills_missing_fields() {
        let back: EncodingConfig = serde_json::from_str(r#"{"mp3_bitrate": 320}"#).unwrap();
        assert_eq!(back.mp3_bitrate, 320);
        assert_eq!(back.output_sample_rate, 48000);
        assert_eq!(back.wav_bit_depth, BitDepth::Int16);
    }
}
