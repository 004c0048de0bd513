//! Audio pipeline: decode, offline render, WAV encode
//!
//! Every uploaded track passes through the same three stages:
//!
//! 1. [`decode`]: compressed or PCM bytes -> planar f32 samples at the
//!    source's native rate and channel layout
//! 2. [`render`]: offline re-render to the 48kHz delivery rate, optionally
//!    windowed to an `(offset, duration)` excerpt
//! 3. [`encode_wav24`]: canonical 24-bit little-endian WAV bytes
//!
//! [`normalize_track`] and [`extract_clip`] compose the stages for the two
//! deliverables the distribution wizard needs: the full canonical master and
//! the fixed-length preview clip. Both are pure byte-to-byte transforms; the
//! caller decides where the output lands.

pub mod decode;
pub mod render;
pub mod wav;

pub use decode::decode;
pub use render::{render, RenderWindow};
pub use wav::encode_wav24;

use serde::Serialize;

use crate::error::Result;

/// Delivery sample rate for all rendered audio
pub const TARGET_SAMPLE_RATE: u32 = 48_000;

/// Default preview clip length in seconds
pub const CLIP_SECONDS: f64 = 60.0;

/// MIME type attached to every encoded deliverable
pub const WAV_CONTENT_TYPE: &str = "audio/wav";

/// Decoded audio held as one `Vec<f32>` per channel.
///
/// Structural invariants are checked at construction and cannot be violated
/// afterwards (fields are private, accessors only):
/// - at least one channel
/// - every channel holds the same number of frames
/// - sample rate is positive
///
/// Sample values are not range-checked here; anything outside `[-1.0, 1.0]`
/// is clamped at encode time only, so analysis sees the signal untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is empty, the channels differ in length, or
    /// `sample_rate` is zero. These are construction bugs, not runtime
    /// conditions; decode and render only ever hand over well-formed data.
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        assert!(!channels.is_empty(), "sample buffer needs at least one channel");
        assert!(sample_rate > 0, "sample rate must be positive");
        let frame_count = channels[0].len();
        assert!(
            channels.iter().all(|c| c.len() == frame_count),
            "all channels must hold the same number of frames"
        );
        Self { channels, sample_rate }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel. Panics if `index` is out of range.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}

/// A finished deliverable: encoded bytes plus the name and MIME type the
/// upload layer should hand back to the client.
#[derive(Debug, Clone)]
pub struct EncodedAudio {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: &'static str,
}

/// Source-format facts for the trimmer UI, reported without re-rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: usize,
}

/// Lowercase a title and replace everything outside `[a-z0-9]` with `_`.
///
/// This is the naming contract the distribution wizard relies on: the full
/// master is `<stem>.wav` and the preview clip is `<stem>-trim.wav`.
pub fn sanitize_file_stem(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Render the whole track to canonical 24-bit/48kHz WAV.
pub fn normalize_track(data: &[u8], title: &str) -> Result<EncodedAudio> {
    let source = decode::decode(data)?;
    let rendered = render::render(&source, TARGET_SAMPLE_RATE, None)?;
    Ok(EncodedAudio {
        data: wav::encode_wav24(&rendered),
        file_name: format!("{}.wav", sanitize_file_stem(title)),
        content_type: WAV_CONTENT_TYPE,
    })
}

/// Cut an excerpt starting at `start_secs` and render it to 24-bit/48kHz WAV.
///
/// A window that runs past the end of the track is truncated to whatever
/// remains; a window that starts outside the track is an error. Pass
/// [`CLIP_SECONDS`] as the duration for the standard preview clip.
pub fn extract_clip(
    data: &[u8],
    title: &str,
    start_secs: f64,
    duration_secs: f64,
) -> Result<EncodedAudio> {
    let source = decode::decode(data)?;
    let window = RenderWindow {
        offset_secs: start_secs,
        duration_secs,
    };
    let rendered = render::render(&source, TARGET_SAMPLE_RATE, Some(window))?;
    Ok(EncodedAudio {
        data: wav::encode_wav24(&rendered),
        file_name: format!("{}-trim.wav", sanitize_file_stem(title)),
        content_type: WAV_CONTENT_TYPE,
    })
}

/// Decode only, reporting the source format facts.
pub fn inspect(data: &[u8]) -> Result<TrackInfo> {
    let source = decode::decode(data)?;
    Ok(TrackInfo {
        duration_secs: source.duration_secs(),
        sample_rate: source.sample_rate(),
        channels: source.channel_count(),
        frames: source.frame_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // ==========================================================================
    // TEST FIXTURES
    // ==========================================================================
    //
    // Pipeline tests need real decodable input. hound writes a 16-bit PCM WAV
    // into memory; the pipeline treats it like any other upload.
    // ==========================================================================

    fn sine_wav_bytes(sample_rate: u32, channels: u16, frames: usize) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for i in 0..frames {
                let t = i as f32 / sample_rate as f32;
                let sample = (2.0 * std::f32::consts::PI * 440.0 * t).sin() * 0.5;
                let quantized = (sample * i16::MAX as f32) as i16;
                for _ in 0..channels {
                    writer.write_sample(quantized).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    // ==========================================================================
    // SAMPLE BUFFER INVARIANTS
    // ==========================================================================

    #[test]
    fn test_buffer_accessors() {
        let buffer = SampleBuffer::new(vec![vec![0.0; 480], vec![0.0; 480]], 48_000);

        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.frame_count(), 480);
        assert_eq!(buffer.sample_rate(), 48_000);
        assert!((buffer.duration_secs() - 0.01).abs() < 1e-12);
        assert_eq!(buffer.channel(1).len(), 480);
    }

    #[test]
    #[should_panic(expected = "at least one channel")]
    fn test_buffer_rejects_no_channels() {
        SampleBuffer::new(vec![], 48_000);
    }

    #[test]
    #[should_panic(expected = "same number of frames")]
    fn test_buffer_rejects_ragged_channels() {
        SampleBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 48_000);
    }

    #[test]
    #[should_panic(expected = "sample rate must be positive")]
    fn test_buffer_rejects_zero_rate() {
        SampleBuffer::new(vec![vec![0.0; 10]], 0);
    }

    // ==========================================================================
    // FILENAME SANITIZATION
    // ==========================================================================
    //
    // The wizard looks up deliverables by name, so the mapping has to be
    // stable: lowercase, and every character outside [a-z0-9] becomes '_'.
    // ==========================================================================

    #[test]
    fn test_sanitize_lowercases() {
        assert_eq!(sanitize_file_stem("MyTrack"), "mytrack");
    }

    #[test]
    fn test_sanitize_replaces_punctuation_and_spaces() {
        assert_eq!(sanitize_file_stem("My Track (feat. X)"), "my_track__feat__x_");
    }

    #[test]
    fn test_sanitize_replaces_non_ascii() {
        assert_eq!(sanitize_file_stem("café #1"), "caf___1");
    }

    #[test]
    fn test_sanitize_keeps_digits() {
        assert_eq!(sanitize_file_stem("Track 42"), "track_42");
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_file_stem(""), "");
    }

    // ==========================================================================
    // FULL-TRACK NORMALIZATION
    // ==========================================================================

    #[test]
    fn test_normalize_track_produces_canonical_wav() {
        // 0.5s at 44.1kHz stereo -> exactly 24000 frames at 48kHz
        let input = sine_wav_bytes(44_100, 2, 22_050);
        let encoded = normalize_track(&input, "My Song").unwrap();

        assert_eq!(encoded.file_name, "my_song.wav");
        assert_eq!(encoded.content_type, "audio/wav");

        let reader = hound::WavReader::new(Cursor::new(encoded.data)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 24);
        assert_eq!(reader.duration(), 24_000);
    }

    #[test]
    fn test_normalize_track_rejects_garbage() {
        let err = normalize_track(b"definitely not audio", "x").unwrap_err();
        assert!(err.to_string().contains("decode"));
    }

    // ==========================================================================
    // CLIP EXTRACTION
    // ==========================================================================

    #[test]
    fn test_extract_clip_names_output() {
        let input = sine_wav_bytes(48_000, 1, 48_000);
        let encoded = extract_clip(&input, "My Song", 0.0, 0.25).unwrap();

        assert_eq!(encoded.file_name, "my_song-trim.wav");

        let reader = hound::WavReader::new(Cursor::new(encoded.data)).unwrap();
        assert_eq!(reader.duration(), 12_000);
    }

    #[test]
    fn test_extract_clip_truncates_at_end_of_track() {
        // 1s source, window asks for 0.5s starting at 0.75s -> 0.25s remain
        let input = sine_wav_bytes(48_000, 1, 48_000);
        let encoded = extract_clip(&input, "t", 0.75, 0.5).unwrap();

        let reader = hound::WavReader::new(Cursor::new(encoded.data)).unwrap();
        assert_eq!(reader.duration(), 12_000);
    }

    #[test]
    fn test_extract_clip_rejects_start_past_end() {
        let input = sine_wav_bytes(48_000, 1, 48_000);
        let err = extract_clip(&input, "t", 2.0, 0.5).unwrap_err();
        assert!(err.to_string().contains("render"));
    }

    // ==========================================================================
    // INSPECTION
    // ==========================================================================

    #[test]
    fn test_inspect_reports_source_format() {
        let input = sine_wav_bytes(44_100, 2, 44_100);
        let info = inspect(&input).unwrap();

        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.frames, 44_100);
        assert!((info.duration_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inspect_serializes_camel_case() {
        let info = TrackInfo {
            duration_secs: 1.0,
            sample_rate: 48_000,
            channels: 2,
            frames: 48_000,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"durationSecs\""));
        assert!(json.contains("\"sampleRate\""));
    }
}
