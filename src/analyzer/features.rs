//! Deterministic feature extraction for the content screen
//!
//! Three facts feed the classifier, all taken from the primary channel of
//! the decoded audio in one sequential pass over the opening of the track:
//! duration, RMS level, and a coarse content hash. The same bytes always
//! produce the same features, which is what makes the whole screen
//! reproducible.

use crate::audio::SampleBuffer;

/// Features are computed over at most this many seconds from the start
pub const FEATURE_WINDOW_SECS: u32 = 30;

/// Every Nth frame of the window contributes to the content hash
pub const HASH_FRAME_STRIDE: usize = 1000;

/// The classifier's view of one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackFeatures {
    pub duration_secs: f64,
    pub rms: f64,
    pub content_hash: u64,
}

impl TrackFeatures {
    /// Extract features from decoded audio.
    ///
    /// `input_len` is the byte length of the original upload; it is folded
    /// into the content hash so two different files with similar openings
    /// still separate.
    pub fn extract(buffer: &SampleBuffer, input_len: usize) -> Self {
        let window = buffer
            .frame_count()
            .min(buffer.sample_rate() as usize * FEATURE_WINDOW_SECS as usize);
        let primary = buffer.channel(0);

        let mut sum_squares = 0.0f64;
        let mut hash_sum = 0.0f64;
        for (i, &sample) in primary[..window].iter().enumerate() {
            let s = sample as f64;
            sum_squares += s * s;
            if i % HASH_FRAME_STRIDE == 0 {
                hash_sum += (s * 10_000.0).abs();
            }
        }

        let rms = if window > 0 {
            (sum_squares / window as f64).sqrt()
        } else {
            0.0
        };

        TrackFeatures {
            duration_secs: buffer.duration_secs(),
            rms,
            content_hash: (hash_sum + input_len as f64).floor() as u64,
        }
    }

    /// Fixed stand-in features for input that would not decode.
    ///
    /// Keeps the screen total: a track the codec rejects still gets a
    /// result, keyed only off its byte length.
    pub fn fallback(input_len: usize) -> Self {
        TrackFeatures {
            duration_secs: 180.0,
            rms: 0.1,
            content_hash: input_len as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_of(channel: Vec<f32>, rate: u32) -> SampleBuffer {
        SampleBuffer::new(vec![channel], rate)
    }

    #[test]
    fn test_rms_of_constant_signal() {
        // |s| is the RMS of a constant signal
        let buffer = buffer_of(vec![0.5; 800], 100);
        let features = TrackFeatures::extract(&buffer, 0);

        assert!((features.rms - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rms_of_silence() {
        let buffer = buffer_of(vec![0.0; 800], 100);
        let features = TrackFeatures::extract(&buffer, 0);

        assert_eq!(features.rms, 0.0);
    }

    #[test]
    fn test_duration_uses_whole_track() {
        // 4000 frames at 100Hz = 40s, even though the window caps at 30s
        let buffer = buffer_of(vec![0.0; 4_000], 100);
        let features = TrackFeatures::extract(&buffer, 0);

        assert!((features.duration_secs - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_caps_at_thirty_seconds() {
        // Loud opening, hot tail: the tail sits beyond the 30s window at
        // 100Hz (3000 frames) and must not raise the RMS
        let mut data = vec![0.1f32; 4_000];
        for s in &mut data[3_000..] {
            *s = 1.0;
        }
        let buffer = buffer_of(data, 100);
        let features = TrackFeatures::extract(&buffer, 0);

        assert!((features.rms - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_short_track_uses_all_frames() {
        // 50 frames at 100Hz is well under the window cap
        let buffer = buffer_of(vec![0.3; 50], 100);
        let features = TrackFeatures::extract(&buffer, 0);

        assert!((features.rms - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_content_hash_strides_and_folds_length() {
        // 2500 frames: stride hits indices 0, 1000, 2000. The levels are
        // exact in binary so the sum carries no rounding wobble.
        let mut data = vec![0.0f32; 2_500];
        data[0] = 0.125;
        data[1_000] = -0.25;
        data[2_000] = 0.5;
        let buffer = buffer_of(data, 100);

        let features = TrackFeatures::extract(&buffer, 500);

        // |0.125|*10000 + |-0.25|*10000 + |0.5|*10000 + 500 = 9250
        assert_eq!(features.content_hash, 9_250);
    }

    #[test]
    fn test_content_hash_ignores_off_stride_frames() {
        let mut quiet = vec![0.0f32; 2_001];
        quiet[1] = 0.9;
        quiet[999] = -0.9;
        let with_noise = buffer_of(quiet, 100);

        let silent = buffer_of(vec![0.0f32; 2_001], 100);

        let a = TrackFeatures::extract(&with_noise, 42).content_hash;
        let b = TrackFeatures::extract(&silent, 42).content_hash;
        assert_eq!(a, b);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let data: Vec<f32> = (0..2_000).map(|i| ((i as f32) * 0.01).sin() * 0.4).collect();
        let buffer = buffer_of(data, 100);

        let a = TrackFeatures::extract(&buffer, 1_234);
        let b = TrackFeatures::extract(&buffer, 1_234);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fallback_features() {
        let features = TrackFeatures::fallback(9_000);

        assert_eq!(features.duration_secs, 180.0);
        assert_eq!(features.rms, 0.1);
        assert_eq!(features.content_hash, 9_000);
    }
}
