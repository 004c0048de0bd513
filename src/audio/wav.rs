//! Canonical 24-bit PCM WAV encoder
//!
//! Every deliverable uses the same fixed layout so downstream tooling can
//! byte-compare outputs. A 44-byte header, no metadata chunks, then
//! interleaved frames:
//!
//! ```text
//! Offset | Size | Field           | Value
//! -------|------|-----------------|------------------------------
//!      0 |    4 | ChunkID         | "RIFF"
//!      4 |    4 | ChunkSize       | 36 + data length (LE)
//!      8 |    4 | Format          | "WAVE"
//!     12 |    4 | Subchunk1ID     | "fmt "
//!     16 |    4 | Subchunk1Size   | 16 (PCM)
//!     20 |    2 | AudioFormat     | 1 (uncompressed)
//!     22 |    2 | NumChannels     | source channel count
//!     24 |    4 | SampleRate      | buffer rate (48000 for deliverables)
//!     28 |    4 | ByteRate        | rate * channels * 3
//!     32 |    2 | BlockAlign      | channels * 3
//!     34 |    2 | BitsPerSample   | 24
//!     36 |    4 | Subchunk2ID     | "data"
//!     40 |    4 | Subchunk2Size   | frames * channels * 3
//!     44 |  ... | sample data     | 24-bit LE, channels interleaved
//! ```
//!
//! Samples are clamped to `[-1.0, 1.0]` and scaled asymmetrically: negative
//! values by `0x800000`, positive by `0x7FFFFF`, so both full-scale extremes
//! land on representable 24-bit codes. Scaled values round to the nearest
//! code, with half-way cases rounding toward positive infinity.

use crate::audio::SampleBuffer;

pub const BITS_PER_SAMPLE: u16 = 24;
pub const BYTES_PER_SAMPLE: usize = 3;
pub const HEADER_LEN: usize = 44;

const NEGATIVE_SCALE: f64 = 0x80_0000 as f64;
const POSITIVE_SCALE: f64 = 0x7F_FFFF as f64;

/// Encode a buffer as canonical 24-bit WAV bytes.
///
/// Pure byte assembly; cannot fail for a structurally valid buffer.
pub fn encode_wav24(buffer: &SampleBuffer) -> Vec<u8> {
    let channels = buffer.channel_count();
    let frames = buffer.frame_count();
    let sample_rate = buffer.sample_rate();

    let data_len = frames * channels * BYTES_PER_SAMPLE;
    let byte_rate = sample_rate * channels as u32 * BYTES_PER_SAMPLE as u32;
    let block_align = (channels * BYTES_PER_SAMPLE) as u16;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);

    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&((36 + data_len) as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&(channels as u16).to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());

    for frame in 0..frames {
        for channel in buffer.channels() {
            write_sample_24(&mut out, channel[frame]);
        }
    }

    out
}

fn write_sample_24(out: &mut Vec<u8>, sample: f32) {
    let clamped = (sample as f64).clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * NEGATIVE_SCALE
    } else {
        clamped * POSITIVE_SCALE
    };
    // Half-way codes round toward positive infinity
    let code = (scaled + 0.5).floor() as i32;

    out.push((code & 0xFF) as u8);
    out.push(((code >> 8) & 0xFF) as u8);
    out.push(((code >> 16) & 0xFF) as u8);
}
