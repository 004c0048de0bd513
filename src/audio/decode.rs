//! Decode uploaded bytes to planar PCM using symphonia
//!
//! Uploads arrive as untyped bytes, so the container is probed rather than
//! hinted. Whatever the codec delivered stays untouched: native sample rate,
//! native channel layout, no mixing, no normalization.

use std::io::Cursor;

use symphonia::core::audio::SampleBuffer as InterleavedBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::SampleBuffer;
use crate::error::{Error, Result};

/// Decode a full track into a planar [`SampleBuffer`].
///
/// Corrupt packets inside an otherwise readable stream are skipped; a stream
/// that yields no frames at all is an error. Supported inputs are whatever
/// the enabled symphonia features decode (MP3, FLAC, Ogg/Vorbis, AAC/M4A,
/// WAV/PCM).
pub fn decode(data: &[u8]) -> Result<SampleBuffer> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    // No hint - let symphonia auto-detect the format
    let hint = Hint::new();

    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();
    let decoder_opts = DecoderOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| Error::Decode(format!("unrecognized container: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| Error::Decode("no audio track in container".to_string()))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &decoder_opts)
        .map_err(|e| Error::Decode(format!("unsupported codec: {}", e)))?;

    let mut sample_rate = 0u32;
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut interleaved: Option<InterleavedBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(_) => break, // end of stream
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(_) => continue, // skip corrupt packets
        };

        if interleaved.is_none() {
            let spec = *decoded.spec();
            sample_rate = spec.rate;
            channels = vec![Vec::new(); spec.channels.count()];
            let capacity = decoded.capacity() as u64;
            interleaved = Some(InterleavedBuffer::new(capacity, spec));
        }

        if let Some(ref mut buf) = interleaved {
            let channel_count = decoded.spec().channels.count();
            buf.copy_interleaved_ref(decoded);

            for frame in buf.samples().chunks(channel_count) {
                for (channel, &sample) in channels.iter_mut().zip(frame) {
                    channel.push(sample);
                }
            }
        }
    }

    let frames = channels.first().map(|c| c.len()).unwrap_or(0);
    if frames == 0 {
        return Err(Error::Decode("no decodable audio frames".to_string()));
    }
    if sample_rate == 0 {
        return Err(Error::Decode("source reports no sample rate".to_string()));
    }

    log::debug!(
        "decoded {} frames, {} channel(s) at {}Hz",
        frames,
        channels.len(),
        sample_rate
    );

    Ok(SampleBuffer::new(channels, sample_rate))
}
