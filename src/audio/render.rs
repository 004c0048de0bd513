//! Offline re-render to the delivery sample rate
//!
//! Uses rubato's `FastFixedIn` with septic polynomial interpolation, fed the
//! whole (optionally windowed) source in one chunk. The output frame count is
//! pinned to the value the duration arithmetic demands, not to whatever the
//! interpolator happens to emit:
//!
//! - full track: `ceil(source_duration * target_rate)` frames
//! - windowed:   `floor(min(duration, source_duration - offset) * target_rate)`
//!
//! Channel count is always preserved; rendering never mixes.

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::audio::SampleBuffer;
use crate::error::{Error, Result};

/// Excerpt window in seconds, relative to the start of the source.
///
/// The offset must land inside the source. The duration may run past the end;
/// the render then covers whatever remains, which is how end-of-track preview
/// clips come out shorter than the standard length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderWindow {
    pub offset_secs: f64,
    pub duration_secs: f64,
}

/// Re-render `source` at `target_rate`, optionally restricted to `window`.
pub fn render(
    source: &SampleBuffer,
    target_rate: u32,
    window: Option<RenderWindow>,
) -> Result<SampleBuffer> {
    if target_rate == 0 {
        return Err(Error::Render("target sample rate must be positive".to_string()));
    }

    let src_rate = source.sample_rate();

    // Full track at the source rate is an identity render
    if window.is_none() && src_rate == target_rate {
        log::debug!("source already at {}Hz, copying through", target_rate);
        return Ok(source.clone());
    }

    let source_duration = source.duration_secs();

    let (start_frame, end_frame, output_frames) = match window {
        Some(w) => {
            validate_window(&w, source_duration)?;
            let effective_secs = w.duration_secs.min(source_duration - w.offset_secs);
            let start = (w.offset_secs * src_rate as f64).floor() as usize;
            let span = (effective_secs * src_rate as f64).ceil() as usize;
            let end = (start + span).min(source.frame_count());
            let out = (effective_secs * target_rate as f64).floor() as usize;
            (start, end, out)
        }
        None => {
            let out = (source_duration * target_rate as f64).ceil() as usize;
            (0, source.frame_count(), out)
        }
    };

    let mut channels: Vec<Vec<f32>> = source
        .channels()
        .iter()
        .map(|c| c[start_frame..end_frame].to_vec())
        .collect();

    if src_rate != target_rate {
        channels = resample_planar(&channels, src_rate, target_rate)?;
    }

    // The interpolator lands within a frame or two of the target; pin the
    // count exactly, padding any shortfall with silence
    for channel in &mut channels {
        channel.resize(output_frames, 0.0);
    }

    log::debug!(
        "rendered {} frames at {}Hz from {} source frames at {}Hz",
        output_frames,
        target_rate,
        end_frame - start_frame,
        src_rate
    );

    Ok(SampleBuffer::new(channels, target_rate))
}

fn validate_window(window: &RenderWindow, source_duration: f64) -> Result<()> {
    if !window.offset_secs.is_finite() || !window.duration_secs.is_finite() {
        return Err(Error::Render("window bounds must be finite".to_string()));
    }
    if window.offset_secs < 0.0 || window.offset_secs >= source_duration {
        return Err(Error::Render(format!(
            "window offset {:.3}s lies outside the {:.3}s source",
            window.offset_secs, source_duration
        )));
    }
    if window.duration_secs <= 0.0 {
        return Err(Error::Render(format!(
            "window duration {:.3}s must be positive",
            window.duration_secs
        )));
    }
    Ok(())
}

fn resample_planar(channels: &[Vec<f32>], input_rate: u32, output_rate: u32) -> Result<Vec<Vec<f32>>> {
    let input_frames = channels[0].len();
    if input_frames == 0 {
        return Ok(channels.iter().map(|_| Vec::new()).collect());
    }

    let mut resampler = FastFixedIn::<f32>::new(
        output_rate as f64 / input_rate as f64,
        1.0, // fixed ratio, no runtime changes
        PolynomialDegree::Septic,
        input_frames,
        channels.len(),
    )
    .map_err(|e| Error::Render(format!("failed to create resampler: {}", e)))?;

    resampler
        .process(channels, None)
        .map_err(|e| Error::Render(format!("resampling failed: {}", e)))
}
