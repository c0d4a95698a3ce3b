//! Peak-based waveform overview.
//!
//! The track is decoded once, folded to mono and thinned out to about
//! 8 kHz before peaks are taken, which keeps long files cheap.

use std::path::Path;

use rodio::Source;

use crate::error::MediaError;

const TARGET_RATE: u32 = 8_000;

/// Bar heights for `path`: `width` values in `[0, height / 2]`.
///
/// When the decoder knows the track length, peaks are folded while
/// decoding; otherwise the thinned signal is buffered first.
pub fn compute_waveform(path: &Path, width: usize, height: u32) -> Result<Vec<f32>, MediaError> {
    let decoder = crate::audio::decode(path).map_err(|e| MediaError::Decode(e.to_string()))?;

    let channels = usize::from(u16::from(decoder.channels())).max(1);
    let rate = u32::from(decoder.sample_rate()).max(1);
    let step = (rate / TARGET_RATE).max(1) as usize;
    let expected = decoder
        .total_duration()
        .map(|d| ((d.as_secs_f64() * f64::from(rate)) as usize).div_ceil(step));

    let mono = MonoFrames {
        inner: decoder,
        channels,
        step,
        index: 0,
    };

    match expected {
        Some(n) if width > 0 && n >= width => {
            let (peaks, seen) = fold_peaks(mono, n / width, width);
            if seen == 0 {
                return Err(MediaError::NoSamples);
            }
            Ok(scale_peaks(peaks, height))
        }
        _ => {
            let samples: Vec<f32> = mono.collect();
            if samples.is_empty() {
                return Err(MediaError::NoSamples);
            }
            Ok(peaks_from_samples(&samples, width, height))
        }
    }
}

/// Mixes interleaved frames to mono and keeps every `step`-th frame.
/// A trailing partial frame is dropped.
struct MonoFrames<I> {
    inner: I,
    channels: usize,
    step: usize,
    index: usize,
}

impl<I: Iterator<Item = f32>> Iterator for MonoFrames<I> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        loop {
            let mut sum = 0.0f32;
            for _ in 0..self.channels {
                sum += self.inner.next()?;
            }
            let keep = self.index % self.step == 0;
            self.index += 1;
            if keep {
                return Some(sum / self.channels as f32);
            }
        }
    }
}

/// Absolute peak of each `chunk`-sized run of `samples`, up to `width`
/// runs. Decoding stops once `width` peaks are taken. A short input
/// keeps its partial last run and pads with silence. Also returns how
/// many samples were consumed.
fn fold_peaks(samples: impl Iterator<Item = f32>, chunk: usize, width: usize) -> (Vec<f32>, usize) {
    let chunk = chunk.max(1);
    let mut peaks = Vec::with_capacity(width);
    let mut peak = 0.0f32;
    let mut filled = 0usize;
    let mut seen = 0usize;

    for s in samples {
        seen += 1;
        peak = peak.max(s.abs());
        filled += 1;
        if filled == chunk {
            peaks.push(peak);
            peak = 0.0;
            filled = 0;
            if peaks.len() == width {
                break;
            }
        }
    }
    if peaks.len() < width && filled > 0 {
        peaks.push(peak);
    }
    peaks.resize(width, 0.0);
    (peaks, seen)
}

/// Normalize by the loudest peak and scale to `height / 2`.
fn scale_peaks(peaks: Vec<f32>, height: u32) -> Vec<f32> {
    let max_peak = peaks.iter().copied().fold(0.0f32, f32::max);
    let half = height as f32 / 2.0;
    peaks
        .into_iter()
        .map(|p| if max_peak > 0.0 { p / max_peak * half } else { 0.0 })
        .collect()
}

/// Reduce `samples` to `width` peak heights scaled to `height / 2`.
///
/// Peaks are normalized by the loudest chunk. Inputs shorter than `width`
/// repeat the overall peak in every bar.
pub fn peaks_from_samples(samples: &[f32], width: usize, height: u32) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }
    let chunk = samples.len() / width;

    let peaks = if chunk == 0 {
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        vec![peak; width]
    } else {
        fold_peaks(samples.iter().copied(), chunk, width).0
    };
    scale_peaks(peaks, height)
}
