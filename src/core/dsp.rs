use crate::types::AudioData;

const MILLIS_PER_SECOND: f64 = 1000.0;

pub fn seconds_to_millis(seconds: f64) -> f64 {
    seconds * MILLIS_PER_SECOND
}

/// Frame index for a millisecond offset, rounded to the nearest frame.
pub fn millis_to_frame(millis: f64, sample_rate: u32) -> usize {
    if millis <= 0.0 {
        return 0;
    }
    (millis * sample_rate as f64 / MILLIS_PER_SECOND).round() as usize
}

/// Extracts `[start_ms, end_ms)` from interleaved audio.
///
/// Bounds past the end of the buffer are clamped, so a range that starts
/// after the last frame yields an empty buffer with the same layout.
pub fn slice_millis(audio: &AudioData, start_ms: f64, end_ms: f64) -> AudioData {
    let frames = audio.frames();
    let start = millis_to_frame(start_ms, audio.sample_rate).min(frames);
    let end = millis_to_frame(end_ms, audio.sample_rate).clamp(start, frames);

    let ch = audio.channels as usize;
    AudioData {
        samples: audio.samples[start * ch..end * ch].to_vec(),
        sample_rate: audio.sample_rate,
        channels: audio.channels,
    }
}

pub fn scale(audio: &AudioData, gain: f32) -> AudioData {
    AudioData {
        samples: audio.samples.iter().map(|s| s * gain).collect(),
        sample_rate: audio.sample_rate,
        channels: audio.channels,
    }
}
