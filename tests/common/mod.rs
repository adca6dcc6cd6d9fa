#![allow(dead_code)]

use std::{
    f32::consts::PI,
    path::{Path, PathBuf},
    sync::Arc,
};

use audio_worker::{write_audio, AudioData, FixtureBackend, ProcessingEngine};

pub const SR: u32 = 8_000;

/// Writes a 440 Hz tone of `seconds` length as 16-bit WAV, whatever the
/// file name's extension.
pub fn write_tone(path: &Path, seconds: f64, channels: u16) {
    let frames = (seconds * SR as f64).round() as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for i in 0..frames {
        let t = i as f32 / SR as f32;
        let v = (2.0 * PI * 440.0 * t).sin() * 0.25;
        for _ in 0..channels {
            samples.push(v);
        }
    }
    let audio = AudioData {
        samples,
        sample_rate: SR,
        channels,
    };
    write_audio(path, &audio).unwrap();
}

pub fn wav_frames(path: &Path) -> u32 {
    hound::WavReader::open(path).unwrap().duration()
}

pub fn fixture_engine(output_dir: &Path) -> ProcessingEngine {
    ProcessingEngine::new(output_dir, Arc::new(FixtureBackend)).unwrap()
}

pub fn entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(rd) => rd.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}
