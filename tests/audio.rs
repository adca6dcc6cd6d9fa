mod common;

use audio_worker::{probe_audio, read_audio, write_audio, AudioData, ErrorKind};
use common::{write_tone, SR};
use tempfile::tempdir;

#[test]
fn decodes_generated_wav() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tone.wav");
    write_tone(&path, 1.5, 2);

    let audio = read_audio(&path).expect("Failed to read audio");
    assert_eq!(audio.sample_rate, SR);
    assert_eq!(audio.channels, 2);
    assert_eq!(audio.frames(), 12_000);
    assert!(audio.samples.iter().any(|s| s.abs() > 0.1), "Read silence");
}

#[test]
fn probe_reports_layout_without_decoding() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("tone.wav");
    write_tone(&path, 0.5, 1);

    let info = probe_audio(&path).unwrap();
    assert_eq!(info.sample_rate, SR);
    assert_eq!(info.channels, 1);
    assert_eq!(info.frames, Some(4_000));
}

#[test]
fn garbage_is_a_decode_error() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("noise.mp3");
    std::fs::write(&path, b"definitely not an audio file").unwrap();

    let err = read_audio(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DecodeError);
    assert_eq!(probe_audio(&path).unwrap_err().kind(), ErrorKind::DecodeError);
}

#[test]
fn writer_emits_pcm_wav_regardless_of_extension() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("clip.mp3");
    let audio = AudioData {
        samples: vec![0.0, 0.5, -0.5, 1.0],
        sample_rate: 22_050,
        channels: 1,
    };
    write_audio(&path, &audio).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.spec().sample_format, hound::SampleFormat::Int);
    assert_eq!(reader.spec().sample_rate, 22_050);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples, vec![0, 16_383, -16_383, i16::MAX]);
}
