use std::{fs::File, path::Path};

use hound::WavWriter;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{DecoderOptions, CODEC_TYPE_NULL},
    errors::Error as SymphoniaError,
    formats::{FormatOptions, FormatReader},
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};
use tracing::debug;

use crate::{
    error::{Result, WorkerError},
    types::AudioData,
};

/// Stream parameters of a probed source, gathered without decoding it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub frames: Option<u64>,
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path).map_err(|e| WorkerError::decode(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| WorkerError::decode(path, e))?;

    Ok(probed.format)
}

/// Checks that `path` holds a decodable audio stream and reports its layout.
pub fn probe_audio<P: AsRef<Path>>(path: P) -> Result<AudioInfo> {
    let path = path.as_ref();
    let format = open_format(path)?;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| WorkerError::decode(path, "no audio track found"))?;

    // Fails early on codecs we cannot decode.
    get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WorkerError::decode(path, e))?;

    Ok(AudioInfo {
        sample_rate: track.codec_params.sample_rate.unwrap_or(0),
        channels: track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0),
        frames: track.codec_params.n_frames,
    })
}

/// A stream whose every packet failed to decode is corrupt, not silent.
fn ensure_decoded(path: &Path, decoded: usize, skipped: usize) -> Result<()> {
    if decoded == 0 && skipped > 0 {
        return Err(WorkerError::decode(
            path,
            format!("none of {skipped} packets could be decoded"),
        ));
    }
    Ok(())
}

pub fn read_audio<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| WorkerError::decode(path, "no audio track found"))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    let mut decoder = get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| WorkerError::decode(path, e))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut decoded_packets = 0usize;
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(WorkerError::decode(path, e)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // Corrupt frame: skip it and keep going.
            Err(SymphoniaError::DecodeError(msg)) => {
                debug!(path = %path.display(), msg, "Skipping undecodable packet");
                skipped_packets += 1;
                continue;
            }
            Err(e) => return Err(WorkerError::decode(path, e)),
        };

        decoded_packets += 1;
        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);

        samples.extend_from_slice(buffer.samples());
    }

    ensure_decoded(path, decoded_packets, skipped_packets)?;
    if sample_rate == 0 || channels == 0 {
        return Err(WorkerError::decode(path, "unknown sample rate or channel layout"));
    }

    debug!(
        path = %path.display(),
        sample_rate,
        channels,
        samples = samples.len(),
        "Read audio"
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Writes 16-bit PCM WAV regardless of the file name's extension.
pub fn write_audio<P: AsRef<Path>>(path: P, audio: &AudioData) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path.as_ref(), spec)?;
    for sample in &audio.samples {
        let s = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        writer.write_sample(s)?;
    }

    writer.finalize()?;
    Ok(())
}
