//! In-memory WAV coding
//!
//! The backend serves and accepts whole WAV files, so clips are coded to and
//! from byte buffers rather than paths.

use super::AudioClip;
use crate::{Result, ToneCanvasError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use tracing::debug;

/// Encode a clip as 16-bit PCM WAV bytes
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: clip.channels.max(1),
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(44 + clip.samples.len() * 2));
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &clip.samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()?;
    }

    let bytes = cursor.into_inner();
    debug!("Encoded {} samples into {} WAV bytes", clip.samples.len(), bytes.len());
    Ok(bytes)
}

/// Decode WAV bytes into an `f32` clip
pub fn decode_wav(bytes: &[u8]) -> Result<AudioClip> {
    let mut reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    debug!(
        "Decoding WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate, spec.channels, spec.bits_per_sample
    );

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = match spec.bits_per_sample {
                8 => i8::MAX as f32,
                16 => i16::MAX as f32,
                24 => 8_388_608.0, // 2^23
                32 => i32::MAX as f32,
                bits => {
                    return Err(ToneCanvasError::AudioProcessingError(format!(
                        "Unsupported bit depth: {}",
                        bits
                    )))
                }
            };
            reader
                .samples::<i32>()
                .map(|s| s.map(|sample| sample as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(AudioClip::new(samples, spec.sample_rate, spec.channels))
}
