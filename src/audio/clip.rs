use crate::{Result, ToneCanvasError};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Input frames per resampler call
const RESAMPLE_CHUNK: usize = 1024;

/// Interleaved `f32` samples with their format
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AudioClip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Number of sample frames (one sample per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    pub fn duration_seconds(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f32 / self.sample_rate as f32
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Re-lay the clip out for `channels` output channels
    pub fn to_channels(self, channels: u16) -> Self {
        let channels = channels.max(1);
        if channels == self.channels {
            return self;
        }
        let mono = downmix(&self.samples, self.channels);
        Self {
            samples: spread(&mono, channels),
            sample_rate: self.sample_rate,
            channels,
        }
    }

    /// Convert to the given device format
    pub fn conform(self, sample_rate: u32, channels: u16) -> Result<Self> {
        let clip = self.to_channels(channels);
        if clip.sample_rate == sample_rate || clip.is_empty() {
            return Ok(Self { sample_rate, ..clip });
        }

        debug!(
            "Converting clip {} Hz -> {} Hz ({} channels)",
            clip.sample_rate, sample_rate, clip.channels
        );
        if clip.sample_rate == 0 || sample_rate == 0 {
            return Err(ToneCanvasError::AudioProcessingError(
                "Sample rates must be greater than 0".into(),
            ));
        }
        let samples = resample(&clip.samples, clip.sample_rate, sample_rate, clip.channels)?;
        Ok(Self {
            samples,
            sample_rate,
            channels: clip.channels,
        })
    }
}

fn processing_error(e: impl std::fmt::Display) -> ToneCanvasError {
    ToneCanvasError::AudioProcessingError(format!("Resampling failed: {}", e))
}

/// Sinc-resample interleaved samples
///
/// The output holds exactly `frames * to / from` frames (rounded), with the
/// filter delay removed so it lines up with the input.
fn resample(samples: &[f32], from: u32, to: u32, channels: u16) -> Result<Vec<f32>> {
    let channels = channels.max(1) as usize;
    let ratio = to as f64 / from as f64;

    let params = SincInterpolationParameters {
        sinc_len: 128,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 128,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(ratio, 1.0, params, RESAMPLE_CHUNK, channels)
        .map_err(processing_error)?;

    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
        .collect();
    let frames = planar[0].len();
    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();

    let mut out: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay); channels];

    let mut position = 0;
    while position < frames {
        let end = position + resampler.input_frames_next();
        let produced = if end <= frames {
            let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[position..end]).collect();
            resampler.process(chunk.as_slice(), None)
        } else {
            let chunk: Vec<&[f32]> = planar.iter().map(|c| &c[position..]).collect();
            resampler.process_partial(Some(chunk.as_slice()), None)
        }
        .map_err(processing_error)?;
        append_planar(&mut out, produced);
        position = end;
    }

    // Push zeros through until the delayed tail has come out
    while out[0].len() < expected + delay {
        let produced = resampler
            .process_partial::<&[f32]>(None, None)
            .map_err(processing_error)?;
        if produced[0].is_empty() {
            break;
        }
        append_planar(&mut out, produced);
    }

    let available = out[0].len().min(expected + delay);
    let mut interleaved = Vec::with_capacity(expected * channels);
    for frame in delay.min(available)..available {
        for channel in &out {
            interleaved.push(channel[frame]);
        }
    }

    debug!("Resampled {} frames -> {} frames", frames, interleaved.len() / channels);
    Ok(interleaved)
}

fn append_planar(out: &mut [Vec<f32>], produced: Vec<Vec<f32>>) {
    for (channel, part) in out.iter_mut().zip(produced) {
        channel.extend(part);
    }
}

/// Average interleaved frames down to one channel
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Duplicate a mono signal onto `channels` interleaved channels
pub fn spread(mono: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    let mut out = Vec::with_capacity(mono.len() * channels);
    for &sample in mono {
        for _ in 0..channels {
            out.push(sample);
        }
    }
    out
}
