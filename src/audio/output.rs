use super::{AudioClip, AudioSink};
use crate::{Result, ToneCanvasError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

/// Samples being played and the read position
#[derive(Default)]
struct Cursor {
    samples: Vec<f32>,
    position: usize,
}

impl Cursor {
    fn finished(&self) -> bool {
        self.position >= self.samples.len()
    }
}

/// Default output device playing one clip at a time
pub struct AudioOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    cursor: Arc<Mutex<Cursor>>,
}

impl AudioOutput {
    /// Open the default output device
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| ToneCanvasError::AudioDeviceError("No output device available".into()))?;

        info!(
            "Using output device: {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let config = device
            .default_output_config()
            .map_err(|e| ToneCanvasError::AudioDeviceError(format!("Failed to get output config: {}", e)))?
            .into();

        Ok(Self {
            device,
            config,
            stream: None,
            cursor: Arc::new(Mutex::new(Cursor::default())),
        })
    }
}

impl AudioSink for AudioOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn channels(&self) -> u16 {
        self.config.channels
    }

    fn play(&mut self, clip: AudioClip) -> Result<()> {
        self.stop();

        let clip = clip.conform(self.sample_rate(), self.channels())?;
        let duration = clip.duration_seconds();
        *self.cursor.lock() = Cursor {
            samples: clip.samples,
            position: 0,
        };

        let cursor = Arc::clone(&self.cursor);
        let err_fn = |err| {
            error!("Audio output stream error: {}", err);
        };

        let stream = self
            .device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut cursor = cursor.lock();
                    let available = cursor.samples.len() - cursor.position;
                    let n = available.min(data.len());
                    let start = cursor.position;
                    data[..n].copy_from_slice(&cursor.samples[start..start + n]);
                    // Silence once the clip has run out
                    data[n..].fill(0.0);
                    cursor.position += n;
                },
                err_fn,
                None,
            )
            .map_err(|e| ToneCanvasError::AudioDeviceError(format!("Failed to build output stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| ToneCanvasError::AudioDeviceError(format!("Failed to start output stream: {}", e)))?;

        self.stream = Some(stream);
        info!("Started playback of {:.1}s clip", duration);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            info!("Stopped playback");
        }
        *self.cursor.lock() = Cursor::default();
    }

    fn is_playing(&self) -> bool {
        self.stream.is_some() && !self.cursor.lock().finished()
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
