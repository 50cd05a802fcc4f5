//! Microphone capture through cpal
//!
//! The device's native format is converted to `f32` and mixed down to mono
//! in the stream callback, so the record control only ever sees mono chunks
//! at [`CaptureDevice::sample_rate`].

use super::{downmix, CaptureDevice};
use crate::{Result, ToneCanvasError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct AudioInput {
    device: Device,
    config: StreamConfig,
    format: SampleFormat,
    stream: Option<Stream>,
    /// Chunks the record control did not drain in time
    dropped: Arc<AtomicUsize>,
}

impl AudioInput {
    /// Open the default input device in its preferred format
    pub fn new() -> Result<Self> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| ToneCanvasError::AudioDeviceError("No microphone found".into()))?;

        let supported = device.default_input_config().map_err(|e| {
            ToneCanvasError::AudioDeviceError(format!("Microphone has no usable config: {}", e))
        })?;

        info!(
            "Microphone {}: {} Hz, {} channels, {:?}",
            device.name().unwrap_or_else(|_| "unknown".into()),
            supported.sample_rate().0,
            supported.channels(),
            supported.sample_format()
        );

        Ok(Self {
            device,
            format: supported.sample_format(),
            config: supported.config(),
            stream: None,
            dropped: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn open_stream<T>(&self, chunk_tx: Sender<Vec<f32>>) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.config.channels;
        let dropped = Arc::clone(&self.dropped);

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|s| s.to_sample::<f32>()).collect();
                    if chunk_tx.try_send(downmix(&samples, channels)).is_err() {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| error!("Microphone stream error: {}", err),
                None,
            )
            .map_err(|e| ToneCanvasError::AudioDeviceError(format!("Cannot open microphone: {}", e)))
    }
}

impl CaptureDevice for AudioInput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self, chunk_tx: Sender<Vec<f32>>) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match self.format {
            SampleFormat::F32 => self.open_stream::<f32>(chunk_tx)?,
            SampleFormat::I16 => self.open_stream::<i16>(chunk_tx)?,
            SampleFormat::U16 => self.open_stream::<u16>(chunk_tx)?,
            SampleFormat::I32 => self.open_stream::<i32>(chunk_tx)?,
            other => {
                return Err(ToneCanvasError::AudioDeviceError(format!(
                    "Unsupported microphone format {:?}",
                    other
                )))
            }
        };
        stream
            .play()
            .map_err(|e| ToneCanvasError::AudioDeviceError(format!("Cannot start microphone: {}", e)))?;

        self.dropped.store(0, Ordering::Relaxed);
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.stream.take().is_some() {
            let dropped = self.dropped.swap(0, Ordering::Relaxed);
            if dropped > 0 {
                warn!("Microphone dropped {} chunks while recording", dropped);
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }
}
