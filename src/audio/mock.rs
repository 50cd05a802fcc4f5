//! In-memory audio devices for tests and headless runs

use super::{AudioClip, AudioSink, CaptureDevice};
use crate::{Result, ToneCanvasError};
use crossbeam_channel::Sender;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct SinkState {
    played: Vec<AudioClip>,
    playing: bool,
    fail_next: bool,
}

/// Sink that records played clips and plays until told to finish
///
/// Clones share state, so a test can keep a handle while the control owns
/// another.
#[derive(Clone)]
pub struct MockSink {
    sample_rate: u32,
    channels: u16,
    inner: Rc<RefCell<SinkState>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new(16_000, 1)
    }
}

impl MockSink {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            inner: Rc::new(RefCell::new(SinkState::default())),
        }
    }

    /// Clips handed to `play`, converted to the sink format
    pub fn played(&self) -> Vec<AudioClip> {
        self.inner.borrow().played.clone()
    }

    /// Simulate the current clip running out
    pub fn finish(&self) {
        self.inner.borrow_mut().playing = false;
    }

    /// Make the next `play` call fail with a device error
    pub fn fail_next_play(&self) {
        self.inner.borrow_mut().fail_next = true;
    }
}

impl AudioSink for MockSink {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn play(&mut self, clip: AudioClip) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if std::mem::take(&mut inner.fail_next) {
            return Err(ToneCanvasError::AudioDeviceError("mock sink failure".into()));
        }
        let clip = clip.conform(self.sample_rate, self.channels)?;
        inner.played.push(clip);
        inner.playing = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.inner.borrow_mut().playing = false;
    }

    fn is_playing(&self) -> bool {
        self.inner.borrow().playing
    }
}

/// Capture device that replays preset chunks when started
#[derive(Clone)]
pub struct MockCapture {
    sample_rate: u32,
    chunks: Vec<Vec<f32>>,
    capturing: Arc<AtomicBool>,
}

impl MockCapture {
    pub fn new(sample_rate: u32, chunks: Vec<Vec<f32>>) -> Self {
        Self {
            sample_rate,
            chunks,
            capturing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A device that delivers nothing
    pub fn silent(sample_rate: u32) -> Self {
        Self::new(sample_rate, Vec::new())
    }
}

impl CaptureDevice for MockCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&mut self, chunk_tx: Sender<Vec<f32>>) -> Result<()> {
        for chunk in &self.chunks {
            chunk_tx
                .send(chunk.clone())
                .map_err(|e| ToneCanvasError::ChannelError(e.to_string()))?;
        }
        self.capturing.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_sink_plays_until_finished() {
        let sink = MockSink::new(8_000, 2);
        let mut handle = sink.clone();

        handle.play(AudioClip::mono(vec![0.5; 80], 8_000)).unwrap();
        assert!(sink.is_playing());
        assert_eq!(sink.played()[0].channels, 2);

        sink.finish();
        assert!(!handle.is_playing());
    }

    #[test]
    fn test_capture_delivers_preset_chunks() {
        let mut capture = MockCapture::new(16_000, vec![vec![0.1; 4], vec![0.2; 4]]);
        let (tx, rx) = unbounded();

        capture.start(tx).unwrap();
        assert!(capture.is_capturing());
        assert_eq!(rx.try_iter().count(), 2);

        capture.stop().unwrap();
        assert!(!capture.is_capturing());
    }
}
