//! Audio clips, WAV coding and device access
//!
//! Devices sit behind two small traits so the controls can run against the
//! cpal implementations (`audio-io` feature) or the in-memory mocks.

mod clip;
#[cfg(feature = "audio-io")]
pub mod input;
pub mod mock;
#[cfg(feature = "audio-io")]
pub mod output;
pub mod wav;

pub use clip::{downmix, spread, AudioClip};
#[cfg(feature = "audio-io")]
pub use input::AudioInput;
pub use mock::{MockCapture, MockSink};
#[cfg(feature = "audio-io")]
pub use output::AudioOutput;
pub use wav::{decode_wav, encode_wav};

use crate::Result;
use crossbeam_channel::Sender;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Something that can play a finite clip
pub trait AudioSink {
    /// Device sample rate clips are converted to
    fn sample_rate(&self) -> u32;

    /// Device channel count clips are converted to
    fn channels(&self) -> u16;

    /// Start playing `clip` from the beginning, replacing anything playing
    fn play(&mut self, clip: AudioClip) -> Result<()>;

    /// Stop and rewind
    fn stop(&mut self);

    /// True until the clip has been played out or stopped
    fn is_playing(&self) -> bool;
}

/// A microphone that delivers mono chunks over a channel
pub trait CaptureDevice {
    fn sample_rate(&self) -> u32;

    fn start(&mut self, chunk_tx: Sender<Vec<f32>>) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn is_capturing(&self) -> bool;
}

/// Output device shared by the playback and record controls on the UI thread
///
/// Every `play` returns a ticket. A ticket stays current until the next
/// `play`, so a control can tell whether the device is still playing its own
/// clip or one started by someone else.
#[derive(Clone)]
pub struct SharedSink {
    device: Rc<RefCell<dyn AudioSink>>,
    plays: Rc<Cell<u64>>,
}

impl SharedSink {
    pub fn new<S: AudioSink + 'static>(sink: S) -> Self {
        Self {
            device: Rc::new(RefCell::new(sink)),
            plays: Rc::new(Cell::new(0)),
        }
    }

    /// Device sample rate and channel count
    pub fn format(&self) -> (u32, u16) {
        let device = self.device.borrow();
        (device.sample_rate(), device.channels())
    }

    /// Replace whatever is playing with `clip`
    pub fn play(&self, clip: AudioClip) -> Result<u64> {
        self.device.borrow_mut().play(clip)?;
        let ticket = self.plays.get() + 1;
        self.plays.set(ticket);
        Ok(ticket)
    }

    /// Whether the clip started with `ticket` is still playing
    pub fn is_playing(&self, ticket: u64) -> bool {
        self.plays.get() == ticket && self.device.borrow().is_playing()
    }

    /// Stop the clip started with `ticket`; other clips keep playing
    pub fn stop(&self, ticket: u64) {
        if self.plays.get() == ticket {
            self.device.borrow_mut().stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(frames: usize) -> AudioClip {
        AudioClip::mono(vec![0.5; frames], 16_000)
    }

    #[test]
    fn test_later_play_takes_over_device() {
        let device = MockSink::new(16_000, 1);
        let sink = SharedSink::new(device.clone());

        let first = sink.play(tone(160)).unwrap();
        assert!(sink.is_playing(first));

        let second = sink.clone().play(tone(320)).unwrap();
        assert_ne!(first, second);
        assert!(!sink.is_playing(first));
        assert!(sink.is_playing(second));

        // A stale ticket cannot stop the newer clip
        sink.stop(first);
        assert!(sink.is_playing(second));
        sink.stop(second);
        assert!(!device.is_playing());
    }

    #[test]
    fn test_failed_play_keeps_current_ticket() {
        let device = MockSink::new(16_000, 1);
        let sink = SharedSink::new(device.clone());

        let ticket = sink.play(tone(160)).unwrap();
        device.fail_next_play();
        assert!(sink.play(tone(160)).is_err());
        assert!(sink.is_playing(ticket));
        assert_eq!(device.played().len(), 1);
    }
}
