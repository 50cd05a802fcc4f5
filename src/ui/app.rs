//! Main application struct and eframe integration

use crate::audio::{CaptureDevice, SharedSink};
use crate::backend::Backend;
use crate::config::AppConfig;
use crate::controls::{
    refresh_corpus_async, PlaybackControl, RecordControl, SwitchControl, UploadState,
};
use crate::state::{AudioRangeStore, CorpusStatusStore, SharedUiState};
use crate::trace::TraceCollector;
use crate::ui::components::{
    CanvasStroke, DrawingCanvas, PlayButton, RecordPanel, StatusBar, SwitchButton,
};
use crate::ui::theme::Theme;
use crate::Result;
use egui::{CentralPanel, RichText, TopBottomPanel};
use std::sync::Arc;
use tracing::{error, info};

/// Opens the output sink and capture device when the user enables audio
pub type DeviceFactory = Box<dyn Fn() -> Result<(SharedSink, Box<dyn CaptureDevice>)>>;

/// Controls that exist once audio has been enabled
pub struct Controls {
    pub playback: PlaybackControl,
    pub switch: SwitchControl,
    pub record: RecordControl,
}

impl Controls {
    fn poll(&mut self) -> bool {
        let playback = self.playback.poll();
        let switch = self.switch.poll();
        let record = self.record.poll();
        playback || switch || record
    }

    /// Work is in flight whose result arrives without user input
    fn busy(&self) -> bool {
        self.playback.is_loading()
            || self.playback.is_playing()
            || self.switch.is_switching()
            || self.record.is_recording()
            || self.record.upload_state() == UploadState::Uploading
    }
}

pub struct ToneCanvasApp {
    initialized: bool,
    theme: Theme,
    backend: Arc<dyn Backend>,
    ui_state: SharedUiState,
    corpus: CorpusStatusStore,
    range: AudioRangeStore,
    collector: TraceCollector,
    controls: Option<Controls>,
    devices: DeviceFactory,
    stroke: CanvasStroke,
    audio_error: Option<String>,
}

impl ToneCanvasApp {
    /// Create the application for eframe
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig, backend: Arc<dyn Backend>) -> Self {
        let app = Self::with_devices(config, backend, Box::new(open_default_devices));
        app.theme.apply(&cc.egui_ctx);
        app
    }

    /// Create the application with a custom device factory
    pub fn with_devices(config: &AppConfig, backend: Arc<dyn Backend>, devices: DeviceFactory) -> Self {
        let ui_state = SharedUiState::new();
        let range = AudioRangeStore::new(config.frequency_range);
        let collector = TraceCollector::new(
            ui_state.clone(),
            range.clone(),
            Arc::clone(&backend),
            config.sample_period(),
        );

        Self {
            initialized: false,
            theme: Theme::dark(),
            backend,
            ui_state,
            corpus: CorpusStatusStore::new(),
            range,
            collector,
            controls: None,
            devices,
            stroke: CanvasStroke::default(),
            audio_error: None,
        }
    }

    pub fn ui_state(&self) -> &SharedUiState {
        &self.ui_state
    }

    pub fn corpus(&self) -> &CorpusStatusStore {
        &self.corpus
    }

    pub fn collector(&self) -> &TraceCollector {
        &self.collector
    }

    pub fn controls(&self) -> Option<&Controls> {
        self.controls.as_ref()
    }

    pub fn controls_mut(&mut self) -> Option<&mut Controls> {
        self.controls.as_mut()
    }

    pub fn audio_error(&self) -> Option<&str> {
        self.audio_error.as_deref()
    }

    /// Called on the first frame
    fn initialize(&mut self, ctx: &egui::Context) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        let ctx = ctx.clone();
        refresh_corpus_async(Arc::clone(&self.backend), self.corpus.clone(), move || {
            ctx.request_repaint()
        });
        info!("Tone Canvas UI initialized");
    }

    /// Open the audio devices and create the controls
    pub fn enable_audio(&mut self) {
        if self.controls.is_some() {
            return;
        }

        match (self.devices)() {
            Ok((sink, capture)) => {
                self.controls = Some(Controls {
                    playback: PlaybackControl::new(
                        Arc::clone(&self.backend),
                        self.ui_state.clone(),
                        self.corpus.clone(),
                        sink.clone(),
                    ),
                    switch: SwitchControl::new(
                        Arc::clone(&self.backend),
                        self.ui_state.clone(),
                        self.corpus.clone(),
                    ),
                    record: RecordControl::new(
                        Arc::clone(&self.backend),
                        self.ui_state.clone(),
                        capture,
                        sink,
                    ),
                });
                self.ui_state.set_audio_initialized(true);
                self.audio_error = None;
                info!("Audio initialized");
            }
            Err(e) => {
                error!("Failed to initialize audio: {}", e);
                self.audio_error = Some(e.user_message());
            }
        }
    }

    /// Render one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        self.initialize(ctx);

        let mut changed = false;
        if let Some(controls) = &mut self.controls {
            changed |= controls.poll();
        }

        TopBottomPanel::top("controls")
            .frame(egui::Frame::none().inner_margin(self.theme.spacing))
            .show(ctx, |ui| self.show_controls(ui));

        TopBottomPanel::bottom("status")
            .frame(egui::Frame::none().inner_margin(self.theme.spacing_sm))
            .show(ctx, |ui| {
                StatusBar::new(&self.ui_state, &self.corpus, &self.range, &self.theme).show(ui);
            });

        CentralPanel::default().show(ctx, |ui| {
            DrawingCanvas::new(&self.ui_state, &self.range, &mut self.stroke, &self.theme).show(ui);
        });

        // The canvas has written this frame's drawing flag
        self.collector.observe(self.ui_state.is_drawing());

        let busy = self.collector.is_collecting()
            || self.controls.as_ref().is_some_and(Controls::busy);
        if busy || changed {
            ctx.request_repaint();
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        let mut enable_clicked = false;
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Tone Canvas")
                    .size(20.0)
                    .strong()
                    .color(self.theme.text_primary),
            );
            ui.add_space(self.theme.spacing);

            match &mut self.controls {
                Some(controls) => {
                    PlayButton::new(&mut controls.playback, &self.theme).show(ui);
                    SwitchButton::new(&mut controls.switch, &self.ui_state, &self.theme).show(ui);
                }
                None => {
                    let button = egui::Button::new("Enable audio").rounding(self.theme.button_rounding);
                    enable_clicked = ui.add(button).clicked();
                    if let Some(message) = &self.audio_error {
                        ui.label(RichText::new(message).color(self.theme.error));
                    }
                }
            }
        });

        if enable_clicked {
            self.enable_audio();
            ui.ctx().request_repaint();
        }

        if let Some(controls) = &mut self.controls {
            ui.add_space(self.theme.spacing_sm);
            RecordPanel::new(&mut controls.record, &self.theme).show(ui);
        }
    }

    /// Stop background work and audio
    pub fn shutdown(&mut self) {
        self.collector.shutdown();
        if let Some(controls) = &mut self.controls {
            controls.playback.stop();
            if let Err(e) = controls.record.stop() {
                error!("Failed to stop recording: {}", e);
            }
        }
        info!("Tone Canvas shut down");
    }
}

impl eframe::App for ToneCanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }
}

/// Open the default cpal devices
#[cfg(feature = "audio-io")]
pub fn open_default_devices() -> Result<(SharedSink, Box<dyn CaptureDevice>)> {
    use crate::audio::{AudioInput, AudioOutput};

    let output = AudioOutput::new()?;
    let input = AudioInput::new()?;
    Ok((SharedSink::new(output), Box::new(input)))
}

#[cfg(not(feature = "audio-io"))]
pub fn open_default_devices() -> Result<(SharedSink, Box<dyn CaptureDevice>)> {
    Err(crate::ToneCanvasError::AudioDeviceError(
        "built without the audio-io feature".into(),
    ))
}
