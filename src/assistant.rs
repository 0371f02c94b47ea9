//! Assistant - the dialogue loop driver
//!
//! Orchestrates one strictly sequential cycle per iteration:
//! capture -> filter -> transcribe -> dispatch -> respond. The dispatcher
//! decides; this driver performs the I/O it asked for.

use std::time::Duration;

use crate::audio::{samples_to_wav, AudioCapture, AudioPlayback, BandpassFilter, SAMPLE_RATE};
use crate::device::DeviceCommandSink;
use crate::dispatch::{DispatchResult, Dispatcher};
use crate::speech::{SpeechToText, TextToSpeech};
use crate::{Config, Result};

/// Pause before retrying after a failed capture
const CAPTURE_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Whether the dialogue session continues after a cycle
///
/// Passed through the loop explicitly; there is no process-wide running flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Keep listening
    Running,
    /// A termination rule fired; the loop exits
    Terminated,
}

/// The voice assistant - owns the full pipeline
pub struct Assistant {
    config: Config,
    capture: AudioCapture,
    filter: BandpassFilter,
    stt: SpeechToText,
    tts: TextToSpeech,
    playback: AudioPlayback,
    sink: DeviceCommandSink,
    dispatcher: Dispatcher,
}

impl Assistant {
    /// Initialize all pipeline components from config
    ///
    /// # Errors
    ///
    /// Returns error if audio devices or service credentials are unavailable
    pub fn new(config: Config) -> Result<Self> {
        let capture = AudioCapture::new()?;
        let filter = BandpassFilter::new(config.filter)?;
        let stt = SpeechToText::new(&config.stt, config.profile.language.clone())?;
        let tts = TextToSpeech::new(&config.tts, config.profile.voice.clone())?;
        let playback = AudioPlayback::new()?;
        let sink = DeviceCommandSink::new(&config.device);
        let dispatcher = Dispatcher::from_profile(&config.profile);

        tracing::info!(
            profile = %config.profile.id,
            voice = %config.profile.voice,
            "assistant initialized"
        );

        Ok(Self {
            config,
            capture,
            filter,
            stt,
            tts,
            playback,
            sink,
            dispatcher,
        })
    }

    /// The active dispatcher (shared with the HTTP control surface)
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the dialogue loop until a termination rule fires
    ///
    /// # Errors
    ///
    /// Individual cycle failures are absorbed; only initialization-grade
    /// errors surface here
    #[allow(clippy::future_not_send)]
    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            wake_words = ?self.dispatcher.wake_words(),
            "listening for wake word"
        );

        let mut state = SessionState::Running;
        while state == SessionState::Running {
            state = self.cycle().await;
        }

        tracing::info!("session ended");
        Ok(())
    }

    /// Run one capture cycle and report whether the session continues
    #[allow(clippy::future_not_send)]
    async fn cycle(&self) -> SessionState {
        let transcript = match self.listen_once().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "capture cycle failed, retrying");
                tokio::time::sleep(CAPTURE_RETRY_BACKOFF).await;
                return SessionState::Running;
            }
        };

        let result = self.dispatcher.dispatch(&transcript);
        if result.is_noop() {
            return SessionState::Running;
        }

        tracing::info!(transcript = %transcript, "heard");
        self.execute(&result).await;

        if result.terminate {
            SessionState::Terminated
        } else {
            SessionState::Running
        }
    }

    /// Capture, filter, and transcribe one utterance
    ///
    /// Transcription failures degrade to an empty transcript; only capture
    /// and filter failures surface as errors (retry conditions for the loop).
    ///
    /// # Errors
    ///
    /// Returns error if recording or filtering fails
    #[allow(clippy::future_not_send)]
    pub async fn listen_once(&self) -> Result<String> {
        let samples = self.capture.record(self.config.capture_duration)?;
        let filtered = self.filter.apply(&samples)?;
        let wav = samples_to_wav(&filtered, SAMPLE_RATE)?;

        match self.stt.transcribe(&wav).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::debug!(error = %e, "transcription failed, treating as no speech");
                Ok(String::new())
            }
        }
    }

    /// Perform the I/O a dispatch result asked for
    ///
    /// Utterances are spoken in order; the device command (if any) is sent
    /// after. Every step is best-effort.
    #[allow(clippy::future_not_send)]
    pub async fn execute(&self, result: &DispatchResult) {
        for utterance in &result.utterances {
            self.speak(utterance).await;
        }

        if let Some(command) = &result.device_command {
            let outcome = self.sink.notify(command).await;
            tracing::debug!(?outcome, "device notification finished");
        }
    }

    /// Synthesize and play an utterance, blocking until playback completes
    ///
    /// Synthesis or playback failure is logged and the response is skipped;
    /// the dialogue continues either way.
    #[allow(clippy::future_not_send)]
    pub async fn speak(&self, text: &str) {
        let audio = match self.tts.synthesize(text).await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed, skipping response");
                return;
            }
        };

        if let Err(e) = self.playback.play_mp3(&audio) {
            tracing::warn!(error = %e, "playback failed");
        }
    }
}
