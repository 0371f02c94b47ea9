//! Mozhi - Malayalam voice assistant with home device control
//!
//! Core pipeline: fixed-duration capture -> speech-band filter -> external
//! transcription -> pure command dispatch -> synthesized response and/or
//! device notification, looping until a termination phrase is heard.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │          Autonomous loop  │  HTTP control surface │
//! └───────────────┬───────────────────┬──────────────┘
//!                 │                   │
//! ┌───────────────▼───────────────────▼──────────────┐
//! │  Capture → Band-pass → STT → Dispatch → TTS/Sink │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The dispatcher is a pure function of the transcript; the loop driver and
//! the HTTP surface both execute its results, never their own matching.

pub mod api;
pub mod assistant;
pub mod audio;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod speech;

pub use assistant::{Assistant, SessionState};
pub use audio::{AudioCapture, AudioPlayback, BandpassFilter, FilterSpec, SAMPLE_RATE};
pub use config::{AssistantProfile, Config};
pub use device::{DeviceCommandSink, NotifyOutcome};
pub use dispatch::{CommandRule, DispatchResult, Dispatcher, RuleAction};
pub use error::{Error, Result};
pub use speech::{SpeechToText, TextToSpeech};
