//! Speech service adapters
//!
//! STT and TTS over external HTTP services; both are request/response
//! black boxes to the rest of the pipeline.

mod stt;
mod tts;

pub use stt::SpeechToText;
pub use tts::TextToSpeech;
