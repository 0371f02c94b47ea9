//! Audio pipeline: capture, speech-band filtering, playback

mod capture;
mod filter;
mod playback;

pub use capture::{AudioCapture, CAPTURE_DURATION, SAMPLE_RATE, samples_to_wav};
pub use filter::{BandpassFilter, FilterSpec};
pub use playback::AudioPlayback;
