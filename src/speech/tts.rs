//! Text-to-speech (TTS) processing

use crate::config::TtsConfig;
use crate::{Error, Result};

/// Synthesizes speech from text via a neural-voice service
///
/// The service takes an SSML body naming the voice (e.g.
/// `ml-IN-SobhanaNeural`) and returns MP3 audio.
pub struct TextToSpeech {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    voice: String,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if the API key is missing
    pub fn new(config: &TtsConfig, voice: String) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("TTS API key required".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
            voice,
        })
    }

    /// The voice identifier in use
    #[must_use]
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesize text to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let ssml = build_ssml(&self.voice, text);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/ssml+xml")
            .header(
                "X-Microsoft-OutputFormat",
                "audio-24khz-48kbitrate-mono-mp3",
            )
            .body(ssml)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("synthesis error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio.to_vec())
    }
}

/// Build the SSML request body for a voice and text
fn build_ssml(voice: &str, text: &str) -> String {
    let escaped = escape_xml(text);
    format!(
        "<speak version='1.0' xml:lang='ml-IN'>\
         <voice name='{voice}'>{escaped}</voice>\
         </speak>"
    )
}

/// Escape the five XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
