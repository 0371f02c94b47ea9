//! Configuration for the Mozhi assistant
//!
//! Runtime config is built from defaults, overlaid by an optional TOML file
//! (`~/.config/mozhi/config.toml`, all fields optional), then by environment
//! variables.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::audio::FilterSpec;
use crate::{Error, Result};

/// Voice, utterances, and language for one assistant personality
///
/// The greeting/farewell/confirmation texts are what the assistant speaks;
/// the trigger phrases live in the dispatcher rule set.
#[derive(Debug, Clone)]
pub struct AssistantProfile {
    /// Profile identifier (e.g. "sobhana")
    pub id: String,
    /// Neural voice identifier for synthesis
    pub voice: String,
    /// Spoken when a wake word is heard
    pub greeting: String,
    /// Spoken before terminating the session
    pub farewell: String,
    /// Spoken when no rule matches
    pub not_understood: String,
    /// Confirmation for the light-on command
    pub light_on_ack: String,
    /// Confirmation for the light-off command
    pub light_off_ack: String,
    /// Recognition language tag
    pub language: String,
}

impl AssistantProfile {
    /// Built-in female profile (Sobhana neural voice)
    #[must_use]
    pub fn sobhana() -> Self {
        Self {
            id: "sobhana".to_string(),
            voice: "ml-IN-SobhanaNeural".to_string(),
            greeting: "നമസ്കാരം മാഷേ! ഞാൻ നിങ്ങളുടെ സ്വന്തം മലയാളം വോയ്‌സ് അസിസ്റ്റന്റാണ്. \
                       എന്ത് സഹായം വേണം എന്നു പറയും, ഞാൻ നോക്കാം ചെയ്യാൻ."
                .to_string(),
            farewell: "ശരി മാഷേ, ഞാൻ പോകുന്നു. ദിവസം നല്ലതാവട്ടെ. പിന്നെ കാണാം.".to_string(),
            not_understood: "എനിക്ക് ശരിയായി പിടികിട്ടിയില്ല മാഷേ… ഒന്നു വീണ്ടും പറയും?".to_string(),
            light_on_ack: "ശരി മാഷേ, ലൈറ്റ് ഓൺ ആക്കിയിട്ടുണ്ട്.".to_string(),
            light_off_ack: "ലൈറ്റ് ഓഫ് ആക്കിയിട്ടുണ്ട് മാഷേ.".to_string(),
            language: "ml".to_string(),
        }
    }

    /// Built-in male profile (Midhun neural voice)
    #[must_use]
    pub fn midhun() -> Self {
        Self {
            id: "midhun".to_string(),
            voice: "ml-IN-MidhunNeural".to_string(),
            greeting: "നമസ്കാരം. ഈ AI അസിസ്റ്റന്റ് ഇപ്പോൾ പ്രവർത്തന സജ്ജമാണ്. \
                       വിവരങ്ങൾ അന്വേഷിക്കൽ, ഓൺലൈൻ സേവനങ്ങൾ കൈകാര്യം ചെയ്യൽ, \
                       നിങ്ങളുടെ ദിനചര്യ ജോലികൾ ലളിതമാക്കൽ തുടങ്ങിയവയ്ക്ക് ഞാൻ സഹായിക്കും. \
                       ദയവായി നിങ്ങളുടെ നിർദേശം നൽകുക."
                .to_string(),
            farewell: "വിട. നല്ല ദിവസം!".to_string(),
            not_understood: "എനിക്ക് ശരിയായി പിടികിട്ടിയില്ല… ഒന്നു വീണ്ടും പറയും?".to_string(),
            light_on_ack: "ലൈറ്റ് ഓൺ ആക്കി.".to_string(),
            light_off_ack: "ലൈറ്റ് ഓഫ് ആക്കി.".to_string(),
            language: "ml".to_string(),
        }
    }

    /// Look up a built-in profile by id
    ///
    /// # Errors
    ///
    /// Returns error if the id is unknown
    pub fn builtin(id: &str) -> Result<Self> {
        match id {
            "sobhana" => Ok(Self::sobhana()),
            "midhun" => Ok(Self::midhun()),
            other => Err(Error::Config(format!("unknown profile: {other}"))),
        }
    }
}

/// Speech-to-text service configuration
#[derive(Debug, Clone)]
pub struct SttConfig {
    /// Transcription endpoint URL
    pub endpoint: String,
    /// Bearer token for the service
    pub api_key: Option<String>,
    /// Model identifier (e.g. "whisper-1")
    pub model: String,
}

/// Text-to-speech service configuration
#[derive(Debug, Clone)]
pub struct TtsConfig {
    /// Synthesis endpoint URL
    pub endpoint: String,
    /// Subscription key for the service
    pub api_key: Option<String>,
}

/// Device actuator endpoint configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Host (IP or name) of the device endpoint
    pub host: String,
    /// Request timeout for best-effort notifications
    pub timeout: Duration,
}

/// Mozhi assistant configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Active assistant profile
    pub profile: AssistantProfile,
    /// Capture window per dialogue cycle
    pub capture_duration: Duration,
    /// Speech-band filter spec
    pub filter: FilterSpec,
    /// STT service
    pub stt: SttConfig,
    /// TTS service
    pub tts: TtsConfig,
    /// Device actuator endpoint
    pub device: DeviceConfig,
    /// HTTP control surface port
    pub api_port: u16,
}

impl Config {
    /// Load configuration for the given profile id
    ///
    /// # Errors
    ///
    /// Returns error if the profile is unknown or the config file is invalid
    pub fn load(profile_id: &str) -> Result<Self> {
        let fc = ConfigFile::load_default()?;

        let mut profile = AssistantProfile::builtin(profile_id)?;
        if let Some(lang) = fc.profile.language.clone() {
            profile.language = lang;
        }
        if let Some(voice) = fc.profile.voice.clone() {
            profile.voice = voice;
        }

        let filter = FilterSpec {
            low_cut: fc.filter.low_cut.unwrap_or(300.0),
            high_cut: fc.filter.high_cut.unwrap_or(3400.0),
            order: fc.filter.order.unwrap_or(5),
            sample_rate: f64::from(crate::audio::SAMPLE_RATE),
            min_input_len: fc.filter.min_input_len.unwrap_or(33),
        };

        let stt = SttConfig {
            endpoint: fc
                .stt
                .endpoint
                .unwrap_or_else(|| "https://api.openai.com/v1/audio/transcriptions".to_string()),
            api_key: std::env::var("MOZHI_STT_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .or(fc.stt.api_key),
            model: fc.stt.model.unwrap_or_else(|| "whisper-1".to_string()),
        };

        let tts = TtsConfig {
            endpoint: fc.tts.endpoint.unwrap_or_else(|| {
                "https://centralindia.tts.speech.microsoft.com/cognitiveservices/v1".to_string()
            }),
            api_key: std::env::var("MOZHI_TTS_API_KEY").ok().or(fc.tts.api_key),
        };

        let device = DeviceConfig {
            host: std::env::var("MOZHI_DEVICE_HOST")
                .ok()
                .or(fc.device.host)
                .unwrap_or_else(|| "10.67.75.7".to_string()),
            timeout: Duration::from_millis(fc.device.timeout_ms.unwrap_or(1000)),
        };

        let api_port = std::env::var("MOZHI_API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .or(fc.server.port)
            .unwrap_or(5000);

        Ok(Self {
            profile,
            capture_duration: fc
                .capture
                .duration_secs
                .map_or(crate::audio::CAPTURE_DURATION, Duration::from_secs),
            filter,
            stt,
            tts,
            device,
            api_port,
        })
    }
}

/// Top-level TOML configuration file schema
///
/// All fields are optional — the file is a partial overlay on top of defaults.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    profile: ProfileFileConfig,

    #[serde(default)]
    capture: CaptureFileConfig,

    #[serde(default)]
    filter: FilterFileConfig,

    #[serde(default)]
    stt: SttFileConfig,

    #[serde(default)]
    tts: TtsFileConfig,

    #[serde(default)]
    device: DeviceFileConfig,

    #[serde(default)]
    server: ServerFileConfig,
}

#[derive(Debug, Default, Deserialize)]
struct ProfileFileConfig {
    /// Recognition language tag (e.g. "ml")
    language: Option<String>,
    /// Override the profile's neural voice id
    voice: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CaptureFileConfig {
    /// Capture window in seconds
    duration_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct FilterFileConfig {
    low_cut: Option<f64>,
    high_cut: Option<f64>,
    order: Option<usize>,
    min_input_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct SttFileConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TtsFileConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeviceFileConfig {
    host: Option<String>,
    timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerFileConfig {
    port: Option<u16>,
}

impl ConfigFile {
    /// Load from the default config path, or defaults if absent
    fn load_default() -> Result<Self> {
        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let parsed = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config file loaded");
        Ok(parsed)
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "mozhi", "mozhi")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_profiles_resolve() {
        assert_eq!(AssistantProfile::builtin("sobhana").unwrap().id, "sobhana");
        assert_eq!(
            AssistantProfile::builtin("midhun").unwrap().voice,
            "ml-IN-MidhunNeural"
        );
        assert!(AssistantProfile::builtin("nobody").is_err());
    }

    #[test]
    fn config_file_overlay_parses() {
        let fc: ConfigFile = toml::from_str(
            r#"
            [device]
            host = "192.168.1.50"
            timeout_ms = 500

            [filter]
            low_cut = 250.0
            "#,
        )
        .unwrap();

        assert_eq!(fc.device.host.as_deref(), Some("192.168.1.50"));
        assert_eq!(fc.device.timeout_ms, Some(500));
        assert_eq!(fc.filter.low_cut, Some(250.0));
        assert!(fc.stt.endpoint.is_none());
    }
}
