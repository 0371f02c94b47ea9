use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mozhi_assistant::audio::{AudioCapture, AudioPlayback};
use mozhi_assistant::speech::TextToSpeech;
use mozhi_assistant::{Assistant, Config, Dispatcher};

/// Mozhi - Malayalam voice assistant with home device control
#[derive(Parser)]
#[command(name = "mozhi", version, about)]
struct Cli {
    /// Assistant profile ("sobhana" or "midhun")
    #[arg(short, long, env = "MOZHI_PROFILE", default_value = "sobhana")]
    profile: String,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP control surface instead of the autonomous loop
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long, env = "MOZHI_API_PORT")]
        port: Option<u16>,
    },
    /// Classify a transcript without touching audio hardware
    Dispatch {
        /// Transcript text
        text: String,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "4")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "നമസ്കാരം, ഇത് ഒരു പരീക്ഷണമാണ്.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mozhi_assistant=info",
        1 => "info,mozhi_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(&cli.profile)?;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Serve { port } => {
                if let Some(port) = port {
                    config.api_port = port;
                }
                mozhi_assistant::api::serve(&config).await?;
                Ok(())
            }
            Command::Dispatch { text } => {
                let dispatcher = Dispatcher::from_profile(&config.profile);
                let result = dispatcher.dispatch(&text);
                println!("{}", serde_json::to_string_pretty(&DispatchOutput::from(&result))?);
                Ok(())
            }
            Command::TestMic { duration } => test_mic(duration),
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(&config, &text).await,
        };
    }

    // Default: run the autonomous dialogue loop
    let assistant = Assistant::new(config)?;
    assistant.run().await?;
    Ok(())
}

/// JSON shape for the `dispatch` subcommand
#[derive(serde::Serialize)]
struct DispatchOutput {
    utterances: Vec<String>,
    device_command: Option<String>,
    terminate: bool,
}

impl From<&mozhi_assistant::DispatchResult> for DispatchOutput {
    fn from(result: &mozhi_assistant::DispatchResult) -> Self {
        Self {
            utterances: result.utterances.clone(),
            device_command: result.device_command.clone(),
            terminate: result.terminate,
        }
    }
}

/// Record a short clip and report its level
fn test_mic(duration: u64) -> anyhow::Result<()> {
    let capture = AudioCapture::new()?;
    println!("Recording for {duration}s...");

    let samples = capture.record(Duration::from_secs(duration))?;

    #[allow(clippy::cast_precision_loss)]
    let rms = (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt();
    println!("Captured {} samples, RMS level {rms:.4}", samples.len());

    if rms < 0.001 {
        println!("Warning: input level is very low - check the microphone");
    }
    Ok(())
}

/// Play a short test tone
fn test_speaker() -> anyhow::Result<()> {
    let playback = AudioPlayback::new()?;
    println!("Playing test tone...");

    // 440 Hz, one second, at the 24 kHz playback rate
    let samples: Vec<f32> = (0..24_000)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let t = i as f32 / 24_000.0;
            0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
        })
        .collect();

    playback.play(samples)?;
    println!("Done");
    Ok(())
}

/// Synthesize and play a phrase
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    let tts = TextToSpeech::new(&config.tts, config.profile.voice.clone())?;
    println!("Synthesizing with voice {}...", tts.voice());

    let audio = tts.synthesize(text).await?;
    println!("Got {} bytes of audio", audio.len());

    let playback = AudioPlayback::new()?;
    playback.play_mp3(&audio)?;
    println!("Done");
    Ok(())
}
