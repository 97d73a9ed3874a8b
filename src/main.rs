use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hark::voice::{
    AudioCapture, AudioPlayback, ConsoleInput, ConsoleOutput, Microphone, PLAYBACK_SAMPLE_RATE,
    Speaker, SpeechInput, SpeechOutput, rms_energy,
};
use hark::{Config, KnowledgeStore, Session};

/// hark - voice Q&A assistant that learns answers it doesn't know
#[derive(Parser)]
#[command(name = "hark", version, about)]
struct Cli {
    /// Knowledge store file (defaults to the data directory)
    #[arg(long, env = "HARK_STORE_PATH", global = true)]
    store: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Type instead of talking (no microphone or speaker)
    #[arg(long, env = "HARK_TEXT_MODE")]
    text: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
#[allow(clippy::enum_variant_names)]
enum Command {
    /// Look up a question without starting a session
    Ask {
        /// Question text
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Teach an answer directly
    Teach {
        /// Question text
        question: String,
        /// Answer text
        answer: String,
    },
    /// List learned questions and answers
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show the exchange history
    History {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speaker output
    TestSpeaker,
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
    },
    /// Interactive first-run setup
    Setup,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,hark=info",
        1 => "info,hark=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
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
    let store_override = cli.store;

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Ask { question } => cmd_ask(store_override, &question.join(" ")),
            Command::Teach { question, answer } => cmd_teach(store_override, &question, &answer),
            Command::List { json } => cmd_list(store_override, json),
            Command::History { json } => cmd_history(store_override, json),
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestSpeaker => test_speaker(),
            Command::TestTts { text } => test_tts(store_override, &text).await,
            Command::Setup => hark::setup::run_setup(),
        };
    }

    let config = Config::load(store_override, cli.text)?;
    tracing::debug!(?config, "loaded configuration");

    let mut store = KnowledgeStore::open(&config.store_path)?;

    if config.voice.enabled {
        let microphone = Microphone::new(config.speech_to_text()?, config.voice.listen)?;
        let speaker = Speaker::new(config.text_to_speech()?, AudioPlayback::new()?);
        tracing::info!(
            stt = %config.voice.stt_provider,
            tts = %config.voice.tts_provider,
            "voice session ready"
        );
        run_session(&config, &mut store, microphone, speaker).await
    } else {
        let input = ConsoleInput::new(std::io::stdin().lock());
        let output = ConsoleOutput::new(std::io::stdout());
        run_session(&config, &mut store, input, output).await
    }
}

#[allow(clippy::future_not_send)]
async fn run_session<I, O>(
    config: &Config,
    store: &mut KnowledgeStore,
    input: I,
    output: O,
) -> anyhow::Result<()>
where
    I: SpeechInput,
    O: SpeechOutput,
{
    let mut session = Session::new(store, input, output, std::io::stdout())
        .with_listener(config.listener())
        .with_config(config.session_config());

    let end = session.run().await?;
    tracing::debug!(?end, "session finished");
    Ok(())
}

/// Open the configured store without touching audio
fn open_store(store_override: Option<PathBuf>) -> anyhow::Result<KnowledgeStore> {
    let config = Config::load(store_override, true)?;
    Ok(KnowledgeStore::open(&config.store_path)?)
}

fn cmd_ask(store_override: Option<PathBuf>, question: &str) -> anyhow::Result<()> {
    let store = open_store(store_override)?;

    match store.lookup(question) {
        Some(answer) => println!("{answer}"),
        None => println!("I don't know the answer to \"{question}\" yet."),
    }

    Ok(())
}

fn cmd_teach(store_override: Option<PathBuf>, question: &str, answer: &str) -> anyhow::Result<()> {
    let mut store = open_store(store_override)?;
    store.record(question, answer)?;
    println!("Learned: {question} -> {answer}");
    Ok(())
}

fn cmd_list(store_override: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let store = open_store(store_override)?;

    if json {
        let facts: Vec<_> = store.facts().collect();
        println!("{}", serde_json::to_string_pretty(&facts)?);
        return Ok(());
    }

    if store.is_empty() {
        println!("Nothing learned yet");
    }
    for fact in store.facts() {
        println!("{}  ->  {}", fact.question, fact.answer);
    }

    Ok(())
}

fn cmd_history(store_override: Option<PathBuf>, json: bool) -> anyhow::Result<()> {
    let store = open_store(store_override)?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.history())?);
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for entry in store.history() {
        writeln!(
            out,
            "[{}] {}  ->  {}",
            entry.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            entry.question,
            entry.answer
        )?;
    }

    Ok(())
}

/// Test microphone input
#[allow(clippy::future_not_send)]
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    capture.start()?;

    println!("Sample rate: {} Hz", capture.sample_rate());
    println!("---");

    for i in 0..duration {
        tokio::time::sleep(Duration::from_secs(1)).await;

        let samples = capture.take_buffer();
        let energy = rms_energy(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter = "#".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    capture.stop();

    println!("\n---");
    println!("Speech should read above the energy threshold (default 0.06).");
    println!("If RMS stayed near 0, check your default input device.");

    Ok(())
}

/// Test speaker output with a sine wave
fn test_speaker() -> anyhow::Result<()> {
    println!("Testing speaker output...");
    println!("You should hear a 440Hz tone for 2 seconds\n");

    let playback = AudioPlayback::new()?;

    let frequency = 440.0_f32;
    let rate = PLAYBACK_SAMPLE_RATE;

    #[allow(clippy::cast_precision_loss)]
    let samples: Vec<f32> = (0..rate * 2)
        .map(|i| {
            let t = i as f32 / rate as f32;
            (2.0 * std::f32::consts::PI * frequency * t).sin() * 0.3
        })
        .collect();

    playback.play(samples)?;

    println!("If you heard the tone, your speakers are working!");
    Ok(())
}

/// Test TTS output with the configured provider
#[allow(clippy::future_not_send)]
async fn test_tts(store_override: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let config = Config::load(store_override, false)?;
    let tts = config.text_to_speech()?;

    println!("Synthesizing speech with {}...", config.voice.tts_provider);
    let mp3_data = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3_data.len());

    println!("Playing audio...");
    AudioPlayback::new()?.play_mp3(&mp3_data)?;

    println!("If you heard the speech, TTS is working!");
    Ok(())
}
