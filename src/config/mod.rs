//! Configuration management for hark
//!
//! Precedence is env > `config.toml` > defaults.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::session::SessionConfig;
use crate::voice::{
    DEFAULT_MAX_RETRIES, ListenSettings, Listener, SpeechToText, SttProvider, TextToSpeech,
    TtsProvider,
};
use crate::{Error, Result};

use self::file::HarkConfigFile;

/// File name of the knowledge store inside the data directory
pub const STORE_FILE_NAME: &str = "hark.db";

/// hark configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to data directory
    pub data_dir: PathBuf,

    /// Path to the knowledge store file
    pub store_path: PathBuf,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Dialogue configuration
    pub session: SessionSettings,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Use microphone and speaker; text mode when false
    pub enabled: bool,

    pub stt_provider: SttProvider,
    pub stt_model: String,

    pub tts_provider: TtsProvider,
    pub tts_model: String,
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// Microphone endpointing
    pub listen: ListenSettings,
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<SecretString>,
}

/// Dialogue configuration
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub exit_word: String,
    pub max_retries: u32,
    pub max_idle_turns: u32,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a value is invalid
    pub fn load(store_override: Option<PathBuf>, disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file();
        let data_dir = default_data_dir();

        // Ensure data dir exists
        std::fs::create_dir_all(&data_dir).ok();

        Self::resolve(fc, |key| std::env::var(key).ok(), data_dir, store_override, disable_voice)
    }

    /// Merge a config file with an environment lookup
    ///
    /// # Errors
    ///
    /// Returns error if a provider name or numeric setting is invalid
    pub fn resolve<F>(
        fc: HarkConfigFile,
        env: F,
        data_dir: PathBuf,
        store_override: Option<PathBuf>,
        disable_voice: bool,
    ) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store path (flag > env > toml > data dir)
        let store_path = store_override
            .or_else(|| env("HARK_STORE_PATH").map(PathBuf::from))
            .or_else(|| fc.store.path.map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join(STORE_FILE_NAME));

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: env("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .map(SecretString::from),
            deepgram: env("DEEPGRAM_API_KEY")
                .or(fc.api_keys.deepgram)
                .map(SecretString::from),
            elevenlabs: env("ELEVENLABS_API_KEY")
                .or(fc.api_keys.elevenlabs)
                .map(SecretString::from),
        };

        // Voice config (env > toml > provider default)
        let v = fc.voice;
        let stt_provider: SttProvider = env("HARK_STT_PROVIDER")
            .or(v.stt_provider)
            .map_or(Ok(SttProvider::default()), |s| s.parse())?;
        let tts_provider: TtsProvider = env("HARK_TTS_PROVIDER")
            .or(v.tts_provider)
            .map_or(Ok(TtsProvider::default()), |s| s.parse())?;

        let tts_speed = v.tts_speed.unwrap_or(1.0);
        if !(0.25..=4.0).contains(&tts_speed) {
            return Err(Error::Config(format!(
                "tts_speed must be between 0.25 and 4.0, got {tts_speed}"
            )));
        }

        let defaults = ListenSettings::default();
        let energy_threshold = v.energy_threshold.unwrap_or(defaults.energy_threshold);
        if !(energy_threshold > 0.0 && energy_threshold < 1.0) {
            return Err(Error::Config(format!(
                "energy_threshold must be between 0 and 1, got {energy_threshold}"
            )));
        }

        let listen = ListenSettings {
            energy_threshold,
            pause_ms: v.pause_ms.unwrap_or(defaults.pause_ms),
            listen_timeout: v
                .listen_timeout_secs
                .map_or(defaults.listen_timeout, Duration::from_secs),
            phrase_limit: v
                .phrase_limit_secs
                .map_or(defaults.phrase_limit, Duration::from_secs),
        };

        let voice = VoiceConfig {
            enabled: !disable_voice && v.enabled.unwrap_or(true),
            stt_provider,
            stt_model: env("HARK_STT_MODEL")
                .or(v.stt_model)
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
            tts_provider,
            tts_model: env("HARK_TTS_MODEL")
                .or(v.tts_model)
                .unwrap_or_else(|| tts_provider.default_model().to_string()),
            tts_voice: env("HARK_TTS_VOICE")
                .or(v.tts_voice)
                .unwrap_or_else(|| tts_provider.default_voice().to_string()),
            tts_speed,
            listen,
        };

        if disable_voice {
            tracing::info!("voice disabled, using text mode");
        }

        // Session config (env > toml > default)
        let session_defaults = SessionConfig::default();
        let session = SessionSettings {
            exit_word: env("HARK_EXIT_WORD")
                .or(fc.session.exit_word)
                .unwrap_or(session_defaults.exit_word),
            max_retries: fc.session.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            max_idle_turns: fc
                .session
                .max_idle_turns
                .unwrap_or(session_defaults.max_idle_turns)
                .max(1),
        };

        if session.exit_word.trim().is_empty() {
            return Err(Error::Config("exit_word must not be empty".to_string()));
        }

        Ok(Self {
            data_dir,
            store_path,
            voice,
            api_keys,
            session,
        })
    }

    /// Build the STT client for the configured provider
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn speech_to_text(&self) -> Result<SpeechToText> {
        let key = match self.voice.stt_provider {
            SttProvider::Whisper => self.api_keys.openai.as_ref(),
            SttProvider::Deepgram => self.api_keys.deepgram.as_ref(),
        };

        SpeechToText::new(
            self.voice.stt_provider,
            key.map(|k| k.expose_secret().to_string()).unwrap_or_default(),
            self.voice.stt_model.clone(),
        )
    }

    /// Build the TTS client for the configured provider
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn text_to_speech(&self) -> Result<TextToSpeech> {
        let key = match self.voice.tts_provider {
            TtsProvider::OpenAI => self.api_keys.openai.as_ref(),
            TtsProvider::ElevenLabs => self.api_keys.elevenlabs.as_ref(),
        };

        TextToSpeech::new(
            self.voice.tts_provider,
            key.map(|k| k.expose_secret().to_string()).unwrap_or_default(),
            self.voice.tts_model.clone(),
            self.voice.tts_voice.clone(),
            self.voice.tts_speed,
        )
    }

    /// Session settings for the dialogue loop
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            exit_word: self.session.exit_word.clone(),
            max_idle_turns: self.session.max_idle_turns,
            echo_dialogue: self.voice.enabled,
        }
    }

    /// Retry policy for capturing utterances
    #[must_use]
    pub const fn listener(&self) -> Listener {
        Listener::new(self.session.max_retries)
    }
}

/// Default data directory (`~/.local/share/hark` on Linux)
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("hark"))
}
