//! Interactive first-run setup wizard (`hark setup`)

use std::path::PathBuf;

use dialoguer::{Confirm, Input, Select};

use crate::config::file::{
    self, HarkConfigFile, SessionFileConfig, VoiceFileConfig,
};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("hark setup\n");

    let existing = file::load_config_file();
    let config_path =
        file::config_file_path().unwrap_or_else(|| PathBuf::from("~/.config/hark/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. Voice or text
    let enable_voice = Confirm::new()
        .with_prompt("Use microphone and speaker?")
        .default(existing.voice.enabled.unwrap_or(true))
        .interact()?;

    let mut api_keys = existing.api_keys;

    let voice = if enable_voice {
        // 2. STT provider + key
        let stt_providers = ["whisper", "deepgram"];
        let stt_idx = Select::new()
            .with_prompt("Speech recognition provider")
            .items(&stt_providers)
            .default(provider_index(&stt_providers, existing.voice.stt_provider.as_deref()))
            .interact()?;
        let stt_provider = stt_providers[stt_idx];

        // 3. TTS provider + key
        let tts_providers = ["openai", "elevenlabs"];
        let tts_idx = Select::new()
            .with_prompt("Speech synthesis provider")
            .items(&tts_providers)
            .default(provider_index(&tts_providers, existing.voice.tts_provider.as_deref()))
            .interact()?;
        let tts_provider = tts_providers[tts_idx];

        if stt_provider == "whisper" || tts_provider == "openai" {
            api_keys.openai = ask_key("OpenAI", "OPENAI_API_KEY", api_keys.openai)?;
        }
        if stt_provider == "deepgram" {
            api_keys.deepgram = ask_key("Deepgram", "DEEPGRAM_API_KEY", api_keys.deepgram)?;
        }
        if tts_provider == "elevenlabs" {
            api_keys.elevenlabs =
                ask_key("ElevenLabs", "ELEVENLABS_API_KEY", api_keys.elevenlabs)?;
        }

        VoiceFileConfig {
            enabled: Some(true),
            stt_provider: Some(stt_provider.to_string()),
            tts_provider: Some(tts_provider.to_string()),
            ..existing.voice
        }
    } else {
        VoiceFileConfig {
            enabled: Some(false),
            ..existing.voice
        }
    };

    // 4. Exit word
    let exit_word: String = Input::new()
        .with_prompt("Word that ends a session")
        .default(
            existing
                .session
                .exit_word
                .clone()
                .unwrap_or_else(|| "exit".to_string()),
        )
        .interact_text()?;

    let config_file = HarkConfigFile {
        store: existing.store,
        voice,
        api_keys,
        session: SessionFileConfig {
            exit_word: Some(exit_word),
            ..existing.session
        },
    };

    file::write_config_file(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());
    println!("\nSetup complete! Run `hark` to start a session.");

    Ok(())
}

/// Position of the configured provider in `options`, or the first option
fn provider_index(options: &[&str], current: Option<&str>) -> usize {
    current
        .and_then(|c| options.iter().position(|o| o.eq_ignore_ascii_case(c)))
        .unwrap_or(0)
}

/// Prompt for an API key, keeping the existing one on blank input
fn ask_key(label: &str, env_hint: &str, existing: Option<String>) -> anyhow::Result<Option<String>> {
    let prompt = existing.as_deref().map_or_else(
        || format!("{label} API key ({env_hint})"),
        |k| format!("{label} API key (current: {}, leave blank to keep)", mask_key(k)),
    );

    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.is_empty() { existing } else { Some(input) })
}

/// Show only the ends of a key
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("sk-abcdefghijkl"), "sk-a...ijkl");
        assert_eq!(mask_key("short"), "****");
    }

    #[test]
    fn test_provider_index() {
        let options = ["whisper", "deepgram"];
        assert_eq!(provider_index(&options, Some("Deepgram")), 1);
        assert_eq!(provider_index(&options, Some("unknown")), 0);
        assert_eq!(provider_index(&options, None), 0);
    }
}
