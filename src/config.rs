use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

const DEFAULT_LANG: &str = "en-US";
const DEFAULT_RATE: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub speech_lang: String,
    pub speech_rate: f32,
    pub speech_command: Option<String>,
    pub speech_enabled: bool,
    pub last_source: Option<String>,
    config_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    speech_lang: Option<String>,
    speech_rate: Option<f32>,
    speech_command: Option<String>,
    speech_enabled: Option<bool>,
    last_source: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub speech_lang: Option<String>,
    pub speech_rate: Option<f32>,
    pub speech_command: Option<String>,
    pub disable_speech: bool,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        let file_config = load_file_config(config_path.as_ref())?;

        // Determine which config path to use for saving
        let config_path = config_path.or_else(default_config_path);

        Ok(Self::resolve(file_config, overrides, config_path))
    }

    fn resolve(
        file_config: FileConfig,
        overrides: ConfigOverrides,
        config_path: Option<PathBuf>,
    ) -> Self {
        let speech_lang = non_blank(overrides.speech_lang)
            .or_else(|| non_blank(file_config.speech_lang))
            .or_else(|| non_blank(env::var("VOCAB_SPEECH_LANG").ok()))
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        let speech_rate = overrides
            .speech_rate
            .or(file_config.speech_rate)
            .or_else(|| {
                env::var("VOCAB_SPEECH_RATE")
                    .ok()
                    .and_then(|v| v.parse().ok())
            })
            .unwrap_or(DEFAULT_RATE);

        let speech_command = non_blank(overrides.speech_command)
            .or_else(|| non_blank(file_config.speech_command))
            .or_else(|| non_blank(env::var("VOCAB_SPEECH_COMMAND").ok()));

        let speech_enabled = !overrides.disable_speech && file_config.speech_enabled.unwrap_or(true);

        Self {
            speech_lang,
            speech_rate,
            speech_command,
            speech_enabled,
            last_source: file_config.last_source,
            config_path,
        }
    }

    /// Remember the list studied last so `study` can be run without a source.
    pub fn save_last_source(&self, source: &str) -> Result<()> {
        let config_path = match &self.config_path {
            Some(path) => path.clone(),
            None => default_config_path()
                .context("could not determine config file path to save last source")?,
        };

        // Load existing config or create new one
        let mut file_config = if config_path.exists() {
            read_config_from_path(&config_path)?
        } else {
            FileConfig::default()
        };

        file_config.last_source = Some(source.to_string());

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory at {}", parent.display())
            })?;
        }

        let toml_string =
            toml::to_string_pretty(&file_config).context("failed to serialize config to TOML")?;
        fs::write(&config_path, toml_string)
            .with_context(|| format!("failed to write config file to {}", config_path.display()))?;

        tracing::debug!("Saved last source to config file: {}", source);
        Ok(())
    }
}

/// Trimmed value, or `None` when it is blank so the next source is consulted.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn load_file_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    if let Some(path) = path {
        if path.exists() {
            return read_config_from_path(path);
        }
        anyhow::bail!("config path {:?} does not exist", path);
    }

    if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            return read_config_from_path(&default_path);
        }
    }

    Ok(FileConfig::default())
}

fn read_config_from_path(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file at {}", path.display()))
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "vocab-cli", "vocab-cli")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn temp_config_path(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("vocab-cli-config-{}-{}", name, std::process::id()))
            .join("config.toml")
    }

    #[test]
    fn file_values_are_used() {
        let file_config: FileConfig = toml::from_str(
            r#"
            speech_lang = "fr-FR"
            speech_rate = 0.8
            speech_command = "espeak-ng"
            last_source = "lists/french.txt"
            "#,
        )
        .unwrap();

        let config = Config::resolve(file_config, ConfigOverrides::default(), None);
        assert_eq!(config.speech_lang, "fr-FR");
        assert_eq!(config.speech_rate, 0.8);
        assert_eq!(config.speech_command.as_deref(), Some("espeak-ng"));
        assert!(config.speech_enabled);
        assert_eq!(config.last_source.as_deref(), Some("lists/french.txt"));
    }

    #[test]
    fn overrides_win_over_file() {
        let file_config = FileConfig {
            speech_lang: Some("fr-FR".to_string()),
            speech_rate: Some(0.8),
            speech_enabled: Some(true),
            ..FileConfig::default()
        };
        let overrides = ConfigOverrides {
            speech_lang: Some("de-DE".to_string()),
            speech_rate: Some(1.5),
            speech_command: Some("say".to_string()),
            disable_speech: true,
        };

        let config = Config::resolve(file_config, overrides, None);
        assert_eq!(config.speech_lang, "de-DE");
        assert_eq!(config.speech_rate, 1.5);
        assert_eq!(config.speech_command.as_deref(), Some("say"));
        assert!(!config.speech_enabled);
    }

    #[test]
    fn blank_values_are_ignored() {
        let overrides = ConfigOverrides {
            speech_lang: Some("  ".to_string()),
            speech_rate: Some(1.0),
            speech_command: Some(" ".to_string()),
            disable_speech: false,
        };
        let file_config = FileConfig {
            speech_enabled: Some(false),
            ..FileConfig::default()
        };

        let config = Config::resolve(file_config, overrides, None);
        assert_eq!(config.speech_lang, DEFAULT_LANG);
        assert_eq!(config.speech_command, None);
        assert!(!config.speech_enabled);
    }

    #[test]
    fn blank_override_falls_through_to_file() {
        let overrides = ConfigOverrides {
            speech_lang: Some(" ".to_string()),
            speech_command: Some("".to_string()),
            ..ConfigOverrides::default()
        };
        let file_config = FileConfig {
            speech_lang: Some(" ja-JP ".to_string()),
            speech_command: Some("espeak-ng".to_string()),
            ..FileConfig::default()
        };

        let config = Config::resolve(file_config, overrides, None);
        assert_eq!(config.speech_lang, "ja-JP");
        assert_eq!(config.speech_command.as_deref(), Some("espeak-ng"));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let path = PathBuf::from("/nonexistent/vocab-cli/config.toml");
        assert!(Config::load(Some(path), ConfigOverrides::default()).is_err());
    }

    #[test]
    fn last_source_round_trips_through_file() {
        let path = temp_config_path("last-source");
        let config = Config::resolve(
            FileConfig::default(),
            ConfigOverrides::default(),
            Some(path.clone()),
        );
        config.save_last_source("lists/words.csv").unwrap();

        let reloaded = Config::load(Some(path.clone()), ConfigOverrides::default()).unwrap();
        if let Some(parent) = path.parent() {
            fs::remove_dir_all(parent).unwrap();
        }

        assert_eq!(reloaded.last_source.as_deref(), Some("lists/words.csv"));
    }
}
