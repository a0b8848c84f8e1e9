//! Pronunciation playback through an injected speech synthesizer.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

pub const MIN_RATE: f32 = 0.1;
pub const MAX_RATE: f32 = 10.0;

/// Words per minute spoken at rate 1.0.
const BASE_WPM: f32 = 175.0;
const MIN_WPM: u32 = 80;
const MAX_WPM: u32 = 450;

/// Programs probed, in order, when no command is configured.
const KNOWN_PROGRAMS: [&str; 3] = ["espeak-ng", "espeak", "say"];

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("failed to start speech program {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stop the current utterance")]
    Cancel(#[source] std::io::Error),

    #[error("failed waiting for the current utterance")]
    Wait(#[source] std::io::Error),
}

pub trait SpeechSynthesizer: Send + Sync {
    fn is_available(&self) -> bool;

    /// Start speaking `text` and return without waiting for it to finish.
    fn speak(&self, text: &str, lang: &str, rate: f32) -> Result<(), SpeechError>;

    /// Stop the utterance in flight, if any.
    fn cancel(&self) -> Result<(), SpeechError>;
}

/// Speak `text`, interrupting whatever is currently being said.
///
/// Does nothing when no synthesizer is available.
pub fn speak(
    synth: Option<&dyn SpeechSynthesizer>,
    text: &str,
    lang: &str,
    rate: f32,
) -> Result<(), SpeechError> {
    let Some(synth) = synth.filter(|s| s.is_available()) else {
        tracing::debug!("speech unavailable, not pronouncing '{}'", text);
        return Ok(());
    };

    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }

    synth.cancel()?;
    synth.speak(text, lang, clamp_rate(rate))
}

pub fn clamp_rate(rate: f32) -> f32 {
    if rate.is_finite() {
        rate.clamp(MIN_RATE, MAX_RATE)
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Espeak,
    Say,
    /// Unknown program, receives the text as its only argument.
    Plain,
}

impl Backend {
    fn for_program(program: &Path) -> Self {
        let stem = program
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if stem.starts_with("espeak") {
            Self::Espeak
        } else if stem == "say" {
            Self::Say
        } else {
            Self::Plain
        }
    }
}

/// Drives a text-to-speech program such as `espeak-ng` or macOS `say`.
#[derive(Debug)]
pub struct CommandSynthesizer {
    program: PathBuf,
    backend: Backend,
    current: Mutex<Option<Child>>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let backend = Backend::for_program(&program);
        Self {
            program,
            backend,
            current: Mutex::new(None),
        }
    }

    /// First known speech program found on `PATH`.
    pub fn detect() -> Option<Self> {
        KNOWN_PROGRAMS
            .iter()
            .find_map(|name| find_program(name))
            .map(Self::new)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Block until the current utterance has finished.
    pub fn wait(&self) -> Result<(), SpeechError> {
        let child = self.lock().take();
        if let Some(mut child) = child {
            child.wait().map_err(SpeechError::Wait)?;
        }
        Ok(())
    }

    fn command(&self, text: &str, lang: &str, rate: f32) -> Command {
        let mut command = Command::new(&self.program);
        match self.backend {
            Backend::Espeak => {
                command
                    .arg("-v")
                    .arg(espeak_voice(lang))
                    .arg("-s")
                    .arg(words_per_minute(rate).to_string());
            }
            Backend::Say => {
                command.arg("-r").arg(words_per_minute(rate).to_string());
            }
            Backend::Plain => {}
        }
        command
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }

    fn lock(&self) -> MutexGuard<'_, Option<Child>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn is_available(&self) -> bool {
        find_program(&self.program.as_os_str().to_string_lossy()).is_some()
    }

    fn speak(&self, text: &str, lang: &str, rate: f32) -> Result<(), SpeechError> {
        let mut current = self.lock();
        stop_child(current.take())?;

        let child = self
            .command(text, lang, rate)
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;
        tracing::debug!("speaking '{}' with {}", text, self.program.display());
        *current = Some(child);
        Ok(())
    }

    fn cancel(&self) -> Result<(), SpeechError> {
        let child = self.lock().take();
        stop_child(child)
    }
}

fn stop_child(child: Option<Child>) -> Result<(), SpeechError> {
    let Some(mut child) = child else {
        return Ok(());
    };

    if child.try_wait().map_err(SpeechError::Cancel)?.is_none() {
        child.kill().map_err(SpeechError::Cancel)?;
    }
    child.wait().map_err(SpeechError::Cancel)?;
    Ok(())
}

fn words_per_minute(rate: f32) -> u32 {
    ((BASE_WPM * clamp_rate(rate)).round() as u32).clamp(MIN_WPM, MAX_WPM)
}

fn espeak_voice(lang: &str) -> String {
    let voice = lang.trim().to_lowercase();
    if voice.is_empty() {
        "en".to_string()
    } else {
        voice
    }
}

/// Resolve a program name against `PATH`, or check an explicit path.
fn find_program(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let paths: OsString = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}
