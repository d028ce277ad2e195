//! Voice I/O: speech-to-text capture and text-to-speech feedback.
//!
//! Both engines are external commands configured in `[voice]` of the config
//! file, wrapped behind traits so the session can be driven by scripted
//! implementations in tests. Capture has a hard listen timeout; speech
//! playback is fire-and-forget and never awaited by anyone.

use async_trait::async_trait;
use std::{process::Stdio, sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{process::Command, time::timeout};

use skycast_core::config::VoiceConfig;

/// How long a capture waits for the microphone before giving up.
pub const LISTEN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Error)]
pub enum VoiceError {
    #[error("Could not understand audio")]
    Unintelligible,

    #[error("Speech service unavailable")]
    ServiceUnavailable,

    #[error("Microphone error")]
    Microphone,
}

#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Capture one utterance and return the recognized text.
    async fn capture_speech(&self) -> Result<String, VoiceError>;
}

pub trait SpeechSynthesizer: Send + Sync {
    /// Queue `text` for playback. Must never block the caller; failures are
    /// logged and otherwise ignored.
    fn speak(&self, text: &str);
}

/// Recognizer backed by a shell command that prints recognized text to stdout.
pub struct CommandRecognizer {
    command: Option<String>,
    listen_timeout: Duration,
}

impl CommandRecognizer {
    pub fn new(command: Option<String>) -> Self {
        Self { command, listen_timeout: LISTEN_TIMEOUT }
    }

    #[cfg(test)]
    fn with_timeout(command: &str, listen_timeout: Duration) -> Self {
        Self { command: Some(command.to_string()), listen_timeout }
    }
}

#[async_trait]
impl SpeechRecognizer for CommandRecognizer {
    async fn capture_speech(&self) -> Result<String, VoiceError> {
        let Some(command) = &self.command else {
            return Err(VoiceError::ServiceUnavailable);
        };

        let child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.listen_timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("speech recognizer failed to run: {e}");
                return Err(VoiceError::Microphone);
            }
            Err(_) => return Err(VoiceError::Microphone),
        };

        if !output.status.success() {
            tracing::debug!("speech recognizer exited with {}", output.status);
            return Err(VoiceError::ServiceUnavailable);
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            return Err(VoiceError::Unintelligible);
        }

        Ok(text)
    }
}

/// Synthesizer backed by a shell command receiving the text as its last
/// argument (e.g. `espeak` or `say`).
pub struct CommandSynthesizer {
    command: Option<String>,
}

impl CommandSynthesizer {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&self, text: &str) {
        let Some(command) = self.command.clone() else {
            tracing::debug!("no speak command configured; skipping voice feedback");
            return;
        };
        let text = text.to_string();

        // Detached on purpose: nothing ever awaits voice feedback.
        tokio::spawn(async move {
            let status = Command::new("sh")
                .arg("-c")
                .arg(format!("{command} \"$@\""))
                .arg("skycast-tts")
                .arg(&text)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;

            match status {
                Ok(s) if s.success() => {}
                Ok(s) => tracing::debug!("speak command exited with {s}"),
                Err(e) => tracing::debug!("speak command failed to run: {e}"),
            }
        });
    }
}

/// The two speech channels the controller effects are wired to.
#[derive(Clone)]
pub struct VoiceBridge {
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl VoiceBridge {
    pub fn from_config(voice: &VoiceConfig) -> Self {
        Self {
            recognizer: Arc::new(CommandRecognizer::new(voice.recognize_command.clone())),
            synthesizer: Arc::new(CommandSynthesizer::new(voice.speak_command.clone())),
        }
    }
}
