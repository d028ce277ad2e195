//! Interactive session loop.
//!
//! The loop owns the [`AppController`] and is the only place state is
//! mutated. Fetches, speech capture and the delayed dismissal of transient
//! errors run as spawned tasks that report back over an mpsc channel as
//! events; the loop applies them one at a time and re-renders from state.

use anyhow::Result;
use inquire::{
    CustomUserError, InquireError, Text,
    autocompletion::{Autocomplete, Replacement},
};
use std::sync::Arc;
use tokio::{sync::mpsc, task};

use skycast_core::{FetchWeather, SearchHistory, history};

use crate::{
    controller::{AppController, Effect, Event, Phase},
    render,
    voice::VoiceBridge,
};

const HELP: &str = "type a city name, or /unit /theme /voice /history /quit";

/// History-backed autocomplete for the city prompt. Works on a snapshot so
/// the prompt thread never reaches into live state; each keystroke is also
/// reported back to the controller as an input-change event.
#[derive(Clone)]
struct CityAutocomplete {
    entries: Vec<String>,
    tx: mpsc::UnboundedSender<Event>,
}

impl Autocomplete for CityAutocomplete {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        let _ = self.tx.send(Event::InputChanged(input.to_string()));

        let input = input.trim();
        if input.is_empty() {
            // Empty input hides suggestions instead of querying the store.
            return Ok(Vec::new());
        }
        Ok(history::suggest_from(&self.entries, input))
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

pub struct Session {
    controller: AppController,
    fetcher: Arc<dyn FetchWeather>,
    voice: VoiceBridge,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Session {
    pub fn new(history: SearchHistory, fetcher: Arc<dyn FetchWeather>, voice: VoiceBridge) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { controller: AppController::new(history), fetcher, voice, tx, rx }
    }

    pub async fn run(mut self) -> Result<()> {
        loop {
            self.drain_pending();

            let entries = self.controller.history().to_vec();
            let Some(line) = prompt(entries, self.tx.clone()).await? else {
                break;
            };

            // The prompt round is over: the field lost focus, which always
            // hides suggestions immediately.
            self.drain_pending();
            self.dispatch(Event::FocusLost);

            match line.trim() {
                "/quit" | "/q" => break,
                "/unit" => self.dispatch(Event::ToggleUnit),
                "/theme" => self.dispatch(Event::ToggleTheme),
                "/voice" => self.dispatch(Event::BeginVoiceCapture),
                "/history" => {
                    self.print_history();
                    continue;
                }
                other => self.dispatch(Event::Submit(other.to_string())),
            }

            self.settle().await;
            print!("{}", render::render(self.controller.state()));
        }

        Ok(())
    }

    /// Apply one event and execute whatever effects it declared.
    fn dispatch(&mut self, event: Event) {
        for effect in self.controller.handle(event) {
            self.run_effect(effect);
        }
    }

    /// Block (asynchronously) until no fetch or capture is outstanding.
    async fn settle(&mut self) {
        while matches!(self.controller.state().phase, Phase::Loading | Phase::Listening) {
            let Some(event) = self.rx.recv().await else { break };
            self.dispatch(event);
        }
    }

    /// Apply events that arrived between prompts, e.g. the delayed clear of a
    /// transient voice error.
    fn drain_pending(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch { seq, city } => {
                let fetcher = Arc::clone(&self.fetcher);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let event = match fetcher.fetch_by_city(&city).await {
                        Ok(reading) => Event::FetchResolved { seq, reading },
                        Err(e) => Event::FetchFailed { seq, message: e.to_string() },
                    };
                    let _ = tx.send(event);
                });
            }
            Effect::CaptureSpeech => {
                let recognizer = Arc::clone(&self.voice.recognizer);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let event = match recognizer.capture_speech().await {
                        Ok(text) => Event::Submit(text),
                        Err(e) => Event::SpeechFailed(e.to_string()),
                    };
                    let _ = tx.send(event);
                });
            }
            Effect::Speak(text) => self.voice.synthesizer.speak(&text),
            Effect::ClearTransientErrorAfter(delay) => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Event::ClearTransientError);
                });
            }
        }
    }

    fn print_history(&self) {
        let p = self.controller.state().theme.palette();
        let entries = self.controller.history().entries();
        if entries.is_empty() {
            println!("{}No searches yet.{}", p.dim, p.reset);
            return;
        }
        for entry in entries {
            println!("{}  {entry}{}", p.dim, p.reset);
        }
    }

    #[cfg(test)]
    fn controller(&self) -> &AppController {
        &self.controller
    }
}

/// One prompt round on the blocking thread pool. `None` means the user asked
/// to leave (Esc or Ctrl-C).
async fn prompt(entries: Vec<String>, tx: mpsc::UnboundedSender<Event>) -> Result<Option<String>> {
    task::spawn_blocking(move || {
        let result = Text::new("City:")
            .with_autocomplete(CityAutocomplete { entries, tx })
            .with_help_message(HELP)
            .prompt();

        match result {
            Ok(line) => Ok(Some(line)),
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
            Err(e) => Err(e.into()),
        }
    })
    .await?
}
