//! The app's state machine.
//!
//! All mutable UI state lives in one owned [`AppState`]. Transitions are
//! driven through [`AppController::handle`], which mutates state and returns
//! the side effects the caller must run (fetches, speech capture, spoken
//! feedback, delayed error dismissal). The session loop executes effects on
//! spawned tasks and feeds their results back in as events, so state is only
//! ever touched from one place and no locks are needed.

use std::time::Duration;

use skycast_core::{FetchError, SearchHistory, UnitPreference, WeatherReading};

use crate::render;

/// How long a transient voice error stays on screen before it clears itself.
pub const TRANSIENT_ERROR_CLEAR: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Listening,
    Success,
    Error,
}

/// Cosmetic only; switching never blocks input or touches the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Everything the display is rendered from. The reading stays canonical
/// metric; `unit` only affects formatting.
#[derive(Debug)]
pub struct AppState {
    pub phase: Phase,
    pub unit: UnitPreference,
    pub theme: Theme,
    pub reading: Option<WeatherReading>,
    pub result_visible: bool,
    pub error: Option<String>,
    pub error_is_transient: bool,
    pub suggestions: Vec<String>,
    latest_seq: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            unit: UnitPreference::default(),
            theme: Theme::default(),
            reading: None,
            result_visible: false,
            error: None,
            error_is_transient: false,
            suggestions: Vec::new(),
            latest_seq: 0,
        }
    }
}

#[derive(Debug)]
pub enum Event {
    /// Typed city, selected suggestion, or voice-recognized text.
    Submit(String),
    FetchResolved { seq: u64, reading: WeatherReading },
    FetchFailed { seq: u64, message: String },
    ToggleUnit,
    ToggleTheme,
    BeginVoiceCapture,
    SpeechFailed(String),
    ClearTransientError,
    InputChanged(String),
    FocusLost,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Fetch { seq: u64, city: String },
    CaptureSpeech,
    Speak(String),
    ClearTransientErrorAfter(Duration),
}

pub struct AppController {
    state: AppState,
    history: SearchHistory,
}

impl AppController {
    pub fn new(history: SearchHistory) -> Self {
        Self { state: AppState::default(), history }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    /// Apply one event, returning the effects the caller must execute.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Submit(input) => self.on_submit(&input),
            Event::FetchResolved { seq, reading } => self.on_fetch_resolved(seq, reading),
            Event::FetchFailed { seq, message } => self.on_fetch_failed(seq, message),
            Event::ToggleUnit => {
                self.state.unit = self.state.unit.toggled();
                Vec::new()
            }
            Event::ToggleTheme => {
                self.state.theme = self.state.theme.toggled();
                Vec::new()
            }
            Event::BeginVoiceCapture => self.on_begin_voice_capture(),
            Event::SpeechFailed(message) => self.on_speech_failed(message),
            Event::ClearTransientError => self.on_clear_transient(),
            Event::InputChanged(value) => {
                let value = value.trim().to_string();
                if value.is_empty() {
                    self.state.suggestions.clear();
                } else {
                    self.state.suggestions = self.history.suggest(&value);
                }
                Vec::new()
            }
            Event::FocusLost => {
                self.state.suggestions.clear();
                Vec::new()
            }
        }
    }

    fn on_submit(&mut self, input: &str) -> Vec<Effect> {
        let city = input.trim();
        if city.is_empty() {
            self.show_error(FetchError::Validation.to_string(), false);
            return Vec::new();
        }

        self.state.phase = Phase::Loading;
        self.state.error = None;
        self.state.error_is_transient = false;
        self.state.result_visible = false;
        self.state.suggestions.clear();

        self.state.latest_seq += 1;
        vec![Effect::Fetch { seq: self.state.latest_seq, city: city.to_string() }]
    }

    fn on_fetch_resolved(&mut self, seq: u64, reading: WeatherReading) -> Vec<Effect> {
        if seq != self.state.latest_seq {
            // A newer search superseded this one; only the latest result renders.
            return Vec::new();
        }

        self.history.record(&reading.city);

        let summary = render::speech_summary(&reading, self.state.unit);

        self.state.phase = Phase::Success;
        self.state.reading = Some(reading);
        self.state.result_visible = true;
        self.state.error = None;
        self.state.error_is_transient = false;

        vec![Effect::Speak(summary)]
    }

    fn on_fetch_failed(&mut self, seq: u64, message: String) -> Vec<Effect> {
        if seq != self.state.latest_seq {
            return Vec::new();
        }

        // History is untouched and nothing is spoken on failure.
        self.show_error(message, false);
        Vec::new()
    }

    fn on_begin_voice_capture(&mut self) -> Vec<Effect> {
        if self.state.phase == Phase::Loading || self.state.phase == Phase::Listening {
            return Vec::new();
        }

        self.state.phase = Phase::Listening;
        self.state.error = None;
        self.state.error_is_transient = false;

        vec![Effect::CaptureSpeech]
    }

    fn on_speech_failed(&mut self, message: String) -> Vec<Effect> {
        self.show_error(message, true);
        vec![Effect::ClearTransientErrorAfter(TRANSIENT_ERROR_CLEAR)]
    }

    fn on_clear_transient(&mut self) -> Vec<Effect> {
        if self.state.error_is_transient {
            self.state.error = None;
            self.state.error_is_transient = false;
            if self.state.phase == Phase::Error {
                self.state.phase = Phase::Idle;
            }
        }
        Vec::new()
    }

    fn show_error(&mut self, message: String, transient: bool) {
        self.state.phase = Phase::Error;
        self.state.error = Some(message);
        self.state.error_is_transient = transient;
        self.state.result_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn controller() -> AppController {
        AppController::new(SearchHistory::in_memory())
    }

    fn reading(city: &str) -> WeatherReading {
        WeatherReading {
            city: city.to_string(),
            country: "GB".to_string(),
            temperature_c: 10.0,
            feels_like_c: 9.0,
            humidity_pct: 80,
            wind_speed_mps: 5.0,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            observed_at: Utc::now(),
        }
    }

    fn submit(ctl: &mut AppController, city: &str) -> u64 {
        let effects = ctl.handle(Event::Submit(city.to_string()));
        match effects.as_slice() {
            [Effect::Fetch { seq, .. }] => *seq,
            other => panic!("expected a single fetch effect, got {other:?}"),
        }
    }

    #[test]
    fn empty_submit_shows_validation_error_without_fetch() {
        let mut ctl = controller();

        let effects = ctl.handle(Event::Submit("   ".to_string()));

        assert!(effects.is_empty());
        assert_eq!(ctl.state().phase, Phase::Error);
        assert_eq!(ctl.state().error.as_deref(), Some("Please enter a city name"));
        assert!(ctl.history().entries().is_empty());
    }

    #[test]
    fn submit_enters_loading_and_clears_prior_error() {
        let mut ctl = controller();
        ctl.handle(Event::Submit(String::new()));

        let seq = submit(&mut ctl, "London");

        assert_eq!(seq, 1);
        assert_eq!(ctl.state().phase, Phase::Loading);
        assert!(ctl.state().error.is_none());
        assert!(!ctl.state().result_visible);
    }

    #[test]
    fn success_records_history_and_speaks() {
        let mut ctl = controller();
        let seq = submit(&mut ctl, "london");

        let effects = ctl.handle(Event::FetchResolved { seq, reading: reading("London") });

        assert_eq!(ctl.state().phase, Phase::Success);
        assert!(ctl.state().result_visible);
        assert_eq!(ctl.history().entries(), ["London"]);
        assert!(matches!(&effects[..], [Effect::Speak(msg)] if msg.contains("London")));
    }

    #[test]
    fn failure_shows_message_and_leaves_history_alone() {
        let mut ctl = controller();
        let seq = submit(&mut ctl, "Nowhere12345");

        let effects = ctl.handle(Event::FetchFailed {
            seq,
            message: FetchError::NotFound.to_string(),
        });

        assert!(effects.is_empty());
        assert_eq!(ctl.state().phase, Phase::Error);
        assert_eq!(
            ctl.state().error.as_deref(),
            Some("City not found. Please check the spelling.")
        );
        assert!(ctl.history().entries().is_empty());
    }

    #[test]
    fn loading_is_cleared_on_both_exit_paths() {
        let mut ctl = controller();

        let seq = submit(&mut ctl, "London");
        ctl.handle(Event::FetchResolved { seq, reading: reading("London") });
        assert_ne!(ctl.state().phase, Phase::Loading);

        let seq = submit(&mut ctl, "Berlin");
        ctl.handle(Event::FetchFailed { seq, message: "boom".to_string() });
        assert_ne!(ctl.state().phase, Phase::Loading);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut ctl = controller();

        let first = submit(&mut ctl, "London");
        let second = submit(&mut ctl, "Berlin");
        assert!(second > first);

        // The superseded London result arrives late: no render, no history,
        // no speech, still waiting on the Berlin fetch.
        let effects = ctl.handle(Event::FetchResolved { seq: first, reading: reading("London") });
        assert!(effects.is_empty());
        assert_eq!(ctl.state().phase, Phase::Loading);
        assert!(ctl.state().reading.is_none());
        assert!(ctl.history().entries().is_empty());

        let effects = ctl.handle(Event::FetchResolved { seq: second, reading: reading("Berlin") });
        assert_eq!(effects.len(), 1);
        assert_eq!(ctl.state().phase, Phase::Success);
        assert_eq!(ctl.history().entries(), ["Berlin"]);

        // Same for a stale failure: it must not clobber a newer result.
        let effects = ctl.handle(Event::FetchFailed { seq: first, message: "late".to_string() });
        assert!(effects.is_empty());
        assert_eq!(ctl.state().phase, Phase::Success);
    }

    #[test]
    fn unit_toggle_never_mutates_the_reading() {
        let mut ctl = controller();
        let seq = submit(&mut ctl, "London");
        ctl.handle(Event::FetchResolved { seq, reading: reading("London") });

        ctl.handle(Event::ToggleUnit);
        assert_eq!(ctl.state().unit, UnitPreference::Imperial);
        let r = ctl.state().reading.as_ref().expect("reading kept");
        assert_eq!(r.temperature_c, 10.0);

        ctl.handle(Event::ToggleUnit);
        assert_eq!(ctl.state().unit, UnitPreference::Metric);
    }

    #[test]
    fn unit_toggle_without_reading_is_a_noop_beyond_preference() {
        let mut ctl = controller();
        let effects = ctl.handle(Event::ToggleUnit);
        assert!(effects.is_empty());
        assert!(ctl.state().reading.is_none());
    }

    #[test]
    fn theme_toggle_is_cosmetic() {
        let mut ctl = controller();
        ctl.handle(Event::ToggleTheme);
        assert_eq!(ctl.state().theme, Theme::Dark);
        assert_eq!(ctl.state().phase, Phase::Idle);
    }

    #[test]
    fn voice_capture_round_trip() {
        let mut ctl = controller();

        let effects = ctl.handle(Event::BeginVoiceCapture);
        assert_eq!(effects, vec![Effect::CaptureSpeech]);
        assert_eq!(ctl.state().phase, Phase::Listening);

        // Recognized text is just another submit.
        let seq = submit(&mut ctl, "Tokyo");
        assert_eq!(ctl.state().phase, Phase::Loading);
        assert_eq!(seq, 1);
    }

    #[test]
    fn voice_failure_is_transient_and_auto_clears() {
        let mut ctl = controller();
        ctl.handle(Event::BeginVoiceCapture);

        let effects = ctl.handle(Event::SpeechFailed("Could not understand audio".to_string()));
        assert_eq!(effects, vec![Effect::ClearTransientErrorAfter(TRANSIENT_ERROR_CLEAR)]);
        assert_eq!(ctl.state().phase, Phase::Error);
        assert!(ctl.state().error_is_transient);

        ctl.handle(Event::ClearTransientError);
        assert_eq!(ctl.state().phase, Phase::Idle);
        assert!(ctl.state().error.is_none());
    }

    #[test]
    fn transient_clear_does_not_wipe_real_errors() {
        let mut ctl = controller();
        let seq = submit(&mut ctl, "Nowhere");
        ctl.handle(Event::FetchFailed { seq, message: "not found".to_string() });

        ctl.handle(Event::ClearTransientError);
        assert_eq!(ctl.state().error.as_deref(), Some("not found"));
    }

    #[test]
    fn input_change_drives_suggestions() {
        let mut ctl = controller();
        for city in ["Lisbon", "Berlin", "London"] {
            let seq = submit(&mut ctl, city);
            ctl.handle(Event::FetchResolved { seq, reading: reading(city) });
        }

        ctl.handle(Event::InputChanged("lon".to_string()));
        assert_eq!(ctl.state().suggestions, ["London", "Lisbon"]);

        // Empty input hides the list rather than querying the store.
        ctl.handle(Event::InputChanged("   ".to_string()));
        assert!(ctl.state().suggestions.is_empty());
    }

    #[test]
    fn focus_loss_hides_suggestions() {
        let mut ctl = controller();
        let seq = submit(&mut ctl, "London");
        ctl.handle(Event::FetchResolved { seq, reading: reading("London") });

        ctl.handle(Event::InputChanged("lon".to_string()));
        assert_eq!(ctl.state().suggestions, ["London"]);

        ctl.handle(Event::FocusLost);
        assert!(ctl.state().suggestions.is_empty());
    }
}
