use std::{fs, path::PathBuf};

/// Hard cap on persisted entries.
pub const MAX_ENTRIES: usize = 50;

/// Maximum number of autocomplete candidates offered at once.
pub const MAX_SUGGESTIONS: usize = 5;

/// Recency-ordered, case-insensitively de-duplicated list of past search
/// terms: the app's only durable state.
///
/// Persistence is best-effort: a missing or unreadable file loads as empty,
/// and a failed write never propagates to the caller. A recency cache is not
/// critical data.
#[derive(Debug)]
pub struct SearchHistory {
    path: Option<PathBuf>,
    entries: Vec<String>,
}

impl SearchHistory {
    /// Load persisted history. Never fails: any problem yields an empty store.
    pub fn load(path: PathBuf) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<String>>(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::debug!("ignoring malformed history file {}: {e}", path.display());
                    Vec::new()
                }
            },
            Err(e) => {
                tracing::debug!("no readable history at {}: {e}", path.display());
                Vec::new()
            }
        };

        Self { path: Some(path), entries }
    }

    /// A store that never touches disk. Used by tests and one-shot commands.
    pub fn in_memory() -> Self {
        Self { path: None, entries: Vec::new() }
    }

    /// Most-recent-first entries.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Case-insensitive move-to-front insert, truncated to [`MAX_ENTRIES`],
    /// persisted immediately. The first-seen spelling of a city wins.
    ///
    /// Called only after a successful fetch; failed lookups are never recorded.
    pub fn record(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        let existing = self
            .entries
            .iter()
            .position(|e| e.eq_ignore_ascii_case(city));

        let entry = match existing {
            Some(idx) => self.entries.remove(idx),
            None => city.to_string(),
        };
        self.entries.insert(0, entry);
        self.entries.truncate(MAX_ENTRIES);

        self.persist();
    }

    /// Up to [`MAX_SUGGESTIONS`] entries containing `partial` as a
    /// case-insensitive substring, in recency order. When nothing matches,
    /// falls back to the most recent entries unfiltered.
    ///
    /// The UI layer never calls this with empty input; empty input hides the
    /// suggestion list instead.
    pub fn suggest(&self, partial: &str) -> Vec<String> {
        suggest_from(&self.entries, partial)
    }

    /// Snapshot for UI layers that filter on their own thread.
    pub fn to_vec(&self) -> Vec<String> {
        self.entries.clone()
    }

    /// Rewrite the whole file. Failures are swallowed: logged, never surfaced.
    fn persist(&self) {
        let Some(path) = &self.path else { return };

        let result = (|| -> anyhow::Result<()> {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let json = serde_json::to_string_pretty(&self.entries)?;
            fs::write(path, json)?;
            Ok(())
        })();

        if let Err(e) = result {
            tracing::warn!("failed to persist search history to {}: {e}", path.display());
        }
    }
}

/// The suggestion policy, usable against any most-recent-first snapshot.
pub fn suggest_from(entries: &[String], partial: &str) -> Vec<String> {
    let needle = partial.to_lowercase();

    let matches: Vec<String> = entries
        .iter()
        .filter(|e| e.to_lowercase().contains(&needle))
        .take(MAX_SUGGESTIONS)
        .cloned()
        .collect();

    if !matches.is_empty() {
        return matches;
    }

    entries.iter().take(MAX_SUGGESTIONS).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(entries: &[&str]) -> SearchHistory {
        let mut h = SearchHistory::in_memory();
        // record() prepends, so feed in reverse to get the listed order.
        for e in entries.iter().rev() {
            h.record(e);
        }
        h
    }

    #[test]
    fn record_moves_to_front() {
        let mut h = history_with(&["London", "Berlin", "Lisbon"]);

        h.record("Berlin");
        assert_eq!(h.entries(), ["Berlin", "London", "Lisbon"]);
    }

    #[test]
    fn record_dedupes_case_insensitively() {
        let mut h = SearchHistory::in_memory();

        h.record("London");
        h.record("LONDON");

        assert_eq!(h.entries(), ["London"]);
    }

    #[test]
    fn record_ignores_blank_input() {
        let mut h = SearchHistory::in_memory();
        h.record("   ");
        assert!(h.entries().is_empty());
    }

    #[test]
    fn history_is_capped() {
        let mut h = SearchHistory::in_memory();
        for i in 0..120 {
            h.record(&format!("City{i}"));
        }

        assert_eq!(h.entries().len(), MAX_ENTRIES);
        assert_eq!(h.entries()[0], "City119");
    }

    #[test]
    fn suggest_matches_substring_in_recency_order() {
        let h = history_with(&["London", "Berlin", "Lisbon"]);

        assert_eq!(h.suggest("lon"), ["London", "Lisbon"]);
    }

    #[test]
    fn suggest_falls_back_to_recent_when_nothing_matches() {
        let h = history_with(&["London", "Berlin", "Lisbon"]);

        assert_eq!(h.suggest("zzz"), ["London", "Berlin", "Lisbon"]);
    }

    #[test]
    fn suggest_is_bounded() {
        let mut h = SearchHistory::in_memory();
        for i in 0..10 {
            h.record(&format!("Lon{i}"));
        }

        assert_eq!(h.suggest("lon").len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let h = SearchHistory::load(PathBuf::from("/nonexistent/dir/history.json"));
        assert!(h.entries().is_empty());
    }

    #[test]
    fn record_persists_and_reloads() {
        let path = std::env::temp_dir()
            .join(format!("skycast-history-test-{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut h = SearchHistory::load(path.clone());
        h.record("London");
        h.record("Tokyo");

        let reloaded = SearchHistory::load(path.clone());
        assert_eq!(reloaded.entries(), ["Tokyo", "London"]);

        let _ = fs::remove_file(&path);
    }
}
