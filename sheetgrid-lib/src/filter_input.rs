//! Debounced filter input.

use std::time::Duration;
use std::time::Instant;

/// Quiet period after the last keystroke before a filter is committed.
pub const DEFAULT_FILTER_DELAY: Duration = Duration::from_millis(300);

/// Separates what the user is typing from the filter actually queried.
///
/// Every keystroke updates the draft. The draft becomes the committed filter
/// only after it has stayed unchanged for the configured delay, and only if it
/// differs from the current committed value. Typing "acme" quickly therefore
/// produces a single cache key instead of one per character.
///
/// Time is passed in explicitly so callers drive it from their event loop.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use sheetgrid_lib::FilterInput;
///
/// let mut input = FilterInput::new();
/// let t0 = Instant::now();
///
/// input.edit("ac", t0);
/// input.edit("acme", t0 + Duration::from_millis(100));
/// assert_eq!(input.poll(t0 + Duration::from_millis(200)), None);
/// assert_eq!(input.poll(t0 + Duration::from_millis(400)).as_deref(), Some("acme"));
/// ```
#[derive(Debug, Clone)]
pub struct FilterInput {
    draft: String,
    committed: String,
    edited_at: Option<Instant>,
    delay: Duration,
}

impl FilterInput {
    /// Creates an empty input with the default delay.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_FILTER_DELAY)
    }

    /// Creates an empty input with a custom delay.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            draft: String::new(),
            committed: String::new(),
            edited_at: None,
            delay,
        }
    }

    /// Records a keystroke: replaces the draft and restarts the quiet period.
    pub fn edit(&mut self, text: impl Into<String>, now: Instant) {
        self.draft = text.into();
        self.edited_at = Some(now);
    }

    /// Commits the draft if the quiet period has elapsed.
    ///
    /// Returns the newly committed filter, or `None` if nothing changed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let edited_at = self.edited_at?;
        if now.saturating_duration_since(edited_at) < self.delay {
            return None;
        }
        self.commit_now()
    }

    /// Commits the draft immediately, e.g. when the user presses enter.
    pub fn commit_now(&mut self) -> Option<String> {
        self.edited_at = None;
        if self.draft == self.committed {
            return None;
        }
        self.committed = self.draft.clone();
        Some(self.committed.clone())
    }

    /// Returns the text as typed.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Returns the filter currently in effect.
    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Returns when the pending draft will be committed, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.edited_at.map(|t| t + self.delay)
    }

    /// Returns the configured quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FilterInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keystrokes_within_delay_commit_once() {
        let mut input = FilterInput::with_delay(Duration::from_millis(100));
        let t0 = Instant::now();

        let mut commits = Vec::new();
        for (i, text) in ["f", "fi", "fin", "fina"].iter().enumerate() {
            let now = t0 + Duration::from_millis(30 * i as u64);
            input.edit(*text, now);
            commits.extend(input.poll(now));
        }
        commits.extend(input.poll(t0 + Duration::from_millis(500)));

        assert_eq!(commits, vec!["fina".to_string()]);
        assert_eq!(input.committed(), "fina");
    }

    #[test]
    fn test_unchanged_value_not_recommitted() {
        let mut input = FilterInput::with_delay(Duration::ZERO);
        let t0 = Instant::now();

        input.edit("x", t0);
        assert_eq!(input.poll(t0).as_deref(), Some("x"));

        input.edit("xy", t0);
        input.edit("x", t0);
        assert_eq!(input.poll(t0), None);
    }

    #[test]
    fn test_commit_now_and_deadline() {
        let mut input = FilterInput::new();
        let t0 = Instant::now();

        assert_eq!(input.deadline(), None);
        input.edit("acme", t0);
        assert_eq!(input.deadline(), Some(t0 + DEFAULT_FILTER_DELAY));
        assert_eq!(input.commit_now().as_deref(), Some("acme"));
        assert_eq!(input.deadline(), None);
    }
}
