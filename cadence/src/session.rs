//! # Session Module - Input State Machine
//!
//! This module owns all mutable state of a typing session: the input buffer,
//! the start latch, the keystroke/mistake ratchets and the terminal
//! completion flag. Every mutation goes through one of the edit operations
//! below, which enforce the two session invariants:
//!
//! - the input never grows past the target length, and
//! - no key other than Enter can move the caret past an expected newline.
//!
//! Edits that would violate either invariant are *silently ignored* — they
//! are ordinary fast-typing behavior (keys pressed past the end of the
//! snippet), not errors.
//!
//! ## Session Lifecycle
//!
#![doc = simple_mermaid::mermaid!("../diagrams/session_flow.mmd")]
//!
//! ## Usage Example
//!
//! ```rust
//! use cadence::{EditOutcome, TargetText, TypingSession};
//!
//! let target = TargetText::new("hi").unwrap();
//! let mut session = TypingSession::new(target);
//!
//! // The first character starts the session clock
//! let outcome = session.press_char('h');
//! assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.started));
//!
//! session.press_char('i');
//! assert!(session.is_complete());
//! assert_eq!(session.accuracy(), Some(100.0));
//! ```

use crate::clock::{Clock, Duration, SystemClock};
use crate::diff::{CharClass, classify, normalize_input};
use crate::text::TargetText;
use crate::{Float, metrics, minutes};
use web_time::Instant;

/// The result of attempting an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The edit violated a session invariant and was ignored.
    Rejected,
    /// The edit was applied.
    Applied(EditDelta),
}

impl EditOutcome {
    /// Whether the edit was applied.
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// What an applied edit changed, including the two session edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditDelta {
    pub chars_added: usize,
    pub chars_removed: usize,
    /// How many of the added characters did not match the target.
    pub mistakes_added: usize,
    /// This edit performed the session's one start transition.
    pub started: bool,
    /// This edit completed the session.
    pub completed: bool,
}

/// A typing session against a fixed [`TargetText`].
///
/// The session is the single authority for its own state: the current input,
/// when typing started, how many characters were ever added and how many of
/// those were mistakes. The counters are monotonic ratchets — deletions
/// never decrement them, so they measure effort expended rather than the
/// current error count.
///
/// Completion is terminal: once the input equals the target, no operation
/// can un-complete the session, and the completion instant is frozen so
/// late metric reads keep reporting the final values.
///
/// # Thread Safety
///
/// A session is single-threaded by construction; all mutation happens
/// synchronously on the thread delivering input events.
#[derive(Debug, Clone)]
pub struct TypingSession<C: Clock = SystemClock> {
    target: TargetText,
    input: Vec<char>,
    started_at: Option<Instant>,
    completed_at: Option<Instant>,
    keys_pressed: usize,
    mistakes: usize,
    clock: C,
}

impl TypingSession<SystemClock> {
    /// Create a session against `target`, timed by the system clock.
    pub fn new(target: TargetText) -> Self {
        Self::with_clock(target, SystemClock)
    }
}

impl<C: Clock> TypingSession<C> {
    /// Create a session with an injected clock.
    ///
    /// All elapsed-time reads (and therefore WPM) come from `clock`, which
    /// makes timing-dependent behavior deterministic under test.
    pub fn with_clock(target: TargetText, clock: C) -> Self {
        Self {
            target,
            input: vec![],
            started_at: None,
            completed_at: None,
            keys_pressed: 0,
            mistakes: 0,
            clock,
        }
    }

    /// The target bound to this session.
    pub fn target(&self) -> &TargetText {
        &self.target
    }

    /// The clock driving this session.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The current input as a string.
    pub fn input(&self) -> String {
        self.input.iter().collect()
    }

    /// The amount of characters currently in the input.
    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    /// Returns true if no characters are currently in the input.
    pub fn is_input_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Total characters ever added to the input.
    pub fn keys_pressed(&self) -> usize {
        self.keys_pressed
    }

    /// Total added characters that did not match the target.
    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    /// Whether the session clock has started.
    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether the input equals the whole target. Terminal once true.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Time from the first keystroke until now, or until completion once the
    /// session is complete. `None` before the first keystroke.
    pub fn elapsed(&self) -> Option<Duration> {
        let started = self.started_at?;
        let end = self.completed_at.unwrap_or_else(|| self.clock.now());
        Some(end.duration_since(started))
    }

    /// Live words-per-minute reading.
    ///
    /// Pure with respect to session state — safe to recompute on every tick.
    /// Returns `0.0` before the session has started.
    pub fn wpm(&self) -> Float {
        self.elapsed()
            .map(|elapsed| metrics::wpm(self.input.len(), minutes(elapsed)))
            .unwrap_or_default()
    }

    /// Live accuracy reading, `None` before the first keystroke.
    pub fn accuracy(&self) -> Option<Float> {
        metrics::accuracy(self.keys_pressed, self.mistakes)
    }

    /// Classify the whole target against the current input.
    pub fn classify(&self) -> Vec<CharClass> {
        classify(&self.target, &self.input())
    }

    /// Replace the input wholesale, as delivered by a raw edit event.
    ///
    /// This is the entry point for textarea-style input sources (including
    /// paste and IME composition): `new_value` is the full new input. The
    /// edit is rejected when it would exceed the target length, or when any
    /// *added* position places a non-newline character where the target
    /// expects a newline.
    ///
    /// Characters added beyond the previous length bump the keystroke
    /// ratchet, and each added character that mismatches the target bumps
    /// the mistake ratchet. Removed characters decrement neither.
    pub fn apply_edit(&mut self, new_value: &str) -> EditOutcome {
        if self.is_complete() {
            return EditOutcome::Rejected;
        }

        let new_input = normalize_input(new_value);

        if new_input.len() > self.target.text_len() {
            return EditOutcome::Rejected;
        }

        let prev_len = self.input.len();
        let added = new_input.get(prev_len..).unwrap_or_default();

        if self.run_skips_newline(prev_len, added) {
            return EditOutcome::Rejected;
        }

        let mistakes_added = self.count_mismatches(prev_len, added);
        let chars_added = added.len();
        let chars_removed = prev_len.saturating_sub(new_input.len());
        let started = chars_added > 0 && self.mark_started();

        self.keys_pressed += chars_added;
        self.mistakes += mistakes_added;
        self.input = new_input;

        EditOutcome::Applied(EditDelta {
            chars_added,
            chars_removed,
            mistakes_added,
            started,
            completed: self.refresh_completion(),
        })
    }

    /// Type one printable character at the caret.
    ///
    /// Suppressed entirely when the target expects a newline at the caret:
    /// neither space nor any printable character may skip past an expected
    /// line break — the user must press Enter.
    pub fn press_char(&mut self, char: char) -> EditOutcome {
        self.insert_run(&[char])
    }

    /// Insert two spaces at the caret, in place of a native tab character.
    pub fn press_tab(&mut self) -> EditOutcome {
        self.insert_run(&[' ', ' '])
    }

    /// Insert a newline plus the following line's indentation, copied
    /// verbatim from the target.
    ///
    /// Only applies when the target actually expects a newline at the caret;
    /// pressing Enter early is a no-op, so it can never corrupt alignment.
    pub fn press_enter(&mut self) -> EditOutcome {
        let caret = self.input.len();

        if self.target.char_at(caret) != Some('\n') {
            return EditOutcome::Rejected;
        }

        let mut run = vec!['\n'];
        run.extend_from_slice(self.target.indent_run_after(caret));
        self.insert_run(&run)
    }

    /// Remove the character before the caret.
    pub fn press_backspace(&mut self) -> EditOutcome {
        if self.is_complete() || self.input.is_empty() {
            return EditOutcome::Rejected;
        }

        self.input.pop();

        EditOutcome::Applied(EditDelta {
            chars_removed: 1,
            ..EditDelta::default()
        })
    }

    /// Append a run of characters at the caret, enforcing the length ceiling
    /// and the newline guard.
    fn insert_run(&mut self, run: &[char]) -> EditOutcome {
        if self.is_complete() {
            return EditOutcome::Rejected;
        }

        let caret = self.input.len();

        if caret + run.len() > self.target.text_len() {
            return EditOutcome::Rejected;
        }

        if self.run_skips_newline(caret, run) {
            return EditOutcome::Rejected;
        }

        let mistakes_added = self.count_mismatches(caret, run);
        let started = self.mark_started();

        self.keys_pressed += run.len();
        self.mistakes += mistakes_added;
        self.input.extend_from_slice(run);

        EditOutcome::Applied(EditDelta {
            chars_added: run.len(),
            mistakes_added,
            started,
            completed: self.refresh_completion(),
            ..EditDelta::default()
        })
    }

    /// True if placing `run` at `start` would put a non-newline character at
    /// a position where the target expects a newline.
    fn run_skips_newline(&self, start: usize, run: &[char]) -> bool {
        run.iter().enumerate().any(|(offset, &char)| {
            self.target.char_at(start + offset) == Some('\n') && char != '\n'
        })
    }

    /// How many characters of `run`, placed at `start`, mismatch the target.
    fn count_mismatches(&self, start: usize, run: &[char]) -> usize {
        run.iter()
            .enumerate()
            .filter(|&(offset, &char)| self.target.char_at(start + offset) != Some(char))
            .count()
    }

    /// Perform the one start transition. Returns true only the first time.
    fn mark_started(&mut self) -> bool {
        if self.started_at.is_some() {
            return false;
        }

        self.started_at = Some(self.clock.now());
        true
    }

    /// Latch completion when the input equals the target. Returns true only
    /// on the completing edit.
    fn refresh_completion(&mut self) -> bool {
        if self.completed_at.is_some() {
            return false;
        }

        if self.input.len() == self.target.text_len() && self.input == self.target.chars() {
            self.completed_at = Some(self.clock.now());
            return true;
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn session(target: &str) -> TypingSession<ManualClock> {
        TypingSession::with_clock(TargetText::new(target).unwrap(), ManualClock::new())
    }

    fn type_str<C: Clock>(session: &mut TypingSession<C>, chars: &str) {
        for char in chars.chars() {
            if char == '\n' {
                session.press_enter();
            } else {
                session.press_char(char);
            }
        }
    }

    #[test]
    fn test_first_character_starts_session_once() {
        let mut session = session("abc");
        assert!(!session.has_started());

        let outcome = session.press_char('a');
        assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.started));
        assert!(session.has_started());

        // Delete everything and type again - the start latch must not reset
        session.press_backspace();
        assert!(session.is_input_empty());

        let outcome = session.press_char('a');
        assert!(matches!(outcome, EditOutcome::Applied(delta) if !delta.started));
    }

    #[test]
    fn test_counters_are_monotonic_ratchets() {
        let mut session = session("abcd");

        session.press_char('a'); // correct
        session.press_char('x'); // mistake
        assert_eq!(session.keys_pressed(), 2);
        assert_eq!(session.mistakes(), 1);

        // Deleting the mistake does not decrement either counter
        session.press_backspace();
        assert_eq!(session.keys_pressed(), 2);
        assert_eq!(session.mistakes(), 1);

        // Retyping correctly bumps only the keystroke counter
        session.press_char('b');
        assert_eq!(session.keys_pressed(), 3);
        assert_eq!(session.mistakes(), 1);
        assert!(session.mistakes() <= session.keys_pressed());
    }

    #[test]
    fn test_completion_is_terminal() {
        let mut session = session("hi");
        type_str(&mut session, "hi");
        assert!(session.is_complete());

        // No operation can un-complete the session
        assert_eq!(session.press_backspace(), EditOutcome::Rejected);
        assert_eq!(session.apply_edit(""), EditOutcome::Rejected);
        assert_eq!(session.press_char('x'), EditOutcome::Rejected);
        assert!(session.is_complete());
        assert_eq!(session.input(), "hi");
    }

    #[test]
    fn test_completion_edge_fires_once() {
        let mut session = session("ab");
        session.press_char('a');
        let outcome = session.press_char('b');
        assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.completed));
    }

    #[test]
    fn test_length_ceiling() {
        let mut session = session("ab");
        assert!(session.apply_edit("abc") == EditOutcome::Rejected);

        type_str(&mut session, "xy"); // two mistakes, input full
        assert_eq!(session.press_char('z'), EditOutcome::Rejected);
        assert!(!session.is_complete());

        // Backspacing out of a full-but-wrong input still works
        assert!(session.press_backspace().is_applied());
    }

    #[test]
    fn test_newline_cannot_be_skipped() {
        let mut session = session("a\nb");
        session.press_char('a');

        // Neither space nor any printable character may stand in for Enter
        assert_eq!(session.press_char(' '), EditOutcome::Rejected);
        assert_eq!(session.press_char('b'), EditOutcome::Rejected);
        assert_eq!(session.press_tab(), EditOutcome::Rejected);
        assert_eq!(session.apply_edit("a b"), EditOutcome::Rejected);

        assert!(session.press_enter().is_applied());
        session.press_char('b');
        assert!(session.is_complete());
    }

    #[test]
    fn test_enter_is_noop_unless_target_expects_newline() {
        let mut session = session("ab\nc");
        assert_eq!(session.press_enter(), EditOutcome::Rejected);

        session.press_char('a');
        assert_eq!(session.press_enter(), EditOutcome::Rejected);
        assert_eq!(session.input(), "a");
    }

    #[test]
    fn test_enter_copies_target_indentation() {
        let mut session = session("def f():\n    pass");
        type_str(&mut session, "def f():");

        let outcome = session.press_enter();
        assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.chars_added == 5));
        assert_eq!(session.input(), "def f():\n    ");
        assert_eq!(session.mistakes(), 0);
    }

    #[test]
    fn test_tab_inserts_two_spaces() {
        // A tab that would overrun the target is rejected outright
        let mut short = session("a");
        assert_eq!(short.press_tab(), EditOutcome::Rejected);

        let mut session = session("  x");
        let outcome = session.press_tab();
        assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.chars_added == 2));
        assert_eq!(session.input(), "  ");
        assert_eq!(session.mistakes(), 0);
    }

    #[test]
    fn test_raw_edit_counts_added_characters_only() {
        let mut session = session("hello");

        session.apply_edit("hel");
        assert_eq!(session.keys_pressed(), 3);
        assert_eq!(session.mistakes(), 0);

        // Retraction leaves the ratchets untouched
        session.apply_edit("h");
        assert_eq!(session.keys_pressed(), 3);
        assert_eq!(session.input(), "h");

        // Growing again counts only the new positions
        session.apply_edit("hexlo");
        assert_eq!(session.keys_pressed(), 7);
        assert_eq!(session.mistakes(), 1);
    }

    #[test]
    fn test_raw_edit_same_length_replacement() {
        let mut session = session("abc");
        session.apply_edit("ab");

        // Same-length replacement adds no keystrokes
        let outcome = session.apply_edit("xy");
        assert!(matches!(outcome, EditOutcome::Applied(delta) if delta.chars_added == 0));
        assert_eq!(session.keys_pressed(), 2);
        assert_eq!(session.input(), "xy");
    }

    #[test]
    fn test_raw_edit_normalises_crlf() {
        let mut session = session("a\nb");
        assert!(session.apply_edit("a\r\nb").is_applied());
        assert!(session.is_complete());
        assert_eq!(session.mistakes(), 0);
    }

    #[test]
    fn test_accuracy_undefined_until_first_key() {
        let mut session = session("ab");
        assert_eq!(session.accuracy(), None);

        session.press_char('x');
        assert_eq!(session.accuracy(), Some(0.0));

        session.press_backspace();
        session.press_char('a');
        assert_eq!(session.accuracy(), Some(50.0));
    }

    #[test]
    fn test_wpm_uses_injected_clock() {
        let clock = ManualClock::new();
        let target = TargetText::new("hello world").unwrap();
        let mut session = TypingSession::with_clock(target, clock.clone());

        assert_eq!(session.wpm(), 0.0);

        type_str(&mut session, "hello");
        clock.advance(Duration::from_secs(60));

        // 5 chars = 1 word in exactly one minute
        assert!((session.wpm() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_metrics_freeze_at_completion() {
        let clock = ManualClock::new();
        let target = TargetText::new("abc").unwrap();
        let mut session = TypingSession::with_clock(target, clock.clone());

        type_str(&mut session, "ab");
        clock.advance(Duration::from_secs(30));
        type_str(&mut session, "c");
        assert!(session.is_complete());

        let final_wpm = session.wpm();
        let final_elapsed = session.elapsed().unwrap();

        // Time passing after completion changes nothing
        clock.advance(Duration::from_secs(300));
        assert_eq!(session.wpm(), final_wpm);
        assert_eq!(session.elapsed().unwrap(), final_elapsed);
    }

    #[test]
    fn test_end_to_end_indented_snippet() {
        let clock = ManualClock::new();
        let target = TargetText::new("def f():\n    pass").unwrap();
        let mut session = TypingSession::with_clock(target, clock.clone());

        type_str(&mut session, "def f():");
        clock.advance(Duration::from_secs(5));
        session.press_enter();
        type_str(&mut session, "pass");

        assert!(session.is_complete());
        assert_eq!(session.accuracy(), Some(100.0));
        assert!(session.wpm() > 0.0);
    }

    #[test]
    fn test_classify_matches_session_state() {
        let mut session = session("ab");
        session.press_char('a');

        let classes = session.classify();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].status, crate::CharStatus::Match);
        assert_eq!(classes[1].status, crate::CharStatus::Cursor);
    }
}
