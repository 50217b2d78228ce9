use crate::{AVERAGE_WORD_LENGTH, Float, Minutes};

/// Calculate Words Per Minute
///
/// * `chars_typed` - How many characters are currently in the input
/// * `minutes` - How many minutes have gone by since the session started
///
/// Returns `0.0` when `minutes` is non-positive, guarding the early-division
/// blowup right after the first keystroke.
pub fn wpm(chars_typed: usize, minutes: Minutes) -> Float {
    if minutes <= 0.0 {
        return 0.0;
    }

    (chars_typed as Float / AVERAGE_WORD_LENGTH as Float) / minutes
}

/// Calculate typing accuracy as a percentage between 0.0 and 100.0
///
/// * `keys_pressed` - Total characters ever added to the input
/// * `mistakes` - Total added characters that did not match the target
///
/// Both counters are cumulative ratchets: a later correction does not remove
/// an earlier mistake from the denominator.
///
/// Returns `None` before the first keystroke — "no data yet" is distinct from
/// both 0% and 100%, and defaulting to either reads wrong to a user who has
/// not typed anything.
pub fn accuracy(keys_pressed: usize, mistakes: usize) -> Option<Float> {
    if keys_pressed == 0 {
        return None;
    }

    let correct = keys_pressed.saturating_sub(mistakes);
    let percent = (correct as Float / keys_pressed as Float) * 100.0;

    Some(percent.max(0.0))
}
