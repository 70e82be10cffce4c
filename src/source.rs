// Text sources for the demo window. Each returns a producer the particle
// group polls once per frame; the particles only move when the string changes.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use particle_text::TextSource;

/// UTC wall clock, `HH:MM:SS`. Visual: digits morph once a second.
pub fn clock() -> TextSource {
    Box::new(|| {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format_hms(secs % 86_400)
    })
}

/// Time since the window opened, `MM:SS.t`. Visual: the last digit churns every 100 ms.
pub fn stopwatch() -> TextSource {
    let started = Instant::now();
    Box::new(move || {
        let tenths = started.elapsed().as_millis() / 100;
        format!("{:02}:{:02}.{}", (tenths / 600) % 100, (tenths / 10) % 60, tenths % 10)
    })
}

/// Cycle through `words`, switching every `interval_secs`.
pub fn words(words: Vec<String>, interval_secs: f64) -> TextSource {
    let started = Instant::now();
    let interval = interval_secs.max(0.1);
    Box::new(move || {
        if words.is_empty() {
            return String::new();
        }
        let step = (started.elapsed().as_secs_f64() / interval) as usize;
        words[step % words.len()].clone()
    })
}

fn format_hms(secs_of_day: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs_of_day / 3600, (secs_of_day / 60) % 60, secs_of_day % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hms_is_zero_padded() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(3_725), "01:02:05");
        assert_eq!(format_hms(86_399), "23:59:59");
    }

    #[test]
    fn words_start_at_the_first_entry() {
        let mut next = words(vec!["HELLO".into(), "RUST".into()], 60.0);
        assert_eq!(next(), "HELLO");
        assert_eq!(next(), "HELLO");
    }

    #[test]
    fn empty_word_list_shows_nothing() {
        let mut next = words(Vec::new(), 1.0);
        assert_eq!(next(), "");
    }

    #[test]
    fn stopwatch_starts_near_zero() {
        let mut next = stopwatch();
        assert!(next().starts_with("00:0"));
    }
}
