//! Reading-time estimate for a passage of text.
//!
//! Pure and stateless. Absent, empty or whitespace-only input reads as 0 minutes;
//! anything with at least one word reads as at least 1 minute.

use serde::Serialize;
use std::fmt;

/// Assumed reading speed in words per minute.
pub const READING_SPEED_WPM: usize = 200;

/// Word count and rounded-up minutes for a passage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadingTime {
    pub words: usize,
    pub minutes: u32,
}

impl ReadingTime {
    pub fn of(text: Option<&str>) -> Self {
        let words = match text {
            Some(t) if !t.is_empty() => count_words(t),
            _ => 0,
        };
        Self {
            words,
            minutes: minutes_for(words),
        }
    }
}

impl fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min read", self.minutes)
    }
}

/// Number of maximal non-whitespace runs in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn minutes_for(words: usize) -> u32 {
    if words == 0 {
        return 0;
    }
    let minutes = words.div_ceil(READING_SPEED_WPM).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Estimated minutes to read `text`.
pub fn calculate_reading_time(text: Option<&str>) -> u32 {
    ReadingTime::of(text).minutes
}

/// `"<N> min read"` for `text`, using the same estimate as [`calculate_reading_time`].
pub fn reading_time_string(text: Option<&str>) -> String {
    ReadingTime::of(text).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    #[test]
    fn test_absent_and_empty_read_as_zero() {
        assert_eq!(calculate_reading_time(None), 0);
        assert_eq!(calculate_reading_time(Some("")), 0);
        assert_eq!(calculate_reading_time(Some("   \t\n ")), 0);
        assert_eq!(reading_time_string(None), "0 min read");
    }

    #[test]
    fn test_whitespace_kind_does_not_matter() {
        assert_eq!(count_words("a   b\tc\nd"), 4);
        assert_eq!(count_words("  leading and trailing  "), 3);
        assert_eq!(count_words("\u{00a0}nbsp\u{2003}em"), 2);
    }

    #[test]
    fn test_short_text_clamps_to_one_minute() {
        assert_eq!(calculate_reading_time(Some("hello")), 1);
        assert_eq!(calculate_reading_time(Some(&words(199))), 1);
        assert_eq!(reading_time_string(Some("hello")), "1 min read");
    }

    #[test]
    fn test_boundaries_round_up() {
        assert_eq!(calculate_reading_time(Some(&words(200))), 1);
        assert_eq!(calculate_reading_time(Some(&words(201))), 2);
        assert_eq!(calculate_reading_time(Some(&words(400))), 2);
        assert_eq!(calculate_reading_time(Some(&words(1001))), 6);
    }

    #[test]
    fn test_monotonic_over_prefixes() {
        let text = words(1000);
        let mut last = 0;
        for end in (0..=text.len()).step_by(37) {
            let minutes = calculate_reading_time(Some(&text[..end]));
            assert!(minutes >= last, "prefix {end} went from {last} to {minutes}");
            last = minutes;
        }
    }

    #[test]
    fn test_string_matches_number() {
        for text in ["", "one", "a b c", &words(200), &words(201), &words(777)] {
            assert_eq!(
                reading_time_string(Some(text)),
                format!("{} min read", calculate_reading_time(Some(text)))
            );
        }
    }

    #[test]
    fn test_reading_time_carries_word_count() {
        let rt = ReadingTime::of(Some("a b\n\nc"));
        assert_eq!(rt.words, 3);
        assert_eq!(rt.minutes, 1);
        assert_eq!(rt.to_string(), "1 min read");
    }
}
