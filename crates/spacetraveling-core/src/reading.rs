//! Read-time estimation.
//!
//! The estimate counts whitespace-delimited words in every section heading and
//! body block, then divides by a fixed reading speed.

use crate::content::ContentSection;

/// Assumed reading speed.
pub const WORDS_PER_MINUTE: u32 = 200;

/// Rounding applied to the fractional minute count.
pub const ROUNDING: Rounding = Rounding::Up;

/// How a fractional number of minutes becomes a whole number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Always round up (ceiling).
    Up,
    /// Always round down (floor).
    Down,
    /// Round half up.
    Nearest,
}

impl Rounding {
    fn divide(self, words: u64, per_minute: u64) -> u64 {
        match self {
            Self::Up => words.div_ceil(per_minute),
            Self::Down => words / per_minute,
            Self::Nearest => (words + per_minute / 2) / per_minute,
        }
    }
}

/// Number of whitespace-delimited words in a string.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Total words across headings and body blocks.
pub fn total_words(content: &[ContentSection]) -> usize {
    content
        .iter()
        .map(|section| {
            word_count(&section.heading)
                + section
                    .body
                    .iter()
                    .map(|block| word_count(&block.text))
                    .sum::<usize>()
        })
        .sum()
}

/// Estimated reading time in minutes with the default speed and rounding.
pub fn estimate(content: &[ContentSection]) -> u32 {
    estimate_with(content, WORDS_PER_MINUTE, ROUNDING)
}

/// Estimated reading time in minutes.
///
/// A `words_per_minute` of zero is treated as one.
pub fn estimate_with(content: &[ContentSection], words_per_minute: u32, rounding: Rounding) -> u32 {
    let words = total_words(content) as u64;
    let minutes = rounding.divide(words, u64::from(words_per_minute.max(1)));
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextBlock;

    fn section_with_words(words: usize) -> ContentSection {
        ContentSection {
            heading: String::new(),
            body: vec![RichTextBlock::paragraph(vec!["palavra"; words].join(" "))],
        }
    }

    #[test]
    fn test_empty_content_is_zero() {
        assert_eq!(estimate(&[]), 0);
    }

    #[test]
    fn test_small_post_rounds_up() {
        let content = vec![ContentSection::with_paragraphs("a b c", &["d e"])];
        assert_eq!(total_words(&content), 5);
        assert_eq!(estimate(&content), 1);
    }

    #[test]
    fn test_exact_boundaries() {
        assert_eq!(estimate(&[section_with_words(200)]), 1);
        assert_eq!(estimate(&[section_with_words(201)]), 2);
        assert_eq!(estimate(&[section_with_words(400)]), 2);
    }

    #[test]
    fn test_sums_across_sections_and_blocks() {
        let content = vec![
            ContentSection::with_paragraphs("Primeira parte", &["um dois", "três"]),
            ContentSection::with_paragraphs("Segunda", &["quatro  cinco\tseis\nsete"]),
        ];
        assert_eq!(total_words(&content), 2 + 3 + 1 + 4);
    }

    #[test]
    fn test_extra_whitespace_is_not_a_word() {
        assert_eq!(word_count("  a   b  "), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
    }

    #[test]
    fn test_monotonic_in_word_count() {
        let mut last = 0;
        for words in (0..=1000).step_by(7) {
            let minutes = estimate(&[section_with_words(words)]);
            assert!(minutes >= last, "{words} words gave {minutes} < {last}");
            last = minutes;
        }
    }

    #[test]
    fn test_custom_speed_and_rounding() {
        let content = [section_with_words(250)];
        assert_eq!(estimate_with(&content, 200, Rounding::Up), 2);
        assert_eq!(estimate_with(&content, 200, Rounding::Down), 1);
        assert_eq!(estimate_with(&content, 200, Rounding::Nearest), 1);
        assert_eq!(estimate_with(&[section_with_words(300)], 200, Rounding::Nearest), 2);
        assert_eq!(estimate_with(&content, 100, Rounding::Up), 3);
        assert_eq!(estimate_with(&content, 0, Rounding::Up), 250);
    }
}
