// Character and word counts shown alongside the editor.

use serde::{Deserialize, Serialize};

use super::plain_text;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextStats {
    pub characters: usize,
    pub words: usize,
}

impl TextStats {
    /// Counts are taken over the rendered text, not the raw markup.
    pub fn of(content: &str) -> Self {
        let text = plain_text(content);
        Self { characters: text.chars().count(), words: text.split_whitespace().count() }
    }
}

#[cfg(test)]
mod tests {
    use super::TextStats;

    #[test]
    fn empty_content_has_zero_counts() {
        assert_eq!(TextStats::of(""), TextStats { characters: 0, words: 0 });
    }

    #[test]
    fn counts_words_and_characters() {
        let stats = TextStats::of("Hello brave new world");
        assert_eq!(stats.words, 4);
        assert_eq!(stats.characters, 21);
    }

    #[test]
    fn markup_is_not_counted() {
        let stats = TextStats::of("<b>Hi</b> <i>there</i>");
        assert_eq!(stats, TextStats { characters: 8, words: 2 });
    }

    #[test]
    fn characters_are_unicode_scalars() {
        assert_eq!(TextStats::of("héllo").characters, 5);
    }
}
