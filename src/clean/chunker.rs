//! Overlapping word windows.

/// Iterator over overlapping windows of words.
///
/// Windows hold up to `max_words` words and start `max(max_words - overlap, 1)`
/// words apart. Iteration stops after the first window that reaches the last
/// word, so the final window may be shorter than `max_words`.
#[derive(Debug, Clone)]
pub struct WordWindows<'a> {
    words: Vec<&'a str>,
    max_words: usize,
    stride: usize,
    start: usize,
    done: bool,
}

impl<'a> WordWindows<'a> {
    pub fn new(text: &'a str, max_words: usize, overlap_words: usize) -> Self {
        let words: Vec<&str> = text.split_whitespace().collect();
        let done = words.is_empty() || max_words == 0;
        Self {
            words,
            max_words,
            stride: max_words.saturating_sub(overlap_words).max(1),
            start: 0,
            done,
        }
    }

    /// Number of words in the source text.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Restart from the first window.
    pub fn reset(&mut self) {
        self.start = 0;
        self.done = self.words.is_empty() || self.max_words == 0;
    }
}

impl Iterator for WordWindows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        let end = (self.start + self.max_words).min(self.words.len());
        let window = self.words[self.start..end].join(" ");

        if end == self.words.len() {
            self.done = true;
        } else {
            self.start += self.stride;
        }

        Some(window)
    }
}

/// Split text into overlapping windows of at most `max_words` words.
pub fn chunk(text: &str, max_words: usize, overlap_words: usize) -> Vec<String> {
    WordWindows::new(text, max_words, overlap_words).collect()
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_with_overlap() {
        let text = "a b c d e f g";
        assert_eq!(chunk(text, 3, 1), vec!["a b c", "c d e", "e f g"]);
        assert_eq!(chunk(text, 4, 2), vec!["a b c d", "c d e f", "e f g"]);
    }

    #[test]
    fn test_chunk_without_overlap_is_exact_cover() {
        assert_eq!(chunk("a b c d e", 2, 0), vec!["a b", "c d", "e"]);
    }

    #[test]
    fn test_chunk_short_text() {
        assert_eq!(chunk("one two", 512, 64), vec!["one two"]);
        assert!(chunk("", 3, 1).is_empty());
        assert!(chunk("   \n ", 3, 1).is_empty());
    }

    #[test]
    fn test_non_advancing_overlap_is_clamped() {
        assert_eq!(chunk("a b c", 2, 2), vec!["a b", "b c"]);
        assert_eq!(chunk("a b c", 2, 10), vec!["a b", "b c"]);
    }

    #[test]
    fn test_zero_window_yields_nothing() {
        assert!(chunk("a b c", 0, 0).is_empty());
    }

    #[test]
    fn test_windows_restart() {
        let mut windows = WordWindows::new("a b c d", 2, 0);
        assert_eq!(windows.word_count(), 4);
        assert_eq!(windows.by_ref().count(), 2);
        windows.reset();
        assert_eq!(windows.next().as_deref(), Some("a b"));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(" ROW 1:  h1: a \n"), 4);
    }
}
