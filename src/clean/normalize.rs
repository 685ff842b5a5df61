//! Prose noise removal.
//!
//! Standards documents are full of dot leaders, rule lines and separator
//! rows. [`Normalizer`] strips them and collapses whitespace so that only
//! words reach the chunker.

use regex::Regex;

/// Characters whose runs of three or more identical copies collapse to one.
const REPEAT_CHARS: &[char] = &['.', '-', '=', '_', '*', '#', '~'];

/// Text cleanup applied to every block before chunking.
///
/// `normalize` is total and deterministic, and applying it twice gives the
/// same result as applying it once.
pub struct Normalizer {
    mixed_run: Regex,
    decorative_line: Regex,
    whitespace: Regex,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            mixed_run: Regex::new(r"[.\-–—·∙⋯=_*~]{4,}").unwrap(),
            decorative_line: Regex::new(r"(?m)^(?:[^\w\n]|_){3,}$").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Clean one block of text.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = strip_controls(text);
        let text = unify_punctuation(&text);
        let text = collapse_repeats(&text);
        let text = self.mixed_run.replace_all(&text, " ");
        let text = self.decorative_line.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, " ");
        let text = text.trim();

        // The result is a single line, so this tests the whole string
        if self.decorative_line.is_match(text) {
            return String::new();
        }
        text.to_string()
    }

    /// Collapse whitespace runs to one space and trim.
    pub fn collapse_whitespace(&self, text: &str) -> String {
        self.whitespace.replace_all(text.trim(), " ").into_owned()
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop ASCII control characters other than whitespace; CRLF becomes LF.
fn strip_controls(text: &str) -> String {
    text.replace("\r\n", "\n")
        .chars()
        .filter(|c| !c.is_ascii_control() || c.is_ascii_whitespace())
        .collect()
}

/// Map ellipsis and middle dots to `.`, dashes and underscores to `-`.
fn unify_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '…' | '·' | '‧' | '∙' | '⋯' => '.',
            '–' | '—' | '―' | '_' => '-',
            other => other,
        })
        .collect()
}

/// Replace every run of three or more identical [`REPEAT_CHARS`] with one copy.
fn collapse_repeats(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let mut run = 1;
        while i + run < chars.len() && chars[i + run] == c {
            run += 1;
        }

        if run >= 3 && REPEAT_CHARS.contains(&c) {
            out.push(c);
        } else {
            out.extend(std::iter::repeat(c).take(run));
        }
        i += run;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_leaders_collapse() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("5.1 Overview.......12"), "5.1 Overview.12");
        assert_eq!(n.normalize("Scope …… 7"), "Scope .. 7");
    }

    #[test]
    fn test_mixed_runs_become_space() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("a.-.-b"), "a b");
        assert_eq!(n.normalize("x =*=* y"), "x y");
    }

    #[test]
    fn test_separator_lines_removed() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("Header\n+-+-+\nBody"), "Header Body");
        assert_eq!(n.normalize("=-=-="), "");
        assert_eq!(n.normalize("===="), "=");
        assert_eq!(n.normalize("* * *"), "");
    }

    #[test]
    fn test_controls_do_not_merge_words() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("radio\r\nbearer\u{0007}s"), "radio bearers");
        assert_eq!(n.normalize("a\tb\x0cc"), "a b c");
    }

    #[test]
    fn test_underscore_and_dashes() {
        let n = Normalizer::new();
        assert_eq!(n.normalize("UE_ID — value"), "UE-ID - value");
        assert_eq!(n.normalize("a___b"), "a-b");
    }

    #[test]
    fn test_plain_text_only_collapses_whitespace() {
        let n = Normalizer::new();
        let text = "  The gNB   sends\n\nRRCReconfiguration to the UE.  ";
        assert_eq!(n.normalize(text), n.collapse_whitespace(text));
        assert_eq!(n.normalize(text), "The gNB sends RRCReconfiguration to the UE.");
    }

    #[test]
    fn test_idempotent_on_tricky_inputs() {
        let n = Normalizer::new();
        let inputs = [
            "",
            "   ",
            "..\n..",
            "-- --",
            "a..\n\n-.-.\n..b",
            "##### Heading ###",
            "Table 1 ……… page 3",
            "x\u{0000}\u{0000}\u{0000}y",
            "_-_-_",
            ". . . .",
            "Bảng 2 – Tham số",
            "²²\n²²",
        ];
        for input in inputs {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "input {:?}", input);
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        let n = Normalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize(" \n\t "), "");
    }
}
