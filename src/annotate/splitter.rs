//! Sentence splitting collaborator.

use super::model::Span;

/// Supplies sentence spans (char offsets) over normalized text.
pub trait SentenceSplitter {
    fn split(&self, text: &str) -> Vec<Span>;
}

/// Characters that may trail a terminator inside the same sentence.
const CLOSERS: &[char] = &['"', '\'', ')', ']', '»', '”', '’'];

/// Splits after runs of terminal punctuation and at blank lines.
#[derive(Debug, Clone)]
pub struct PunctuationSplitter {
    terminators: Vec<char>,
}

impl Default for PunctuationSplitter {
    fn default() -> Self {
        // U+037E is the Greek question mark.
        Self::with_terminators(['.', '!', '?', '\u{037e}'])
    }
}

impl PunctuationSplitter {
    pub fn with_terminators(terminators: impl IntoIterator<Item = char>) -> Self {
        Self {
            terminators: terminators.into_iter().collect(),
        }
    }

    fn is_terminator(&self, c: char) -> bool {
        self.terminators.contains(&c)
    }
}

impl SentenceSplitter for PunctuationSplitter {
    fn split(&self, text: &str) -> Vec<Span> {
        let chars: Vec<char> = text.chars().collect();
        let mut spans = Vec::new();
        let mut start: Option<usize> = None;
        let mut last_content = 0;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                if c == '\n' && chars.get(i + 1) == Some(&'\n') {
                    if let Some(s) = start.take() {
                        spans.push(Span::new(s, last_content));
                    }
                }
                i += 1;
                continue;
            }

            start.get_or_insert(i);
            last_content = i + 1;

            if self.is_terminator(c) {
                let mut end = i + 1;
                while end < chars.len() && (self.is_terminator(chars[end]) || CLOSERS.contains(&chars[end])) {
                    end += 1;
                }
                if let Some(s) = start.take() {
                    spans.push(Span::new(s, end));
                }
                last_content = end;
                i = end;
                continue;
            }
            i += 1;
        }

        if let Some(s) = start {
            spans.push(Span::new(s, last_content));
        }
        spans
    }
}
