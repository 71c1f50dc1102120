//! Greedy line breaking over styled spans.

use crate::richtext::Span;
use crate::writer::FontSpec;

const WIDTH_EPSILON: f64 = 1e-6;

/// A measured piece of a line: a word, part of a word, or a run of whitespace.
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub font: FontSpec,
    pub width: f64,
    pub is_space: bool,
}

/// One output line.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    pub width: f64,
    /// Set on the last line before a hard newline or the end of the text.
    pub ends_paragraph: bool,
}

impl Line {
    /// Number of whitespace characters that justification may stretch.
    pub fn stretchable_spaces(&self) -> usize {
        self.fragments
            .iter()
            .filter(|fragment| fragment.is_space)
            .map(|fragment| fragment.text.chars().count())
            .sum()
    }

    /// Concatenated text of the line.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect()
    }

    fn has_words(&self) -> bool {
        self.fragments.iter().any(|fragment| !fragment.is_space)
    }

    fn push(&mut self, fragment: Fragment) {
        self.width += fragment.width;
        self.fragments.push(fragment);
    }
}

enum Token {
    Word(Vec<Fragment>),
    Space(Fragment),
    Newline,
}

struct Wrapper<'m, M> {
    max_width: f64,
    measure: &'m M,
    lines: Vec<Line>,
    current: Line,
    pending: Vec<Fragment>,
}

impl<'m, M> Wrapper<'m, M>
where
    M: Fn(&str, FontSpec) -> f64,
{
    fn finish_line(&mut self, ends_paragraph: bool) {
        self.pending.clear();
        let mut line = std::mem::take(&mut self.current);
        while line.fragments.last().map_or(false, |fragment| fragment.is_space) {
            if let Some(space) = line.fragments.pop() {
                line.width -= space.width;
            }
        }
        line.ends_paragraph = ends_paragraph;
        self.lines.push(line);
    }

    fn place_word(&mut self, word: Vec<Fragment>) {
        let pending_width: f64 = self.pending.iter().map(|f| f.width).sum();
        let word_width: f64 = word.iter().map(|f| f.width).sum();

        if self.current.has_words()
            && self.current.width + pending_width + word_width > self.max_width + WIDTH_EPSILON
        {
            self.finish_line(false);
        }

        for space in std::mem::take(&mut self.pending) {
            self.current.push(space);
        }

        if self.current.width + word_width <= self.max_width + WIDTH_EPSILON {
            for fragment in word {
                self.current.push(fragment);
            }
        } else {
            self.split_word(word);
        }
    }

    /// Places a word that cannot fit on one line, breaking between characters.
    fn split_word(&mut self, word: Vec<Fragment>) {
        for fragment in word {
            let mut piece = String::new();
            let mut piece_width = 0.0;
            for ch in fragment.text.chars() {
                let mut buf = [0u8; 4];
                let ch_width = (self.measure)(ch.encode_utf8(&mut buf), fragment.font);
                let occupied = self.current.width + piece_width;
                if occupied + ch_width > self.max_width + WIDTH_EPSILON
                    && (self.current.has_words() || !piece.is_empty())
                {
                    if !piece.is_empty() {
                        self.current.push(Fragment {
                            text: std::mem::take(&mut piece),
                            font: fragment.font,
                            width: piece_width,
                            is_space: false,
                        });
                    }
                    piece_width = 0.0;
                    self.finish_line(false);
                }
                piece.push(ch);
                piece_width += ch_width;
            }
            if !piece.is_empty() {
                self.current.push(Fragment {
                    text: piece,
                    font: fragment.font,
                    width: piece_width,
                    is_space: false,
                });
            }
        }
    }
}

fn tokenize<M>(spans: &[Span], base: FontSpec, measure: &M) -> Vec<Token>
where
    M: Fn(&str, FontSpec) -> f64,
{
    let mut tokens: Vec<Token> = Vec::new();
    for span in spans {
        let font = base
            .with_bold(base.bold || span.is_bold())
            .with_italic(base.italic || span.is_italic())
            .with_underline(base.underline || span.is_underlined());

        let mut rest = span.text();
        while let Some(ch) = rest.chars().next() {
            if ch == '\n' {
                tokens.push(Token::Newline);
                rest = &rest[1..];
                continue;
            }
            let is_space = ch.is_whitespace();
            let end = rest
                .char_indices()
                .find(|(_, c)| *c == '\n' || c.is_whitespace() != is_space)
                .map_or(rest.len(), |(index, _)| index);
            let text = &rest[..end];
            let fragment = Fragment {
                text: text.to_owned(),
                font,
                width: measure(text, font),
                is_space,
            };
            if is_space {
                tokens.push(Token::Space(fragment));
            } else if let Some(Token::Word(fragments)) = tokens.last_mut() {
                // Words split across spans stay together.
                fragments.push(fragment);
            } else {
                tokens.push(Token::Word(vec![fragment]));
            }
            rest = &rest[end..];
        }
    }
    tokens
}

/// Breaks `spans` into lines no wider than `max_width`.
///
/// Hard newlines always end a line. Lines wrap at whitespace; the whitespace at a
/// wrap point is dropped while interior runs are preserved. Words wider than a line
/// are split between characters. Empty input yields a single empty line.
pub fn wrap_spans<M>(spans: &[Span], base: FontSpec, max_width: f64, measure: M) -> Vec<Line>
where
    M: Fn(&str, FontSpec) -> f64,
{
    let tokens = tokenize(spans, base, &measure);
    let mut wrapper = Wrapper {
        max_width,
        measure: &measure,
        lines: Vec::new(),
        current: Line::default(),
        pending: Vec::new(),
    };

    for token in tokens {
        match token {
            Token::Word(word) => wrapper.place_word(word),
            Token::Space(space) => wrapper.pending.push(space),
            Token::Newline => wrapper.finish_line(true),
        }
    }
    wrapper.finish_line(true);
    wrapper.lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::richtext::parse_markdown;

    fn unit_width(text: &str, _font: FontSpec) -> f64 {
        text.chars().count() as f64
    }

    fn texts(lines: &[Line]) -> Vec<String> {
        lines.iter().map(Line::text).collect()
    }

    fn wrap(text: &str, width: f64) -> Vec<Line> {
        wrap_spans(&[Span::new(text)], FontSpec::new(10.0), width, unit_width)
    }

    #[test]
    fn wraps_greedily_at_whitespace() {
        let lines = wrap("the quick brown fox jumps", 10.0);
        assert_eq!(texts(&lines), vec!["the quick", "brown fox", "jumps"]);
        assert!(!lines[0].ends_paragraph);
        assert!(lines[2].ends_paragraph);
        assert_eq!(lines[0].width, 9.0);
    }

    #[test]
    fn interior_whitespace_is_preserved() {
        let lines = wrap("a   b", 10.0);
        assert_eq!(texts(&lines), vec!["a   b"]);
        assert_eq!(lines[0].stretchable_spaces(), 3);
    }

    #[test]
    fn hard_newlines_end_paragraph_lines() {
        let lines = wrap("+--+\n|ab|\n\n+--+", 100.0);
        assert_eq!(texts(&lines), vec!["+--+", "|ab|", "", "+--+"]);
        assert!(lines.iter().all(|line| line.ends_paragraph));
    }

    #[test]
    fn long_words_are_split_by_character() {
        let lines = wrap("ab abcdefghij", 4.0);
        assert_eq!(texts(&lines), vec!["ab", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn styled_spans_keep_words_together() {
        let spans = parse_markdown("selected: **LINPACK**.");
        let lines = wrap_spans(&spans, FontSpec::new(10.0), 12.0, unit_width);
        assert_eq!(texts(&lines), vec!["selected:", "LINPACK."]);
        assert!(lines[1].fragments[0].font.bold);
        assert!(!lines[1].fragments[1].font.bold);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let lines = wrap("", 10.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].fragments.is_empty());
    }
}
