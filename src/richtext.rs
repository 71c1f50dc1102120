//! Inline emphasis for report text.
//!
//! Paragraphs may carry a tiny markdown dialect: `**bold**`, `__italic__` and
//! `--underline--`. Each marker toggles its attribute, so an unterminated marker simply
//! extends to the end of the text. Parsing never fails.

/// A run of text sharing the same emphasis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Span {
    text: String,
    bold: bool,
    italic: bool,
    underline: bool,
}

impl Span {
    /// Creates a new span with the provided text and no emphasis.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_bold(&self) -> bool {
        self.bold
    }

    pub fn is_italic(&self) -> bool {
        self.italic
    }

    pub fn is_underlined(&self) -> bool {
        self.underline
    }

    /// Sets the bold flag and returns the updated span.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Sets the italic flag and returns the updated span.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Sets the underline flag and returns the updated span.
    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn bold(self) -> Self {
        self.with_bold(true)
    }

    pub fn italic(self) -> Self {
        self.with_italic(true)
    }

    pub fn underline(self) -> Self {
        self.with_underline(true)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct StyleState {
    bold: bool,
    italic: bool,
    underline: bool,
}

impl StyleState {
    fn to_span(self, text: impl Into<String>) -> Span {
        Span {
            text: text.into(),
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
        }
    }

    fn toggle(&mut self, marker: &str) {
        match marker {
            "**" => self.bold = !self.bold,
            "__" => self.italic = !self.italic,
            _ => self.underline = !self.underline,
        }
    }
}

const MARKERS: [&str; 3] = ["**", "__", "--"];

/// Splits `input` into spans, consuming the emphasis markers.
pub fn parse_markdown(input: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut buffer = String::new();
    let mut state = StyleState::default();
    let mut rest = input;

    'outer: while let Some(ch) = rest.chars().next() {
        for marker in MARKERS {
            if let Some(after) = rest.strip_prefix(marker) {
                flush_buffer(&mut buffer, &mut spans, state);
                state.toggle(marker);
                rest = after;
                continue 'outer;
            }
        }
        buffer.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    flush_buffer(&mut buffer, &mut spans, state);
    spans
}

/// The whole of `input` as a single unstyled span.
pub fn plain(input: &str) -> Vec<Span> {
    if input.is_empty() {
        Vec::new()
    } else {
        vec![Span::new(input)]
    }
}

fn flush_buffer(buffer: &mut String, spans: &mut Vec<Span>, state: StyleState) {
    if buffer.is_empty() {
        return;
    }
    spans.push(state.to_span(std::mem::take(buffer)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_text() {
        let spans = parse_markdown("Hello world");
        assert_eq!(spans, vec![Span::new("Hello world")]);
    }

    #[test]
    fn markers_toggle_styles() {
        let spans = parse_markdown("The following **3 instances** were __really__ --used--.");
        assert_eq!(
            spans,
            vec![
                Span::new("The following "),
                Span::new("3 instances").bold(),
                Span::new(" were "),
                Span::new("really").italic(),
                Span::new(" "),
                Span::new("used").underline(),
                Span::new("."),
            ]
        );
    }

    #[test]
    fn nested_markers_combine() {
        let spans = parse_markdown("**bold __both__**");
        assert_eq!(
            spans,
            vec![Span::new("bold ").bold(), Span::new("both").bold().italic()]
        );
    }

    #[test]
    fn unterminated_marker_runs_to_end() {
        let spans = parse_markdown("a **b c");
        assert_eq!(spans, vec![Span::new("a "), Span::new("b c").bold()]);
    }

    #[test]
    fn single_dashes_are_text() {
        let spans = parse_markdown("coremark-pro - x");
        assert_eq!(spans, vec![Span::new("coremark-pro - x")]);
    }
}
