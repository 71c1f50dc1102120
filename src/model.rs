//! Logical content of the benchmark report.
//!
//! A report is an ordered list of [`DocumentSection`] values. Sections are plain
//! data; the report builder decides how each part is laid out.

/// A numbered reference printed in the closing references list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    number: u32,
    text: String,
    url: String,
}

impl Reference {
    pub fn new(number: u32, text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            url: url.into(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// Label printed before the link, for example `Sysbench Wikipedia:`.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The in-text citation, `[n]`.
    pub fn citation(&self) -> String {
        format!("[{}]", self.number)
    }
}

/// One section of the report body.
///
/// Parts are printed in field order: heading, leading paragraphs, table, bullets,
/// charts, trailing paragraphs.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSection {
    heading: String,
    paragraphs_before: Vec<String>,
    bullets_before: Vec<String>,
    table: Option<String>,
    charts: Vec<String>,
    paragraphs_after: Vec<String>,
    page_break_before: bool,
    reference: Option<Reference>,
}

impl DocumentSection {
    /// Creates an empty section that starts on a new page.
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            paragraphs_before: Vec::new(),
            bullets_before: Vec::new(),
            table: None,
            charts: Vec::new(),
            paragraphs_after: Vec::new(),
            page_break_before: true,
            reference: None,
        }
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    pub fn paragraphs_before(&self) -> &[String] {
        &self.paragraphs_before
    }

    pub fn bullets_before(&self) -> &[String] {
        &self.bullets_before
    }

    /// Pre-rendered table text, printed in a fixed-width font.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Chart file names, relative to the chart directory.
    pub fn charts(&self) -> &[String] {
        &self.charts
    }

    pub fn paragraphs_after(&self) -> &[String] {
        &self.paragraphs_after
    }

    pub fn page_break_before(&self) -> bool {
        self.page_break_before
    }

    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    pub fn with_paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs_before.push(paragraph.into());
        self
    }

    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bullets_before.extend(bullets.into_iter().map(Into::into));
        self
    }

    pub fn with_table(mut self, table: Option<String>) -> Self {
        self.table = table;
        self
    }

    pub fn with_charts<I, S>(mut self, charts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.charts.extend(charts.into_iter().map(Into::into));
        self
    }

    pub fn with_closing_paragraph(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs_after.push(paragraph.into());
        self
    }

    pub fn with_page_break_before(mut self, page_break_before: bool) -> Self {
        self.page_break_before = page_break_before;
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Section and reference counters.
///
/// Reference `[1]` is reserved for the contact link, so the first assigned
/// reference is `[2]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocNumbers {
    section: u32,
    reference: u32,
}

impl Default for DocNumbers {
    fn default() -> Self {
        Self::new()
    }
}

impl DocNumbers {
    pub fn new() -> Self {
        Self {
            section: 0,
            reference: 1,
        }
    }

    pub fn next_section(&mut self) -> u32 {
        self.section += 1;
        self.section
    }

    pub fn next_reference(&mut self) -> u32 {
        self.reference += 1;
        self.reference
    }

    /// Assigns the next reference number to `text` and `url`.
    pub fn reference(&mut self, text: impl Into<String>, url: impl Into<String>) -> Reference {
        Reference::new(self.next_reference(), text, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_start_at_two() {
        let mut numbers = DocNumbers::new();
        let first = numbers.reference("Sysbench Wikipedia:", "https://en.wikipedia.org/wiki/Sysbench");
        let second = numbers.reference("CoreMark:", "https://github.com/eembc/coremark.git");
        assert_eq!(first.number(), 2);
        assert_eq!(second.citation(), "[3]");
    }

    #[test]
    fn sections_count_from_one() {
        let mut numbers = DocNumbers::default();
        assert_eq!(numbers.next_section(), 1);
        assert_eq!(numbers.next_section(), 2);
    }

    #[test]
    fn sections_break_before_by_default() {
        let section = DocumentSection::new("LINPACK Benchmark")
            .with_paragraph("text")
            .with_charts(["linpack.png"]);
        assert!(section.page_break_before());
        assert_eq!(section.charts(), ["linpack.png".to_owned()]);
        assert!(section.table().is_none());
    }
}
