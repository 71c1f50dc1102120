use std::path::Path;

use log::debug;

use super::wrap::{wrap_spans, Line};
use super::{
    line_height, Align, BulletOptions, HyperlinkOptions, ImageOptions, InfoItemOptions,
    LayoutError, RuleOptions, TextOptions, BOTTOM_GUTTER, BOTTOM_SPACER, CENTRE, CONTENT_WIDTH,
    LEFT_MARGIN, PAGE_HEIGHT, PAGE_WIDTH, RIGHT_MARGIN, TOP_GUTTER, TOP_SPACER,
};
use crate::color::Rgb;
use crate::images::LoadedImage;
use crate::richtext::{parse_markdown, plain, Span};
use crate::writer::{FontSpec, PageWriter};

const EPSILON: f64 = 1e-6;

/// Header and footer bands span the content width; the margins they reserve use
/// the image's own DPI height.
fn band_size(image: &LoadedImage) -> (f64, f64) {
    let (width, height) = image.size_mm();
    if width <= 0.0 {
        return (CONTENT_WIDTH, height);
    }
    (CONTENT_WIDTH, height * CONTENT_WIDTH / width)
}

/// Stateful page cursor that lays out report content through a [`PageWriter`].
///
/// The first page is started on construction. Header and footer images are drawn on
/// every page and reserve space at the top and bottom of the printable area.
pub struct LayoutEngine<W: PageWriter> {
    writer: W,
    y: f64,
    top_margin: f64,
    bottom_margin: f64,
    header: Option<LoadedImage>,
    footer: Option<LoadedImage>,
    auto_page_break: bool,
    break_pending: bool,
}

impl<W: PageWriter> LayoutEngine<W> {
    /// Creates an engine drawing through `writer`, with optional header and footer bands.
    pub fn new(
        writer: W,
        header: Option<LoadedImage>,
        footer: Option<LoadedImage>,
    ) -> Result<Self, LayoutError> {
        let top_margin = header
            .as_ref()
            .map_or(TOP_GUTTER, |image| image.size_mm().1 + TOP_GUTTER + TOP_SPACER);
        let bottom_margin = footer
            .as_ref()
            .map_or(BOTTOM_GUTTER, |image| image.size_mm().1 + BOTTOM_GUTTER + BOTTOM_SPACER);

        let mut engine = Self {
            writer,
            y: top_margin,
            top_margin,
            bottom_margin,
            header,
            footer,
            auto_page_break: true,
            break_pending: false,
        };
        engine.start_page()?;
        Ok(engine)
    }

    /// Like [`LayoutEngine::new`], loading the header and footer images from disk.
    ///
    /// A configured image that cannot be read or decoded is an error.
    pub fn with_image_files(
        writer: W,
        header: Option<&Path>,
        footer: Option<&Path>,
    ) -> Result<Self, LayoutError> {
        let header = header.map(LoadedImage::from_path).transpose()?;
        let footer = footer.map(LoadedImage::from_path).transpose()?;
        Self::new(writer, header, footer)
    }

    /// Current vertical cursor position in millimetres from the top of the page.
    pub fn cursor(&self) -> f64 {
        self.y
    }

    pub fn top_margin(&self) -> f64 {
        self.top_margin
    }

    pub fn bottom_margin(&self) -> f64 {
        self.bottom_margin
    }

    /// The y position content may not cross without a page break.
    pub fn page_limit(&self) -> f64 {
        PAGE_HEIGHT - self.bottom_margin
    }

    pub fn page_count(&self) -> usize {
        self.writer.page_count()
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    fn usable_height(&self) -> f64 {
        self.page_limit() - self.top_margin
    }

    fn at_page_top(&self) -> bool {
        self.y <= self.top_margin + EPSILON
    }

    fn overflows(&self, height: f64) -> bool {
        self.auto_page_break && !self.at_page_top() && self.y + height > self.page_limit() + EPSILON
    }

    fn start_page(&mut self) -> Result<(), LayoutError> {
        self.break_pending = false;
        self.writer.begin_page()?;
        debug!("Started page {}", self.writer.page_count());

        if let Some(header) = &self.header {
            let (width, height) = band_size(header);
            self.writer
                .draw_image(header, LEFT_MARGIN, TOP_GUTTER, width, height)?;
        }
        if let Some(footer) = &self.footer {
            let (width, height) = band_size(footer);
            self.writer.draw_image(
                footer,
                LEFT_MARGIN,
                PAGE_HEIGHT - self.bottom_margin,
                width,
                height,
            )?;
        }

        self.y = self.top_margin;
        Ok(())
    }

    fn ensure_page(&mut self) -> Result<(), LayoutError> {
        if self.break_pending {
            // Keeps any leading gap already applied on the pending page.
            let y = self.y;
            self.start_page()?;
            self.y = y;
        }
        Ok(())
    }

    /// Moves the cursor down by `gap`; a gap crossing the bottom limit breaks the page.
    fn advance(&mut self, gap: f64) -> Result<(), LayoutError> {
        if gap <= 0.0 {
            return Ok(());
        }
        if self.auto_page_break && self.y + gap > self.page_limit() + EPSILON {
            // Materialised by the next drawing call so trailing gaps never add blank pages.
            self.break_pending = true;
            self.y = self.top_margin;
        } else {
            self.y += gap;
        }
        Ok(())
    }

    fn wrap(&self, spans: &[Span], font: FontSpec, width: f64) -> Vec<Line> {
        wrap_spans(spans, font, width, |text, font| {
            self.writer.text_width(text, font)
        })
    }

    /// Breaks the page once if a block of `height` would cross the bottom limit but
    /// fits on an empty page.
    fn keep_together(&mut self, height: f64) -> Result<(), LayoutError> {
        if height <= self.usable_height() + EPSILON && self.overflows(height) {
            self.start_page()?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_lines(
        &mut self,
        lines: &[Line],
        x: f64,
        width: f64,
        line_h: f64,
        align: Align,
        colour: Rgb,
        link: Option<&str>,
    ) -> Result<(), LayoutError> {
        self.ensure_page()?;
        self.keep_together(line_h * lines.len() as f64)?;

        for line in lines {
            if self.overflows(line_h) {
                self.start_page()?;
            }
            let line_x = self.draw_line_fragments(line, x, width, line_h, align, colour)?;
            if let Some(url) = link {
                if line.width > 0.0 {
                    self.writer.add_link(line_x, self.y, line.width, line_h, url);
                }
            }
            self.y += line_h;
        }
        Ok(())
    }

    /// Draws one line and returns the x position where it starts.
    fn draw_line_fragments(
        &mut self,
        line: &Line,
        x: f64,
        width: f64,
        line_h: f64,
        align: Align,
        colour: Rgb,
    ) -> Result<f64, LayoutError> {
        let slack = (width - line.width).max(0.0);
        let spaces = line.stretchable_spaces();
        let (start, stretch) = match align {
            Align::Left => (x, 0.0),
            Align::Center => (x + slack / 2.0, 0.0),
            Align::Right => (x + slack, 0.0),
            Align::Justify if !line.ends_paragraph && spaces > 0 => (x, slack / spaces as f64),
            Align::Justify => (x, 0.0),
        };

        let mut cursor = start;
        for fragment in &line.fragments {
            if !fragment.is_space || fragment.font.underline {
                self.writer
                    .draw_text(cursor, self.y, line_h, &fragment.text, fragment.font, colour)?;
            }
            cursor += fragment.width;
            if fragment.is_space {
                cursor += stretch * fragment.text.chars().count() as f64;
            }
        }
        Ok(start)
    }

    fn text_font(options: &TextOptions) -> FontSpec {
        FontSpec::new(options.font_size)
            .with_bold(options.bold)
            .with_italic(options.italic)
            .with_fixed_width(options.fixed_width)
    }

    fn print_text(&mut self, text: &str, options: &TextOptions) -> Result<(), LayoutError> {
        self.advance(options.before)?;
        let width = (CONTENT_WIDTH - options.indent).trunc();
        let spans = if options.markdown {
            parse_markdown(text)
        } else {
            plain(text)
        };
        let lines = self.wrap(&spans, Self::text_font(options), width);
        self.draw_lines(
            &lines,
            LEFT_MARGIN + options.indent,
            width,
            line_height(options.font_size),
            options.align,
            options.colour,
            None,
        )?;
        self.advance(options.after)
    }

    /// Prints a document title, typically with [`TextOptions::title`].
    pub fn print_title(&mut self, text: &str, options: &TextOptions) -> Result<(), LayoutError> {
        self.print_text(text, options)
    }

    /// Prints a section heading, typically with [`TextOptions::heading`].
    pub fn print_heading(&mut self, text: &str, options: &TextOptions) -> Result<(), LayoutError> {
        self.print_text(text, options)
    }

    /// Prints a wrapped paragraph, typically with [`TextOptions::paragraph`].
    pub fn print_paragraph(
        &mut self,
        text: &str,
        options: &TextOptions,
    ) -> Result<(), LayoutError> {
        self.print_text(text, options)
    }

    /// Prints a bullet glyph followed by indented, wrapped text.
    ///
    /// The bullet is never left alone at the bottom of a page: when the text's first
    /// line (or the whole item, if it fits on a page) would cross the bottom limit the
    /// page is broken before the glyph is drawn.
    pub fn print_bulleted_text(
        &mut self,
        text: &str,
        options: &BulletOptions,
    ) -> Result<(), LayoutError> {
        let text_options = &options.text;
        self.advance(text_options.before)?;
        self.ensure_page()?;

        let font = Self::text_font(text_options);
        let line_h = line_height(text_options.font_size);
        let bullet_width = self.writer.text_width(&options.bullet, font) + 3.0;
        let indent = if bullet_width >= options.indent {
            bullet_width + 1.0
        } else {
            options.indent
        };
        let width = CONTENT_WIDTH - (indent + options.bullet_indent);
        let spans = if text_options.markdown {
            parse_markdown(text)
        } else {
            plain(text)
        };
        let lines = self.wrap(&spans, font, width);

        let block = line_h * lines.len() as f64;
        let needed = if block <= self.usable_height() + EPSILON {
            block
        } else {
            line_h
        };
        if self.overflows(needed) {
            self.start_page()?;
        }

        let top = self.y;
        let glyph = self.wrap(&plain(&options.bullet), font, bullet_width);
        let auto_page_break = self.auto_page_break;
        self.auto_page_break = false;
        let drawn = self.draw_lines(
            &glyph,
            LEFT_MARGIN + options.bullet_indent,
            bullet_width,
            line_h,
            Align::Left,
            text_options.colour,
            None,
        );
        self.auto_page_break = auto_page_break;
        drawn?;

        self.y = top;
        self.draw_lines(
            &lines,
            LEFT_MARGIN + options.bullet_indent + indent,
            width,
            line_h,
            text_options.align,
            text_options.colour,
            None,
        )?;
        self.advance(text_options.after)
    }

    /// Prints `key` at the left margin and `value` in bold at the tab stop.
    pub fn print_info_item(
        &mut self,
        key: &str,
        value: &str,
        options: &InfoItemOptions,
    ) -> Result<(), LayoutError> {
        self.advance(options.before)?;
        self.ensure_page()?;

        let line_h = line_height(options.font_size);
        let key_font = FontSpec::new(options.font_size);
        let value_font = key_font.with_bold(true);
        let value_width = CONTENT_WIDTH - (options.tab_stop - LEFT_MARGIN);
        let key_lines = self.wrap(&parse_markdown(key), key_font, CONTENT_WIDTH);
        let value_lines = self.wrap(&plain(value), value_font, value_width);

        let rows = key_lines.len().max(value_lines.len());
        self.keep_together(line_h * rows as f64)?;

        let top = self.y;
        let page = self.page_count();
        self.draw_lines(
            &key_lines,
            LEFT_MARGIN,
            CONTENT_WIDTH,
            line_h,
            Align::Left,
            options.colour,
            None,
        )?;
        let key_bottom = self.y;
        if self.page_count() == page {
            self.y = top;
        }
        self.draw_lines(
            &value_lines,
            options.tab_stop,
            value_width,
            line_h,
            options.align,
            options.colour,
            None,
        )?;
        if self.page_count() == page {
            self.y = self.y.max(key_bottom);
        }
        self.advance(options.after)
    }

    /// Prints an image at its native size, or scaled to the available width when it is
    /// too wide or `expand` is set. An image that does not fit below the cursor moves
    /// to the next page.
    pub fn print_image(
        &mut self,
        image: &LoadedImage,
        options: &ImageOptions,
    ) -> Result<(), LayoutError> {
        let (native_width, native_height) = image.size_mm();
        self.advance(options.before)?;
        self.ensure_page()?;

        let available = CONTENT_WIDTH - options.indent;
        let (x, width, height) = if native_width <= available && !options.expand {
            let x = match options.align {
                Align::Center => CENTRE - native_width / 2.0 + options.indent / 2.0,
                Align::Right => PAGE_WIDTH - RIGHT_MARGIN - native_width,
                Align::Left | Align::Justify => LEFT_MARGIN + options.indent,
            };
            (x, native_width, native_height)
        } else {
            let height = if native_width > 0.0 {
                native_height * available / native_width
            } else {
                native_height
            };
            (LEFT_MARGIN + options.indent, available, height)
        };

        if self.overflows(height) {
            self.start_page()?;
        }
        self.writer.draw_image(image, x, self.y, width, height)?;
        self.y += height;
        self.advance(options.after)
    }

    /// Loads the image at `path` and prints it. Unreadable or malformed files are errors.
    pub fn print_image_file(
        &mut self,
        path: impl AsRef<Path>,
        options: &ImageOptions,
    ) -> Result<(), LayoutError> {
        let image = LoadedImage::from_path(path)?;
        self.print_image(&image, options)
    }

    /// Prints underlined link text; every drawn line becomes a clickable area for `url`.
    pub fn print_hyperlink(
        &mut self,
        text: &str,
        url: &str,
        options: &HyperlinkOptions,
    ) -> Result<(), LayoutError> {
        self.advance(options.before)?;
        let font = FontSpec::new(options.font_size).with_underline(true);
        let width = CONTENT_WIDTH - options.indent;
        let lines = self.wrap(&plain(text), font, width);
        self.draw_lines(
            &lines,
            LEFT_MARGIN + options.indent,
            width,
            line_height(options.font_size),
            options.align,
            options.colour,
            Some(url),
        )?;
        self.advance(options.after)
    }

    /// Draws a horizontal rule across the content width.
    pub fn print_horizontal_line(&mut self, options: &RuleOptions) -> Result<(), LayoutError> {
        self.advance(options.before)?;
        self.ensure_page()?;
        let x = (LEFT_MARGIN + options.indent).trunc();
        self.writer.draw_line(
            (x, self.y),
            (PAGE_WIDTH - RIGHT_MARGIN, self.y),
            options.thickness,
            options.colour,
        )?;
        self.y += options.thickness;
        self.advance(options.after)
    }

    /// Starts a new page.
    pub fn insert_page_break(&mut self) -> Result<(), LayoutError> {
        self.start_page()
    }

    /// Adds `spacer` millimetres of vertical space.
    pub fn insert_spacer(&mut self, spacer: f64) -> Result<(), LayoutError> {
        self.advance(spacer)
    }

    /// Finalises the document and returns its bytes.
    pub fn finish(self) -> Result<Vec<u8>, LayoutError> {
        self.writer.finish()
    }

    /// Finalises the document and writes it to `path`.
    pub fn generate_pdf_file(self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Op, RecordingWriter};
    use super::*;
    use crate::images::fixtures::png_bytes;

    fn engine() -> LayoutEngine<RecordingWriter> {
        LayoutEngine::new(RecordingWriter::default(), None, None).expect("engine")
    }

    fn image(width: u32, height: u32, dpi: f64) -> LoadedImage {
        LoadedImage::from_bytes(png_bytes(width, height, Some(dpi))).expect("image")
    }

    #[test]
    fn margins_without_bands_are_gutters() {
        let engine = engine();
        assert_eq!(engine.top_margin(), 10.0);
        assert_eq!(engine.bottom_margin(), 10.0);
        assert_eq!(engine.cursor(), 10.0);
        assert_eq!(engine.page_count(), 1);
    }

    #[test]
    fn margins_reserve_band_height() {
        // 118 px at 300 DPI is 9.99 mm.
        let header = LoadedImage::from_bytes(png_bytes(100, 118, None)).expect("header");
        let footer = LoadedImage::from_bytes(png_bytes(100, 236, None)).expect("footer");
        let engine = LayoutEngine::new(RecordingWriter::default(), Some(header), Some(footer))
            .expect("engine");
        assert!((engine.top_margin() - (9.99 + 15.0)).abs() < 0.01);
        assert!((engine.bottom_margin() - (19.98 + 15.0)).abs() < 0.01);

        let images: Vec<_> = engine.writer().images().collect();
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].x, images[0].y), (LEFT_MARGIN, TOP_GUTTER));
        assert!((images[1].y - (PAGE_HEIGHT - engine.bottom_margin())).abs() < 1e-9);
    }

    #[test]
    fn bands_are_drawn_at_content_width() {
        // 2008 x 118 px at 300 DPI is 170 x 9.99 mm; 1004 x 118 px is half as wide.
        let header = LoadedImage::from_bytes(png_bytes(2008, 118, None)).expect("header");
        let footer = LoadedImage::from_bytes(png_bytes(1004, 118, None)).expect("footer");
        let engine = LayoutEngine::new(RecordingWriter::default(), Some(header), Some(footer))
            .expect("engine");

        let images: Vec<_> = engine.writer().images().collect();
        assert!((images[0].width - CONTENT_WIDTH).abs() < 1e-9);
        assert!((images[0].height - 9.99).abs() < 0.01);
        assert!((images[1].width - CONTENT_WIDTH).abs() < 1e-9);
        assert!((images[1].height - 19.98).abs() < 0.02);
        assert!((engine.bottom_margin() - (9.99 + 15.0)).abs() < 0.01);
    }

    #[test]
    fn paragraph_advances_by_gaps_and_lines() {
        let mut engine = engine();
        engine
            .print_paragraph("short text", &TextOptions::paragraph())
            .expect("paragraph");
        // before 1 + one 5 mm line + after 1
        assert_eq!(engine.cursor(), 17.0);
        let texts: Vec<_> = engine.writer().texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["short", "text"]);
    }

    #[test]
    fn block_crossing_the_limit_breaks_exactly_once() {
        let mut engine = engine();
        engine.insert_spacer(270.0).expect("spacer");
        assert_eq!(engine.cursor(), 280.0);

        let text = "word ".repeat(150);
        engine
            .print_paragraph(&text, &TextOptions::paragraph())
            .expect("paragraph");

        assert_eq!(engine.page_count(), 2);
        let first_text = engine.writer().texts().next().expect("text drawn");
        assert_eq!(first_text.page, 2);
        assert_eq!(first_text.y, 10.0);
    }

    #[test]
    fn tall_block_breaks_line_by_line() {
        let mut engine = engine();
        let text = "line\n".repeat(120);
        engine
            .print_paragraph(text.trim_end(), &TextOptions::paragraph())
            .expect("paragraph");
        // 277 mm usable at 5 mm per line: 55 lines per page after the 1 mm gap.
        assert_eq!(engine.page_count(), 3);
        for text in engine.writer().texts() {
            assert!(text.y + 5.0 <= PAGE_HEIGHT - 10.0 + 1e-9);
        }
    }

    #[test]
    fn bullet_moves_to_next_page_with_its_text() {
        let mut engine = engine();
        engine.insert_spacer(273.0).expect("spacer");
        engine
            .print_bulleted_text("tables = 1", &BulletOptions::default())
            .expect("bullet");

        let texts: Vec<_> = engine.writer().texts().collect();
        assert_eq!(texts[0].text, "-");
        assert!(texts.iter().all(|text| text.page == 2));
        assert_eq!(texts[0].y, texts[1].y);
        assert!(engine.writer().texts().any(|t| t.text == "tables" && t.x == 28.0));
    }

    #[test]
    fn trailing_gap_does_not_add_blank_page() {
        let mut engine = engine();
        engine.insert_spacer(270.0).expect("spacer");
        engine.insert_spacer(10.0).expect("spacer");
        assert_eq!(engine.page_count(), 1);
        engine
            .print_heading("Next", &TextOptions::heading())
            .expect("heading");
        assert_eq!(engine.page_count(), 2);
        let heading = engine.writer().texts().next().expect("heading drawn");
        assert_eq!(heading.y, 10.0 + 6.0);
    }

    #[test]
    fn explicit_page_break_after_pending_break_adds_one_page() {
        let mut engine = engine();
        engine.insert_spacer(290.0).expect("spacer");
        engine.insert_page_break().expect("break");
        engine
            .print_paragraph("x", &TextOptions::paragraph())
            .expect("paragraph");
        assert_eq!(engine.page_count(), 2);
    }

    #[test]
    fn small_image_keeps_native_size_and_alignment() {
        let mut engine = engine();
        // 100 DPI: 200 px is 50.8 mm wide.
        let picture = image(200, 100, 100.0);
        let options = ImageOptions {
            align: Align::Center,
            ..ImageOptions::default()
        };
        engine.print_image(&picture, &options).expect("image");

        let drawn = engine.writer().images().next().expect("image drawn");
        assert!((drawn.width - 50.8).abs() < 0.01);
        assert!((drawn.x - (CENTRE - 25.4)).abs() < 0.01);
        assert_eq!(drawn.y, 12.0);
    }

    #[test]
    fn wide_image_is_scaled_to_content_width() {
        let mut engine = engine();
        // 1000 px at 100 DPI is 254 mm wide.
        let picture = image(1000, 600, 100.0);
        engine
            .print_image(&picture, &ImageOptions::default())
            .expect("image");

        let drawn = engine.writer().images().next().expect("image drawn");
        assert_eq!(drawn.width, CONTENT_WIDTH);
        assert!((drawn.height - 102.0).abs() < 0.01);
        assert!((engine.cursor() - (12.0 + 102.0 + 2.0)).abs() < 0.01);
    }

    #[test]
    fn image_that_does_not_fit_moves_to_next_page() {
        let mut engine = engine();
        engine.insert_spacer(200.0).expect("spacer");
        let picture = image(1000, 600, 100.0);
        engine
            .print_image(&picture, &ImageOptions::default())
            .expect("image");
        let drawn = engine.writer().images().next().expect("image drawn");
        assert_eq!((drawn.page, drawn.y), (2, 10.0));
    }

    #[test]
    fn hyperlink_adds_one_link_per_line() {
        let mut engine = engine();
        let url = format!("https://example.com/{}", "a".repeat(400));
        engine
            .print_hyperlink(&url, &url, &HyperlinkOptions::default())
            .expect("hyperlink");

        let links: Vec<_> = engine
            .writer()
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Link { .. }))
            .collect();
        let lines = engine.writer().texts().count();
        assert!(lines > 1);
        assert_eq!(links.len(), lines);
        assert!(engine.writer().texts().all(|text| text.font.underline));
    }

    #[test]
    fn horizontal_line_spans_content_width() {
        let mut engine = engine();
        engine
            .print_horizontal_line(&RuleOptions::default())
            .expect("rule");
        let line = engine
            .writer()
            .ops
            .iter()
            .find_map(|op| match op {
                Op::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .expect("line drawn");
        assert_eq!(line, ((20.0, 13.0), (190.0, 13.0)));
        assert!((engine.cursor() - 16.2).abs() < 1e-9);
    }

    #[test]
    fn info_item_places_value_at_tab_stop() {
        let mut engine = engine();
        engine
            .print_info_item("Provider", "aws", &InfoItemOptions::default())
            .expect("info item");
        let value = engine
            .writer()
            .texts()
            .find(|text| text.text == "aws")
            .expect("value drawn");
        assert_eq!(value.x, 90.0);
        assert!(value.font.bold);
        assert_eq!(engine.cursor(), 10.0 + 1.0 + 6.0 + 1.0);
    }

    #[test]
    fn justified_lines_fill_the_width() {
        let mut engine = engine();
        let text = "aa ".repeat(200);
        engine
            .print_paragraph(text.trim_end(), &TextOptions::paragraph())
            .expect("paragraph");
        let first_line: Vec<_> = engine
            .writer()
            .texts()
            .filter(|text| text.y == 11.0)
            .collect();
        let last = first_line.last().expect("line drawn");
        let right = last.x + last.width;
        assert!((right - (LEFT_MARGIN + CONTENT_WIDTH)).abs() < 1e-6);
    }
}
