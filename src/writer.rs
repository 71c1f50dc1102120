//! The drawing surface behind the layout engine.
//!
//! [`PageWriter`] is the narrow set of operations the layout engine needs. All
//! coordinates are millimetres from the top-left corner of the current page.
//! [`GenpdfWriter`] implements it on top of the `genpdf` renderer and font cache.

use genpdf::error::Error;
use genpdf::fonts::{Font, FontCache, FontFamily};
use genpdf::render::Renderer;
use genpdf::style::{Color, Style, StyledString};
use genpdf::{Position, Rotation, Scale, Size};
use image::{DynamicImage, RgbImage};

use crate::color::Rgb;
use crate::fonts::ReportFonts;
use crate::images::{mm_from_f64, mm_to_f64, LoadedImage, MM_PER_INCH};
use crate::layout::{LayoutError, PAGE_HEIGHT, PAGE_WIDTH};
use crate::links::{apply_link_annotations, LinkAnnotation};

const UNDERLINE_OFFSET_MM: f64 = 0.4;
const UNDERLINE_THICKNESS_MM: f64 = 0.2;
/// A one pixel image at this density is one millimetre wide.
const STRIP_DPI: f64 = MM_PER_INCH;

/// Font selection for one run of text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub fixed_width: bool,
}

impl FontSpec {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            bold: false,
            italic: false,
            underline: false,
            fixed_width: false,
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: bool) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_fixed_width(mut self, fixed_width: bool) -> Self {
        self.fixed_width = fixed_width;
        self
    }
}

/// Drawing operations used by the layout engine.
pub trait PageWriter {
    /// Number of pages started so far.
    fn page_count(&self) -> usize;

    /// Starts a new page; later drawing goes to it.
    fn begin_page(&mut self) -> Result<(), LayoutError>;

    /// Advance width of `text` in millimetres.
    fn text_width(&self, text: &str, font: FontSpec) -> f64;

    /// Draws `text` vertically centred in a cell of `cell_height` whose top is at `y`.
    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        cell_height: f64,
        text: &str,
        font: FontSpec,
        color: Rgb,
    ) -> Result<(), LayoutError>;

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Rgb,
    ) -> Result<(), LayoutError>;

    /// Draws `image` with its top-left corner at (`x`, `y`) scaled to `width` × `height`.
    fn draw_image(
        &mut self,
        image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError>;

    /// Makes a rectangle on the current page open `url`.
    fn add_link(&mut self, x: f64, y: f64, width: f64, height: f64, url: &str);

    /// Serialises the document.
    fn finish(self) -> Result<Vec<u8>, LayoutError>;
}

/// [`PageWriter`] backed by `genpdf`.
pub struct GenpdfWriter {
    renderer: Renderer,
    font_cache: FontCache,
    proportional: FontFamily<Font>,
    fixed: FontFamily<Font>,
    pages_started: usize,
    links: Vec<LinkAnnotation>,
}

impl GenpdfWriter {
    /// Creates an A4 document titled `title` using the given fonts.
    pub fn new(fonts: ReportFonts, title: &str) -> Result<Self, Error> {
        let mut font_cache = FontCache::new(fonts.proportional);
        let fixed = font_cache.add_font_family(fonts.fixed);
        let proportional = font_cache.default_font_family();

        let renderer = Renderer::new(
            Size::new(mm_from_f64(PAGE_WIDTH), mm_from_f64(PAGE_HEIGHT)),
            title,
        )?;
        font_cache.load_pdf_fonts(&renderer)?;

        Ok(Self {
            renderer,
            font_cache,
            proportional,
            fixed,
            pages_started: 0,
            links: Vec::new(),
        })
    }

    fn style(&self, font: FontSpec, color: Rgb) -> Style {
        let family = if font.fixed_width {
            self.fixed
        } else {
            self.proportional
        };
        let mut style = Style::new()
            .with_font_family(family)
            .with_font_size(font_size_points(font.size))
            .with_color(Color::from(color));
        if font.bold {
            style.set_bold();
        }
        if font.italic {
            style.set_italic();
        }
        style
    }
}

/// `genpdf` takes whole points; sizes like 11.5 are rounded.
fn font_size_points(size: f64) -> u8 {
    size.round().clamp(1.0, f64::from(u8::MAX)) as u8
}

fn position(x: f64, y: f64) -> Position {
    Position::new(mm_from_f64(x), mm_from_f64(y))
}

/// Axis-aligned rectangle in millimetres, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
struct StripRect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// The filled rectangle that draws a horizontal or vertical line of `thickness`
/// centred on the line. `None` for sloped or zero-length lines.
fn strip_rect(from: (f64, f64), to: (f64, f64), thickness: f64) -> Option<StripRect> {
    if thickness <= 0.0 {
        return None;
    }
    let (left, right) = (from.0.min(to.0), from.0.max(to.0));
    let (upper, lower) = (from.1.min(to.1), from.1.max(to.1));
    if from.1 == to.1 && right > left {
        Some(StripRect {
            x: left,
            y: from.1 - thickness / 2.0,
            width: right - left,
            height: thickness,
        })
    } else if from.0 == to.0 && lower > upper {
        Some(StripRect {
            x: from.0 - thickness / 2.0,
            y: upper,
            width: thickness,
            height: lower - upper,
        })
    } else {
        None
    }
}

impl PageWriter for GenpdfWriter {
    fn page_count(&self) -> usize {
        self.pages_started
    }

    fn begin_page(&mut self) -> Result<(), LayoutError> {
        // The renderer is created with its first page already in place.
        if self.pages_started > 0 {
            self.renderer
                .add_page(Size::new(mm_from_f64(PAGE_WIDTH), mm_from_f64(PAGE_HEIGHT)));
        }
        self.pages_started += 1;
        Ok(())
    }

    fn text_width(&self, text: &str, font: FontSpec) -> f64 {
        let style = self.style(font, Rgb::new(0, 0, 0));
        mm_to_f64(StyledString::new(text.to_owned(), style).width(&self.font_cache))
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        cell_height: f64,
        text: &str,
        font: FontSpec,
        color: Rgb,
    ) -> Result<(), LayoutError> {
        let style = self.style(font, color);
        let line_height = mm_to_f64(style.line_height(&self.font_cache));
        let top = y + (cell_height - line_height) / 2.0;

        {
            let area = self.renderer.last_page().last_layer().area();
            if let Some(mut section) = area.text_section(&self.font_cache, position(x, top), style)
            {
                section.print_str(text, style)?;
            };
        }

        if font.underline {
            let glyph_height = mm_to_f64(style.font(&self.font_cache).glyph_height(style.font_size()));
            let width = mm_to_f64(StyledString::new(text.to_owned(), style).width(&self.font_cache));
            let baseline = top + glyph_height + UNDERLINE_OFFSET_MM;
            self.draw_line(
                (x, baseline),
                (x + width, baseline),
                UNDERLINE_THICKNESS_MM,
                color,
            )?;
        }
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        color: Rgb,
    ) -> Result<(), LayoutError> {
        let area = self.renderer.last_page().last_layer().area();
        match strip_rect(from, to, thickness) {
            Some(rect) => {
                // genpdf strokes at a fixed width, so straight rules are filled strips.
                let pixel = RgbImage::from_pixel(1, 1, image::Rgb([color.r, color.g, color.b]));
                area.add_image(
                    &DynamicImage::ImageRgb8(pixel),
                    position(rect.x, rect.y + rect.height),
                    Scale::new(rect.width, rect.height),
                    Rotation::default(),
                    Some(STRIP_DPI),
                );
            }
            None => area.draw_line(
                vec![position(from.0, from.1), position(to.0, to.1)],
                Style::new().with_color(Color::from(color)),
            ),
        }
        Ok(())
    }

    fn draw_image(
        &mut self,
        image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError> {
        // genpdf sizes both axes from a single DPI value.
        let (px_width, px_height) = image.pixel_size();
        let native_width = MM_PER_INCH * f64::from(px_width) / image.dpi_x;
        let native_height = MM_PER_INCH * f64::from(px_height) / image.dpi_x;
        if native_width <= 0.0 || native_height <= 0.0 {
            return Ok(());
        }

        let area = self.renderer.last_page().last_layer().area();
        area.add_image(
            &image.image,
            position(x, y + height),
            Scale::new(width / native_width, height / native_height),
            Rotation::default(),
            Some(image.dpi_x),
        );
        Ok(())
    }

    fn add_link(&mut self, x: f64, y: f64, width: f64, height: f64, url: &str) {
        self.links.push(LinkAnnotation {
            page: self.pages_started.max(1) as u32,
            x,
            y,
            width,
            height,
            url: url.to_owned(),
        });
    }

    fn finish(self) -> Result<Vec<u8>, LayoutError> {
        let mut bytes = Vec::new();
        self.renderer.write(&mut bytes)?;
        Ok(apply_link_annotations(&bytes, &self.links, PAGE_HEIGHT)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::load_report_fonts;
    use crate::layout::{LayoutEngine, RuleOptions};
    use lopdf::content::Content;
    use lopdf::Document;

    const POINTS_PER_MM: f32 = 72.0 / 25.4;

    #[test]
    fn horizontal_rule_becomes_centred_strip() {
        let rect = strip_rect((20.0, 13.0), (190.0, 13.0), 0.2).expect("strip");
        assert_eq!(rect.x, 20.0);
        assert!((rect.y - 12.9).abs() < 1e-9);
        assert_eq!(rect.width, 170.0);
        assert_eq!(rect.height, 0.2);
    }

    #[test]
    fn vertical_line_becomes_strip() {
        let rect = strip_rect((50.0, 80.0), (50.0, 30.0), 1.0).expect("strip");
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (49.5, 30.0, 1.0, 50.0));
    }

    #[test]
    fn sloped_and_empty_lines_are_stroked() {
        assert_eq!(strip_rect((0.0, 0.0), (10.0, 10.0), 0.2), None);
        assert_eq!(strip_rect((5.0, 5.0), (5.0, 5.0), 0.2), None);
        assert_eq!(strip_rect((0.0, 5.0), (10.0, 5.0), 0.0), None);
    }

    #[test]
    fn rule_is_drawn_at_its_thickness() {
        let Ok(fonts) = load_report_fonts(None) else {
            eprintln!("skipping rule thickness test: fonts unavailable");
            return;
        };
        let writer = GenpdfWriter::new(fonts, "Rules").expect("writer");
        let mut engine = LayoutEngine::new(writer, None, None).expect("engine");
        engine
            .print_horizontal_line(&RuleOptions::default())
            .expect("rule");
        let bytes = engine.finish().expect("pdf");

        let document = Document::load_mem(&bytes).expect("valid PDF");
        let page = *document.get_pages().get(&1).expect("first page");
        let content = Content::decode(&document.get_page_content(page).expect("content"))
            .expect("decodes");
        let scales: Vec<(f32, f32)> = content
            .operations
            .iter()
            .filter(|operation| operation.operator == "cm" && operation.operands.len() == 6)
            .filter_map(|operation| {
                let a = operation.operands[0].as_float().ok()?;
                let d = operation.operands[3].as_float().ok()?;
                Some((a, d))
            })
            .collect();

        let width = 170.0 * POINTS_PER_MM;
        let height = 0.2 * POINTS_PER_MM;
        assert!(
            scales
                .iter()
                .any(|(a, d)| (a - width).abs() < 0.05 && (d - height).abs() < 0.05),
            "no 170 x 0.2 mm strip in {scales:?}"
        );
    }
}
