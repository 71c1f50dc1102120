//! Cursor-based page layout for A4 portrait reports.
//!
//! The [`LayoutEngine`] keeps a single vertical cursor and offers block-level
//! primitives (titles, paragraphs, bullets, images, links and rules). Each primitive
//! advances the cursor by a leading gap, draws, then advances by a trailing gap, and
//! breaks pages automatically when content would cross the bottom margin.

mod engine;
mod wrap;

#[cfg(test)]
pub(crate) mod testing;

use std::fmt;

pub use engine::LayoutEngine;
pub use wrap::{wrap_spans, Fragment, Line};

use crate::color::Rgb;
use crate::links::LinkError;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const LEFT_MARGIN: f64 = 20.0;
pub const RIGHT_MARGIN: f64 = 20.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - (LEFT_MARGIN + RIGHT_MARGIN);
pub const CENTRE: f64 = PAGE_WIDTH / 2.0;

pub const TOP_GUTTER: f64 = 10.0;
pub const BOTTOM_GUTTER: f64 = 10.0;
pub const TOP_SPACER: f64 = 5.0;
pub const BOTTOM_SPACER: f64 = 5.0;

pub const TEXT_COLOUR: Rgb = Rgb::new(69, 67, 96);
pub const LINE_COLOUR: Rgb = Rgb::new(247, 171, 52);

/// Height in millimetres of one line of text set at `font_size` points.
pub fn line_height(font_size: f64) -> f64 {
    (font_size / 2.0).floor()
}

/// Errors raised while laying out or writing a document.
#[derive(Debug)]
pub enum LayoutError {
    /// Rendering, font or image failure reported by `genpdf`.
    Pdf(genpdf::error::Error),
    /// Link annotations could not be added to the finished PDF.
    Links(LinkError),
    /// The finished document could not be written to disk.
    Io(std::io::Error),
}

impl From<genpdf::error::Error> for LayoutError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Pdf(err)
    }
}

impl From<LinkError> for LayoutError {
    fn from(err: LinkError) -> Self {
        Self::Links(err)
    }
}

impl From<std::io::Error> for LayoutError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf(err) => write!(f, "PDF rendering failed: {err}"),
            Self::Links(err) => write!(f, "Adding hyperlinks failed: {err}"),
            Self::Io(err) => write!(f, "Writing the PDF failed: {err}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Pdf(err) => Some(err),
            Self::Links(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

/// Horizontal placement of text lines and images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch every line but the last of a paragraph to the full width.
    Justify,
}

/// Options shared by the text primitives.
#[derive(Clone, Debug, PartialEq)]
pub struct TextOptions {
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub align: Align,
    pub indent: f64,
    pub colour: Rgb,
    pub before: f64,
    pub after: f64,
    pub fixed_width: bool,
    pub markdown: bool,
}

impl TextOptions {
    pub fn title() -> Self {
        Self {
            font_size: 30.0,
            bold: true,
            italic: false,
            align: Align::Left,
            indent: 0.0,
            colour: TEXT_COLOUR,
            before: 3.0,
            after: 3.0,
            fixed_width: false,
            markdown: false,
        }
    }

    pub fn heading() -> Self {
        Self {
            font_size: 13.0,
            before: 6.0,
            after: 2.0,
            ..Self::title()
        }
    }

    pub fn paragraph() -> Self {
        Self {
            font_size: 11.5,
            bold: false,
            italic: false,
            align: Align::Justify,
            indent: 0.0,
            colour: TEXT_COLOUR,
            before: 1.0,
            after: 1.0,
            fixed_width: false,
            markdown: true,
        }
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_indent(mut self, indent: f64) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_colour(mut self, colour: Rgb) -> Self {
        self.colour = colour;
        self
    }

    pub fn with_gaps(mut self, before: f64, after: f64) -> Self {
        self.before = before;
        self.after = after;
        self
    }

    pub fn with_fixed_width(mut self, fixed_width: bool) -> Self {
        self.fixed_width = fixed_width;
        self
    }

    pub fn with_markdown(mut self, markdown: bool) -> Self {
        self.markdown = markdown;
        self
    }
}

/// Options for [`LayoutEngine::print_bulleted_text`].
#[derive(Clone, Debug, PartialEq)]
pub struct BulletOptions {
    pub text: TextOptions,
    pub bullet: String,
    /// Offset of the bullet glyph from the left margin.
    pub bullet_indent: f64,
    /// Offset of the text from the bullet glyph.
    pub indent: f64,
}

impl Default for BulletOptions {
    fn default() -> Self {
        Self {
            text: TextOptions::paragraph(),
            bullet: "-".to_owned(),
            bullet_indent: 0.0,
            indent: 8.0,
        }
    }
}

/// Options for [`LayoutEngine::print_info_item`].
#[derive(Clone, Debug, PartialEq)]
pub struct InfoItemOptions {
    /// Absolute x position of the value column.
    pub tab_stop: f64,
    pub font_size: f64,
    pub align: Align,
    pub colour: Rgb,
    pub before: f64,
    pub after: f64,
}

impl Default for InfoItemOptions {
    fn default() -> Self {
        Self {
            tab_stop: 90.0,
            font_size: 12.0,
            align: Align::Left,
            colour: TEXT_COLOUR,
            before: 1.0,
            after: 1.0,
        }
    }
}

/// Options for [`LayoutEngine::print_image`].
#[derive(Clone, Debug, PartialEq)]
pub struct ImageOptions {
    /// Always scale the image to the available width.
    pub expand: bool,
    pub align: Align,
    pub indent: f64,
    pub before: f64,
    pub after: f64,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            expand: false,
            align: Align::Left,
            indent: 0.0,
            before: 2.0,
            after: 2.0,
        }
    }
}

/// Options for [`LayoutEngine::print_hyperlink`].
#[derive(Clone, Debug, PartialEq)]
pub struct HyperlinkOptions {
    pub font_size: f64,
    pub align: Align,
    pub indent: f64,
    pub colour: Rgb,
    pub before: f64,
    pub after: f64,
}

impl Default for HyperlinkOptions {
    fn default() -> Self {
        Self {
            font_size: 12.0,
            align: Align::Left,
            indent: 0.0,
            colour: LINE_COLOUR,
            before: 1.0,
            after: 1.0,
        }
    }
}

/// Options for [`LayoutEngine::print_horizontal_line`].
#[derive(Clone, Debug, PartialEq)]
pub struct RuleOptions {
    pub thickness: f64,
    pub indent: f64,
    pub colour: Rgb,
    pub before: f64,
    pub after: f64,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            thickness: 0.2,
            indent: 0.0,
            colour: LINE_COLOUR,
            before: 3.0,
            after: 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_height_is_half_the_point_size_rounded_down() {
        assert_eq!(line_height(11.5), 5.0);
        assert_eq!(line_height(30.0), 15.0);
        assert_eq!(line_height(7.75), 3.0);
    }

    #[test]
    fn heading_inherits_title_styling() {
        let heading = TextOptions::heading();
        assert!(heading.bold);
        assert_eq!(heading.font_size, 13.0);
        assert_eq!((heading.before, heading.after), (6.0, 2.0));
    }
}
