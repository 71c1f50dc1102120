//! A [`PageWriter`] that records drawing calls for layout tests.

use crate::color::Rgb;
use crate::images::LoadedImage;
use crate::layout::LayoutError;
use crate::writer::{FontSpec, PageWriter};

/// Advance width of one character as a fraction of the point size, in millimetres.
const CHAR_WIDTH_PER_POINT: f64 = 0.05;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawnText {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
    pub font: FontSpec,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawnImage {
    pub page: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Op {
    Page(usize),
    Text(DrawnText),
    Line {
        page: usize,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
    },
    Image(DrawnImage),
    Link {
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        url: String,
    },
}

#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    pub ops: Vec<Op>,
    pages: usize,
}

impl RecordingWriter {
    pub fn texts(&self) -> impl Iterator<Item = &DrawnText> {
        self.ops.iter().filter_map(|op| match op {
            Op::Text(text) => Some(text),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawnImage> {
        self.ops.iter().filter_map(|op| match op {
            Op::Image(image) => Some(image),
            _ => None,
        })
    }
}

impl PageWriter for RecordingWriter {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn begin_page(&mut self) -> Result<(), LayoutError> {
        self.pages += 1;
        self.ops.push(Op::Page(self.pages));
        Ok(())
    }

    fn text_width(&self, text: &str, font: FontSpec) -> f64 {
        text.chars().count() as f64 * font.size * CHAR_WIDTH_PER_POINT
    }

    fn draw_text(
        &mut self,
        x: f64,
        y: f64,
        _cell_height: f64,
        text: &str,
        font: FontSpec,
        color: Rgb,
    ) -> Result<(), LayoutError> {
        let width = self.text_width(text, font);
        self.ops.push(Op::Text(DrawnText {
            page: self.pages,
            x,
            y,
            width,
            text: text.to_owned(),
            font,
            color,
        }));
        Ok(())
    }

    fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        thickness: f64,
        _color: Rgb,
    ) -> Result<(), LayoutError> {
        self.ops.push(Op::Line {
            page: self.pages,
            from,
            to,
            thickness,
        });
        Ok(())
    }

    fn draw_image(
        &mut self,
        _image: &LoadedImage,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), LayoutError> {
        self.ops.push(Op::Image(DrawnImage {
            page: self.pages,
            x,
            y,
            width,
            height,
        }));
        Ok(())
    }

    fn add_link(&mut self, x: f64, y: f64, width: f64, height: f64, url: &str) {
        self.ops.push(Op::Link {
            page: self.pages,
            x,
            y,
            width,
            height,
            url: url.to_owned(),
        });
    }

    fn finish(self) -> Result<Vec<u8>, LayoutError> {
        Ok(b"%PDF-recorded".to_vec())
    }
}
