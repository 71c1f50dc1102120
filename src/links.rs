//! Clickable URI annotations added to a rendered PDF with `lopdf`.

use lopdf::{Dictionary, Document, Object, ObjectId};

const POINTS_PER_MM: f64 = 72.0 / 25.4;

/// A rectangle on one page that opens `url` when clicked.
///
/// Coordinates are millimetres measured from the top-left corner of the page.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkAnnotation {
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub url: String,
}

/// Errors that can occur while embedding link annotations into a rendered PDF.
#[derive(Debug)]
pub enum LinkError {
    /// The PDF bytes could not be parsed by `lopdf`.
    Parse(lopdf::Error),
    /// The updated document could not be serialised.
    Save(std::io::Error),
    /// A link refers to a page the document does not have.
    MissingPage(u32),
    /// The page object is not a dictionary.
    InvalidPage(u32),
}

impl From<lopdf::Error> for LinkError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Save(err)
    }
}

impl std::fmt::Display for LinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse PDF bytes: {err}"),
            Self::Save(err) => write!(f, "Failed to write PDF with links: {err}"),
            Self::MissingPage(page) => write!(f, "Link refers to missing page {page}"),
            Self::InvalidPage(page) => write!(f, "Page {page} is not a dictionary"),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Save(err) => Some(err),
            Self::MissingPage(_) | Self::InvalidPage(_) => None,
        }
    }
}

/// Adds one `/Link` annotation per entry of `links` to the document in `pdf_bytes`.
///
/// `page_height` is the page height in millimetres, used to flip the y axis into PDF
/// user space.
pub fn apply_link_annotations(
    pdf_bytes: &[u8],
    links: &[LinkAnnotation],
    page_height: f64,
) -> Result<Vec<u8>, LinkError> {
    if links.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    for link in links {
        let page_id = pages
            .get(&link.page)
            .copied()
            .ok_or(LinkError::MissingPage(link.page))?;
        let annotation_id = document.add_object(Object::Dictionary(link_dictionary(link, page_height)));
        append_annotation(&mut document, page_id, annotation_id, link.page)?;
    }

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(buffer)
}

fn to_points(mm: f64) -> i64 {
    (mm * POINTS_PER_MM).round() as i64
}

fn link_dictionary(link: &LinkAnnotation, page_height: f64) -> Dictionary {
    let mut action = Dictionary::new();
    action.set("S", Object::Name("URI".into()));
    action.set("URI", Object::string_literal(link.url.as_str()));

    let mut dictionary = Dictionary::new();
    dictionary.set("Type", Object::Name("Annot".into()));
    dictionary.set("Subtype", Object::Name("Link".into()));
    dictionary.set(
        "Rect",
        Object::Array(vec![
            Object::Integer(to_points(link.x)),
            Object::Integer(to_points(page_height - link.y - link.height)),
            Object::Integer(to_points(link.x + link.width)),
            Object::Integer(to_points(page_height - link.y)),
        ]),
    );
    dictionary.set(
        "Border",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    dictionary.set("A", Object::Dictionary(action));
    dictionary
}

fn append_annotation(
    document: &mut Document,
    page_id: ObjectId,
    annotation_id: ObjectId,
    page_number: u32,
) -> Result<(), LinkError> {
    let page = document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| LinkError::InvalidPage(page_number))?;

    let mut annotations = match page.get(b"Annots") {
        Ok(Object::Array(existing)) => existing.clone(),
        _ => Vec::new(),
    };
    annotations.push(Object::Reference(annotation_id));
    page.set("Annots", Object::Array(annotations));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_pdf(page_count: usize) -> Vec<u8> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..page_count {
            let mut page = Dictionary::new();
            page.set("Type", Object::Name("Page".into()));
            page.set("Parent", Object::Reference(pages_id));
            page.set(
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(842),
                ]),
            );
            kids.push(Object::Reference(document.add_object(Object::Dictionary(page))));
        }
        let mut pages = Dictionary::new();
        pages.set("Type", Object::Name("Pages".into()));
        pages.set("Count", Object::Integer(page_count as i64));
        pages.set("Kids", Object::Array(kids));
        document
            .objects
            .insert(pages_id, Object::Dictionary(pages));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name("Catalog".into()));
        catalog.set("Pages", Object::Reference(pages_id));
        let catalog_id = document.add_object(Object::Dictionary(catalog));
        document.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).expect("save blank pdf");
        bytes
    }

    fn link(page: u32) -> LinkAnnotation {
        LinkAnnotation {
            page,
            x: 26.0,
            y: 100.0,
            width: 50.0,
            height: 6.0,
            url: "https://example.com/docs".to_owned(),
        }
    }

    #[test]
    fn annotations_are_attached_to_their_page() {
        let bytes = apply_link_annotations(&blank_pdf(2), &[link(2), link(2)], 297.0)
            .expect("links applied");
        let document = Document::load_mem(&bytes).expect("reload");
        let pages = document.get_pages();

        let first = document
            .get_dictionary(pages[&1])
            .expect("first page dictionary");
        assert!(first.get(b"Annots").is_err());

        let second = document
            .get_dictionary(pages[&2])
            .expect("second page dictionary");
        let annots = second
            .get(b"Annots")
            .and_then(Object::as_array)
            .expect("annotations array");
        assert_eq!(annots.len(), 2);

        let annotation_id = annots[0].as_reference().expect("reference");
        let annotation = document
            .get_dictionary(annotation_id)
            .expect("annotation dictionary");
        let rect = annotation
            .get(b"Rect")
            .and_then(Object::as_array)
            .expect("rect");
        assert_eq!(rect[0].as_i64().expect("x1"), 74);
        assert_eq!(rect[3].as_i64().expect("y2"), 558);
    }

    #[test]
    fn missing_page_is_an_error() {
        let err = apply_link_annotations(&blank_pdf(1), &[link(3)], 297.0).unwrap_err();
        assert!(matches!(err, LinkError::MissingPage(3)));
    }

    #[test]
    fn no_links_leaves_bytes_untouched() {
        let bytes = blank_pdf(1);
        let output = apply_link_annotations(&bytes, &[], 297.0).expect("no-op");
        assert_eq!(output, bytes);
    }
}
