//! Document assembly: wrap the mapped blocks into the final page layout.
//!
//! ## Layout
//!
//! ```text
//! Chemistry Notes - OCR Extraction      (title, centered)
//! OCR Engine: GROQ                      (metadata line)
//! __________________________________    (separator)
//! …mapped blocks, in source order…
//!                                       (spacer)
//! __________________________________    (separator)
//! Original Image (Reference)            (heading 2)
//! [photo, fixed display width]          (or a placeholder paragraph)
//! ```
//!
//! The photo is decoded here rather than in the writer so a corrupt or
//! unreadable file degrades to a placeholder instead of failing the request.

use super::Block;
use crate::config::Engine;
use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

pub const DOCUMENT_TITLE: &str = "Chemistry Notes - OCR Extraction";
pub const REFERENCE_HEADING: &str = "Original Image (Reference)";
pub const IMAGE_PLACEHOLDER: &str = "[Could not embed original image]";
pub const SEPARATOR: &str = "__________________________________________________";

/// Longest edge of the embedded photo. Phone photos are downscaled; the
/// document only displays them at a few inches wide.
pub const MAX_EMBEDDED_PIXELS: u32 = 2000;

/// One top-level element of the assembled document, in output order.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentPart {
    /// Centered level-1 title.
    Title(String),
    /// Plain paragraph outside the transcribed body (metadata line).
    Paragraph(String),
    /// Horizontal separator line.
    Separator,
    /// Empty paragraph.
    Spacer,
    /// A transcribed block, or the reference heading.
    Block(Block),
    /// The reference photo, always last.
    Image(ReferenceImage),
}

/// The original photo as it will be embedded.
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceImage {
    Embedded {
        png: Vec<u8>,
        width_px: u32,
        height_px: u32,
    },
    Placeholder(String),
}

impl ReferenceImage {
    /// Decode image bytes; any failure yields the placeholder.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match decode_for_embedding(bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!("Could not embed original image: {}", e);
                ReferenceImage::Placeholder(IMAGE_PLACEHOLDER.to_string())
            }
        }
    }

    /// Read and decode an image file; any failure yields the placeholder.
    pub fn from_path(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) => {
                warn!("Could not read image {}: {}", path.display(), e);
                ReferenceImage::Placeholder(IMAGE_PLACEHOLDER.to_string())
            }
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ReferenceImage::Embedded { .. })
    }
}

fn decode_for_embedding(bytes: &[u8]) -> Result<ReferenceImage, image::ImageError> {
    let mut img = image::load_from_memory(bytes)?;
    if img.width() > MAX_EMBEDDED_PIXELS || img.height() > MAX_EMBEDDED_PIXELS {
        img = img.resize(MAX_EMBEDDED_PIXELS, MAX_EMBEDDED_PIXELS, FilterType::Triangle);
    }

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    debug!(
        "Reference image {}x{} px → {} bytes PNG",
        img.width(),
        img.height(),
        png.len()
    );

    Ok(ReferenceImage::Embedded {
        png,
        width_px: img.width(),
        height_px: img.height(),
    })
}

/// The complete document, ready for serialisation.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    pub parts: Vec<DocumentPart>,
    /// Display width of the reference photo.
    pub image_width_inches: f64,
}

impl DocumentModel {
    /// The transcribed blocks only, excluding the fixed reference heading.
    pub fn body_blocks(&self) -> impl Iterator<Item = &Block> {
        let mut separators = 0;
        self.parts.iter().filter_map(move |p| match p {
            DocumentPart::Separator => {
                separators += 1;
                None
            }
            DocumentPart::Block(b) if separators == 1 => Some(b),
            _ => None,
        })
    }

    pub fn reference_image(&self) -> Option<&ReferenceImage> {
        self.parts.iter().find_map(|p| match p {
            DocumentPart::Image(img) => Some(img),
            _ => None,
        })
    }
}

/// Assemble the document around the mapped blocks.
///
/// Never fails: an unreadable `image_path` becomes a placeholder paragraph.
pub fn assemble(
    blocks: Vec<Block>,
    engine: Engine,
    image_path: &Path,
    image_width_inches: f64,
) -> DocumentModel {
    let image = ReferenceImage::from_path(image_path);
    assemble_with_image(blocks, engine, image, image_width_inches)
}

/// Assemble with an already-decoded reference image.
pub fn assemble_with_image(
    blocks: Vec<Block>,
    engine: Engine,
    image: ReferenceImage,
    image_width_inches: f64,
) -> DocumentModel {
    let mut parts = Vec::with_capacity(blocks.len() + 8);

    parts.push(DocumentPart::Title(DOCUMENT_TITLE.to_string()));
    parts.push(DocumentPart::Paragraph(format!(
        "OCR Engine: {}",
        engine.as_str().to_uppercase()
    )));
    parts.push(DocumentPart::Separator);

    parts.extend(blocks.into_iter().map(DocumentPart::Block));

    parts.push(DocumentPart::Spacer);
    parts.push(DocumentPart::Separator);
    parts.push(DocumentPart::Block(Block::Heading {
        level: 2,
        text: REFERENCE_HEADING.to_string(),
    }));
    parts.push(DocumentPart::Image(image));

    DocumentModel {
        parts,
        image_width_inches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([250, 250, 240])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
        buf
    }

    #[test]
    fn layout_wraps_blocks_in_order() {
        let blocks = vec![
            Block::Heading {
                level: 1,
                text: "Acids".into(),
            },
            Block::Bullet("HCl".into()),
        ];
        let doc = assemble_with_image(
            blocks.clone(),
            Engine::Groq,
            ReferenceImage::Placeholder(IMAGE_PLACEHOLDER.into()),
            6.0,
        );

        assert_eq!(doc.parts[0], DocumentPart::Title(DOCUMENT_TITLE.into()));
        assert_eq!(doc.parts[1], DocumentPart::Paragraph("OCR Engine: GROQ".into()));
        assert_eq!(doc.parts[2], DocumentPart::Separator);
        assert_eq!(doc.parts[3], DocumentPart::Block(blocks[0].clone()));
        assert_eq!(doc.parts[4], DocumentPart::Block(blocks[1].clone()));
        assert_eq!(doc.parts[5], DocumentPart::Spacer);
        assert_eq!(doc.parts[6], DocumentPart::Separator);
        assert_eq!(
            doc.parts[7],
            DocumentPart::Block(Block::Heading {
                level: 2,
                text: REFERENCE_HEADING.into()
            })
        );
        assert!(matches!(doc.parts[8], DocumentPart::Image(_)));
        assert_eq!(doc.body_blocks().cloned().collect::<Vec<_>>(), blocks);
    }

    #[test]
    fn empty_body_still_has_frame_and_image() {
        let doc = assemble_with_image(
            Vec::new(),
            Engine::Gemini,
            ReferenceImage::from_bytes(&png_bytes(4, 3)),
            6.0,
        );
        assert_eq!(doc.body_blocks().count(), 0);
        assert_eq!(doc.parts.len(), 7);
        assert_eq!(doc.parts[1], DocumentPart::Paragraph("OCR Engine: GEMINI".into()));
        assert!(doc.reference_image().unwrap().is_embedded());
    }

    #[test]
    fn corrupt_bytes_become_placeholder() {
        let img = ReferenceImage::from_bytes(b"definitely not an image");
        assert_eq!(img, ReferenceImage::Placeholder(IMAGE_PLACEHOLDER.into()));
    }

    #[test]
    fn missing_path_becomes_placeholder() {
        let doc = assemble(
            vec![Block::Paragraph("x".into())],
            Engine::Groq,
            Path::new("/no/such/photo.png"),
            6.0,
        );
        assert!(!doc.reference_image().unwrap().is_embedded());
        assert_eq!(doc.body_blocks().count(), 1);
    }

    #[test]
    fn large_photos_are_downscaled_keeping_aspect() {
        match ReferenceImage::from_bytes(&png_bytes(4000, 1000)) {
            ReferenceImage::Embedded {
                width_px,
                height_px,
                png,
            } => {
                assert_eq!(width_px, MAX_EMBEDDED_PIXELS);
                assert_eq!(height_px, 500);
                assert_eq!(&png[..4], b"\x89PNG");
            }
            other => panic!("expected embedded image, got {other:?}"),
        }
    }
}
