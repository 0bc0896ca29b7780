//! Word (`.docx`) serialisation of a [`DocumentModel`].
//!
//! Styles are declared up front so Word's navigation pane and outline view
//! pick up the transcribed headings, bullets get a real numbering definition
//! instead of a literal "•", and diagram placeholders use a distinct quote
//! style.

use super::assemble::{DocumentModel, DocumentPart, ReferenceImage, SEPARATOR};
use super::Block;
use crate::error::NotesError;
use docx_rs::{
    AbstractNumbering, AlignmentType, Docx, IndentLevel, Level, LevelJc, LevelText, NumberFormat,
    Numbering, NumberingId, Paragraph, Pic, Run, Start, Style, StyleType,
};
use std::io::Cursor;
use tracing::debug;

const EMU_PER_INCH: f64 = 914_400.0;
/// Tallest image we emit: 9 in, the printable height of a Letter/A4 page.
pub const MAX_IMAGE_HEIGHT_EMU: u32 = 8_229_600;

const STYLE_INTENSE_QUOTE: &str = "IntenseQuote";
const BULLET_NUMBERING_ID: usize = 1;

/// Serialise the document to `.docx` bytes.
pub fn render_docx(model: &DocumentModel) -> Result<Vec<u8>, NotesError> {
    let mut docx = with_styles(Docx::new());

    for part in &model.parts {
        docx = docx.add_paragraph(part_paragraph(part, model.image_width_inches));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| NotesError::DocumentBuildFailed(e.to_string()))?;

    let bytes = cursor.into_inner();
    debug!("Rendered .docx: {} parts, {} bytes", model.parts.len(), bytes.len());
    Ok(bytes)
}

fn part_paragraph(part: &DocumentPart, width_inches: f64) -> Paragraph {
    match part {
        DocumentPart::Title(text) => Paragraph::new()
            .add_run(Run::new().add_text(text))
            .style(&heading_style_id(1))
            .align(AlignmentType::Center),
        DocumentPart::Paragraph(text) => Paragraph::new().add_run(Run::new().add_text(text)),
        DocumentPart::Separator => Paragraph::new().add_run(Run::new().add_text(SEPARATOR)),
        DocumentPart::Spacer => Paragraph::new(),
        DocumentPart::Block(block) => block_paragraph(block),
        DocumentPart::Image(image) => image_paragraph(image, width_inches),
    }
}

fn block_paragraph(block: &Block) -> Paragraph {
    match block {
        Block::Heading { level, text } => Paragraph::new()
            .add_run(Run::new().add_text(text))
            .style(&heading_style_id(*level)),
        Block::Bullet(text) => Paragraph::new()
            .add_run(Run::new().add_text(text))
            .numbering(NumberingId::new(BULLET_NUMBERING_ID), IndentLevel::new(0)),
        Block::Diagram(text) => Paragraph::new()
            .add_run(Run::new().add_text(text))
            .style(STYLE_INTENSE_QUOTE)
            .align(AlignmentType::Center),
        Block::Paragraph(text) => Paragraph::new().add_run(Run::new().add_text(text)),
    }
}

fn image_paragraph(image: &ReferenceImage, width_inches: f64) -> Paragraph {
    match image {
        ReferenceImage::Embedded {
            png,
            width_px,
            height_px,
        } => {
            let (w_emu, h_emu) = display_size_emu(*width_px, *height_px, width_inches);
            let pic = Pic::new_with_dimensions(png.clone(), *width_px, *height_px).size(w_emu, h_emu);
            Paragraph::new().add_run(Run::new().add_image(pic))
        }
        ReferenceImage::Placeholder(text) => Paragraph::new().add_run(Run::new().add_text(text)),
    }
}

/// Scale an image to `width_inches`, preserving its aspect ratio.
///
/// Very tall strips are capped at [`MAX_IMAGE_HEIGHT_EMU`]; the width stays
/// fixed, so such an image is squashed rather than spilling off the page.
pub fn display_size_emu(width_px: u32, height_px: u32, width_inches: f64) -> (u32, u32) {
    let w_emu = (width_inches * EMU_PER_INCH).round();
    let h_emu = if width_px == 0 {
        0.0
    } else {
        (w_emu * f64::from(height_px) / f64::from(width_px)).round()
    };
    (w_emu as u32, h_emu.min(f64::from(MAX_IMAGE_HEIGHT_EMU)) as u32)
}

fn heading_style_id(level: u8) -> String {
    format!("Heading{}", level.clamp(1, 3))
}

fn with_styles(docx: Docx) -> Docx {
    let bullet = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    );

    docx.add_style(
        Style::new("Heading1", StyleType::Paragraph)
            .name("Heading 1")
            .size(32)
            .bold()
            .color("2F5496"),
    )
    .add_style(
        Style::new("Heading2", StyleType::Paragraph)
            .name("Heading 2")
            .size(28)
            .bold()
            .color("2F5496"),
    )
    .add_style(
        Style::new("Heading3", StyleType::Paragraph)
            .name("Heading 3")
            .size(24)
            .bold()
            .color("1F3763"),
    )
    .add_style(
        Style::new(STYLE_INTENSE_QUOTE, StyleType::Paragraph)
            .name("Intense Quote")
            .italic()
            .color("4472C4"),
    )
    .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING_ID).add_level(bullet))
    .add_numbering(Numbering::new(BULLET_NUMBERING_ID, BULLET_NUMBERING_ID))
}
