//! Ticket document rendering.

use super::encoder::CodeImage;
use super::layout::TicketLayout;
use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb};
use std::io::BufWriter;
use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// The PDF backend failed
    #[error("PDF generation error: {0}")]
    Pdf(#[from] printpdf::Error),

    /// Output buffer could not be flushed
    #[error("failed to finalize document: {0}")]
    Finalize(String),
}

/// Turns a ticket layout into document bytes
pub trait DocumentRenderer: Send + Sync {
    /// Render a single-page document
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the document cannot be produced.
    fn render(&self, layout: &TicketLayout) -> Result<Vec<u8>, RenderError>;

    /// File extension of produced documents, without the dot
    fn extension(&self) -> &'static str;
}

// Page geometry in points, origin at the top-left corner.
const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const HEADER_HEIGHT: f32 = 120.0;
const BOX: (f32, f32, f32, f32) = (40.0, 150.0, 515.0, 300.0);
const LABEL_X: f32 = 60.0;
const VALUE_X: f32 = 180.0;
const FIRST_ROW_Y: f32 = 210.0;
const ROW_STEP: f32 = 25.0;
const CODE: (f32, f32, f32) = (420.0, 190.0, 110.0);
const CAPTION_Y: f32 = 315.0;
const FOOTER_Y: f32 = 480.0;

/// A4 PDF renderer backed by `printpdf`
///
/// Uses the built-in Helvetica faces, so text is folded to plain ASCII
/// before it is drawn (`€` becomes `EUR`, accents are dropped).
#[derive(Clone, Copy, Debug, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    /// Creates a renderer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl DocumentRenderer for PdfRenderer {
    fn render(&self, layout: &TicketLayout) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            pdf_safe(&layout.title),
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            "Ticket",
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let layer = doc.get_page(page).get_layer(layer);

        render_header(&layer, layout, &regular, &bold);
        render_details(&layer, layout, &regular, &bold);
        render_code(&layer, &layout.code);

        layer.set_fill_color(rgb(120, 120, 130));
        text(&layer, &layout.caption, 10.0, CODE.0, CAPTION_Y, &regular);
        layer.set_fill_color(rgb(130, 130, 140));
        text(&layer, &layout.footer, 9.0, BOX.0, FOOTER_Y, &regular);

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)?;
        buf.into_inner()
            .map_err(|e| RenderError::Finalize(e.to_string()))
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

fn render_header(
    layer: &PdfLayerReference,
    layout: &TicketLayout,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    layer.set_fill_color(rgb(240, 240, 245));
    layer.add_rect(rect(0.0, 0.0, PAGE_WIDTH, HEADER_HEIGHT, PaintMode::Fill));

    layer.set_fill_color(rgb(20, 20, 30));
    text(layer, &layout.title, 20.0, 40.0, 52.0, bold);
    text(layer, &layout.subtitle, 14.0, 40.0, 80.0, regular);
}

fn render_details(
    layer: &PdfLayerReference,
    layout: &TicketLayout,
    regular: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let (x, y, w, h) = BOX;
    layer.set_outline_color(rgb(210, 210, 220));
    layer.set_outline_thickness(1.0);
    layer.add_rect(rect(x, y, w, h, PaintMode::Stroke));

    layer.set_fill_color(rgb(20, 20, 30));
    text(layer, &layout.heading, 16.0, LABEL_X, 180.0, bold);

    let mut row_y = FIRST_ROW_Y;
    for row in &layout.rows {
        layer.set_fill_color(rgb(90, 90, 100));
        text(layer, &row.label, 12.0, LABEL_X, row_y, regular);
        layer.set_fill_color(rgb(20, 20, 30));
        text(layer, &row.value, 12.0, VALUE_X, row_y, regular);
        row_y += ROW_STEP;
    }
}

#[allow(clippy::cast_precision_loss)] // module counts are tiny
fn render_code(layer: &PdfLayerReference, code: &CodeImage) {
    let (x, y, size) = CODE;
    let module = size / code.width() as f32;

    layer.set_fill_color(rgb(255, 255, 255));
    layer.add_rect(rect(x, y, size, size, PaintMode::Fill));
    layer.set_fill_color(rgb(0, 0, 0));
    for (col, row) in code.dark_modules() {
        layer.add_rect(rect(
            x + col as f32 * module,
            y + row as f32 * module,
            module,
            module,
            PaintMode::Fill,
        ));
    }
}

fn mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Rectangle from top-left page coordinates
fn rect(x: f32, y: f32, w: f32, h: f32, mode: PaintMode) -> Rect {
    Rect::new(mm(x), mm(PAGE_HEIGHT - y - h), mm(x + w), mm(PAGE_HEIGHT - y)).with_mode(mode)
}

/// Text with its baseline at top-left page coordinates
fn text(layer: &PdfLayerReference, s: &str, size: f32, x: f32, y: f32, font: &IndirectFontRef) {
    layer.use_text(pdf_safe(s), size, mm(x), mm(PAGE_HEIGHT - y), font);
}

/// Folds text into what the built-in fonts can show
fn pdf_safe(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '—' | '–' | '‑' | '•' => out.push('-'),
            '€' => out.push_str("EUR"),
            '’' | '‘' => out.push('\''),
            'à' | 'á' => out.push('a'),
            'è' | 'é' => out.push('e'),
            'ì' | 'í' => out.push('i'),
            'ò' | 'ó' => out.push('o'),
            'ù' | 'ú' => out.push('u'),
            'À' => out.push('A'),
            'È' | 'É' => out.push('E'),
            'Ì' => out.push('I'),
            'Ò' => out.push('O'),
            'Ù' => out.push('U'),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}
