//! PDF report rendering
//!
//! Layout is a single A4 column with 10mm margins: a title, the generation
//! date, the wrapped strategy text, then the chart. The chart sits 80mm
//! below the top of the first page when the text leaves room for it, and
//! follows the text otherwise.

use crate::error::{AgentError, Result};
use crate::metrics::{glyph_width, text_width};
use chrono::NaiveDate;
use printpdf::image_crate::ImageDecoder;
use printpdf::image_crate::codecs::png::PngDecoder;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use textwrap::core::Fragment;
use textwrap::wrap_algorithms::wrap_first_fit;
use tracing::debug;

/// Title printed at the top of every report
pub const REPORT_TITLE: &str = "Market Entry Strategy";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const LAYER_NAME: &str = "Layer 1";

const TITLE_SIZE: f32 = 16.0;
const META_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 12.0;
const TITLE_HEIGHT: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.0;

const CHART_X: f32 = 10.0;
const CHART_TOP: f32 = 80.0;
const CHART_WIDTH: f32 = 180.0;
const CHART_GAP: f32 = 4.0;
const MM_PER_INCH: f32 = 25.4;

/// Everything printed in a report
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    /// Heading on the first page
    pub title: &'a str,
    /// Strategy text, wrapped to the page width
    pub body: &'a str,
    /// PNG embedded below the text
    pub chart: &'a Path,
    /// Date printed under the title
    pub generated_on: NaiveDate,
}

/// Render a report to PDF bytes
pub fn render_report(content: &ReportContent<'_>) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        content.title,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER_NAME,
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let layer = doc.get_page(page).get_layer(layer);
    let mut cursor = Cursor {
        doc: &doc,
        layer,
        top: MARGIN,
        page: 0,
    };

    cursor.line(&sanitize(content.title), TITLE_SIZE, &bold, TITLE_HEIGHT);
    cursor.line(
        &format!("Generated {}", content.generated_on.format("%Y-%m-%d")),
        META_SIZE,
        &regular,
        LINE_HEIGHT,
    );
    cursor.top += CHART_GAP;

    let lines = wrap_body(content.body, BODY_SIZE);
    for line in &lines {
        cursor.line(line, BODY_SIZE, &regular, LINE_HEIGHT);
    }
    debug!("Laid out {} body lines over {} page(s)", lines.len(), cursor.page + 1);

    place_chart(&mut cursor, content.chart)?;

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer
        .into_inner()
        .map_err(|e| AgentError::Io(e.into_error()))
}

/// Write `bytes` to `path` through a sibling temporary file
///
/// The target is replaced only once the new content is fully on disk; on
/// failure any previous file at `path` is left as it was.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| AgentError::Io(e.error))?;
    Ok(())
}

/// Tracks the write position, measured in mm from the top of the page
struct Cursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    top: f32,
    page: usize,
}

impl Cursor<'_> {
    fn ensure_room(&mut self, height: f32) {
        if self.top + height > PAGE_HEIGHT - MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.top = MARGIN;
            self.page += 1;
        }
    }

    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef, height: f32) {
        self.ensure_room(height);
        if !text.is_empty() {
            let baseline = PAGE_HEIGHT - (self.top + height * 0.7);
            self.layer.use_text(text, size, Mm(MARGIN), Mm(baseline), font);
        }
        self.top += height;
    }
}

fn place_chart(cursor: &mut Cursor<'_>, chart: &Path) -> Result<()> {
    let file = File::open(chart).map_err(|e| match e.kind() {
        ErrorKind::NotFound => AgentError::ChartMissing(chart.to_path_buf()),
        _ => AgentError::Io(e),
    })?;
    let decoder = PngDecoder::new(BufReader::new(file)).map_err(pdf_error)?;
    let (width_px, height_px) = decoder.dimensions();
    if width_px == 0 || height_px == 0 {
        return Err(AgentError::PdfError(format!(
            "chart {} has no pixels",
            chart.display()
        )));
    }
    let image = Image::try_from(decoder).map_err(pdf_error)?;

    let height = CHART_WIDTH * height_px as f32 / width_px as f32;
    let top = if cursor.page == 0 && cursor.top <= CHART_TOP {
        CHART_TOP
    } else {
        cursor.ensure_room(height + CHART_GAP);
        cursor.top + CHART_GAP
    };
    cursor.top = top + height;

    image.add_to_layer(
        cursor.layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(CHART_X)),
            translate_y: Some(Mm(PAGE_HEIGHT - top - height)),
            dpi: Some(width_px as f32 * MM_PER_INCH / CHART_WIDTH),
            ..Default::default()
        },
    );
    Ok(())
}

fn pdf_error<E: std::fmt::Display>(err: E) -> AgentError {
    AgentError::PdfError(err.to_string())
}

/// A word and the spaces after it, measured in mm
#[derive(Debug)]
struct Piece<'a> {
    word: &'a str,
    gap: &'a str,
    width: f64,
    gap_width: f64,
}

impl Fragment for Piece<'_> {
    fn width(&self) -> f64 {
        self.width
    }

    fn whitespace_width(&self) -> f64 {
        self.gap_width
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Split text into printable lines no wider than the body column at
/// `size` points
///
/// Blank lines are kept as paragraph breaks. Words wider than the column
/// are broken between characters.
fn wrap_body(text: &str, size: f32) -> Vec<String> {
    let column = f64::from(TEXT_WIDTH);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let paragraph = sanitize(paragraph);
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut pieces = Vec::new();
        for chunk in paragraph.split_inclusive(' ') {
            let word = chunk.trim_end_matches(' ');
            let gap = &chunk[word.len()..];
            let parts = split_to_width(word, size, column);
            let last = parts.len().saturating_sub(1);
            for (i, part) in parts.into_iter().enumerate() {
                let gap = if i == last { gap } else { "" };
                pieces.push(Piece {
                    word: part,
                    gap,
                    width: text_width(part, size),
                    gap_width: text_width(gap, size),
                });
            }
        }

        for line in wrap_first_fit(&pieces, &[column]) {
            let mut out = String::new();
            for (i, piece) in line.iter().enumerate() {
                out.push_str(piece.word);
                if i + 1 < line.len() {
                    out.push_str(piece.gap);
                }
            }
            lines.push(out.trim_end().to_string());
        }
    }
    lines
}

/// Break `word` into runs that each fit within `max` mm
fn split_to_width(word: &str, size: f32, max: f64) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut width = 0.0;

    for (i, c) in word.char_indices() {
        let advance = text_width(&word[i..i + c.len_utf8()], size);
        if width + advance > max && i > start {
            parts.push(&word[start..i]);
            start = i;
            width = 0.0;
        }
        width += advance;
    }
    parts.push(&word[start..]);
    parts
}

/// Reduce text to what the builtin WinAnsi fonts can print
///
/// Characters with a WinAnsi code pass through unchanged, a few common
/// lookalikes are substituted and anything else becomes `?`.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\t' => out.push_str("    "),
            '\u{a0}' => out.push(' '),
            '\u{ad}' => {}
            '\u{2032}' => out.push('\''),
            '\u{2033}' => out.push('"'),
            '\u{2212}' => out.push('-'),
            '\u{25cf}' | '\u{25aa}' => out.push('\u{2022}'),
            '\u{20b9}' => out.push_str("INR "),
            c if glyph_width(c).is_some() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::render_chart;
    use crate::config::MarketDataMode;
    use crate::data::MarketTable;
    use lopdf::{Document, Object};
    use std::path::PathBuf;

    fn chart_in(dir: &Path) -> PathBuf {
        let path = dir.join("chart.png");
        render_chart(&MarketTable::generate(MarketDataMode::Fixed), "t", &path, None).unwrap();
        path
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn page_text(doc: &Document) -> String {
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut text = String::new();
        for id in doc.get_pages().values() {
            let content = doc.get_page_content(*id).unwrap();
            text.push_str(&String::from_utf8_lossy(&content));
        }
        text.push_str(&doc.extract_text(&pages).unwrap_or_default());
        text
    }

    fn has_image(doc: &Document) -> bool {
        doc.objects.values().any(|obj| match obj {
            Object::Stream(stream) => {
                matches!(stream.dict.get(b"Subtype").and_then(Object::as_name), Ok(name) if name == b"Image")
            }
            _ => false,
        })
    }

    #[test]
    fn test_report_contains_text_and_chart() {
        let dir = tempfile::tempdir().unwrap();
        let chart = chart_in(dir.path());

        let bytes = render_report(&ReportContent {
            title: REPORT_TITLE,
            body: "STEP 1: Partner with a state utility\nSTEP 2: Bid in solar auctions",
            chart: &chart,
            generated_on: date(),
        })
        .unwrap();

        assert!(bytes.starts_with(b"%PDF"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let text = page_text(&doc);
        assert!(text.contains("STEP 1:"));
        assert!(text.contains("Market Entry Strategy"));
        assert!(has_image(&doc));
    }

    #[test]
    fn test_long_text_continues_on_new_page() {
        let dir = tempfile::tempdir().unwrap();
        let chart = chart_in(dir.path());
        let body = (1..=80)
            .map(|i| format!("STEP {i}: expand distribution in region {i}"))
            .collect::<Vec<_>>()
            .join("\n");

        let bytes = render_report(&ReportContent {
            title: REPORT_TITLE,
            body: &body,
            chart: &chart,
            generated_on: date(),
        })
        .unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 2);
        assert!(has_image(&doc));
    }

    #[test]
    fn test_missing_chart() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("chart.png");

        let err = render_report(&ReportContent {
            title: REPORT_TITLE,
            body: "STEP 1: wait",
            chart: &missing,
            generated_on: date(),
        })
        .unwrap_err();

        assert!(matches!(err, AgentError::ChartMissing(path) if path == missing));
    }

    #[test]
    fn test_write_atomically_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("strategy_report.pdf");
        std::fs::write(&target, b"old").unwrap();

        write_atomically(&target, b"new report").unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new report");
        let leftovers = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    fn fits_column(lines: &[String]) -> bool {
        lines
            .iter()
            .all(|l| text_width(l, BODY_SIZE) <= f64::from(TEXT_WIDTH))
    }

    #[test]
    fn test_wrap_body_respects_width() {
        let long = "word ".repeat(60);
        let lines = wrap_body(&format!("{long}\n\nSTEP 2: short"), BODY_SIZE);

        assert!(lines.len() >= 4);
        assert!(fits_column(&lines));
        assert!(lines.contains(&String::new()));
        assert_eq!(lines.last().map(String::as_str), Some("STEP 2: short"));
    }

    #[test]
    fn test_wrap_body_measures_capitals() {
        let heading =
            "STEP 1: MARKET ASSESSMENT AND REGULATORY MAPPING FOR WIND POWER IN MAHARASHTRA";
        assert!(text_width(heading, BODY_SIZE) > f64::from(TEXT_WIDTH));

        let lines = wrap_body(heading, BODY_SIZE);

        assert_eq!(lines.len(), 2);
        assert!(fits_column(&lines));
        assert_eq!(lines.join(" "), heading);
    }

    #[test]
    fn test_wrap_body_breaks_long_word() {
        let word = "W".repeat(120);
        let lines = wrap_body(&word, BODY_SIZE);

        assert!(lines.len() > 1);
        assert!(fits_column(&lines));
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(
            sanitize("## **STEP 1:** Enter \u{2014} fast"),
            "## **STEP 1:** Enter \u{2014} fast"
        );
        assert_eq!(sanitize("caf\u{e9} \u{fc}ber \u{a3}5"), "caf\u{e9} \u{fc}ber \u{a3}5");
        assert_eq!(sanitize("\u{25cf} \u{20b9}5\u{a0}cr"), "\u{2022} INR 5 cr");
        assert_eq!(sanitize("\u{4e2d}\tx"), "?    x");
    }

    #[test]
    fn test_report_keeps_latin1_text() {
        let dir = tempfile::tempdir().unwrap();
        let chart = chart_in(dir.path());

        let bytes = render_report(&ReportContent {
            title: REPORT_TITLE,
            body: "STEP 1: Open a caf\u{e9} in M\u{fc}nchen for \u{a3}5",
            chart: &chart,
            generated_on: date(),
        })
        .unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let text = page_text(&doc);
        assert!(text.contains("caf\u{e9}"));
        assert!(text.contains("M\u{fc}nchen"));
    }
}
