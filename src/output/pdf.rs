//! PDF rendering with printpdf

use crate::error::Result;
use crate::output::report::RecommendationReport;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const BODY_SIZE: f32 = 11.0;
const TITLE_SIZE: f32 = 16.0;
const LINE_HEIGHT: f32 = 5.5;
/// Characters per line for Helvetica 11pt across the A4 text width
const WRAP_WIDTH: usize = 90;

/// Writes lines top to bottom, starting a new page when the current one is full
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    font: &'a IndirectFontRef,
    y: f32,
}

impl<'a> PageWriter<'a> {
    fn line(&mut self, text: &str, size: f32) {
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.layer.use_text(text, size, Mm(MARGIN), Mm(self.y), self.font);
        self.y -= LINE_HEIGHT * size / BODY_SIZE;
    }

    fn blank(&mut self) {
        self.y -= LINE_HEIGHT;
    }
}

pub fn render_pdf(report: &RecommendationReport) -> Result<Vec<u8>> {
    let title = report.title();
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let mut writer = PageWriter {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        font: &bold,
        y: PAGE_HEIGHT - MARGIN,
    };
    write_report(&mut writer, report, &font);
    drop(writer);

    Ok(doc.save_to_bytes()?)
}

fn write_report<'a>(writer: &mut PageWriter<'a>, report: &RecommendationReport, body_font: &'a IndirectFontRef) {
    writer.line(&to_winansi(&report.title()), TITLE_SIZE);
    writer.blank();

    writer.font = body_font;
    if let Some(probability) = report.attrition_probability {
        writer.line(&format!("Attrition probability: {:.0}%", probability * 100.0), BODY_SIZE);
    }
    writer.line(
        &format!(
            "Generated {} with {}",
            report.metadata.generated_at.format("%Y-%m-%d %H:%M UTC"),
            to_winansi(&report.metadata.llm_model)
        ),
        BODY_SIZE,
    );
    writer.blank();

    for line in report.recommendation.lines() {
        if line.trim().is_empty() {
            writer.blank();
            continue;
        }
        for wrapped in wrap(&to_winansi(line), WRAP_WIDTH) {
            writer.line(&wrapped, BODY_SIZE);
        }
    }
}

/// Greedy word wrap; words longer than `width` are hard-split
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(width).collect();
            word = word.chars().skip(width).collect();
            lines.push(head);
        }

        let needed = if current.is_empty() { 0 } else { 1 } + word.chars().count();
        if current.chars().count() + needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Built-in PDF fonts only cover Latin-1; anything else is replaced
fn to_winansi(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2013}' | '\u{2014}' => '-',
            '\u{2022}' => '*',
            c if (c as u32) < 0x100 && !c.is_control() => c,
            _ => '?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::tests::sample_report;

    #[test]
    fn test_wrap_respects_width() {
        let text = "Offer a flexible schedule and review compensation against the sales benchmark.";
        let lines = wrap(text, 20);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap(&"x".repeat(25), 10);
        assert_eq!(lines, vec!["x".repeat(10), "x".repeat(10), "x".repeat(5)]);
    }

    #[test]
    fn test_non_latin_is_replaced() {
        assert_eq!(to_winansi("Zoë – “ok” 日"), "Zoë - \"ok\" ?");
    }

    #[test]
    fn test_renders_pdf_bytes() {
        let mut report = sample_report();
        report.recommendation = "Long paragraph. ".repeat(400);
        let bytes = render_pdf(&report).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
