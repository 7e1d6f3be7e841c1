//! A4 appointment listing rendered with the PDF builtin fonts.

use anyhow::{anyhow, Result};
use printpdf::*;
use std::io::BufWriter;

use crate::appointment::AppointItem;

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const TOP: Mm = Mm(280.0);
const BOTTOM: Mm = Mm(20.0);
const LINE: Mm = Mm(4.5);

/// Column title, left edge and wrap width in characters.
const COLUMNS: [(&str, f32, usize); 6] = [
    ("Date", 15.0, 12),
    ("Time", 38.0, 6),
    ("Client", 52.0, 24),
    ("Procedure", 98.0, 20),
    ("Professional", 138.0, 20),
    ("Status", 178.0, 12),
];

pub fn generate_report_pdf(title: &str, generated_on: &str, items: &[AppointItem]) -> Result<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(title, PAGE_WIDTH, PAGE_HEIGHT, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("PDF font error: {}", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| anyhow!("PDF font error: {}", e))?;

    let mut layer = doc.get_page(page1).get_layer(layer1);
    let mut y = TOP;

    layer.use_text(title, 14.0, Mm(15.0), y, &bold);
    y -= Mm(6.0);
    layer.use_text(format!("Generated on {}", generated_on), 9.0, Mm(15.0), y, &font);
    y -= Mm(10.0);
    y = header_row(&layer, &bold, y);

    if items.is_empty() {
        layer.use_text("No appointments registered.", 9.0, Mm(15.0), y, &font);
    }

    let mut page_no = 1;
    for item in items {
        let cells = [
            &item.date,
            &item.time,
            &item.client_name,
            &item.procedure_name,
            &item.professional_name,
            &item.status,
        ];
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(COLUMNS.iter())
            .map(|(text, (_, _, width))| wrap_text(text, *width))
            .collect();
        let rows = wrapped.iter().map(Vec::len).max().unwrap_or(1);
        let height = Mm(LINE.0 * rows as f32);

        if y - height < BOTTOM {
            page_no += 1;
            let (page, layer_index) =
                doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, format!("Layer {}", page_no));
            layer = doc.get_page(page).get_layer(layer_index);
            y = header_row(&layer, &bold, TOP);
        }

        for (lines, (_, x, _)) in wrapped.iter().zip(COLUMNS.iter()) {
            let mut line_y = y;
            for line in lines {
                layer.use_text(line, 9.0, Mm(*x), line_y, &font);
                line_y -= LINE;
            }
        }
        y -= height + Mm(1.5);
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| anyhow!("PDF save error: {}", e))?;
    buf.into_inner()
        .map_err(|e| anyhow!("PDF buffer error: {}", e))
}

fn header_row(layer: &PdfLayerReference, bold: &IndirectFontRef, y: Mm) -> Mm {
    for (title, x, _) in COLUMNS.iter() {
        layer.use_text(*title, 10.0, Mm(*x), y, bold);
    }
    y - Mm(7.0)
}

fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: i32) -> AppointItem {
        AppointItem {
            id: n,
            client_name: format!("Client number {} with a rather long full name", n),
            procedure_name: "Facial cleansing".to_string(),
            professional_name: "Dra. Lima".to_string(),
            date: "2024-03-10".to_string(),
            time: "15:00".to_string(),
            status: "Pending".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("Ana Maria de Souza", 10),
            vec!["Ana Maria", "de Souza"]
        );
        assert_eq!(wrap_text("", 10), vec![""]);
    }

    #[test]
    fn empty_report_is_a_pdf() {
        let bytes = generate_report_pdf("Appointments", "2024-03-10", &[]).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn long_report_spans_pages() {
        let items: Vec<AppointItem> = (1..=120).map(item).collect();
        let one = generate_report_pdf("Appointments", "2024-03-10", &items[..1]).unwrap();
        let many = generate_report_pdf("Appointments", "2024-03-10", &items).unwrap();
        assert_eq!(&many[0..4], b"%PDF");
        assert!(many.len() > one.len());
    }
}
