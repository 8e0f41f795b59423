//! Minimal paged PDF writer
//!
//! Produces PDF 1.4 text documents using the built-in Helvetica fonts with
//! WinAnsi encoding, so nothing has to be embedded. Text is laid out top
//! to bottom with greedy word wrapping; a new page starts when the cursor
//! reaches the bottom margin.

use chrono::Utc;
use std::fmt::Write as _;

pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;
pub const MARGIN: f64 = 40.0;
/// Usable line width between the margins
pub const TEXT_WIDTH: f64 = PAGE_WIDTH - 2.0 * MARGIN;

/// Helvetica advance widths (1/1000 em) for WinAnsi codes 32..=126
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Helvetica-Bold advance widths (1/1000 em) for WinAnsi codes 32..=126
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    333, 333, 584, 584, 584, 611, 975, // :..@
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    333, 278, 333, 584, 556, 333, // [..`
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a..m
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n..z
    389, 280, 389, 584, // {..~
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// Advance width in 1/1000 em. Latin-1 letters above ASCII are measured
    /// as a wide capital so lines never run past the margin.
    fn glyph_width(&self, ch: char) -> u16 {
        let table = match self {
            Font::Regular => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        };
        match ch as u32 {
            code @ 0x20..=0x7e => table[(code - 0x20) as usize],
            _ => match self {
                Font::Regular => 667,
                Font::Bold => 722,
            },
        }
    }

    fn resource(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

pub struct PdfDocument {
    title: String,
    pages: Vec<Vec<u8>>,
    current: Vec<u8>,
    cursor_y: f64,
}

impl PdfDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Pages written so far, counting the one in progress
    pub fn page_count(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    /// Vertical gap
    pub fn space(&mut self, height: f64) {
        self.cursor_y -= height;
    }

    /// One line of text that is not wrapped
    pub fn line(&mut self, text: &str, font: Font, size: f64, align: Align) {
        let leading = size * 1.3;
        if self.cursor_y - leading < MARGIN {
            self.new_page();
        }
        self.cursor_y -= leading;

        let x = match align {
            Align::Left => MARGIN,
            Align::Center => ((PAGE_WIDTH - text_width(text, font, size)) / 2.0).max(MARGIN),
        };
        let mut op = format!(
            "BT /{} {} Tf {:.2} {:.2} Td (",
            font.resource(),
            size,
            x,
            self.cursor_y
        )
        .into_bytes();
        op.extend(encode_text(text));
        op.extend_from_slice(b") Tj ET\n");
        self.current.extend(op);
    }

    /// Word-wrapped paragraph; embedded newlines start new lines
    pub fn paragraph(&mut self, text: &str, font: Font, size: f64) {
        for source_line in text.lines() {
            let wrapped = wrap(source_line, TEXT_WIDTH, font, size);
            if wrapped.is_empty() {
                self.space(size * 1.3);
            }
            for line in wrapped {
                self.line(&line, font, size, Align::Left);
            }
        }
    }

    /// Serialize the document
    pub fn finish(mut self) -> Vec<u8> {
        self.new_page();
        let pages = std::mem::take(&mut self.pages);

        // 1 catalog, 2 pages, 3-4 fonts, 5 info, then (page, content) pairs
        let first_page = 6;
        let mut objects: Vec<Vec<u8>> = Vec::new();
        objects.push(b"<< /Type /Catalog /Pages 2 0 R >>".to_vec());

        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", first_page + 2 * i))
            .collect();
        objects.push(
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len()).into_bytes(),
        );
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_vec(),
        );
        objects.push(
            b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
                .to_vec(),
        );

        let mut info = b"<< /Title (".to_vec();
        info.extend(encode_text(&self.title));
        info.extend(
            format!(
                ") /Producer (escm {}) /CreationDate (D:{}Z) >>",
                crate::VERSION,
                Utc::now().format("%Y%m%d%H%M%S")
            )
            .into_bytes(),
        );
        objects.push(info);

        for (i, content) in pages.iter().enumerate() {
            let content_id = first_page + 2 * i + 1;
            objects.push(
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH, PAGE_HEIGHT, content_id
                )
                .into_bytes(),
            );
            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content);
            stream.extend_from_slice(b"\nendstream");
            objects.push(stream);
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend(format!("{} 0 obj\n", i + 1).into_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref_at = out.len();
        let mut xref = String::new();
        let _ = writeln!(xref, "xref\n0 {}", objects.len() + 1);
        xref.push_str("0000000000 65535 f \n");
        for offset in offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_at
        );
        out.extend(xref.into_bytes());
        out
    }
}

fn text_width(text: &str, font: Font, size: f64) -> f64 {
    text.chars().map(|c| f64::from(font.glyph_width(c))).sum::<f64>() * size / 1000.0
}

/// Latin-1 bytes for a PDF literal string. Characters WinAnsi cannot show
/// become `?`; delimiters are escaped.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            '\t' => out.push(b' '),
            c if (c as u32) < 0x20 => {}
            c if (0x20..0x7f).contains(&(c as u32)) || (0xa0..=0xff).contains(&(c as u32)) => {
                out.push(c as u32 as u8)
            }
            _ => out.push(b'?'),
        }
    }
    out
}

/// Greedy word wrap by measured width; overlong words are split
fn wrap(text: &str, max_width: f64, font: Font, size: f64) -> Vec<String> {
    let width = |s: &str| text_width(s, font, size);
    let space = width(" ");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while width(word.as_str()) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            let rest = word.split_off(fitting_prefix(&word, max_width, font, size));
            lines.push(word);
            word = rest;
        }
        if word.is_empty() {
            continue;
        }

        let word_width = width(word.as_str());
        if !current.is_empty() && current_width + space + word_width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_width += space;
        }
        current.push_str(&word);
        current_width += word_width;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Byte length of the longest prefix of `word` that fits; at least one char
fn fitting_prefix(word: &str, max_width: f64, font: Font, size: f64) -> usize {
    let mut used = 0.0;
    let mut end = 0;
    for (idx, ch) in word.char_indices() {
        let advance = f64::from(font.glyph_width(ch)) * size / 1000.0;
        if end > 0 && used + advance > max_width {
            break;
        }
        used += advance;
        end = idx + ch.len_utf8();
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        // "one two" is 35.02 pt at 10 pt, "three four" 42.8 pt
        assert_eq!(
            wrap("one two three four", 40.0, Font::Regular, 10.0),
            vec!["one two", "three", "four"]
        );
        assert!(wrap("   ", 100.0, Font::Regular, 10.0).is_empty());
    }

    #[test]
    fn test_text_width_uses_font_metrics() {
        assert!((text_width("W", Font::Regular, 10.0) - 9.44).abs() < 1e-9);
        assert!((text_width("i", Font::Regular, 10.0) - 2.22).abs() < 1e-9);
        assert!((text_width("i", Font::Bold, 10.0) - 2.78).abs() < 1e-9);
        assert!(text_width("ABC", Font::Bold, 11.0) > text_width("abc", Font::Regular, 11.0));
    }

    #[test]
    fn test_wide_capitals_stay_inside_the_margins() {
        let wide = "W".repeat(93);
        let lines = wrap(&wide, TEXT_WIDTH, Font::Regular, 11.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.concat(), wide);

        let shouting = "PRINCIPLE_10_ANTI_CORRUPTION WEIGHTED AVERAGE ".repeat(12);
        for font in [Font::Regular, Font::Bold] {
            let lines = wrap(&shouting, TEXT_WIDTH, font, 11.0);
            assert!(lines.len() > 1);
            for line in &lines {
                assert!(text_width(line, font, 11.0) <= TEXT_WIDTH, "{} overflows", line);
            }
        }
    }

    #[test]
    fn test_overlong_word_is_split_without_loss() {
        let word = "abcdefghij";
        let lines = wrap(word, 22.0, Font::Regular, 10.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        assert!(lines.iter().all(|l| text_width(l, Font::Regular, 10.0) <= 22.0));
    }

    #[test]
    fn test_encode_text_escapes_and_replaces() {
        assert_eq!(encode_text("a(b)\\c"), b"a\\(b\\)\\\\c".to_vec());
        assert_eq!(encode_text("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode_text("risk ✓"), b"risk ?".to_vec());
    }

    #[test]
    fn test_document_structure() {
        let mut doc = PdfDocument::new("Test");
        doc.line("Hello", Font::Bold, 12.0, Align::Center);
        let bytes = doc.finish();

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(bytes.ends_with(b"%%EOF\n"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Hello) Tj"));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let mut doc = PdfDocument::new("Offsets");
        doc.paragraph("some text", Font::Regular, 11.0);
        let bytes = doc.finish();
        let text = String::from_utf8_lossy(&bytes).to_string();

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(bytes[xref_at..].starts_with(b"xref"));

        let tail = std::str::from_utf8(&bytes[xref_at..]).unwrap();
        let entries: Vec<usize> = tail
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 7);
        for (i, offset) in entries.iter().enumerate() {
            assert!(bytes[*offset..].starts_with(format!("{} 0 obj", i + 1).as_bytes()));
        }
    }

    #[test]
    fn test_long_text_breaks_pages() {
        let mut doc = PdfDocument::new("Long");
        for i in 0..200 {
            doc.line(&format!("line {}", i), Font::Regular, 11.0, Align::Left);
        }
        assert!(doc.page_count() > 1);
        let text = String::from_utf8_lossy(&doc.finish()).to_string();
        assert!(!text.contains("/Count 1 "));
    }
}
