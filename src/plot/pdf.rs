//! A single-page vector PDF drawing backend for `plotters`.
//!
//! Coordinates are PostScript points (1/72 inch) with the origin at the top
//! left, as plotters expects; they are flipped into PDF user space on output.
//! Text uses the standard Helvetica font, which every PDF reader provides, so
//! nothing is embedded. The document is buffered and written on `present`;
//! a backend dropped before that writes nothing.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
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

/// Width of glyphs outside the table.
const DEFAULT_WIDTH: u16 = 556;
/// Helvetica cap height, as a fraction of the font size.
const ASCENT: f64 = 0.718;

/// Advance width of `text` set in Helvetica at `size` points.
pub fn text_width(text: &str, size: f64) -> f64 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                u32::from(HELVETICA_WIDTHS[(code - 32) as usize])
            } else {
                u32::from(DEFAULT_WIDTH)
            }
        })
        .sum();
    f64::from(units) * size / 1000.0
}

pub struct PdfBackend {
    path: PathBuf,
    size: (u32, u32),
    content: String,
    saved: bool,
}

impl PdfBackend {
    /// A page of `size` points, to be written to `path` on `present`.
    pub fn new(path: &Path, size: (u32, u32)) -> Self {
        PdfBackend {
            path: path.to_path_buf(),
            size,
            content: String::new(),
            saved: false,
        }
    }

    fn y(&self, y: f64) -> f64 {
        f64::from(self.size.1) - y
    }

    fn set_fill(&mut self, color: BackendColor) {
        let (r, g, b) = color.rgb;
        let _ = writeln!(self.content, "{} {} {} rg", unit(r), unit(g), unit(b));
    }

    fn set_stroke(&mut self, color: BackendColor, width: u32) {
        let (r, g, b) = color.rgb;
        let _ = writeln!(
            self.content,
            "{} {} {} RG {} w",
            unit(r),
            unit(g),
            unit(b),
            width.max(1)
        );
    }

    fn path_ops(&mut self, points: &[BackendCoord], close: bool) {
        for (i, &(x, y)) in points.iter().enumerate() {
            let op = if i == 0 { "m" } else { "l" };
            let y = num(self.y(f64::from(y)));
            let _ = writeln!(self.content, "{x} {y} {op}");
        }
        if close {
            self.content.push_str("h\n");
        }
    }

    /// Serialise the page into a complete PDF file.
    fn document(&self) -> Vec<u8> {
        let (w, h) = self.size;
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w} {h}] \
                 /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            ),
            format!(
                "<< /Length {} >>\nstream\n{}endstream",
                self.content.len(),
                self.content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica \
             /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut out: Vec<u8> = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
        }

        let xref = out.len();
        let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            let _ = write!(trailer, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            trailer,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            objects.len() + 1
        );
        out.extend_from_slice(trailer.as_bytes());
        out
    }
}

/// Colour channel in PDF's 0..1 range.
fn unit(channel: u8) -> String {
    num(f64::from(channel) / 255.0)
}

/// Compact decimal: three places, trailing zeros dropped.
fn num(v: f64) -> String {
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Escape a string for a PDF literal, mapping to WinAnsi (Latin-1 subset).
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

impl DrawingBackend for PdfBackend {
    type ErrorType = io::Error;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<io::Error>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<io::Error>> {
        if !self.saved {
            std::fs::write(&self.path, self.document()).map_err(DrawingErrorKind::DrawingError)?;
            self.saved = true;
        }
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        if color.alpha == 0.0 {
            return Ok(());
        }
        self.set_fill(color);
        let y = num(self.y(f64::from(point.1) + 1.0));
        let _ = writeln!(self.content, "{} {y} 1 1 re f", point.0);
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_stroke(style.color(), style.stroke_width());
        self.path_ops(&[from, to], false);
        self.content.push_str("S\n");
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let (x0, y0) = upper_left;
        let (x1, y1) = bottom_right;
        let rect = format!(
            "{} {} {} {} re",
            x0.min(x1),
            num(self.y(f64::from(y0.max(y1)))),
            (x1 - x0).abs(),
            (y1 - y0).abs()
        );
        if fill {
            self.set_fill(style.color());
            let _ = writeln!(self.content, "{rect} f");
        } else {
            self.set_stroke(style.color(), style.stroke_width());
            let _ = writeln!(self.content, "{rect} S");
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let points: Vec<BackendCoord> = path.into_iter().collect();
        if points.len() < 2 || style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_stroke(style.color(), style.stroke_width());
        self.path_ops(&points, false);
        self.content.push_str("S\n");
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        // Four cubic Béziers; k is the quarter-circle control offset.
        let r = f64::from(radius.max(1));
        let k = 0.552_284_8 * r;
        let cx = f64::from(center.0);
        let cy = self.y(f64::from(center.1));
        let segments = [
            [(cx + r, cy + k), (cx + k, cy + r), (cx, cy + r)],
            [(cx - k, cy + r), (cx - r, cy + k), (cx - r, cy)],
            [(cx - r, cy - k), (cx - k, cy - r), (cx, cy - r)],
            [(cx + k, cy - r), (cx + r, cy - k), (cx + r, cy)],
        ];
        let mut ops = format!("{} {} m\n", num(cx + r), num(cy));
        for [c1, c2, end] in segments {
            let _ = writeln!(
                ops,
                "{} {} {} {} {} {} c",
                num(c1.0),
                num(c1.1),
                num(c2.0),
                num(c2.1),
                num(end.0),
                num(end.1)
            );
        }
        ops.push_str("h\n");

        if fill {
            self.set_fill(style.color());
            self.content.push_str(&ops);
            self.content.push_str("f\n");
        } else {
            self.set_stroke(style.color(), style.stroke_width());
            self.content.push_str(&ops);
            self.content.push_str("S\n");
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let points: Vec<BackendCoord> = vert.into_iter().collect();
        if points.len() < 3 || style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_fill(style.color());
        self.path_ops(&points, true);
        self.content.push_str("f\n");
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<io::Error>> {
        let size = style.size();
        let width = text_width(text, size);

        // Baseline offset from the anchor, in text space (y up).
        let anchor = style.anchor();
        let dx = match anchor.h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let dy = match anchor.v_pos {
            VPos::Top => -ASCENT * size,
            VPos::Center => -ASCENT * size / 2.0,
            VPos::Bottom => 0.0,
        };

        // Text matrix; rotations are clockwise as seen on the page.
        let (a, b, c, d) = match style.transform() {
            FontTransform::None => (1.0, 0.0, 0.0, 1.0),
            FontTransform::Rotate90 => (0.0, -1.0, 1.0, 0.0),
            FontTransform::Rotate180 => (-1.0, 0.0, 0.0, -1.0),
            FontTransform::Rotate270 => (0.0, 1.0, -1.0, 0.0),
        };
        let x = f64::from(pos.0) + a * dx + c * dy;
        let y = self.y(f64::from(pos.1)) + b * dx + d * dy;

        self.set_fill(style.color());
        let _ = writeln!(
            self.content,
            "BT /F1 {} Tf {a} {b} {c} {d} {} {} Tm {} Tj ET",
            num(size),
            num(x),
            num(y),
            pdf_string(text)
        );
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<io::Error>> {
        let size = style.size();
        let (w, h) = (text_width(text, size).ceil() as u32, size.ceil() as u32);
        Ok(match style.transform() {
            FontTransform::Rotate90 | FontTransform::Rotate270 => (h, w),
            _ => (w, h),
        })
    }
}
