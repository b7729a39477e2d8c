use gridpad_core::Point;
use gridpad_engine::Alignment;
use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return take_width(s, width).0.to_string();
    }
    format!("{}..", take_width(s, width - 2).0)
}

/// Longest prefix of `s` that fits in `width` columns, and its width.
fn take_width(s: &str, width: usize) -> (&str, usize) {
    let mut used = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > width {
            return (&s[..i], used);
        }
        used += cw;
    }
    (s, used)
}

/// Fit `s` into exactly `width` columns, placed according to `alignment`.
/// Anything too long is truncated with "..".
pub(crate) fn align_display(s: &str, width: usize, alignment: Alignment) -> String {
    let fitted = truncate_display(s, width);
    let slack = width.saturating_sub(display_width(&fitted));
    let (left, right) = match alignment {
        Alignment::Left => (0, slack),
        Alignment::Right => (slack, 0),
        Alignment::Center => (slack / 2, slack - slack / 2),
    };
    format!("{}{}{}", " ".repeat(left), fitted, " ".repeat(right))
}

/// Convert column index to letter (0 -> A, 1 -> B, 26 -> AA, etc.)
pub(crate) fn col_to_letter(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// A1-style label for a grid point.
pub(crate) fn cell_label(p: Point) -> String {
    format!("{}{}", col_to_letter(p.col), p.row + 1)
}
