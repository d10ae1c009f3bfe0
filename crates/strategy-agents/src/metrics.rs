//! Helvetica glyph metrics
//!
//! Advance widths of the builtin Helvetica face in 1/1000 em, covering the
//! characters its WinAnsi encoding can print. A character without a width
//! cannot be encoded and would be dropped from the page.

const PT_TO_MM: f64 = 25.4 / 72.0;

/// Printable ASCII, `' '` through `'~'`
const ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Latin-1 supplement, U+00A0 through U+00FF
///
/// U+00A0 and U+00AD have no code of their own in WinAnsi and are marked 0.
const LATIN1: [u16; 96] = [
    0, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 0, 737, 333, //
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, //
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, //
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, //
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, //
];

/// Advance width of `c` in 1/1000 em, or `None` when WinAnsi has no code
/// for it
pub(crate) fn glyph_width(c: char) -> Option<u16> {
    let width = match c {
        ' '..='~' => ASCII[c as usize - 0x20],
        '\u{a0}'..='\u{ff}' => LATIN1[c as usize - 0xa0],
        '\u{2018}' | '\u{2019}' | '\u{201a}' => 222,
        '\u{201c}' | '\u{201d}' | '\u{201e}' | '\u{2039}' | '\u{203a}' | '\u{2c6}' | '\u{2dc}' => 333,
        '\u{2022}' => 350,
        '\u{20ac}' | '\u{192}' | '\u{2020}' | '\u{2021}' | '\u{2013}' => 556,
        '\u{160}' | '\u{178}' => 667,
        '\u{17d}' => 611,
        '\u{161}' | '\u{17e}' => 500,
        '\u{153}' => 944,
        '\u{2026}' | '\u{2030}' | '\u{152}' | '\u{2014}' | '\u{2122}' => 1000,
        _ => 0,
    };
    (width > 0).then_some(width)
}

/// Rendered width of `text` at `size` points, in millimetres
///
/// Characters outside WinAnsi count as zero.
pub(crate) fn text_width(text: &str, size: f32) -> f64 {
    let units: u32 = text
        .chars()
        .filter_map(glyph_width)
        .map(u32::from)
        .sum();
    f64::from(units) / 1000.0 * f64::from(size) * PT_TO_MM
}
