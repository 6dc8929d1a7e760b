//! Built-in AFM metrics for the standard Helvetica pair.
//!
//! Widths are in 1/1000 em for the printable ASCII range `0x20..=0x7E`.
//! A handful of WinAnsi characters that show up in statements (currency
//! signs, copyright, dashes) carry their own widths; the rest of the
//! WinAnsi range falls back to the font's default advance. Characters with
//! no WinAnsi code cannot be drawn with these faces at all.

/// Glyph metrics of one standard PDF font.
#[derive(Debug)]
pub struct StandardFontMetrics {
    ascii: [u16; 95],
    extra: &'static [(char, u16)],
    default_width: u16,
    pub ascender: i16,
    pub descender: i16,
}

impl StandardFontMetrics {
    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = match ch as u32 {
            0x20..=0x7E => self.ascii[(ch as u32 - 0x20) as usize],
            _ => self
                .extra
                .iter()
                .find(|(c, _)| *c == ch)
                .map(|(_, w)| *w)
                .unwrap_or(self.default_width),
        };
        w as f64 * font_size / 1000.0
    }

    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Height of the line box (ascender to descender) in points.
    pub fn line_height(&self, font_size: f64) -> f64 {
        (self.ascender as f64 - self.descender as f64) * font_size / 1000.0
    }
}

/// Windows-1252 byte for `ch`, the encoding the standard faces are written in.
pub fn winansi_byte(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x20AC => Some(0x80), // euro
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85), // ellipsis
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

const WINANSI_EXTRA_REGULAR: &[(char, u16)] = &[
    ('€', 556),
    ('£', 556),
    ('¥', 556),
    ('©', 737),
    ('®', 737),
    ('°', 400),
    ('•', 350),
    ('–', 556),
    ('—', 1000),
    ('‘', 222),
    ('’', 222),
    ('“', 333),
    ('”', 333),
    ('…', 1000),
];

const WINANSI_EXTRA_BOLD: &[(char, u16)] = &[
    ('€', 556),
    ('£', 556),
    ('¥', 556),
    ('©', 737),
    ('®', 737),
    ('°', 400),
    ('•', 350),
    ('–', 556),
    ('—', 1000),
    ('‘', 278),
    ('’', 278),
    ('“', 500),
    ('”', 500),
    ('…', 1000),
];

pub static HELVETICA: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        // space ! " # $ % & ' ( ) * + , - . /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // : ; < = > ? @
        278, 278, 584, 584, 584, 556, 1015,
        // A-Z
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778,
        722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [ \ ] ^ _ `
        278, 278, 278, 469, 556, 333,
        // a-z
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556,
        333, 500, 278, 556, 500, 722, 500, 500, 500,
        // { | } ~
        334, 260, 334, 584,
    ],
    extra: WINANSI_EXTRA_REGULAR,
    default_width: 556,
    ascender: 718,
    descender: -207,
};

pub static HELVETICA_BOLD: StandardFontMetrics = StandardFontMetrics {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        333, 333, 584, 584, 584, 611, 975,
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778,
        722, 667, 611, 722, 667, 944, 667, 667, 611,
        333, 278, 333, 584, 556, 333,
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611,
        389, 556, 333, 611, 556, 778, 556, 556, 500,
        389, 280, 389, 584,
    ],
    extra: WINANSI_EXTRA_BOLD,
    default_width: 556,
    ascender: 718,
    descender: -207,
};
