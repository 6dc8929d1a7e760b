//! # Font Management
//!
//! Registers the two faces a statement uses (regular and bold) and answers
//! the only questions layout ever asks: how wide is this text, and how tall
//! is a line of it.
//!
//! By default both faces are standard PDF fonts (Helvetica and
//! Helvetica-Bold), which need no embedding. TrueType files can replace
//! either face; their metrics are read with ttf-parser and the font program
//! is embedded by the PDF writer.

pub mod metrics;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Result, StatementError};
pub use metrics::{winansi_byte, StandardFontMetrics};

/// Font weight as used by the statement layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// The three text sizes of the statement layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSize {
    Large,
    Mid,
    Small,
}

impl FontSize {
    pub fn points(self) -> f64 {
        match self {
            FontSize::Large => 15.0,
            FontSize::Mid => 10.0,
            FontSize::Small => 5.0,
        }
    }
}

/// A concrete font selection: weight plus size in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub weight: FontWeight,
    pub size: f64,
}

impl FontSpec {
    pub fn new(weight: FontWeight, size: FontSize) -> Self {
        Self {
            weight,
            size: size.points(),
        }
    }

    pub fn bold(size: FontSize) -> Self {
        Self::new(FontWeight::Bold, size)
    }

    pub fn regular(size: FontSize) -> Self {
        Self::new(FontWeight::Regular, size)
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::regular(FontSize::Mid)
    }
}

/// The text-measurement capability consumed by the layout helpers.
pub trait TextMetrics {
    /// Advance width of `text` in points.
    fn text_width(&self, text: &str, font: FontSpec) -> Result<f64>;
    /// Height of the line box `text` occupies, in points.
    fn text_height(&self, text: &str, font: FontSpec) -> Result<f64>;
}

#[derive(Debug, Clone)]
pub enum FontData {
    /// One of the standard PDF fonts. No embedding needed.
    Standard(StandardFont),
    /// A TrueType/OpenType font that is embedded in full.
    Custom {
        data: Vec<u8>,
        metrics: CustomFontMetrics,
    },
}

impl FontData {
    /// First character of `text` this face has no glyph or code for.
    pub fn first_missing(&self, text: &str) -> Option<char> {
        match self {
            FontData::Standard(_) => text.chars().find(|ch| winansi_byte(*ch).is_none()),
            FontData::Custom { metrics, .. } => text.chars().find(|ch| !metrics.glyph_ids.contains_key(ch)),
        }
    }
}

/// The error raised when text asks for a glyph the `weight` face lacks.
pub(crate) fn missing_glyph(weight: FontWeight, ch: char) -> StatementError {
    StatementError::Font(format!(
        "{:?} face cannot draw '{}' (U+{:04X}); register a TrueType font that covers it",
        weight, ch, ch as u32
    ))
}

/// Parsed metrics from a TrueType/OpenType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct CustomFontMetrics {
    pub units_per_em: u16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    pub ascender: i16,
    pub descender: i16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl CustomFontMetrics {
    /// Get the advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    pub fn line_height(&self, font_size: f64) -> f64 {
        (self.ascender as f64 - self.descender as f64) / self.units_per_em as f64 * font_size
    }

    /// Parse metrics from font data using ttf-parser.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            let Some(ch) = char::from_u32(code) else {
                continue;
            };
            if let Some(glyph_id) = face.glyph_index(ch) {
                let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                advance_widths.insert(ch, advance);
                glyph_ids.insert(ch, glyph_id.0);
                if ch == ' ' {
                    default_advance = advance;
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(CustomFontMetrics {
            units_per_em,
            advance_widths,
            default_advance,
            ascender: face.ascender(),
            descender: face.descender(),
            glyph_ids,
        })
    }
}

/// The standard PDF fonts this renderer falls back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Font registry keyed by weight, with text measurement on top.
#[derive(Debug, Clone)]
pub struct FontContext {
    fonts: BTreeMap<FontWeight, FontData>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    /// Helvetica for regular text, Helvetica-Bold for bold.
    pub fn new() -> Self {
        let mut fonts = BTreeMap::new();
        fonts.insert(FontWeight::Regular, FontData::Standard(StandardFont::Helvetica));
        fonts.insert(FontWeight::Bold, FontData::Standard(StandardFont::HelveticaBold));
        Self { fonts }
    }

    /// A context with nothing registered. Every measurement fails until a
    /// face is registered for the requested weight.
    pub fn empty() -> Self {
        Self {
            fonts: BTreeMap::new(),
        }
    }

    /// Register TrueType font data for `weight`, replacing what was there.
    pub fn register_ttf(&mut self, weight: FontWeight, data: Vec<u8>) -> Result<()> {
        let metrics = CustomFontMetrics::from_font_data(&data).ok_or_else(|| {
            StatementError::Font(format!("{:?} face is not a parseable TrueType font", weight))
        })?;
        log::debug!(
            "Registered {:?} TrueType face ({} glyphs mapped)",
            weight,
            metrics.glyph_ids.len()
        );
        self.fonts.insert(weight, FontData::Custom { data, metrics });
        Ok(())
    }

    /// Read a TrueType file from disk and register it for `weight`.
    pub fn load_ttf(&mut self, weight: FontWeight, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            StatementError::Font(format!("cannot read font file '{}': {}", path.display(), e))
        })?;
        self.register_ttf(weight, data)
    }

    /// Resolve the face registered for `weight`.
    pub fn resolve(&self, weight: FontWeight) -> Result<&FontData> {
        self.fonts
            .get(&weight)
            .ok_or_else(|| StatementError::Font(format!("no font registered for weight {:?}", weight)))
    }

    /// Ascender of the face in points, used to place baselines.
    pub fn ascent(&self, font: FontSpec) -> Result<f64> {
        Ok(match self.resolve(font.weight)? {
            FontData::Standard(std_font) => std_font.metrics().ascender as f64 * font.size / 1000.0,
            FontData::Custom { metrics, .. } => {
                metrics.ascender as f64 / metrics.units_per_em as f64 * font.size
            }
        })
    }
}

impl TextMetrics for FontContext {
    fn text_width(&self, text: &str, font: FontSpec) -> Result<f64> {
        let face = self.resolve(font.weight)?;
        if let Some(ch) = face.first_missing(text) {
            return Err(missing_glyph(font.weight, ch));
        }
        Ok(match face {
            FontData::Standard(std_font) => std_font.metrics().measure_string(text, font.size),
            FontData::Custom { metrics, .. } => {
                text.chars().map(|ch| metrics.char_width(ch, font.size)).sum()
            }
        })
    }

    fn text_height(&self, _text: &str, font: FontSpec) -> Result<f64> {
        Ok(match self.resolve(font.weight)? {
            FontData::Standard(std_font) => std_font.metrics().line_height(font.size),
            FontData::Custom { metrics, .. } => metrics.line_height(font.size),
        })
    }
}
