//! # PDF Serializer
//!
//! Takes the composed pages and writes a PDF 1.7 file byte by byte.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, images, pages, streams
//! ...
//! xref                <- byte offset of every object
//! trailer             <- points to the catalog and the info dictionary
//! %%EOF
//! ```
//!
//! Layout works top-down (Y grows toward the bottom, text Y is the top of
//! the line box). PDF user space grows upward from the bottom-left corner,
//! so every coordinate is flipped here and nowhere else:
//!
//! - text baseline: `page_height - y - ascent(font)`
//! - image and rectangle origin: `page_height - y - height`
//! - line endpoints: `page_height - y`
//!
//! ## Fonts
//!
//! Standard faces are plain Type1 references with WinAnsiEncoding. A
//! TrueType face is subset to the characters the document draws and
//! embedded as a CIDFontType2 with Identity-H encoding: FontFile2,
//! FontDescriptor, CIDFont, ToUnicode CMap and the Type0 root, five objects
//! per face. Glyph ids in `/W`, the CMap and content streams are the
//! subset's ids.
//!
//! Text a face cannot encode is an error, never a substitute glyph.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::{Result, StatementError};
use crate::font::{missing_glyph, winansi_byte, CustomFontMetrics, FontContext, FontData, FontWeight};
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{DrawOp, LayoutPage};

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font resources in `/F{index}` order.
    font_objects: Vec<(FontWeight, usize)>,
    /// char -> subset glyph id for embedded faces.
    custom_glyphs: HashMap<FontWeight, HashMap<char, u16>>,
    /// XObject id per image store index, referenced as `/Im{index}`.
    image_objects: Vec<usize>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (objects are 1-indexed), 1 = Catalog, 2 = Pages
        Self {
            objects: (0..3).map(|_| PdfObject { data: Vec::new() }).collect(),
            font_objects: Vec::new(),
            custom_glyphs: HashMap::new(),
            image_objects: Vec::new(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(PdfObject { data });
        self.objects.len() - 1
    }

    /// Push a FlateDecode stream object.
    fn push_stream(&mut self, dict_extra: &str, raw: &[u8]) -> usize {
        let compressed = compress_to_vec_zlib(raw, 6);
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< /Length {}{} /Filter /FlateDecode >>\nstream\n",
            compressed.len(),
            dict_extra
        );
        data.extend_from_slice(&compressed);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write composed pages to a PDF byte vector.
    ///
    /// `images` is the document's image store; `DrawOp::Image` indexes into it.
    pub fn write(
        &self,
        pages: &[LayoutPage],
        images: &[LoadedImage],
        metadata: &Metadata,
        fonts: &FontContext,
    ) -> Result<Vec<u8>> {
        let mut builder = PdfBuilder::new();

        self.register_fonts(&mut builder, pages, fonts)?;
        for image in images {
            let id = Self::write_image_xobject(&mut builder, image);
            builder.image_objects.push(id);
        }

        let font_resources = self.build_font_resource_dict(&builder.font_objects);
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page in pages {
            let content = self.build_content_stream(page, &builder, fonts)?;
            let content_obj_id = builder.push_stream("", content.as_bytes());

            let xobject_resources = self.build_xobject_resource_dict(page, &builder)?;
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!("/Font << {} >> /XObject << {} >>", font_resources, xobject_resources)
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = if metadata.title.is_some() || metadata.author.is_some() || metadata.subject.is_some() {
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
            }
            if let Some(ref author) = metadata.author {
                let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
            }
            if let Some(ref subject) = metadata.subject {
                let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
            }
            let _ = write!(
                info,
                "/Producer (statement-pdf {}) >>",
                env!("CARGO_PKG_VERSION")
            );
            Some(builder.push(info.into_bytes()))
        } else {
            None
        };

        log::debug!(
            "Serialized {} page(s), {} object(s)",
            pages.len(),
            builder.objects.len() - 1
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the content stream for one page.
    fn build_content_stream(&self, page: &LayoutPage, builder: &PdfBuilder, fonts: &FontContext) -> Result<String> {
        let mut stream = String::new();
        let page_height = page.height;

        for op in &page.ops {
            match op {
                DrawOp::Text { x, y, text, font } => {
                    let idx = self.font_index(font.weight, &builder.font_objects);
                    let baseline = page_height - y - fonts.ascent(*font)?;
                    let _ = write!(
                        stream,
                        "BT\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n",
                        idx, font.size, x, baseline
                    );
                    match builder.custom_glyphs.get(&font.weight) {
                        Some(glyphs) => {
                            let mut hex = String::new();
                            for ch in text.chars() {
                                let gid = glyphs.get(&ch).ok_or_else(|| missing_glyph(font.weight, ch))?;
                                let _ = write!(hex, "{:04X}", gid);
                            }
                            let _ = write!(stream, "<{}> Tj\n", hex);
                        }
                        None => {
                            let _ = write!(stream, "({}) Tj\n", Self::encode_winansi(text, font.weight)?);
                        }
                    }
                    stream.push_str("ET\n");
                }

                DrawOp::Line { x1, y1, x2, y2, width } => {
                    let _ = write!(
                        stream,
                        "q\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        width,
                        x1,
                        page_height - y1,
                        x2,
                        page_height - y2
                    );
                }

                DrawOp::Image { image, x, y, width, height } => {
                    let _ = write!(
                        stream,
                        "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                        width,
                        height,
                        x,
                        page_height - y - height,
                        image
                    );
                }

                DrawOp::Rect { x, y, width, height } => {
                    let _ = write!(
                        stream,
                        "q\n0 0 0 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                        x,
                        page_height - y - height,
                        width,
                        height
                    );
                }
            }
        }

        Ok(stream)
    }

    /// Register one font resource per weight drawn anywhere in the document.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage], fonts: &FontContext) -> Result<()> {
        let mut font_chars: BTreeMap<FontWeight, BTreeSet<char>> = BTreeMap::new();
        for page in pages {
            for op in &page.ops {
                if let DrawOp::Text { text, font, .. } = op {
                    font_chars.entry(font.weight).or_default().extend(text.chars());
                }
            }
        }

        // Always have at least the regular face
        if font_chars.is_empty() {
            font_chars.insert(FontWeight::Regular, BTreeSet::new());
        }

        for (weight, used_chars) in &font_chars {
            match fonts.resolve(*weight)? {
                FontData::Standard(std_font) => {
                    let font_dict = format!(
                        "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                         /Encoding /WinAnsiEncoding >>",
                        std_font.pdf_name()
                    );
                    let obj_id = builder.push(font_dict.into_bytes());
                    builder.font_objects.push((*weight, obj_id));
                }
                FontData::Custom { data, metrics } => {
                    let type0_obj_id = Self::write_custom_font_objects(builder, *weight, data, metrics, used_chars)?;
                    builder.font_objects.push((*weight, type0_obj_id));
                }
            }
        }
        Ok(())
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.push(obj_data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let dims = format!(
                    " /Type /XObject /Subtype /Image /Width {} /Height {} /BitsPerComponent 8",
                    image.width_px, image.height_px
                );
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha_data| {
                        let id = builder.push_stream(&format!("{} /ColorSpace /DeviceGray", dims), alpha_data);
                        format!(" /SMask {} 0 R", id)
                    })
                    .unwrap_or_default();
                builder.push_stream(&format!("{} /ColorSpace /DeviceRGB{}", dims, smask_ref), rgb)
            }
        }
    }

    /// `/Im{n}` entries for the images drawn on `page`.
    fn build_xobject_resource_dict(&self, page: &LayoutPage, builder: &PdfBuilder) -> Result<String> {
        let used: BTreeSet<usize> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { image, .. } => Some(*image),
                _ => None,
            })
            .collect();

        let mut entries = Vec::with_capacity(used.len());
        for idx in used {
            let obj_id = builder
                .image_objects
                .get(idx)
                .ok_or_else(|| StatementError::Image(format!("page references unknown image #{}", idx)))?;
            entries.push(format!("/Im{} {} 0 R", idx, obj_id));
        }
        Ok(entries.join(" "))
    }

    /// Write the 5 CIDFont PDF objects for an embedded TrueType face.
    /// Returns the object ID of the Type0 root font dictionary.
    fn write_custom_font_objects(
        builder: &mut PdfBuilder,
        weight: FontWeight,
        ttf_data: &[u8],
        metrics: &CustomFontMetrics,
        used_chars: &BTreeSet<char>,
    ) -> Result<usize> {
        let face = ttf_parser::Face::parse(ttf_data, 0)
            .map_err(|e| StatementError::Font(format!("Failed to parse {:?} TrueType face: {}", weight, e)))?;

        let mut remapper = subsetter::GlyphRemapper::new();
        remapper.remap(0);
        let mut char_to_gid: HashMap<char, u16> = HashMap::new();
        for ch in used_chars {
            let gid = metrics.glyph_ids.get(ch).ok_or_else(|| missing_glyph(weight, *ch))?;
            char_to_gid.insert(*ch, remapper.remap(*gid));
        }

        let postscript_name = face
            .names()
            .into_iter()
            .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME && n.is_unicode())
            .and_then(|n| n.to_string())
            .unwrap_or_default();
        let pdf_font_name = Self::sanitize_font_name(&postscript_name, weight);

        let subset = subsetter::subset(ttf_data, 0, &remapper).map_err(|e| {
            StatementError::Font(format!("Failed to subset {:?} TrueType face: {}", weight, e))
        })?;
        log::debug!(
            "Subset {} from {} to {} bytes ({} chars)",
            pdf_font_name,
            ttf_data.len(),
            subset.len(),
            used_chars.len()
        );

        // 1. FontFile2: the subset face, compressed
        let fontfile2_id = builder.push_stream(&format!(" /Length1 {}", subset.len()), &subset);

        // 2. FontDescriptor
        let scale = 1000.0 / metrics.units_per_em as f64;
        let bbox = face.global_bounding_box();
        let bbox_str = format!(
            "[{} {} {} {}]",
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
        );
        let cap_height = face.capital_height().unwrap_or(metrics.ascender) as f64 * scale;
        let stem_v = match weight {
            FontWeight::Bold => 120,
            FontWeight::Regular => 80,
        };
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 4 \
             /FontBBox {} /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV {} \
             /FontFile2 {} 0 R >>",
            pdf_font_name,
            bbox_str,
            (metrics.ascender as f64 * scale) as i32,
            (metrics.descender as f64 * scale) as i32,
            cap_height as i32,
            stem_v,
            fontfile2_id,
        );
        let font_descriptor_id = builder.push(font_descriptor_dict.into_bytes());

        // 3. CIDFont (DescendantFont)
        let w_array = Self::build_w_array(&char_to_gid, metrics);
        let default_width = (metrics.default_advance as f64 * scale) as u32;
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            pdf_font_name, font_descriptor_id, default_width, w_array,
        );
        let cidfont_id = builder.push(cidfont_dict.into_bytes());

        // 4. ToUnicode CMap
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, &pdf_font_name);
        let tounicode_id = builder.push_stream("", cmap_content.as_bytes());

        // 5. Type0 root, referenced from /Resources
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            pdf_font_name, cidfont_id, tounicode_id,
        );
        let type0_id = builder.push(type0_dict.into_bytes());

        builder.custom_glyphs.insert(weight, char_to_gid);
        Ok(type0_id)
    }

    /// Per-glyph widths for a CIDFont: `[gid [width] gid [width] ...]`.
    fn build_w_array(char_to_gid: &HashMap<char, u16>, metrics: &CustomFontMetrics) -> String {
        let scale = 1000.0 / metrics.units_per_em as f64;
        let mut entries: BTreeMap<u16, u32> = BTreeMap::new();
        for (ch, &gid) in char_to_gid {
            let advance = metrics.advance_widths.get(ch).copied().unwrap_or(0);
            entries.entry(gid).or_insert((advance as f64 * scale) as u32);
        }

        let mut result = String::from("[");
        for (gid, width) in &entries {
            let _ = write!(result, " {} [{}]", gid, width);
        }
        result.push_str(" ]");
        result
    }

    /// ToUnicode CMap so text in embedded faces stays extractable.
    fn build_tounicode_cmap(char_to_gid: &HashMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, u32)> = char_to_gid
            .iter()
            .map(|(&ch, &gid)| (gid, ch as u32))
            .collect();
        gid_to_unicode.sort_unstable();

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n");
        cmap.push_str("<0000> <FFFF>\n");
        cmap.push_str("endcodespacerange\n");

        // beginbfchar blocks hold at most 100 entries
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, unicode) in chunk {
                let _ = writeln!(cmap, "<{:04X}> <{:04X}>", gid, unicode);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\n");
        cmap.push_str("end\n");
        cmap
    }

    /// Strip a face name down to a valid PDF name and tag the weight.
    fn sanitize_font_name(name: &str, weight: FontWeight) -> String {
        let mut name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        if name.is_empty() {
            name = "CustomFont".to_string();
        }
        if weight == FontWeight::Bold && !name.ends_with("-Bold") {
            name.push_str("-Bold");
        }
        name
    }

    fn build_font_resource_dict(&self, font_objects: &[(FontWeight, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resource index (`/F0`, `/F1`, ...) of the face for `weight`.
    fn font_index(&self, weight: FontWeight, font_objects: &[(FontWeight, usize)]) -> usize {
        font_objects
            .iter()
            .position(|(w, _)| *w == weight)
            .unwrap_or(0)
    }

    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)")
    }

    /// Encode text as a WinAnsi literal string body, escaping delimiters and
    /// writing non-ASCII bytes as octal.
    fn encode_winansi(text: &str, weight: FontWeight) -> Result<String> {
        let mut out = String::new();
        for ch in text.chars() {
            let b = winansi_byte(ch).ok_or_else(|| missing_glyph(weight, ch))?;
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        Ok(out)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: Option<usize>) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        output.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(output, "trailer\n<< /Size {} /Root 1 0 R", builder.objects.len());
        if let Some(info_id) = info_obj_id {
            let _ = write!(output, " /Info {} 0 R", info_id);
        }
        let _ = write!(output, " >>\nstartxref\n{}\n%%EOF\n", xref_offset);

        output
    }
}
