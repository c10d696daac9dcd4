//! TrueType font registration and embedding.
//!
//! The TOC is drawn with a single font that must cover both Latin and Cyrillic.
//! It is registered once at startup with [`TocFont::register`] and shared by
//! every worker. Text is written as 2-byte glyph IDs (`Identity-H`), so each
//! rendered document embeds the font as a Type0 / CIDFontType2 pair together
//! with widths and a `ToUnicode` map for the glyphs it actually uses.

use crate::error::{AssemblyError, FontError};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use ttf_parser::{name_id, Face};

/// Characters the font must have glyphs for to be accepted.
const COVERAGE_PROBE: &str = "AZaz09.Оглавлениеё";

#[derive(Debug, Clone, Copy)]
struct FontMetrics {
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    bbox: [i16; 4],
}

#[derive(Debug)]
pub struct TocFont {
    path: PathBuf,
    data: Vec<u8>,
    postscript_name: String,
    metrics: FontMetrics,
}

impl TocFont {
    pub fn register<P: AsRef<Path>>(path: P) -> Result<Self, FontError> {
        let path = path.as_ref().to_path_buf();
        let data = std::fs::read(&path).map_err(|source| FontError::Read {
            path: path.clone(),
            source,
        })?;

        let (postscript_name, metrics) = {
            let face = Face::parse(&data, 0).map_err(|e| FontError::Parse {
                path: path.clone(),
                message: e.to_string(),
            })?;

            for ch in COVERAGE_PROBE.chars() {
                if face.glyph_index(ch).is_none() {
                    return Err(FontError::MissingGlyph {
                        path: path.clone(),
                        ch,
                    });
                }
            }

            let bbox = face.global_bounding_box();
            let metrics = FontMetrics {
                units_per_em: face.units_per_em(),
                ascender: face.ascender(),
                descender: face.descender(),
                cap_height: face.capital_height().unwrap_or_else(|| face.ascender()),
                bbox: [bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max],
            };
            (postscript_name(&face, &path), metrics)
        };

        debug!(font = %path.display(), name = %postscript_name, "registered TOC font");

        Ok(TocFont {
            path,
            data,
            postscript_name,
            metrics,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Start encoding text for one output document.
    pub fn encoder(&self) -> Result<GlyphEncoder<'_>, AssemblyError> {
        let face = Face::parse(&self.data, 0)
            .map_err(|e| AssemblyError::Render(format!("font parse failed: {}", e)))?;
        Ok(GlyphEncoder {
            font: self,
            face,
            used: BTreeMap::new(),
        })
    }

    /// Font units to PDF glyph space (1/1000 em).
    fn scale(&self, value: f32) -> i64 {
        (value * 1000.0 / self.metrics.units_per_em as f32).round() as i64
    }
}

fn postscript_name(face: &Face<'_>, path: &Path) -> String {
    let name = face
        .names()
        .into_iter()
        .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
        .find_map(|name| name.to_string())
        .or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| "TocFont".to_string());

    // Names are written as PDF names; keep them to printable ASCII without delimiters.
    name.chars()
        .filter(|c| c.is_ascii_graphic() && !"()<>[]{}/%#".contains(*c))
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct UsedGlyph {
    ch: char,
    width: i64,
}

/// Maps text to glyph IDs and remembers which glyphs were used.
pub struct GlyphEncoder<'a> {
    font: &'a TocFont,
    face: Face<'a>,
    used: BTreeMap<u16, UsedGlyph>,
}

impl<'a> GlyphEncoder<'a> {
    /// Encode `text` as big-endian 2-byte glyph IDs. Characters without a glyph
    /// map to `.notdef`.
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let gid = match self.face.glyph_index(ch) {
                Some(gid) => gid,
                None => {
                    debug!(?ch, "no glyph in TOC font, using .notdef");
                    ttf_parser::GlyphId(0)
                }
            };

            if gid.0 != 0 && !self.used.contains_key(&gid.0) {
                let advance = self.face.glyph_hor_advance(gid).unwrap_or(0);
                self.used.insert(
                    gid.0,
                    UsedGlyph {
                        ch,
                        width: self.font.scale(advance as f32),
                    },
                );
            }

            bytes.extend_from_slice(&gid.0.to_be_bytes());
        }
        bytes
    }

    /// Encoded text as a PDF hex string operand.
    pub fn encode_operand(&mut self, text: &str) -> Object {
        Object::String(self.encode(text), StringFormat::Hexadecimal)
    }

    /// Write the font program and its dictionaries into `doc` and return the
    /// Type0 font to reference from page resources.
    pub fn embed(self, doc: &mut Document) -> Result<ObjectId, AssemblyError> {
        let font = self.font;
        let metrics = font.metrics;
        let base_font = font.postscript_name.clone();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&font.data)
            .map_err(|e| AssemblyError::Render(format!("font compression failed: {}", e)))?;
        let compressed = encoder
            .finish()
            .map_err(|e| AssemblyError::Render(format!("font compression failed: {}", e)))?;

        let font_file_id = doc.add_object(Stream::new(
            dictionary! {
                "Length1" => font.data.len() as i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        ));

        let descriptor_id = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(base_font.clone().into_bytes()),
            "Flags" => 32,
            "FontBBox" => metrics
                .bbox
                .iter()
                .map(|&v| Object::Integer(font.scale(v as f32)))
                .collect::<Vec<_>>(),
            "ItalicAngle" => 0,
            "Ascent" => font.scale(metrics.ascender as f32),
            "Descent" => font.scale(metrics.descender as f32),
            "CapHeight" => font.scale(metrics.cap_height as f32),
            "StemV" => 80,
            "FontFile2" => font_file_id,
        });

        let widths: Vec<Object> = self
            .used
            .iter()
            .flat_map(|(gid, glyph)| {
                [
                    Object::Integer(*gid as i64),
                    Object::Array(vec![Object::Integer(glyph.width)]),
                ]
            })
            .collect();

        let cid_font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => Object::Name(base_font.clone().into_bytes()),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor_id,
            "DW" => 1000,
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode_id = doc.add_object(Stream::new(
            dictionary! {},
            to_unicode_cmap(&self.used).into_bytes(),
        ));

        let type0_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(base_font.into_bytes()),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
            "ToUnicode" => to_unicode_id,
        });

        Ok(type0_id)
    }
}

fn to_unicode_cmap(used: &BTreeMap<u16, UsedGlyph>) -> String {
    let mut cmap = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n",
    );

    let entries: Vec<_> = used.iter().collect();
    // bfchar blocks hold at most 100 entries
    for chunk in entries.chunks(100) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for (gid, glyph) in chunk {
            let mut units = [0u16; 2];
            let unicode: String = glyph
                .ch
                .encode_utf16(&mut units)
                .iter()
                .map(|u| format!("{:04X}", u))
                .collect();
            cmap.push_str(&format!("<{:04X}> <{}>\n", gid, unicode));
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end\n",
    );
    cmap
}
