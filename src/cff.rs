//! CFF font set handling.
//!
//! Refer to [Technical Note #5176](http://wwwimages.adobe.com/content/dam/Adobe/en/devnet/font/pdfs/5176.CFF.pdf)
//! for more information.
//!
//! A font set is decoded with `ReadScope::new(data).read::<FontSet<'_>>()` and encoded through
//! its `WriteBinary` implementation. Failures in the shared structures abort the whole set, while
//! a font that fails to decode is recorded as an error for that font alone.

use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use rustc_hash::FxHashSet;

pub mod charset;
pub mod charstring;
pub mod dict;
pub mod font;
pub mod index;
pub mod private;
pub mod strings;
pub mod xml;

use self::charset::CustomCharset;
use self::charstring::{CharString, CharstringType};
use self::dict::{DictDelta, Operand, Operator, TopDict};
use self::font::Font;
use self::index::{write_index, Index, OwnedIndex};
use self::strings::{decode_latin1, encode_latin1, IndexedStrings};
use self::xml::XmlWriter;
use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteBuffer, WriteContext, WriteCounter};
use crate::binary::U8;
use crate::error::{ParseError, WriteError};

/// The size of the header written by this implementation.
const HEADER_SIZE: u8 = 4;

/// CFF header
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Header {
    pub major: u8,
    pub minor: u8,
    pub hdr_size: u8,
    /// The size of absolute offsets in the font set.
    ///
    /// Recomputed from the largest offset when the font set is written.
    pub off_size: u8,
}

/// A decoded CFF font set
#[derive(Debug, Clone)]
pub struct FontSet<'a> {
    pub header: Header,
    font_names: Vec<String>,
    /// One entry per name, in Name INDEX order
    fonts: Vec<Result<Font<'a>, ParseError>>,
    strings: IndexedStrings,
    global_subrs: Arc<[CharString<'a>]>,
}

impl ReadBinary for Header {
    type HostType<'b> = Self;

    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        // From section 6 of Technical Note #5176:
        // Implementations reading font set files must include code to check version numbers so
        // that if and when the format and therefore the version number changes, older
        // implementations will reject newer versions gracefully.
        let major = ctxt.read_u8()?;
        let minor = ctxt.read_u8()?;
        ctxt.check_version(major == 1 && minor == 0)?;
        let hdr_size = ctxt.read_u8()?;
        let off_size = ctxt.read_u8()?;

        if hdr_size < HEADER_SIZE {
            return Err(ParseError::BadValue);
        }

        let _unknown = ctxt.read_slice(usize::from(hdr_size - HEADER_SIZE))?;

        Ok(Header {
            major,
            minor,
            hdr_size,
            off_size,
        })
    }
}

impl WriteBinary<&Self> for Header {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, header: &Header) -> Result<(), WriteError> {
        U8::write(ctxt, header.major)?;
        U8::write(ctxt, header.minor)?;
        // Any data between the header and the Name INDEX is discarded when reading so the size
        // is always 4 bytes.
        U8::write(ctxt, HEADER_SIZE)?;
        U8::write(ctxt, header.off_size)?;

        Ok(())
    }
}

impl<'b> ReadBinary for FontSet<'b> {
    type HostType<'a> = FontSet<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        // Get a scope that starts at the beginning of the CFF data. This is needed for reading
        // data that is specified as an offset from the start of the data later.
        let scope = ctxt.scope();

        let header = ctxt.read::<Header>()?;
        let name_index = ctxt.read::<Index<'_>>()?;
        let top_dict_index = ctxt.read::<Index<'_>>()?;
        let strings = ctxt.read::<IndexedStrings>()?;
        let global_subr_index = ctxt.read::<Index<'_>>()?;
        debug!(
            "read {} fonts, {} strings and {} global subroutines",
            name_index.len(),
            strings.len(),
            global_subr_index.len()
        );

        ctxt.check(name_index.len() == top_dict_index.len())?;
        let mut font_names = Vec::with_capacity(name_index.len());
        let mut seen = FxHashSet::default();
        for name in name_index.iter() {
            ctxt.check(seen.insert(name))?;
            font_names.push(decode_latin1(name));
        }

        let global_subrs = global_subr_index
            .iter()
            .map(|data| CharString::new(CharstringType::Type2, data))
            .collect::<Arc<[_]>>();

        let fonts = font_names
            .iter()
            .zip(top_dict_index.iter())
            .map(|(name, top_dict_data)| {
                debug!("reading font {}", name);
                let font = Font::read(&scope, top_dict_data, &strings, Arc::clone(&global_subrs));
                if let Err(err) = &font {
                    warn!("unable to read font {}: {}", name, err);
                }
                font
            })
            .collect();

        Ok(FontSet {
            header,
            font_names,
            fonts,
            strings,
            global_subrs,
        })
    }
}

/// Encodes the font set with a freshly built String INDEX.
///
/// The layout is: header, Name INDEX, Top DICT INDEX, String INDEX, Global Subr INDEX and then
/// for each font its CharStrings INDEX, charset and Private DICT followed by the local Subrs
/// INDEX. Every font must have decoded successfully.
impl<'a> WriteBinary<&Self> for FontSet<'a> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, font_set: &FontSet<'a>) -> Result<(), WriteError> {
        let start = ctxt.bytes_written();
        let fonts = font_set
            .fonts
            .iter()
            .map(|font| font.as_ref().map_err(|err| WriteError::FailedFont(err.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        // Move the strings each font uses into a new String INDEX
        let mut strings = IndexedStrings::new();
        let mut top_dicts = Vec::with_capacity(fonts.len());
        let mut charsets = Vec::with_capacity(fonts.len());
        for font in &fonts {
            top_dicts.push(font.top_dict.remap_strings(&font_set.strings, &mut strings)?);
            let sids = font
                .glyph_order()
                .iter()
                .map(|glyph_name| strings.intern(glyph_name))
                .collect::<Result<Vec<_>, _>>()?;
            charsets.push(CustomCharset::from_sids(&sids)?);
        }

        // offSize depends on the largest offset written so the header is filled in last
        let header_placeholder = ctxt.reserve::<Header, Header>(usize::from(HEADER_SIZE))?;
        let names = font_set
            .font_names
            .iter()
            .map(|name| encode_latin1(name))
            .collect::<Result<Vec<_>, _>>()?;
        write_index(ctxt, &names)?;

        // The Top DICTs hold offsets to data that follows them so reserve space for them now.
        // Offsets are always written in the 5-byte form so the size does not depend on their
        // values.
        let mut top_dict_lengths = Vec::with_capacity(top_dicts.len());
        for top_dict in &top_dicts {
            let length =
                TopDict::write_dep(&mut WriteCounter::new(), top_dict, offsets_delta(0, 0, 0, 0)?)?;
            top_dict_lengths.push(length);
        }
        let top_dict_index_length = index::index_size(top_dict_lengths.iter().copied())?;
        let top_dict_index_placeholder =
            ctxt.reserve::<OwnedIndex, OwnedIndex>(top_dict_index_length)?;

        let custom_strings = strings
            .custom_strings()
            .iter()
            .map(|string| encode_latin1(string))
            .collect::<Result<Vec<_>, _>>()?;
        write_index(ctxt, &custom_strings)?;
        let global_subrs = font_set
            .global_subrs
            .iter()
            .map(CharString::data)
            .collect::<Vec<_>>();
        write_index(ctxt, &global_subrs)?;

        let mut top_dict_index = OwnedIndex::new(Vec::with_capacity(fonts.len()));
        let mut max_offset = 0;
        for ((font, top_dict), charset) in fonts.iter().zip(&top_dicts).zip(&charsets) {
            let char_strings_offset = ctxt.bytes_written() - start;
            let char_strings = font.char_strings().map(CharString::data).collect::<Vec<_>>();
            write_index(ctxt, &char_strings)?;

            let charset_offset = ctxt.bytes_written() - start;
            CustomCharset::write(ctxt, charset)?;

            let private_offset = ctxt.bytes_written() - start;
            let private_length = private::Private::write(ctxt, font.private())?;
            max_offset = max_offset.max(private_offset);

            let delta = offsets_delta(
                char_strings_offset,
                charset_offset,
                private_length,
                private_offset,
            )?;
            let mut top_dict_data = WriteBuffer::new();
            TopDict::write_dep(&mut top_dict_data, top_dict, delta)?;
            top_dict_index.data.push(top_dict_data.into_inner());
        }

        ctxt.write_placeholder(top_dict_index_placeholder, &top_dict_index)?;
        let header = Header {
            off_size: index::offset_size(max_offset).ok_or(WriteError::BadValue)?,
            ..font_set.header
        };
        ctxt.write_placeholder(header_placeholder, &header)?;

        Ok(())
    }
}

/// The Top DICT entries locating the data of a font.
fn offsets_delta(
    char_strings: usize,
    charset: usize,
    private_length: usize,
    private: usize,
) -> Result<DictDelta, WriteError> {
    let mut delta = DictDelta::new();
    delta.push_offset(Operator::CharStrings, i32::try_from(char_strings)?);
    delta.push_offset(Operator::Charset, i32::try_from(charset)?);
    delta.push(
        Operator::Private,
        vec![
            Operand::Offset(i32::try_from(private_length)?),
            Operand::Offset(i32::try_from(private)?),
        ],
    );
    Ok(delta)
}

impl<'a> FontSet<'a> {
    /// The names of the fonts in the set, in order.
    pub fn font_names(&self) -> &[String] {
        &self.font_names
    }

    /// Returns the font called `name`, or the error that prevented it being read.
    ///
    /// Returns `None` if there is no font with that name.
    pub fn font(&self, name: &str) -> Option<Result<&Font<'a>, &ParseError>> {
        self.font_names
            .iter()
            .position(|font_name| font_name == name)
            .and_then(|index| self.fonts.get(index))
            .map(Result::as_ref)
    }

    /// The fonts of the set paired with their names, in order.
    pub fn fonts(&self) -> impl Iterator<Item = (&str, Result<&Font<'a>, &ParseError>)> + '_ {
        self.font_names
            .iter()
            .map(String::as_str)
            .zip(self.fonts.iter().map(Result::as_ref))
    }

    /// The strings shared by all fonts of the set.
    pub fn strings(&self) -> &IndexedStrings {
        &self.strings
    }

    pub fn global_subrs(&self) -> &[CharString<'a>] {
        &self.global_subrs
    }

    /// Write a `CFFFont` tag for each font followed by the global subroutines.
    ///
    /// Charstrings are decompiled first. A charstring that fails to decompile is written as hex.
    pub fn to_xml<W: XmlWriter>(&self, writer: &mut W) -> fmt::Result {
        for (name, font) in self.fonts() {
            writer.begin_tag("CFFFont", &[("name", name)])?;
            writer.newline()?;
            match font {
                Ok(font) => {
                    if let Err(err) = font.decompile_all_char_strings() {
                        warn!("unable to decompile charstrings of {}: {}", name, err);
                    }
                    font.to_xml(writer, &self.strings)?;
                }
                Err(err) => debug!("skipping font {}: {}", name, err),
            }
            writer.end_tag("CFFFont")?;
            writer.newline()?;
        }

        writer.begin_tag("GlobalSubrs", &[])?;
        writer.newline()?;
        for (i, subr) in self.global_subrs.iter().enumerate() {
            writer.begin_tag("CharString", &[("id", i.to_string().as_str())])?;
            writer.newline()?;
            subr.to_xml(writer)?;
            writer.end_tag("CharString")?;
            writer.newline()?;
        }
        writer.end_tag("GlobalSubrs")?;
        writer.newline()
    }
}
