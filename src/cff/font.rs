//! A single font of a CFF font set.

use std::convert::TryFrom;
use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use log::debug;
use rustc_hash::FxHashMap;

use super::charset::read_charset;
use super::charstring::{CharString, CharStringError, CharstringType, Type2Decompiler};
use super::dict::{Operator, PrivateDict, TopDict};
use super::index::Index;
use super::private::{Private, PrivateDescriptor};
use super::strings::IndexedStrings;
use super::xml::XmlWriter;
use crate::binary::read::ReadScope;
use crate::error::{ParseError, Unsupported};

/// The predefined encodings a font may select with the Top DICT `Encoding` operator.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Encoding {
    Standard,
    Expert,
}

/// A decoded font.
///
/// The charstrings are held undecompiled until `decompile_all_char_strings` is called.
#[derive(Debug, Clone)]
pub struct Font<'a> {
    pub top_dict: TopDict,
    /// Glyph names in glyph order, starting with `.notdef`
    charset: Vec<String>,
    char_strings: FxHashMap<String, CharString<'a>>,
    charstring_type: CharstringType,
    /// The `Private` operands of the Top DICT, as read
    pub private_descriptor: PrivateDescriptor,
    private: Private<'a>,
    encoding: Encoding,
    global_subrs: Arc<[CharString<'a>]>,
}

impl TryFrom<i32> for Encoding {
    type Error = ParseError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Encoding::Standard),
            1 => Ok(Encoding::Expert),
            _ if value < 0 => Err(ParseError::BadOffset),
            // Any other value is the offset of a custom encoding
            _ => Err(ParseError::Unsupported(Unsupported::CustomEncoding)),
        }
    }
}

impl Encoding {
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Standard => "StandardEncoding",
            Encoding::Expert => "ExpertEncoding",
        }
    }
}

impl<'a> Font<'a> {
    /// Decode the font described by `top_dict_data`.
    ///
    /// `scope` is the whole CFF data, which DICT offsets are relative to.
    pub fn read(
        scope: &ReadScope<'a>,
        top_dict_data: &[u8],
        strings: &IndexedStrings,
        global_subrs: Arc<[CharString<'a>]>,
    ) -> Result<Self, ParseError> {
        let top_dict = TopDict::decompile(top_dict_data, strings)?;
        match top_dict.first_operator() {
            Some(Operator::ROS) => return Err(Unsupported::CidFont.into()),
            Some(Operator::SyntheticBase) => return Err(Unsupported::SyntheticFont.into()),
            _ => {}
        }

        let charstring_type = top_dict
            .get_i32(Operator::CharstringType)
            .ok_or(ParseError::MissingValue)??;
        let charstring_type = CharstringType::try_from(charstring_type)?;

        let char_strings_offset = top_dict.get_offset(Operator::CharStrings)?;
        // The INDEX count must lie within the data
        scope.offset_length(char_strings_offset, 2)?;
        let char_strings_index = scope.offset(char_strings_offset).read::<Index<'_>>()?;
        let n_glyphs = char_strings_index.len();
        debug!("read {} charstrings", n_glyphs);

        let charset_offset = top_dict.get_offset(Operator::Charset)?;
        let charset = read_charset(scope, charset_offset, n_glyphs, strings)?;

        let char_strings = bind_char_strings(charstring_type, &char_strings_index, &charset)?;

        let private_descriptor = PrivateDescriptor::from_top_dict(&top_dict)?;
        let private = Private::read(scope, private_descriptor, strings)?;

        let encoding = top_dict
            .get_i32(Operator::Encoding)
            .ok_or(ParseError::MissingValue)??;
        let encoding = Encoding::try_from(encoding)?;

        Ok(Font {
            top_dict,
            charset,
            char_strings,
            charstring_type,
            private_descriptor,
            private,
            encoding,
            global_subrs,
        })
    }

    /// The glyph names in glyph order.
    pub fn glyph_order(&self) -> &[String] {
        &self.charset
    }

    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        self.charset.get(usize::from(glyph_id)).map(String::as_str)
    }

    pub fn char_string(&self, glyph_name: &str) -> Option<&CharString<'a>> {
        self.char_strings.get(glyph_name)
    }

    /// The charstrings in glyph order.
    pub fn char_strings(&self) -> impl Iterator<Item = &CharString<'a>> + '_ {
        self.charset
            .iter()
            .filter_map(move |glyph_name| self.char_strings.get(glyph_name))
    }

    pub fn num_glyphs(&self) -> usize {
        self.charset.len()
    }

    pub fn charstring_type(&self) -> CharstringType {
        self.charstring_type
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The resolved Private DICT.
    pub fn private_dict(&self) -> &PrivateDict {
        &self.private.dict
    }

    pub fn private(&self) -> &Private<'a> {
        &self.private
    }

    pub fn local_subrs(&self) -> &[CharString<'a>] {
        &self.private.local_subrs
    }

    pub fn global_subrs(&self) -> &[CharString<'a>] {
        &self.global_subrs
    }

    /// Decompile every charstring not yet decompiled, along with the subroutines they call.
    pub fn decompile_all_char_strings(&self) -> Result<(), CharStringError> {
        match self.charstring_type {
            CharstringType::Type2 => {
                let mut decompiler =
                    Type2Decompiler::new(&self.private.local_subrs, &self.global_subrs);
                for char_string in self.char_strings() {
                    if char_string.needs_decompilation() {
                        decompiler.reset();
                        decompiler.execute(char_string)?;
                    }
                }
            }
            CharstringType::Type1 => {
                for char_string in self.char_strings() {
                    char_string.decompile()?;
                }
            }
        }

        Ok(())
    }

    /// Write the Top DICT values, the Private DICT and the charstrings.
    ///
    /// Charstrings that have not been decompiled are written as hex.
    pub fn to_xml<W: XmlWriter>(&self, writer: &mut W, strings: &IndexedStrings) -> fmt::Result {
        self.simple_values_to_xml(writer, strings)?;

        writer.begin_tag("Private", &[])?;
        writer.newline()?;
        self.private.to_xml(writer, strings)?;
        writer.end_tag("Private")?;
        writer.newline()?;

        writer.begin_tag("CharStrings", &[])?;
        writer.newline()?;
        for glyph_name in self.char_strings.keys().sorted() {
            let char_string = &self.char_strings[glyph_name];
            writer.begin_tag("CharString", &[("name", glyph_name.as_str())])?;
            writer.newline()?;
            char_string.to_xml(writer)?;
            writer.end_tag("CharString")?;
            writer.newline()?;
        }
        writer.end_tag("CharStrings")?;
        writer.newline()
    }

    fn simple_values_to_xml<W: XmlWriter>(
        &self,
        writer: &mut W,
        strings: &IndexedStrings,
    ) -> fmt::Result {
        let operators = self
            .top_dict
            .iter()
            .map(|(operator, _)| *operator)
            .filter(|operator| {
                !matches!(
                    operator,
                    Operator::CharStrings | Operator::Private | Operator::Charset
                )
            })
            .sorted_by_key(|operator| operator.name());

        for operator in operators {
            let text = if operator == Operator::Encoding {
                self.encoding.name().to_string()
            } else {
                match self.top_dict.get_value(operator, strings) {
                    Some(Ok(value)) => value.to_string(),
                    Some(Err(err)) => {
                        debug!("skipping {}: {}", operator.name(), err);
                        continue;
                    }
                    None => continue,
                }
            };
            writer.begin_tag(operator.name(), &[])?;
            writer.write_text(&text)?;
            writer.end_tag(operator.name())?;
            writer.newline()?;
        }

        Ok(())
    }
}

/// Pair each charstring with the glyph name at the same position in the charset.
fn bind_char_strings<'a>(
    charstring_type: CharstringType,
    char_strings_index: &Index<'a>,
    charset: &[String],
) -> Result<FxHashMap<String, CharString<'a>>, ParseError> {
    if charset.len() != char_strings_index.len() {
        return Err(ParseError::BadValue);
    }

    let mut char_strings =
        FxHashMap::with_capacity_and_hasher(charset.len(), Default::default());
    for (glyph_name, data) in charset.iter().zip(char_strings_index.iter()) {
        let char_string = CharString::new(charstring_type, data);
        if char_strings.insert(glyph_name.clone(), char_string).is_some() {
            // Duplicate names would leave fewer charstrings than glyphs
            return Err(ParseError::BadValue);
        }
    }

    Ok(char_strings)
}
