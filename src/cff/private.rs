//! The Private DICT and its local subroutines.
//!
//! The Top DICT locates the Private DICT with a (size, offset) pair relative to the start of the
//! CFF data. The `Subrs` offset inside the Private DICT is relative to the start of the Private
//! DICT itself.

use std::convert::TryFrom;
use std::fmt;

use log::debug;

use super::charstring::{CharString, CharstringType};
use super::dict::{DictDelta, Operand, Operator, PrivateDict, TopDict};
use super::index::{write_index, Index};
use super::strings::IndexedStrings;
use super::xml::XmlWriter;
use crate::binary::read::ReadScope;
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext, WriteCounter};
use crate::error::{ParseError, WriteError};

/// The location of a Private DICT as given by the Top DICT `Private` operator.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct PrivateDescriptor {
    pub size: usize,
    pub offset: usize,
}

/// A Private DICT resolved from its descriptor, with the local subroutines it refers to.
#[derive(Debug, Clone)]
pub struct Private<'a> {
    pub dict: PrivateDict,
    /// Local subroutines, always Type 2 charstrings
    pub local_subrs: Vec<CharString<'a>>,
}

impl PrivateDescriptor {
    /// Read the descriptor from `top_dict`, using the "no Private DICT" default when absent.
    pub fn from_top_dict(top_dict: &TopDict) -> Result<Self, ParseError> {
        match top_dict.require(Operator::Private)? {
            [
                Operand::Offset(size) | Operand::Integer(size),
                Operand::Offset(offset) | Operand::Integer(offset),
            ] => {
                Ok(PrivateDescriptor {
                    size: usize::try_from(*size).map_err(|_| ParseError::BadValue)?,
                    offset: usize::try_from(*offset).map_err(|_| ParseError::BadOffset)?,
                })
            }
            _ => Err(ParseError::BadValue),
        }
    }
}

impl<'a> Private<'a> {
    /// Resolve the Private DICT described by `descriptor` within `scope`, the whole CFF data.
    pub fn read(
        scope: &ReadScope<'a>,
        descriptor: PrivateDescriptor,
        strings: &IndexedStrings,
    ) -> Result<Self, ParseError> {
        let private_data = scope.offset_length(descriptor.offset, descriptor.size)?;
        let dict = PrivateDict::decompile(private_data.data(), strings)?;

        // A Private DICT without a Subrs operator has no local subroutines
        let local_subrs = match dict.get(Operator::Subrs) {
            Some(_) => {
                let subrs_offset = dict.get_offset(Operator::Subrs)?;
                let offset = descriptor
                    .offset
                    .checked_add(subrs_offset)
                    .ok_or(ParseError::BadOffset)?;
                // The INDEX count must lie within the data
                scope.offset_length(offset, 2)?;
                let index = scope.offset(offset).read::<Index<'_>>()?;
                debug!("read {} local subroutines", index.len());
                index
                    .iter()
                    .map(|data| CharString::new(CharstringType::Type2, data))
                    .collect()
            }
            None => Vec::new(),
        };

        Ok(Private { dict, local_subrs })
    }

    /// Write the values of the DICT followed by the local subroutines.
    pub fn to_xml<W: XmlWriter>(&self, writer: &mut W, strings: &IndexedStrings) -> fmt::Result {
        for (operator, _) in self.dict.iter() {
            if *operator == Operator::Subrs {
                continue;
            }
            match self.dict.get_value(*operator, strings) {
                Some(Ok(value)) => {
                    writer.begin_tag(operator.name(), &[])?;
                    writer.write_text(&value.to_string())?;
                    writer.end_tag(operator.name())?;
                    writer.newline()?;
                }
                Some(Err(err)) => debug!("skipping {}: {}", operator.name(), err),
                None => {}
            }
        }

        writer.begin_tag("Subrs", &[])?;
        writer.newline()?;
        for (i, subr) in self.local_subrs.iter().enumerate() {
            writer.begin_tag("CharString", &[("id", i.to_string().as_str())])?;
            writer.newline()?;
            subr.to_xml(writer)?;
            writer.end_tag("CharString")?;
            writer.newline()?;
        }
        writer.end_tag("Subrs")?;
        writer.newline()
    }

    fn has_subrs(&self) -> bool {
        !self.local_subrs.is_empty() || self.dict.get(Operator::Subrs).is_some()
    }
}

/// Writes the Private DICT immediately followed by its local subroutines.
///
/// The output is the length of the Private DICT, excluding the subroutines.
impl<'a> WriteBinary<&Self> for Private<'a> {
    type Output = usize;

    fn write<C: WriteContext>(ctxt: &mut C, private: &Private<'a>) -> Result<usize, WriteError> {
        let has_subrs = private.has_subrs();

        // Offsets are always written in the 5-byte form so the placeholder value does not change
        // the length
        let mut delta = DictDelta::new();
        if has_subrs {
            delta.push_offset(Operator::Subrs, 0);
        }
        let private_dict_length =
            PrivateDict::write_dep(&mut WriteCounter::new(), &private.dict, delta)?;

        // The Subrs offset is relative to the start of the Private DICT
        let mut delta = DictDelta::new();
        if has_subrs {
            delta.push_offset(Operator::Subrs, i32::try_from(private_dict_length)?);
        }
        let written_length = PrivateDict::write_dep(ctxt, &private.dict, delta)?;
        if written_length != private_dict_length {
            return Err(WriteError::BadValue);
        }

        if has_subrs {
            let subrs = private
                .local_subrs
                .iter()
                .map(CharString::data)
                .collect::<Vec<_>>();
            write_index(ctxt, &subrs)?;
        }

        Ok(written_length)
    }
}
