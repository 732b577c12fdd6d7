//! Charsets, described in Section 13 of Technical Note #5176.
//!
//! A charset maps glyph ids to glyph names, by way of SIDs. Glyph 0 is always `.notdef` and is
//! omitted from the data.

use std::convert::TryFrom;
use std::iter;

use num_traits as num;

use super::strings::{IndexedStrings, SID};
use crate::binary::read::{ReadArray, ReadBinaryDep, ReadCtxt, ReadFrom, ReadScope};
use crate::binary::write::{WriteBinary, WriteContext};
use crate::binary::{U16Be, U8};
use crate::error::{ParseError, Unsupported, WriteError};

/// Offsets below this value select one of the predefined charsets.
const FIRST_CUSTOM_CHARSET_OFFSET: usize = 3;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Range<F, N> {
    pub first: F,
    pub n_left: N,
}

/// A charset stored in the font data.
#[derive(Debug, PartialEq, Clone)]
pub enum CustomCharset {
    Format1 { ranges: Vec<Range<SID, u8>> },
    Format2 { ranges: Vec<Range<SID, u16>> },
}

impl ReadFrom for Range<SID, u8> {
    type ReadType = (U16Be, U8);
    fn read_from((first, n_left): (SID, u8)) -> Self {
        Range { first, n_left }
    }
}

impl WriteBinary for Range<SID, u8> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, range: Self) -> Result<(), WriteError> {
        U16Be::write(ctxt, range.first)?;
        U8::write(ctxt, range.n_left)?;

        Ok(())
    }
}

impl ReadFrom for Range<SID, u16> {
    type ReadType = (U16Be, U16Be);
    fn read_from((first, n_left): (SID, u16)) -> Self {
        Range { first, n_left }
    }
}

impl WriteBinary for Range<SID, u16> {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, range: Self) -> Result<(), WriteError> {
        U16Be::write(ctxt, range.first)?;
        U16Be::write(ctxt, range.n_left)?;

        Ok(())
    }
}

impl<F, N> Range<F, N>
where
    N: num::Unsigned + Copy,
    usize: From<N>,
{
    pub fn len(&self) -> usize {
        usize::from(self.n_left) + 1
    }
}

impl<N> Range<SID, N>
where
    N: num::Unsigned + Copy,
    usize: From<N>,
{
    /// The SIDs covered by this range.
    ///
    /// Fails if the range extends past the largest SID.
    pub fn sids(&self) -> Result<impl Iterator<Item = SID>, ParseError> {
        let last = SID::try_from(<usize as From<SID>>::from(self.first) + usize::from(self.n_left))
            .map_err(|_| ParseError::BadIndex)?;
        Ok(self.first..=last)
    }
}

impl ReadBinaryDep for CustomCharset {
    type Args<'a> = usize;
    type HostType<'a> = CustomCharset;

    fn read_dep<'a>(
        ctxt: &mut ReadCtxt<'a>,
        n_glyphs: usize,
    ) -> Result<Self::HostType<'a>, ParseError> {
        // There is one less element in the charset than nGlyphs because .notdef is omitted
        let n_glyphs = n_glyphs.checked_sub(1).ok_or(ParseError::BadValue)?;
        match ctxt.read_u8()? {
            1 => {
                let ranges = read_range_array(ctxt, n_glyphs)?;
                Ok(CustomCharset::Format1 {
                    ranges: ranges.to_vec(),
                })
            }
            2 => {
                let ranges = read_range_array(ctxt, n_glyphs)?;
                Ok(CustomCharset::Format2 {
                    ranges: ranges.to_vec(),
                })
            }
            format @ (0 | 3) => Err(Unsupported::CharsetFormat(format).into()),
            _ => Err(ParseError::BadValue),
        }
    }
}

impl WriteBinary<&Self> for CustomCharset {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, charset: &Self) -> Result<(), WriteError> {
        match charset {
            CustomCharset::Format1 { ranges } => {
                U8::write(ctxt, 1)?; // format
                ctxt.write_iter::<Range<SID, u8>, _>(ranges.iter().copied())?;
            }
            CustomCharset::Format2 { ranges } => {
                U8::write(ctxt, 2)?; // format
                ctxt.write_iter::<Range<SID, u16>, _>(ranges.iter().copied())?;
            }
        }

        Ok(())
    }
}

impl CustomCharset {
    /// Build a charset from the SIDs of every glyph, including `.notdef`.
    ///
    /// Consecutive SIDs are grouped into ranges. Format 1 is used unless a range holds more
    /// glyphs than it can describe.
    pub fn from_sids(sids: &[SID]) -> Result<Self, WriteError> {
        let mut runs: Vec<Range<SID, usize>> = Vec::new();
        // .notdef is implied
        for &sid in sids.iter().skip(1) {
            match runs.last_mut() {
                Some(run) if usize::from(run.first) + run.n_left + 1 == usize::from(sid) => {
                    run.n_left += 1
                }
                _ => runs.push(Range {
                    first: sid,
                    n_left: 0,
                }),
            }
        }

        if runs.iter().all(|run| run.n_left <= usize::from(u8::MAX)) {
            let ranges = runs
                .into_iter()
                .map(|run| {
                    Ok(Range {
                        first: run.first,
                        n_left: u8::try_from(run.n_left)?,
                    })
                })
                .collect::<Result<_, WriteError>>()?;
            Ok(CustomCharset::Format1 { ranges })
        } else {
            let ranges = runs
                .into_iter()
                .map(|run| {
                    Ok(Range {
                        first: run.first,
                        n_left: u16::try_from(run.n_left)?,
                    })
                })
                .collect::<Result<_, WriteError>>()?;
            Ok(CustomCharset::Format2 { ranges })
        }
    }

    pub fn format(&self) -> u8 {
        match self {
            CustomCharset::Format1 { .. } => 1,
            CustomCharset::Format2 { .. } => 2,
        }
    }

    /// The SID of each glyph, starting with `.notdef`.
    pub fn sids(&self) -> Result<Vec<SID>, ParseError> {
        let mut sids = vec![0];
        match self {
            CustomCharset::Format1 { ranges } => {
                for range in ranges {
                    sids.extend(range.sids()?);
                }
            }
            CustomCharset::Format2 { ranges } => {
                for range in ranges {
                    sids.extend(range.sids()?);
                }
            }
        }

        Ok(sids)
    }

    /// Resolve the name of each glyph through `strings`.
    pub fn glyph_names(&self, strings: &IndexedStrings) -> Result<Vec<String>, ParseError> {
        self.sids()?
            .into_iter()
            .map(|sid| strings.resolve(sid).map(str::to_owned))
            .collect()
    }
}

/// Decode charset data of the given `format` into the names of `n_glyphs` glyphs.
///
/// `data` is the charset data following the format byte.
pub fn decode_charset(
    format: u8,
    n_glyphs: usize,
    data: &[u8],
    strings: &IndexedStrings,
) -> Result<Vec<String>, ParseError> {
    let format_and_data = iter::once(format).chain(data.iter().copied()).collect::<Vec<_>>();
    let charset = ReadScope::new(&format_and_data).read_dep::<CustomCharset>(n_glyphs)?;
    charset.glyph_names(strings)
}

/// Read the charset at `offset` in `scope` and resolve the names of its glyphs.
pub fn read_charset(
    scope: &ReadScope<'_>,
    offset: usize,
    n_glyphs: usize,
    strings: &IndexedStrings,
) -> Result<Vec<String>, ParseError> {
    if offset < FIRST_CUSTOM_CHARSET_OFFSET {
        return Err(Unsupported::PredefinedCharset.into());
    }

    // The format byte must be within the data
    scope.offset_length(offset, 1)?;
    let charset = scope.offset(offset).read_dep::<CustomCharset>(n_glyphs)?;
    charset.glyph_names(strings)
}

fn read_range_array<'a, F, N>(
    ctxt: &mut ReadCtxt<'a>,
    n_glyphs: usize,
) -> Result<ReadArray<'a, Range<F, N>>, ParseError>
where
    Range<F, N>: ReadFrom,
    usize: From<N>,
    N: num::Unsigned + Copy,
{
    let mut peek = ctxt.scope().ctxt();
    let mut range_count = 0;
    let mut glyphs_covered = 0;
    while glyphs_covered < n_glyphs {
        let range = peek.read::<Range<F, N>>()?;
        range_count += 1;
        glyphs_covered += range.len();
    }
    // A range may not describe more glyphs than the font has
    ctxt.check(glyphs_covered == n_glyphs)?;

    ctxt.read_array::<Range<F, N>>(range_count)
}
