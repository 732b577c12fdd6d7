//! CFF DICT data, described in Section 4 of Technical Note #5176.
//!
//! A DICT is a sequence of operand/operator pairs. Operands precede the operator they belong to
//! and are encoded in a compact variable length form. Lookups fall back to a static table of
//! default values that depends on the kind of DICT.

use std::convert::{TryFrom, TryInto};
use std::fmt;
use std::marker::PhantomData;

use itertools::Itertools;
use lazy_static::lazy_static;
use tinyvec::{tiny_vec, TinyVec};

use super::strings::{IndexedStrings, SID};
use crate::binary::read::{ReadBinary, ReadCtxt, ReadScope};
use crate::binary::write::{WriteBinary, WriteBinaryDep, WriteContext};
use crate::binary::{I16Be, I32Be, U16Be, U8};
use crate::error::{ParseError, WriteError};

// An operator may be preceded by up to a maximum of 48 operands.
pub const MAX_OPERANDS: usize = 48;
const END_OF_FLOAT_FLAG: u8 = 0xf;

const OPERAND_ZERO: [Operand; 1] = [Operand::Integer(0)];
const OFFSET_ZERO: [Operand; 1] = [Operand::Offset(0)];
const PRIVATE_NONE: [Operand; 2] = [Operand::Offset(0), Operand::Offset(0)];
const DEFAULT_UNDERLINE_POSITION: [Operand; 1] = [Operand::Integer(-100)];
const DEFAULT_UNDERLINE_THICKNESS: [Operand; 1] = [Operand::Integer(50)];
const DEFAULT_CHARSTRING_TYPE: [Operand; 1] = [Operand::Integer(2)];
lazy_static! {
    static ref DEFAULT_FONT_MATRIX: [Operand; 6] = {
        let real_0_001 = Operand::Real(Real(tiny_vec![0x0a, 0x00, 0x1f])); // 0.001
        [
            real_0_001.clone(),
            Operand::Integer(0),
            Operand::Integer(0),
            real_0_001,
            Operand::Integer(0),
            Operand::Integer(0),
        ]
    };
}
const DEFAULT_BBOX: [Operand; 4] = [
    Operand::Integer(0),
    Operand::Integer(0),
    Operand::Integer(0),
    Operand::Integer(0),
];
const DEFAULT_BLUE_SHIFT: [Operand; 1] = [Operand::Integer(7)];
const DEFAULT_BLUE_FUZZ: [Operand; 1] = [Operand::Integer(1)];
lazy_static! {
    static ref DEFAULT_BLUE_SCALE: [Operand; 1] =
        [Operand::Real(Real(tiny_vec![0x0a, 0x03, 0x96, 0x25, 0xff]))]; // 0.039625
    static ref DEFAULT_EXPANSION_FACTOR: [Operand; 1] =
        [Operand::Real(Real(tiny_vec![0x0a, 0x06, 0xff]))]; // 0.06
}

/// A CFF DICT described in Section 4 of Technical Note #5176
#[derive(Debug, PartialEq, Clone)]
pub struct Dict<T>
where
    T: DictDefault,
{
    dict: Vec<(Operator, Vec<Operand>)>,
    default: PhantomData<T>,
}

/// The default values of a DICT
pub trait DictDefault {
    /// Returns the default operand(s) if any for the supplied `op`.
    fn default(op: Operator) -> Option<&'static [Operand]>;
}

#[derive(Debug, PartialEq, Clone)]
pub struct TopDictDefault;

#[derive(Debug, PartialEq, Clone)]
pub struct PrivateDictDefault;

pub type TopDict = Dict<TopDictDefault>;

pub type PrivateDict = Dict<PrivateDictDefault>;

/// A collection of offset changes to a `Dict`
///
/// `DictDelta` only accepts Operators with offsets as operands.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct DictDelta {
    dict: Vec<(Operator, Vec<Operand>)>,
}

/// CFF DICT operator
#[derive(Debug, PartialEq)]
enum Op {
    Operator(Operator),
    Operand(Operand),
}

/// CFF operand to an operator
#[derive(Debug, PartialEq, Clone)]
pub enum Operand {
    Integer(i32),
    Offset(i32),
    Real(Real),
}

/// A real number, held as its nibble encoding.
///
/// To parse the value into `f64` use the `TryFrom`/`TryInto` impl.
#[derive(Debug, PartialEq, Clone)]
pub struct Real(TinyVec<[u8; 7]>);

/// A decoded number: DICT integers and reals are interchangeable.
#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Number {
    Integer(i32),
    Real(f64),
}

/// The value of a DICT entry, interpreted according to its operator.
#[derive(Debug, PartialEq, Clone)]
pub enum DictValue {
    Number(Number),
    Boolean(bool),
    String(String),
    Array(Vec<Number>),
    /// A delta encoded array, holding the absolute values.
    Delta(Vec<Number>),
    Ros {
        registry: String,
        ordering: String,
        supplement: Number,
    },
    SizeOffset {
        size: usize,
        offset: usize,
    },
    Offset(usize),
}

#[derive(Debug, PartialEq, Copy, Clone)]
enum ValueKind {
    Number,
    Boolean,
    Sid,
    Array,
    Delta,
    Ros,
    SizeOffset,
    Offset,
}

#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Operator {
    Version = 0,
    Notice = 1,
    FullName = 2,
    FamilyName = 3,
    Weight = 4,
    FontBBox = 5,
    BlueValues = 6,
    OtherBlues = 7,
    FamilyBlues = 8,
    FamilyOtherBlues = 9,
    StdHW = 10,
    StdVW = 11,
    UniqueID = 13,
    XUID = 14,
    Charset = 15,
    Encoding = 16,
    CharStrings = 17,
    Private = 18,
    Subrs = 19,
    DefaultWidthX = 20,
    NominalWidthX = 21,
    Copyright = op2(0),
    IsFixedPitch = op2(1),
    ItalicAngle = op2(2),
    UnderlinePosition = op2(3),
    UnderlineThickness = op2(4),
    PaintType = op2(5),
    CharstringType = op2(6),
    FontMatrix = op2(7),
    StrokeWidth = op2(8),
    BlueScale = op2(9),
    BlueShift = op2(10),
    BlueFuzz = op2(11),
    StemSnapH = op2(12),
    StemSnapV = op2(13),
    ForceBold = op2(14),
    LanguageGroup = op2(17),
    ExpansionFactor = op2(18),
    InitialRandomSeed = op2(19),
    SyntheticBase = op2(20),
    PostScript = op2(21),
    BaseFontName = op2(22),
    BaseFontBlend = op2(23),
    ROS = op2(30),
    CIDFontVersion = op2(31),
    CIDFontRevision = op2(32),
    CIDFontType = op2(33),
    CIDCount = op2(34),
    UIDBase = op2(35),
    FDArray = op2(36),
    FDSelect = op2(37),
    FontName = op2(38),
}

const fn op2(value: u8) -> u16 {
    (12 << 8) | (value as u16)
}

impl<T> ReadBinary for Dict<T>
where
    T: DictDefault,
{
    type HostType<'b> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let mut dict = Vec::new();
        let mut operands = Vec::new();

        while ctxt.bytes_available() {
            match Op::read(ctxt)? {
                Op::Operator(operator) => {
                    integer_to_offset(operator, &mut operands);
                    dict.push((operator, operands.clone()));
                    operands.clear();
                }
                Op::Operand(operand) => {
                    operands.push(operand);
                    if operands.len() > MAX_OPERANDS {
                        return Err(ParseError::LimitExceeded);
                    }
                }
            }
        }

        // Every operand must be followed by its operator
        if !operands.is_empty() {
            return Err(ParseError::BadValue);
        }

        Ok(Dict {
            dict,
            default: PhantomData,
        })
    }
}

// Special case handling for operands that are offsets. This function swaps them from an
// Integer to an Offset. This is later used when writing operands.
fn integer_to_offset(operator: Operator, operands: &mut [Operand]) {
    match (operator, &operands) {
        // Encodings 0..=1 indicate predefined encodings and are not offsets
        (Operator::Encoding, [Operand::Integer(offset)]) if *offset > 1 => {
            operands[0] = Operand::Offset(*offset);
        }
        (Operator::Charset, [Operand::Integer(offset)])
        | (Operator::CharStrings, [Operand::Integer(offset)])
        | (Operator::Subrs, [Operand::Integer(offset)])
        | (Operator::FDArray, [Operand::Integer(offset)])
        | (Operator::FDSelect, [Operand::Integer(offset)]) => {
            operands[0] = Operand::Offset(*offset);
        }
        (Operator::Private, [Operand::Integer(length), Operand::Integer(offset)]) => {
            let offset = *offset;
            operands[0] = Operand::Offset(*length);
            operands[1] = Operand::Offset(offset);
        }
        _ => {}
    }
}

impl<T> WriteBinaryDep<&Self> for Dict<T>
where
    T: DictDefault,
{
    type Args = DictDelta;
    type Output = usize; // The length of the written Dict

    fn write_dep<C: WriteContext>(
        ctxt: &mut C,
        dict: &Dict<T>,
        delta: DictDelta,
    ) -> Result<Self::Output, WriteError> {
        let offset = ctxt.bytes_written();

        for (operator, operands) in dict.iter() {
            let mut operands = operands.as_slice();

            // Replace operands with delta operands if present otherwise skip if operands match
            // default. We never skip operands pulled from the delta DICT as these are offsets and
            // always need to be written in order to make the size of the DICT predictable.
            if let Some(delta_operands) = delta.get(*operator) {
                operands = delta_operands;
            } else if T::default(*operator)
                .map(|defaults| defaults == operands)
                .unwrap_or(false)
            {
                continue;
            }

            write_entry(ctxt, *operator, operands)?;
        }

        // Offsets that the DICT did not hold explicitly
        for (operator, operands) in delta.iter() {
            if dict.get(*operator).is_none() {
                write_entry(ctxt, *operator, operands)?;
            }
        }

        Ok(ctxt.bytes_written() - offset)
    }
}

fn write_entry<C: WriteContext>(
    ctxt: &mut C,
    operator: Operator,
    operands: &[Operand],
) -> Result<(), WriteError> {
    if operands.len() > MAX_OPERANDS {
        return Err(WriteError::BadValue);
    }
    for operand in operands {
        Operand::write(ctxt, operand)?;
    }
    Operator::write(ctxt, operator)
}

impl ReadBinary for Op {
    type HostType<'b> = Self;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self, ParseError> {
        let b0 = ctxt.read_u8()?;

        match b0 {
            0..=11 | 13..=21 => ok_operator(u16::from(b0).try_into()?),
            12 => ok_operator(op2(ctxt.read_u8()?).try_into()?),
            28 => {
                let num = ctxt.read_i16be()?;
                Ok(Op::Operand(Operand::Integer(i32::from(num))))
            }
            29 => ok_int(ctxt.read_i32be()?),
            30 => ok_real(ctxt.read_until_nibble(END_OF_FLOAT_FLAG)?),
            32..=246 => ok_int(i32::from(b0) - 139),
            247..=250 => {
                let b1 = ctxt.read_u8()?;
                ok_int((i32::from(b0) - 247) * 256 + i32::from(b1) + 108)
            }
            251..=254 => {
                let b1 = ctxt.read_u8()?;
                ok_int(-(i32::from(b0) - 251) * 256 - i32::from(b1) - 108)
            }
            22..=27 | 31 | 255 => Err(ParseError::BadValue), // reserved
        }
    }
}

impl WriteBinary<Self> for Operator {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, op: Operator) -> Result<(), WriteError> {
        let value = op as u16;
        if value > 0xFF {
            U16Be::write(ctxt, value)?;
        } else {
            U8::write(ctxt, value as u8)?;
        }

        Ok(())
    }
}

impl WriteBinary<&Self> for Operand {
    type Output = ();

    // Refer to Table 3 Operand Encoding in section 4 of Technical Note #5176 for details on the
    // integer encoding scheme.
    fn write<C: WriteContext>(ctxt: &mut C, op: &Operand) -> Result<(), WriteError> {
        match op {
            Operand::Integer(val) => match *val {
                // NOTE: Casts are safe due to patterns limiting range
                -107..=107 => {
                    U8::write(ctxt, (val + 139) as u8)?;
                }
                108..=1131 => {
                    let val = *val - 108;
                    U8::write(ctxt, ((val >> 8) + 247) as u8)?;
                    U8::write(ctxt, val as u8)?;
                }
                -1131..=-108 => {
                    let val = -*val - 108;
                    U8::write(ctxt, ((val >> 8) + 251) as u8)?;
                    U8::write(ctxt, val as u8)?;
                }
                -32768..=32767 => {
                    U8::write(ctxt, 28)?;
                    I16Be::write(ctxt, *val as i16)?
                }
                _ => {
                    U8::write(ctxt, 29)?;
                    I32Be::write(ctxt, *val)?
                }
            },
            Operand::Offset(val) => {
                U8::write(ctxt, 29)?;
                // Offsets are always encoded using the i32 representation to make their size
                // predictable.
                I32Be::write(ctxt, *val)?;
            }
            Operand::Real(Real(val)) => {
                U8::write(ctxt, 30)?;
                ctxt.write_bytes(val)?;
            }
        }

        Ok(())
    }
}

fn ok_operator(op: Operator) -> Result<Op, ParseError> {
    Ok(Op::Operator(op))
}

fn ok_int(num: i32) -> Result<Op, ParseError> {
    Ok(Op::Operand(Operand::Integer(num)))
}

fn ok_real(slice: &[u8]) -> Result<Op, ParseError> {
    Ok(Op::Operand(Operand::Real(Real(TinyVec::from(slice)))))
}

const FLOAT_BUF_LEN: usize = 64;

impl TryFrom<&Real> for f64 {
    type Error = ParseError;

    /// Try to parse this `Real` into an `f64`.
    fn try_from(real: &Real) -> Result<Self, Self::Error> {
        let mut buf = [0u8; FLOAT_BUF_LEN];
        let mut used = 0;

        for &byte in real.0.iter() {
            let nibble1 = byte >> 4;
            let nibble2 = byte & 0xF;

            if nibble1 == END_OF_FLOAT_FLAG {
                break;
            }
            parse_float_nibble(nibble1, &mut used, &mut buf)?;
            if nibble2 == END_OF_FLOAT_FLAG {
                break;
            }
            parse_float_nibble(nibble2, &mut used, &mut buf)?;
        }

        let s = std::str::from_utf8(&buf[..used]).map_err(|_| ParseError::BadValue)?;
        s.parse().map_err(|_| ParseError::BadValue)
    }
}

// Adobe Technical Note #5176, Table 5 Nibble Definitions
fn parse_float_nibble(nibble: u8, idx: &mut usize, data: &mut [u8]) -> Result<(), ParseError> {
    if *idx == FLOAT_BUF_LEN {
        return Err(ParseError::LimitExceeded);
    }

    match nibble {
        0..=9 => {
            data[*idx] = b'0' + nibble;
        }
        10 => {
            data[*idx] = b'.';
        }
        11 => {
            data[*idx] = b'E';
        }
        12 => {
            if *idx + 1 == FLOAT_BUF_LEN {
                return Err(ParseError::LimitExceeded);
            }

            data[*idx] = b'E';
            *idx += 1;
            data[*idx] = b'-';
        }
        13 => return Err(ParseError::BadValue),
        14 => {
            data[*idx] = b'-';
        }
        _ => return Err(ParseError::BadValue),
    }

    *idx += 1;
    Ok(())
}

impl DictDefault for TopDictDefault {
    fn default(op: Operator) -> Option<&'static [Operand]> {
        match op {
            Operator::IsFixedPitch => Some(&OPERAND_ZERO),
            Operator::ItalicAngle => Some(&OPERAND_ZERO),
            Operator::UnderlinePosition => Some(&DEFAULT_UNDERLINE_POSITION),
            Operator::UnderlineThickness => Some(&DEFAULT_UNDERLINE_THICKNESS),
            Operator::PaintType => Some(&OPERAND_ZERO),
            Operator::CharstringType => Some(&DEFAULT_CHARSTRING_TYPE),
            Operator::FontMatrix => Some(DEFAULT_FONT_MATRIX.as_ref()),
            Operator::FontBBox => Some(&DEFAULT_BBOX),
            Operator::StrokeWidth => Some(&OPERAND_ZERO),
            Operator::Charset => Some(&OFFSET_ZERO),
            Operator::Encoding => Some(&OPERAND_ZERO),
            Operator::Private => Some(&PRIVATE_NONE),
            _ => None,
        }
    }
}

impl DictDefault for PrivateDictDefault {
    fn default(op: Operator) -> Option<&'static [Operand]> {
        match op {
            Operator::BlueScale => Some(DEFAULT_BLUE_SCALE.as_ref()),
            Operator::BlueShift => Some(&DEFAULT_BLUE_SHIFT),
            Operator::BlueFuzz => Some(&DEFAULT_BLUE_FUZZ),
            Operator::ForceBold => Some(&OPERAND_ZERO),
            Operator::LanguageGroup => Some(&OPERAND_ZERO),
            Operator::ExpansionFactor => Some(DEFAULT_EXPANSION_FACTOR.as_ref()),
            Operator::InitialRandomSeed => Some(&OPERAND_ZERO),
            Operator::DefaultWidthX => Some(&OPERAND_ZERO),
            Operator::NominalWidthX => Some(&OPERAND_ZERO),
            _ => None,
        }
    }
}

impl<T> Default for Dict<T>
where
    T: DictDefault,
{
    fn default() -> Self {
        Dict::new()
    }
}

impl<T> Dict<T>
where
    T: DictDefault,
{
    pub fn new() -> Self {
        Dict {
            dict: Vec::new(),
            default: PhantomData,
        }
    }

    /// Read a DICT from `data`, checking that every string it refers to is in `strings`.
    pub fn decompile(data: &[u8], strings: &IndexedStrings) -> Result<Self, ParseError> {
        let dict = ReadScope::new(data).read::<Self>()?;
        dict.check_strings(strings)?;
        Ok(dict)
    }

    /// Check that the SID operands of this DICT resolve in `strings`.
    pub fn check_strings(&self, strings: &IndexedStrings) -> Result<(), ParseError> {
        for (operator, operands) in self.iter() {
            let sids = match operator.kind() {
                ValueKind::Sid => operands.as_slice(),
                ValueKind::Ros => operands.get(..2).ok_or(ParseError::BadValue)?,
                _ => continue,
            };
            if sids.is_empty() {
                return Err(ParseError::BadValue);
            }
            for operand in sids {
                strings.resolve(operand_sid(operand)?)?;
            }
        }

        Ok(())
    }

    pub fn get_with_default(&self, key: Operator) -> Option<&[Operand]> {
        self.get(key).or_else(|| T::default(key))
    }

    pub fn get(&self, key: Operator) -> Option<&[Operand]> {
        self.dict.iter().find_map(|(op, args)| {
            if *op == key {
                Some(args.as_slice())
            } else {
                None
            }
        })
    }

    /// Returns the operands of `key`, or its default.
    ///
    /// Fails with `ParseError::MissingValue` if the DICT has no value and there is no default.
    pub fn require(&self, key: Operator) -> Result<&[Operand], ParseError> {
        self.get_with_default(key).ok_or(ParseError::MissingValue)
    }

    /// Returns the i32 value of this operator if the operands hold a single Integer.
    pub fn get_i32(&self, key: Operator) -> Option<Result<i32, ParseError>> {
        self.get_with_default(key).map(|operands| match operands {
            [Operand::Integer(number)] => Ok(*number),
            [Operand::Offset(number)] => Ok(*number),
            _ => Err(ParseError::BadValue),
        })
    }

    /// Returns the offset held by `key`, which must be present or have a default.
    pub fn get_offset(&self, key: Operator) -> Result<usize, ParseError> {
        match self.require(key)? {
            [Operand::Offset(offset)] | [Operand::Integer(offset)] => {
                usize::try_from(*offset).map_err(|_| ParseError::BadOffset)
            }
            _ => Err(ParseError::BadValue),
        }
    }

    /// Returns the string referenced by the SID operand of `key`.
    pub fn get_string<'s>(
        &self,
        key: Operator,
        strings: &'s IndexedStrings,
    ) -> Option<Result<&'s str, ParseError>> {
        self.get_with_default(key).map(|operands| match operands {
            [operand] => strings.resolve(operand_sid(operand)?),
            _ => Err(ParseError::BadValue),
        })
    }

    /// Returns the value of `key` interpreted according to the operator.
    pub fn get_value(
        &self,
        key: Operator,
        strings: &IndexedStrings,
    ) -> Option<Result<DictValue, ParseError>> {
        self.get_with_default(key)
            .map(|operands| DictValue::new(key, operands, strings))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Operator, Vec<Operand>)> {
        self.dict.iter()
    }

    /// Returns the first operator of this DICT or `None` if the DICT is empty.
    pub fn first_operator(&self) -> Option<Operator> {
        self.iter().next().map(|(operator, _)| *operator)
    }

    pub fn len(&self) -> usize {
        self.dict.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dict.is_empty()
    }

    /// Set the operands of `operator`, replacing any existing value.
    pub fn push(&mut self, operator: Operator, operands: Vec<Operand>) {
        match self.dict.iter_mut().find(|(op, _)| *op == operator) {
            Some((_, existing)) => *existing = operands,
            None => self.dict.push((operator, operands)),
        }
    }

    pub fn remove(&mut self, operator: Operator) {
        if let Some(index) = self.dict.iter().position(|(op, _)| *op == operator) {
            self.dict.remove(index);
        }
    }

    /// Returns a copy of this DICT with its SID operands moved from `from` into `to`.
    pub fn remap_strings(
        &self,
        from: &IndexedStrings,
        to: &mut IndexedStrings,
    ) -> Result<Self, WriteError> {
        let mut dict = Vec::with_capacity(self.dict.len());
        for (operator, operands) in self.iter() {
            let sid_count = match operator.kind() {
                ValueKind::Sid => operands.len(),
                ValueKind::Ros => 2,
                _ => 0,
            };
            let mut operands = operands.clone();
            for operand in operands.iter_mut().take(sid_count) {
                let string = operand_sid(operand)
                    .and_then(|sid| from.resolve(sid))
                    .map_err(|_| WriteError::BadValue)?;
                *operand = Operand::Integer(i32::from(to.intern(string)?));
            }
            dict.push((*operator, operands));
        }

        Ok(Dict {
            dict,
            default: PhantomData,
        })
    }
}

fn operand_sid(operand: &Operand) -> Result<SID, ParseError> {
    match operand {
        Operand::Integer(sid) => SID::try_from(*sid).map_err(|_| ParseError::BadIndex),
        _ => Err(ParseError::BadValue),
    }
}

impl DictDelta {
    pub fn new() -> Self {
        DictDelta { dict: Vec::new() }
    }

    pub fn get(&self, key: Operator) -> Option<&[Operand]> {
        self.dict.iter().find_map(|(op, args)| {
            if *op == key {
                Some(args.as_slice())
            } else {
                None
            }
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Operator, Vec<Operand>)> {
        self.dict.iter()
    }

    /// Push `operator` on this Dict as an Offset Operand
    pub fn push_offset(&mut self, operator: Operator, offset: i32) {
        self.dict.push((operator, vec![Operand::Offset(offset)]))
    }

    /// Push `operands` onto this Dict
    ///
    /// Panics if all `operands` are not `Operand::Offsets`
    pub fn push(&mut self, operator: Operator, operands: Vec<Operand>) {
        assert!(operands.iter().all(Operand::is_offset));
        self.dict.push((operator, operands))
    }
}

impl TryFrom<u16> for Operator {
    type Error = ParseError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if (value & 0xFF00) == (12 << 8) {
            match value as u8 {
                0 => Ok(Operator::Copyright),
                1 => Ok(Operator::IsFixedPitch),
                2 => Ok(Operator::ItalicAngle),
                3 => Ok(Operator::UnderlinePosition),
                4 => Ok(Operator::UnderlineThickness),
                5 => Ok(Operator::PaintType),
                6 => Ok(Operator::CharstringType),
                7 => Ok(Operator::FontMatrix),
                8 => Ok(Operator::StrokeWidth),
                9 => Ok(Operator::BlueScale),
                10 => Ok(Operator::BlueShift),
                11 => Ok(Operator::BlueFuzz),
                12 => Ok(Operator::StemSnapH),
                13 => Ok(Operator::StemSnapV),
                14 => Ok(Operator::ForceBold),
                17 => Ok(Operator::LanguageGroup),
                18 => Ok(Operator::ExpansionFactor),
                19 => Ok(Operator::InitialRandomSeed),
                20 => Ok(Operator::SyntheticBase),
                21 => Ok(Operator::PostScript),
                22 => Ok(Operator::BaseFontName),
                23 => Ok(Operator::BaseFontBlend),
                30 => Ok(Operator::ROS),
                31 => Ok(Operator::CIDFontVersion),
                32 => Ok(Operator::CIDFontRevision),
                33 => Ok(Operator::CIDFontType),
                34 => Ok(Operator::CIDCount),
                35 => Ok(Operator::UIDBase),
                36 => Ok(Operator::FDArray),
                37 => Ok(Operator::FDSelect),
                38 => Ok(Operator::FontName),
                _ => Err(ParseError::BadValue),
            }
        } else {
            match value {
                0 => Ok(Operator::Version),
                1 => Ok(Operator::Notice),
                2 => Ok(Operator::FullName),
                3 => Ok(Operator::FamilyName),
                4 => Ok(Operator::Weight),
                5 => Ok(Operator::FontBBox),
                6 => Ok(Operator::BlueValues),
                7 => Ok(Operator::OtherBlues),
                8 => Ok(Operator::FamilyBlues),
                9 => Ok(Operator::FamilyOtherBlues),
                10 => Ok(Operator::StdHW),
                11 => Ok(Operator::StdVW),
                13 => Ok(Operator::UniqueID),
                14 => Ok(Operator::XUID),
                15 => Ok(Operator::Charset),
                16 => Ok(Operator::Encoding),
                17 => Ok(Operator::CharStrings),
                18 => Ok(Operator::Private),
                19 => Ok(Operator::Subrs),
                20 => Ok(Operator::DefaultWidthX),
                21 => Ok(Operator::NominalWidthX),
                _ => Err(ParseError::BadValue),
            }
        }
    }
}

impl Operator {
    /// The conventional name of this operator, as used for DICT keys in dumps.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Version => "version",
            Operator::Notice => "Notice",
            Operator::FullName => "FullName",
            Operator::FamilyName => "FamilyName",
            Operator::Weight => "Weight",
            Operator::FontBBox => "FontBBox",
            Operator::BlueValues => "BlueValues",
            Operator::OtherBlues => "OtherBlues",
            Operator::FamilyBlues => "FamilyBlues",
            Operator::FamilyOtherBlues => "FamilyOtherBlues",
            Operator::StdHW => "StdHW",
            Operator::StdVW => "StdVW",
            Operator::UniqueID => "UniqueID",
            Operator::XUID => "XUID",
            Operator::Charset => "charset",
            Operator::Encoding => "Encoding",
            Operator::CharStrings => "CharStrings",
            Operator::Private => "Private",
            Operator::Subrs => "Subrs",
            Operator::DefaultWidthX => "defaultWidthX",
            Operator::NominalWidthX => "nominalWidthX",
            Operator::Copyright => "Copyright",
            Operator::IsFixedPitch => "isFixedPitch",
            Operator::ItalicAngle => "ItalicAngle",
            Operator::UnderlinePosition => "UnderlinePosition",
            Operator::UnderlineThickness => "UnderlineThickness",
            Operator::PaintType => "PaintType",
            Operator::CharstringType => "CharstringType",
            Operator::FontMatrix => "FontMatrix",
            Operator::StrokeWidth => "StrokeWidth",
            Operator::BlueScale => "BlueScale",
            Operator::BlueShift => "BlueShift",
            Operator::BlueFuzz => "BlueFuzz",
            Operator::StemSnapH => "StemSnapH",
            Operator::StemSnapV => "StemSnapV",
            Operator::ForceBold => "ForceBold",
            Operator::LanguageGroup => "LanguageGroup",
            Operator::ExpansionFactor => "ExpansionFactor",
            Operator::InitialRandomSeed => "initialRandomSeed",
            Operator::SyntheticBase => "SyntheticBase",
            Operator::PostScript => "PostScript",
            Operator::BaseFontName => "BaseFontName",
            Operator::BaseFontBlend => "BaseFontBlend",
            Operator::ROS => "ROS",
            Operator::CIDFontVersion => "CIDFontVersion",
            Operator::CIDFontRevision => "CIDFontRevision",
            Operator::CIDFontType => "CIDFontType",
            Operator::CIDCount => "CIDCount",
            Operator::UIDBase => "UIDBase",
            Operator::FDArray => "FDArray",
            Operator::FDSelect => "FDSelect",
            Operator::FontName => "FontName",
        }
    }

    fn kind(self) -> ValueKind {
        match self {
            Operator::Version
            | Operator::Notice
            | Operator::FullName
            | Operator::FamilyName
            | Operator::Weight
            | Operator::Copyright
            | Operator::PostScript
            | Operator::BaseFontName
            | Operator::FontName => ValueKind::Sid,
            Operator::FontBBox | Operator::XUID | Operator::FontMatrix => ValueKind::Array,
            Operator::BlueValues
            | Operator::OtherBlues
            | Operator::FamilyBlues
            | Operator::FamilyOtherBlues
            | Operator::StemSnapH
            | Operator::StemSnapV
            | Operator::BaseFontBlend => ValueKind::Delta,
            Operator::IsFixedPitch | Operator::ForceBold => ValueKind::Boolean,
            Operator::ROS => ValueKind::Ros,
            Operator::Private => ValueKind::SizeOffset,
            Operator::Charset
            | Operator::CharStrings
            | Operator::Subrs
            | Operator::FDArray
            | Operator::FDSelect => ValueKind::Offset,
            _ => ValueKind::Number,
        }
    }
}

impl Operand {
    pub fn is_offset(&self) -> bool {
        matches!(self, Operand::Offset(_))
    }
}

impl TryFrom<&Operand> for Number {
    type Error = ParseError;

    fn try_from(operand: &Operand) -> Result<Self, Self::Error> {
        match operand {
            Operand::Integer(value) | Operand::Offset(value) => Ok(Number::Integer(*value)),
            Operand::Real(real) => f64::try_from(real).map(Number::Real),
        }
    }
}

impl Number {
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Integer(value) => f64::from(value),
            Number::Real(value) => value,
        }
    }
}

impl std::ops::Add for Number {
    type Output = Number;

    fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => match a.checked_add(b) {
                Some(sum) => Number::Integer(sum),
                None => Number::Real(f64::from(a) + f64::from(b)),
            },
            (a, b) => Number::Real(a.to_f64() + b.to_f64()),
        }
    }
}

impl DictValue {
    fn new(
        operator: Operator,
        operands: &[Operand],
        strings: &IndexedStrings,
    ) -> Result<DictValue, ParseError> {
        let value = match (operator.kind(), operands) {
            (ValueKind::Number, [operand]) => DictValue::Number(Number::try_from(operand)?),
            (ValueKind::Boolean, [Operand::Integer(value)]) => DictValue::Boolean(*value != 0),
            (ValueKind::Sid, [operand]) => {
                DictValue::String(strings.resolve(operand_sid(operand)?)?.to_owned())
            }
            (ValueKind::Array, operands) => DictValue::Array(numbers(operands)?),
            (ValueKind::Delta, operands) => {
                let values = numbers(operands)?
                    .into_iter()
                    .scan(None, |prev: &mut Option<Number>, delta| {
                        let value = prev.map_or(delta, |prev| prev + delta);
                        *prev = Some(value);
                        Some(value)
                    })
                    .collect();
                DictValue::Delta(values)
            }
            (ValueKind::Ros, [registry, ordering, supplement]) => DictValue::Ros {
                registry: strings.resolve(operand_sid(registry)?)?.to_owned(),
                ordering: strings.resolve(operand_sid(ordering)?)?.to_owned(),
                supplement: Number::try_from(supplement)?,
            },
            (ValueKind::SizeOffset, [size, offset]) => DictValue::SizeOffset {
                size: operand_usize(size)?,
                offset: operand_usize(offset)?,
            },
            (ValueKind::Offset, [offset]) => DictValue::Offset(operand_usize(offset)?),
            _ => return Err(ParseError::BadValue),
        };

        Ok(value)
    }
}

fn numbers(operands: &[Operand]) -> Result<Vec<Number>, ParseError> {
    operands.iter().map(Number::try_from).collect()
}

fn operand_usize(operand: &Operand) -> Result<usize, ParseError> {
    match operand {
        Operand::Integer(value) | Operand::Offset(value) => {
            usize::try_from(*value).map_err(|_| ParseError::BadOffset)
        }
        Operand::Real(_) => Err(ParseError::BadValue),
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(value) => write!(f, "{}", value),
            Number::Real(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for DictValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictValue::Number(number) => write!(f, "{}", number),
            DictValue::Boolean(value) => write!(f, "{}", u8::from(*value)),
            DictValue::String(string) => f.write_str(string),
            DictValue::Array(values) | DictValue::Delta(values) => {
                write!(f, "{}", values.iter().join(" "))
            }
            DictValue::Ros {
                registry,
                ordering,
                supplement,
            } => write!(f, "{} {} {}", registry, ordering, supplement),
            DictValue::SizeOffset { size, offset } => write!(f, "{} {}", size, offset),
            DictValue::Offset(offset) => write!(f, "{}", offset),
        }
    }
}
