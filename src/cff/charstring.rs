//! Charstrings: the glyph programs of a CFF font.
//!
//! Charstrings are kept as raw bytes until they are needed. Decompiling one splits it into
//! numbers and operators. The Type 2 format (Adobe Technical Note #5177) needs the stem hint
//! count to know the length of `hintmask` data, which in turn may depend on subroutines, so Type 2
//! charstrings are decompiled by executing them with a `Type2Decompiler`. Outlines are not
//! interpreted.

use std::convert::TryFrom;
use std::fmt::{self, Write};

use log::debug;
use once_cell::sync::OnceCell;

use super::xml::XmlWriter;
use crate::binary::read::{ReadCtxt, ReadScope};
use crate::error::{ParseError, Unsupported};

mod argstack;

pub use argstack::ArgumentsStack;

// Limits according to the Adobe Technical Note #5177 Appendix B.
pub(crate) const STACK_LIMIT: u8 = 10;
pub(crate) const MAX_ARGUMENTS_STACK_LEN: usize = 48;

pub(crate) const TWO_BYTE_OPERATOR_MARK: u8 = 12;

/// The format of the charstrings in a font, selected by the `CharstringType` Top DICT entry.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CharstringType {
    Type1,
    Type2,
}

/// A charstring, decompiled on demand.
#[derive(Debug, Clone)]
pub struct CharString<'a> {
    kind: CharstringType,
    data: &'a [u8],
    program: OnceCell<Vec<Token>>,
}

/// An element of a decompiled charstring.
#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Integer(i32),
    /// A 16.16 fixed point number (Type 2 only)
    Fixed(i32),
    /// An operator. Two byte operators are `12 << 8 | b1`.
    Operator(u16),
    /// The mask bytes following a `hintmask` or `cntrmask` operator.
    Mask(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharStringError {
    ParseError(ParseError),
    InvalidOperator,
    NestingLimitReached,
    ArgumentsStackLimitReached,
    InvalidSubroutineIndex,
}

/// Decompiles Type 2 charstrings, following calls into local and global subroutines.
///
/// The stem hint count is carried across subroutine calls so that `hintmask` data inside
/// subroutines is sized correctly. Call `reset` before each glyph.
pub struct Type2Decompiler<'s, 'a> {
    local_subrs: &'s [CharString<'a>],
    global_subrs: &'s [CharString<'a>],
    local_bias: u16,
    global_bias: u16,
    stack: ArgumentsStack,
    hint_count: usize,
    hint_mask_bytes: usize,
    width_parsed: bool,
}

#[derive(Debug, PartialEq, Copy, Clone)]
enum Flow {
    Continue,
    Return,
    EndChar,
}

impl TryFrom<i32> for CharstringType {
    type Error = ParseError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CharstringType::Type1),
            2 => Ok(CharstringType::Type2),
            _ => Err(ParseError::Unsupported(Unsupported::CharstringType(value))),
        }
    }
}

impl<'a> CharString<'a> {
    pub fn new(kind: CharstringType, data: &'a [u8]) -> Self {
        CharString {
            kind,
            data,
            program: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> CharstringType {
        self.kind
    }

    /// The raw charstring bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn needs_decompilation(&self) -> bool {
        self.program.get().is_none()
    }

    /// The decompiled program, if this charstring has been decompiled.
    pub fn program(&self) -> Option<&[Token]> {
        self.program.get().map(Vec::as_slice)
    }

    /// Decompile this charstring on its own.
    ///
    /// Type 2 charstrings that call subroutines must be decompiled with a `Type2Decompiler`
    /// holding those subroutines instead.
    pub fn decompile(&self) -> Result<&[Token], CharStringError> {
        let program = self.program.get_or_try_init(|| match self.kind {
            CharstringType::Type1 => tokenize_type1(self.data),
            CharstringType::Type2 => {
                let mut decompiler = Type2Decompiler::new(&[], &[]);
                decompiler
                    .tokenize(self.data, 0)
                    .map(|(program, _flow)| program)
            }
        })?;
        Ok(program)
    }

    /// Write the program of this charstring, or its raw bytes if it has not been decompiled.
    pub fn to_xml<W: XmlWriter>(&self, writer: &mut W) -> fmt::Result {
        let program = match self.program.get() {
            Some(program) => program,
            None => {
                let mut hex = String::with_capacity(self.data.len() * 2);
                for byte in self.data {
                    write!(hex, "{:02x}", byte)?;
                }
                writer.write_text(&hex)?;
                return writer.newline();
            }
        };

        let mut line = Vec::new();
        for token in program {
            line.push(self.token_text(token));
            if matches!(token, Token::Operator(_) | Token::Mask(_)) {
                // Masks follow their operator on the same line
                if let Token::Operator(op) = token {
                    if is_mask_operator(self.kind, *op) {
                        continue;
                    }
                }
                writer.write_text(&line.join(" "))?;
                writer.newline()?;
                line.clear();
            }
        }
        if !line.is_empty() {
            writer.write_text(&line.join(" "))?;
            writer.newline()?;
        }

        Ok(())
    }

    fn token_text(&self, token: &Token) -> String {
        match token {
            Token::Integer(value) => value.to_string(),
            Token::Fixed(value) => (f64::from(*value) / 65536.0).to_string(),
            Token::Operator(op) => operator_name(self.kind, *op)
                .unwrap_or("unknown")
                .to_string(),
            Token::Mask(bytes) => bytes.iter().map(|byte| format!("{:08b}", byte)).collect(),
        }
    }
}

impl<'s, 'a> Type2Decompiler<'s, 'a> {
    pub fn new(local_subrs: &'s [CharString<'a>], global_subrs: &'s [CharString<'a>]) -> Self {
        Type2Decompiler {
            local_subrs,
            global_subrs,
            local_bias: calc_subroutine_bias(local_subrs.len()),
            global_bias: calc_subroutine_bias(global_subrs.len()),
            stack: ArgumentsStack::new(),
            hint_count: 0,
            hint_mask_bytes: 0,
            width_parsed: false,
        }
    }

    /// Clear the state left by the previous charstring.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.hint_count = 0;
        self.hint_mask_bytes = 0;
        self.width_parsed = false;
    }

    /// Decompile `char_string` and every subroutine it calls.
    pub fn execute(&mut self, char_string: &CharString<'a>) -> Result<(), CharStringError> {
        self.execute_at_depth(char_string, 0).map(|_flow| ())
    }

    fn execute_at_depth(
        &mut self,
        char_string: &CharString<'a>,
        depth: u8,
    ) -> Result<Flow, CharStringError> {
        if char_string.kind == CharstringType::Type1 {
            char_string.decompile()?;
            return Ok(Flow::Continue);
        }

        // Already decompiled programs are replayed to keep the stack and hint count current
        if let Some(program) = char_string.program.get() {
            return self.run(program, depth);
        }

        let (program, flow) = self.tokenize(char_string.data, depth)?;
        // If another thread got there first its program is identical
        let _ = char_string.program.set(program);
        Ok(flow)
    }

    fn run(&mut self, program: &[Token], depth: u8) -> Result<Flow, CharStringError> {
        for token in program {
            match token {
                Token::Integer(value) => self.stack.push(*value as f32)?,
                Token::Fixed(value) => self.stack.push(fixed_to_f32(*value))?,
                Token::Operator(op) => match self.operator(*op, depth)? {
                    Flow::Continue => {}
                    flow => return Ok(flow),
                },
                Token::Mask(_) => {}
            }
        }

        Ok(Flow::Continue)
    }

    fn tokenize(&mut self, data: &[u8], depth: u8) -> Result<(Vec<Token>, Flow), CharStringError> {
        let mut s = ReadScope::new(data).ctxt();
        let mut program = Vec::new();

        while s.bytes_available() {
            let b0 = s.read_u8()?;
            let op = match b0 {
                operator::SHORT_INT => {
                    let n = i32::from(s.read_i16be()?);
                    self.stack.push(n as f32)?;
                    program.push(Token::Integer(n));
                    continue;
                }
                32..=254 => {
                    let n = read_number(b0, &mut s)?;
                    self.stack.push(n as f32)?;
                    program.push(Token::Integer(n));
                    continue;
                }
                operator::FIXED_16_16 => {
                    let n = s.read_i32be()?;
                    self.stack.push(fixed_to_f32(n))?;
                    program.push(Token::Fixed(n));
                    continue;
                }
                TWO_BYTE_OPERATOR_MARK => op2(s.read_u8()?),
                _ => u16::from(b0),
            };

            if type2_operator_name(op).is_none() {
                return Err(CharStringError::InvalidOperator);
            }
            program.push(Token::Operator(op));
            let flow = self.operator(op, depth)?;
            if is_mask_operator(CharstringType::Type2, op) {
                let mask = s.read_slice(self.hint_mask_bytes)?;
                program.push(Token::Mask(mask.to_vec()));
            }
            if flow != Flow::Continue {
                return Ok((program, flow));
            }
        }

        Ok((program, Flow::Continue))
    }

    fn operator(&mut self, op: u16, depth: u8) -> Result<Flow, CharStringError> {
        match op {
            operator::HORIZONTAL_STEM
            | operator::VERTICAL_STEM
            | operator::HORIZONTAL_STEM_HINT_MASK
            | operator::VERTICAL_STEM_HINT_MASK => {
                self.count_hints();
                Ok(Flow::Continue)
            }
            operator::HINT_MASK | operator::COUNTER_MASK => {
                // The first mask may be preceded by the operands of an implicit vstem
                if self.hint_mask_bytes == 0 {
                    self.count_hints();
                    self.hint_mask_bytes = (self.hint_count + 7) / 8;
                }
                self.stack.clear();
                Ok(Flow::Continue)
            }
            operator::CALL_LOCAL_SUBROUTINE => {
                let subrs = self.local_subrs;
                self.call_subroutine(subrs, self.local_bias, depth)
            }
            operator::CALL_GLOBAL_SUBROUTINE => {
                let subrs = self.global_subrs;
                self.call_subroutine(subrs, self.global_bias, depth)
            }
            operator::RETURN => Ok(Flow::Return),
            operator::ENDCHAR => {
                self.stack.clear();
                Ok(Flow::EndChar)
            }
            _ => {
                self.width_parsed = true;
                self.stack.clear();
                Ok(Flow::Continue)
            }
        }
    }

    fn call_subroutine(
        &mut self,
        subrs: &'s [CharString<'a>],
        bias: u16,
        depth: u8,
    ) -> Result<Flow, CharStringError> {
        if depth == STACK_LIMIT {
            return Err(CharStringError::NestingLimitReached);
        }

        let index = self
            .stack
            .pop()
            .and_then(|index| i32::try_num_from(index))
            .and_then(|index| conv_subroutine_index(index, bias))
            .ok_or(CharStringError::InvalidSubroutineIndex)?;
        let subr = subrs
            .get(index)
            .ok_or(CharStringError::InvalidSubroutineIndex)?;
        debug!("decompiling subroutine {} at depth {}", index, depth + 1);
        match self.execute_at_depth(subr, depth + 1)? {
            Flow::EndChar => Ok(Flow::EndChar),
            Flow::Continue | Flow::Return => Ok(Flow::Continue),
        }
    }

    fn count_hints(&mut self) {
        let mut len = self.stack.len();
        // If the stack length is uneven, then the first value is a `width`.
        if len.is_odd() && !self.width_parsed {
            len -= 1;
        }
        self.width_parsed = true;
        self.hint_count += len >> 1;
        self.stack.clear();
    }
}

fn tokenize_type1(data: &[u8]) -> Result<Vec<Token>, CharStringError> {
    let mut s = ReadScope::new(data).ctxt();
    let mut program = Vec::new();

    while s.bytes_available() {
        let b0 = s.read_u8()?;
        let token = match b0 {
            32..=254 => Token::Integer(read_number(b0, &mut s)?),
            // Type 1 uses 255 for a 32-bit integer rather than a fixed point number
            255 => Token::Integer(s.read_i32be()?),
            TWO_BYTE_OPERATOR_MARK => Token::Operator(op2(s.read_u8()?)),
            _ => Token::Operator(u16::from(b0)),
        };
        if let Token::Operator(op) = token {
            if type1_operator_name(op).is_none() {
                return Err(CharStringError::InvalidOperator);
            }
        }
        program.push(token);
    }

    Ok(program)
}

// Numbers shared by Type 1 and Type 2 charstrings
fn read_number(b0: u8, s: &mut ReadCtxt<'_>) -> Result<i32, ParseError> {
    match b0 {
        32..=246 => Ok(i32::from(b0) - 139),
        247..=250 => {
            let b1 = s.read_u8()?;
            Ok((i32::from(b0) - 247) * 256 + i32::from(b1) + 108)
        }
        251..=254 => {
            let b1 = s.read_u8()?;
            Ok(-(i32::from(b0) - 251) * 256 - i32::from(b1) - 108)
        }
        _ => Err(ParseError::BadValue),
    }
}

fn fixed_to_f32(value: i32) -> f32 {
    (f64::from(value) / 65536.0) as f32
}

const fn op2(value: u8) -> u16 {
    (12 << 8) | (value as u16)
}

fn is_mask_operator(kind: CharstringType, op: u16) -> bool {
    kind == CharstringType::Type2 && (op == operator::HINT_MASK || op == operator::COUNTER_MASK)
}

// Conversions from biased subr index operands to unbiased value
pub(crate) fn conv_subroutine_index(index: i32, bias: u16) -> Option<usize> {
    let bias = i32::from(bias);

    let index = index.checked_add(bias)?;
    usize::try_from(index).ok()
}

// Adobe Technical Note #5176, Chapter 16 "Local / Global Subrs INDEXes"
pub(crate) fn calc_subroutine_bias(len: usize) -> u16 {
    if len < 1240 {
        107
    } else if len < 33900 {
        1131
    } else {
        32768
    }
}

pub(crate) trait IsEven {
    fn is_even(&self) -> bool;
    fn is_odd(&self) -> bool;
}

impl IsEven for usize {
    fn is_even(&self) -> bool {
        (*self) & 1 == 0
    }

    fn is_odd(&self) -> bool {
        !self.is_even()
    }
}

/// Just like TryFrom<N>, but for numeric types not supported by the Rust's std.
pub(crate) trait TryNumFrom<T>: Sized {
    /// Casts between numeric types.
    fn try_num_from(_: T) -> Option<Self>;
}

impl TryNumFrom<f32> for i32 {
    fn try_num_from(v: f32) -> Option<Self> {
        // Float as int truncates toward zero, so we want to allow values
        // in the exclusive range `(MIN-1, MAX+1)`.
        const MIN: f32 = i32::MIN as f32;
        // We can't represent `MAX` exactly, but it will round up to exactly
        // `MAX+1` (a power of two) when we cast it.
        const MAX_P1: f32 = i32::MAX as f32;
        if v >= MIN && v < MAX_P1 {
            Some(v as i32)
        } else {
            None
        }
    }
}

/// The name of a charstring operator in the given format.
pub fn operator_name(kind: CharstringType, op: u16) -> Option<&'static str> {
    match kind {
        CharstringType::Type1 => type1_operator_name(op),
        CharstringType::Type2 => type2_operator_name(op),
    }
}

fn type2_operator_name(op: u16) -> Option<&'static str> {
    let name = match op {
        operator::HORIZONTAL_STEM => "hstem",
        operator::VERTICAL_STEM => "vstem",
        operator::VERTICAL_MOVE_TO => "vmoveto",
        operator::LINE_TO => "rlineto",
        operator::HORIZONTAL_LINE_TO => "hlineto",
        operator::VERTICAL_LINE_TO => "vlineto",
        operator::CURVE_TO => "rrcurveto",
        operator::CALL_LOCAL_SUBROUTINE => "callsubr",
        operator::RETURN => "return",
        operator::ENDCHAR => "endchar",
        operator::HORIZONTAL_STEM_HINT_MASK => "hstemhm",
        operator::HINT_MASK => "hintmask",
        operator::COUNTER_MASK => "cntrmask",
        operator::MOVE_TO => "rmoveto",
        operator::HORIZONTAL_MOVE_TO => "hmoveto",
        operator::VERTICAL_STEM_HINT_MASK => "vstemhm",
        operator::CURVE_LINE => "rcurveline",
        operator::LINE_CURVE => "rlinecurve",
        operator::VV_CURVE_TO => "vvcurveto",
        operator::HH_CURVE_TO => "hhcurveto",
        operator::CALL_GLOBAL_SUBROUTINE => "callgsubr",
        operator::VH_CURVE_TO => "vhcurveto",
        operator::HV_CURVE_TO => "hvcurveto",
        operator::DOTSECTION => "dotsection",
        operator::AND => "and",
        operator::OR => "or",
        operator::NOT => "not",
        operator::ABS => "abs",
        operator::ADD => "add",
        operator::SUB => "sub",
        operator::DIV => "div",
        operator::NEG => "neg",
        operator::EQ => "eq",
        operator::DROP => "drop",
        operator::PUT => "put",
        operator::GET => "get",
        operator::IFELSE => "ifelse",
        operator::RANDOM => "random",
        operator::MUL => "mul",
        operator::SQRT => "sqrt",
        operator::DUP => "dup",
        operator::EXCH => "exch",
        operator::INDEX => "index",
        operator::ROLL => "roll",
        operator::HFLEX => "hflex",
        operator::FLEX => "flex",
        operator::HFLEX1 => "hflex1",
        operator::FLEX1 => "flex1",
        _ => return None,
    };
    Some(name)
}

fn type1_operator_name(op: u16) -> Option<&'static str> {
    let name = match op {
        operator::HORIZONTAL_STEM => "hstem",
        operator::VERTICAL_STEM => "vstem",
        operator::VERTICAL_MOVE_TO => "vmoveto",
        operator::LINE_TO => "rlineto",
        operator::HORIZONTAL_LINE_TO => "hlineto",
        operator::VERTICAL_LINE_TO => "vlineto",
        operator::CURVE_TO => "rrcurveto",
        operator::type1::CLOSE_PATH => "closepath",
        operator::CALL_LOCAL_SUBROUTINE => "callsubr",
        operator::RETURN => "return",
        operator::type1::HSBW => "hsbw",
        operator::ENDCHAR => "endchar",
        operator::MOVE_TO => "rmoveto",
        operator::HORIZONTAL_MOVE_TO => "hmoveto",
        operator::VH_CURVE_TO => "vhcurveto",
        operator::HV_CURVE_TO => "hvcurveto",
        operator::DOTSECTION => "dotsection",
        operator::type1::VSTEM3 => "vstem3",
        operator::type1::HSTEM3 => "hstem3",
        operator::type1::SEAC => "seac",
        operator::type1::SBW => "sbw",
        operator::DIV => "div",
        operator::type1::CALL_OTHER_SUBR => "callothersubr",
        operator::type1::POP => "pop",
        operator::type1::SET_CURRENT_POINT => "setcurrentpoint",
        _ => return None,
    };
    Some(name)
}

impl From<ParseError> for CharStringError {
    fn from(error: ParseError) -> CharStringError {
        CharStringError::ParseError(error)
    }
}

impl From<crate::binary::read::ReadEof> for CharStringError {
    fn from(error: crate::binary::read::ReadEof) -> CharStringError {
        CharStringError::ParseError(ParseError::from(error))
    }
}

impl fmt::Display for CharStringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharStringError::ParseError(parse_error) => {
                write!(f, "parse error: ")?;
                parse_error.fmt(f)
            }
            CharStringError::InvalidOperator => write!(f, "an invalid operator occurred"),
            CharStringError::NestingLimitReached => write!(f, "subroutines nesting limit reached"),
            CharStringError::ArgumentsStackLimitReached => {
                write!(f, "arguments stack limit reached")
            }
            CharStringError::InvalidSubroutineIndex => write!(f, "an invalid subroutine index"),
        }
    }
}

impl std::error::Error for CharStringError {}

/// Operators defined in Adobe Technical Note #5177, The Type 2 Charstring Format.
pub(crate) mod operator {
    use super::op2;

    pub const HORIZONTAL_STEM: u16 = 1;
    pub const VERTICAL_STEM: u16 = 3;
    pub const VERTICAL_MOVE_TO: u16 = 4;
    pub const LINE_TO: u16 = 5;
    pub const HORIZONTAL_LINE_TO: u16 = 6;
    pub const VERTICAL_LINE_TO: u16 = 7;
    pub const CURVE_TO: u16 = 8;
    pub const CALL_LOCAL_SUBROUTINE: u16 = 10;
    pub const RETURN: u16 = 11;
    pub const ENDCHAR: u16 = 14;
    pub const HORIZONTAL_STEM_HINT_MASK: u16 = 18;
    pub const HINT_MASK: u16 = 19;
    pub const COUNTER_MASK: u16 = 20;
    pub const MOVE_TO: u16 = 21;
    pub const HORIZONTAL_MOVE_TO: u16 = 22;
    pub const VERTICAL_STEM_HINT_MASK: u16 = 23;
    pub const CURVE_LINE: u16 = 24;
    pub const LINE_CURVE: u16 = 25;
    pub const VV_CURVE_TO: u16 = 26;
    pub const HH_CURVE_TO: u16 = 27;
    pub const SHORT_INT: u8 = 28;
    pub const CALL_GLOBAL_SUBROUTINE: u16 = 29;
    pub const VH_CURVE_TO: u16 = 30;
    pub const HV_CURVE_TO: u16 = 31;
    pub const FIXED_16_16: u8 = 255;

    pub const DOTSECTION: u16 = op2(0);
    pub const AND: u16 = op2(3);
    pub const OR: u16 = op2(4);
    pub const NOT: u16 = op2(5);
    pub const ABS: u16 = op2(9);
    pub const ADD: u16 = op2(10);
    pub const SUB: u16 = op2(11);
    pub const DIV: u16 = op2(12);
    pub const NEG: u16 = op2(14);
    pub const EQ: u16 = op2(15);
    pub const DROP: u16 = op2(18);
    pub const PUT: u16 = op2(20);
    pub const GET: u16 = op2(21);
    pub const IFELSE: u16 = op2(22);
    pub const RANDOM: u16 = op2(23);
    pub const MUL: u16 = op2(24);
    pub const SQRT: u16 = op2(26);
    pub const DUP: u16 = op2(27);
    pub const EXCH: u16 = op2(28);
    pub const INDEX: u16 = op2(29);
    pub const ROLL: u16 = op2(30);
    pub const HFLEX: u16 = op2(34);
    pub const FLEX: u16 = op2(35);
    pub const HFLEX1: u16 = op2(36);
    pub const FLEX1: u16 = op2(37);

    /// Operators only found in Type 1 charstrings
    pub mod type1 {
        use super::op2;

        pub const CLOSE_PATH: u16 = 9;
        pub const HSBW: u16 = 13;
        pub const VSTEM3: u16 = op2(1);
        pub const HSTEM3: u16 = op2(2);
        pub const SEAC: u16 = op2(6);
        pub const SBW: u16 = op2(7);
        pub const CALL_OTHER_SUBR: u16 = op2(16);
        pub const POP: u16 = op2(17);
        pub const SET_CURRENT_POINT: u16 = op2(33);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cff::xml::XmlTextWriter;

    #[test]
    fn test_charstring_type() {
        assert_eq!(CharstringType::try_from(1), Ok(CharstringType::Type1));
        assert_eq!(CharstringType::try_from(2), Ok(CharstringType::Type2));
        assert_eq!(
            CharstringType::try_from(3),
            Err(ParseError::Unsupported(Unsupported::CharstringType(3)))
        );
    }

    #[test]
    fn test_subroutine_bias() {
        assert_eq!(calc_subroutine_bias(0), 107);
        assert_eq!(calc_subroutine_bias(1239), 107);
        assert_eq!(calc_subroutine_bias(1240), 1131);
        assert_eq!(calc_subroutine_bias(33899), 1131);
        assert_eq!(calc_subroutine_bias(33900), 32768);
        assert_eq!(conv_subroutine_index(-107, 107), Some(0));
        assert_eq!(conv_subroutine_index(-108, 107), None);
    }

    #[test]
    fn test_decompile_type2() {
        // 100 -100 rmoveto 50 hlineto endchar
        let data = [0xef, 0x27, 21, 0xbd, 6, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);
        assert!(char_string.needs_decompilation());
        assert_eq!(
            char_string.decompile().unwrap(),
            &[
                Token::Integer(100),
                Token::Integer(-100),
                Token::Operator(operator::MOVE_TO),
                Token::Integer(50),
                Token::Operator(operator::HORIZONTAL_LINE_TO),
                Token::Operator(operator::ENDCHAR),
            ]
        );
        assert!(!char_string.needs_decompilation());
    }

    #[test]
    fn test_decompile_type2_fixed() {
        // 1.5 as 16.16 fixed, then hmoveto
        let data = [255, 0x00, 0x01, 0x80, 0x00, 22];
        let char_string = CharString::new(CharstringType::Type2, &data);
        assert_eq!(
            char_string.decompile().unwrap(),
            &[
                Token::Fixed(0x18000),
                Token::Operator(operator::HORIZONTAL_MOVE_TO)
            ]
        );
    }

    #[test]
    fn test_decompile_type1() {
        // 0 500 hsbw 100000 callothersubr (255 is a 32-bit integer in Type 1)
        let data = [0x8b, 248, 136, 13, 255, 0x00, 0x01, 0x86, 0xa0, 12, 16];
        let char_string = CharString::new(CharstringType::Type1, &data);
        assert_eq!(
            char_string.decompile().unwrap(),
            &[
                Token::Integer(0),
                Token::Integer(500),
                Token::Operator(operator::type1::HSBW),
                Token::Integer(100000),
                Token::Operator(operator::type1::CALL_OTHER_SUBR),
            ]
        );
    }

    #[test]
    fn test_invalid_operator() {
        let data = [2];
        let char_string = CharString::new(CharstringType::Type2, &data);
        assert_eq!(
            char_string.decompile(),
            Err(CharStringError::InvalidOperator)
        );
        assert!(char_string.needs_decompilation());
    }

    #[test]
    fn test_hintmask_counts_stems() {
        // width 10 20 hstemhm, 30 40 50 60 implicit vstem, hintmask with 3 stems = 1 byte
        let data = [
            0x8c, 0x95, 0x9f, 18, 0xa9, 0xb3, 0xbd, 0xc7, 19, 0b1110_0000, 14,
        ];
        let char_string = CharString::new(CharstringType::Type2, &data);
        let mut decompiler = Type2Decompiler::new(&[], &[]);
        decompiler.execute(&char_string).unwrap();
        let program = char_string.program().unwrap();
        assert_eq!(
            &program[program.len() - 3..],
            &[
                Token::Operator(operator::HINT_MASK),
                Token::Mask(vec![0b1110_0000]),
                Token::Operator(operator::ENDCHAR),
            ]
        );
    }

    #[test]
    fn test_hintmask_across_subroutine() {
        // Subroutine 0 declares 9 stems, so the mask in the charstring is 2 bytes
        let subr_data = [
            0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b, 0x8b,
            0x8b, 0x8b, 0x8b, 0x8b, 18, 11,
        ];
        let local_subrs = [CharString::new(CharstringType::Type2, &subr_data)];
        // -107 callsubr hintmask <2 bytes> endchar
        let data = [0x20, 10, 19, 0xFF, 0x80, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);

        let mut decompiler = Type2Decompiler::new(&local_subrs, &[]);
        decompiler.execute(&char_string).unwrap();
        assert!(!local_subrs[0].needs_decompilation());
        assert_eq!(
            char_string.program().unwrap(),
            &[
                Token::Integer(-107),
                Token::Operator(operator::CALL_LOCAL_SUBROUTINE),
                Token::Operator(operator::HINT_MASK),
                Token::Mask(vec![0xFF, 0x80]),
                Token::Operator(operator::ENDCHAR),
            ]
        );

        // A cached subroutine is replayed for the next glyph
        let other = CharString::new(CharstringType::Type2, &data);
        decompiler.reset();
        decompiler.execute(&other).unwrap();
        assert_eq!(other.program(), char_string.program());
    }

    #[test]
    fn test_global_subroutine() {
        let global_data = [0xef, 0xef, 21, 11];
        let global_subrs = [CharString::new(CharstringType::Type2, &global_data)];
        let data = [0x20, 29, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);
        let mut decompiler = Type2Decompiler::new(&[], &global_subrs);
        decompiler.execute(&char_string).unwrap();
        assert_eq!(
            global_subrs[0].program().unwrap(),
            &[
                Token::Integer(100),
                Token::Integer(100),
                Token::Operator(operator::MOVE_TO),
                Token::Operator(operator::RETURN),
            ]
        );
    }

    #[test]
    fn test_invalid_subroutine_index() {
        let data = [0x21, 10, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);
        let mut decompiler = Type2Decompiler::new(&[], &[]);
        assert_eq!(
            decompiler.execute(&char_string),
            Err(CharStringError::InvalidSubroutineIndex)
        );

        let empty_stack = [10];
        let char_string = CharString::new(CharstringType::Type2, &empty_stack);
        assert_eq!(
            decompiler.execute(&char_string),
            Err(CharStringError::InvalidSubroutineIndex)
        );
    }

    #[test]
    fn test_nesting_limit() {
        // Subroutine 0 calls itself forever
        let subr_data = [0x20, 10, 11];
        let local_subrs = [CharString::new(CharstringType::Type2, &subr_data)];
        let data = [0x20, 10, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);
        let mut decompiler = Type2Decompiler::new(&local_subrs, &[]);
        assert_eq!(
            decompiler.execute(&char_string),
            Err(CharStringError::NestingLimitReached)
        );
    }

    #[test]
    fn test_arguments_stack_limit() {
        let data = [0x8b; MAX_ARGUMENTS_STACK_LEN + 1];
        let char_string = CharString::new(CharstringType::Type2, &data);
        assert_eq!(
            char_string.decompile(),
            Err(CharStringError::ArgumentsStackLimitReached)
        );
    }

    #[test]
    fn test_to_xml() {
        let data = [0xef, 0x27, 21, 14];
        let char_string = CharString::new(CharstringType::Type2, &data);

        let mut writer = XmlTextWriter::new(String::new());
        char_string.to_xml(&mut writer).unwrap();
        assert_eq!(writer.into_inner(), "ef27150e\n");

        char_string.decompile().unwrap();
        let mut writer = XmlTextWriter::new(String::new());
        char_string.to_xml(&mut writer).unwrap();
        assert_eq!(writer.into_inner(), "100 -100 rmoveto\nendchar\n");
    }
}
