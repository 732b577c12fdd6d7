//! The CFF String INDEX and the standard strings.
//!
//! Strings in CFF data are referenced by String ID (SID). The first 391 SIDs name the standard
//! strings listed in Appendix A of Technical Note #5176. Higher SIDs index into the String INDEX
//! of the font set.

use std::convert::TryFrom;

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use super::index::Index;
use crate::binary::read::{ReadBinary, ReadCtxt};
use crate::error::{ParseError, WriteError};

/// A string id in the font
pub type SID = u16;

/// The number of standard strings.
pub const N_STD_STRINGS: usize = STANDARD_STRINGS.len();

lazy_static! {
    static ref STANDARD_STRING_SIDS: FxHashMap<&'static str, SID> = STANDARD_STRINGS
        .iter()
        .enumerate()
        // NOTE(unwrap): there are only 391 standard strings
        .map(|(sid, string)| (*string, SID::try_from(sid).unwrap()))
        .collect();
}

/// The strings of a font set, addressed by SID.
///
/// The reverse mapping from string to SID is built when the table is constructed and kept up to
/// date by `intern`, so lookups never mutate the table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexedStrings {
    strings: Vec<String>,
    sids: FxHashMap<String, SID>,
}

impl IndexedStrings {
    /// Create an empty table, containing only the standard strings.
    pub fn new() -> Self {
        IndexedStrings::default()
    }

    /// Create a table from the custom strings of a String INDEX, in order.
    pub fn from_strings(strings: Vec<String>) -> Result<Self, ParseError> {
        let mut sids = FxHashMap::default();
        for (index, string) in strings.iter().enumerate() {
            let sid = SID::try_from(N_STD_STRINGS + index)?;
            // Keep the first SID if a string occurs more than once
            sids.entry(string.clone()).or_insert(sid);
        }

        Ok(IndexedStrings { strings, sids })
    }

    /// Returns the string with the given SID.
    pub fn resolve(&self, sid: SID) -> Result<&str, ParseError> {
        let sid = usize::from(sid);
        // When the client needs to determine the string that corresponds to a particular SID it
        // performs the following: test if SID is in standard range then fetch from internal
        // table, otherwise, fetch string from the String INDEX using a value of
        // (SID – nStdStrings) as the index
        match STANDARD_STRINGS.get(sid) {
            Some(string) => Ok(string),
            None => self
                .strings
                .get(sid - N_STD_STRINGS)
                .map(String::as_str)
                .ok_or(ParseError::BadIndex),
        }
    }

    /// Returns the SID of `string` if it is a standard string or already in this table.
    pub fn sid(&self, string: &str) -> Option<SID> {
        STANDARD_STRING_SIDS
            .get(string)
            .or_else(|| self.sids.get(string))
            .copied()
    }

    /// Returns the SID of `string`, appending it to the custom strings if not already present.
    ///
    /// Standard strings are never added to the custom strings.
    pub fn intern(&mut self, string: &str) -> Result<SID, WriteError> {
        if let Some(sid) = self.sid(string) {
            return Ok(sid);
        }

        let sid = SID::try_from(N_STD_STRINGS + self.strings.len())?;
        self.strings.push(string.to_owned());
        self.sids.insert(string.to_owned(), sid);
        Ok(sid)
    }

    /// The custom strings, in SID order.
    pub fn custom_strings(&self) -> &[String] {
        &self.strings
    }

    /// The number of custom strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl ReadBinary for IndexedStrings {
    type HostType<'a> = Self;

    fn read(ctxt: &mut ReadCtxt<'_>) -> Result<Self, ParseError> {
        let index = ctxt.read::<Index<'_>>()?;
        let strings = index
            .iter()
            .map(decode_latin1)
            .collect::<Vec<_>>();
        IndexedStrings::from_strings(strings)
    }
}

/// Decode a string from the font data.
///
/// CFF strings are bytes, commonly ISO 8859-1, so each byte maps to the code point of the same
/// value. This never fails and round-trips through `encode_latin1`.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encode a string for writing into the font data.
///
/// Fails if the string holds a character above U+00FF.
pub fn encode_latin1(string: &str) -> Result<Vec<u8>, WriteError> {
    string
        .chars()
        .map(|c| u8::try_from(c).map_err(|_| WriteError::BadValue))
        .collect()
}

// The 391 Standard Strings as used in the CFF format.
// From Adobe Technical Note #5176, Appendix A.
pub(crate) const STANDARD_STRINGS: [&str; 391] = [
    ".notdef",
    "space",
    "exclam",
    "quotedbl",
    "numbersign",
    "dollar",
    "percent",
    "ampersand",
    "quoteright",
    "parenleft",
    "parenright",
    "asterisk",
    "plus",
    "comma",
    "hyphen",
    "period",
    "slash",
    "zero",
    "one",
    "two",
    "three",
    "four",
    "five",
    "six",
    "seven",
    "eight",
    "nine",
    "colon",
    "semicolon",
    "less",
    "equal",
    "greater",
    "question",
    "at",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "H",
    "I",
    "J",
    "K",
    "L",
    "M",
    "N",
    "O",
    "P",
    "Q",
    "R",
    "S",
    "T",
    "U",
    "V",
    "W",
    "X",
    "Y",
    "Z",
    "bracketleft",
    "backslash",
    "bracketright",
    "asciicircum",
    "underscore",
    "quoteleft",
    "a",
    "b",
    "c",
    "d",
    "e",
    "f",
    "g",
    "h",
    "i",
    "j",
    "k",
    "l",
    "m",
    "n",
    "o",
    "p",
    "q",
    "r",
    "s",
    "t",
    "u",
    "v",
    "w",
    "x",
    "y",
    "z",
    "braceleft",
    "bar",
    "braceright",
    "asciitilde",
    "exclamdown",
    "cent",
    "sterling",
    "fraction",
    "yen",
    "florin",
    "section",
    "currency",
    "quotesingle",
    "quotedblleft",
    "guillemotleft",
    "guilsinglleft",
    "guilsinglright",
    "fi",
    "fl",
    "endash",
    "dagger",
    "daggerdbl",
    "periodcentered",
    "paragraph",
    "bullet",
    "quotesinglbase",
    "quotedblbase",
    "quotedblright",
    "guillemotright",
    "ellipsis",
    "perthousand",
    "questiondown",
    "grave",
    "acute",
    "circumflex",
    "tilde",
    "macron",
    "breve",
    "dotaccent",
    "dieresis",
    "ring",
    "cedilla",
    "hungarumlaut",
    "ogonek",
    "caron",
    "emdash",
    "AE",
    "ordfeminine",
    "Lslash",
    "Oslash",
    "OE",
    "ordmasculine",
    "ae",
    "dotlessi",
    "lslash",
    "oslash",
    "oe",
    "germandbls",
    "onesuperior",
    "logicalnot",
    "mu",
    "trademark",
    "Eth",
    "onehalf",
    "plusminus",
    "Thorn",
    "onequarter",
    "divide",
    "brokenbar",
    "degree",
    "thorn",
    "threequarters",
    "twosuperior",
    "registered",
    "minus",
    "eth",
    "multiply",
    "threesuperior",
    "copyright",
    "Aacute",
    "Acircumflex",
    "Adieresis",
    "Agrave",
    "Aring",
    "Atilde",
    "Ccedilla",
    "Eacute",
    "Ecircumflex",
    "Edieresis",
    "Egrave",
    "Iacute",
    "Icircumflex",
    "Idieresis",
    "Igrave",
    "Ntilde",
    "Oacute",
    "Ocircumflex",
    "Odieresis",
    "Ograve",
    "Otilde",
    "Scaron",
    "Uacute",
    "Ucircumflex",
    "Udieresis",
    "Ugrave",
    "Yacute",
    "Ydieresis",
    "Zcaron",
    "aacute",
    "acircumflex",
    "adieresis",
    "agrave",
    "aring",
    "atilde",
    "ccedilla",
    "eacute",
    "ecircumflex",
    "edieresis",
    "egrave",
    "iacute",
    "icircumflex",
    "idieresis",
    "igrave",
    "ntilde",
    "oacute",
    "ocircumflex",
    "odieresis",
    "ograve",
    "otilde",
    "scaron",
    "uacute",
    "ucircumflex",
    "udieresis",
    "ugrave",
    "yacute",
    "ydieresis",
    "zcaron",
    "exclamsmall",
    "Hungarumlautsmall",
    "dollaroldstyle",
    "dollarsuperior",
    "ampersandsmall",
    "Acutesmall",
    "parenleftsuperior",
    "parenrightsuperior",
    "twodotenleader",
    "onedotenleader",
    "zerooldstyle",
    "oneoldstyle",
    "twooldstyle",
    "threeoldstyle",
    "fouroldstyle",
    "fiveoldstyle",
    "sixoldstyle",
    "sevenoldstyle",
    "eightoldstyle",
    "nineoldstyle",
    "commasuperior",
    "threequartersemdash",
    "periodsuperior",
    "questionsmall",
    "asuperior",
    "bsuperior",
    "centsuperior",
    "dsuperior",
    "esuperior",
    "isuperior",
    "lsuperior",
    "msuperior",
    "nsuperior",
    "osuperior",
    "rsuperior",
    "ssuperior",
    "tsuperior",
    "ff",
    "ffi",
    "ffl",
    "parenleftinferior",
    "parenrightinferior",
    "Circumflexsmall",
    "hyphensuperior",
    "Gravesmall",
    "Asmall",
    "Bsmall",
    "Csmall",
    "Dsmall",
    "Esmall",
    "Fsmall",
    "Gsmall",
    "Hsmall",
    "Ismall",
    "Jsmall",
    "Ksmall",
    "Lsmall",
    "Msmall",
    "Nsmall",
    "Osmall",
    "Psmall",
    "Qsmall",
    "Rsmall",
    "Ssmall",
    "Tsmall",
    "Usmall",
    "Vsmall",
    "Wsmall",
    "Xsmall",
    "Ysmall",
    "Zsmall",
    "colonmonetary",
    "onefitted",
    "rupiah",
    "Tildesmall",
    "exclamdownsmall",
    "centoldstyle",
    "Lslashsmall",
    "Scaronsmall",
    "Zcaronsmall",
    "Dieresissmall",
    "Brevesmall",
    "Caronsmall",
    "Dotaccentsmall",
    "Macronsmall",
    "figuredash",
    "hypheninferior",
    "Ogoneksmall",
    "Ringsmall",
    "Cedillasmall",
    "questiondownsmall",
    "oneeighth",
    "threeeighths",
    "fiveeighths",
    "seveneighths",
    "onethird",
    "twothirds",
    "zerosuperior",
    "foursuperior",
    "fivesuperior",
    "sixsuperior",
    "sevensuperior",
    "eightsuperior",
    "ninesuperior",
    "zeroinferior",
    "oneinferior",
    "twoinferior",
    "threeinferior",
    "fourinferior",
    "fiveinferior",
    "sixinferior",
    "seveninferior",
    "eightinferior",
    "nineinferior",
    "centinferior",
    "dollarinferior",
    "periodinferior",
    "commainferior",
    "Agravesmall",
    "Aacutesmall",
    "Acircumflexsmall",
    "Atildesmall",
    "Adieresissmall",
    "Aringsmall",
    "AEsmall",
    "Ccedillasmall",
    "Egravesmall",
    "Eacutesmall",
    "Ecircumflexsmall",
    "Edieresissmall",
    "Igravesmall",
    "Iacutesmall",
    "Icircumflexsmall",
    "Idieresissmall",
    "Ethsmall",
    "Ntildesmall",
    "Ogravesmall",
    "Oacutesmall",
    "Ocircumflexsmall",
    "Otildesmall",
    "Odieresissmall",
    "OEsmall",
    "Oslashsmall",
    "Ugravesmall",
    "Uacutesmall",
    "Ucircumflexsmall",
    "Udieresissmall",
    "Yacutesmall",
    "Thornsmall",
    "Ydieresissmall",
    "001.000",
    "001.001",
    "001.002",
    "001.003",
    "Black",
    "Bold",
    "Book",
    "Light",
    "Medium",
    "Regular",
    "Roman",
    "Semibold",
];
