mod common;

use cffset::binary::read::ReadScope;
use cffset::binary::write::{WriteBinary, WriteBuffer};
use cffset::cff::charset::decode_charset;
use cffset::cff::charstring::{CharString, CharstringType};
use cffset::cff::dict::{DictValue, Number, Operator};
use cffset::cff::index::{decode_index, encode_index};
use cffset::cff::strings::{IndexedStrings, N_STD_STRINGS};
use cffset::cff::xml::XmlTextWriter;
use cffset::cff::FontSet;
use cffset::error::{ErrorKind, ParseError, Unsupported};

use common::writer::{self, CffType, TestFont};

fn read_font_set(data: &[u8]) -> FontSet<'_> {
    ReadScope::new(data)
        .read::<FontSet<'_>>()
        .expect("unable to read font set")
}

fn sample_font(name: &'static str) -> TestFont {
    TestFont {
        name,
        // version "001.000", FullName "Sample Sans", ItalicAngle -12, isFixedPitch true,
        // FontBBox -50 -200 1000 900
        top_dict: writer::convert(&[
            CffType::CFFInt(379),
            CffType::Op(0),
            CffType::CFFInt(391),
            CffType::Op(2),
            CffType::CFFInt(-12),
            CffType::Op2(2),
            CffType::CFFInt(1),
            CffType::Op2(1),
            CffType::CFFInt(-50),
            CffType::CFFInt(-200),
            CffType::CFFInt(1000),
            CffType::CFFInt(900),
            CffType::Op(5),
        ]),
        // A B C custom.alt
        charset: vec![34, 35, 36, 392],
        char_strings: vec![
            vec![14],
            // 100 -100 rmoveto -107 callsubr endchar
            vec![0xef, 0x27, 21, 0x20, 10, 14],
            // -107 callgsubr endchar
            vec![0x20, 29, 14],
            vec![0x8b, 0x8b, 21, 14],
            vec![0x8c, 22, 14],
        ],
        // BlueValues -10 0 500 10, StdHW 50, defaultWidthX 500
        private_dict: writer::convert(&[
            CffType::CFFInt(-10),
            CffType::CFFInt(10),
            CffType::CFFInt(500),
            CffType::CFFInt(10),
            CffType::Op(6),
            CffType::CFFInt(50),
            CffType::Op(10),
            CffType::CFFInt(500),
            CffType::Op(20),
        ]),
        // 50 hlineto return
        local_subrs: vec![vec![0xbd, 6, 11]],
    }
}

fn sample_font_set() -> Vec<u8> {
    let global_subrs = vec![vec![0xef, 0xef, 21, 11]];
    let mut second = sample_font("Second");
    second.top_dict = Vec::new();
    second.local_subrs = Vec::new();
    second.char_strings = vec![vec![14]; 5];
    writer::font_set(
        &["Sample Sans", "custom.alt"],
        &global_subrs,
        &[sample_font("Sample"), second],
    )
}

#[test]
fn test_name_index() {
    // Header 1.0, hdrSize 4, offSize 1 followed by a Name INDEX holding "Test"
    let mut data = vec![0x01, 0x00, 0x04, 0x01];
    data.extend(writer::index(&[b"Test"]));
    data.extend(writer::index(&[&[]]));
    data.extend(writer::index(&[]));
    data.extend(writer::index(&[]));

    let font_set = read_font_set(&data);
    assert_eq!(font_set.font_names(), &["Test"]);
    assert_eq!(font_set.header.off_size, 1);
    // The font has an empty Top DICT and so no CharStrings
    assert_eq!(
        font_set.font("Test").unwrap().unwrap_err(),
        &ParseError::MissingValue
    );
}

#[test]
fn test_charset_format_1() {
    let strings = IndexedStrings::new();
    // SIDs 34, 35 and 36 are A, B and C
    let names = decode_charset(1, 4, &[0, 34, 2], &strings).unwrap();
    assert_eq!(names, vec![".notdef", "A", "B", "C"]);

    // Custom strings are resolved the same way
    let strings =
        IndexedStrings::from_strings(vec!["x".to_string(), "y".to_string(), "z".to_string()])
            .unwrap();
    let names = decode_charset(2, 4, &[0x01, 0x87, 0, 2], &strings).unwrap();
    assert_eq!(names, vec![".notdef", "x", "y", "z"]);
}

#[test]
fn test_intern_strings() {
    let mut strings = IndexedStrings::new();
    assert_eq!(strings.intern("foo").unwrap(), 391);
    assert_eq!(strings.intern("foo").unwrap(), 391);
    assert_eq!(strings.intern("baz").unwrap(), 392);
    assert_eq!(strings.resolve(392).unwrap(), "baz");
    // "bar" is a standard string so it is not appended
    assert_eq!(strings.intern("bar").unwrap(), 93);
    assert_eq!(strings.custom_strings(), &["foo", "baz"]);
}

#[test]
fn test_standard_strings_round_trip() {
    let mut strings = IndexedStrings::new();
    for sid in 0..N_STD_STRINGS as u16 {
        let name = strings.resolve(sid).unwrap().to_owned();
        assert_eq!(strings.intern(&name).unwrap(), sid);
    }
    assert!(strings.is_empty());
    assert_eq!(strings.resolve(N_STD_STRINGS as u16), Err(ParseError::BadIndex));
}

#[test]
fn test_charstring_type() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);
    let font = font_set.font("Sample").unwrap().unwrap();
    assert!(font
        .char_strings()
        .all(|char_string| char_string.kind() == CharstringType::Type2));

    for (value, expected) in [(1, Some(CharstringType::Type1)), (3, None)] {
        let mut font = sample_font("Font");
        font.top_dict = writer::convert(&[CffType::CFFInt(value), CffType::Op2(6)]);
        let data = writer::font_set(&["Sample Sans", "custom.alt"], &[], &[font]);
        let font_set = read_font_set(&data);
        match expected {
            Some(kind) => {
                let font = font_set.font("Font").unwrap().unwrap();
                assert!(font.char_strings().all(|cs| cs.kind() == kind));
            }
            None => {
                let err = font_set.font("Font").unwrap().unwrap_err();
                assert_eq!(
                    err,
                    &ParseError::Unsupported(Unsupported::CharstringType(3))
                );
                assert_eq!(err.kind(), ErrorKind::Unsupported);
            }
        }
    }
}

#[test]
fn test_corrupt_char_strings_isolated() {
    let mut data = sample_font_set();
    let char_strings_offset = {
        let font_set = read_font_set(&data);
        let font = font_set.font("Sample").unwrap().unwrap();
        font.top_dict.get_offset(Operator::CharStrings).unwrap()
    };

    // Make the second offset of the first font's CharStrings INDEX smaller than the first
    data[char_strings_offset + 4] = 0;
    let font_set = read_font_set(&data);
    let err = font_set.font("Sample").unwrap().unwrap_err();
    assert_eq!(err, &ParseError::BadIndex);
    assert_eq!(err.kind(), ErrorKind::CorruptData);

    // The other font is unaffected
    let second = font_set.font("Second").unwrap().unwrap();
    assert_eq!(second.num_glyphs(), 5);
}

#[test]
fn test_binder_pairing() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);
    let font = font_set.font("Sample").unwrap().unwrap();

    let char_strings_offset = font.top_dict.get_offset(Operator::CharStrings).unwrap();
    let (raw, _rest) = decode_index(&data[char_strings_offset..]).unwrap();
    assert_eq!(font.glyph_order().len(), raw.len());
    for (glyph_name, raw) in font.glyph_order().iter().zip(raw) {
        assert_eq!(font.char_string(glyph_name).unwrap().data(), raw);
    }
    assert_eq!(
        font.glyph_order(),
        &[".notdef", "A", "B", "C", "custom.alt"]
    );
}

#[test]
fn test_private_dict_and_subrs() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);
    let font = font_set.font("Sample").unwrap().unwrap();

    let strings = font_set.strings();
    assert_eq!(
        font.private_dict().get_value(Operator::BlueValues, strings),
        Some(Ok(DictValue::Delta(vec![
            Number::Integer(-10),
            Number::Integer(0),
            Number::Integer(500),
            Number::Integer(510)
        ])))
    );
    assert_eq!(
        font.private_dict().get_value(Operator::DefaultWidthX, strings),
        Some(Ok(DictValue::Number(Number::Integer(500))))
    );
    // Default
    assert_eq!(
        font.private_dict().get_value(Operator::BlueShift, strings),
        Some(Ok(DictValue::Number(Number::Integer(7))))
    );
    assert_eq!(font.local_subrs().len(), 1);
    assert_eq!(font.local_subrs()[0].data(), &[0xbd, 6, 11]);
    assert_eq!(font.global_subrs().len(), 1);

    let second = font_set.font("Second").unwrap().unwrap();
    assert!(second.local_subrs().is_empty());
}

#[test]
fn test_decompile_with_subroutines() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);
    let font = font_set.font("Sample").unwrap().unwrap();

    font.decompile_all_char_strings().unwrap();
    assert!(font.char_strings().all(|cs| !cs.needs_decompilation()));
    assert!(!font.local_subrs()[0].needs_decompilation());
    assert!(!font_set.global_subrs()[0].needs_decompilation());
}

#[test]
fn test_round_trip() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);

    let mut buffer = WriteBuffer::new();
    FontSet::write(&mut buffer, &font_set).unwrap();
    let written = read_font_set(buffer.bytes());

    assert_eq!(written.font_names(), font_set.font_names());
    assert_eq!(
        written.global_subrs().iter().map(CharString::data).collect::<Vec<_>>(),
        font_set.global_subrs().iter().map(CharString::data).collect::<Vec<_>>()
    );
    for (name, font) in font_set.fonts() {
        let font = font.unwrap();
        let written_font = written.font(name).unwrap().unwrap();

        assert_eq!(written_font.glyph_order(), font.glyph_order());
        assert_eq!(
            written_font
                .char_strings()
                .map(CharString::data)
                .collect::<Vec<_>>(),
            font.char_strings().map(CharString::data).collect::<Vec<_>>()
        );
        assert_eq!(written_font.private_dict(), font.private_dict());
        assert_eq!(
            written_font
                .local_subrs()
                .iter()
                .map(CharString::data)
                .collect::<Vec<_>>(),
            font.local_subrs().iter().map(CharString::data).collect::<Vec<_>>()
        );
        for operator in [
            Operator::Version,
            Operator::FullName,
            Operator::ItalicAngle,
            Operator::IsFixedPitch,
            Operator::FontBBox,
            Operator::FontMatrix,
        ] {
            assert_eq!(
                written_font
                    .top_dict
                    .get_value(operator, written.strings()),
                font.top_dict.get_value(operator, font_set.strings())
            );
        }
    }

    // Writing the decoded copy again produces identical data
    let mut again = WriteBuffer::new();
    FontSet::write(&mut again, &written).unwrap();
    assert_eq!(again.bytes(), buffer.bytes());
}

#[test]
fn test_index_round_trip() {
    let objects: [&[u8]; 4] = [b"", b"one", b"", &[0xAB; 300]];
    let encoded = encode_index(&objects).unwrap();
    assert_eq!(encoded[2], 2); // offSize
    let (decoded, rest) = decode_index(&encoded).unwrap();
    assert_eq!(decoded, objects);
    assert!(rest.is_empty());
}

#[test]
fn test_to_xml() {
    let data = sample_font_set();
    let font_set = read_font_set(&data);

    let mut writer = XmlTextWriter::new(String::new());
    font_set.to_xml(&mut writer).unwrap();
    let xml = writer.into_inner();

    assert!(xml.starts_with("<CFFFont name=\"Sample\">\n  <FontBBox>-50 -200 1000 900</FontBBox>\n"));
    assert!(xml.contains("  <FullName>Sample Sans</FullName>\n"));
    assert!(xml.contains("  <ItalicAngle>-12</ItalicAngle>\n"));
    assert!(xml.contains("  <isFixedPitch>1</isFixedPitch>\n"));
    assert!(xml.contains("    <BlueValues>-10 0 500 510</BlueValues>\n"));
    assert!(xml.contains(
        "      <CharString id=\"0\">\n        50 hlineto\n        return\n      </CharString>\n"
    ));
    assert!(xml.contains(
        "    <CharString name=\"custom.alt\">\n      1 hmoveto\n      endchar\n    </CharString>\n"
    ));
    assert!(xml.contains("<CFFFont name=\"Second\">\n"));
    assert!(xml.ends_with(
        "<GlobalSubrs>\n  <CharString id=\"0\">\n    100 100 rmoveto\n    return\n  </CharString>\n</GlobalSubrs>\n"
    ));

    // Simple values are sorted by name
    let full_name = xml.find("<FullName>").unwrap();
    let italic_angle = xml.find("<ItalicAngle>").unwrap();
    let version = xml.find("<version>").unwrap();
    assert!(full_name < italic_angle && italic_angle < version);
}
