#[allow(unused)]
pub mod writer {
    //! Builders for synthetic CFF data.

    #[derive(Clone, Copy, Debug)]
    pub enum CffType {
        Raw(&'static [u8]),
        UInt8(u8),
        UInt16(u16),
        /// A DICT or charstring integer in its shortest form
        CFFInt(i32),
        /// A DICT integer in the fixed 5-byte form used for offsets
        Offset(i32),
        /// A one byte DICT operator
        Op(u8),
        /// A two byte DICT operator
        Op2(u8),
    }

    pub fn convert(values: &[CffType]) -> Vec<u8> {
        let mut data = Vec::with_capacity(256);
        for v in values {
            convert_type(*v, &mut data);
        }

        data
    }

    pub fn convert_type(value: CffType, data: &mut Vec<u8>) {
        match value {
            CffType::Raw(bytes) => {
                data.extend_from_slice(bytes);
            }
            CffType::UInt8(n) => {
                data.push(n);
            }
            CffType::UInt16(n) => {
                data.extend_from_slice(&u16::to_be_bytes(n));
            }
            CffType::CFFInt(n) => match n {
                -107..=107 => {
                    data.push((n as i16 + 139) as u8);
                }
                108..=1131 => {
                    let n = n - 108;
                    data.push(((n >> 8) + 247) as u8);
                    data.push((n & 0xFF) as u8);
                }
                -1131..=-108 => {
                    let n = -n - 108;
                    data.push(((n >> 8) + 251) as u8);
                    data.push((n & 0xFF) as u8);
                }
                -32768..=32767 => {
                    data.push(28);
                    data.extend_from_slice(&i16::to_be_bytes(n as i16));
                }
                _ => {
                    data.push(29);
                    data.extend_from_slice(&i32::to_be_bytes(n));
                }
            },
            CffType::Offset(n) => {
                data.push(29);
                data.extend_from_slice(&i32::to_be_bytes(n));
            }
            CffType::Op(op) => data.push(op),
            CffType::Op2(op) => data.extend_from_slice(&[12, op]),
        }
    }

    pub fn cff_int(n: i32) -> Vec<u8> {
        convert(&[CffType::CFFInt(n)])
    }

    /// A DICT entry holding a single offset in the 5-byte form.
    pub fn offset_operand(offset: i32, op: u8) -> Vec<u8> {
        convert(&[CffType::Offset(offset), CffType::Op(op)])
    }

    /// An INDEX holding `objects`.
    pub fn index(objects: &[&[u8]]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&(objects.len() as u16).to_be_bytes());
        if objects.is_empty() {
            return data;
        }

        let mut offsets = vec![1];
        for object in objects {
            offsets.push(offsets[offsets.len() - 1] + object.len());
        }
        let last = offsets[offsets.len() - 1];
        let off_size = if last <= 0xFF {
            1
        } else if last <= 0xFFFF {
            2
        } else {
            4
        };
        data.push(off_size as u8);
        for offset in offsets {
            data.extend_from_slice(&(offset as u32).to_be_bytes()[4 - off_size..]);
        }
        for object in objects {
            data.extend_from_slice(object);
        }

        data
    }

    /// The parts of one font in a synthetic font set.
    #[derive(Clone, Debug, Default)]
    pub struct TestFont {
        pub name: &'static str,
        /// Top DICT entries other than CharStrings, charset and Private
        pub top_dict: Vec<u8>,
        /// SIDs of the glyphs after `.notdef`
        pub charset: Vec<u16>,
        /// One charstring per glyph, including `.notdef`
        pub char_strings: Vec<Vec<u8>>,
        /// Private DICT entries other than Subrs
        pub private_dict: Vec<u8>,
        pub local_subrs: Vec<Vec<u8>>,
    }

    fn slices(objects: &[Vec<u8>]) -> Vec<&[u8]> {
        objects.iter().map(Vec::as_slice).collect()
    }

    fn top_dict(
        font: &TestFont,
        char_strings: usize,
        charset: usize,
        private_size: usize,
        private: usize,
    ) -> Vec<u8> {
        let mut data = font.top_dict.clone();
        data.extend(offset_operand(char_strings as i32, 17));
        data.extend(offset_operand(charset as i32, 15));
        data.extend(convert(&[
            CffType::Offset(private_size as i32),
            CffType::Offset(private as i32),
            CffType::Op(18),
        ]));
        data
    }

    /// A complete CFF font set. Each charset is written in format 1 with a range per glyph.
    pub fn font_set(strings: &[&str], global_subrs: &[Vec<u8>], fonts: &[TestFont]) -> Vec<u8> {
        let mut data = vec![1, 0, 4, 4];
        let names = fonts
            .iter()
            .map(|font| font.name.as_bytes())
            .collect::<Vec<_>>();
        data.extend(index(&names));

        // Offsets are all 5 bytes so the size of the Top DICT INDEX is known up front
        let placeholders = fonts
            .iter()
            .map(|font| top_dict(font, 0, 0, 0, 0))
            .collect::<Vec<_>>();
        let base = data.len() + index(&slices(&placeholders)).len();

        let strings = strings.iter().map(|s| s.as_bytes()).collect::<Vec<_>>();
        let mut tail = index(&strings);
        tail.extend(index(&slices(global_subrs)));

        let mut top_dicts = Vec::new();
        for font in fonts {
            let char_strings = base + tail.len();
            tail.extend(index(&slices(&font.char_strings)));

            let charset = base + tail.len();
            tail.push(1);
            for sid in &font.charset {
                tail.extend_from_slice(&sid.to_be_bytes());
                tail.push(0);
            }

            let private = base + tail.len();
            let mut private_dict = font.private_dict.clone();
            if !font.local_subrs.is_empty() {
                let subrs = private_dict.len() + 6;
                private_dict.extend(offset_operand(subrs as i32, 19));
            }
            tail.extend_from_slice(&private_dict);
            if !font.local_subrs.is_empty() {
                tail.extend(index(&slices(&font.local_subrs)));
            }

            top_dicts.push(top_dict(
                font,
                char_strings,
                charset,
                private_dict.len(),
                private,
            ));
        }

        data.extend(index(&slices(&top_dicts)));
        data.extend(tail);
        data
    }
}
