//! CFF INDEX structures, described in Section 5 of Technical Note #5176.
//!
//! An INDEX is an array of variable-sized objects. It starts with a 16-bit count, followed (when
//! the count is non-zero) by the size of each offset, `count + 1` offsets and the object data.
//! Offsets are relative to the byte preceding the object data, so the first offset is always 1.
//!
//! An empty INDEX is represented by the count alone: no offset size or offsets follow.

use std::convert::TryFrom;

use byteorder::{BigEndian, ByteOrder};

use crate::binary::read::{ReadBinary, ReadCtxt, ReadScope};
use crate::binary::write::{WriteBinary, WriteBuffer, WriteContext};
use crate::binary::{U16Be, U24Be, U32Be, U8};
use crate::error::{ParseError, WriteError};

/// A CFF INDEX borrowed from the font data
#[derive(Clone, Debug)]
pub struct Index<'a> {
    pub count: usize,
    off_size: u8,
    offset_array: &'a [u8],
    data_array: &'a [u8],
}

/// An INDEX of owned objects, used when writing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OwnedIndex {
    pub data: Vec<Vec<u8>>,
}

impl<'b> ReadBinary for Index<'b> {
    type HostType<'a> = Index<'a>;

    fn read<'a>(ctxt: &mut ReadCtxt<'a>) -> Result<Self::HostType<'a>, ParseError> {
        let count = usize::from(ctxt.read_u16be()?);

        if count == 0 {
            return Ok(Index {
                count,
                off_size: 1,
                offset_array: &[],
                data_array: &[],
            });
        }

        let off_size = ctxt.read_u8()?;
        if !(1..=4).contains(&off_size) {
            return Err(ParseError::BadValue);
        }

        let offset_array_size = (count + 1) * usize::from(off_size);
        let offset_array = ctxt.read_slice(offset_array_size)?;

        // Offsets must start at 1 and never decrease, otherwise the length of an object would
        // disagree with the distance between its offsets.
        let mut prev = lookup_offset_index(off_size, offset_array, 0);
        ctxt.check_index(prev == 1)?;
        for index in 1..=count {
            let next = lookup_offset_index(off_size, offset_array, index);
            ctxt.check_index(next >= prev)?;
            prev = next;
        }

        let data_array_size = prev - 1;
        let data_array = ctxt.read_slice(data_array_size)?;

        Ok(Index {
            count,
            off_size,
            offset_array,
            data_array,
        })
    }
}

impl<'a> Index<'a> {
    pub fn read_object(&self, index: usize) -> Option<&'a [u8]> {
        if index < self.count {
            let start_index = lookup_offset_index(self.off_size, self.offset_array, index) - 1;
            let end_index = lookup_offset_index(self.off_size, self.offset_array, index + 1) - 1;
            self.data_array.get(start_index..end_index)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).filter_map(move |i| self.read_object(i))
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns the size of the data held by this INDEX.
    pub fn data_len(&self) -> usize {
        self.data_array.len()
    }

    /// The number of bytes used by each offset.
    pub fn off_size(&self) -> u8 {
        self.off_size
    }
}

/// Decode the INDEX at the start of `data`, returning its objects and the data that follows it.
pub fn decode_index(data: &[u8]) -> Result<(Vec<&[u8]>, &[u8]), ParseError> {
    let mut ctxt = ReadScope::new(data).ctxt();
    let index = ctxt.read::<Index<'_>>()?;
    let objects = index.iter().collect();
    Ok((objects, ctxt.scope().data()))
}

/// Encode `objects` as an INDEX.
pub fn encode_index<T: AsRef<[u8]>>(objects: &[T]) -> Result<Vec<u8>, WriteError> {
    let mut buffer = WriteBuffer::new();
    write_index(&mut buffer, objects)?;
    Ok(buffer.into_inner())
}

/// Write `objects` to `ctxt` as an INDEX using the smallest possible offset size.
pub fn write_index<C: WriteContext, T: AsRef<[u8]>>(
    ctxt: &mut C,
    objects: &[T],
) -> Result<(), WriteError> {
    let count = u16::try_from(objects.len())?;
    U16Be::write(ctxt, count)?;
    if count == 0 {
        return Ok(());
    }

    let mut offset = 1; // INDEX offsets start at 1
    let mut offsets = Vec::with_capacity(objects.len() + 1);
    for object in objects {
        offsets.push(offset);
        offset += object.as_ref().len();
    }
    offsets.push(offset);
    let (off_size, offset_array) = serialise_offset_array(offsets)?;
    U8::write(ctxt, off_size)?;
    ctxt.write_bytes(&offset_array)?;
    for object in objects {
        ctxt.write_bytes(object.as_ref())?;
    }

    Ok(())
}

/// Returns the number of bytes an INDEX holding objects of the given lengths occupies.
pub fn index_size(lengths: impl Iterator<Item = usize>) -> Result<usize, WriteError> {
    let (count, data_len) = lengths.fold((0, 0), |(count, total), len| (count + 1, total + len));
    if count == 0 {
        return Ok(2);
    }

    let off_size = offset_size(data_len + 1).ok_or(WriteError::BadValue)?;
    Ok(2 + 1 + (count + 1) * usize::from(off_size) + data_len)
}

impl OwnedIndex {
    pub fn new(data: Vec<Vec<u8>>) -> Self {
        OwnedIndex { data }
    }

    /// Returns the number of bytes this INDEX occupies when written.
    pub fn size(&self) -> Result<usize, WriteError> {
        index_size(self.data.iter().map(Vec::len))
    }
}

impl WriteBinary<&Self> for OwnedIndex {
    type Output = ();

    fn write<C: WriteContext>(ctxt: &mut C, index: &OwnedIndex) -> Result<(), WriteError> {
        write_index(ctxt, &index.data)
    }
}

/// The smallest number of bytes that can hold `value` as an offset.
pub fn offset_size(value: usize) -> Option<u8> {
    match value {
        0..=0xFF => Some(1),
        0x100..=0xFFFF => Some(2),
        0x1_0000..=0xFF_FFFF => Some(3),
        0x100_0000..=0xFFFF_FFFF => Some(4),
        _ => None,
    }
}

fn lookup_offset_index(off_size: u8, offset_array: &[u8], index: usize) -> usize {
    let buf = &offset_array[index * usize::from(off_size)..];
    match off_size {
        1 => buf[0] as usize,
        2 => BigEndian::read_u16(buf) as usize,
        3 => BigEndian::read_u24(buf) as usize,
        4 => BigEndian::read_u32(buf) as usize,
        _ => panic!("unexpected off_size"),
    }
}

/// Serialise the offsets using an optimal `off_size`, returning that and the serialised data.
fn serialise_offset_array(offsets: Vec<usize>) -> Result<(u8, Vec<u8>), WriteError> {
    let last = match offsets.last() {
        Some(last) => *last,
        None => return Ok((1, Vec::new())),
    };

    let off_size = offset_size(last).ok_or(WriteError::BadValue)?;
    let mut offset_array = WriteBuffer::new();
    match off_size {
        1 => offset_array.write_iter::<U8, _>(offsets.into_iter().map(|offset| offset as u8))?,
        2 => offset_array.write_iter::<U16Be, _>(offsets.into_iter().map(|offset| offset as u16))?,
        3 => offset_array.write_iter::<U24Be, _>(offsets.into_iter().map(|offset| offset as u32))?,
        4 => offset_array.write_iter::<U32Be, _>(offsets.into_iter().map(|offset| offset as u32))?,
        _ => unreachable!(), // offset_size only returns 1..=4
    }

    Ok((off_size, offset_array.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_iter_index() {
        let data = [0, 2, 1, 1, 2, 3, 4, 5];
        let index = ReadScope::new(&data).read::<Index<'_>>().unwrap();

        assert_eq!(index.iter().collect::<Vec<_>>(), vec![[4], [5]]);
    }

    #[test]
    fn test_read_index_off_size_3() {
        let data = [0, 1, 3, 0, 0, 1, 0, 0, 2, 5];
        let index = ReadScope::new(&data).read::<Index<'_>>().unwrap();

        assert_eq!(index.off_size(), 3);
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![&[5]]);
        // Re-encoding picks the smallest offset size
        assert_eq!(encode_index(&[[5u8]]).unwrap(), vec![0, 1, 1, 1, 2, 5]);
    }

    #[test]
    fn test_decode_index_remainder() {
        let data = [0, 2, 1, 1, 3, 4, b'a', b'b', b'c', 0xAA, 0xBB];
        let (objects, rest) = decode_index(&data).unwrap();
        assert_eq!(objects, vec![&b"ab"[..], &b"c"[..]]);
        assert_eq!(rest, &[0xAA, 0xBB]);
    }

    #[test]
    fn test_empty_index() {
        assert_eq!(encode_index::<Vec<u8>>(&[]).unwrap(), vec![0, 0]);

        let (objects, rest) = decode_index(&[0, 0, 7]).unwrap();
        assert!(objects.is_empty());
        assert_eq!(rest, &[7]);
    }

    #[test]
    fn test_round_trip() {
        let cases: Vec<Vec<Vec<u8>>> = vec![
            vec![],
            vec![vec![]],
            vec![vec![], vec![]],
            vec![b"one".to_vec(), vec![], b"three".to_vec()],
            vec![vec![0xAB; 300], vec![1]],
            vec![vec![0; 70_000]],
        ];

        for objects in cases {
            let encoded = encode_index(&objects).unwrap();
            let (decoded, rest) = decode_index(&encoded).unwrap();
            assert_eq!(decoded, objects.iter().map(Vec::as_slice).collect::<Vec<_>>());
            assert!(rest.is_empty());
            assert_eq!(
                index_size(objects.iter().map(Vec::len)).unwrap(),
                encoded.len()
            );
        }
    }

    #[test]
    fn test_minimal_offset_size() {
        // The last offset is data length + 1
        let off_size_for = |len: usize| encode_index(&[vec![0u8; len]]).unwrap()[2];
        assert_eq!(off_size_for(0), 1);
        assert_eq!(off_size_for(254), 1);
        assert_eq!(off_size_for(255), 2);
        assert_eq!(off_size_for(0xFFFE), 2);
        assert_eq!(off_size_for(0xFFFF), 3);
        assert_eq!(off_size_for(0xFF_FFFF), 4);
    }

    #[test]
    fn test_offset_size() {
        assert_eq!(offset_size(0xFF), Some(1));
        assert_eq!(offset_size(0x100), Some(2));
        assert_eq!(offset_size(0x1_0000), Some(3));
        assert_eq!(offset_size(0x100_0000), Some(4));
    }

    #[test]
    fn test_decreasing_offsets() {
        // Second object claims to end before it starts
        let data = [0, 2, 1, 1, 3, 2, b'a', b'b'];
        let err = decode_index(&data).unwrap_err();
        assert_eq!(err, ParseError::BadIndex);
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_first_offset_not_one() {
        let data = [0, 1, 1, 2, 3, b'a', b'b'];
        assert_eq!(decode_index(&data).unwrap_err(), ParseError::BadIndex);
    }

    #[test]
    fn test_truncated_data() {
        // Offsets declare 4 bytes of data but only 2 are present
        let data = [0, 1, 1, 1, 5, b'a', b'b'];
        let err = decode_index(&data).unwrap_err();
        assert_eq!(err, ParseError::BadEof);
        assert_eq!(err.kind(), ErrorKind::CorruptData);
    }

    #[test]
    fn test_bad_off_size() {
        assert_eq!(
            decode_index(&[0, 1, 5, 0, 0, 0, 0, 1]).unwrap_err(),
            ParseError::BadValue
        );
    }
}
