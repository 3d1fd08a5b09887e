use num_traits::PrimInt;

use super::error::{QRError, QRResult};

pub const MAX_BIT_LEN: usize = i32::MAX as usize;

// Bit stream
//------------------------------------------------------------------------------

/// Append-only sequence of bits, packed MSB first.
#[derive(Debug, Clone)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Max bit capacity
    capacity: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::with_capacity(MAX_BIT_LEN)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity.min(1 << 16).div_ceil(8)), len: 0, capacity }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Packed bytes; the unused tail of the last byte is zero.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.data[index >> 3] & (0x80 >> (index & 7)) != 0)
    }

    pub fn iter(&self) -> Bits<'_> {
        Bits { bs: self, cursor: 0 }
    }

    fn reserve(&mut self, size: usize) -> QRResult<()> {
        match self.len.checked_add(size) {
            Some(n) if n <= self.capacity => Ok(()),
            _ => Err(QRError::CapacityOverflow),
        }
    }

    fn push_unchecked(&mut self, bit: bool) {
        let offset = self.len & 7;
        if offset == 0 {
            self.data.push(0);
        }
        if bit {
            let pos = self.len >> 3;
            self.data[pos] |= 0x80 >> offset;
        }
        self.len += 1;
    }
}

impl Default for BitStream {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for BitStream {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.data == other.data
    }
}

impl Eq for BitStream {}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    pub fn push(&mut self, bit: bool) -> QRResult<()> {
        self.reserve(1)?;
        self.push_unchecked(bit);
        Ok(())
    }

    /// Appends the low `size` bits of `bits`, most significant first.
    pub fn push_bits<T: PrimInt>(&mut self, bits: T, size: usize) -> QRResult<()> {
        if size > 31 {
            return Err(QRError::ValueOutOfRange("bit count must not exceed 31"));
        }
        let bits = bits.to_u32().ok_or(QRError::ValueOutOfRange("bits must be non-negative"))?;
        if bits >> size != 0 {
            return Err(QRError::ValueOutOfRange("value does not fit in bit count"));
        }
        self.reserve(size)?;

        for i in (0..size).rev() {
            self.push_unchecked((bits >> i) & 1 != 0);
        }
        Ok(())
    }

    pub fn extend(&mut self, other: &BitStream) -> QRResult<()> {
        self.reserve(other.len)?;

        if self.len & 7 == 0 {
            self.data.extend_from_slice(&other.data);
            self.len += other.len;
        } else {
            other.iter().for_each(|b| self.push_unchecked(b));
        }
        Ok(())
    }

    pub fn extend_bytes(&mut self, bytes: &[u8]) -> QRResult<()> {
        self.reserve(bytes.len() << 3)?;

        if self.len & 7 == 0 {
            self.data.extend_from_slice(bytes);
            self.len += bytes.len() << 3;
        } else {
            for &b in bytes {
                (0..8).rev().for_each(|i| self.push_unchecked((b >> i) & 1 != 0));
            }
        }
        Ok(())
    }
}

// Iterator for bit stream
//------------------------------------------------------------------------------

pub struct Bits<'a> {
    bs: &'a BitStream,
    cursor: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        let bit = self.bs.get(self.cursor)?;
        self.cursor += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rem = self.bs.len - self.cursor;
        (rem, Some(rem))
    }
}

impl ExactSizeIterator for Bits<'_> {}

impl<'a> IntoIterator for &'a BitStream {
    type Item = bool;
    type IntoIter = Bits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod bit_stream_tests {
    use test_case::test_case;

    use super::BitStream;
    use crate::common::error::QRError;

    #[test]
    fn test_push_bits() {
        let mut bs = BitStream::new();
        bs.push_bits(0b1011u8, 4).unwrap();
        bs.push_bits(0b00111u16, 5).unwrap();
        bs.push_bits(0x1ABCDi32, 17).unwrap();
        assert_eq!(bs.len(), 26);
        assert_eq!(bs.data(), &[0b10110011, 0b11101010, 0b11110011, 0b01000000]);
    }

    #[test]
    fn test_push_zero_bits() {
        let mut bs = BitStream::new();
        bs.push_bits(0u8, 0).unwrap();
        assert!(bs.is_empty());
        assert!(bs.data().is_empty());
    }

    #[test_case(0b100, 2)]
    #[test_case(256, 8)]
    #[test_case(-1, 8)]
    #[test_case(0, 32)]
    fn test_push_bits_out_of_range(bits: i64, size: usize) {
        let mut bs = BitStream::new();
        assert!(matches!(bs.push_bits(bits, size), Err(QRError::ValueOutOfRange(_))));
        assert_eq!(bs.len(), 0);
    }

    #[test]
    fn test_capacity_overflow() {
        let mut bs = BitStream::with_capacity(10);
        bs.push_bits(0xFFu8, 8).unwrap();
        assert_eq!(bs.push_bits(0u8, 3), Err(QRError::CapacityOverflow));
        assert_eq!(bs.len(), 8);
        bs.push(true).unwrap();
        bs.push(false).unwrap();
        assert_eq!(bs.push(true), Err(QRError::CapacityOverflow));
        assert_eq!(bs.len(), 10);
    }

    #[test]
    fn test_get() {
        let mut bs = BitStream::new();
        bs.push_bits(0b101u8, 3).unwrap();
        assert_eq!(bs.get(0), Some(true));
        assert_eq!(bs.get(1), Some(false));
        assert_eq!(bs.get(2), Some(true));
        assert_eq!(bs.get(3), None);
    }

    #[test]
    fn test_extend_unaligned() {
        let mut a = BitStream::new();
        a.push_bits(0b1u8, 1).unwrap();
        let mut b = BitStream::new();
        b.push_bits(0b0110_1001_1u16, 9).unwrap();
        a.extend(&b).unwrap();
        a.extend_bytes(&[0xF0]).unwrap();
        assert_eq!(a.len(), 18);
        assert_eq!(a.iter().map(|b| b as u8).collect::<Vec<_>>(), [
            1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0
        ]);
    }

    #[test]
    fn test_extend_aligned() {
        let mut a = BitStream::new();
        a.extend_bytes(b"\x20\x5b").unwrap();
        let mut b = BitStream::new();
        b.push_bits(0b101u8, 3).unwrap();
        a.extend(&b).unwrap();
        assert_eq!(a.len(), 19);
        assert_eq!(a.data(), &[0x20, 0x5b, 0b10100000]);
    }

    #[test]
    fn test_extend_overflow() {
        let mut a = BitStream::with_capacity(8);
        assert_eq!(a.extend_bytes(&[1, 2]), Err(QRError::CapacityOverflow));
        assert!(a.is_empty());
    }
}
