use encoding_rs::SHIFT_JIS;

use crate::common::bit_utils::{BitStream, MAX_BIT_LEN};
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Version;

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    Byte = 0b0100,
    Kanji = 0b1000,
    Eci = 0b0111,
}

// Candidate modes for text segmentation, in tie break order
pub static MODES: [Mode; 4] = [Mode::Numeric, Mode::Alphanumeric, Mode::Byte, Mode::Kanji];

pub static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

impl Mode {
    #[inline]
    fn numeric_digit(char: u8) -> u16 {
        debug_assert!(char.is_ascii_digit(), "Invalid numeric data: {char}");
        (char - b'0') as u16
    }

    #[inline]
    fn alphanumeric_digit(char: u8) -> u16 {
        match char {
            b'0'..=b'9' => (char - b'0') as u16,
            b'A'..=b'Z' => (char - b'A' + 10) as u16,
            b' ' => 36,
            b'$' => 37,
            b'%' => 38,
            b'*' => 39,
            b'+' => 40,
            b'-' => 41,
            b'.' => 42,
            b'/' => 43,
            b':' => 44,
            _ => unreachable!("Invalid alphanumeric {char}"),
        }
    }

    // Shift JIS code packed into 13 bits, if the char is in the kanji mode range
    pub(crate) fn kanji_value(c: char) -> Option<u16> {
        if c.is_ascii() {
            return None;
        }
        let mut buf = [0; 4];
        let (sjis, _, had_errors) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));
        if had_errors || sjis.len() != 2 {
            return None;
        }
        let code = u16::from_be_bytes([sjis[0], sjis[1]]);
        let code = match code {
            0x8140..=0x9ffc => code - 0x8140,
            0xe040..=0xebbf => code - 0xc140,
            _ => return None,
        };
        Some((code >> 8) * 0xc0 + (code & 0xff))
    }

    pub fn contains(&self, c: char) -> bool {
        match self {
            Self::Numeric => c.is_ascii_digit(),
            Self::Alphanumeric => c.is_ascii() && ALPHANUMERIC_CHARSET.contains(c),
            Self::Byte => true,
            Self::Kanji => Self::kanji_value(c).is_some(),
            Self::Eci => false,
        }
    }

    pub fn encode_chunk(&self, data: &[u8]) -> u16 {
        let len = data.len();
        match self {
            Self::Numeric => {
                debug_assert!(len <= 3, "Data is too long for numeric conver: {len}");
                data.iter().fold(0_u16, |n, b| n * 10 + Self::numeric_digit(*b))
            }
            Self::Alphanumeric => {
                debug_assert!(len <= 2, "Data is too long for alphanumeric conver: {len}");
                data.iter().fold(0_u16, |n, b| n * 45 + Self::alphanumeric_digit(*b))
            }
            Self::Byte | Self::Kanji | Self::Eci => {
                unreachable!("{self:?} mode isn't chunk encoded")
            }
        }
    }
}

// Segment
//------------------------------------------------------------------------------

/// A run of input encoded in a single mode. The payload holds the encoded data bits only,
/// without the mode indicator or the character count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    char_cnt: usize,
    data: BitStream,
}

impl Segment {
    pub fn new(mode: Mode, char_cnt: usize, data: BitStream) -> Self {
        Self { mode, char_cnt, data }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn char_count(&self) -> usize {
        self.char_cnt
    }

    pub fn data(&self) -> &BitStream {
        &self.data
    }

    pub fn numeric(digits: &str) -> QRResult<Self> {
        if let Some(c) = digits.chars().find(|c| !c.is_ascii_digit()) {
            return Err(QRError::InvalidChar(c, Mode::Numeric));
        }
        let mut bs = BitStream::new();
        for chunk in digits.as_bytes().chunks(3) {
            let len = chunk.len() * 3 + 1;
            bs.push_bits(Mode::Numeric.encode_chunk(chunk), len).map_err(payload_too_long)?;
        }
        Ok(Self::new(Mode::Numeric, digits.len(), bs))
    }

    pub fn alphanumeric(text: &str) -> QRResult<Self> {
        if let Some(c) = text.chars().find(|&c| !Mode::Alphanumeric.contains(c)) {
            return Err(QRError::InvalidChar(c, Mode::Alphanumeric));
        }
        let mut bs = BitStream::new();
        for chunk in text.as_bytes().chunks(2) {
            let len = chunk.len() * 5 + 1;
            bs.push_bits(Mode::Alphanumeric.encode_chunk(chunk), len).map_err(payload_too_long)?;
        }
        Ok(Self::new(Mode::Alphanumeric, text.len(), bs))
    }

    pub fn bytes(data: &[u8]) -> QRResult<Self> {
        let mut bs = BitStream::new();
        bs.extend_bytes(data).map_err(payload_too_long)?;
        Ok(Self::new(Mode::Byte, data.len(), bs))
    }

    pub fn kanji(text: &str) -> QRResult<Self> {
        let mut bs = BitStream::new();
        let mut char_cnt = 0;
        for c in text.chars() {
            let val = Mode::kanji_value(c).ok_or(QRError::InvalidChar(c, Mode::Kanji))?;
            bs.push_bits(val, 13).map_err(payload_too_long)?;
            char_cnt += 1;
        }
        Ok(Self::new(Mode::Kanji, char_cnt, bs))
    }

    /// Extended Channel Interpretation designator for an assignment value in 0..1_000_000.
    pub fn eci(assign_val: i32) -> QRResult<Self> {
        let mut bs = BitStream::new();
        match assign_val {
            0..=127 => bs.push_bits(assign_val, 8)?,
            128..=16_383 => {
                bs.push_bits(0b10, 2)?;
                bs.push_bits(assign_val, 14)?;
            }
            16_384..=999_999 => {
                bs.push_bits(0b110, 3)?;
                bs.push_bits(assign_val, 21)?;
            }
            _ => return Err(QRError::ValueOutOfRange("ECI assignment value must be in 0..1000000")),
        }
        Ok(Self::new(Mode::Eci, 0, bs))
    }

    /// Single segment in the most compact mode that holds the whole text.
    pub fn auto(text: &str) -> QRResult<Vec<Self>> {
        if text.is_empty() {
            return Ok(vec![]);
        }
        let seg = if is_numeric(text) {
            Self::numeric(text)?
        } else if is_alphanumeric(text) {
            Self::alphanumeric(text)?
        } else {
            Self::bytes(text.as_bytes())?
        };
        Ok(vec![seg])
    }

    /// Minimum length segmentation assuming the character count widths of `ver`.
    pub fn optimal(text: &str, ver: Version) -> QRResult<Vec<Self>> {
        super::encoder::encode::compute_optimal_segments(text, ver)
    }

    /// Header plus payload length at `ver`, or None if the char count doesn't fit its field.
    pub fn bit_len(&self, ver: Version) -> Option<usize> {
        let cnt_bits = ver.char_cnt_bits(self.mode);
        if self.char_cnt >= 1 << cnt_bits {
            return None;
        }
        (ver.mode_bits() + cnt_bits).checked_add(self.data.len())
    }

    pub fn total_bits(segs: &[Self], ver: Version) -> Option<usize> {
        segs.iter().try_fold(0usize, |acc, s| acc.checked_add(s.bit_len(ver)?))
    }
}

// A payload past the bit stream limit can't fit any symbol
fn payload_too_long(e: QRError) -> QRError {
    match e {
        QRError::CapacityOverflow => QRError::DataTooLong { bits: None, capacity: MAX_BIT_LEN },
        e => e,
    }
}

pub fn is_numeric(text: &str) -> bool {
    text.chars().all(|c| Mode::Numeric.contains(c))
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| Mode::Alphanumeric.contains(c))
}

pub fn is_kanji(text: &str) -> bool {
    text.chars().all(|c| Mode::Kanji.contains(c))
}
