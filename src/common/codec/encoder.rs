pub use encode::*;

// Encoder
//------------------------------------------------------------------------------

pub mod encode {
    use std::mem::swap;

    use tracing::trace;

    use super::writer::{pad_remaining_capacity, push_segment, push_terminator};
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Mode, Segment, MODES};
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::{ECLevel, Version};

    /// Data codewords for `segs` at `ver`: segments, terminator, then padding up to capacity.
    pub fn encode_segments(segs: &[Segment], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        let bcap = ver.data_bit_capacity(ecl);
        let too_long = |e| match e {
            QRError::CapacityOverflow => {
                QRError::DataTooLong { bits: Segment::total_bits(segs, ver), capacity: bcap }
            }
            e => e,
        };

        let mut bs = BitStream::with_capacity(bcap);
        for seg in segs {
            push_segment(seg, ver, &mut bs).map_err(too_long)?;
        }
        push_terminator(&mut bs)?;
        pad_remaining_capacity(&mut bs)?;

        debug_assert_eq!(bs.len(), bcap, "Encoded data doesn't fill capacity");
        Ok(bs)
    }

    /// Smallest version in `min..=max` whose data capacity at `ecl` holds the segments.
    /// Returns the version along with the number of bits used.
    pub fn find_version(
        segs: &[Segment],
        ecl: ECLevel,
        min: Version,
        max: Version,
    ) -> QRResult<(Version, usize)> {
        let mut bits = None;
        for ver in Version::range(min, max) {
            bits = Segment::total_bits(segs, ver);
            if let Some(b) = bits.filter(|&b| b <= ver.data_bit_capacity(ecl)) {
                return Ok((ver, b));
            }
        }
        Err(QRError::DataTooLong { bits, capacity: max.data_bit_capacity(ecl) })
    }

    /// Picks the smallest version along with a segmentation of `text` for it.
    ///
    /// The segmentation is recomputed whenever the character count widths change, that is at
    /// the first version examined and at versions 10 and 27. Each time, the optimal plan is
    /// measured against the single mode plan and the shorter one is kept.
    pub fn find_optimal_version_and_segments(
        text: &str,
        ecl: ECLevel,
        min: Version,
        max: Version,
    ) -> QRResult<(Version, Vec<Segment>, usize)> {
        let naive = Segment::auto(text)?;
        let mut segs = vec![];
        let mut bits = None;
        for ver in Version::range(min, max) {
            if ver == min || ver.band() != Version(*ver - 1).band() {
                let optimal = compute_optimal_segments(text, ver)?;
                let opt_bits = Segment::total_bits(&optimal, ver);
                let naive_bits = Segment::total_bits(&naive, ver);
                (segs, bits) = match (opt_bits, naive_bits) {
                    (Some(o), Some(n)) if n < o => (naive.clone(), naive_bits),
                    (None, Some(_)) => (naive.clone(), naive_bits),
                    _ => (optimal, opt_bits),
                };
                trace!(version = *ver, segments = segs.len(), bits = ?bits, "Segmented text");
            }
            if let Some(b) = bits.filter(|&b| b <= ver.data_bit_capacity(ecl)) {
                return Ok((ver, segs, b));
            }
        }
        Err(QRError::DataTooLong { bits, capacity: max.data_bit_capacity(ecl) })
    }

    // Dynamic programming to compute optimum mode segments. Costs are counted in sixths of a
    // bit so numeric (10/3) and alphanumeric (11/2) chars add up exactly.
    pub(crate) fn compute_optimal_segments(text: &str, ver: Version) -> QRResult<Vec<Segment>> {
        let chars = text.chars().collect::<Vec<_>>();
        if chars.is_empty() {
            return Ok(vec![]);
        }

        // (cost, segment count) of the cheapest path ending in each mode
        let mut prev_cost: [Option<(usize, usize)>; 4] = [None; 4];
        MODES
            .iter()
            .enumerate()
            .for_each(|(i, &m)| prev_cost[i] = Some(((4 + ver.char_cnt_bits(m)) * 6, 1)));
        let mut cur_cost = [None; 4];
        let mut min_path = vec![[0; 4]; chars.len()];
        for (i, &ch) in chars.iter().enumerate() {
            for (j, to_mode) in MODES.iter().enumerate() {
                if !to_mode.contains(ch) {
                    continue;
                }
                let encoded_char_size = match to_mode {
                    Mode::Numeric => 20,
                    Mode::Alphanumeric => 33,
                    Mode::Byte => 48 * ch.len_utf8(),
                    Mode::Kanji => 78,
                    Mode::Eci => unreachable!("ECI isn't a text mode"),
                };
                for (k, from_mode) in MODES.iter().enumerate() {
                    let Some((prev, seg_cnt)) = prev_cost[k] else {
                        continue;
                    };
                    let cost = if to_mode == from_mode {
                        (prev + encoded_char_size, seg_cnt)
                    } else {
                        let header = (4 + ver.char_cnt_bits(*to_mode)) * 6;
                        (prev.div_ceil(6) * 6 + header + encoded_char_size, seg_cnt + 1)
                    };
                    if cur_cost[j].map_or(true, |c| cost < c) {
                        cur_cost[j] = Some(cost);
                        min_path[i][j] = k;
                    }
                }
            }
            swap(&mut prev_cost, &mut cur_cost);
            cur_cost.fill(None);
        }

        let Some(mode_index) = prev_cost
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|(cost, seg_cnt)| (i, (cost.div_ceil(6), seg_cnt))))
            .min_by_key(|&(_, c)| c)
            .map(|(i, _)| i)
        else {
            unreachable!("Byte mode holds every char");
        };

        let char_modes = trace_optimal_modes(&min_path, mode_index);
        build_segments(&char_modes, &chars)
    }

    // Backtrack min_path and identify optimal char mode
    fn trace_optimal_modes(min_path: &[[usize; 4]], mut mode_index: usize) -> Vec<Mode> {
        let mut char_modes = vec![Mode::Byte; min_path.len()];
        for (i, path) in min_path.iter().enumerate().rev() {
            char_modes[i] = MODES[mode_index];
            mode_index = path[mode_index];
        }
        char_modes
    }

    // Build segments from runs of chars in the same mode
    fn build_segments(char_modes: &[Mode], chars: &[char]) -> QRResult<Vec<Segment>> {
        debug_assert_eq!(char_modes.len(), chars.len(), "Mode count doesn't match char count");

        let mut segs = vec![];
        let mut seg_start = 0;
        for i in 1..=chars.len() {
            if i == chars.len() || char_modes[i] != char_modes[seg_start] {
                let run = chars[seg_start..i].iter().collect::<String>();
                segs.push(make_segment(char_modes[seg_start], &run)?);
                seg_start = i;
            }
        }
        Ok(segs)
    }

    fn make_segment(mode: Mode, run: &str) -> QRResult<Segment> {
        match mode {
            Mode::Numeric => Segment::numeric(run),
            Mode::Alphanumeric => Segment::alphanumeric(run),
            Mode::Byte => Segment::bytes(run.as_bytes()),
            Mode::Kanji => Segment::kanji(run),
            Mode::Eci => unreachable!("ECI isn't a text mode"),
        }
    }

    #[cfg(test)]
    mod encode_tests {
        use test_case::test_case;

        use super::{
            build_segments, compute_optimal_segments, encode_segments, find_optimal_version_and_segments,
            find_version, ECLevel, Mode, Segment, Version,
        };
        use crate::common::error::QRError;

        #[test]
        fn test_build_segments() {
            let data = "aaaaa11111AAA".chars().collect::<Vec<_>>();
            let mut char_modes = vec![Mode::Byte; 5];
            char_modes.extend([Mode::Numeric; 5]);
            char_modes.extend([Mode::Alphanumeric; 3]);
            let segs = build_segments(&char_modes, &data).unwrap();
            assert_eq!(segs, vec![
                Segment::bytes(b"aaaaa").unwrap(),
                Segment::numeric("11111").unwrap(),
                Segment::alphanumeric("AAA").unwrap(),
            ]);
        }

        #[test_case("1111111", 1, vec![(Mode::Numeric, "1111111")])]
        #[test_case("AAAAA", 1, vec![(Mode::Alphanumeric, "AAAAA")])]
        #[test_case("aaaaa", 1, vec![(Mode::Byte, "aaaaa")])]
        #[test_case("1111111AAAA", 1, vec![(Mode::Numeric, "1111111"), (Mode::Alphanumeric, "AAAA")])]
        #[test_case("111111AAAA", 1, vec![(Mode::Alphanumeric, "111111AAAA")])]
        #[test_case("aaa11111a", 1, vec![(Mode::Byte, "aaa11111a")])]
        #[test_case("aaa111111a", 1, vec![(Mode::Byte, "aaa"), (Mode::Numeric, "111111"), (Mode::Byte, "a")])]
        #[test_case("aaa1111A", 1, vec![(Mode::Byte, "aaa1111A")])]
        #[test_case("aaa1111AA", 1, vec![(Mode::Byte, "aaa"), (Mode::Alphanumeric, "1111AA")])]
        #[test_case("aaa1111111AA", 1, vec![(Mode::Byte, "aaa"), (Mode::Numeric, "1111111"), (Mode::Alphanumeric, "AA")])]
        #[test_case("点茗点茗", 1, vec![(Mode::Kanji, "点茗点茗")])]
        #[test_case("a点茗", 1, vec![(Mode::Byte, "a"), (Mode::Kanji, "点茗")])]
        #[test_case("abc点茗点茗点茗点茗", 1, vec![(Mode::Byte, "abc"), (Mode::Kanji, "点茗点茗点茗点茗")])]
        fn test_compute_optimal_segments(data: &str, ver: usize, exp: Vec<(Mode, &str)>) {
            let segs = compute_optimal_segments(data, Version(ver)).unwrap();
            let segs = segs.iter().map(|s| s.mode()).collect::<Vec<_>>();
            let exp_segs = exp.iter().map(|(m, _)| *m).collect::<Vec<_>>();
            assert_eq!(segs, exp_segs);

            let segs = compute_optimal_segments(data, Version(ver)).unwrap();
            for (seg, (mode, run)) in segs.iter().zip(exp) {
                let exp_seg = match mode {
                    Mode::Numeric => Segment::numeric(run),
                    Mode::Alphanumeric => Segment::alphanumeric(run),
                    Mode::Byte => Segment::bytes(run.as_bytes()),
                    Mode::Kanji => Segment::kanji(run),
                    Mode::Eci => unreachable!(),
                };
                assert_eq!(*seg, exp_seg.unwrap());
            }
        }

        #[test]
        fn test_compute_optimal_segments_alternating() {
            let data = "A11111111111111".repeat(23);
            let segs = compute_optimal_segments(&data, Version(9)).unwrap();
            assert_eq!(segs.len(), 46);
            for (i, c) in data.as_bytes().chunks(15).enumerate() {
                assert_eq!(segs[i * 2], Segment::alphanumeric("A").unwrap());
                let digits = std::str::from_utf8(&c[1..]).unwrap();
                assert_eq!(segs[i * 2 + 1], Segment::numeric(digits).unwrap());
            }
        }

        #[test]
        fn test_compute_optimal_segments_empty() {
            assert!(compute_optimal_segments("", Version(1)).unwrap().is_empty());
        }

        #[test_case("aaaaa11111AAA".to_string(), 1, ECLevel::L)]
        #[test_case("A11111111111111".repeat(2), 2, ECLevel::L)]
        #[test_case("A11111111111111".repeat(4), 3, ECLevel::L)]
        #[test_case("aAAAAAAAAAAA".repeat(5), 4, ECLevel::L)]
        #[test_case("aAAAAAAAAAAA".repeat(21), 10, ECLevel::L)]
        #[test_case("a".repeat(2953), 40, ECLevel::L)]
        #[test_case("3".repeat(7089), 40, ECLevel::L)]
        #[test_case(String::new(), 1, ECLevel::H)]
        fn test_find_optimal_ver_and_segments(data: String, exp_ver: usize, ecl: ECLevel) {
            let (ver, segs, bits) =
                find_optimal_version_and_segments(&data, ecl, Version::MIN, Version::MAX).unwrap();
            assert_eq!(ver, Version(exp_ver));
            assert_eq!(Segment::total_bits(&segs, ver), Some(bits));
            assert!(bits <= ver.data_bit_capacity(ecl));
        }

        #[test]
        fn test_find_optimal_ver_and_segments_too_long() {
            let data = "a".repeat(2954);
            let res =
                find_optimal_version_and_segments(&data, ECLevel::L, Version::MIN, Version::MAX);
            assert_eq!(res.unwrap_err(), QRError::DataTooLong { bits: Some(23652), capacity: 23648 });

            let data = "1".repeat(7090);
            let res =
                find_optimal_version_and_segments(&data, ECLevel::L, Version::MIN, Version::MAX);
            assert_eq!(res.unwrap_err(), QRError::DataTooLong { bits: Some(23652), capacity: 23648 });

            let data = "a".repeat(65536);
            let res =
                find_optimal_version_and_segments(&data, ECLevel::L, Version::MIN, Version::MAX);
            assert_eq!(res.unwrap_err(), QRError::DataTooLong { bits: None, capacity: 23648 });
        }

        #[test]
        fn test_find_optimal_ver_and_segments_range() {
            let data = "HELLO WORLD";
            let (ver, _, _) =
                find_optimal_version_and_segments(data, ECLevel::Q, Version(5), Version(10))
                    .unwrap();
            assert_eq!(ver, Version(5));

            let res = find_optimal_version_and_segments(data, ECLevel::H, Version(1), Version(1));
            assert!(matches!(res, Err(QRError::DataTooLong { bits: Some(74), capacity: 72 })));
        }

        #[test]
        fn test_find_version() {
            let segs = [Segment::eci(26).unwrap(), Segment::bytes(&[0xab; 14]).unwrap()];
            assert_eq!(find_version(&segs, ECLevel::L, Version::MIN, Version::MAX), Ok((Version(1), 136)));
            assert_eq!(find_version(&segs, ECLevel::M, Version::MIN, Version::MAX), Ok((Version(2), 136)));
            assert_eq!(
                find_version(&segs, ECLevel::M, Version::MIN, Version::MIN),
                Err(QRError::DataTooLong { bits: Some(136), capacity: 128 })
            );
        }

        #[test]
        fn test_encode_segments_empty() {
            let bs = encode_segments(&[], Version(1), ECLevel::H).unwrap();
            assert_eq!(bs.data(), &[0x00, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11]);
        }

        #[test]
        fn test_encode_segments() {
            let segs = [Segment::numeric("01234567").unwrap()];
            let bs = encode_segments(&segs, Version(1), ECLevel::M).unwrap();
            assert_eq!(bs.data(), &[
                0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11,
                0xec, 0x11
            ]);
        }

        #[test]
        fn test_encode_segments_overflow() {
            let segs = [Segment::bytes(&[0; 20]).unwrap()];
            let res = encode_segments(&segs, Version(1), ECLevel::L);
            assert_eq!(res, Err(QRError::DataTooLong { bits: Some(172), capacity: 152 }));
        }
    }
}

// Writer for encoded data
//------------------------------------------------------------------------------

pub(super) mod writer {
    use crate::common::bit_utils::BitStream;
    use crate::common::codec::{Segment, PADDING_CODEWORDS};
    use crate::common::error::{QRError, QRResult};
    use crate::common::metadata::Version;

    pub fn push_segment(seg: &Segment, ver: Version, out: &mut BitStream) -> QRResult<()> {
        push_header(seg, ver, out)?;
        out.extend(seg.data())
    }

    fn push_header(seg: &Segment, ver: Version, out: &mut BitStream) -> QRResult<()> {
        out.push_bits(seg.mode() as u8, ver.mode_bits())?;
        let len_bits = ver.char_cnt_bits(seg.mode());
        let char_cnt = seg.char_count();
        if char_cnt >= 1 << len_bits {
            return Err(QRError::DataTooLong { bits: None, capacity: out.capacity() });
        }
        out.push_bits(char_cnt, len_bits)
    }

    pub fn push_terminator(out: &mut BitStream) -> QRResult<()> {
        let term_len = std::cmp::min(4, out.capacity() - out.len());
        out.push_bits(0u8, term_len)
    }

    pub fn pad_remaining_capacity(out: &mut BitStream) -> QRResult<()> {
        push_padding_bits(out)?;
        push_padding_codewords(out)
    }

    fn push_padding_bits(out: &mut BitStream) -> QRResult<()> {
        let offset = out.len() & 7;
        if offset > 0 {
            let padding_bits_len = 8 - offset;
            out.push_bits(0u8, padding_bits_len)?;
        }
        Ok(())
    }

    fn push_padding_codewords(out: &mut BitStream) -> QRResult<()> {
        let offset = out.len() & 7;
        debug_assert!(offset == 0, "Bit offset should be zero before padding codewords: {offset}");

        let remain_byte_capacity = (out.capacity() - out.len()) >> 3;
        for &pc in PADDING_CODEWORDS.iter().cycle().take(remain_byte_capacity) {
            out.push_bits(pc, 8)?;
        }
        Ok(())
    }

    #[cfg(test)]
    mod writer_tests {
        use test_case::test_case;

        use super::{push_header, push_padding_bits, push_padding_codewords, push_terminator};
        use crate::common::bit_utils::BitStream;
        use crate::common::codec::{Mode, Segment};
        use crate::common::error::QRError;
        use crate::common::metadata::{ECLevel, Version};

        #[test_case(1, Mode::Numeric, 1023, vec![0b00011111, 0b11111100])]
        #[test_case(1, Mode::Alphanumeric, 511, vec![0b00101111, 0b11111000])]
        #[test_case(1, Mode::Byte, 255, vec![0b01001111, 0b11110000])]
        #[test_case(1, Mode::Kanji, 255, vec![0b10001111, 0b11110000])]
        #[test_case(10, Mode::Numeric, 4095, vec![0b00011111, 0b11111111])]
        #[test_case(10, Mode::Byte, 65535, vec![0b01001111, 0b11111111, 0b11110000])]
        #[test_case(27, Mode::Alphanumeric, 8191, vec![0b00101111, 0b11111111, 0b10000000])]
        #[test_case(40, Mode::Eci, 0, vec![0b01110000])]
        fn test_push_header(ver: usize, mode: Mode, cnt: usize, exp: Vec<u8>) {
            let ver = Version(ver);
            let mut bs = BitStream::with_capacity(ver.data_bit_capacity(ECLevel::L));
            let seg = Segment::new(mode, cnt, BitStream::new());
            push_header(&seg, ver, &mut bs).unwrap();
            assert_eq!(bs.data(), exp);
        }

        #[test]
        fn test_push_header_count_overflow() {
            let mut bs = BitStream::new();
            let seg = Segment::new(Mode::Numeric, 1024, BitStream::new());
            let res = push_header(&seg, Version(9), &mut bs);
            assert!(matches!(res, Err(QRError::DataTooLong { bits: None, .. })));
        }

        #[test_case(0, 4)]
        #[test_case(150, 2)]
        #[test_case(152, 0)]
        fn test_push_terminator(len: usize, exp_term: usize) {
            let mut bs = BitStream::with_capacity(152);
            (0..len).for_each(|_| bs.push(true).unwrap());
            push_terminator(&mut bs).unwrap();
            assert_eq!(bs.len(), len + exp_term);
        }

        #[test]
        fn test_push_padding() {
            let mut bs = BitStream::with_capacity(48);
            bs.push_bits(0b101u8, 3).unwrap();
            push_padding_bits(&mut bs).unwrap();
            assert_eq!(bs.len(), 8);
            push_padding_codewords(&mut bs).unwrap();
            assert_eq!(bs.data(), &[0b10100000, 0xec, 0x11, 0xec, 0x11, 0xec]);
        }
    }
}
