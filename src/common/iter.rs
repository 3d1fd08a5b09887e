use super::metadata::Version;

// Iterator for placing data in encoding region of QR
//------------------------------------------------------------------------------

/// Zigzag traversal of the symbol: column pairs from the right edge, alternating upward and
/// downward sweeps, stepping over the vertical timing column. Yields every module outside
/// column 6 once, including function modules, which callers skip.
pub struct EncRegionIter {
    // Right column of the current pair
    c: i16,
    // Position within the pair sweep, 0..2 * width
    step: i16,
    width: i16,
}

const VERT_TIMING_COL: i16 = 6;

impl EncRegionIter {
    pub const fn new(version: Version) -> Self {
        let w = version.width() as i16;
        Self { c: w - 1, step: 0, width: w }
    }
}

impl Iterator for EncRegionIter {
    type Item = (i16, i16);

    fn next(&mut self) -> Option<Self::Item> {
        if self.c < 1 {
            return None;
        }

        let upward = (self.c + 1) & 2 == 0;
        let i = self.step >> 1;
        let r = if upward { self.width - 1 - i } else { i };
        let res = (r, self.c - (self.step & 1));

        self.step += 1;
        if self.step == self.width * 2 {
            self.step = 0;
            self.c -= 2;
            if self.c == VERT_TIMING_COL {
                self.c -= 1;
            }
        }
        Some(res)
    }
}

#[cfg(test)]
mod iter_tests {
    use std::collections::HashSet;

    use super::EncRegionIter;
    use crate::common::metadata::Version;

    #[test]
    fn test_enc_region_iter_start() {
        let coords = EncRegionIter::new(Version(1)).take(6).collect::<Vec<_>>();
        assert_eq!(coords, [(20, 20), (20, 19), (19, 20), (19, 19), (18, 20), (18, 19)]);
    }

    #[test]
    fn test_enc_region_iter_turn() {
        // Upward sweep over columns 20 & 19 ends at row 0, then columns 18 & 17 go down
        let coords = EncRegionIter::new(Version(1)).skip(40).take(4).collect::<Vec<_>>();
        assert_eq!(coords, [(0, 20), (0, 19), (0, 18), (0, 17)]);
    }

    #[test]
    fn test_enc_region_iter_skips_timing_col() {
        let coords = EncRegionIter::new(Version(1)).collect::<Vec<_>>();
        let tail = &coords[coords.len() - 4..];
        assert_eq!(tail, [(19, 1), (19, 0), (20, 1), (20, 0)]);
        assert!(coords.iter().all(|&(_, c)| c != 6));
    }

    #[test]
    fn test_enc_region_iter_visits_all() {
        for v in 1..=40 {
            let ver = Version(v);
            let w = ver.width() as i16;
            let coords = EncRegionIter::new(ver).collect::<Vec<_>>();
            let uniq = coords.iter().copied().collect::<HashSet<_>>();
            assert_eq!(coords.len(), (w * (w - 1)) as usize);
            assert_eq!(uniq.len(), coords.len());
        }
    }
}
