use std::ops::Deref;

use tracing::trace;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        if pattern > 7 {
            return Err(QRError::ValueOutOfRange("mask pattern must be within 0..=7"));
        }
        Ok(Self(pattern))
    }

    /// Parses a mask id where -1 requests automatic selection.
    pub fn from_id(id: i32) -> QRResult<Option<Self>> {
        match id {
            -1 => Ok(None),
            0..=7 => Ok(Some(Self(id as u8))),
            _ => Err(QRError::ValueOutOfRange("mask id must be within -1..=7")),
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..8).map(Self)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i32, c: i32) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i32, _: i32) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i32, c: i32) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i32, c: i32) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i32, c: i32) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i32, c: i32) -> bool {
        ((r * c) & 1) + ((r * c) % 3) == 0
    }

    pub fn diamonds(r: i32, c: i32) -> bool {
        (((r * c) & 1) + ((r * c) % 3)) & 1 == 0
    }

    pub fn meadow(r: i32, c: i32) -> bool {
        (((r + c) & 1) + ((r * c) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    /// Predicate on (row, column) telling whether a data module is inverted.
    pub fn mask_function(self) -> fn(i32, i32) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Invalid pattern {}", self.0),
        }
    }
}

/// Tries all eight masks on `qr` and keeps the one with the lowest penalty.
/// Ties go to the smallest mask id.
pub fn apply_best_mask(qr: &mut QR) -> MaskPattern {
    let mut best: Option<(u32, MaskPattern, QR)> = None;
    for mask in MaskPattern::all() {
        let mut candidate = qr.clone();
        candidate.apply_mask(mask);
        let pen = compute_total_penalty(&candidate);
        trace!(mask = *mask, penalty = pen, "Scored mask");
        if best.as_ref().map_or(true, |(p, ..)| pen < *p) {
            best = Some((pen, mask, candidate));
        }
    }
    match best {
        Some((_, mask, masked)) => {
            *qr = masked;
            mask
        }
        None => unreachable!("Mask candidates are never empty"),
    }
}

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

fn run_penalty(run: u32) -> u32 {
    if run >= 5 {
        run - 2
    } else {
        0
    }
}

// Runs of five or more same colored modules cost 3, plus 1 for each module past five
fn compute_adjacent_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for is_hor in [true, false] {
        for i in 0..w {
            let mut last = None;
            let mut run = 0;
            for j in 0..w {
                let clr = if is_hor { *qr.get(i, j) } else { *qr.get(j, i) };
                if last == Some(clr) {
                    run += 1;
                } else {
                    pen += run_penalty(run);
                    last = Some(clr);
                    run = 1;
                }
            }
            pen += run_penalty(run);
        }
    }
    pen
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// Dark-light-dark-dark-dark-light-dark with four light modules on either side. Modules past
// the edge count as light.
fn compute_finder_pattern_penalty(qr: &QR, is_hor: bool) -> u32 {
    static PATTERN: [Color; 7] = [
        Color::Dark,
        Color::Light,
        Color::Dark,
        Color::Dark,
        Color::Dark,
        Color::Light,
        Color::Dark,
    ];

    let mut pen = 0;
    let w = qr.width() as i16;
    for i in 0..w {
        let get = |j: i16| {
            if !(0..w).contains(&j) {
                Color::Light
            } else if is_hor {
                *qr.get(i, j)
            } else {
                *qr.get(j, i)
            }
        };
        for j in 0..w - 6 {
            if (j..j + 7).map(get).ne(PATTERN.iter().copied()) {
                continue;
            }
            let is_light = |x| get(x) == Color::Light;
            if (j - 4..j).all(is_light) || (j + 7..j + 11).all(is_light) {
                pen += 40;
            }
        }
    }
    pen
}

// 10 points for every full 5% the dark ratio deviates from 50%
fn compute_balance_penalty(qr: &QR) -> u32 {
    let dark_cnt = qr.count_dark_modules();
    let w = qr.width();
    let tot = w * w;
    let dev = (dark_cnt * 20).abs_diff(tot * 10) / tot;
    dev as u32 * 10
}
