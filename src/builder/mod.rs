mod qr;
mod render;

pub use qr::QR;
#[cfg(test)]
pub(crate) use qr::Module;

use std::ops::Deref;

use tracing::{debug, trace};

use crate::common::{
    bit_utils::BitStream,
    codec::{encode_segments, find_optimal_version_and_segments, find_version, Segment},
    ec::ecc_per_block,
    error::{QRError, QRResult},
    mask::{apply_best_mask, MaskPattern},
    metadata::{ECLevel, Version},
};

#[derive(Debug, Clone, Copy)]
enum Input<'a> {
    Text(&'a str),
    Segments(&'a [Segment]),
}

/// Configures and builds a [`QR`] symbol.
///
/// ```
/// use qrsmith::{ECLevel, QRBuilder, Version};
///
/// let qr = QRBuilder::new("HELLO WORLD")
///     .ec_level(ECLevel::Q)
///     .version_range(Version::new(1).unwrap(), Version::new(10).unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(*qr.version(), 1);
/// ```
pub struct QRBuilder<'a> {
    input: Input<'a>,
    ec_level: ECLevel,
    min_version: Version,
    max_version: Version,
    mask: Option<MaskPattern>,
    boost_ecl: bool,
}

impl<'a> QRBuilder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::with_input(Input::Text(text))
    }

    /// Builds from caller supplied segments, kept exactly as given.
    pub fn with_segments(segs: &'a [Segment]) -> Self {
        Self::with_input(Input::Segments(segs))
    }

    fn with_input(input: Input<'a>) -> Self {
        Self {
            input,
            ec_level: ECLevel::M,
            min_version: Version::MIN,
            max_version: Version::MAX,
            mask: None,
            boost_ecl: false,
        }
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    /// Pins the symbol to exactly `version`.
    pub fn version(&mut self, version: Version) -> &mut Self {
        self.min_version = version;
        self.max_version = version;
        self
    }

    pub fn version_range(&mut self, min: Version, max: Version) -> &mut Self {
        self.min_version = min;
        self.max_version = max;
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.min_version = Version::MIN;
        self.max_version = Version::MAX;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    /// Numeric form of [`mask`](Self::mask): 0..=7 forces a pattern, -1 selects automatically.
    pub fn mask_id(&mut self, id: i32) -> QRResult<&mut Self> {
        self.mask = MaskPattern::from_id(id)?;
        Ok(self)
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    /// Raises the error correction level when the data still fits the chosen version.
    pub fn boost_ecl(&mut self, boost: bool) -> &mut Self {
        self.boost_ecl = boost;
        self
    }

    pub fn metadata(&self) -> String {
        let mask = self.mask.map_or("Auto".to_string(), |m| (*m).to_string());
        format!(
            "{{ Version: {}..={}, Ec level: {:?}, Mask: {mask}, Boost ecl: {} }}",
            self.min_version, self.max_version, self.ec_level, self.boost_ecl
        )
    }
}

#[cfg(test)]
mod qrbuilder_util_tests {
    use super::QRBuilder;
    use crate::common::error::QRError;
    use crate::common::mask::MaskPattern;
    use crate::common::metadata::{ECLevel, Version};

    #[test]
    fn test_metadata() {
        let mut qr_builder = QRBuilder::new("Hello, world!");
        qr_builder.version(Version(3)).ec_level(ECLevel::L).mask(MaskPattern::new(5).unwrap());
        assert_eq!(
            qr_builder.metadata(),
            "{ Version: 3..=3, Ec level: L, Mask: 5, Boost ecl: false }"
        );
        qr_builder.unset_version().unset_mask().boost_ecl(true);
        assert_eq!(
            qr_builder.metadata(),
            "{ Version: 1..=40, Ec level: L, Mask: Auto, Boost ecl: true }"
        );
    }

    #[test]
    fn test_mask_id() {
        let mut qr_builder = QRBuilder::new("");
        assert!(qr_builder.mask_id(6).is_ok());
        assert_eq!(qr_builder.mask, Some(MaskPattern::new(6).unwrap()));
        assert!(qr_builder.mask_id(-1).is_ok());
        assert_eq!(qr_builder.mask, None);
        assert!(matches!(qr_builder.mask_id(8), Err(QRError::ValueOutOfRange(_))));
        assert!(matches!(qr_builder.mask_id(-2), Err(QRError::ValueOutOfRange(_))));
    }

    #[test]
    fn test_invalid_version_range() {
        let res = QRBuilder::new("1").version_range(Version(5), Version(4)).build();
        assert!(matches!(res, Err(QRError::ValueOutOfRange(_))));
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<QR> {
        if self.min_version > self.max_version {
            return Err(QRError::ValueOutOfRange("min version exceeds max version"));
        }

        debug!("Generating QR {}", self.metadata());

        let (ver, segs, bits) = match self.input {
            Input::Text(text) => find_optimal_version_and_segments(
                text,
                self.ec_level,
                self.min_version,
                self.max_version,
            )?,
            Input::Segments(segs) => {
                let (ver, bits) =
                    find_version(segs, self.ec_level, self.min_version, self.max_version)?;
                (ver, segs.to_vec(), bits)
            }
        };

        let ecl = match self.boost_ecl {
            true => Self::boosted_ecl(ver, self.ec_level, bits),
            false => self.ec_level,
        };
        trace!(version = *ver, ecl = ?ecl, bits, segments = segs.len(), "Chose version");

        let encoded = encode_segments(&segs, ver, ecl)?;
        let payload = Self::construct_payload(encoded.data(), ver, ecl)?;

        let mut qr = QR::new(ver, ecl);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&payload);

        let mask = match self.mask {
            Some(m) => {
                qr.apply_mask(m);
                m
            }
            None => apply_best_mask(&mut qr),
        };

        let total_modules = qr.width() * qr.width();
        let dark_modules = qr.count_dark_modules();
        debug!(
            version = *ver,
            ecl = ?ecl,
            mask = *mask,
            data_bits = bits,
            capacity = ver.data_bit_capacity(ecl),
            dark_modules,
            balance = dark_modules * 100 / total_modules,
            "QR generated"
        );

        Ok(qr)
    }

    // Strongest level above `ecl` that still holds `bits` at `ver`
    fn boosted_ecl(ver: Version, ecl: ECLevel, bits: usize) -> ECLevel {
        ECLevel::ALL
            .into_iter()
            .filter(|&e| e > ecl && bits <= ver.data_bit_capacity(e))
            .max()
            .unwrap_or(ecl)
    }

    fn construct_payload(data: &[u8], ver: Version, ecl: ECLevel) -> QRResult<BitStream> {
        let (data_blocks, ecc_blocks) = Self::compute_ecc(data, ver, ecl);

        let mut payload = BitStream::with_capacity(ver.total_codewords() << 3);
        payload.extend_bytes(&Self::interleave(&data_blocks))?;
        payload.extend_bytes(&Self::interleave(&ecc_blocks))?;

        debug_assert_eq!(payload.len(), ver.total_codewords() << 3, "Payload doesn't fill symbol");
        Ok(payload)
    }

    // ECC: Error Correction Codeword generator
    fn compute_ecc(data: &[u8], ver: Version, ecl: ECLevel) -> (Vec<&[u8]>, Vec<Vec<u8>>) {
        let data_blocks = Self::blockify(data, ver, ecl);

        let ecc_size_per_block = ver.ecc_per_block(ecl);
        let ecc_blocks =
            data_blocks.iter().map(|b| ecc_per_block(b, ecc_size_per_block)).collect::<Vec<_>>();

        (data_blocks, ecc_blocks)
    }

    // Short blocks come first, each long block holds one extra data codeword
    fn blockify(data: &[u8], ver: Version, ecl: ECLevel) -> Vec<&[u8]> {
        let (block1_size, block1_count, block2_size, block2_count) =
            ver.data_codewords_per_block(ecl);

        let total_block1_size = block1_size * block1_count;
        debug_assert_eq!(
            total_block1_size + block2_size * block2_count,
            data.len(),
            "Data len doesn't match total size of blocks"
        );

        let mut data_blocks = Vec::with_capacity(block1_count + block2_count);
        data_blocks.extend(data[..total_block1_size].chunks(block1_size));
        if block2_size > 0 {
            data_blocks.extend(data[total_block1_size..].chunks(block2_size));
        }
        data_blocks
    }

    fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}


// Convenience constructors on QR
//------------------------------------------------------------------------------

impl QR {
    /// Smallest symbol for `text` at `ecl` or above, picking the mask automatically.
    pub fn encode_text(text: &str, ecl: ECLevel) -> QRResult<Self> {
        QRBuilder::new(text).ec_level(ecl).boost_ecl(true).build()
    }

    /// Smallest symbol holding `data` as a single byte segment.
    pub fn encode_binary(data: &[u8], ecl: ECLevel) -> QRResult<Self> {
        let segs = [Segment::bytes(data)?];
        QRBuilder::with_segments(&segs).ec_level(ecl).boost_ecl(true).build()
    }

    /// Full control over the segment list, version range, mask and ecl boosting.
    /// `mask` of -1 selects the best pattern.
    pub fn encode_segments(
        segs: &[Segment],
        ecl: ECLevel,
        min_version: Version,
        max_version: Version,
        mask: i32,
        boost_ecl: bool,
    ) -> QRResult<Self> {
        QRBuilder::with_segments(segs)
            .ec_level(ecl)
            .version_range(min_version, max_version)
            .mask_id(mask)?
            .boost_ecl(boost_ecl)
            .build()
    }
}
