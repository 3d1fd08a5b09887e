//! # qrsmith
//!
//! A Rust library for building QR Code symbols (Model 2, versions 1 to 40) from text, bytes or
//! hand made segments.
//!
//! ## Features
//!
//! - **Optimal segmentation**: Text is split into numeric, alphanumeric, byte and kanji segments
//!   to minimise the encoded length
//! - **Version selection**: Picks the smallest version within a range that fits the data
//! - **Reed-Solomon error correction**: Levels L, M, Q and H, with optional boosting when the
//!   data leaves room for it
//! - **Mask selection**: Scores all eight masks with the standard penalty rules and keeps the best
//! - **Rendering**: Grayscale or colored rasters through `image`, SVG documents and plain text
//!
//! ## Quick Start
//!
//! ### Simple QR Code Generation
//!
//! ```rust,no_run
//! use qrsmith::{ECLevel, QR};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Smallest version that fits, best mask, ecl raised when there is room
//! let qr = QR::encode_text("Hello, world!", ECLevel::L)?;
//!
//! let img = qr.to_image(4, 4)?; // 4x scale factor, 4 module quiet zone
//! img.save("simple_qr.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Full Configuration
//!
//! ```rust
//! use qrsmith::{ECLevel, MaskPattern, QRBuilder, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let qr = QRBuilder::new("3141592653589793238462643383")
//!     .version_range(Version::new(1)?, Version::new(10)?) // if not provided, 1..=40
//!     .ec_level(ECLevel::M)                                // if not provided, ECLevel::M
//!     .mask(MaskPattern::new(3)?)                          // if not provided, lowest penalty
//!     .boost_ecl(true)                                     // if not provided, false
//!     .build()?;
//!
//! assert_eq!(qr.size(), 21);
//! println!("{}", qr.to_str(2)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Manual Segments
//!
//! ```rust
//! use qrsmith::{ECLevel, QRBuilder, Segment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let segs = [
//!     Segment::alphanumeric("THE SQUARE ROOT OF 2 IS 1.")?,
//!     Segment::numeric("41421356237309504880168872420969807856967187537694")?,
//! ];
//! let qr = QRBuilder::with_segments(&segs).ec_level(ECLevel::L).build()?;
//! assert!(qr.get_module(0, 0));
//! # Ok(())
//! # }
//! ```
//!
//! ## QR Code Components
//!
//! ### Versions
//! Versions 1 to 40, with sizes from 21x21 to 177x177 modules.
//!
//! ### Error Correction Levels
//! - **L (Low)**: ~7% error correction
//! - **M (Medium)**: ~15% error correction
//! - **Q (Quartile)**: ~25% error correction
//! - **H (High)**: ~30% error correction
//!
//! ## Logging
//!
//! Build steps emit `tracing` events: a `debug` report for every generated symbol and `trace`
//! events for segmentation and mask scores. Install any subscriber to see them.

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;

pub use builder::{QRBuilder, QR};
pub use common::bit_utils::BitStream;
pub use common::codec::{is_alphanumeric, is_kanji, is_numeric, Mode, Segment};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{ECLevel, Version};
