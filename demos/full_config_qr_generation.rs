use std::error::Error;

use image::Rgb;
use qrsmith::{ECLevel, MaskPattern, QRBuilder, Segment, Version, QR};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "qrsmith=debug".into()))
        .init();

    // Numeric text lands in a single numeric segment
    let qr = QRBuilder::new("314159265358979323846264338327950288419716939937510")
        .ec_level(ECLevel::M)
        .build()?;
    qr.to_image(10, 4)?.save("pi-digits-QR.png")?;
    println!("Pi digits: {}", qr.metadata());

    // Alphanumeric text at the highest correction level
    let qr = QRBuilder::new("DOLLAR-AMOUNT:$39.87 PERCENTAGE:100.00% OPERATIONS:+-*/")
        .ec_level(ECLevel::H)
        .build()?;
    qr.to_image(10, 4)?.save("alphanumeric-QR.png")?;

    // Unicode text goes into byte segments
    let qr = QR::encode_text("こんにちwa、世界！ αβγδ", ECLevel::Q)?;
    qr.to_image(10, 4)?.save("unicode-QR.png")?;

    // Hand made segments mixing modes
    let segs = [
        Segment::alphanumeric("THE SQUARE ROOT OF 2 IS 1.")?,
        Segment::numeric("41421356237309504880168872420969807856967187537694")?,
    ];
    let qr = QRBuilder::with_segments(&segs).ec_level(ECLevel::L).build()?;
    qr.to_image(10, 4)?.save("sqrt2-QR.png")?;

    // Kanji mode packs each double byte character into 13 bits
    let segs = [Segment::kanji("「魔法少女まどか☆マギカ」って、　ИАИ　ｄｅｓｕ　κα？")?];
    let qr = QRBuilder::with_segments(&segs).ec_level(ECLevel::L).build()?;
    qr.to_image(10, 4)?.save("madoka-kanji-QR.png")?;

    // Every knob: version range, forced mask, ecl boosting and custom colors
    let qr = QRBuilder::new("https://www.wikipedia.org/wiki/QR_code")
        .version_range(Version::new(3)?, Version::new(10)?) // if not provided, 1..=40
        .ec_level(ECLevel::L)                                // if not provided, ECLevel::M
        .mask(MaskPattern::new(4)?)                          // if not provided, lowest penalty
        .boost_ecl(true)                                     // if not provided, false
        .build()?;
    let img = qr.to_color_image(8, 4, Rgb([0xff, 0xf8, 0xe7]), Rgb([0x1f, 0x3a, 0x5f]))?;
    img.save("configured-QR.png")?;
    std::fs::write("configured-QR.svg", qr.to_svg(4, "#FFF8E7", "#1F3A5F"))?;

    println!("Configured QR code saved to: configured-QR.png");
    println!("QR metadata: {}", qr.metadata());

    Ok(())
}
