use std::error::Error;

use qrsmith::{ECLevel, QR};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt().with_env_filter("qrsmith=debug").init();

    // Simplest usage - provide only text, all other settings are automatically chosen
    let qr = QR::encode_text("Hello, world!", ECLevel::L)?;

    // Print to terminal
    println!("{}", qr.to_str(2)?);

    // Convert to image and save
    let img = qr.to_image(10, 4)?; // 10x scale factor, 4 module quiet zone
    img.save("hello-world-QR.png")?;

    // Same symbol as an SVG document
    std::fs::write("hello-world-QR.svg", qr.to_svg(4, "#FFFFFF", "#000000"))?;

    println!("Simple QR code saved to: hello-world-QR.png and hello-world-QR.svg");
    Ok(())
}
