use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};

use super::QR;
use crate::common::error::{QRError, QRResult};
use crate::common::metadata::Color;

// Renderers
//------------------------------------------------------------------------------

impl QR {
    /// Black on white raster with `scale` pixels per module and a quiet zone of `border` modules.
    pub fn to_image(&self, scale: u32, border: u32) -> QRResult<GrayImage> {
        self.render(scale, border, Luma([255]), Luma([0]))
    }

    pub fn to_color_image(
        &self,
        scale: u32,
        border: u32,
        light: Rgb<u8>,
        dark: Rgb<u8>,
    ) -> QRResult<RgbImage> {
        self.render(scale, border, light, dark)
    }

    fn render<P: Pixel>(
        &self,
        scale: u32,
        border: u32,
        light: P,
        dark: P,
    ) -> QRResult<ImageBuffer<P, Vec<P::Subpixel>>> {
        if scale == 0 {
            return Err(QRError::ValueOutOfRange("scale must be positive"));
        }
        let modules = border
            .checked_mul(2)
            .and_then(|b| b.checked_add(self.width() as u32))
            .ok_or(QRError::ValueOutOfRange("border too large"))?;
        let total_sz = modules
            .checked_mul(scale)
            .filter(|&sz| sz <= i32::MAX as u32)
            .ok_or(QRError::ValueOutOfRange("scale too large"))?;

        let border = border as i64;
        let canvas = ImageBuffer::from_fn(total_sz, total_sz, |x, y| {
            let c = (x / scale) as i64 - border;
            let r = (y / scale) as i64 - border;
            let dark_module = i32::try_from(c)
                .ok()
                .zip(i32::try_from(r).ok())
                .is_some_and(|(c, r)| self.get_module(c, r));
            Color::from(dark_module).select(light, dark)
        });
        Ok(canvas)
    }

    /// SVG document drawing every dark module as a unit square, offset by `border` modules.
    pub fn to_svg(&self, border: u32, light: &str, dark: &str) -> String {
        let w = self.width() as u64;
        let dim = w + 2 * border as u64;
        let mut path = Vec::with_capacity(self.count_dark_modules());
        for y in 0..w {
            for x in 0..w {
                if self.get_module(x as i32, y as i32) {
                    path.push(format!("M{},{}h1v1h-1z", x + border as u64, y + border as u64));
                }
            }
        }

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n\
             <svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" \
             viewBox=\"0 0 {dim} {dim}\" stroke=\"none\">\n\
             \t<rect width=\"100%\" height=\"100%\" fill=\"{light}\"/>\n\
             \t<path d=\"{}\" fill=\"{dark}\"/>\n\
             </svg>\n",
            path.join(" ")
        )
    }

    /// Text rendering, two characters per module so the output keeps its aspect ratio.
    pub fn to_str(&self, border: usize) -> QRResult<String> {
        let w = self.width();
        let total_sz = border
            .checked_mul(2)
            .and_then(|b| b.checked_add(w))
            .ok_or(QRError::ValueOutOfRange("border too large"))?;
        // Each row holds two 3 byte chars per module and a newline
        let cap = total_sz
            .checked_mul(6)
            .and_then(|row| row.checked_add(1))
            .and_then(|row| row.checked_mul(total_sz))
            .filter(|&cap| cap <= isize::MAX as usize)
            .ok_or(QRError::ValueOutOfRange("border too large"))?;

        let mut canvas = String::with_capacity(cap);
        for i in 0..total_sz {
            for j in 0..total_sz {
                let r = i as i64 - border as i64;
                let c = j as i64 - border as i64;
                let clr = Color::from(self.get_module(c as i32, r as i32));
                canvas.push_str(clr.select("  ", "██"));
            }
            canvas.push('\n');
        }
        Ok(canvas)
    }
}
