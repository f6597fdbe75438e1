//! Image encoding: `DynamicImage` → bytes in the configured [`OutputFormat`].
//!
//! pdfium hands back RGBA bitmaps. Pages are flattened to 8-bit RGB before
//! encoding: JPEG and PPM cannot carry alpha, and a rendered page is opaque
//! anyway, so every format gets the same pixels.

use crate::config::OutputFormat;
use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page in memory.
pub fn encode_frame(img: &DynamicImage, format: OutputFormat) -> Result<Vec<u8>, image::ImageError> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();

    match format {
        OutputFormat::Ppm => {
            PnmEncoder::new(&mut buf)
                .with_subtype(PnmSubtype::Pixmap(SampleEncoding::Binary))
                .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        }
        OutputFormat::Jpeg => write_with(&rgb, ImageFormat::Jpeg, &mut buf)?,
        OutputFormat::Png => write_with(&rgb, ImageFormat::Png, &mut buf)?,
        OutputFormat::Tiff => write_with(&rgb, ImageFormat::Tiff, &mut buf)?,
    }

    debug!(
        "Encoded {}x{} page → {} bytes {}",
        rgb.width(),
        rgb.height(),
        buf.len(),
        format
    );
    Ok(buf)
}

fn write_with(
    rgb: &image::RgbImage,
    format: ImageFormat,
    buf: &mut Vec<u8>,
) -> Result<(), image::ImageError> {
    rgb.write_to(&mut Cursor::new(buf), format)
}
