use std::path::Path;

use base64::Engine as _;
use image::ImageEncoder;

use roofsight_image::{ImageSize, PixelBuffer};

use crate::error::PipelineError;

/// MIME type of JPEG output.
pub const JPEG_MIME: &str = "image/jpeg";

/// MIME type of PNG output.
pub const PNG_MIME: &str = "image/png";

const DATA_URL_MARKER: &str = ";base64,";

/// Decode an image from a data URL or a bare base64 string.
///
/// # Errors
///
/// Returns an error if the data URL has no base64 body, the payload is not
/// valid base64, or the bytes are not a supported image.
pub fn decode_image(data: &str) -> Result<PixelBuffer, PipelineError> {
    let payload = match data.strip_prefix("data:") {
        Some(rest) => match rest.split_once(DATA_URL_MARKER) {
            Some((_, body)) => body,
            None => {
                let header = rest.split(',').next().unwrap_or_default();
                return Err(PipelineError::UnsupportedDataUrl(header.to_string()));
            }
        },
        None => data,
    };

    let bytes = base64::engine::general_purpose::STANDARD.decode(payload.trim())?;
    decode_image_bytes(&bytes)
}

/// Decode PNG or JPEG bytes into an RGBA buffer.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = ImageSize {
        width: rgba.width() as usize,
        height: rgba.height() as usize,
    };
    Ok(PixelBuffer::new(size, rgba.into_raw())?)
}

/// Read an image file into an RGBA buffer.
///
/// # Errors
///
/// Returns an error if the file cannot be read or decoded.
pub fn read_image(path: impl AsRef<Path>) -> Result<PixelBuffer, PipelineError> {
    let bytes = std::fs::read(path)?;
    decode_image_bytes(&bytes)
}

/// Encode a buffer as JPEG, dropping alpha. `quality` is clamped to 1..=100.
///
/// # Errors
///
/// Returns an error if the encoder rejects the buffer.
pub fn encode_jpeg(buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, PipelineError> {
    let rgb: Vec<u8> = buffer
        .as_slice()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
    encoder.encode(
        &rgb,
        buffer.width() as u32,
        buffer.height() as u32,
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

/// Encode a buffer as PNG, keeping alpha.
///
/// # Errors
///
/// Returns an error if the encoder rejects the buffer.
pub fn encode_png(buffer: &PixelBuffer) -> Result<Vec<u8>, PipelineError> {
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out).write_image(
        buffer.as_slice(),
        buffer.width() as u32,
        buffer.height() as u32,
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(out)
}

/// Wrap encoded bytes in a `data:<mime>;base64,` URL.
pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!(
        "data:{}{}{}",
        mime,
        DATA_URL_MARKER,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Encode a buffer as a JPEG data URL.
///
/// # Errors
///
/// Returns an error if the encoder rejects the buffer.
pub fn encode_jpeg_data_url(buffer: &PixelBuffer, quality: u8) -> Result<String, PipelineError> {
    Ok(to_data_url(&encode_jpeg(buffer, quality)?, JPEG_MIME))
}

/// Write a buffer to disk, choosing the format from the file extension.
///
/// Files ending in `.jpg` or `.jpeg` are written as JPEG at `jpeg_quality`,
/// everything else as PNG.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_image(
    path: impl AsRef<Path>,
    buffer: &PixelBuffer,
    jpeg_quality: u8,
) -> Result<(), PipelineError> {
    let path = path.as_ref();
    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg"));

    let bytes = if is_jpeg {
        encode_jpeg(buffer, jpeg_quality)?
    } else {
        encode_png(buffer)?
    };
    log::debug!("writing {} ({} bytes)", path.display(), bytes.len());
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Result<PixelBuffer, PipelineError> {
        let data = (0..8 * 4)
            .flat_map(|i| [(i * 8) as u8, 100, 200, 255])
            .collect();
        Ok(PixelBuffer::new([8, 4].into(), data)?)
    }

    #[test]
    fn png_data_url_round_trip() -> Result<(), PipelineError> {
        let img = gradient()?;
        let url = to_data_url(&encode_png(&img)?, PNG_MIME);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_image(&url)?, img);

        // bare base64 works too
        let bare = url.trim_start_matches("data:image/png;base64,");
        assert_eq!(decode_image(bare)?, img);
        Ok(())
    }

    #[test]
    fn jpeg_keeps_size_and_drops_alpha() -> Result<(), PipelineError> {
        let mut img = gradient()?;
        img.set_pixel(0, 0, [10, 20, 30, 0])?;
        let url = encode_jpeg_data_url(&img, 0)?;
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let decoded = decode_image(&url)?;
        assert_eq!(decoded.size(), img.size());
        assert!(decoded.as_slice().chunks_exact(4).all(|px| px[3] == 255));
        Ok(())
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(matches!(
            decode_image("data:image/png,rawbytes"),
            Err(PipelineError::UnsupportedDataUrl(h)) if h == "image/png"
        ));
        assert!(matches!(
            decode_image("***not base64***"),
            Err(PipelineError::Base64Error(_))
        ));
        assert!(matches!(
            decode_image("aGVsbG8gd29ybGQ="),
            Err(PipelineError::CodecError(_))
        ));
    }

    #[test]
    fn write_picks_format_from_extension() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let img = gradient()?;

        let png = dir.path().join("out.png");
        write_image(&png, &img, 90)?;
        assert_eq!(read_image(&png)?, img);

        let jpg = dir.path().join("out.JPG");
        write_image(&jpg, &img, 90)?;
        assert_eq!(std::fs::read(&jpg)?[..2], [0xFF, 0xD8]);
        Ok(())
    }
}
