use serde::Serialize;

use roofsight_imgproc::segmentation::KMeansParams;

use crate::codec;
use crate::enhancer::{self, Enhancer};
use crate::metadata::ImageMetadata;
use crate::options::ProcessingOptions;

/// Result of enhancing an encoded image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedEnhancement {
    /// JPEG data URL of the enhanced image, or the input string when the run
    /// degraded.
    pub image: String,
    /// Capture context for the downstream consumer.
    pub metadata: ImageMetadata,
    /// Quality score after enhancement, 0 to 100.
    pub quality_score: u8,
    /// Why the run fell back to returning its input, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl EncodedEnhancement {
    fn passthrough(data: &str, options: &ProcessingOptions, reason: String) -> Self {
        log::warn!("returning encoded input unchanged: {}", reason);
        Self {
            image: data.to_string(),
            metadata: ImageMetadata::new(options, 0.0, 0),
            quality_score: 0,
            degraded: Some(reason),
        }
    }
}

impl Enhancer {
    /// Decode, enhance and re-encode an image given as a data URL or base64.
    ///
    /// The output is a JPEG data URL at the configured quality. Decoding or
    /// encoding failures return the input string with a zero score.
    pub fn enhance_encoded(&self, data: &str, options: &ProcessingOptions) -> EncodedEnhancement {
        let buffer = match codec::decode_image(data) {
            Ok(buffer) => buffer,
            Err(err) => return EncodedEnhancement::passthrough(data, options, err.to_string()),
        };

        let result = self.enhance(buffer, options);
        if let Some(reason) = result.degraded {
            return EncodedEnhancement::passthrough(data, options, reason);
        }

        match codec::encode_jpeg_data_url(&result.buffer, self.config().jpeg_quality) {
            Ok(image) => EncodedEnhancement {
                image,
                metadata: result.metadata,
                quality_score: result.quality_score,
                degraded: None,
            },
            Err(err) => EncodedEnhancement::passthrough(data, options, err.to_string()),
        }
    }

    /// Posterize an encoded image and return it as a JPEG data URL at the
    /// configured segmentation quality.
    ///
    /// Returns the input string if it cannot be decoded or encoded.
    pub fn segment_encoded(&self, data: &str, params: &KMeansParams) -> String {
        let quality = self.config().segmentation_jpeg_quality;
        let encoded = codec::decode_image(data)
            .map(|buffer| enhancer::segment_roof_colors(&buffer, params))
            .and_then(|segmented| codec::encode_jpeg_data_url(&segmented, quality));

        encoded.unwrap_or_else(|err| {
            log::warn!("segmentation of encoded image failed: {}", err);
            data.to_string()
        })
    }
}

/// [`Enhancer::enhance_encoded`] with the default configuration.
pub fn enhance_encoded(data: &str, options: &ProcessingOptions) -> EncodedEnhancement {
    Enhancer::default().enhance_encoded(data, options)
}

/// [`Enhancer::segment_encoded`] with the default configuration.
pub fn segment_encoded(data: &str, params: &KMeansParams) -> String {
    Enhancer::default().segment_encoded(data, params)
}

/// Render the pitch visualization of an encoded image as a PNG data URL.
///
/// Returns the input string if it cannot be decoded or encoded.
pub fn enhance_pitch_encoded(data: &str) -> String {
    let encoded = codec::decode_image(data)
        .map(|buffer| enhancer::enhance_roof_pitch(&buffer))
        .and_then(|pitch| codec::encode_png(&pitch))
        .map(|bytes| codec::to_data_url(&bytes, codec::PNG_MIME));

    encoded.unwrap_or_else(|err| {
        log::warn!("pitch visualization of encoded image failed: {}", err);
        data.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::error::PipelineError;
    use crate::options::Dimensions;
    use roofsight_image::{ImageSize, PixelBuffer};

    fn sample_url() -> Result<String, PipelineError> {
        let data = (0..64 * 48)
            .flat_map(|i| {
                let (x, y) = (i % 64, i / 64);
                let v = if (x / 8 + y / 8) % 2 == 0 { 60 } else { 190 };
                [v, v, v, 255]
            })
            .collect();
        let img = PixelBuffer::new([64, 48].into(), data)?;
        Ok(codec::to_data_url(&codec::encode_png(&img)?, codec::PNG_MIME))
    }

    #[test]
    fn enhances_to_jpeg_data_url() -> Result<(), PipelineError> {
        let options = ProcessingOptions {
            dimensions: Dimensions {
                width: 128,
                height: 96,
            },
            ..Default::default()
        };
        let out = enhance_encoded(&sample_url()?, &options);
        assert!(out.degraded.is_none());
        assert!(out.image.starts_with("data:image/jpeg;base64,"));
        assert_eq!(out.metadata.image_quality, out.quality_score);

        let decoded = codec::decode_image(&out.image)?;
        assert_eq!(decoded.size(), ImageSize::from([128, 96]));

        let json = serde_json::to_value(&out)?;
        assert!(json.get("qualityScore").is_some());
        assert!(json.get("degraded").is_none());
        Ok(())
    }

    #[test]
    fn undecodable_input_passes_through() {
        let out = enhance_encoded("data:image/png;base64,@@@@", &ProcessingOptions::default());
        assert_eq!(out.image, "data:image/png;base64,@@@@");
        assert_eq!(out.quality_score, 0);
        assert!(out.degraded.is_some());

        assert_eq!(segment_encoded("nope", &KMeansParams::default()), "nope");
        assert_eq!(enhance_pitch_encoded("nope"), "nope");
    }

    #[test]
    fn segment_and_pitch_produce_images() -> Result<(), PipelineError> {
        let url = sample_url()?;
        let params = KMeansParams {
            k: 2,
            seed: Some(3),
            ..Default::default()
        };

        let segmented = segment_encoded(&url, &params);
        assert!(segmented.starts_with("data:image/jpeg;base64,"));
        assert_eq!(codec::decode_image(&segmented)?.size(), ImageSize::from([64, 48]));

        let pitch = enhance_pitch_encoded(&url);
        assert!(pitch.starts_with("data:image/png;base64,"));
        assert_eq!(codec::decode_image(&pitch)?.size(), ImageSize::from([64, 48]));
        Ok(())
    }

    #[test]
    fn segmentation_uses_configured_quality() -> Result<(), PipelineError> {
        // a noisy frame so the JPEG size tracks the quality setting
        let data = (0..64 * 48)
            .flat_map(|i: usize| {
                let v = (i.wrapping_mul(2_654_435_761) >> 7) as u8;
                [v, v.wrapping_add(90), v / 3, 255]
            })
            .collect();
        let img = PixelBuffer::new([64, 48].into(), data)?;
        let url = codec::to_data_url(&codec::encode_png(&img)?, codec::PNG_MIME);
        let params = KMeansParams {
            k: 8,
            seed: Some(11),
            ..Default::default()
        };

        let low = Enhancer::new(PipelineConfig {
            segmentation_jpeg_quality: 5,
            ..Default::default()
        });
        let coarse = low.segment_encoded(&url, &params);
        let fine = segment_encoded(&url, &params);
        assert!(coarse.starts_with("data:image/jpeg;base64,"));
        assert!(coarse.len() < fine.len(), "{} vs {}", coarse.len(), fine.len());
        Ok(())
    }
}
