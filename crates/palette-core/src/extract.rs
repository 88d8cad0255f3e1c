//! Dominant color extraction from sprite artwork.
//!
//! The extractor samples a fixed stride of pixels, drops near-transparent
//! pixels and a configurable set of outline colors, and ranks what is left
//! by frequency. Counts are approximate by construction: only every
//! `sample_stride`-th pixel is visited.

use std::collections::HashMap;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ExtractError;

/// Visit every 4th pixel (16 bytes of RGBA).
pub const DEFAULT_SAMPLE_STRIDE: usize = 4;

/// Pixels with alpha below this are treated as background.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 200;

/// Outline and background shades produced by the sprite renderer.
pub const DEFAULT_EXCLUDED_COLORS: &[&str] = &["#000000", "#101010", "#121212"];

/// Gray used to pad palettes that came back short.
pub const DEFAULT_FILL_COLOR: &str = "#94a3b8";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorConfig {
    /// Pixel stride of the sampling scan. 1 visits every pixel.
    pub sample_stride: usize,

    /// Minimum alpha for a pixel to count.
    pub alpha_threshold: u8,

    /// `#rrggbb` colors never reported in a palette.
    pub excluded_colors: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sample_stride: DEFAULT_SAMPLE_STRIDE,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            excluded_colors: DEFAULT_EXCLUDED_COLORS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// One palette entry with its share of the counted pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedColor {
    pub hex: String,
    pub frequency: u32,
    pub percentage: f64,
}

/// Result shape of [`ColorExtractor::extract_colors`]: bare hex strings, or
/// hex strings with their frequencies.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    Hex(Vec<String>),
    Detailed(Vec<ExtractedColor>),
}

impl Extraction {
    pub fn len(&self) -> usize {
        match self {
            Extraction::Hex(colors) => colors.len(),
            Extraction::Detailed(colors) => colors.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered frequency table built by one scan.
struct ColorCounts {
    entries: Vec<([u8; 3], u32)>,
    total: u64,
}

#[derive(Debug, Clone)]
pub struct ColorExtractor {
    stride: usize,
    alpha_threshold: u8,
    excluded: Vec<[u8; 3]>,
}

impl Default for ColorExtractor {
    fn default() -> Self {
        Self {
            stride: DEFAULT_SAMPLE_STRIDE,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            excluded: vec![[0x00, 0x00, 0x00], [0x10, 0x10, 0x10], [0x12, 0x12, 0x12]],
        }
    }
}

impl ColorExtractor {
    /// Build an extractor, validating the stride and every excluded color.
    pub fn new(config: &ExtractorConfig) -> Result<Self, ExtractError> {
        if config.sample_stride == 0 {
            return Err(ExtractError::InvalidParameter {
                parameter: "sample_stride".to_string(),
                value: "0".to_string(),
            });
        }

        let excluded = config
            .excluded_colors
            .iter()
            .map(|c| parse_hex(c))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            stride: config.sample_stride,
            alpha_threshold: config.alpha_threshold,
            excluded,
        })
    }

    /// Top `count` colors of an encoded image, hex only or with frequencies.
    pub fn extract_colors(
        &self,
        bytes: &[u8],
        count: usize,
        include_frequencies: bool,
    ) -> Result<Extraction, ExtractError> {
        let image = decode(bytes)?;
        let colors = self.extract(&image, count);
        Ok(if include_frequencies {
            Extraction::Detailed(colors)
        } else {
            Extraction::Hex(colors.into_iter().map(|c| c.hex).collect())
        })
    }

    /// Top `count` colors of a decoded image, most frequent first.
    ///
    /// Ties keep the order in which the colors were first sampled.
    pub fn extract(&self, image: &RgbaImage, count: usize) -> Vec<ExtractedColor> {
        let ColorCounts { mut entries, total } = self.count(image);

        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(count);

        debug!(
            width = image.width(),
            height = image.height(),
            sampled = total,
            returned = entries.len(),
            "Extracted palette"
        );

        entries
            .into_iter()
            .map(|(rgb, frequency)| ExtractedColor {
                hex: to_hex(rgb),
                frequency,
                percentage: if total == 0 {
                    0.0
                } else {
                    frequency as f64 / total as f64 * 100.0
                },
            })
            .collect()
    }

    fn count(&self, image: &RgbaImage) -> ColorCounts {
        let mut index: HashMap<[u8; 3], usize> = HashMap::new();
        let mut entries: Vec<([u8; 3], u32)> = Vec::new();
        let mut total = 0u64;

        for px in image.as_raw().chunks_exact(4).step_by(self.stride) {
            if px[3] < self.alpha_threshold {
                continue;
            }

            let rgb = [px[0], px[1], px[2]];
            if self.excluded.contains(&rgb) {
                continue;
            }

            total += 1;
            match index.get(&rgb) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(rgb, entries.len());
                    entries.push((rgb, 1));
                }
            }
        }

        ColorCounts { entries, total }
    }
}

/// Decode an encoded image (PNG, JPEG, GIF, WebP) into RGBA.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, ExtractError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ExtractError::image_load("could not decode image data", e))?;
    Ok(image.to_rgba8())
}

/// Parse `#rrggbb` (case-insensitive, `#` optional).
pub fn parse_hex(value: &str) -> Result<[u8; 3], ExtractError> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ExtractError::InvalidColor(value.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ExtractError::InvalidColor(value.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Normalize any accepted hex spelling to lowercase `#rrggbb`.
pub fn normalize_hex(value: &str) -> Result<String, ExtractError> {
    parse_hex(value).map(to_hex)
}

pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Bring a palette to exactly `len` colors.
///
/// Short palettes repeat their last color, empty ones are filled with
/// [`DEFAULT_FILL_COLOR`].
pub fn pad_palette(colors: &[String], len: usize) -> Vec<String> {
    let mut padded: Vec<String> = colors.iter().take(len).cloned().collect();
    while padded.len() < len {
        let fill = padded
            .last()
            .cloned()
            .unwrap_or_else(|| DEFAULT_FILL_COLOR.to_string());
        padded.push(fill);
    }
    padded
}
