//! Leaf color-index extraction.
//!
//! Decodes a compressed raster, converts every pixel to HSV using the 8-bit
//! convention (hue in `[0, 180)`, saturation and value in `[0, 255]`), keeps
//! the pixels inside the configured [`VegetationBand`] and averages their hue.
//!
//! The hue scale is fixed at [`HUE_SCALE_MAX`] because the BWD classifier
//! artifact was trained on hues measured on that scale.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::numeric::round2;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Exclusive upper bound of the hue scale (degrees halved).
pub const HUE_SCALE_MAX: f64 = 180.0;

/// Default vegetation band: hue 30–90, saturation >= 40, value >= 40.
pub const DEFAULT_VEGETATION_BAND: VegetationBand = VegetationBand {
    hue_min: 30,
    hue_max: 90,
    min_saturation: 40,
    min_value: 40,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single pixel in 8-bit HSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

/// The HSV region considered "vegetation green". All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VegetationBand {
    pub hue_min: u8,
    pub hue_max: u8,
    pub min_saturation: u8,
    pub min_value: u8,
}

impl Default for VegetationBand {
    fn default() -> Self {
        DEFAULT_VEGETATION_BAND
    }
}

impl VegetationBand {
    /// Reject bands that can never match or that leave the hue scale.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hue_min > self.hue_max {
            return Err(CoreError::Validation(format!(
                "hue_min ({}) must not exceed hue_max ({})",
                self.hue_min, self.hue_max
            )));
        }
        if f64::from(self.hue_max) >= HUE_SCALE_MAX {
            return Err(CoreError::Validation(format!(
                "hue_max must be below {HUE_SCALE_MAX}, got {}",
                self.hue_max
            )));
        }
        Ok(())
    }

    pub fn contains(&self, px: Hsv) -> bool {
        (self.hue_min..=self.hue_max).contains(&px.h)
            && px.s >= self.min_saturation
            && px.v >= self.min_value
    }
}

/// Mean hue over the masked pixels of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HueSample {
    /// Unrounded mean, fed to the classifier.
    pub mean_hue: f64,
    /// Number of pixels inside the vegetation band (always > 0).
    pub pixel_count: u64,
}

impl HueSample {
    /// Mean hue rounded for reporting.
    pub fn reported_hue(&self) -> f64 {
        round2(self.mean_hue)
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Convert one RGB pixel to 8-bit HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = f64::from(max - min);

    let s = if max == 0 {
        0
    } else {
        (255.0 * delta / f64::from(max)).round() as u8
    };

    let h = if max == min {
        0
    } else {
        let (rf, gf, bf) = (f64::from(r), f64::from(g), f64::from(b));
        let mut degrees = if max == r {
            60.0 * (gf - bf) / delta
        } else if max == g {
            120.0 + 60.0 * (bf - rf) / delta
        } else {
            240.0 + 60.0 * (rf - gf) / delta
        };
        if degrees < 0.0 {
            degrees += 360.0;
        }
        let halved = (degrees / 2.0).round();
        if halved >= HUE_SCALE_MAX {
            0
        } else {
            halved as u8
        }
    };

    Hsv { h, s, v: max }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Decode `image_bytes` and compute the mean vegetation hue.
///
/// Returns `Ok(None)` when the image decodes but no pixel falls inside
/// `band`. Undecodable input is a [`CoreError::ImageDecode`].
pub fn extract(image_bytes: &[u8], band: &VegetationBand) -> Result<Option<HueSample>, CoreError> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| CoreError::ImageDecode(e.to_string()))?;
    let rgb = decoded.to_rgb8();
    Ok(mean_masked_hue(&rgb, band))
}

/// Average the hue of the pixels of `image` that fall inside `band`.
pub fn mean_masked_hue(image: &RgbImage, band: &VegetationBand) -> Option<HueSample> {
    let (sum, count) = image
        .pixels()
        .map(|px| rgb_to_hsv(px[0], px[1], px[2]))
        .filter(|hsv| band.contains(*hsv))
        .fold((0u64, 0u64), |(sum, count), hsv| {
            (sum + u64::from(hsv.h), count + 1)
        });

    if count == 0 {
        return None;
    }

    Some(HueSample {
        mean_hue: sum as f64 / count as f64,
        pixel_count: count,
    })
}
