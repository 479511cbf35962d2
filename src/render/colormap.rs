//! Colormap trait and presets.
//!
//! Presets are thin wrappers over `colorgrad` gradients; the trait is what
//! figures see, so any other source of colours can plug in.

use crate::error::{CartoError, Result};

/// Trait for color mapping implementations
pub trait Colormap: Send + Sync {
    /// Map a normalized value (0.0 to 1.0) to an RGBA color
    fn map_normalized(&self, value: f64) -> [u8; 4];

    /// Map a value to an RGBA color given the data range.
    ///
    /// A degenerate range maps everything to the middle of the colormap.
    fn map(&self, value: f64, min: f64, max: f64) -> [u8; 4] {
        let normalized = if max > min {
            ((value - min) / (max - min)).clamp(0.0, 1.0)
        } else {
            0.5
        };
        self.map_normalized(normalized)
    }

    /// Get the name of this colormap
    fn name(&self) -> &str;
}

/// Number of entries sampled from each gradient.
const LUT_SIZE: usize = 256;

/// A colormap sampled once from a `colorgrad` gradient into a lookup table.
pub struct GradientColormap {
    name: &'static str,
    lut: Vec<[u8; 4]>,
}

impl GradientColormap {
    pub fn new(name: &'static str, gradient: colorgrad::Gradient) -> Self {
        let lut = (0..LUT_SIZE)
            .map(|i| gradient.at(i as f64 / (LUT_SIZE - 1) as f64).to_rgba8())
            .collect();
        Self { name, lut }
    }
}

impl Colormap for GradientColormap {
    fn map_normalized(&self, value: f64) -> [u8; 4] {
        let t = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        self.lut[(t * (LUT_SIZE - 1) as f64).round() as usize]
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Names accepted by [`get_colormap`].
pub const COLORMAP_NAMES: &[&str] = &[
    "viridis", "plasma", "inferno", "magma", "cividis", "turbo", "rdbu", "spectral", "coolwarm",
];

/// Get a colormap by name (case-insensitive)
pub fn get_colormap(name: &str) -> Result<Box<dyn Colormap>> {
    let colormap = match name.to_lowercase().as_str() {
        "viridis" => GradientColormap::new("viridis", colorgrad::viridis()),
        "plasma" => GradientColormap::new("plasma", colorgrad::plasma()),
        "inferno" => GradientColormap::new("inferno", colorgrad::inferno()),
        "magma" => GradientColormap::new("magma", colorgrad::magma()),
        "cividis" => GradientColormap::new("cividis", colorgrad::cividis()),
        "turbo" => GradientColormap::new("turbo", colorgrad::turbo()),
        "rdbu" | "rd_bu" => GradientColormap::new("rdbu", colorgrad::rd_bu()),
        "spectral" => GradientColormap::new("spectral", colorgrad::spectral()),
        "coolwarm" => GradientColormap::new("coolwarm", coolwarm()?),
        _ => {
            return Err(CartoError::InvalidParameter {
                param: "colormap".to_string(),
                message: format!(
                    "Unknown colormap: {}. Must be one of: {}",
                    name,
                    COLORMAP_NAMES.join(", ")
                ),
            })
        }
    };
    Ok(Box::new(colormap))
}

/// Blue to red through light grey.
fn coolwarm() -> Result<colorgrad::Gradient> {
    colorgrad::CustomGradient::new()
        .html_colors(&["#3b4cc0", "#dddddd", "#b40426"])
        .build()
        .map_err(|err| CartoError::Render {
            message: format!("Failed to build coolwarm gradient: {}", err),
        })
}

/// Linear interpolation between two colors
pub fn lerp_color(c1: [u8; 3], c2: [u8; 3], t: f32) -> [u8; 3] {
    [
        (c1[0] as f32 * (1.0 - t) + c2[0] as f32 * t) as u8,
        (c1[1] as f32 * (1.0 - t) + c2[1] as f32 * t) as u8,
        (c1[2] as f32 * (1.0 - t) + c2[2] as f32 * t) as u8,
    ]
}

/// Parse `#rrggbb` or `#rrggbbaa`.
pub fn parse_hex_color(hex: &str) -> Result<[u8; 4]> {
    let invalid = || CartoError::InvalidParameter {
        param: "color".to_string(),
        message: format!("Invalid color: {}. Expected #rrggbb or #rrggbbaa", hex),
    };
    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
        return Err(invalid());
    }
    let mut rgba = [255u8; 4];
    for (i, slot) in rgba.iter_mut().enumerate().take(digits.len() / 2) {
        *slot = u8::from_str_radix(&digits[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
    }
    Ok(rgba)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_color() {
        let black = [0, 0, 0];
        let white = [255, 255, 255];

        let mid = lerp_color(black, white, 0.5);
        assert_eq!(mid, [127, 127, 127]);
    }

    #[test]
    fn test_every_name_resolves() {
        for name in COLORMAP_NAMES {
            let colormap = get_colormap(name).unwrap();
            assert_eq!(colormap.name(), *name);
        }
        assert_eq!(get_colormap("Viridis").unwrap().name(), "viridis");
        assert!(get_colormap("jet").is_err());
    }

    #[test]
    fn test_map_clamps_and_handles_flat_range() {
        let viridis = get_colormap("viridis").unwrap();
        assert_eq!(viridis.map(-10.0, 0.0, 1.0), viridis.map_normalized(0.0));
        assert_eq!(viridis.map(10.0, 0.0, 1.0), viridis.map_normalized(1.0));
        assert_eq!(viridis.map(3.0, 3.0, 3.0), viridis.map_normalized(0.5));
        assert_ne!(viridis.map_normalized(0.0), viridis.map_normalized(1.0));
        assert_eq!(viridis.map_normalized(0.3)[3], 255);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), [255, 0, 0, 255]);
        assert_eq!(parse_hex_color("#00ff0080").unwrap(), [0, 255, 0, 128]);
        assert!(parse_hex_color("ff0000").is_err());
        assert!(parse_hex_color("#ff00").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }
}
