//! Phong material definitions.

use glam::Vec3;

use crate::error::{ResourceError, ResourceResult};

/// Shininess used by default and by the color picker.
pub const DEFAULT_SHININESS: f32 = 3.0;

/// Uniform Phong material of a drawable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Ambient reflectance
    pub ambient: Vec3,
    /// Diffuse reflectance
    pub diffuse: Vec3,
    /// Specular reflectance
    pub specular: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::from_color(Vec3::ONE)
    }
}

impl Material {
    pub const fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3, shininess: f32) -> Self {
        Self {
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }

    /// A material reflecting `color` in all three terms.
    pub const fn from_color(color: Vec3) -> Self {
        Self::new(color, color, color, DEFAULT_SHININESS)
    }
}

/// Parses a `#rrggbb` color into components in `[0, 1]`.
pub fn parse_hex_color(text: &str) -> ResourceResult<Vec3> {
    let invalid = || ResourceError::InvalidColor(text.to_string());
    let hex = text.trim().strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[2 * i..2 * i + 2], 16)
            .map(|v| f32::from(v) / 255.0)
            .map_err(|_| invalid())
    };
    Ok(Vec3::new(channel(0)?, channel(1)?, channel(2)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white_shininess_three() {
        let material = Material::default();
        assert_eq!(material.ambient, Vec3::ONE);
        assert_eq!(material.diffuse, Vec3::ONE);
        assert_eq!(material.specular, Vec3::ONE);
        assert_eq!(material.shininess, 3.0);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#ff0000").unwrap(), Vec3::X);
        assert_eq!(parse_hex_color(" #00ff00 ").unwrap(), Vec3::Y);
        let grey = parse_hex_color("#808080").unwrap();
        assert!((grey.x - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_color_rejects_malformed() {
        for text in ["ff0000", "#ff00", "#gg0000", "#ff00000", "#ÿÿÿ"] {
            assert!(
                matches!(parse_hex_color(text), Err(ResourceError::InvalidColor(_))),
                "{text}"
            );
        }
    }
}
