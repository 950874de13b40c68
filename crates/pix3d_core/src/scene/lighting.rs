//! Default scene lighting
//!
//! Lights are plain data attached to `Light` nodes under the scene root.

use crate::core::config::SceneConfig;
use crate::foundation::math::Vec3;

/// Node name of the ambient light
pub const AMBIENT_LIGHT_NAME: &str = "ambient_light";
/// Node name of the directional light
pub const MAIN_LIGHT_NAME: &str = "main_light";
/// Node name of the hemisphere light
pub const HEMISPHERE_LIGHT_NAME: &str = "hemi_light";

/// Types of lights a scene carries
#[derive(Debug, Clone, PartialEq)]
pub enum LightType {
    /// Uniform light from every direction
    Ambient,
    /// Parallel rays shining from the node position towards the origin
    Directional,
    /// Sky color from above blended with a ground color from below
    Hemisphere {
        /// RGB ground color (0.0 to 1.0 range)
        ground_color: Vec3,
    },
}

/// Light data carried by a `Light` node
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// The type of light
    pub light_type: LightType,
    /// RGB color values for the light (0.0 to 1.0 range)
    pub color: Vec3,
    /// Light intensity multiplier
    pub intensity: f32,
    /// Whether this light should cast shadows
    pub cast_shadows: bool,
}

/// Convert a `0xRRGGBB` color into RGB components in 0.0..=1.0
pub fn color_from_hex(hex: u32) -> Vec3 {
    let channel = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Factory functions for the default light rig
pub struct LightFactory;

impl LightFactory {
    /// Ambient light
    pub fn ambient(color: Vec3, intensity: f32) -> Light {
        Light {
            light_type: LightType::Ambient,
            color,
            intensity,
            cast_shadows: false,
        }
    }

    /// Directional light; position comes from the owning node
    pub fn directional(color: Vec3, intensity: f32) -> Light {
        Light {
            light_type: LightType::Directional,
            color,
            intensity,
            cast_shadows: true,
        }
    }

    /// Hemisphere light
    pub fn hemisphere(sky_color: Vec3, ground_color: Vec3, intensity: f32) -> Light {
        Light {
            light_type: LightType::Hemisphere { ground_color },
            color: sky_color,
            intensity,
            cast_shadows: false,
        }
    }

    /// The three default lights with their node names and positions
    pub fn default_rig(config: &SceneConfig) -> [(&'static str, Light, Vec3); 3] {
        let [x, y, z] = config.directional.position;
        [
            (
                AMBIENT_LIGHT_NAME,
                Self::ambient(color_from_hex(config.ambient.color), config.ambient.intensity),
                Vec3::zeros(),
            ),
            (
                MAIN_LIGHT_NAME,
                Self::directional(
                    color_from_hex(config.directional.light.color),
                    config.directional.light.intensity,
                ),
                Vec3::new(x, y, z),
            ),
            (
                HEMISPHERE_LIGHT_NAME,
                Self::hemisphere(
                    color_from_hex(config.hemisphere.sky_color),
                    color_from_hex(config.hemisphere.ground_color),
                    config.hemisphere.intensity,
                ),
                Vec3::zeros(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_color_from_hex() {
        assert_relative_eq!(color_from_hex(0xFF8000), Vec3::new(1.0, 128.0 / 255.0, 0.0));
    }

    #[test]
    fn test_default_rig_uses_configured_directional_position() {
        let config = SceneConfig::default();
        let rig = LightFactory::default_rig(&config);
        let (name, light, position) = &rig[1];
        assert_eq!(*name, MAIN_LIGHT_NAME);
        assert_eq!(light.light_type, LightType::Directional);
        assert!(light.cast_shadows);
        assert_relative_eq!(*position, Vec3::new(0.5, 4.3, 0.866));
    }
}
