use glam::{Mat4, Vec3};

use crate::app::ShadingToggles;
use crate::light::Light;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

/// Lighting state consumed by the renderer's uniform buffer.
///
/// The Phong terms are already multiplied by the light intensity.
#[derive(Clone, Debug)]
pub struct LightParams {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub marker_color: Vec3,
}

impl From<&Light> for LightParams {
    fn from(light: &Light) -> Self {
        let terms = light.terms();
        Self {
            position: terms.position,
            ambient: terms.ambient,
            diffuse: terms.diffuse,
            specular: terms.specular,
            marker_color: light.marker_color(),
        }
    }
}

/// Surface settings for the loaded mesh.
#[derive(Clone, Debug)]
pub struct MaterialParams {
    pub color: Vec3,
    pub shininess: f32,
    pub toggles: ShadingToggles,
}

pub(crate) fn toggle_mask(toggles: ShadingToggles) -> [f32; 4] {
    let flag = |enabled: bool| if enabled { 1.0 } else { 0.0 };
    [
        flag(toggles.ambient),
        flag(toggles.diffuse),
        flag(toggles.specular),
        0.0,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_params_carry_scaled_terms() {
        let mut light = Light::default();
        light.adjust_intensity(-0.5);
        let params = LightParams::from(&light);
        assert_eq!(params.position, light.position);
        assert!((params.diffuse - Vec3::splat(0.25)).length() < 1e-6);
        assert!((params.marker_color - Vec3::new(0.5, 0.5, 0.4)).length() < 1e-6);
    }

    #[test]
    fn toggle_mask_encodes_enabled_terms() {
        let toggles = ShadingToggles {
            ambient: true,
            diffuse: false,
            specular: true,
        };
        assert_eq!(toggle_mask(toggles), [1.0, 0.0, 1.0, 0.0]);
    }
}
