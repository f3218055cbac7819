use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

const INTENSITY_RANGE: (f32, f32) = (0.1, 3.0);
const MARKER_TINT: Vec3 = Vec3::new(1.0, 1.0, 0.8);

/// Movable point light with Phong coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    intensity: f32,
    direction: Vec3,
}

/// Phong terms already scaled by the light intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTerms {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 1.0, -1.0))
    }
}

impl Light {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ambient: Vec3::splat(0.2),
            diffuse: Vec3::splat(0.5),
            specular: Vec3::ONE,
            intensity: 1.0,
            direction: Vec3::NEG_Y,
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn move_by(&mut self, offset: Vec3) {
        self.position += offset;
    }

    pub fn adjust_intensity(&mut self, delta: f32) {
        self.intensity = (self.intensity + delta).clamp(INTENSITY_RANGE.0, INTENSITY_RANGE.1);
    }

    /// Rotates the light direction by `angle` radians around `axis`.
    ///
    /// The pivot only matters for points; a direction is unaffected by it.
    pub fn rotate(&mut self, angle: f32, axis: Vec3, _pivot: Vec3) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        let rotated = Quat::from_axis_angle(axis, angle) * self.direction;
        self.direction = rotated.normalize_or_zero();
    }

    pub fn terms(&self) -> LightTerms {
        LightTerms {
            position: self.position,
            ambient: self.ambient * self.intensity,
            diffuse: self.diffuse * self.intensity,
            specular: self.specular * self.intensity,
        }
    }

    /// Color of the sphere drawn at the light position.
    pub fn marker_color(&self) -> Vec3 {
        MARKER_TINT * self.intensity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn intensity_clamps_to_range() {
        let mut light = Light::default();
        light.adjust_intensity(10.0);
        assert_eq!(light.intensity(), 3.0);
        light.adjust_intensity(-10.0);
        assert_eq!(light.intensity(), 0.1);
    }

    #[test]
    fn move_is_unclamped() {
        let mut light = Light::default();
        light.move_by(Vec3::new(1000.0, -1000.0, 0.5));
        assert_eq!(light.position, Vec3::new(1000.0, -999.0, -0.5));
    }

    #[test]
    fn rotate_turns_direction_only() {
        let mut light = Light::default();
        let position = light.position;
        light.rotate(FRAC_PI_2, Vec3::X, Vec3::new(5.0, 5.0, 5.0));
        assert_eq!(light.position, position);
        assert!((light.direction() - Vec3::NEG_Z).length() < 1e-5);
        assert!((light.direction().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn rotate_about_zero_axis_is_ignored() {
        let mut light = Light::default();
        light.rotate(1.0, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(light.direction(), Vec3::NEG_Y);
    }

    #[test]
    fn terms_scale_with_intensity() {
        let mut light = Light::default();
        light.adjust_intensity(1.0);
        let terms = light.terms();
        assert!((terms.ambient - Vec3::splat(0.4)).length() < 1e-6);
        assert!((terms.diffuse - Vec3::splat(1.0)).length() < 1e-6);
        assert!((terms.specular - Vec3::splat(2.0)).length() < 1e-6);
        assert!((light.marker_color() - Vec3::new(2.0, 2.0, 1.6)).length() < 1e-6);
    }
}
