use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 0.0;
const DEFAULT_SENSITIVITY: f32 = 0.15;
const DEFAULT_ZOOM: f32 = 45.0;
const DEFAULT_DISTANCE: f32 = 5.0;

const PITCH_LIMIT: f32 = 89.0;
const PAN_SPEED: f32 = 0.01;
const ZOOM_RANGE: (f32, f32) = (1.0, 90.0);
const DISTANCE_RANGE: (f32, f32) = (1.0, 20.0);
const DISTANCE_PER_SCROLL: f32 = 0.3;

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Camera that orbits a target point at a fixed distance.
///
/// `position`, `front`, `right` and `up` are derived from the target, the
/// two angles and the distance after every mutation, so they are read-only
/// from the outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitCamera {
    target: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    zoom: f32,
    sensitivity: f32,
    position: Vec3,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Creates a camera looking at `target` with the default angles and distance.
    pub fn new(target: Vec3) -> Self {
        let mut camera = Self {
            target,
            world_up: Vec3::Y,
            yaw: DEFAULT_YAW,
            pitch: DEFAULT_PITCH,
            distance: DEFAULT_DISTANCE,
            zoom: DEFAULT_ZOOM,
            sensitivity: DEFAULT_SENSITIVITY,
            position: Vec3::ZERO,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Horizontal angle in degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Vertical angle in degrees, always within ±89.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Vertical field of view in degrees.
    pub fn fov(&self) -> f32 {
        self.zoom
    }

    /// Orbits around the target by a pointer delta measured in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    /// Slides target and eye together across the view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let offset = self.right * (-dx * PAN_SPEED) - self.up * (dy * PAN_SPEED);
        self.target += offset;
        self.position += offset;
    }

    /// Narrows the field of view and moves closer for a positive scroll delta.
    pub fn zoom(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(ZOOM_RANGE.0, ZOOM_RANGE.1);
        self.distance =
            (self.distance - dy * DISTANCE_PER_SCROLL).clamp(DISTANCE_RANGE.0, DISTANCE_RANGE.1);
        self.update_vectors();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect.max(0.01), Z_NEAR, Z_FAR)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.position = self.target - self.front * self.distance;
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    fn assert_derivation_holds(camera: &OrbitCamera) {
        assert_vec_close(
            camera.position(),
            camera.target() - camera.front() * camera.distance(),
        );
    }

    #[test]
    fn default_camera_sits_on_positive_z() {
        let camera = OrbitCamera::default();
        assert_vec_close(camera.front(), Vec3::NEG_Z);
        assert_vec_close(camera.position(), Vec3::new(0.0, 0.0, 5.0));
        assert_vec_close(camera.right(), Vec3::X);
        assert_vec_close(camera.up(), Vec3::Y);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.rotate(0.0, 10_000.0);
        assert_eq!(camera.pitch(), 89.0);
        camera.rotate(0.0, -10_000.0);
        assert_eq!(camera.pitch(), -89.0);
        assert_derivation_holds(&camera);
    }

    #[test]
    fn rotate_scales_by_sensitivity() {
        let mut camera = OrbitCamera::default();
        camera.rotate(100.0, 20.0);
        assert!((camera.yaw() - (-75.0)).abs() < 1e-4);
        assert!((camera.pitch() - 3.0).abs() < 1e-4);
        assert_derivation_holds(&camera);
    }

    #[test]
    fn zoom_clamps_fov_and_distance_together() {
        let mut camera = OrbitCamera::default();
        camera.zoom(1_000.0);
        assert_eq!(camera.fov(), 1.0);
        assert_eq!(camera.distance(), 1.0);
        assert_derivation_holds(&camera);

        camera.zoom(-1_000.0);
        assert_eq!(camera.fov(), 90.0);
        assert_eq!(camera.distance(), 20.0);
        assert_derivation_holds(&camera);
    }

    #[test]
    fn single_scroll_moves_both_fov_and_distance() {
        let mut camera = OrbitCamera::default();
        camera.zoom(2.0);
        assert!((camera.fov() - 43.0).abs() < 1e-5);
        assert!((camera.distance() - 4.4).abs() < 1e-5);
    }

    #[test]
    fn pan_translates_target_and_position() {
        let mut camera = OrbitCamera::default();
        let before = camera.clone();
        camera.pan(50.0, -20.0);
        let expected = before.right() * -0.5 - before.up() * -0.2;
        assert_vec_close(camera.target(), before.target() + expected);
        assert_vec_close(camera.position(), before.position() + expected);
        assert_eq!(camera.distance(), before.distance());
        assert_derivation_holds(&camera);
    }

    #[test]
    fn derivation_survives_mixed_input() {
        let mut camera = OrbitCamera::default();
        for step in 0..20 {
            let delta = step as f32 * 3.7 - 30.0;
            camera.rotate(delta, -delta * 0.5);
            camera.pan(delta * 0.1, delta * 0.2);
            camera.zoom(delta * 0.05);
            assert!((-89.0..=89.0).contains(&camera.pitch()));
            assert_derivation_holds(&camera);
        }
    }

    #[test]
    fn view_matrix_maps_target_onto_forward_axis() {
        let mut camera = OrbitCamera::default();
        camera.rotate(123.0, 45.0);
        let in_view = camera.view_matrix().transform_point3(camera.target());
        assert!(in_view.x.abs() < 1e-4);
        assert!(in_view.y.abs() < 1e-4);
        assert!((in_view.z + camera.distance()).abs() < 1e-4);
    }
}
