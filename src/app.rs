use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::camera::OrbitCamera;
use crate::input::{InputState, KeyCode, MouseButton, NamedKey};
use crate::light::Light;
use crate::obj::Mesh;
use crate::render::{CameraParams, LightParams, MaterialParams};

/// Minimum time between two triggers of the same toggle key, in seconds.
pub const DEBOUNCE_INTERVAL: f64 = 0.2;

const LIGHT_MOVE_SPEED: f32 = 2.0;
const LIGHT_DRAG_SPEED: f32 = 0.01;
const LIGHT_ROTATE_DEGREES_PER_PIXEL: f32 = 0.02;
const INTENSITY_PER_SCROLL: f32 = 0.1;
const SHININESS_RANGE: (f32, f32) = (1.0, 128.0);
const DEFAULT_SHININESS: f32 = 32.0;

/// Which object pointer drags and scrolling act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Camera,
    /// Active while either Shift key is held.
    Light,
}

/// Per-term switches of the Phong model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingToggles {
    pub ambient: bool,
    pub diffuse: bool,
    pub specular: bool,
}

impl Default for ShadingToggles {
    fn default() -> Self {
        Self {
            ambient: true,
            diffuse: true,
            specular: true,
        }
    }
}

/// Remembers when an action last fired so a held key triggers it once.
#[derive(Debug, Clone, Copy, Default)]
pub struct Debounce {
    last_triggered: Option<f64>,
}

impl Debounce {
    /// Returns true and records `now` if the interval has elapsed.
    pub fn trigger(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_triggered {
            if now - last <= DEBOUNCE_INTERVAL {
                return false;
            }
        }
        self.last_triggered = Some(now);
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ToggleDebounces {
    normal_mode: Debounce,
    color: Debounce,
    ambient: Debounce,
    diffuse: Debounce,
    specular: Debounce,
}

/// Everything the viewer mutates in response to input.
#[derive(Debug, Clone)]
pub struct AppState {
    pub camera: OrbitCamera,
    pub light: Light,
    pub mesh: Mesh,
    pub toggles: ShadingToggles,
    shininess: f32,
    input: InputState,
    debounces: ToggleDebounces,
    mesh_dirty: bool,
    exit_requested: bool,
}

impl AppState {
    /// Wraps a loaded mesh with default camera, light and shading settings.
    pub fn new(mut mesh: Mesh) -> Self {
        mesh.randomize_color();
        Self {
            camera: OrbitCamera::default(),
            light: Light::default(),
            mesh,
            toggles: ShadingToggles::default(),
            shininess: DEFAULT_SHININESS,
            input: InputState::new(),
            debounces: ToggleDebounces::default(),
            mesh_dirty: false,
            exit_requested: false,
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn shininess(&self) -> f32 {
        self.shininess
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        if self.input.is_shift_down() {
            InteractionMode::Light
        } else {
            InteractionMode::Camera
        }
    }

    pub fn key_down(&mut self, key: KeyCode) {
        self.input.set_key_down(key);
    }

    pub fn key_up(&mut self, key: KeyCode) {
        self.input.set_key_up(key);
    }

    pub fn mouse_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            self.input.set_mouse_button_down(button);
        } else {
            self.input.set_mouse_button_up(button);
        }
    }

    pub fn focus_lost(&mut self) {
        self.input.clear();
    }

    /// Handles an absolute cursor position in window pixels (y grows downwards).
    pub fn cursor_moved(&mut self, position: Vec2) {
        let Some(last) = self.input.mouse_position() else {
            self.input.set_mouse_position(position);
            return;
        };
        self.input.set_mouse_position(position);
        let dx = position.x - last.x;
        let dy = last.y - position.y;

        let mode = self.interaction_mode();
        if self.input.is_mouse_button_down(MouseButton::LEFT) {
            match mode {
                InteractionMode::Camera => self.camera.rotate(dx, dy),
                InteractionMode::Light => {
                    let yaw = (dx * LIGHT_ROTATE_DEGREES_PER_PIXEL).to_radians();
                    let pitch = (dy * LIGHT_ROTATE_DEGREES_PER_PIXEL).to_radians();
                    self.light.rotate(yaw, Vec3::Y, Vec3::ZERO);
                    self.light.rotate(pitch, Vec3::X, Vec3::ZERO);
                }
            }
        } else if self.input.is_mouse_button_down(MouseButton::RIGHT) {
            match mode {
                InteractionMode::Camera => self.camera.pan(dx, dy),
                InteractionMode::Light => {
                    let offset = self.camera.right() * (dx * LIGHT_DRAG_SPEED)
                        + self.camera.up() * (dy * LIGHT_DRAG_SPEED);
                    self.light.move_by(offset);
                }
            }
        }
    }

    /// Handles a vertical scroll delta in lines; positive scrolls away from the user.
    pub fn scroll(&mut self, dy: f32) {
        match self.interaction_mode() {
            InteractionMode::Camera => self.camera.zoom(dy),
            InteractionMode::Light => self.light.adjust_intensity(dy * INTENSITY_PER_SCROLL),
        }
    }

    /// Applies held keys once per frame. `now` is seconds since start, `dt` the frame time.
    pub fn update(&mut self, now: f64, dt: f32) {
        if self.input.is_key_down(KeyCode::Named(NamedKey::Escape)) {
            self.exit_requested = true;
        }

        let speed = LIGHT_MOVE_SPEED * dt;
        let moves = [
            ('W', Vec3::NEG_Z),
            ('S', Vec3::Z),
            ('A', Vec3::NEG_X),
            ('D', Vec3::X),
            ('Q', Vec3::Y),
            ('E', Vec3::NEG_Y),
        ];
        for (key, direction) in moves {
            if self.input.is_char_down(key) {
                self.light.move_by(direction * speed);
            }
        }

        if self.input.is_char_down('N') && self.debounces.normal_mode.trigger(now) {
            let mode = self.mesh.toggle_normal_mode();
            self.mesh_dirty = true;
            info!("normal mode: {}", mode.label());
        }

        if self.input.is_char_down('C') && self.debounces.color.trigger(now) {
            self.mesh.randomize_color();
            debug!("mesh color: {:?}", self.mesh.color());
        }

        if self.input.is_key_down(KeyCode::Named(NamedKey::Up)) {
            self.shininess = (self.shininess + 1.0).min(SHININESS_RANGE.1);
        }
        if self.input.is_key_down(KeyCode::Named(NamedKey::Down)) {
            self.shininess = (self.shininess - 1.0).max(SHININESS_RANGE.0);
        }

        if self.input.is_key_down(KeyCode::Digit(1)) && self.debounces.ambient.trigger(now) {
            self.toggles.ambient = !self.toggles.ambient;
            info!("ambient: {}", on_off(self.toggles.ambient));
        }
        if self.input.is_key_down(KeyCode::Digit(2)) && self.debounces.diffuse.trigger(now) {
            self.toggles.diffuse = !self.toggles.diffuse;
            info!("diffuse: {}", on_off(self.toggles.diffuse));
        }
        if self.input.is_key_down(KeyCode::Digit(3)) && self.debounces.specular.trigger(now) {
            self.toggles.specular = !self.toggles.specular;
            info!("specular: {}", on_off(self.toggles.specular));
        }
    }

    /// Returns whether the mesh normals changed since the last call.
    pub fn take_mesh_dirty(&mut self) -> bool {
        std::mem::take(&mut self.mesh_dirty)
    }

    pub fn camera_params(&self, aspect: f32) -> CameraParams {
        CameraParams {
            view_proj: self.camera.view_projection(aspect),
            position: self.camera.position(),
        }
    }

    pub fn light_params(&self) -> LightParams {
        LightParams::from(&self.light)
    }

    pub fn material_params(&self) -> MaterialParams {
        MaterialParams {
            color: self.mesh.color(),
            shininess: self.shininess,
            toggles: self.toggles,
        }
    }

    /// One-line summary of the lighting terms, shown in the window title.
    pub fn status_line(&self) -> String {
        format!(
            "Ambient: {} | Diffuse: {} | Specular: {} | Normals: {}",
            on_off(self.toggles.ambient),
            on_off(self.toggles.diffuse),
            on_off(self.toggles.specular),
            self.mesh.normal_mode().label()
        )
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}
