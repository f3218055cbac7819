//! Interactive OBJ mesh viewer with an orbit camera and a movable point light.
//!
//! The crate keeps the camera, light and mesh models free of any windowing
//! or GPU types so they can be exercised headless; the `render` module and
//! the binary wire them to wgpu and winit.

pub mod app;
pub mod camera;
pub mod cli;
pub mod input;
pub mod light;
pub mod obj;
pub mod render;
pub mod sphere;

pub use app::{AppState, InteractionMode, ShadingToggles};
pub use camera::OrbitCamera;
pub use cli::CliOptions;
pub use input::{InputState, KeyCode, MouseButton, NamedKey};
pub use light::{Light, LightTerms};
pub use obj::{parse_record, Mesh, NormalMode, ObjRecord, RecordError};
pub use render::{CameraParams, LightParams, MaterialParams, Renderer};
pub use sphere::SphereMesh;
