mod common;
mod native;

pub use common::{CameraParams, LightParams, MaterialParams};
pub use native::Renderer;
