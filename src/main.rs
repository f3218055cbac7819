use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use glam::Vec2;
use log::{error, info, warn};
use pollster::block_on;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use phong_viewer::{AppState, CliOptions, KeyCode, Mesh, MouseButton, Renderer, SphereMesh};

const WINDOW_TITLE: &str = "Illumination Effect";
const WINDOW_SIZE: (f64, f64) = (800.0, 600.0);
const PIXELS_PER_SCROLL_LINE: f32 = 50.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        error!("{err:?}");
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mesh = Mesh::load(&options.mesh_path);
    print_mesh_summary(&options.mesh_path, &mesh);
    let state = AppState::new(mesh);

    if options.summary_only {
        print_state(&state);
        return Ok(());
    }
    run_interactive(state)
}

fn run_interactive(state: AppState) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(WINDOW_TITLE)
            .with_inner_size(LogicalSize::new(WINDOW_SIZE.0, WINDOW_SIZE.1))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let marker = SphereMesh::light_marker();
    let renderer = block_on(Renderer::new(Arc::clone(&window), &state.mesh, &marker))
        .map_err(|err| WindowInitError::from_error("renderer", format!("{err:#}")))?;
    info!("renderer ready; hold Shift to move the light, N/C/1/2/3 to toggle shading");

    let now = Instant::now();
    let mut viewer = Viewer {
        renderer,
        state,
        started: now,
        last_frame: now,
        title: String::new(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = viewer.process_event(&event, control_flow) {
            viewer.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    match viewer.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Viewer {
    renderer: Renderer,
    state: AppState,
    started: Instant,
    last_frame: Instant,
    title: String,
    last_error: Option<anyhow::Error>,
}

impl Viewer {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(*size),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                    }
                    WindowEvent::Focused(false) => self.state.focus_lost(),
                    WindowEvent::KeyboardInput { input, .. } => self.handle_keyboard(input),
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.state.mouse_button(
                            MouseButton::from_winit(*button),
                            *state == ElementState::Pressed,
                        );
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.state
                            .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let dy = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(position) => {
                                position.y as f32 / PIXELS_PER_SCROLL_LINE
                            }
                        };
                        self.state.scroll(dy);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.frame(control_flow)?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput) {
        let Some(key) = input.virtual_keycode.and_then(KeyCode::from_winit) else {
            return;
        };
        match input.state {
            ElementState::Pressed => self.state.key_down(key),
            ElementState::Released => self.state.key_up(key),
        }
    }

    fn frame(&mut self, control_flow: &mut ControlFlow) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.state
            .update(now.duration_since(self.started).as_secs_f64(), dt);
        if self.state.exit_requested() {
            control_flow.set_exit();
            return Ok(());
        }

        if self.state.take_mesh_dirty() {
            self.renderer
                .update_mesh_vertices(&self.state.mesh.interleaved_vertices());
        }

        let title = format!("{WINDOW_TITLE} | {}", self.state.status_line());
        if title != self.title {
            self.renderer.window().set_title(&title);
            self.title = title;
        }

        let camera = self.state.camera_params(self.renderer.aspect());
        self.renderer.update_frame(
            &camera,
            &self.state.light_params(),
            &self.state.material_params(),
        );
        if let Err(err) = self.renderer.render() {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    warn!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

fn print_mesh_summary(path: &Path, mesh: &Mesh) {
    println!(
        "Loaded {}: {} vertices, {} faces ({} indices)",
        path.display(),
        mesh.vertex_count(),
        mesh.face_count(),
        mesh.indices().len()
    );
}

fn print_state(state: &AppState) {
    let camera = &state.camera;
    let light = &state.light;
    println!(
        "Camera position=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.1}",
        camera.position().x,
        camera.position().y,
        camera.position().z,
        camera.target().x,
        camera.target().y,
        camera.target().z,
        camera.fov()
    );
    println!(
        "Light position=({:.2}, {:.2}, {:.2}) intensity={:.2}",
        light.position.x,
        light.position.y,
        light.position.z,
        light.intensity()
    );
    println!("{}", state.status_line());
}
