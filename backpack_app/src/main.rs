//! Backpack viewer demo
//!
//! Drives the full rendering stack against the headless device: loads
//! a model and the multi-light shaders, reads the lighting rig from a
//! config file, and runs a scripted flight through the scene instead
//! of reading a real mouse and keyboard. Every frame pushes the same
//! uniforms a windowed build would, so the log and the final device
//! stats show exactly what the renderer asked of the GPU.

use std::path::{Path, PathBuf};

use render_core::config::Config;
use render_core::foundation::math::{Mat4, Vec3};
use render_core::foundation::time::FrameClock;
use render_core::render::api::RenderDevice;
use render_core::render::backends::HeadlessDevice;
use render_core::render::{
    Camera, CameraMovement, InputEvent, LightingRig, Mesh, Model, RenderContext, ShaderProgram,
};

const WINDOW_WIDTH: u32 = 800;
const WINDOW_HEIGHT: u32 = 600;
const FRAME_COUNT: usize = 120;

pub struct BackpackApp {
    device: HeadlessDevice,
    context: RenderContext,
    clock: FrameClock,
    lighting_shader: ShaderProgram,
    light_marker_shader: ShaderProgram,
    rig: LightingRig,
    model: Option<Model>,
    fallback_mesh: Option<Mesh>,
    marker_mesh: Option<Mesh>,
    model_path: PathBuf,
}

impl BackpackApp {
    pub fn new(model_path: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Creating backpack viewer...");

        let mut device = HeadlessDevice::new();
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

        log::info!("Loading shader programs...");
        let lighting_shader = ShaderProgram::from_files(
            &mut device,
            &manifest_dir.join("shaders/lighting.vert"),
            &manifest_dir.join("shaders/lighting.frag"),
            None,
        )?;
        let light_marker_shader = ShaderProgram::from_files(
            &mut device,
            &manifest_dir.join("shaders/light_cube.vert"),
            &manifest_dir.join("shaders/light_cube.frag"),
            None,
        )?;

        // The light setup is data, not code; fall back to the built-in
        // showroom scene when the file is absent or malformed
        let rig_path = manifest_dir.join("config/lighting_rig.ron");
        let rig = match LightingRig::load_from_file(&rig_path) {
            Ok(rig) => {
                log::info!("Lighting rig loaded from {:?} ({} point lights)", rig_path, rig.points.len());
                rig
            }
            Err(e) => {
                log::warn!("Failed to load lighting rig from {:?}: {}, using showroom preset", rig_path, e);
                LightingRig::showroom()
            }
        };

        let camera = Camera::new(
            render_core::foundation::math::Point3::new(0.0, 0.0, 3.0),
            Vec3::new(0.0, 1.0, 0.0),
            Camera::DEFAULT_YAW,
            Camera::DEFAULT_PITCH,
        );
        let context = RenderContext::new(camera, WINDOW_WIDTH, WINDOW_HEIGHT);

        Ok(Self {
            device,
            context,
            clock: FrameClock::new(),
            lighting_shader,
            light_marker_shader,
            rig,
            model: None,
            fallback_mesh: None,
            marker_mesh: None,
            model_path,
        })
    }

    pub fn initialize(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Initializing backpack viewer...");

        if let Ok(cwd) = std::env::current_dir() {
            log::info!("Current working directory: {:?}", cwd);
        }

        match Model::load(&mut self.device, &self.model_path) {
            Ok(model) => {
                log::info!(
                    "Loaded model with {} meshes and {} unique textures",
                    model.meshes().len(),
                    model.texture_cache().len()
                );
                self.model = Some(model);
            }
            Err(e) => {
                // Keep the demo running with stand-in geometry
                log::warn!("Failed to load {:?}: {}, using fallback cube", self.model_path, e);
                self.fallback_mesh = Some(Mesh::cube(&mut self.device)?);
            }
        }

        self.marker_mesh = Some(Mesh::cube(&mut self.device)?);
        self.device.set_viewport(WINDOW_WIDTH, WINDOW_HEIGHT);
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Starting backpack viewer...");
        self.initialize()?;

        for frame in 0..FRAME_COUNT {
            let delta_time = self.clock.update();
            self.context.begin_frame(delta_time);

            for event in scripted_events(frame) {
                self.context.dispatch(event);
            }
            if self.context.close_requested() {
                log::info!("Close requested at frame {}", frame);
                break;
            }

            self.render_frame()?;
            log::trace!("Frame {} rendered in {:.4}s", frame, delta_time);
        }

        let stats = self.device.stats();
        log::info!(
            "Backpack viewer finished: {} draw calls, {} uniform writes, {} texture uploads, average {:.1} fps",
            stats.draw_calls,
            stats.uniform_writes,
            stats.texture_uploads,
            self.clock.average_fps()
        );
        Ok(())
    }

    fn render_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.device.clear(0.1, 0.1, 0.1, 1.0);

        let view = self.context.view_matrix();
        let projection = self.context.projection_matrix();

        // Lit pass for the model
        self.lighting_shader.bind(&mut self.device)?;
        self.lighting_shader.set_vec3(
            &mut self.device,
            "viewPos",
            self.context.camera().position().coords,
        )?;
        self.lighting_shader
            .set_float(&mut self.device, "material.shininess", 8.0)?;
        self.lighting_shader.set_mat4(&mut self.device, "view", &view)?;
        self.lighting_shader
            .set_mat4(&mut self.device, "projection", &projection)?;

        self.rig.follow_camera(self.context.camera());
        self.rig.apply(&mut self.device, &mut self.lighting_shader)?;

        let model_matrix = Mat4::new_translation(&Vec3::new(1.0, 5.0, -10.0));
        self.lighting_shader
            .set_mat4(&mut self.device, "model", &model_matrix)?;

        if let Some(model) = &self.model {
            model.draw(&mut self.device, &mut self.lighting_shader)?;
        } else if let Some(mesh) = &self.fallback_mesh {
            mesh.draw(&mut self.device, &mut self.lighting_shader)?;
        }

        // Unlit markers at the point light positions
        if let Some(marker) = &self.marker_mesh {
            self.light_marker_shader.bind(&mut self.device)?;
            self.light_marker_shader
                .set_mat4(&mut self.device, "view", &view)?;
            self.light_marker_shader
                .set_mat4(&mut self.device, "projection", &projection)?;

            for light in &self.rig.points {
                let marker_matrix = Mat4::new_translation(&light.position)
                    * Mat4::new_scaling(0.2);
                self.light_marker_shader
                    .set_mat4(&mut self.device, "model", &marker_matrix)?;
                // The diffuse term carries the base color at half strength
                self.light_marker_shader.set_vec3(
                    &mut self.device,
                    "objectColor",
                    light.diffuse * 2.0,
                )?;
                marker.draw(&mut self.device, &mut self.light_marker_shader)?;
            }
        }

        Ok(())
    }
}

/// Input script standing in for a user session: anchor the cursor,
/// sweep the view, fly forward, zoom, resize, then quit
fn scripted_events(frame: usize) -> Vec<InputEvent> {
    let mut events = Vec::new();

    if frame == 0 {
        events.push(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
    }
    if (1..=60).contains(&frame) {
        events.push(InputEvent::CursorMoved {
            x: 400.0 + frame as f32 * 2.0,
            y: 300.0 - frame as f32,
        });
    }
    if (20..40).contains(&frame) {
        events.push(InputEvent::Move(CameraMovement::Forward));
    }
    if (40..50).contains(&frame) {
        events.push(InputEvent::Move(CameraMovement::Right));
    }
    if frame == 70 {
        events.push(InputEvent::Scroll { delta: 2.0 });
    }
    if frame == 90 {
        events.push(InputEvent::Resized {
            width: 1280,
            height: 720,
        });
    }
    if frame == FRAME_COUNT - 1 {
        events.push(InputEvent::CloseRequested);
    }

    events
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC occurred: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            eprintln!(
                "Panic location: {}:{}:{}",
                location.file(),
                location.line(),
                location.column()
            );
        }
    }));

    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting backpack viewer demo");

    let model_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/backpack.obj")
        });

    let result = std::panic::catch_unwind(|| {
        let mut app = BackpackApp::new(model_path)?;
        app.run()
    });

    match result {
        Ok(Ok(())) => {
            log::info!("Backpack viewer finished successfully");
            Ok(())
        }
        Ok(Err(e)) => {
            log::error!("Application error: {:?}", e);
            Err(e)
        }
        Err(panic) => {
            log::error!("Application panicked: {:?}", panic);
            Err("Application panicked during execution".into())
        }
    }
}
