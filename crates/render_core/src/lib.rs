//! # Render Core
//!
//! A forward-rendering core library: free-look camera, shader uniform
//! protocol, and a model/texture asset pipeline over a pluggable
//! render device.
//!
//! ## Features
//!
//! - **Free-Look Camera**: yaw/pitch FPS controls with a derived
//!   orthonormal basis and zoomable field of view
//! - **Shader Programs**: compile/link lifecycle with typed uniform
//!   setters addressed by GLSL name, unknown names ignored
//! - **Asset Pipeline**: OBJ import into flat mesh lists with a
//!   deduplicating texture cache
//! - **Lighting Rig**: directional, point array, and spot lights
//!   pushed per frame through the uniform naming convention
//! - **Headless Device**: recording [`render::api::RenderDevice`]
//!   implementation for tests and windowless tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use render_core::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut device = HeadlessDevice::new();
//!     let mut context = RenderContext::new(Camera::default(), 800, 600);
//!     let mut shader = ShaderProgram::from_files(
//!         &mut device,
//!         Path::new("shaders/lighting.vert"),
//!         Path::new("shaders/lighting.frag"),
//!         None,
//!     )?;
//!     let model = Model::load(&mut device, "assets/backpack.obj")?;
//!     let mut rig = LightingRig::showroom();
//!
//!     context.begin_frame(0.016);
//!     context.dispatch(InputEvent::Move(CameraMovement::Forward));
//!
//!     shader.bind(&mut device)?;
//!     shader.set_mat4(&mut device, "view", &context.view_matrix())?;
//!     shader.set_mat4(&mut device, "projection", &context.projection_matrix())?;
//!     rig.follow_camera(context.camera());
//!     rig.apply(&mut device, &mut shader)?;
//!     model.draw(&mut device, &mut shader)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod render;

/// Common imports for library users
pub mod prelude {
    pub use crate::assets::{ImageData, ImageLoadError};
    pub use crate::config::{CameraConfig, Config, ConfigError};
    pub use crate::foundation::{
        math::{Mat4, Mat4Ext, Point3, Vec3, Vec4},
        time::FrameClock,
    };
    pub use crate::render::{
        api::{RenderDevice, ShaderStage, TextureParams, UniformValue},
        backends::{DeviceStats, HeadlessDevice},
        AssetLoadError, Camera, CameraMovement, DirectionalLight, InputEvent, LightingRig, Mesh,
        MeshTexture, Model, PointLight, RenderContext, ShaderError, ShaderProgram, SpotLight,
        Texture2D, TextureCache, TextureError, TextureRole, Vertex,
    };
}
