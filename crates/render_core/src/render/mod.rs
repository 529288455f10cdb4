//! # Rendering System
//!
//! High-level rendering layer built over the [`api::RenderDevice`]
//! abstraction. Applications drive it through a few cooperating
//! pieces:
//! - **Context**: camera ownership, input dispatch, per-frame state
//! - **Shader**: program lifecycle and the named uniform protocol
//! - **Model / Mesh**: imported geometry with role-tagged textures
//! - **Lighting**: the per-frame light rig pushed by uniform name
//!
//! Everything talks to the device through the trait, so the same
//! rendering code runs against a real backend or the recording
//! headless device used in tests.

// Device abstraction and implementations
pub mod api;
pub mod backends;

// Scene-side building blocks
pub mod camera;
pub mod context;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod model;
pub mod shader;

// Core rendering types that applications need
pub use camera::{Camera, CameraMovement};
pub use context::{InputEvent, RenderContext};
pub use lighting::{DirectionalLight, LightingRig, PointLight, SpotLight, MAX_POINT_LIGHTS};
pub use material::{Texture2D, TextureCache, TextureError};
pub use mesh::{Mesh, MeshTexture, TextureRole, Vertex};
pub use model::{AssetLoadError, Model};
pub use shader::{ShaderError, ShaderProgram};
