//! Mesh representation for 3D models
//!
//! A mesh is one batch of geometry: vertex and index buffers resident
//! on the device plus the textures its material samples from. Drawing
//! a mesh wires those textures to sequential units and tells the
//! shader about them through the `material.diffuseN` / `material.specularN`
//! naming convention, so one shader can serve meshes with any mix of
//! texture counts.

use std::sync::Arc;

use crate::render::api::{BufferHandle, DeviceResult, RenderDevice};
use crate::render::material::Texture2D;
use crate::render::shader::{ShaderError, ShaderProgram};

/// 3D vertex data structure for rendering
///
/// `#[repr(C)]` keeps the memory layout fixed so vertex arrays can be
/// reinterpreted as byte slices for device upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in 3D space
    pub position: [f32; 3],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// How a texture participates in the lighting model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureRole {
    /// Base color under diffuse lighting
    Diffuse,
    /// Per-texel specular intensity
    Specular,
}

impl TextureRole {
    /// Sampler name fragment used inside the `material` uniform block
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            TextureRole::Diffuse => "diffuse",
            TextureRole::Specular => "specular",
        }
    }
}

/// A texture reference with its material role
#[derive(Debug, Clone)]
pub struct MeshTexture {
    /// Shared texture, usually handed out by the texture cache
    pub texture: Arc<Texture2D>,
    /// Role deciding which sampler series the texture joins
    pub role: TextureRole,
}

/// One drawable batch of geometry with its material textures
#[derive(Debug)]
pub struct Mesh {
    /// Vertex data kept for inspection after upload
    pub vertices: Vec<Vertex>,
    /// Index data for triangles
    pub indices: Vec<u32>,
    /// Material textures in binding order
    pub textures: Vec<MeshTexture>,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
}

impl Mesh {
    /// Create a mesh and upload its geometry to the device
    ///
    /// # Arguments
    /// * `device` - Device that receives the vertex and index buffers
    /// * `vertices` - Vertex data in triangle-list order
    /// * `indices` - Triangle indices into `vertices`
    /// * `textures` - Material textures in the order they should bind
    pub fn new(
        device: &mut dyn RenderDevice,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        textures: Vec<MeshTexture>,
    ) -> DeviceResult<Self> {
        let vertex_buffer = device.create_vertex_buffer(bytemuck::cast_slice(&vertices))?;
        let index_buffer = device.create_index_buffer(bytemuck::cast_slice(&indices))?;

        log::trace!(
            "Mesh uploaded: {} vertices, {} indices, {} textures",
            vertices.len(),
            indices.len(),
            textures.len()
        );
        Ok(Self {
            vertices,
            indices,
            textures,
            vertex_buffer,
            index_buffer,
        })
    }

    /// Draw the mesh with the given shader program
    ///
    /// Binds each texture to the next free unit, counting diffuse and
    /// specular slots separately, and points the matching
    /// `material.diffuseN` / `material.specularN` sampler at that
    /// unit. The counters restart at 1 on every draw so the naming
    /// only depends on this mesh's texture list.
    ///
    /// The shader program must already be bound on the device.
    pub fn draw(
        &self,
        device: &mut dyn RenderDevice,
        shader: &mut ShaderProgram,
    ) -> Result<(), ShaderError> {
        let mut diffuse_index = 1u32;
        let mut specular_index = 1u32;

        for (unit, mesh_texture) in self.textures.iter().enumerate() {
            let unit = unit as u32;
            let series_index = match mesh_texture.role {
                TextureRole::Diffuse => {
                    let index = diffuse_index;
                    diffuse_index += 1;
                    index
                }
                TextureRole::Specular => {
                    let index = specular_index;
                    specular_index += 1;
                    index
                }
            };

            let sampler = format!(
                "material.{}{}",
                mesh_texture.role.uniform_prefix(),
                series_index
            );
            shader.set_int(device, &sampler, unit as i32)?;
            device.bind_texture(unit, mesh_texture.texture.handle())?;
        }

        device.bind_vertex_buffer(self.vertex_buffer)?;
        device.bind_index_buffer(self.index_buffer)?;
        device.draw_indexed(self.indices.len() as u32)?;
        Ok(())
    }

    /// Create a unit cube mesh with per-face normals
    ///
    /// Generates a cube spanning -0.5 to 0.5 on each axis with outward
    /// normals and 0..1 texture coordinates per face. Carries no
    /// textures, so lighting sees it through whatever material values
    /// the shader falls back to. Useful as stand-in geometry when an
    /// asset fails to load and for small marker objects.
    pub fn cube(device: &mut dyn RenderDevice) -> DeviceResult<Self> {
        let vertices = vec![
            // Front face (+Z)
            Vertex::new([-0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, 0.5], [0.0, 0.0, 1.0], [0.0, 1.0]),
            // Back face (-Z)
            Vertex::new([0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 0.0]),
            Vertex::new([-0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [1.0, 1.0]),
            Vertex::new([0.5, 0.5, -0.5], [0.0, 0.0, -1.0], [0.0, 1.0]),
            // Left face (-X)
            Vertex::new([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::new([-0.5, -0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([-0.5, 0.5, 0.5], [-1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, -0.5], [-1.0, 0.0, 0.0], [0.0, 1.0]),
            // Right face (+X)
            Vertex::new([0.5, -0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, -0.5], [1.0, 0.0, 0.0], [1.0, 1.0]),
            Vertex::new([0.5, 0.5, 0.5], [1.0, 0.0, 0.0], [0.0, 1.0]),
            // Top face (+Y)
            Vertex::new([-0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, 0.5, 0.5], [0.0, 1.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, 0.5, -0.5], [0.0, 1.0, 0.0], [0.0, 1.0]),
            // Bottom face (-Y)
            Vertex::new([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, -0.5], [0.0, -1.0, 0.0], [1.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [1.0, 1.0]),
            Vertex::new([-0.5, -0.5, 0.5], [0.0, -1.0, 0.0], [0.0, 1.0]),
        ];

        let mut indices = Vec::with_capacity(36);
        for face in 0..6u32 {
            let base = face * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }

        Self::new(device, vertices, indices, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{TextureParams, UniformValue};
    use crate::render::backends::HeadlessDevice;
    use crate::render::material::TextureCache;
    use std::path::Path;

    const VERTEX_SRC: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const FRAGMENT_SRC: &str = "#version 330 core\nout vec4 color;\nvoid main() { color = vec4(1.0); }\n";

    fn write_test_png(path: &Path) {
        image::RgbaImage::from_pixel(2, 2, image::Rgba([200, 100, 50, 255]))
            .save(path)
            .unwrap();
    }

    fn triangle_vertices() -> Vec<Vertex> {
        vec![
            Vertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0], [0.5, 1.0]),
            Vertex::new([-0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0], [1.0, 0.0]),
        ]
    }

    #[test]
    fn test_sampler_units_follow_texture_order() {
        let dir = tempfile::tempdir().unwrap();
        let wood = dir.path().join("wood.png");
        let highlight = dir.path().join("highlight.png");
        write_test_png(&wood);
        write_test_png(&highlight);

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();
        let wood_tex = cache.load(&mut device, &wood, TextureParams::default()).unwrap();
        let highlight_tex = cache
            .load(&mut device, &highlight, TextureParams::default())
            .unwrap();

        let textures = vec![
            MeshTexture {
                texture: Arc::clone(&wood_tex),
                role: TextureRole::Diffuse,
            },
            MeshTexture {
                texture: Arc::clone(&highlight_tex),
                role: TextureRole::Specular,
            },
            MeshTexture {
                texture: Arc::clone(&wood_tex),
                role: TextureRole::Diffuse,
            },
        ];
        let mesh = Mesh::new(&mut device, triangle_vertices(), vec![0, 1, 2], textures).unwrap();

        let mut shader =
            ShaderProgram::from_sources(&mut device, VERTEX_SRC, FRAGMENT_SRC, None).unwrap();
        shader.bind(&mut device).unwrap();
        mesh.draw(&mut device, &mut shader).unwrap();

        let writes = device.uniform_writes();
        assert_eq!(writes[0].name, "material.diffuse1");
        assert_eq!(writes[0].value, UniformValue::Int(0));
        assert_eq!(writes[1].name, "material.specular1");
        assert_eq!(writes[1].value, UniformValue::Int(1));
        assert_eq!(writes[2].name, "material.diffuse2");
        assert_eq!(writes[2].value, UniformValue::Int(2));

        assert_eq!(device.bound_texture(0), Some(wood_tex.handle()));
        assert_eq!(device.bound_texture(1), Some(highlight_tex.handle()));
        assert_eq!(device.bound_texture(2), Some(wood_tex.handle()));
        assert_eq!(device.stats().draw_calls, 1);
    }

    #[test]
    fn test_sampler_counters_restart_every_draw() {
        let dir = tempfile::tempdir().unwrap();
        let wood = dir.path().join("wood.png");
        write_test_png(&wood);

        let mut device = HeadlessDevice::new();
        let mut cache = TextureCache::new();
        let texture = cache.load(&mut device, &wood, TextureParams::default()).unwrap();

        let mesh = Mesh::new(
            &mut device,
            triangle_vertices(),
            vec![0, 1, 2],
            vec![MeshTexture {
                texture,
                role: TextureRole::Diffuse,
            }],
        )
        .unwrap();

        let mut shader =
            ShaderProgram::from_sources(&mut device, VERTEX_SRC, FRAGMENT_SRC, None).unwrap();
        shader.bind(&mut device).unwrap();
        mesh.draw(&mut device, &mut shader).unwrap();
        mesh.draw(&mut device, &mut shader).unwrap();

        let names: Vec<&str> = device
            .uniform_writes()
            .iter()
            .map(|write| write.name.as_str())
            .collect();
        assert_eq!(names, vec!["material.diffuse1", "material.diffuse1"]);
    }

    #[test]
    fn test_cube_uploads_two_buffers() {
        let mut device = HeadlessDevice::new();
        let cube = Mesh::cube(&mut device).unwrap();

        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.textures.is_empty());
        assert_eq!(device.stats().buffers_created, 2);
    }
}
