//! Model loading through the OBJ importer
//!
//! A model is a flat list of meshes imported from one file plus the
//! texture cache shared between them. Import runs through `tobj` with
//! triangulation and single-indexing enabled, so every mesh arrives as
//! an indexed triangle list matching the [`Vertex`] layout.
//!
//! Texture references resolve relative to the model file's directory,
//! the way `.mtl` material libraries spell them.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::render::api::{DeviceError, RenderDevice, TextureParams};
use crate::render::material::{TextureCache, TextureError};
use crate::render::mesh::{Mesh, MeshTexture, TextureRole, Vertex};
use crate::render::shader::{ShaderError, ShaderProgram};

/// Errors from importing a model file
#[derive(Debug, Error)]
pub enum AssetLoadError {
    /// The model file does not exist
    #[error("model file not found: {path:?}")]
    NotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// The importer rejected the file contents
    #[error("failed to import model {path:?}")]
    Import {
        /// Path that failed to parse
        path: PathBuf,
        /// Importer diagnostic
        #[source]
        source: tobj::LoadError,
    },

    /// The file parsed but produced no meshes
    #[error("model {path:?} contains no meshes")]
    Empty {
        /// Path of the empty model
        path: PathBuf,
    },

    /// A referenced texture failed to load
    #[error("failed to load model texture")]
    Texture(#[from] TextureError),

    /// The device rejected the geometry upload
    #[error("render device rejected model geometry")]
    Device(#[from] DeviceError),
}

/// Imported model: meshes plus the textures they share
pub struct Model {
    meshes: Vec<Mesh>,
    directory: PathBuf,
    textures: TextureCache,
}

impl Model {
    /// Import a model file and upload its meshes to the device
    ///
    /// Reads the OBJ file and its material library, builds one [`Mesh`]
    /// per imported object in file order, and loads every referenced
    /// diffuse and specular map through a per-model texture cache so a
    /// map shared between meshes uploads once.
    ///
    /// A missing file, an unparseable file, and a file with no
    /// geometry each fail with their own [`AssetLoadError`] variant
    /// before anything reaches the device.
    pub fn load(device: &mut dyn RenderDevice, path: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let path = path.as_ref();
        log::info!("Loading model from {:?}", path);

        if !path.exists() {
            return Err(AssetLoadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let load_options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, materials_result) =
            tobj::load_obj(path, &load_options).map_err(|source| AssetLoadError::Import {
                path: path.to_path_buf(),
                source,
            })?;

        if models.is_empty() {
            return Err(AssetLoadError::Empty {
                path: path.to_path_buf(),
            });
        }

        let materials = match materials_result {
            Ok(materials) => materials,
            Err(err) => {
                log::warn!(
                    "Model {:?}: material library failed to load ({}), continuing untextured",
                    path,
                    err
                );
                Vec::new()
            }
        };

        let directory = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let mut texture_cache = TextureCache::new();
        let mut meshes = Vec::with_capacity(models.len());

        for model in &models {
            let mesh = &model.mesh;
            let vertex_count = mesh.positions.len() / 3;
            let has_normals = mesh.normals.len() == mesh.positions.len();
            let has_texcoords = mesh.texcoords.len() / 2 == vertex_count;

            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let position = [
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                ];
                let normal = if has_normals {
                    [
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    ]
                } else {
                    [0.0; 3]
                };
                let tex_coord = if has_texcoords {
                    [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
                } else {
                    [0.0; 2]
                };
                vertices.push(Vertex::new(position, normal, tex_coord));
            }

            let mut textures = Vec::new();
            if let Some(material_id) = mesh.material_id {
                if let Some(material) = materials.get(material_id) {
                    if let Some(name) = &material.diffuse_texture {
                        let texture = texture_cache.load(
                            device,
                            directory.join(name),
                            TextureParams::default(),
                        )?;
                        textures.push(MeshTexture {
                            texture,
                            role: TextureRole::Diffuse,
                        });
                    }
                    if let Some(name) = &material.specular_texture {
                        let texture = texture_cache.load(
                            device,
                            directory.join(name),
                            TextureParams::default(),
                        )?;
                        textures.push(MeshTexture {
                            texture,
                            role: TextureRole::Specular,
                        });
                    }
                }
            }

            log::debug!(
                "Imported mesh '{}': {} vertices, {} indices, {} textures",
                model.name,
                vertices.len(),
                mesh.indices.len(),
                textures.len()
            );
            meshes.push(Mesh::new(device, vertices, mesh.indices.clone(), textures)?);
        }

        log::info!(
            "Model {:?} loaded: {} meshes, {} unique textures",
            path,
            meshes.len(),
            texture_cache.len()
        );
        Ok(Self {
            meshes,
            directory,
            textures: texture_cache,
        })
    }

    /// Imported meshes in file order
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Directory texture references were resolved against
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Texture cache holding this model's unique textures
    pub fn texture_cache(&self) -> &TextureCache {
        &self.textures
    }

    /// Draw every mesh with the given shader program
    pub fn draw(
        &self,
        device: &mut dyn RenderDevice,
        shader: &mut ShaderProgram,
    ) -> Result<(), ShaderError> {
        for mesh in &self.meshes {
            mesh.draw(device, shader)?;
        }
        Ok(())
    }
}
