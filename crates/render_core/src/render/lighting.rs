//! Light descriptors and the per-frame lighting rig
//!
//! Lights are plain data on the CPU side. Each frame the whole rig is
//! pushed into the active shader through the uniform naming scheme the
//! fragment shaders declare: one `dirLight` struct, a `pointLights[N]`
//! array, and one `spotLight` struct. Shaders that declare fewer
//! uniforms than the rig pushes simply ignore the extras through the
//! silent no-op contract of the shader wrapper.
//!
//! The descriptors serialize, so a whole rig can live in a config file
//! instead of the binary.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};
use crate::render::api::RenderDevice;
use crate::render::camera::Camera;
use crate::render::shader::{ShaderError, ShaderProgram};

/// Point lights the fragment shader's array can hold
pub const MAX_POINT_LIGHTS: usize = 4;

/// Positions of the showroom point lights
pub const SHOWROOM_POINT_POSITIONS: [[f32; 3]; 4] = [
    [0.7, 0.2, 2.0],
    [2.3, -3.3, -4.0],
    [-4.0, 2.0, -12.0],
    [0.0, 0.0, -3.0],
];

/// Base colors of the showroom point lights, also used to tint the
/// marker geometry drawn at their positions
pub const SHOWROOM_POINT_COLORS: [[f32; 3]; 4] = [
    [0.0, 1.0, 0.5],
    [1.0, 0.0, 1.0],
    [0.7, 0.5, 1.0],
    [1.0, 0.2, 0.1],
];

/// Sun-style light with a direction and no falloff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Direction the light travels, not normalized
    pub direction: Vec3,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl DirectionalLight {
    /// Create a directional light from a base color
    ///
    /// Ambient and diffuse are the color scaled down; specular stays
    /// full white for crisp highlights.
    pub fn from_color(direction: Vec3, color: Vec3, ambient_scale: f32, diffuse_scale: f32) -> Self {
        Self {
            direction,
            ambient: color * ambient_scale,
            diffuse: color * diffuse_scale,
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::from_color(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 0.05, 0.4)
    }
}

/// Omnidirectional light with distance attenuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl PointLight {
    /// Create a point light from a base color with no falloff
    pub fn from_color(position: Vec3, color: Vec3, ambient_scale: f32, diffuse_scale: f32) -> Self {
        Self {
            position,
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
            ambient: color * ambient_scale,
            diffuse: color * diffuse_scale,
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Set the attenuation terms
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }
}

/// Cone light, typically following the camera as a head lamp
///
/// The cone angles are stored as cosines because that is the form the
/// fragment shader compares against per fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    /// World-space position
    pub position: Vec3,
    /// Direction the cone points along
    pub direction: Vec3,
    /// Cosine of the inner cone angle
    pub cut_off: f32,
    /// Cosine of the outer cone angle where light fades to zero
    pub outer_cut_off: f32,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
    /// Ambient contribution
    pub ambient: Vec3,
    /// Diffuse contribution
    pub diffuse: Vec3,
    /// Specular contribution
    pub specular: Vec3,
}

impl SpotLight {
    /// Create a spot light with cone angles given in degrees
    pub fn new(position: Vec3, direction: Vec3, cut_off_degrees: f32, outer_cut_off_degrees: f32) -> Self {
        Self {
            position,
            direction,
            cut_off: utils::deg_to_rad(cut_off_degrees).cos(),
            outer_cut_off: utils::deg_to_rad(outer_cut_off_degrees).cos(),
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
            ambient: Vec3::new(0.0, 0.0, 0.0),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }

    /// Set the light colors
    pub fn with_colors(mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Set the attenuation terms
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 10.0, 20.0)
    }
}

/// Complete lighting state pushed to shaders each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingRig {
    /// The single directional light
    pub directional: DirectionalLight,
    /// Point lights, applied up to [`MAX_POINT_LIGHTS`]
    pub points: Vec<PointLight>,
    /// The camera-following spot light
    pub spot: SpotLight,
}

impl LightingRig {
    /// Create a rig with default lights and no points
    pub fn new() -> Self {
        Self::default()
    }

    /// The reference scene: four colored point lights with individual
    /// falloff, a white sun, and a white head lamp cone
    pub fn showroom() -> Self {
        let white = Vec3::new(1.0, 1.0, 1.0);
        let attenuations = [
            (1.0, 0.001, 0.0001),
            (1.0, 0.01, 0.001),
            (1.0, 0.01, 0.001),
            (1.0, 0.01, 0.001),
        ];

        let points = SHOWROOM_POINT_POSITIONS
            .iter()
            .zip(SHOWROOM_POINT_COLORS.iter())
            .zip(attenuations.iter())
            .map(|((position, color), &(constant, linear, quadratic))| {
                PointLight::from_color(Vec3::from(*position), Vec3::from(*color), 0.1, 0.5)
                    .with_attenuation(constant, linear, quadratic)
            })
            .collect();

        Self {
            directional: DirectionalLight::from_color(Vec3::new(4.0, -7.0, 2.0), white, 0.1, 0.3),
            points,
            spot: SpotLight::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0), 10.0, 20.0)
                .with_colors(white * 0.1, white * 0.6, white),
        }
    }

    /// Add a point light to the rig
    pub fn add_point_light(&mut self, light: PointLight) {
        self.points.push(light);
    }

    /// Re-aim the spot light from the camera, head-lamp style
    pub fn follow_camera(&mut self, camera: &Camera) {
        self.spot.position = camera.position().coords;
        self.spot.direction = camera.front();
    }

    /// Push the whole rig into the active shader program
    ///
    /// Writes the `dirLight` struct, up to [`MAX_POINT_LIGHTS`]
    /// entries of the `pointLights` array, and the `spotLight` struct.
    /// Extra point lights beyond the shader's array size are skipped
    /// with a warning.
    pub fn apply(
        &self,
        device: &mut dyn RenderDevice,
        shader: &mut ShaderProgram,
    ) -> Result<(), ShaderError> {
        shader.set_vec3(device, "dirLight.direction", self.directional.direction)?;
        shader.set_vec3(device, "dirLight.ambient", self.directional.ambient)?;
        shader.set_vec3(device, "dirLight.diffuse", self.directional.diffuse)?;
        shader.set_vec3(device, "dirLight.specular", self.directional.specular)?;

        if self.points.len() > MAX_POINT_LIGHTS {
            log::warn!(
                "Lighting rig has {} point lights, shader array holds {}; extras skipped",
                self.points.len(),
                MAX_POINT_LIGHTS
            );
        }
        for (i, light) in self.points.iter().take(MAX_POINT_LIGHTS).enumerate() {
            shader.set_vec3(device, &format!("pointLights[{}].position", i), light.position)?;
            shader.set_float(device, &format!("pointLights[{}].constant", i), light.constant)?;
            shader.set_float(device, &format!("pointLights[{}].linear", i), light.linear)?;
            shader.set_float(device, &format!("pointLights[{}].quadratic", i), light.quadratic)?;
            shader.set_vec3(device, &format!("pointLights[{}].ambient", i), light.ambient)?;
            shader.set_vec3(device, &format!("pointLights[{}].diffuse", i), light.diffuse)?;
            shader.set_vec3(device, &format!("pointLights[{}].specular", i), light.specular)?;
        }

        shader.set_vec3(device, "spotLight.position", self.spot.position)?;
        shader.set_vec3(device, "spotLight.direction", self.spot.direction)?;
        shader.set_float(device, "spotLight.cutOff", self.spot.cut_off)?;
        shader.set_float(device, "spotLight.outerCutOff", self.spot.outer_cut_off)?;
        shader.set_float(device, "spotLight.constant", self.spot.constant)?;
        shader.set_float(device, "spotLight.linear", self.spot.linear)?;
        shader.set_float(device, "spotLight.quadratic", self.spot.quadratic)?;
        shader.set_vec3(device, "spotLight.ambient", self.spot.ambient)?;
        shader.set_vec3(device, "spotLight.diffuse", self.spot.diffuse)?;
        shader.set_vec3(device, "spotLight.specular", self.spot.specular)?;

        Ok(())
    }
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            directional: DirectionalLight::default(),
            points: Vec::new(),
            spot: SpotLight::default(),
        }
    }
}
