//! # Free-Look Camera
//!
//! First-person camera driven by yaw/pitch Euler angles with a derived
//! orthonormal basis, in the style of classic FPS controls.
//!
//! ## Design Principles
//! - **Angle-driven**: orientation state is yaw and pitch; the basis vectors
//!   are always recomputed from them, never mutated directly
//! - **Input-agnostic**: callers feed in key directions and cursor offsets,
//!   the camera knows nothing about windowing or event sources
//! - **Right-handed Y-up**: matches the conventions of the math module

use crate::foundation::math::{utils, Mat4, Mat4Ext, Point3, Vec3};

/// Movement directions decoupled from any concrete key binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Along the viewing direction
    Forward,
    /// Against the viewing direction
    Backward,
    /// Along the negative right vector
    Left,
    /// Along the right vector
    Right,
}

/// First-person camera with yaw/pitch orientation
///
/// Holds a world-space position plus Euler angles and derives the
/// `front`/`right`/`up` basis from them. All orientation changes go
/// through [`process_mouse_movement`](Camera::process_mouse_movement)
/// so the basis can never drift out of sync with the angles.
///
/// # Coordinate System
/// Right-handed with Y up. At the default yaw of -90 degrees the camera
/// faces down negative Z, so a freshly created camera looks "into" the
/// scene.
///
/// # Angle Conventions
/// - Yaw rotates around world Y; -90 degrees faces -Z, 0 faces +X
/// - Pitch rotates towards world Y and is clamped to +/-89 degrees to
///   keep the front vector from degenerating at the poles
/// - Zoom is a field-of-view angle in degrees, clamped to [1, 45]
#[derive(Debug, Clone)]
pub struct Camera {
    position: Point3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    movement_speed: f32,
    mouse_sensitivity: f32,
    zoom: f32,
}

impl Camera {
    /// Yaw that faces the camera down negative Z
    pub const DEFAULT_YAW: f32 = -90.0;
    /// Level pitch
    pub const DEFAULT_PITCH: f32 = 0.0;
    /// World units covered per second of keyboard movement
    pub const DEFAULT_SPEED: f32 = 2.5;
    /// Degrees of rotation per cursor pixel
    pub const DEFAULT_SENSITIVITY: f32 = 0.1;
    /// Field of view in degrees before any scrolling
    pub const DEFAULT_ZOOM: f32 = 45.0;
    /// Pitch magnitude limit in degrees
    pub const PITCH_LIMIT: f32 = 89.0;
    /// Narrowest allowed field of view in degrees
    pub const MIN_ZOOM: f32 = 1.0;
    /// Widest allowed field of view in degrees
    pub const MAX_ZOOM: f32 = 45.0;

    /// Create a camera at `position` with explicit orientation angles
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `world_up` - World up direction, typically (0, 1, 0)
    /// * `yaw` - Initial yaw in degrees
    /// * `pitch` - Initial pitch in degrees
    pub fn new(position: Point3, world_up: Vec3, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: world_up,
            right: Vec3::new(1.0, 0.0, 0.0),
            world_up,
            yaw,
            pitch,
            movement_speed: Self::DEFAULT_SPEED,
            mouse_sensitivity: Self::DEFAULT_SENSITIVITY,
            zoom: Self::DEFAULT_ZOOM,
        };
        camera.update_vectors();
        camera
    }

    /// Camera position in world space
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// Normalized viewing direction
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Normalized camera-local up vector
    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Normalized camera-local right vector
    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Current yaw in degrees
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current pitch in degrees
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current field of view in degrees
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Keyboard movement speed in world units per second
    pub fn movement_speed(&self) -> f32 {
        self.movement_speed
    }

    /// Mouse look sensitivity in degrees per pixel
    pub fn mouse_sensitivity(&self) -> f32 {
        self.mouse_sensitivity
    }

    /// Move the camera to a new world-space position
    pub fn set_position(&mut self, position: Point3) {
        self.position = position;
        log::trace!("Camera position updated to: {:?}", position);
    }

    /// Override the keyboard movement speed
    pub fn set_movement_speed(&mut self, speed: f32) {
        self.movement_speed = speed;
    }

    /// Override the mouse look sensitivity
    pub fn set_mouse_sensitivity(&mut self, sensitivity: f32) {
        self.mouse_sensitivity = sensitivity;
    }

    /// Set the field of view, clamped to the valid zoom range
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = utils::clamp(zoom, Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Apply one frame of keyboard movement
    ///
    /// Moves along the current front or right vector, so forward motion
    /// follows the view direction including its vertical component.
    ///
    /// # Arguments
    /// * `direction` - Which way to move relative to the view
    /// * `delta_time` - Frame time in seconds, scales the distance
    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Apply a cursor movement to the orientation angles
    ///
    /// Offsets are in pixels and are scaled by the sensitivity before
    /// being added to yaw and pitch. A positive `yoffset` pitches the
    /// view upward; callers translating window cursor positions are
    /// responsible for flipping the windowing system's Y direction
    /// first.
    ///
    /// # Arguments
    /// * `xoffset` - Horizontal cursor delta in pixels
    /// * `yoffset` - Vertical cursor delta in pixels, positive is up
    /// * `constrain_pitch` - Clamp pitch to +/-89 degrees when true
    pub fn process_mouse_movement(&mut self, xoffset: f32, yoffset: f32, constrain_pitch: bool) {
        self.yaw += xoffset * self.mouse_sensitivity;
        self.pitch += yoffset * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = utils::clamp(self.pitch, -Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Apply a scroll wheel delta to the field of view
    ///
    /// Scrolling up (positive delta) zooms in by narrowing the field of
    /// view. The result is clamped to [1, 45] degrees on both ends.
    pub fn process_mouse_scroll(&mut self, yoffset: f32) {
        self.zoom = utils::clamp(self.zoom - yoffset, Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    /// Generate the world-to-view transformation
    ///
    /// Equivalent to a look-at matrix aimed one unit along the front
    /// vector, so the view always matches the derived basis exactly.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.position + self.front, self.up)
    }

    /// Generate a perspective projection using the zoomed field of view
    ///
    /// # Arguments
    /// * `aspect` - Viewport aspect ratio (width / height)
    /// * `near` - Near clipping plane distance
    /// * `far` - Far clipping plane distance
    pub fn projection_matrix(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::perspective(utils::deg_to_rad(self.zoom), aspect, near, far)
    }

    /// Rebuild the orthonormal basis from the current yaw and pitch
    ///
    /// Front comes from the spherical form of the Euler angles, right
    /// and up follow by cross products against the world up. All three
    /// are renormalized, which keeps the basis stable as pitch
    /// approaches the clamp limits.
    fn update_vectors(&mut self) {
        let yaw = utils::deg_to_rad(self.yaw);
        let pitch = utils::deg_to_rad(self.pitch);

        let front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );
        self.front = front.normalize();
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}

impl Default for Camera {
    /// Camera at the origin facing negative Z with standard tuning
    fn default() -> Self {
        Self::new(
            Point3::origin(),
            Vec3::new(0.0, 1.0, 0.0),
            Self::DEFAULT_YAW,
            Self::DEFAULT_PITCH,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Matrix4;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_default_faces_negative_z() {
        let camera = Camera::default();
        assert_relative_eq!(camera.front(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_relative_eq!(camera.right(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(camera.up(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_forward_movement_covers_speed_times_dt() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_relative_eq!(
            camera.position(),
            Point3::new(0.0, 0.0, -2.5),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_strafe_is_perpendicular_to_view() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert_relative_eq!(camera.position(), Point3::new(5.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_basis_stays_orthonormal_after_look_around() {
        let mut camera = Camera::default();
        for (dx, dy) in [(250.0, 80.0), (-730.0, 300.0), (41.5, -900.0), (0.3, 0.7)] {
            camera.process_mouse_movement(dx, dy, true);
        }

        assert_abs_diff_eq!(camera.front().norm(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.right().norm(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.up().norm(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.front().dot(&camera.right()), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.front().dot(&camera.up()), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.right().dot(&camera.up()), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_clamps_at_vertical() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 10_000.0, true);
        assert_eq!(camera.pitch(), Camera::PITCH_LIMIT);

        camera.process_mouse_movement(0.0, -30_000.0, true);
        assert_eq!(camera.pitch(), -Camera::PITCH_LIMIT);

        // The basis survives sitting on the clamp boundary
        assert_abs_diff_eq!(camera.front().norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_unconstrained_pitch_can_flip_over() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(0.0, 1200.0, false);
        assert!(camera.pitch() > Camera::PITCH_LIMIT);
    }

    #[test]
    fn test_scroll_clamps_zoom_at_both_ends() {
        let mut camera = Camera::default();

        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), Camera::MIN_ZOOM);

        camera.process_mouse_scroll(-500.0);
        assert_eq!(camera.zoom(), Camera::MAX_ZOOM);

        camera.process_mouse_scroll(5.0);
        assert_relative_eq!(camera.zoom(), 40.0, epsilon = 1e-5);
    }

    #[test]
    fn test_view_matrix_matches_look_at() {
        let mut camera = Camera::new(
            Point3::new(1.0, 2.0, 3.0),
            Vec3::new(0.0, 1.0, 0.0),
            -35.0,
            20.0,
        );
        camera.process_mouse_movement(12.0, -4.0, true);

        let expected = Matrix4::look_at_rh(
            &camera.position(),
            &(camera.position() + camera.front()),
            &camera.up(),
        );
        assert_relative_eq!(camera.view_matrix(), expected, epsilon = 1e-5);
    }
}
