//! Frame state and input routing for a rendered view
//!
//! The render context owns the camera together with the per-view state
//! that windowing code would otherwise scatter across globals: cursor
//! tracking, viewport aspect, clip planes, the current frame delta,
//! and the shutdown flag. Window layers translate their native events
//! into [`InputEvent`] values and hand them to
//! [`dispatch`](RenderContext::dispatch), which keeps camera controls
//! identical across window backends and headless runs.

use crate::foundation::math::Mat4;
use crate::render::camera::{Camera, CameraMovement};

/// Window-agnostic input events
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to a window position, Y growing downward
    CursorMoved {
        /// Cursor X in window coordinates
        x: f32,
        /// Cursor Y in window coordinates
        y: f32,
    },
    /// Scroll wheel turned; positive is towards the scene
    Scroll {
        /// Vertical scroll amount
        delta: f32,
    },
    /// A held movement key, sampled once per frame
    Move(CameraMovement),
    /// Window or framebuffer resized
    Resized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// The user asked to close the view
    CloseRequested,
}

/// Camera plus per-view frame state
#[derive(Debug, Clone)]
pub struct RenderContext {
    camera: Camera,
    aspect: f32,
    near: f32,
    far: f32,
    last_cursor: Option<(f32, f32)>,
    delta_time: f32,
    close_requested: bool,
}

impl RenderContext {
    /// Default near clip plane distance
    pub const DEFAULT_NEAR: f32 = 0.1;
    /// Default far clip plane distance
    pub const DEFAULT_FAR: f32 = 100.0;

    /// Create a context for a view of the given pixel size
    pub fn new(camera: Camera, width: u32, height: u32) -> Self {
        Self {
            camera,
            aspect: aspect_of(width, height),
            near: Self::DEFAULT_NEAR,
            far: Self::DEFAULT_FAR,
            last_cursor: None,
            delta_time: 0.0,
            close_requested: false,
        }
    }

    /// Override the clip plane distances
    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
    }

    /// Start a frame with its delta time in seconds
    ///
    /// Movement events dispatched after this call cover distance scaled
    /// by this delta, which keeps camera speed independent of frame
    /// rate.
    pub fn begin_frame(&mut self, delta_time: f32) {
        self.delta_time = delta_time;
    }

    /// Route one input event to the camera and view state
    ///
    /// Cursor positions arrive in window coordinates with Y growing
    /// downward; the context turns them into offsets and flips Y so an
    /// upward cursor motion pitches the view up. The first cursor
    /// sample after startup only anchors the tracking and causes no
    /// rotation, avoiding the classic first-frame view jump.
    pub fn dispatch(&mut self, event: InputEvent) {
        match event {
            InputEvent::CursorMoved { x, y } => {
                if let Some((last_x, last_y)) = self.last_cursor {
                    let xoffset = x - last_x;
                    let yoffset = last_y - y;
                    self.camera.process_mouse_movement(xoffset, yoffset, true);
                }
                self.last_cursor = Some((x, y));
            }
            InputEvent::Scroll { delta } => {
                self.camera.process_mouse_scroll(delta);
            }
            InputEvent::Move(direction) => {
                self.camera.process_keyboard(direction, self.delta_time);
            }
            InputEvent::Resized { width, height } => {
                if height > 0 {
                    self.aspect = aspect_of(width, height);
                    log::debug!("View resized to {}x{}", width, height);
                }
            }
            InputEvent::CloseRequested => {
                log::info!("Close requested");
                self.close_requested = true;
            }
        }
    }

    /// View matrix of the owned camera
    pub fn view_matrix(&self) -> Mat4 {
        self.camera.view_matrix()
    }

    /// Projection matrix using the current aspect and clip planes
    pub fn projection_matrix(&self) -> Mat4 {
        self.camera.projection_matrix(self.aspect, self.near, self.far)
    }

    /// The owned camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable access to the owned camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current viewport aspect ratio
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Whether a close was requested
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Point3;
    use approx::assert_relative_eq;

    fn test_context() -> RenderContext {
        RenderContext::new(Camera::default(), 800, 600)
    }

    #[test]
    fn test_first_cursor_sample_causes_no_rotation() {
        let mut context = test_context();
        context.dispatch(InputEvent::CursorMoved { x: 400.0, y: 300.0 });

        assert_eq!(context.camera().yaw(), Camera::DEFAULT_YAW);
        assert_eq!(context.camera().pitch(), Camera::DEFAULT_PITCH);
    }

    #[test]
    fn test_cursor_motion_up_pitches_up() {
        let mut context = test_context();
        context.dispatch(InputEvent::CursorMoved { x: 400.0, y: 300.0 });
        // Cursor moves right and up the window, so Y decreases
        context.dispatch(InputEvent::CursorMoved { x: 410.0, y: 290.0 });

        assert_relative_eq!(context.camera().yaw(), -89.0, epsilon = 1e-5);
        assert_relative_eq!(context.camera().pitch(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_move_scales_with_frame_delta() {
        let mut context = test_context();

        context.begin_frame(0.0);
        context.dispatch(InputEvent::Move(CameraMovement::Forward));
        assert_relative_eq!(context.camera().position(), Point3::origin());

        context.begin_frame(1.0);
        context.dispatch(InputEvent::Move(CameraMovement::Forward));
        assert_relative_eq!(
            context.camera().position(),
            Point3::new(0.0, 0.0, -2.5),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_scroll_reaches_camera_zoom() {
        let mut context = test_context();
        context.dispatch(InputEvent::Scroll { delta: 5.0 });
        assert_relative_eq!(context.camera().zoom(), 40.0, epsilon = 1e-5);
    }

    #[test]
    fn test_resize_updates_aspect_and_ignores_zero_height() {
        let mut context = test_context();
        assert_relative_eq!(context.aspect(), 800.0 / 600.0);

        context.dispatch(InputEvent::Resized {
            width: 1600,
            height: 900,
        });
        assert_relative_eq!(context.aspect(), 1600.0 / 900.0);

        context.dispatch(InputEvent::Resized {
            width: 1600,
            height: 0,
        });
        assert_relative_eq!(context.aspect(), 1600.0 / 900.0);
    }

    #[test]
    fn test_close_request_sets_flag() {
        let mut context = test_context();
        assert!(!context.close_requested());

        context.dispatch(InputEvent::CloseRequested);
        assert!(context.close_requested());
    }
}
