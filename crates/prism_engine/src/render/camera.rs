//! Free-fly camera
//!
//! Maintains yaw/pitch orientation plus a derived orthonormal basis and
//! produces view/projection matrices for rendering. Movement, look, and
//! zoom are applied as discrete deltas from the frame loop; the camera has
//! no modes beyond its continuous numeric state.

use crate::foundation::math::{utils, Mat4, Point3, Vec3};

/// Default vertical field of view in degrees
pub const DEFAULT_ZOOM: f32 = 45.0;

/// Pitch limit keeping `front` away from the world-up pole, in degrees
const PITCH_LIMIT: f32 = 89.9;

/// Near/far clip planes used by [`FlyCamera::projection_matrix`]
const DEFAULT_NEAR: f32 = 0.1;
const DEFAULT_FAR: f32 = 100.0;

/// Movement directions mapped from held keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    /// Move along `front`
    Forward,
    /// Move against `front`
    Backward,
    /// Strafe against `right`
    Left,
    /// Strafe along `right`
    Right,
}

/// Free-fly perspective camera
///
/// The `front`/`right`/`up` basis is always re-derived from yaw, pitch and
/// the fixed world-up reference before it is read, so the three vectors
/// stay unit length and mutually orthogonal. Pitch is clamped to ±89.9° to
/// keep the basis from collapsing at the poles.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    /// Camera position in world space
    pub position: Vec3,
    /// Unit view direction, derived from yaw/pitch
    pub front: Vec3,
    /// Unit up vector of the camera frame
    pub up: Vec3,
    /// Unit right vector of the camera frame
    pub right: Vec3,
    /// Fixed world-up reference
    pub world_up: Vec3,

    /// Heading in degrees; -90 faces -Z
    pub yaw: f32,
    /// Elevation in degrees, clamped to ±89.9
    pub pitch: f32,

    /// Movement speed in units per second
    pub movement_speed: f32,
    /// Look sensitivity in degrees per pixel
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees, clamped to [1, 90]
    pub zoom: f32,

    /// Last cursor sample, seeded on the first look input
    last_cursor: Option<(f32, f32)>,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.0, 1.0, 0.0), -90.0, 0.0)
    }
}

impl FlyCamera {
    /// Create a camera at `position` with the given orientation
    pub fn new(position: Vec3, world_up: Vec3, yaw_deg: f32, pitch_deg: f32) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::new(0.0, 0.0, -1.0),
            up: world_up,
            right: Vec3::new(1.0, 0.0, 0.0),
            world_up,
            yaw: yaw_deg,
            pitch: pitch_deg,
            movement_speed: 3.0,
            mouse_sensitivity: 0.1,
            zoom: DEFAULT_ZOOM,
            last_cursor: None,
        };
        camera.update_vectors();
        camera
    }

    /// Move the camera along one direction for `dt` seconds
    ///
    /// Forward/backward travel along `front`; strafing travels along the
    /// normalized cross of `front` and `up`. Several directions may be
    /// applied within the same tick.
    pub fn process_movement(&mut self, direction: CameraMovement, dt: f32) {
        let velocity = self.movement_speed * dt;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => {
                self.position -= self.front.cross(&self.up).normalize() * velocity;
            }
            CameraMovement::Right => {
                self.position += self.front.cross(&self.up).normalize() * velocity;
            }
        }
    }

    /// Apply a look delta in pixels; positive `dy` looks up
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32, constrain_pitch: bool) {
        self.yaw += dx * self.mouse_sensitivity;
        self.pitch += dy * self.mouse_sensitivity;

        if constrain_pitch {
            self.pitch = utils::clamp(self.pitch, -PITCH_LIMIT, PITCH_LIMIT);
        }

        self.update_vectors();
    }

    /// Feed an absolute cursor sample in screen coordinates
    ///
    /// The very first sample only seeds the tracked cursor position, so the
    /// camera does not jump by the distance between an uninitialized prior
    /// sample and wherever the cursor happens to be. Screen y grows
    /// downward, so the vertical delta is inverted before becoming pitch.
    pub fn process_cursor(&mut self, x: f32, y: f32) {
        let (last_x, last_y) = match self.last_cursor {
            Some(last) => last,
            None => {
                self.last_cursor = Some((x, y));
                return;
            }
        };

        let dx = x - last_x;
        let dy = last_y - y;
        self.last_cursor = Some((x, y));
        self.process_mouse_movement(dx, dy, true);
    }

    /// Apply a scroll delta to the field of view
    ///
    /// Zoom represents vertical field-of-view in degrees, not distance;
    /// scrolling up narrows it. Clamped to [1, 90].
    pub fn process_scroll(&mut self, scroll_delta: f32) {
        self.zoom = utils::clamp(self.zoom - scroll_delta, 1.0, 90.0);
    }

    /// Look-at view matrix from the current position and basis
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.position + self.front),
            &self.up,
        )
    }

    /// Perspective projection with default 0.1/100.0 clip planes
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        self.projection_matrix_with_planes(aspect, DEFAULT_NEAR, DEFAULT_FAR)
    }

    /// Perspective projection using `zoom` as vertical field of view
    pub fn projection_matrix_with_planes(&self, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, utils::deg_to_rad(self.zoom), near, far)
    }

    /// Recompute `front`/`right`/`up` from yaw, pitch, and world-up
    fn update_vectors(&mut self) {
        let yaw_rad = utils::deg_to_rad(self.yaw);
        let pitch_rad = utils::deg_to_rad(self.pitch);

        let front = Vec3::new(
            yaw_rad.cos() * pitch_rad.cos(),
            pitch_rad.sin(),
            yaw_rad.sin() * pitch_rad.cos(),
        );
        self.front = front.normalize();

        // Gram-Schmidt: the pitch clamp keeps front away from world_up, so
        // neither cross product can collapse
        self.right = self.front.cross(&self.world_up).normalize();
        self.up = self.right.cross(&self.front).normalize();
    }
}
