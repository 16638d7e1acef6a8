// camera.rs — orientation and field of view of the camera inside the panorama

use glam::{EulerRot, Mat4, Quat};

/// Vertical field of view the camera starts with, in degrees.
pub const INITIAL_VERTICAL_FOV: f32 = 80.0;

/// Pitch is clamped to `[-PITCH_LIMIT, PITCH_LIMIT]` radians.
pub const PITCH_LIMIT: f32 = 1.1;

const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Size of the surface the camera renders into, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// Rotation about the vertical axis, radians. Unbounded.
    pub yaw: f32,
    /// Rotation about the horizontal axis, radians.
    pub pitch: f32,
    vertical_fov: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            vertical_fov: INITIAL_VERTICAL_FOV,
        }
    }
}

impl Camera {
    /// Vertical field of view in degrees.
    pub fn vertical_fov(&self) -> f32 {
        self.vertical_fov
    }

    pub fn set_vertical_fov(&mut self, degrees: f32) {
        self.vertical_fov = degrees;
    }

    /// Horizontal field of view in degrees, scaled linearly by the viewport aspect.
    pub fn horizontal_fov(&self, viewport: Viewport) -> f32 {
        if viewport.height <= 0.0 {
            return 0.0;
        }
        self.vertical_fov * viewport.width / viewport.height
    }

    pub fn set_pitch_clamped(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera at the origin looking down -Z before rotation.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation()).inverse()
    }

    pub fn projection_matrix(&self, viewport: Viewport) -> Mat4 {
        Mat4::perspective_rh(
            self.vertical_fov.to_radians(),
            viewport.aspect(),
            Z_NEAR,
            Z_FAR,
        )
    }

    pub fn view_projection(&self, viewport: Viewport) -> Mat4 {
        self.projection_matrix(viewport) * self.view_matrix()
    }
}

/// Height of a tube at `radius` that exactly fills a vertical FOV of `vertical_fov` degrees.
pub fn fov_height(radius: f32, vertical_fov: f32) -> f32 {
    2.0 * radius * (vertical_fov.to_radians() / 2.0).tan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_initial_fov_height() {
        let h = fov_height(10.0, INITIAL_VERTICAL_FOV);
        let expected = 2.0 * 10.0 * (80.0f32.to_radians() / 2.0).tan();
        assert_eq!(h, expected);
        assert!((h - 16.7820).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_fov_tracks_aspect() {
        let camera = Camera::default();
        assert!((camera.horizontal_fov(Viewport::new(1600.0, 800.0)) - 160.0).abs() < 1e-4);
        assert!((camera.horizontal_fov(Viewport::new(800.0, 800.0)) - 80.0).abs() < 1e-4);
        assert_eq!(camera.horizontal_fov(Viewport::new(800.0, 0.0)), 0.0);
    }

    #[test]
    fn test_pitch_clamp() {
        let mut camera = Camera::default();
        camera.set_pitch_clamped(3.0);
        assert_eq!(camera.pitch, PITCH_LIMIT);
        camera.set_pitch_clamped(-3.0);
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        camera.set_pitch_clamped(0.5);
        assert_eq!(camera.pitch, 0.5);
    }

    #[test]
    fn test_identity_camera_looks_down_neg_z() {
        let camera = Camera::default();
        let forward = camera.orientation() * Vec3::NEG_Z;
        assert!(forward.x.abs() < 1e-6);
        assert!(forward.y.abs() < 1e-6);
        assert!((forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_positive_pitch_looks_up() {
        let camera = Camera {
            pitch: 0.5,
            ..Camera::default()
        };
        let forward = camera.orientation() * Vec3::NEG_Z;
        assert!(forward.y > 0.0);
    }

    #[test]
    fn test_view_projection_is_finite() {
        let camera = Camera {
            yaw: 12.3,
            pitch: -0.9,
            ..Camera::default()
        };
        let m = camera.view_projection(Viewport::new(1280.0, 720.0));
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
