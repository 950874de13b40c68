//! Perspective camera of the editor viewport
//!
//! Right-handed, Y up. The camera orbits around `target`.

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Mat4, Point3, Vec3, Vec4};

/// World-space ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

/// Orbiting perspective camera
#[derive(Debug, Clone)]
pub struct EditorCamera {
    /// Eye position in world space
    pub position: Vec3,
    /// Orbit and look-at point
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width over height
    pub aspect: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
}

impl EditorCamera {
    /// Camera from configuration for a viewport of the given size
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let [px, py, pz] = config.position;
        let [tx, ty, tz] = config.target;
        Self {
            position: Vec3::new(px, py, pz),
            target: Vec3::new(tx, ty, tz),
            up: Vec3::y(),
            fov: utils::deg_to_rad(config.fov_degrees),
            aspect: aspect_of(width, height),
            near: config.near,
            far: config.far,
        }
    }

    /// Track a viewport resize
    pub fn resize(&mut self, width: u32, height: u32) {
        let aspect = aspect_of(width, height);
        if (self.aspect - aspect).abs() > 0.01 {
            log::debug!("Camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    /// View-to-clip matrix
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Ray from the eye through a point given in NDC (Y up)
    pub fn ray_from_ndc(&self, ndc_x: f32, ndc_y: f32) -> Option<Ray> {
        let inverse = (self.projection_matrix() * self.view_matrix()).try_inverse()?;
        let near = inverse * Vec4::new(ndc_x, ndc_y, -1.0, 1.0);
        let far = inverse * Vec4::new(ndc_x, ndc_y, 1.0, 1.0);
        if near.w.abs() < f32::EPSILON || far.w.abs() < f32::EPSILON {
            return None;
        }
        let near = near.xyz() / near.w;
        let far = far.xyz() / far.w;
        let direction = (far - near).try_normalize(f32::EPSILON)?;
        Some(Ray {
            origin: self.position,
            direction,
        })
    }

    /// Rotate the eye around the target by yaw (about Y) and pitch, in radians
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius < f32::EPSILON {
            return;
        }
        let current_yaw = offset.x.atan2(offset.z);
        let current_pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let yaw = current_yaw + yaw;
        let pitch = (current_pitch + pitch).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.position = self.target
            + Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos()) * radius;
    }

    /// Move the eye toward (`factor < 1`) or away from the target
    pub fn zoom(&mut self, factor: f32) {
        let offset = (self.position - self.target) * factor.max(0.01);
        self.position = self.target + offset;
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
