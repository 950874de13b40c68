//! Math utilities and types
//!
//! Provides the vector, quaternion and transform types used by the scene graph.
//! Rotations are stored as unit quaternions; Euler angles are derived on demand
//! using the XYZ convention (`R = Rx * Ry * Rz`) that the JSON level format uses.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Near-gimbal-lock threshold for Euler extraction
const GIMBAL_EPSILON: f32 = 0.999_999_9;

/// Transform representing position, rotation, and scale relative to a parent
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion (canonical rotation representation)
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform from position, Euler XYZ angles (radians) and scale
    pub fn from_euler(position: Vec3, euler: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: quat_from_euler_xyz(euler),
            scale,
        }
    }

    /// Euler XYZ angles (radians) derived from the rotation quaternion
    pub fn euler(&self) -> Vec3 {
        euler_xyz_from_quat(&self.rotation)
    }

    /// Replace the rotation from Euler XYZ angles (radians)
    pub fn set_euler(&mut self, euler: Vec3) {
        self.rotation = quat_from_euler_xyz(euler);
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }
}

/// Build a quaternion from Euler XYZ angles (radians)
pub fn quat_from_euler_xyz(euler: Vec3) -> Quat {
    let qx = Quat::from_axis_angle(&Vec3::x_axis(), euler.x);
    let qy = Quat::from_axis_angle(&Vec3::y_axis(), euler.y);
    let qz = Quat::from_axis_angle(&Vec3::z_axis(), euler.z);
    qx * qy * qz
}

/// Extract Euler XYZ angles (radians) from a quaternion
pub fn euler_xyz_from_quat(rotation: &Quat) -> Vec3 {
    let m = rotation.to_rotation_matrix();
    let m = m.matrix();
    let m13 = m[(0, 2)].clamp(-1.0, 1.0);
    let y = m13.asin();

    if m13.abs() < GIMBAL_EPSILON {
        let x = (-m[(1, 2)]).atan2(m[(2, 2)]);
        let z = (-m[(0, 1)]).atan2(m[(0, 0)]);
        Vec3::new(x, y, z)
    } else {
        let x = m[(2, 1)].atan2(m[(1, 1)]);
        Vec3::new(x, y, 0.0)
    }
}

/// Math utility functions
pub mod utils {
    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees.to_radians()
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians.to_degrees()
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}
