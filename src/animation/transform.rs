//! Translation/rotation/scale decomposition of a node transform

use glam::{Mat4, Quat, Vec3};

/// A decomposed local or parent transform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Compose `Translate * Rotate * Scale`
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_quat(self.rotation)
            * Mat4::from_scale(self.scale)
    }

    /// Decompose an affine matrix. Shear and perspective are discarded.
    ///
    /// A singular matrix (a bone scaled to zero) has no rotation to extract;
    /// it decomposes to its axis lengths with an identity rotation.
    pub fn from_matrix(matrix: Mat4) -> Self {
        if matrix.determinant().abs() <= f32::EPSILON {
            return Self {
                translation: matrix.w_axis.truncate(),
                rotation: Quat::IDENTITY,
                scale: Vec3::new(
                    matrix.x_axis.truncate().length(),
                    matrix.y_axis.truncate().length(),
                    matrix.z_axis.truncate().length(),
                ),
            };
        }

        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Interpolate each component (`lerp` for vectors, `slerp` for rotation)
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            translation: self.translation.lerp(other.translation, t),
            rotation: self.rotation.slerp(other.rotation, t).normalize(),
            scale: self.scale.lerp(other.scale, t),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_trs_order() {
        let transform = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
            Vec3::splat(2.0),
        );

        // Scale first, then rotate, then translate
        let p = transform.to_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(1.0, 4.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_decompose_round_trip() {
        let transform = Transform::new(
            Vec3::new(-4.0, 0.5, 2.0),
            Quat::from_rotation_y(0.7),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let back = Transform::from_matrix(transform.to_matrix());

        assert!((back.translation - transform.translation).length() < 1e-5);
        assert!(back.rotation.dot(transform.rotation).abs() > 0.9999);
        assert!((back.scale - transform.scale).length() < 1e-5);
    }

    #[test]
    fn test_decompose_singular_matrix() {
        let matrix =
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_scale(Vec3::ZERO);
        let transform = Transform::from_matrix(matrix);

        assert_eq!(transform.translation, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.rotation, Quat::IDENTITY);
        assert_eq!(transform.scale, Vec3::ZERO);
        assert_eq!(transform.to_matrix(), matrix);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = Transform::IDENTITY;
        let b = Transform::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_rotation_x(1.0),
            Vec3::splat(3.0),
        );
        let mid = a.lerp(&b, 0.5);

        assert!((mid.translation - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-5);
        assert!((mid.scale - Vec3::splat(2.0)).length() < 1e-5);
        assert!((mid.rotation.angle_between(Quat::IDENTITY) - 0.5).abs() < 1e-4);
    }
}
