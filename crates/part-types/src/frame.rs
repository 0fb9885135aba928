use nalgebra::{Isometry3, Matrix3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};

/// Rigid placement in 3D: an origin plus an orthonormal orientation.
///
/// Sub-parts are built in their own local frame (profile on the local XY
/// plane, growing along local +Z) and then placed by composing frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    iso: Isometry3<f64>,
}

impl Frame {
    pub fn identity() -> Self {
        Self {
            iso: Isometry3::identity(),
        }
    }

    pub fn from_isometry(iso: Isometry3<f64>) -> Self {
        Self { iso }
    }

    pub fn isometry(&self) -> &Isometry3<f64> {
        &self.iso
    }

    pub fn translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            iso: Isometry3::translation(x, y, z),
        }
    }

    /// Frame on a planar face: origin at `origin`, local Z along `normal`.
    ///
    /// Local X is world X projected onto the plane, or world Y when the
    /// normal is parallel to X. Returns `None` for a zero normal.
    pub fn from_origin_normal(origin: [f64; 3], normal: [f64; 3]) -> Option<Self> {
        let z = Unit::try_new(Vector3::from(normal), 1e-12)?.into_inner();
        let project = |r: Vector3<f64>| r - z * r.dot(&z);
        let mut x = project(Vector3::x());
        if x.norm() < 1e-9 {
            x = project(Vector3::y());
        }
        let x = x.normalize();
        let y = z.cross(&x);
        let rot = Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[x, y, z]));
        Some(Self {
            iso: Isometry3::from_parts(
                Translation3::new(origin[0], origin[1], origin[2]),
                UnitQuaternion::from_rotation_matrix(&rot),
            ),
        })
    }

    /// Rotation by `angle` radians about the line through `axis_origin`
    /// along `axis_dir`. Returns `None` for a zero axis.
    pub fn rotation_about(axis_origin: [f64; 3], axis_dir: [f64; 3], angle: f64) -> Option<Self> {
        let axis = Unit::try_new(Vector3::from(axis_dir), 1e-12)?;
        let rot = UnitQuaternion::from_axis_angle(&axis, angle);
        let o = Vector3::from(axis_origin);
        Some(Self {
            iso: Isometry3::from_parts(Translation3::from(o - rot * o), rot),
        })
    }

    /// `self ∘ local`: interpret `local` as expressed in this frame.
    pub fn compose(&self, local: &Frame) -> Frame {
        Frame {
            iso: self.iso * local.iso,
        }
    }

    pub fn inverse(&self) -> Frame {
        Frame {
            iso: self.iso.inverse(),
        }
    }

    /// The same frame moved `distance` along its own Z axis.
    pub fn offset_along_normal(&self, distance: f64) -> Frame {
        self.compose(&Frame::translation(0.0, 0.0, distance))
    }

    pub fn origin(&self) -> [f64; 3] {
        let t = self.iso.translation.vector;
        [t.x, t.y, t.z]
    }

    pub fn x_axis(&self) -> [f64; 3] {
        self.transform_vector([1.0, 0.0, 0.0])
    }

    pub fn y_axis(&self) -> [f64; 3] {
        self.transform_vector([0.0, 1.0, 0.0])
    }

    pub fn z_axis(&self) -> [f64; 3] {
        self.transform_vector([0.0, 0.0, 1.0])
    }

    pub fn transform_point(&self, p: [f64; 3]) -> [f64; 3] {
        let q = self.iso.transform_point(&Point3::new(p[0], p[1], p[2]));
        [q.x, q.y, q.z]
    }

    pub fn transform_vector(&self, v: [f64; 3]) -> [f64; 3] {
        let w = self.iso.transform_vector(&Vector3::new(v[0], v[1], v[2]));
        [w.x, w.y, w.z]
    }

    /// Column-major homogeneous matrix.
    pub fn to_columns(&self) -> [[f64; 4]; 4] {
        let m = self.iso.to_homogeneous();
        let mut cols = [[0.0; 4]; 4];
        for (c, col) in cols.iter_mut().enumerate() {
            for (r, v) in col.iter_mut().enumerate() {
                *v = m[(r, c)];
            }
        }
        cols
    }

    pub fn approx_eq(&self, other: &Frame, eps: f64) -> bool {
        let a = self.iso.to_homogeneous();
        let b = other.iso.to_homogeneous();
        (a - b).abs().max() <= eps
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    const TOL: f64 = 1e-9;

    #[test]
    fn from_origin_normal_up_is_pure_translation() {
        let f = Frame::from_origin_normal([1.0, 2.0, 3.0], [0.0, 0.0, 1.0]).unwrap();
        assert!(f.approx_eq(&Frame::translation(1.0, 2.0, 3.0), TOL));
    }

    #[test]
    fn from_origin_normal_along_x_falls_back_to_y() {
        let f = Frame::from_origin_normal([0.0; 3], [1.0, 0.0, 0.0]).unwrap();
        let x = f.x_axis();
        assert_relative_eq!(x[1], 1.0, epsilon = TOL);
        let z = f.z_axis();
        assert_relative_eq!(z[0], 1.0, epsilon = TOL);
    }

    #[test]
    fn zero_normal_rejected() {
        assert!(Frame::from_origin_normal([0.0; 3], [0.0; 3]).is_none());
        assert!(Frame::rotation_about([0.0; 3], [0.0; 3], 1.0).is_none());
    }

    #[test]
    fn rotation_about_offset_axis() {
        let r = Frame::rotation_about([0.0, -2.0, 0.0], [1.0, 0.0, 0.0], FRAC_PI_2).unwrap();
        let p = r.transform_point([0.0, 0.0, 0.0]);
        assert_relative_eq!(p[0], 0.0, epsilon = TOL);
        assert_relative_eq!(p[1], -2.0, epsilon = TOL);
        assert_relative_eq!(p[2], 2.0, epsilon = TOL);
    }

    fn arb_frame() -> impl Strategy<Value = Frame> {
        (
            prop::array::uniform3(-50.0..50.0f64),
            prop::array::uniform3(-1.0..1.0f64),
        )
            .prop_filter_map("non-zero normal", |(o, n)| {
                if (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() < 1e-3 {
                    None
                } else {
                    Frame::from_origin_normal(o, n)
                }
            })
    }

    proptest! {
        #[test]
        fn compose_is_associative(a in arb_frame(), b in arb_frame(), c in arb_frame()) {
            let left = a.compose(&b).compose(&c);
            let right = a.compose(&b.compose(&c));
            prop_assert!(left.approx_eq(&right, 1e-6));
        }

        #[test]
        fn inverse_cancels(a in arb_frame(), p in prop::array::uniform3(-10.0..10.0f64)) {
            let q = a.inverse().transform_point(a.transform_point(p));
            for i in 0..3 {
                prop_assert!((q[i] - p[i]).abs() < 1e-6);
            }
        }

        #[test]
        fn face_frames_are_orthonormal(a in arb_frame()) {
            let (x, y, z) = (a.x_axis(), a.y_axis(), a.z_axis());
            let dot = |u: [f64; 3], v: [f64; 3]| u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
            prop_assert!(dot(x, y).abs() < 1e-9);
            prop_assert!(dot(y, z).abs() < 1e-9);
            prop_assert!((dot(z, z) - 1.0).abs() < 1e-9);
        }
    }
}
