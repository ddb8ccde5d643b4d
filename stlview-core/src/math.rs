/// Vector and quaternion helpers used by the loader and the shading pipeline
///
/// Every function here is pure. The normalizers never fail: a zero, NaN or
/// infinite magnitude falls back to the zero vector (for vectors) or the
/// identity rotation (for quaternions).
use nalgebra::{Matrix3, Quaternion, Vector3};

pub type Vec3 = Vector3<f32>;
pub type Quat = Quaternion<f32>;
pub type Mat3 = Matrix3<f32>;

pub fn subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

pub fn dot(a: &Vec3, b: &Vec3) -> f32 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

pub fn magnitude(v: &Vec3) -> f32 {
    dot(v, v).sqrt()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no
/// usable length. Callers must tolerate the zero result (degenerate faces).
pub fn normalize(v: &Vec3) -> Vec3 {
    let mag = magnitude(v);
    if !is_usable_magnitude(mag) {
        return Vec3::zeros();
    }
    Vec3::new(v.x / mag, v.y / mag, v.z / mag)
}

pub fn quaternion_identity() -> Quat {
    Quat::new(1.0, 0.0, 0.0, 0.0)
}

/// Rotation of `angle` radians about `axis`. The axis must already be unit
/// length; it is not normalized here.
pub fn quaternion_from_axis_angle(axis: &Vec3, angle: f32) -> Quat {
    let half = angle * 0.5;
    let s = half.sin();
    Quat::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
}

/// Hamilton product `q1 * q2`: applies `q2` first, then `q1`.
pub fn quaternion_multiply(q1: &Quat, q2: &Quat) -> Quat {
    let (w1, x1, y1, z1) = (q1.w, q1.i, q1.j, q1.k);
    let (w2, x2, y2, z2) = (q2.w, q2.i, q2.j, q2.k);
    Quat::new(
        w1 * w2 - x1 * x2 - y1 * y2 - z1 * z2,
        w1 * x2 + x1 * w2 + y1 * z2 - z1 * y2,
        w1 * y2 - x1 * z2 + y1 * w2 + z1 * x2,
        w1 * z2 + x1 * y2 - y1 * x2 + z1 * w2,
    )
}

pub fn quaternion_magnitude(q: &Quat) -> f32 {
    (q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k).sqrt()
}

pub fn quaternion_normalize(q: &Quat) -> Quat {
    let mag = quaternion_magnitude(q);
    if !is_usable_magnitude(mag) {
        return quaternion_identity();
    }
    Quat::new(q.w / mag, q.i / mag, q.j / mag, q.k / mag)
}

/// 3x3 rotation matrix for `q`. The input is normalized first so slightly
/// drifted orientations still produce a proper rotation.
#[rustfmt::skip]
pub fn quaternion_to_matrix(q: &Quat) -> Mat3 {
    let q = quaternion_normalize(q);
    let (w, x, y, z) = (q.w, q.i, q.j, q.k);

    let xx = x * x;
    let xy = x * y;
    let xz = x * z;
    let xw = x * w;
    let yy = y * y;
    let yz = y * z;
    let yw = y * w;
    let zz = z * z;
    let zw = z * w;

    Mat3::new(
        1.0 - 2.0 * (yy + zz), 2.0 * (xy - zw),       2.0 * (xz + yw),
        2.0 * (xy + zw),       1.0 - 2.0 * (xx + zz), 2.0 * (yz - xw),
        2.0 * (xz - yw),       2.0 * (yz + xw),       1.0 - 2.0 * (xx + yy),
    )
}

/// Apply a 3x3 matrix to a position.
pub fn rotate(m: &Mat3, v: &Vec3) -> Vec3 {
    m * v
}

fn is_usable_magnitude(mag: f32) -> bool {
    mag != 0.0 && mag.is_finite()
}
