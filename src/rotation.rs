//! Small 3D rotation helpers.
//!
//! The pose archives store rotations in two representations: the hand pose
//! as axis-angle rotation vectors (radians, magnitude = angle) and object
//! poses as wxyz quaternions. This module provides the conversions and the
//! Rodrigues rotation used by the kinematic hand model. Everything here is
//! plain `[f64; 3]` / 3x3 array math; the arrays are too small to warrant a
//! linear-algebra dependency.

/// 3x3 row-major rotation matrix.
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Rodrigues formula: axis-angle rotation vector to rotation matrix.
///
/// A near-zero rotation vector maps to the identity.
pub fn rodrigues(rotvec: [f64; 3]) -> Mat3 {
    let [x, y, z] = rotvec;
    let theta = (x * x + y * y + z * z).sqrt();
    if theta < 1e-12 {
        return IDENTITY;
    }
    let (kx, ky, kz) = (x / theta, y / theta, z / theta);
    let (s, c) = theta.sin_cos();
    let v = 1.0 - c;

    [
        [
            c + kx * kx * v,
            kx * ky * v - kz * s,
            kx * kz * v + ky * s,
        ],
        [
            ky * kx * v + kz * s,
            c + ky * ky * v,
            ky * kz * v - kx * s,
        ],
        [
            kz * kx * v - ky * s,
            kz * ky * v + kx * s,
            c + kz * kz * v,
        ],
    ]
}

pub fn mat_mul(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

pub fn mat_vec(m: &Mat3, v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Convert a wxyz quaternion to an axis-angle rotation vector.
///
/// Conventions match the archive producer: a zero vector part yields the
/// x-axis with angle 0, a zero scalar part yields angle pi, and the general
/// case uses `2 * atan(|v| / w)`.
pub fn quat_to_rotvec(quat: [f64; 4]) -> [f64; 3] {
    let [w, x, y, z] = quat;
    let n = (x * x + y * y + z * z).sqrt();

    let axis = if n == 0.0 {
        [1.0, 0.0, 0.0]
    } else {
        [x / n, y / n, z / n]
    };

    let angle = if w == 0.0 { std::f64::consts::PI } else { 2.0 * (n / w).atan() };

    [axis[0] * angle, axis[1] * angle, axis[2] * angle]
}
