use nalgebra::{Point3, Vector3};

/// Default Cα–Cβ bond length, in Ångström, used to rebuild missing Cβ atoms.
pub const DEFAULT_CB_BOND_LENGTH: f64 = 1.5336;

/// Parameters of the virtual center construction.
///
/// The virtual center is obtained by rotating the Cα→Cβ vector by `alpha`
/// about the normal of the (Cβ, Cα, N) plane, then by `beta` about the Cα→N
/// axis, and finally scaling it by `distance` from Cα.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCenterParams {
    /// Rotation about the plane normal, in degrees.
    pub alpha: f64,
    /// Rotation about the Cα→N axis, in degrees.
    pub beta: f64,
    /// Distance of the virtual center from Cα, in units of the Cα→Cβ vector.
    pub distance: f64,
}

impl Default for VirtualCenterParams {
    fn default() -> Self {
        Self {
            alpha: 270.0,
            beta: 0.0,
            distance: 2.0,
        }
    }
}

/// Returns `true` if none of the point coordinates is NaN.
#[inline]
pub fn is_complete(point: &Point3<f64>) -> bool {
    !point.coords.iter().any(|x| x.is_nan())
}

/// Rotates `v` by `angle` radians about the unit axis `k` (Rodrigues' formula).
///
/// The axis is not re-normalized; a NaN axis yields a NaN result.
#[inline]
pub fn rotate_about_axis(v: &Vector3<f64>, k: &Vector3<f64>, angle: f64) -> Vector3<f64> {
    let (sin, cos) = angle.sin_cos();
    v * cos + k.cross(v) * sin + k * k.dot(v) * (1.0 - cos)
}

/// Rebuilds an idealized Cβ position from the backbone atoms of a residue.
pub fn approximate_cb_position(
    ca: &Point3<f64>,
    n: &Point3<f64>,
    c: &Point3<f64>,
    bond_length: f64,
) -> Point3<f64> {
    let v1 = (c - ca).normalize();
    let v2 = (n - ca).normalize();
    let v3 = v1 / 3.0;

    let b1 = v2 + v3;
    let b2 = v1.cross(&b1);
    let u1 = b1.normalize();
    let u2 = b2.normalize();

    let v4 = (8.0f64.sqrt() / 3.0) * ((-u1 / 2.0) - (u2 * 3.0f64.sqrt() / 2.0)) - v3;
    ca + v4 * bond_length
}

/// Replaces the NaN components of `cb` with the approximated Cβ position.
///
/// Components that hold a real value are kept as they are.
pub fn fill_cb_position(
    ca: &Point3<f64>,
    cb: &Point3<f64>,
    n: &Point3<f64>,
    c: &Point3<f64>,
    bond_length: f64,
) -> Point3<f64> {
    if is_complete(cb) {
        return *cb;
    }
    let approx = approximate_cb_position(ca, n, c, bond_length);
    Point3::from(cb.coords.zip_map(&approx.coords, |real, approx| {
        if real.is_nan() { approx } else { real }
    }))
}

/// Computes the virtual center of a residue from its Cα, Cβ and N atoms.
pub fn compute_virtual_center(
    ca: &Point3<f64>,
    cb: &Point3<f64>,
    n: &Point3<f64>,
    params: &VirtualCenterParams,
) -> Point3<f64> {
    let a = cb - ca;
    let b = n - ca;

    let normal = a.cross(&b).normalize();
    let v = rotate_about_axis(&a, &normal, params.alpha.to_radians());

    let dihedral_axis = b.normalize();
    let v = rotate_about_axis(&v, &dihedral_axis, params.beta.to_radians());

    ca + v * params.distance
}

/// Builds the base residue mask: a residue is usable iff its Cα, N and C
/// atoms are all present.
pub fn compute_residue_mask(
    ca: &[Point3<f64>],
    n: &[Point3<f64>],
    c: &[Point3<f64>],
) -> Vec<bool> {
    ca.iter()
        .zip(n)
        .zip(c)
        .map(|((ca, n), c)| is_complete(ca) && is_complete(n) && is_complete(c))
        .collect()
}
