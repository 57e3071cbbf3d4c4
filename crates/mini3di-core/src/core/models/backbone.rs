use nalgebra::Point3;
use thiserror::Error;

/// Placeholder for an atom missing from the structure.
pub const MISSING_ATOM: Point3<f64> = Point3::new(f64::NAN, f64::NAN, f64::NAN);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Coordinate arrays have unequal lengths (CA: {ca}, CB: {cb}, N: {n}, C: {c})")]
pub struct ShapeMismatch {
    pub ca: usize,
    pub cb: usize,
    pub n: usize,
    pub c: usize,
}

/// Backbone atoms of a single residue, as handed over by a structure parser.
///
/// Absent atoms are `None`; they become NaN points once collected into
/// [`BackboneCoords`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackboneResidue {
    pub ca: Option<Point3<f64>>,
    pub cb: Option<Point3<f64>>,
    pub n: Option<Point3<f64>>,
    pub c: Option<Point3<f64>>,
}

/// Index-aligned backbone coordinates of a single chain.
///
/// Each array holds one point per residue, in chain order. Missing atoms are
/// stored as NaN in all three components, which lets the encoding stages
/// propagate them through plain arithmetic. The Cβ array may contain NaN
/// entries for residues whose backbone is complete (e.g. glycines); those
/// are approximated during encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackboneCoords {
    ca: Vec<Point3<f64>>,
    cb: Vec<Point3<f64>>,
    n: Vec<Point3<f64>>,
    c: Vec<Point3<f64>>,
}

impl BackboneCoords {
    /// Creates a new coordinate set, checking that all arrays have the same length.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeMismatch`] if the four arrays differ in length.
    pub fn new(
        ca: Vec<Point3<f64>>,
        cb: Vec<Point3<f64>>,
        n: Vec<Point3<f64>>,
        c: Vec<Point3<f64>>,
    ) -> Result<Self, ShapeMismatch> {
        let len = ca.len();
        if cb.len() != len || n.len() != len || c.len() != len {
            return Err(ShapeMismatch {
                ca: ca.len(),
                cb: cb.len(),
                n: n.len(),
                c: c.len(),
            });
        }
        Ok(Self { ca, cb, n, c })
    }

    pub fn len(&self) -> usize {
        self.ca.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ca.is_empty()
    }

    pub fn ca(&self) -> &[Point3<f64>] {
        &self.ca
    }

    pub fn cb(&self) -> &[Point3<f64>] {
        &self.cb
    }

    pub fn n(&self) -> &[Point3<f64>] {
        &self.n
    }

    pub fn c(&self) -> &[Point3<f64>] {
        &self.c
    }
}

impl FromIterator<BackboneResidue> for BackboneCoords {
    fn from_iter<I: IntoIterator<Item = BackboneResidue>>(iter: I) -> Self {
        let mut coords = Self::default();
        for residue in iter {
            coords.ca.push(residue.ca.unwrap_or(MISSING_ATOM));
            coords.cb.push(residue.cb.unwrap_or(MISSING_ATOM));
            coords.n.push(residue.n.unwrap_or(MISSING_ATOM));
            coords.c.push(residue.c.unwrap_or(MISSING_ATOM));
        }
        coords
    }
}
