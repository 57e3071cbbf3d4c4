use nalgebra::Point3;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Squared distances between virtual centers, with the exclusion rules of the
/// partner search applied.
///
/// Distances are expanded as `|x_i|² - 2·x_i·x_j + |x_j|²`. The squared norms
/// of the chain termini are NaN, so termini neither choose nor get chosen.
/// Self pairs, masked residues and any remaining NaN are mapped to +∞.
struct PartnerDistances<'a> {
    points: &'a [Point3<f64>],
    mask: &'a [bool],
    norms: Vec<f64>,
}

impl<'a> PartnerDistances<'a> {
    fn new(points: &'a [Point3<f64>], mask: &'a [bool]) -> Self {
        let last = points.len().saturating_sub(1);
        let norms = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == 0 || i == last {
                    f64::NAN
                } else {
                    p.coords.norm_squared()
                }
            })
            .collect();
        Self {
            points,
            mask,
            norms,
        }
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        if i == j || !self.mask[i] || !self.mask[j] {
            return f64::INFINITY;
        }
        let d = self.norms[i] - 2.0 * self.points[i].coords.dot(&self.points[j].coords)
            + self.norms[j];
        if d.is_nan() { f64::INFINITY } else { d }
    }

    /// Index of the closest other residue; the first index wins ties.
    ///
    /// A row without any finite distance resolves to the first index other
    /// than `i` (0 for every row but the first).
    fn closest(&self, i: usize) -> usize {
        let mut best_index = None;
        let mut best_distance = f64::INFINITY;
        for j in (0..self.points.len()).filter(|&j| j != i) {
            let d = self.get(i, j);
            if best_index.is_none() || d < best_distance {
                best_index = Some(j);
                best_distance = d;
            }
        }
        best_index.unwrap_or(i)
    }
}

/// Finds, for every residue, the index of its nearest valid residue by
/// virtual center distance.
///
/// Only interior residues (`1..N-1`) of the returned vector are meaningful.
/// A valid interior residue is never paired with itself, a masked residue or
/// a chain terminus, unless it has no candidate at all, in which case it is
/// paired with residue 0.
///
/// # Panics
///
/// Panics if `points` and `mask` have different lengths.
pub fn find_partners(points: &[Point3<f64>], mask: &[bool]) -> Vec<usize> {
    assert_eq!(
        points.len(),
        mask.len(),
        "virtual centers and mask must be index-aligned"
    );
    let distances = PartnerDistances::new(points, mask);

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..points.len();

    #[cfg(feature = "parallel")]
    let iterator = (0..points.len()).into_par_iter();

    let partners: Vec<usize> = iterator.map(|i| distances.closest(i)).collect();
    debug!(residues = partners.len(), "Assigned structural partners.");
    partners
}
