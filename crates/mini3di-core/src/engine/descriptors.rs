use nalgebra::Point3;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Number of conformational features per residue.
pub const DESCRIPTOR_WIDTH: usize = 10;

pub type Descriptor = [f32; DESCRIPTOR_WIDTH];

/// Conformational descriptors of a chain, together with the narrowed mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptors {
    /// One row per residue; all-zero wherever `mask` is `false`.
    pub features: Vec<Descriptor>,
    /// `true` for residues whose whole neighborhood, and that of their
    /// partner, is valid. Always `false` at both chain termini.
    pub mask: Vec<bool>,
}

impl Descriptors {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&valid| valid).count()
    }
}

/// Features of residue `i` paired with residue `j`.
///
/// `prev_j` is the residue preceding `j`, passed explicitly since it wraps
/// around to the last residue when `j` is the first one.
fn residue_features(ca: &[Point3<f64>], i: usize, j: usize, prev_j: usize) -> Descriptor {
    let u1 = (ca[i] - ca[i - 1]).normalize();
    let u2 = (ca[i + 1] - ca[i]).normalize();
    let u3 = (ca[j] - ca[prev_j]).normalize();
    let u4 = (ca[j + 1] - ca[j]).normalize();
    let u5 = (ca[j] - ca[i]).normalize();

    let offset = j as f64 - i as f64;
    [
        u1.dot(&u2) as f32,
        u3.dot(&u4) as f32,
        u1.dot(&u5) as f32,
        u3.dot(&u5) as f32,
        u1.dot(&u4) as f32,
        u2.dot(&u3) as f32,
        u1.dot(&u3) as f32,
        (ca[i] - ca[j]).norm() as f32,
        offset.clamp(-4.0, 4.0) as f32,
        (offset.abs() + 1.0).ln().copysign(offset) as f32,
    ]
}

/// Builds the conformational descriptors of every residue from its Cα trace
/// and structural partner.
///
/// A residue keeps its descriptor only if residues `i-1`, `i`, `i+1`, `j-1`,
/// `j` and `j+1` are all valid in `mask`, where `j` is its partner. The test
/// uses the input mask only: invalidity does not cascade further along the
/// chain.
///
/// A partner at the last position of the chain, which the partner search
/// never produces, leaves the residue invalid.
///
/// # Panics
///
/// Panics if the inputs are not index-aligned.
pub fn build_descriptors(ca: &[Point3<f64>], mask: &[bool], partners: &[usize]) -> Descriptors {
    let n = ca.len();
    assert_eq!(n, mask.len(), "Cα coordinates and mask must be index-aligned");
    assert_eq!(n, partners.len(), "Cα coordinates and partners must be index-aligned");

    let row = |i: usize| -> (Descriptor, bool) {
        if i == 0 || i + 1 >= n {
            return ([0.0; DESCRIPTOR_WIDTH], false);
        }
        let j = partners[i];
        if j + 1 >= n {
            return ([0.0; DESCRIPTOR_WIDTH], false);
        }
        let prev_j = if j == 0 { n - 1 } else { j - 1 };
        let valid = mask[i - 1]
            && mask[i]
            && mask[i + 1]
            && mask[prev_j]
            && mask[j]
            && mask[j + 1];
        if valid {
            (residue_features(ca, i, j, prev_j), true)
        } else {
            ([0.0; DESCRIPTOR_WIDTH], false)
        }
    };

    #[cfg(not(feature = "parallel"))]
    let iterator = 0..n;

    #[cfg(feature = "parallel")]
    let iterator = (0..n).into_par_iter();

    let (features, mask): (Vec<_>, Vec<_>) = iterator.map(row).unzip();
    let descriptors = Descriptors { features, mask };
    debug!(
        residues = descriptors.len(),
        valid = descriptors.valid_count(),
        "Built conformational descriptors."
    );
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::partners::find_partners;
    use crate::test_utils::helix_backbone;

    fn zigzag(n: usize) -> Vec<Point3<f64>> {
        (0..n)
            .map(|i| Point3::new(i as f64 * 3.8, if i % 2 == 0 { 0.0 } else { 1.0 }, 0.0))
            .collect()
    }

    #[test]
    fn termini_are_always_excluded() {
        let ca = zigzag(6);
        let partners = vec![2, 3, 4, 1, 2, 3];
        let descriptors = build_descriptors(&ca, &[true; 6], &partners);
        assert!(!descriptors.mask[0]);
        assert!(!descriptors.mask[5]);
        assert_eq!(descriptors.features[0], [0.0; DESCRIPTOR_WIDTH]);
        assert_eq!(descriptors.features[5], [0.0; DESCRIPTOR_WIDTH]);
        assert!(descriptors.mask[1..5].iter().all(|&valid| valid));
    }

    #[test]
    fn features_follow_documented_order() {
        let ca = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
        ];
        // residue 1 paired with residue 3
        let partners = vec![0, 3, 0, 1, 0, 0];
        let descriptors = build_descriptors(&ca, &[true; 6], &partners);
        let f = descriptors.features[1];

        // u1 = u2 = x, u3 = u4 = y, u5 = normalize(1, 1, 0)
        let s = std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(f[0], 1.0);
        assert_eq!(f[1], 1.0);
        assert!((f[2] - s).abs() < 1e-6);
        assert!((f[3] - s).abs() < 1e-6);
        assert_eq!(f[4], 0.0);
        assert_eq!(f[5], 0.0);
        assert_eq!(f[6], 0.0);
        assert!((f[7] - 2.0f32.sqrt()).abs() < 1e-6);
        assert_eq!(f[8], 2.0);
        assert!((f[9] - 3.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn sequence_offset_features_are_signed_and_clamped() {
        let ca = zigzag(12);
        let mut partners = vec![0; 12];
        partners[9] = 2;
        partners[2] = 9;
        let descriptors = build_descriptors(&ca, &[true; 12], &partners);

        assert_eq!(descriptors.features[9][8], -4.0);
        assert!((descriptors.features[9][9] + 8.0f32.ln()).abs() < 1e-6);
        assert_eq!(descriptors.features[2][8], 4.0);
        assert!((descriptors.features[2][9] - 8.0f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn invalid_residue_invalidates_its_sequence_neighbors_only() {
        let ca = zigzag(10);
        let mut mask = vec![true; 10];
        mask[5] = false;
        // every interior residue pairs far from residue 5
        let partners = vec![0, 2, 1, 2, 2, 2, 2, 8, 7, 8];
        let descriptors = build_descriptors(&ca, &mask, &partners);

        let expected = vec![
            false, true, true, true, false, false, false, true, true, false,
        ];
        assert_eq!(descriptors.mask, expected);
    }

    #[test]
    fn invalid_residue_invalidates_residues_partnered_next_to_it() {
        let ca = zigzag(10);
        let mut mask = vec![true; 10];
        mask[5] = false;
        let partners = vec![0, 4, 1, 6, 1, 1, 1, 1, 1, 1];
        let descriptors = build_descriptors(&ca, &mask, &partners);

        // residue 1 pairs with 4 (followed by 5), residue 3 with 6 (preceded by 5)
        assert!(!descriptors.mask[1]);
        assert!(!descriptors.mask[3]);
        assert!(descriptors.mask[2]);
        assert_eq!(descriptors.features[1], [0.0; DESCRIPTOR_WIDTH]);
    }

    #[test]
    fn partner_at_first_residue_wraps_to_last_residue() {
        let ca = zigzag(3);
        let descriptors = build_descriptors(&ca, &[true; 3], &[1, 0, 0]);
        assert_eq!(descriptors.mask, vec![false, true, false]);
        // u3 is taken from the last residue to the first one
        let u1 = (ca[1] - ca[0]).normalize();
        let u3 = (ca[0] - ca[2]).normalize();
        assert!((descriptors.features[1][6] - u1.dot(&u3) as f32).abs() < 1e-6);

        let masked = build_descriptors(&ca, &[true, true, false], &[1, 0, 0]);
        assert_eq!(masked.mask, vec![false, false, false]);
    }

    #[test]
    fn short_chains_have_no_valid_residue() {
        for n in 0..3 {
            let ca = zigzag(n);
            let descriptors = build_descriptors(&ca, &vec![true; n], &vec![0; n]);
            assert!(descriptors.mask.iter().all(|&valid| !valid));
        }
        let two = build_descriptors(&zigzag(2), &[true, true], &[1, 0]);
        assert_eq!(two.mask, vec![false, false]);
        assert_eq!(two.features, vec![[0.0; DESCRIPTOR_WIDTH]; 2]);
    }

    #[test]
    fn partner_at_last_residue_is_invalid() {
        let descriptors = build_descriptors(&zigzag(5), &[true; 5], &[0, 4, 1, 1, 0]);
        assert_eq!(descriptors.mask, vec![false, false, true, true, false]);
    }

    #[test]
    fn helix_descriptors_are_finite() {
        let helix = helix_backbone(30);
        let partners = find_partners(helix.ca(), &[true; 30]);
        let descriptors = build_descriptors(helix.ca(), &[true; 30], &partners);
        assert_eq!(descriptors.valid_count(), 28);
        assert!(
            descriptors
                .features
                .iter()
                .flatten()
                .all(|value| value.is_finite())
        );
    }
}
