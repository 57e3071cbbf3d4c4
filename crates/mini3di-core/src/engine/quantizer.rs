use crate::core::alphabet::INVALID_STATE;
use thiserror::Error;
use tracing::debug;

/// Largest number of centroids a codebook can hold, since states are `u8`.
pub const MAX_CENTROIDS: usize = u8::MAX as usize + 1;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodebookError {
    #[error("Codebook has {count} centroids, at most 256 are supported")]
    TooManyCentroids { count: usize },
    #[error("Centroid {index} has dimension {found}, expected {expected}")]
    RaggedCentroids {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Centroids of the 20 3Di states in the 2-dimensional embedding space.
pub const REFERENCE_CENTROIDS: [[f64; 2]; 20] = [
    [-1.0729, -0.3600],
    [-0.1356, -1.8914],
    [0.4948, -0.4205],
    [-0.9874, 0.8128],
    [-1.6621, -0.4259],
    [2.1394, 0.0486],
    [1.5558, -0.1503],
    [2.9179, 1.1437],
    [-2.8814, 0.9956],
    [-1.1400, -2.0068],
    [3.2025, 1.7356],
    [1.7769, -1.3037],
    [0.6901, -1.2554],
    [-1.1061, -1.3397],
    [2.1495, -0.8030],
    [2.3060, -1.4988],
    [2.5522, 0.6046],
    [0.7786, -2.1660],
    [-2.3030, 0.3813],
    [1.0290, 0.8772],
];

/// A set of centroids mapping embeddings to discrete states.
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    centroids: Vec<Vec<f64>>,
    squared_norms: Vec<f64>,
    invalid_state: u8,
}

impl Default for Codebook {
    /// The reference 3Di codebook, with [`INVALID_STATE`] for masked residues.
    fn default() -> Self {
        Self::from_checked(
            REFERENCE_CENTROIDS.iter().map(|c| c.to_vec()).collect(),
            INVALID_STATE,
        )
    }
}

impl Codebook {
    /// Creates a codebook from its centroids, which must all have the same
    /// dimension. States are the centroid indices.
    ///
    /// # Errors
    ///
    /// Returns [`CodebookError::TooManyCentroids`] beyond [`MAX_CENTROIDS`]
    /// centroids, and [`CodebookError::RaggedCentroids`] if the centroids
    /// have different dimensions.
    pub fn new(centroids: Vec<Vec<f64>>, invalid_state: u8) -> Result<Self, CodebookError> {
        if centroids.len() > MAX_CENTROIDS {
            return Err(CodebookError::TooManyCentroids {
                count: centroids.len(),
            });
        }
        if let Some(first) = centroids.first() {
            let expected = first.len();
            if let Some((index, ragged)) = centroids
                .iter()
                .enumerate()
                .find(|(_, c)| c.len() != expected)
            {
                return Err(CodebookError::RaggedCentroids {
                    index,
                    expected,
                    found: ragged.len(),
                });
            }
        }
        Ok(Self::from_checked(centroids, invalid_state))
    }

    fn from_checked(centroids: Vec<Vec<f64>>, invalid_state: u8) -> Self {
        let squared_norms = centroids
            .iter()
            .map(|c| c.iter().map(|x| x * x).sum())
            .collect();
        Self {
            centroids,
            squared_norms,
            invalid_state,
        }
    }

    pub fn len(&self) -> usize {
        self.centroids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centroids.is_empty()
    }

    /// Dimension of the embedding space, or `None` for an empty codebook.
    pub fn dim(&self) -> Option<usize> {
        self.centroids.first().map(Vec::len)
    }

    pub fn invalid_state(&self) -> u8 {
        self.invalid_state
    }

    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Returns the state of the centroid closest to `embedding`, the first
    /// index winning ties.
    ///
    /// Distances are expanded as `|e|² - 2·e·c + |c|²`. An embedding that is
    /// NaN everywhere resolves to state 0.
    pub fn nearest(&self, embedding: &[f32]) -> u8 {
        let e: Vec<f64> = embedding.iter().map(|&x| x as f64).collect();
        let e_norm: f64 = e.iter().map(|x| x * x).sum();

        let mut best_state = 0;
        let mut best_distance = f64::INFINITY;
        let candidates = self.centroids.iter().zip(&self.squared_norms);
        for (state, (centroid, c_norm)) in candidates.enumerate() {
            let dot: f64 = e.iter().zip(centroid).map(|(a, b)| a * b).sum();
            let d = e_norm - 2.0 * dot + c_norm;
            if d < best_distance {
                best_state = state;
                best_distance = d;
            }
        }
        best_state as u8
    }

    /// Assigns a state to every embedding. Residues outside of `mask` get the
    /// invalid state whatever their embedding.
    ///
    /// # Panics
    ///
    /// Panics if `embeddings` and `mask` have different lengths.
    pub fn quantize<E: AsRef<[f32]>>(&self, embeddings: &[E], mask: &[bool]) -> Vec<u8> {
        assert_eq!(
            embeddings.len(),
            mask.len(),
            "embeddings and mask must be index-aligned"
        );
        let states: Vec<u8> = embeddings
            .iter()
            .zip(mask)
            .map(|(embedding, &valid)| {
                if valid {
                    self.nearest(embedding.as_ref())
                } else {
                    self.invalid_state
                }
            })
            .collect();
        debug!(
            residues = states.len(),
            invalid = mask.iter().filter(|&&valid| !valid).count(),
            "Quantized embeddings."
        );
        states
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_codebook_has_twenty_two_dimensional_centroids() {
        let codebook = Codebook::default();
        assert_eq!(codebook.len(), 20);
        assert_eq!(codebook.dim(), Some(2));
        assert_eq!(codebook.invalid_state(), 2);
    }

    #[test]
    fn each_centroid_maps_to_its_own_state() {
        let codebook = Codebook::default();
        for (state, centroid) in REFERENCE_CENTROIDS.iter().enumerate() {
            let embedding = [centroid[0] as f32, centroid[1] as f32];
            assert_eq!(codebook.nearest(&embedding), state as u8);
        }
    }

    #[test]
    fn masked_residues_get_invalid_state_regardless_of_embedding() {
        let codebook = Codebook::default();
        let embeddings = vec![[3.2025f32, 1.7356], [3.2025, 1.7356], [-1.0729, -0.36]];
        let states = codebook.quantize(&embeddings, &[true, false, false]);
        assert_eq!(states, vec![10, INVALID_STATE, INVALID_STATE]);
    }

    #[test]
    fn ties_resolve_to_first_centroid() {
        let codebook = Codebook::new(vec![vec![1.0, 0.0], vec![-1.0, 0.0]], 0).unwrap();
        assert_eq!(codebook.nearest(&[0.0, 0.0]), 0);
        assert_eq!(codebook.nearest(&[-0.5, 0.0]), 1);
    }

    #[test]
    fn custom_codebook_uses_its_own_invalid_state() {
        let codebook = Codebook::new(vec![vec![0.0], vec![10.0]], 7).unwrap();
        let states = codebook.quantize(&[[9.0f32], [1.0]], &[true, false]);
        assert_eq!(states, vec![1, 7]);
    }

    #[test]
    fn nan_embedding_resolves_to_first_state() {
        let codebook = Codebook::default();
        assert_eq!(codebook.nearest(&[f32::NAN, f32::NAN]), 0);
    }

    #[test]
    fn new_rejects_ragged_centroids() {
        let result = Codebook::new(vec![vec![0.0, 1.0], vec![0.0, 2.0], vec![0.0]], 0);
        assert_eq!(
            result,
            Err(CodebookError::RaggedCentroids {
                index: 2,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn new_rejects_more_centroids_than_states() {
        let result = Codebook::new(vec![vec![0.0]; MAX_CENTROIDS + 1], 0);
        assert_eq!(result, Err(CodebookError::TooManyCentroids { count: 257 }));
        assert!(Codebook::new(vec![vec![0.0]; MAX_CENTROIDS], 0).is_ok());
    }

    #[test]
    fn empty_codebook_has_no_dimension() {
        let codebook = Codebook::new(Vec::new(), 0).unwrap();
        assert!(codebook.is_empty());
        assert_eq!(codebook.dim(), None);
    }
}
