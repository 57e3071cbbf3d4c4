use super::config::EncoderConfig;
use crate::core::geometry::{
    VirtualCenterParams, compute_residue_mask, compute_virtual_center, fill_cb_position,
    is_complete,
};
use crate::core::models::backbone::BackboneCoords;
use nalgebra::Point3;
use tracing::debug;

/// Virtual centers of a chain, together with the base residue mask.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualCenters {
    pub points: Vec<Point3<f64>>,
    /// `true` for residues whose Cα, N and C atoms are all present.
    pub mask: Vec<bool>,
}

impl VirtualCenters {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&valid| valid).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualCenterCalculator {
    params: VirtualCenterParams,
    cb_bond_length: f64,
}

impl Default for VirtualCenterCalculator {
    fn default() -> Self {
        Self::new(&EncoderConfig::default())
    }
}

impl VirtualCenterCalculator {
    pub fn new(config: &EncoderConfig) -> Self {
        Self {
            params: config.virtual_center_params(),
            cb_bond_length: config.cb.bond_length,
        }
    }

    /// Returns the Cβ array with missing positions approximated from the
    /// backbone. The input coordinates are left untouched.
    pub fn fill_missing_cb(&self, coords: &BackboneCoords) -> Vec<Point3<f64>> {
        coords
            .ca()
            .iter()
            .zip(coords.cb())
            .zip(coords.n())
            .zip(coords.c())
            .map(|(((ca, cb), n), c)| fill_cb_position(ca, cb, n, c, self.cb_bond_length))
            .collect()
    }

    pub fn compute(&self, coords: &BackboneCoords) -> VirtualCenters {
        let missing_cb = coords.cb().iter().filter(|cb| !is_complete(cb)).count();
        let cb = self.fill_missing_cb(coords);

        let points = coords
            .ca()
            .iter()
            .zip(&cb)
            .zip(coords.n())
            .map(|((ca, cb), n)| compute_virtual_center(ca, cb, n, &self.params))
            .collect();
        let mask = compute_residue_mask(coords.ca(), coords.n(), coords.c());

        let centers = VirtualCenters { points, mask };
        debug!(
            residues = centers.len(),
            valid = centers.valid_count(),
            missing_cb,
            "Computed virtual centers."
        );
        centers
    }
}
