//! # Network Module
//!
//! A minimal feed-forward evaluator for the pretrained 3Di embedding network.
//!
//! The network maps each 10-dimensional conformational descriptor to a point
//! in a 2-dimensional embedding space. Only the pieces needed for that network
//! are supported: a sequence of dense layers, each followed by an activation.
//!
//! ## Key Components
//!
//! - [`layer`] - Layer kinds, activations and the dense layer
//! - [`kerasify`] - Loader for the binary weight format the model ships in

pub mod kerasify;
pub mod layer;

use layer::{Layer, LayerKind};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to read model stream: {0}")]
    Read(#[source] std::io::Error),
    #[error("Malformed model: {reason}")]
    Malformed { reason: String },
    #[error("Unsupported layer at index {layer}: {}", describe_layer_code(.code))]
    UnsupportedLayer { layer: usize, code: u32 },
    #[error("Unsupported activation code {code} in layer {layer}")]
    UnsupportedActivation { layer: usize, code: u32 },
}

fn describe_layer_code(code: &u32) -> String {
    let code = *code;
    match LayerKind::from_code(code) {
        Some(kind) => format!("{kind} (type {code})"),
        None => format!("unknown type {code}"),
    }
}

/// An ordered stack of layers, immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    layers: Vec<Layer>,
}

impl Model {
    /// Builds a model, checking that consecutive layers have matching widths.
    pub fn new(layers: Vec<Layer>) -> Result<Self, ModelError> {
        for (i, pair) in layers.windows(2).enumerate() {
            if pair[0].output_dim() != pair[1].input_dim() {
                return Err(ModelError::Malformed {
                    reason: format!(
                        "layer {i} outputs {} values but layer {} expects {}",
                        pair[0].output_dim(),
                        i + 1,
                        pair[1].input_dim()
                    ),
                });
            }
        }
        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Width of the model input, or `None` for an empty model.
    pub fn input_dim(&self) -> Option<usize> {
        self.layers.first().map(Layer::input_dim)
    }

    /// Width of the model output, or `None` for an empty model.
    pub fn output_dim(&self) -> Option<usize> {
        self.layers.last().map(Layer::output_dim)
    }

    /// Evaluates the model on a single input row.
    pub fn forward_row(&self, x: &[f32]) -> Vec<f32> {
        self.layers
            .iter()
            .fold(x.to_vec(), |acc, layer| layer.forward(&acc))
    }

    /// Evaluates the model on every row of `rows`, preserving their order.
    pub fn forward<R>(&self, rows: &[R]) -> Vec<Vec<f32>>
    where
        R: AsRef<[f32]> + Sync,
    {
        #[cfg(not(feature = "parallel"))]
        let iterator = rows.iter();

        #[cfg(feature = "parallel")]
        let iterator = rows.par_iter();

        iterator.map(|row| self.forward_row(row.as_ref())).collect()
    }
}
