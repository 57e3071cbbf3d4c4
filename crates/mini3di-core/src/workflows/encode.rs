use crate::core::alphabet::{self, AlphabetError};
use crate::core::models::backbone::BackboneCoords;
use crate::core::network::Model;
use crate::engine::config::EncoderConfig;
use crate::engine::descriptors::{DESCRIPTOR_WIDTH, Descriptors, build_descriptors};
use crate::engine::error::EncoderError;
use crate::engine::partners::find_partners;
use crate::engine::quantizer::Codebook;
use crate::engine::virtual_center::{VirtualCenterCalculator, VirtualCenters};
use nalgebra::Point3;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument};

/// The 3Di states of a chain, together with the mask of residues that
/// received a real state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChain {
    pub states: Vec<u8>,
    /// `false` for residues that were assigned the invalid state.
    pub mask: Vec<bool>,
}

impl EncodedChain {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Letters of the encoded states.
    pub fn sequence(&self) -> Result<String, AlphabetError> {
        alphabet::states_to_sequence(&self.states)
    }
}

/// Encoder of backbone coordinates into 3Di states.
///
/// The encoder is immutable once built and can be shared between threads;
/// encoding a chain never performs I/O.
#[derive(Debug, Clone)]
pub struct Encoder {
    model: Model,
    codebook: Codebook,
    config: EncoderConfig,
    calculator: VirtualCenterCalculator,
}

impl Encoder {
    /// Creates an encoder with the reference geometry and codebook.
    pub fn new(model: Model) -> Result<Self, EncoderError> {
        Self::with_config(model, EncoderConfig::default())
    }

    pub fn with_config(model: Model, config: EncoderConfig) -> Result<Self, EncoderError> {
        config.validate()?;
        let codebook = Codebook::default();
        check_compatibility(&model, &codebook)?;
        Ok(Self {
            calculator: VirtualCenterCalculator::new(&config),
            model,
            codebook,
            config,
        })
    }

    /// Creates an encoder from a kerasify byte stream.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, EncoderError> {
        Self::new(Model::read_from(reader)?)
    }

    /// Creates an encoder from a kerasify weight file.
    pub fn load(path: &Path) -> Result<Self, EncoderError> {
        Self::new(Model::load(path)?)
    }

    /// Replaces the codebook used to quantize embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::IncompatibleModel`] if the centroids do not
    /// have the width of the model output.
    pub fn with_codebook(mut self, codebook: Codebook) -> Result<Self, EncoderError> {
        check_compatibility(&self.model, &codebook)?;
        self.codebook = codebook;
        Ok(self)
    }

    /// Replaces the codebook with one built from `centroids`.
    pub fn with_centroids(
        self,
        centroids: Vec<Vec<f64>>,
        invalid_state: u8,
    ) -> Result<Self, EncoderError> {
        self.with_codebook(Codebook::new(centroids, invalid_state)?)
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn codebook(&self) -> &Codebook {
        &self.codebook
    }

    /// Computes the virtual center of every residue and the base mask of
    /// residues with a complete backbone.
    pub fn encode_virtual_centers(&self, coords: &BackboneCoords) -> VirtualCenters {
        self.calculator.compute(coords)
    }

    /// Computes the conformational descriptors of every residue.
    pub fn encode_features(&self, coords: &BackboneCoords) -> Descriptors {
        let centers = self.encode_virtual_centers(coords);
        let partners = find_partners(&centers.points, &centers.mask);
        build_descriptors(coords.ca(), &centers.mask, &partners)
    }

    /// Encodes a chain into 3Di states.
    ///
    /// Residues without a usable neighborhood get the invalid state of the
    /// codebook, which is also reflected in the returned mask.
    #[instrument(skip_all, name = "encode_workflow")]
    pub fn encode(&self, coords: &BackboneCoords) -> EncodedChain {
        let descriptors = self.encode_features(coords);
        let embeddings = self.model.forward(&descriptors.features);
        let states = self.codebook.quantize(&embeddings, &descriptors.mask);

        let encoded = EncodedChain {
            states,
            mask: descriptors.mask,
        };
        info!(
            residues = encoded.len(),
            invalid = encoded.mask.iter().filter(|&&valid| !valid).count(),
            "Encoded chain."
        );
        encoded
    }

    /// Encodes a chain from its four backbone atom arrays.
    ///
    /// # Errors
    ///
    /// Returns [`EncoderError::ShapeMismatch`] if the arrays differ in length.
    pub fn encode_atoms(
        &self,
        ca: &[Point3<f64>],
        cb: &[Point3<f64>],
        n: &[Point3<f64>],
        c: &[Point3<f64>],
    ) -> Result<EncodedChain, EncoderError> {
        let coords = BackboneCoords::new(ca.to_vec(), cb.to_vec(), n.to_vec(), c.to_vec())?;
        Ok(self.encode(&coords))
    }

    /// Converts states to their 3Di letters.
    pub fn build_sequence(&self, states: &[u8]) -> Result<String, AlphabetError> {
        alphabet::states_to_sequence(states)
    }
}

fn check_compatibility(model: &Model, codebook: &Codebook) -> Result<(), EncoderError> {
    if model.input_dim() != Some(DESCRIPTOR_WIDTH) {
        return Err(EncoderError::IncompatibleModel(format!(
            "expected {DESCRIPTOR_WIDTH} inputs, model takes {}",
            describe_width(model.input_dim())
        )));
    }
    if model.output_dim() != codebook.dim() {
        return Err(EncoderError::IncompatibleModel(format!(
            "model produces {} outputs but codebook centroids have {}",
            describe_width(model.output_dim()),
            describe_width(codebook.dim())
        )));
    }
    Ok(())
}

fn describe_width(width: Option<usize>) -> String {
    width.map_or_else(|| "none".to_string(), |w| w.to_string())
}
