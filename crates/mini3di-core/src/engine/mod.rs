//! # Engine Module
//!
//! The stages of the 3Di encoding pipeline and the configuration that drives them.
//!
//! ## Overview
//!
//! Each stage is a plain function (or a small calculator struct) that takes the output
//! of the previous one and returns a new value. Masks are never modified in place:
//! every stage that narrows the set of usable residues returns its own mask.
//!
//! ```text
//! BackboneCoords ──► VirtualCenters ──► partners ──► Descriptors ──► embeddings ──► states
//!                    (points + mask)                 (rows + mask)   (network)      (codebook)
//! ```
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Geometric parameters, their defaults and TOML loading
//! - **Error Handling** ([`error`]) - The encoder error type
//! - **Geometry Stage** ([`virtual_center`]) - Cβ reconstruction, virtual centers and the
//!   base residue mask
//! - **Partner Search** ([`partners`]) - Nearest structural partner of every residue
//! - **Descriptor Stage** ([`descriptors`]) - Conformational features and mask narrowing
//! - **Quantization** ([`quantizer`]) - Nearest-centroid assignment of discrete states
//!
//! ## Parallelism
//!
//! With the `parallel` feature, the partner search, the descriptor stage and the
//! network evaluation distribute residues over the rayon thread pool. Every residue
//! is computed independently, so results do not depend on the feature.

pub mod config;
pub mod descriptors;
pub mod error;
pub mod partners;
pub mod quantizer;
pub mod virtual_center;
