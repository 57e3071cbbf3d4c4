//! # Core Module
//!
//! Stateless building blocks of the 3Di encoder.
//!
//! ## Architecture
//!
//! - **Geometry** ([`geometry`]) - Per-residue vector math: Cβ reconstruction, Rodrigues
//!   rotation and the virtual center construction
//! - **Input Models** ([`models`]) - Index-aligned backbone coordinates with NaN as the
//!   missing-atom sentinel
//! - **Embedding Network** ([`network`]) - Dense layers, activations and the kerasify loader
//! - **Alphabet** ([`alphabet`]) - The 3Di letters and the invalid-state code
//!
//! Every function in this module is a pure function of its inputs. NaN coordinates flow
//! through the arithmetic unchanged; deciding which residues are usable is left to the
//! masks built by the [`engine`](crate::engine).

pub mod alphabet;
pub mod geometry;
pub mod models;
pub mod network;
