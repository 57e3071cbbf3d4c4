//! # Core Models Module
//!
//! Data structures describing the input of the encoder.
//!
//! ## Key Components
//!
//! - [`backbone`] - Index-aligned Cα, Cβ, N and C coordinates of a chain, with NaN
//!   marking absent atoms
//!
//! ## Usage
//!
//! ```ignore
//! use mini3di::core::models::backbone::{BackboneCoords, BackboneResidue};
//!
//! let coords: BackboneCoords = residues
//!     .iter()
//!     .map(|r| BackboneResidue { ca: r.ca, cb: r.cb, n: r.n, c: r.c })
//!     .collect();
//! ```

pub mod backbone;
