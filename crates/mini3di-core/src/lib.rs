//! # mini3di
//!
//! Encoding of protein backbone coordinates into the 3Di structural alphabet, the
//! 20-letter alphabet used by Foldseek to describe the tertiary interactions of every
//! residue of a chain.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`BackboneCoords`), per-residue
//!   geometry, the dense embedding network with its kerasify loader, and the alphabet.
//!
//! - **[`engine`]: The Pipeline Stages.** Virtual center construction, partner search,
//!   conformational descriptors and state quantization, each a value-returning transform
//!   over whole chains, plus the encoder configuration and error types.
//!
//! - **[`workflows`]: The Public API.** The [`Encoder`](workflows::encode::Encoder) ties
//!   the stages together, from raw coordinates to a 3Di string.
//!
//! ## Example
//!
//! ```no_run
//! use mini3di::core::models::backbone::BackboneCoords;
//! use mini3di::workflows::encode::Encoder;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let encoder = Encoder::load(Path::new("encoder_weights_3di.kerasify"))?;
//! # let (ca, cb, n, c) = (vec![], vec![], vec![], vec![]);
//! let coords = BackboneCoords::new(ca, cb, n, c)?;
//! let encoded = encoder.encode(&coords);
//! println!("{}", encoded.sequence()?);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
