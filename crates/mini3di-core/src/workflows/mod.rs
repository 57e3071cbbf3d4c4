//! # Workflows Module
//!
//! High-level entry points that run the whole 3Di encoding pipeline.
//!
//! ## Overview
//!
//! A workflow owns the loaded resources (the embedding network and the codebook) and
//! the encoder configuration, and chains the [`engine`](crate::engine) stages from raw
//! backbone coordinates to discrete states and their letters.
//!
//! ## Architecture
//!
//! - **Encoding Workflow** ([`encode`]) - The [`Encoder`](encode::Encoder) facade, exposing
//!   the full pipeline as well as its intermediate stages (virtual centers, descriptors).

pub mod encode;
