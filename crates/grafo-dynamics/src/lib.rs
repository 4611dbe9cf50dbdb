//! Grafo Dynamics - compressor gain computation on the grafo signal graph
//!
//! This crate builds the gain-reduction pipeline of a feed-forward dynamics
//! compressor as a [`grafo_core`] expression graph:
//!
//! - [`compress`] - Hard-knee compressor (linear-in-dB reduction above
//!   threshold)
//! - [`skcompress`] - Soft-knee compressor (quadratic transition region
//!   around threshold)
//!
//! The individual stages are exposed for sidechain routing and metering
//! graphs: [`envelope_db`], [`hard_knee_gain_db`], [`soft_knee_gain_db`],
//! [`to_multiplier`], and [`apply`].
//!
//! # Example
//!
//! ```rust
//! use grafo_core::Graph;
//! use grafo_dynamics::compress;
//!
//! let mut g = Graph::new(48000.0);
//! let input = g.input();
//! // Self-keyed: the input drives its own gain computation
//! let out = compress(&mut g, 10.0, 100.0, -12.0, 4.0, input, input);
//!
//! let mut run = g.compile(out).unwrap();
//! let compressed = run.process_sample(&[0.5]).unwrap();
//! assert!(compressed.is_finite());
//! ```
//!
//! All parameters accept scalar constants or [`Signal`](grafo_core::Signal)
//! handles, so any of them can be modulated at signal rate. The graph is
//! constructed once and holds no state of its own beyond the envelope
//! follower node.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod compressor;

// Re-export main operations at crate root
pub use compressor::{
    apply, compress, envelope_db, hard_knee_gain_db, skcompress, soft_knee_gain_db, to_multiplier,
};
