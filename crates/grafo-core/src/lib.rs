//! Grafo Core - lazily-constructed signal expression graphs
//!
//! This crate provides the substrate for building sample-rate signal
//! processors as expression graphs: arithmetic, comparison, and selection
//! nodes wired together once at construction time, then evaluated
//! sample-by-sample with zero allocation.
//!
//! # Core Abstractions
//!
//! ## Graph Construction
//!
//! - [`Graph`] - Explicit builder context owning the node arena and the
//!   structural-sharing cache
//! - [`Signal`] - Copyable handle to a node within one graph
//! - [`IntoSignal`] - Accepts scalar constants or existing signals as
//!   operands
//!
//! Requesting the same subexpression twice returns the same node: the cache
//! is keyed by operation tag plus ordered operand ids, and pure operations
//! over constants fold at construction time.
//!
//! ## Evaluation
//!
//! - [`CompiledGraph`] - Pruned, flattened schedule produced by
//!   [`Graph::compile`], evaluated per sample or per block
//! - [`GraphError`] - Compile- and bind-time failures
//!
//! ## Node Set
//!
//! Constants, positional input ports, binary ops ([`BinaryOp`]: add, sub,
//! mul, div, min, max, and, geq, leq), conversions ([`UnaryOp`]: gain↔dB,
//! τ→pole), per-sample `select`, and a stateful attack/release envelope
//! follower.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! grafo-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use grafo_core::Graph;
//!
//! let mut g = Graph::new(48000.0);
//! let x = g.input();
//! let attack = g.tau2pole(0.010);
//! let release = g.tau2pole(0.100);
//! let env = g.env(attack, release, x);
//! let env_db = g.gain2db(env);
//!
//! let mut run = g.compile(env_db).unwrap();
//! let out = run.process_sample(&[0.5]).unwrap();
//! assert!(out.is_finite());
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: No allocations after [`Graph::compile`]
//! - **No dependencies on std**: Pure `no_std` with `libm` for math
//! - **Every path evaluated**: `select` is a data-flow node over two
//!   already-computed operands, never divergent control flow
//! - **Explicit contexts**: No global node registry; graphs never alias

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compile;
pub mod graph;
pub mod math;
pub mod node;

// Re-export main types at crate root
pub use compile::{CompiledGraph, GraphError};
pub use graph::{Graph, IntoSignal};
pub use math::{db_to_linear, linear_to_db, ms_to_seconds, tau_to_pole};
pub use node::{BinaryOp, NodeOp, Signal, UnaryOp};
