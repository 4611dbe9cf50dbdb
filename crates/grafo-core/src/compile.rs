//! Compilation and sample-by-sample evaluation of a built graph.
//!
//! [`Graph::compile`] snapshots the arena into a [`CompiledGraph`]: nodes not
//! reachable from the requested output are pruned, and the remaining ids form
//! a flat evaluation schedule. Because the arena is append-only and operands
//! always precede their parents, ascending id order is already topological —
//! compilation is a reachability mark plus a filtered pass, not a full sort.
//!
//! Evaluation is allocation-free: one pass over the schedule per sample,
//! writing each node's value into a pre-sized slot vector. Every scheduled
//! node is evaluated every sample; `Select` reads two already-computed values
//! and never short-circuits.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

#[cfg(all(not(feature = "std"), feature = "tracing"))]
use alloc::{format, string::String};

use crate::graph::Graph;
use crate::node::{NodeOp, Signal};

/// Errors from graph compilation and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// The signal handle does not refer to a node of this graph.
    NodeNotFound(Signal),
    /// The number of bound input buffers does not match the graph's ports.
    InputCountMismatch {
        /// Ports created on the graph.
        expected: usize,
        /// Buffers supplied by the caller.
        found: usize,
    },
    /// An input buffer's length does not match the output block length.
    BlockLengthMismatch {
        /// Input port whose buffer is mis-sized.
        port: usize,
        /// Output block length.
        expected: usize,
        /// Supplied buffer length.
        found: usize,
    },
}

impl core::fmt::Display for GraphError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NodeNotFound(id) => write!(f, "{id} not found in this graph"),
            Self::InputCountMismatch { expected, found } => {
                write!(f, "expected {expected} input buffers, found {found}")
            }
            Self::BlockLengthMismatch {
                port,
                expected,
                found,
            } => write!(
                f,
                "input port {port} has {found} samples, output block has {expected}"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for GraphError {}

/// Formats a node into a human-readable schedule line.
#[cfg(feature = "tracing")]
fn format_node(op: &NodeOp) -> String {
    match op {
        NodeOp::Constant(v) => format!("const {v}"),
        NodeOp::Input(port) => format!("input[{port}]"),
        NodeOp::Binary(b, x, y) => format!("{b:?}(n{}, n{})", x.index(), y.index()),
        NodeOp::Unary(u, x) => format!("{u:?}(n{})", x.index()),
        NodeOp::Select {
            cond,
            on_true,
            on_false,
        } => format!(
            "select(n{}, n{}, n{})",
            cond.index(),
            on_true.index(),
            on_false.index()
        ),
        NodeOp::EnvFollow {
            attack_pole,
            release_pole,
            input,
        } => format!(
            "env(n{}, n{}, n{})",
            attack_pole.index(),
            release_pole.index(),
            input.index()
        ),
    }
}

/// Sentinel for nodes without follower state.
const NO_STATE: u32 = u32::MAX;

impl Graph {
    /// Compiles the graph into an evaluable snapshot rooted at `output`.
    ///
    /// Nodes unreachable from `output` are dropped from the schedule. Input
    /// ports keep their positional binding even when pruned — a pruned port's
    /// buffer is simply never read.
    pub fn compile(&self, output: Signal) -> Result<CompiledGraph, GraphError> {
        if output.index() as usize >= self.nodes.len() {
            return Err(GraphError::NodeNotFound(output));
        }

        // Reachability mark, seeded from the output. Operands always have
        // smaller ids, so one reverse pass settles the whole arena.
        let mut live = vec![false; self.nodes.len()];
        live[output.index() as usize] = true;
        for id in (0..self.nodes.len()).rev() {
            if !live[id] {
                continue;
            }
            match self.nodes[id] {
                NodeOp::Constant(_) | NodeOp::Input(_) => {}
                NodeOp::Binary(_, a, b) => {
                    live[a.index() as usize] = true;
                    live[b.index() as usize] = true;
                }
                NodeOp::Unary(_, x) => {
                    live[x.index() as usize] = true;
                }
                NodeOp::Select {
                    cond,
                    on_true,
                    on_false,
                } => {
                    live[cond.index() as usize] = true;
                    live[on_true.index() as usize] = true;
                    live[on_false.index() as usize] = true;
                }
                NodeOp::EnvFollow {
                    attack_pole,
                    release_pole,
                    input,
                } => {
                    live[attack_pole.index() as usize] = true;
                    live[release_pole.index() as usize] = true;
                    live[input.index() as usize] = true;
                }
            }
        }

        let mut schedule = Vec::new();
        let mut env_slot = vec![NO_STATE; self.nodes.len()];
        let mut env_count = 0u32;
        for (id, &is_live) in live.iter().enumerate() {
            if !is_live {
                continue;
            }
            if matches!(self.nodes[id], NodeOp::EnvFollow { .. }) {
                env_slot[id] = env_count;
                env_count += 1;
            }
            schedule.push(id as u32);
        }

        #[cfg(feature = "tracing")]
        for &id in &schedule {
            tracing::debug!(
                target: "grafo::compile",
                "step n{id}: {}",
                format_node(&self.nodes[id as usize])
            );
        }

        Ok(CompiledGraph {
            nodes: self.nodes.clone(),
            schedule,
            env_slot,
            env_state: vec![0.0; env_count as usize],
            values: vec![0.0; self.nodes.len()],
            input_count: self.input_count,
            output,
            sample_rate: self.sample_rate(),
        })
    }
}

/// Immutable schedule plus mutable evaluation state for one graph output.
///
/// Produced by [`Graph::compile`]. Holds per-node value slots and per-follower
/// filter state; [`process_sample`](Self::process_sample) and
/// [`process_block`](Self::process_block) never allocate.
#[derive(Debug, Clone)]
pub struct CompiledGraph {
    nodes: Vec<NodeOp>,
    /// Live node ids in ascending (topological) order.
    schedule: Vec<u32>,
    /// Per-node index into `env_state`, `NO_STATE` for stateless nodes.
    env_slot: Vec<u32>,
    env_state: Vec<f32>,
    values: Vec<f32>,
    input_count: usize,
    output: Signal,
    sample_rate: f32,
}

impl CompiledGraph {
    /// Returns the number of scheduled (live) nodes.
    pub fn step_count(&self) -> usize {
        self.schedule.len()
    }

    /// Returns the number of external input ports the graph was built with.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Returns the sample rate the graph was built for.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Clears all envelope-follower state.
    pub fn reset(&mut self) {
        for state in &mut self.env_state {
            *state = 0.0;
        }
    }

    /// Evaluates one sample. `inputs` supplies one value per input port, in
    /// port-creation order.
    pub fn process_sample(&mut self, inputs: &[f32]) -> Result<f32, GraphError> {
        if inputs.len() != self.input_count {
            return Err(GraphError::InputCountMismatch {
                expected: self.input_count,
                found: inputs.len(),
            });
        }
        Ok(self.eval_pass(|port| inputs[port]))
    }

    /// Evaluates a block. `inputs` supplies one buffer per input port, each
    /// the same length as `output`.
    pub fn process_block(
        &mut self,
        inputs: &[&[f32]],
        output: &mut [f32],
    ) -> Result<(), GraphError> {
        if inputs.len() != self.input_count {
            return Err(GraphError::InputCountMismatch {
                expected: self.input_count,
                found: inputs.len(),
            });
        }
        for (port, buf) in inputs.iter().enumerate() {
            if buf.len() != output.len() {
                return Err(GraphError::BlockLengthMismatch {
                    port,
                    expected: output.len(),
                    found: buf.len(),
                });
            }
        }
        for (n, out) in output.iter_mut().enumerate() {
            *out = self.eval_pass(|port| inputs[port][n]);
        }
        Ok(())
    }

    /// One full pass over the schedule: every live node is evaluated, in id
    /// order, with operands guaranteed to be already written this pass.
    fn eval_pass(&mut self, read_input: impl Fn(usize) -> f32) -> f32 {
        for k in 0..self.schedule.len() {
            let id = self.schedule[k] as usize;
            let value = match self.nodes[id] {
                NodeOp::Constant(v) => v,
                NodeOp::Input(port) => read_input(port),
                NodeOp::Binary(op, a, b) => op.apply(
                    self.values[a.index() as usize],
                    self.values[b.index() as usize],
                ),
                NodeOp::Unary(op, x) => {
                    op.apply(self.values[x.index() as usize], self.sample_rate)
                }
                NodeOp::Select {
                    cond,
                    on_true,
                    on_false,
                } => {
                    // Both branches were computed earlier this pass; selection
                    // is data, not control flow.
                    if self.values[cond.index() as usize] != 0.0 {
                        self.values[on_true.index() as usize]
                    } else {
                        self.values[on_false.index() as usize]
                    }
                }
                NodeOp::EnvFollow {
                    attack_pole,
                    release_pole,
                    input,
                } => {
                    let slot = self.env_slot[id] as usize;
                    let magnitude = self.values[input.index() as usize].abs();
                    let state = self.env_state[slot];
                    let coeff = if magnitude > state {
                        self.values[attack_pole.index() as usize]
                    } else {
                        self.values[release_pole.index() as usize]
                    };
                    let next = coeff * state + (1.0 - coeff) * magnitude;
                    self.env_state[slot] = next;
                    next
                }
            };
            self.values[id] = value;
        }
        self.values[self.output.index() as usize]
    }
}
