//! Graph builder context with construction-time structural sharing.
//!
//! [`Graph`] is the explicit registry for one expression graph: it owns the
//! append-only node arena, the sample rate, and the dedup cache. It is passed
//! by `&mut` to every construction call, so independent graphs never alias
//! nodes or follower state. There is no process-wide registry.
//!
//! Construction is cheap and happens once, ahead of real time; evaluation is
//! handled by [`CompiledGraph`](crate::CompiledGraph) after
//! [`Graph::compile`](crate::Graph::compile).

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use crate::node::{BinaryOp, NodeKey, NodeOp, Signal, UnaryOp};

/// Conversion into a [`Signal`] within a specific graph.
///
/// Lets graph operations accept either an existing node handle or a plain
/// `f32`, which becomes a (shared) constant node. Parameters of higher-level
/// constructors stay scalar-or-signal without overload sets.
pub trait IntoSignal {
    /// Resolves `self` to a node handle in `graph`.
    fn into_signal(self, graph: &mut Graph) -> Signal;
}

impl IntoSignal for Signal {
    #[inline]
    fn into_signal(self, _graph: &mut Graph) -> Signal {
        self
    }
}

impl IntoSignal for f32 {
    #[inline]
    fn into_signal(self, graph: &mut Graph) -> Signal {
        graph.constant(self)
    }
}

/// Builder context for one signal-expression graph.
///
/// All construction methods take `&mut self` and return [`Signal`] handles.
/// Structurally identical requests return the same handle: the cache is keyed
/// by operation tag plus ordered operand ids ([`NodeKey`]), never by
/// incidental reference identity. Pure operations over constant operands are
/// folded to constants at construction time.
///
/// # Example
///
/// ```rust
/// use grafo_core::Graph;
///
/// let mut g = Graph::new(48000.0);
/// let x = g.input();
/// let half = g.mul(x, 0.5);
/// let again = g.mul(x, 0.5);
/// assert_eq!(half, again); // shared, not duplicated
/// ```
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<NodeOp>,
    cache: BTreeMap<NodeKey, Signal>,
    pub(crate) input_count: usize,
    sample_rate: f32,
}

impl Graph {
    /// Creates an empty graph for the given sample rate.
    ///
    /// The sample rate is fixed for the lifetime of the graph; it is read by
    /// `tau2pole` nodes at evaluation (or folding) time.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            nodes: Vec::new(),
            cache: BTreeMap::new(),
            input_count: 0,
            sample_rate,
        }
    }

    /// Returns the sample rate this graph was built for.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Returns the number of nodes in the arena (shared nodes count once).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of external input ports created so far.
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Creates a new external input port.
    ///
    /// Ports are bound positionally at evaluation time, in creation order.
    /// Input nodes are never deduplicated — each call is a distinct port.
    pub fn input(&mut self) -> Signal {
        let port = self.input_count;
        self.input_count += 1;
        self.push(NodeOp::Input(port))
    }

    /// Creates (or reuses) a constant node.
    pub fn constant(&mut self, value: f32) -> Signal {
        self.intern(NodeOp::Constant(value))
    }

    /// `a + b`.
    pub fn add(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Add, a, b)
    }

    /// `a - b`.
    pub fn sub(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Sub, a, b)
    }

    /// `a * b`.
    pub fn mul(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Mul, a, b)
    }

    /// `a / b`. Division by zero follows IEEE 754 (±∞ or NaN).
    pub fn div(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Div, a, b)
    }

    /// Elementwise minimum, lowered as `a < b ? a : b`.
    pub fn min(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Min, a, b)
    }

    /// Elementwise maximum, lowered as `a > b ? a : b`.
    pub fn max(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Max, a, b)
    }

    /// Logical AND over non-zero-ness, producing 1.0/0.0.
    pub fn and(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::And, a, b)
    }

    /// `a >= b`, producing 1.0/0.0.
    pub fn geq(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Geq, a, b)
    }

    /// `a <= b`, producing 1.0/0.0.
    pub fn leq(&mut self, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        self.binary(BinaryOp::Leq, a, b)
    }

    /// Linear amplitude to decibels: `20 * log10(x)`.
    pub fn gain2db(&mut self, x: impl IntoSignal) -> Signal {
        self.unary(UnaryOp::Gain2Db, x)
    }

    /// Decibels to linear amplitude: `10^(x/20)`.
    pub fn db2gain(&mut self, x: impl IntoSignal) -> Signal {
        self.unary(UnaryOp::Db2Gain, x)
    }

    /// Time constant in seconds to a one-pole coefficient in (0, 1).
    pub fn tau2pole(&mut self, tau_seconds: impl IntoSignal) -> Signal {
        self.unary(UnaryOp::Tau2Pole, tau_seconds)
    }

    /// Per-sample ternary: `cond != 0 ? on_true : on_false`.
    ///
    /// Both branches remain live nodes and are evaluated every sample; the
    /// select picks one of two already-computed values. A constant condition
    /// folds to the chosen branch at construction time.
    pub fn select(
        &mut self,
        cond: impl IntoSignal,
        on_true: impl IntoSignal,
        on_false: impl IntoSignal,
    ) -> Signal {
        let cond = cond.into_signal(self);
        let on_true = on_true.into_signal(self);
        let on_false = on_false.into_signal(self);
        if let NodeOp::Constant(c) = self.nodes[cond.0 as usize] {
            return if c != 0.0 { on_true } else { on_false };
        }
        self.intern(NodeOp::Select {
            cond,
            on_true,
            on_false,
        })
    }

    /// Stateful attack/release envelope follower over `input`'s magnitude.
    ///
    /// `attack_pole` is used while the magnitude is rising, `release_pole`
    /// while it is falling (see [`NodeOp::EnvFollow`]). Follower nodes
    /// participate in structural sharing: identical structure implies an
    /// identical input, hence an identical state trajectory.
    pub fn env(
        &mut self,
        attack_pole: impl IntoSignal,
        release_pole: impl IntoSignal,
        input: impl IntoSignal,
    ) -> Signal {
        let attack_pole = attack_pole.into_signal(self);
        let release_pole = release_pole.into_signal(self);
        let input = input.into_signal(self);
        self.intern(NodeOp::EnvFollow {
            attack_pole,
            release_pole,
            input,
        })
    }

    fn binary(&mut self, op: BinaryOp, a: impl IntoSignal, b: impl IntoSignal) -> Signal {
        let a = a.into_signal(self);
        let b = b.into_signal(self);
        if let (NodeOp::Constant(x), NodeOp::Constant(y)) =
            (self.nodes[a.0 as usize], self.nodes[b.0 as usize])
        {
            return self.constant(op.apply(x, y));
        }
        self.intern(NodeOp::Binary(op, a, b))
    }

    fn unary(&mut self, op: UnaryOp, x: impl IntoSignal) -> Signal {
        let x = x.into_signal(self);
        if let NodeOp::Constant(v) = self.nodes[x.0 as usize] {
            let folded = op.apply(v, self.sample_rate);
            return self.constant(folded);
        }
        self.intern(NodeOp::Unary(op, x))
    }

    /// Returns the existing node for `op`'s structural key, or appends a new
    /// one. Ops without a key (input ports) are always appended.
    fn intern(&mut self, op: NodeOp) -> Signal {
        match NodeKey::of(&op) {
            Some(key) => {
                if let Some(&existing) = self.cache.get(&key) {
                    return existing;
                }
                let id = self.push(op);
                self.cache.insert(key, id);
                id
            }
            None => self.push(op),
        }
    }

    fn push(&mut self, op: NodeOp) -> Signal {
        let id = Signal(self.nodes.len() as u32);
        self.nodes.push(op);
        id
    }
}
