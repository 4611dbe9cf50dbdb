//! Feed-forward compressor gain computation as a signal graph.
//!
//! Builds the gain-reduction pipeline of a dynamics compressor out of
//! [`Graph`] nodes: a sidechain-driven envelope stage, a hard-knee or
//! soft-knee gain curve in decibels, an unconditional non-positive clamp,
//! conversion back to a linear multiplier, and application to the
//! uncompressed input.
//!
//! # Signal Flow
//!
//! ```text
//! sidechain → envelope follower → dB → gain curve → clamp → linear → × xn
//! ```
//!
//! # Parameters
//!
//! | Parameter | Units | Description |
//! |-----------|-------|-------------|
//! | Threshold | dB | Level where gain reduction begins |
//! | Ratio | ratio | Compression strength (1 = no-op, ∞:1 → limiter) |
//! | Attack | ms | Envelope rise time constant |
//! | Release | ms | Envelope fall time constant |
//! | Knee | dB | Width of the soft-knee transition around threshold |
//!
//! Every parameter accepts a scalar constant or a [`Signal`], so thresholds,
//! ratios, and knee widths may themselves be modulated at signal rate. The
//! whole pipeline is constructed once; there is no per-sample control flow
//! and no state outside the envelope follower node.
//!
//! # Degenerate parameters
//!
//! No parameter is validated or clamped. `ratio = 0` divides by zero and
//! poisons the curve with ±∞/NaN; a ratio in (0, 1) (expansion) produces a
//! positive raw gain above threshold that the unconditional `min(0, ·)`
//! clamp silently suppresses. Both are inherited properties of the curve,
//! observable only in the output signal.

use grafo_core::{Graph, IntoSignal, Signal};

/// Builds the envelope stage: sidechain magnitude smoothed by attack/release
/// time constants, expressed in decibels.
///
/// Attack and release are in milliseconds; each is converted to seconds and
/// then to a one-pole coefficient before driving the follower.
pub fn envelope_db(
    g: &mut Graph,
    attack_ms: impl IntoSignal,
    release_ms: impl IntoSignal,
    sidechain: Signal,
) -> Signal {
    let attack_s = g.mul(attack_ms, 0.001);
    let release_s = g.mul(release_ms, 0.001);
    let attack_pole = g.tau2pole(attack_s);
    let release_pole = g.tau2pole(release_s);
    let envelope = g.env(attack_pole, release_pole, sidechain);
    g.gain2db(envelope)
}

/// The shared curve slope `1 - 1/ratio`.
///
/// 0 at ratio = 1 (no reduction ever), approaching 1 as ratio → ∞
/// (limiting).
fn slope(g: &mut Graph, ratio: impl IntoSignal) -> Signal {
    let inverse = g.div(1.0, ratio);
    g.sub(1.0, inverse)
}

/// Hard-knee gain curve: linear-in-dB reduction above threshold, zero below.
///
/// Computes `min(0, (1 - 1/ratio) * (threshold - envelope_db))` — the raw
/// value is positive below threshold (for ratio > 1) and the clamp forces it
/// to 0 dB there; above threshold it grows negative in proportion to the
/// overshoot. The result is always ≤ 0.
pub fn hard_knee_gain_db(
    g: &mut Graph,
    threshold: impl IntoSignal,
    ratio: impl IntoSignal,
    envelope_db: Signal,
) -> Signal {
    let slope = slope(g, ratio);
    let undershoot = g.sub(threshold, envelope_db);
    let raw = g.mul(slope, undershoot);
    g.min(0.0, raw)
}

/// Soft-knee gain curve: three-region piecewise reduction.
///
/// Below `threshold - knee/2` and above `threshold + knee/2` this is the
/// hard-knee law; inside the knee (both edges inclusive) it follows the
/// downward-opening quadratic
/// `0.5 * slope * ((e - lower) / knee) * (lower - e)`,
/// which is 0 at the lower edge and meets the hard-knee value at the upper
/// edge — continuous (C0) at both boundaries. Selection between the branches
/// is a per-sample `select` node, not control flow, so both branch values
/// are computed every sample. The result is clamped to ≤ 0 identically to
/// [`hard_knee_gain_db`].
///
/// With `knee_width = 0` the knee branch divides by zero at the single
/// instant where `envelope_db` equals the threshold exactly, yielding NaN
/// for that sample; every other sample takes the outside branch and is
/// bit-identical to the hard-knee curve. A negative `knee_width` inverts the
/// window bounds so the knee branch is never taken.
pub fn soft_knee_gain_db(
    g: &mut Graph,
    threshold: impl IntoSignal,
    ratio: impl IntoSignal,
    knee_width: impl IntoSignal,
    envelope_db: Signal,
) -> Signal {
    let threshold = threshold.into_signal(g);
    let knee_width = knee_width.into_signal(g);

    let half_knee = g.mul(knee_width, 0.5);
    let lower = g.sub(threshold, half_knee);
    let upper = g.add(threshold, half_knee);
    let above_lower = g.geq(envelope_db, lower);
    let below_upper = g.leq(envelope_db, upper);
    let in_knee = g.and(above_lower, below_upper);

    let slope = slope(g, ratio);

    // Quadratic knee branch
    let rise = g.sub(envelope_db, lower);
    let knee_fraction = g.div(rise, knee_width);
    let drop = g.sub(lower, envelope_db);
    let half_slope = g.mul(0.5, slope);
    let partial = g.mul(half_slope, knee_fraction);
    let knee_value = g.mul(partial, drop);

    // Outside the knee: hard-knee law
    let undershoot = g.sub(threshold, envelope_db);
    let outside_value = g.mul(slope, undershoot);

    let raw = g.select(in_knee, knee_value, outside_value);
    g.min(0.0, raw)
}

/// Clamps a gain value to ≤ 0 dB and converts it to a linear multiplier.
///
/// The clamp is unconditional, so the multiplier is always in (0, 1] for
/// finite input.
pub fn to_multiplier(g: &mut Graph, gain_db: impl IntoSignal) -> Signal {
    let clamped = g.min(0.0, gain_db);
    g.db2gain(clamped)
}

/// Applies a gain multiplier to a signal (elementwise product).
///
/// No output clamping; downstream headroom is the caller's responsibility.
pub fn apply(g: &mut Graph, xn: Signal, multiplier: impl IntoSignal) -> Signal {
    g.mul(xn, multiplier)
}

/// Hard-knee compressor: attenuates `xn` once the sidechain envelope exceeds
/// `threshold`, by `1 - 1/ratio` dB per dB of overshoot.
///
/// `sidechain` drives the gain computation; `xn` is the signal being
/// attenuated. Feed the same signal for both to get an ordinary compressor.
pub fn compress(
    g: &mut Graph,
    attack_ms: impl IntoSignal,
    release_ms: impl IntoSignal,
    threshold: impl IntoSignal,
    ratio: impl IntoSignal,
    sidechain: Signal,
    xn: Signal,
) -> Signal {
    let env_db = envelope_db(g, attack_ms, release_ms, sidechain);
    let gain_db = hard_knee_gain_db(g, threshold, ratio, env_db);
    let multiplier = to_multiplier(g, gain_db);
    apply(g, xn, multiplier)
}

/// Soft-knee compressor: identical to [`compress`] outside the knee region,
/// with a quadratic transition of width `knee_width` dB centered on the
/// threshold.
pub fn skcompress(
    g: &mut Graph,
    attack_ms: impl IntoSignal,
    release_ms: impl IntoSignal,
    threshold: impl IntoSignal,
    ratio: impl IntoSignal,
    knee_width: impl IntoSignal,
    sidechain: Signal,
    xn: Signal,
) -> Signal {
    let env_db = envelope_db(g, attack_ms, release_ms, sidechain);
    let gain_db = soft_knee_gain_db(g, threshold, ratio, knee_width, env_db);
    let multiplier = to_multiplier(g, gain_db);
    apply(g, xn, multiplier)
}
