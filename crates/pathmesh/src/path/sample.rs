use super::node::NodeKey;
use crate::cfg::SAMPLE_STEPS;
use crate::curve::Bridge;
use crate::Vec2;

/// One vertex of a node's flattened outgoing segment.
///
/// The sample chain of an island is the concatenation of each node's
/// samples in chain order; `t` is the parameter on the owner's bridge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub owner: NodeKey,
    pub position: Vec2,
    pub t: f64,
}

/// Samples for `owner`'s bridge, covering `t ∈ [0, 1)`.
///
/// Curves use `SAMPLE_STEPS` uniform steps; lines and terminators need only
/// their start point (the next node's samples continue the polyline).
pub(crate) fn flatten_bridge(owner: NodeKey, position: Vec2, bridge: &Bridge) -> Vec<Sample> {
    match bridge {
        Bridge::None | Bridge::Line(..) => vec![Sample {
            owner,
            position,
            t: 0.0,
        }],
        Bridge::Curve(c) => (0..SAMPLE_STEPS)
            .map(|i| {
                let t = i as f64 / SAMPLE_STEPS as f64;
                Sample {
                    owner,
                    position: c.eval(t),
                    t,
                }
            })
            .collect(),
    }
}
