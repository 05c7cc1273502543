use serde::Serialize;

use crate::graph::RelationshipType;
use crate::highlight::EdgeEmphasis;

/// Straight (non-premultiplied) RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
    }
}

const DIRECT: Rgba = Rgba::rgb(106, 198, 255);
const INVERSE: Rgba = Rgba::rgb(241, 146, 94);
const OTHER: Rgba = Rgba::rgb(150, 160, 174);
const SPOTLIGHT: Rgba = Rgba::rgb(246, 206, 104);

pub(super) fn blend_color(base: Rgba, overlay: Rgba, amount: f32) -> Rgba {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;
    let mix = |a: u8, b: u8| ((a as f32 * inverse) + (b as f32 * amount)) as u8;

    let [br, bg, bb, ba] = base.0;
    let [or, og, ob, oa] = overlay.0;
    Rgba([mix(br, or), mix(bg, og), mix(bb, ob), mix(ba, oa)])
}

pub(super) fn dim_color(color: Rgba, factor: f32) -> Rgba {
    let factor = factor.clamp(0.0, 1.0);
    let [r, g, b, a] = color.0;
    Rgba([
        (r as f32 * factor) as u8,
        (g as f32 * factor) as u8,
        (b as f32 * factor) as u8,
        (a as f32 * (0.45 + (factor * 0.55))) as u8,
    ])
}

pub(super) fn edge_color(relationship_type: RelationshipType, emphasis: EdgeEmphasis, opacity: f32) -> Rgba {
    let base = match relationship_type {
        RelationshipType::Direct => DIRECT,
        RelationshipType::Inverse => INVERSE,
        RelationshipType::Other => OTHER,
    };
    let color = match emphasis {
        EdgeEmphasis::Ambient => base,
        EdgeEmphasis::Spotlit => blend_color(base, SPOTLIGHT, 0.6),
        EdgeEmphasis::Dimmed => dim_color(base, 0.5),
    };
    color.with_alpha(opacity)
}
