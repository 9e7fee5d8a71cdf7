//! Static fruit tier catalog
//!
//! Ordered by tier: radius and score strictly increase. Colors are opaque to
//! the core and carried for the renderer.

/// One entry of the tier catalog
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierDef {
    /// Radius at scale 1.0 (pixels)
    pub base_radius: f32,
    /// Points awarded when a merge produces this tier
    pub score: u64,
    pub fill: &'static str,
    pub stroke: &'static str,
}

pub const TIERS: [TierDef; 11] = [
    TierDef { base_radius: 16.0, score: 10, fill: "#c9f27c", stroke: "#95c85b" },
    TierDef { base_radius: 22.0, score: 20, fill: "#e3f89e", stroke: "#b7cf5f" },
    TierDef { base_radius: 28.0, score: 30, fill: "#f9e97a", stroke: "#e0c34d" },
    TierDef { base_radius: 34.0, score: 40, fill: "#f7d861", stroke: "#f4b860" },
    TierDef { base_radius: 40.0, score: 50, fill: "#f7c35a", stroke: "#f29f52" },
    TierDef { base_radius: 48.0, score: 60, fill: "#f5b04c", stroke: "#f0893e" },
    TierDef { base_radius: 56.0, score: 80, fill: "#f5a05a", stroke: "#ec7d4f" },
    TierDef { base_radius: 64.0, score: 110, fill: "#f28f3b", stroke: "#e76f51" },
    TierDef { base_radius: 74.0, score: 140, fill: "#f77f00", stroke: "#e8590c" },
    TierDef { base_radius: 84.0, score: 180, fill: "#f77f36", stroke: "#e4552e" },
    TierDef { base_radius: 96.0, score: 230, fill: "#ff9f1c", stroke: "#f3722c" },
];

/// Number of tiers in the catalog
pub const TIER_COUNT: usize = TIERS.len();

#[inline]
pub fn get(index: usize) -> &'static TierDef {
    &TIERS[index]
}

/// Index of the largest tier
#[inline]
pub fn last_index() -> usize {
    TIER_COUNT - 1
}

/// The tier produced by merging two pieces of `index`, if any
#[inline]
pub fn successor(index: usize) -> Option<usize> {
    let next = index + 1;
    (next < TIER_COUNT).then_some(next)
}
