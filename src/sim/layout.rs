//! Responsive layout resolution
//!
//! Recomputes every size-derived constant from the container dimensions. All
//! lengths are base values times the current scale, floored to a minimum
//! pixel size so tiny viewports stay playable.
//!
//! Rescaling is hysteretic: collision shapes are fixed at body creation, so a
//! live stack cannot be resized in place without desyncing visuals from
//! physics. Small scale deltas are ignored; with live pieces, only a jump
//! past the reset threshold is honored, and it resets the session.

use serde::{Deserialize, Serialize};

use crate::clamp;
use crate::config::{GameConfig, LayoutMode};
use crate::consts::*;
use crate::tiers::{TIER_COUNT, TIERS};

/// The bucket's place inside the container, fully derived from the last
/// accepted measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Gap between the bucket floor and the play-area bottom
    pub floor_inset: f32,
    /// Pieces must not stay above this line
    pub ceiling_y: f32,
    pub wall_thickness: f32,
}

impl PlayArea {
    pub fn floor_y(&self) -> f32 {
        self.top + self.height - self.floor_inset
    }
}

/// Outcome of a resize request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    /// Container not yet measurable; retry next frame
    Deferred,
    /// Scale came out non-finite or non-positive; prior geometry kept
    Rejected,
    /// Geometry updated in place
    Applied {
        /// Whether the scale factor itself moved (gravity must follow)
        scale_changed: bool,
    },
    /// Scale jumped with live pieces; the caller must reset the session
    Reset,
}

/// All size-derived constants at the current scale
#[derive(Debug, Clone)]
pub struct Layout {
    pub scale: f32,
    pub play: PlayArea,
    /// Scaled radius per tier
    pub radii: [f32; TIER_COUNT],
    pub max_radius: f32,
    /// Vertical gap between the ceiling line and the drop height
    pub drop_gap: f32,
    pub drop_padding: f32,
    /// Minimum distance from play-area top to the ceiling line
    pub min_ceiling: f32,
    /// Interior width between the walls
    pub bucket_width: f32,
    pub bucket_inset: f32,
}

impl Layout {
    /// Layout at the reference dimensions
    pub fn new(config: &GameConfig) -> Self {
        let mut layout = Self {
            scale: 0.0,
            play: PlayArea {
                left: 0.0,
                top: 0.0,
                width: config.base_width,
                height: config.base_height,
                floor_inset: 0.0,
                ceiling_y: 0.0,
                wall_thickness: 0.0,
            },
            radii: [0.0; TIER_COUNT],
            max_radius: 0.0,
            drop_gap: 0.0,
            drop_padding: 0.0,
            min_ceiling: 0.0,
            bucket_width: 0.0,
            bucket_inset: 0.0,
        };
        layout.resolve(config, config.base_width, config.base_height, false);
        layout
    }

    /// Re-derive the layout from a container measurement.
    ///
    /// Idempotent: feeding the same dimensions twice yields the same layout
    /// and never a second reset.
    pub fn resolve(
        &mut self,
        config: &GameConfig,
        width: f32,
        height: f32,
        has_pieces: bool,
    ) -> Rescale {
        if !width.is_finite() || !height.is_finite() {
            return Rescale::Rejected;
        }
        if width < 2.0 || height < 2.0 {
            return Rescale::Deferred;
        }

        let side = width.min(height).max(1.0);
        let next_scale = (side / config.base_width).min(side / config.base_height);
        if !next_scale.is_finite() || next_scale <= 0.0 {
            return Rescale::Rejected;
        }

        let (left, top) = match config.layout_mode {
            LayoutMode::Viewport => (0.0, 0.0),
            LayoutMode::CenteredBucket => ((width - side) / 2.0, (height - side) / 2.0),
        };

        let delta = (next_scale - self.scale).abs();
        let update_scale =
            delta >= config.scale_epsilon && !(has_pieces && delta < config.scale_reset_threshold);
        let needs_reset = update_scale && has_pieces && delta >= config.scale_reset_threshold;

        if update_scale {
            self.apply_scale(next_scale);
        }
        self.refresh_container(config, left, top, side);

        if needs_reset {
            Rescale::Reset
        } else {
            Rescale::Applied {
                scale_changed: update_scale,
            }
        }
    }

    fn apply_scale(&mut self, scale: f32) {
        self.scale = scale;
        self.drop_gap = (DROP_GAP_BASE * scale).round().max(16.0);
        self.drop_padding = (DROP_PADDING_BASE * scale).round().max(4.0);
        self.min_ceiling = (MIN_CEILING_BASE * scale).round().max(40.0);
        self.play.floor_inset = (FLOOR_INSET_BASE * scale).round().max(20.0);
        for (radius, def) in self.radii.iter_mut().zip(TIERS.iter()) {
            *radius = (def.base_radius * scale).round().max(8.0);
        }
        self.max_radius = self.radii[TIER_COUNT - 1];
    }

    fn refresh_container(&mut self, config: &GameConfig, left: f32, top: f32, side: f32) {
        self.play.left = left;
        self.play.top = top;
        self.play.width = side;
        self.play.height = side;
        self.play.wall_thickness = (side * WALL_THICKNESS_RATIO).round().max(10.0);

        let max_bucket = (side
            - self.play.wall_thickness * 2.0
            - (side * BUCKET_MARGIN_RATIO).round())
        .max(1.0);
        let min_bucket = (self.max_radius * 2.0 + (24.0 * self.scale).round()).min(max_bucket);
        self.bucket_width = clamp(
            (side * BUCKET_WIDTH_RATIO).round(),
            min_bucket,
            max_bucket,
        );
        self.bucket_inset = ((side - self.bucket_width) / 2.0).max(0.0);

        // The ceiling sits near the top of the play area but always leaves
        // room for the biggest starter tier to drop below it.
        let start_max_radius = self.radii[config.start_max_index.min(TIER_COUNT - 1)];
        let lowest_allowed =
            self.play.floor_y() - start_max_radius - self.drop_gap - self.drop_padding;
        let target = self.play.top + self.play.height * CEILING_RATIO;
        let min_line = self.play.top + self.min_ceiling;
        self.play.ceiling_y = clamp(target.round(), min_line, min_line.max(lowest_allowed));
    }

    #[inline]
    pub fn radius(&self, tier: usize) -> f32 {
        self.radii[tier]
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.play.floor_y()
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.play.left + self.play.width / 2.0
    }

    /// Horizontal range the center of a piece with `radius` may occupy
    pub fn horizontal_bounds(&self, radius: f32) -> (f32, f32) {
        let half = self.bucket_width / 2.0;
        (
            self.center_x() - half + radius,
            self.center_x() + half - radius,
        )
    }

    /// Spawn height for a piece with `radius`: just below the ceiling line,
    /// but never inside the floor
    pub fn drop_y(&self, radius: f32) -> f32 {
        (self.play.ceiling_y + self.drop_gap).min(self.floor_y() - radius - self.drop_padding)
    }
}
