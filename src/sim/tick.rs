//! Fixed timestep game loop
//!
//! `Game` owns every mutable piece of a session: the physics world, the
//! side table of live pieces, the layout, the session state, and the storage
//! handle. All entry points are synchronous and must be called sequentially
//! from the stepping loop's context; the core is not reentrant.
//!
//! Wall-clock timestamps (`now_ms`) are passed in by the host rather than
//! read ambiently, which keeps the cooldown and grace windows deterministic
//! under test.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use rapier2d::prelude::RigidBodyHandle;

use crate::clamp;
use crate::config::GameConfig;
use crate::physics::PhysicsWorld;
use crate::storage::{self, Storage};
use crate::tiers;

use super::layout::{Layout, Rescale};
use super::state::{EndReason, GamePhase, Piece, PieceView, SessionState, Snapshot};

/// One game session
pub struct Game {
    config: GameConfig,
    layout: Layout,
    physics: PhysicsWorld,
    storage: Box<dyn Storage>,
    rng: Pcg32,
    session: SessionState,
    /// Side table mapping body handles to core-owned piece state
    pieces: Vec<Piece>,
    /// Static floor and wall bodies, rebuilt on every applied resize
    bounds: Vec<RigidBodyHandle>,
    /// Horizontal aim position of the pending drop
    drag_x: f32,
    last_drop_ms: f64,
}

impl Game {
    pub fn new(config: GameConfig, storage: Box<dyn Storage>, seed: u64) -> Self {
        let layout = Layout::new(&config);
        let physics = PhysicsWorld::new(config.base_gravity * layout.scale);
        let mut rng = Pcg32::seed_from_u64(seed);
        let best_score = storage::load_best_score(storage.as_ref());
        log::info!("new session, best score {best_score}");

        let start_max = config.start_max_index.min(tiers::last_index());
        let current_tier = rng.random_range(0..=start_max);
        let next_tier = rng.random_range(0..=start_max);

        let drag_x = layout.center_x();
        let mut game = Self {
            config,
            layout,
            physics,
            storage,
            rng,
            session: SessionState {
                score: 0,
                best_score,
                phase: GamePhase::Intro,
                end_reason: None,
                current_tier,
                next_tier,
                danger_since: None,
            },
            pieces: Vec::new(),
            bounds: Vec::new(),
            drag_x,
            last_drop_ms: f64::NEG_INFINITY,
        };
        game.rebuild_bounds();
        game
    }

    /// Advance one fixed timestep: integrate, contain, resolve the tick's
    /// collision batch, then check overflow. Frozen outside Playing.
    pub fn tick(&mut self, now_ms: f64) {
        if self.session.phase != GamePhase::Playing {
            return;
        }
        let collisions = self.physics.step();
        self.contain_pieces();
        self.resolve_merges(&collisions);
        self.detect_overflow(now_ms);
    }

    /// Re-derive geometry from a container measurement.
    ///
    /// Safe to call redundantly at arbitrary times. `Deferred` asks the host
    /// to retry next frame once the container is measurable.
    pub fn on_resize(&mut self, width: f32, height: f32) -> Rescale {
        let has_pieces = !self.pieces.is_empty();
        let outcome = self
            .layout
            .resolve(&self.config, width, height, has_pieces);

        match outcome {
            Rescale::Deferred | Rescale::Rejected => return outcome,
            Rescale::Applied { scale_changed } => {
                if scale_changed {
                    self.physics
                        .set_gravity(self.config.base_gravity * self.layout.scale);
                }
            }
            Rescale::Reset => {
                // Live collision shapes are fixed at creation; a scale jump
                // this large restarts the session instead of desyncing it.
                self.physics
                    .set_gravity(self.config.base_gravity * self.layout.scale);
                self.reset_session();
            }
        }

        self.rebuild_bounds();
        let radius = self.layout.radius(self.session.current_tier);
        let (min_x, max_x) = self.layout.horizontal_bounds(radius);
        self.drag_x = clamp(self.drag_x, min_x, max_x);
        outcome
    }

    /// Drop the current piece at `x`. Ignored unless Playing and the
    /// cooldown has elapsed.
    pub fn request_drop(&mut self, x: f32, now_ms: f64) {
        if self.session.phase != GamePhase::Playing {
            return;
        }
        if now_ms - self.last_drop_ms < self.config.drop_cooldown_ms {
            return;
        }

        let tier = self.session.current_tier;
        let radius = self.layout.radius(tier);
        let (min_x, max_x) = self.layout.horizontal_bounds(radius);
        let drop_x = clamp(x, min_x, max_x);
        let drop_y = self.layout.drop_y(radius);
        self.spawn_piece(tier, Vec2::new(drop_x, drop_y));

        self.session.current_tier = self.session.next_tier;
        self.session.next_tier = self.sample_tier();
        self.last_drop_ms = now_ms;
        self.drag_x = drop_x;
    }

    /// Nudge the aim position by `dx`, clamped to the bucket
    pub fn on_input(&mut self, dx: f32) {
        if self.session.phase != GamePhase::Playing {
            return;
        }
        let radius = self.layout.radius(self.session.current_tier);
        let (min_x, max_x) = self.layout.horizontal_bounds(radius);
        self.drag_x = clamp(self.drag_x + dx, min_x, max_x);
    }

    /// Restart (or, from Intro, start) the session.
    ///
    /// After a loss with the ad gate enabled, ignored until the host clears
    /// the persisted obligation flag.
    pub fn on_reset(&mut self) {
        if self.session.phase == GamePhase::GameOver
            && self.config.ad_gate
            && self.session.end_reason == Some(EndReason::Overflow)
            && storage::ad_pending(self.storage.as_ref())
        {
            log::debug!("reset blocked: ad obligation pending");
            return;
        }
        self.reset_session();
    }

    pub fn snapshot(&self) -> Snapshot {
        let radius = self.layout.radius(self.session.current_tier);
        Snapshot {
            score: self.session.score,
            best_score: self.session.best_score,
            phase: self.session.phase,
            end_reason: self.session.end_reason,
            current_tier: self.session.current_tier,
            next_tier: self.session.next_tier,
            drag_x: self.drag_x,
            preview_drop_y: self.layout.drop_y(radius),
            play_area: self.layout.play,
        }
    }

    /// Positions of all live pieces, for the renderer
    pub fn live_pieces(&self) -> Vec<PieceView> {
        self.pieces
            .iter()
            .filter_map(|piece| {
                let pos = self.physics.position(piece.handle)?;
                Some(PieceView {
                    tier: piece.tier,
                    x: pos.x,
                    y: pos.y,
                    radius: piece.radius,
                })
            })
            .collect()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// The host's handle to the shared storage (ad flow lives there)
    pub fn storage_mut(&mut self) -> &mut dyn Storage {
        self.storage.as_mut()
    }

    fn sample_tier(&mut self) -> usize {
        let start_max = self.config.start_max_index.min(tiers::last_index());
        self.rng.random_range(0..=start_max)
    }

    fn spawn_piece(&mut self, tier: usize, pos: Vec2) -> RigidBodyHandle {
        let radius = self.layout.radius(tier);
        let handle = self.physics.add_circle(pos, radius);
        self.pieces.push(Piece {
            handle,
            tier,
            radius,
            merging: false,
        });
        handle
    }

    fn find_piece(&self, handle: RigidBodyHandle) -> Option<usize> {
        self.pieces.iter().position(|piece| piece.handle == handle)
    }

    /// Replace the static floor and walls with ones matching the current
    /// bucket geometry
    fn rebuild_bounds(&mut self) {
        for handle in self.bounds.drain(..) {
            self.physics.remove_body(handle);
        }

        let thickness = self.layout.play.wall_thickness;
        let inner = self.layout.bucket_width.max(1.0);
        let center_x = self.layout.center_x();
        let center_y = self.layout.play.top + self.layout.play.height / 2.0;
        let floor_y = self.layout.floor_y();
        let wall_offset = (inner + thickness) / 2.0;

        let floor = self.physics.add_static_rect(
            Vec2::new(center_x, floor_y + thickness / 2.0),
            Vec2::new(inner / 2.0 + thickness, thickness / 2.0),
        );
        // Walls extend well past the bucket so fast pieces cannot arc over
        let wall_half_height = self.layout.play.height;
        let left = self.physics.add_static_rect(
            Vec2::new(center_x - wall_offset, center_y),
            Vec2::new(thickness / 2.0, wall_half_height),
        );
        let right = self.physics.add_static_rect(
            Vec2::new(center_x + wall_offset, center_y),
            Vec2::new(thickness / 2.0, wall_half_height),
        );
        self.bounds = vec![floor, left, right];
    }

    fn reset_session(&mut self) {
        for piece in self.pieces.drain(..) {
            self.physics.remove_body(piece.handle);
        }
        self.session.score = 0;
        self.session.end_reason = None;
        self.session.danger_since = None;
        self.session.current_tier = self.sample_tier();
        self.session.next_tier = self.sample_tier();
        self.session.phase = GamePhase::Playing;
        self.last_drop_ms = f64::NEG_INFINITY;

        let radius = self.layout.radius(self.session.current_tier);
        let (min_x, max_x) = self.layout.horizontal_bounds(radius);
        self.drag_x = clamp(self.layout.center_x(), min_x, max_x);
        log::info!("session reset");
    }

    /// Clamp every live piece into the bucket, zeroing only the outward
    /// velocity component. Runs every tick even though wall bodies exist:
    /// fast pieces can tunnel or overshoot within a step.
    fn contain_pieces(&mut self) {
        let floor_y = self.layout.floor_y();
        for piece in &self.pieces {
            let Some(pos) = self.physics.position(piece.handle) else {
                continue;
            };
            let Some(vel) = self.physics.velocity(piece.handle) else {
                continue;
            };

            let (min_x, max_x) = self.layout.horizontal_bounds(piece.radius);
            let max_y = floor_y - piece.radius;
            let mut next = pos;
            let mut next_vel = vel;
            let mut moved = false;

            if next.y > max_y {
                next.y = max_y;
                if next_vel.y > 0.0 {
                    next_vel.y = 0.0;
                }
                moved = true;
            }
            if next.x < min_x {
                next.x = min_x;
                if next_vel.x < 0.0 {
                    next_vel.x = 0.0;
                }
                moved = true;
            } else if next.x > max_x {
                next.x = max_x;
                if next_vel.x > 0.0 {
                    next_vel.x = 0.0;
                }
                moved = true;
            }

            if moved {
                self.physics.set_position(piece.handle, next);
                self.physics.set_velocity(piece.handle, next_vel);
            }
        }
    }

    /// Resolve one tick's collision-start batch. The merging flags guarantee
    /// each physical piece merges at most once per tick even when it appears
    /// in several pairs.
    fn resolve_merges(&mut self, collisions: &[(RigidBodyHandle, RigidBodyHandle)]) {
        for &(handle_a, handle_b) in collisions {
            if self.session.phase != GamePhase::Playing {
                return;
            }
            let (Some(idx_a), Some(idx_b)) = (self.find_piece(handle_a), self.find_piece(handle_b))
            else {
                continue;
            };
            if idx_a == idx_b {
                continue;
            }
            let piece_a = self.pieces[idx_a];
            let piece_b = self.pieces[idx_b];
            if piece_a.merging || piece_b.merging {
                continue;
            }
            if piece_a.tier != piece_b.tier {
                continue;
            }
            let Some(next_tier) = tiers::successor(piece_a.tier) else {
                continue;
            };

            let (Some(pos_a), Some(pos_b)) = (
                self.physics.position(handle_a),
                self.physics.position(handle_b),
            ) else {
                continue;
            };
            let midpoint = (pos_a + pos_b) / 2.0;

            self.pieces[idx_a].merging = true;
            self.pieces[idx_b].merging = true;

            self.physics.remove_body(handle_a);
            self.physics.remove_body(handle_b);
            self.pieces
                .retain(|piece| piece.handle != handle_a && piece.handle != handle_b);

            // Momentum is deliberately discarded: the successor spawns at
            // rest so merges never inject energy into the stack.
            self.spawn_piece(next_tier, midpoint);
            self.add_score(tiers::get(next_tier).score);

            if next_tier == tiers::last_index() {
                self.add_score(self.config.completion_bonus);
                self.end_game(EndReason::Max);
            }
        }
    }

    /// End the game only on a sustained ceiling breach; a single-frame
    /// bounce above the line (mid-merge jitter) is harmless.
    fn detect_overflow(&mut self, now_ms: f64) {
        if self.session.phase != GamePhase::Playing {
            return;
        }
        let ceiling_y = self.layout.play.ceiling_y;
        let breached = self.pieces.iter().any(|piece| {
            self.physics
                .position(piece.handle)
                .is_some_and(|pos| pos.y - piece.radius < ceiling_y)
        });

        if breached {
            let since = *self.session.danger_since.get_or_insert(now_ms);
            if now_ms - since > self.config.overflow_grace_ms {
                self.end_game(EndReason::Overflow);
            }
        } else {
            self.session.danger_since = None;
        }
    }

    fn add_score(&mut self, points: u64) {
        self.session.score += points;
        if self.session.score > self.session.best_score {
            self.session.best_score = self.session.score;
            storage::store_best_score(self.storage.as_mut(), self.session.best_score);
        }
    }

    fn end_game(&mut self, reason: EndReason) {
        if self.session.phase == GamePhase::GameOver {
            return;
        }
        self.session.phase = GamePhase::GameOver;
        self.session.end_reason = Some(reason);
        self.session.danger_since = None;

        if self.config.ad_gate {
            match reason {
                EndReason::Overflow => storage::set_ad_pending(self.storage.as_mut()),
                EndReason::Max => storage::clear_ad_obligation(self.storage.as_mut()),
            }
        }
        log::info!("game over ({reason:?}), score {}", self.session.score);
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::storage::MemoryStorage;

    use super::*;

    fn test_game() -> Game {
        Game::new(GameConfig::default(), Box::new(MemoryStorage::new()), 7)
    }

    fn playing_game() -> Game {
        let mut game = test_game();
        game.on_reset();
        game
    }

    #[test]
    fn test_reset_from_intro_starts_playing() {
        let mut game = test_game();
        assert_eq!(game.session.phase, GamePhase::Intro);
        game.on_reset();
        assert_eq!(game.session.phase, GamePhase::Playing);
        assert!(game.session.current_tier <= game.config.start_max_index);
        assert!(game.session.next_tier <= game.config.start_max_index);
    }

    #[test]
    fn test_drop_ignored_unless_playing() {
        let mut game = test_game();
        game.request_drop(200.0, 0.0);
        assert!(game.pieces.is_empty());

        game.session.phase = GamePhase::GameOver;
        game.request_drop(200.0, 0.0);
        assert!(game.pieces.is_empty());
    }

    #[test]
    fn test_drop_cooldown() {
        let mut game = playing_game();
        game.request_drop(200.0, 1000.0);
        game.request_drop(200.0, 1200.0);
        assert_eq!(game.pieces.len(), 1, "second drop within 260 ms ignored");

        game.request_drop(200.0, 1300.0);
        assert_eq!(game.pieces.len(), 2);
    }

    #[test]
    fn test_drop_x_clamped_into_bucket() {
        let mut game = playing_game();
        game.request_drop(-10_000.0, 0.0);

        let piece = game.pieces[0];
        let pos = game.physics.position(piece.handle).unwrap();
        let (min_x, _) = game.layout.horizontal_bounds(piece.radius);
        assert!((pos.x - min_x).abs() < 1e-3);
        assert_eq!(game.drag_x, pos.x);
    }

    #[test]
    fn test_drop_advances_tier_queue() {
        let mut game = playing_game();
        let queued = game.session.next_tier;
        game.request_drop(200.0, 0.0);
        assert_eq!(game.session.current_tier, queued);
    }

    #[test]
    fn test_same_tier_merge_produces_successor() {
        let mut game = playing_game();
        let a = game.spawn_piece(3, Vec2::new(180.0, 300.0));
        let b = game.spawn_piece(3, Vec2::new(220.0, 300.0));

        game.resolve_merges(&[(a, b)]);

        assert_eq!(game.pieces.len(), 1);
        assert_eq!(game.pieces[0].tier, 4);
        // Successor score only, not the sum of the inputs
        assert_eq!(game.session.score, 50);
        assert!(game.physics.position(a).is_none());
        assert!(game.physics.position(b).is_none());

        let pos = game.physics.position(game.pieces[0].handle).unwrap();
        assert!((pos.x - 200.0).abs() < 1e-3);
        assert!((pos.y - 300.0).abs() < 1e-3);
        let vel = game.physics.velocity(game.pieces[0].handle).unwrap();
        assert_eq!(vel, Vec2::ZERO);
    }

    #[test]
    fn test_piece_merges_at_most_once_per_tick() {
        let mut game = playing_game();
        let a = game.spawn_piece(2, Vec2::new(150.0, 300.0));
        let b = game.spawn_piece(2, Vec2::new(200.0, 300.0));
        let c = game.spawn_piece(2, Vec2::new(250.0, 300.0));

        // b appears in two pairs of the same batch
        game.resolve_merges(&[(a, b), (b, c)]);

        assert_eq!(game.session.score, tiers::get(3).score);
        assert_eq!(game.pieces.len(), 2);
        let tiers_left: Vec<usize> = game.pieces.iter().map(|p| p.tier).collect();
        assert!(tiers_left.contains(&3));
        assert!(tiers_left.contains(&2));
    }

    #[test]
    fn test_merging_flag_blocks_merge() {
        let mut game = playing_game();
        let a = game.spawn_piece(1, Vec2::new(180.0, 300.0));
        let b = game.spawn_piece(1, Vec2::new(220.0, 300.0));
        game.pieces[0].merging = true;

        game.resolve_merges(&[(a, b)]);

        assert_eq!(game.pieces.len(), 2);
        assert_eq!(game.session.score, 0);
    }

    #[test]
    fn test_mismatched_tiers_do_not_merge() {
        let mut game = playing_game();
        let a = game.spawn_piece(1, Vec2::new(180.0, 300.0));
        let b = game.spawn_piece(2, Vec2::new(220.0, 300.0));

        game.resolve_merges(&[(a, b)]);

        assert_eq!(game.pieces.len(), 2);
        assert_eq!(game.session.score, 0);
    }

    #[test]
    fn test_top_tier_never_merges() {
        let mut game = playing_game();
        let top = tiers::last_index();
        let a = game.spawn_piece(top, Vec2::new(150.0, 300.0));
        let b = game.spawn_piece(top, Vec2::new(250.0, 300.0));

        game.resolve_merges(&[(a, b)]);

        assert_eq!(game.pieces.len(), 2);
        assert_eq!(game.session.score, 0);
        assert_eq!(game.session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_max_tier_completion_wins_without_ad_obligation() {
        let mut game = playing_game();
        let second_highest = tiers::last_index() - 1;
        let a = game.spawn_piece(second_highest, Vec2::new(150.0, 300.0));
        let b = game.spawn_piece(second_highest, Vec2::new(250.0, 300.0));

        game.resolve_merges(&[(a, b)]);

        let top_score = tiers::get(tiers::last_index()).score;
        assert_eq!(game.session.score, top_score + game.config.completion_bonus);
        assert_eq!(game.session.phase, GamePhase::GameOver);
        assert_eq!(game.session.end_reason, Some(EndReason::Max));
        assert!(!storage::ad_pending(game.storage()), "a win owes no ad view");
    }

    #[test]
    fn test_overflow_needs_sustained_breach() {
        let mut game = playing_game();
        let ceiling = game.layout.play.ceiling_y;
        let handle = game.spawn_piece(0, Vec2::new(200.0, ceiling - 30.0));

        game.detect_overflow(1000.0);
        assert_eq!(game.session.danger_since, Some(1000.0));
        game.detect_overflow(1500.0);
        assert_eq!(game.session.phase, GamePhase::Playing, "500 ms is within grace");

        // Retreat below the line clears the timer
        game.physics.set_position(handle, Vec2::new(200.0, 300.0));
        game.detect_overflow(1600.0);
        assert_eq!(game.session.danger_since, None);

        // A fresh sustained breach past the grace ends the game
        game.physics.set_position(handle, Vec2::new(200.0, ceiling - 30.0));
        game.detect_overflow(2000.0);
        game.detect_overflow(2950.0);
        assert_eq!(game.session.phase, GamePhase::GameOver);
        assert_eq!(game.session.end_reason, Some(EndReason::Overflow));
        assert!(storage::ad_pending(game.storage()));
    }

    #[test]
    fn test_reset_blocked_until_ad_obligation_cleared() {
        let mut game = playing_game();
        game.spawn_piece(0, Vec2::new(200.0, 0.0));
        game.detect_overflow(0.0);
        game.detect_overflow(1000.0);
        assert_eq!(game.session.phase, GamePhase::GameOver);

        game.on_reset();
        assert_eq!(game.session.phase, GamePhase::GameOver, "obligation pending");

        storage::clear_ad_obligation(game.storage_mut());
        game.on_reset();
        assert_eq!(game.session.phase, GamePhase::Playing);
        assert_eq!(game.session.score, 0);
        assert!(game.pieces.is_empty());
    }

    #[test]
    fn test_best_score_monotone_across_resets() {
        let mut game = playing_game();
        let a = game.spawn_piece(3, Vec2::new(180.0, 300.0));
        let b = game.spawn_piece(3, Vec2::new(220.0, 300.0));
        game.resolve_merges(&[(a, b)]);
        assert_eq!(game.session.best_score, 50);

        game.on_reset();
        assert_eq!(game.session.score, 0);
        assert_eq!(game.session.best_score, 50);
        assert_eq!(storage::load_best_score(game.storage()), 50);

        // A smaller run never lowers the persisted best
        let a = game.spawn_piece(0, Vec2::new(180.0, 300.0));
        let b = game.spawn_piece(0, Vec2::new(220.0, 300.0));
        game.resolve_merges(&[(a, b)]);
        assert_eq!(game.session.score, 20);
        assert_eq!(game.session.best_score, 50);
        assert_eq!(storage::load_best_score(game.storage()), 50);
    }

    #[test]
    fn test_resize_with_live_pieces_resets_session() {
        let mut game = playing_game();
        assert!(matches!(
            game.on_resize(800.0, 600.0),
            Rescale::Applied { .. }
        ));
        game.spawn_piece(0, Vec2::new(300.0, 300.0));
        let a = game.spawn_piece(3, Vec2::new(180.0, 400.0));
        let b = game.spawn_piece(3, Vec2::new(220.0, 400.0));
        game.resolve_merges(&[(a, b)]);
        assert!(game.session.score > 0);

        let outcome = game.on_resize(400.0, 300.0);
        assert_eq!(outcome, Rescale::Reset);
        assert_eq!(game.session.score, 0);
        assert!(game.pieces.is_empty());
        assert_eq!(game.session.phase, GamePhase::Playing);
    }

    #[test]
    fn test_small_resize_keeps_live_session() {
        let mut game = playing_game();
        game.on_resize(800.0, 600.0);
        game.spawn_piece(0, Vec2::new(300.0, 300.0));
        let radius_before = game.layout.radius(0);

        let outcome = game.on_resize(820.0, 620.0);
        assert_eq!(outcome, Rescale::Applied { scale_changed: false });
        assert_eq!(game.pieces.len(), 1);
        assert_eq!(game.layout.radius(0), radius_before);
    }

    #[test]
    fn test_invalid_resize_keeps_geometry() {
        let mut game = playing_game();
        let before = game.layout.play;

        assert_eq!(game.on_resize(f32::NAN, 300.0), Rescale::Rejected);
        assert_eq!(game.on_resize(1.0, 1.0), Rescale::Deferred);
        assert_eq!(game.layout.play, before);
    }

    #[test]
    fn test_tick_frozen_outside_playing() {
        let mut game = test_game();
        let handle = game.spawn_piece(0, Vec2::new(200.0, 100.0));
        game.tick(16.0);
        let pos = game.physics.position(handle).unwrap();
        assert_eq!(pos, Vec2::new(200.0, 100.0));
    }

    #[test]
    fn test_dropped_piece_falls_through_ticks() {
        let mut game = playing_game();
        game.request_drop(200.0, 0.0);
        let start_y = game.live_pieces()[0].y;

        for frame in 1..=30 {
            game.tick(frame as f64 * 16.0);
        }

        let pieces = game.live_pieces();
        assert_eq!(pieces.len(), 1);
        assert!(pieces[0].y > start_y, "piece should fall toward the floor");
        assert!(pieces[0].y <= game.layout.floor_y() - pieces[0].radius + 1e-3);
    }

    #[test]
    fn test_snapshot_reflects_session() {
        let mut game = playing_game();
        game.request_drop(200.0, 0.0);
        let snapshot = game.snapshot();

        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.current_tier, game.session.current_tier);
        assert_eq!(snapshot.drag_x, game.drag_x);
        let radius = game.layout.radius(snapshot.current_tier);
        assert_eq!(snapshot.preview_drop_y, game.layout.drop_y(radius));
        assert_eq!(snapshot.play_area, game.layout.play);
    }

    #[test]
    fn test_nudge_clamped_to_bucket() {
        let mut game = playing_game();
        let radius = game.layout.radius(game.session.current_tier);
        let (min_x, max_x) = game.layout.horizontal_bounds(radius);

        game.on_input(-10_000.0);
        assert_eq!(game.drag_x, min_x);
        game.on_input(26.0);
        assert_eq!(game.drag_x, min_x + 26.0);
        game.on_input(10_000.0);
        assert_eq!(game.drag_x, max_x);
    }

    #[test]
    fn test_tier_sequence_is_deterministic() {
        let mut g1 = playing_game();
        let mut g2 = playing_game();
        for i in 0..8 {
            let now = i as f64 * 300.0;
            g1.request_drop(150.0 + i as f32, now);
            g2.request_drop(150.0 + i as f32, now);
        }
        assert_eq!(g1.session.current_tier, g2.session.current_tier);
        assert_eq!(g1.session.next_tier, g2.session.next_tier);
    }

    proptest! {
        /// Containment always lands pieces inside the bucket and never
        /// leaves outward velocity, no matter where integration put them.
        #[test]
        fn prop_containment_clamps_into_bounds(
            x in -2000.0f32..2000.0,
            y in -2000.0f32..2000.0,
            vx in -500.0f32..500.0,
            vy in -500.0f32..500.0,
        ) {
            let mut game = playing_game();
            let handle = game.spawn_piece(2, Vec2::new(200.0, 200.0));
            game.physics.set_position(handle, Vec2::new(x, y));
            game.physics.set_velocity(handle, Vec2::new(vx, vy));

            game.contain_pieces();

            let radius = game.layout.radius(2);
            let (min_x, max_x) = game.layout.horizontal_bounds(radius);
            let pos = game.physics.position(handle).unwrap();
            let vel = game.physics.velocity(handle).unwrap();
            prop_assert!(pos.x >= min_x - 1e-3);
            prop_assert!(pos.x <= max_x + 1e-3);
            prop_assert!(pos.y <= game.layout.floor_y() - radius + 1e-3);
            // Only the outward component is zeroed
            if x < min_x {
                prop_assert!(vel.x >= -1e-3);
            }
            if x > max_x {
                prop_assert!(vel.x <= 1e-3);
            }
            if y > game.layout.floor_y() - radius {
                prop_assert!(vel.y <= 1e-3);
            }

            // Idempotent: a second pass moves nothing
            game.contain_pieces();
            let pos_again = game.physics.position(handle).unwrap();
            prop_assert!((pos - pos_again).length() < 1e-3);
        }
    }
}
