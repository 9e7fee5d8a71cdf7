//! Rigid-body engine boundary
//!
//! Thin wrapper over rapier2d exposing only what the gameplay core consumes:
//! circle bodies, static rectangles, position/velocity access, a gravity
//! scalar, and a fixed-rate step that returns the collision-start pairs of
//! that step. The whole batch is collected synchronously so the caller can
//! resolve it before the next step.

use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::consts::SIM_DT;

/// Restitution of fruit colliders
const PIECE_RESTITUTION: f32 = 0.1;
/// Surface friction of fruit colliders
const PIECE_FRICTION: f32 = 0.2;
/// Air-drag equivalent applied to fruit bodies
const PIECE_LINEAR_DAMPING: f32 = 0.4;
/// Surface friction of the bucket walls and floor
const WALL_FRICTION: f32 = 0.4;

/// Collects collision-start events emitted during a single step.
///
/// rapier delivers events through a `&self` handler, so the buffer sits
/// behind a mutex; it is drained right after the step returns.
#[derive(Default)]
struct CollisionCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl EventHandler for CollisionCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, _) = event {
            if let Ok(mut started) = self.started.lock() {
                started.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// The physics world and every piece of pipeline state rapier needs
pub struct PhysicsWorld {
    bodies: RigidBodySet,
    colliders: ColliderSet,
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    collector: CollisionCollector,
}

impl PhysicsWorld {
    /// Create an empty world pulling downward with `gravity` (pixels/s²)
    pub fn new(gravity: f32) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = SIM_DT;

        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            gravity: vector![0.0, gravity],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            collector: CollisionCollector::default(),
        }
    }

    /// Replace the downward gravity magnitude (pixels/s²)
    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity.y = gravity;
    }

    /// Add a dynamic circle body. CCD is enabled: fast drops must not tunnel
    /// through the floor.
    pub fn add_circle(&mut self, pos: Vec2, radius: f32) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![pos.x, pos.y])
            .linear_damping(PIECE_LINEAR_DAMPING)
            .ccd_enabled(true)
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::ball(radius)
            .restitution(PIECE_RESTITUTION)
            .friction(PIECE_FRICTION)
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Add a fixed rectangle (wall or floor) centered at `center`
    pub fn add_static_rect(&mut self, center: Vec2, half_extents: Vec2) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![center.x, center.y])
            .build();
        let handle = self.bodies.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .friction(WALL_FRICTION)
            .build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Remove a body and its colliders
    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| {
            let t = body.translation();
            Vec2::new(t.x, t.y)
        })
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|body| {
            let v = body.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    pub fn set_position(&mut self, handle: RigidBodyHandle, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(vector![pos.x, pos.y], true);
        }
    }

    pub fn set_velocity(&mut self, handle: RigidBodyHandle, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![vel.x, vel.y], true);
        }
    }

    /// Advance one fixed timestep and return the collision-start pairs it
    /// produced, as body handles.
    pub fn step(&mut self) -> Vec<(RigidBodyHandle, RigidBodyHandle)> {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.collector,
        );

        let mut started = Vec::new();
        if let Ok(mut buffer) = self.collector.started.lock() {
            started.append(&mut buffer);
        }
        started
            .into_iter()
            .filter_map(|(a, b)| {
                let body_a = self.colliders.get(a)?.parent()?;
                let body_b = self.colliders.get(b)?.parent()?;
                Some((body_a, body_b))
            })
            .collect()
    }
}
