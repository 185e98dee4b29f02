//! Physics Adapter
//!
//! `PhysicsWorld` owns the whole rapier2d simulation: body/collider/joint
//! sets plus the stepping pipeline. Nothing else in the game touches rapier
//! directly - gameplay code goes through the handle-based methods here.
//!
//! Unit convention: entity transforms are in screen pixels (Y down), the
//! simulation runs in meters. `PIXELS_PER_METER` is applied at every
//! boundary crossing in this module and nowhere else - a forgotten
//! conversion desyncs visuals from physics, so keep it centralized.
//! Velocities, impulses and masses are raw physics units.

use macroquad::prelude::Vec2;
use rapier2d::prelude::*;
use std::num::NonZeroUsize;

use super::entity::Entity;

/// Pixels per physics meter at every transform boundary.
pub const PIXELS_PER_METER: f32 = 30.0;

/// Convert a pixel-space point to physics meters.
fn px_to_m(v: Vec2) -> Vector<Real> {
    vector![v.x / PIXELS_PER_METER, v.y / PIXELS_PER_METER]
}

/// Convert a physics-space point to screen pixels.
fn m_to_px(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x * PIXELS_PER_METER, v.y * PIXELS_PER_METER)
}

/// A touching contact between two entities, reported once per step.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub a: Entity,
    pub b: Entity,
}

/// Owns and steps the rapier2d world.
///
/// Gravity points down the screen (positive Y). Bodies carry their owning
/// entity in `user_data` so contacts can be routed back to gameplay.
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a world with the given downward gravity (m/s^2).
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: vector![0.0, gravity],
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Advance the simulation by `dt` seconds. Call once per frame, before
    /// reading body transforms back. `position_iterations` is accepted for
    /// interface symmetry; rapier folds positional correction into its
    /// solver, so only the velocity iteration count is fed through.
    pub fn step(&mut self, dt: f32, velocity_iterations: u32, _position_iterations: u32) {
        self.params.dt = dt;
        if let Some(iters) = NonZeroUsize::new(velocity_iterations.max(1) as usize) {
            self.params.num_solver_iterations = iters;
        }
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
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    // =========================================================================
    // Bodies
    // =========================================================================

    /// Create a dynamic body for an entity at a pixel position.
    ///
    /// Mass comes entirely from `additional_mass` (colliders are attached
    /// with zero density) so `set_mass`/`mass` round-trip exactly.
    pub fn create_dynamic_body(
        &mut self,
        entity: Entity,
        position: Vec2,
        mass: f32,
        gravity_scale: f32,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(px_to_m(position))
            .gravity_scale(gravity_scale)
            .additional_mass(mass)
            .user_data(entity.to_bits() as u128)
            .build();
        let handle = self.bodies.insert(body);
        self.refresh_mass(handle);
        handle
    }

    /// Fold pending mass changes into the body now. Rapier defers
    /// `additional_mass` updates to the next pipeline step; gameplay reads
    /// `mass()` and applies impulses between steps, so every mass mutation
    /// goes through here.
    fn refresh_mass(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.recompute_mass_properties_from_colliders(&self.colliders);
        }
    }

    /// Create a static (fixed) body at a pixel position with no owning
    /// entity. Used for the transient slingshot anchor; contacts against it
    /// are not reported.
    pub fn create_static_body(&mut self, position: Vec2) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(px_to_m(position))
            .build();
        self.bodies.insert(body)
    }

    /// Create a static body owned by an entity, so contacts against it are
    /// reported. Used for ground, walls and platforms.
    pub fn create_static_body_for(&mut self, entity: Entity, position: Vec2) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(px_to_m(position))
            .user_data(entity.to_bits() as u128)
            .build();
        self.bodies.insert(body)
    }

    /// Remove a body together with its colliders and any joints attached to
    /// it. A stale handle is a no-op.
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

    /// Which entity owns this body, if any.
    pub fn body_entity(&self, handle: RigidBodyHandle) -> Option<Entity> {
        self.bodies
            .get(handle)
            .map(|b| Entity::from_bits(b.user_data as u64))
    }

    // =========================================================================
    // Colliders
    // =========================================================================

    /// Attach a box collider. Half extents and offset are in meters.
    /// Colliders have zero density; see `create_dynamic_body`.
    pub fn attach_box_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec2,
        restitution: f32,
    ) -> Option<ColliderHandle> {
        if !self.bodies.contains(body) {
            eprintln!("attach_box_collider: body handle is stale");
            return None;
        }
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .restitution(restitution)
            .density(0.0)
            .build();
        let handle = self.colliders.insert_with_parent(collider, body, &mut self.bodies);
        self.refresh_mass(body);
        Some(handle)
    }

    /// Attach a circle collider. Radius and local offset are in meters.
    pub fn attach_circle_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
        offset: Vec2,
        restitution: f32,
    ) -> Option<ColliderHandle> {
        if !self.bodies.contains(body) {
            eprintln!("attach_circle_collider: body handle is stale");
            return None;
        }
        let collider = ColliderBuilder::ball(radius)
            .translation(vector![offset.x, offset.y])
            .restitution(restitution)
            .density(0.0)
            .build();
        let handle = self.colliders.insert_with_parent(collider, body, &mut self.bodies);
        self.refresh_mass(body);
        Some(handle)
    }

    // =========================================================================
    // Joints
    // =========================================================================

    /// Tether a projectile body to an anchor body with a soft spring, the
    /// slingshot "sling joint". Returns None if either handle is stale,
    /// which the caller treats as non-fatal.
    pub fn create_sling_joint(
        &mut self,
        projectile: RigidBodyHandle,
        anchor: RigidBodyHandle,
        stiffness: f32,
        damping: f32,
    ) -> Option<ImpulseJointHandle> {
        if !self.bodies.contains(projectile) || !self.bodies.contains(anchor) {
            eprintln!("create_sling_joint: body handle is stale");
            return None;
        }
        let joint = SpringJointBuilder::new(0.0, stiffness, damping).build();
        Some(self.impulse_joints.insert(projectile, anchor, joint, true))
    }

    /// Destroy a joint. Returns false (and logs nothing) if the handle was
    /// already invalid - teardown paths may race with body removal, which
    /// also removes attached joints.
    pub fn destroy_joint(&mut self, handle: ImpulseJointHandle) -> bool {
        self.impulse_joints.remove(handle, true).is_some()
    }

    // =========================================================================
    // Body state access
    // =========================================================================

    /// Body position in pixels and rotation in degrees.
    pub fn body_position_px(&self, handle: RigidBodyHandle) -> Option<(Vec2, f32)> {
        let body = self.bodies.get(handle)?;
        Some((m_to_px(body.translation()), body.rotation().angle().to_degrees()))
    }

    /// Teleport a body to a pixel position, keeping its rotation.
    pub fn set_body_position_px(&mut self, handle: RigidBodyHandle, position: Vec2) {
        match self.bodies.get_mut(handle) {
            Some(body) => body.set_translation(px_to_m(position), true),
            None => eprintln!("set_body_position_px: body handle is stale"),
        }
    }

    /// Set a body's rotation in radians.
    pub fn set_body_rotation(&mut self, handle: RigidBodyHandle, angle: f32) {
        match self.bodies.get_mut(handle) {
            Some(body) => body.set_rotation(Rotation::new(angle), true),
            None => eprintln!("set_body_rotation: body handle is stale"),
        }
    }

    /// Linear velocity in physics units.
    pub fn velocity(&self, handle: RigidBodyHandle) -> Vec2 {
        self.bodies
            .get(handle)
            .map(|b| Vec2::new(b.linvel().x, b.linvel().y))
            .unwrap_or(Vec2::ZERO)
    }

    /// Set linear velocity in physics units.
    pub fn set_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec2) {
        match self.bodies.get_mut(handle) {
            Some(body) => body.set_linvel(vector![velocity.x, velocity.y], true),
            None => eprintln!("set_velocity: body handle is stale"),
        }
    }

    /// Zero both linear and angular velocity (used while dragging so
    /// gravity and joint forces don't fight the pointer).
    pub fn zero_velocity(&mut self, handle: RigidBodyHandle) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_linvel(vector![0.0, 0.0], true);
            body.set_angvel(0.0, true);
        }
    }

    /// Current speed (velocity magnitude) in physics units.
    pub fn speed(&self, handle: RigidBodyHandle) -> f32 {
        self.bodies
            .get(handle)
            .map(|b| b.linvel().norm())
            .unwrap_or(0.0)
    }

    /// Apply an impulse at the body's center of mass.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec2) {
        match self.bodies.get_mut(handle) {
            Some(body) => body.apply_impulse(vector![impulse.x, impulse.y], true),
            None => eprintln!("apply_impulse: body handle is stale"),
        }
    }

    /// Set the effective gravity scale (0 suppresses gravity entirely).
    pub fn set_gravity_scale(&mut self, handle: RigidBodyHandle, scale: f32) {
        match self.bodies.get_mut(handle) {
            Some(body) => body.set_gravity_scale(scale, true),
            None => eprintln!("set_gravity_scale: body handle is stale"),
        }
    }

    /// Total body mass.
    pub fn mass(&self, handle: RigidBodyHandle) -> f32 {
        self.bodies.get(handle).map(|b| b.mass()).unwrap_or(0.0)
    }

    /// Replace the body mass (exact; colliders contribute no mass).
    pub fn set_mass(&mut self, handle: RigidBodyHandle, mass: f32) {
        match self.bodies.get_mut(handle) {
            Some(body) => {
                body.set_additional_mass(mass, true);
                body.recompute_mass_properties_from_colliders(&self.colliders);
            }
            None => eprintln!("set_mass: body handle is stale"),
        }
    }

    /// Steer a body toward a pixel-space target with a capped speed.
    /// Applies a steering impulse rather than teleporting, so the body
    /// still collides on the way. `dt` scales the steering like a per-frame
    /// force (rapier keeps user forces across steps, impulses don't).
    pub fn move_towards(
        &mut self,
        handle: RigidBodyHandle,
        target: Vec2,
        speed: f32,
        max_speed: f32,
        dt: f32,
    ) {
        let Some(body) = self.bodies.get_mut(handle) else {
            return;
        };
        let direction = px_to_m(target) - body.translation();
        let distance = direction.norm();
        if distance <= f32::EPSILON {
            return;
        }
        let desired = direction / distance * speed;
        let steering = (desired - body.linvel()) * dt;
        body.apply_impulse(steering, true);

        if body.linvel().norm() > max_speed {
            let limited = body.linvel().normalize() * max_speed;
            body.set_linvel(limited, true);
        }
    }

    // =========================================================================
    // Contacts
    // =========================================================================

    /// Poll the narrow phase for currently-touching pairs and resolve them
    /// to owning entities. Called once per step, after `step`.
    pub fn drain_contacts(&self) -> Vec<Contact> {
        let mut contacts = Vec::new();
        for pair in self.narrow_phase.contact_pairs() {
            if !pair.has_any_active_contact {
                continue;
            }
            let Some(a) = self.collider_entity(pair.collider1) else { continue };
            let Some(b) = self.collider_entity(pair.collider2) else { continue };
            contacts.push(Contact { a, b });
        }
        contacts
    }

    fn collider_entity(&self, handle: ColliderHandle) -> Option<Entity> {
        let body = self.colliders.get(handle)?.parent()?;
        let entity = Entity::from_bits(self.bodies.get(body)?.user_data as u64);
        if entity.is_null() {
            None
        } else {
            Some(entity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity(index: u32) -> Entity {
        Entity::new(index, 0)
    }

    #[test]
    fn test_pixel_meter_roundtrip() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::new(300.0, 450.0), 1.0, 1.0);

        let (pos, rot) = physics.body_position_px(handle).unwrap();
        assert!((pos.x - 300.0).abs() < 1e-3);
        assert!((pos.y - 450.0).abs() < 1e-3);
        assert_eq!(rot, 0.0);
    }

    #[test]
    fn test_gravity_pulls_down_screen() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::new(100.0, 100.0), 1.0, 1.0);

        for _ in 0..30 {
            physics.step(1.0 / 60.0, 8, 3);
        }
        let (pos, _) = physics.body_position_px(handle).unwrap();
        assert!(pos.y > 100.0, "Y-down gravity should increase y, got {}", pos.y);
    }

    #[test]
    fn test_gravity_scale_zero_suspends_fall() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::new(100.0, 100.0), 1.0, 1.0);
        physics.set_gravity_scale(handle, 0.0);

        for _ in 0..30 {
            physics.step(1.0 / 60.0, 8, 3);
        }
        let (pos, _) = physics.body_position_px(handle).unwrap();
        assert!((pos.y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_mass_roundtrips_exactly() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::ZERO, 1.5, 1.0);
        // Mass must read back before any step runs
        assert_eq!(physics.mass(handle), 1.5);
        physics.attach_box_collider(handle, Vec2::new(0.5, 0.5), 0.5);
        assert_eq!(physics.mass(handle), 1.5);

        physics.set_mass(handle, 3.0);
        assert_eq!(physics.mass(handle), 3.0);
        physics.set_mass(handle, 1.5);
        assert_eq!(physics.mass(handle), 1.5);

        // Stepping must not fold the additional mass in twice
        physics.step(1.0 / 60.0, 8, 3);
        assert_eq!(physics.mass(handle), 1.5);
    }

    #[test]
    fn test_impulse_changes_velocity_by_mass() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::ZERO, 2.0, 1.0);

        physics.apply_impulse(handle, Vec2::new(4.0, 0.0));
        let vel = physics.velocity(handle);
        assert!((vel.x - 2.0).abs() < 1e-4, "impulse / mass, got {}", vel.x);
    }

    #[test]
    fn test_sling_joint_lifecycle() {
        let mut physics = PhysicsWorld::new(9.8);
        let bird = physics.create_dynamic_body(test_entity(0), Vec2::new(300.0, 300.0), 1.0, 1.0);
        let anchor = physics.create_static_body(Vec2::new(300.0, 300.0));

        let joint = physics
            .create_sling_joint(bird, anchor, 0.01, 25.0)
            .expect("joint should be created");
        assert!(physics.destroy_joint(joint));
        // Second destroy on the same handle is a tolerated no-op
        assert!(!physics.destroy_joint(joint));
    }

    #[test]
    fn test_remove_body_invalidates_handle() {
        let mut physics = PhysicsWorld::new(9.8);
        let handle = physics.create_dynamic_body(test_entity(0), Vec2::ZERO, 1.0, 1.0);

        physics.remove_body(handle);
        assert!(physics.body_position_px(handle).is_none());
        assert_eq!(physics.mass(handle), 0.0);
    }

    #[test]
    fn test_overlapping_bodies_report_contact() {
        let mut physics = PhysicsWorld::new(9.8);
        let a = physics.create_dynamic_body(test_entity(1), Vec2::new(100.0, 100.0), 1.0, 0.0);
        physics.attach_circle_collider(a, 1.0, Vec2::ZERO, 0.5);
        let b = physics.create_dynamic_body(test_entity(2), Vec2::new(110.0, 100.0), 1.0, 0.0);
        physics.attach_circle_collider(b, 1.0, Vec2::ZERO, 0.5);

        physics.step(1.0 / 60.0, 8, 3);
        let contacts = physics.drain_contacts();
        assert!(
            contacts.iter().any(|c| {
                (c.a == test_entity(1) && c.b == test_entity(2))
                    || (c.a == test_entity(2) && c.b == test_entity(1))
            }),
            "expected a contact between the overlapping bodies"
        );
    }
}
