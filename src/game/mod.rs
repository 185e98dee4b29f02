//! Game Core
//!
//! Entity/component storage, the physics adapter, the input dispatcher and
//! the gameplay systems built on top of them. The `GameContext` in
//! `context` ties the pieces together; `scene` (one level up) builds worlds
//! out of them.

pub mod ability;
pub mod component;
pub mod components;
pub mod context;
pub mod dispatcher;
pub mod entity;
pub mod event;
pub mod launcher;
pub mod physics;
pub mod systems;
pub mod world;

pub use ability::{Ability, AbilityKind};
pub use context::GameContext;
pub use dispatcher::{Dispatcher, Listener};
pub use entity::Entity;
pub use event::{CollisionEvent, Events, GameAction};
pub use launcher::{BirdFactory, Launcher, LauncherPhase};
pub use physics::PhysicsWorld;
pub use world::World;
