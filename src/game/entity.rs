//! Entity Identifiers
//!
//! Every game object is an `Entity`: a slot index into the world's
//! component columns plus a generation stamp. Slots are recycled when
//! objects die, and the stamp bumps on reuse, so anything still holding
//! the old id (a launcher's current bird, a split ability's copies, a
//! physics body's user data) reads as dead instead of aliasing whatever
//! took over the slot.

use serde::{Deserialize, Serialize};

/// Slot index plus generation stamp. Same index with a different stamp is
/// a different object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Sentinel for "no entity". Never alive.
    pub const NULL: Entity = Entity {
        index: u32::MAX,
        generation: 0,
    };

    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index, used to address component columns.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Pack into 64 bits: generation high, index low. Physics bodies carry
    /// this in their user data so contacts route back to the owner.
    pub fn to_bits(&self) -> u64 {
        u64::from(self.generation) << 32 | u64::from(self.index)
    }

    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for Entity {
    fn default() -> Self {
        Entity::NULL
    }
}

/// Hands out entity ids and answers liveness queries.
///
/// Freed slots go on a free list and come back with a bumped generation,
/// so an id is never ambiguous across a slot's lifetimes.
pub struct EntityAllocator {
    /// Current generation per slot, indexed by `Entity::index`
    generations: Vec<u32>,
    free_indices: Vec<u32>,
    next_fresh: u32,
    alive_count: u32,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            free_indices: Vec::new(),
            next_fresh: 0,
            alive_count: 0,
        }
    }

    pub fn allocate(&mut self) -> Entity {
        self.alive_count += 1;
        match self.free_indices.pop() {
            // The generation was already bumped when the slot was freed
            Some(index) => Entity::new(index, self.generations[index as usize]),
            None => {
                let index = self.next_fresh;
                self.next_fresh += 1;
                self.generations.push(0);
                Entity::new(index, 0)
            }
        }
    }

    /// Retire an entity and recycle its slot. Returns false if it was
    /// already dead; deferred-despawn paths lean on that being a no-op.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_indices.push(entity.index);
        self.alive_count -= 1;
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        !entity.is_null()
            && self
                .generations
                .get(entity.index as usize)
                .is_some_and(|&generation| generation == entity.generation)
    }

    pub fn alive_count(&self) -> u32 {
        self.alive_count
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
