//! Component Columns
//!
//! One `ComponentStorage<T>` per component type, indexed by entity slot.
//! A slot without the component holds `None`, so lookup is a plain indexed
//! read and an entity carries at most one `T`. Levels here peak at a few
//! dozen live entities, nowhere near the point where holes in the columns
//! would cost anything.

use super::entity::Entity;

/// Sparse column for one component type, addressed by `Entity::index`.
///
/// Generations are not checked here: iteration yields raw slot indices,
/// and callers that hold full `Entity` ids validate liveness against the
/// world before acting on a slot.
pub struct ComponentStorage<T> {
    data: Vec<Option<T>>,
}

impl<T> ComponentStorage<T> {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Attach a component, replacing any previous one on the same slot.
    pub fn insert(&mut self, entity: Entity, component: T) {
        let idx = entity.index() as usize;
        if idx >= self.data.len() {
            self.data.resize_with(idx + 1, || None);
        }
        self.data[idx] = Some(component);
    }

    /// Detach and return the component, if the entity had one.
    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        self.data.get_mut(entity.index() as usize).and_then(Option::take)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.data.get(entity.index() as usize).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.data.get_mut(entity.index() as usize).and_then(Option::as_mut)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Iterate occupied slots as (slot index, component).
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (idx as u32, c)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|c| (idx as u32, c)))
    }

    /// Empty one slot by raw index. The world calls this for every column
    /// when an entity despawns.
    pub fn clear_slot(&mut self, index: u32) {
        if let Some(slot) = self.data.get_mut(index as usize) {
            *slot = None;
        }
    }

    /// How many entities carry this component.
    pub fn count(&self) -> usize {
        self.data.iter().flatten().count()
    }
}

impl<T> Default for ComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}
