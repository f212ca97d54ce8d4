//! Entity store
//!
//! Holds every flag of a round in creation order. Nothing is added or
//! removed mid-round; elimination only flips the `alive` flag.

use serde::{Deserialize, Serialize};

use super::state::Entity;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EntityStore {
    /// Sorted by id (creation order)
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new(mut entities: Vec<Entity>) -> Self {
        entities.sort_by_key(|e| e.id);
        Self { entities }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn alive_count(&self) -> usize {
        self.entities.iter().filter(|e| e.alive).count()
    }

    /// Ids of alive entities in creation order
    pub fn alive_ids(&self) -> Vec<u32> {
        self.iter_alive().map(|e| e.id).collect()
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_alive(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.alive)
    }

    /// Mark an entity dead. Returns false if it was already dead or unknown.
    pub fn eliminate(&mut self, id: u32) -> bool {
        match self.get_mut(id) {
            Some(e) if e.alive => {
                e.alive = false;
                true
            }
            _ => false,
        }
    }

    /// Alive entities, in creation order
    pub fn survivors(&self) -> Vec<&Entity> {
        self.iter_alive().collect()
    }

    // Index-based access for the physics stepper. Indices are creation order.

    pub(crate) fn alive_indices(&self) -> Vec<usize> {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(i, _)| i)
            .collect()
    }

    pub(crate) fn at(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    pub(crate) fn at_mut(&mut self, index: usize) -> &mut Entity {
        &mut self.entities[index]
    }

    pub(crate) fn swap_velocities(&mut self, a: usize, b: usize) {
        let va = self.entities[a].vel;
        self.entities[a].vel = self.entities[b].vel;
        self.entities[b].vel = va;
    }

    fn index_of(&self, id: u32) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }
}
