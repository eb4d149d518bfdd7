//! Generational entity pools
//!
//! A pool owns every live entity of one kind. Handles carry a generation so
//! a handle to a removed entity never resolves to whatever reuses its slot.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Handle to an entity stored in a `Pool<T>`
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _kind: PhantomData,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

// Manual impls: derives would needlessly require `T: Clone` etc.
impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Homogeneous collection of like entities
#[derive(Debug, Clone)]
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Pool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new entity and return its handle
    pub fn create(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(index, 0)
    }

    fn slot(&self, handle: Handle<T>) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        self.slot(handle).and_then(|s| s.value.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.value.as_mut())
    }

    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Remove an entity. Stale or unknown handles are ignored.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Remove every entity, returning them in slot order
    pub fn clear(&mut self) -> Vec<T> {
        let mut removed = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
                removed.push(value);
            }
        }
        self.len = 0;
        removed
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Active entities in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.value
                .as_ref()
                .map(|v| (Handle::new(i as u32, s.generation), v))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, s)| {
            let generation = s.generation;
            s.value
                .as_mut()
                .map(|v| (Handle::new(i as u32, generation), v))
        })
    }

    /// Handles of active entities, safe to hold while mutating the pool
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_iterate() {
        let mut pool = Pool::new();
        let a = pool.create("a");
        let b = pool.create("b");
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(a), Some(&"a"));

        let seen: Vec<_> = pool.iter().map(|(h, v)| (h, *v)).collect();
        assert_eq!(seen, vec![(a, "a"), (b, "b")]);
    }

    #[test]
    fn test_double_remove_is_noop() {
        let mut pool = Pool::new();
        let a = pool.create(1);
        assert_eq!(pool.remove(a), Some(1));
        assert_eq!(pool.remove(a), None);
        assert_eq!(pool.len(), 0);
        assert!(!pool.contains(a));
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let mut pool = Pool::new();
        let old = pool.create(1);
        pool.remove(old);
        let new = pool.create(2);

        // Same slot, different generation
        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert_eq!(pool.get(old), None);
        assert_eq!(pool.remove(old), None);
        assert_eq!(pool.get(new), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut pool = Pool::new();
        let handles: Vec<_> = (0..4).map(|i| pool.create(i)).collect();
        pool.remove(handles[1]);

        let removed = pool.clear();
        assert_eq!(removed, vec![0, 2, 3]);
        assert!(pool.is_empty());
        assert!(handles.iter().all(|h| !pool.contains(*h)));
    }

    #[test]
    fn test_iter_mut_updates_in_place() {
        let mut pool = Pool::new();
        let h = pool.create(10);
        for (_, v) in pool.iter_mut() {
            *v += 1;
        }
        assert_eq!(pool.get(h), Some(&11));
        if let Some(v) = pool.get_mut(h) {
            *v = 0;
        }
        assert_eq!(pool.get(h), Some(&0));
    }
}
