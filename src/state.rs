//! Active/idle bookkeeping guarded by the pool lock

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

/// Pool-unique identity of a pooled object
///
/// Assigned when the object's creation slot is reserved and kept for the
/// object's whole life, independent of the object's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    /// The raw sequence number, in reservation order starting at 0
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Metadata for an object currently lent out
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveEntry {
    pub created_at: Instant,
}

/// An object waiting in the idle stack
pub(crate) struct IdleEntry<T> {
    pub id: ObjectId,
    pub object: T,
    pub created_at: Instant,
    pub last_used: Instant,
}

/// A successful borrow attempt
pub(crate) enum Lease<T> {
    /// An idle object was moved to the active set.
    Reused(IdleEntry<T>),
    /// A slot was reserved; the caller must create the object.
    Reserved(ObjectId),
}

/// Result of handing an object back
pub(crate) enum Released<T> {
    Idled,
    /// The idle stack is full. The object stays active until the caller
    /// has destroyed it and removed it.
    Shed(T),
    /// The id was not in the active set.
    Untracked(T),
}

/// Where an invalidated object was found
pub(crate) enum Untracked<T> {
    Active,
    Idle(T),
    Absent,
}

/// The single consistency unit of a pool.
///
/// `active.len() + idle.len()` never exceeds `max_active`, and no id is in
/// both collections.
pub(crate) struct PoolState<T> {
    active: HashMap<ObjectId, ActiveEntry>,
    idle: Vec<IdleEntry<T>>,
    max_active: usize,
    max_idle: usize,
    next_id: u64,
}

impl<T> PoolState<T> {
    pub fn new(max_active: usize, max_idle: usize) -> Self {
        Self {
            active: HashMap::new(),
            idle: Vec::with_capacity(max_idle.min(max_active)),
            max_active,
            max_idle,
            next_id: 0,
        }
    }

    /// Pop the most recently idled object, or reserve a creation slot.
    pub fn try_acquire(&mut self) -> Option<Lease<T>> {
        if let Some(entry) = self.idle.pop() {
            self.active.insert(
                entry.id,
                ActiveEntry {
                    created_at: entry.created_at,
                },
            );
            return Some(Lease::Reused(entry));
        }

        if self.active.len() < self.max_active {
            let id = ObjectId(self.next_id);
            self.next_id += 1;
            self.active.insert(
                id,
                ActiveEntry {
                    created_at: Instant::now(),
                },
            );
            return Some(Lease::Reserved(id));
        }

        None
    }

    pub fn contains_active(&self, id: ObjectId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn remove_active(&mut self, id: ObjectId) -> Option<ActiveEntry> {
        self.active.remove(&id)
    }

    /// Move an active object onto the idle stack if there is room.
    pub fn release(&mut self, id: ObjectId, object: T) -> Released<T> {
        let Some(entry) = self.active.get(&id).copied() else {
            return Released::Untracked(object);
        };

        if self.idle.len() >= self.max_idle {
            return Released::Shed(object);
        }

        self.active.remove(&id);
        self.idle.push(IdleEntry {
            id,
            object,
            created_at: entry.created_at,
            last_used: Instant::now(),
        });
        Released::Idled
    }

    pub fn remove_idle(&mut self, id: ObjectId) -> Option<IdleEntry<T>> {
        let position = self.idle.iter().position(|entry| entry.id == id)?;
        Some(self.idle.remove(position))
    }

    /// Drop `id` from whichever collection holds it.
    pub fn untrack(&mut self, id: ObjectId) -> Untracked<T> {
        if self.active.remove(&id).is_some() {
            return Untracked::Active;
        }
        match self.remove_idle(id) {
            Some(entry) => Untracked::Idle(entry.object),
            None => Untracked::Absent,
        }
    }

    pub fn drain_idle(&mut self) -> Vec<IdleEntry<T>> {
        std::mem::take(&mut self.idle)
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    pub fn max_active(&self) -> usize {
        self.max_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reserve(state: &mut PoolState<&'static str>) -> ObjectId {
        match state.try_acquire() {
            Some(Lease::Reserved(id)) => id,
            _ => panic!("expected a reservation"),
        }
    }

    #[test]
    fn test_reserves_until_max_active() {
        let mut state = PoolState::<&str>::new(2, 2);
        let first = reserve(&mut state);
        let second = reserve(&mut state);

        assert_ne!(first, second);
        assert!(state.try_acquire().is_none());
        assert_eq!(state.active_len(), 2);
    }

    #[test]
    fn test_idle_stack_is_lifo() {
        let mut state = PoolState::new(4, 4);
        let a = reserve(&mut state);
        let b = reserve(&mut state);
        assert!(matches!(state.release(a, "a"), Released::Idled));
        assert!(matches!(state.release(b, "b"), Released::Idled));

        match state.try_acquire() {
            Some(Lease::Reused(entry)) => {
                assert_eq!(entry.id, b);
                assert_eq!(entry.object, "b");
            }
            _ => panic!("expected reuse"),
        }
        assert!(state.contains_active(b));
        assert!(!state.contains_active(a));
    }

    #[test]
    fn test_release_sheds_when_idle_full() {
        let mut state = PoolState::new(3, 1);
        let a = reserve(&mut state);
        let b = reserve(&mut state);
        assert!(matches!(state.release(a, "a"), Released::Idled));
        assert!(matches!(state.release(b, "b"), Released::Shed("b")));

        assert_eq!(state.idle_len(), 1);
        assert!(state.contains_active(b));
        assert!(state.remove_active(b).is_some());
        assert_eq!(state.active_len(), 0);
    }

    #[test]
    fn test_release_of_unknown_id_is_untracked() {
        let mut state = PoolState::new(2, 2);
        let a = reserve(&mut state);
        assert!(matches!(state.release(a, "a"), Released::Idled));
        assert!(matches!(state.release(a, "a"), Released::Untracked("a")));
        assert_eq!(state.idle_len(), 1);
    }

    #[test]
    fn test_untrack_finds_idle_objects() {
        let mut state = PoolState::new(4, 4);
        let a = reserve(&mut state);
        let b = reserve(&mut state);
        let c = reserve(&mut state);
        for (id, name) in [(a, "a"), (b, "b"), (c, "c")] {
            assert!(matches!(state.release(id, name), Released::Idled));
        }

        assert!(matches!(state.untrack(b), Untracked::Idle("b")));
        assert!(matches!(state.untrack(b), Untracked::Absent));

        let order: Vec<_> = state.drain_idle().into_iter().map(|e| e.object).collect();
        assert_eq!(order, vec!["a", "c"]);
    }

    #[test]
    fn test_untrack_active() {
        let mut state = PoolState::<&str>::new(1, 1);
        let a = reserve(&mut state);
        assert!(matches!(state.untrack(a), Untracked::Active));
        assert_eq!(state.active_len(), 0);
        assert!(matches!(state.try_acquire(), Some(Lease::Reserved(_))));
    }
}
