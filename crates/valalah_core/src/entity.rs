//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the controller's slot array
//! - A generation counter for detecting stale references
//!
//! A slot array has a fixed capacity decided at construction. A full array
//! refuses inserts, which is how controllers enforce their concurrency cap.

/// Unique identifier for a live entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into the slot array
/// - Upper 32 bits: Generation counter for detecting stale references
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Raw 64-bit form, used to tag DOM nodes.
    #[inline]
    #[must_use]
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Rebuilds an ID from its raw form.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// Lifecycle state of a single entity.
///
/// ```text
/// Alive ──► Expiring ──► Removed
/// ```
///
/// `Expiring` is only observable on the interactive-dismiss path. `Removed`
/// is absorbing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EntityState {
    /// On screen, expiry timer armed.
    #[default]
    Alive,
    /// Dismissed, removal animation playing.
    Expiring,
    /// Gone. Terminal.
    Removed,
}

impl EntityState {
    /// Moves Alive to Expiring. Returns false for any other state.
    pub fn begin_expiring(&mut self) -> bool {
        if *self == Self::Alive {
            *self = Self::Expiring;
            true
        } else {
            false
        }
    }

    /// Moves Alive or Expiring to Removed. Returns false if already removed.
    pub fn finish(&mut self) -> bool {
        match self {
            Self::Alive | Self::Expiring => {
                *self = Self::Removed;
                true
            }
            Self::Removed => false,
        }
    }

    /// Is the entity still on screen?
    #[inline]
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Removed)
    }
}

/// One slot in the array.
#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Fixed-capacity storage addressed by [`EntityId`].
///
/// Removing a value bumps the slot's generation, so an ID handed out before
/// the removal never resolves again, even after the slot is reused.
#[derive(Debug)]
pub struct EntitySlots<T> {
    /// The storage array.
    slots: Box<[Slot<T>]>,
    /// Free list - indices of available slots.
    free_list: Vec<u32>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> EntitySlots<T> {
    /// Creates storage for at most `capacity` values. All memory is
    /// allocated up front.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|_| Slot {
                generation: 0,
                value: None,
            })
            .collect();
        #[allow(clippy::cast_possible_truncation)]
        let free_list: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            slots: slots.into_boxed_slice(),
            free_list,
            len: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true when nothing is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true when every slot is occupied.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Stores a value.
    ///
    /// # Errors
    ///
    /// Hands the value back when every slot is occupied.
    pub fn insert(&mut self, value: T) -> Result<EntityId, T> {
        let Some(index) = self.free_list.pop() else {
            return Err(value);
        };

        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        self.len += 1;

        Ok(EntityId::new(index, slot.generation))
    }

    /// Gets a reference to a stored value.
    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        let slot = self.slots.get(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets a mutable reference to a stored value.
    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.value.as_mut()
    }

    /// Removes a value, invalidating its ID.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.slots.get_mut(id.index() as usize)?;
        if slot.generation != id.generation() {
            return None;
        }

        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.index());
        self.len -= 1;

        Some(value)
    }

    /// Empties every slot, invalidating all IDs, and returns the values.
    pub fn drain(&mut self) -> Vec<T> {
        let mut drained = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                #[allow(clippy::cast_possible_truncation)]
                let index = index as u32;
                self.free_list.push(index);
                drained.push(value);
            }
        }
        self.len = 0;
        drained
    }

    /// Iterates over all stored values.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = EntityId::new(index as u32, slot.generation);
            slot.value.as_ref().map(|v| (id, v))
        })
    }
}
