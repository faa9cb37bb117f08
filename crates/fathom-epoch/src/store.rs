//! Bounded ring-buffer storage of epoch records.
//!
//! The store holds at most `capacity` epochs in fixed slots indexed by
//! `epoch_id % capacity`. Writing a newer epoch into an occupied slot
//! silently evicts the older one; this is the bounded-memory design,
//! not a leak. Each slot carries the id of the epoch it holds, so a
//! read of an evicted epoch fails with [`EpochError::DataEvicted`]
//! rather than returning a newer epoch's data or claiming the epoch
//! does not exist yet.

use crate::epoch::Epoch;
use crate::{EpochError, Result};

/// Fixed-capacity epoch ring buffer.
#[derive(Clone, Debug)]
pub struct EpochStore {
    slots: Vec<Option<Epoch>>,
}

impl EpochStore {
    /// Create a store retaining the most recent `capacity` epochs.
    ///
    /// A zero capacity is clamped to one slot.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
        }
    }

    /// Number of epochs the store can retain.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, epoch_id: u64) -> usize {
        usize::try_from(epoch_id % self.slots.len() as u64).unwrap_or(0)
    }

    /// Read the retained epoch `epoch_id`.
    ///
    /// # Errors
    ///
    /// - [`EpochError::DataEvicted`] if the slot now holds a newer epoch
    /// - [`EpochError::NotYetAvailable`] if the epoch was never stored
    pub fn get(&self, epoch_id: u64) -> Result<&Epoch> {
        match &self.slots[self.slot(epoch_id)] {
            Some(epoch) if epoch.id() == epoch_id => Ok(epoch),
            Some(epoch) if epoch.id() > epoch_id => Err(EpochError::DataEvicted { epoch_id }),
            _ => Err(EpochError::NotYetAvailable { epoch_id }),
        }
    }

    /// Mutable variant of [`EpochStore::get`].
    ///
    /// # Errors
    ///
    /// Same as [`EpochStore::get`].
    pub fn get_mut(&mut self, epoch_id: u64) -> Result<&mut Epoch> {
        let slot = self.slot(epoch_id);
        match &self.slots[slot] {
            Some(epoch) if epoch.id() == epoch_id => {}
            Some(epoch) if epoch.id() > epoch_id => {
                return Err(EpochError::DataEvicted { epoch_id });
            }
            _ => return Err(EpochError::NotYetAvailable { epoch_id }),
        }
        self.slots[slot]
            .as_mut()
            .ok_or(EpochError::NotYetAvailable { epoch_id })
    }

    /// Fetch epoch `epoch_id`, creating it (and evicting the slot's
    /// previous occupant) if absent.
    ///
    /// # Errors
    ///
    /// - [`EpochError::DataEvicted`] if the slot already holds a newer
    ///   epoch
    pub fn get_or_create(&mut self, epoch_id: u64) -> Result<&mut Epoch> {
        let slot = self.slot(epoch_id);
        match &self.slots[slot] {
            Some(epoch) if epoch.id() == epoch_id => {}
            Some(epoch) if epoch.id() > epoch_id => {
                return Err(EpochError::DataEvicted { epoch_id });
            }
            Some(epoch) => {
                tracing::trace!(evicted = epoch.id(), epoch_id, "evicting epoch slot");
                self.slots[slot] = Some(Epoch::new(epoch_id));
            }
            None => {
                self.slots[slot] = Some(Epoch::new(epoch_id));
            }
        }
        // Slot is occupied by the right epoch at this point.
        self.slots[slot]
            .as_mut()
            .ok_or(EpochError::NotYetAvailable { epoch_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_epoch_is_not_yet_available() {
        let store = EpochStore::new(2);
        assert!(matches!(
            store.get(0),
            Err(EpochError::NotYetAvailable { epoch_id: 0 })
        ));
    }

    #[test]
    fn test_create_then_get() {
        let mut store = EpochStore::new(2);
        store.get_or_create(5).expect("create");
        assert_eq!(store.get(5).expect("get").id(), 5);
    }

    #[test]
    fn test_wraparound_evicts_oldest() {
        let mut store = EpochStore::new(2);
        store.get_or_create(0).expect("epoch 0");
        store.get_or_create(1).expect("epoch 1");
        store.get_or_create(2).expect("epoch 2 evicts 0");

        assert!(matches!(
            store.get(0),
            Err(EpochError::DataEvicted { epoch_id: 0 })
        ));
        assert_eq!(store.get(1).expect("epoch 1 retained").id(), 1);
        assert_eq!(store.get(2).expect("epoch 2 retained").id(), 2);
    }

    #[test]
    fn test_get_mut_classifies_like_get() {
        let mut store = EpochStore::new(2);
        store.get_or_create(2).expect("epoch 2");

        store
            .get_mut(2)
            .expect("retained epoch")
            .record_commit([1u8; 32], [9u8; 32])
            .expect("mutation through get_mut");
        assert_eq!(store.get(2).expect("get").commitment(&[1u8; 32]), Some([9u8; 32]));

        assert!(matches!(
            store.get_mut(0),
            Err(EpochError::DataEvicted { epoch_id: 0 })
        ));
        assert!(matches!(
            store.get_mut(3),
            Err(EpochError::NotYetAvailable { epoch_id: 3 })
        ));
    }

    #[test]
    fn test_stale_write_rejected() {
        let mut store = EpochStore::new(2);
        store.get_or_create(2).expect("epoch 2");
        assert!(matches!(
            store.get_or_create(0),
            Err(EpochError::DataEvicted { epoch_id: 0 })
        ));
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let store = EpochStore::new(0);
        assert_eq!(store.capacity(), 1);
    }
}
