//! Append-only, index-addressed contestation records.
//!
//! Ids are dense: the record at position `n` has id `n`. Records are never
//! removed; closing one only changes its state.

use stakemod_types::{Contestation, ContestationId, ModerationError, Result};

/// All contestations ever opened, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ContestationStore {
    records: Vec<Contestation>,
}

impl ContestationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next inserted record must carry.
    #[must_use]
    pub fn next_id(&self) -> ContestationId {
        ContestationId(self.records.len() as u64)
    }

    /// Append a record.
    ///
    /// # Errors
    /// Returns `Internal` if the record's id is not [`ContestationStore::next_id`].
    pub fn insert(&mut self, contestation: Contestation) -> Result<ContestationId> {
        let expected = self.next_id();
        if contestation.id != expected {
            return Err(ModerationError::Internal(format!(
                "out-of-order contestation {}, expected {expected}",
                contestation.id
            )));
        }
        self.records.push(contestation);
        Ok(expected)
    }

    #[must_use]
    pub fn get(&self, id: ContestationId) -> Option<&Contestation> {
        usize::try_from(id.0).ok().and_then(|i| self.records.get(i))
    }

    pub fn get_mut(&mut self, id: ContestationId) -> Option<&mut Contestation> {
        usize::try_from(id.0)
            .ok()
            .and_then(|i| self.records.get_mut(i))
    }

    /// The record for `id` if it exists and is still open.
    ///
    /// # Errors
    /// Returns `NotOpen` for unknown or closed contestations.
    pub fn get_open(&self, id: ContestationId) -> Result<&Contestation> {
        self.get(id)
            .filter(|c| c.is_open())
            .ok_or(ModerationError::NotOpen(id))
    }

    /// Mutable variant of [`ContestationStore::get_open`].
    ///
    /// # Errors
    /// Returns `NotOpen` for unknown or closed contestations.
    pub fn get_open_mut(&mut self, id: ContestationId) -> Result<&mut Contestation> {
        self.get_mut(id)
            .filter(|c| c.is_open())
            .ok_or(ModerationError::NotOpen(id))
    }

    /// Overwrite an existing record, used to roll back a failed transition.
    ///
    /// # Errors
    /// Returns `Internal` if no record with that id exists.
    pub fn restore(&mut self, contestation: Contestation) -> Result<()> {
        let id = contestation.id;
        let slot = self
            .get_mut(id)
            .ok_or_else(|| ModerationError::Internal(format!("cannot restore unknown {id}")))?;
        *slot = contestation;
        Ok(())
    }

    /// Id of the open contestation built on `certificate`, if any.
    #[must_use]
    pub fn open_for_certificate(&self, certificate: &[u8]) -> Option<ContestationId> {
        self.records
            .iter()
            .find(|c| c.is_open() && c.certificate == certificate)
            .map(|c| c.id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of contestations still accepting votes.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.records.iter().filter(|c| c.is_open()).count()
    }
}
