//! In-memory item and unit store.
//!
//! The store is the single serialization point for mutations: every review
//! goes through `record_review` as one read-modify-write under the write
//! lock, and `import` holds the write lock for the whole merge, so readers
//! never observe a half-applied batch. Soft-deleted items stay in the
//! collection but every read passes through one tombstone filter.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use std::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::SrsConfig;
use crate::linkage;
use crate::merge::{self, MergePolicy, MergeReport};
use crate::models::{ContentUnit, Rating, StudyItem};
use crate::scheduler::{self, TimingClass};

/// Thread-safe in-memory storage for study items and content units
#[derive(Debug, Default)]
pub struct Store {
    items: RwLock<Vec<StudyItem>>,
    units: RwLock<Vec<ContentUnit>>,
}

/// Maps a poisoned lock to an error the API layer can report
fn lock_poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("store lock poisoned")
}

impl Store {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new item
    ///
    /// ### Arguments
    ///
    /// * `item` - The item to insert
    ///
    /// ### Returns
    ///
    /// A Result containing the inserted item
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self, item))]
    pub fn insert_item(&self, item: StudyItem) -> Result<StudyItem> {
        debug!("Inserting item with id: {}", item.get_id());

        let mut items = self.items.write().map_err(lock_poisoned)?;
        items.push(item.clone());

        info!("Successfully inserted item with id: {}", item.get_id());
        Ok(item)
    }

    /// Retrieves a live item by its ID
    ///
    /// ### Returns
    ///
    /// A Result containing an Option with the item if found and not deleted
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub fn get_item(&self, item_id: &str) -> Result<Option<StudyItem>> {
        let items = self.items.read().map_err(lock_poisoned)?;
        let found = items
            .iter()
            .find(|i| !i.is_deleted() && i.get_id() == item_id)
            .cloned();

        if found.is_some() {
            debug!("Item found");
        } else {
            debug!("Item not found");
        }
        Ok(found)
    }

    /// Lists all live items
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self))]
    pub fn list_items(&self) -> Result<Vec<StudyItem>> {
        let items = self.items.read().map_err(lock_poisoned)?;
        Ok(items.iter().filter(|i| !i.is_deleted()).cloned().collect())
    }

    /// Soft-deletes an item by its ID
    ///
    /// ### Returns
    ///
    /// A Result containing true if the item existed and is now tombstoned
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub fn delete_item(&self, item_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let mut items = self.items.write().map_err(lock_poisoned)?;
        let Some(item) = items
            .iter_mut()
            .find(|i| !i.is_deleted() && i.get_id() == item_id)
        else {
            debug!("Item not found");
            return Ok(false);
        };

        item.mark_deleted(now);
        info!("Soft-deleted item with id: {}", item_id);
        Ok(true)
    }

    /// Records a review against an item as a single read-modify-write
    ///
    /// The memory-state update and the attempt append happen under one write
    /// lock acquisition, so concurrent reviews of the same item serialize.
    ///
    /// ### Arguments
    ///
    /// * `item_id` - The ID of the reviewed item
    /// * `was_correct` - Whether the answer was correct
    /// * `rating` - The self-assessed rating
    /// * `response_secs` - Response time in seconds
    /// * `now` - The review time
    /// * `config` - The scheduling parameters
    ///
    /// ### Returns
    ///
    /// A Result containing the updated item and the timing classification, or
    /// None if no live item has the ID
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self, config), fields(item_id = %item_id, rating = ?rating))]
    pub fn record_review(
        &self,
        item_id: &str,
        was_correct: bool,
        rating: Rating,
        response_secs: f64,
        now: DateTime<Utc>,
        config: &SrsConfig,
    ) -> Result<Option<(StudyItem, TimingClass)>> {
        debug!("Recording review");

        let mut items = self.items.write().map_err(lock_poisoned)?;
        let Some(item) = items
            .iter_mut()
            .find(|i| !i.is_deleted() && i.get_id() == item_id)
        else {
            debug!("Item not found");
            return Ok(None);
        };

        let state = scheduler::update(item, was_correct, rating, response_secs, now, config);
        let timing = state.timing;
        item.apply_review(&state, was_correct, rating, response_secs);

        info!(
            "Recorded review for item {}: mastery {:.1}, next due {}",
            item_id,
            item.get_mastery_score(),
            item.get_next_review_at()
        );
        Ok(Some((item.clone(), timing)))
    }

    /// Merges a batch of incoming items under one write lock acquisition
    ///
    /// Matching runs against live items only; tombstoned items never match
    /// and insertion order is preserved, so listings stay stable across
    /// imports.
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self, incoming), fields(records = incoming.len(), policy = ?policy))]
    pub fn import(&self, incoming: Vec<StudyItem>, policy: MergePolicy) -> Result<MergeReport> {
        info!("Importing batch");

        let mut items = self.items.write().map_err(lock_poisoned)?;
        let report = merge::merge(&mut items, incoming, policy);

        info!(
            "Import finished: {} imported, {} updated, {} blocked",
            report.imported, report.updated, report.blocked
        );
        Ok(report)
    }

    /// Inserts a new content unit
    ///
    /// ### Returns
    ///
    /// A Result containing the unit, or None if the key is already taken
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self, unit))]
    pub fn insert_unit(&self, unit: ContentUnit) -> Result<Option<ContentUnit>> {
        let mut units = self.units.write().map_err(lock_poisoned)?;
        if units.iter().any(|u| u.get_key() == unit.get_key()) {
            debug!("Unit key already taken: {}", unit.get_key());
            return Ok(None);
        }

        units.push(unit.clone());
        info!("Created unit with key: {}", unit.get_key());
        Ok(Some(unit))
    }

    /// Retrieves a content unit by its canonical key
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self), fields(key = %key))]
    pub fn get_unit(&self, key: &str) -> Result<Option<ContentUnit>> {
        let units = self.units.read().map_err(lock_poisoned)?;
        Ok(units.iter().find(|u| u.get_key() == key).cloned())
    }

    /// Lists all content units
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self))]
    pub fn list_units(&self) -> Result<Vec<ContentUnit>> {
        let units = self.units.read().map_err(lock_poisoned)?;
        Ok(units.clone())
    }

    /// Deletes a unit and soft-deletes every item linked to it
    ///
    /// Both collections are locked for the whole cascade so readers never see
    /// the unit gone but its items still live.
    ///
    /// ### Returns
    ///
    /// A Result containing the number of cascaded items, or None if no unit
    /// has the key
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    #[instrument(skip(self), fields(key = %key))]
    pub fn delete_unit(&self, key: &str, now: DateTime<Utc>) -> Result<Option<usize>> {
        let mut units = self.units.write().map_err(lock_poisoned)?;
        let mut items = self.items.write().map_err(lock_poisoned)?;

        let Some(pos) = units.iter().position(|u| u.get_key() == key) else {
            debug!("Unit not found");
            return Ok(None);
        };
        units.remove(pos);

        let mut cascaded = 0;
        for item in items
            .iter_mut()
            .filter(|i| !i.is_deleted() && linkage::is_linked(i, key))
        {
            item.mark_deleted(now);
            cascaded += 1;
        }

        info!("Deleted unit {} and cascaded {} items", key, cascaded);
        Ok(Some(cascaded))
    }

    /// Updates a unit in place through a closure
    ///
    /// ### Returns
    ///
    /// A Result containing the updated unit, or None if no unit has the key
    ///
    /// ### Errors
    ///
    /// Returns an error if the store lock is poisoned
    pub fn update_unit(
        &self,
        key: &str,
        apply: impl FnOnce(&mut ContentUnit),
    ) -> Result<Option<ContentUnit>> {
        let mut units = self.units.write().map_err(lock_poisoned)?;
        let Some(unit) = units.iter_mut().find(|u| u.get_key() == key) else {
            return Ok(None);
        };

        apply(unit);
        Ok(Some(unit.clone()))
    }
}
