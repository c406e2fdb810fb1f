// SPDX-License-Identifier: GPL-3.0-only

//! Ordered filter stack for one image
//!
//! The stack is the only owner of its filters. Every mutation goes through
//! the stack, which recomputes the composite synchronously and publishes a
//! [`StackChange`] on a watch channel. Subscribers (the preview renderer)
//! hold a receiver and unsubscribe by dropping it.

use super::{ColorAdjustment, ColorMatrix, ControlDescriptor, Filter};
use crate::errors::PreconditionViolation;
use std::fmt;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Identity of a filter within its stack
///
/// Ids are never reused by the same stack, so a stale id cannot address a
/// different filter after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterId(u64);

impl FilterId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Published after every mutation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackChange {
    /// Strictly increasing per stack
    pub revision: u64,
    /// Composite of the stack at this revision
    pub transform: ColorMatrix,
}

#[derive(Debug)]
struct Entry {
    id: FilterId,
    filter: Filter,
}

/// Ordered, mutable collection of filters
pub struct FilterStack {
    entries: Vec<Entry>,
    next_id: u64,
    selected: Option<FilterId>,
    composite: ColorMatrix,
    revision: u64,
    changes: watch::Sender<StackChange>,
}

impl Default for FilterStack {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterStack {
    pub fn new() -> Self {
        Self::from_filters(Vec::new())
    }

    /// Build a stack from already ordered filters (e.g. loaded from storage)
    ///
    /// The composite is computed once; nothing is published until someone
    /// subscribes, so a bulk load does not cascade into per-filter updates.
    pub fn from_filters(filters: Vec<Filter>) -> Self {
        let entries: Vec<Entry> = filters
            .into_iter()
            .enumerate()
            .map(|(i, filter)| Entry {
                id: FilterId(i as u64 + 1),
                filter,
            })
            .collect();
        let next_id = entries.len() as u64 + 1;
        let composite = fold(entries.iter().map(|e| &e.filter));
        let (changes, _) = watch::channel(StackChange {
            revision: 0,
            transform: composite,
        });

        Self {
            entries,
            next_id,
            selected: None,
            composite,
            revision: 0,
            changes,
        }
    }

    /// Receive a [`StackChange`] after every mutation
    pub fn subscribe(&self) -> watch::Receiver<StackChange> {
        self.changes.subscribe()
    }

    /// Append a filter and select it
    ///
    /// With `auto_name`, the name gets a numeric suffix counting filters of
    /// the same variant: the first becomes "Saturation 1", a second one added
    /// after an existing Saturation becomes "Saturation 2".
    pub fn add(&mut self, mut filter: Filter, auto_name: bool) -> FilterId {
        if auto_name {
            let same_kind = self
                .entries
                .iter()
                .filter(|e| e.filter.tag() == filter.tag())
                .count();
            let name = format!("{} {}", filter.name(), same_kind + 1);
            filter.set_name(name);
        }

        let id = FilterId(self.next_id);
        self.next_id += 1;

        debug!(id = id.0, name = filter.name(), tag = %filter.tag(), "Adding filter");
        self.entries.push(Entry { id, filter });
        self.selected = Some(id);
        self.recompute();
        id
    }

    /// Remove a filter by identity
    pub fn remove(&mut self, id: FilterId) -> Result<Filter, PreconditionViolation> {
        let index = self.index_of(id)?;
        let entry = self.entries.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(id = id.0, name = entry.filter.name(), "Removed filter");
        self.recompute();
        Ok(entry.filter)
    }

    /// Mark a filter as active for editing, or clear the selection
    ///
    /// Returns the control surface of the selected filter (`None` when the
    /// selection was cleared).
    pub fn select(
        &mut self,
        id: Option<FilterId>,
    ) -> Result<Option<Vec<ControlDescriptor>>, PreconditionViolation> {
        match id {
            Some(id) => {
                let index = self.index_of(id)?;
                self.selected = Some(id);
                Ok(Some(self.entries[index].filter.describe_controls()))
            }
            None => {
                self.selected = None;
                Ok(None)
            }
        }
    }

    pub fn selected(&self) -> Option<FilterId> {
        self.selected
    }

    /// Control surface of the selected filter
    pub fn selected_controls(&self) -> Option<Vec<ControlDescriptor>> {
        let id = self.selected?;
        self.get(id).map(|f| f.describe_controls())
    }

    /// Change one parameter of a filter
    pub fn set_control(
        &mut self,
        id: FilterId,
        key: &str,
        value: f32,
    ) -> Result<(), PreconditionViolation> {
        let index = self.index_of(id)?;
        if self.entries[index].filter.set_control(key, value)? {
            self.recompute();
        }
        Ok(())
    }

    /// Restore a filter's identity parameters
    pub fn reset(&mut self, id: FilterId) -> Result<(), PreconditionViolation> {
        let index = self.index_of(id)?;
        self.entries[index].filter.reset();
        self.recompute();
        Ok(())
    }

    pub fn rename(&mut self, id: FilterId, name: impl Into<String>) -> Result<(), PreconditionViolation> {
        let index = self.index_of(id)?;
        self.entries[index].filter.set_name(name);
        Ok(())
    }

    pub fn get(&self, id: FilterId) -> Option<&Filter> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.filter)
    }

    /// Id of the filter at a stack position
    pub fn id_at(&self, index: usize) -> Option<FilterId> {
        self.entries.get(index).map(|e| e.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FilterId, &Filter)> {
        self.entries.iter().map(|e| (e.id, &e.filter))
    }

    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.entries.iter().map(|e| &e.filter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Fold every filter, in order, starting from identity
    pub fn composite_transform(&self) -> ColorMatrix {
        fold(self.filters())
    }

    /// Composite as of the last mutation
    pub fn current_transform(&self) -> ColorMatrix {
        self.composite
    }

    fn index_of(&self, id: FilterId) -> Result<usize, PreconditionViolation> {
        self.entries.iter().position(|e| e.id == id).ok_or_else(|| {
            warn!(id = id.0, "Filter not in stack, ignoring");
            PreconditionViolation::FilterNotFound(id.0)
        })
    }

    fn recompute(&mut self) {
        self.composite = self.composite_transform();
        self.revision += 1;
        self.changes.send_replace(StackChange {
            revision: self.revision,
            transform: self.composite,
        });
    }
}

impl fmt::Debug for FilterStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterStack")
            .field("entries", &self.entries)
            .field("selected", &self.selected)
            .field("revision", &self.revision)
            .finish()
    }
}

fn fold<'a>(filters: impl Iterator<Item = &'a Filter>) -> ColorMatrix {
    filters.fold(ColorMatrix::identity(), |acc, filter| filter.apply_to(&acc))
}
