//! Unified collection state
//!
//! Single source of truth for an in-progress gallery edit. All operations
//! are synchronous and purely local; nothing here talks to the remote side.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use shared::CatalogImage;

use crate::error::{MediaError, MediaResult};
use crate::item::{ImageItem, ItemId, Origin, StagedFile};
use crate::preview::PreviewAllocator;

/// What the gallery looked like when the session opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    order: Vec<ItemId>,
    cover: Option<ItemId>,
}

impl Snapshot {
    pub fn order(&self) -> &[ItemId] {
        &self.order
    }

    pub fn cover(&self) -> Option<&ItemId> {
        self.cover.as_ref()
    }
}

/// Result of staging a batch of files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddOutcome {
    pub accepted: usize,
    /// Files dropped because the gallery ran out of slots
    pub rejected: usize,
    pub remaining_slots: usize,
}

/// Ordered gallery view mixing persisted and staged images
pub struct CollectionState {
    items: Vec<ImageItem>,
    max_items: usize,
    initial: Snapshot,
    previews: Arc<dyn PreviewAllocator>,
}

impl std::fmt::Debug for CollectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionState")
            .field("items", &self.items)
            .field("max_items", &self.max_items)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

impl CollectionState {
    /// Build the state from the owner's canonical records, in display order
    ///
    /// If the records claim more than one cover, the first one wins.
    pub fn seed(
        records: Vec<CatalogImage>,
        max_items: usize,
        previews: Arc<dyn PreviewAllocator>,
    ) -> MediaResult<Self> {
        if records.len() > max_items {
            return Err(MediaError::CapacityExceeded {
                max: max_items,
                requested: records.len(),
            });
        }

        let mut seen = HashSet::with_capacity(records.len());
        let mut items = Vec::with_capacity(records.len());
        let mut cover: Option<ItemId> = None;

        for record in records {
            let mut item = ImageItem::persisted(record);
            if !seen.insert(item.id.clone()) {
                return Err(MediaError::DuplicateItem(item.id));
            }
            if item.is_cover {
                if cover.is_some() {
                    tracing::warn!(image_id = %item.id, "Extra cover flag dropped while seeding");
                    item.is_cover = false;
                } else {
                    cover = Some(item.id.clone());
                }
            }
            items.push(item);
        }

        let initial = Snapshot {
            order: items.iter().map(|i| i.id.clone()).collect(),
            cover,
        };

        Ok(Self {
            items,
            max_items,
            initial,
            previews,
        })
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn initial(&self) -> &Snapshot {
        &self.initial
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn get(&self, id: &ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Images that will exist after commit
    pub fn non_deleted_count(&self) -> usize {
        self.items.iter().filter(|i| !i.marked_for_deletion).count()
    }

    pub fn remaining_slots(&self) -> usize {
        self.max_items.saturating_sub(self.non_deleted_count())
    }

    /// Current cover, never a deletion-marked image
    pub fn cover(&self) -> Option<&ImageItem> {
        self.items
            .iter()
            .find(|i| i.is_cover && !i.marked_for_deletion)
    }

    /// Append staged images, keeping only as many as there are free slots
    pub fn add_staged(&mut self, files: Vec<StagedFile>) -> AddOutcome {
        let offered = files.len();
        let slots = self.remaining_slots();

        for file in files.into_iter().take(slots) {
            let preview = self.previews.allocate(&file);
            let item = ImageItem::staged(file, preview);
            tracing::debug!(image_id = %item.id, "Image staged");
            self.items.push(item);
        }

        let accepted = offered.min(slots);
        if accepted < offered {
            tracing::debug!(offered, accepted, "Staged batch truncated to free slots");
        }

        AddOutcome {
            accepted,
            rejected: offered - accepted,
            remaining_slots: self.remaining_slots(),
        }
    }

    /// Mark/unmark a persisted image, or drop a staged one
    ///
    /// Deleting the cover clears it. Restoring needs a free slot. Whenever
    /// this leaves no cover, the seeded cover gets its flag back if it is
    /// still live; no other replacement is picked.
    pub fn toggle_delete(&mut self, id: &ItemId) -> MediaResult<()> {
        let index = self.index_of(id)?;

        if self.items[index].is_staged() {
            let item = self.items.remove(index);
            if let Origin::Staged { preview, .. } = item.origin {
                self.previews.release(preview);
            }
            tracing::debug!(image_id = %id, "Staged image removed");
            self.fall_back_to_initial_cover();
            return Ok(());
        }

        if self.items[index].marked_for_deletion {
            let live = self.non_deleted_count();
            if live >= self.max_items {
                return Err(MediaError::CapacityExceeded {
                    max: self.max_items,
                    requested: live + 1,
                });
            }
            self.items[index].marked_for_deletion = false;
            tracing::debug!(image_id = %id, "Image restored");
            self.fall_back_to_initial_cover();
        } else {
            let item = &mut self.items[index];
            item.marked_for_deletion = true;
            item.is_cover = false;
            tracing::debug!(image_id = %id, "Image marked for deletion");
            self.fall_back_to_initial_cover();
        }

        Ok(())
    }

    /// Move an image to `new_index`; remote positions are untouched
    pub fn reorder(&mut self, id: &ItemId, new_index: usize) -> MediaResult<()> {
        let index = self.index_of(id)?;
        let len = self.items.len();
        if new_index >= len {
            return Err(MediaError::IndexOutOfRange {
                index: new_index,
                len,
            });
        }

        let item = self.items.remove(index);
        self.items.insert(new_index, item);
        Ok(())
    }

    /// Make `id` the only cover
    pub fn set_cover(&mut self, id: &ItemId) -> MediaResult<()> {
        let index = self.index_of(id)?;
        if self.items[index].marked_for_deletion {
            return Err(MediaError::CoverOnDeletedItem(id.clone()));
        }

        for (i, item) in self.items.iter_mut().enumerate() {
            item.is_cover = i == index;
        }
        Ok(())
    }

    /// With no cover left, the seeded cover takes the flag back if it is
    /// still live
    ///
    /// The remote has no way to unset a cover, so that image stays cover
    /// remotely until something else replaces it.
    fn fall_back_to_initial_cover(&mut self) {
        if self.cover().is_some() {
            return;
        }
        let Some(initial) = self.initial.cover.as_ref() else {
            return;
        };
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|i| &i.id == initial && !i.marked_for_deletion)
        {
            item.is_cover = true;
        }
    }

    fn index_of(&self, id: &ItemId) -> MediaResult<usize> {
        self.items
            .iter()
            .position(|i| &i.id == id)
            .ok_or_else(|| MediaError::ItemNotFound(id.clone()))
    }
}

impl Drop for CollectionState {
    fn drop(&mut self) {
        for item in self.items.drain(..) {
            if let Origin::Staged { preview, .. } = item.origin {
                self.previews.release(preview);
            }
        }
    }
}
