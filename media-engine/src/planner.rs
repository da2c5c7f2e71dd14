//! Reconciliation planner
//!
//! Pure diff between the session's initial snapshot and its current state.
//! The remote gallery is position-addressed and contiguous: every delete
//! shifts the positions after it. Deletions are therefore emitted highest
//! position first, so each recorded position still points at the image it
//! was recorded for when its turn comes.

use shared::CatalogImage;

use crate::item::{ItemId, Origin, StagedFile};
use crate::state::{CollectionState, Snapshot};

/// Staged files sent in a single upload call
#[derive(Debug, Default)]
pub struct UploadBatch<'a> {
    pub files: Vec<&'a StagedFile>,
    /// Index within `files` of the image that becomes cover on upload
    pub cover_index: Option<usize>,
}

impl UploadBatch<'_> {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}

/// Where a final slot's canonical record comes from
#[derive(Debug, Clone, Copy)]
pub enum SlotSource<'a> {
    /// Existing record, passed through with its new position
    Persisted(&'a CatalogImage),
    /// The n-th record returned by the upload call
    Uploaded(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct PlannedSlot<'a> {
    pub id: &'a ItemId,
    pub source: SlotSource<'a>,
}

/// Ordered remote calls plus the gallery order the caller adopts afterwards
#[derive(Debug)]
pub struct ReconciliationPlan<'a> {
    /// Original remote positions, strictly descending
    pub deletions: Vec<usize>,
    pub upload: UploadBatch<'a>,
    /// Remote position to mark as cover after the upload
    ///
    /// Counted in the post-commit remote gallery, not in `final_order`.
    pub cover_assignment: Option<usize>,
    pub final_order: Vec<PlannedSlot<'a>>,
    /// Intended cover after commit
    pub cover: Option<&'a ItemId>,
    order_changed: bool,
}

impl ReconciliationPlan<'_> {
    /// No remote call is needed
    pub fn is_noop(&self) -> bool {
        self.deletions.is_empty() && self.upload.is_empty() && self.cover_assignment.is_none()
    }

    /// Number of remote calls the executor will issue
    pub fn remote_call_count(&self) -> usize {
        self.deletions.len()
            + usize::from(!self.upload.is_empty())
            + usize::from(self.cover_assignment.is_some())
    }

    /// Surviving images are displayed in a different order than at seed time
    pub fn order_changed(&self) -> bool {
        self.order_changed
    }
}

/// Compute the plan that brings the remote gallery in line with `current`
pub fn plan<'a>(initial: &Snapshot, current: &'a CollectionState) -> ReconciliationPlan<'a> {
    let mut deletions: Vec<usize> = current
        .items()
        .iter()
        .filter(|i| i.is_marked_for_deletion())
        .filter_map(|i| i.position())
        .collect();
    deletions.sort_unstable_by(|a, b| b.cmp(a));
    deletions.dedup();

    let mut upload = UploadBatch::default();
    let mut final_order = Vec::with_capacity(current.items().len());

    for item in current.items() {
        if item.is_marked_for_deletion() {
            continue;
        }
        let source = match item.origin() {
            Origin::Persisted { record } => SlotSource::Persisted(record),
            Origin::Staged { file, .. } => {
                if item.is_cover() {
                    upload.cover_index = Some(upload.files.len());
                }
                upload.files.push(file);
                SlotSource::Uploaded(upload.files.len() - 1)
            }
        };
        final_order.push(PlannedSlot {
            id: item.id(),
            source,
        });
    }

    let cover = current.cover();
    let cover_changed = cover.map(|c| c.id()) != initial.cover();
    // staged covers ride on the upload hint
    let cover_assignment = match cover {
        Some(item) if cover_changed => item.position().map(|at| remote_position(current, at)),
        _ => None,
    };

    let order_changed = {
        let surviving = initial
            .order()
            .iter()
            .filter(|id| final_order.iter().any(|slot| slot.id == *id));
        !final_order
            .iter()
            .filter(|slot| matches!(slot.source, SlotSource::Persisted(_)))
            .map(|slot| slot.id)
            .eq(surviving)
    };

    ReconciliationPlan {
        deletions,
        upload,
        cover_assignment,
        final_order,
        cover: cover.map(|c| c.id()),
        order_changed,
    }
}

/// Where the persisted image seeded at `original` sits once deletions and
/// the upload have run
///
/// The remote never reorders: survivors keep their relative order and
/// uploads are appended after them.
fn remote_position(current: &CollectionState, original: usize) -> usize {
    current
        .items()
        .iter()
        .filter(|i| !i.is_marked_for_deletion())
        .filter_map(|i| i.position())
        .filter(|&p| p < original)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::DataUrlPreviews;
    use std::sync::Arc;

    fn seeded(ids: &[&str], cover: Option<usize>, max: usize) -> CollectionState {
        let records = ids
            .iter()
            .enumerate()
            .map(|(position, id)| CatalogImage {
                id: id.to_string(),
                storage_locator: format!("images/t1/{id}.jpg"),
                is_cover: cover == Some(position),
                position,
            })
            .collect();
        CollectionState::seed(records, max, Arc::new(DataUrlPreviews::new())).unwrap()
    }

    fn slot_ids<'a>(plan: &ReconciliationPlan<'a>) -> Vec<&'a str> {
        plan.final_order.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_untouched_gallery_is_noop() {
        let state = seeded(&["a", "b", "c"], Some(1), 5);
        let plan = plan(state.initial(), &state);

        assert!(plan.is_noop());
        assert!(!plan.order_changed());
        assert_eq!(plan.remote_call_count(), 0);
        assert_eq!(slot_ids(&plan), vec!["a", "b", "c"]);
        assert_eq!(plan.cover.unwrap().as_str(), "b");
    }

    #[test]
    fn test_deletions_are_descending() {
        let mut state = seeded(&["a", "b", "c", "d", "e", "f"], None, 10);
        for id in ["b", "f", "a", "d"] {
            state.toggle_delete(&id.into()).unwrap();
        }
        let plan = plan(state.initial(), &state);

        assert_eq!(plan.deletions, vec![5, 3, 1, 0]);
        assert_eq!(slot_ids(&plan), vec!["c", "e"]);
    }

    #[test]
    fn test_reorder_only_changes_order_without_remote_calls() {
        let mut state = seeded(&["a", "b", "c"], None, 5);
        state.reorder(&"c".into(), 0).unwrap();
        let plan = plan(state.initial(), &state);

        assert!(plan.is_noop());
        assert!(plan.order_changed());
        assert_eq!(slot_ids(&plan), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_staged_cover_uses_upload_hint() {
        let mut state = seeded(&["a"], Some(0), 5);
        state.add_staged(vec![
            StagedFile::new("x.jpg", vec![1]),
            StagedFile::new("y.jpg", vec![2]),
        ]);
        let y = state.items()[2].id().clone();
        state.set_cover(&y).unwrap();
        let plan = plan(state.initial(), &state);

        assert_eq!(plan.upload.len(), 2);
        assert_eq!(plan.upload.cover_index, Some(1));
        assert_eq!(plan.cover_assignment, None);
        assert_eq!(plan.remote_call_count(), 1);
        assert!(matches!(plan.final_order[2].source, SlotSource::Uploaded(1)));
    }

    #[test]
    fn test_persisted_cover_change_uses_post_delete_position() {
        let mut state = seeded(&["a", "b", "c"], Some(0), 5);
        state.toggle_delete(&"a".into()).unwrap();
        state.set_cover(&"c".into()).unwrap();
        let plan = plan(state.initial(), &state);

        assert_eq!(plan.deletions, vec![0]);
        // c sits at index 1 once a is gone
        assert_eq!(plan.cover_assignment, Some(1));
    }

    #[test]
    fn test_cover_position_ignores_local_reorder() {
        let mut state = seeded(&["a", "b", "c"], None, 5);
        state.reorder(&"c".into(), 0).unwrap();
        state.set_cover(&"c".into()).unwrap();
        let plan = plan(state.initial(), &state);

        assert_eq!(slot_ids(&plan), vec!["c", "a", "b"]);
        assert_eq!(plan.cover_assignment, Some(2));
    }

    #[test]
    fn test_cover_position_ignores_staged_items_placed_before_it() {
        let mut state = seeded(&["a", "b"], None, 5);
        state.add_staged(vec![StagedFile::new("d.jpg", vec![1])]);
        let d = state.items()[2].id().clone();
        state.reorder(&d, 0).unwrap();
        state.set_cover(&"b".into()).unwrap();
        let plan = plan(state.initial(), &state);

        // d is appended after a and b remotely
        assert_eq!(plan.cover_assignment, Some(1));
        assert_eq!(plan.upload.cover_index, None);
    }

    #[test]
    fn test_unchanged_persisted_cover_needs_no_call() {
        let mut state = seeded(&["a", "b", "c"], Some(2), 5);
        state.set_cover(&"c".into()).unwrap();
        state.toggle_delete(&"a".into()).unwrap();
        let plan = plan(state.initial(), &state);

        assert_eq!(plan.cover_assignment, None);
        assert_eq!(plan.remote_call_count(), 1);
    }

    #[test]
    fn test_deleting_cover_emits_no_cover_call() {
        let mut state = seeded(&["a", "b"], Some(0), 5);
        state.toggle_delete(&"a".into()).unwrap();
        let plan = plan(state.initial(), &state);

        assert_eq!(plan.deletions, vec![0]);
        assert!(plan.cover.is_none());
        assert!(plan.cover_assignment.is_none());
    }
}
