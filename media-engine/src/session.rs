//! Gallery editing session
//!
//! Caller-facing handle around one [`CollectionState`]. Opened from the
//! owner's canonical records, edited synchronously, finished by either
//! [`MediaSession::commit`] or [`MediaSession::close`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use media_engine::{DataUrlPreviews, MediaConfig, MediaSession, OwnerRef, StagedFile};
//! use media_engine::remote::MemoryRemote;
//!
//! # async fn example() -> Result<(), media_engine::MediaError> {
//! let remote = MemoryRemote::new();
//! let owner = OwnerRef::product("p-1");
//! let records = remote.insert_gallery(&owner, &["a.jpg", "b.jpg"], Some(0));
//!
//! let mut session = MediaSession::open(
//!     owner,
//!     records,
//!     MediaConfig::new(4),
//!     Arc::new(DataUrlPreviews::new()),
//! )?;
//! let b = session.items()?[1].id().clone();
//! session.toggle_delete(&b)?;
//! session.add_staged(vec![StagedFile::new("c.jpg", vec![0xFF, 0xD8])])?;
//!
//! let images = session.commit(&remote).await?;
//! assert_eq!(images.len(), 2);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::{CatalogImage, OwnerRef};

use crate::compress::compress;
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::executor;
use crate::item::{ImageItem, ItemId, StagedFile};
use crate::planner::{self, ReconciliationPlan};
use crate::preview::PreviewAllocator;
use crate::remote::MediaRemote;
use crate::state::{AddOutcome, CollectionState};

/// Observable "saving" state of a session
///
/// True for the whole executor run so the UI keeps the editor mounted and
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct SavingFlag(Arc<AtomicBool>);

impl SavingFlag {
    pub fn is_saving(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the saving flag when the commit finishes, fails or is dropped
struct SavingGuard(SavingFlag);

impl SavingGuard {
    fn engage(flag: &SavingFlag) -> MediaResult<Self> {
        flag.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| MediaError::CommitInFlight)?;
        Ok(Self(flag.clone()))
    }
}

impl Drop for SavingGuard {
    fn drop(&mut self) {
        self.0.0.store(false, Ordering::Release);
    }
}

/// Editing session over one owner's gallery
#[derive(Debug)]
pub struct MediaSession {
    owner: OwnerRef,
    config: MediaConfig,
    state: Option<CollectionState>,
    saving: SavingFlag,
}

impl MediaSession {
    /// Seed a session from `owner`'s canonical records, in display order
    pub fn open(
        owner: OwnerRef,
        records: Vec<CatalogImage>,
        config: MediaConfig,
        previews: Arc<dyn PreviewAllocator>,
    ) -> MediaResult<Self> {
        let state = CollectionState::seed(records, config.max_items, previews)?;
        tracing::debug!(
            owner = %owner,
            images = state.items().len(),
            max_items = config.max_items,
            "Gallery session opened"
        );
        Ok(Self {
            owner,
            config,
            state: Some(state),
            saving: SavingFlag::default(),
        })
    }

    pub fn owner(&self) -> &OwnerRef {
        &self.owner
    }

    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    pub fn saving_flag(&self) -> SavingFlag {
        self.saving.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_none()
    }

    pub fn items(&self) -> MediaResult<&[ImageItem]> {
        Ok(self.state()?.items())
    }

    pub fn cover(&self) -> MediaResult<Option<&ImageItem>> {
        Ok(self.state()?.cover())
    }

    /// Free slots; zero once the session has ended
    pub fn remaining_slots(&self) -> usize {
        self.state.as_ref().map_or(0, CollectionState::remaining_slots)
    }

    /// Stage raw files, truncated to the free slots
    pub fn add_staged(&mut self, files: Vec<StagedFile>) -> MediaResult<AddOutcome> {
        Ok(self.state_mut()?.add_staged(files))
    }

    /// Validate and compress picked files with the session's constraints,
    /// then stage them
    ///
    /// A rejected file fails the whole batch and nothing is staged.
    pub fn stage_files(&mut self, files: Vec<StagedFile>) -> MediaResult<AddOutcome> {
        self.state_mut()?;
        let files = compress(files, &self.config.constraints)?;
        self.add_staged(files)
    }

    pub fn toggle_delete(&mut self, id: &ItemId) -> MediaResult<()> {
        self.state_mut()?.toggle_delete(id)
    }

    pub fn reorder(&mut self, id: &ItemId, new_index: usize) -> MediaResult<()> {
        self.state_mut()?.reorder(id, new_index)
    }

    pub fn set_cover(&mut self, id: &ItemId) -> MediaResult<()> {
        self.state_mut()?.set_cover(id)
    }

    /// Plan that a commit would run right now
    pub fn plan(&self) -> MediaResult<ReconciliationPlan<'_>> {
        let state = self.state()?;
        Ok(planner::plan(state.initial(), state))
    }

    /// Whether committing would change anything, remotely or in order
    pub fn has_changes(&self) -> bool {
        self.plan()
            .map(|plan| !plan.is_noop() || plan.order_changed())
            .unwrap_or(false)
    }

    /// Apply the edits to the remote gallery
    ///
    /// On success the session ends and the returned list is the owner's new
    /// canonical gallery. On failure the local edits are kept as they were,
    /// so the user can retry; the remote gallery may already be partially
    /// updated (see [`MediaError::is_remote`]).
    pub async fn commit<R>(&mut self, remote: &R) -> MediaResult<Vec<CatalogImage>>
    where
        R: MediaRemote + ?Sized,
    {
        let state = self.state.as_ref().ok_or(MediaError::SessionClosed)?;
        let plan = planner::plan(state.initial(), state);

        // nothing to save, so the editor never shows as saving
        let guard = if plan.is_noop() {
            None
        } else {
            Some(SavingGuard::engage(&self.saving)?)
        };
        let images = executor::execute(remote, &self.owner, &plan).await?;

        drop(guard);
        drop(plan);
        self.close();
        Ok(images)
    }

    /// End the session without committing, releasing staged previews
    pub fn close(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!(owner = %self.owner, "Gallery session closed");
        }
    }

    fn state(&self) -> MediaResult<&CollectionState> {
        self.state.as_ref().ok_or(MediaError::SessionClosed)
    }

    fn state_mut(&mut self) -> MediaResult<&mut CollectionState> {
        if self.saving.is_saving() {
            return Err(MediaError::CommitInFlight);
        }
        self.state.as_mut().ok_or(MediaError::SessionClosed)
    }
}
