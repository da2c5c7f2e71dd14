//! Media Engine - image gallery editing for catalog entities
//!
//! Presents one ordered, editable view over images that are already stored
//! remotely (addressed by position) and images only staged locally as bytes,
//! and turns the user's edits into the ordered remote calls that make the
//! remote gallery match.
//!
//! ```text
//! MediaSession::open ─▶ CollectionState ─(edits)─▶ planner::plan ─▶ executor::execute ─▶ Vec<CatalogImage>
//! ```
//!
//! The in-memory `remote::MemoryRemote` is only built with the `test-util`
//! feature.

pub mod compress;
pub mod config;
pub mod error;
pub mod executor;
pub mod item;
pub mod planner;
pub mod preview;
pub mod remote;
pub mod session;
pub mod state;

pub use compress::{ImageConstraints, ImageRejection, compress};
pub use config::MediaConfig;
pub use error::{MediaError, MediaResult};
pub use item::{ImageItem, ItemId, Origin, StagedFile};
pub use planner::{PlannedSlot, ReconciliationPlan, SlotSource, UploadBatch};
pub use preview::{DataUrlPreviews, PreviewAllocator, PreviewHandle};
pub use remote::{MediaRemote, RemoteError};
pub use session::{MediaSession, SavingFlag};
pub use state::{AddOutcome, CollectionState, Snapshot};

// Re-export shared types for convenience
pub use shared::{CatalogImage, ImageOwner, OwnerRef};
