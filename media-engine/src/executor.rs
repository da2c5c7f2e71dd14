//! Commit executor
//!
//! Runs a [`ReconciliationPlan`] strictly in sequence: deletions (highest
//! position first, one at a time), then one upload call, then the optional
//! cover assignment. Any failure stops the run. Steps that already
//! succeeded stay applied remotely.

use shared::{CatalogImage, OwnerRef};

use crate::error::{MediaError, MediaResult};
use crate::planner::{ReconciliationPlan, SlotSource};
use crate::remote::MediaRemote;

/// Apply `plan` to `owner`'s remote gallery and return the new canonical list
pub async fn execute<R>(
    remote: &R,
    owner: &OwnerRef,
    plan: &ReconciliationPlan<'_>,
) -> MediaResult<Vec<CatalogImage>>
where
    R: MediaRemote + ?Sized,
{
    if !plan.is_noop() {
        tracing::info!(
            owner = %owner,
            deletions = plan.deletions.len(),
            uploads = plan.upload.len(),
            cover_assignment = ?plan.cover_assignment,
            "Committing gallery changes"
        );
    }

    for &position in &plan.deletions {
        remote.delete_at(owner, position).await.map_err(|source| {
            tracing::warn!(owner = %owner, position, error = %source, "Image delete failed");
            MediaError::RemoteDeleteFailed { position, source }
        })?;
    }

    let uploaded = if plan.upload.is_empty() {
        Vec::new()
    } else {
        let records = remote
            .upload(owner, &plan.upload.files, plan.upload.cover_index)
            .await
            .map_err(|source| {
                tracing::warn!(owner = %owner, files = plan.upload.len(), error = %source, "Image upload failed");
                MediaError::RemoteUploadFailed { source }
            })?;

        if records.len() != plan.upload.len() {
            tracing::warn!(
                owner = %owner,
                expected = plan.upload.len(),
                received = records.len(),
                "Upload returned wrong number of records"
            );
            return Err(MediaError::RemoteUploadFailed {
                source: format!(
                    "expected {} records, received {}",
                    plan.upload.len(),
                    records.len()
                )
                .into(),
            });
        }
        records
    };

    if let Some(position) = plan.cover_assignment {
        remote.set_cover(owner, position).await.map_err(|source| {
            tracing::warn!(owner = %owner, position, error = %source, "Cover assignment failed");
            MediaError::RemoteCoverFailed { position, source }
        })?;
    }

    let images = fold(plan, uploaded);
    if !plan.is_noop() {
        tracing::info!(owner = %owner, images = images.len(), "Gallery changes committed");
    }
    Ok(images)
}

/// Build the final canonical list in display order
///
/// Uploaded slots take the returned record matching their submission index;
/// every record gets its final index as position and the intended cover flag.
fn fold(plan: &ReconciliationPlan<'_>, uploaded: Vec<CatalogImage>) -> Vec<CatalogImage> {
    let mut uploaded: Vec<Option<CatalogImage>> = uploaded.into_iter().map(Some).collect();

    plan.final_order
        .iter()
        .filter_map(|slot| {
            let record = match slot.source {
                SlotSource::Persisted(record) => Some(record.clone()),
                SlotSource::Uploaded(index) => uploaded.get_mut(index).and_then(Option::take),
            };
            record.map(|record| (slot, record))
        })
        .enumerate()
        .map(|(position, (slot, mut record))| {
            record.position = position;
            record.is_cover = plan.cover == Some(slot.id);
            record
        })
        .collect()
}
