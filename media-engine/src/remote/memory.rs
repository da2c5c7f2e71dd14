//! In-memory gallery

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared::{CatalogImage, OwnerRef};

use super::{MediaRemote, RemoteError};
use crate::item::StagedFile;

/// Call received by [`MemoryRemote`], in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    DeleteAt(usize),
    Upload {
        files: Vec<String>,
        cover_index: Option<usize>,
    },
    SetCover(usize),
}

/// Call that [`MemoryRemote`] fails instead of applying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    DeleteAt(usize),
    Upload,
    SetCover,
}

#[derive(Default)]
struct Inner {
    galleries: HashMap<OwnerRef, Vec<CatalogImage>>,
    calls: Vec<RemoteCall>,
    fail_on: Option<FailPoint>,
    next_id: u64,
}

/// Position-addressed galleries kept in memory
///
/// Behaves like the storefront API: deleting shifts later positions down,
/// uploads append, cover flags stay exclusive.
#[derive(Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `owner`'s gallery with one image per locator
    pub fn insert_gallery(
        &self,
        owner: &OwnerRef,
        locators: &[&str],
        cover: Option<usize>,
    ) -> Vec<CatalogImage> {
        let mut inner = self.inner.lock();
        let images: Vec<CatalogImage> = locators
            .iter()
            .enumerate()
            .map(|(position, locator)| {
                inner.next_id += 1;
                CatalogImage {
                    id: format!("img-{}", inner.next_id),
                    storage_locator: locator.to_string(),
                    is_cover: cover == Some(position),
                    position,
                }
            })
            .collect();
        inner.galleries.insert(owner.clone(), images.clone());
        images
    }

    /// Current gallery contents
    pub fn gallery(&self, owner: &OwnerRef) -> Vec<CatalogImage> {
        self.inner
            .lock()
            .galleries
            .get(owner)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.inner.lock().calls.clone()
    }

    /// Fail the next matching call (and every later one) without applying it
    pub fn fail_on(&self, point: Option<FailPoint>) {
        self.inner.lock().fail_on = point;
    }
}

fn renumber(images: &mut [CatalogImage]) {
    for (position, image) in images.iter_mut().enumerate() {
        image.position = position;
    }
}

#[async_trait]
impl MediaRemote for MemoryRemote {
    async fn delete_at(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RemoteCall::DeleteAt(position));
        if inner.fail_on == Some(FailPoint::DeleteAt(position)) {
            return Err(format!("injected failure deleting position {position}").into());
        }

        let images = inner.galleries.entry(owner.clone()).or_default();
        if position >= images.len() {
            return Err(format!("position {position} out of range ({} images)", images.len()).into());
        }
        images.remove(position);
        renumber(images);
        Ok(())
    }

    async fn upload(
        &self,
        owner: &OwnerRef,
        files: &[&StagedFile],
        cover_index: Option<usize>,
    ) -> Result<Vec<CatalogImage>, RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RemoteCall::Upload {
            files: files.iter().map(|f| f.name.clone()).collect(),
            cover_index,
        });
        if inner.fail_on == Some(FailPoint::Upload) {
            return Err("injected upload failure".into());
        }

        let first_id = inner.next_id + 1;
        inner.next_id += files.len() as u64;

        let images = inner.galleries.entry(owner.clone()).or_default();
        if cover_index.is_some() {
            images.iter_mut().for_each(|image| image.is_cover = false);
        }
        let start = images.len();
        let created: Vec<CatalogImage> = files
            .iter()
            .enumerate()
            .map(|(i, file)| CatalogImage {
                id: format!("img-{}", first_id + i as u64),
                storage_locator: format!("images/{}/{}", owner.id, file.name),
                is_cover: cover_index == Some(i),
                position: start + i,
            })
            .collect();
        images.extend(created.iter().cloned());
        Ok(created)
    }

    async fn set_cover(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError> {
        let mut inner = self.inner.lock();
        inner.calls.push(RemoteCall::SetCover(position));
        if inner.fail_on == Some(FailPoint::SetCover) {
            return Err("injected cover failure".into());
        }

        let images = inner.galleries.entry(owner.clone()).or_default();
        if position >= images.len() {
            return Err(format!("position {position} out of range ({} images)", images.len()).into());
        }
        for (i, image) in images.iter_mut().enumerate() {
            image.is_cover = i == position;
        }
        Ok(())
    }
}
