//! Gallery endpoints of the storefront API
//!
//! | Call | Route |
//! |------|-------|
//! | delete | `DELETE /api/{owners}/{id}/images/{position}` |
//! | upload | `POST /api/{owners}/{id}/images[?cover_index=n]` (multipart) |
//! | cover | `PUT /api/{owners}/{id}/images/{position}/cover` |

use async_trait::async_trait;
use media_engine::{MediaRemote, RemoteError, StagedFile};
use reqwest::multipart::{Form, Part};
use shared::{CatalogImage, ImageUploadResponse, OwnerRef};

use crate::{ClientError, ClientResult, HttpClient};

/// [`MediaRemote`] backed by the storefront HTTP API
#[derive(Debug, Clone)]
pub struct HttpMediaRemote {
    http: HttpClient,
}

impl HttpMediaRemote {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Fetch `owner`'s canonical gallery in display order
    pub async fn list(&self, owner: &OwnerRef) -> ClientResult<Vec<CatalogImage>> {
        self.http
            .get::<Vec<CatalogImage>>(&images_path(owner))
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing image list".to_string()))
    }

    fn upload_form(owner: &OwnerRef, files: &[&StagedFile]) -> ClientResult<Form> {
        let mut form = Form::new().text(owner.kind.id_field(), owner.id.clone());
        for file in files {
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.name.clone())
                .mime_str(&file.mime_type())?;
            form = form.part("file", part);
        }
        Ok(form)
    }
}

fn images_path(owner: &OwnerRef) -> String {
    format!("api/{}/{}/images", owner.kind.route_segment(), owner.id)
}

fn image_path(owner: &OwnerRef, position: usize) -> String {
    format!("{}/{}", images_path(owner), position)
}

#[async_trait]
impl MediaRemote for HttpMediaRemote {
    async fn delete_at(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError> {
        tracing::debug!(owner = %owner, position, "DELETE image");
        self.http
            .delete::<serde_json::Value>(&image_path(owner, position))
            .await?;
        Ok(())
    }

    async fn upload(
        &self,
        owner: &OwnerRef,
        files: &[&StagedFile],
        cover_index: Option<usize>,
    ) -> Result<Vec<CatalogImage>, RemoteError> {
        let mut path = images_path(owner);
        if let Some(index) = cover_index {
            path.push_str(&format!("?cover_index={index}"));
        }
        tracing::debug!(owner = %owner, files = files.len(), ?cover_index, "POST images");

        let form = Self::upload_form(owner, files)?;
        let uploaded = self
            .http
            .post_multipart::<ImageUploadResponse>(&path, form)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing uploaded images".to_string()))?;
        Ok(uploaded.images)
    }

    async fn set_cover(&self, owner: &OwnerRef, position: usize) -> Result<(), RemoteError> {
        tracing::debug!(owner = %owner, position, "PUT cover");
        self.http
            .put_empty::<serde_json::Value>(&format!("{}/cover", image_path(owner, position)))
            .await?;
        Ok(())
    }
}
