//! Catalog Image Model

use serde::{Deserialize, Serialize};

/// Catalog entity that owns an image gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOwner {
    Product,
    Brand,
    Category,
}

impl ImageOwner {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOwner::Product => "product",
            ImageOwner::Brand => "brand",
            ImageOwner::Category => "category",
        }
    }

    /// Field name the storefront API uses for the owning entity's id
    pub fn id_field(&self) -> &'static str {
        match self {
            ImageOwner::Product => "product_id",
            ImageOwner::Brand => "brand_id",
            ImageOwner::Category => "category_id",
        }
    }

    /// Collection segment in API routes (`/api/{segment}/{id}/images`)
    pub fn route_segment(&self) -> &'static str {
        match self {
            ImageOwner::Product => "products",
            ImageOwner::Brand => "brands",
            ImageOwner::Category => "categories",
        }
    }
}

impl std::fmt::Display for ImageOwner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A specific catalog entity whose gallery is being edited
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerRef {
    pub kind: ImageOwner,
    pub id: String,
}

impl OwnerRef {
    pub fn new(kind: ImageOwner, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn product(id: impl Into<String>) -> Self {
        Self::new(ImageOwner::Product, id)
    }

    pub fn brand(id: impl Into<String>) -> Self {
        Self::new(ImageOwner::Brand, id)
    }

    pub fn category(id: impl Into<String>) -> Self {
        Self::new(ImageOwner::Category, id)
    }
}

impl std::fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Canonical image record as stored by the remote gallery
///
/// `position` is the index inside the owner's position-addressed collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogImage {
    pub id: String,
    /// Storage key or URL of the stored bytes
    pub storage_locator: String,
    pub is_cover: bool,
    pub position: usize,
}

/// Body of a successful upload call
///
/// One record per uploaded file, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub images: Vec<CatalogImage>,
}
