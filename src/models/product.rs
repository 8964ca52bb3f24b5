use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Thumbnail assigned to speculative products until the server-side media
/// fields arrive with the settle refetch.
pub const PLACEHOLDER_THUMBNAIL: &str = "https://placehold.co/150x150?text=pending";

/// Product identity.
///
/// Server-assigned ids and locally generated placeholder ids live in separate
/// variants so the two id spaces can never collide. A `Temporary` id exists
/// only between the speculative cache write and the settle refetch; it never
/// appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductId {
    /// Locally generated placeholder identity for a not-yet-persisted product.
    Temporary(Uuid),
    /// Server-assigned identity.
    Persisted(u64),
}

impl ProductId {
    /// Generate a fresh temporary id.
    pub fn temporary() -> Self {
        ProductId::Temporary(Uuid::new_v4())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, ProductId::Temporary(_))
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductId::Temporary(uuid) => write!(f, "tmp-{uuid}"),
            ProductId::Persisted(id) => write!(f, "{id}"),
        }
    }
}

impl Serialize for ProductId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ProductId::Persisted(id) => serializer.serialize_u64(*id),
            ProductId::Temporary(uuid) => serializer.serialize_str(&format!("tmp-{uuid}")),
        }
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Num(u64),
            Str(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Num(id) => Ok(ProductId::Persisted(id)),
            Repr::Str(s) => {
                let raw = s.strip_prefix("tmp-").ok_or_else(|| {
                    serde::de::Error::custom(format!("invalid product id '{s}'"))
                })?;
                let uuid = raw.parse::<Uuid>().map_err(serde::de::Error::custom)?;
                Ok(ProductId::Temporary(uuid))
            }
        }
    }
}

/// A catalog product as held in the client-side cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Product {
    /// Synthesize the speculative placeholder inserted during an optimistic
    /// create, before the server has confirmed the write.
    pub fn placeholder(input: &NewProduct, id: ProductId) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            price: input.price,
            thumbnail: Some(PLACEHOLDER_THUMBNAIL.to_string()),
            description: None,
            images: None,
        }
    }
}

/// One page of catalog results, mirroring the remote list response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl ProductPage {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            skip: 0,
            limit: 0,
        }
    }
}

/// User input for a product about to be created.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,

    #[validate(range(exclusive_min = 0.0, message = "price must be greater than zero"))]
    pub price: f64,
}

impl NewProduct {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
        }
    }

    /// Full client-side validation, run before any mutation begins.
    ///
    /// The derive covers emptiness and positivity; whitespace-only titles and
    /// non-finite prices are rejected here.
    pub fn validate_for_submit(&self) -> AppResult<()> {
        self.validate()?;

        if self.title.trim().is_empty() {
            return Err(AppError::validation("title", "title must not be empty"));
        }
        if !self.price.is_finite() {
            return Err(AppError::validation("price", "price must be a finite number"));
        }

        Ok(())
    }
}
