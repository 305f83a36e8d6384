//! What the catalog hands to the presentation layer
//!
//! Every request ends either in a named view with data bindings or in a
//! redirect carrying a one-time flash message. Turning these into HTTP
//! responses is the job of `api::render`.

use crate::catalog::models::{Page, Product};
use crate::catalog::service::IMAGE_NAMESPACE;
use serde_json::{json, Value};

/// Path of the product listing, target of every successful mutation
pub const PRODUCTS_INDEX: &str = "/products";

/// One-time confirmation shown after a redirect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    /// A product was created
    Stored,
    /// A product was updated
    Updated,
    /// A product was deleted
    Deleted,
}

impl Flash {
    /// Stable key carried between the redirect and the next request
    pub fn key(&self) -> &'static str {
        match self {
            Flash::Stored => "stored",
            Flash::Updated => "updated",
            Flash::Deleted => "deleted",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> &'static str {
        match self {
            Flash::Stored => "Product saved successfully!",
            Flash::Updated => "Product updated successfully!",
            Flash::Deleted => "Product deleted successfully!",
        }
    }

    /// Parse a key produced by [`Flash::key`]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "stored" => Some(Flash::Stored),
            "updated" => Some(Flash::Updated),
            "deleted" => Some(Flash::Deleted),
            _ => None,
        }
    }
}

/// Outcome of a catalog request
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// Render a named view with data bindings
    View {
        /// View name (e.g. `products.index`)
        name: &'static str,
        /// Data bound into the view
        data: Value,
    },
    /// Navigate elsewhere with a flash message
    Redirect {
        /// Target path
        to: String,
        /// Message for the next page
        flash: Flash,
    },
}

/// Public URL of a stored product image
pub fn image_url(product: &Product) -> String {
    format!("/storage/{}/{}", IMAGE_NAMESPACE, product.image)
}

impl Presentation {
    /// Static landing page
    pub fn welcome() -> Self {
        Presentation::View {
            name: "welcome",
            data: json!({}),
        }
    }

    /// Product listing, with the flash message left by the previous redirect
    pub fn product_index(page: Page<Product>, flash: Option<Flash>) -> Self {
        let mut data = json!({ "products": page });
        if let Some(flash) = flash {
            data["success"] = json!(flash.message());
        }
        Presentation::View {
            name: "products.index",
            data,
        }
    }

    /// Empty creation form
    pub fn create_form() -> Self {
        Presentation::View {
            name: "products.create",
            data: json!({}),
        }
    }

    /// Single product page
    pub fn product_show(product: Product) -> Self {
        Presentation::View {
            name: "products.show",
            data: json!({ "image_url": image_url(&product), "product": product }),
        }
    }

    /// Edit form pre-filled with the product
    pub fn edit_form(product: Product) -> Self {
        Presentation::View {
            name: "products.edit",
            data: json!({ "image_url": image_url(&product), "product": product }),
        }
    }

    /// Back to the listing after a successful mutation
    pub fn to_index(flash: Flash) -> Self {
        Presentation::Redirect {
            to: PRODUCTS_INDEX.to_string(),
            flash,
        }
    }
}
