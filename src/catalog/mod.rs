// Product catalog module
// Models, form validation, the product service and its presentation outcomes

pub mod models;
pub mod presentation;
pub mod service;
pub mod validation;

pub use models::{NewProduct, Page, Product, ProductChanges, ProductId, PER_PAGE};
pub use presentation::{Flash, Presentation};
pub use service::{ProductService, IMAGE_NAMESPACE};
pub use validation::{ImageRule, ProductForm, UploadedFile, ValidationErrors};
