//! Product form validation
//!
//! Validation is a pure step: it turns a raw submitted form into a
//! [`ValidatedProduct`] or a field-by-field [`ValidationErrors`] report, and
//! never touches a store. Every rule runs for every field so the caller gets
//! the complete list of problems at once.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Largest accepted image, in kilobytes
pub const MAX_IMAGE_KILOBYTES: usize = 2048;
/// Minimum title length in characters
pub const MIN_TITLE_CHARS: usize = 5;
/// Minimum description length in characters
pub const MIN_DESCRIPTION_CHARS: usize = 10;

/// A file part received from the client, before any checks
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    /// Filename as sent by the client
    pub file_name: Option<String>,
    /// Content type as sent by the client (informational only)
    pub content_type: Option<String>,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// Raw product form as submitted; every field may be missing
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    /// Uploaded image part
    pub image: Option<UploadedFile>,
    /// Title text
    pub title: Option<String>,
    /// Description text
    pub description: Option<String>,
    /// Price as typed (parsed during validation)
    pub price: Option<String>,
    /// Stock as typed (parsed during validation)
    pub stock: Option<String>,
}

/// Whether the image part must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRule {
    /// Creating a product: an image is mandatory
    Required,
    /// Updating a product: an image replaces the current one when present
    Optional,
}

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// JPEG (`.jpg` / `.jpeg`)
    Jpeg,
    /// PNG
    Png,
}

impl ImageFormat {
    /// File extension used for stored files of this format
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

/// What the leading bytes of an upload say it is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sniffed {
    Accepted(ImageFormat),
    /// An image, but not one of the accepted formats (gif, webp, bmp)
    OtherImage,
    NotImage,
}

fn sniff(bytes: &[u8]) -> Sniffed {
    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Sniffed::Accepted(ImageFormat::Jpeg)
    } else if bytes.starts_with(PNG) {
        Sniffed::Accepted(ImageFormat::Png)
    } else if bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
        || bytes.starts_with(b"BM")
        || (bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP".as_slice()))
    {
        Sniffed::OtherImage
    } else {
        Sniffed::NotImage
    }
}

/// An image that passed the format and size rules
#[derive(Debug, Clone, PartialEq)]
pub struct ValidImage {
    /// Detected format
    pub format: ImageFormat,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// A product form that passed every rule
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProduct {
    /// `None` only when the image was optional and not supplied
    pub image: Option<ValidImage>,
    /// Trimmed title
    pub title: String,
    /// Trimmed description
    pub description: String,
    /// Parsed price
    pub price: f64,
    /// Parsed stock
    pub stock: f64,
}

/// Field-level validation failures, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut messages = self.0.values().flatten();
        match messages.next() {
            Some(first) => {
                write!(f, "{first}")?;
                let rest = messages.count();
                if rest > 0 {
                    let plural = if rest == 1 { "" } else { "s" };
                    write!(f, " (and {rest} more error{plural})")?;
                }
                Ok(())
            }
            None => write!(f, "The given data was invalid."),
        }
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    fn add(&mut self, field: &str, message: String) {
        self.0.entry(field.to_string()).or_default().push(message);
    }

    /// Whether any rule failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the given field failed at least one rule
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for a field
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Names of the fields that failed
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

fn required_text(
    field: &str,
    value: Option<String>,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => Some(v),
        None => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

fn min_chars(
    field: &str,
    value: Option<String>,
    min: usize,
    errors: &mut ValidationErrors,
) -> String {
    let value = required_text(field, value, errors).unwrap_or_default();
    if !value.is_empty() && value.chars().count() < min {
        errors.add(
            field,
            format!("The {field} field must be at least {min} characters."),
        );
    }
    value
}

fn number(field: &str, raw: &str, errors: &mut ValidationErrors) -> Option<f64> {
    let parsed = raw.parse::<f64>().ok().filter(|n| n.is_finite());
    if parsed.is_none() {
        errors.add(field, format!("The {field} field must be a number."));
    }
    parsed
}

fn validate_image(file: UploadedFile, errors: &mut ValidationErrors) -> Option<ValidImage> {
    let mut valid = true;
    let sniffed = sniff(&file.bytes);

    if sniffed == Sniffed::NotImage {
        errors.add("image", "The image field must be an image.".to_string());
        valid = false;
    }
    let format = match sniffed {
        Sniffed::Accepted(format) => Some(format),
        Sniffed::OtherImage | Sniffed::NotImage => {
            errors.add(
                "image",
                "The image field must be a file of type: jpeg, jpg, png.".to_string(),
            );
            None
        }
    };
    if file.bytes.len() > MAX_IMAGE_KILOBYTES * 1024 {
        errors.add(
            "image",
            format!("The image field must not be greater than {MAX_IMAGE_KILOBYTES} kilobytes."),
        );
        valid = false;
    }

    match format {
        Some(format) if valid => Some(ValidImage {
            format,
            bytes: file.bytes,
        }),
        _ => None,
    }
}

/// Check a submitted product form against the catalog rules
///
/// # Arguments
/// * `form` - Raw submitted fields
/// * `image_rule` - Whether the image is mandatory (create) or optional (update)
///
/// # Returns
/// * `Ok(ValidatedProduct)` - All rules passed
/// * `Err(ValidationErrors)` - One or more fields failed; nothing was stored
pub fn validate(
    form: ProductForm,
    image_rule: ImageRule,
) -> Result<ValidatedProduct, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let image = match form.image {
        Some(file) => validate_image(file, &mut errors),
        None => {
            if image_rule == ImageRule::Required {
                errors.add("image", "The image field is required.".to_string());
            }
            None
        }
    };

    let title = min_chars("title", form.title, MIN_TITLE_CHARS, &mut errors);
    let description = min_chars(
        "description",
        form.description,
        MIN_DESCRIPTION_CHARS,
        &mut errors,
    );

    let price = required_text("price", form.price, &mut errors)
        .and_then(|raw| number("price", &raw, &mut errors));
    let stock = required_text("stock", form.stock, &mut errors)
        .and_then(|raw| number("stock", &raw, &mut errors));

    match (price, stock) {
        (Some(price), Some(stock)) if errors.is_empty() => Ok(ValidatedProduct {
            image,
            title,
            description,
            price,
            stock,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(b"rest of the png");
        bytes
    }

    fn valid_form() -> ProductForm {
        ProductForm {
            image: Some(UploadedFile {
                file_name: Some("photo.png".to_string()),
                content_type: Some("image/png".to_string()),
                bytes: png_bytes(),
            }),
            title: Some("Coffee grinder".to_string()),
            description: Some("Burr grinder with 40 settings".to_string()),
            price: Some("129.90".to_string()),
            stock: Some("12".to_string()),
        }
    }

    #[test]
    fn test_valid_form_passes() {
        let validated = validate(valid_form(), ImageRule::Required).expect("form should pass");
        assert_eq!(validated.title, "Coffee grinder");
        assert_eq!(validated.price, 129.90);
        assert_eq!(validated.stock, 12.0);
        let image = validated.image.expect("image should be kept");
        assert_eq!(image.format, ImageFormat::Png);
    }

    #[test]
    fn test_short_title_is_rejected() {
        let mut form = valid_form();
        form.title = Some("abcd".to_string());

        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["title"]);
        assert_eq!(
            errors.get("title"),
            ["The title field must be at least 5 characters.".to_string()]
        );
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut form = valid_form();
        // 5 characters, 10 bytes
        form.title = Some("ñññññ".to_string());
        assert!(validate(form, ImageRule::Required).is_ok());
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let errors = validate(ProductForm::default(), ImageRule::Required).unwrap_err();
        for field in ["image", "title", "description", "price", "stock"] {
            assert_eq!(
                errors.get(field),
                [format!("The {field} field is required.")],
                "field {field}"
            );
        }
    }

    #[test]
    fn test_whitespace_only_counts_as_missing() {
        let mut form = valid_form();
        form.description = Some("   ".to_string());
        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert_eq!(
            errors.get("description"),
            ["The description field is required.".to_string()]
        );
    }

    #[test]
    fn test_image_optional_on_update() {
        let mut form = valid_form();
        form.image = None;
        let validated = validate(form, ImageRule::Optional).expect("image is optional");
        assert!(validated.image.is_none());
    }

    #[test]
    fn test_non_image_upload() {
        let mut form = valid_form();
        form.image = Some(UploadedFile {
            file_name: Some("notes.txt".to_string()),
            content_type: Some("text/plain".to_string()),
            bytes: b"plain text".to_vec(),
        });
        let errors = validate(form, ImageRule::Optional).unwrap_err();
        assert_eq!(errors.get("image").len(), 2);
        assert!(errors.get("image")[0].contains("must be an image"));
    }

    #[test]
    fn test_gif_is_an_image_but_not_accepted() {
        let mut form = valid_form();
        form.image = Some(UploadedFile {
            bytes: b"GIF89a....".to_vec(),
            ..UploadedFile::default()
        });
        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert_eq!(
            errors.get("image"),
            ["The image field must be a file of type: jpeg, jpg, png.".to_string()]
        );
    }

    #[test]
    fn test_content_type_is_not_trusted() {
        let mut form = valid_form();
        form.image = Some(UploadedFile {
            file_name: Some("fake.jpg".to_string()),
            content_type: Some("image/jpeg".to_string()),
            bytes: b"<?php echo 1; ?>".to_vec(),
        });
        assert!(validate(form, ImageRule::Required).is_err());
    }

    #[test]
    fn test_oversize_image() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        bytes.resize(MAX_IMAGE_KILOBYTES * 1024 + 1, 0);
        let mut form = valid_form();
        form.image = Some(UploadedFile {
            bytes,
            ..UploadedFile::default()
        });

        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert_eq!(
            errors.get("image"),
            ["The image field must not be greater than 2048 kilobytes.".to_string()]
        );
    }

    #[test]
    fn test_image_at_limit_is_accepted() {
        let mut bytes = vec![0xFF, 0xD8, 0xFF];
        bytes.resize(MAX_IMAGE_KILOBYTES * 1024, 0);
        let mut form = valid_form();
        form.image = Some(UploadedFile {
            bytes,
            ..UploadedFile::default()
        });

        let validated = validate(form, ImageRule::Required).expect("exactly 2048 KB is allowed");
        assert_eq!(
            validated.image.map(|i| i.format),
            Some(ImageFormat::Jpeg)
        );
    }

    #[test]
    fn test_numeric_fields() {
        let mut form = valid_form();
        form.price = Some("cheap".to_string());
        form.stock = Some("a few".to_string());
        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert_eq!(errors.get("price"), ["The price field must be a number.".to_string()]);
        assert_eq!(errors.get("stock"), ["The stock field must be a number.".to_string()]);

        let mut form = valid_form();
        form.price = Some("NaN".to_string());
        form.stock = Some("inf".to_string());
        let errors = validate(form, ImageRule::Required).unwrap_err();
        assert!(errors.has("price"));
        assert!(errors.has("stock"));
    }

    #[test]
    fn test_fractional_stock_and_negative_price_are_accepted() {
        let mut form = valid_form();
        form.price = Some("-5".to_string());
        form.stock = Some("1.5".to_string());

        let validated = validate(form, ImageRule::Required).expect("any finite number passes");
        assert_eq!(validated.price, -5.0);
        assert_eq!(validated.stock, 1.5);
    }

    #[test]
    fn test_display_summarizes() {
        let errors = validate(ProductForm::default(), ImageRule::Optional).unwrap_err();
        assert_eq!(
            errors.to_string(),
            "The description field is required. (and 3 more errors)"
        );
    }
}
