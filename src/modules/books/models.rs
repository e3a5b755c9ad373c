use serde::{Deserialize, Serialize};

pub use super::entity::Model as Book;

const MAX_TITLE_LEN: usize = 255;
const MAX_PUBLISHER_LEN: usize = 255;
const MAX_CATEGORY_LEN: usize = 100;
const MAX_ISBN_LEN: usize = 20;

/// A book that may not be persisted yet; `id` is `None` until the first save.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BookDraft {
    pub id: Option<i64>,
    pub category_name: String,
    pub isbn: String,
    pub title: String,
    pub publisher: String,
    pub price: f64,
}

/// Raw form submission for the create and update forms.
///
/// Every field is kept as text so malformed input becomes a field error
/// instead of a rejected request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookForm {
    pub category_name: String,
    pub isbn: String,
    pub title: String,
    pub publisher: String,
    pub price: String,
}

/// Validation failure for a single form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl BookForm {
    /// Bind the submission to a draft for `id`, collecting every field error.
    pub fn validate(&self, id: Option<i64>) -> Result<BookDraft, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        } else if title.chars().count() > MAX_TITLE_LEN {
            errors.push(FieldError::new(
                "title",
                format!("Title must be at most {MAX_TITLE_LEN} characters"),
            ));
        }

        let isbn = self.isbn.trim();
        if isbn.chars().count() > MAX_ISBN_LEN {
            errors.push(FieldError::new(
                "isbn",
                format!("ISBN must be at most {MAX_ISBN_LEN} characters"),
            ));
        } else if !isbn
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '-' | ' ' | 'X' | 'x'))
        {
            errors.push(FieldError::new(
                "isbn",
                "ISBN may only contain digits, hyphens, spaces and X",
            ));
        }

        let category_name = self.category_name.trim();
        if category_name.chars().count() > MAX_CATEGORY_LEN {
            errors.push(FieldError::new(
                "category_name",
                format!("Category must be at most {MAX_CATEGORY_LEN} characters"),
            ));
        }

        let publisher = self.publisher.trim();
        if publisher.chars().count() > MAX_PUBLISHER_LEN {
            errors.push(FieldError::new(
                "publisher",
                format!("Publisher must be at most {MAX_PUBLISHER_LEN} characters"),
            ));
        }

        let price = match self.price.trim().parse::<f64>() {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            Ok(_) => {
                errors.push(FieldError::new("price", "Price must be a non-negative amount"));
                0.0
            }
            Err(_) if self.price.trim().is_empty() => {
                errors.push(FieldError::new("price", "Price is required"));
                0.0
            }
            Err(_) => {
                errors.push(FieldError::new("price", "Price must be a number"));
                0.0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(BookDraft {
            id,
            category_name: category_name.to_string(),
            isbn: isbn.to_string(),
            title: title.to_string(),
            publisher: publisher.to_string(),
            price,
        })
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            category_name: book.category_name.clone(),
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            publisher: book.publisher.clone(),
            price: book.price.to_string(),
        }
    }
}
