//! HTML views for the book pages.

use askama::Template;
use axum::response::Html;
use bookshelf_http::{error::AppError, flash::FlashMessage};

use super::models::{Book, BookForm, FieldError};

/// Book as displayed in tables and detail pages.
#[derive(Debug, Clone)]
pub struct BookRow {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    pub category_name: String,
    pub publisher: String,
    pub price: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            isbn: book.isbn.clone(),
            category_name: book.category_name.clone(),
            publisher: book.publisher.clone(),
            price: format!("{:.2}", book.price),
        }
    }
}

/// Submitted or pre-filled form values plus their errors.
#[derive(Debug, Clone)]
pub struct FormView {
    pub action: String,
    pub values: BookForm,
    pub errors: Vec<FieldError>,
}

impl FormView {
    pub fn new(action: impl Into<String>, values: BookForm) -> Self {
        Self {
            action: action.into(),
            values,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

#[derive(Template)]
#[template(path = "books/list.html")]
pub struct ListView {
    pub notices: Vec<FlashMessage>,
    pub books: Vec<BookRow>,
}

#[derive(Template)]
#[template(path = "books/show.html")]
pub struct ShowView {
    pub notices: Vec<FlashMessage>,
    pub book: BookRow,
}

#[derive(Template)]
#[template(path = "books/create.html")]
pub struct CreateView {
    pub notices: Vec<FlashMessage>,
    pub form: FormView,
}

#[derive(Template)]
#[template(path = "books/update.html")]
pub struct UpdateView {
    pub notices: Vec<FlashMessage>,
    pub book_id: i64,
    pub form: FormView,
}

pub fn render<T: Template>(view: &T) -> Result<Html<String>, AppError> {
    view.render()
        .map(Html)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to render view: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book {
            id: 7,
            category_name: "Fiction".to_string(),
            isbn: "978-0-441-17271-9".to_string(),
            title: "Dune <1965>".to_string(),
            publisher: "Ace".to_string(),
            price: 9.5,
        }
    }

    #[test]
    fn show_escapes_and_formats() {
        let html = render(&ShowView {
            notices: vec![FlashMessage::success("Book saved.")],
            book: BookRow::from(&book()),
        })
        .unwrap()
        .0;

        assert!(html.contains("Dune &lt;1965&gt;"));
        assert!(html.contains("9.50"));
        assert!(html.contains("flash-success"));
        assert!(html.contains("Book saved."));
    }

    #[test]
    fn update_form_marks_invalid_fields() {
        let form = FormView::new("/books/7?form", BookForm::from(&book())).with_errors(vec![
            FieldError {
                field: "title",
                message: "Title is required".to_string(),
            },
        ]);
        assert!(form.has_error("title"));
        assert!(!form.has_error("price"));

        let html = render(&UpdateView {
            notices: Vec::new(),
            book_id: 7,
            form,
        })
        .unwrap()
        .0;

        assert!(html.contains(r#"action="/books/7?form""#));
        assert!(html.contains("Title is required"));
        assert!(!html.contains("flash-"));
    }

    #[test]
    fn list_links_every_book() {
        let html = render(&ListView {
            notices: Vec::new(),
            books: vec![BookRow::from(&book())],
        })
        .unwrap()
        .0;

        assert!(html.contains(r#"href="/books/7""#));
        assert!(html.contains(r#"href="/books?form""#));
    }
}
