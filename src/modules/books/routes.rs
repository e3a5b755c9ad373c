//! HTTP handlers for the book pages and the grid endpoint.

use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use bookshelf_http::{
    error::AppError,
    flash::{FlashMessage, FlashMessages},
    locale::RequestLocale,
};
use bookshelf_kernel::{settings::BookSettings, MessageSource};
use serde::Deserialize;
use tower_sessions::Session;

use super::grid::{BookGrid, GridParams};
use super::messages::{SAVE_FAIL, SAVE_SUCCESS};
use super::models::{BookDraft, BookForm};
use super::service::BookService;
use super::views::{render, BookRow, CreateView, FormView, ListView, ShowView, UpdateView};

/// Shared state of the book handlers.
#[derive(Clone)]
pub struct BooksState {
    pub service: BookService,
    pub messages: Arc<dyn MessageSource>,
    pub paging: BookSettings,
}

pub fn router(state: BooksState) -> Router {
    Router::new()
        .route("/books", get(list_or_create_form).post(create))
        .route("/books/listgrid", get(list_grid))
        .route("/books/{id}", get(show_or_update_form).post(update))
        .with_state(state)
}

/// Presence of the `form` query flag, as in `/books/3?form`.
#[derive(Debug, Default, Deserialize)]
struct FormFlag {
    form: Option<String>,
}

impl FormFlag {
    fn is_set(&self) -> bool {
        self.form.is_some()
    }
}

/// Numeric book id from the path; anything else is a 400 in the error envelope.
struct BookId(i64);

impl<S> FromRequestParts<S> for BookId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::invalid_parameter("id", rejection.body_text()))?;
        Ok(Self(id))
    }
}

async fn list_or_create_form(
    State(state): State<BooksState>,
    Query(flag): Query<FormFlag>,
    flash: FlashMessages,
) -> Result<Html<String>, AppError> {
    if flag.is_set() {
        return render(&CreateView {
            notices: flash.into_messages(),
            form: FormView::new("/books?form", BookForm::default()),
        });
    }

    let books = state.service.find_all().await?;
    render(&ListView {
        notices: flash.into_messages(),
        books: books.iter().map(BookRow::from).collect(),
    })
}

async fn show_or_update_form(
    State(state): State<BooksState>,
    BookId(id): BookId,
    Query(flag): Query<FormFlag>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let book = state.service.find_by_id(id).await?;
    // Pending notices stay queued when the book is missing.
    let flash = FlashMessages::take(&session).await?;

    if flag.is_set() {
        return render(&UpdateView {
            notices: flash.into_messages(),
            book_id: book.id,
            form: FormView::new(format!("/books/{id}?form"), BookForm::from(&book)),
        });
    }

    render(&ShowView {
        notices: flash.into_messages(),
        book: BookRow::from(&book),
    })
}

async fn create(
    State(state): State<BooksState>,
    locale: RequestLocale,
    session: Session,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    match form.validate(None) {
        Ok(draft) => save_and_redirect(&state, &locale, &session, draft).await,
        Err(errors) => {
            tracing::debug!(errors = errors.len(), "rejected new book");
            let view = CreateView {
                notices: vec![save_failed(&state, &locale)],
                form: FormView::new("/books?form", form).with_errors(errors),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&view)?).into_response())
        }
    }
}

async fn update(
    State(state): State<BooksState>,
    BookId(id): BookId,
    locale: RequestLocale,
    session: Session,
    Form(form): Form<BookForm>,
) -> Result<Response, AppError> {
    // Unknown ids are a 404 even when the submission is invalid.
    state.service.find_by_id(id).await?;

    match form.validate(Some(id)) {
        Ok(draft) => save_and_redirect(&state, &locale, &session, draft).await,
        Err(errors) => {
            tracing::debug!(book_id = id, errors = errors.len(), "rejected book update");
            let view = UpdateView {
                notices: vec![save_failed(&state, &locale)],
                book_id: id,
                form: FormView::new(format!("/books/{id}?form"), form).with_errors(errors),
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&view)?).into_response())
        }
    }
}

async fn save_and_redirect(
    state: &BooksState,
    locale: &RequestLocale,
    session: &Session,
    draft: BookDraft,
) -> Result<Response, AppError> {
    let book = state.service.save(draft).await?;

    let notice = state.messages.message(SAVE_SUCCESS, locale.as_deref());
    FlashMessages::push(session, FlashMessage::success(notice)).await?;

    Ok(Redirect::to(&format!("/books/{}", book.id)).into_response())
}

fn save_failed(state: &BooksState, locale: &RequestLocale) -> FlashMessage {
    FlashMessage::error(state.messages.message(SAVE_FAIL, locale.as_deref()))
}

async fn list_grid(
    State(state): State<BooksState>,
    params: Result<Query<GridParams>, QueryRejection>,
) -> Result<Json<BookGrid>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

    let request = params.to_page_request(&state.paging)?;
    let page = state.service.find_page(request).await?;
    tracing::debug!(
        page = page.number + 1,
        rows = page.content.len(),
        total = page.total_elements,
        "served book grid"
    );

    Ok(Json(BookGrid::from(page)))
}
