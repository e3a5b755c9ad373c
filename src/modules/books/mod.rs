pub mod entity;
pub mod error;
pub mod grid;
pub mod messages;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, MessageSource, Migration, Module};
use sea_orm::DatabaseConnection;

use repository::SeaOrmBookRepository;
use routes::BooksState;
use service::BookService;

/// Book catalog: HTML pages plus the JSON grid endpoint.
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(state: BooksState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let books = self.state.service.count().await?;
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/books/listgrid": {
                    "get": {
                        "summary": "Page of books for the grid widget",
                        "tags": ["Books"],
                        "parameters": [
                            {
                                "name": "page",
                                "in": "query",
                                "required": true,
                                "description": "1-based page number",
                                "schema": { "type": "integer", "minimum": 1 }
                            },
                            {
                                "name": "rows",
                                "in": "query",
                                "required": false,
                                "description": "Page size",
                                "schema": { "type": "integer", "minimum": 1 }
                            },
                            {
                                "name": "sidx",
                                "in": "query",
                                "required": false,
                                "description": "Sort field",
                                "schema": {
                                    "type": "string",
                                    "enum": ["id", "category_name", "isbn", "title", "publisher", "price"]
                                }
                            },
                            {
                                "name": "sord",
                                "in": "query",
                                "required": false,
                                "description": "Sort order",
                                "schema": { "type": "string", "enum": ["asc", "desc"] }
                            }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookGrid" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Invalid paging or sort parameters",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/books": {
                    "get": {
                        "summary": "Book list page, or the create form with `?form`",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "HTML page", "content": { "text/html": { "schema": { "type": "string" } } } }
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "responses": {
                            "303": { "description": "Redirect to the new book" },
                            "422": { "description": "Form with validation errors", "content": { "text/html": { "schema": { "type": "string" } } } }
                        }
                    }
                },
                "/books/{id}": {
                    "parameters": [
                        {
                            "name": "id",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "integer", "format": "int64" }
                        }
                    ],
                    "get": {
                        "summary": "Book detail page, or the update form with `?form`",
                        "tags": ["Books"],
                        "responses": {
                            "200": { "description": "HTML page", "content": { "text/html": { "schema": { "type": "string" } } } },
                            "404": {
                                "description": "Unknown book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Update a book",
                        "tags": ["Books"],
                        "responses": {
                            "303": { "description": "Redirect to the book" },
                            "404": {
                                "description": "Unknown book",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": { "description": "Form with validation errors", "content": { "text/html": { "schema": { "type": "string" } } } }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "category_name": { "type": "string" },
                            "isbn": { "type": "string" },
                            "title": { "type": "string" },
                            "publisher": { "type": "string" },
                            "price": { "type": "number", "format": "double" }
                        },
                        "required": ["id", "category_name", "isbn", "title", "publisher", "price"]
                    },
                    "BookGrid": {
                        "type": "object",
                        "properties": {
                            "currentPage": { "type": "integer" },
                            "totalPages": { "type": "integer" },
                            "totalRecords": { "type": "integer" },
                            "rows": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Book" }
                            }
                        },
                        "required": ["currentPage", "totalPages", "totalRecords", "rows"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_create_book",
                up: r#"
                    CREATE TABLE IF NOT EXISTS book (
                        id            INTEGER PRIMARY KEY AUTOINCREMENT,
                        category_name TEXT NOT NULL DEFAULT '',
                        isbn          TEXT NOT NULL DEFAULT '',
                        title         TEXT NOT NULL,
                        publisher     TEXT NOT NULL DEFAULT '',
                        price         REAL NOT NULL DEFAULT 0
                    );
                    "#,
            },
            Migration {
                id: "002_book_title_index",
                up: "CREATE INDEX IF NOT EXISTS book_title_idx ON book (title);",
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create the books module over `db`.
pub fn create_module(
    db: DatabaseConnection,
    messages: Arc<dyn MessageSource>,
    settings: &Settings,
) -> Arc<dyn Module> {
    let repository = Arc::new(SeaOrmBookRepository::new(db));
    Arc::new(BooksModule::new(BooksState {
        service: BookService::new(repository),
        messages,
        paging: settings.books.clone(),
    }))
}
