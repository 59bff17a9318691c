pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use crate::catalog::Catalog;

/// Books module: paginated cached listing plus admin-gated writes
pub struct BooksModule {
    catalog: Catalog,
}

impl BooksModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache_tag = self.catalog.books_list().tag(),
            cache_ttl_secs = self.catalog.books_list().ttl().as_secs(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let error = |description: &str| {
            json!({
                "description": description,
                "content": {
                    "application/json": {
                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                    }
                }
            })
        };
        let book = json!({
            "application/json": { "schema": { "$ref": "#/components/schemas/Book" } }
        });
        let id_param = json!({
            "name": "id",
            "in": "path",
            "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let book_body = json!({
            "required": true,
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/BookInput" } }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books (cached per page)",
                        "tags": ["Books"],
                        "parameters": [
                            { "name": "page", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of books",
                                "headers": {
                                    "x-cache": { "schema": { "type": "string", "enum": ["HIT", "MISS"] } }
                                },
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": { "$ref": "#/components/schemas/Book" }
                                        }
                                    }
                                }
                            },
                            "400": error("Invalid page or limit")
                        }
                    },
                    "post": {
                        "summary": "Create a book",
                        "tags": ["Books"],
                        "requestBody": book_body.clone(),
                        "responses": {
                            "201": {
                                "description": "Book created",
                                "headers": {
                                    "Location": { "schema": { "type": "string", "format": "uri" } }
                                },
                                "content": book.clone()
                            },
                            "400": error("Validation error"),
                            "403": error("Admin role required")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get a book",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": { "description": "Book", "content": book },
                            "404": error("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Update a book; idAuthor replaces its author",
                        "tags": ["Books"],
                        "parameters": [id_param.clone()],
                        "requestBody": book_body,
                        "responses": {
                            "204": { "description": "Book updated" },
                            "400": error("Validation error"),
                            "403": error("Admin role required"),
                            "404": error("Book not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book",
                        "tags": ["Books"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Book deleted" },
                            "403": error("Admin role required"),
                            "404": error("Book not found")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Books health check",
                        "tags": ["Books"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": { "text/plain": { "schema": { "type": "string" } } }
                            }
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
                            "title": { "type": "string" },
                            "coverText": { "type": ["string", "null"] },
                            "author": {
                                "oneOf": [
                                    { "$ref": "#/components/schemas/BookAuthor" },
                                    { "type": "null" }
                                ]
                            }
                        },
                        "required": ["id", "title"]
                    },
                    "BookAuthor": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "maxLength": 255 },
                            "coverText": { "type": "string", "maxLength": 255 },
                            "idAuthor": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Author to own the book; unknown ids leave it without one"
                            }
                        }
                    }
                }
            }
        }))
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

/// Create a new instance of the books module
pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(catalog))
}
