pub mod models;
pub mod routes;
pub mod service;

use async_trait::async_trait;
use axum::Router;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::json;

use crate::catalog::Catalog;

/// Authors module: paginated cached listing plus admin-gated writes
pub struct AuthorsModule {
    catalog: Catalog,
}

impl AuthorsModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            cache_tag = self.catalog.authors_list().tag(),
            cache_ttl_secs = self.catalog.authors_list().ttl().as_secs(),
            "authors module initialized"
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
                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/ErrorResponse" } } }
            })
        };
        let id_param = json!({
            "name": "id", "in": "path", "required": true,
            "schema": { "type": "integer", "format": "int64" }
        });
        let author_body = json!({
            "required": true,
            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/AuthorInput" } } }
        });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors (cached per page)",
                        "tags": ["Authors"],
                        "parameters": [
                            { "name": "page", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "limit", "in": "query", "required": false, "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of authors",
                                "headers": { "x-cache": { "schema": { "type": "string", "enum": ["HIT", "MISS"] } } },
                                "content": {
                                    "application/json": {
                                        "schema": { "type": "array", "items": { "$ref": "#/components/schemas/Author" } }
                                    }
                                }
                            },
                            "400": error("Invalid page or limit")
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": ["Authors"],
                        "requestBody": author_body.clone(),
                        "responses": {
                            "201": {
                                "description": "Author created",
                                "headers": { "Location": { "schema": { "type": "string", "format": "uri" } } },
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Author" } } }
                            },
                            "400": error("Validation error"),
                            "403": error("Admin role required")
                        }
                    }
                },
                "/{id}": {
                    "get": {
                        "summary": "Get an author",
                        "tags": ["Authors"],
                        "parameters": [id_param.clone()],
                        "responses": {
                            "200": {
                                "description": "Author",
                                "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Author" } } }
                            },
                            "404": error("Author not found")
                        }
                    },
                    "put": {
                        "summary": "Update an author; listed books are added",
                        "tags": ["Authors"],
                        "parameters": [id_param.clone()],
                        "requestBody": author_body,
                        "responses": {
                            "200": { "description": "Author updated" },
                            "400": error("Validation error"),
                            "403": error("Admin role required"),
                            "404": error("Author not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author; its books are kept",
                        "tags": ["Authors"],
                        "parameters": [id_param],
                        "responses": {
                            "204": { "description": "Author deleted" },
                            "403": error("Admin role required"),
                            "404": error("Author not found")
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Authors health check",
                        "tags": ["Authors"],
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
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string" },
                            "lastName": { "type": "string" },
                            "books": { "type": "array", "items": { "$ref": "#/components/schemas/AuthorBook" } }
                        },
                        "required": ["id", "firstName", "lastName", "books"]
                    },
                    "AuthorBook": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "title": { "type": "string" },
                            "coverText": { "type": ["string", "null"] }
                        },
                        "required": ["id", "title"]
                    },
                    "AuthorInput": {
                        "type": "object",
                        "properties": {
                            "firstName": { "type": "string", "maxLength": 255 },
                            "lastName": { "type": "string", "maxLength": 255 },
                            "idBook": {
                                "description": "Book id or list of book ids to attach; unknown ids are skipped",
                                "oneOf": [
                                    { "type": "integer", "format": "int64" },
                                    { "type": "array", "items": { "type": "integer", "format": "int64" } }
                                ]
                            }
                        }
                    }
                }
            }
        }))
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

/// Create a new instance of the authors module
pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(catalog))
}
