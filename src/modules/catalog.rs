use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use bookshelf_http::AppError;
use bookshelf_kernel::{InitCtx, Module};
use serde_json::{json, Value};

use crate::gateway::Gateway;

/// Mounts the operation gateway over HTTP: `POST /api/catalog`.
pub struct CatalogModule {
    gateway: Arc<Gateway>,
}

impl CatalogModule {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            books_table = %ctx.settings.database.books_table,
            authors_table = %ctx.settings.database.authors_table,
            "catalog module initialized"
        );
        if ctx.settings.auth.api_key.is_none() {
            tracing::warn!(
                module = self.name(),
                "no API key configured; every call will be rejected"
            );
        }
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", post(dispatch))
            .route("/health", get(health_check))
            .with_state(self.gateway.clone())
    }

    fn openapi(&self) -> Option<Value> {
        let error = json!({
            "description": "Error envelope",
            "content": {
                "application/json": {
                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                }
            }
        });

        Some(json!({
            "paths": {
                "/": {
                    "post": {
                        "summary": "Invoke a catalog operation",
                        "tags": ["Catalog"],
                        "parameters": [{
                            "name": "x-api-key",
                            "in": "header",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/OperationRequest" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Operation result",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "object",
                                            "properties": { "data": {} },
                                            "required": ["data"]
                                        }
                                    }
                                }
                            },
                            "400": error.clone(),
                            "401": error.clone(),
                            "404": error.clone(),
                            "409": error.clone(),
                            "422": error.clone(),
                            "500": error.clone()
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Catalog health check",
                        "tags": ["Catalog"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": { "schema": { "type": "string" } }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "OperationRequest": {
                        "type": "object",
                        "properties": {
                            "operation": {
                                "type": "string",
                                "enum": [
                                    "health", "listBooks", "getBook", "searchBooks",
                                    "createBook", "createBooks", "updateBook", "deleteBook",
                                    "deleteAllBooks", "listAuthors", "getAuthor",
                                    "createAuthor", "updateAuthor", "deleteAuthor",
                                    "deleteAllAuthors", "resolveAuthorsOfBook",
                                    "resolveBooksOfAuthor"
                                ]
                            },
                            "arguments": { "type": "object" }
                        },
                        "required": ["operation"]
                    },
                    "Book": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "title": { "type": "string" },
                            "description": { "type": "string" },
                            "authorIds": { "type": "array", "items": { "type": "string" } },
                            "createdAt": { "type": "string", "format": "date-time" },
                            "updatedAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "title", "description", "authorIds", "createdAt", "updatedAt"]
                    },
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "name": { "type": "string" },
                            "createdAt": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "name", "createdAt"]
                    }
                }
            }
        }))
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "catalog module is healthy"
}

/// Operation endpoint
async fn dispatch(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let api_key = headers
        .get(gateway.guard().header())
        .and_then(|value| value.to_str().ok());
    gateway.handle(api_key, &body).await.map(Json)
}

/// Create a new instance of the catalog module
pub fn create_module(gateway: Arc<Gateway>) -> Arc<dyn Module> {
    Arc::new(CatalogModule::new(gateway))
}
