//! HTTP handlers for `/api/authors`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header::LOCATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookshelf_authz::Principal;
use bookshelf_http::error::AppError;

use super::models::{AuthorInput, AuthorView};
use super::service;
use crate::catalog::listing::ListQuery;
use crate::catalog::Catalog;
use crate::utils::{cached_json, json_body, path_param, query_params};

/// Route table for the authors module
pub fn router(catalog: Catalog) -> Router {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .with_state(catalog)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "authors module is healthy"
}

async fn list_authors(
    State(catalog): State<Catalog>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let page = catalog.page_request(&query_params(query)?)?;
    let (payload, status) = service::list(&catalog, page).await?;
    Ok(cached_json(payload, status))
}

async fn get_author(
    State(catalog): State<Catalog>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AuthorView>, AppError> {
    let id = path_param(id)?;
    Ok(Json(service::get(&catalog, id).await?))
}

async fn create_author(
    State(catalog): State<Catalog>,
    principal: Principal,
    headers: HeaderMap,
    body: Result<Json<AuthorInput>, JsonRejection>,
) -> Result<Response, AppError> {
    catalog.require_admin(&principal)?;
    let created = service::create(&catalog, json_body(body)?).await?;
    let location = catalog.location(&headers, &format!("/api/authors/{}", created.id));

    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(created)).into_response())
}

async fn update_author(
    State(catalog): State<Catalog>,
    id: Result<Path<i64>, PathRejection>,
    principal: Principal,
    body: Result<Json<AuthorInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    catalog.require_admin(&principal)?;
    let id = path_param(id)?;
    service::update(&catalog, id, json_body(body)?).await?;
    Ok(StatusCode::OK)
}

async fn delete_author(
    State(catalog): State<Catalog>,
    id: Result<Path<i64>, PathRejection>,
    principal: Principal,
) -> Result<StatusCode, AppError> {
    catalog.require_admin(&principal)?;
    let id = path_param(id)?;
    service::delete(&catalog, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
