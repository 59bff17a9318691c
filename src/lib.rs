//! Bookshelf application library
//!
//! Authors and books catalog modules, the list cache policy and the bootstrap
//! that wires them into an HTTP server.

pub mod catalog;
pub mod modules;
pub mod utils;

use anyhow::Context;
use axum::Router;
use bookshelf_cache::TagCache;
use bookshelf_db::DynCatalogStore;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub use catalog::{Catalog, CatalogError};

/// Catalog state over `store` with an empty list cache bounded by
/// `cache.max_entries`.
pub fn build_catalog(settings: &Settings, store: DynCatalogStore) -> Catalog {
    let cache = TagCache::with_capacity(settings.cache.max_entries);
    Catalog::new(settings, store, cache)
}

/// Registry holding every catalog module.
pub fn build_registry(catalog: &Catalog) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, catalog)?;
    Ok(registry)
}

/// Full HTTP application over `store`, without starting module lifecycles.
pub fn build_app(settings: &Settings, store: DynCatalogStore) -> anyhow::Result<Router> {
    let catalog = build_catalog(settings, store);
    let registry = build_registry(&catalog)?;
    Ok(bookshelf_http::build_router(&registry, settings))
}

/// Serve the catalog until Ctrl-C, running module lifecycles and the cache
/// sweeper around the server.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    tracing::info!(
        env = ?settings.environment,
        port = settings.server.port,
        cache_ttl_secs = settings.cache.ttl_secs,
        "bookshelf bootstrap starting"
    );

    let catalog = build_catalog(&settings, bookshelf_db::create_memory_store());
    let registry = build_registry(&catalog)?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry
        .init_modules(&ctx)
        .await
        .context("failed to initialize modules")?;
    registry
        .start_modules(&ctx)
        .await
        .context("failed to start modules")?;

    let sweeper = catalog
        .cache()
        .spawn_sweeper(settings.cache.sweep_interval());
    let app = bookshelf_http::build_router(&registry, &settings);

    tracing::info!(modules = registry.module_count(), "bookshelf bootstrap complete");
    let served = bookshelf_http::start_server(app, &settings, bookshelf_http::shutdown_signal()).await;

    sweeper.abort();
    registry
        .stop_modules()
        .await
        .context("failed to stop modules")?;
    served
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_contains_both_catalog_modules() {
        let catalog = build_catalog(&Settings::default(), bookshelf_db::create_memory_store());
        let registry = build_registry(&catalog).unwrap();

        assert_eq!(registry.module_count(), 2);
        assert!(registry.get_module("authors").is_some());
        assert!(registry.get_module("books").is_some());
    }

    #[test]
    fn merged_openapi_documents_catalog_routes() {
        let catalog = build_catalog(&Settings::default(), bookshelf_db::create_memory_store());
        let registry = build_registry(&catalog).unwrap();
        let doc = bookshelf_http::router::merged_openapi(&registry);

        assert!(doc["paths"]["/api/authors"]["post"].is_object());
        assert!(doc["paths"]["/api/books/{id}"]["put"].is_object());
        assert!(doc["components"]["schemas"]["BookInput"].is_object());
        assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
    }
}
