pub mod authors;
pub mod books;

use bookshelf_kernel::ModuleRegistry;

use crate::catalog::Catalog;

/// Register the catalog modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, catalog: &Catalog) -> anyhow::Result<()> {
    registry.register(authors::create_module(catalog.clone()))?;
    registry.register(books::create_module(catalog.clone()))?;
    Ok(())
}
