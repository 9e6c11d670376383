pub mod catalog_loader;
pub mod reference_cache;
