pub mod reference_catalog;
pub mod reference_id;
