pub mod image_preparer;
pub mod similarity_oracle;
pub mod similarity_scorer;
