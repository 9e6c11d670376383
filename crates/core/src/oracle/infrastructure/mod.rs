pub mod chat_completion_oracle;
pub mod data_url_preparer;
