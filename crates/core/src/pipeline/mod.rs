pub mod batch_logger;
pub mod classify_batch_use_case;
pub mod comparison_counter;
