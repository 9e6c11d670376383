pub mod catalog;
pub mod classification;
pub mod evaluation;
pub mod frames;
pub mod oracle;
pub mod pipeline;
pub mod shared;
