pub mod constants;
pub mod prepared_image;
