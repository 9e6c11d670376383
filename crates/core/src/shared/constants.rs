/// Label assigned to groups that no catalog category could score.
pub const OTHERS_CATEGORY: &str = "others";

/// Name of the category definition file inside the reference directory.
pub const CATALOG_FILE_NAME: &str = "categories.txt";

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Minimum lead the fixed-budget pass needs before a label is accepted.
pub const DEFAULT_AMBIGUITY_MARGIN: f64 = 5.0;

/// Lead at which the adaptive pass stops consulting more references.
pub const DEFAULT_CONFIDENCE_MARGIN: f64 = 1.0;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";
pub const DEFAULT_SORT_MODEL: &str = "minicpm-o-2_6";
pub const DEFAULT_REFINE_MODEL: &str = "gemma-3-27b-it@q6_k";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

pub const SORT_PROMPT: &str = "You will compare a reference image (one of several from a game) and an input image.\n\
Give a similarity score between 0 (not similar) and 100 (identical).\n\
Only respond with a number.";

pub const REFINE_PROMPT: &str = "You will compare a reference image (from a game) and an input image.\n\
Give a similarity score between 0 (not similar) and 100 (identical).\n\
Only respond with a number.";

/// File extension of the per-frame sidecar artifacts removed on collapse.
pub const SIDECAR_EXTENSION: &str = "txt";

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}
