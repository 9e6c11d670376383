use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

/// Which source video a sampled frame came from, and its place in the
/// sampling sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameId {
    pub group_id: String,
    pub sequence: u32,
}

fn frame_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^([a-z]+)_(\d+)\.(jpg|jpeg|png|webp)$").expect("valid frame pattern")
    })
}

impl FrameId {
    /// Parses `<letters>_<digits>.<ext>`, e.g. `"ab_2.jpg"`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = frame_name_pattern().captures(file_name)?;
        let sequence = caps[2].parse().ok()?;
        Some(Self {
            group_id: caps[1].to_string(),
            sequence,
        })
    }
}

/// A sampled frame on disk.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    id: FrameId,
    path: PathBuf,
}

impl Frame {
    pub fn new(id: FrameId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
        }
    }

    /// Builds a frame from a path whose file name follows the frame
    /// naming convention.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        FrameId::parse(name).map(|id| Self::new(id, path))
    }

    pub fn id(&self) -> &FrameId {
        &self.id
    }

    pub fn group_id(&self) -> &str {
        &self.id.group_id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
