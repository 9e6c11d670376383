use std::collections::HashMap;
use std::path::PathBuf;

use crate::frames::domain::frame::Frame;

/// The sampled frames of one source video, in enumeration order.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameGroup {
    id: String,
    frames: Vec<Frame>,
}

impl FrameGroup {
    pub fn new(id: impl Into<String>, frames: Vec<Frame>) -> Self {
        Self {
            id: id.into(),
            frames,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The first frame encountered; the artifact kept once a group is
    /// decided.
    pub fn representative(&self) -> Option<&Frame> {
        self.frames.first()
    }
}

/// Partitions frames into per-video groups by their group identifier.
///
/// Groups come out in order of first appearance and keep the input order of
/// their frames. Paths that do not follow the frame naming convention are
/// dropped.
pub fn group<I>(paths: I) -> Vec<FrameGroup>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut order: Vec<String> = Vec::new();
    let mut by_group: HashMap<String, Vec<Frame>> = HashMap::new();

    for path in paths {
        let Some(frame) = Frame::from_path(&path) else {
            log::debug!("Ignoring non-frame file: {}", path.display());
            continue;
        };
        let key = frame.group_id().to_string();
        if !by_group.contains_key(&key) {
            order.push(key.clone());
        }
        by_group.entry(key).or_default().push(frame);
    }

    order
        .into_iter()
        .filter_map(|id| {
            let frames = by_group.remove(&id)?;
            Some(FrameGroup::new(id, frames))
        })
        .collect()
}

/// Total frames across all groups.
pub fn frame_count(groups: &[FrameGroup]) -> usize {
    groups.iter().map(FrameGroup::len).sum()
}
