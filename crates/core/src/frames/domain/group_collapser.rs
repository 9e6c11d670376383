use crate::frames::domain::frame_grouper::FrameGroup;

/// Reduces a classified group to its representative frame.
///
/// Destructive and one-way: callers invoke it only after the group's label
/// is final.
pub trait GroupCollapser: Send {
    fn collapse(&mut self, group: &FrameGroup, label: &str)
        -> Result<(), Box<dyn std::error::Error>>;
}
