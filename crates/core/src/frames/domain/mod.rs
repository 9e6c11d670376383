pub mod frame;
pub mod frame_grouper;
pub mod group_collapser;
