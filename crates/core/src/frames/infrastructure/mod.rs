pub mod frame_scanner;
pub mod fs_group_collapser;
