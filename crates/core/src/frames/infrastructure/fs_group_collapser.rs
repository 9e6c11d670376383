use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::frames::domain::frame_grouper::FrameGroup;
use crate::frames::domain::group_collapser::GroupCollapser;
use crate::shared::constants::SIDECAR_EXTENSION;

/// Deletes every non-representative frame of a group, plus each frame's
/// `<stem>.txt` sidecar, leaving only the representative image on disk.
#[derive(Default)]
pub struct FsGroupCollapser;

impl FsGroupCollapser {
    pub fn new() -> Self {
        Self
    }
}

fn remove_if_present(path: &Path) -> Result<bool, std::io::Error> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

impl GroupCollapser for FsGroupCollapser {
    fn collapse(
        &mut self,
        group: &FrameGroup,
        label: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(representative) = group.representative() else {
            return Ok(());
        };

        let mut removed = 0;
        for frame in group.frames() {
            if frame.path() != representative.path() && remove_if_present(frame.path())? {
                removed += 1;
            }
            if remove_if_present(&frame.path().with_extension(SIDECAR_EXTENSION))? {
                removed += 1;
            }
        }

        log::info!(
            "Collapsed group '{}' ({label}) to {}, removed {removed} files",
            group.id(),
            representative.file_name()
        );
        Ok(())
    }
}
