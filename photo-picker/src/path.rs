// Output locations for newly captured photos.
//
// Captured photos land in a dedicated album under the device's shared
// pictures directory, named after the capture time so that consecutive
// captures never collide.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Album directory created under the shared pictures root.
pub const PHOTO_ALBUM_DIR: &str = "Pixie";

/// Prefix of every captured photo filename.
pub const PHOTO_FILE_PREFIX: &str = "PIXIE";

/// Extension of every captured photo filename.
pub const PHOTO_FILE_EXT: &str = "jpg";

#[derive(Debug)]
pub enum PathError {
    /// The album directory could not be created or verified.
    DirectoryUnavailable {
        dir: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::DirectoryUnavailable { dir, source } => {
                write!(f, "photo directory unavailable: {}: {}", dir.display(), source)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// Filename for a photo captured at `at`, second granularity.
///
/// Timestamps that differ by at least one second yield distinct names.
pub fn photo_file_name(at: DateTime<Local>) -> String {
    format!(
        "{}{}.{}",
        PHOTO_FILE_PREFIX,
        at.format("%Y%m%d_%H%M%S"),
        PHOTO_FILE_EXT
    )
}

/// Builds the output location for a new photo under `pictures_root`.
///
/// Ensures the album directory exists (creating it recursively if absent)
/// before returning. The caller treats a `DirectoryUnavailable` error as
/// fatal for the current capture and must not dispatch anything.
pub fn new_photo_path(pictures_root: &Path) -> Result<PathBuf, PathError> {
    let album = pictures_root.join(PHOTO_ALBUM_DIR);
    if let Err(e) = fs::create_dir_all(&album) {
        return Err(PathError::DirectoryUnavailable {
            dir: album,
            source: e,
        });
    }
    // Never hand out a location whose parent is not actually a directory.
    if !album.is_dir() {
        return Err(PathError::DirectoryUnavailable {
            dir: album,
            source: std::io::Error::other("not a directory"),
        });
    }
    Ok(album.join(photo_file_name(Local::now())))
}
