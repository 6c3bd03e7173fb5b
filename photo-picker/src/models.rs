use std::path::Path;

/// Key under which the downstream screen receives the resolved image
/// reference.
pub const EXTRA_IMAGE_URI: &str = "imageURI";

/// Which user-initiated flow is awaiting a permission decision.
///
/// Recorded when a button is pressed without the storage permission in hand,
/// consumed exactly once when the permission result arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Capture a new photo with the camera app.
    Capture,
    /// Pick an existing image from the gallery.
    Pick,
    /// Reserved for the collage screen; no control produces this yet.
    Collage,
}

/// A string-encoded reference to an image, as exchanged with external apps.
///
/// Either a `file://` URI built from a capture location or an opaque URI
/// reported by the gallery picker (e.g. `content://media/123`). Generated
/// capture paths contain no characters that would need escaping, so no
/// percent-encoding is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUri(String);

impl ImageUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// File URI for a local path, the form handed to the camera app as the
    /// capture output location.
    pub fn from_file_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for ImageUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The transfer of a resolved image reference to the next screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handoff {
    pub image_uri: ImageUri,
}

/// What a button press turned into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStatus {
    /// An external request was dispatched; an activity result will follow.
    Dispatched,
    /// The storage permission was requested; the action replays on grant.
    AwaitingPermission,
    /// Nothing was dispatched and no callback will arrive.
    NotStarted,
}
