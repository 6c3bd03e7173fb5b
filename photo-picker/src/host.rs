// Platform seam of the capture/select workflow.
//
// The session never talks to the operating system directly. Permission
// checks, external app dispatch, user notices, media-index scans and the
// asynchronous replies all go through the `Host` trait. The app supplies a
// JNI-backed host on Android and a file dialog host on desktop; tests supply
// a recording mock.

use crate::models::ImageUri;
use std::path::Path;

/// Request code tagging the external image-capture request.
pub const REQUEST_IMAGE_CAPTURE: u32 = 1;

/// Request code tagging the storage permission request.
pub const REQUEST_STORAGE_PERMISSION: u32 = 2;

/// Request code tagging the external gallery pick request.
pub const REQUEST_IMAGE_PICK: u32 = 3;

/// MIME type reported to the media index for captured photos.
pub const MIME_JPEG: &str = "image/jpeg";

/// Outcome of an external request, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityOutcome {
    /// The external app completed and confirmed its result.
    Ok,
    /// The external app was cancelled or failed; treated uniformly.
    Cancelled,
}

/// An asynchronous reply delivered by the host event source.
///
/// Replies are keyed by the request code of the dispatch they answer; the
/// session rejects codes it is not waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PermissionResult {
        request_code: u32,
        granted: bool,
    },
    ActivityResult {
        request_code: u32,
        outcome: ActivityOutcome,
        uri: Option<ImageUri>,
    },
}

/// Everything the capture/select workflow needs from the platform.
///
/// All dispatch methods return immediately; their results arrive later
/// through [`Host::poll_event`] on the same logical thread that drives the
/// session. Nothing here blocks.
pub trait Host {
    /// Whether the storage write capability is currently granted.
    fn storage_permission_granted(&self) -> bool;

    /// Whether the user previously declined the storage permission, which
    /// warrants a one-line rationale before asking again.
    fn should_show_permission_rationale(&self) -> bool;

    /// Issues the asynchronous storage permission request.
    fn request_storage_permission(&mut self, request_code: u32);

    /// Whether any installed app can handle an image-capture request.
    fn camera_handler_available(&self) -> bool;

    /// Dispatches the external image-capture request with its output
    /// location.
    fn dispatch_image_capture(&mut self, output: &Path, request_code: u32);

    /// Dispatches the external gallery pick request wrapped in a chooser
    /// with the given prompt.
    fn dispatch_image_pick(&mut self, prompt: &str, request_code: u32);

    /// Surfaces a one-line notice to the user.
    fn show_notice(&mut self, message: &str);

    /// Asks the media index to scan the given files. Fire-and-forget: no
    /// reply is ever consumed and failures stay invisible.
    fn scan_media(&mut self, paths: &[&Path], mime_types: &[&str]);

    /// Next pending reply, if the host has one queued.
    fn poll_event(&mut self) -> Option<HostEvent>;
}
