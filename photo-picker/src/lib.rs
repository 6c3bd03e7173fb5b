//! # Photo Picker
//!
//! The photo acquisition workflow behind the launch screen: capture a new
//! photo with an external camera app or pick an existing one from the
//! gallery, then hand the resulting image URI to the edit screen.
//!
//! The heart of the crate is [`CaptureSession`], a platform-independent
//! state machine. It gates both flows on the storage permission, reserves a
//! timestamped output file for captures, rejects a second request while one
//! is in flight and matches asynchronous replies to the request codes that
//! produced them.
//!
//! ## Platform Separation
//!
//! The session only talks to the platform through the [`Host`] trait. The
//! Android implementation ([`android::AndroidHost`]) calls MainActivity over
//! JNI and drains its queued replies; desktop builds of the application
//! provide their own host on top of native file dialogs.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use photo_picker::{CaptureSession, FlowStatus};
//!
//! let mut session = CaptureSession::new(pictures_root);
//! match session.request_capture(&mut host) {
//!     FlowStatus::Dispatched => { /* poll host events until the handoff */ }
//!     FlowStatus::AwaitingPermission => { /* grant resumes automatically */ }
//!     FlowStatus::NotStarted => { /* stay on the launch screen */ }
//! }
//! ```

pub mod android;
pub mod host;
pub mod models;
pub mod path;
pub mod session;

pub use host::{
    ActivityOutcome, Host, HostEvent, MIME_JPEG, REQUEST_IMAGE_CAPTURE, REQUEST_IMAGE_PICK,
    REQUEST_STORAGE_PERMISSION,
};
pub use models::{FlowStatus, Handoff, ImageUri, PendingAction, EXTRA_IMAGE_URI};
pub use path::{
    new_photo_path, photo_file_name, PathError, PHOTO_ALBUM_DIR, PHOTO_FILE_EXT, PHOTO_FILE_PREFIX,
};
pub use session::{CaptureSession, CHOOSER_PROMPT, SAVE_FAILED_NOTICE, STORAGE_RATIONALE};

#[cfg(target_os = "android")]
pub use android::AndroidHost;
pub use android::{parse_bridge_event, AndroidHostConfig, BridgeError};
