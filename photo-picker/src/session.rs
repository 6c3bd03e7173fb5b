use crate::host::{
    ActivityOutcome, Host, HostEvent, MIME_JPEG, REQUEST_IMAGE_CAPTURE, REQUEST_IMAGE_PICK,
    REQUEST_STORAGE_PERMISSION,
};
use crate::models::{FlowStatus, Handoff, ImageUri, PendingAction};
use crate::path::new_photo_path;
use std::path::PathBuf;

/// Chooser title shown when selecting a photo from the gallery.
pub const CHOOSER_PROMPT: &str = "Choose photo";

/// Notice shown before re-asking for the storage permission.
pub const STORAGE_RATIONALE: &str = "Pixie needs access to storage for saving your photo !";

/// Notice shown when the output file for a capture cannot be prepared.
pub const SAVE_FAILED_NOTICE: &str = "Failed to save your photo !";

/// State machine behind the launch screen.
///
/// A session drives one photo acquisition at a time: it gates each request on
/// the storage permission, dispatches the capture or pick to the host, and
/// turns the host's asynchronous reply into a [`Handoff`] for the edit
/// screen. All host interaction goes through the [`Host`] trait, so the same
/// session runs against the Android bridge, a desktop file dialog, or a test
/// mock.
///
/// At most one request is in flight. While one is outstanding (or parked
/// behind a permission prompt) further requests are rejected, so a second tap
/// on a launch button cannot fork the flow.
pub struct CaptureSession {
    pictures_root: PathBuf,
    /// Action parked behind an unanswered permission request.
    pending: Option<PendingAction>,
    /// Request code of the dispatch we are waiting on, if any.
    outstanding: Option<u32>,
    /// Where the current photo lives. Set before a capture is dispatched and
    /// overwritten by the URI a pick returns.
    capture_location: Option<ImageUri>,
}

impl CaptureSession {
    /// Creates an idle session that stores captured photos under
    /// `pictures_root`.
    pub fn new(pictures_root: PathBuf) -> Self {
        Self {
            pictures_root,
            pending: None,
            outstanding: None,
            capture_location: None,
        }
    }

    /// Whether a request is in flight or parked behind a permission prompt.
    pub fn is_busy(&self) -> bool {
        self.outstanding.is_some() || self.pending.is_some()
    }

    /// Action waiting for a permission grant, if any.
    pub fn pending_action(&self) -> Option<PendingAction> {
        self.pending
    }

    /// Location of the current photo, once known.
    pub fn capture_location(&self) -> Option<&ImageUri> {
        self.capture_location.as_ref()
    }

    /// Starts the camera flow: reserve an output file under the pictures
    /// root and hand it to an external camera app.
    ///
    /// Returns [`FlowStatus::AwaitingPermission`] when the storage permission
    /// is missing; the capture resumes automatically once
    /// [`on_permission_result`](Self::on_permission_result) reports a grant.
    pub fn request_capture(&mut self, host: &mut impl Host) -> FlowStatus {
        if self.is_busy() {
            log::warn!("capture requested while another request is in flight, ignoring");
            return FlowStatus::NotStarted;
        }
        if !self.ensure_permission(host, PendingAction::Capture) {
            return FlowStatus::AwaitingPermission;
        }
        self.start_capture(host)
    }

    /// Starts the gallery flow: open a chooser over the installed gallery
    /// apps and wait for the selected image URI.
    pub fn request_pick(&mut self, host: &mut impl Host) -> FlowStatus {
        if self.is_busy() {
            log::warn!("pick requested while another request is in flight, ignoring");
            return FlowStatus::NotStarted;
        }
        if !self.ensure_permission(host, PendingAction::Pick) {
            return FlowStatus::AwaitingPermission;
        }
        self.start_pick(host)
    }

    /// Feeds the reply to a permission request back into the session.
    ///
    /// On a grant the parked action is replayed as if freshly requested. On a
    /// denial the session returns to idle without any notice; the user can
    /// simply tap again. Replies with an unexpected request code are logged
    /// and ignored and leave any parked action in place.
    pub fn on_permission_result(
        &mut self,
        host: &mut impl Host,
        request_code: u32,
        granted: bool,
    ) -> FlowStatus {
        if request_code != REQUEST_STORAGE_PERMISSION {
            log::warn!(
                "ignoring permission result for unknown request code {}",
                request_code
            );
            return FlowStatus::NotStarted;
        }
        let Some(action) = self.pending.take() else {
            log::warn!("permission result arrived with no pending action");
            return FlowStatus::NotStarted;
        };
        if !granted {
            log::info!("storage permission denied, dropping pending {:?}", action);
            return FlowStatus::NotStarted;
        }
        match action {
            PendingAction::Capture => self.start_capture(host),
            PendingAction::Pick => self.start_pick(host),
            PendingAction::Collage => {
                log::warn!("no collage flow is wired up, dropping pending action");
                FlowStatus::NotStarted
            }
        }
    }

    /// Feeds the reply to a capture or pick dispatch back into the session.
    ///
    /// Returns the [`Handoff`] for the edit screen when the reply completes
    /// the flow. Cancelled replies and replies for request codes the session
    /// is not waiting on never produce a handoff; the latter also leave the
    /// in-flight request untouched.
    pub fn on_activity_result(
        &mut self,
        request_code: u32,
        outcome: ActivityOutcome,
        uri: Option<ImageUri>,
    ) -> Option<Handoff> {
        if self.outstanding != Some(request_code) {
            log::warn!(
                "ignoring activity result for unknown request code {}",
                request_code
            );
            return None;
        }
        self.outstanding = None;

        if outcome == ActivityOutcome::Cancelled {
            log::info!("request {} cancelled, staying on launch screen", request_code);
            return None;
        }

        match request_code {
            REQUEST_IMAGE_CAPTURE => match self.capture_location.clone() {
                Some(image_uri) => Some(Handoff { image_uri }),
                None => {
                    log::error!("capture finished but no output location was recorded");
                    None
                }
            },
            REQUEST_IMAGE_PICK => match uri {
                Some(image_uri) => {
                    self.capture_location = Some(image_uri.clone());
                    Some(Handoff { image_uri })
                }
                None => {
                    log::warn!("picker finished without returning an image");
                    None
                }
            },
            other => {
                log::warn!("activity result for unhandled request code {}", other);
                None
            }
        }
    }

    /// Routes a polled [`HostEvent`] to the matching handler.
    pub fn handle_event(&mut self, host: &mut impl Host, event: HostEvent) -> Option<Handoff> {
        match event {
            HostEvent::PermissionResult {
                request_code,
                granted,
            } => {
                self.on_permission_result(host, request_code, granted);
                None
            }
            HostEvent::ActivityResult {
                request_code,
                outcome,
                uri,
            } => self.on_activity_result(request_code, outcome, uri),
        }
    }

    /// Abandons any in-flight request and returns the session to idle.
    pub fn reset(&mut self) {
        self.pending = None;
        self.outstanding = None;
        self.capture_location = None;
    }

    /// Checks the storage permission, parking `action` behind an
    /// asynchronous request when it is missing. Returns whether the action
    /// may proceed right now.
    fn ensure_permission(&mut self, host: &mut impl Host, action: PendingAction) -> bool {
        if host.storage_permission_granted() {
            return true;
        }
        if host.should_show_permission_rationale() {
            host.show_notice(STORAGE_RATIONALE);
        }
        self.pending = Some(action);
        host.request_storage_permission(REQUEST_STORAGE_PERMISSION);
        false
    }

    fn start_capture(&mut self, host: &mut impl Host) -> FlowStatus {
        if !host.camera_handler_available() {
            log::info!("no camera app available, capture not started");
            return FlowStatus::NotStarted;
        }
        let output = match new_photo_path(&self.pictures_root) {
            Ok(path) => path,
            Err(e) => {
                log::error!("could not prepare photo output file: {}", e);
                host.show_notice(SAVE_FAILED_NOTICE);
                return FlowStatus::NotStarted;
            }
        };
        // Record the destination before dispatch; the capture reply carries
        // no payload and is resolved against this location.
        self.capture_location = Some(ImageUri::from_file_path(&output));
        self.outstanding = Some(REQUEST_IMAGE_CAPTURE);
        host.dispatch_image_capture(&output, REQUEST_IMAGE_CAPTURE);
        host.scan_media(&[output.as_path()], &[MIME_JPEG]);
        FlowStatus::Dispatched
    }

    fn start_pick(&mut self, host: &mut impl Host) -> FlowStatus {
        self.outstanding = Some(REQUEST_IMAGE_PICK);
        host.dispatch_image_pick(CHOOSER_PROMPT, REQUEST_IMAGE_PICK);
        FlowStatus::Dispatched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{PHOTO_ALBUM_DIR, PHOTO_FILE_PREFIX};
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::path::Path;

    #[derive(Default)]
    struct MockHost {
        permission_granted: bool,
        rationale: bool,
        camera_handler: bool,
        handler_queries: Cell<usize>,
        permission_requests: Vec<u32>,
        capture_dispatches: Vec<(PathBuf, u32)>,
        pick_dispatches: Vec<(String, u32)>,
        notices: Vec<String>,
        scans: Vec<(Vec<PathBuf>, Vec<String>)>,
        events: VecDeque<HostEvent>,
    }

    impl Host for MockHost {
        fn storage_permission_granted(&self) -> bool {
            self.permission_granted
        }

        fn should_show_permission_rationale(&self) -> bool {
            self.rationale
        }

        fn request_storage_permission(&mut self, request_code: u32) {
            self.permission_requests.push(request_code);
        }

        fn camera_handler_available(&self) -> bool {
            self.handler_queries.set(self.handler_queries.get() + 1);
            self.camera_handler
        }

        fn dispatch_image_capture(&mut self, output: &Path, request_code: u32) {
            self.capture_dispatches
                .push((output.to_path_buf(), request_code));
        }

        fn dispatch_image_pick(&mut self, prompt: &str, request_code: u32) {
            self.pick_dispatches.push((prompt.to_string(), request_code));
        }

        fn show_notice(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }

        fn scan_media(&mut self, paths: &[&Path], mime_types: &[&str]) {
            self.scans.push((
                paths.iter().map(|p| p.to_path_buf()).collect(),
                mime_types.iter().map(|m| m.to_string()).collect(),
            ));
        }

        fn poll_event(&mut self) -> Option<HostEvent> {
            self.events.pop_front()
        }
    }

    fn ready_host() -> MockHost {
        MockHost {
            permission_granted: true,
            camera_handler: true,
            ..MockHost::default()
        }
    }

    fn session_in(dir: &tempfile::TempDir) -> CaptureSession {
        CaptureSession::new(dir.path().to_path_buf())
    }

    #[test]
    fn test_capture_dispatches_when_permission_granted() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);

        assert_eq!(status, FlowStatus::Dispatched);
        assert!(host.permission_requests.is_empty());
        assert_eq!(host.capture_dispatches.len(), 1);
        let (path, code) = &host.capture_dispatches[0];
        assert_eq!(*code, REQUEST_IMAGE_CAPTURE);
        assert!(path.starts_with(dir.path()));
        assert!(session.is_busy());
    }

    #[test]
    fn test_capture_without_camera_app_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.camera_handler = false;
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);

        assert_eq!(status, FlowStatus::NotStarted);
        assert!(host.capture_dispatches.is_empty());
        assert!(host.notices.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_capture_path_failure_notifies_and_aborts() {
        let dir = tempfile::tempdir().unwrap();
        // Occupy the album directory name with a file so the path builder
        // cannot create it.
        let blocked = dir.path().join(PHOTO_ALBUM_DIR);
        std::fs::write(&blocked, b"not a directory").unwrap();

        let mut host = ready_host();
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);

        assert_eq!(status, FlowStatus::NotStarted);
        assert!(host.capture_dispatches.is_empty());
        assert_eq!(host.notices, vec![SAVE_FAILED_NOTICE.to_string()]);
        assert!(session.capture_location().is_none());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_capture_requests_permission_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);

        assert_eq!(status, FlowStatus::AwaitingPermission);
        assert_eq!(host.permission_requests, vec![REQUEST_STORAGE_PERMISSION]);
        assert!(host.capture_dispatches.is_empty());
        assert_eq!(session.pending_action(), Some(PendingAction::Capture));
        assert!(session.is_busy());
    }

    #[test]
    fn test_rationale_notice_shown_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        host.rationale = true;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);

        assert_eq!(host.notices, vec![STORAGE_RATIONALE.to_string()]);
        assert_eq!(host.permission_requests, vec![REQUEST_STORAGE_PERMISSION]);
    }

    #[test]
    fn test_no_rationale_notice_on_first_ask() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);

        assert!(host.notices.is_empty());
    }

    #[test]
    fn test_permission_grant_resumes_capture() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, true);

        assert_eq!(status, FlowStatus::Dispatched);
        assert_eq!(host.capture_dispatches.len(), 1);
        assert_eq!(session.pending_action(), None);
    }

    #[test]
    fn test_permission_grant_resumes_pick() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_pick(&mut host);
        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, true);

        assert_eq!(status, FlowStatus::Dispatched);
        assert_eq!(host.pick_dispatches.len(), 1);
        let (prompt, code) = &host.pick_dispatches[0];
        assert_eq!(prompt, CHOOSER_PROMPT);
        assert_eq!(*code, REQUEST_IMAGE_PICK);
    }

    #[test]
    fn test_permission_denial_returns_to_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, false);

        assert_eq!(status, FlowStatus::NotStarted);
        assert!(!session.is_busy());
        assert!(host.capture_dispatches.is_empty());
        assert!(host.notices.is_empty());
    }

    #[test]
    fn test_unknown_permission_code_keeps_pending_action() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let status = session.on_permission_result(&mut host, 7, true);

        assert_eq!(status, FlowStatus::NotStarted);
        assert_eq!(session.pending_action(), Some(PendingAction::Capture));
        assert!(session.is_busy());

        // The real reply still resumes the parked capture.
        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, true);
        assert_eq!(status, FlowStatus::Dispatched);
    }

    #[test]
    fn test_pending_collage_grant_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);
        session.pending = Some(PendingAction::Collage);

        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, true);

        assert_eq!(status, FlowStatus::NotStarted);
        assert!(host.capture_dispatches.is_empty());
        assert!(host.pick_dispatches.is_empty());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_capture_result_hands_off_recorded_location() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let dispatched = host.capture_dispatches[0].0.clone();

        let handoff =
            session.on_activity_result(REQUEST_IMAGE_CAPTURE, ActivityOutcome::Ok, None);

        let handoff = handoff.unwrap();
        assert_eq!(handoff.image_uri, ImageUri::from_file_path(&dispatched));
        assert!(!session.is_busy());
    }

    #[test]
    fn test_cancelled_result_yields_no_handoff() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let handoff =
            session.on_activity_result(REQUEST_IMAGE_CAPTURE, ActivityOutcome::Cancelled, None);

        assert!(handoff.is_none());
        assert!(!session.is_busy());
        // The reserved location stays around; nothing depends on it anymore.
        assert!(session.capture_location().is_some());
    }

    #[test]
    fn test_pick_result_uses_returned_uri() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_pick(&mut host);
        let picked = ImageUri::new("content://media/external/images/42");
        let handoff = session.on_activity_result(
            REQUEST_IMAGE_PICK,
            ActivityOutcome::Ok,
            Some(picked.clone()),
        );

        assert_eq!(handoff.unwrap().image_uri, picked);
        assert_eq!(session.capture_location(), Some(&picked));
    }

    #[test]
    fn test_pick_result_without_uri_yields_no_handoff() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_pick(&mut host);
        let handoff = session.on_activity_result(REQUEST_IMAGE_PICK, ActivityOutcome::Ok, None);

        assert!(handoff.is_none());
        assert!(!session.is_busy());
        assert!(session.capture_location().is_none());
    }

    #[test]
    fn test_unknown_activity_result_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);

        let stray = session.on_activity_result(
            9,
            ActivityOutcome::Ok,
            Some(ImageUri::new("content://media/1")),
        );
        assert!(stray.is_none());
        assert!(session.is_busy());

        // The genuine reply is still honored afterwards.
        let handoff =
            session.on_activity_result(REQUEST_IMAGE_CAPTURE, ActivityOutcome::Ok, None);
        assert!(handoff.is_some());
    }

    #[test]
    fn test_second_request_rejected_while_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let status = session.request_pick(&mut host);

        assert_eq!(status, FlowStatus::NotStarted);
        assert!(host.pick_dispatches.is_empty());
    }

    #[test]
    fn test_second_request_rejected_while_awaiting_permission() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        let status = session.request_capture(&mut host);

        assert_eq!(status, FlowStatus::NotStarted);
        assert_eq!(host.permission_requests.len(), 1);
    }

    #[test]
    fn test_media_scan_fired_at_dispatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);

        let dispatched = host.capture_dispatches[0].0.clone();
        assert_eq!(host.scans.len(), 1);
        assert_eq!(host.scans[0].0, vec![dispatched]);
        assert_eq!(host.scans[0].1, vec![MIME_JPEG.to_string()]);
    }

    #[test]
    fn test_reset_abandons_in_flight_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        session.request_capture(&mut host);
        session.reset();

        assert!(!session.is_busy());
        assert!(session.capture_location().is_none());

        let status = session.request_pick(&mut host);
        assert_eq!(status, FlowStatus::Dispatched);
    }

    /// Full camera walk: tap, permission already granted, external camera
    /// confirms, handoff points at the reserved file.
    #[test]
    fn test_capture_flow_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);
        assert_eq!(status, FlowStatus::Dispatched);

        let (dispatched, _) = host.capture_dispatches[0].clone();
        assert!(dispatched.starts_with(dir.path().join(PHOTO_ALBUM_DIR)));
        let name = dispatched.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(PHOTO_FILE_PREFIX));
        assert!(name.ends_with(".jpg"));
        assert_eq!(host.scans.len(), 1);

        host.events.push_back(HostEvent::ActivityResult {
            request_code: REQUEST_IMAGE_CAPTURE,
            outcome: ActivityOutcome::Ok,
            uri: None,
        });

        let mut handoff = None;
        while let Some(event) = host.poll_event() {
            handoff = session.handle_event(&mut host, event);
        }

        let handoff = handoff.unwrap();
        assert_eq!(handoff.image_uri, ImageUri::from_file_path(&dispatched));
    }

    /// Full gallery walk: tap, permission granted after a prompt, picker
    /// returns a content URI, handoff carries it through unchanged.
    #[test]
    fn test_pick_flow_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        let mut session = session_in(&dir);

        let status = session.request_pick(&mut host);
        assert_eq!(status, FlowStatus::AwaitingPermission);

        host.events.push_back(HostEvent::PermissionResult {
            request_code: REQUEST_STORAGE_PERMISSION,
            granted: true,
        });

        while let Some(event) = host.poll_event() {
            assert!(session.handle_event(&mut host, event).is_none());
        }
        assert_eq!(host.pick_dispatches.len(), 1);

        host.events.push_back(HostEvent::ActivityResult {
            request_code: REQUEST_IMAGE_PICK,
            outcome: ActivityOutcome::Ok,
            uri: Some(ImageUri::new("content://media/123")),
        });

        let mut handoff = None;
        while let Some(event) = host.poll_event() {
            handoff = session.handle_event(&mut host, event);
        }

        assert_eq!(handoff.unwrap().image_uri.as_str(), "content://media/123");
        assert!(!session.is_busy());
    }

    /// Permission denied: the session never consults the camera and returns
    /// to idle without dispatching anything.
    #[test]
    fn test_denied_permission_flow_stays_idle() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = ready_host();
        host.permission_granted = false;
        host.rationale = true;
        let mut session = session_in(&dir);

        let status = session.request_capture(&mut host);
        assert_eq!(status, FlowStatus::AwaitingPermission);
        assert_eq!(host.notices, vec![STORAGE_RATIONALE.to_string()]);

        let status =
            session.on_permission_result(&mut host, REQUEST_STORAGE_PERMISSION, false);

        assert_eq!(status, FlowStatus::NotStarted);
        assert_eq!(host.handler_queries.get(), 0);
        assert!(host.capture_dispatches.is_empty());
        assert!(host.pick_dispatches.is_empty());
        assert!(!session.is_busy());
    }
}
