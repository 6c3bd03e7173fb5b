// Desktop stand-in for the Android host.
//
// There is no external camera app to hand a capture to, so captures report
// no handler and the launch screen stays put. Picking works: the chooser
// becomes a native file dialog on its own thread, and its result is queued
// as the same ActivityResult the Android bridge would deliver.

use photo_picker::{ActivityOutcome, Host, HostEvent, ImageUri};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

type EventQueue = Arc<Mutex<VecDeque<HostEvent>>>;

pub struct DesktopHost {
    events: EventQueue,
}

impl DesktopHost {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    fn push_event(queue: &EventQueue, event: HostEvent) {
        match queue.lock() {
            Ok(mut q) => q.push_back(event),
            Err(e) => log::error!("event queue poisoned, dropping event: {}", e),
        }
    }
}

impl Default for DesktopHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Host for DesktopHost {
    fn storage_permission_granted(&self) -> bool {
        // No runtime permission model on desktop
        true
    }

    fn should_show_permission_rationale(&self) -> bool {
        false
    }

    fn request_storage_permission(&mut self, request_code: u32) {
        // Answer right away so a parked request resumes on the next poll
        Self::push_event(
            &self.events,
            HostEvent::PermissionResult {
                request_code,
                granted: true,
            },
        );
    }

    fn camera_handler_available(&self) -> bool {
        false
    }

    fn dispatch_image_capture(&mut self, output: &Path, request_code: u32) {
        log::debug!(
            "image capture (code {}) has no desktop handler, output {} unused",
            request_code,
            output.display()
        );
    }

    fn dispatch_image_pick(&mut self, prompt: &str, request_code: u32) {
        let queue = Arc::clone(&self.events);
        let title = prompt.to_string();
        // rfd's blocking dialog must stay off the UI thread
        std::thread::spawn(move || {
            let picked = rfd::FileDialog::new()
                .set_title(&title)
                .add_filter("Image Files", &["jpg", "jpeg", "png", "webp", "gif", "bmp"])
                .pick_file();
            let event = match picked {
                Some(path) => HostEvent::ActivityResult {
                    request_code,
                    outcome: ActivityOutcome::Ok,
                    uri: Some(ImageUri::from_file_path(&path)),
                },
                None => HostEvent::ActivityResult {
                    request_code,
                    outcome: ActivityOutcome::Cancelled,
                    uri: None,
                },
            };
            Self::push_event(&queue, event);
        });
    }

    fn show_notice(&mut self, message: &str) {
        log::warn!("notice: {}", message);
    }

    fn scan_media(&mut self, paths: &[&Path], _mime_types: &[&str]) {
        log::debug!("no media index on desktop, skipping scan of {} file(s)", paths.len());
    }

    fn poll_event(&mut self) -> Option<HostEvent> {
        match self.events.lock() {
            Ok(mut q) => q.pop_front(),
            Err(e) => {
                log::error!("event queue poisoned: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_request_resolves_immediately() {
        let mut host = DesktopHost::new();
        host.request_storage_permission(2);

        assert_eq!(
            host.poll_event(),
            Some(HostEvent::PermissionResult {
                request_code: 2,
                granted: true,
            })
        );
        assert_eq!(host.poll_event(), None);
    }

    #[test]
    fn test_capture_is_unavailable() {
        let mut host = DesktopHost::new();

        assert!(host.storage_permission_granted());
        assert!(!host.camera_handler_available());

        host.dispatch_image_capture(Path::new("/tmp/unused.jpg"), 1);
        assert_eq!(host.poll_event(), None);
    }
}
