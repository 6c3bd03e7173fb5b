use crate::config::AppConfig;
use crate::Screen;
use dioxus::prelude::*;
use photo_picker::{CaptureSession, FlowStatus, Handoff, Host};
use std::time::Duration;

#[cfg(target_os = "android")]
fn platform_host() -> photo_picker::AndroidHost {
    photo_picker::AndroidHost::new()
}

#[cfg(not(target_os = "android"))]
fn platform_host() -> crate::host_desktop::DesktopHost {
    crate::host_desktop::DesktopHost::new()
}

/// Polls the host until the in-flight request resolves or the timeout runs
/// out. Returns the handoff for the edit screen, or `None` when the flow
/// ended back on the launch screen.
async fn pump_events(
    mut session: Signal<CaptureSession>,
    host: &mut impl Host,
    poll_interval: Duration,
    timeout: Duration,
) -> Option<Handoff> {
    let mut waited = Duration::ZERO;
    loop {
        tokio::time::sleep(poll_interval).await;
        waited += poll_interval;

        while let Some(event) = host.poll_event() {
            let handoff = session.write().handle_event(host, event);
            if handoff.is_some() {
                return handoff;
            }
            if !session.read().is_busy() {
                return None;
            }
        }

        if waited >= timeout {
            log::warn!("no reply after {:?}, abandoning request", timeout);
            session.write().reset();
            return None;
        }
    }
}

/// Entry screen: take a new photo or choose one from the gallery, then jump
/// to editing it.
#[component]
pub fn LaunchScreen(on_navigate: EventHandler<Screen>) -> Element {
    let config = use_hook(|| {
        AppConfig::load().unwrap_or_else(|e| {
            log::warn!("falling back to default configuration: {}", e);
            AppConfig::default()
        })
    });
    let mut session = use_signal({
        let pictures_root = config.pictures_root();
        move || CaptureSession::new(pictures_root)
    });
    let mut busy = use_signal(|| false);

    let poll_interval = config.poll_interval();
    let poll_timeout = config.poll_timeout();

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5; display: flex; flex-direction: column; justify-content: center;",

            div { style: "text-align: center; margin-bottom: 32px;",
                h1 { style: "color: #0066cc; font-size: 40px; font-weight: 700; margin: 0;",
                    "Pixie"
                }
                p { style: "color: #666; font-size: 15px; margin-top: 8px;",
                    "Snap a photo or pick one to start editing"
                }
            }

            div { class: "card",
                div { style: "display: flex; flex-direction: column; gap: 12px;",
                    button {
                        class: "btn-primary",
                        style: "padding: 16px; font-size: 16px;",
                        disabled: busy(),
                        onclick: move |_| {
                            if busy() {
                                return;
                            }
                            busy.set(true);
                            spawn(async move {
                                let mut host = platform_host();
                                let status = session.write().request_capture(&mut host);
                                let handoff = match status {
                                    FlowStatus::NotStarted => None,
                                    FlowStatus::Dispatched | FlowStatus::AwaitingPermission => {
                                        pump_events(session, &mut host, poll_interval, poll_timeout)
                                            .await
                                    }
                                };
                                busy.set(false);
                                if let Some(handoff) = handoff {
                                    on_navigate
                                        .call(Screen::Edit {
                                            image_uri: handoff.image_uri.into_string(),
                                        });
                                }
                            });
                        },
                        if busy() {
                            "⏳ Working..."
                        } else {
                            "📷 Take photo"
                        }
                    }
                    button {
                        class: "btn-secondary",
                        style: "padding: 16px; font-size: 16px;",
                        disabled: busy(),
                        onclick: move |_| {
                            if busy() {
                                return;
                            }
                            busy.set(true);
                            spawn(async move {
                                let mut host = platform_host();
                                let status = session.write().request_pick(&mut host);
                                let handoff = match status {
                                    FlowStatus::NotStarted => None,
                                    FlowStatus::Dispatched | FlowStatus::AwaitingPermission => {
                                        pump_events(session, &mut host, poll_interval, poll_timeout)
                                            .await
                                    }
                                };
                                busy.set(false);
                                if let Some(handoff) = handoff {
                                    on_navigate
                                        .call(Screen::Edit {
                                            image_uri: handoff.image_uri.into_string(),
                                        });
                                }
                            });
                        },
                        if busy() {
                            "⏳ Working..."
                        } else {
                            "🖼️ Choose from gallery"
                        }
                    }
                }

                if busy() {
                    div { style: "margin-top: 16px; padding: 12px; background: #e3f2fd; border-radius: 8px; color: #0066cc; font-size: 13px; text-align: center;",
                        "Waiting for the camera or gallery..."
                    }
                }
            }
        }
    }
}
