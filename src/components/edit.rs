use crate::image_support;
use crate::Screen;
use dioxus::prelude::*;
use photo_picker::EXTRA_IMAGE_URI;

/// Editing screen, reached with the URI of a freshly captured or picked
/// image.
#[component]
pub fn EditScreen(image_uri: String, on_navigate: EventHandler<Screen>) -> Element {
    let (display, load_error) = match image_support::display_source(&image_uri) {
        Ok(src) => (Some(src), None),
        Err(e) => {
            log::error!("cannot display {}: {}", image_uri, e);
            (None, Some(e.user_message()))
        }
    };

    rsx! {
        div { style: "padding: 16px; max-width: 600px; margin: 0 auto; min-height: 100vh; background: #f5f5f5;",

            div { style: "display: flex; align-items: center; margin-bottom: 24px;",
                button {
                    class: "btn-secondary",
                    style: "margin-right: 12px; padding: 8px 16px;",
                    onclick: move |_| on_navigate.call(Screen::Launch),
                    "← Back"
                }
                h1 { style: "color: #0066cc; font-size: 24px; font-weight: 700; margin: 0;",
                    "Edit photo"
                }
            }

            div { class: "card",
                if let Some(src) = display {
                    img {
                        src: "{src}",
                        style: "width: 100%; border-radius: 8px; display: block;",
                    }
                } else {
                    div { style: "background: #fee; border: 1px solid #fcc; color: #c33; padding: 12px; border-radius: 8px; font-size: 14px;",
                        "⚠️ "
                        {load_error.unwrap_or_default()}
                    }
                }

                div { style: "margin-top: 12px; font-size: 12px; color: #666; word-break: break-all;",
                    "{EXTRA_IMAGE_URI}: {image_uri}"
                }
            }
        }
    }
}
