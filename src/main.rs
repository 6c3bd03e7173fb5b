use dioxus::prelude::*;

mod components;
mod config;
mod error;
mod filesystem;
#[cfg(not(target_os = "android"))]
mod host_desktop;
mod image_support;

use components::{EditScreen, LaunchScreen};

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    init_logging();
    dioxus::launch(App);
}

#[cfg(target_os = "android")]
fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("pixie"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {
    env_logger::init();
}

/// Screen navigation for the app
#[derive(Clone, PartialEq, Debug)]
pub enum Screen {
    Launch,
    Edit { image_uri: String },
}

#[component]
fn App() -> Element {
    let mut current_screen = use_signal(|| Screen::Launch);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        div { style: "display: flex; flex-direction: column; height: 100vh; font-family: sans-serif;",

            // Main Content
            div { style: "flex: 1; overflow-y: auto;",
                match current_screen() {
                    Screen::Launch => rsx! {
                        LaunchScreen { on_navigate: move |s| current_screen.set(s) }
                    },
                    Screen::Edit { image_uri } => rsx! {
                        EditScreen { image_uri, on_navigate: move |s| current_screen.set(s) }
                    },
                }
            }
        }
    }
}
