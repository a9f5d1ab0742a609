#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use dioxus::desktop::{Config, WindowBuilder};
use dioxus::prelude::*;
use dotenvy::dotenv;

mod components;
mod conversation;
mod error;
mod library;
mod processing;
mod secure_storage;
mod security;
mod services;
mod settings;

use conversation::ConversationLog;
use library::store::{default_library_path, SnippetStore};
use security::SecurityGate;
use settings::{Settings, SettingsManager};
use std::path::PathBuf;

fn main() {
    dotenv().ok();
    dioxus_logger::init(tracing::Level::INFO).expect("failed to init logger");

    LaunchBuilder::new()
        .with_cfg(
            Config::new()
                .with_window(
                    WindowBuilder::new()
                        .with_title(env!("APP_NAME"))
                        .with_visible(true)
                        .with_resizable(true)
                        .with_inner_size(dioxus::desktop::tao::dpi::LogicalSize::new(1100.0, 760.0)),
                )
                .with_custom_head(
                    r#"<style>html, body { height: 100%; margin: 0; padding: 0; background-color: #111827; }</style>"#
                        .to_string()
                        + r#"<style>"#
                        + include_str!("../assets/output.css")
                        + r#"</style>"#,
                ),
        )
        .launch(app);
}

fn get_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join("com.lispdesk.app")
        .join("settings.json")
}

fn app() -> Element {
    let settings_manager =
        use_context_provider(|| Signal::new(SettingsManager::new(get_settings_path())));
    use_context_provider(|| {
        let settings = settings_manager.read().load();
        Signal::new(settings)
    });
    use_context_provider(|| Signal::new(ConversationLog::new()));
    use_context_provider(|| Signal::new(SecurityGate::new()));
    use_context_provider(|| Signal::new(SnippetStore::load(default_library_path())));

    let settings = use_context::<Signal<Settings>>();
    let mut show_library = use_signal(|| true);
    let mut show_settings = use_signal(|| false);
    let library_width = use_signal(|| settings.read().library_panel_width.unwrap_or(320.0));

    rsx! {
        div {
            class: "dark flex flex-row h-screen",

            if *show_library.read() {
                div {
                    id: "library-panel",
                    style: "width: {library_width}px;",
                    class: "bg-gray-800 text-white h-full border-r border-gray-700",
                    components::library_panel::LibraryPanel {}
                }
            }

            if *show_settings.read() {
                div {
                    class: "w-72 bg-gray-800 text-white h-full border-r border-gray-700",
                    components::settings_panel::SettingsPanel {}
                }
            }

            div {
                class: "flex-1",
                components::chat::ChatWindow {
                    on_toggle_library: move |_| {
                        let next = !*show_library.read();
                        show_library.set(next);
                        if next {
                            show_settings.set(false);
                        }
                    },
                    on_toggle_settings: move |_| {
                        let next = !*show_settings.read();
                        show_settings.set(next);
                        if next {
                            show_library.set(false);
                        }
                    },
                }
            }
        }
    }
}
