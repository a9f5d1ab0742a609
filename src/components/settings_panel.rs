use dioxus::prelude::*;

use crate::settings::{Settings, SettingsManager};

/// Minimal settings form: API key and the two model names. The key goes to
/// the system keychain where one exists, otherwise it stays in the settings
/// file.
#[component]
pub fn SettingsPanel() -> Element {
    let mut settings = use_context::<Signal<Settings>>();
    let settings_manager = use_context::<Signal<SettingsManager>>();
    let mut api_key_draft = use_signal(|| settings.read().api_key.clone().unwrap_or_default());
    let mut chat_model_draft = use_signal(|| settings.read().chat_model.clone());
    let mut analyze_model_draft = use_signal(|| settings.read().analyze_model.clone());
    let mut saved = use_signal(|| false);

    let save = move |_| {
        let key = api_key_draft.read().trim().to_string();
        let mut current = settings.read().clone();
        current.chat_model = chat_model_draft.read().trim().to_string();
        current.analyze_model = analyze_model_draft.read().trim().to_string();

        match crate::secure_storage::save_secret("gemini_api_key", &key) {
            Ok(()) => current.api_key = None,
            Err(_) => current.api_key = if key.is_empty() { None } else { Some(key) },
        }

        settings.set(current);
        if let Err(e) = settings_manager.read().save(&settings.read()) {
            tracing::error!("failed to save settings: {}", e);
            return;
        }
        saved.set(true);
        spawn(async move {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            saved.set(false);
        });
    };

    rsx! {
        div {
            class: "flex flex-col h-full p-4 space-y-4 text-gray-100",
            h2 { class: "text-lg font-semibold", "Ayarlar" }
            div {
                label { class: "block text-xs text-gray-500 uppercase mb-1", "Gemini API Anahtarı" }
                input {
                    r#type: "password",
                    class: "w-full py-1.5 px-3 rounded-lg bg-gray-900 border border-gray-700 text-sm focus:outline-none focus:ring-1 focus:ring-cyan-500",
                    value: "{api_key_draft}",
                    oninput: move |event| api_key_draft.set(event.value()),
                }
            }
            div {
                label { class: "block text-xs text-gray-500 uppercase mb-1", "Sohbet Modeli" }
                input {
                    class: "w-full py-1.5 px-3 rounded-lg bg-gray-900 border border-gray-700 text-sm focus:outline-none focus:ring-1 focus:ring-cyan-500",
                    value: "{chat_model_draft}",
                    oninput: move |event| chat_model_draft.set(event.value()),
                }
            }
            div {
                label { class: "block text-xs text-gray-500 uppercase mb-1", "Analiz Modeli" }
                input {
                    class: "w-full py-1.5 px-3 rounded-lg bg-gray-900 border border-gray-700 text-sm focus:outline-none focus:ring-1 focus:ring-cyan-500",
                    value: "{analyze_model_draft}",
                    oninput: move |event| analyze_model_draft.set(event.value()),
                }
            }
            button {
                class: "px-4 py-2 bg-cyan-600 hover:bg-cyan-700 rounded-md text-white font-medium transition-colors",
                onclick: save,
                if *saved.read() { "Kaydedildi ✓" } else { "Kaydet" }
            }
        }
    }
}
