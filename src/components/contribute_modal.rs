use dioxus::prelude::*;
use uuid::Uuid;

use crate::conversation::{ConversationLog, Message};
use crate::library::import_export::{normalize_code, normalize_title};
use crate::library::model::Snippet;
use crate::library::store::SnippetStore;
use crate::security::SecurityGate;
use crate::services::gemini::{self, AnalyzedSnippet};
use crate::settings::Settings;

/// Two-step contribution flow: paste and screen, then preview the curated
/// form and confirm. Nothing lands in the collection before the confirm.
#[component]
pub fn ContributeModal(on_close: EventHandler<()>) -> Element {
    let mut store = consume_context::<Signal<SnippetStore>>();
    let mut gate = consume_context::<Signal<SecurityGate>>();
    let mut log = consume_context::<Signal<ConversationLog>>();
    let settings = use_context::<Signal<Settings>>();
    let mut raw_code = use_signal(|| "".to_string());
    let mut analyzing = use_signal(|| false);
    let mut preview = use_signal(|| None as Option<AnalyzedSnippet>);
    let mut error = use_signal(|| None as Option<String>);

    let analyze = move |_| {
        let code = raw_code.read().trim().to_string();
        if code.is_empty() {
            return;
        }

        // Local screen first, so obviously destructive code never travels.
        let screened = gate.read().screen_contribution(&code);
        if let Err(e) = screened {
            let was_violation = e.is_violation();
            error.set(Some(e.to_string()));
            if was_violation {
                gate.write().record_outcome(true);
            }
            return;
        }

        analyzing.set(true);
        error.set(None);
        let settings = settings.read().clone();
        let mut gate = gate.clone();
        spawn(async move {
            let api_key = crate::settings::resolve_api_key(&settings).unwrap_or_default();
            let client = reqwest::Client::new();
            let result =
                gemini::analyze_submission(&client, &api_key, &settings.analyze_model, code).await;
            match result {
                Ok(analyzed) => {
                    preview.set(Some(analyzed));
                    gate.write().record_outcome(false);
                }
                Err(e) => {
                    let was_violation = e.is_violation();
                    error.set(Some(e.to_string()));
                    if was_violation {
                        gate.write().record_outcome(true);
                    }
                }
            }
            analyzing.set(false);
        });
    };

    let confirm = move |_| {
        let Some(analyzed) = preview.read().clone() else {
            return;
        };

        let is_duplicate = {
            let store_ref = store.read();
            let title_key = normalize_title(&analyzed.title);
            let code_key = normalize_code(&analyzed.cleaned_code);
            store_ref.snippets().iter().any(|s| {
                normalize_title(&s.title) == title_key || normalize_code(&s.code) == code_key
            })
        };
        if is_duplicate {
            error.set(Some(
                "Bu kod veya başlık zaten kütüphanede mevcut.".to_string(),
            ));
            return;
        }

        let snippet = Snippet {
            id: format!("user-{}", Uuid::new_v4()),
            title: analyzed.title,
            description: analyzed.description,
            code: analyzed.cleaned_code,
            category: analyzed.category,
            keywords: analyzed.keywords,
            author: Some("Siz".to_string()),
            downloads: None,
            likes: None,
        };
        let title = snippet.title.clone();
        match store.write().add(snippet) {
            Ok(()) => {
                log.write().append(Message::library_result(format!(
                    "✅ **{title}** güvenlik taramasından geçti ve kütüphaneye eklendi."
                )));
                on_close.call(());
            }
            Err(e) => error.set(Some(e.to_string())),
        }
    };

    rsx! {
        div {
            class: "fixed inset-0 z-50 bg-black/60 flex items-center justify-center",
            onclick: move |_| on_close.call(()),
            div {
                class: "w-[32rem] max-w-full max-h-[80vh] overflow-y-auto bg-gray-800 rounded-xl border border-gray-700 p-5 text-gray-100",
                onclick: move |e| e.stop_propagation(),
                h2 { class: "text-lg font-semibold mb-1", "Kod Paylaş" }
                p {
                    class: "text-sm text-gray-400 mb-3",
                    "Kodunuz önce güvenlik taramasından geçer, sonra sınıflandırılıp kütüphaneye eklenir."
                }
                if let Some(notice) = error.read().clone() {
                    div {
                        class: "mb-3 px-3 py-2 text-sm rounded-lg bg-red-900/60 border border-red-700 text-red-200",
                        "{notice}"
                    }
                }
                if let Some(analyzed) = preview.read().clone() {
                    div {
                        class: "space-y-2",
                        div {
                            span { class: "text-xs text-gray-500 uppercase", "Başlık" }
                            p { class: "text-sm font-medium", "{analyzed.title}" }
                        }
                        div {
                            span { class: "text-xs text-gray-500 uppercase", "Açıklama" }
                            p { class: "text-sm text-gray-300", "{analyzed.description}" }
                        }
                        div {
                            span { class: "text-xs text-gray-500 uppercase", "Kategori" }
                            p { class: "text-sm text-cyan-300", "{analyzed.category.label()}" }
                        }
                        pre {
                            class: "p-3 rounded-lg bg-gray-900 text-xs overflow-x-auto",
                            code { "{analyzed.cleaned_code}" }
                        }
                        div {
                            class: "flex justify-end space-x-2 pt-2",
                            button {
                                class: "px-3 py-1.5 text-sm bg-gray-700 hover:bg-gray-600 rounded-md transition-colors",
                                onclick: move |_| preview.set(None),
                                "Geri"
                            }
                            button {
                                class: "px-3 py-1.5 text-sm bg-cyan-600 hover:bg-cyan-700 rounded-md text-white font-medium transition-colors",
                                onclick: confirm,
                                "Kütüphaneye Ekle"
                            }
                        }
                    }
                } else {
                    textarea {
                        class: "w-full h-48 p-3 rounded-lg bg-gray-900 border border-gray-700 text-sm font-mono placeholder-gray-500 focus:outline-none focus:ring-1 focus:ring-cyan-500 resize-none",
                        placeholder: "(defun c:KOMUT ...)",
                        value: "{raw_code}",
                        oninput: move |event| raw_code.set(event.value()),
                    }
                    div {
                        class: "flex justify-end space-x-2 mt-3",
                        button {
                            class: "px-3 py-1.5 text-sm bg-gray-700 hover:bg-gray-600 rounded-md transition-colors",
                            onclick: move |_| on_close.call(()),
                            "Vazgeç"
                        }
                        button {
                            class: "px-3 py-1.5 text-sm bg-cyan-600 hover:bg-cyan-700 rounded-md text-white font-medium disabled:opacity-50 transition-colors",
                            disabled: *analyzing.read(),
                            onclick: analyze,
                            if *analyzing.read() { "Taranıyor..." } else { "Tara ve Önizle" }
                        }
                    }
                }
            }
        }
    }
}
