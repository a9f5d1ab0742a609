use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};

use crate::library::import_export::{self, export_filename, export_json};
use crate::library::model::Category;
use crate::library::store::{SnippetStore, MAX_LIBRARY_ITEMS};

use super::contribute_modal::ContributeModal;

/// Sidebar over the snippet collection: filter, copy, import, export and
/// the contribute entry point.
#[component]
pub fn LibraryPanel() -> Element {
    let mut store = consume_context::<Signal<SnippetStore>>();
    let mut filter = use_signal(|| "".to_string());
    let mut active_category = use_signal(|| None as Option<Category>);
    let mut status = use_signal(|| None as Option<String>);
    let mut show_contribute = use_signal(|| false);

    let visible: Vec<_> = {
        let store_ref = store.read();
        let needle = filter.read().to_lowercase();
        store_ref
            .snippets()
            .iter()
            .filter(|s| {
                active_category.read().map_or(true, |c| s.category == c)
                    && (needle.is_empty()
                        || s.title.to_lowercase().contains(&needle)
                        || s.description.to_lowercase().contains(&needle)
                        || s.keywords.iter().any(|k| k.to_lowercase().contains(&needle)))
            })
            .cloned()
            .collect()
    };

    rsx! {
        div {
            class: "flex flex-col h-full bg-gray-800 text-gray-100",
            div {
                class: "p-4 border-b border-gray-700",
                div {
                    class: "flex items-center justify-between mb-3",
                    h2 { class: "text-lg font-semibold", "Kütüphane" }
                    span {
                        class: "text-xs text-gray-500",
                        "{store.read().len()} / {MAX_LIBRARY_ITEMS}"
                    }
                }
                input {
                    class: "w-full py-1.5 px-3 rounded-lg bg-gray-900 border border-gray-700 text-sm placeholder-gray-500 focus:outline-none focus:ring-1 focus:ring-cyan-500",
                    placeholder: "Ara...",
                    value: "{filter}",
                    oninput: move |event| filter.set(event.value()),
                }
                div {
                    class: "flex flex-wrap gap-1 mt-2",
                    button {
                        class: if active_category.read().is_none() {
                            "px-2 py-0.5 text-xs rounded-full bg-cyan-600 text-white"
                        } else {
                            "px-2 py-0.5 text-xs rounded-full bg-gray-700 text-gray-300 hover:bg-gray-600"
                        },
                        onclick: move |_| active_category.set(None),
                        "Tümü"
                    }
                    for category in Category::ALL.iter().copied() {
                        button {
                            key: "{category.label()}",
                            class: if *active_category.read() == Some(category) {
                                "px-2 py-0.5 text-xs rounded-full bg-cyan-600 text-white"
                            } else {
                                "px-2 py-0.5 text-xs rounded-full bg-gray-700 text-gray-300 hover:bg-gray-600"
                            },
                            onclick: move |_| active_category.set(Some(category)),
                            "{category.label()}"
                        }
                    }
                }
            }
            if let Some(notice) = status.read().clone() {
                div {
                    class: "px-4 py-2 text-xs text-cyan-300 bg-gray-900/60 border-b border-gray-700",
                    "{notice}"
                }
            }
            div {
                class: "flex-1 overflow-y-auto p-2 space-y-2",
                for snippet in visible {
                    div {
                        key: "{snippet.id}",
                        class: "p-3 rounded-lg bg-gray-900/60 border border-gray-700 hover:border-cyan-800 transition-colors",
                        div {
                            class: "flex items-center justify-between",
                            span { class: "text-sm font-medium text-gray-200", "{snippet.title}" }
                            button {
                                class: "p-1 rounded text-gray-500 hover:text-white hover:bg-gray-700",
                                title: "Kodu kopyala",
                                onclick: {
                                    let code = snippet.code.clone();
                                    move |_| {
                                        if let Err(e) = arboard::Clipboard::new()
                                            .and_then(|mut c| c.set_text(code.clone()))
                                        {
                                            tracing::error!("clipboard copy failed: {}", e);
                                        }
                                    }
                                },
                                Icon { width: 14, height: 14, icon: fi_icons::FiClipboard }
                            }
                        }
                        p { class: "text-xs text-gray-400 mt-1", "{snippet.description}" }
                        span {
                            class: "text-[10px] text-gray-600 uppercase tracking-wide",
                            "{snippet.category.label()}"
                        }
                    }
                }
            }
            div {
                class: "p-3 border-t border-gray-700 flex items-center justify-between space-x-2",
                button {
                    class: "flex-1 px-3 py-1.5 text-sm bg-cyan-600 hover:bg-cyan-700 rounded-md text-white font-medium transition-colors",
                    onclick: move |_| show_contribute.set(true),
                    "+ Kod Paylaş"
                }
                button {
                    class: "p-2 rounded-md text-gray-400 hover:bg-gray-700 hover:text-white",
                    title: "İçe aktar",
                    onclick: move |_| {
                        let mut store = store.clone();
                        let mut status = status.clone();
                        spawn(async move {
                            let Some(handle) = rfd::AsyncFileDialog::new()
                                .add_filter("JSON", &["json"])
                                .pick_file()
                                .await
                            else {
                                return;
                            };
                            let data = handle.read().await;
                            let outcome = String::from_utf8(data)
                                .map_err(|_| crate::error::AppError::FormatError(
                                    "Dosya UTF-8 metin olarak okunamadı.".to_string(),
                                ))
                                .and_then(|json| {
                                    let batch = import_export::parse_import(&json)?;
                                    if batch.is_empty() {
                                        return Ok(None);
                                    }
                                    let mut collection = store.read().snippets().to_vec();
                                    let outcome = import_export::merge_import(&mut collection, batch)?;
                                    store.write().replace(collection)?;
                                    Ok(Some(outcome))
                                });
                            match outcome {
                                Ok(None) => status.set(Some("Dosyada içe aktarılacak öğe yok.".to_string())),
                                Ok(Some(outcome)) => status.set(Some(format!(
                                    "✅ İçe aktarıldı: {} yeni, {} yinelenen atlandı.",
                                    outcome.accepted, outcome.skipped
                                ))),
                                Err(e) => status.set(Some(format!("⚠️ {e}"))),
                            }
                        });
                    },
                    Icon { width: 16, height: 16, icon: fi_icons::FiUpload }
                }
                button {
                    class: "p-2 rounded-md text-gray-400 hover:bg-gray-700 hover:text-white",
                    title: "Dışa aktar",
                    onclick: move |_| {
                        let store = store.clone();
                        let mut status = status.clone();
                        spawn(async move {
                            let json = match export_json(store.read().snippets()) {
                                Ok(json) => json,
                                Err(e) => {
                                    status.set(Some(format!("⚠️ {e}")));
                                    return;
                                }
                            };
                            let Some(handle) = rfd::AsyncFileDialog::new()
                                .set_file_name(export_filename(chrono::Utc::now()))
                                .save_file()
                                .await
                            else {
                                return;
                            };
                            match handle.write(json.as_bytes()).await {
                                Ok(()) => status.set(Some("✅ Kütüphane dışa aktarıldı.".to_string())),
                                Err(e) => status.set(Some(format!("⚠️ Dosya yazılamadı: {e}"))),
                            }
                        });
                    },
                    Icon { width: 16, height: 16, icon: fi_icons::FiDownload }
                }
            }
            if *show_contribute.read() {
                ContributeModal {
                    on_close: move |_| show_contribute.set(false),
                }
            }
        }
    }
}
