use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};

use crate::library::model::Snippet;

/// Decision card shown when an existing library snippet intercepts a
/// request. Buttons disappear once the proposal is settled upstream.
#[component]
pub fn ProposalCard(
    snippet: Snippet,
    on_accept: EventHandler<()>,
    on_custom: EventHandler<()>,
) -> Element {
    rsx! {
        div {
            class: "mt-2 p-3 rounded-lg bg-gray-900/60 border border-cyan-800",
            div {
                class: "flex items-center space-x-2 mb-1",
                Icon { width: 16, height: 16, icon: fi_icons::FiPackage }
                span { class: "font-semibold text-cyan-300", "{snippet.title}" }
                span {
                    class: "text-xs text-gray-500 uppercase tracking-wide",
                    "{snippet.category.label()}"
                }
            }
            p { class: "text-sm text-gray-400 mb-2", "{snippet.description}" }
            div {
                class: "flex space-x-2",
                button {
                    class: "px-3 py-1.5 text-sm bg-cyan-600 hover:bg-cyan-700 rounded-md text-white font-medium transition-colors",
                    onclick: move |_| on_accept.call(()),
                    "Bu kodu kullan"
                }
                button {
                    class: "px-3 py-1.5 text-sm bg-gray-700 hover:bg-gray-600 rounded-md text-gray-200 transition-colors",
                    onclick: move |_| on_custom.call(()),
                    "Hayır, özel yaz"
                }
            }
        }
    }
}
