use dioxus::prelude::*;
use dioxus_free_icons::{icons::fi_icons, Icon};
use futures_util::StreamExt;
use lazy_static::lazy_static;
use std::time::Duration;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use tokio::time::sleep;
use uuid::Uuid;

use pulldown_cmark::{html, Event as CmarkEvent, Options, Parser, Tag, TagEnd};

use crate::conversation::{Attachment, ConversationLog, Message, MessageRole};
use crate::error::AppError;
use crate::library::store::SnippetStore;
use crate::processing::diagnostics::{render_report, run_diagnostics};
use crate::processing::router::{RequestRouter, Route, RouterConfig};
use crate::security::SecurityGate;
use crate::services::gemini::{self, Content, RequestMode};
use crate::settings::Settings;

use super::proposal_card::ProposalCard;

lazy_static! {
    static ref SYNTAX_SET: SyntaxSet = SyntaxSet::load_defaults_newlines();
    static ref THEME_SET: ThemeSet = ThemeSet::load_defaults();
    static ref THEME: &'static Theme = &THEME_SET.themes["base16-ocean.dark"];
}

#[derive(Clone)]
pub enum ChatAction {
    Submit {
        text: String,
        attachments: Vec<Attachment>,
        force_custom: bool,
    },
    AcceptProposal(Uuid),
    RequestCustom(Uuid),
    Clear,
}

fn copy_to_clipboard(text: &str) -> Result<(), String> {
    arboard::Clipboard::new()
        .and_then(|mut clipboard| clipboard.set_text(text.to_string()))
        .map_err(|e| e.to_string())
}

/// Formats a generation answer for the transcript: code fenced first, then
/// the prose around it.
fn format_generated(generated: &gemini::GeneratedLisp) -> String {
    if generated.code.is_empty() {
        generated.explanation.clone()
    } else {
        format!("```lisp\n{}\n```\n\n{}", generated.code, generated.explanation)
    }
}

/// A draft is forwarded only while nothing is in flight; submissions made
/// during a pending reply are dropped at the input box, never queued.
fn accepts_draft(text: &str, in_flight: bool) -> bool {
    !in_flight && !text.is_empty()
}

/// Forbidden-pattern pre-flight shared by every outbound path, pasted code
/// included. A hit charges the violation counter and yields the notice for
/// the transcript.
fn preflight_outbound(gate: &mut SecurityGate, text: &str) -> Result<(), String> {
    match gate.check_content_policy(text) {
        Ok(()) => Ok(()),
        Err(e) => {
            gate.record_outcome(true);
            Err(e.to_string())
        }
    }
}

#[component]
pub fn ChatWindow(on_toggle_library: EventHandler<()>, on_toggle_settings: EventHandler<()>) -> Element {
    let mut log = consume_context::<Signal<ConversationLog>>();
    let mut gate = consume_context::<Signal<SecurityGate>>();
    let store = consume_context::<Signal<SnippetStore>>();
    let settings = use_context::<Signal<Settings>>();
    let mut draft = use_signal(|| "".to_string());
    let mut pending_attachments = use_signal(Vec::<Attachment>::new);
    let is_sending = use_signal(|| false);

    // Keep the transcript pinned to the newest message.
    use_effect(move || {
        let _ = log.read();
        spawn(async move {
            sleep(Duration::from_millis(20)).await;
            let _ = document::eval(
                r#"
                const el = document.getElementById('message-list');
                if (el) { el.scrollTop = el.scrollHeight; }
            "#,
            )
            .await;
        });
    });

    let chat_coroutine = use_coroutine(move |mut rx: UnboundedReceiver<ChatAction>| {
        let mut log = log.clone();
        let mut gate = gate.clone();
        let store = store.clone();
        let settings = settings.clone();
        let mut is_sending = is_sending.clone();
        let router = RequestRouter::new(RouterConfig::default());
        let client = reqwest::Client::new();

        async move {
            while let Some(action) = rx.next().await {
                match action {
                    ChatAction::Submit {
                        text,
                        attachments,
                        force_custom,
                    } => {
                        let route = {
                            let store_ref = store.read();
                            let mut gate_ref = gate.write();
                            router.classify(
                                &text,
                                store_ref.snippets(),
                                &mut gate_ref,
                                *is_sending.read(),
                                force_custom,
                                !attachments.is_empty(),
                                chrono::Utc::now(),
                            )
                        };

                        match route {
                            Route::Dropped => continue,
                            Route::RateLimited => {
                                log.write().append(Message::system(AppError::RateLimited.to_string()));
                            }
                            Route::Rejected(notice) => {
                                log.write().append(Message::user(text, attachments));
                                log.write().append(Message::system(notice));
                            }
                            Route::Diagnostics => {
                                log.write().append(Message::user(text, attachments));
                                let report = run_diagnostics(store.read().snippets());
                                log.write().append(Message::library_result(render_report(&report)));
                                gate.write().record_outcome(false);
                            }
                            Route::Proposal {
                                snippet,
                                original_request,
                            } => {
                                log.write().append(Message::user(text, attachments));
                                log.write().append(Message::proposal(snippet, original_request));
                                gate.write().record_outcome(false);
                            }
                            Route::Code { mode, code } => {
                                // The transcript shows a templated request with the
                                // code as a block, not the raw paste as prose.
                                let label = match mode {
                                    RequestMode::Explain => "📖 Kod açıklama isteği:",
                                    _ => "🔧 Kod onarım ve optimizasyon isteği:",
                                };
                                log.write().append(Message::user(
                                    format!("{label}\n```lisp\n{code}\n```"),
                                    attachments,
                                ));

                                let screened = preflight_outbound(&mut gate.write(), &code);
                                if let Err(notice) = screened {
                                    log.write().append(Message::system(notice));
                                    continue;
                                }

                                is_sending.set(true);
                                dispatch_generation(
                                    &client,
                                    &mut log,
                                    &mut gate,
                                    &settings.read().clone(),
                                    code,
                                    mode,
                                )
                                .await;
                                is_sending.set(false);
                            }
                            Route::Generate { prompt } => {
                                let mut prompt = prompt;
                                for attachment in &attachments {
                                    if attachment.mime_type == "text/plain" {
                                        if let Ok(source) = String::from_utf8(attachment.data.clone()) {
                                            prompt.push_str(&format!("\n\n--- {} ---\n{}", attachment.name, source));
                                        }
                                    }
                                }
                                log.write().append(Message::user(text, attachments));

                                let screened = preflight_outbound(&mut gate.write(), &prompt);
                                if let Err(notice) = screened {
                                    log.write().append(Message::system(notice));
                                    continue;
                                }

                                is_sending.set(true);
                                dispatch_generation(
                                    &client,
                                    &mut log,
                                    &mut gate,
                                    &settings.read().clone(),
                                    prompt,
                                    RequestMode::Generate,
                                )
                                .await;
                                is_sending.set(false);
                            }
                        }
                    }
                    ChatAction::AcceptProposal(id) => {
                        let settled = log.write().settle_proposal(id);
                        if let Some((snippet, _)) = settled {
                            let content = format!(
                                "✅ **{}** kütüphaneden yüklendi.\n\n```lisp\n{}\n```\n\n{}",
                                snippet.title, snippet.code, snippet.description
                            );
                            log.write().append(Message::library_result(content));
                        }
                    }
                    ChatAction::RequestCustom(id) => {
                        let settled = log.write().settle_proposal(id);
                        if let Some((_, original_request)) = settled {
                            // Replays through the full pipeline; the rate
                            // limit applies to the replay as well.
                            let route = {
                                let store_ref = store.read();
                                let mut gate_ref = gate.write();
                                router.classify(
                                    &original_request,
                                    store_ref.snippets(),
                                    &mut gate_ref,
                                    *is_sending.read(),
                                    true,
                                    false,
                                    chrono::Utc::now(),
                                )
                            };
                            match route {
                                Route::Generate { prompt } => {
                                    let screened = preflight_outbound(&mut gate.write(), &prompt);
                                    if let Err(notice) = screened {
                                        log.write().append(Message::system(notice));
                                        continue;
                                    }
                                    is_sending.set(true);
                                    dispatch_generation(
                                        &client,
                                        &mut log,
                                        &mut gate,
                                        &settings.read().clone(),
                                        prompt,
                                        RequestMode::Generate,
                                    )
                                    .await;
                                    is_sending.set(false);
                                }
                                Route::RateLimited => {
                                    log.write().append(Message::system(AppError::RateLimited.to_string()));
                                }
                                Route::Rejected(notice) => {
                                    log.write().append(Message::system(notice));
                                }
                                // A locked session or a reply still in flight
                                // stays silent, same as a fresh submission.
                                _ => {}
                            }
                        }
                    }
                    ChatAction::Clear => {
                        log.write().clear();
                        gate.write().reset();
                        tracing::info!("conversation cleared, gate reset");
                    }
                }
            }
        }
    });

    let mut submit_draft = move |coroutine: Coroutine<ChatAction>| {
        let text = draft.read().trim().to_string();
        if !accepts_draft(&text, *is_sending.read()) {
            return;
        }
        draft.set("".to_string());
        let attachments = pending_attachments.read().clone();
        pending_attachments.set(Vec::new());
        let _ = document::eval(
            r#"
            const el = document.getElementById('chat-textarea');
            if (el) { el.style.height = 'auto'; }
        "#,
        );
        coroutine.send(ChatAction::Submit {
            text,
            attachments,
            force_custom: false,
        });
    };

    rsx! {
        div {
            class: "flex flex-col bg-gray-900 text-gray-100 h-full w-full",
            if gate.read().is_locked() {
                div {
                    class: "bg-red-900 text-red-200 text-sm px-4 py-2 flex items-center space-x-2",
                    Icon { width: 16, height: 16, icon: fi_icons::FiLock }
                    span {
                        "Oturum güvenlik nedeniyle kilitlendi ({gate.read().violation_count()} ihlal). Devam etmek için sohbeti temizleyin."
                    }
                }
            }
            div {
                id: "message-list",
                class: "flex-1 overflow-y-auto p-4 space-y-4 min-h-0",
                for message in log.read().messages().iter() {
                    MessageBubble {
                        key: "{message.id}",
                        message: message.clone(),
                        on_accept: move |id| chat_coroutine.send(ChatAction::AcceptProposal(id)),
                        on_custom: move |id| chat_coroutine.send(ChatAction::RequestCustom(id)),
                    }
                }
            }
            div {
                class: "p-4 border-t border-gray-700 flex-shrink-0",
                if !pending_attachments.read().is_empty() {
                    div {
                        class: "flex flex-wrap gap-2 mb-2",
                        for (i, attachment) in pending_attachments.read().iter().enumerate() {
                            span {
                                key: "{i}",
                                class: "text-xs bg-gray-800 text-gray-300 px-2 py-1 rounded-full flex items-center space-x-1",
                                Icon { width: 12, height: 12, icon: fi_icons::FiPaperclip }
                                span { "{attachment.name}" }
                            }
                        }
                    }
                }
                div {
                    class: "flex items-center space-x-3",
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Kütüphane",
                        onclick: move |_| on_toggle_library.call(()),
                        Icon { width: 20, height: 20, icon: fi_icons::FiBook }
                    }
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Ayarlar",
                        onclick: move |_| on_toggle_settings.call(()),
                        Icon { width: 20, height: 20, icon: fi_icons::FiSettings }
                    }
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Dosya ekle",
                        onclick: move |_| {
                            let mut pending_attachments = pending_attachments.clone();
                            let mut draft = draft.clone();
                            spawn(async move {
                                if let Some(handle) = rfd::AsyncFileDialog::new()
                                    .add_filter("LISP", &["lsp", "mnl", "scr", "txt"])
                                    .pick_file()
                                    .await
                                {
                                    let path = handle.path().to_path_buf();
                                    match crate::services::attachments::read_code_file(&path) {
                                        Ok(source) => {
                                            let current = draft.read().clone();
                                            draft.set(format!("{current}\n{source}").trim().to_string());
                                        }
                                        Err(AppError::FormatError(_)) => {
                                            // Not reviewable source; attach it as a plain file.
                                            match crate::services::attachments::read_chat_attachment(&path) {
                                                Ok(attachment) => pending_attachments.write().push(attachment),
                                                Err(e) => tracing::warn!(error = %e, "attachment rejected"),
                                            }
                                        }
                                        Err(e) => tracing::warn!(error = %e, "attachment rejected"),
                                    }
                                }
                            });
                        },
                        Icon { width: 20, height: 20, icon: fi_icons::FiPaperclip }
                    }
                    textarea {
                        id: "chat-textarea",
                        class: "flex-1 py-2 px-4 rounded-xl bg-gray-800 border border-gray-700 text-gray-100 placeholder-gray-500 focus:outline-none focus:ring-2 focus:ring-cyan-500 resize-none overflow-y-hidden",
                        rows: "1",
                        placeholder: "Bir komut tarif edin veya LISP kodu yapıştırın...",
                        disabled: gate.read().is_locked(),
                        value: "{draft}",
                        oninput: move |event| {
                            draft.set(event.value());
                            let _ = document::eval(r#"
                                const el = document.getElementById('chat-textarea');
                                if (el) {
                                    el.style.height = 'auto';
                                    el.style.height = (el.scrollHeight) + 'px';
                                }
                            "#);
                        },
                        onkeydown: move |event| {
                            let modifiers = event.data.modifiers();
                            if modifiers.contains(Modifiers::SUPER)
                                || modifiers.contains(Modifiers::CONTROL)
                                || modifiers.contains(Modifiers::ALT)
                            {
                                return;
                            }
                            if event.key() == Key::Enter && !modifiers.contains(Modifiers::SHIFT) {
                                event.prevent_default();
                                submit_draft(chat_coroutine);
                            }
                        },
                    }
                    button {
                        class: "p-2 rounded-full text-gray-400 hover:bg-gray-700 hover:text-white focus:outline-none",
                        title: "Sohbeti temizle",
                        onclick: move |_| chat_coroutine.send(ChatAction::Clear),
                        Icon { width: 20, height: 20, icon: fi_icons::FiTrash2 }
                    }
                    button {
                        class: "px-5 py-2 bg-cyan-600 rounded-full text-white font-semibold hover:bg-cyan-700 focus:outline-none disabled:opacity-50 transition-colors",
                        disabled: gate.read().is_locked(),
                        onclick: move |_| submit_draft(chat_coroutine),
                        "Gönder"
                    }
                }
            }
        }
    }
}

/// Runs one remote generation round-trip against the transcript: appends
/// the placeholder, awaits the answer, resolves or fails in place.
async fn dispatch_generation(
    client: &reqwest::Client,
    log: &mut Signal<ConversationLog>,
    gate: &mut Signal<SecurityGate>,
    settings: &Settings,
    prompt: String,
    mode: RequestMode,
) {
    let pending_id = log.write().append(Message::pending());

    let mut turns: Vec<(MessageRole, String)> = log
        .read()
        .remote_history(settings.chat_history_length)
        .iter()
        .filter(|m| !m.content.is_empty())
        .map(|m| (m.role, m.content.clone()))
        .collect();
    // The current submission was already appended; it travels as the prompt.
    if matches!(turns.last(), Some((MessageRole::User, _))) {
        turns.pop();
    }
    let history: Vec<Content> = turns
        .into_iter()
        .map(|(role, content)| match role {
            MessageRole::User => Content::user(content),
            _ => Content::model(content),
        })
        .collect();

    let api_key = crate::settings::resolve_api_key(settings).unwrap_or_default();
    let result = gemini::generate_lisp(client, &api_key, &settings.chat_model, history, prompt, mode).await;

    match result {
        Ok(generated) => {
            log.write().resolve(pending_id, format_generated(&generated));
            gate.write().record_outcome(false);
        }
        Err(e) => {
            let was_violation = e.is_violation();
            log.write().fail(pending_id, e.to_string());
            if was_violation {
                gate.write().record_outcome(true);
            }
        }
    }
}

#[component]
fn CodeBlock(code: String, lang: String) -> Element {
    let mut copied = use_signal(|| false);

    let code_to_copy = code.clone();
    let copy_onclick = move |_| {
        let code_to_copy = code_to_copy.clone();
        spawn(async move {
            match copy_to_clipboard(&code_to_copy) {
                Ok(_) => {
                    copied.set(true);
                    sleep(Duration::from_secs(2)).await;
                    copied.set(false);
                }
                Err(e) => {
                    tracing::error!("clipboard copy failed: {}", e);
                }
            }
        });
    };

    let lang_for_memo = lang.clone();
    let highlighted_html = use_memo(move || {
        let syntax = SYNTAX_SET
            .find_syntax_by_token(&lang_for_memo)
            .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text());
        let mut h = HighlightLines::new(syntax, &THEME);
        let mut html = String::new();
        for line in code.lines() {
            let regions = h.highlight_line(line, &SYNTAX_SET).unwrap();
            let html_line = styled_line_to_highlighted_html(&regions, IncludeBackground::No).unwrap();
            html.push_str(&html_line);
            html.push('\n');
        }
        if html.ends_with('\n') {
            html.pop();
        }
        html
    });

    rsx! {
        div {
            class: "code-block-wrapper relative bg-gray-800 rounded-lg my-2",
            button {
                class: "absolute top-2 right-2 p-1.5 rounded text-gray-400 hover:bg-gray-700 hover:text-white transition-colors",
                onclick: copy_onclick,
                if *copied.read() {
                    Icon { width: 16, height: 16, icon: fi_icons::FiCheck }
                } else {
                    Icon { width: 16, height: 16, icon: fi_icons::FiClipboard }
                }
            }
            pre {
                class: "p-4 overflow-x-auto text-sm",
                code {
                    class: "language-{lang}",
                    dangerous_inner_html: "{highlighted_html}"
                }
            }
        }
    }
}

/// Renders complete markdown, lifting fenced code out into [`CodeBlock`]s.
fn markdown_elements(content: String) -> Vec<Element> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(&content, options);

    let mut elements: Vec<Element> = Vec::new();
    let mut current_events: Vec<CmarkEvent> = Vec::new();
    let mut in_code_block = false;
    let mut code_buffer = String::new();
    let mut lang = String::new();

    let flush_events = |events: &mut Vec<CmarkEvent>, elements: &mut Vec<Element>| {
        if !events.is_empty() {
            let mut html_output = String::new();
            html::push_html(&mut html_output, events.drain(..));
            if !html_output.trim().is_empty() {
                elements.push(rsx! {
                    div {
                        class: "prose prose-sm dark:prose-invert max-w-none",
                        dangerous_inner_html: "{html_output}"
                    }
                });
            }
        }
    };

    for event in parser {
        match event {
            CmarkEvent::Start(Tag::CodeBlock(kind)) => {
                flush_events(&mut current_events, &mut elements);
                in_code_block = true;
                lang = match kind {
                    pulldown_cmark::CodeBlockKind::Fenced(l) => l.into_string(),
                    _ => String::new(),
                };
            }
            CmarkEvent::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                elements.push(rsx! {
                    CodeBlock {
                        code: code_buffer.clone(),
                        lang: lang.clone()
                    }
                });
                code_buffer.clear();
                lang.clear();
            }
            CmarkEvent::Text(text) => {
                if in_code_block {
                    code_buffer.push_str(&text);
                } else {
                    current_events.push(CmarkEvent::Text(text));
                }
            }
            CmarkEvent::SoftBreak | CmarkEvent::HardBreak => {
                if in_code_block {
                    code_buffer.push('\n');
                } else {
                    current_events.push(event);
                }
            }
            e => {
                if !in_code_block {
                    current_events.push(e);
                }
            }
        }
    }
    flush_events(&mut current_events, &mut elements);
    elements
}

#[component]
fn MessageBubble(
    message: Message,
    on_accept: EventHandler<Uuid>,
    on_custom: EventHandler<Uuid>,
) -> Element {
    let is_user = message.role == MessageRole::User;
    let is_system = message.role == MessageRole::System;
    let mut copied = use_signal(|| false);
    let mut is_hovered = use_signal(|| false);

    let bubble_classes = if is_user {
        "bg-cyan-700 text-white self-end ml-auto"
    } else if is_system {
        "bg-red-900/60 border border-red-700 text-red-200 self-start mr-auto"
    } else if message.is_library_result {
        "bg-gray-800 border border-cyan-800 text-gray-200 self-start mr-auto"
    } else {
        "bg-gray-700 text-gray-200 self-start mr-auto"
    };
    let container_classes = if is_user { "flex justify-end" } else { "flex justify-start" };
    let author = match message.role {
        MessageRole::User => "Siz",
        MessageRole::Assistant => "AutoLISP Master",
        MessageRole::System => "Sistem",
    };
    let author_classes = format!(
        "text-xs text-gray-500 mt-1 px-2 {}",
        if is_user { "text-right" } else { "text-left" }
    );

    let message_id = message.id;
    let content = message.content.clone();
    let elements = use_memo(move || markdown_elements(content.clone()));

    rsx! {
        div {
            class: "{container_classes}",
            div {
                class: "flex flex-col max-w-xs md:max-w-2xl",
                div {
                    class: "relative group px-4 py-2 rounded-2xl {bubble_classes}",
                    onmouseenter: move |_| is_hovered.set(true),
                    onmouseleave: move |_| is_hovered.set(false),
                    if message.is_loading {
                        ThinkingIndicator {}
                    } else {
                        for el in elements.read().iter() { {el} }
                        if let Some(snippet) = message.proposal.clone() {
                            ProposalCard {
                                snippet,
                                on_accept: move |_| on_accept.call(message_id),
                                on_custom: move |_| on_custom.call(message_id),
                            }
                        }
                        if !message.attachments.is_empty() {
                            div {
                                class: "flex flex-wrap gap-1 mt-2",
                                for (i, attachment) in message.attachments.iter().enumerate() {
                                    a {
                                        key: "{i}",
                                        class: "text-xs bg-gray-900/50 px-2 py-0.5 rounded-full hover:text-cyan-300",
                                        href: crate::services::attachments::as_data_url(attachment),
                                        download: "{attachment.name}",
                                        "📎 {attachment.name}"
                                    }
                                }
                            }
                        }
                    }
                    if *is_hovered.read() && !message.is_loading && !message.content.is_empty() {
                        {
                            let content_for_copy = message.content.clone();
                            rsx! {
                                button {
                                    class: "absolute bottom-[-10px] right-[-10px] p-1 rounded-full text-gray-400 bg-gray-900 bg-opacity-75 hover:bg-gray-700 hover:text-white transition-all opacity-0 group-hover:opacity-100",
                                    onclick: move |_| {
                                        let content_to_copy = content_for_copy.clone();
                                        spawn(async move {
                                            if copy_to_clipboard(&content_to_copy).is_ok() {
                                                copied.set(true);
                                                sleep(Duration::from_secs(2)).await;
                                                copied.set(false);
                                            }
                                        });
                                    },
                                    if *copied.read() {
                                        Icon { width: 14, height: 14, icon: fi_icons::FiCheck }
                                    } else {
                                        Icon { width: 14, height: 14, icon: fi_icons::FiClipboard }
                                    }
                                }
                            }
                        }
                    }
                }
                div {
                    class: "{author_classes}",
                    "{author}"
                }
            }
        }
    }
}

#[component]
fn ThinkingIndicator() -> Element {
    rsx! {
        div {
            class: "flex items-center justify-center space-x-1",
            span { class: "w-2.5 h-2.5 bg-white rounded-full animate-pulse-fast" }
            span { class: "w-2.5 h-2.5 bg-white rounded-full animate-pulse-medium" }
            span { class: "w-2.5 h-2.5 bg-white rounded-full animate-pulse-slow" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_answer_formats_code_first() {
        let generated = gemini::GeneratedLisp {
            code: "(defun c:T () (princ))".to_string(),
            explanation: "Açıklama.".to_string(),
        };
        let text = format_generated(&generated);
        assert!(text.starts_with("```lisp\n(defun c:T"));
        assert!(text.ends_with("Açıklama."));
    }

    #[test]
    fn explanation_only_answer_has_no_fence() {
        let generated = gemini::GeneratedLisp {
            code: String::new(),
            explanation: "Sadece açıklama.".to_string(),
        };
        assert_eq!(format_generated(&generated), "Sadece açıklama.");
    }

    #[test]
    fn draft_is_dropped_while_a_reply_is_pending() {
        assert!(accepts_draft("ikinci istek", false));
        assert!(!accepts_draft("ikinci istek", true));
        assert!(!accepts_draft("", false));
    }

    #[test]
    fn pasted_code_with_forbidden_pattern_is_blocked_before_dispatch() {
        let router = RequestRouter::new(RouterConfig::default());
        let mut gate = SecurityGate::new();
        let input = "(defun c:X () (command \"format c:\") (princ))";
        // The router still sees pasted code; the pre-flight must catch it.
        let route = router.classify(
            input,
            &[],
            &mut gate,
            false,
            false,
            false,
            chrono::Utc::now(),
        );
        assert!(matches!(route, Route::Code { .. }));
        assert!(preflight_outbound(&mut gate, input).is_err());
        assert_eq!(gate.violation_count(), 1);
    }
}
