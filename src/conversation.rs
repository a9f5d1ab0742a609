use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::library::model::Snippet;

pub const WELCOME_TEXT: &str = "Merhaba! Ben AutoLISP Master. 🛡️ Güvenli mod aktif.\n\n\
    Bana bir komut tarif edin, hazır kütüphaneden arayayım ya da sıfırdan yazayım. \
    Kod yapıştırırsanız onarır ve açıklarım.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A file handed to the conversation alongside a submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_loading: bool,
    /// Marks answers served straight from the local library.
    #[serde(default)]
    pub is_library_result: bool,
    /// A snippet awaiting the user's accept-or-custom decision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Snippet>,
    /// The request text that produced the proposal, kept for the replay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_request: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl Message {
    fn base(role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content,
            timestamp: Utc::now(),
            is_loading: false,
            is_library_result: false,
            proposal: None,
            original_request: None,
            attachments: Vec::new(),
        }
    }

    pub fn user(content: String, attachments: Vec<Attachment>) -> Self {
        Self {
            attachments,
            ..Self::base(MessageRole::User, content)
        }
    }

    pub fn assistant(content: String) -> Self {
        Self::base(MessageRole::Assistant, content)
    }

    pub fn system(content: String) -> Self {
        Self::base(MessageRole::System, content)
    }

    /// Placeholder shown while a remote call is in flight.
    pub fn pending() -> Self {
        Self {
            is_loading: true,
            ..Self::base(MessageRole::Assistant, String::new())
        }
    }

    pub fn library_result(content: String) -> Self {
        Self {
            is_library_result: true,
            ..Self::base(MessageRole::Assistant, content)
        }
    }

    pub fn proposal(snippet: Snippet, original_request: String) -> Self {
        let content = format!(
            "📚 Kütüphanemde buna uygun hazır bir komut buldum: **{}**",
            snippet.title
        );
        Self {
            proposal: Some(snippet),
            original_request: Some(original_request),
            ..Self::base(MessageRole::Assistant, content)
        }
    }
}

/// Ordered transcript of the session. The welcome message is always the
/// first entry and survives a clear.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationLog {
    messages: Vec<Message>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(WELCOME_TEXT.to_string())],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn append(&mut self, message: Message) -> Uuid {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Replaces a pending placeholder with the final assistant content.
    pub fn resolve(&mut self, id: Uuid, content: String) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.content = content;
            msg.is_loading = false;
        }
    }

    /// Downgrades a pending placeholder to a system notice on failure, so
    /// errors are visible in the transcript but never read as model output.
    pub fn fail(&mut self, id: Uuid, notice: String) {
        if let Some(msg) = self.messages.iter_mut().find(|m| m.id == id) {
            msg.role = MessageRole::System;
            msg.content = notice;
            msg.is_loading = false;
        }
    }

    /// Detaches a proposal once the user has decided, so the card renders
    /// as plain history and cannot be acted on twice.
    pub fn settle_proposal(&mut self, id: Uuid) -> Option<(Snippet, String)> {
        let msg = self.messages.iter_mut().find(|m| m.id == id)?;
        let snippet = msg.proposal.take()?;
        let request = msg.original_request.take().unwrap_or_default();
        Some((snippet, request))
    }

    /// History sent to the remote model: user and assistant turns only,
    /// skipping placeholders and system notices.
    pub fn remote_history(&self, limit: usize) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| !m.is_loading && m.role != MessageRole::System)
            .rev()
            .take(limit)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::seed::seed_library;

    #[test]
    fn new_log_opens_with_the_welcome_message() {
        let log = ConversationLog::new();
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.messages()[0].role, MessageRole::Assistant);
        assert!(log.messages()[0].content.contains("AutoLISP Master"));
    }

    #[test]
    fn resolve_replaces_the_placeholder_in_place() {
        let mut log = ConversationLog::new();
        let id = log.append(Message::pending());
        assert!(log.messages().last().unwrap().is_loading);
        log.resolve(id, "cevap".to_string());
        let last = log.messages().last().unwrap();
        assert!(!last.is_loading);
        assert_eq!(last.content, "cevap");
        assert_eq!(last.role, MessageRole::Assistant);
    }

    #[test]
    fn fail_downgrades_to_a_system_notice() {
        let mut log = ConversationLog::new();
        let id = log.append(Message::pending());
        log.fail(id, "hata".to_string());
        let last = log.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::System);
        assert!(!last.is_loading);
    }

    #[test]
    fn settle_proposal_is_one_shot() {
        let mut log = ConversationLog::new();
        let snippet = seed_library().remove(0);
        let id = log.append(Message::proposal(snippet.clone(), "istek".to_string()));
        let (settled, request) = log.settle_proposal(id).unwrap();
        assert_eq!(settled.id, snippet.id);
        assert_eq!(request, "istek");
        assert!(log.settle_proposal(id).is_none());
    }

    #[test]
    fn clear_resets_to_the_welcome_state() {
        let mut log = ConversationLog::new();
        log.append(Message::user("merhaba".to_string(), vec![]));
        log.append(Message::assistant("selam".to_string()));
        log.clear();
        assert_eq!(log.messages().len(), 1);
        assert!(log.messages()[0].content.contains("AutoLISP Master"));
    }

    #[test]
    fn remote_history_skips_system_and_pending_turns() {
        let mut log = ConversationLog::new();
        log.append(Message::user("soru".to_string(), vec![]));
        log.append(Message::system("uyarı".to_string()));
        log.append(Message::pending());
        let history = log.remote_history(10);
        assert!(history.iter().all(|m| m.role != MessageRole::System));
        assert!(history.iter().all(|m| !m.is_loading));
        assert_eq!(history.len(), 2);
    }
}
