pub mod attachments;
pub mod gemini;
