pub mod chat;
pub mod contribute_modal;
pub mod library_panel;
pub mod proposal_card;
pub mod settings_panel;
