pub mod action;
pub mod client_identity;
pub mod prompt;

pub use action::DraftAction;
pub use client_identity::ClientIdentity;
pub use prompt::PromptBundle;
