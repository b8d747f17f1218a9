// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing chat flows for courierlink.
//!
//! Starting a chat runs the eligibility preconditions, the sending
//! business's quota check, and the conversation resolver, in that order.
//! Collaborators are injected as `Arc<dyn ...>` so every flow can run
//! against the SQLite store or an in-memory fake.

pub mod button;
pub mod eligibility;
pub mod live;
pub mod resolver;
pub mod sender;
pub mod starter;

pub use button::{ButtonAction, StartChatButton};
pub use eligibility::{ContactPolicy, ContactRequest, EligibleContact};
pub use live::ConversationView;
pub use resolver::ConversationResolver;
pub use sender::{MessageSender, SentMessage};
pub use starter::{ChatStart, ChatStarter};
