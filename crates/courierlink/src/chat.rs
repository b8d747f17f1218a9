// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat commands: `contact`, `send`, `messages`, `conversations`.
//!
//! Each runs on behalf of the `--as` user through the same orchestration
//! the web client uses.

use std::sync::Arc;

use courierlink_chat::{
    ButtonAction, ChatStarter, ContactRequest, MessageSender, StartChatButton,
};
use courierlink_config::model::GateConfig;
use courierlink_core::{
    ConversationId, CourierlinkError, MatchStore, Message, SessionProvider, UserId,
};
use courierlink_plans::{Dismissal, WarningBanner};

use crate::Outcome;

/// Who the `contact` command reaches out to.
#[derive(Debug, Clone)]
pub enum Target {
    Courier(String),
    Business(String),
}

impl Target {
    fn request(&self) -> ContactRequest {
        match self {
            Target::Courier(user) => ContactRequest::courier(user.as_str()),
            Target::Business(user) => ContactRequest::business(user.as_str()),
        }
    }
}

/// Run `courierlink contact`: one press of the start-chat button.
pub async fn run_contact(
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
    gate: &GateConfig,
    target: &Target,
    json: bool,
) -> Result<Outcome, CourierlinkError> {
    let starter = ChatStarter::new(store, session, gate);
    let button = StartChatButton::new(starter, target.request(), gate);
    let action = button
        .click()
        .await
        .ok_or_else(|| CourierlinkError::Internal("start chat already in flight".into()))?;

    if json {
        crate::print_json(&action);
    } else {
        print_action(&action);
    }
    Ok(match action {
        ButtonAction::Navigate { .. } => Outcome::Done,
        _ => Outcome::Refused,
    })
}

fn print_action(action: &ButtonAction) {
    match action {
        ButtonAction::Navigate { url, gate } => {
            println!("chat opened: {url}");
            if let Some(banner) = WarningBanner::for_state(*gate, &Dismissal::default()) {
                println!("{}: {}", banner.title, banner.body);
            }
        }
        ButtonAction::RedirectToSignIn { url } => {
            println!("sign in required (pass --as <user>): {url}");
        }
        ButtonAction::ShowNotice(notice) => {
            println!("{}", notice.message);
            if let Some(action) = &notice.action {
                println!("  {}: {}", action.label, action.url);
            }
        }
        ButtonAction::ShowModal(modal) => {
            println!("{}", modal.title);
            println!("  {}", modal.body);
            println!("  {}: {}", modal.upgrade_label, modal.upgrade_url);
        }
    }
}

/// Run `courierlink send`.
pub async fn run_send(
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
    conversation: &ConversationId,
    text: &str,
    json: bool,
) -> Result<Outcome, CourierlinkError> {
    let sent = MessageSender::new(store, session).send(conversation, text).await?;
    if json {
        crate::print_json(&sent);
        return Ok(Outcome::Done);
    }

    println!("sent {}", sent.message.id.0);
    if let Some(banner) = WarningBanner::for_state(sent.gate, &Dismissal::default()) {
        println!("{}: {}", banner.title, banner.body);
    }
    Ok(Outcome::Done)
}

/// Run `courierlink messages`.
pub async fn run_messages(
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
    conversation: &ConversationId,
    limit: Option<i64>,
    mark_read: bool,
    json: bool,
) -> Result<Outcome, CourierlinkError> {
    let sender = MessageSender::new(store, session);
    let messages = sender.history(conversation, limit).await?;
    let marked = if mark_read {
        sender.mark_read(conversation).await?
    } else {
        0
    };

    if json {
        crate::print_json(&messages);
    } else {
        for message in &messages {
            print_message(message);
        }
        if mark_read {
            println!("{marked} marked as read");
        }
    }
    Ok(Outcome::Done)
}

fn print_message(message: &Message) {
    let unread = if message.is_read { "" } else { " *" };
    println!(
        "[{}] {}: {}{unread}",
        message.created_at, message.sender_id, message.content
    );
}

/// Run `courierlink conversations` for the `--as` user.
pub async fn run_conversations(
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
    json: bool,
) -> Result<Outcome, CourierlinkError> {
    let me: UserId = session
        .current_user()
        .await?
        .ok_or(CourierlinkError::Unauthenticated)?
        .user_id;
    let conversations = store.list_conversations(&me).await?;

    if json {
        crate::print_json(&conversations);
    } else if conversations.is_empty() {
        println!("no conversations");
    } else {
        for conversation in &conversations {
            let other = conversation
                .counterpart_of(&me)
                .map(ToString::to_string)
                .unwrap_or_default();
            println!(
                "{}  with {other}  (updated {})",
                conversation.id, conversation.updated_at
            );
        }
    }
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_core::PlanTier;
    use courierlink_test_utils::{MockSession, MockStore};

    async fn store() -> Arc<MockStore> {
        let store = Arc::new(MockStore::new());
        store.add_courier("cou", "Deniz").await;
        store.add_business("biz", "Pideci", PlanTier::Free).await;
        store
    }

    #[tokio::test]
    async fn contact_opens_chat_once() {
        let store = store().await;
        let outcome = run_contact(
            store.clone(),
            Arc::new(MockSession::signed_in("biz")),
            &GateConfig::default(),
            &Target::Courier("cou".into()),
            true,
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Done);
        assert_eq!(store.conversation_count().await, 1);
    }

    #[tokio::test]
    async fn signed_out_contact_is_refused() {
        let store = store().await;
        let outcome = run_contact(
            store.clone(),
            Arc::new(MockSession::signed_out()),
            &GateConfig::default(),
            &Target::Courier("cou".into()),
            false,
        )
        .await
        .unwrap();
        assert_eq!(outcome, Outcome::Refused);
        assert_eq!(store.conversation_count().await, 0);
    }

    #[tokio::test]
    async fn conversations_require_a_user() {
        let err = run_conversations(
            store().await,
            Arc::new(MockSession::signed_out()),
            false,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CourierlinkError::Unauthenticated));
    }
}
