// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The gate-then-resolve sequence behind a "start chat" action.

use std::sync::Arc;

use courierlink_config::model::GateConfig;
use courierlink_core::{Conversation, CourierlinkError, MatchStore, Role, SessionProvider};
use courierlink_plans::gate::{GateState, require_message_quota};
use courierlink_plans::plan_status;
use serde::Serialize;
use tracing::info;

use crate::eligibility::{self, ContactPolicy, ContactRequest, EligibleContact};
use crate::resolver::ConversationResolver;

/// A successfully opened chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatStart {
    pub conversation: Conversation,
    /// Quota state of the sending business. Couriers are never gated.
    pub gate: GateState,
    /// Route of the chat view for this conversation.
    pub route: String,
}

/// Opens chats: eligibility, quota, then find-or-create.
#[derive(Clone)]
pub struct ChatStarter {
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
    resolver: ConversationResolver,
    policy: ContactPolicy,
    chat_path: String,
}

impl ChatStarter {
    pub fn new(
        store: Arc<dyn MatchStore>,
        session: Arc<dyn SessionProvider>,
        config: &GateConfig,
    ) -> Self {
        Self {
            resolver: ConversationResolver::new(store.clone()),
            store,
            session,
            policy: ContactPolicy::from(config),
            chat_path: config.chat_path.trim_end_matches('/').to_string(),
        }
    }

    /// Run the full sequence for the current user.
    ///
    /// Nothing is created unless every precondition and the quota pass.
    pub async fn start(&self, request: &ContactRequest) -> Result<ChatStart, CourierlinkError> {
        let sender = self.session.current_user().await?;
        let contact = eligibility::check(self.store.as_ref(), sender, request, self.policy).await?;
        let gate = self.sender_gate(&contact).await?;

        let conversation = self
            .resolver
            .resolve_or_create(&contact.pair.business_id, &contact.pair.courier_id)
            .await?;
        info!(
            conversation_id = %conversation.id,
            sender = %contact.sender.user_id,
            "chat opened"
        );

        Ok(ChatStart {
            route: format!("{}/{}", self.chat_path, conversation.id),
            conversation,
            gate,
        })
    }

    /// Fresh quota decision for a business sender.
    async fn sender_gate(&self, contact: &EligibleContact) -> Result<GateState, CourierlinkError> {
        if contact.sender_role != Role::Business {
            return Ok(GateState::Allowed);
        }
        let record = self
            .store
            .get_business_plan_status(&contact.sender.user_id)
            .await?
            .ok_or_else(|| CourierlinkError::NotFound {
                entity: "business",
                id: contact.sender.user_id.to_string(),
            })?;
        require_message_quota(&plan_status(&record))
    }
}
