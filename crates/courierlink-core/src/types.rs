// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across collaborator traits and the quota core.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Authentication identity of a user account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

/// Health status reported by store health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// The two sides of the marketplace.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Courier,
    Business,
}

impl Role {
    /// The role a sender must hold to contact someone of this role.
    pub fn counterpart(self) -> Role {
        match self {
            Role::Courier => Role::Business,
            Role::Business => Role::Courier,
        }
    }
}

/// Subscription tier of a business.
///
/// Ordered from cheapest to most capable, so `Free < Standard < Premium`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Standard,
    Premium,
}

impl PlanTier {
    /// Every tier in ascending order.
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Standard, PlanTier::Premium];
}

/// The signed-in user as reported by the session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: UserId(user_id.into()),
            email: None,
        }
    }
}

/// A courier or business profile owned by a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Row identifier of the profile.
    pub id: String,
    pub user_id: UserId,
    pub role: Role,
    /// Courier full name or business name.
    pub display_name: String,
    pub created_at: String,
}

/// The exact `(business, courier)` key of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationPair {
    pub business_id: UserId,
    pub courier_id: UserId,
}

impl ConversationPair {
    pub fn new(business_id: UserId, courier_id: UserId) -> Self {
        Self {
            business_id,
            courier_id,
        }
    }

    /// Both sides resolve to the same account.
    pub fn is_self_pair(&self) -> bool {
        self.business_id == self.courier_id
    }
}

/// The unique thread between one business identity and one courier identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub business_id: UserId,
    pub courier_id: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl Conversation {
    pub fn pair(&self) -> ConversationPair {
        ConversationPair::new(self.business_id.clone(), self.courier_id.clone())
    }

    /// Which side of the conversation `user` sits on, if any.
    pub fn role_of(&self, user: &UserId) -> Option<Role> {
        if &self.business_id == user {
            Some(Role::Business)
        } else if &self.courier_id == user {
            Some(Role::Courier)
        } else {
            None
        }
    }

    /// The other party, when `user` is a participant.
    pub fn counterpart_of(&self, user: &UserId) -> Option<&UserId> {
        match self.role_of(user)? {
            Role::Business => Some(&self.courier_id),
            Role::Courier => Some(&self.business_id),
        }
    }
}

/// A message that has passed the gate and is about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
}

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

/// A business row as stored, before catalog-derived fields are computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessRecord {
    pub id: String,
    pub user_id: UserId,
    pub business_name: String,
    pub plan: PlanTier,
    pub messages_sent_today: i64,
    pub approvals_today: i64,
    /// RFC 3339 timestamp of the last daily counter rollover.
    pub last_usage_reset: String,
    pub plan_updated_at: String,
}

/// Per-business plan and usage snapshot used by the gate.
///
/// Read-only from the core's perspective: the store owns the counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessPlanStatus {
    pub business_id: String,
    pub user_id: UserId,
    pub business_name: String,
    pub plan: PlanTier,
    pub messages_sent_today: i64,
    pub approvals_today: i64,
    pub messages_left: i64,
    pub approvals_left: i64,
    pub daily_message_limit: i64,
    pub daily_approval_limit: i64,
    pub can_receive_requests: bool,
    pub last_usage_reset: String,
    pub plan_updated_at: String,
}

/// A realtime stream a client can subscribe to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedChannel {
    /// Everything happening inside one conversation.
    Conversation(ConversationId),
    /// New conversations and incoming messages for one user.
    Inbox(UserId),
}

impl FeedChannel {
    /// Wire-style channel name, e.g. `conversation:<id>`.
    pub fn name(&self) -> String {
        match self {
            FeedChannel::Conversation(id) => format!("conversation:{id}"),
            FeedChannel::Inbox(user) => format!("inbox:{user}"),
        }
    }

    /// Whether `event` belongs on this channel.
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        match (self, event) {
            (FeedChannel::Conversation(id), ChangeEvent::MessageInserted { message, .. }) => {
                &message.conversation_id == id
            }
            (FeedChannel::Conversation(id), ChangeEvent::ConversationCreated(c)) => &c.id == id,
            (FeedChannel::Conversation(id), ChangeEvent::MessagesRead { conversation_id, .. }) => {
                conversation_id == id
            }
            (FeedChannel::Inbox(user), ChangeEvent::MessageInserted { recipient_id, .. }) => {
                recipient_id == user
            }
            (FeedChannel::Inbox(user), ChangeEvent::ConversationCreated(c)) => {
                &c.business_id == user || &c.courier_id == user
            }
            (FeedChannel::Inbox(_), ChangeEvent::MessagesRead { .. }) => false,
        }
    }
}

impl fmt::Display for FeedChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// A row-level change pushed by the realtime feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChangeEvent {
    MessageInserted {
        message: Message,
        recipient_id: UserId,
    },
    ConversationCreated(Conversation),
    MessagesRead {
        conversation_id: ConversationId,
        reader_id: UserId,
    },
}
