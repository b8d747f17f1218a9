// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hard preconditions for contacting another user.
//!
//! Checked in a fixed order so each attempt fails with the first reason that
//! applies: unauthenticated, self contact, missing complementary profile,
//! missing target, then the optional inbound-request policy.

use courierlink_config::model::GateConfig;
use courierlink_core::{
    ConversationPair, CourierlinkError, Identity, MatchStore, Profile, Role, UserId,
};
use courierlink_plans::plan_status;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Who the sender wants to contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub target: UserId,
    pub target_role: Role,
}

impl ContactRequest {
    pub fn business(user: impl Into<String>) -> Self {
        Self {
            target: UserId(user.into()),
            target_role: Role::Business,
        }
    }

    pub fn courier(user: impl Into<String>) -> Self {
        Self {
            target: UserId(user.into()),
            target_role: Role::Courier,
        }
    }
}

/// Policy switches that change which contacts are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactPolicy {
    /// Refuse couriers contacting businesses whose plan cannot receive requests.
    pub enforce_inbound_requests: bool,
}

impl From<&GateConfig> for ContactPolicy {
    fn from(config: &GateConfig) -> Self {
        Self {
            enforce_inbound_requests: config.enforce_inbound_requests,
        }
    }
}

/// A contact that passed every precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleContact {
    pub sender: Identity,
    /// The role the sender acts in, complementary to the target's.
    pub sender_role: Role,
    pub target: Profile,
    pub pair: ConversationPair,
}

impl EligibleContact {
    /// The business side of the pair, whose quota governs sending.
    pub fn business_id(&self) -> &UserId {
        &self.pair.business_id
    }
}

/// Run every precondition for `sender` contacting `request.target`.
pub async fn check(
    store: &dyn MatchStore,
    sender: Option<Identity>,
    request: &ContactRequest,
    policy: ContactPolicy,
) -> Result<EligibleContact, CourierlinkError> {
    let sender = sender.ok_or(CourierlinkError::Unauthenticated)?;

    if sender.user_id == request.target {
        return Err(CourierlinkError::SelfContactRejected);
    }

    let sender_role = request.target_role.counterpart();
    if store
        .find_profile(&sender.user_id, sender_role)
        .await?
        .is_none()
    {
        debug!(user_id = %sender.user_id, required = %sender_role, "sender lacks complementary profile");
        return Err(CourierlinkError::RoleMismatch {
            required: sender_role,
            target: request.target_role,
        });
    }

    let target = store
        .find_profile(&request.target, request.target_role)
        .await?
        .ok_or_else(|| CourierlinkError::NotFound {
            entity: match request.target_role {
                Role::Courier => "courier",
                Role::Business => "business",
            },
            id: request.target.to_string(),
        })?;

    if policy.enforce_inbound_requests && request.target_role == Role::Business {
        let record = store
            .get_business_plan_status(&request.target)
            .await?
            .ok_or_else(|| CourierlinkError::NotFound {
                entity: "business",
                id: request.target.to_string(),
            })?;
        let status = plan_status(&record);
        if !status.can_receive_requests {
            return Err(CourierlinkError::InboundRequestsDisabled { tier: status.plan });
        }
    }

    let pair = match request.target_role {
        Role::Business => ConversationPair::new(request.target.clone(), sender.user_id.clone()),
        Role::Courier => ConversationPair::new(sender.user_id.clone(), request.target.clone()),
    };

    Ok(EligibleContact {
        sender,
        sender_role,
        target,
        pair,
    })
}
