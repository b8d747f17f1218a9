// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Start-chat control.
//!
//! Turns one click into at most one outstanding start sequence and maps its
//! outcome to what the interface should do next.

use std::sync::atomic::{AtomicBool, Ordering};

use courierlink_config::model::GateConfig;
use courierlink_core::CourierlinkError;
use courierlink_plans::gate::GateState;
use courierlink_plans::{BlockingModal, Notice};
use serde::Serialize;
use tracing::{debug, error};

use crate::eligibility::ContactRequest;
use crate::starter::ChatStarter;

/// What the interface does after a click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ButtonAction {
    /// Open the chat view. The gate state drives the warning banner there.
    Navigate { url: String, gate: GateState },
    RedirectToSignIn { url: String },
    ShowNotice(Notice),
    ShowModal(BlockingModal),
}

/// A start-chat button bound to one target.
pub struct StartChatButton {
    starter: ChatStarter,
    request: ContactRequest,
    in_flight: AtomicBool,
    sign_in_path: String,
    upgrade_url: String,
}

/// Clears the in-flight flag when the sequence ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl StartChatButton {
    pub fn new(starter: ChatStarter, request: ContactRequest, config: &GateConfig) -> Self {
        Self {
            starter,
            request,
            in_flight: AtomicBool::new(false),
            sign_in_path: config.sign_in_path.clone(),
            upgrade_url: config.upgrade_url.clone(),
        }
    }

    /// Whether a start sequence is outstanding. The control renders disabled.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Handle a click.
    ///
    /// Returns `None` when a previous click is still being processed.
    pub async fn click(&self) -> Option<ButtonAction> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(target_user = %self.request.target, "click ignored, start already in flight");
            return None;
        }
        let _guard = InFlight(&self.in_flight);

        let action = match self.starter.start(&self.request).await {
            Ok(start) => ButtonAction::Navigate {
                url: start.route,
                gate: start.gate,
            },
            Err(err) => self.action_for_error(&err),
        };
        Some(action)
    }

    fn action_for_error(&self, err: &CourierlinkError) -> ButtonAction {
        match err {
            CourierlinkError::Unauthenticated => ButtonAction::RedirectToSignIn {
                url: self.sign_in_path.clone(),
            },
            CourierlinkError::QuotaExhausted { .. } => {
                match BlockingModal::for_state(GateState::BlockedExhausted, &self.upgrade_url) {
                    Some(modal) => ButtonAction::ShowModal(modal),
                    None => self.notice(err),
                }
            }
            other => {
                if other.is_retryable() {
                    error!(error = %other, "start chat failed");
                }
                self.notice(other)
            }
        }
    }

    fn notice(&self, err: &CourierlinkError) -> ButtonAction {
        ButtonAction::ShowNotice(
            Notice::from_error(err, &self.upgrade_url).unwrap_or_else(Notice::generic),
        )
    }
}
