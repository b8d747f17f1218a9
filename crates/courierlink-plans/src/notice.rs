// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing surfaces for gate decisions and interaction errors.
//!
//! The passive [`WarningBanner`] can be dismissed for the rest of a session.
//! The [`BlockingModal`] ignores dismissal and always appears for an
//! exhausted quota.

use courierlink_core::{CourierlinkError, Role};
use serde::Serialize;

use crate::gate::GateState;

/// Session-scoped banner suppression.
///
/// Hiding the banner never changes whether a send is permitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dismissal {
    dismissed: bool,
}

impl Dismissal {
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Warning,
    Error,
}

/// Dismissible banner shown above the chat composer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarningBanner {
    pub tone: Tone,
    pub title: String,
    pub body: String,
    pub dismissible: bool,
}

impl WarningBanner {
    /// Banner for `state`, unless the state needs none or the user hid it.
    pub fn for_state(state: GateState, dismissal: &Dismissal) -> Option<Self> {
        if dismissal.is_dismissed() {
            return None;
        }
        match state {
            GateState::Allowed => None,
            GateState::WarnLow { remaining } => Some(Self {
                tone: Tone::Warning,
                title: "Mesaj hakkınız azalıyor".to_string(),
                body: format!("Bugün {remaining} mesaj hakkınız kaldı."),
                dismissible: true,
            }),
            GateState::BlockedExhausted => Some(Self {
                tone: Tone::Error,
                title: "Günlük mesaj limitiniz doldu".to_string(),
                body: "Yeni mesaj göndermek için yarını bekleyin veya planınızı yükseltin."
                    .to_string(),
                dismissible: true,
            }),
        }
    }
}

/// Modal that blocks the composer until the user closes it or upgrades.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingModal {
    pub title: String,
    pub body: String,
    pub upgrade_label: String,
    pub upgrade_url: String,
}

impl BlockingModal {
    /// Present for an exhausted quota regardless of any banner dismissal.
    pub fn for_state(state: GateState, upgrade_url: &str) -> Option<Self> {
        match state {
            GateState::BlockedExhausted => Some(Self::exhausted(upgrade_url)),
            GateState::Allowed | GateState::WarnLow { .. } => None,
        }
    }

    fn exhausted(upgrade_url: &str) -> Self {
        Self {
            title: "Günlük mesaj limitine ulaştınız".to_string(),
            body: "Planınızın bugünkü mesaj hakkı tükendi. Haklarınız 24 saat içinde \
                   yenilenir; beklemeden devam etmek için planınızı yükseltebilirsiniz."
                .to_string(),
            upgrade_label: "Planı Yükselt".to_string(),
            upgrade_url: upgrade_url.to_string(),
        }
    }
}

/// Call-to-action attached to a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeAction {
    pub label: String,
    pub url: String,
}

/// Explanatory message shown in place of the requested action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub action: Option<NoticeAction>,
}

impl Notice {
    fn plain(message: &str) -> Self {
        Self {
            message: message.to_string(),
            action: None,
        }
    }

    /// The "something went wrong" notice shown for infrastructure failures.
    pub fn generic() -> Self {
        Self::plain("Bir şeyler ters gitti. Lütfen tekrar deneyin.")
    }

    /// Copy for an interaction error.
    ///
    /// Returns `None` for errors that never reach the user: an unauthenticated
    /// attempt redirects to sign-in and a constraint collision is recovered
    /// silently.
    pub fn from_error(err: &CourierlinkError, upgrade_url: &str) -> Option<Self> {
        let notice = match err {
            CourierlinkError::Unauthenticated | CourierlinkError::ConstraintCollision { .. } => {
                return None;
            }
            CourierlinkError::RoleMismatch { required, .. } => match required {
                Role::Courier => Self::plain(
                    "İşletmelere mesaj gönderebilmek için kurye profiliniz olmalıdır.",
                ),
                Role::Business => Self::plain(
                    "Kuryelere mesaj gönderebilmek için işletme profiliniz olmalıdır.",
                ),
            },
            CourierlinkError::SelfContactRejected => {
                Self::plain("Kendinize mesaj gönderemezsiniz.")
            }
            CourierlinkError::QuotaExhausted { limit, .. } => Self {
                message: format!(
                    "Günlük {limit} mesaj hakkınızı kullandınız. Limitiniz yarın yenilenecek."
                ),
                action: Some(NoticeAction {
                    label: "Planı Yükselt".to_string(),
                    url: upgrade_url.to_string(),
                }),
            },
            CourierlinkError::InboundRequestsDisabled { .. } => {
                Self::plain("Bu işletme şu anda kuryelerden doğrudan talep kabul etmiyor.")
            }
            CourierlinkError::NotFound { .. } => Self::plain("Aradığınız profil bulunamadı."),
            CourierlinkError::NotParticipant(_) => Self::plain("Bu konuşmaya erişiminiz yok."),
            CourierlinkError::EmptyMessage => Self::plain("Mesaj boş olamaz."),
            CourierlinkError::Storage { .. }
            | CourierlinkError::Config(_)
            | CourierlinkError::Internal(_) => Self::generic(),
        };
        Some(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_core::{PlanTier, UserId};

    const UPGRADE: &str = "/pricing";

    #[test]
    fn low_quota_banner_states_exact_count() {
        let banner =
            WarningBanner::for_state(GateState::WarnLow { remaining: 2 }, &Dismissal::default())
                .unwrap();
        assert_eq!(banner.tone, Tone::Warning);
        assert!(banner.body.contains('2'));
        assert!(banner.dismissible);
    }

    #[test]
    fn allowed_state_has_no_surfaces() {
        assert!(WarningBanner::for_state(GateState::Allowed, &Dismissal::default()).is_none());
        assert!(BlockingModal::for_state(GateState::Allowed, UPGRADE).is_none());
    }

    #[test]
    fn dismissal_hides_banner_but_not_modal() {
        let mut dismissal = Dismissal::default();
        dismissal.dismiss();
        let state = GateState::BlockedExhausted;

        assert!(WarningBanner::for_state(state, &dismissal).is_none());
        let modal = BlockingModal::for_state(state, UPGRADE).unwrap();
        assert_eq!(modal.upgrade_url, UPGRADE);
        assert!(!state.permits_send());
    }

    #[test]
    fn role_mismatch_copy_names_required_profile() {
        let courier = Notice::from_error(
            &CourierlinkError::RoleMismatch {
                required: Role::Courier,
                target: Role::Business,
            },
            UPGRADE,
        )
        .unwrap();
        assert!(courier.message.contains("kurye profiliniz"));

        let business = Notice::from_error(
            &CourierlinkError::RoleMismatch {
                required: Role::Business,
                target: Role::Courier,
            },
            UPGRADE,
        )
        .unwrap();
        assert!(business.message.contains("işletme profiliniz"));
    }

    #[test]
    fn quota_notice_offers_upgrade() {
        let notice = Notice::from_error(
            &CourierlinkError::QuotaExhausted {
                tier: PlanTier::Free,
                limit: 2,
            },
            UPGRADE,
        )
        .unwrap();
        assert_eq!(notice.action.unwrap().url, UPGRADE);
    }

    #[test]
    fn silent_errors_produce_no_notice() {
        assert!(Notice::from_error(&CourierlinkError::Unauthenticated, UPGRADE).is_none());
        assert!(
            Notice::from_error(
                &CourierlinkError::ConstraintCollision {
                    business_id: UserId::from("b"),
                    courier_id: UserId::from("c"),
                },
                UPGRADE
            )
            .is_none()
        );
    }

    #[test]
    fn store_failures_are_generic() {
        let notice = Notice::from_error(
            &CourierlinkError::storage(std::io::Error::other("connection reset")),
            UPGRADE,
        )
        .unwrap();
        assert!(notice.message.starts_with("Bir şeyler ters gitti"));
        assert!(!notice.message.contains("connection reset"));
    }
}
