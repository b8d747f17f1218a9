// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static plan catalog.
//!
//! One record per [`PlanTier`]. Limits and prices never decrease as the
//! tier increases, and only the top tier accepts inbound contact requests.

use courierlink_core::PlanTier;
use serde::Serialize;

use crate::quota::UNLIMITED;

/// Limits and presentation data attached to a plan tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub tier: PlanTier,
    /// Display name shown on the pricing page.
    pub name: &'static str,
    /// Monthly price in whole lira.
    pub price: u32,
    pub daily_message_limit: i64,
    pub daily_approval_limit: i64,
    /// Whether couriers may open conversations with businesses on this plan.
    pub can_receive_requests: bool,
    pub description: &'static str,
}

static CATALOG: [PlanLimits; 3] = [
    PlanLimits {
        tier: PlanTier::Free,
        name: "Ücretsiz",
        price: 0,
        daily_message_limit: 2,
        daily_approval_limit: 2,
        can_receive_requests: false,
        description: "Günde 2 kuryeye mesaj gönderin ve 2 başvuruyu onaylayın.",
    },
    PlanLimits {
        tier: PlanTier::Standard,
        name: "Standart",
        price: 299,
        daily_message_limit: 20,
        daily_approval_limit: 20,
        can_receive_requests: false,
        description: "Günde 20 mesaj ve 20 başvuru onayı ile büyüyen işletmeler için.",
    },
    PlanLimits {
        tier: PlanTier::Premium,
        name: "Premium",
        price: 599,
        daily_message_limit: UNLIMITED,
        daily_approval_limit: UNLIMITED,
        can_receive_requests: true,
        description: "Sınırsız mesaj ve onay. Kuryeler size doğrudan ulaşabilir.",
    },
];

/// Limits for `tier`.
pub fn limits_of(tier: PlanTier) -> &'static PlanLimits {
    match tier {
        PlanTier::Free => &CATALOG[0],
        PlanTier::Standard => &CATALOG[1],
        PlanTier::Premium => &CATALOG[2],
    }
}

/// All plan records, cheapest first.
pub fn catalog() -> &'static [PlanLimits] {
    &CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_record_per_tier() {
        assert_eq!(catalog().len(), PlanTier::ALL.len());
        for tier in PlanTier::ALL {
            assert_eq!(limits_of(tier).tier, tier);
            assert_eq!(catalog().iter().filter(|p| p.tier == tier).count(), 1);
        }
    }

    #[test]
    fn price_and_message_limit_strictly_increase() {
        for pair in catalog().windows(2) {
            assert!(pair[0].tier < pair[1].tier);
            assert!(pair[0].price < pair[1].price, "{} vs {}", pair[0].name, pair[1].name);
            assert!(pair[0].daily_message_limit < pair[1].daily_message_limit);
            assert!(pair[0].daily_approval_limit <= pair[1].daily_approval_limit);
        }
    }

    #[test]
    fn only_premium_receives_requests() {
        for plan in catalog() {
            assert_eq!(plan.can_receive_requests, plan.tier == PlanTier::Premium);
        }
    }

    #[test]
    fn limits_are_positive() {
        for plan in catalog() {
            assert!(plan.daily_message_limit > 0);
            assert!(plan.daily_approval_limit > 0);
        }
    }

    #[test]
    fn premium_is_unlimited() {
        let premium = limits_of(PlanTier::Premium);
        assert!(crate::quota::is_unlimited(premium.daily_message_limit));
        assert!(!crate::quota::is_unlimited(limits_of(PlanTier::Standard).daily_message_limit));
    }
}
