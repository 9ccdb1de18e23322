use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subscription tier bounding how many cows a ranch may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Starter,
    Pro,
    Max,
}

/// Fixed pricing and cap for a tier. Prices are whole dollars per the
/// published plans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierLimits {
    pub name: &'static str,
    pub max_cows: u32,
    pub monthly_price: u32,
    pub annual_price: u32,
}

pub const TIERS: [(Tier, TierLimits); 4] = [
    (
        Tier::Free,
        TierLimits {
            name: "Free",
            max_cows: 10,
            monthly_price: 0,
            annual_price: 0,
        },
    ),
    (
        Tier::Starter,
        TierLimits {
            name: "Starter",
            max_cows: 100,
            monthly_price: 10,
            annual_price: 102,
        },
    ),
    (
        Tier::Pro,
        TierLimits {
            name: "Ranch Pro",
            max_cows: 500,
            monthly_price: 20,
            annual_price: 204,
        },
    ),
    (
        Tier::Max,
        TierLimits {
            name: "Ranch Max",
            max_cows: u32::MAX,
            monthly_price: 35,
            annual_price: 357,
        },
    ),
];

impl Tier {
    pub fn limits(&self) -> &'static TierLimits {
        match TIERS.iter().find(|(tier, _)| tier == self) {
            Some((_, limits)) => limits,
            None => unreachable!(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Starter => "starter",
            Tier::Pro => "pro",
            Tier::Max => "max",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Tier::Free),
            "starter" => Some(Tier::Starter),
            "pro" => Some(Tier::Pro),
            "max" => Some(Tier::Max),
            _ => None,
        }
    }
}

/// Smallest tier whose cap covers the given herd size.
pub fn tier_for_cow_count(count: u32) -> Tier {
    if count <= 10 {
        Tier::Free
    } else if count <= 100 {
        Tier::Starter
    } else if count <= 500 {
        Tier::Pro
    } else {
        Tier::Max
    }
}

/// Billing state stored on the ranch row. `subscription_override`
/// recognizes two values: `lifetime_free` (always writable) and `trial`
/// (writable until `trial_ends_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RanchBilling {
    pub subscription_tier: Tier,
    pub subscription_status: String,
    pub subscription_override: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub peak_cow_count: u32,
}

impl RanchBilling {
    /// Starting state for a new ranch.
    pub fn free() -> Self {
        RanchBilling {
            subscription_tier: Tier::Free,
            subscription_status: "active".to_string(),
            subscription_override: None,
            trial_ends_at: None,
            current_period_end: None,
            peak_cow_count: 0,
        }
    }
}
