use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::models::billing::{tier_for_cow_count, RanchBilling, Tier};
use crate::storage::csv::{CsvConnection, RanchRepository};
use crate::storage::RanchStorage;

/// Verdict on whether a ranch may take another cow. `reason` and
/// `required_tier` are set only when the write is blocked, so the
/// caller can render an upgrade prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteGate {
    pub allowed: bool,
    pub reason: Option<String>,
    pub required_tier: Option<Tier>,
}

impl WriteGate {
    fn allowed() -> Self {
        WriteGate {
            allowed: true,
            reason: None,
            required_tier: None,
        }
    }
}

/// Service for subscription-tier gating. Checkout and customer-portal
/// URLs come from the hosted billing functions and are not handled
/// here; this service only reads the billing snapshot stored on the
/// ranch row and answers write-gate questions.
#[derive(Clone)]
pub struct BillingService {
    ranch_repository: RanchRepository,
}

impl BillingService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let ranch_repository = RanchRepository::new(csv_conn);
        Self { ranch_repository }
    }

    /// The billing snapshot stored on the ranch row.
    pub fn get_billing(&self, ranch_id: &str) -> DomainResult<RanchBilling> {
        let ranch = self
            .ranch_repository
            .get_ranch(ranch_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("ranch {}", ranch_id)))?;
        Ok(ranch.billing)
    }

    pub fn can_add_cow(&self, ranch_id: &str, current_cow_count: u32) -> DomainResult<WriteGate> {
        let billing = self.get_billing(ranch_id)?;
        let gate = can_add_cow_at(&billing, current_cow_count, Utc::now());
        debug!(
            "Write gate for ranch {}: allowed={} (count={})",
            ranch_id, gate.allowed, current_cow_count
        );
        Ok(gate)
    }

    pub fn is_read_only(&self, ranch_id: &str) -> DomainResult<bool> {
        let billing = self.get_billing(ranch_id)?;
        Ok(is_read_only_at(&billing, Utc::now()))
    }

    /// Record a new high-water mark for the herd size, used by billing
    /// to detect tier overruns after downgrades.
    pub fn record_peak_cow_count(&self, ranch_id: &str, count: u32) -> DomainResult<()> {
        let mut ranch = self
            .ranch_repository
            .get_ranch(ranch_id)
            .map_err(DomainError::from_store)?
            .ok_or_else(|| DomainError::NotFound(format!("ranch {}", ranch_id)))?;

        if count > ranch.billing.peak_cow_count {
            ranch.billing.peak_cow_count = count;
            self.ranch_repository
                .update_ranch(&ranch)
                .map_err(DomainError::from_store)?;
            info!("Ranch {} peak cow count now {}", ranch_id, count);
        }

        Ok(())
    }
}

/// Tier a herd of the given size requires.
pub fn required_tier(cow_count: u32) -> Tier {
    tier_for_cow_count(cow_count)
}

/// Whether the ranch may add one more cow on top of `current_cow_count`.
pub fn can_add_cow_at(
    billing: &RanchBilling,
    current_cow_count: u32,
    now: DateTime<Utc>,
) -> WriteGate {
    // Lifetime free always writes.
    if billing.subscription_override.as_deref() == Some("lifetime_free") {
        return WriteGate::allowed();
    }

    // Active trial writes; an expired trial falls through to the
    // normal checks.
    if billing.subscription_override.as_deref() == Some("trial") {
        if let Some(ends_at) = billing.trial_ends_at {
            if ends_at > now {
                return WriteGate::allowed();
            }
        }
    }

    if billing.subscription_status == "read_only" || billing.subscription_status == "past_due" {
        return WriteGate {
            allowed: false,
            reason: Some(
                "Your subscription has lapsed. Please update your payment to continue."
                    .to_string(),
            ),
            required_tier: None,
        };
    }

    let tier = billing.subscription_tier;
    let max_cows = tier.limits().max_cows;

    if current_cow_count >= max_cows {
        let required = required_tier(current_cow_count + 1);
        return WriteGate {
            allowed: false,
            reason: Some(format!(
                "You've reached the {} plan limit of {} cows. Upgrade to {} to add more.",
                tier.limits().name,
                max_cows,
                required.limits().name
            )),
            required_tier: Some(required),
        };
    }

    WriteGate::allowed()
}

/// Whether the ranch is blocked from all herd writes.
pub fn is_read_only_at(billing: &RanchBilling, now: DateTime<Utc>) -> bool {
    if billing.subscription_override.as_deref() == Some("lifetime_free") {
        return false;
    }

    if billing.subscription_override.as_deref() == Some("trial") {
        if let Some(ends_at) = billing.trial_ends_at {
            if ends_at > now {
                return false;
            }
        }
        return true;
    }

    billing.subscription_status == "read_only" || billing.subscription_status == "canceled"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn billing(tier: Tier) -> RanchBilling {
        RanchBilling {
            subscription_tier: tier,
            subscription_status: "active".to_string(),
            subscription_override: None,
            trial_ends_at: None,
            current_period_end: None,
            peak_cow_count: 0,
        }
    }

    #[test]
    fn free_tier_caps_at_ten() {
        let now = Utc::now();
        let b = billing(Tier::Free);

        assert!(can_add_cow_at(&b, 9, now).allowed);
        let gate = can_add_cow_at(&b, 10, now);
        assert!(!gate.allowed);
        assert_eq!(gate.required_tier, Some(Tier::Starter));
        assert!(gate.reason.unwrap().contains("Starter"));
    }

    #[test]
    fn max_tier_is_unbounded() {
        let now = Utc::now();
        let b = billing(Tier::Max);
        assert!(can_add_cow_at(&b, 1_000_000, now).allowed);
    }

    #[test]
    fn lifetime_free_overrides_everything() {
        let now = Utc::now();
        let mut b = billing(Tier::Free);
        b.subscription_override = Some("lifetime_free".to_string());
        b.subscription_status = "read_only".to_string();

        assert!(can_add_cow_at(&b, 5000, now).allowed);
        assert!(!is_read_only_at(&b, now));
    }

    #[test]
    fn trial_is_time_boxed() {
        let now = Utc::now();
        let mut b = billing(Tier::Free);
        b.subscription_override = Some("trial".to_string());
        b.trial_ends_at = Some(now + Duration::days(3));

        assert!(can_add_cow_at(&b, 400, now).allowed);
        assert!(!is_read_only_at(&b, now));

        // Expired trial is read-only and falls back to tier checks.
        b.trial_ends_at = Some(now - Duration::hours(1));
        assert!(is_read_only_at(&b, now));
        assert!(!can_add_cow_at(&b, 400, now).allowed);
    }

    #[test]
    fn lapsed_status_blocks_with_payment_reason() {
        let now = Utc::now();
        let mut b = billing(Tier::Pro);
        b.subscription_status = "past_due".to_string();

        let gate = can_add_cow_at(&b, 0, now);
        assert!(!gate.allowed);
        assert!(gate.reason.unwrap().contains("payment"));
        assert_eq!(gate.required_tier, None);
    }

    #[test]
    fn read_only_statuses() {
        let now = Utc::now();
        let mut b = billing(Tier::Starter);
        assert!(!is_read_only_at(&b, now));

        b.subscription_status = "read_only".to_string();
        assert!(is_read_only_at(&b, now));

        b.subscription_status = "canceled".to_string();
        assert!(is_read_only_at(&b, now));
    }

    #[test]
    fn peak_cow_count_only_rises() {
        use crate::storage::csv::test_utils::test_connection;
        use crate::domain::models::ranch::Ranch;

        let (connection, _temp_dir) = test_connection();
        let conn = Arc::new(connection);
        let repo = RanchRepository::new(conn.clone());
        let service = BillingService::new(conn);

        let ranch = Ranch {
            id: "ranch-1".to_string(),
            name: "Bar W".to_string(),
            owner_user_id: "user-1".to_string(),
            billing: billing(Tier::Free),
            created_at: Utc::now(),
        };
        repo.store_ranch(&ranch).unwrap();

        service.record_peak_cow_count("ranch-1", 4).unwrap();
        service.record_peak_cow_count("ranch-1", 2).unwrap();

        assert_eq!(service.get_billing("ranch-1").unwrap().peak_cow_count, 4);
    }
}
