use crate::domain::models::billing::{RanchBilling as DomainBilling, Tier as DomainTier};
use crate::domain::models::ranch::{Pasture as DomainPasture, Ranch as DomainRanch};
use shared::{
    Pasture as SharedPasture, PastureListResponse, Ranch as SharedRanch, RanchBilling,
    RanchListResponse, Tier as SharedTier,
};

/// Mapper to convert ranch, pasture, and billing domain models to DTOs.
pub struct RanchMapper;

impl RanchMapper {
    pub fn tier_to_dto(tier: DomainTier) -> SharedTier {
        match tier {
            DomainTier::Free => SharedTier::Free,
            DomainTier::Starter => SharedTier::Starter,
            DomainTier::Pro => SharedTier::Pro,
            DomainTier::Max => SharedTier::Max,
        }
    }

    pub fn to_dto(ranch: DomainRanch) -> SharedRanch {
        SharedRanch {
            id: ranch.id,
            name: ranch.name,
            owner_user_id: ranch.owner_user_id,
            created_at: ranch.created_at.to_rfc3339(),
        }
    }

    pub fn to_ranch_list_dto(ranches: Vec<DomainRanch>) -> RanchListResponse {
        RanchListResponse {
            ranches: ranches.into_iter().map(Self::to_dto).collect(),
        }
    }

    pub fn pasture_to_dto(pasture: DomainPasture) -> SharedPasture {
        SharedPasture {
            id: pasture.id,
            name: pasture.name,
            created_at: pasture.created_at.to_rfc3339(),
        }
    }

    pub fn to_pasture_list_dto(pastures: Vec<DomainPasture>) -> PastureListResponse {
        PastureListResponse {
            pastures: pastures.into_iter().map(Self::pasture_to_dto).collect(),
        }
    }

    pub fn billing_to_dto(billing: DomainBilling, read_only: bool) -> RanchBilling {
        let max_cows = billing.subscription_tier.limits().max_cows;
        RanchBilling {
            subscription_tier: Self::tier_to_dto(billing.subscription_tier),
            subscription_status: billing.subscription_status,
            subscription_override: billing.subscription_override,
            trial_ends_at: billing.trial_ends_at.map(|d| d.to_rfc3339()),
            current_period_end: billing.current_period_end.map(|d| d.to_rfc3339()),
            peak_cow_count: billing.peak_cow_count,
            read_only,
            max_cows,
        }
    }
}
