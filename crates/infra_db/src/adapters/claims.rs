//! PostgreSQL Claim Store
//!
//! Implements [`ClaimStore`] on top of [`ClaimsRepository`], translating
//! between `claims` rows and [`ClaimRecord`]s.
//!
//! # Error Handling
//!
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::Conflict` -> `PortError::Conflict`
//! - Other errors -> `PortError::Internal`

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    ClaimId, Currency, DomainPort, HealthCheckResult, HealthCheckable, Money, OwnerId, PortError,
};
use domain_claims::{ClaimQuery, ClaimRecord, ClaimStatus, ClaimStore, ClaimType, NewClaimRecord};

use crate::repositories::claims::{ClaimRow, ClaimsRepository, NewClaimRow};

const ADAPTER_ID: &str = "postgres-claim-store";

/// PostgreSQL-backed [`ClaimStore`]
#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    repository: ClaimsRepository,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool),
        }
    }

    pub fn repository(&self) -> &ClaimsRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = self.repository.ping().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => HealthCheckResult::healthy(ADAPTER_ID, latency_ms),
            Err(e) => HealthCheckResult::unhealthy(ADAPTER_ID, latency_ms, format!("Database error: {e}")),
        }
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    #[instrument(skip(self, claim), fields(owner = %claim.owner_id, claim_type = %claim.claim_type))]
    async fn insert(&self, claim: NewClaimRecord) -> Result<ClaimRecord, PortError> {
        let row = self.repository.insert(new_row(claim)).await?;
        debug!(claim_id = %row.claim_id, "claim row inserted");
        row_to_record(row)
    }

    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get(&self, id: ClaimId) -> Result<ClaimRecord, PortError> {
        let row = self.repository.get_by_id(*id.as_uuid()).await?;
        row_to_record(row)
    }

    #[instrument(skip(self))]
    async fn list(&self, query: ClaimQuery) -> Result<Vec<ClaimRecord>, PortError> {
        let rows = self
            .repository
            .list(query.owner_id.as_ref().map(OwnerId::as_str), query.limit.map(i64::from))
            .await?;
        rows.into_iter().map(row_to_record).collect()
    }

    #[instrument(skip(self), fields(claim_id = %id, status = %status))]
    async fn update_status(&self, id: ClaimId, status: ClaimStatus) -> Result<ClaimRecord, PortError> {
        let current = self.get(id).await?;
        if !current.status.can_transition_to(status) {
            return Err(PortError::conflict(format!(
                "claim {id} is {} and cannot become {status}",
                current.status
            )));
        }

        let row = self
            .repository
            .update_status(*id.as_uuid(), current.status.as_str(), status.as_str())
            .await?;
        row_to_record(row)
    }
}

fn new_row(claim: NewClaimRecord) -> NewClaimRow {
    NewClaimRow {
        claim_id: *ClaimId::new_v7().as_uuid(),
        owner_id: claim.owner_id.as_str().to_string(),
        owner_name: claim.owner_name,
        claim_type: claim.claim_type.as_str().to_string(),
        claim_amount: claim.claim_amount.amount(),
        return_amount: claim.return_amount.amount(),
        claim_limit: claim.claim_limit.amount(),
        currency: claim.claim_amount.currency().code().to_string(),
        file_url: claim.file_url,
        file_name: claim.file_name,
        status: claim.status.as_str().to_string(),
    }
}

/// Converts a stored row back into a domain record
pub fn row_to_record(row: ClaimRow) -> Result<ClaimRecord, PortError> {
    let currency = Currency::from_str(row.currency.trim())
        .map_err(|e| PortError::internal_with_source("stored claim has an unknown currency", e))?;
    let claim_type = ClaimType::from_str(&row.claim_type)
        .map_err(|e| PortError::internal_with_source("stored claim has an unknown type", e))?;
    let status = ClaimStatus::from_str(&row.status)
        .map_err(|e| PortError::internal_with_source("stored claim has an unknown status", e))?;

    Ok(ClaimRecord {
        id: ClaimId::from_uuid(row.claim_id),
        owner_id: OwnerId::new(row.owner_id),
        owner_name: row.owner_name,
        claim_type,
        claim_amount: Money::new(row.claim_amount, currency),
        return_amount: Money::new(row.return_amount, currency),
        claim_limit: Money::new(row.claim_limit, currency),
        file_url: row.file_url,
        file_name: row.file_name,
        status,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn row() -> ClaimRow {
        ClaimRow {
            claim_id: Uuid::now_v7(),
            owner_id: "anonymous_user".to_string(),
            owner_name: Some("Ada".to_string()),
            claim_type: "Broadband".to_string(),
            claim_amount: dec!(600.0000),
            return_amount: dec!(498.0000),
            claim_limit: dec!(650.0000),
            currency: "USD".to_string(),
            file_url: "http://files/claims/anonymous_user/1_bill.png".to_string(),
            file_name: "bill.png".to_string(),
            status: "Approved".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_converts_to_record() {
        let record = row_to_record(row()).unwrap();
        assert_eq!(record.claim_type, ClaimType::Broadband);
        assert_eq!(record.status, ClaimStatus::Approved);
        assert_eq!(record.return_amount.amount(), dec!(498));
        assert_eq!(record.claim_amount.currency(), Currency::USD);
    }

    #[test]
    fn test_unknown_type_is_internal_error() {
        let mut bad = row();
        bad.claim_type = "Landline".to_string();
        assert!(matches!(row_to_record(bad), Err(PortError::Internal { .. })));
    }
}
