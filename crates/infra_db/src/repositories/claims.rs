//! Claims repository implementation
//!
//! Row-level access to the `claims` table. Domain conversion happens in
//! [`crate::adapters::claims`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = "claim_id, owner_id, owner_name, claim_type, claim_amount, \
     return_amount, claim_limit, currency, file_url, file_name, status, created_at, updated_at";

/// One row of the `claims` table
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub owner_id: String,
    pub owner_name: Option<String>,
    pub claim_type: String,
    pub claim_amount: Decimal,
    pub return_amount: Decimal,
    pub claim_limit: Decimal,
    pub currency: String,
    pub file_url: String,
    pub file_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a new claim row
#[derive(Debug, Clone)]
pub struct NewClaimRow {
    pub claim_id: Uuid,
    pub owner_id: String,
    pub owner_name: Option<String>,
    pub claim_type: String,
    pub claim_amount: Decimal,
    pub return_amount: Decimal,
    pub claim_limit: Decimal,
    pub currency: String,
    pub file_url: String,
    pub file_name: String,
    pub status: String,
}

/// Repository for the `claims` table
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a claim and returns the stored row
    pub async fn insert(&self, claim: NewClaimRow) -> Result<ClaimRow, DatabaseError> {
        let sql = format!(
            "INSERT INTO claims (
                claim_id, owner_id, owner_name, claim_type, claim_amount,
                return_amount, claim_limit, currency, file_url, file_name,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {CLAIM_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim.claim_id)
            .bind(claim.owner_id)
            .bind(claim.owner_name)
            .bind(claim.claim_type)
            .bind(claim.claim_amount)
            .bind(claim.return_amount)
            .bind(claim.claim_limit)
            .bind(claim.currency)
            .bind(claim.file_url)
            .bind(claim.file_name)
            .bind(claim.status)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        Ok(row)
    }

    /// Retrieves a claim by its identifier
    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<ClaimRow, DatabaseError> {
        let sql = format!("SELECT {CLAIM_COLUMNS} FROM claims WHERE claim_id = $1");

        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    /// Lists claims newest first, optionally for one owner
    pub async fn list(&self, owner_id: Option<&str>, limit: Option<i64>) -> Result<Vec<ClaimRow>, DatabaseError> {
        let sql = format!(
            "SELECT {CLAIM_COLUMNS} FROM claims
             WHERE ($1::TEXT IS NULL OR owner_id = $1)
             ORDER BY created_at DESC, claim_id DESC
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(owner_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Sets the status of a claim whose current status is `expected`
    ///
    /// Returns `Conflict` when the claim exists in a different status.
    pub async fn update_status(
        &self,
        claim_id: Uuid,
        expected: &str,
        status: &str,
    ) -> Result<ClaimRow, DatabaseError> {
        let sql = format!(
            "UPDATE claims SET status = $3, updated_at = $4
             WHERE claim_id = $1 AND status = $2
             RETURNING {CLAIM_COLUMNS}"
        );

        let updated = sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .bind(expected)
            .bind(status)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Ok(row),
            None => {
                let current = self.get_by_id(claim_id).await?;
                Err(DatabaseError::Conflict(format!(
                    "claim {claim_id} is {} and cannot become {status}",
                    current.status
                )))
            }
        }
    }

    /// Checks the pool can run a query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
