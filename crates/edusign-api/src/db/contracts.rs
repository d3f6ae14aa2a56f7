//! Contract view persistence.
//!
//! Operates on the `contracts` and `supplemental_contracts` tables. The
//! `status_ref` column is authoritative over the copy inside `body`.

use edusign_core::{
    ContractNumber, ContractRecord, ContractStatusRef, DocumentKind, SupplementalContract,
};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

/// Insert or replace a contract view.
pub async fn upsert_contract(
    conn: &mut PgConnection,
    contract: &ContractRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contracts (contract_num, status_ref, body, updated_at)
         VALUES ($1, $2, $3, now())
         ON CONFLICT (contract_num) DO UPDATE
         SET status_ref = EXCLUDED.status_ref, body = EXCLUDED.body, updated_at = now()",
    )
    .bind(contract.number.as_str())
    .bind(contract.status_ref.0)
    .bind(Json(contract))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Insert or replace an addendum view.
pub async fn upsert_supplemental(
    conn: &mut PgConnection,
    addendum: &SupplementalContract,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO supplemental_contracts (contract_num, status_ref, body, updated_at)
         VALUES ($1, $2, $3, now())
         ON CONFLICT (contract_num) DO UPDATE
         SET status_ref = EXCLUDED.status_ref, body = EXCLUDED.body, updated_at = now()",
    )
    .bind(addendum.primary_number.as_str())
    .bind(addendum.status_ref.0)
    .bind(Json(addendum))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Set the status of the `kind` document of `num`. Returns whether a row
/// was updated.
pub async fn update_status(
    conn: &mut PgConnection,
    num: &ContractNumber,
    kind: DocumentKind,
    status: ContractStatusRef,
) -> Result<bool, sqlx::Error> {
    let sql = match kind {
        DocumentKind::Primary => {
            "UPDATE contracts SET status_ref = $1, updated_at = now() WHERE contract_num = $2"
        }
        DocumentKind::Supplemental => {
            "UPDATE supplemental_contracts SET status_ref = $1, updated_at = now() WHERE contract_num = $2"
        }
    };
    let result = sqlx::query(sql)
        .bind(status.0)
        .bind(num.as_str())
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<ContractRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ContractRow>(
        "SELECT status_ref, body FROM contracts ORDER BY contract_num",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(ContractRow::into_record).collect())
}

pub async fn load_all_supplemental(pool: &PgPool) -> Result<Vec<SupplementalContract>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SupplementalRow>(
        "SELECT status_ref, body FROM supplemental_contracts ORDER BY contract_num",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(SupplementalRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct ContractRow {
    status_ref: i64,
    body: Json<ContractRecord>,
}

impl ContractRow {
    fn into_record(self) -> ContractRecord {
        let mut record = self.body.0;
        record.status_ref = ContractStatusRef(self.status_ref);
        record
    }
}

#[derive(sqlx::FromRow)]
struct SupplementalRow {
    status_ref: i64,
    body: Json<SupplementalContract>,
}

impl SupplementalRow {
    fn into_record(self) -> SupplementalContract {
        let mut record = self.body.0;
        record.status_ref = ContractStatusRef(self.status_ref);
        record
    }
}
