//! Artifact slot persistence (`contract_artifacts`).

use chrono::{DateTime, Utc};
use edusign_core::{ContractNumber, DocumentKind};
use edusign_ledger::StoredArtifact;
use sqlx::{PgConnection, PgPool};

/// Overwrite the slot of `(num, kind)`.
pub async fn upsert(
    conn: &mut PgConnection,
    num: &ContractNumber,
    kind: DocumentKind,
    artifact: &StoredArtifact,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contract_artifacts
         (contract_num, document_kind, content_type, template, bytes, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (contract_num, document_kind) DO UPDATE
         SET content_type = EXCLUDED.content_type, template = EXCLUDED.template,
             bytes = EXCLUDED.bytes, updated_at = EXCLUDED.updated_at",
    )
    .bind(num.as_str())
    .bind(kind.as_str())
    .bind(&artifact.content_type)
    .bind(&artifact.template)
    .bind(&artifact.bytes[..])
    .bind(artifact.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Every stored slot. Rows with an unparseable key are skipped.
pub async fn load_all(
    pool: &PgPool,
) -> Result<Vec<(ContractNumber, DocumentKind, StoredArtifact)>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ArtifactRow>(
        "SELECT contract_num, document_kind, content_type, template, bytes, updated_at
         FROM contract_artifacts",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let key = format!("{}/{}", row.contract_num, row.document_kind);
            let slot = row.into_slot();
            if slot.is_none() {
                tracing::warn!(slot = %key, "skipping artifact row with invalid key");
            }
            slot
        })
        .collect())
}

#[derive(sqlx::FromRow)]
struct ArtifactRow {
    contract_num: String,
    document_kind: String,
    content_type: String,
    template: String,
    bytes: Vec<u8>,
    updated_at: DateTime<Utc>,
}

impl ArtifactRow {
    fn into_slot(self) -> Option<(ContractNumber, DocumentKind, StoredArtifact)> {
        let num = ContractNumber::new(self.contract_num).ok()?;
        let kind = DocumentKind::from_name(&self.document_kind)?;
        Some((
            num,
            kind,
            StoredArtifact::new(self.content_type, self.template, self.bytes, self.updated_at),
        ))
    }
}
