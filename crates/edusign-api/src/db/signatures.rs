//! Signature log persistence (`contract_signatures`).
//!
//! Rows are only ever inserted or flipped to `is_valid = false`.

use chrono::{DateTime, Utc};
use edusign_core::{ContractNumber, DocumentHash, DocumentKind, Iin, SignatureRecord, SignatureUid};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub async fn insert(conn: &mut PgConnection, record: &SignatureRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO contract_signatures
         (signature_uid, contract_num, document_kind, cms_signature, signed_data,
          document_hash, signer_iin, certificate_info, is_valid, signed_at,
          verified_at, created_by)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(record.signature_uid.as_uuid())
    .bind(record.contract_num.as_str())
    .bind(record.document_kind.as_str())
    .bind(&record.cms_signature)
    .bind(&record.signed_data)
    .bind(record.document_hash.as_str())
    .bind(record.signer_iin.as_str())
    .bind(&record.certificate_info)
    .bind(record.is_valid)
    .bind(record.signed_at)
    .bind(record.verified_at)
    .bind(record.created_by.as_ref().map(Iin::as_str))
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Mark a record invalid. Returns whether a valid row was flipped.
pub async fn invalidate(conn: &mut PgConnection, uid: &SignatureUid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE contract_signatures SET is_valid = FALSE
         WHERE signature_uid = $1 AND is_valid",
    )
    .bind(uid.as_uuid())
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Every record, oldest first.
pub async fn load_all(pool: &PgPool) -> Result<Vec<SignatureRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, SignatureRow>(
        "SELECT signature_uid, contract_num, document_kind, cms_signature, signed_data,
                document_hash, signer_iin, certificate_info, is_valid, signed_at,
                verified_at, created_by
         FROM contract_signatures ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let uid = row.signature_uid;
        match row.into_record() {
            Ok(record) => records.push(record),
            Err(field) => {
                tracing::warn!(signature_uid = %uid, field, "skipping signature row with invalid field")
            }
        }
    }
    Ok(records)
}

#[derive(sqlx::FromRow)]
struct SignatureRow {
    signature_uid: Uuid,
    contract_num: String,
    document_kind: String,
    cms_signature: String,
    signed_data: String,
    document_hash: String,
    signer_iin: String,
    certificate_info: serde_json::Value,
    is_valid: bool,
    signed_at: DateTime<Utc>,
    verified_at: DateTime<Utc>,
    created_by: Option<String>,
}

impl SignatureRow {
    /// Convert, naming the first field that fails to parse.
    fn into_record(self) -> Result<SignatureRecord, &'static str> {
        let created_by = match self.created_by {
            Some(iin) => Some(Iin::new(iin).map_err(|_| "created_by")?),
            None => None,
        };
        Ok(SignatureRecord {
            signature_uid: SignatureUid::from_uuid(self.signature_uid),
            contract_num: ContractNumber::new(self.contract_num).map_err(|_| "contract_num")?,
            document_kind: DocumentKind::from_name(&self.document_kind).ok_or("document_kind")?,
            cms_signature: self.cms_signature,
            signed_data: self.signed_data,
            document_hash: DocumentHash::from_hex(self.document_hash.trim())
                .ok_or("document_hash")?,
            signer_iin: Iin::new(self.signer_iin).map_err(|_| "signer_iin")?,
            certificate_info: self.certificate_info,
            is_valid: self.is_valid,
            signed_at: self.signed_at,
            verified_at: self.verified_at,
            created_by,
        })
    }
}
