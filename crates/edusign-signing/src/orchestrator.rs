//! # Signing Orchestrator
//!
//! Runs one signing attempt end to end:
//!
//! 1. resolve the contract by number (addenda auto-detected);
//! 2. reject if a valid, unmodified signature already exists;
//! 3. verify the CMS signature at the trust authority;
//! 4. cross-check the verified signer against the caller;
//! 5. allocate the signature uid, then render the artifact with its QR;
//! 6. hash contract fields (at the post-transition status) plus the staged
//!    artifact bytes;
//! 7. stage the primary record;
//! 8. stage the status transition;
//! 9. stage one counter-signature per institutional signatory, same hash;
//! 10. commit, re-checking step 2 under the contract lock.
//!
//! Steps 1 through 4 write nothing. Everything from step 5 on is staged in a
//! [`UnitOfWork`](edusign_ledger::UnitOfWork), so any failure drops the whole
//! attempt.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use edusign_core::{
    document_hash, ContractNumber, DocumentHash, DocumentKind, Iin, SignatureRecord, SignatureUid,
};
use edusign_ledger::{
    CommitGuard, LedgerError, ResolvedContract, SignatureLedger, StoredArtifact, UnitOfWork,
};
use edusign_render::{ContractView, DocumentRenderer, SignatureQrPayload};
use edusign_verify::{SignatureVerifier, VerifiedSigner};

use crate::config::SigningConfig;
use crate::error::SigningError;
use crate::payload::{self, SigningData};
use crate::phase::{PhaseLog, SigningPhase};

/// Success message returned to the signer.
pub const SIGNED_MESSAGE: &str = "Подпись успешно верифицирована и сохранена";

/// A sign request as submitted.
#[derive(Debug, Clone, Default)]
pub struct SignRequest {
    pub contract_num: String,
    /// CMS signature container.
    pub cms: String,
    /// Signed payload, base64.
    pub data: String,
    /// Caller's hint; also set automatically when an addendum exists.
    pub is_dop_contract: bool,
}

/// Result of a committed signing.
#[derive(Debug, Clone)]
pub struct SignOutcome {
    pub signature_uid: SignatureUid,
    pub signer_iin: Iin,
    pub contract_num: ContractNumber,
    pub kind: DocumentKind,
    pub document_hash: DocumentHash,
    pub counter_signatures: Vec<SignatureUid>,
    pub signed_at: DateTime<Utc>,
    pub phases: PhaseLog,
}

/// Drives the signing protocol over a verifier, a renderer and the ledger.
#[derive(Clone)]
pub struct SigningOrchestrator {
    verifier: Arc<dyn SignatureVerifier>,
    renderer: DocumentRenderer,
    ledger: SignatureLedger,
    config: Arc<SigningConfig>,
}

impl std::fmt::Debug for SigningOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningOrchestrator")
            .field("verifier", &self.verifier.adapter_name())
            .field("ledger", &self.ledger)
            .field("counter_signers", &self.config.counter_signers.len())
            .finish()
    }
}

impl SigningOrchestrator {
    pub fn new(
        verifier: Arc<dyn SignatureVerifier>,
        ledger: SignatureLedger,
        config: SigningConfig,
    ) -> Self {
        let renderer = DocumentRenderer::new(config.render.clone());
        Self {
            verifier,
            renderer,
            ledger,
            config: Arc::new(config),
        }
    }

    pub fn ledger(&self) -> &SignatureLedger {
        &self.ledger
    }

    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    pub fn verifier_name(&self) -> &str {
        self.verifier.adapter_name()
    }

    /// Resolve a contract number, reporting a missing addendum distinctly.
    pub fn resolve(
        &self,
        num: &ContractNumber,
        requested_supplemental: bool,
    ) -> Result<ResolvedContract, SigningError> {
        self.ledger
            .book()
            .resolve(num, requested_supplemental)
            .map_err(|e| match e {
                LedgerError::ContractNotFound(n)
                    if requested_supplemental && self.ledger.book().contract(&n).is_some() =>
                {
                    SigningError::SupplementalNotFound(n)
                }
                other => other.into(),
            })
    }

    /// The payload an external signer must sign for `num`.
    pub fn signing_data(&self, num: &ContractNumber) -> Result<SigningData, SigningError> {
        Ok(SigningData::for_contract(&self.resolve(num, false)?))
    }

    /// Run one signing attempt.
    ///
    /// `caller` is the authenticated caller's known identity. When `None`,
    /// the identity cross-check is skipped.
    pub async fn sign(
        &self,
        request: &SignRequest,
        caller: Option<&Iin>,
    ) -> Result<SignOutcome, SigningError> {
        let num = parse_contract_num(&request.contract_num)?;
        payload::validate_material(&request.cms, &request.data)?;

        let mut phases = PhaseLog::new();
        let result = self.run(&num, request, caller, &mut phases).await;

        match &result {
            Ok(outcome) => tracing::info!(
                contract_num = %num,
                signature_uid = %outcome.signature_uid,
                signer_iin = %outcome.signer_iin,
                kind = %outcome.kind,
                hash = outcome.document_hash.short(),
                counter_signatures = outcome.counter_signatures.len(),
                "contract signed"
            ),
            Err(e) if e.is_internal() => tracing::error!(
                contract_num = %num,
                phase = %phases.current(),
                error = %e,
                "signing attempt failed"
            ),
            Err(e) => tracing::warn!(
                contract_num = %num,
                phase = %phases.current(),
                error_code = %e.code(),
                "signing attempt declined"
            ),
        }
        result
    }

    async fn run(
        &self,
        num: &ContractNumber,
        request: &SignRequest,
        caller: Option<&Iin>,
        phases: &mut PhaseLog,
    ) -> Result<SignOutcome, SigningError> {
        // 1-2: resolve, early already-signed check.
        let resolved = self.resolve(num, request.is_dop_contract)?;
        let kind = resolved.kind();
        self.ledger.ensure_not_signed(num, kind)?;

        // 3-4: verification and identity cross-check. No writes yet.
        phases.advance(SigningPhase::Verifying)?;
        let signer = match self.verify(request, caller).await {
            Ok(signer) => signer,
            Err(e) => {
                phases.advance(SigningPhase::VerificationFailed)?;
                return Err(e);
            }
        };
        phases.advance(SigningPhase::Verified)?;

        // 5: uid first, so the signer QR embeds it in a single render.
        phases.advance(SigningPhase::GeneratingArtifact)?;
        let signature_uid = SignatureUid::new();
        let signed_at = Utc::now();
        let mut uow = self.ledger.begin(num.clone());
        if let Err(e) =
            self.render_into(&mut uow, &resolved, signature_uid, &signer.signer_iin, signed_at)
        {
            phases.advance(SigningPhase::GenerationFailed)?;
            return Err(e);
        }
        phases.advance(SigningPhase::ArtifactReady)?;

        match self
            .stage_and_commit(uow, &resolved, request, signature_uid, &signer, signed_at, phases)
            .await
        {
            Ok((document_hash, counter_signatures)) => {
                phases.advance(SigningPhase::Completed)?;
                Ok(SignOutcome {
                    signature_uid,
                    signer_iin: signer.signer_iin,
                    contract_num: num.clone(),
                    kind,
                    document_hash,
                    counter_signatures,
                    signed_at,
                    phases: phases.clone(),
                })
            }
            Err(e) => {
                phases.advance(SigningPhase::RolledBack)?;
                Err(e)
            }
        }
    }

    async fn verify(
        &self,
        request: &SignRequest,
        caller: Option<&Iin>,
    ) -> Result<VerifiedSigner, SigningError> {
        let signer = self
            .verifier
            .verify(request.cms.trim(), request.data.trim())
            .await?;
        if let Some(caller) = caller {
            if caller != &signer.signer_iin {
                return Err(SigningError::IinMismatch {
                    caller: caller.clone(),
                    signer: signer.signer_iin,
                });
            }
        }
        Ok(signer)
    }

    fn render_into(
        &self,
        uow: &mut UnitOfWork,
        resolved: &ResolvedContract,
        signature_uid: SignatureUid,
        signer_iin: &Iin,
        signed_at: DateTime<Utc>,
    ) -> Result<(), SigningError> {
        let num = resolved.number().clone();
        let signer_qr = SignatureQrPayload::new(
            self.config.frontend_url(),
            signature_uid,
            num.clone(),
            signer_iin.clone(),
            signed_at,
        );
        let counter_qrs: Vec<_> = self
            .config
            .counter_signers
            .iter()
            .map(|c| c.qr_payload(num.clone(), signed_at))
            .collect();

        let view = match &resolved.supplemental {
            Some(addendum) => ContractView::supplemental(&resolved.contract, addendum),
            None => ContractView::primary(&resolved.contract),
        };
        let rendered = self.renderer.render(&view, &signer_qr, &counter_qrs)?;
        uow.stage_artifact(
            rendered.kind,
            StoredArtifact::new(
                rendered.content_type,
                rendered.template.as_str(),
                rendered.bytes,
                rendered.rendered_at,
            ),
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn stage_and_commit(
        &self,
        mut uow: UnitOfWork,
        resolved: &ResolvedContract,
        request: &SignRequest,
        signature_uid: SignatureUid,
        signer: &VerifiedSigner,
        signed_at: DateTime<Utc>,
        phases: &mut PhaseLog,
    ) -> Result<(DocumentHash, Vec<SignatureUid>), SigningError> {
        let kind = resolved.kind();
        let num = resolved.number().clone();

        // 6: the authoritative hash, over the bytes that will be stored.
        phases.advance(SigningPhase::Hashing)?;
        let artifact = uow.staged_artifact(kind).map(|a| a.bytes.clone());
        let hash = document_hash(
            &resolved.hash_fields_after_signing(self.config.signed_status),
            artifact.as_deref(),
        );

        // 7: primary record.
        phases.advance(SigningPhase::Persisting)?;
        uow.append(SignatureRecord {
            signature_uid,
            contract_num: num.clone(),
            document_kind: kind,
            cms_signature: request.cms.trim().to_string(),
            signed_data: request.data.trim().to_string(),
            document_hash: hash.clone(),
            signer_iin: signer.signer_iin.clone(),
            certificate_info: signer.certificate_info.clone(),
            is_valid: true,
            signed_at,
            verified_at: signer.verified_at,
            created_by: Some(signer.signer_iin.clone()),
        });

        // 8: status of the signed document.
        phases.advance(SigningPhase::StatusTransition)?;
        uow.transition_status(kind, self.config.signed_status);

        // 9: counter-signatures reuse the hash from step 6.
        phases.advance(SigningPhase::CounterSigning)?;
        let mut counter_uids = Vec::with_capacity(self.config.counter_signers.len());
        for counter in &self.config.counter_signers {
            let now = Utc::now();
            let record = uow.append(SignatureRecord {
                signature_uid: SignatureUid::new(),
                contract_num: num.clone(),
                document_kind: kind,
                cms_signature: counter.cms_signature.clone(),
                signed_data: request.data.trim().to_string(),
                document_hash: hash.clone(),
                signer_iin: counter.iin.clone(),
                certificate_info: counter.certificate_info.clone(),
                is_valid: true,
                signed_at: now,
                verified_at: now,
                created_by: None,
            });
            counter_uids.push(record.signature_uid);
        }

        // 10: commit; ALREADY_SIGNED is re-checked under the contract lock.
        self.ledger
            .commit(uow, CommitGuard::RejectIfSigned(kind))
            .await?;
        Ok((hash, counter_uids))
    }
}

fn parse_contract_num(raw: &str) -> Result<ContractNumber, SigningError> {
    if raw.trim().is_empty() {
        return Err(SigningError::MissingParameter("contract_num"));
    }
    ContractNumber::new(raw.trim()).map_err(|e| SigningError::InvalidParameter {
        field: "contract_num",
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use edusign_core::{
        AggregateStatus, Amount, ContractRecord, ContractStatusRef, ErrorCode, Installment,
        LanguageTrack, ParentInfo, PaymentSchedule, SchoolDirection, StudentInfo, StudentRef,
        SupplementalContract,
    };
    use edusign_ledger::{Changeset, ChangesetSink, StoreError};
    use edusign_verify::{MockVerifier, VerificationError};

    const PARENT: &str = "123456789012";

    fn iin(s: &str) -> Iin {
        Iin::new(s).unwrap()
    }

    fn num() -> ContractNumber {
        ContractNumber::new("2024Д-1400").unwrap()
    }

    fn contract() -> ContractRecord {
        ContractRecord {
            number: num(),
            amount: Amount::from_major(500_000),
            date: NaiveDate::from_ymd_opt(2024, 8, 15).unwrap(),
            student_ref: StudentRef(77),
            status_ref: ContractStatusRef(1),
            payment_schedule: PaymentSchedule::Monthly,
            language_track: LanguageTrack::Russian,
            direction: SchoolDirection::General,
            edu_year: Some("2024-2025".into()),
            contract_sum: None,
            contribution: None,
            discounts: vec![10],
            installments: (1..=9)
                .map(|i| Installment {
                    pay_date: NaiveDate::from_ymd_opt(2024, 9, i),
                    quarter: ((i - 1) / 3 + 1) as u8,
                })
                .collect(),
            student: StudentInfo {
                full_name: "Ахметов Арман".into(),
                ..Default::default()
            },
            parent: ParentInfo {
                full_name: "Ахметова Динара".into(),
                iin: Some(PARENT.into()),
                ..Default::default()
            },
        }
    }

    fn request() -> SignRequest {
        SignRequest {
            contract_num: "2024Д-1400".into(),
            cms: "MIIB-cms".into(),
            data: "Q09OVFJBQ1RfU0lHTg==".into(),
            is_dop_contract: false,
        }
    }

    fn orchestrator_with(
        verifier: MockVerifier,
        ledger: SignatureLedger,
    ) -> (SigningOrchestrator, Arc<MockVerifier>) {
        let verifier = Arc::new(verifier);
        ledger.book().upsert_contract(contract());
        let orch = SigningOrchestrator::new(
            verifier.clone(),
            ledger,
            SigningConfig::builtin().unwrap(),
        );
        (orch, verifier)
    }

    fn orchestrator(verifier: MockVerifier) -> (SigningOrchestrator, Arc<MockVerifier>) {
        orchestrator_with(verifier, SignatureLedger::in_memory())
    }

    #[tokio::test]
    async fn successful_signing_writes_primary_and_counter_signatures() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let out = orch.sign(&request(), Some(&iin(PARENT))).await.unwrap();

        assert_eq!(out.kind, DocumentKind::Primary);
        assert_eq!(out.counter_signatures.len(), 2);
        assert_eq!(out.phases.current(), SigningPhase::Completed);

        let records = orch.ledger().list_by_contract(&num());
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.document_hash == out.document_hash));
        assert_eq!(records.iter().filter(|r| r.is_institutional()).count(), 2);
        let primary = orch.ledger().get(&out.signature_uid).unwrap();
        assert_eq!(primary.created_by, Some(iin(PARENT)));
        assert_eq!(primary.signed_data, request().data);

        assert_eq!(
            orch.ledger().book().contract(&num()).unwrap().status_ref,
            ContractStatusRef(2)
        );
        let sigs = orch.ledger().status_of(&num()).await.unwrap();
        assert_eq!(sigs.status, AggregateStatus::Signed);
    }

    #[tokio::test]
    async fn stored_hash_matches_stored_artifact() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let out = orch.sign(&request(), None).await.unwrap();
        assert_eq!(
            orch.ledger().current_hash(&num(), DocumentKind::Primary),
            Some(out.document_hash)
        );
        let artifact = orch
            .ledger()
            .artifacts()
            .get(&num(), DocumentKind::Primary)
            .unwrap();
        let html = std::str::from_utf8(&artifact.bytes).unwrap();
        assert!(html.contains("<svg"));
        assert!(html.contains("Ахметов Арман"));
        assert_eq!(artifact.template, "school_monthly");
    }

    #[tokio::test]
    async fn second_signing_is_already_signed_without_calling_verifier() {
        let (orch, verifier) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        orch.sign(&request(), None).await.unwrap();
        let err = orch.sign(&request(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AlreadySigned);
        assert_eq!(verifier.calls(), 1);
        assert_eq!(orch.ledger().count(&num()), 3);
    }

    #[tokio::test]
    async fn verification_failure_writes_nothing() {
        let (orch, _) = orchestrator(MockVerifier::rejecting(ErrorCode::VerificationFailed));
        let err = orch.sign(&request(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::VerificationFailed);
        assert_eq!(orch.ledger().count(&num()), 0);
        assert!(orch
            .ledger()
            .artifacts()
            .get(&num(), DocumentKind::Primary)
            .is_none());
    }

    #[tokio::test]
    async fn gateway_timeout_propagates_code() {
        let (orch, _) = orchestrator(MockVerifier::failing(VerificationError::Timeout {
            elapsed_secs: 30,
        }));
        let err = orch.sign(&request(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::Timeout);
    }

    #[tokio::test]
    async fn iin_mismatch_leaves_ledger_unchanged() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin("999999999999")));
        let err = orch.sign(&request(), Some(&iin(PARENT))).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::IinMismatch);
        assert_eq!(orch.ledger().count(&num()), 0);
        assert_eq!(
            orch.ledger().book().contract(&num()).unwrap().status_ref,
            ContractStatusRef(1)
        );
    }

    #[tokio::test]
    async fn unknown_caller_identity_skips_cross_check() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin("999999999999")));
        let out = orch.sign(&request(), None).await.unwrap();
        assert_eq!(out.signer_iin.as_str(), "999999999999");
    }

    #[tokio::test]
    async fn unknown_contract_is_not_found() {
        let (orch, verifier) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let mut req = request();
        req.contract_num = "2024Д-9999".into();
        let err = orch.sign(&req, None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ContractNotFound);
        assert_eq!(err.to_string(), "Контракт не найден");
        assert_eq!(verifier.calls(), 0);
    }

    #[tokio::test]
    async fn requested_addendum_missing() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let mut req = request();
        req.is_dop_contract = true;
        let err = orch.sign(&req, None).await.unwrap_err();
        assert!(matches!(err, SigningError::SupplementalNotFound(_)));
    }

    #[tokio::test]
    async fn addendum_is_signed_into_its_own_slot() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        orch.ledger().book().upsert_supplemental(SupplementalContract {
            primary_number: num(),
            amount: Amount::from_major(120_000),
            description: Some("Робототехника".into()),
            date: None,
            status_ref: ContractStatusRef(1),
        });

        let out = orch.sign(&request(), None).await.unwrap();
        assert_eq!(out.kind, DocumentKind::Supplemental);
        let book = orch.ledger().book();
        assert_eq!(book.supplemental(&num()).unwrap().status_ref, ContractStatusRef(2));
        assert_eq!(book.contract(&num()).unwrap().status_ref, ContractStatusRef(1));
        assert!(orch
            .ledger()
            .artifacts()
            .get(&num(), DocumentKind::Supplemental)
            .is_some());
        assert_eq!(
            orch.ledger().status_of(&num()).await.unwrap().status,
            AggregateStatus::Signed
        );
    }

    #[tokio::test]
    async fn resigning_is_allowed_after_tampering() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        orch.sign(&request(), None).await.unwrap();
        orch.ledger()
            .artifacts()
            .overwrite_bytes(&num(), DocumentKind::Primary, b"<html>forged</html>".to_vec());
        let sigs = orch.ledger().status_of(&num()).await.unwrap();
        assert_eq!(sigs.status, AggregateStatus::DocumentModified);

        orch.sign(&request(), None).await.unwrap();
        let sigs = orch.ledger().status_of(&num()).await.unwrap();
        assert_eq!(sigs.status, AggregateStatus::Signed);
        assert_eq!(sigs.total(), 6);
        assert_eq!(sigs.valid_count(), 3);
    }

    #[tokio::test]
    async fn request_validation_precedes_everything() {
        let (orch, verifier) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let mut req = request();
        req.data = "%%%".into();
        let err = orch.sign(&req, None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingParameters);

        let mut req = request();
        req.contract_num = "  ".into();
        assert!(matches!(
            orch.sign(&req, None).await,
            Err(SigningError::MissingParameter("contract_num"))
        ));
        assert_eq!(verifier.calls(), 0);
    }

    struct FailingSink;

    #[async_trait]
    impl ChangesetSink for FailingSink {
        async fn persist(&self, _changeset: &Changeset) -> Result<(), StoreError> {
            Err(StoreError::Database("disk full".into()))
        }

        async fn persist_contract(
            &self,
            _contract: &ContractRecord,
            _supplemental: Option<&SupplementalContract>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn storage_failure_rolls_back_and_reports_processing_error() {
        let (orch, _) = orchestrator_with(
            MockVerifier::accepting(iin(PARENT)),
            SignatureLedger::new(Arc::new(FailingSink)),
        );
        let err = orch.sign(&request(), None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ProcessingError);
        assert!(err.is_internal());
        assert_eq!(orch.ledger().count(&num()), 0);
        assert!(orch
            .ledger()
            .artifacts()
            .get(&num(), DocumentKind::Primary)
            .is_none());
        assert_eq!(
            orch.ledger().book().contract(&num()).unwrap().status_ref,
            ContractStatusRef(1)
        );
    }

    #[tokio::test]
    async fn concurrent_attempts_commit_once() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let (req_a, req_b) = (request(), request());
        let (a, b) = tokio::join!(orch.sign(&req_a, None), orch.sign(&req_b, None));
        let codes: Vec<_> = [&a, &b]
            .iter()
            .filter_map(|r| r.as_ref().err().map(|e| e.code()))
            .collect();
        assert_eq!(codes, vec![ErrorCode::AlreadySigned]);
        assert_eq!(orch.ledger().count(&num()), 3);
    }

    #[tokio::test]
    async fn signing_data_for_contract() {
        let (orch, _) = orchestrator(MockVerifier::accepting(iin(PARENT)));
        let sd = orch.signing_data(&num()).unwrap();
        assert!(!sd.is_dop_contract);
        assert_eq!(sd.contract_info.student_name, "Ахметов Арман");
        assert!(orch
            .signing_data(&ContractNumber::new("X-1").unwrap())
            .is_err());
    }
}
