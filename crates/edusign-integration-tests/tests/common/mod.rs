//! Shared fixtures: contract views, a mocked trust authority and an
//! orchestrator wired to it.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use edusign_core::{
    Amount, ContractNumber, ContractRecord, ContractStatusRef, Installment, LanguageTrack,
    ParentInfo, PaymentSchedule, SchoolDirection, StudentInfo, StudentRef, SupplementalContract,
};
use edusign_ledger::SignatureLedger;
use edusign_signing::{SignRequest, SigningConfig, SigningOrchestrator};
use edusign_verify::{HttpVerificationGateway, SignatureVerifier, VerifyConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const NUM: &str = "2024Д-1400";
pub const PARENT: &str = "123456789012";
pub const VERIFY_PATH: &str = "/api/v1/verify";

pub fn num() -> ContractNumber {
    ContractNumber::new(NUM).unwrap()
}

pub fn contract(number: &str) -> ContractRecord {
    ContractRecord {
        number: ContractNumber::new(number).unwrap(),
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
            address: Some("г. Астана, ул. Кенесары 40".into()),
            ..Default::default()
        },
    }
}

pub fn addendum(number: &str) -> SupplementalContract {
    SupplementalContract {
        primary_number: ContractNumber::new(number).unwrap(),
        amount: Amount::from_major(120_000),
        description: Some("Продлённый день".into()),
        date: NaiveDate::from_ymd_opt(2024, 10, 1),
        status_ref: ContractStatusRef(1),
    }
}

pub fn request(number: &str) -> SignRequest {
    SignRequest {
        contract_num: number.into(),
        cms: "MIIB-cms".into(),
        data: "Q09OVFJBQ1RfU0lHTg==".into(),
        is_dop_contract: false,
    }
}

/// Mount a verify endpoint answering every call with `body`.
pub async fn authority(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(VERIFY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

pub fn gateway(server: &MockServer) -> Arc<dyn SignatureVerifier> {
    let config = VerifyConfig::for_url(&format!("{}{VERIFY_PATH}", server.uri()))
        .unwrap()
        .with_timeout_secs(5);
    Arc::new(HttpVerificationGateway::new(config).unwrap())
}

/// In-memory orchestrator over `verifier` with `NUM` imported.
pub async fn orchestrator(verifier: Arc<dyn SignatureVerifier>) -> SigningOrchestrator {
    let ledger = SignatureLedger::in_memory();
    ledger.import_contract(contract(NUM), None).await.unwrap();
    SigningOrchestrator::new(verifier, ledger, SigningConfig::builtin().unwrap())
}
