//! `app::submit` and `app::show` against the in-memory backend.

use pretty_assertions::assert_eq;
use serde_json::json;
use slip_cli::app::{self, SubmitReport};
use slip_core::db::{DocumentRepository, MemoryRepository, RepoConfig};
use slip_core::documents::{DeliverySlip, DocumentKind, LoadingSlip};

const LOADING_ANSWERS: &str = r#"{
    "slipDetails.loadingSlipNo": "LS-7",
    "slipDetails.date": "2024-03-05",
    "slipDetails.vehicleNo": "MH14XY9876",
    "routeDetails.fromLocation": "Pune",
    "routeDetails.toLocation": "Surat",
    "routeDetails.consignorName": "Acme Traders",
    "routeDetails.consigneeName": "Shree Stores",
    "hireDetails.lorryHire": 1000,
    "hireDetails.advance": "250",
    "freightDetails.charges.freight": "1000",
    "freightDetails.taxRate": "12.0%",
    "freightDetails.roundOff": true
}"#;

#[tokio::test]
async fn complete_answers_are_saved() {
    let repo = MemoryRepository::new(LoadingSlip::RESOURCE);
    let answers = app::parse_answers(LOADING_ANSWERS).unwrap();

    let report = app::submit::<LoadingSlip>(&repo, &answers, None).await.unwrap();

    assert_eq!(
        report,
        SubmitReport::Saved {
            id: "loading-slips-1".to_string()
        }
    );
    let stored = repo.get("loading-slips-1").await.unwrap();
    assert_eq!(stored.data["hireDetails"]["balance"], json!("750.00"));
    assert_eq!(stored.data["routeDetails"]["consigneeName"], json!("Shree Stores"));
}

#[tokio::test]
async fn missing_answer_blocks_at_its_step() {
    let repo = MemoryRepository::new(DeliverySlip::RESOURCE);
    let answers = app::parse_answers(
        r#"{
            "slipDetails.deliverySlipNo": "DS-1",
            "slipDetails.date": "2024-03-05",
            "slipDetails.vehicleNo": "MH12",
            "slipDetails.driverName": "Ramesh"
        }"#,
    )
    .unwrap();

    let report = app::submit::<DeliverySlip>(&repo, &answers, None).await.unwrap();

    let SubmitReport::Blocked { step, title, errors } = report else {
        panic!("expected Blocked, got {report:?}");
    };
    assert_eq!(step, 2);
    assert_eq!(title, "Parties & Route");
    assert_eq!(
        errors.get(&["partyDetails", "fromLocation"]),
        Some("From location is required")
    );
    assert_eq!(repo.write_count(), 0);
}

#[tokio::test]
async fn edit_applies_answers_over_stored_document() {
    let repo = MemoryRepository::new(LoadingSlip::RESOURCE);
    let answers = app::parse_answers(LOADING_ANSWERS).unwrap();
    app::submit::<LoadingSlip>(&repo, &answers, None).await.unwrap();
    let changes = app::parse_answers(r#"{ "hireDetails.advance": "400" }"#).unwrap();

    let report = app::submit::<LoadingSlip>(&repo, &changes, Some("loading-slips-1"))
        .await
        .unwrap();

    assert_eq!(
        report,
        SubmitReport::Saved {
            id: "loading-slips-1".to_string()
        }
    );
    let form = app::show::<LoadingSlip>(&repo, "loading-slips-1").await.unwrap();
    assert_eq!(form["hireDetails"]["balance"], json!("600.00"));
    assert_eq!(form["slipDetails"]["loadingSlipNo"], json!("LS-7"));
}

#[tokio::test]
async fn show_of_unknown_id_fails() {
    let repo = MemoryRepository::new(DeliverySlip::RESOURCE);

    let err = app::show::<DeliverySlip>(&repo, "missing").await.unwrap_err();

    assert!(err.to_string().contains("missing"), "{err}");
}

#[tokio::test]
async fn registry_builds_memory_backend() {
    let config = RepoConfig {
        backend: "memory".to_string(),
        ..RepoConfig::default()
    };

    let repo = app::build_registry()
        .create(&config, DeliverySlip::RESOURCE)
        .await
        .unwrap();

    assert_eq!(repo.resource(), "delivery-slips");
}
