//! End-to-end wizard runs against the in-memory repository.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use serde_json::json;
use slip_core::db::{DocumentRepository, MemoryRepository};
use slip_core::documents::delivery_slip::paths as ds;
use slip_core::documents::loading_slip::paths as ls;
use slip_core::documents::{DeliverySlip, DocumentKind, LoadingSlip};
use slip_core::wizard::{NavOutcome, Notice, SubmitOutcome, SubmitStart, WizardMode};
use slip_core::{PayBy, RepositoryError, Wizard, WizardError};

fn filled_delivery_slip() -> Wizard<DeliverySlip> {
    let mut wizard = Wizard::<DeliverySlip>::create().unwrap();
    let answers: [(&[&str], &str); 11] = [
        (ds::SLIP_NO, "DS-101"),
        (ds::DATE, "2024-03-05"),
        (ds::VEHICLE_NO, "MH12AB1234"),
        (ds::DRIVER_NAME, "Ramesh"),
        (ds::FROM_LOCATION, "Pune"),
        (ds::TO_LOCATION, "Nashik"),
        (ds::SENDER_NAME, "Acme Traders"),
        (ds::RECEIVER_NAME, "Shree Stores"),
        (ds::PACKAGES, "12"),
        (ds::DESCRIPTION, "Cartons"),
        (ds::BILTY_FREIGHT, "500"),
    ];
    for (path, value) in answers {
        wizard.set_text(path, value).unwrap();
    }
    wizard
}

fn walk_to_last_step<K: DocumentKind>(wizard: &mut Wizard<K>) {
    while wizard.current_step() < wizard.step_count() {
        let outcome = wizard.next().unwrap();
        assert!(matches!(outcome, NavOutcome::Moved { .. }), "blocked: {:?}", wizard.errors());
    }
}

#[test]
fn next_is_blocked_until_step_validates() {
    let mut wizard = Wizard::<DeliverySlip>::create().unwrap();

    assert_eq!(wizard.next().unwrap(), NavOutcome::Blocked(1));
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(wizard.errors().len(), 4);
    assert_eq!(
        wizard.take_notices(),
        vec![Notice::FixRequiredFields { step: 1 }]
    );

    for (path, value) in [
        (ds::SLIP_NO, "DS-1"),
        (ds::DATE, "2024-03-05"),
        (ds::VEHICLE_NO, "MH12"),
        (ds::DRIVER_NAME, "Ramesh"),
    ] {
        wizard.set_text(path, value).unwrap();
    }

    assert_eq!(wizard.next().unwrap(), NavOutcome::Moved { from: 1, to: 2 });
    assert!(wizard.errors().is_empty());
    assert_eq!(wizard.current_title(), "Parties & Route");
}

#[test]
fn correcting_a_field_revalidates_its_step() {
    let mut wizard = Wizard::<DeliverySlip>::create().unwrap();
    wizard.next().unwrap();

    wizard.set_text(ds::SLIP_NO, "DS-1").unwrap();

    assert_eq!(wizard.errors().len(), 3);
    assert_eq!(wizard.errors().get(ds::SLIP_NO), None);
    assert_eq!(wizard.errors().get(ds::DATE), Some("Date is required"));
}

#[test]
fn previous_never_validates_and_stops_at_first_step() {
    let mut wizard = filled_delivery_slip();
    walk_to_last_step(&mut wizard);
    wizard.set_text(ds::FROM_LOCATION, "").unwrap();

    assert_eq!(wizard.previous().unwrap(), NavOutcome::Moved { from: 4, to: 3 });
    assert_eq!(wizard.previous().unwrap(), NavOutcome::Moved { from: 3, to: 2 });
    assert_eq!(wizard.previous().unwrap(), NavOutcome::Moved { from: 2, to: 1 });
    assert_eq!(wizard.previous().unwrap(), NavOutcome::Unchanged(1));
}

#[test]
fn derived_fields_follow_their_inputs() {
    let mut wizard = filled_delivery_slip();

    wizard.set_text(ds::LABOUR_CHARGE, "abc").unwrap();
    wizard.set_text(ds::TAX_RATE, "18.0%").unwrap();
    wizard.set_flag(ds::ROUND_OFF, true).unwrap();

    let billing = &wizard.form().billing_details;
    assert_eq!(billing.subtotal, dec!(500));
    assert_eq!(billing.tax_amount, dec!(90));
    assert_eq!(billing.total, dec!(590));
    assert_eq!(billing.balance_due, "590.00");

    wizard.set_text(ds::ADVANCE_PAID, "100").unwrap();
    assert_eq!(wizard.form().billing_details.balance_due, "490.00");
}

#[test]
fn derived_fields_cannot_be_edited() {
    let mut wizard = filled_delivery_slip();

    let err = wizard.set_text(ds::TOTAL, "1").unwrap_err();

    assert_eq!(err, WizardError::DerivedField("billingDetails.total".to_string()));
}

#[test]
fn unknown_paths_are_errors() {
    let mut wizard = filled_delivery_slip();

    let err = wizard
        .set_text(&["partyDetails", "broker"], "x")
        .unwrap_err();

    assert!(matches!(err, WizardError::Path(ref e) if e.path == "partyDetails.broker"));
}

#[tokio::test]
async fn submit_with_invalid_earlier_step_writes_nothing() {
    let repo = MemoryRepository::new(DeliverySlip::RESOURCE);
    let mut wizard = filled_delivery_slip();
    walk_to_last_step(&mut wizard);
    wizard.set_text(ds::FROM_LOCATION, "").unwrap();

    let outcome = wizard.submit(&repo).await.unwrap();

    let SubmitOutcome::Invalid(report) = outcome else {
        panic!("expected Invalid, got {outcome:?}");
    };
    assert_eq!(report.first_invalid_step(), Some(2));
    assert_eq!(repo.write_count(), 0);
    assert_eq!(wizard.current_step(), 4);
    assert_eq!(
        wizard.errors().get(ds::FROM_LOCATION),
        Some("From location is required")
    );
    assert_eq!(
        wizard.take_notices(),
        vec![Notice::SubmitRejected { invalid_steps: vec![2] }]
    );
}

#[tokio::test]
async fn successful_submit_creates_document_and_closes() {
    let repo = MemoryRepository::new(DeliverySlip::RESOURCE);
    let mut wizard = filled_delivery_slip();
    wizard.set_text(ds::ADVANCE_PAID, "250").unwrap();
    walk_to_last_step(&mut wizard);

    let outcome = wizard.submit(&repo).await.unwrap();

    let SubmitOutcome::Saved(saved) = outcome else {
        panic!("expected Saved, got {outcome:?}");
    };
    assert_eq!(saved.id, "delivery-slips-1");
    assert_eq!(saved.data["slipDetails"]["deliverySlipNo"], json!("DS-101"));
    assert_eq!(saved.data["billingDetails"]["balanceDue"], json!("250.00"));
    assert_eq!(saved.data["freightDetails"]["labourPaidBy"], json!("Company"));
    assert_eq!(repo.write_count(), 1);
    assert!(wizard.is_closed());
    assert_eq!(
        wizard.take_notices(),
        vec![Notice::Saved { id: saved.id.clone() }]
    );
    assert_eq!(wizard.next(), Err(WizardError::Closed));
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let mut wizard = filled_delivery_slip();

    let SubmitStart::Ready(pending) = wizard.begin_submit().unwrap() else {
        panic!("expected a ready submit");
    };
    assert_eq!(wizard.begin_submit().unwrap(), SubmitStart::InFlight);
    assert!(wizard.is_submitting());
    assert_eq!(pending.mode, WizardMode::Create);
    assert_eq!(pending.payload["slipDetails"]["vehicleNo"], json!("MH12AB1234"));
}

#[tokio::test]
async fn failed_save_keeps_fields_and_allows_retry() {
    let repo = MemoryRepository::new(DeliverySlip::RESOURCE);
    repo.fail_writes_with(RepositoryError::Connection("offline".to_string()))
        .unwrap();
    let mut wizard = filled_delivery_slip();
    let before = wizard.form().clone();

    let err = wizard.submit(&repo).await.unwrap_err();

    assert_eq!(
        err,
        WizardError::Repository(RepositoryError::Connection("offline".to_string()))
    );
    assert!(!wizard.is_closed());
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.form(), &before);
    assert_eq!(
        wizard.take_notices(),
        vec![Notice::SaveFailed {
            message: "Connection error: offline".to_string()
        }]
    );
    assert!(matches!(wizard.begin_submit().unwrap(), SubmitStart::Ready(_)));
}

#[test]
fn finish_without_begin_is_rejected() {
    let mut wizard = filled_delivery_slip();

    let err = wizard
        .finish_submit(Err(RepositoryError::NotFound))
        .unwrap_err();

    assert_eq!(err, WizardError::NotSubmitting);
}

#[tokio::test]
async fn open_hydrates_and_submit_updates_in_place() {
    let repo = MemoryRepository::new(LoadingSlip::RESOURCE);
    repo.insert(
        "ls-42",
        json!({
            "slipDetails": {
                "loadingSlipNo": "LS-42",
                "date": "2024-03-05T00:00:00.000Z",
                "vehicleNo": "MH14XY9876"
            },
            "routeDetails": {
                "fromLocation": "Pune",
                "toLocation": "Surat",
                "consignorName": "Acme",
                "consigneeName": "Shree"
            },
            "hireDetails": { "lorryHire": 1000, "advance": "250", "loadingPaidBy": "Company" }
        }),
    )
    .unwrap();

    let mut wizard = Wizard::<LoadingSlip>::open(&repo, "ls-42").await.unwrap();

    assert_eq!(wizard.mode(), &WizardMode::Edit { id: "ls-42".to_string() });
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(wizard.form().slip_details.date, "2024-03-05");
    assert_eq!(wizard.form().hire_details.balance, "750.00");

    wizard.set_text(ls::ADVANCE, "400").unwrap();
    let outcome = wizard.submit(&repo).await.unwrap();

    assert!(matches!(outcome, SubmitOutcome::Saved(ref doc) if doc.id == "ls-42"));
    let stored = repo.get("ls-42").await.unwrap();
    assert_eq!(stored.data["hireDetails"]["balance"], json!("600.00"));
    assert_eq!(repo.write_count(), 1);
}

#[tokio::test]
async fn open_of_missing_document_fails() {
    let repo = MemoryRepository::new(LoadingSlip::RESOURCE);

    let err = Wizard::<LoadingSlip>::open(&repo, "nope").await.unwrap_err();

    assert_eq!(err, WizardError::Repository(RepositoryError::NotFound));
}

#[test]
fn edit_rejects_document_without_slip_number() {
    let err = Wizard::<LoadingSlip>::edit("ls-1", &json!({ "slipDetails": {} })).unwrap_err();

    assert!(matches!(err, WizardError::Hydration(_)));
}

#[test]
fn loading_charge_requirement_tracks_payer() {
    let mut wizard = Wizard::<LoadingSlip>::edit(
        "ls-1",
        &json!({
            "slipDetails": { "loadingSlipNo": "LS-1", "date": "2024-03-05", "vehicleNo": "MH14" },
            "routeDetails": {
                "fromLocation": "Pune",
                "toLocation": "Surat",
                "consignorName": "Acme",
                "consigneeName": "Shree"
            },
            "hireDetails": { "lorryHire": "1000" }
        }),
    )
    .unwrap();
    wizard.next().unwrap();
    wizard.next().unwrap();
    wizard.set_text(ls::LOADING_PAID_BY, "Driver").unwrap();

    assert_eq!(wizard.form().hire_details.loading_paid_by, PayBy::Driver);
    assert_eq!(wizard.next().unwrap(), NavOutcome::Blocked(3));
    assert_eq!(
        wizard.errors().get(ls::LOADING_CHARGE),
        Some("Loading charge is required")
    );

    wizard.set_text(ls::LOADING_PAID_BY, "Company").unwrap();

    assert!(wizard.errors().is_empty());
    assert_eq!(wizard.next().unwrap(), NavOutcome::Moved { from: 3, to: 4 });
}

#[test]
fn oversized_charge_is_rejected_and_left_out_of_totals() {
    let mut wizard = filled_delivery_slip();

    wizard
        .set_text(ds::BILTY_FREIGHT, "79228162514264337593543950335")
        .unwrap();
    wizard.set_text(ds::DELIVERY_CHARGE, "1").unwrap();
    wizard.set_text(ds::TAX_RATE, "18.0%").unwrap();

    let billing = &wizard.form().billing_details;
    assert_eq!(billing.subtotal, dec!(1));
    assert_eq!(billing.tax_amount, dec!(0.18));

    wizard.next().unwrap();
    wizard.next().unwrap();
    assert_eq!(wizard.next().unwrap(), NavOutcome::Blocked(3));
    assert_eq!(
        wizard.errors().get(ds::BILTY_FREIGHT),
        Some("Bilty freight must not exceed 1000000000000000")
    );
}

#[test]
fn oversized_lorry_hire_keeps_two_decimal_balance() {
    let mut wizard = Wizard::<LoadingSlip>::create().unwrap();

    wizard
        .set_text(ls::LORRY_HIRE, "79228162514264337593543950335")
        .unwrap();
    wizard.set_text(ls::ADVANCE, "250").unwrap();

    assert_eq!(wizard.form().hire_details.balance, "-250.00");
}
