//! Loading slip: the lorry hire memo agreed with the vehicle owner.

use crate::calculations::{BalanceRule, Calculator, TotalsRule};
use crate::form::ErrorTree;
use crate::models::{LoadingSlipForm, PayBy};
use crate::wizard::{Checker, HydrationPlan, StepDefinition, StepRegistry};

use super::DocumentKind;

pub mod paths {
    use crate::calculations::StaticPath;

    pub const SLIP_NO: StaticPath = &["slipDetails", "loadingSlipNo"];
    pub const DATE: StaticPath = &["slipDetails", "date"];
    pub const VEHICLE_NO: StaticPath = &["slipDetails", "vehicleNo"];

    pub const FROM_LOCATION: StaticPath = &["routeDetails", "fromLocation"];
    pub const TO_LOCATION: StaticPath = &["routeDetails", "toLocation"];
    pub const CONSIGNOR_NAME: StaticPath = &["routeDetails", "consignorName"];
    pub const CONSIGNEE_NAME: StaticPath = &["routeDetails", "consigneeName"];

    pub const LORRY_HIRE: StaticPath = &["hireDetails", "lorryHire"];
    pub const ADVANCE: StaticPath = &["hireDetails", "advance"];
    pub const BALANCE: StaticPath = &["hireDetails", "balance"];
    pub const LOADING_PAID_BY: StaticPath = &["hireDetails", "loadingPaidBy"];
    pub const LOADING_CHARGE: StaticPath = &["hireDetails", "loadingCharge"];

    pub const FREIGHT: StaticPath = &["freightDetails", "charges", "freight"];
    pub const DETENTION_CHARGE: StaticPath = &["freightDetails", "charges", "detentionCharge"];
    pub const HALTING_CHARGE: StaticPath = &["freightDetails", "charges", "haltingCharge"];
    pub const OTHER_CHARGES: StaticPath = &["freightDetails", "charges", "otherCharges"];
    pub const TAX_RATE: StaticPath = &["freightDetails", "taxRate"];
    pub const ROUND_OFF: StaticPath = &["freightDetails", "roundOff"];
    pub const SUBTOTAL: StaticPath = &["freightDetails", "subtotal"];
    pub const TAX_AMOUNT: StaticPath = &["freightDetails", "taxAmount"];
    pub const TOTAL: StaticPath = &["freightDetails", "total"];
}

pub struct LoadingSlip;

impl DocumentKind for LoadingSlip {
    type Form = LoadingSlipForm;

    const NAME: &'static str = "Loading Slip";
    const RESOURCE: &'static str = "loading-slips";

    fn steps() -> StepRegistry<LoadingSlipForm> {
        StepRegistry::new(vec![
            StepDefinition::new("Slip Details", &["slipDetails"], slip_details),
            StepDefinition::new("Route & Parties", &["routeDetails"], route_details),
            StepDefinition::new("Lorry Hire", &["hireDetails"], hire_details),
            StepDefinition::new("Charges & Tax", &["freightDetails"], charges_and_tax),
        ])
    }

    fn calculator() -> Calculator {
        Calculator::new()
            .with_totals(TotalsRule {
                charges: vec![
                    paths::FREIGHT,
                    paths::DETENTION_CHARGE,
                    paths::HALTING_CHARGE,
                    paths::OTHER_CHARGES,
                ],
                tax_rate: paths::TAX_RATE,
                round_off: paths::ROUND_OFF,
                subtotal: paths::SUBTOTAL,
                tax_amount: paths::TAX_AMOUNT,
                total: paths::TOTAL,
            })
            .with_balance(BalanceRule {
                primary: paths::LORRY_HIRE,
                advance: paths::ADVANCE,
                balance: paths::BALANCE,
            })
    }

    fn hydration_plan() -> HydrationPlan {
        HydrationPlan {
            dates: vec![paths::DATE],
            required: vec![paths::SLIP_NO],
        }
    }
}

fn slip_details(form: &LoadingSlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_text(paths::SLIP_NO, "Loading slip number")
        .required_text(paths::DATE, "Date")
        .required_text(paths::VEHICLE_NO, "Vehicle number");
    check.finish()
}

fn route_details(form: &LoadingSlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_text(paths::FROM_LOCATION, "From location")
        .required_text(paths::TO_LOCATION, "To location")
        .required_text(paths::CONSIGNOR_NAME, "Consignor name")
        .required_text(paths::CONSIGNEE_NAME, "Consignee name");
    check.finish()
}

fn hire_details(form: &LoadingSlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_number(paths::LORRY_HIRE, "Lorry hire")
        .optional_number(paths::ADVANCE, "Advance");
    if form.hire_details.loading_paid_by == PayBy::Driver {
        check.required_number(paths::LOADING_CHARGE, "Loading charge");
    }
    check.finish()
}

fn charges_and_tax(_: &LoadingSlipForm) -> ErrorTree {
    ErrorTree::new()
}
