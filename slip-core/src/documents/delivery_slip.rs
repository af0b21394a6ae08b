//! Delivery slip: the consignment note handed to the driver.

use crate::calculations::{BalanceRule, Calculator, TotalsRule};
use crate::form::ErrorTree;
use crate::models::{DeliverySlipForm, PayBy};
use crate::wizard::{Checker, HydrationPlan, StepDefinition, StepRegistry};

use super::DocumentKind;

pub mod paths {
    use crate::calculations::StaticPath;

    pub const SLIP_NO: StaticPath = &["slipDetails", "deliverySlipNo"];
    pub const DATE: StaticPath = &["slipDetails", "date"];
    pub const VEHICLE_NO: StaticPath = &["slipDetails", "vehicleNo"];
    pub const DRIVER_NAME: StaticPath = &["slipDetails", "driverName"];

    pub const FROM_LOCATION: StaticPath = &["partyDetails", "fromLocation"];
    pub const TO_LOCATION: StaticPath = &["partyDetails", "toLocation"];
    pub const SENDER_NAME: StaticPath = &["partyDetails", "sender", "senderName"];
    pub const RECEIVER_NAME: StaticPath = &["partyDetails", "receiver", "receiverName"];

    pub const PACKAGES: StaticPath = &["goodsDetails", "packages"];
    pub const DESCRIPTION: StaticPath = &["goodsDetails", "description"];

    pub const BILTY_FREIGHT: StaticPath = &["freightDetails", "charges", "biltyFreight"];
    pub const DELIVERY_CHARGE: StaticPath = &["freightDetails", "charges", "deliveryCharge"];
    pub const LABOUR_CHARGE: StaticPath = &["freightDetails", "charges", "labourCharge"];
    pub const OTHER_CHARGES: StaticPath = &["freightDetails", "charges", "otherCharges"];
    pub const LABOUR_PAID_BY: StaticPath = &["freightDetails", "labourPaidBy"];

    pub const TAX_RATE: StaticPath = &["billingDetails", "taxRate"];
    pub const ROUND_OFF: StaticPath = &["billingDetails", "roundOff"];
    pub const SUBTOTAL: StaticPath = &["billingDetails", "subtotal"];
    pub const TAX_AMOUNT: StaticPath = &["billingDetails", "taxAmount"];
    pub const TOTAL: StaticPath = &["billingDetails", "total"];
    pub const ADVANCE_PAID: StaticPath = &["billingDetails", "advancePaid"];
    pub const BALANCE_DUE: StaticPath = &["billingDetails", "balanceDue"];
}

pub struct DeliverySlip;

impl DocumentKind for DeliverySlip {
    type Form = DeliverySlipForm;

    const NAME: &'static str = "Delivery Slip";
    const RESOURCE: &'static str = "delivery-slips";

    fn steps() -> StepRegistry<DeliverySlipForm> {
        StepRegistry::new(vec![
            StepDefinition::new("Slip Details", &["slipDetails"], slip_details),
            StepDefinition::new("Parties & Route", &["partyDetails"], party_details),
            StepDefinition::new(
                "Goods & Freight",
                &["goodsDetails", "freightDetails"],
                goods_and_freight,
            ),
            StepDefinition::new("Billing", &["billingDetails"], billing),
        ])
    }

    fn calculator() -> Calculator {
        Calculator::new()
            .with_totals(TotalsRule {
                charges: vec![
                    paths::BILTY_FREIGHT,
                    paths::DELIVERY_CHARGE,
                    paths::LABOUR_CHARGE,
                    paths::OTHER_CHARGES,
                ],
                tax_rate: paths::TAX_RATE,
                round_off: paths::ROUND_OFF,
                subtotal: paths::SUBTOTAL,
                tax_amount: paths::TAX_AMOUNT,
                total: paths::TOTAL,
            })
            .with_balance(BalanceRule {
                primary: paths::TOTAL,
                advance: paths::ADVANCE_PAID,
                balance: paths::BALANCE_DUE,
            })
    }

    fn hydration_plan() -> HydrationPlan {
        HydrationPlan {
            dates: vec![paths::DATE],
            required: vec![paths::SLIP_NO],
        }
    }
}

fn slip_details(form: &DeliverySlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_text(paths::SLIP_NO, "Delivery slip number")
        .required_text(paths::DATE, "Date")
        .required_text(paths::VEHICLE_NO, "Vehicle number")
        .required_text(paths::DRIVER_NAME, "Driver name");
    check.finish()
}

fn party_details(form: &DeliverySlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_text(paths::FROM_LOCATION, "From location")
        .required_text(paths::TO_LOCATION, "To location")
        .required_text(paths::SENDER_NAME, "Sender name")
        .required_text(paths::RECEIVER_NAME, "Receiver name");
    check.finish()
}

fn goods_and_freight(form: &DeliverySlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check
        .required_number(paths::PACKAGES, "Packages")
        .required_text(paths::DESCRIPTION, "Description")
        .required_number(paths::BILTY_FREIGHT, "Bilty freight");
    if form.freight_details.labour_paid_by == PayBy::Driver {
        check.required_number(paths::LABOUR_CHARGE, "Labour charge");
    }
    check.finish()
}

fn billing(form: &DeliverySlipForm) -> ErrorTree {
    let mut check = Checker::new(form);
    check.optional_number(paths::ADVANCE_PAID, "Advance paid");
    check.finish()
}
