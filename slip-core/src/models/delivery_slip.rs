use rust_decimal::Decimal;
use serde::Serialize;

use super::{PayBy, TaxRate};
use crate::form::FieldGroup;

/// Editable shape of a delivery slip, mirroring the document schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySlipForm {
    #[field(nested)]
    pub slip_details: DeliverySlipDetails,
    #[field(nested)]
    pub party_details: PartyDetails,
    #[field(nested)]
    pub goods_details: GoodsDetails,
    #[field(nested)]
    pub freight_details: FreightDetails,
    #[field(nested)]
    pub billing_details: BillingDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct DeliverySlipDetails {
    pub delivery_slip_no: String,
    /// Canonical `YYYY-MM-DD`.
    pub date: String,
    pub vehicle_no: String,
    pub driver_name: String,
    pub driver_mobile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetails {
    pub from_location: String,
    pub to_location: String,
    #[field(nested)]
    pub sender: Sender,
    #[field(nested)]
    pub receiver: Receiver,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    pub sender_name: String,
    pub sender_address: String,
    pub sender_gstin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct Receiver {
    pub receiver_name: String,
    pub receiver_address: String,
    pub receiver_gstin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct GoodsDetails {
    pub packages: String,
    pub description: String,
    pub actual_weight: String,
    pub charged_weight: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct FreightDetails {
    #[field(nested)]
    pub charges: DeliveryCharges,
    pub labour_paid_by: PayBy,
}

/// Charge components as typed; coerced to numbers only when totals run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCharges {
    pub bilty_freight: String,
    pub delivery_charge: String,
    pub labour_charge: String,
    pub other_charges: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct BillingDetails {
    pub tax_rate: TaxRate,
    pub round_off: bool,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub advance_paid: String,
    /// `total - advancePaid`, two decimals.
    pub balance_due: String,
}
