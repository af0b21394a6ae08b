use rust_decimal::Decimal;
use serde::Serialize;

use super::{PayBy, TaxRate};
use crate::form::FieldGroup;

/// Editable shape of a loading slip (lorry hire memo).
#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct LoadingSlipForm {
    #[field(nested)]
    pub slip_details: LoadingSlipDetails,
    #[field(nested)]
    pub route_details: RouteDetails,
    #[field(nested)]
    pub hire_details: HireDetails,
    #[field(nested)]
    pub freight_details: LoadingFreight,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct LoadingSlipDetails {
    pub loading_slip_no: String,
    pub date: String,
    pub vehicle_no: String,
    pub vehicle_type: String,
    pub owner_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct RouteDetails {
    pub from_location: String,
    pub to_location: String,
    pub consignor_name: String,
    pub consignee_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct HireDetails {
    pub lorry_hire: String,
    pub advance: String,
    /// `lorryHire - advance`, two decimals.
    pub balance: String,
    pub loading_paid_by: PayBy,
    pub loading_charge: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct LoadingFreight {
    #[field(nested)]
    pub charges: LoadingCharges,
    pub tax_rate: TaxRate,
    pub round_off: bool,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FieldGroup)]
#[serde(rename_all = "camelCase")]
pub struct LoadingCharges {
    pub freight: String,
    pub detention_charge: String,
    pub halting_charge: String,
    pub other_charges: String,
}
