mod delivery_slip;
mod loading_slip;
mod pay_by;
mod tax_rate;

pub use delivery_slip::{
    BillingDetails, DeliveryCharges, DeliverySlipDetails, DeliverySlipForm, FreightDetails,
    GoodsDetails, PartyDetails, Receiver, Sender,
};
pub use loading_slip::{
    HireDetails, LoadingCharges, LoadingFreight, LoadingSlipDetails, LoadingSlipForm,
    RouteDetails,
};
pub use pay_by::PayBy;
pub use tax_rate::{TaxRate, TaxRateError};
