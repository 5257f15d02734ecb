//! Closed-form converters: growth rates, pricing ratios, units and currency

pub mod growth;
pub mod pricing;
pub mod units;
pub mod currency;

pub use growth::{
    apy, cagr, future_value, nominal_rate_from_apy, present_value, real_rate, roi, rule_of_72,
    simple_interest,
};
pub use pricing::{
    PricingBreakdown, margin, margin_to_markup, markup, markup_to_margin, price_from_margin,
    price_from_markup, pricing_breakdown,
};
pub use units::{Dimension, Unit};
pub use currency::RateTable;
