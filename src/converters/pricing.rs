//! Margin and markup conversions

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, CalcError, CalcResult};

/// Gross margin: profit as a fraction of the selling price
pub fn margin(cost: f64, price: f64) -> CalcResult<f64> {
    ensure_non_negative("cost", cost)?;
    ensure_finite("price", price)?;
    if price == 0.0 {
        return Err(CalcError::DivisionByZero { what: "price" });
    }
    Ok((price - cost) / price)
}

/// Markup: profit as a fraction of cost
pub fn markup(cost: f64, price: f64) -> CalcResult<f64> {
    ensure_finite("cost", cost)?;
    ensure_non_negative("price", price)?;
    if cost == 0.0 {
        return Err(CalcError::DivisionByZero { what: "cost" });
    }
    Ok((price - cost) / cost)
}

/// Selling price that achieves the target margin on `cost`
pub fn price_from_margin(cost: f64, margin: f64) -> CalcResult<f64> {
    ensure_non_negative("cost", cost)?;
    ensure_finite("margin", margin)?;
    if margin >= 1.0 {
        return Err(CalcError::invalid("margin", "must be below 100%"));
    }
    Ok(cost / (1.0 - margin))
}

/// Selling price after applying `markup` to `cost`
pub fn price_from_markup(cost: f64, markup: f64) -> CalcResult<f64> {
    ensure_non_negative("cost", cost)?;
    ensure_finite("markup", markup)?;
    if markup <= -1.0 {
        return Err(CalcError::invalid("markup", "must be greater than -100%"));
    }
    Ok(cost * (1.0 + markup))
}

pub fn margin_to_markup(margin: f64) -> CalcResult<f64> {
    ensure_finite("margin", margin)?;
    if margin >= 1.0 {
        return Err(CalcError::invalid("margin", "must be below 100%"));
    }
    Ok(margin / (1.0 - margin))
}

pub fn markup_to_margin(markup: f64) -> CalcResult<f64> {
    ensure_finite("markup", markup)?;
    if markup <= -1.0 {
        return Err(CalcError::invalid("markup", "must be greater than -100%"));
    }
    Ok(markup / (1.0 + markup))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub cost: f64,
    pub price: f64,
    pub profit: f64,
    pub margin: f64,
    pub markup: f64,
}

/// Profit, margin and markup for one cost/price pair
pub fn pricing_breakdown(cost: f64, price: f64) -> CalcResult<PricingBreakdown> {
    Ok(PricingBreakdown {
        cost,
        price,
        profit: price - cost,
        margin: margin(cost, price)?,
        markup: markup(cost, price)?,
    })
}
