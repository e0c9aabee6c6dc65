//! Total and annualized return arithmetic.

use crate::domain::error::{PriceKind, ReturnError};
use chrono::NaiveDate;
use serde::Serialize;

/// Mean tropical year. Holding periods are not leap-year aware.
pub const DAYS_PER_YEAR: f64 = 365.24;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualizedReturn {
    pub symbol: String,
    pub annualized_return: f64,
    #[serde(rename = "totalReturns")]
    pub total_return: f64,
}

/// days_between(purchase, end) / 365.24
pub fn holding_years(purchase_date: NaiveDate, end_date: NaiveDate) -> f64 {
    (end_date - purchase_date).num_days() as f64 / DAYS_PER_YEAR
}

/// (sell - buy) / buy
pub fn total_return(buy_price: f64, sell_price: f64) -> Result<f64, ReturnError> {
    check_price(PriceKind::Buy, buy_price)?;
    check_price(PriceKind::Sell, sell_price)?;
    Ok((sell_price - buy_price) / buy_price)
}

/// Computes the compound annualized return of buying at `buy_price` on
/// `purchase_date` and selling at `sell_price` on `end_date`.
///
/// Same-day or reversed periods are `InvalidPeriod`. A negative growth
/// factor under a fractional exponent, or any non-finite result, is
/// `ArithmeticDomain` rather than NaN/infinity.
pub fn calculate_annualized_return(
    symbol: &str,
    purchase_date: NaiveDate,
    end_date: NaiveDate,
    buy_price: f64,
    sell_price: f64,
) -> Result<AnnualizedReturn, ReturnError> {
    let total_return = total_return(buy_price, sell_price)?;

    if end_date <= purchase_date {
        return Err(ReturnError::InvalidPeriod {
            purchase_date,
            end_date,
        });
    }
    let years = holding_years(purchase_date, end_date);

    let base = 1.0 + total_return;
    let exponent = 1.0 / years;
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(ReturnError::ArithmeticDomain { base, years });
    }

    let annualized_return = base.powf(exponent) - 1.0;
    if !annualized_return.is_finite() {
        return Err(ReturnError::ArithmeticDomain { base, years });
    }

    Ok(AnnualizedReturn {
        symbol: symbol.to_string(),
        annualized_return,
        total_return,
    })
}

fn check_price(kind: PriceKind, value: f64) -> Result<(), ReturnError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ReturnError::InvalidPrice { kind, value })
    }
}
