use serde::Serialize;

/// Billing hours per month (AWS convention, not calendar-aware).
pub const HOURS_PER_MONTH: f64 = 730.0;

/// How a candidate's price compares to the current price.
///
/// All three outcomes are reportable; a more expensive candidate is shown
/// with negative savings, never filtered out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Cheaper,
    Equal,
    MoreExpensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Savings {
    pub per_hour: f64,
    pub per_month: f64,
    pub percent: f64,
}

impl Savings {
    pub fn direction(&self) -> PriceDirection {
        if self.per_hour > 0.0 {
            PriceDirection::Cheaper
        } else if self.per_hour < 0.0 {
            PriceDirection::MoreExpensive
        } else {
            PriceDirection::Equal
        }
    }
}

/// Compare a candidate's hourly rate against the current one.
///
/// `current_hourly` must be a known, positive rate. Instances with an
/// unknown price are skipped before evaluation, so no division by zero
/// can happen here.
pub fn evaluate(current_hourly: f64, candidate_hourly: f64) -> Savings {
    let per_hour = current_hourly - candidate_hourly;
    Savings {
        per_hour,
        per_month: per_hour * HOURS_PER_MONTH,
        percent: per_hour / current_hourly * 100.0,
    }
}

pub fn monthly_cost(hourly: f64) -> f64 {
    hourly * HOURS_PER_MONTH
}
