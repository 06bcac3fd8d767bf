use serde::{Deserialize, Serialize};

use super::types::{AssetBreakdown, ProjectionRequest};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub max_years: f64,
    pub tolerance_years: f64,
    /// Safe withdrawal rate; 0.04 gives the 25x multiplier.
    pub withdrawal_rate: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_years: 100.0,
            tolerance_years: 0.1,
            withdrawal_rate: 0.04,
        }
    }
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

// (1 + r)^n - 1, exact for rates too small to survive `1.0 + rate`.
fn growth_minus_one(rate: f64, years: f64) -> f64 {
    (years * rate.ln_1p()).exp_m1()
}

// ((1 + r)^n - 1) / r, tending to n as r goes to 0.
fn annuity_factor(rate: f64, years: f64) -> f64 {
    let grown = growth_minus_one(rate, years);
    if rate == 0.0 || grown == 0.0 {
        return years;
    }
    grown / rate
}

fn future_value(assets: f64, annual_contribution: f64, rate: f64, years: f64) -> f64 {
    assets * (1.0 + growth_minus_one(rate, years)) + annual_contribution * annuity_factor(rate, years)
}

/// Years until `assets` plus yearly `annual_contribution`, compounding at
/// `rate`, reach `target`. `None` means unreachable within `max_years` (or
/// unusable input).
pub fn years_to_target(
    assets: f64,
    annual_contribution: f64,
    target: f64,
    rate: f64,
    config: &SolverConfig,
) -> Option<f64> {
    if !all_finite(&[assets, annual_contribution, target, rate]) {
        return None;
    }
    if assets >= target {
        return Some(0.0);
    }
    if annual_contribution <= 0.0 && assets <= 0.0 {
        return None;
    }
    let linear = (annual_contribution > 0.0)
        .then(|| (target - assets) / annual_contribution)
        .filter(|years| *years <= config.max_years);
    if rate <= 0.0 {
        return linear;
    }

    // with non-negative assets, positive growth never takes longer than none
    let linear_bound = linear.filter(|_| assets >= 0.0);
    if linear_bound.is_none()
        && future_value(assets, annual_contribution, rate, config.max_years) < target
    {
        return None;
    }

    let mut lo = 0.0;
    let mut hi = config.max_years;
    while hi - lo > config.tolerance_years {
        let mid = (lo + hi) * 0.5;
        if future_value(assets, annual_contribution, rate, mid) >= target {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    let years = linear_bound.map_or(hi, |bound| hi.min(bound));
    years.is_finite().then_some(years)
}

pub fn required_monthly_contribution(
    assets: f64,
    target: f64,
    years: f64,
    rate: f64,
) -> Option<f64> {
    if !all_finite(&[assets, target, years, rate]) || years <= 0.0 {
        return None;
    }
    if assets >= target {
        return Some(0.0);
    }
    if rate <= 0.0 {
        return Some((target - assets) / years / 12.0);
    }

    let grown_assets = assets * (1.0 + growth_minus_one(rate, years));
    if grown_assets >= target {
        return Some(0.0);
    }
    let monthly = (target - grown_assets) / annuity_factor(rate, years) / 12.0;
    monthly.is_finite().then_some(monthly)
}

/// Assets that reach `target` after `years` of compounding with no further
/// contribution. Without positive growth the whole target is needed now.
pub fn coast_number(target: f64, years: f64, rate: f64) -> Option<f64> {
    if !all_finite(&[target, years, rate]) {
        return None;
    }
    if rate <= 0.0 || years <= 0.0 {
        return Some(target);
    }
    Some(target / (1.0 + growth_minus_one(rate, years)))
}

pub fn progress_percent(numerator: f64, denominator: f64) -> Option<f64> {
    if !all_finite(&[numerator, denominator]) || denominator <= 0.0 {
        return None;
    }
    Some(numerator / denominator * 100.0)
}

pub fn display_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

pub fn fi_number(monthly_expenses: f64, withdrawal_rate: f64) -> Option<f64> {
    if !all_finite(&[monthly_expenses, withdrawal_rate]) || withdrawal_rate <= 0.0 {
        return None;
    }
    Some(monthly_expenses * 12.0 / withdrawal_rate)
}

pub fn real_rate(nominal: f64, inflation: f64) -> f64 {
    (1.0 + nominal) / (1.0 + inflation) - 1.0
}

pub fn investable_return(request: &ProjectionRequest) -> f64 {
    let weight = request.equity_allocation + request.cash_allocation;
    if !weight.is_finite() || weight <= 0.0 {
        return request.cash_return_rate;
    }
    (request.equity_allocation * request.equity_return_rate
        + request.cash_allocation * request.cash_return_rate)
        / weight
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiSnapshot {
    pub fi_number: Option<f64>,
    pub fi_progress: Option<f64>,
    pub real_return_rate: f64,
    pub years_to_fi: Option<f64>,
    pub fi_age: Option<f64>,
    pub coast_fi_number: Option<f64>,
    pub coast_fi_progress: Option<f64>,
    pub is_coast_fi: bool,
    pub required_monthly_contribution: Option<f64>,
}

impl FiSnapshot {
    pub fn compute(
        request: &ProjectionRequest,
        assets: &AssetBreakdown,
        config: &SolverConfig,
    ) -> Self {
        let liquid = assets.liquid;
        let fi_number = fi_number(request.monthly_expenses, config.withdrawal_rate);
        let real_return_rate = real_rate(investable_return(request), request.inflation_rate);
        let annual_contribution = request.monthly_contribution * 12.0;
        let years_to_retirement =
            f64::from(request.retirement_age) - f64::from(request.current_age);

        let years_to_fi = fi_number.and_then(|target| {
            years_to_target(liquid, annual_contribution, target, real_return_rate, config)
        });
        let coast_fi_number =
            fi_number.and_then(|target| coast_number(target, years_to_retirement, real_return_rate));
        let coast_fi_progress = coast_fi_number.and_then(|coast| progress_percent(liquid, coast));

        Self {
            fi_number,
            fi_progress: fi_number.and_then(|target| progress_percent(liquid, target)),
            real_return_rate,
            years_to_fi,
            fi_age: years_to_fi.map(|years| f64::from(request.current_age) + years),
            coast_fi_number,
            coast_fi_progress,
            is_coast_fi: coast_fi_progress.is_some_and(|p| p >= 100.0),
            required_monthly_contribution: fi_number.and_then(|target| {
                required_monthly_contribution(
                    liquid,
                    target,
                    years_to_retirement,
                    real_return_rate,
                )
            }),
        }
    }
}
