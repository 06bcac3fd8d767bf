use super::types::{
    Allocation, AssetBreakdown, MonteCarloRequest, Plan, ProjectionRequest, ScenarioOverride,
    ScenarioState, WhatIfAdjustments,
};

/// Builds the effective request from plan, overrides, What-If adjustments
/// and asset totals.
///
/// Precedence per field: the override wins over the plan, then the What-If
/// transform applies on top of that resolved value. Nothing is clamped here;
/// negative surpluses propagate to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Composer {
    pub as_of_year: i32,
}

impl Composer {
    pub fn new(as_of_year: i32) -> Self {
        Self { as_of_year }
    }

    pub fn compose(
        &self,
        plan: &Plan,
        overrides: &ScenarioOverride,
        adjustments: &WhatIfAdjustments,
        assets: &AssetBreakdown,
    ) -> ProjectionRequest {
        let resolved = overrides.resolve(plan);

        let monthly_expenses =
            (resolved.monthly_expenses * adjustments.expenses_percent / 100.0).round();
        let base_monthly_investment = resolved
            .monthly_investment
            .unwrap_or(resolved.working_income_monthly - monthly_expenses);
        let monthly_contribution =
            (base_monthly_investment * adjustments.contribution_percent / 100.0).round();

        let return_offset = adjustments.return_rate_offset / 100.0;
        let allocation = split_allocation(resolved.allocation, adjustments.equity_percent);

        let retirement_age =
            (i64::from(resolved.retirement_age) + i64::from(adjustments.retirement_age_offset))
                .clamp(0, i64::from(u32::MAX)) as u32;

        ProjectionRequest {
            currency: resolved.currency,
            // set from the scenario state by `compose_state`
            display_currency: None,
            current_age: current_age(plan.birth_year, self.as_of_year),
            retirement_age,
            life_expectancy: resolved.life_expectancy,
            planning_horizon_years: resolved.planning_horizon_years,
            monthly_contribution,
            monthly_expenses,
            working_income_monthly: resolved.working_income_monthly,
            cash_return_rate: resolved.cash_return_rate + return_offset,
            equity_return_rate: resolved.equity_return_rate + return_offset,
            // housing is not an investable asset; the return offset skips it
            housing_return_rate: resolved.housing_return_rate,
            inflation_rate: resolved.inflation_rate + adjustments.inflation_offset / 100.0,
            equity_allocation: allocation.equity,
            cash_allocation: allocation.cash,
            housing_allocation: allocation.housing,
            pension_monthly: resolved.pension_monthly,
            social_security_monthly: resolved.social_security_monthly,
            other_income_monthly: resolved.other_income_monthly,
            rental_income_monthly: resolved.rental_income_monthly,
            target_balance: resolved.target_balance,
            liquidation_threshold: adjustments.liquidation_threshold,
            liquid_assets: positive(assets.liquid),
            non_spendable_assets: positive(assets.non_spendable),
        }
    }

    pub fn compose_state(&self, state: &ScenarioState) -> Option<ProjectionRequest> {
        let plan = state.plan.as_ref()?;
        let mut request = self.compose(plan, &state.overrides, &state.adjustments, &state.assets);
        request.display_currency = state.display_currency.clone();
        Some(request)
    }

    pub fn compose_monte_carlo(
        &self,
        state: &ScenarioState,
        iterations: u32,
    ) -> Option<MonteCarloRequest> {
        self.compose_state(state)
            .map(|projection| MonteCarloRequest {
                projection,
                iterations,
            })
    }
}

fn current_age(birth_year: i32, as_of_year: i32) -> u32 {
    u32::try_from(as_of_year.saturating_sub(birth_year)).unwrap_or(0)
}

// Zero means the holdings have not loaded; leave the field out so the remote
// side keeps whatever it resolved last.
fn positive(value: f64) -> Option<f64> {
    (value > 0.0).then_some(value)
}

fn split_allocation(plan: Allocation, equity_percent: Option<f64>) -> Allocation {
    let Some(percent) = equity_percent.filter(|p| p.is_finite()) else {
        return plan;
    };
    let investable = plan.equity + plan.cash;
    let equity = investable * percent / 100.0;
    Allocation {
        equity,
        cash: investable - equity,
        housing: plan.housing,
    }
}
