use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Allocation {
    pub equity: f64,
    pub cash: f64,
    pub housing: f64,
}

impl Default for Allocation {
    fn default() -> Self {
        Self {
            equity: 0.6,
            cash: 0.3,
            housing: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Plan {
    pub currency: String,
    pub birth_year: i32,
    pub life_expectancy: u32,
    pub planning_horizon_years: Option<u32>,
    pub retirement_age: u32,
    pub monthly_expenses: f64,
    /// Explicit monthly investment. When absent the surplus of working
    /// income over expenses is invested.
    pub monthly_investment: Option<f64>,
    pub working_income_monthly: f64,
    pub pension_monthly: f64,
    pub social_security_monthly: f64,
    pub other_income_monthly: f64,
    pub rental_income_monthly: Option<f64>,
    pub equity_return_rate: f64,
    pub cash_return_rate: f64,
    pub housing_return_rate: f64,
    pub allocation: Allocation,
    pub inflation_rate: f64,
    pub target_balance: Option<f64>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            birth_year: 1990,
            life_expectancy: 90,
            planning_horizon_years: None,
            retirement_age: 65,
            monthly_expenses: 0.0,
            monthly_investment: None,
            working_income_monthly: 0.0,
            pension_monthly: 0.0,
            social_security_monthly: 0.0,
            other_income_monthly: 0.0,
            rental_income_monthly: None,
            equity_return_rate: 0.07,
            cash_return_rate: 0.02,
            housing_return_rate: 0.03,
            allocation: Allocation::default(),
            inflation_rate: 0.025,
            target_balance: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverrideField {
    MonthlyExpenses,
    MonthlyInvestment,
    WorkingIncomeMonthly,
    PensionMonthly,
    SocialSecurityMonthly,
    OtherIncomeMonthly,
    RentalIncomeMonthly,
    EquityReturnRate,
    CashReturnRate,
    HousingReturnRate,
    InflationRate,
    RetirementAge,
    LifeExpectancy,
    TargetBalance,
    Allocation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum OverrideEdit {
    MonthlyExpenses(f64),
    MonthlyInvestment(f64),
    WorkingIncomeMonthly(f64),
    PensionMonthly(f64),
    SocialSecurityMonthly(f64),
    OtherIncomeMonthly(f64),
    RentalIncomeMonthly(f64),
    EquityReturnRate(f64),
    CashReturnRate(f64),
    HousingReturnRate(f64),
    InflationRate(f64),
    RetirementAge(u32),
    LifeExpectancy(u32),
    TargetBalance(f64),
    Allocation(Allocation),
}

impl OverrideEdit {
    pub fn field(&self) -> OverrideField {
        match self {
            OverrideEdit::MonthlyExpenses(_) => OverrideField::MonthlyExpenses,
            OverrideEdit::MonthlyInvestment(_) => OverrideField::MonthlyInvestment,
            OverrideEdit::WorkingIncomeMonthly(_) => OverrideField::WorkingIncomeMonthly,
            OverrideEdit::PensionMonthly(_) => OverrideField::PensionMonthly,
            OverrideEdit::SocialSecurityMonthly(_) => OverrideField::SocialSecurityMonthly,
            OverrideEdit::OtherIncomeMonthly(_) => OverrideField::OtherIncomeMonthly,
            OverrideEdit::RentalIncomeMonthly(_) => OverrideField::RentalIncomeMonthly,
            OverrideEdit::EquityReturnRate(_) => OverrideField::EquityReturnRate,
            OverrideEdit::CashReturnRate(_) => OverrideField::CashReturnRate,
            OverrideEdit::HousingReturnRate(_) => OverrideField::HousingReturnRate,
            OverrideEdit::InflationRate(_) => OverrideField::InflationRate,
            OverrideEdit::RetirementAge(_) => OverrideField::RetirementAge,
            OverrideEdit::LifeExpectancy(_) => OverrideField::LifeExpectancy,
            OverrideEdit::TargetBalance(_) => OverrideField::TargetBalance,
            OverrideEdit::Allocation(_) => OverrideField::Allocation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_expenses: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_investment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_income_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pension_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_security_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_income_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rental_income_monthly: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity_return_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_return_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housing_return_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retirement_age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub life_expectancy: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_balance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
}

impl ScenarioOverride {
    pub fn apply(&mut self, edit: OverrideEdit) {
        match edit {
            OverrideEdit::MonthlyExpenses(v) => self.monthly_expenses = Some(v),
            OverrideEdit::MonthlyInvestment(v) => self.monthly_investment = Some(v),
            OverrideEdit::WorkingIncomeMonthly(v) => self.working_income_monthly = Some(v),
            OverrideEdit::PensionMonthly(v) => self.pension_monthly = Some(v),
            OverrideEdit::SocialSecurityMonthly(v) => self.social_security_monthly = Some(v),
            OverrideEdit::OtherIncomeMonthly(v) => self.other_income_monthly = Some(v),
            OverrideEdit::RentalIncomeMonthly(v) => self.rental_income_monthly = Some(v),
            OverrideEdit::EquityReturnRate(v) => self.equity_return_rate = Some(v),
            OverrideEdit::CashReturnRate(v) => self.cash_return_rate = Some(v),
            OverrideEdit::HousingReturnRate(v) => self.housing_return_rate = Some(v),
            OverrideEdit::InflationRate(v) => self.inflation_rate = Some(v),
            OverrideEdit::RetirementAge(v) => self.retirement_age = Some(v),
            OverrideEdit::LifeExpectancy(v) => self.life_expectancy = Some(v),
            OverrideEdit::TargetBalance(v) => self.target_balance = Some(v),
            OverrideEdit::Allocation(v) => self.allocation = Some(v),
        }
    }

    pub fn clear(&mut self, field: OverrideField) {
        match field {
            OverrideField::MonthlyExpenses => self.monthly_expenses = None,
            OverrideField::MonthlyInvestment => self.monthly_investment = None,
            OverrideField::WorkingIncomeMonthly => self.working_income_monthly = None,
            OverrideField::PensionMonthly => self.pension_monthly = None,
            OverrideField::SocialSecurityMonthly => self.social_security_monthly = None,
            OverrideField::OtherIncomeMonthly => self.other_income_monthly = None,
            OverrideField::RentalIncomeMonthly => self.rental_income_monthly = None,
            OverrideField::EquityReturnRate => self.equity_return_rate = None,
            OverrideField::CashReturnRate => self.cash_return_rate = None,
            OverrideField::HousingReturnRate => self.housing_return_rate = None,
            OverrideField::InflationRate => self.inflation_rate = None,
            OverrideField::RetirementAge => self.retirement_age = None,
            OverrideField::LifeExpectancy => self.life_expectancy = None,
            OverrideField::TargetBalance => self.target_balance = None,
            OverrideField::Allocation => self.allocation = None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn resolve(&self, plan: &Plan) -> Plan {
        Plan {
            currency: plan.currency.clone(),
            birth_year: plan.birth_year,
            life_expectancy: self.life_expectancy.unwrap_or(plan.life_expectancy),
            planning_horizon_years: plan.planning_horizon_years,
            retirement_age: self.retirement_age.unwrap_or(plan.retirement_age),
            monthly_expenses: self.monthly_expenses.unwrap_or(plan.monthly_expenses),
            monthly_investment: self.monthly_investment.or(plan.monthly_investment),
            working_income_monthly: self
                .working_income_monthly
                .unwrap_or(plan.working_income_monthly),
            pension_monthly: self.pension_monthly.unwrap_or(plan.pension_monthly),
            social_security_monthly: self
                .social_security_monthly
                .unwrap_or(plan.social_security_monthly),
            other_income_monthly: self
                .other_income_monthly
                .unwrap_or(plan.other_income_monthly),
            rental_income_monthly: self.rental_income_monthly.or(plan.rental_income_monthly),
            equity_return_rate: self.equity_return_rate.unwrap_or(plan.equity_return_rate),
            cash_return_rate: self.cash_return_rate.unwrap_or(plan.cash_return_rate),
            housing_return_rate: self.housing_return_rate.unwrap_or(plan.housing_return_rate),
            allocation: self.allocation.unwrap_or(plan.allocation),
            inflation_rate: self.inflation_rate.unwrap_or(plan.inflation_rate),
            target_balance: self.target_balance.or(plan.target_balance),
        }
    }
}

/// Relative What-If adjustments driven by sliders. Always fully populated.
///
/// Percent fields are whole percentages (100 = unchanged); offsets on rates
/// are in percentage points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WhatIfAdjustments {
    pub expenses_percent: f64,
    pub contribution_percent: f64,
    pub return_rate_offset: f64,
    pub inflation_offset: f64,
    pub retirement_age_offset: i32,
    /// Equity share of the investable (equity + cash) portfolio, in percent.
    pub equity_percent: Option<f64>,
    /// Percent of initial liquid assets below which illiquid assets are sold.
    pub liquidation_threshold: f64,
}

impl Default for WhatIfAdjustments {
    fn default() -> Self {
        Self {
            expenses_percent: 100.0,
            contribution_percent: 100.0,
            return_rate_offset: 0.0,
            inflation_offset: 0.0,
            retirement_age_offset: 0,
            equity_percent: None,
            liquidation_threshold: 10.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AdjustmentEdit {
    ExpensesPercent(f64),
    ContributionPercent(f64),
    ReturnRateOffset(f64),
    InflationOffset(f64),
    RetirementAgeOffset(i32),
    EquityPercent(Option<f64>),
    LiquidationThreshold(f64),
}

impl WhatIfAdjustments {
    pub fn apply(&mut self, edit: AdjustmentEdit) {
        match edit {
            AdjustmentEdit::ExpensesPercent(v) => self.expenses_percent = v,
            AdjustmentEdit::ContributionPercent(v) => self.contribution_percent = v,
            AdjustmentEdit::ReturnRateOffset(v) => self.return_rate_offset = v,
            AdjustmentEdit::InflationOffset(v) => self.inflation_offset = v,
            AdjustmentEdit::RetirementAgeOffset(v) => self.retirement_age_offset = v,
            AdjustmentEdit::EquityPercent(v) => self.equity_percent = v,
            AdjustmentEdit::LiquidationThreshold(v) => self.liquidation_threshold = v,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Asset totals from the holdings collaborator. Zero means "not loaded yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssetBreakdown {
    pub liquid: f64,
    pub non_spendable: f64,
    pub is_ready: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioState {
    pub plan: Option<Plan>,
    pub overrides: ScenarioOverride,
    pub adjustments: WhatIfAdjustments,
    pub assets: AssetBreakdown,
    pub display_currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_currency: Option<String>,
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_horizon_years: Option<u32>,
    pub monthly_contribution: f64,
    pub monthly_expenses: f64,
    pub working_income_monthly: f64,
    pub cash_return_rate: f64,
    pub equity_return_rate: f64,
    pub housing_return_rate: f64,
    pub inflation_rate: f64,
    pub equity_allocation: f64,
    pub cash_allocation: f64,
    pub housing_allocation: f64,
    pub pension_monthly: f64,
    pub social_security_monthly: f64,
    pub other_income_monthly: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rental_income_monthly: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_balance: Option<f64>,
    pub liquidation_threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liquid_assets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_spendable_assets: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloRequest {
    #[serde(flatten)]
    pub projection: ProjectionRequest,
    pub iterations: u32,
}
