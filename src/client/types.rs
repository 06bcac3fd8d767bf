use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FiMetrics {
    pub fi_number: f64,
    pub fi_progress: f64,
    pub real_years_to_fi: Option<f64>,
    pub coast_fi_number: f64,
    pub coast_fi_progress: f64,
    pub is_coast_fire: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YearlyProjection {
    pub age: u32,
    pub year: i32,
    pub total_balance: f64,
    pub liquid_balance: f64,
    /// Presentation-only fields, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub fi_metrics: FiMetrics,
    pub yearly_projections: Vec<YearlyProjection>,
    pub fi_achievement_age: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PercentileBand {
    pub age: u32,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationResult {
    pub iterations: u32,
    /// Share of paths that never run out of money, in percent.
    pub success_rate: f64,
    pub median_final_balance: f64,
    pub percentiles: Vec<PercentileBand>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_keeps_unknown_fields() {
        let json = r#"{
          "fiMetrics": {"fiNumber": 1500000, "fiProgress": 33.3, "realYearsToFi": 12.5,
                        "coastFiNumber": 600000, "coastFiProgress": 83.3, "isCoastFire": false},
          "yearlyProjections": [{"age": 41, "year": 2027, "totalBalance": 550000, "cashflow": -1200}],
          "fiAchievementAge": 53,
          "summary": {"note": "ok"}
        }"#;
        let projection: ProjectionResponse =
            serde_json::from_str(json).expect("projection should parse");

        assert_eq!(projection.fi_achievement_age, Some(53));
        assert_eq!(projection.fi_metrics.real_years_to_fi, Some(12.5));
        assert!(!projection.fi_metrics.is_coast_fire);
        assert_eq!(projection.yearly_projections[0].age, 41);
        assert_eq!(projection.yearly_projections[0].extra["cashflow"], -1200);
        assert!(projection.extra.contains_key("summary"));
    }

    #[test]
    fn sparse_simulation_result_defaults() {
        let result: SimulationResult =
            serde_json::from_str(r#"{"successRate": 87.5}"#).expect("result should parse");
        assert_eq!(result.success_rate, 87.5);
        assert!(result.percentiles.is_empty());
    }
}
