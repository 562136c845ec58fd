use serde::{Deserialize, Serialize};

/// How a criterion is scored. Unknown type strings deserialize to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionType {
    Quantitative,
    Qualitative,
    PassFail,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvalCriterion {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub weight: f64,
    #[serde(rename = "type", default)]
    pub kind: CriterionType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub scoring_method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_fail_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_criteria: Vec<SubCriterion>,
    #[serde(default)]
    pub mandatory_requirement: bool,
}

impl EvalCriterion {
    pub fn new(name: &str, weight: f64, kind: CriterionType) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            weight,
            kind,
            description: String::new(),
            scoring_method: String::new(),
            pass_fail_threshold: None,
            sub_criteria: Vec::new(),
            mandatory_requirement: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubCriterion {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}
