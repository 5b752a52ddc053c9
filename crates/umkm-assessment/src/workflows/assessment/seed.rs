//! Questionnaire and rule table bundled with the crate for demos and local development.

use super::domain::{AssessmentTemplate, RecommendationRule, TemplateId};
use crate::workflows::rule_catalog::{RuleCatalogError, RuleCatalogImporter};

pub const STANDARD_TEMPLATE_ID: &str = "tpl-umkm-standard";

const STANDARD_TEMPLATE_JSON: &str = include_str!("../../../data/umkm_template.json");
const STANDARD_RULES_CSV: &str = include_str!("../../../data/recommendation_rules.csv");

pub fn standard_template() -> Result<AssessmentTemplate, serde_json::Error> {
    serde_json::from_str(STANDARD_TEMPLATE_JSON)
}

pub fn standard_rules() -> Result<Vec<RecommendationRule>, RuleCatalogError> {
    RuleCatalogImporter::from_reader(STANDARD_RULES_CSV.as_bytes())
}

pub fn standard_template_id() -> TemplateId {
    TemplateId::new(STANDARD_TEMPLATE_ID)
}
