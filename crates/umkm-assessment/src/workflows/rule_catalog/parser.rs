use crate::workflows::assessment::domain::{
    CategoryId, RecommendationPriority, RecommendationRule, RuleId, TemplateId,
};
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug)]
pub(crate) struct RuleRow {
    pub(crate) id: String,
    pub(crate) template_id: String,
    pub(crate) category_id: Option<String>,
    pub(crate) min_score: Option<f64>,
    pub(crate) max_score: Option<f64>,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) priority: String,
    pub(crate) action_items: Vec<String>,
    pub(crate) resources: Vec<String>,
}

impl RuleRow {
    pub(crate) fn priority(&self) -> Option<RecommendationPriority> {
        match self.priority.trim().to_ascii_lowercase().as_str() {
            "high" | "tinggi" => Some(RecommendationPriority::High),
            "medium" | "sedang" => Some(RecommendationPriority::Medium),
            "low" | "rendah" => Some(RecommendationPriority::Low),
            _ => None,
        }
    }

    pub(crate) fn into_rule(self, priority: RecommendationPriority) -> RecommendationRule {
        RecommendationRule {
            id: RuleId(self.id),
            template_id: TemplateId(self.template_id),
            category_id: self.category_id.map(CategoryId),
            min_score: self.min_score,
            max_score: self.max_score,
            title: self.title,
            description: self.description,
            priority,
            action_items: self.action_items,
            resources: self.resources,
        }
    }
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<RuleRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<CatalogRow>() {
        let row = record?;
        rows.push(RuleRow {
            id: row.id,
            template_id: row.template_id,
            category_id: row.category_id,
            min_score: row.min_score,
            max_score: row.max_score,
            title: row.title,
            description: row.description,
            priority: row.priority,
            action_items: split_list(row.action_items.as_deref()),
            resources: split_list(row.resources.as_deref()),
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: String,
    template_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    category_id: Option<String>,
    #[serde(default)]
    min_score: Option<f64>,
    #[serde(default)]
    max_score: Option<f64>,
    title: String,
    #[serde(default)]
    description: String,
    priority: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    action_items: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    resources: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// List cells hold `;`-separated entries.
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|cell| {
            cell.split(';')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) fn split_list_for_tests(value: &str) -> Vec<String> {
    split_list(Some(value))
}
