mod parser;

use crate::workflows::assessment::domain::RecommendationRule;
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum RuleCatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidPriority { rule_id: String, value: String },
    InvalidRange { rule_id: String, min: f64, max: f64 },
}

impl std::fmt::Display for RuleCatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleCatalogError::Io(err) => write!(f, "failed to read rule catalog: {}", err),
            RuleCatalogError::Csv(err) => write!(f, "invalid rule catalog CSV data: {}", err),
            RuleCatalogError::InvalidPriority { rule_id, value } => write!(
                f,
                "rule {} has unknown priority '{}' (expected high, medium or low)",
                rule_id, value
            ),
            RuleCatalogError::InvalidRange { rule_id, min, max } => write!(
                f,
                "rule {} has min_score {} above max_score {}",
                rule_id, min, max
            ),
        }
    }
}

impl std::error::Error for RuleCatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleCatalogError::Io(err) => Some(err),
            RuleCatalogError::Csv(err) => Some(err),
            RuleCatalogError::InvalidPriority { .. } | RuleCatalogError::InvalidRange { .. } => {
                None
            }
        }
    }
}

impl From<std::io::Error> for RuleCatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RuleCatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Loads recommendation rule tables maintained as spreadsheets.
pub struct RuleCatalogImporter;

impl RuleCatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RecommendationRule>, RuleCatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RecommendationRule>, RuleCatalogError> {
        let mut rules = Vec::new();

        for row in parser::parse_rows(reader)? {
            let Some(priority) = row.priority() else {
                return Err(RuleCatalogError::InvalidPriority {
                    rule_id: row.id,
                    value: row.priority,
                });
            };

            if let (Some(min), Some(max)) = (row.min_score, row.max_score) {
                if min > max {
                    return Err(RuleCatalogError::InvalidRange {
                        rule_id: row.id,
                        min,
                        max,
                    });
                }
            }

            rules.push(row.into_rule(priority));
        }

        Ok(rules)
    }
}
