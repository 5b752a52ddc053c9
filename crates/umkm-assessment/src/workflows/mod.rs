pub mod assessment;
pub mod rule_catalog;
