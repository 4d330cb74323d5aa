//! Variable description catalog shipped next to the data sheet

use serde::Serialize;

use super::ClimateVariable;

/// Short variable code paired with a readable description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableDescription {
    pub code: &'static str,
    pub description: &'static str,
}

/// Build the fixed description table, one entry per variable in column order
#[must_use]
pub fn build_catalog() -> Vec<VariableDescription> {
    ClimateVariable::all()
        .map(|variable| VariableDescription {
            code: variable.column(),
            description: variable.description(),
        })
        .collect()
}
