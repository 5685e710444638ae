use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::analytics::QueryError;

/// Macronutrient amounts in grams for a single recipe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Macros {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Protein => self.protein_g,
            Metric::Carbs => self.carbs_g,
            Metric::Fat => self.fat_g,
        }
    }
}

/// The macronutrient a ranking is computed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Protein,
    Carbs,
    Fat,
}

impl Default for Metric {
    fn default() -> Self {
        Self::Protein
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Protein => "protein",
            Metric::Carbs => "carbs",
            Metric::Fat => "fat",
        };
        f.write_str(name)
    }
}

impl FromStr for Metric {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "protein" => Ok(Metric::Protein),
            "carbs" => Ok(Metric::Carbs),
            "fat" => Ok(Metric::Fat),
            _ => Err(QueryError::InvalidMetric(s.to_owned())),
        }
    }
}

/// One row of the source table.
///
/// `macros` is `None` when the row failed validation at load time: such rows
/// are still part of the full record sequence but never of an aggregate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeRecord {
    pub row: usize,
    pub diet_type: String,
    pub recipe_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine_type: Option<String>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    /// Columns the engine does not interpret, keyed by their original header.
    /// Serialized as a nested object, never merged into the record fields.
    pub extra: BTreeMap<String, String>,
    #[serde(skip)]
    pub(crate) diet_key: String,
    #[serde(skip)]
    pub(crate) macros: Option<Macros>,
}

impl RecipeRecord {
    pub fn macros(&self) -> Option<Macros> {
        self.macros
    }

    pub fn is_valid(&self) -> bool {
        self.macros.is_some()
    }

    /// Lower-cased diet type, the grouping and matching key.
    pub fn diet_key(&self) -> &str {
        &self.diet_key
    }

    pub fn metric_value(&self, metric: Metric) -> Option<f64> {
        self.macros.map(|m| m.get(metric))
    }
}
