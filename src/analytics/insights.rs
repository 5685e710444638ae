//! Per-diet insights: best protein source, top recipes per diet, most
//! common cuisine.

use serde::Serialize;

use super::engine::{rank_by, DietSummary, NutritionEngine, RankedRecipe};
use super::QueryError;
use crate::dataset::{Metric, RecipeRecord};

pub const DEFAULT_TOP_PER_DIET: i64 = 5;

#[derive(Debug, PartialEq, Serialize)]
pub struct DietTopRecipes<'a> {
    pub diet_type: String,
    pub recipes: Vec<RankedRecipe<'a>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommonCuisine {
    pub diet_type: String,
    pub cuisine_type: String,
    pub recipe_count: usize,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Insights<'a> {
    pub highest_protein_diet: Option<&'a DietSummary>,
    pub top_per_diet: Vec<DietTopRecipes<'a>>,
    pub common_cuisines: Vec<CommonCuisine>,
}

/// Most frequent non-blank cuisine, earliest seen wins a tie.
fn most_common_cuisine(records: &[&RecipeRecord]) -> Option<(String, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for cuisine in records.iter().filter_map(|r| r.cuisine_type.as_deref()) {
        match counts.iter_mut().find(|(c, _)| c.eq_ignore_ascii_case(cuisine)) {
            Some((_, count)) => *count += 1,
            None => counts.push((cuisine, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (cuisine, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((cuisine, count));
        }
    }
    best.map(|(cuisine, count)| (cuisine.to_owned(), count))
}

impl NutritionEngine {
    pub fn highest_protein_diet(&self) -> Option<&DietSummary> {
        let mut best: Option<&DietSummary> = None;
        for summary in self.summarize() {
            if best.map_or(true, |b| summary.avg_protein > b.avg_protein) {
                best = Some(summary);
            }
        }
        best
    }

    pub fn insights(&self, per_diet: i64) -> Result<Insights<'_>, QueryError> {
        let limit = usize::try_from(per_diet)
            .ok()
            .filter(|l| *l >= 1)
            .ok_or_else(|| QueryError::InvalidLimit(per_diet.to_string()))?;

        let groups = self.valid_records_by_diet();
        let mut top_per_diet = Vec::new();
        let mut common_cuisines = Vec::new();

        for summary in self.summarize() {
            let key = summary.diet_key();
            let Some(records) = groups.get(key.as_str()) else {
                continue;
            };

            top_per_diet.push(DietTopRecipes {
                diet_type: summary.diet_type.clone(),
                recipes: rank_by(records.iter().copied(), Metric::Protein, limit),
            });

            if let Some((cuisine_type, recipe_count)) = most_common_cuisine(records) {
                common_cuisines.push(CommonCuisine {
                    diet_type: summary.diet_type.clone(),
                    cuisine_type,
                    recipe_count,
                });
            }
        }

        Ok(Insights {
            highest_protein_diet: self.highest_protein_diet(),
            top_per_diet,
            common_cuisines,
        })
    }
}
