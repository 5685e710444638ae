use serde::Serialize;
use std::collections::BTreeMap;

use super::QueryError;
use crate::dataset::{Dataset, LoadReport, Macros, Metric, RecipeRecord, SchemaError};

pub const DEFAULT_TOP_LIMIT: i64 = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DietSummary {
    pub diet_type: String,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    pub recipe_count: usize,
}

impl DietSummary {
    pub fn diet_key(&self) -> String {
        self.diet_type.to_lowercase()
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RankedRecipe<'a> {
    pub rank: usize,
    pub metric: Metric,
    pub value: f64,
    #[serde(flatten)]
    pub recipe: &'a RecipeRecord,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Page<'a> {
    pub page: usize,
    pub per_page: usize,
    pub total_records: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub data: &'a [RecipeRecord],
}

/// Aggregate over an arbitrary subset of valid records. Averages are `None`
/// for an empty subset.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecipeStatistics {
    pub total_recipes: usize,
    pub avg_protein: Option<f64>,
    pub avg_carbs: Option<f64>,
    pub avg_fat: Option<f64>,
}

#[derive(Default)]
struct MacroTotals {
    protein: f64,
    carbs: f64,
    fat: f64,
    count: usize,
}

impl MacroTotals {
    fn add(&mut self, macros: Macros) {
        self.protein += macros.protein_g;
        self.carbs += macros.carbs_g;
        self.fat += macros.fat_g;
        self.count += 1;
    }

    fn means(&self) -> Option<(f64, f64, f64)> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        Some((self.protein / n, self.carbs / n, self.fat / n))
    }
}

pub fn recipe_statistics<'a, I>(records: I) -> RecipeStatistics
where
    I: IntoIterator<Item = &'a RecipeRecord>,
{
    let mut totals = MacroTotals::default();
    for macros in records.into_iter().filter_map(RecipeRecord::macros) {
        totals.add(macros);
    }
    let means = totals.means();
    RecipeStatistics {
        total_recipes: totals.count,
        avg_protein: means.map(|m| m.0),
        avg_carbs: means.map(|m| m.1),
        avg_fat: means.map(|m| m.2),
    }
}

/// Sorts descending by `metric`; `sort_by` is stable so ties keep row order.
pub(crate) fn rank_by<'a, I>(records: I, metric: Metric, limit: usize) -> Vec<RankedRecipe<'a>>
where
    I: IntoIterator<Item = &'a RecipeRecord>,
{
    let mut scored: Vec<(&RecipeRecord, f64)> = records
        .into_iter()
        .filter_map(|r| r.metric_value(metric).map(|v| (r, v)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, (recipe, value))| RankedRecipe {
            rank: i + 1,
            metric,
            value,
            recipe,
        })
        .collect()
}

fn positive(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|v| *v >= 1)
}

fn normalized_predicate(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

/// Read-only analytics over a loaded [`Dataset`].
///
/// Every operation takes `&self` and leaves the engine untouched, so one
/// instance can be shared between threads without locking.
#[derive(Debug)]
pub struct NutritionEngine {
    dataset: Dataset,
    summaries: Vec<DietSummary>,
}

impl NutritionEngine {
    pub fn new(dataset: Dataset) -> NutritionEngine {
        let summaries = Self::build_summaries(&dataset);
        NutritionEngine { dataset, summaries }
    }

    /// Validates the schema and builds the engine from parsed rows.
    pub fn load<I>(headers: Vec<String>, rows: I) -> Result<NutritionEngine, SchemaError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        Ok(Self::new(Dataset::from_rows(headers, rows)?))
    }

    fn build_summaries(dataset: &Dataset) -> Vec<DietSummary> {
        let mut groups: BTreeMap<&str, (&str, MacroTotals)> = BTreeMap::new();
        for record in dataset.valid_records() {
            let Some(macros) = record.macros() else {
                continue;
            };
            let (_, totals) = groups
                .entry(record.diet_key())
                .or_insert_with(|| (record.diet_type.as_str(), MacroTotals::default()));
            totals.add(macros);
        }

        groups
            .into_values()
            .filter_map(|(display, totals)| {
                let (avg_protein, avg_carbs, avg_fat) = totals.means()?;
                Some(DietSummary {
                    diet_type: display.to_owned(),
                    avg_protein,
                    avg_carbs,
                    avg_fat,
                    recipe_count: totals.count,
                })
            })
            .collect()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn report(&self) -> &LoadReport {
        self.dataset.report()
    }

    /// One summary per diet type with at least one valid row, ordered by the
    /// lower-cased diet type.
    pub fn summarize(&self) -> &[DietSummary] {
        &self.summaries
    }

    pub fn top_by_metric(
        &self,
        metric: Metric,
        limit: i64,
    ) -> Result<Vec<RankedRecipe<'_>>, QueryError> {
        let limit = positive(limit).ok_or_else(|| QueryError::InvalidLimit(limit.to_string()))?;
        Ok(rank_by(self.dataset.valid_records(), metric, limit))
    }

    /// Slices the full record sequence, invalid rows included.
    pub fn paginate(&self, page: i64, per_page: i64) -> Result<Page<'_>, QueryError> {
        let page_number = positive(page).ok_or_else(|| QueryError::InvalidPagination {
            parameter: "page",
            value: page.to_string(),
        })?;
        let page_size = positive(per_page).ok_or_else(|| QueryError::InvalidPagination {
            parameter: "per_page",
            value: per_page.to_string(),
        })?;

        let records = self.dataset.records();
        let total_records = records.len();
        let total_pages = total_records.div_ceil(page_size);

        let start = (page_number - 1)
            .saturating_mul(page_size)
            .min(total_records);
        let end = start.saturating_add(page_size).min(total_records);

        Ok(Page {
            page: page_number,
            per_page: page_size,
            total_records,
            total_pages,
            has_next: page_number < total_pages,
            has_previous: page_number > 1,
            data: &records[start..end],
        })
    }

    /// Valid records matching every given predicate. Blank predicates are
    /// ignored.
    pub fn filter(&self, diet_type: Option<&str>, search_term: Option<&str>) -> Vec<&RecipeRecord> {
        let diet = normalized_predicate(diet_type);
        let term = normalized_predicate(search_term);

        self.dataset
            .valid_records()
            .filter(|r| diet.as_deref().map_or(true, |d| r.diet_key() == d))
            .filter(|r| {
                term.as_deref()
                    .map_or(true, |t| r.recipe_name.to_lowercase().contains(t))
            })
            .collect()
    }

    pub fn statistics<'a, I>(&self, records: I) -> RecipeStatistics
    where
        I: IntoIterator<Item = &'a RecipeRecord>,
    {
        recipe_statistics(records)
    }

    pub(crate) fn valid_records_by_diet(&self) -> BTreeMap<&str, Vec<&RecipeRecord>> {
        let mut groups: BTreeMap<&str, Vec<&RecipeRecord>> = BTreeMap::new();
        for record in self.dataset.valid_records() {
            groups.entry(record.diet_key()).or_default().push(record);
        }
        groups
    }
}
