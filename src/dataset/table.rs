use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::record::{Macros, RecipeRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    DietType,
    RecipeName,
    CuisineType,
    Protein,
    Carbs,
    Fat,
}

impl Column {
    const REQUIRED: [Column; 4] = [Column::DietType, Column::Protein, Column::Carbs, Column::Fat];

    fn name(self) -> &'static str {
        match self {
            Column::DietType => "diet_type",
            Column::RecipeName => "recipe_name",
            Column::CuisineType => "cuisine_type",
            Column::Protein => "protein_g",
            Column::Carbs => "carbs_g",
            Column::Fat => "fat_g",
        }
    }

    fn matches(self, header: &str) -> bool {
        normalize_header(header) == normalize_header(self.name())
    }
}

/// `Protein(g)`, `protein_g` and `PROTEIN G` all normalize to `proteing`.
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Positions of the known columns inside a header row.
#[derive(Debug)]
struct ColumnMap {
    diet_type: usize,
    protein: usize,
    carbs: usize,
    fat: usize,
    recipe_name: Option<usize>,
    cuisine_type: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<ColumnMap, SchemaError> {
        let position = |column: Column| headers.iter().position(|h| column.matches(h));

        let missing: Vec<String> = Column::REQUIRED
            .iter()
            .filter(|c| position(**c).is_none())
            .map(|c| c.name().to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns(missing));
        }

        // Required columns were checked just above.
        let required = |column: Column| position(column).unwrap_or_default();
        Ok(ColumnMap {
            diet_type: required(Column::DietType),
            protein: required(Column::Protein),
            carbs: required(Column::Carbs),
            fat: required(Column::Fat),
            recipe_name: position(Column::RecipeName),
            cuisine_type: position(Column::CuisineType),
        })
    }

    fn is_known(&self, index: usize) -> bool {
        [self.diet_type, self.protein, self.carbs, self.fat].contains(&index)
            || self.recipe_name == Some(index)
            || self.cuisine_type == Some(index)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDietType,
    MissingValue { column: &'static str },
    NotANumber { column: &'static str, value: String },
    Negative { column: &'static str, value: f64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingDietType => write!(f, "diet_type is blank"),
            SkipReason::MissingValue { column } => write!(f, "{column} is missing"),
            SkipReason::NotANumber { column, value } => {
                write!(f, "{column} is not a number: {value:?}")
            }
            SkipReason::Negative { column, value } => write!(f, "{column} is negative: {value}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

/// Outcome of a load: rows are never rejected, only excluded from aggregates.
#[derive(Clone, Debug, Default, Serialize)]
pub struct LoadReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }
}

fn parse_macro(raw: &str, column: Column) -> Result<f64, SkipReason> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SkipReason::MissingValue {
            column: column.name(),
        });
    }
    let value = match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            return Err(SkipReason::NotANumber {
                column: column.name(),
                value: raw.to_owned(),
            })
        }
    };
    if value < 0.0 {
        return Err(SkipReason::Negative {
            column: column.name(),
            value,
        });
    }
    Ok(value)
}

fn parse_macros(
    cells: &[String],
    map: &ColumnMap,
    diet_type: &str,
) -> (Option<f64>, Option<f64>, Option<f64>, Result<Macros, SkipReason>) {
    let cell = |index: usize| cells.get(index).map(String::as_str).unwrap_or_default();

    let protein = parse_macro(cell(map.protein), Column::Protein);
    let carbs = parse_macro(cell(map.carbs), Column::Carbs);
    let fat = parse_macro(cell(map.fat), Column::Fat);

    let outcome = if diet_type.is_empty() {
        Err(SkipReason::MissingDietType)
    } else {
        match (&protein, &carbs, &fat) {
            (Ok(p), Ok(c), Ok(f)) => Ok(Macros {
                protein_g: *p,
                carbs_g: *c,
                fat_g: *f,
            }),
            (Err(reason), _, _) | (_, Err(reason), _) | (_, _, Err(reason)) => Err(reason.clone()),
        }
    };

    (protein.ok(), carbs.ok(), fat.ok(), outcome)
}

/// The immutable in-memory table.
#[derive(Debug)]
pub struct Dataset {
    columns: Vec<String>,
    records: Vec<RecipeRecord>,
    report: LoadReport,
}

impl Dataset {
    /// Builds the table from a header row and string rows.
    ///
    /// Fails only when a required column is absent. Short rows are padded
    /// with empty cells, extra cells without a header are dropped.
    pub fn from_rows<I>(headers: Vec<String>, rows: I) -> Result<Dataset, SchemaError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let map = ColumnMap::from_headers(&headers)?;
        let mut records = Vec::new();
        let mut report = LoadReport::default();

        for (row, cells) in rows.into_iter().enumerate() {
            let cell = |index: usize| {
                cells
                    .get(index)
                    .map(|s| s.trim().to_owned())
                    .unwrap_or_default()
            };

            let diet_type = cell(map.diet_type);
            let (protein_g, carbs_g, fat_g, outcome) = parse_macros(&cells, &map, &diet_type);
            let macros = match outcome {
                Ok(macros) => {
                    report.valid_rows += 1;
                    Some(macros)
                }
                Err(reason) => {
                    report.skipped.push(SkippedRow { row, reason });
                    None
                }
            };

            let extra: BTreeMap<String, String> = headers
                .iter()
                .enumerate()
                .filter(|(index, _)| !map.is_known(*index))
                .map(|(index, header)| (header.clone(), cell(index)))
                .collect();

            records.push(RecipeRecord {
                row,
                diet_key: diet_type.to_lowercase(),
                diet_type,
                recipe_name: map.recipe_name.map(cell).unwrap_or_default(),
                cuisine_type: map.cuisine_type.map(cell).filter(|c| !c.is_empty()),
                protein_g,
                carbs_g,
                fat_g,
                extra,
                macros,
            });
        }
        report.total_rows = records.len();

        Ok(Dataset {
            columns: headers,
            records,
            report,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every row, valid or not, in original order.
    pub fn records(&self) -> &[RecipeRecord] {
        &self.records
    }

    pub fn valid_records(&self) -> impl Iterator<Item = &RecipeRecord> {
        self.records.iter().filter(|r| r.is_valid())
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_cuisine_column(&self) -> bool {
        self.columns.iter().any(|h| Column::CuisineType.matches(h))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    pub(crate) fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::from_rows(strings(headers), rows.iter().map(|r| strings(r))).unwrap()
    }

    const HEADERS: &[&str] = &[
        "Diet_type",
        "Recipe_name",
        "Cuisine_type",
        "Protein(g)",
        "Carbs(g)",
        "Fat(g)",
        "Extraction_day",
    ];

    #[test]
    fn matches_original_csv_headers() {
        let data = dataset(
            HEADERS,
            &[&["keto", "Bacon", "american", "10", "1.5", "30", "2022-10-16"]],
        );
        let record = &data.records()[0];
        assert_eq!(record.diet_type, "keto");
        assert_eq!(record.recipe_name, "Bacon");
        assert_eq!(record.cuisine_type.as_deref(), Some("american"));
        assert_eq!(
            record.macros(),
            Some(Macros {
                protein_g: 10.0,
                carbs_g: 1.5,
                fat_g: 30.0
            })
        );
        assert_eq!(record.extra.get("Extraction_day").unwrap(), "2022-10-16");
        assert!(data.has_cuisine_column());
    }

    #[test]
    fn matches_snake_case_headers() {
        let data = dataset(
            &["diet_type", "protein_g", "carbs_g", "fat_g"],
            &[&["Vegan", "5", "50", "2"]],
        );
        assert_eq!(data.report().valid_rows, 1);
        assert_eq!(data.records()[0].recipe_name, "");
        assert_eq!(data.records()[0].diet_key(), "vegan");
        assert!(!data.has_cuisine_column());
    }

    #[test]
    fn missing_fat_column_is_a_schema_error() {
        let err = Dataset::from_rows(
            strings(&["Diet_type", "Recipe_name", "Protein(g)", "Carbs(g)"]),
            Vec::<Vec<String>>::new(),
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::MissingColumns(vec!["fat_g".to_owned()]));
    }

    #[test]
    fn schema_error_names_every_missing_column() {
        let err = Dataset::from_rows(strings(&["Recipe_name"]), Vec::<Vec<String>>::new())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required column(s): diet_type, protein_g, carbs_g, fat_g"
        );
    }

    #[test]
    fn invalid_rows_are_kept_but_reported() {
        let data = dataset(
            HEADERS,
            &[
                &["keto", "A", "american", "10", "1", "30", "x"],
                &["keto", "B", "american", "abc", "1", "30", "x"],
                &["keto", "C", "american", "10", "", "30", "x"],
                &["keto", "D", "american", "10", "1", "-4", "x"],
                &["", "E", "american", "10", "1", "4", "x"],
                &["keto", "F", "american", "NaN", "1", "4", "x"],
            ],
        );

        assert_eq!(data.len(), 6);
        assert_eq!(data.report().total_rows, 6);
        assert_eq!(data.report().valid_rows, 1);
        assert_eq!(data.report().skipped_rows(), 5);
        assert_eq!(data.valid_records().count(), 1);

        let reasons: Vec<&SkipReason> = data.report().skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(
            reasons[0],
            &SkipReason::NotANumber {
                column: "protein_g",
                value: "abc".to_owned()
            }
        );
        assert_eq!(reasons[1], &SkipReason::MissingValue { column: "carbs_g" });
        assert_eq!(
            reasons[2],
            &SkipReason::Negative {
                column: "fat_g",
                value: -4.0
            }
        );
        assert_eq!(reasons[3], &SkipReason::MissingDietType);
        assert!(matches!(reasons[4], SkipReason::NotANumber { .. }));

        // Parsed cells survive on invalid rows for display.
        let b = &data.records()[1];
        assert_eq!(b.protein_g, None);
        assert_eq!(b.carbs_g, Some(1.0));
        assert!(!b.is_valid());
    }

    #[test]
    fn short_rows_are_padded() {
        let data = dataset(HEADERS, &[&["keto", "Short"]]);
        assert_eq!(data.len(), 1);
        assert_eq!(
            data.report().skipped[0].reason,
            SkipReason::MissingValue { column: "protein_g" }
        );
        assert_eq!(data.records()[0].cuisine_type, None);
    }

    #[test]
    fn skip_reason_display() {
        let reason = SkipReason::NotANumber {
            column: "fat_g",
            value: "n/a".to_owned(),
        };
        assert_eq!(reason.to_string(), "fat_g is not a number: \"n/a\"");
    }
}
