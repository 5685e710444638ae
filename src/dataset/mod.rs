mod load;
mod record;
mod table;

pub use load::{load_dataset, read_csv, DatasetError};
pub use record::{Macros, Metric, RecipeRecord};
pub use table::{Dataset, LoadReport, SchemaError, SkipReason, SkippedRow};

#[cfg(test)]
pub(crate) use table::tests::dataset as test_dataset;
