//! Test fixture creation
//!
//! Writes the recipes CSV every test server loads. The expected values in
//! `constants.rs` are derived from these rows.

use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

const FIXTURE_CSV: &str = "\
Diet_type,Recipe_name,Cuisine_type,Protein(g),Carbs(g),Fat(g),Extraction_day
keto,Bacon Eggs,american,60,5,70,2022-10-16
keto,Grilled Salmon,french,120,10,60,2022-10-16
Keto,Steak Salad,american,90,15,80,2022-10-16
vegan,Lentil Curry,indian,25,180,10,2022-10-16
vegan,Tofu Stir Fry,asian,35,120,20,2022-10-16
paleo,Chicken Salad,american,70,20,30,2022-10-16
paleo,Broken Row,american,abc,10,10,2022-10-16
mediterranean,Greek Salad,mediterranean,20,40,30,2022-10-16
mediterranean,Chicken Souvlaki,mediterranean,80,60,25,2022-10-16
dash,Oatmeal Bowl,american,15,-5,5,2022-10-16
dash,Quinoa Salad,american,20,100,10,2022-10-16
";

/// Creates a temporary CSV file with the fixture recipes.
///
/// The file is deleted when the returned handle is dropped.
pub fn create_test_dataset() -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    file.write_all(FIXTURE_CSV.as_bytes())?;
    file.flush()?;
    Ok(file)
}
