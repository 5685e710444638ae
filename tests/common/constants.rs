//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the fixture dataset changes, update only this file and
//! `fixtures.rs`.
#![allow(dead_code)]

// ============================================================================
// Fixture Dataset Shape
// ============================================================================

/// Rows in the fixture CSV, skipped ones included
pub const TOTAL_ROWS: usize = 11;

/// Rows with valid macronutrients
pub const VALID_ROWS: usize = 9;

/// "Broken Row" (non-numeric protein) and "Oatmeal Bowl" (negative carbs)
pub const SKIPPED_ROWS: usize = 2;

/// Diet types in summary order
pub const DIET_TYPES: [&str; 5] = ["dash", "keto", "mediterranean", "paleo", "vegan"];

// ============================================================================
// Fixture Recipes
// ============================================================================

/// Highest protein recipe (120 g)
pub const TOP_PROTEIN_RECIPE: &str = "Grilled Salmon";

/// Second highest protein recipe (90 g)
pub const SECOND_PROTEIN_RECIPE: &str = "Steak Salad";

/// Highest carbs recipe (180 g)
pub const TOP_CARBS_RECIPE: &str = "Lentil Curry";

/// Highest fat recipe (80 g)
pub const TOP_FAT_RECIPE: &str = "Steak Salad";

/// Valid recipes whose name contains "salad"
pub const SALAD_RECIPES: usize = 4;

// ============================================================================
// Expected Analytics
// ============================================================================

/// Keto averages over its three valid recipes
pub const KETO_AVG_PROTEIN: f64 = 90.0;
pub const KETO_AVG_CARBS: f64 = 10.0;
pub const KETO_AVG_FAT: f64 = 70.0;

/// Cross-diet medians of the averaged macronutrients
pub const MEDIAN_PROTEIN: f64 = 50.0;
pub const MEDIAN_CARBS: f64 = 50.0;
pub const MEDIAN_FAT: f64 = 27.5;

pub const HIGH_PROTEIN_DIETS: [&str; 2] = ["keto", "paleo"];
pub const HIGH_CARB_DIETS: [&str; 2] = ["dash", "vegan"];
pub const BALANCED_DIETS: [&str; 1] = ["mediterranean"];

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the server to start
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness checks
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 25;

/// Request timeout for the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
