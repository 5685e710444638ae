mod clusters;
mod engine;
mod error;
mod insights;

pub use clusters::{
    classify, classify_diets, median, medians, ClusterLabel, DietCluster, DietClusters,
    MacroMedians,
};
pub use engine::{
    recipe_statistics, DietSummary, NutritionEngine, Page, RankedRecipe, RecipeStatistics,
    DEFAULT_TOP_LIMIT,
};
pub use error::QueryError;
pub use insights::{CommonCuisine, DietTopRecipes, Insights, DEFAULT_TOP_PER_DIET};
