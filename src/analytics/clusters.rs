//! Heuristic grouping of diet types by macronutrient profile.
//!
//! Each diet is compared against the cross-diet median of the averaged
//! macronutrients. There is no iteration and no randomness: the same
//! summaries always produce the same buckets.

use serde::Serialize;
use std::fmt;

use super::{DietSummary, NutritionEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterLabel {
    HighProtein,
    HighCarb,
    Balanced,
}

impl ClusterLabel {
    /// Buckets in output order.
    pub const ALL: [ClusterLabel; 3] = [
        ClusterLabel::HighProtein,
        ClusterLabel::HighCarb,
        ClusterLabel::Balanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterLabel::HighProtein => "high-protein",
            ClusterLabel::HighCarb => "high-carb",
            ClusterLabel::Balanced => "balanced",
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MacroMedians {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DietCluster {
    pub label: ClusterLabel,
    pub diet_types: Vec<String>,
    /// The summaries each member was classified from.
    pub members: Vec<DietSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DietClusters {
    /// `None` when there is no diet to compare.
    pub medians: Option<MacroMedians>,
    pub clusters: Vec<DietCluster>,
}

impl DietClusters {
    pub fn get(&self, label: ClusterLabel) -> Option<&DietCluster> {
        self.clusters.iter().find(|c| c.label == label)
    }

    pub fn label_of(&self, diet_type: &str) -> Option<ClusterLabel> {
        let key = diet_type.to_lowercase();
        self.clusters
            .iter()
            .find(|c| c.members.iter().any(|m| m.diet_key() == key))
            .map(|c| c.label)
    }
}

/// Median of `values`, mean of the two middle values for an even count.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

pub fn medians(summaries: &[DietSummary]) -> Option<MacroMedians> {
    let column = |f: fn(&DietSummary) -> f64| {
        let mut values: Vec<f64> = summaries.iter().map(f).collect();
        median(&mut values)
    };
    Some(MacroMedians {
        protein: column(|s| s.avg_protein)?,
        carbs: column(|s| s.avg_carbs)?,
        fat: column(|s| s.avg_fat)?,
    })
}

/// Ties with the median never count as "above".
pub fn classify(summary: &DietSummary, medians: &MacroMedians) -> ClusterLabel {
    let high_protein = summary.avg_protein > medians.protein;
    let high_carbs = summary.avg_carbs > medians.carbs;
    match (high_protein, high_carbs) {
        (true, false) => ClusterLabel::HighProtein,
        (false, true) => ClusterLabel::HighCarb,
        _ => ClusterLabel::Balanced,
    }
}

pub fn classify_diets(summaries: &[DietSummary]) -> DietClusters {
    let medians = medians(summaries);
    let mut clusters: Vec<DietCluster> = ClusterLabel::ALL
        .iter()
        .map(|label| DietCluster {
            label: *label,
            diet_types: Vec::new(),
            members: Vec::new(),
        })
        .collect();

    if let Some(medians) = medians.as_ref() {
        for summary in summaries {
            let label = classify(summary, medians);
            if let Some(cluster) = clusters.iter_mut().find(|c| c.label == label) {
                cluster.diet_types.push(summary.diet_type.clone());
                cluster.members.push(summary.clone());
            }
        }
    }

    DietClusters { medians, clusters }
}

impl NutritionEngine {
    pub fn cluster_diets(&self) -> DietClusters {
        classify_diets(self.summarize())
    }
}
