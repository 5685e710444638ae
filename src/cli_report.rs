use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use nutrition_insights_server::analytics::{ClusterLabel, DEFAULT_TOP_PER_DIET};
use nutrition_insights_server::{load_dataset, NutritionEngine};

#[derive(Parser, Debug)]
#[command(name = "nutrition-report")]
#[command(about = "Print the nutrition analyses of a recipes CSV to the console")]
struct Args {
    /// Path to the recipes CSV file
    #[arg(value_name = "CSV_PATH", env = "CSV_PATH")]
    data_path: PathBuf,

    /// Number of top protein recipes listed per diet type
    #[arg(long, default_value_t = DEFAULT_TOP_PER_DIET)]
    per_diet: i64,

    /// Also list every skipped row with its reason
    #[arg(long, default_value_t = false)]
    show_skipped: bool,
}

fn write_section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "=".repeat(title.len()))
}

fn write_summaries<W: Write>(out: &mut W, engine: &NutritionEngine) -> io::Result<()> {
    write_section(out, "Average macronutrients by diet type")?;
    writeln!(
        out,
        "{:<16} {:>10} {:>10} {:>10} {:>8}",
        "Diet type", "Protein", "Carbs", "Fat", "Recipes"
    )?;
    for summary in engine.summarize() {
        writeln!(
            out,
            "{:<16} {:>10.2} {:>10.2} {:>10.2} {:>8}",
            summary.diet_type,
            summary.avg_protein,
            summary.avg_carbs,
            summary.avg_fat,
            summary.recipe_count
        )?;
    }
    Ok(())
}

fn write_insights<W: Write>(out: &mut W, engine: &NutritionEngine, per_diet: i64) -> Result<()> {
    let insights = engine.insights(per_diet)?;

    write_section(out, "Highest protein diet")?;
    match insights.highest_protein_diet {
        Some(diet) => writeln!(
            out,
            "{} ({:.2} g on average)",
            diet.diet_type, diet.avg_protein
        )?,
        None => writeln!(out, "No valid recipes.")?,
    }

    write_section(out, &format!("Top {} protein recipes per diet type", per_diet))?;
    for diet in &insights.top_per_diet {
        writeln!(out, "{}:", diet.diet_type)?;
        for entry in &diet.recipes {
            let cuisine = entry.recipe.cuisine_type.as_deref().unwrap_or("-");
            writeln!(
                out,
                "  {:>2}. {} [{}] {:.2} g",
                entry.rank, entry.recipe.recipe_name, cuisine, entry.value
            )?;
        }
    }

    write_section(out, "Most common cuisine per diet type")?;
    if !engine.dataset().has_cuisine_column() {
        writeln!(out, "No cuisine column in the dataset.")?;
    }
    for common in &insights.common_cuisines {
        writeln!(
            out,
            "{:<16} {} ({} recipes)",
            common.diet_type, common.cuisine_type, common.recipe_count
        )?;
    }
    Ok(())
}

fn write_clusters<W: Write>(out: &mut W, engine: &NutritionEngine) -> io::Result<()> {
    let clusters = engine.cluster_diets();

    write_section(out, "Diet clusters")?;
    if let Some(medians) = clusters.medians {
        writeln!(
            out,
            "Medians: protein {:.2} g, carbs {:.2} g, fat {:.2} g",
            medians.protein, medians.carbs, medians.fat
        )?;
    }
    for label in ClusterLabel::ALL {
        let members = clusters
            .get(label)
            .map(|c| c.diet_types.join(", "))
            .unwrap_or_default();
        writeln!(out, "{:<14} {}", label.as_str(), members)?;
    }
    Ok(())
}

fn write_skipped<W: Write>(out: &mut W, engine: &NutritionEngine) -> io::Result<()> {
    write_section(out, "Skipped rows")?;
    for skipped in &engine.report().skipped {
        writeln!(out, "row {}: {}", skipped.row, skipped.reason)?;
    }
    Ok(())
}

fn write_report<W: Write>(
    out: &mut W,
    engine: &NutritionEngine,
    per_diet: i64,
    show_skipped: bool,
) -> Result<()> {
    let report = engine.report();
    writeln!(
        out,
        "{} rows loaded, {} valid, {} skipped",
        report.total_rows,
        report.valid_rows,
        report.skipped_rows()
    )?;

    write_summaries(out, engine)?;
    write_insights(out, engine, per_diet)?;
    write_clusters(out, engine)?;
    if show_skipped {
        write_skipped(out, engine)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Loading dataset from {}", args.data_path.display());
    let dataset = load_dataset(&args.data_path)
        .with_context(|| format!("Failed to load dataset {}", args.data_path.display()))?;
    let engine = NutritionEngine::new(dataset);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, &engine, args.per_diet, args.show_skipped)?;
    out.flush()?;

    Ok(())
}
