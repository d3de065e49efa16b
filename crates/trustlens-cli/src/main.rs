//! Trustlens CLI
//!
//! Command-line interface for review trust validation.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a review file
//! trustlens validate --review review.txt
//!
//! # Pipe from stdin, with product context
//! cat review.txt | trustlens validate --criteria vitamin-c.yaml --nutrition record.yaml
//!
//! # Include rating plausibility
//! trustlens validate --review review.txt --rating 5 --rating-avg 3.5 --rating-count 500
//!
//! # JSON output
//! trustlens validate --review review.txt --format json
//!
//! # Validate a criteria file
//! trustlens criteria validate vitamin-c.yaml
//! ```
//!
//! ## Exit Codes
//!
//! - 0: genuine review
//! - 1: advertisement
//! - 2: review rejected (too short)
//! - 3: error

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use trustlens_core::{
    validate_review, NutritionRecord, ProductCriteria, ProductStats, Review, Validation,
};

/// Trustlens: heuristic trust scoring for supplement reviews
#[derive(Parser)]
#[command(name = "trustlens")]
#[command(version)]
#[command(about = "Score supplement reviews and flag advertisements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a review
    Validate {
        /// Path to the review text file (reads from stdin if not provided)
        #[arg(short, long)]
        review: Option<PathBuf>,

        /// Per-product criteria file (YAML or JSON)
        #[arg(short, long)]
        criteria: Option<PathBuf>,

        /// Nutrition record file (YAML or JSON)
        #[arg(short, long)]
        nutrition: Option<PathBuf>,

        /// The review's star rating (1-5)
        #[arg(long)]
        rating: Option<u8>,

        /// Product-wide average rating
        #[arg(long)]
        rating_avg: Option<f64>,

        /// Number of ratings behind the average
        #[arg(long)]
        rating_count: Option<u32>,

        /// Review length score (0-100)
        #[arg(long)]
        length_score: Option<f64>,

        /// Repurchase score (0-100)
        #[arg(long)]
        repurchase_score: Option<f64>,

        /// Monthly-use score (0-100)
        #[arg(long)]
        monthly_use_score: Option<f64>,

        /// Photo attachment score (0-100)
        #[arg(long)]
        photo_score: Option<f64>,

        /// Content consistency score (0-100)
        #[arg(long)]
        consistency_score: Option<f64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Criteria management commands
    Criteria {
        #[command(subcommand)]
        action: CriteriaAction,
    },
}

#[derive(Subcommand)]
enum CriteriaAction {
    /// Validate a criteria file
    Validate {
        /// Path to the criteria file
        path: PathBuf,
    },

    /// Show criteria details
    Show {
        /// Path to the criteria file
        path: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(3)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            review,
            criteria,
            nutrition,
            rating,
            rating_avg,
            rating_count,
            length_score,
            repurchase_score,
            monthly_use_score,
            photo_score,
            consistency_score,
            format,
        } => {
            let body = read_review(review)?;
            let criteria = criteria.map(|path| load_criteria(&path)).transpose()?;
            let record = nutrition.map(|path| load_record(&path)).transpose()?;

            let mut review = Review::text(body);
            review.rating = rating;
            review.signals.length = length_score;
            review.signals.repurchase = repurchase_score;
            review.signals.monthly_use = monthly_use_score;
            review.signals.photo = photo_score;
            review.signals.consistency = consistency_score;

            let stats = (rating_avg.is_some() || rating_count.is_some()).then(|| ProductStats {
                rating_avg,
                rating_count,
            });

            validate_command(&review, criteria.as_ref(), record.as_ref(), stats.as_ref(), format)
        }

        Commands::Criteria { action } => match action {
            CriteriaAction::Validate { path } => validate_criteria(path),
            CriteriaAction::Show { path } => show_criteria(path),
        },
    }
}

fn read_review(path: Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read review from {:?}", path)),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

fn load_criteria(path: &PathBuf) -> Result<ProductCriteria> {
    if path.extension().map(|e| e == "json").unwrap_or(false) {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read criteria from {:?}", path))?;
        ProductCriteria::from_json(&raw)
    } else {
        ProductCriteria::from_yaml_file(path)
    }
    .with_context(|| format!("Failed to load criteria from {:?}", path))
}

fn load_record(path: &PathBuf) -> Result<NutritionRecord> {
    if path.extension().map(|e| e == "json").unwrap_or(false) {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read nutrition record from {:?}", path))?;
        NutritionRecord::from_json(&raw)
    } else {
        NutritionRecord::from_yaml_file(path)
    }
    .with_context(|| format!("Failed to load nutrition record from {:?}", path))
}

fn validate_command(
    review: &Review,
    criteria: Option<&ProductCriteria>,
    record: Option<&NutritionRecord>,
    stats: Option<&ProductStats>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let min_length = criteria.map(|c| c.min_review_length).unwrap_or(10);
    if review.body.trim().chars().count() < min_length {
        let message = format!("리뷰가 너무 짧습니다 (최소 {min_length}자 이상)");
        match format {
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "error": "REVIEW_TOO_SHORT",
                    "message": message,
                });
                println!("{}", serde_json::to_string_pretty(&json)?);
            }
            OutputFormat::Text => {
                println!("REJECTED");
                println!();
                println!("{message}");
            }
        }
        return Ok(ExitCode::from(2));
    }

    let validation =
        validate_review(review, criteria, record, stats).context("Validation failed")?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&validation)?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            print_text_result(&validation);
        }
    }

    Ok(if validation.is_ad {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    })
}

fn print_text_result(validation: &Validation) {
    println!("{}", if validation.is_ad { "AD" } else { "GENUINE" });
    println!();
    println!("Trust score: {:.2}", validation.trust_score);
    println!(
        "Base {:.2} - penalty {:.0} ({} item(s) detected)",
        validation.base_score, validation.penalty, validation.detected_count
    );

    if !validation.reasons.is_empty() {
        println!();
        println!("Detections:");
        for reason in &validation.reasons {
            println!("  {}", reason);
        }
    }

    if let Some(nutrition_score) = validation.nutrition_score {
        println!();
        println!("Nutrition consistency: {:.2}", nutrition_score);
        if let Some(nutrition) = &validation.nutrition_validation {
            if !nutrition.invalid_ingredients.is_empty() {
                println!(
                    "Unsupported ingredient claims: {}",
                    nutrition.invalid_ingredients.join(", ")
                );
            }
        }
    }

    if let Some(rating) = &validation.rating_analysis {
        println!();
        println!("Rating reliability: {:.2}", rating.reliability_score);
        println!("{}", rating.insight.message);
        println!("{}", rating.insight.recommendation);
        if rating.manipulation_suspected {
            println!("Rating manipulation suspected");
        }
    }
}

fn validate_criteria(path: PathBuf) -> Result<ExitCode> {
    load_criteria(&path)?;
    println!("Criteria valid: {:?}", path);
    Ok(ExitCode::from(0))
}

fn show_criteria(path: PathBuf) -> Result<ExitCode> {
    let criteria = load_criteria(&path)?;

    println!("Product:  {}", criteria.product_name);
    println!("Category: {}", criteria.category);
    println!("Keyword repetition threshold: {}", criteria.keyword_repetition_threshold);
    println!("Minimum review length: {}", criteria.min_review_length);

    if !criteria.positive_keywords.is_empty() {
        println!();
        println!("Positive keywords: {}", criteria.positive_keywords.join(", "));
    }
    if !criteria.negative_expressions.is_empty() {
        println!("Negative expressions: {}", criteria.negative_expressions.join(", "));
    }
    if !criteria.ad_suspicious_expressions.is_empty() {
        println!(
            "Ad-suspicious expressions: {}",
            criteria.ad_suspicious_expressions.join(", ")
        );
    }

    Ok(ExitCode::from(0))
}
