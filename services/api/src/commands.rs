use crate::cli::ArtifactArgs;
use crate::infra::load_config;
use chrono::Local;
use clap::Args;
use credit_ai::config::AppConfig;
use credit_ai::error::AppError;
use credit_ai::scoring::batch::{export_to_dir, write_csv, BatchRunner, PREVIEW_ROWS};
use credit_ai::scoring::validation::evaluate_paths;
use credit_ai::scoring::{
    ApplicantRecord, BatchPreview, BatchResult, DecisionView, Education, ModelInformation,
    ScoredApplicant, ScoringService, SelfEmployment, ValidationReport,
};
use credit_ai::telemetry;
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct AnalyzeArgs {
    /// Number of dependents (0-10)
    #[arg(long, default_value_t = 0)]
    pub(crate) dependents: u8,
    /// Annual income
    #[arg(long, default_value_t = 5_000_000.0)]
    pub(crate) income: f64,
    /// Requested loan amount
    #[arg(long, default_value_t = 2_000_000.0)]
    pub(crate) loan_amount: f64,
    /// Loan term in years (1-30)
    #[arg(long, default_value_t = 10)]
    pub(crate) loan_term: u8,
    /// CIBIL credit score (300-900)
    #[arg(long, default_value_t = 750)]
    pub(crate) cibil_score: u16,
    #[arg(long, default_value_t = 10_000_000.0)]
    pub(crate) residential_assets: f64,
    #[arg(long, default_value_t = 5_000_000.0)]
    pub(crate) commercial_assets: f64,
    #[arg(long, default_value_t = 3_000_000.0)]
    pub(crate) luxury_assets: f64,
    #[arg(long, default_value_t = 5_000_000.0)]
    pub(crate) bank_assets: f64,
    /// "Graduate" or "Not Graduate"
    #[arg(long, default_value = "Graduate")]
    pub(crate) education: Education,
    /// "Yes" or "No"
    #[arg(long, default_value = "No")]
    pub(crate) self_employed: SelfEmployment,
    /// Print the decision view as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

impl AnalyzeArgs {
    pub(crate) fn applicant(&self) -> ApplicantRecord {
        ApplicantRecord {
            no_of_dependents: self.dependents,
            income_annum: self.income,
            loan_amount: self.loan_amount,
            loan_term: self.loan_term,
            cibil_score: self.cibil_score,
            residential_assets_value: self.residential_assets,
            commercial_assets_value: self.commercial_assets,
            luxury_assets_value: self.luxury_assets,
            bank_asset_value: self.bank_assets,
            education: self.education,
            self_employed: self.self_employed,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with the 17 feature columns in model order
    pub(crate) input: PathBuf,
    /// Write results to this file instead of a timestamped file in the export directory
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
    /// Show the record count and the first rows before scoring
    #[arg(long)]
    pub(crate) preview: bool,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Feature table (17 columns, model order)
    #[arg(long)]
    pub(crate) features: PathBuf,
    /// Single-column label file (1 = approved, 0 = rejected)
    #[arg(long)]
    pub(crate) labels: PathBuf,
    #[command(flatten)]
    pub(crate) artifacts: ArtifactArgs,
}

fn start(artifacts: ArtifactArgs) -> Result<(AppConfig, ScoringService), AppError> {
    let config = load_config(artifacts)?;
    telemetry::init(&config.telemetry, config.environment)?;
    let service = ScoringService::from_config(&config.artifacts)?;
    Ok((config, service))
}

pub(crate) fn run_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let applicant = args.applicant();
    let (_, service) = start(args.artifacts)?;
    let scored = service.analyze(&applicant)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&scored)
            .map_err(|err| AppError::Io(std::io::Error::from(err)))?;
        println!("{rendered}");
    } else {
        render_analysis(&scored);
    }
    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        input,
        output,
        preview,
        artifacts,
    } = args;

    let (config, service) = start(artifacts)?;
    let table = BatchRunner::load_path(&input)?;
    println!(
        "Loaded {} records from {}",
        table.len(),
        input.display()
    );
    if preview {
        render_preview(&table.preview(PREVIEW_ROWS));
    }

    let result = BatchRunner::new(&service).run(&table)?;
    render_batch_summary(&result);

    let written = match output {
        Some(path) => {
            write_csv(&result, File::create(&path)?)?;
            path
        }
        None => export_to_dir(
            &result,
            &config.artifacts.export_dir,
            Local::now().naive_local(),
        )?,
    };
    println!("\nResults written to {}", written.display());
    Ok(())
}

pub(crate) fn run_about(args: ArtifactArgs) -> Result<(), AppError> {
    let config = load_config(args)?;
    let information = ModelInformation::load(&config.artifacts.comparison_path);
    render_model_information(&information);
    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let ValidateArgs {
        features,
        labels,
        artifacts,
    } = args;

    let (config, service) = start(artifacts)?;
    println!(
        "Model: {} ({}) | scaling: {}",
        service.classifier_name(),
        config.artifacts.model_path.display(),
        service.scaling()
    );
    let report = evaluate_paths(&service, &features, &labels)?;
    render_validation(&report);
    Ok(())
}

fn render_analysis(scored: &ScoredApplicant) {
    let view = &scored.decision;
    let metrics = &view.metrics;

    println!("Derived metrics");
    println!("- Loan amount: {:.2}", metrics.loan_amount);
    println!("- Annual income: {:.2}", metrics.income_annum);
    println!("- CIBIL score: {:.0}", metrics.cibil_score);
    println!("- Credit/income ratio: {:.2}x", metrics.credit_income_ratio);
    println!("- Total assets: {:.2}", metrics.total_assets);
    println!("- Assets/income ratio: {:.2}x", metrics.assets_income_ratio);
    println!("- Loan/assets ratio: {:.2}%", metrics.loan_assets_ratio * 100.0);

    render_decision(view);
}

fn render_decision(view: &DecisionView) {
    println!("\n{}", view.headline);
    println!(
        "{} probability: {:.2}%",
        view.verdict_label,
        view.displayed_probability * 100.0
    );

    println!("\nProbability distribution");
    for bar in &view.probability_bars {
        let filled = (bar.percent / 5.0).round().clamp(0.0, 20.0) as usize;
        println!(
            "  {:<9} {:<20} {:>6.2}%",
            bar.label,
            "#".repeat(filled),
            bar.percent
        );
    }

    println!("\nRisk factors");
    for line in &view.risk_summary {
        println!("- {line}");
    }
}

fn render_preview(preview: &BatchPreview) {
    println!(
        "\nPreview (first {} of {} rows)",
        preview.rows.len(),
        preview.total_rows
    );
    println!("{}", preview.header.join(" | "));
    for row in &preview.rows {
        println!("{}", row.join(" | "));
    }
}

fn render_batch_summary(result: &BatchResult) {
    let summary = &result.summary;
    println!("\nBatch statistics");
    println!("- Total analyses: {}", summary.total);
    println!(
        "- Approved: {} ({:.1}%)",
        summary.approved, summary.approved_pct
    );
    println!(
        "- Rejected: {} ({:.1}%)",
        summary.rejected, summary.rejected_pct
    );
    println!(
        "- Mean approval probability: {:.1}%",
        summary.mean_prob_approved * 100.0
    );

    println!("\nDetailed results");
    for (index, row) in result.rows.iter().enumerate() {
        println!(
            "  {:>4}. {:<8} approved {:>6.2}% | rejected {:>6.2}%",
            index + 1,
            row.decision.verdict.label(),
            row.decision.probabilities.approved * 100.0,
            row.decision.probabilities.rejected * 100.0
        );
    }
}

fn render_model_information(information: &ModelInformation) {
    let card = &information.card;

    println!("Technical information");
    println!("Algorithm: {}", card.algorithm);
    for line in card.characteristics {
        println!("- {line}");
    }
    println!("\nImbalance handling");
    for line in card.imbalance_handling {
        println!("- {line}");
    }
    println!("\nOptimisation");
    for line in card.optimisation {
        println!("- {line}");
    }

    println!("\nTest set metrics");
    for metric in card.test_metrics {
        println!(
            "- {}: {:.4} ({:.2}%)",
            metric.name,
            metric.value,
            metric.value * 100.0
        );
    }
    println!("\nMost important features");
    for (rank, feature) in card.top_features.iter().enumerate() {
        println!("  {}. {feature}", rank + 1);
    }
    println!("\nPreprocessing");
    for line in card.preprocessing {
        println!("- {line}");
    }

    if let Some(table) = &information.comparison {
        println!("\nModel comparison");
        println!("{}", table.header.join(" | "));
        for row in &table.rows {
            println!("{}", row.join(" | "));
        }
    }

    println!("\nProject stages");
    for stage in card.stages {
        println!(
            "Stage {}: {} ({})",
            stage.stage,
            stage.title,
            stage.activities.join(", ")
        );
    }
    println!("\nNote: {}", card.note);
}

fn render_validation(report: &ValidationReport) {
    println!("\nSample predictions");
    for sample in &report.sample_predictions {
        println!(
            "  {}. {} (approved {:.2}%, rejected {:.2}%) | actual {}",
            sample.row,
            sample.decision.verdict.label(),
            sample.decision.probabilities.approved * 100.0,
            sample.decision.probabilities.rejected * 100.0,
            sample.actual.label()
        );
    }

    println!("\nMetrics on {} labelled rows", report.samples);
    match report.auc {
        Some(auc) => println!("- AUC: {auc:.4}"),
        None => println!("- AUC: undefined (labels contain a single class)"),
    }
    println!("- Recall (approved): {:.4}", report.recall);
    println!("- Precision (approved): {:.4}", report.precision);
    println!("- F1-Score: {:.4}", report.f1);
    println!("- Accuracy: {:.4}", report.accuracy);
    println!(
        "- Confusion: TP {} | FP {} | TN {} | FN {}",
        report.confusion.true_positive,
        report.confusion.false_positive,
        report.confusion.true_negative,
        report.confusion.false_negative
    );
}
