mod settings;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use vidsort_core::catalog::domain::reference_catalog::ReferenceCatalog;
use vidsort_core::catalog::infrastructure::catalog_loader;
use vidsort_core::catalog::infrastructure::reference_cache::ReferenceCache;
use vidsort_core::classification::domain::escalation_policy::EscalationPolicy;
use vidsort_core::classification::domain::group_classifier::GroupClassifier;
use vidsort_core::evaluation::accuracy::evaluate;
use vidsort_core::frames::domain::frame_grouper::{self, frame_count};
use vidsort_core::frames::domain::group_collapser::GroupCollapser;
use vidsort_core::frames::infrastructure::frame_scanner::scan_dir;
use vidsort_core::frames::infrastructure::fs_group_collapser::FsGroupCollapser;
use vidsort_core::oracle::domain::similarity_scorer::SimilarityScorer;
use vidsort_core::oracle::infrastructure::chat_completion_oracle::ChatCompletionOracle;
use vidsort_core::oracle::infrastructure::data_url_preparer::DataUrlPreparer;
use vidsort_core::pipeline::batch_logger::StdoutBatchLogger;
use vidsort_core::pipeline::classify_batch_use_case::{ClassifyBatchUseCase, GroupOutcome};
use vidsort_core::shared::constants::{REFINE_PROMPT, SORT_PROMPT};

use settings::SorterSettings;

/// Sort sampled video frames into categories by similarity to reference
/// images.
#[derive(Parser)]
#[command(name = "vidsort")]
struct Cli {
    /// Directory of sampled frames named `<group>_<n>.<ext>`.
    frames: PathBuf,

    /// Reference directory holding the images and `categories.txt`.
    #[arg(long, default_value = "reference")]
    reference: PathBuf,

    /// Category definitions file (defaults to `<reference>/categories.txt`).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Settings file (defaults to the platform config dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chat completion endpoint of the vision model server.
    #[arg(long)]
    endpoint: Option<String>,

    /// Model used for the first pass.
    #[arg(long)]
    sort_model: Option<String>,

    /// Model used to refine ambiguous groups.
    #[arg(long)]
    refine_model: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Lead below which a first-pass decision is ambiguous.
    #[arg(long)]
    ambiguity_margin: Option<f64>,

    /// Lead at which refinement stops consulting more references.
    #[arg(long)]
    confidence_margin: Option<f64>,

    /// Skip the refinement pass; ambiguous groups are reported as such.
    #[arg(long)]
    no_refine: bool,

    /// After refinement, delete every frame of a refined group except its
    /// representative, plus `.txt` sidecars.
    #[arg(long)]
    collapse: bool,

    /// JSON object of `{"group": "label"}` to score the results against.
    #[arg(long)]
    ground_truth: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = resolve_settings(&cli)?;
    validate(&cli, &settings)?;

    let catalog = match &cli.catalog {
        Some(path) => catalog_loader::load(path, &cli.reference)?,
        None => catalog_loader::load_from_dir(&cli.reference)?,
    };
    let cache = ReferenceCache::build(&catalog, &DataUrlPreparer::new())?;

    let groups = frame_grouper::group(scan_dir(&cli.frames)?);
    log::info!(
        "Found {} groups ({} frames) in {}",
        groups.len(),
        frame_count(&groups),
        cli.frames.display()
    );

    let timeout = Duration::from_secs(settings.timeout_secs);
    let sorter = build_classifier(
        &settings.endpoint,
        &settings.sort_model,
        SORT_PROMPT,
        timeout,
        EscalationPolicy::fixed(settings.ambiguity_margin),
    )?;
    let refiner = if cli.no_refine {
        None
    } else {
        Some(build_classifier(
            &settings.endpoint,
            &settings.refine_model,
            REFINE_PROMPT,
            timeout,
            EscalationPolicy::adaptive(settings.confidence_margin),
        )?)
    };
    let collapser: Option<Box<dyn GroupCollapser>> = if cli.collapse {
        Some(Box::new(FsGroupCollapser::new()))
    } else {
        None
    };

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rClassified group {current}/{total}");
        if current == total {
            eprintln!();
        }
        true
    });

    let mut use_case = ClassifyBatchUseCase::new(
        sorter,
        refiner,
        collapser,
        Box::new(StdoutBatchLogger::new(settings.progress_throttle)),
        Some(progress),
    );
    let outcomes = use_case.execute(&groups, &catalog, &cache)?;

    print_outcomes(&outcomes, &catalog);

    if let Some(path) = &cli.ground_truth {
        report_accuracy(path, &outcomes)?;
    }
    Ok(())
}

fn resolve_settings(cli: &Cli) -> Result<SorterSettings, Box<dyn std::error::Error>> {
    let mut settings = SorterSettings::load(cli.config.as_deref())?;
    if let Some(endpoint) = &cli.endpoint {
        settings.endpoint = endpoint.clone();
    }
    if let Some(model) = &cli.sort_model {
        settings.sort_model = model.clone();
    }
    if let Some(model) = &cli.refine_model {
        settings.refine_model = model.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        settings.timeout_secs = secs;
    }
    if let Some(margin) = cli.ambiguity_margin {
        settings.ambiguity_margin = margin;
    }
    if let Some(margin) = cli.confidence_margin {
        settings.confidence_margin = margin;
    }
    Ok(settings)
}

fn build_classifier(
    endpoint: &str,
    model: &str,
    prompt: &str,
    timeout: Duration,
    policy: EscalationPolicy,
) -> Result<GroupClassifier, Box<dyn std::error::Error>> {
    log::info!("Using model {model} for {} pass", policy.name());
    let oracle = ChatCompletionOracle::new(endpoint, model, timeout)?;
    Ok(GroupClassifier::new(
        SimilarityScorer::new(Box::new(oracle), prompt),
        Box::new(DataUrlPreparer::new()),
        policy,
    ))
}

fn validate(cli: &Cli, settings: &SorterSettings) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if let Some(path) = &cli.ground_truth {
        if !path.is_file() {
            return Err(format!("Ground truth file not found: {}", path.display()).into());
        }
    }
    if settings.ambiguity_margin < 0.0 {
        return Err(format!(
            "Ambiguity margin must be non-negative, got {}",
            settings.ambiguity_margin
        )
        .into());
    }
    if settings.confidence_margin < 0.0 {
        return Err(format!(
            "Confidence margin must be non-negative, got {}",
            settings.confidence_margin
        )
        .into());
    }
    if settings.timeout_secs == 0 {
        return Err("Timeout must be at least one second".into());
    }
    Ok(())
}

fn print_outcomes(outcomes: &[GroupOutcome], catalog: &ReferenceCatalog) {
    let mut per_label: HashMap<&str, usize> = HashMap::new();
    for outcome in outcomes {
        let decision = &outcome.decision;
        let note = outcome_note(outcome);
        let score = decision
            .score_of(&decision.category)
            .map(|s| format!(" {s:.2}"))
            .unwrap_or_default();
        println!("{}: {}{score}{note}", outcome.group_id, decision.category);
        *per_label.entry(decision.category.as_str()).or_default() += 1;
    }

    println!();
    for label in catalog.all_labels() {
        if let Some(count) = per_label.get(label) {
            println!("{label}: {count} groups");
        }
    }
}

fn outcome_note(outcome: &GroupOutcome) -> &'static str {
    if outcome.decision.is_fallback() {
        " (no evidence)"
    } else if outcome.refined {
        " (refined)"
    } else if outcome.decision.ambiguous {
        " (ambiguous)"
    } else {
        ""
    }
}

fn report_accuracy(
    path: &Path,
    outcomes: &[GroupOutcome],
) -> Result<(), Box<dyn std::error::Error>> {
    let ground_truth = load_ground_truth(path)?;
    let predictions: HashMap<String, String> = outcomes
        .iter()
        .map(|o| (o.group_id.clone(), o.decision.category.clone()))
        .collect();

    println!("\n=== Accuracy Report ===");
    println!("{}", evaluate(&ground_truth, &predictions));
    Ok(())
}

fn load_ground_truth(
    path: &Path,
) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    let ground_truth = serde_json::from_str(&json)
        .map_err(|e| format!("Invalid ground truth {}: {e}", path.display()))?;
    Ok(ground_truth)
}
