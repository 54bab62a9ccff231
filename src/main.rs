use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use crocus_data::{TrainTestSplit, load_iris};
use crocus_report::{Style, render_class_metrics, render_heatmap, render_prediction_table};
use crocus_rf::{
    ConfusionMatrix, CrossValidation, OobMode, RandomForestConfig, SplitCriterion,
};

#[derive(Parser)]
#[command(name = "crocus")]
#[command(about = "Random Forest training and evaluation on the bundled Iris dataset")]
#[command(version)]
struct Cli {
    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of trees in the Random Forest
    #[arg(long, default_value_t = 500)]
    n_trees: usize,

    /// Maximum leaves per tree (0 = unlimited)
    #[arg(long, default_value_t = 16)]
    max_leaf_nodes: usize,

    /// Fraction of samples held out for testing
    #[arg(long, default_value_t = 0.25)]
    test_fraction: f64,

    /// Number of cross-validation folds
    #[arg(long, default_value_t = 5)]
    cv_folds: usize,

    /// Split quality criterion: "gini" or "entropy"
    #[arg(long, default_value = "gini")]
    criterion: String,

    /// Also compute the out-of-bag score during the final fit
    #[arg(long)]
    oob: bool,

    /// Print a JSON summary instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// Disable ANSI colors in the report
    #[arg(long)]
    no_color: bool,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
}

/// JSON stdout summary for `--json`.
#[derive(Serialize)]
struct EvaluationOutput {
    n_train: usize,
    n_test: usize,
    n_trees: usize,
    max_leaf_nodes: Option<usize>,
    train_accuracy: f64,
    test_accuracy: f64,
    n_misclassified: usize,
    oob_accuracy: Option<f64>,
    cv_folds: usize,
    cv_fold_accuracies: Vec<f64>,
    cv_mean_accuracy: f64,
    cv_std_accuracy: f64,
}

fn parse_criterion(s: &str) -> Result<SplitCriterion> {
    match s {
        "gini" => Ok(SplitCriterion::Gini),
        "entropy" => Ok(SplitCriterion::Entropy),
        other => anyhow::bail!("unknown criterion: {other} (expected gini or entropy)"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    let style = if cli.no_color || cli.json {
        Style::plain()
    } else {
        Style::ansi()
    };
    let criterion = parse_criterion(&cli.criterion)?;
    let max_leaf_nodes = (cli.max_leaf_nodes > 0).then_some(cli.max_leaf_nodes);

    // 1. Load and split
    let dataset = load_iris().context("failed to load the bundled Iris dataset")?;

    let (train, test) = TrainTestSplit::new(cli.test_fraction)?
        .with_seed(cli.seed)
        .split(&dataset)
        .context("train/test split failed")?;

    if !cli.json {
        println!("{}", style.heading("Load and split the Iris data"));
        println!("  N(train) = {}", train.n_samples());
        println!("  N(test)  = {}", test.n_samples());
        println!();
    }

    // 2. Fit
    let base_config = RandomForestConfig::new(cli.n_trees)?
        .with_max_leaf_nodes(max_leaf_nodes)
        .with_criterion(criterion)
        .with_seed(cli.seed);
    let fit_config = if cli.oob {
        base_config.clone().with_oob_mode(OobMode::Enabled)
    } else {
        base_config.clone()
    };

    if !cli.json {
        println!("{}", style.heading("Fitting a random forest classifier"));
    }
    let result = fit_config
        .fit(train.features(), train.labels(), train.feature_names())
        .context("random forest training failed")?;
    let forest = result.forest();

    // 3. Score and predict
    let test_accuracy = forest.score(test.features(), test.labels())?;
    let train_accuracy = forest.score(train.features(), train.labels())?;
    let predictions = forest.predict_batch(test.features())?;
    let confusion =
        ConfusionMatrix::from_labels(test.labels(), &predictions, dataset.n_classes())?;
    let oob_accuracy = result.oob_score().map(|s| s.accuracy);

    if !cli.json {
        println!("Test accuracy: {:.2}%", test_accuracy * 100.0);
        println!();

        println!("{}", style.heading("Confusion matrix (test)"));
        print!(
            "{}",
            render_heatmap(confusion.as_rows(), dataset.class_names(), &style)?
        );
        println!();

        let class_metrics: Vec<(f64, f64, f64, usize)> = confusion
            .class_metrics()
            .iter()
            .map(|m| (m.precision, m.recall, m.f1, m.support))
            .collect();
        print!(
            "{}",
            render_class_metrics(dataset.class_names(), &class_metrics, &style)?
        );
        println!();

        println!("{}", style.heading("Random forest classifier scores"));
        println!("  Train score = {train_accuracy:.4} (scored on its own training data)");
        println!("  Test score  = {test_accuracy:.4}");
        println!(
            "  Misclassified test samples = {}",
            confusion.n_misclassified()
        );
        if let Some(oob) = oob_accuracy {
            println!("  OOB score   = {oob:.4}");
        }
        println!();

        println!("{}", style.heading("Feature importances"));
        for feature in result.importances() {
            println!(
                "  {:>2}. {:<14} {:.4}",
                feature.rank, feature.name, feature.importance
            );
        }
        println!();

        println!(
            "{}",
            style.heading("Truth vs prediction on the test sample")
        );
        print!(
            "{}",
            render_prediction_table(test.labels(), &predictions, dataset.class_names(), &style)?
        );
        println!();
    }

    // 4. Cross-validate on the training sample
    let cv = CrossValidation::new(cli.cv_folds)?.with_seed(cli.seed);
    let cv_result = cv
        .evaluate(&base_config, train.features(), train.labels(), train.feature_names())
        .context("cross-validation failed")?;

    if !cli.json {
        println!("{}", style.heading("Cross validation on the training sample"));
        let scores: Vec<String> = cv_result
            .fold_accuracies
            .iter()
            .map(|a| format!("{a:.4}"))
            .collect();
        println!("  fold scores = [{}]", scores.join(", "));
        println!("  mean = {:.4}", cv_result.mean_accuracy);
        println!("  std  = {:.4}", cv_result.std_accuracy);
    }

    if cli.json {
        let output = EvaluationOutput {
            n_train: train.n_samples(),
            n_test: test.n_samples(),
            n_trees: cli.n_trees,
            max_leaf_nodes,
            train_accuracy,
            test_accuracy,
            n_misclassified: confusion.n_misclassified(),
            oob_accuracy,
            cv_folds: cli.cv_folds,
            cv_fold_accuracies: cv_result.fold_accuracies.clone(),
            cv_mean_accuracy: cv_result.mean_accuracy,
            cv_std_accuracy: cv_result.std_accuracy,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
