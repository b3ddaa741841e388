use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pills_core::export::{export_health_metrics, export_stress_history};
use pills_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pills")]
#[command(about = "Stress-aware wellness content recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Sensor values shared by `score` and `ingest`
#[derive(clap::Args)]
struct ReadingArgs {
    /// Heart rate in beats per minute
    #[arg(long)]
    hr: Option<i32>,

    /// Daily step count
    #[arg(long)]
    steps: Option<i32>,

    /// Hours slept
    #[arg(long)]
    sleep: Option<f64>,

    /// Heart rate variability in milliseconds
    #[arg(long)]
    hrv: Option<i32>,

    /// Body temperature in °C
    #[arg(long)]
    temp: Option<f64>,

    /// Reading time (RFC 3339), defaults to now
    #[arg(long)]
    at: Option<DateTime<Utc>>,
}

impl ReadingArgs {
    fn to_reading(&self) -> HealthMetricReading {
        HealthMetricReading {
            heart_rate_bpm: self.hr,
            steps: self.steps,
            sleep_hours: self.sleep,
            heart_rate_variability_ms: self.hrv,
            body_temperature_c: self.temp,
            timestamp: self.at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Score a reading without storing anything
    Score {
        #[command(flatten)]
        reading: ReadingArgs,

        /// Show which rules contributed points
        #[arg(long)]
        explain: bool,
    },

    /// Store a device reading and derive a stress indicator from it
    Ingest {
        #[arg(long)]
        user: UserId,

        #[command(flatten)]
        reading: ReadingArgs,

        #[arg(long)]
        device_id: Option<String>,

        /// e.g. smartwatch, fitness_tracker
        #[arg(long)]
        device_type: Option<String>,
    },

    /// Stress history
    Stress {
        #[command(subcommand)]
        command: StressCommands,
    },

    /// Recommend unseen content for a user's current stress level
    Recommend {
        #[arg(long)]
        user: UserId,

        /// Use this level instead of the latest recorded one
        #[arg(long, value_parser = parse_level)]
        level: Option<StressLevel>,

        /// Print items as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Mark a content item as consumed
    Complete {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        content: ContentId,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: Option<u8>,
    },

    /// Browse the content catalog
    Content {
        #[command(subcommand)]
        command: ContentCommands,
    },

    /// Stored health readings
    Metrics {
        #[command(subcommand)]
        command: MetricsCommands,
    },

    /// Write history to CSV
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
}

#[derive(Subcommand)]
enum StressCommands {
    /// Record a self-reported stress level
    Log {
        #[arg(long)]
        user: UserId,

        /// low, medium, high, critical (or 1-4)
        #[arg(long, value_parser = parse_level)]
        level: StressLevel,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Show the most recent stress level
    Latest {
        #[arg(long)]
        user: UserId,
    },

    /// List all stress indicators, newest first
    History {
        #[arg(long)]
        user: UserId,
    },
}

#[derive(Subcommand)]
enum ContentCommands {
    /// List catalog items, newest first
    List {
        /// article, video or quiz
        #[arg(long = "type", value_parser = parse_content_type)]
        content_type: Option<ContentType>,
    },

    /// Show one item in full
    Show { id: ContentId },
}

#[derive(Subcommand)]
enum MetricsCommands {
    /// List readings, newest first
    History {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        since: Option<DateTime<Utc>>,

        #[arg(long)]
        until: Option<DateTime<Utc>>,
    },

    /// Show the most recent reading
    Latest {
        #[arg(long)]
        user: UserId,
    },
}

#[derive(Subcommand)]
enum ExportCommands {
    /// Export a user's stress history
    Stress {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        out: PathBuf,
    },

    /// Export a user's health readings
    Metrics {
        #[arg(long)]
        user: UserId,

        #[arg(long)]
        out: PathBuf,
    },
}

fn parse_level(s: &str) -> std::result::Result<StressLevel, String> {
    if let Ok(code) = s.parse::<u8>() {
        return StressLevel::try_from(code).map_err(|e| e.to_string());
    }
    s.parse().map_err(|e: Error| e.to_string())
}

fn parse_content_type(s: &str) -> std::result::Result<ContentType, String> {
    s.parse().map_err(|e: Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    pills_core::logging::init_for_cli(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Commands::Score { reading, explain } => cmd_score(&reading, explain),
        Commands::Ingest {
            user,
            reading,
            device_id,
            device_type,
        } => cmd_ingest(data_dir, &config, user, &reading, device_id, device_type),
        Commands::Stress { command } => cmd_stress(data_dir, command),
        Commands::Recommend { user, level, json } => {
            cmd_recommend(data_dir, &config, user, level, json)
        }
        Commands::Complete {
            user,
            content,
            rating,
        } => cmd_complete(data_dir, user, content, rating),
        Commands::Content { command } => cmd_content(data_dir, command),
        Commands::Metrics { command } => cmd_metrics(data_dir, command),
        Commands::Export { command } => cmd_export(data_dir, command),
    }
}

fn cmd_score(args: &ReadingArgs, explain: bool) -> Result<()> {
    let assessment = assess(&args.to_reading());

    println!("Stress level: {}", assessment.level);
    if explain {
        println!("  Points: {}", assessment.points);
        for contribution in &assessment.contributions {
            println!("  +{} {}", contribution.points, contribution.rule);
        }
    }
    Ok(())
}

fn cmd_ingest(
    data_dir: PathBuf,
    config: &Config,
    user_id: UserId,
    args: &ReadingArgs,
    device_id: Option<String>,
    device_type: Option<String>,
) -> Result<()> {
    let mut metrics = FileStore::open(&data_dir)?;
    let mut indicators = FileStore::open(&data_dir)?;

    let request = IngestRequest {
        user_id,
        timestamp: args.at,
        heart_rate_bpm: args.hr,
        steps: args.steps,
        sleep_hours: args.sleep,
        heart_rate_variability_ms: args.hrv,
        body_temperature_c: args.temp,
        device_id,
        device_type,
    };

    let outcome =
        Ingestor::from_config(&config.ingestion).ingest(request, &mut metrics, &mut indicators)?;

    println!("✓ Stored health metric {}", outcome.metric.id);
    match outcome.indicator {
        Some(indicator) => println!("  Derived stress level: {}", indicator.stress_level),
        None => println!("  Stress indicator could not be recorded"),
    }
    Ok(())
}

fn cmd_stress(data_dir: PathBuf, command: StressCommands) -> Result<()> {
    let mut store = FileStore::open(&data_dir)?;

    match command {
        StressCommands::Log {
            user,
            level,
            notes,
        } => {
            if user <= 0 {
                return Err(Error::Validation(
                    "user id must be greater than 0".into(),
                ));
            }
            let indicator = store.create_stress_indicator(StressIndicator::manual(
                user,
                level,
                Utc::now(),
                notes,
            ))?;
            println!("✓ Recorded stress level {} for user {}", level, user);
            println!("  Id: {}", indicator.id);
        }
        StressCommands::Latest { user } => match store.latest_stress_indicator(user)? {
            Some(indicator) => display_indicator(&indicator),
            None => println!("No stress history for user {}", user),
        },
        StressCommands::History { user } => {
            let history = store.stress_indicators_for_user(user)?;
            if history.is_empty() {
                println!("No stress history for user {}", user);
            }
            for indicator in &history {
                display_indicator(indicator);
            }
        }
    }
    Ok(())
}

fn cmd_recommend(
    data_dir: PathBuf,
    config: &Config,
    user_id: UserId,
    level: Option<StressLevel>,
    json: bool,
) -> Result<()> {
    let store = FileStore::open(&data_dir)?;
    let recommender = ContentRecommender::from_config(&config.recommendations);

    let items = match level {
        Some(level) => recommender.recommend(user_id, level, &store)?,
        None => recommender.get_recommendations(user_id, &store, &store)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if items.is_empty() {
        println!("Nothing new to recommend for user {}", user_id);
    }
    for item in &items {
        println!("{:>4}  {:<8} {}", item.id, item.content_type, item.title);
    }
    Ok(())
}

fn cmd_complete(
    data_dir: PathBuf,
    user_id: UserId,
    content_id: ContentId,
    rating: Option<u8>,
) -> Result<()> {
    let mut store = FileStore::open(&data_dir)?;
    store.record_interaction(
        user_id,
        Interaction {
            content_id,
            completed_at: Utc::now(),
            rating,
        },
    )?;
    println!("✓ Marked content {} as completed", content_id);
    Ok(())
}

fn cmd_content(data_dir: PathBuf, command: ContentCommands) -> Result<()> {
    let store = FileStore::open(&data_dir)?;
    let catalog = store.catalog()?;

    match command {
        ContentCommands::List { content_type } => {
            let items = match content_type {
                Some(kind) => catalog.by_type(kind),
                None => catalog.all(),
            };
            for item in items {
                println!("{:>4}  {:<8} {}", item.id, item.content_type, item.title);
            }
        }
        ContentCommands::Show { id } => {
            let item = catalog
                .get(id)
                .ok_or_else(|| Error::Validation(format!("No content with id {}", id)))?;
            display_content(item);
        }
    }
    Ok(())
}

fn cmd_metrics(data_dir: PathBuf, command: MetricsCommands) -> Result<()> {
    let store = FileStore::open(&data_dir)?;

    match command {
        MetricsCommands::History { user, since, until } => {
            let metrics = store.health_metrics_for_user(user, since, until)?;
            if metrics.is_empty() {
                println!("No health metrics for user {}", user);
            }
            for metric in &metrics {
                display_metric(metric);
            }
        }
        MetricsCommands::Latest { user } => match store.latest_health_metric(user)? {
            Some(metric) => display_metric(&metric),
            None => println!("No health metrics for user {}", user),
        },
    }
    Ok(())
}

fn cmd_export(data_dir: PathBuf, command: ExportCommands) -> Result<()> {
    let store = FileStore::open(&data_dir)?;

    match command {
        ExportCommands::Stress { user, out } => {
            let history = store.stress_indicators_for_user(user)?;
            let count = export_stress_history(&history, &out)?;
            println!("✓ Exported {} stress indicators", count);
            println!("  CSV: {}", out.display());
        }
        ExportCommands::Metrics { user, out } => {
            let metrics = store.health_metrics_for_user(user, None, None)?;
            let count = export_health_metrics(&metrics, &out)?;
            println!("✓ Exported {} health metrics", count);
            println!("  CSV: {}", out.display());
        }
    }
    Ok(())
}

fn display_indicator(indicator: &StressIndicator) {
    println!(
        "{}  {:<8} ({:?})",
        indicator.timestamp.to_rfc3339(),
        indicator.stress_level,
        indicator.source
    );
    if let Some(ref notes) = indicator.notes {
        println!("  {}", notes);
    }
}

fn display_metric(metric: &HealthMetric) {
    let r = &metric.reading;
    println!(
        "{}  [{}]",
        r.timestamp.to_rfc3339(),
        metric.device_type
    );
    if let Some(hr) = r.heart_rate_bpm {
        println!("  Heart rate: {} bpm", hr);
    }
    if let Some(hrv) = r.heart_rate_variability_ms {
        println!("  HRV: {} ms", hrv);
    }
    if let Some(sleep) = r.sleep_hours {
        println!("  Sleep: {} h", sleep);
    }
    if let Some(temp) = r.body_temperature_c {
        println!("  Temperature: {} °C", temp);
    }
    if let Some(steps) = r.steps {
        println!("  Steps: {}", steps);
    }
}

fn display_content(item: &ContentItem) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} #{}", item.content_type, item.id);
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  {}", item.title);
    println!("  Published: {}", item.created_at.format("%Y-%m-%d"));
    if !item.tags.is_empty() {
        println!("  Tags: {}", item.tags.join(", "));
    }
    println!();
    println!("  {}", item.body);

    if let Some(ref url) = item.video_url {
        println!();
        println!("  ▶ Video: {}", url);
    }
    if let Some(ref quiz) = item.quiz_data {
        println!();
        println!("  Quiz: {}", quiz);
    }
    println!();
}
