//! Command handlers

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use renocost_app::app::RenovationService;
use renocost_app::config::Config;
use renocost_app::export::export_quotes_to_excel;
use renocost_infra::FileProviderDirectory;
use renocost_types::{Error, Features, OutputFormat, RecordFilter, RecordKind, Result, ServiceType};

use crate::cli::{Cli, Commands};
use crate::output::{
    output_estimate, output_providers, output_quotes, output_subscription, output_subscriptions,
    output_summary, output_visit, output_visits, output_work_log, output_work_logs,
};

pub fn execute(cli: Cli) -> Result<()> {
    // Load config
    let mut config = Config::load()?;

    // Override from CLI args
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }
    if cli.models_dir.is_some() {
        config.models_dir = cli.models_dir.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Estimate {
            service,
            area,
            points,
            features,
            photos,
        } => cmd_estimate(&config, output_format, &service, area, points, &features, &photos),
        Commands::Visit {
            address,
            when,
            quote,
            customer,
        } => cmd_visit(
            &config,
            output_format,
            &address,
            &when,
            quote.as_deref(),
            customer.as_deref(),
        ),
        Commands::Amc { plan, customer } => {
            cmd_amc(&config, output_format, &plan, customer.as_deref())
        }
        Commands::Worklog {
            worker,
            done,
            next,
            photo,
        } => cmd_worklog(&config, output_format, &worker, &done, &next, photo.as_deref()),
        Commands::History {
            kind,
            service,
            status,
            limit,
        } => {
            let filter = build_filter(service.as_deref(), status, Some(limit))?;
            cmd_history(&config, output_format, kind, filter)
        }
        Commands::Export {
            kind,
            output,
            service,
            status,
            excel,
            training,
        } => {
            let filter = build_filter(service.as_deref(), status, None)?;
            cmd_export(&config, kind, filter, &output, excel, training)
        }
        Commands::Providers {
            service,
            search,
            init,
        } => cmd_providers(&config, output_format, service.as_deref(), search.as_deref(), init),
        Commands::Models => cmd_models(&config, output_format),
        Commands::Config { show, set, reset } => cmd_config(show, set, reset),
    }
}

fn build_filter(
    service: Option<&str>,
    status: Option<String>,
    limit: Option<usize>,
) -> Result<RecordFilter> {
    let mut filter = RecordFilter::new();
    if let Some(service) = service {
        filter = filter.with_service(service.parse::<ServiceType>()?);
    }
    if let Some(status) = status {
        filter = filter.with_status(status);
    }
    if let Some(limit) = limit {
        filter = filter.with_limit(limit);
    }
    Ok(filter)
}

/// Parse a visit time given as RFC 3339, `YYYY-MM-DD HH:MM` or
/// `YYYY-MM-DD` (midnight). Times without an offset are UTC.
fn parse_when(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(Error::Validation(format!("unrecognised visit time: {raw:?}")))
}

fn cmd_estimate(
    config: &Config,
    output_format: OutputFormat,
    service: &str,
    area: Option<f64>,
    points: Option<u32>,
    extra: &[String],
    photos: &[PathBuf],
) -> Result<()> {
    let mut features = Features::from_pairs(extra)?;
    if let Some(area) = area {
        features.insert_number(Features::AREA, area);
    }
    if let Some(points) = points {
        features.insert_number(Features::POINTS, points as f64);
    }

    let app = RenovationService::open(config)?;
    let photo_paths: Vec<&Path> = photos.iter().map(PathBuf::as_path).collect();
    let outcome = app.request_estimate_with_photos(service, features, &photo_paths)?;
    output_estimate(output_format, &outcome)
}

fn cmd_visit(
    config: &Config,
    output_format: OutputFormat,
    address: &str,
    when: &str,
    quote: Option<&str>,
    customer: Option<&str>,
) -> Result<()> {
    let when = parse_when(when)?;
    let app = RenovationService::open(config)?;
    let visit = app.schedule_visit_for(address, when, quote, customer)?;
    output_visit(output_format, &visit)
}

fn cmd_amc(
    config: &Config,
    output_format: OutputFormat,
    plan: &str,
    customer: Option<&str>,
) -> Result<()> {
    let app = RenovationService::open(config)?;
    let subscription = app.subscribe_amc_for(plan, customer)?;
    output_subscription(output_format, &subscription)
}

fn cmd_worklog(
    config: &Config,
    output_format: OutputFormat,
    worker: &str,
    done: &str,
    next: &str,
    photo: Option<&Path>,
) -> Result<()> {
    let app = RenovationService::open(config)?;
    let photo_ref = match photo {
        Some(path) => app.import_photos(&[path])?.into_iter().next(),
        None => None,
    };
    let log = app.log_work(worker, done, next, photo_ref.as_deref())?;
    output_work_log(output_format, &log)
}

fn cmd_history(
    config: &Config,
    output_format: OutputFormat,
    kind: RecordKind,
    filter: RecordFilter,
) -> Result<()> {
    let app = RenovationService::open(config)?;

    if output_format == OutputFormat::Table {
        println!("History");
        println!("=======");
        output_summary(&app.history_summary()?);
    }

    match kind {
        RecordKind::Quote => output_quotes(output_format, &app.quotes(filter).to_vec()?),
        RecordKind::SiteVisit => output_visits(output_format, &app.visits(filter).to_vec()?),
        RecordKind::Amc => {
            output_subscriptions(output_format, &app.subscriptions_with_status(filter)?)
        }
        RecordKind::WorkLog => output_work_logs(output_format, &app.work_logs(filter).to_vec()?),
    }
}

fn cmd_export(
    config: &Config,
    kind: RecordKind,
    filter: RecordFilter,
    output: &Path,
    excel: bool,
    training: bool,
) -> Result<()> {
    if (excel || training) && kind != RecordKind::Quote {
        return Err(Error::Validation(
            "--excel and --training only apply to quotes".to_string(),
        ));
    }

    let app = RenovationService::open(config)?;
    let rows = if excel {
        let quotes = app.quotes(filter).to_vec()?;
        export_quotes_to_excel(&quotes, Utc::now(), output)?;
        quotes.len()
    } else if training {
        app.export_training_set(output)?
    } else {
        app.export_history(kind, &filter, output)?
    };

    println!("Exported {} {} record(s) to {}", rows, kind, output.display());
    Ok(())
}

fn cmd_providers(
    config: &Config,
    output_format: OutputFormat,
    service: Option<&str>,
    search: Option<&str>,
    init: bool,
) -> Result<()> {
    if init {
        let path = config.providers_file()?;
        if path.exists() {
            return Err(Error::Validation(format!(
                "{} already exists",
                path.display()
            )));
        }
        FileProviderDirectory::write_default(&path)?;
        println!("Wrote default provider catalogue to {}", path.display());
        return Ok(());
    }

    let app = RenovationService::open(config)?;
    let providers = match (search, service) {
        (Some(query), service) => app.search_providers(query, service)?,
        (None, Some(service)) => app.providers_for(service)?,
        (None, None) => app.all_providers()?,
    };
    output_providers(output_format, &providers)
}

fn cmd_models(config: &Config, output_format: OutputFormat) -> Result<()> {
    let app = RenovationService::open(config)?;
    let models = app.available_models();

    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("Models directory: {}", config.models_dir()?.display());
    for service in ServiceType::ALL {
        let source = if models.contains(&service) {
            "model"
        } else {
            "heuristic"
        };
        println!("  {:<10} {}", service.as_str(), source);
    }
    Ok(())
}

fn cmd_config(show: bool, set: Option<Vec<String>>, reset: bool) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;

    if let Some(pair) = set {
        if let [key, value] = pair.as_slice() {
            config.set_value(key, value)?;
            config.save()?;
            println!("Configuration updated");
        }
    } else if !show {
        println!("Config file: {}", Config::config_path()?.display());
    }

    println!("{}", config);
    Ok(())
}
