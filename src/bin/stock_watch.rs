use stock_watch::config::{Config, FailurePolicy};
use stock_watch::mail::{Mailer, NoopMailer, SmtpMailer};
use stock_watch::scrapers::base::QuoteScraper;
use stock_watch::scrapers::yahoo::YahooScraper;
use stock_watch::services::watch_service::{RunSummary, WatchService};

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{App, Arg, ArgMatches, SubCommand};
use log::{info, warn};
use std::sync::Arc;

fn shared_args<'a>(cmd: App<'a>) -> App<'a> {
    cmd.arg(
        Arg::with_name("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .help("TOML config file; built-in defaults are used when omitted")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("ticker")
            .short('t')
            .long("ticker")
            .value_name("TICKER")
            .help("Ticker to watch (repeatable); replaces the configured list")
            .takes_value(true)
            .multiple_occurrences(true),
    )
    .arg(
        Arg::with_name("keep-going")
            .short('k')
            .long("keep-going")
            .help("Record a failing ticker and continue instead of aborting the run")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("skip-email")
            .long("skip-email")
            .help("Write the report files without mailing them")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("show")
            .long("show")
            .help("Open the interactive chart once it is written")
            .takes_value(false),
    )
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let mut config = match matches.value_of("config") {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config file {}", path))?,
        None => Config::new(),
    };

    if let Some(tickers) = matches.values_of("ticker") {
        let tickers: Vec<&str> = tickers.collect();
        config = config.with_tickers(&tickers);
    }
    if matches.is_present("keep-going") {
        config = config.with_failure_policy(FailurePolicy::Continue);
    }
    if matches.is_present("skip-email") {
        config = config.with_mail_enabled(false);
    }
    if matches.is_present("show") {
        config = config.with_show_chart(true);
    }
    Ok(config)
}

fn log_summary(summary: &RunSummary) {
    info!(
        "Run summary: {} succeeded, {} failed",
        summary.succeeded(),
        summary.failures().len()
    );
    for failure in summary.failures() {
        if let Err(reason) = &failure.result {
            warn!("  {}: {}", failure.ticker, reason);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let today = Local::now().format("%Y-%m-%d").to_string();

    let app = App::new("stock_watch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track TSX stock metrics and mail a chart report")
        .subcommand(shared_args(
            SubCommand::with_name("run").about("Fetch every ticker, then build and mail the report"),
        ))
        .subcommand(shared_args(
            SubCommand::with_name("fetch").about("Append today's metrics to each ticker's history file"),
        ))
        .subcommand(shared_args(
            SubCommand::with_name("report")
                .about("Build and mail the chart report from existing history files")
                .arg(
                    Arg::with_name("date")
                        .short('d')
                        .long("date")
                        .value_name("DATE")
                        .help("Date stamped on the report files (YYYY-MM-DD)")
                        .takes_value(true)
                        .default_value(&today),
                ),
        ));

    let matches = app.get_matches();

    let (command, sub) = match matches.subcommand() {
        Some(pair) => pair,
        None => {
            info!("No command specified. Use --help for usage information.");
            return Ok(());
        }
    };

    let mut config = load_config(sub)?;
    if command == "fetch" {
        config = config.with_mail_enabled(false);
    }
    config.validate()?;
    info!("Watching {} with policy {:?}", config.tickers.join(", "), config.failure_policy);

    let scraper: Arc<dyn QuoteScraper + Send + Sync> = Arc::new(YahooScraper::new(&config)?);
    let mailer: Arc<dyn Mailer + Send + Sync> = if config.mail.enabled {
        Arc::new(SmtpMailer::from_config(&config.mail)?)
    } else {
        Arc::new(NoopMailer)
    };
    let service = WatchService::new(config, scraper, mailer);
    let now = Local::now().naive_local();

    let summary = match command {
        "run" => {
            let (summary, artifacts) = service.run(now).await?;
            info!("Report files: {}, {}", artifacts.png.display(), artifacts.html.display());
            Some(summary)
        }
        "fetch" => Some(service.fetch_all(now).await?),
        "report" => {
            let date_str = sub.value_of("date").unwrap_or(&today);
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .with_context(|| format!("invalid --date {}", date_str))?;
            let artifacts = service.report(date).await?;
            info!("Report files: {}, {}", artifacts.png.display(), artifacts.html.display());
            None
        }
        other => bail!("Unknown command: {}", other),
    };

    if let Some(summary) = summary {
        log_summary(&summary);
        if !summary.is_complete() {
            bail!("{} ticker(s) failed to fetch", summary.failures().len());
        }
    }

    Ok(())
}
