//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::adapters::csv_adapter::CsvCandleClient;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_trade_adapter::JsonTradeLoader;
use crate::adapters::report_adapter::{JsonReportAdapter, TextReportAdapter};
use crate::domain::config_validation::{
    provider_kind, validate_provider_config, validate_ranking_config,
};
use crate::domain::error::QmoneyError;
use crate::domain::ranking::{
    FailurePolicy, PortfolioRanker, RankerConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENCY,
};
use crate::domain::trade::TradeRecord;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataClient;
use crate::ports::report_port::ReportPort;
use crate::ports::trade_port::TradeLoader;

#[derive(Parser, Debug)]
#[command(name = "qmoney", about = "Rank portfolio trades by annualized return")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank trades by annualized return
    Rank {
        #[command(flatten)]
        source: SourceArgs,
        /// partial or fail-fast
        #[arg(long)]
        policy: Option<FailurePolicy>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// List the symbols in a trade file
    Symbols {
        #[arg(short, long)]
        trades: PathBuf,
    },
    /// List symbols by closing price at the end date, lowest first
    Quotes {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Inputs shared by every command that fetches prices.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(short, long)]
    pub trades: PathBuf,
    /// Valuation date (YYYY-MM-DD); falls back to [ranking] end_date
    #[arg(short, long)]
    pub end_date: Option<NaiveDate>,
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Read candles from {data_dir}/{SYMBOL}.csv instead of the configured provider
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(long)]
    pub max_concurrency: Option<usize>,
    /// Per-fetch timeout in seconds; 0 disables it
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingSettings {
    pub policy: FailurePolicy,
    pub ranker: RankerConfig,
    pub end_date: NaiveDate,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Rank {
            source,
            policy,
            format,
        } => run_rank(&source, policy, format),
        Command::Symbols { trades } => run_symbols(&trades),
        Command::Quotes { source } => run_quotes(&source),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, QmoneyError> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| QmoneyError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Merges `[ranking]` config values with command-line overrides.
pub fn build_ranking_settings(
    config: &dyn ConfigPort,
    source: &SourceArgs,
    policy_override: Option<FailurePolicy>,
) -> Result<RankingSettings, QmoneyError> {
    let policy = match policy_override {
        Some(p) => p,
        None => match config.get_string("ranking", "policy") {
            Some(s) => s.parse().map_err(|reason| QmoneyError::ConfigInvalid {
                section: "ranking".into(),
                key: "policy".into(),
                reason,
            })?,
            None => FailurePolicy::default(),
        },
    };

    let max_concurrency = match source.max_concurrency {
        Some(n) => n,
        None => match config.get_int("ranking", "max_concurrency")? {
            Some(n) => usize::try_from(n).map_err(|_| {
                ranking_invalid("max_concurrency", "max_concurrency must be at least 1")
            })?,
            None => DEFAULT_MAX_CONCURRENCY,
        },
    };
    if max_concurrency == 0 {
        return Err(ranking_invalid(
            "max_concurrency",
            "max_concurrency must be at least 1",
        ));
    }

    let timeout_secs = match source.timeout_secs {
        Some(secs) => secs,
        None => match config.get_int("ranking", "fetch_timeout_secs")? {
            Some(secs) => u64::try_from(secs).map_err(|_| {
                ranking_invalid("fetch_timeout_secs", "fetch_timeout_secs must be non-negative")
            })?,
            None => DEFAULT_FETCH_TIMEOUT.as_secs(),
        },
    };
    let fetch_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    let end_date = match source.end_date {
        Some(d) => d,
        None => config
            .get_date("ranking", "end_date")?
            .ok_or_else(|| QmoneyError::ConfigMissing {
                section: "ranking".into(),
                key: "end_date".into(),
            })?,
    };

    Ok(RankingSettings {
        policy,
        ranker: RankerConfig {
            max_concurrency,
            fetch_timeout,
        },
        end_date,
    })
}

fn ranking_invalid(key: &str, reason: &str) -> QmoneyError {
    QmoneyError::ConfigInvalid {
        section: "ranking".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

/// Picks the market-data client: `--data-dir` wins, then `[provider] kind`.
pub fn build_market_data_client(
    config: &dyn ConfigPort,
    data_dir: Option<&PathBuf>,
) -> Result<Arc<dyn MarketDataClient>, QmoneyError> {
    if let Some(dir) = data_dir {
        return Ok(Arc::new(CsvCandleClient::new(dir.clone())));
    }

    match provider_kind(config).as_str() {
        "csv" => {
            let dir = config.get_string("provider", "data_dir").ok_or_else(|| {
                QmoneyError::ConfigMissing {
                    section: "provider".into(),
                    key: "data_dir".into(),
                }
            })?;
            Ok(Arc::new(CsvCandleClient::new(PathBuf::from(dir))))
        }
        "tiingo" => build_tiingo_client(config),
        other => Err(QmoneyError::ConfigInvalid {
            section: "provider".into(),
            key: "kind".into(),
            reason: format!("unsupported provider {other}"),
        }),
    }
}

#[cfg(feature = "tiingo")]
fn build_tiingo_client(config: &dyn ConfigPort) -> Result<Arc<dyn MarketDataClient>, QmoneyError> {
    use crate::adapters::tiingo_adapter::{TiingoClient, DEFAULT_BASE_URL, TOKEN_ENV_VAR};

    let token = config
        .get_string("provider", "token")
        .filter(|t| !t.trim().is_empty())
        .or_else(|| std::env::var(TOKEN_ENV_VAR).ok())
        .ok_or_else(|| QmoneyError::ConfigMissing {
            section: "provider".into(),
            key: format!("token (or {TOKEN_ENV_VAR})"),
        })?;
    let base_url = config
        .get_string("provider", "base_url")
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(Arc::new(TiingoClient::new(&base_url, token)?))
}

#[cfg(not(feature = "tiingo"))]
fn build_tiingo_client(_config: &dyn ConfigPort) -> Result<Arc<dyn MarketDataClient>, QmoneyError> {
    Err(QmoneyError::Provider {
        reason: "tiingo feature is required for the tiingo provider".into(),
    })
}

fn load_trades(path: &PathBuf) -> Result<Vec<TradeRecord>, QmoneyError> {
    info!("loading trades from {}", path.display());
    JsonTradeLoader::new(path.clone()).load_trades()
}

fn prepare(
    source: &SourceArgs,
    policy: Option<FailurePolicy>,
) -> Result<(RankingSettings, PortfolioRanker, Vec<TradeRecord>), QmoneyError> {
    let config = load_config(source.config.as_ref())?;
    validate_provider_config(&config)?;
    validate_ranking_config(&config)?;

    let settings = build_ranking_settings(&config, source, policy)?;
    let client = build_market_data_client(&config, source.data_dir.as_ref())?;
    let trades = load_trades(&source.trades)?;
    let ranker = PortfolioRanker::new(client, settings.ranker.clone());
    Ok((settings, ranker, trades))
}

fn runtime() -> Result<tokio::runtime::Runtime, QmoneyError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
async fn interrupted() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn run_rank(
    source: &SourceArgs,
    policy: Option<FailurePolicy>,
    format: OutputFormat,
) -> Result<(), QmoneyError> {
    let (settings, ranker, trades) = prepare(source, policy)?;
    info!(
        trades = trades.len(),
        end_date = %settings.end_date,
        policy = %settings.policy,
        "ranking trades"
    );

    let result = runtime()?.block_on(ranker.rank_until(
        &trades,
        settings.end_date,
        settings.policy,
        interrupted(),
    ))?;

    let report: &dyn ReportPort = match format {
        OutputFormat::Text => &TextReportAdapter,
        OutputFormat::Json => &JsonReportAdapter,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.write(&result, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run_symbols(trades_path: &PathBuf) -> Result<(), QmoneyError> {
    let trades = load_trades(trades_path)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for trade in &trades {
        writeln!(out, "{}", trade.symbol())?;
    }
    info!("{} symbols found", trades.len());
    Ok(())
}

fn run_quotes(source: &SourceArgs) -> Result<(), QmoneyError> {
    let (settings, ranker, trades) = prepare(source, None)?;
    let quotes = runtime()?.block_on(ranker.closing_quotes(&trades, settings.end_date))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for q in &quotes {
        writeln!(out, "{}\t{:.2}\t{}", q.symbol, q.close, q.date)?;
    }
    Ok(())
}
