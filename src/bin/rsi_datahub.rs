use rsi_datahub::config::Config;
use rsi_datahub::models::result::OutputFormat;
use rsi_datahub::scrapers::base::PriceScraper;
use rsi_datahub::scrapers::yahoo::YahooScraper;
use rsi_datahub::services::rsi_service::RsiService;
use rsi_datahub::util;

use anyhow::Context;
use clap::{App, Arg};
use chrono::Utc;
use log::info;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 诊断信息输出到stderr，stdout只输出JSON结果
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = App::new("RSI DataHub")
        .version("1.0.0")
        .author("DataHub Team")
        .about("Compute daily RSI for a ticker universe and merge into the per-day result")
        .arg(
            Arg::with_name("mode")
                .help("Market segment to process (P: prime, S: standard, G: growth)")
                .index(1)
                .default_value("P"),
        )
        .arg(
            Arg::with_name("tickers")
                .long("tickers")
                .value_name("PATH")
                .help("Ticker master file")
                .takes_value(true)
                .default_value("tickers.json"),
        )
        .arg(
            Arg::with_name("result-dir")
                .long("result-dir")
                .value_name("DIR")
                .help("Directory of per-day result files")
                .takes_value(true)
                .default_value("result"),
        )
        .arg(
            Arg::with_name("date")
                .short('d')
                .long("date")
                .value_name("DATE")
                .help("Result date to merge into (YYYY-MM-DD, default: today UTC)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("suffix")
                .long("suffix")
                .value_name("SUFFIX")
                .help("Exchange suffix appended to tickers")
                .takes_value(true)
                .default_value(".T"),
        )
        .arg(
            Arg::with_name("rsi-decimals")
                .long("rsi-decimals")
                .value_name("N")
                .help("Decimal places for RSI values")
                .takes_value(true)
                .default_value("1"),
        )
        .arg(
            Arg::with_name("history-limit")
                .long("history-limit")
                .value_name("N")
                .help("Number of recent RSI points kept per ticker")
                .takes_value(true)
                .default_value("30"),
        )
        .arg(
            Arg::with_name("no-history")
                .long("no-history")
                .help("Only output the latest RSI value")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("adjusted")
                .long("adjusted")
                .help("Use dividend/split adjusted closes")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("pretty")
                .long("pretty")
                .help("Pretty-print the JSON output")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("no-save")
                .long("no-save")
                .help("Do not write the merged result back to the result directory")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Per-request timeout in seconds")
                .takes_value(true)
                .default_value("30"),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app.arg(
        Arg::with_name("debug")
            .long("debug")
            .help("Enable debug mode")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("debug-limit")
            .long("debug-limit")
            .help("Limit the number of tickers to process in debug mode")
            .takes_value(true)
            .default_value("2"),
    );

    let matches = app.get_matches();

    // 获取调试模式设置
    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_ticker_limit = matches.value_of("debug-limit")
        .unwrap_or("2")
        .parse::<usize>()
        .unwrap_or(2);
    #[cfg(not(debug_assertions))]
    let debug_ticker_limit = usize::MAX;

    let mode = matches.value_of("mode").unwrap_or("P");

    let rsi_decimals = matches.value_of("rsi-decimals")
        .unwrap_or("1")
        .parse::<u32>()
        .context("--rsi-decimals must be a non-negative integer")?;
    let history_limit = if matches.is_present("no-history") {
        None
    } else {
        let limit = matches.value_of("history-limit")
            .unwrap_or("30")
            .parse::<usize>()
            .context("--history-limit must be a non-negative integer")?;
        Some(limit)
    };
    let timeout = matches.value_of("timeout")
        .unwrap_or("30")
        .parse::<u64>()
        .context("--timeout must be a number of seconds")?;
    let output_format = if matches.is_present("pretty") {
        OutputFormat::Pretty
    } else {
        OutputFormat::Compact
    };

    let store_date = match matches.value_of("date") {
        Some(date_str) => util::parse_date(date_str)
            .with_context(|| format!("invalid --date {}", date_str))?,
        None => Utc::now().date_naive(),
    };

    // 创建配置
    let config = Config::new()
        .with_debug_mode(debug_mode)
        .with_debug_ticker_limit(debug_ticker_limit)
        .with_tickers_path(matches.value_of("tickers").unwrap_or("tickers.json"))
        .with_result_dir(matches.value_of("result-dir").unwrap_or("result"))
        .with_symbol_suffix(matches.value_of("suffix").unwrap_or(".T"))
        .with_rsi_decimals(rsi_decimals)
        .with_history_limit(history_limit)
        .with_adjusted_prices(matches.is_present("adjusted"))
        .with_request_timeout(Duration::from_secs(timeout))
        .with_output_format(output_format)
        .with_persist(!matches.is_present("no-save"));

    info!("Mode {} for result date {}", mode, util::date_key(&store_date));

    let scraper: Arc<dyn PriceScraper + Send + Sync> =
        Arc::new(YahooScraper::new(config.request_timeout, config.min_request_interval)?);

    // 创建RSI服务
    let service = RsiService::new(config, scraper);
    let document = service.run_at(mode, store_date, Utc::now).await?;

    println!("{}", document.to_json(service.config().output_format)?);

    Ok(())
}
