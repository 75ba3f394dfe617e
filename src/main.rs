use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;
use rust_takeover::{
    catalog::ServiceCatalog,
    config::ScanConfig,
    errors::ScanError,
    output::{self, ResultSink},
    scanner::{
        dns_scanner::DnsScanner,
        http_scanner::HttpScanner,
        TakeoverScanner,
    },
    shutdown::ShutdownController,
};

/// 悬挂 CNAME / 子域名接管检测
#[derive(Parser, Debug)]
#[command(version, about = "Detect dangling CNAME records pointing at unclaimed third-party services", long_about = None)]
struct Cli {
    /// 子域名列表文件，每行一个
    #[arg(short, long)]
    file: PathBuf,

    /// 存在接管风险的服务域名后缀列表，每行一个
    #[arg(short, long)]
    wordlist: PathBuf,

    /// 输出 SAFE 结果和诊断信息
    #[arg(short, long)]
    verbose: bool,

    /// 对命中的子域名发起 HTTP 请求确认是否可利用
    #[arg(long)]
    check: bool,

    /// 并发 worker 数量
    #[arg(short = 'c', long, default_value_t = 10)]
    concurrency: usize,

    /// DNS 查询超时（秒）
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    /// 每个请求前的等待时间（毫秒）
    #[arg(short, long, default_value_t = 100)]
    delay: u64,

    /// HTTP 探测超时（秒）
    #[arg(long, default_value_t = 10)]
    probe_timeout: u64,

    /// 关闭彩色输出
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            workers: self.concurrency,
            dns_timeout: Duration::from_secs(self.timeout),
            delay: Duration::from_millis(self.delay),
            probe_timeout: Duration::from_secs(self.probe_timeout),
            verbose: self.verbose,
            check: self.check,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "rust_takeover=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = cli.scan_config();
    config.validate()?;

    let catalog = ServiceCatalog::load(&cli.wordlist)
        .context("Error loading external services")?;
    info!("loaded {} service suffixes", catalog.len());

    let subs = tokio::fs::File::open(&cli.file)
        .await
        .map_err(|source| ScanError::SubdomainInput { path: cli.file.clone(), source })
        .context("Error opening subdomains file")?;

    let lookup = Arc::new(DnsScanner::new()?);
    let probe = Arc::new(HttpScanner::new(config.probe_timeout)?);

    let shutdown = ShutdownController::new();
    let cancel = shutdown.token();
    shutdown.listen();

    let start_time = Local::now();
    output::print_start_banner(&config, catalog.len(), &start_time);

    let scanner = TakeoverScanner::new(config, Arc::new(catalog), lookup, probe);
    let (results, dispatcher) = scanner.start(BufReader::new(subs), cancel);

    let color = !cli.no_color && std::io::stdout().is_terminal();
    let summary = ResultSink::new(std::io::stdout(), color)
        .drain(results)
        .await
        .context("Error writing results")?;

    let dispatched = dispatcher
        .await
        .context("dispatcher task failed")?
        .map_err(|source| ScanError::SubdomainInput { path: cli.file.clone(), source })?;
    info!("dispatched {} subdomains", dispatched);

    output::print_end_banner(&summary, &start_time);
    Ok(())
}
