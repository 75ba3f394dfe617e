use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::catalog::ServiceCatalog;
use crate::config::ScanConfig;
use super::dns_scanner::{resolve, CnameLookup};
use super::http_scanner::TakeoverProbe;
use super::matcher::matches;
use super::{Classification, ScanResult};

/// 固定数量的 worker，共享同一个输入队列，结果汇入同一个输出队列
#[derive(Clone)]
pub struct WorkerPool {
    config: Arc<ScanConfig>,
    catalog: Arc<ServiceCatalog>,
    lookup: Arc<dyn CnameLookup>,
    probe: Arc<dyn TakeoverProbe>,
}

impl WorkerPool {
    pub fn new(
        config: ScanConfig,
        catalog: Arc<ServiceCatalog>,
        lookup: Arc<dyn CnameLookup>,
        probe: Arc<dyn TakeoverProbe>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            catalog,
            lookup,
            probe,
        }
    }

    /// 启动 `config.workers` 个 worker。每个 worker 持有一个 `results` 的克隆，
    /// 全部退出后结果队列自动关闭。
    pub fn spawn(
        &self,
        subdomains: Arc<Mutex<mpsc::Receiver<String>>>,
        results: mpsc::Sender<ScanResult>,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        (0..self.config.workers)
            .map(|id| {
                let pool = self.clone();
                let subdomains = subdomains.clone();
                let results = results.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { pool.run_worker(id, subdomains, results, cancel).await })
            })
            .collect()
    }

    async fn run_worker(
        self,
        id: usize,
        subdomains: Arc<Mutex<mpsc::Receiver<String>>>,
        results: mpsc::Sender<ScanResult>,
        cancel: CancellationToken,
    ) {
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("[INFO] Worker {} shutting down", id);
                    break;
                }
                next = async { subdomains.lock().await.recv().await } => next,
            };
            let Some(subdomain) = next else { break };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("[INFO] Worker {} shutting down, dropped {}", id, subdomain);
                    break;
                }
                _ = tokio::time::sleep(self.config.delay) => {}
            }

            if let Some(result) = self.scan(&subdomain, &cancel).await {
                if results.send(result).await.is_err() {
                    break;
                }
            }
        }
    }

    /// 单个子域名的完整流程：解析、匹配、按需探测，最后给出要输出的结果
    pub async fn scan(&self, subdomain: &str, cancel: &CancellationToken) -> Option<ScanResult> {
        let verbose = self.config.verbose;

        let cname = match resolve(self.lookup.as_ref(), subdomain, self.config.dns_timeout, cancel).await {
            Ok(cname) => cname,
            Err(e) => {
                if verbose {
                    debug!("{} {}: {}", Classification::NoCname.tag(), subdomain, e);
                }
                return None;
            }
        };

        if !matches(&cname, &self.catalog) {
            return verbose.then(|| {
                ScanResult::new(subdomain, Classification::Safe { probed: false }, Some(cname))
            });
        }

        if !self.config.check {
            return Some(ScanResult::new(
                subdomain,
                Classification::PotentiallyVulnerable,
                Some(cname),
            ));
        }

        if self.probe.probe(subdomain).await {
            Some(ScanResult::new(subdomain, Classification::Vulnerable, Some(cname)))
        } else if verbose {
            Some(ScanResult::new(subdomain, Classification::Safe { probed: true }, Some(cname)))
        } else {
            None
        }
    }
}
