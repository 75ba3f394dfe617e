pub mod dispatcher;
pub mod dns_scanner;
pub mod http_scanner;
pub mod matcher;
pub mod worker;

use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::catalog::ServiceCatalog;
use crate::config::ScanConfig;
use self::dns_scanner::CnameLookup;
use self::http_scanner::TakeoverProbe;
use self::worker::WorkerPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// 解析失败；只出现在详细日志中，不会进入结果队列
    NoCname,
    /// `probed` 为 true 表示命中服务后缀但探测未确认
    Safe { probed: bool },
    PotentiallyVulnerable,
    Vulnerable,
}

impl Classification {
    pub fn tag(&self) -> &'static str {
        match self {
            Classification::NoCname => "[NO CNAME]",
            Classification::Safe { .. } => "[SAFE]",
            Classification::PotentiallyVulnerable => "[POTENTIALLY VULNERABLE]",
            Classification::Vulnerable => "[VULNERABLE]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub subdomain: String,
    pub classification: Classification,
    pub cname: Option<String>,
}

impl ScanResult {
    pub fn new(subdomain: &str, classification: Classification, cname: Option<String>) -> Self {
        Self {
            subdomain: subdomain.to_string(),
            classification,
            cname,
        }
    }

    /// 标签之后的部分，例如 `foo.example.com -> bar.github.io (Not exploitable)`
    pub fn detail(&self) -> String {
        let mut line = self.subdomain.clone();
        if let Some(cname) = &self.cname {
            line.push_str(" -> ");
            line.push_str(cname);
        }
        if let Classification::Safe { probed: true } = self.classification {
            line.push_str(" (Not exploitable)");
        }
        line
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.classification.tag(), self.detail())
    }
}

/// 把分发器、worker 池和结果队列串起来
pub struct TakeoverScanner {
    config: ScanConfig,
    pool: WorkerPool,
}

impl TakeoverScanner {
    pub fn new(
        config: ScanConfig,
        catalog: Arc<ServiceCatalog>,
        lookup: Arc<dyn CnameLookup>,
        probe: Arc<dyn TakeoverProbe>,
    ) -> Self {
        let pool = WorkerPool::new(config.clone(), catalog, lookup, probe);
        Self { config, pool }
    }

    /// 启动扫描。返回的结果队列在所有 worker 退出后关闭；
    /// 分发任务返回已入队的子域名数量或读取输入时的 I/O 错误。
    pub fn start<R>(
        &self,
        input: R,
        cancel: CancellationToken,
    ) -> (mpsc::Receiver<ScanResult>, JoinHandle<std::io::Result<usize>>)
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let capacity = self.config.workers;
        let (sub_tx, sub_rx) = mpsc::channel::<String>(capacity);
        let (result_tx, result_rx) = mpsc::channel::<ScanResult>(capacity);

        let workers = self.pool.spawn(Arc::new(Mutex::new(sub_rx)), result_tx, cancel.clone());
        debug!("spawned {} workers", workers.len());

        let dispatcher = tokio::spawn(dispatcher::dispatch(input, sub_tx, cancel));
        (result_rx, dispatcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_result_lines() {
        let r = ScanResult::new(
            "foo.example.com",
            Classification::PotentiallyVulnerable,
            Some("bar.github.io".into()),
        );
        assert_eq!(r.to_string(), "[POTENTIALLY VULNERABLE] foo.example.com -> bar.github.io");

        let r = ScanResult::new(
            "foo.example.com",
            Classification::Safe { probed: true },
            Some("bar.github.io".into()),
        );
        assert_eq!(r.to_string(), "[SAFE] foo.example.com -> bar.github.io (Not exploitable)");

        let r = ScanResult::new("foo.example.com", Classification::Vulnerable, None);
        assert_eq!(r.to_string(), "[VULNERABLE] foo.example.com");
    }
}
