use std::time::Duration;
use crate::errors::{Result, ScanError};

/// 扫描配置，由命令行参数构建后传给 worker 池
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 并发 worker 数量，同时也是两个队列的容量
    pub workers: usize,
    /// 单次 CNAME 查询的超时
    pub dns_timeout: Duration,
    /// 每个 worker 处理每个子域名前的固定等待
    pub delay: Duration,
    /// 可利用性探测的 HTTP 请求超时
    pub probe_timeout: Duration,
    pub verbose: bool,
    pub check: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            dns_timeout: Duration::from_secs(5),
            delay: Duration::from_millis(100),
            probe_timeout: Duration::from_secs(10),
            verbose: false,
            check: false,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::InvalidConfig("worker 数量必须大于 0".into()));
        }
        if self.dns_timeout.is_zero() {
            return Err(ScanError::InvalidConfig("DNS 超时必须大于 0".into()));
        }
        if self.check && self.probe_timeout.is_zero() {
            return Err(ScanError::InvalidConfig("探测超时必须大于 0".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ScanConfig::default();
        assert_eq!(config.workers, 10);
        assert_eq!(config.delay, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let config = ScanConfig { workers: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ScanError::InvalidConfig(_))));
    }

    #[test]
    fn zero_dns_timeout_rejected() {
        let config = ScanConfig { dns_timeout: Duration::ZERO, ..Default::default() };
        assert!(config.validate().is_err());
    }
}
