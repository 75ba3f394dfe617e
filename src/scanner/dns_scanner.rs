use std::time::Duration;
use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::rr::{RData, RecordType};
use crate::errors::Result;

/// 单次 CNAME 查询失败的原因，只用于详细输出，不影响分类结果
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupFailure {
    #[error("no CNAME record")]
    NoCname,
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
    #[error("lookup cancelled")]
    Cancelled,
    #[error("{0}")]
    Lookup(String),
}

#[async_trait]
pub trait CnameLookup: Send + Sync {
    /// 单跳查询：返回 `host` 的 CNAME 目标（可能带有结尾的根标签点）
    async fn lookup_cname(&self, host: &str) -> std::result::Result<String, LookupFailure>;
}

pub struct DnsScanner {
    resolver: TokioAsyncResolver,
}

impl DnsScanner {
    /// 优先使用系统 resolv.conf，读取失败时退回默认上游
    pub fn new() -> Result<Self> {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(e) => {
                debug!("system resolver config unavailable ({}), using defaults", e);
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())?
            }
        };
        Ok(Self { resolver })
    }
}

#[async_trait]
impl CnameLookup for DnsScanner {
    async fn lookup_cname(&self, host: &str) -> std::result::Result<String, LookupFailure> {
        let lookup = self
            .resolver
            .lookup(host, RecordType::CNAME)
            .await
            .map_err(|e| match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => LookupFailure::NoCname,
                _ => LookupFailure::Lookup(e.to_string()),
            })?;

        lookup
            .iter()
            .find_map(|rdata| match rdata {
                RData::CNAME(name) => Some(name.to_string()),
                _ => None,
            })
            .ok_or(LookupFailure::NoCname)
    }
}

/// 别名链最多跟随的跳数，超过后以最后一个名字为准
pub const MAX_CNAME_HOPS: usize = 8;

/// 沿 CNAME 链一直查到没有别名为止，返回规范名（去掉一个结尾的 `.`）。
/// 只有第一跳失败才算解析失败；超时覆盖整条链。
pub async fn resolve(
    lookup: &dyn CnameLookup,
    host: &str,
    timeout: Duration,
    cancel: &CancellationToken,
) -> std::result::Result<String, LookupFailure> {
    let mut cname = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(LookupFailure::Cancelled),
        res = tokio::time::timeout(timeout, follow_chain(lookup, host)) => match res {
            Ok(inner) => inner?,
            Err(_) => return Err(LookupFailure::Timeout(timeout)),
        },
    };

    if cname.ends_with('.') {
        cname.pop();
    }
    Ok(cname)
}

async fn follow_chain(
    lookup: &dyn CnameLookup,
    host: &str,
) -> std::result::Result<String, LookupFailure> {
    let mut current = lookup.lookup_cname(host).await?;

    for _ in 1..MAX_CNAME_HOPS {
        match lookup.lookup_cname(&current).await {
            Ok(next) if next.trim_end_matches('.') == current.trim_end_matches('.') => break,
            Ok(next) => current = next,
            Err(LookupFailure::NoCname) => break,
            Err(e) => {
                debug!("stopping CNAME chain at {}: {}", current, e);
                break;
            }
        }
    }

    Ok(current)
}
