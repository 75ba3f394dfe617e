use std::path::PathBuf;
use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("无法读取服务列表 {path}: {source}")]
    ServiceList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("无法读取子域名文件 {path}: {source}")]
    SubdomainInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("DNS 解析器初始化失败: {0}")]
    Resolver(#[from] ResolveError),

    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("无效的配置: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
