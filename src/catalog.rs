use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use crate::errors::{Result, ScanError};

/// 未被认领的第三方资源在 HTTP 响应中常见的特征字符串
pub const VULNERABLE_INDICATORS: &[&str] = &[
    "No resources found",
    "404 Not Found",
    "Website not configured",
    "This resource is not available",
    "The requested site does not exist",
    "Your app is ready to go!",
    "GitHub",
    "Domain not found",
    "Error 404",
    "Unknown domain",
    "Site not found",
];

/// 已知存在接管风险的第三方服务域名后缀，加载后只读
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    suffixes: HashSet<String>,
}

impl ServiceCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ScanError::ServiceList {
            path: path.to_path_buf(),
            source,
        })?;

        let mut suffixes = HashSet::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| ScanError::ServiceList {
                path: path.to_path_buf(),
                source,
            })?;
            let service = line.trim();
            if !service.is_empty() {
                suffixes.insert(service.to_string());
            }
        }

        Ok(Self { suffixes })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.suffixes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ServiceCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            suffixes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// 响应内容中出现任意特征字符串（不区分大小写）即返回匹配到的那一条
pub fn find_indicator(body: &str) -> Option<&'static str> {
    let body = body.to_lowercase();
    VULNERABLE_INDICATORS
        .iter()
        .copied()
        .find(|indicator| body.contains(&indicator.to_lowercase()))
}
