use std::time::Duration;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use crate::catalog::find_indicator;
use crate::errors::Result;

#[async_trait]
pub trait TakeoverProbe: Send + Sync {
    /// 确认可被接管时返回 true；任何网络或读取错误都按"未确认"处理
    async fn probe(&self, host: &str) -> bool;
}

pub struct HttpScanner {
    client: Client,
}

impl HttpScanner {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(HttpScanner { client })
    }

    #[cfg(not(test))]
    fn url_for(host: &str) -> String {
        format!("https://{}", host)
    }

    // 测试用的本地服务器只提供明文 HTTP
    #[cfg(test)]
    fn url_for(host: &str) -> String {
        format!("http://{}", host)
    }

    async fn fetch_body(&self, url: &str) -> std::result::Result<String, reqwest::Error> {
        let response = self.client.get(url).send().await?;
        debug!("{} -> HTTP {}", url, response.status());
        response.text().await
    }
}

#[async_trait]
impl TakeoverProbe for HttpScanner {
    async fn probe(&self, host: &str) -> bool {
        let url = Self::url_for(host);

        let body = match self.fetch_body(&url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("[ERROR] Failed to fetch {}: {}", url, e);
                return false;
            }
        };

        match find_indicator(&body) {
            Some(indicator) => {
                debug!("[DEBUG] Found vulnerable indicator '{}' in {}", indicator, host);
                true
            }
            None => {
                debug!("[DEBUG] No vulnerable indicators found for {}", host);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        addr.to_string()
    }

    #[tokio::test]
    async fn indicator_in_404_page_confirms() {
        let host = serve_once("404 Not Found", "<h1>404 Not Found</h1>").await;
        let scanner = HttpScanner::new(Duration::from_secs(5)).unwrap();
        assert!(scanner.probe(&host).await);
    }

    #[tokio::test]
    async fn clean_page_does_not_confirm() {
        let host = serve_once("200 OK", "<html>hello</html>").await;
        let scanner = HttpScanner::new(Duration::from_secs(5)).unwrap();
        assert!(!scanner.probe(&host).await);
    }

    #[tokio::test]
    async fn connection_failure_is_not_confirmed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let host = listener.local_addr().unwrap().to_string();
        drop(listener);

        let scanner = HttpScanner::new(Duration::from_secs(2)).unwrap();
        assert!(!scanner.probe(&host).await);
    }
}
