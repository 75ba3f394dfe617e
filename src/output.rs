use std::io::Write;
use chrono::{DateTime, Local};
use colored::*;
use tokio::sync::mpsc;

use crate::config::ScanConfig;
use crate::scanner::{Classification, ScanResult};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub vulnerable: usize,
    pub potentially_vulnerable: usize,
    pub safe: usize,
}

impl ScanSummary {
    fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Vulnerable => self.vulnerable += 1,
            Classification::PotentiallyVulnerable => self.potentially_vulnerable += 1,
            Classification::Safe { .. } => self.safe += 1,
            Classification::NoCname => {}
        }
    }

    pub fn total(&self) -> usize {
        self.vulnerable + self.potentially_vulnerable + self.safe
    }
}

/// 结果汇总端：按到达顺序每个结果输出一行
pub struct ResultSink<W: Write> {
    out: W,
    color: bool,
    summary: ScanSummary,
}

impl<W: Write> ResultSink<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            summary: ScanSummary::default(),
        }
    }

    fn render(&self, result: &ScanResult) -> String {
        if !self.color {
            return result.to_string();
        }
        let tag = result.classification.tag();
        let tag = match result.classification {
            Classification::Vulnerable => tag.red().bold(),
            Classification::PotentiallyVulnerable => tag.yellow(),
            Classification::Safe { .. } => tag.green(),
            Classification::NoCname => tag.dimmed(),
        };
        format!("{} {}", tag, result.detail())
    }

    pub fn write(&mut self, result: &ScanResult) -> std::io::Result<()> {
        let line = self.render(result);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.summary.record(result.classification);
        Ok(())
    }

    /// 一直消费到所有生产者退出、队列关闭为止
    pub async fn drain(mut self, mut results: mpsc::Receiver<ScanResult>) -> std::io::Result<ScanSummary> {
        while let Some(result) = results.recv().await {
            self.write(&result)?;
        }
        Ok(self.summary)
    }
}

pub fn print_start_banner(config: &ScanConfig, services: usize, start_time: &DateTime<Local>) {
    eprintln!("{}", "#".repeat(75));
    eprintln!(" rust-takeover version {}", env!("CARGO_PKG_VERSION"));
    eprintln!(" ({:x} {})", start_time.timestamp(), start_time.format("%Y-%m-%d %H:%M:%S"));
    eprintln!();
    eprintln!(" Dangling CNAME / subdomain takeover scanner.");
    eprintln!(" Only scan domains you are authorized to test.");
    eprintln!("{}", "#".repeat(75));
    eprintln!(
        " {} services, {} workers, timeout {:?}, delay {:?}, check {}",
        services,
        config.workers,
        config.dns_timeout,
        config.delay,
        if config.check { "on".green() } else { "off".yellow() }
    );
    eprintln!();
}

pub fn print_end_banner(summary: &ScanSummary, start_time: &DateTime<Local>) {
    let end_time = Local::now();
    let duration = end_time.signed_duration_since(*start_time).num_seconds();

    eprintln!();
    eprintln!("{}", "#".repeat(75));
    eprintln!(
        "Done {:<28}[ {}s] -->> {} vulnerable, {} potentially vulnerable, {} safe <<--",
        end_time.format("%Y-%m-%d %H:%M:%S"),
        duration,
        summary.vulnerable.to_string().red(),
        summary.potentially_vulnerable.to_string().yellow(),
        summary.safe
    );
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_writes_one_line_per_result_and_counts() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(ScanResult::new("a.example.com", Classification::Vulnerable, Some("a.github.io".into())))
            .await
            .unwrap();
        tx.send(ScanResult::new("b.example.com", Classification::Safe { probed: false }, Some("b.example.net".into())))
            .await
            .unwrap();
        drop(tx);

        let mut out = Vec::new();
        let summary = ResultSink::new(&mut out, false).drain(rx).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[VULNERABLE] a.example.com -> a.github.io\n[SAFE] b.example.com -> b.example.net\n"
        );
        assert_eq!(summary.vulnerable, 1);
        assert_eq!(summary.safe, 1);
        assert_eq!(summary.total(), 2);
    }
}
