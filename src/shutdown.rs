use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// 把进程中断信号转换为协作式取消
#[derive(Debug, Clone, Default)]
pub struct ShutdownController {
    token: CancellationToken,
}

impl ShutdownController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// 只有第一次调用会真正触发取消，返回值表示这次是否是第一次
    pub fn trigger(&self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        self.token.cancel();
        true
    }

    /// 第一次中断：打印提示并取消；第二次中断：强制退出
    pub fn listen(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = wait_for_interrupt().await {
                warn!("unable to listen for interrupt signals: {}", e);
                return;
            }
            if self.trigger() {
                eprintln!("\n[INFO] Received interrupt signal. Shutting down...");
            }

            if wait_for_interrupt().await.is_ok() {
                eprintln!("[INFO] Second interrupt received, exiting immediately");
                std::process::exit(130);
            }
        })
    }
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_is_idempotent() {
        let controller = ShutdownController::new();
        let token = controller.token();
        assert!(!token.is_cancelled());

        assert!(controller.trigger());
        assert!(token.is_cancelled());
        assert!(!controller.trigger());
        assert!(token.is_cancelled());
    }
}
