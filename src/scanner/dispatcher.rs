use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 去掉首尾空白和一个 `http://` / `https://` 前缀；空行返回 None
pub fn normalize(line: &str) -> Option<String> {
    let line = line.trim();
    let host = line
        .strip_prefix("http://")
        .or_else(|| line.strip_prefix("https://"))
        .unwrap_or(line);
    if host.is_empty() {
        None
    } else {
        Some(host.to_string())
    }
}

/// 逐行读取输入并送入有界队列。取消后立即停止读取；
/// 返回时 `tx` 被丢弃，队列随之关闭。非 UTF-8 的行会被跳过，只有读取本身的 I/O 错误才返回。
pub async fn dispatch<R>(
    mut input: R,
    tx: mpsc::Sender<String>,
    cancel: CancellationToken,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let mut sent = 0;

    loop {
        buf.clear();
        let read = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            read = input.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            break;
        }
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line,
            Err(e) => {
                debug!("skipping input line that is not valid UTF-8: {}", e);
                continue;
            }
        };
        let Some(host) = normalize(line) else { continue };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            res = tx.send(host) => {
                if res.is_err() {
                    break;
                }
                sent += 1;
            }
        }
    }

    debug!("dispatcher finished after {} subdomains", sent);
    Ok(sent)
}
