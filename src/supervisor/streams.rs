// src/supervisor/streams.rs

//! Per-stream reader tasks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::output::{OutputEvent, SinkSlot, StreamKind};

/// Marks the broker ready when a stdout line matches `pattern`.
#[derive(Debug, Clone)]
pub struct ReadyWatch {
    pub pattern: Regex,
    pub ready: Arc<AtomicBool>,
}

/// Spawn a task that forwards each line of `stream` to the sink until EOF.
///
/// Lines are decoded lossily: a stray non-UTF-8 byte from the VM must not
/// end the loop and silently drop the rest of the output.
pub fn spawn_line_reader<R>(
    stream: R,
    kind: StreamKind,
    sink: SinkSlot,
    ready: Option<ReadyWatch>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = decode_line(&buf);
                    if let Some(watch) = &ready {
                        if watch.pattern.is_match(&line) && !watch.ready.swap(true, Ordering::SeqCst)
                        {
                            info!("broker reported ready");
                        }
                    }
                    sink.emit(OutputEvent { stream: kind, text: line });
                }
                Err(e) => {
                    warn!(stream = %kind, error = %e, "error reading broker output");
                    break;
                }
            }
        }

        debug!(stream = %kind, "broker output stream closed");
    })
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
