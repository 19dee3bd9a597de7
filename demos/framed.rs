//! The echo demo on top of the Tokio codec.
//!
//! ```text
//! printf 'PING :x\r\nQUIT' | RUST_LOG=trace cargo run --example framed
//! ```

use anyhow::Context;
use futures_util::{SinkExt, StreamExt};
use slirc_wire::{MessageCodec, MessageRecord};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framed=info,slirc_wire=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut lines = FramedRead::new(tokio::io::stdin(), MessageCodec::new());
    let mut out = FramedWrite::new(tokio::io::stdout(), MessageCodec::new());
    let mut echoed = 0usize;

    while let Some(record) = lines.next().await {
        let record = record.context("reading stdin")?;
        if let Err(e) = record.peek_command() {
            debug!("skipping malformed line: {}", e);
            continue;
        }
        out.send(&record).await.context("writing stdout")?;
        echoed += 1;
    }

    SinkExt::<MessageRecord>::flush(&mut out)
        .await
        .context("flushing stdout")?;
    info!(echoed, "done");
    Ok(())
}
