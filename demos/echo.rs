//! Read IRC lines from stdin and write them back, normalized, to stdout.
//!
//! Malformed lines are logged and skipped. Try:
//!
//! ```text
//! printf ':n!u@h  PRIVMSG  #rust :hi\r\n: bad\r\nPING :x\r\n' | RUST_LOG=debug cargo run --example echo
//! ```

use anyhow::Context;
use slirc_wire::{DecodeError, Decoder, Encoder, MessageRecord};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echo=info,slirc_wire=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let decoder = Decoder::new(std::io::stdin().lock());
    let encoder = Encoder::new(std::io::stdout().lock());
    let mut record = MessageRecord::new();
    let mut echoed = 0usize;

    loop {
        match decoder.decode(&mut record) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => continue,
            Err(DecodeError::EndOfStream) => break,
            Err(e) => return Err(e).context("reading stdin"),
        }

        match encoder.encode(&record) {
            Ok(_) => echoed += 1,
            Err(e) => warn!("skipping {:?}: {}", record, e),
        }
    }

    encoder.flush().context("flushing stdout")?;
    info!(echoed, "done");
    Ok(())
}
