use anyhow::{Context, Result};
use bytes::Bytes;
use clap::Parser;
use std::io::Read;
use std::sync::Arc;
use tokio::io::AsyncRead;

use gluster_dissect::config::{Cli, Command, Config};
use gluster_dissect::dispatch::Registry;
use gluster_dissect::programs::ProcedureDecoder;
use gluster_dissect::render::Render;
use gluster_dissect::rpc::header::{ReplyStatus, RpcHeader};
use gluster_dissect::rpc::record::RecordReader;
use gluster_dissect::rpc::trace::{Outcome, TraceEntry, Tracer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before tracing init)
    let config = Config::load(cli.config.as_deref())?;

    // Initialize tracing with configured log level
    // Priority: config file -> RUST_LOG env -> "info"
    let log_level_str = config.logging.effective_level();
    let log_level = match log_level_str.parse() {
        Ok(level) => level,
        Err(_) => {
            eprintln!(
                "Warning: Invalid log level '{}', falling back to 'info'",
                log_level_str
            );
            tracing::Level::INFO
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    if config.trace.max_record_size == 0 {
        anyhow::bail!("Invalid max_record_size 0. Records need at least one byte.");
    }

    let registry = Registry::with_options(config.decode.options())?;

    match cli.command {
        Command::Decode {
            program,
            version,
            procedure,
            direction,
            offset,
            hex,
        } => {
            let text = match hex {
                Some(text) => text,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text)?;
                    text
                }
            };
            let buf = Bytes::from(parse_hex(&text)?);
            let dis = registry
                .dissect(&buf, offset, program, version, procedure, direction)
                .with_context(|| format!("{program}/{version} procedure {procedure}"))?;
            print!("{}", Render::new(&dis).show_offsets(config.decode.show_offsets));
        }
        Command::Trace { input } => {
            let input: Box<dyn AsyncRead + Unpin> = match input {
                Some(path) if path.as_os_str() != "-" => Box::new(
                    tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("Failed to open {}", path.display()))?,
                ),
                _ => Box::new(tokio::io::stdin()),
            };
            let mut reader = RecordReader::new(input, config.trace.max_record_size);
            let mut tracer = Tracer::new(Arc::new(registry));
            let show_offsets = config.decode.show_offsets;
            let stats = tracer
                .run(&mut reader, |entry| print_entry(entry, show_offsets))
                .await?;
            println!(
                "{} records: {} calls, {} replies ({} unmatched), {} malformed",
                stats.records, stats.calls, stats.replies, stats.unmatched, stats.malformed
            );
        }
        Command::Procedures => {
            for table in registry.tables() {
                println!("{} ({}/{})", table.name, table.program, table.version);
                for p in table.procedures {
                    println!(
                        "  {:>3} {:<24} call:{} reply:{}",
                        p.number,
                        p.name,
                        mark(p.call),
                        mark(p.reply)
                    );
                }
            }
        }
        Command::Fields => {
            for field in registry.fields().iter() {
                println!("{:<32} {:<24} {:?}", field.abbrev, field.name, field.kind);
            }
        }
    }

    Ok(())
}

fn mark(decoder: ProcedureDecoder) -> &'static str {
    if decoder.is_implemented() { "yes" } else { "-" }
}

fn print_entry(entry: &TraceEntry, show_offsets: bool) {
    match &entry.header {
        Some(RpcHeader::Call(call)) => println!("#{} xid 0x{:08x} call", entry.index, call.xid),
        Some(RpcHeader::Reply(reply)) => {
            let status = match &reply.status {
                ReplyStatus::Accepted { stat, .. } => format!("{stat:?}"),
                ReplyStatus::Denied(reject) => format!("denied {reject:?}"),
            };
            println!("#{} xid 0x{:08x} reply {}", entry.index, reply.xid, status);
        }
        None => println!("#{} unparsable record", entry.index),
    }
    match &entry.outcome {
        Outcome::Dissected(dis) => print!("{}", Render::new(dis).show_offsets(show_offsets)),
        Outcome::NoResult => println!("  [no result]"),
        Outcome::Unmatched => println!("  [reply to unseen call]"),
        Outcome::Failed(e) => println!("  [{e}]"),
    }
}

/// Hex digits to bytes; whitespace and an optional 0x prefix are ignored
fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let trimmed = text.trim();
    let digits: Vec<u8> = trimmed
        .strip_prefix("0x")
        .unwrap_or(trimmed)
        .bytes()
        .filter(|b| !b.is_ascii_whitespace() && *b != b':')
        .collect();
    if digits.len() % 2 != 0 {
        anyhow::bail!("Odd number of hex digits ({})", digits.len());
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let s = std::str::from_utf8(pair).context("Non-ASCII input")?;
            u8::from_str_radix(s, 16).with_context(|| format!("Invalid hex byte '{s}'"))
        })
        .collect()
}
