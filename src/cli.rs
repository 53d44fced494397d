use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use huffpack::config::{AppConfig, DEFAULT_CONFIG_FILE};
use huffpack::utils::io::at_eof;
use huffpack::verify::verify_round_trip;
use huffpack::{compress, compress_buffered, decompress, StreamHeader};

#[derive(Parser)]
#[command(name = "huffpack")]
#[command(about = "Static Huffman compression for files")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Config file path")]
    pub config: Option<String>,

    #[arg(long, global = true, help = "Output as JSON")]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compress INPUT into OUTPUT ("-" for stdin/stdout)
    Encode { input: PathBuf, output: PathBuf },
    /// Decompress INPUT into OUTPUT ("-" for stdin/stdout)
    Decode { input: PathBuf, output: PathBuf },
    /// Show the header of a compressed file
    Inspect { input: PathBuf },
    /// Compress and decompress INPUT in memory and compare digests
    Verify { input: PathBuf },
    /// Write a default config file
    GenerateConfig {
        #[arg(long, default_value = DEFAULT_CONFIG_FILE, help = "Config file path")]
        output: PathBuf,
    },
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        Ok(Box::new(file))
    }
}

fn open_output(path: &Path, config: &AppConfig) -> Result<Box<dyn Write>> {
    let capacity = config.engine.buffer_size();
    if is_stdio(path) {
        Ok(Box::new(BufWriter::with_capacity(capacity, io::stdout().lock())))
    } else {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Box::new(BufWriter::with_capacity(capacity, file)))
    }
}

/// Reports go to stderr when stdout carries the data.
fn report(to_stdout: bool, line: String) {
    if to_stdout {
        println!("{}", line);
    } else {
        eprintln!("{}", line);
    }
}

pub fn execute(cli: Cli, config: &AppConfig) -> Result<()> {
    match cli.command {
        Commands::Encode { input, output } => encode(&input, &output, config, cli.json),
        Commands::Decode { input, output } => decode(&input, &output, config, cli.json),
        Commands::Inspect { input } => inspect(&input, cli.json),
        Commands::Verify { input } => verify(&input, config, cli.json),
        Commands::GenerateConfig { output } => generate_config(&output, cli.json),
    }
}

/// Removes an output file that a failed run left half written.
fn discard_partial(output: &Path, config: &AppConfig) {
    if config.remove_partial_output && !is_stdio(output) {
        if let Err(rm) = std::fs::remove_file(output) {
            warn!("Could not remove partial output {}: {}", output.display(), rm);
        }
    }
}

fn encode(input: &Path, output: &Path, config: &AppConfig, json: bool) -> Result<()> {
    let mut source = if is_stdio(input) {
        None
    } else {
        let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
        Some(BufReader::with_capacity(config.engine.chunk_size(), file))
    };
    let mut sink = open_output(output, config)?;

    let result = match source.as_mut() {
        Some(reader) => compress(reader, &mut sink, &config.engine),
        None => compress_buffered(&mut io::stdin().lock(), &mut sink, &config.engine),
    }
    .map_err(anyhow::Error::from)
    .and_then(|stats| {
        sink.flush()?;
        Ok(stats)
    });

    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            drop(sink);
            discard_partial(output, config);
            return Err(e);
        }
    };
    info!("Encoded {} -> {}", input.display(), output.display());

    let to_stdout = !is_stdio(output);
    if json {
        report(to_stdout, serde_json::to_string(&stats)?);
    } else {
        report(to_stdout, format!("✅ Encoded {} bytes into {} bytes", stats.input_bytes, stats.output_bytes));
        report(to_stdout, format!("   Distinct symbols: {}", stats.distinct_symbols));
        report(to_stdout, format!("   Payload bits: {} (+{} pad)", stats.payload_bits, stats.pad_bits));
        report(to_stdout, format!("   Ratio: {:.3}", stats.ratio()));
    }
    Ok(())
}

fn decode(input: &Path, output: &Path, config: &AppConfig, json: bool) -> Result<()> {
    let reader = open_input(input)?;
    let mut sink = open_output(output, config)?;
    let to_stdout = !is_stdio(output);

    let result = decompress(reader, &mut sink, &config.engine).and_then(|stats| {
        sink.flush()?;
        Ok(stats)
    });
    let stats = match result {
        Ok(stats) => stats,
        Err(e) => {
            drop(sink);
            discard_partial(output, config);
            if !e.is_corruption() {
                return Err(e.into());
            }
            warn!("Decoding {} failed: {}", input.display(), e);
            if json {
                report(to_stdout, serde_json::json!({"error": "corrupted file"}).to_string());
            } else {
                report(to_stdout, "❌ corrupted file".to_string());
            }
            anyhow::bail!("corrupted file: {}", input.display());
        }
    };
    info!("Decoded {} -> {}", input.display(), output.display());

    if json {
        report(to_stdout, serde_json::to_string(&stats)?);
    } else {
        report(to_stdout, format!("✅ Decoded {} bytes into {} bytes", stats.input_bytes, stats.output_bytes));
    }
    Ok(())
}

fn inspect(input: &Path, json: bool) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);

    if at_eof(&mut reader)? {
        if json {
            println!("{}", serde_json::json!({"empty": true}));
        } else {
            println!("📄 {}: empty stream", input.display());
        }
        return Ok(());
    }

    let header = StreamHeader::read_from(&mut reader)?;
    let summary = header.summary()?;
    let actual_payload = file_len.saturating_sub(summary.header_bytes as u64);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "header": summary,
                "actual_payload_bytes": actual_payload,
            })
        );
    } else {
        println!("📄 Stream Header: {}", input.display());
        println!("======================");
        println!("   Shape bits: {}", summary.shape_bits);
        println!("   Letters: {} ({})", summary.letter_count, summary.letters_hex);
        println!("   Tree: {} leaves, depth {}", summary.leaf_count, summary.tree_depth);
        println!("   Payload bits: {} (+{} pad)", summary.payload_bits, summary.pad_bits);
        println!("   Payload bytes: {} expected, {} present", summary.payload_bytes, actual_payload);
        if actual_payload != summary.payload_bytes {
            println!("⚠️  Payload length does not match header");
        }
    }
    Ok(())
}

fn verify(input: &Path, config: &AppConfig, json: bool) -> Result<()> {
    let mut data = Vec::new();
    open_input(input)?.read_to_end(&mut data)?;

    let outcome = verify_round_trip(&data, &config.engine)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("🔍 Verifying Round Trip");
        println!("=======================");
        println!("   Input: {} bytes, sha256 {}", outcome.input_bytes, outcome.input_sha256);
        println!("   Encoded: {} bytes (ratio {:.3})", outcome.encoded_bytes, outcome.ratio);
        println!("   Decoded: {} bytes, sha256 {}", outcome.decoded_bytes, outcome.decoded_sha256);
        if outcome.verified {
            println!("✅ Round trip PASSED");
        } else {
            println!("❌ Round trip FAILED");
        }
    }

    if !outcome.verified {
        anyhow::bail!("round trip mismatch for {}", input.display());
    }
    Ok(())
}

fn generate_config(output: &Path, json: bool) -> Result<()> {
    AppConfig::default().save(output)?;
    if json {
        println!("{}", serde_json::json!({"success": true, "config_file": output.display().to_string()}));
    } else {
        println!("✅ Config written to {}", output.display());
    }
    Ok(())
}
