use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

/// One raw dataset record: a query with its candidate passages, in the
/// MS MARCO passage-ranking shape.
#[derive(Debug, Deserialize)]
struct RawRecord {
    query_id: u64,
    query: String,
    passages: RawPassages,
}

#[derive(Debug, Deserialize)]
struct RawPassages {
    passage_text: Vec<String>,
    #[serde(default)]
    is_selected: Vec<i64>,
}

/// One flattened passage line, the corpus format the server loads.
#[derive(Debug, Serialize)]
struct FlatPassage {
    id: String,
    query_id: u64,
    query: String,
    passage: String,
    is_selected: bool,
}

#[derive(Debug, Serialize)]
struct MetaFile {
    num_passages: usize,
    num_records: usize,
    created_at: String,
    version: u32,
}

#[derive(Parser)]
#[command(name = "ingest")]
#[command(about = "Flatten raw passage-ranking datasets into a corpus JSONL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten raw JSON/JSONL records into one passage per line
    Flatten {
        /// Input path (file or directory of .json/.jsonl files)
        #[arg(long)]
        input: String,
        /// Output corpus JSONL path
        #[arg(long)]
        output: String,
        /// Cap on the number of raw records to process
        #[arg(long)]
        sample_size: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Flatten {
            input,
            output,
            sample_size,
        } => flatten_dataset(&input, &output, sample_size),
    }
}

fn flatten_dataset(input: &str, output: &str, sample_size: Option<usize>) -> Result<()> {
    let input_path = Path::new(input);
    let output_path = Path::new(output);
    if let Some(dir) = output_path.parent() {
        fs::create_dir_all(dir)?;
    }

    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
        files.sort();
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    }
    anyhow::ensure!(!files.is_empty(), "no input files found at {input}");

    let out = File::create(output_path)
        .with_context(|| format!("creating output file {}", output_path.display()))?;
    let mut writer = BufWriter::new(out);

    let mut num_records = 0usize;
    let mut num_passages = 0usize;
    'records: for file in files {
        let records = read_records(&file)?;
        for record in records {
            if sample_size.is_some_and(|cap| num_records >= cap) {
                break 'records;
            }
            num_records += 1;
            for passage in flatten_record(record) {
                serde_json::to_writer(&mut writer, &passage)?;
                writer.write_all(b"\n")?;
                num_passages += 1;
            }
        }
    }
    writer.flush()?;

    let meta = MetaFile {
        num_passages,
        num_records,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: 1,
    };
    let meta_path = output_path.with_extension("meta.json");
    fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)?;

    tracing::info!(num_records, num_passages, output, "corpus flatten complete");
    Ok(())
}

fn read_records(file: &Path) -> Result<Vec<RawRecord>> {
    let ext = file.extension().and_then(|s| s.to_str());
    let f = File::open(file).with_context(|| format!("opening {}", file.display()))?;
    let reader = BufReader::new(f);

    let mut records = Vec::new();
    if ext == Some("jsonl") {
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: RawRecord = serde_json::from_str(&line)
                .with_context(|| format!("parsing {} line {}", file.display(), line_no + 1))?;
            records.push(record);
        }
    } else {
        let json: serde_json::Value = serde_json::from_reader(reader)
            .with_context(|| format!("parsing {}", file.display()))?;
        match json {
            serde_json::Value::Array(arr) => {
                for v in arr {
                    records.push(serde_json::from_value(v)?);
                }
            }
            other => records.push(serde_json::from_value(other)?),
        }
    }
    Ok(records)
}

/// Expand one raw record into flat passages. Passage ids follow the
/// `{query_id}_{position}` convention; passages with no tokens are
/// dropped so the corpus never contains empty documents.
fn flatten_record(record: RawRecord) -> Vec<FlatPassage> {
    let RawRecord {
        query_id,
        query,
        passages,
    } = record;
    passages
        .passage_text
        .into_iter()
        .enumerate()
        .filter(|(_, text)| !tokenize(text).is_empty())
        .map(|(j, text)| FlatPassage {
            id: format!("{query_id}_{j}"),
            query_id,
            query: query.clone(),
            passage: text,
            is_selected: passages.is_selected.get(j).map(|&v| v != 0).unwrap_or(false),
        })
        .collect()
}
