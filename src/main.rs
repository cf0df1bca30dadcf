//! heapstats - scan heap-file tables and estimate predicate selectivity

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use heapstats::access::{FieldType, Schema, TupleCursor};
use heapstats::config::{DatabaseConfig, DEFAULT_HISTOGRAM_BUCKETS, DEFAULT_IO_COST_PER_PAGE};
use heapstats::database::Database;
use heapstats::predicate::Op;
use heapstats::stats::{FieldHistogram, TableStats};
use heapstats::storage::HeapFileEncoder;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// heapstats - heap-file tables and their statistics
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a delimited text file into a heap file
    Convert {
        /// Text input, one record per line
        input: PathBuf,

        /// Heap file to create
        output: PathBuf,

        /// Comma separated field types, e.g. "int,string,int"
        #[arg(short, long)]
        schema: String,

        /// Field separator of the input
        #[arg(long, default_value = ",")]
        separator: char,
    },

    /// Print every record of a table
    Scan {
        /// Schema file listing the tables
        #[arg(short, long)]
        catalog: PathBuf,

        /// Table to scan
        table: String,
    },

    /// Compute statistics for every table of a catalog
    Stats {
        /// Schema file listing the tables
        #[arg(short, long)]
        catalog: PathBuf,

        /// Cost of reading one page
        #[arg(long, default_value_t = DEFAULT_IO_COST_PER_PAGE)]
        io_cost: u64,

        /// Histogram buckets per field
        #[arg(long, default_value_t = DEFAULT_HISTOGRAM_BUCKETS)]
        buckets: usize,

        /// Predicate to estimate, e.g. "age > 30"
        #[arg(short, long)]
        predicate: Option<String>,

        /// Print the histogram of every field
        #[arg(long)]
        histograms: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match args.command {
        Command::Convert {
            input,
            output,
            schema,
            separator,
        } => convert(&input, &output, &schema, separator),
        Command::Scan { catalog, table } => scan(&catalog, &table),
        Command::Stats {
            catalog,
            io_cost,
            buckets,
            predicate,
            histograms,
        } => {
            let mut config = DatabaseConfig::default();
            config.stats.io_cost_per_page = io_cost;
            config.stats.histogram_buckets = buckets;
            stats(&catalog, config, predicate.as_deref(), histograms)
        }
    }
}

fn convert(input: &Path, output: &Path, types: &str, separator: char) -> Result<()> {
    let types = types
        .split(',')
        .map(|t| t.parse::<FieldType>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid --schema")?;
    let schema = Schema::from_types(&types)?;

    let reader = BufReader::new(
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?,
    );
    let mut writer = BufWriter::new(
        File::create(output).with_context(|| format!("Failed to create {}", output.display()))?,
    );
    let count = HeapFileEncoder::convert(reader, &mut writer, &schema, separator)
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    println!("Wrote {} records to {}", count, output.display());
    Ok(())
}

fn scan(catalog: &Path, table: &str) -> Result<()> {
    let db = Database::open(catalog, DatabaseConfig::default())?;
    let mut scan = db.scan(table, None)?;

    scan.open()?;
    let mut count = 0;
    for tuple in scan.records() {
        print!("{}", tuple?);
        count += 1;
    }
    scan.close();

    eprintln!("{} records", count);
    Ok(())
}

fn stats(
    catalog: &Path,
    config: DatabaseConfig,
    predicate: Option<&str>,
    histograms: bool,
) -> Result<()> {
    let predicate = predicate.map(parse_predicate).transpose()?;

    let db = Database::open(catalog, config)?;
    db.compute_statistics()?;

    for name in db.list_tables()? {
        let stats = db.table_stats(&name)?;
        println!("{}", name);
        println!("  tuples:    {}", stats.total_tuples());
        println!("  pages:     {}", stats.num_pages());
        println!("  scan cost: {}", stats.estimate_scan_cost());

        if let Some((field, op, literal)) = &predicate {
            print_estimate(&db, &name, &stats, field, *op, literal)?;
        }

        if histograms {
            for (i, field) in stats.field_names().iter().enumerate() {
                let label = field.as_deref().unwrap_or("null");
                match stats.field_histogram(i)? {
                    FieldHistogram::Int(h) => println!("  {}: {}", label, h),
                    FieldHistogram::String(h) => println!("  {}: {}", label, h),
                }
            }
        }
    }
    Ok(())
}

fn print_estimate(
    db: &Database,
    table: &str,
    stats: &TableStats,
    field: &str,
    op: Op,
    literal: &str,
) -> Result<()> {
    let schema = db.catalog().schema(db.catalog().table_id(table)?)?;
    let Ok(index) = schema.field_index_of(field) else {
        println!("  no field '{}'", field);
        return Ok(());
    };

    let value = schema.field_type(index)?.parse_value(literal)?;
    let selectivity = stats.estimate_selectivity(index, op, &value)?;
    println!(
        "  {} {} {}: selectivity {:.4}, cardinality {}",
        field,
        op,
        value,
        selectivity,
        stats.estimate_table_cardinality(selectivity)
    );
    Ok(())
}

/// Split "field op value" into its parts.
fn parse_predicate(text: &str) -> Result<(String, Op, String)> {
    let mut parts = text.split_whitespace();
    let (Some(field), Some(op)) = (parts.next(), parts.next()) else {
        bail!("Predicate must look like \"field op value\", got \"{}\"", text);
    };
    let value = parts.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        bail!("Predicate \"{}\" has no value", text);
    }
    let op: Op = op.parse()?;
    Ok((field.to_string(), op, value))
}
