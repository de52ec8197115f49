//! vibefed - plans pushed-down fragment queries for an external table

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{info, warn};
use vibefed::assembler::select_query;
use vibefed::catalog::TupleDescriptor;
use vibefed::partition::{PartitionOptions, PlannerConfig, DEFAULT_MAX_FRAGMENTS};
use vibefed::request::PushdownRequest;
use vibefed::translator::Pushdown;

/// Translate a serialized filter and partitioning options into one backend
/// query per fragment
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Columns of the external table as name:type pairs, e.g. id:int4,grade:varchar(10)
    #[arg(short, long)]
    columns: String,

    /// External data source (table) name
    #[arg(short, long)]
    source: String,

    /// Base query; defaults to selecting every column from the source
    #[arg(short, long)]
    query: Option<String>,

    /// Serialized filter, e.g. a0c20s1d5o2
    #[arg(short, long)]
    filter: Option<String>,

    /// Partition column and type, e.g. cdate:date, id:int or grade:enum
    #[arg(long)]
    partition_by: Option<String>,

    /// Partition range, e.g. 2008-01-01:2009-01-01 or excellent:good:bad
    #[arg(long)]
    range: Option<String>,

    /// Partition interval, e.g. 2:month or 100
    #[arg(long)]
    interval: Option<String>,

    /// Maximum number of fragments a plan may produce
    #[arg(long, default_value_t = DEFAULT_MAX_FRAGMENTS)]
    max_fragments: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let tuple = TupleDescriptor::parse(&args.columns).context("Invalid --columns")?;
    info!("Table {} has {} columns", args.source, tuple.len());

    let mut request = PushdownRequest::new(tuple);
    if let Some(filter) = &args.filter {
        request = request.with_filter(filter.clone());
    }
    match &args.partition_by {
        Some(partition_by) => {
            let mut options = PartitionOptions::new(partition_by.clone());
            options.range = args.range.clone();
            options.interval = args.interval.clone();
            request = request.with_partition(options);
        }
        None if args.range.is_some() || args.interval.is_some() => {
            warn!("--range/--interval given without --partition-by, ignoring them");
        }
        None => {}
    }

    let config = PlannerConfig {
        max_fragments: args.max_fragments,
    };
    let plan = request.plan(&config).context("Failed to plan scan")?;

    match &plan.pushdown {
        Some(Pushdown::Where(clause)) => info!("Pushing down: {}", clause),
        Some(Pushdown::Unsupported(reason)) => info!("Filtering locally: {}", reason),
        None => info!("No filter supplied"),
    }

    let base = args
        .query
        .clone()
        .unwrap_or_else(|| select_query(&args.source, &request.tuple));
    let queries = plan
        .queries(&base)
        .context("Failed to assemble fragment queries")?;
    info!("Planned {} fragments", queries.len());

    for fragment in queries {
        println!("{}\t{}", fragment.index, fragment.query);
    }

    Ok(())
}
