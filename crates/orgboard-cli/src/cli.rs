use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orgboard_core::{Chart, ChartConfig, NodeType, TEMPLATE_NAMES};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "orgboard", version, about = "Org chart layout and inspection tool")]
pub struct Args {
    /// Engine configuration JSON file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List built-in templates
    Templates,
    /// Write a laid-out template snapshot
    Template {
        name: String,
        /// Output file. Defaults to stdout.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Import a snapshot, run auto-layout and export it again
    Layout {
        /// Snapshot file or '-' for stdin
        input: PathBuf,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Print node counts, hierarchy edges and department membership
    Inspect {
        /// Snapshot file or '-' for stdin
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = match args.config.as_deref() {
        Some(path) => ChartConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ChartConfig::default(),
    };

    match args.command {
        Command::Templates => {
            for name in TEMPLATE_NAMES {
                println!("{name}");
            }
        }
        Command::Template { name, output } => {
            let mut chart = Chart::with_config(config);
            chart.load_template(&name)?;
            write_output(&chart.export_json()?, output.as_deref())?;
        }
        Command::Layout { input, output } => {
            let mut chart = load_chart(&input, config)?;
            let report = chart.auto_layout();
            log::info!(
                "Placed {} nodes in {} trees, fitted {} groups",
                report.placed,
                report.roots,
                report.groups_fitted
            );
            write_output(&chart.export_json()?, output.as_deref())?;
        }
        Command::Inspect { input, json } => {
            let chart = load_chart(&input, config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary_json(&chart))?);
            } else {
                print!("{}", summary(&chart));
            }
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn load_chart(path: &Path, config: ChartConfig) -> Result<Chart> {
    let json = read_input(path)?;
    let mut chart = Chart::with_config(config);
    chart
        .import_json(&json)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    Ok(chart)
}

fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
        None => println!("{contents}"),
    }
    Ok(())
}

/// Node counts per type, in type order. Types with no nodes are left out.
fn type_counts(chart: &Chart) -> Vec<(NodeType, usize)> {
    NodeType::all()
        .iter()
        .map(|&t| (t, chart.store().nodes().filter(|n| n.node_type() == t).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Member names per department, sorted by department.
fn departments(chart: &Chart) -> BTreeMap<String, Vec<String>> {
    let mut departments: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in chart.store().nodes().filter(|n| n.is_functional()) {
        if !node.department.is_empty() {
            departments
                .entry(node.department.clone())
                .or_default()
                .push(node.name.clone());
        }
    }
    departments
}

fn display_name(chart: &Chart, id: &str) -> String {
    match chart.node(id) {
        Some(node) if !node.name.is_empty() => node.name.clone(),
        _ => id.to_string(),
    }
}

fn summary(chart: &Chart) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} nodes, {} drawings\n",
        chart.store().len(),
        chart.store().drawings().len()
    ));
    for (node_type, count) in type_counts(chart) {
        out.push_str(&format!("  {:<10} {}\n", node_type.name(), count));
    }

    let edges = chart.edges();
    out.push_str(&format!("{} edges\n", edges.len()));
    for edge in &edges {
        out.push_str(&format!(
            "  {} -> {}\n",
            display_name(chart, &edge.parent),
            display_name(chart, &edge.child)
        ));
    }

    let departments = departments(chart);
    out.push_str(&format!("{} departments\n", departments.len()));
    for (department, members) in &departments {
        out.push_str(&format!("  {}: {}\n", department, members.join(", ")));
    }
    out
}

fn summary_json(chart: &Chart) -> serde_json::Value {
    let types: BTreeMap<&str, usize> = type_counts(chart)
        .into_iter()
        .map(|(t, count)| (t.name(), count))
        .collect();
    serde_json::json!({
        "nodes": chart.store().len(),
        "drawings": chart.store().drawings().len(),
        "types": types,
        "edges": chart.edges(),
        "departments": departments(chart),
    })
}
