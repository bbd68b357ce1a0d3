//! frameforge CLI - catalog sections, bills of material and cut lists.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use frameforge::catalog::Catalog;
use frameforge::ir::Document;
use frameforge::nest::{nest, CutPart, NestSummary, Stock};
use frameforge::section::generate;
use frameforge::{group_rows, Bom, BomRow, Epoch, FrameModel, PrismKernel};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "frameforge")]
#[command(about = "Steel frame design from catalog profiles", long_about = None)]
struct Cli {
    /// Settings file (default: ./frameforge.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cross-section of a catalog size
    Section {
        /// Catalog material
        #[arg(long)]
        material: Option<String>,
        /// Catalog family
        #[arg(long)]
        family: Option<String>,
        /// Catalog size
        #[arg(long)]
        size: Option<String>,
        /// Force sharp (false) or filleted (true) corners
        #[arg(long)]
        fillet: Option<bool>,
    },
    /// List the families and sizes of a material
    Catalog {
        /// Catalog material (default from settings)
        material: Option<String>,
    },
    /// Nest part lengths onto stock bars
    Nest {
        /// Part lengths in mm, optionally labelled as NAME=LENGTH
        #[arg(required = true)]
        parts: Vec<String>,
        /// Stock bar length in mm
        #[arg(long)]
        stock: Option<f64>,
        /// Saw kerf in mm
        #[arg(long)]
        kerf: Option<f64>,
    },
    /// Bill of material of a frame document
    Bom {
        /// Frame document (.frame.json)
        file: PathBuf,
        /// Merge identical parts
        #[arg(long)]
        group: bool,
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
        /// Also nest the parts onto stock bars
        #[arg(long)]
        cut_list: bool,
        /// Stock bar length in mm
        #[arg(long)]
        stock: Option<f64>,
        /// Saw kerf in mm
        #[arg(long)]
        kerf: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Section {
            material,
            family,
            size,
            fillet,
        } => {
            let material = material.unwrap_or_else(|| config.material.clone());
            let family = family.unwrap_or_else(|| config.family.clone());
            let Some(size) = size.or_else(|| config.size.clone()) else {
                bail!("no size given; pass --size or set `size` in {}", config::DEFAULT_FILE);
            };
            show_section(&config, &material, &family, &size, fillet.or(config.fillet))?;
        }
        Commands::Catalog { material } => {
            let material = material.unwrap_or_else(|| config.material.clone());
            list_catalog(&config, &material)?;
        }
        Commands::Nest { parts, stock, kerf } => {
            let stock = stock.unwrap_or(config.nesting.stock_length);
            let kerf = kerf.unwrap_or(config.nesting.kerf);
            let parts = parse_parts(&parts, kerf)?;
            let bars = nest(&parts, stock)?;
            print_bars(&bars);
        }
        Commands::Bom {
            file,
            group,
            json,
            cut_list,
            stock,
            kerf,
        } => {
            let stock = stock.unwrap_or(config.nesting.stock_length);
            let kerf = kerf.unwrap_or(config.nesting.kerf);
            show_bom(&file, group, json, cut_list.then_some((stock, kerf)))?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "frameforge=debug"
    } else {
        "frameforge=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    Catalog::from_dir(&config.catalog_dir)
        .with_context(|| format!("loading catalog from {}", config.catalog_dir.display()))
}

fn show_section(
    config: &Config,
    material: &str,
    family: &str,
    size: &str,
    fillet: Option<bool>,
) -> Result<()> {
    let catalog = load_catalog(config)?;
    let resolved = catalog.resolve(material, family, size)?;
    let mut spec = resolved.spec.to_millimeters();
    if let Some(fillet) = fillet {
        spec.fillet = fillet;
    }
    let section = generate(&spec).with_context(|| format!("generating {family} {size}"))?;
    let (min, max) = section.bounds();
    let centroid = section.centroid();

    println!("{family} {size} ({}), {material}", resolved.norm);
    println!("  area       {:.1} mm²", section.area());
    println!("  centroid   ({:.2}, {:.2}) mm", centroid.x, centroid.y);
    println!("  bounds     {:.2} x {:.2} mm", max.x - min.x, max.y - min.y);
    println!("  perimeter  {:.1} mm", section.perimeter());
    println!("  segments   {}", section.segment_count());
    println!("  hollow     {}", section.inner().is_some());
    println!("  weight     {:.2} kg/m", resolved.weight_per_m);
    Ok(())
}

fn list_catalog(config: &Config, material: &str) -> Result<()> {
    let catalog = load_catalog(config)?;
    let families = catalog.families(material).with_context(|| {
        let known: Vec<&str> = catalog.materials().collect();
        format!("catalog materials: {}", known.join(", "))
    })?;
    for (name, family) in families {
        let sizes: Vec<&str> = family.sizes.keys().map(String::as_str).collect();
        println!("{name} ({}, {}): {}", family.norm, family.unit, sizes.join(", "));
    }
    Ok(())
}

/// Parse `LENGTH` or `NAME=LENGTH` arguments.
fn parse_parts(args: &[String], kerf: f64) -> Result<Vec<CutPart>> {
    args.iter()
        .enumerate()
        .map(|(i, arg)| {
            let (name, length) = match arg.split_once('=') {
                Some((name, length)) => (name.to_string(), length),
                None => (format!("P{}", i + 1), arg.as_str()),
            };
            let length: f64 = length
                .trim()
                .parse()
                .with_context(|| format!("invalid part length {arg:?}"))?;
            Ok(CutPart::new(name, length, kerf))
        })
        .collect()
}

fn print_bars(bars: &[Stock]) {
    for (i, bar) in bars.iter().enumerate() {
        println!("Bar {}: {:.1} mm, {:.1} mm left", i + 1, bar.length, bar.left());
        for part in bar.parts() {
            println!("  {:<20} {:>8.1}", part.name, part.length);
        }
    }
    let summary = NestSummary::from_stocks(bars);
    println!(
        "{} bars, {} parts, {:.1} mm waste, {} utilization",
        summary.bars,
        summary.parts,
        summary.waste,
        summary.utilization_percent()
    );
}

fn show_bom(file: &Path, group: bool, json: bool, cut_list: Option<(f64, f64)>) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let document =
        Document::from_json(&text).with_context(|| format!("parsing {}", file.display()))?;

    let mut model = FrameModel::from_document(PrismKernel::new(), &document, Epoch(1));
    let report = model.recompute(Epoch(1));
    for (body, error) in &report.failed {
        warn!(%body, %error, "feature failed to recompute");
    }

    let mut bom = model.bom();
    if group {
        bom.rows = group_rows(&bom.rows);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&bom)?);
    } else {
        print_rows(&bom.rows);
        print_skipped(&bom);
    }

    if let Some((stock, kerf)) = cut_list {
        println!();
        print_bars(&model.cut_list(stock, kerf)?);
    }
    Ok(())
}

fn print_skipped(bom: &Bom) {
    if bom.skipped.is_empty() {
        return;
    }
    println!();
    println!("{} part(s) left out:", bom.skipped.len());
    for part in &bom.skipped {
        println!("  {:<12} {}", part.body.to_string(), part.error);
    }
}

fn print_rows(rows: &[BomRow]) {
    println!(
        "{:<12} {:<20} {:<20} {:<12} {:<10} {:>9} {:>10} {:>14} {:<6} {:>8} {:>4}",
        "Parent", "Label", "Family", "Size", "Material", "Length", "Angle 1", "Angle 2", "Cutout",
        "Weight", "Qty"
    );
    for row in rows {
        println!(
            "{:<12} {:<20} {:<20} {:<12} {:<10} {:>9.1} {:>10} {:>14} {:<6} {:>8.2} {:>4}",
            row.parent,
            row.label,
            row.family,
            row.size,
            row.material,
            row.length,
            row.cut_angle_1,
            row.cut_angle_2,
            if row.cutout { "yes" } else { "no" },
            row.weight,
            row.quantity
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        let args = vec!["1000".to_string(), "Rail=600.5".to_string()];
        let parts = parse_parts(&args, 3.0).unwrap();
        assert_eq!(parts[0].name, "P1");
        assert_eq!(parts[0].length, 1000.0);
        assert_eq!(parts[1].name, "Rail");
        assert_eq!(parts[1].cut_size(), 603.5);
    }

    #[test]
    fn test_parse_parts_rejects_garbage() {
        assert!(parse_parts(&["long".to_string()], 0.0).is_err());
    }

    #[test]
    fn test_cli_parses_bom_flags() {
        let cli = Cli::try_parse_from(["frameforge", "bom", "frame.json", "--group", "--kerf", "2"])
            .unwrap();
        match cli.command {
            Commands::Bom {
                group, kerf, json, ..
            } => {
                assert!(group);
                assert!(!json);
                assert_eq!(kerf, Some(2.0));
            }
            _ => panic!("expected bom"),
        }
    }
}
