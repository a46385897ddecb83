//! partscope CLI - CAD part analysis and cost estimation
//!
//! Converts STEP or mesh files, measures the part, suggests manufacturing
//! operations, and estimates cost.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use partscope::{
    analyze_mesh_file, estimate_cost, process_file, Config, CostBreakdown, GeometricMetrics,
    Material, Operation, ProcessError,
};
use partscope_cli::{init_tracing, remediation_text, LinePrinter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "partscope")]
#[command(about = "Analyze CAD parts and estimate manufacturing cost", long_about = None)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert, analyze, and price a STEP, IGES, STL, OBJ, or GLB file
    Process {
        /// Input file
        input: PathBuf,
        /// Save the converted STL here (only written for STEP/IGES input)
        #[arg(long)]
        stl: Option<PathBuf>,
        /// Save the viewer GLB here
        #[arg(long)]
        glb: Option<PathBuf>,
        /// Save the JSON report here
        #[arg(long)]
        json: Option<PathBuf>,
        /// Material key or name (default from config)
        #[arg(short, long)]
        material: Option<Material>,
    },
    /// Measure a mesh file and list operations, without conversion
    Analyze {
        /// STL, OBJ, or GLB file
        mesh: PathBuf,
    },
    /// Price a part from its measurements
    Cost {
        /// Part volume in mm³
        #[arg(long)]
        volume_mm3: f64,
        /// Triangle count
        #[arg(long)]
        faces: usize,
        /// Number of manufacturing operations
        #[arg(long)]
        operations: usize,
        /// Material key or name (default from config)
        #[arg(short, long)]
        material: Option<Material>,
    },
    /// List available materials
    Materials,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    debug!(?config, "using config");

    match cli.command {
        Commands::Process {
            input,
            stl,
            glb,
            json,
            material,
        } => {
            let material = material.unwrap_or(config.material);
            process(&input, &config, material, stl.as_deref(), glb.as_deref(), json.as_deref())?;
        }
        Commands::Analyze { mesh } => {
            let analysis = analyze_mesh_file(&mesh)
                .with_context(|| format!("failed to analyze {}", mesh.display()))?;
            print_metrics(&analysis.metrics);
            print_operations(&analysis.operations);
        }
        Commands::Cost {
            volume_mm3,
            faces,
            operations,
            material,
        } => {
            let material = material.unwrap_or(config.material);
            let cost = estimate_cost(volume_mm3, material, operations, faces, &config.cost)?;
            print_cost(&cost);
        }
        Commands::Materials => {
            println!("{:<16} {:<16} {:>12} {:>10}", "KEY", "NAME", "g/cm³", "₹/kg");
            for m in Material::ALL {
                println!(
                    "{:<16} {:<16} {:>12.2} {:>10.0}",
                    m.key(),
                    m.name(),
                    m.density(),
                    m.cost_per_kg()
                );
            }
        }
    }

    Ok(())
}

fn process(
    input: &Path,
    config: &Config,
    material: Material,
    stl: Option<&Path>,
    glb: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    let mut printer = LinePrinter::new(io::stdout());
    let outcome = match process_file(input, config, material, &mut printer) {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    println!();
    println!("File:      {} ({:.2} MB)", outcome.file_name, outcome.file_size_mb);
    println!("Part type: {}", outcome.part_type);
    if let Some(quality) = outcome.quality {
        println!("Quality:   {quality}");
    }
    if let Some(method) = &outcome.conversion_method {
        println!("Converted: {method}");
    }
    match &outcome.metrics {
        Some(metrics) => print_metrics(metrics),
        None => println!("\nGeometry could not be analyzed"),
    }
    print_operations(&outcome.operations);
    if let Some(cost) = &outcome.cost {
        print_cost(cost);
    }

    if let Some(path) = glb {
        fs::write(path, &outcome.glb).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved GLB to {}", path.display());
    }
    if let Some(path) = stl {
        match &outcome.stl {
            Some(bytes) => {
                fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
                println!("Saved STL to {}", path.display());
            }
            None => println!("Input was already a mesh; no STL written"),
        }
    }
    if let Some(path) = json {
        outcome.write_report(path)?;
        println!("Saved report to {}", path.display());
    }

    Ok(())
}

fn report_failure(e: &ProcessError) {
    if let ProcessError::Convert(partscope::ConvertError::PipelineExhausted { failures }) = e {
        eprintln!("All converters failed:");
        for failure in failures {
            eprintln!("  - {failure}");
        }
    }
    let steps = e.remediation();
    if !steps.is_empty() {
        eprint!("{}", remediation_text(steps));
    }
}

fn print_metrics(m: &GeometricMetrics) {
    let [x, y, z] = m.dimensions_cm();
    println!();
    println!("Geometry");
    println!("  Vertices:     {}", m.vertex_count);
    println!("  Faces:        {}", m.face_count);
    println!("  Edges:        {}", m.edge_count);
    println!("  Euler number: {}", m.euler_number);
    println!("  Watertight:   {}", m.is_watertight);
    println!("  Convex:       {}", m.is_convex);
    println!("  Dimensions:   {x:.1} × {y:.1} × {z:.1} cm");
    println!("  Volume:       {:.2} mm³", m.volume);
    println!("  Surface area: {:.2} mm²", m.surface_area);
}

fn print_operations(operations: &[Operation]) {
    println!();
    println!("Operations");
    for op in operations {
        println!("  • {op}");
    }
}

fn print_cost(cost: &CostBreakdown) {
    println!();
    println!("Cost ({})", cost.material);
    println!("  Weight:        {:.3} kg", cost.weight_kg);
    println!("  Material:      ₹{:.2}", cost.material_cost);
    println!("  Manufacturing: ₹{:.2}", cost.manufacturing_cost);
    println!("  Total:         ₹{:.2}", cost.total_cost);
}
