//! Command-line planner: generate a scene, place modules, analyze
//! visibility, and write the deployment plan with per-pair link metrics.

use anyhow::{Context, anyhow};
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};
use serde::Serialize;
use std::path::PathBuf;

use citylink_planner::geometry::GeometryKernel;
use citylink_planner::interchange::DeploymentPlan;
use citylink_planner::link_budget::LinkBudgetModel;
use citylink_planner::{PlannerConfig, generator, placement, visibility};

#[derive(Parser, Debug)]
#[command(name = "citylink-planner", version, about = "Plan wireless module deployment in a generated urban scene")]
struct Args {
    /// Path to the run configuration (TOML)
    #[arg(long, default_value = "planner.toml")]
    config: PathBuf,

    /// Override the configured RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the resulting plan and metrics (JSON)
    #[arg(long, default_value = "deployment_plan.json")]
    output: PathBuf,
}

/// Per-pair metric row in the output report.
#[derive(Serialize)]
struct PairReport {
    a: usize,
    b: usize,
    line_of_sight: bool,
    distance: f64,
    propagation_delay: f64,
    sensitivity: f64,
    link_budget: f64,
}

#[derive(Serialize)]
struct ObstacleReport {
    x: f64,
    y: f64,
    width: f64,
    depth: f64,
    height: f64,
}

/// Full run output: positions, obstacles, and per-pair link metrics.
#[derive(Serialize)]
struct RunReport {
    plan: DeploymentPlan,
    obstacles: Vec<ObstacleReport>,
    pairs: Vec<PairReport>,
}

fn main() -> anyhow::Result<()> {
    // Logging setup
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("citylink_planner"), LevelFilter::Debug)
        .init();

    let args = Args::parse();
    let config = PlannerConfig::load(&args.config)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("loading {}", args.config.display()))?;
    let seed = args.seed.or(config.seed);
    match seed {
        Some(seed) => info!("running with seed {}", seed),
        None => info!("running with a fresh seed"),
    }

    let scene = generator::generate(&config.obstacles, seed).context("obstacle generation failed")?;
    let bounds = scene.mesh.bounds().context("scene mesh has no bounds")?;

    let nodes = placement::place_modules(&scene.mesh, &bounds, config.nodes.modules, config.nodes.max_attempts, seed)
        .context("module placement failed")?;

    let report = visibility::analyze(&scene.mesh, &nodes).context("visibility analysis failed")?;
    info!(
        "{} of {} pairs have line of sight",
        report.matrix.connected_pair_count(),
        report.pairs.len()
    );

    let model = LinkBudgetModel::new(config.radio.clone()).context("invalid radio parameters")?;
    info!(
        "sensitivity {:.2} dBm, link budget {:.2} dB",
        model.sensitivity(),
        model.link_budget()
    );
    let metrics = model.evaluate(&report);
    for m in &metrics {
        info!(
            "pair ({}, {}): {} distance {:.2}, delay {:.6} s",
            m.a,
            m.b,
            if m.line_of_sight { "LOS" } else { "blocked" },
            m.distance,
            m.propagation_delay
        );
    }

    let run_report = RunReport {
        plan: DeploymentPlan::from_nodes(&nodes),
        obstacles: scene
            .obstacles
            .iter()
            .map(|o| ObstacleReport {
                x: o.x,
                y: o.y,
                width: o.width,
                depth: o.depth,
                height: o.height,
            })
            .collect(),
        pairs: metrics
            .iter()
            .map(|m| PairReport {
                a: m.a,
                b: m.b,
                line_of_sight: m.line_of_sight,
                distance: m.distance,
                propagation_delay: m.propagation_delay,
                sensitivity: m.sensitivity,
                link_budget: m.link_budget,
            })
            .collect(),
    };
    let json = serde_json::to_string_pretty(&run_report)?;
    std::fs::write(&args.output, json).with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "wrote plan for {} modules to {}",
        run_report.plan.modules.len(),
        args.output.display()
    );

    Ok(())
}
