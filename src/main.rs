// Copyright (c) 2026, Chad Hogan
// All rights reserved.
//
// This source code is licensed under the BSD-3-Clause license found in the
// LICENSE file in the root directory of this source tree.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;

use tof_reorder::grid::{cartesian_2d, x_face, GridTopology};
use tof_reorder::io;
use tof_reorder::solver::{CyclicStrategy, TofSolver};

#[derive(Parser)]
#[command(name = "tof-reorder", about = "Reorder-based time-of-flight solver")]
struct Cli {
    /// Grid size as nx,ny (2D Cartesian driver grid)
    #[arg(short = 's', long)]
    size: String,

    /// Flux field: "uniform-x:<q>" (uniform +x flow with matching edge
    /// sources/sinks) or "file:<path>" (.npy, one signed value per face)
    #[arg(long, default_value = "uniform-x:1.0")]
    flux: String,

    /// Pore volume field: "uniform:<v>" or "file:<path>"
    #[arg(long, default_value = "uniform:1.0")]
    porevolume: String,

    /// Source term file (.npy, one value per cell); required with
    /// "--flux file:", synthesized for "--flux uniform-x:"
    #[arg(long)]
    source: Option<PathBuf>,

    /// Enable the multidimensional upwind correction
    #[arg(long)]
    multidim_upwind: bool,

    /// Strategy for cyclic (recirculating) components
    #[arg(long, value_enum, default_value = "single-pass")]
    cyclic: CyclicArg,

    /// Output file path (.npy)
    #[arg(short = 'o', long, default_value = "tof.npy")]
    output: PathBuf,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum CyclicArg {
    /// Single approximate upwind pass (never fails)
    SinglePass,
    /// Exact per-component linear solve
    Linear,
}

fn parse_size(s: &str) -> Result<(usize, usize)> {
    let parts: Vec<usize> = s
        .split(',')
        .map(|p| p.trim().parse::<usize>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("invalid --size: expected comma-separated integers")?;
    if parts.len() != 2 {
        bail!("--size has {} components but the driver grid is 2D", parts.len());
    }
    if parts[0] == 0 || parts[1] == 0 {
        bail!("--size components must be positive");
    }
    Ok((parts[0], parts[1]))
}

/// Uniform flow in +x across every interior x-face, with injection along the
/// left cell column and extraction along the right so sources balance.
fn uniform_x_problem(nx: usize, ny: usize, q: f64, num_faces: usize) -> (Vec<f64>, Vec<f64>) {
    let mut flux = vec![0.0; num_faces];
    for j in 0..ny {
        for i in 1..nx {
            flux[x_face(nx, i, j)] = q;
        }
    }
    let mut source = vec![0.0; nx * ny];
    for j in 0..ny {
        source[nx * j] = q;
        source[nx * j + nx - 1] = -q;
    }
    (flux, source)
}

fn build_flux_and_source(cli: &Cli, nx: usize, ny: usize, num_faces: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if let Some(q_str) = cli.flux.strip_prefix("uniform-x:") {
        let q: f64 = q_str.parse().context("invalid uniform-x flux value")?;
        if !q.is_finite() || q <= 0.0 {
            bail!("uniform-x flux must be positive and finite, got {}", q);
        }
        if cli.source.is_some() {
            bail!("--source is synthesized by 'uniform-x:' flux; use '--flux file:' to supply both");
        }
        return Ok(uniform_x_problem(nx, ny, q, num_faces));
    }

    if let Some(path_str) = cli.flux.strip_prefix("file:") {
        let flux = io::load_field(Path::new(path_str), "flux", num_faces)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let source_path = cli
            .source
            .as_ref()
            .context("--source <path.npy> is required with '--flux file:'")?;
        let source = io::load_field(source_path, "source", nx * ny)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        return Ok((flux, source));
    }

    bail!(
        "unknown --flux mode: '{}'. Expected 'uniform-x:<q>' or 'file:<path>'",
        cli.flux
    );
}

fn build_pore_volume(mode: &str, num_cells: usize) -> Result<Vec<f64>> {
    if let Some(val_str) = mode.strip_prefix("uniform:") {
        let val: f64 = val_str.parse().context("invalid uniform pore volume")?;
        if !val.is_finite() || val <= 0.0 {
            bail!("uniform pore volume must be positive and finite, got {}", val);
        }
        return Ok(vec![val; num_cells]);
    }
    if let Some(path_str) = mode.strip_prefix("file:") {
        return io::load_field(Path::new(path_str), "pore_volume", num_cells)
            .map_err(|e| anyhow::anyhow!("{}", e));
    }
    bail!(
        "unknown --porevolume mode: '{}'. Expected 'uniform:<v>' or 'file:<path>'",
        mode
    );
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let (nx, ny) = parse_size(&cli.size)?;

    let grid = cartesian_2d(nx, ny);
    let (flux, source) = build_flux_and_source(&cli, nx, ny, grid.num_faces())?;
    let pore_volume = build_pore_volume(&cli.porevolume, grid.num_cells())?;

    let solver = TofSolver::new()
        .with_multidim_upwind(cli.multidim_upwind)
        .with_cyclic_strategy(match cli.cyclic {
            CyclicArg::SinglePass => CyclicStrategy::SinglePass,
            CyclicArg::Linear => CyclicStrategy::Linear,
        });

    let tof = solver
        .solve(&grid, &flux, &pore_volume, &source)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let (min, max) = tof
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| {
            (lo.min(t), hi.max(t))
        });
    log::info!("solved {} cells: tof range [{}, {}]", tof.len(), min, max);

    io::save_field(&cli.output, &tof, &[ny, nx]).map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
