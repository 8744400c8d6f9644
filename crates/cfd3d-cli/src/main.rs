use std::fs;
use std::process::ExitCode;

use cfd3d::backend::{DistributedBackend, ExecutionContext, HaloChannel};
use cfd3d::io::{GeometryLoader, NoObstacles, VtkAsciiWriter};
use cfd3d::{parse_scenario_dat, CfdError, CfdResult, DeviceBackend, Driver, SharedMemoryBackend, SolverBackend};

const SCENARIO_DIRECTORY: &str = "scenarios/";
const OUTPUT_DIRECTORY: &str = "output/";

/// Parsed command line, defaults matching the reference `ArgumentParser`.
struct CliArgs {
    scenario: String,
    solver: String,
    output_format: String,
    num_particles: usize,
    trace_streamlines: bool,
    trace_streaklines: bool,
    trace_pathlines: bool,
    output: bool,
    iproc: usize,
    jproc: usize,
    kproc: usize,
}

impl Default for CliArgs {
    fn default() -> Self {
        CliArgs {
            scenario: "inflow_test".to_string(),
            solver: "cpp".to_string(),
            output_format: "vtk".to_string(),
            num_particles: 400,
            trace_streamlines: false,
            trace_streaklines: false,
            trace_pathlines: false,
            output: true,
            iproc: 1,
            jproc: 1,
            kproc: 1,
        }
    }
}

fn parse_bool(flag: &str, value: &str) -> CfdResult<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(CfdError::Config(format!("'{flag}' expects true/false, got '{other}'"))),
    }
}

fn parse_usize(flag: &str, value: &str) -> CfdResult<usize> {
    value.parse().map_err(|e| CfdError::Config(format!("'{flag}': {e}")))
}

/// Linear `--flag value` scan over the argument vector, mirroring the
/// reference `parseArguments`'s step-by-2 loop: a flag with no following
/// value is simply ignored, never a hard error, to stay fixture-compatible
/// with trailing stray flags.
fn parse_args(args: &[String]) -> CfdResult<CliArgs> {
    let mut parsed = CliArgs::default();
    let mut i = 0;
    while i + 1 < args.len() {
        let flag = args[i].as_str();
        let value = args[i + 1].as_str();
        match flag {
            "--scenario" => parsed.scenario = value.to_string(),
            "--solver" => parsed.solver = value.to_string(),
            "--outputformat" => parsed.output_format = value.to_string(),
            "--numparticles" => parsed.num_particles = parse_usize(flag, value)?,
            "--tracestreamlines" => parsed.trace_streamlines = parse_bool(flag, value)?,
            "--tracestreaklines" => parsed.trace_streaklines = parse_bool(flag, value)?,
            "--tracepathlines" => parsed.trace_pathlines = parse_bool(flag, value)?,
            "--output" => parsed.output = parse_bool(flag, value)?,
            "--iproc" => parsed.iproc = parse_usize(flag, value)?,
            "--jproc" => parsed.jproc = parse_usize(flag, value)?,
            "--kproc" => parsed.kproc = parse_usize(flag, value)?,
            // Deployment-only flags accepted and ignored: this build has
            // no OpenCL/CUDA/OMP-hybrid path to configure, and no
            // alternative linear solver to select between.
            "--linsolver" | "--blockSizeX" | "--blockSizeY" | "--blockSizeZ" | "--blockSize1D"
            | "--openclPlatformId" | "--numOmpHybridThreads" => {}
            other => return Err(CfdError::Config(format!("unknown flag '{other}'"))),
        }
        i += 2;
    }

    match parsed.output_format.as_str() {
        "vtk" | "vtk-binary" | "vtk-ascii" | "netcdf" => {}
        other => return Err(CfdError::Config(format!("invalid output format '{other}'"))),
    }

    Ok(parsed)
}

fn run(args: &CliArgs) -> CfdResult<()> {
    let scenario_path = format!("{SCENARIO_DIRECTORY}{}.dat", args.scenario);
    let text = fs::read_to_string(&scenario_path)
        .map_err(|e| CfdError::Config(format!("reading scenario file {scenario_path}: {e}")))?;
    let mut config = parse_scenario_dat(&args.scenario, &text)?;
    config.apply_real_float_eps_doubling();

    let dims = config.grid_dims();
    let flag = NoObstacles.load(dims)?;

    let output_dir = format!("{OUTPUT_DIRECTORY}{}", args.scenario);
    let mut writer = if args.output { Some(VtkAsciiWriter::new(&output_dir, &args.scenario)?) } else { None };

    let thread_count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let backend: Box<dyn SolverBackend> = match args.solver.as_str() {
        "cpp" => Box::new(SharedMemoryBackend::new(thread_count)),
        "mpi" => {
            if args.iproc * args.jproc * args.kproc != 1 {
                return Err(CfdError::Config(
                    "a multi-rank MPI launch is a deployment concern outside this binary; run with --iproc 1 --jproc 1 --kproc 1".to_string(),
                ));
            }
            let ctx = ExecutionContext::single_rank(dims, thread_count);
            Box::new(DistributedBackend::new(ctx, HaloChannel::new()))
        }
        "cuda" | "opencl" => Box::new(DeviceBackend::new()),
        other => return Err(CfdError::Config(format!("unknown solver '{other}'"))),
    };

    let mut driver = Driver::new(backend, flag, config)?;

    match &mut writer {
        Some(w) => driver.run(w)?,
        None => driver.run(&mut |_snapshot: &cfd3d::OutputSnapshot<'_>, _time: cfd3d::Real, _step: usize| Ok(()))?,
    }

    if args.trace_streamlines || args.trace_streaklines || args.trace_pathlines {
        let trajectories = driver.trace_streamlines(args.num_particles, 200);
        fs::create_dir_all(&output_dir).map_err(|e| CfdError::Config(format!("creating {output_dir}: {e}")))?;
        cfd3d::io::write_trajectories_obj(&trajectories, format!("{output_dir}/trace.obj"))?;
        cfd3d::io::write_trajectories_binlines(&trajectories, format!("{output_dir}/trace.binlines"))?;
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    let args = match parse_args(&raw_args) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::from(1);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}
