use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use memsched_model::{
    PartitionLayout, Report, RunOutcome, Sim, SimConfig, SimEvent, SrtfScheduler,
    config::{DEFAULT_DEGREE, DEFAULT_MAX_PROCESSES, DEFAULT_MAX_TICKS, DEFAULT_OS_RESERVED_KB},
    io::read_jobs,
    memory::PartitionSpec,
    render,
    sim::{WorkloadParams, bernoulli_jobs},
};

/// Simulate fixed-partition memory allocation (best-fit) together with
/// preemptive SRTF scheduling, one tick at a time.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Process file: a header line, then `id,size,arrival,burst` rows.
    /// Without it a random workload is generated.
    #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
    file: Option<PathBuf>,

    /// Maximum number of processes to load from the file
    #[arg(long, default_value_t = DEFAULT_MAX_PROCESSES)]
    max_processes: usize,

    /// Degree of multiprogramming
    #[arg(short, long, default_value_t = DEFAULT_DEGREE)]
    degree: usize,

    /// Built-in partition layout
    #[arg(short, long, value_enum, default_value_t = PartitionLayout::Standard)]
    layout: PartitionLayout,

    /// Custom partition as `id,size,start`; repeat for each partition.
    /// Overrides --layout.
    #[arg(short, long = "partition")]
    partitions: Vec<PartitionSpec>,

    /// Memory reserved for the operating system, in KB (display only)
    #[arg(long, default_value_t = DEFAULT_OS_RESERVED_KB)]
    os_reserved: u64,

    /// Stop the simulation after this many ticks
    #[arg(long, default_value_t = DEFAULT_MAX_TICKS)]
    max_ticks: u64,

    /// Seed for the generated workload
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Wait for Enter after each arrival or termination
    #[arg(short, long)]
    step: bool,

    /// Only print the final report
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();
    let args = Args::parse();

    let mut config = SimConfig {
        degree: args.degree,
        max_ticks: args.max_ticks,
        os_reserved_kb: args.os_reserved,
        ..SimConfig::with_layout(args.layout)
    };
    if !args.partitions.is_empty() {
        config.partitions = args.partitions.clone();
    }
    config.validate().context("invalid configuration")?;

    let jobs = match &args.file {
        Some(path) => read_jobs(path, args.max_processes)
            .with_context(|| format!("failed to load processes from {}", path.display()))?,
        None => bernoulli_jobs(&WorkloadParams {
            seed: args.seed,
            max_jobs: args.max_processes,
            ..WorkloadParams::default()
        }),
    };

    if !args.quiet {
        println!("{}", render::job_table(&jobs));
    }

    let mut sim: Sim<SrtfScheduler> = Sim::new(jobs, &config).context("cannot start simulation")?;
    let stdin = io::stdin();

    let outcome = sim.run_with(|sim, events| {
        if args.quiet || !events.iter().any(SimEvent::is_milestone) {
            return;
        }
        // The events belong to the tick that just ended
        print_state(sim, sim.now() - 1, &config);
        if args.step
            && let Err(err) = pause(&stdin)
        {
            warn!("cannot wait for input: {err}");
        }
    });

    if let RunOutcome::Incomplete { max_ticks } = outcome {
        warn!("simulation incomplete after {max_ticks} ticks, statistics are partial");
        println!("Warning: simulation stopped at the {max_ticks} tick limit.");
    }

    if !args.quiet {
        print_state(&sim, sim.now(), &config);
    }
    println!("{}", render::report_table(&Report::from_sim(&sim)));
    Ok(())
}

fn print_state(sim: &Sim<SrtfScheduler>, now: u64, config: &SimConfig) {
    let memory = render::memory_table(&sim.memory_snapshot(), config.os_reserved_kb);
    println!("{}", render::time_header(now));
    println!("{memory}");
    println!("{}", render::queue_table(&sim.queue_snapshot()));
}

fn pause(stdin: &io::Stdin) -> io::Result<()> {
    print!("Press Enter to continue...");
    io::stdout().flush()?;
    stdin.lock().read_line(&mut String::new())?;
    Ok(())
}
