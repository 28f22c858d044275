// crates/stepfn-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::{rngs::StdRng, Rng as _, SeedableRng};
use std::io::Write as _;
use std::path::PathBuf;
use stepfn_core::{
    io::{read_samples_auto, write_samples_auto, Sample},
    io_jsonl::{stream_ops_jsonl, write_ops_jsonl, Op},
    FunctionMaxima,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "stepfn-cli",
    about = "stepfn reference CLI",
    long_about = "stepfn reference CLI.\n\nReplay op scripts against the maxima-tracking function container, dump function/maxima views, and evaluate single points.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Replay an op script (`.jsonl`/`.ndjson`) and write the resulting views
    Apply {
        /// Input op script path (JSONL/NDJSON)
        #[arg(long)]
        script: PathBuf,

        /// Output path for the function view (JSON/CBOR by extension)
        #[arg(long, default_value = "function.json")]
        out: PathBuf,

        /// Optional output path for the maxima view (JSON/CBOR)
        #[arg(long)]
        maxima_out: Option<PathBuf>,
    },

    /// Compute the maxima view of a samples file
    Maxima {
        /// Input samples path (JSON/CBOR)
        #[arg(long)]
        samples: PathBuf,

        /// Output path (JSON/CBOR); prints JSON to stdout if omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Evaluate the function of a samples file at one argument
    Eval {
        /// Input samples path (JSON/CBOR)
        #[arg(long)]
        samples: PathBuf,

        /// Argument to evaluate at
        #[arg(long)]
        arg: i64,
    },

    /// Generate a deterministic random op script for demos and benchmarks
    Simulate {
        /// Number of ops to generate (>0)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
        n: u32,

        /// Arguments are drawn from `0..max-arg` (>0)
        #[arg(long, default_value_t = 32)]
        max_arg: i64,

        /// Values are drawn from `-max-value..=max-value`
        #[arg(long, default_value_t = 100)]
        max_value: i64,

        /// Probability that an op is an erase rather than a set
        #[arg(long, default_value_t = 0.25)]
        erase_prob: f64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Output op script path
        #[arg(long, default_value = "ops.jsonl")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Apply {
            script,
            out,
            maxima_out,
        } => apply(&script, &out, maxima_out.as_deref()),

        Cmd::Maxima { samples, out } => maxima(&samples, out.as_deref()),

        Cmd::Eval { samples, arg } => eval(&samples, arg),

        Cmd::Simulate {
            n,
            max_arg,
            max_value,
            erase_prob,
            seed,
            out,
        } => simulate(n, max_arg, max_value, erase_prob, seed, &out),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn apply(script: &std::path::Path, out: &std::path::Path, maxima_out: Option<&std::path::Path>) -> Result<()> {
    let mut f = FunctionMaxima::new();
    let (mut sets, mut erases) = (0u64, 0u64);

    for op in stream_ops_jsonl::<i64, i64, _>(script)? {
        let op = op.with_context(|| format!("replaying {}", script.display()))?;
        match op {
            Op::Set { .. } => sets += 1,
            Op::Erase { .. } => erases += 1,
        }
        op.apply(&mut f);
    }
    info!(sets, erases, points = f.len(), "replayed op script");

    write_samples_auto(out, &f.to_samples())
        .with_context(|| format!("writing function view to {}", out.display()))?;
    info!(out = %out.display(), "wrote function view");

    if let Some(mx_out) = maxima_out {
        write_samples_auto(mx_out, &f.maxima_samples())
            .with_context(|| format!("writing maxima view to {}", mx_out.display()))?;
        info!(out = %mx_out.display(), "wrote maxima view");
    }
    Ok(())
}

fn maxima(samples: &std::path::Path, out: Option<&std::path::Path>) -> Result<()> {
    let f = load_function(samples)?;
    let mx = f.maxima_samples();
    info!(points = f.len(), maxima = mx.len(), "computed maxima view");

    match out {
        Some(path) => write_samples_auto(path, &mx)
            .with_context(|| format!("writing maxima view to {}", path.display())),
        None => {
            let stdout = std::io::stdout();
            let mut w = stdout.lock();
            serde_json::to_writer_pretty(&mut w, &mx).with_context(|| "serialize maxima view")?;
            writeln!(w).with_context(|| "write trailing newline")
        }
    }
}

fn eval(samples: &std::path::Path, arg: i64) -> Result<()> {
    let f = load_function(samples)?;
    let value = f
        .value_at(&arg)
        .with_context(|| format!("no point at argument {arg}"))?;
    println!("{value}");
    Ok(())
}

fn simulate(
    n: u32,
    max_arg: i64,
    max_value: i64,
    erase_prob: f64,
    seed: u64,
    out: &std::path::Path,
) -> Result<()> {
    if max_arg <= 0 {
        bail!("--max-arg must be positive (got {max_arg})");
    }
    if max_value < 0 {
        bail!("--max-value must be non-negative (got {max_value})");
    }
    if !(0.0..=1.0).contains(&erase_prob) {
        bail!("--erase-prob must lie in [0, 1] (got {erase_prob})");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut ops = Vec::with_capacity(n as usize);
    for _ in 0..n {
        let arg = rng.random_range(0..max_arg);
        if rng.random_bool(erase_prob) {
            ops.push(Op::Erase { arg });
        } else {
            let value = rng.random_range(-max_value..=max_value);
            ops.push(Op::Set { arg, value });
        }
    }

    info!(n, max_arg, max_value, erase_prob, seed, "generated op script");
    write_ops_jsonl(out, &ops).with_context(|| format!("writing op script to {}", out.display()))?;
    info!(out = %out.display(), "wrote op script");
    Ok(())
}

fn load_function(samples: &std::path::Path) -> Result<FunctionMaxima<i64, i64>> {
    let samples: Vec<Sample<i64, i64>> = read_samples_auto(samples)?;
    Ok(samples.into_iter().map(|s| (s.arg, s.value)).collect())
}
