// Differential fuzzer for the raster-pipe backends.
//
// Usage:
//   parity-fuzz simple [options]   render every category on one backend
//   parity-fuzz mt [options]       single-threaded vs multi-threaded
//   parity-fuzz jit [options]      reference kernel vs SIMD pipelines
//   parity-fuzz --help

use std::process;

use anyhow::Context;
use parity_fuzz::options::SimdSelection;
use parity_fuzz::{CampaignController, CmdLine, ConfigError, FuzzerCommand, FuzzerMode, FuzzerOptions, FuzzerStyle};
use raster_pipe::{cpu, SimdLevel};

fn main() -> anyhow::Result<()> {
    let cmd = CmdLine::new(std::env::args().skip(1));
    let mode = cmd.positional().map(|m| FuzzerMode::parse(m).ok_or_else(|| ConfigError::UnknownMode(m.into())));

    if cmd.has_arg("--help") {
        print_usage(mode.and_then(Result::ok));
        return Ok(());
    }

    let mode = match mode {
        Some(mode) => mode?,
        None => {
            print_usage(None);
            return Err(ConfigError::MissingMode.into());
        }
    };
    let options = FuzzerOptions::parse(mode, &cmd).context("failed to process command line arguments")?;

    parity_fuzz::logging::init(options.verbose);
    print_banner(mode, &options);

    let summary = CampaignController::new(mode, options)
        .run()
        .context("campaign aborted")?;
    println!("{}", summary);

    let code = summary.exit_code();
    if code != 0 {
        process::exit(code);
    }
    Ok(())
}

fn print_banner(mode: FuzzerMode, options: &FuzzerOptions) {
    println!(
        "parity-fuzz {} ({}) [use --help for command line options]",
        mode.name(),
        env!("CARGO_PKG_VERSION")
    );
    println!("  Size       : {}x{}", options.width, options.height);
    println!("  Count      : {}", options.count);
    println!("  Seed       : {}", options.seed);
    println!("  Command    : {}", options.command);
    println!("  Style      : {}", options.style);
    match mode {
        FuzzerMode::Mt | FuzzerMode::Simple => println!("  Threads    : {}", options.thread_count),
        FuzzerMode::Jit => println!("  SIMD level : {} (detected {})", options.simd.name(), SimdLevel::native()),
    }
    println!();
}

fn print_usage(mode: Option<FuzzerMode>) {
    let defaults = FuzzerOptions::defaults(mode.unwrap_or(FuzzerMode::Simple));

    println!("Usage:");
    println!("  parity-fuzz <mode> [options]");
    println!();
    println!("Modes:");
    for m in FuzzerMode::ALL {
        println!("  {:<22} - {}", m.name(), m.description());
    }
    println!();

    println!("Common Fuzzer Options:");
    println!("  --width=<uint>         - Image width                       [default={}]", defaults.width);
    println!("  --height=<uint>        - Image height                      [default={}]", defaults.height);
    println!("  --count=<uint>         - Count of render commands          [default={}]", defaults.count);
    println!("  --thread-count=<uint>  - Number of threads of MT renderer  [default={}]", defaults.thread_count);
    println!("  --seed=<uint>          - Random number generator seed      [default={}]", defaults.seed);
    println!("  --command=<string>     - Specify which command to run      [default={}]", defaults.command);
    println!("  --style=<string>       - Style to render commands with     [default={}]", defaults.style);
    println!("  --store                - Write resulting images to files   [default={}]", defaults.store_images);
    println!("  --output=<dir>         - Directory for stored images       [default={}]", defaults.output_dir.display());
    println!("  --verbose              - Debug each render command         [default={}]", defaults.verbose);
    println!("  --flush-sync           - Do occasional syncs between calls [default={}]", defaults.flush_sync);
    println!();

    println!("JIT Fuzzer Options:");
    println!("  --simd-level=<name>    - SIMD level                        [default={}]", SimdSelection::All.name());
    println!();
    println!("JIT SIMD Levels ({}):", std::env::consts::ARCH);
    for level in SimdLevel::ladder() {
        let note = if level.is_supported() { "" } else { " (not available)" };
        println!("  {:<22} - {}{}", level.name(), level.description(), note);
    }
    println!("  {:<22} - Execute all supported SIMD levels ({})", "all", cpu::supported_levels().len());
    println!("  {:<22} - Uses features detected at runtime", "native");
    println!();

    println!("Fuzzer Commands:");
    for c in FuzzerCommand::CATEGORIES.into_iter().chain([FuzzerCommand::All]) {
        println!("  {:<22} - {}", c.name(), c.description());
    }
    println!();

    println!("Fuzzer Styles:");
    for s in FuzzerStyle::ALL {
        println!("  {:<22} - {}", s.name(), s.description());
    }
}
