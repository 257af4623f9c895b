use clap::Parser;
use mimalloc::MiMalloc;
use std::path::PathBuf;

use vcfaf::{Config, Extractor, MalformedPolicy, PopulationKey};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Extract per-population allele frequencies from every *.vcf.gz in a directory
/// into a single tab-separated table (SNP, CHR, REF, ALT, AF_ref).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Population code: ALL for the pooled AF, otherwise e.g. EUR to read EUR_AF.
    population: String,

    /// Directory holding the *.vcf.gz files. Files are read in byte-wise name order.
    input_dir: PathBuf,

    /// Output path; use '-' for stdout. Paths ending in .gz are BGZF-compressed.
    output: String,

    /// Number of htslib decompression threads.
    #[arg(short, long, default_value_t = 1)]
    threads: u32,

    /// Warn about and skip data lines with fewer than 8 columns instead of aborting.
    #[arg(long)]
    skip_malformed: bool,
}

fn run(cli: Cli) -> vcfaf::Result<()> {
    let config = Config {
        key: PopulationKey::new(&cli.population)?,
        input_dir: cli.input_dir,
        output: cli.output,
        threads: cli.threads,
        malformed: if cli.skip_malformed {
            MalformedPolicy::Skip
        } else {
            MalformedPolicy::Abort
        },
    };
    log::debug!("extracting {} with {:?}", config.key, config.malformed);
    Extractor::new(config)?.run()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
