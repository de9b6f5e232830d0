use clap::Parser;
use favsort::reorder::{
    reorder_file, Operation, ReorderOptions, DEFAULT_CORRECTIONS_PATH, DEFAULT_FAVORITES_PATH,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "favsort",
    version,
    about = "Shuffle or sort the favorites list on handheld retro consoles",
    after_help = "The file is modified in-place; no backups are made. Use at your own risk!"
)]
struct Cli {
    /// Sort the favorites list (default)
    #[arg(long, overrides_with = "shuffle")]
    sort: bool,
    /// Shuffle the favorites list
    #[arg(long, overrides_with = "sort")]
    shuffle: bool,
    /// Arcade title table used to correct names when sorting
    #[arg(long, value_name = "CSV", default_value = DEFAULT_CORRECTIONS_PATH)]
    corrections: PathBuf,
    /// Sort by file names only, without title corrections
    #[arg(long, conflicts_with = "corrections")]
    no_corrections: bool,
    /// Log debug diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
    /// Favorites file to rewrite
    #[arg(value_name = "FILE", default_value = DEFAULT_FAVORITES_PATH)]
    file: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let operation = if cli.shuffle { Operation::Shuffle } else { Operation::Sort };
    let options = ReorderOptions {
        corrections_path: (!cli.no_corrections).then_some(cli.corrections),
    };

    if let Err(err) = reorder_file(&cli.file, operation, &options) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
