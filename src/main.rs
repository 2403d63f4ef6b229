use clap::{Parser, Subcommand};
use std::path::PathBuf;
use theme_harvest::fetch::{DirectoryPersister, GitFetcher, LocalFetcher};
use theme_harvest::{config, manifest, output, pipeline};
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the log filter (e.g. `theme_harvest=debug`).
const LOG_ENV: &str = "THEME_HARVEST_LOG";

#[derive(Parser)]
#[command(name = "theme-harvest")]
#[command(about = "Collect terminal color themes into one deduplicated Qt resource bundle")]
#[command(long_about = "\
Collect terminal color themes into one deduplicated Qt resource bundle

Themes come from several upstream collections, listed in themes.toml in
priority order. Two files are the same theme when their names match after
dropping the extension, case, and punctuation; the first source wins.

Project layout:

  project/
  ├── themes.toml                  # Sources and paths (optional)
  ├── KodoTermThemes.qrc           # Generated manifest
  └── KodoTermThemes/
      ├── konsole/                 # *.colorscheme (highest priority)
      ├── windowsterminal/         # *.json
      └── iterm/                   # *.itermcolors (only themes not found above)

Run 'theme-harvest gen-config' to print a documented themes.toml.")]
#[command(version)]
struct Cli {
    /// Project root holding themes.toml, the themes directory and the manifest
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deduplicate the local theme directories and write the manifest
    Build,
    /// Verify the committed manifest matches the local theme directories
    Check {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download all sources, replace the local theme directories, write the manifest
    Sync,
    /// Print a stock themes.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Build => {
            let config = config::load_config(&cli.root)?;
            let manifest_path = config.manifest_path(&cli.root);
            let mut fetcher = LocalFetcher::new(&cli.root, &config);
            let result = pipeline::build(&cli.root, &config, &mut fetcher)?;
            manifest::write(&manifest_path, &result.manifest)?;
            output::print_report(&result.summary);
            println!("==> Wrote {}", manifest_path.display());
        }
        Command::Check { json } => {
            let config = config::load_config(&cli.root)?;
            let manifest_path = config.manifest_path(&cli.root);
            let mut fetcher = LocalFetcher::new(&cli.root, &config);
            let result = pipeline::build(&cli.root, &config, &mut fetcher)?;
            if json {
                println!("{}", output::summary_json(&result.summary)?);
            } else {
                output::print_report(&result.summary);
            }
            manifest::check(&manifest_path, &result.manifest)?;
            eprintln!("==> {} is up to date", manifest_path.display());
        }
        Command::Sync => {
            let config = config::load_config(&cli.root)?;
            let manifest_path = config.manifest_path(&cli.root);
            let mut fetcher = GitFetcher::new(config.work_dir_path(&cli.root))?;
            let mut persister = DirectoryPersister::new(&cli.root, &config);
            println!("==> Fetching {} sources", config.sources.len());
            let result = pipeline::sync(&cli.root, &config, &mut fetcher, &mut persister);
            // The work dir goes away whether or not the sync succeeded.
            let cleanup = fetcher.cleanup();
            let result = result?;
            cleanup?;
            manifest::write(&manifest_path, &result.manifest)?;
            output::print_report(&result.summary);
            println!("==> Wrote {}", manifest_path.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber.
///
/// `THEME_HARVEST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "theme_harvest=warn",
        1 => "theme_harvest=info",
        _ => "theme_harvest=debug",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
