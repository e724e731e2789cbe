use std::path::PathBuf;
use clap::{ArgAction, Parser};
use deb_systemd::debhelper::{Debhelper, Selection};
use deb_systemd::logging;
use deb_systemd::systemd_enable::{self, Options, TOOL_NAME};
use deb_systemd::types::PackageName;
use log::LevelFilter;

/// Adds maintainer script fragments enabling the systemd units of a package
#[derive(Parser)]
#[command(name = TOOL_NAME, version, about, long_about = None)]
struct Cli {
    /// Act on the given package (may be repeated)
    #[arg(short = 'p', long = "package", action = ArgAction::Append)]
    packages: Vec<PackageName>,

    /// Don't act on the given package (may be repeated)
    #[arg(short = 'N', long = "no-package", action = ArgAction::Append)]
    excluded: Vec<PackageName>,

    /// Act on architecture independent packages
    #[arg(short = 'i', long)]
    indep: bool,

    /// Act on architecture dependent packages
    #[arg(short = 'a', long)]
    arch: bool,

    /// Only update the state on upgrades instead of enabling new units
    #[arg(long)]
    no_enable: bool,

    /// Look for debian/<package>.<name>.<suffix> instead of debian/<package>.<suffix>
    #[arg(long)]
    name: Option<String>,

    /// Don't modify maintainer scripts
    #[arg(short = 'n', long)]
    noscripts: bool,

    /// Show what would be done without changing anything
    #[arg(long)]
    no_act: bool,

    /// Print every file written
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Directory containing the packaging files
    #[arg(long, default_value = "debian", hide = true)]
    debian_dir: PathBuf,

    /// Additional unit files, relative to the package build directory
    units: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let no_act = cli.no_act || logging::env_flag("DH_NO_ACT");
    let verbose = cli.verbose || logging::env_flag("DH_VERBOSE");
    // no-act reports what would be done at info level
    logging::init(TOOL_NAME, if verbose || no_act { LevelFilter::Info } else { LevelFilter::Warn });

    let debhelper = match Debhelper::load(&cli.debian_dir) {
        Ok(debhelper) => debhelper.no_act(no_act),
        Err(error) => {
            logging::report_error(&error);
            std::process::exit(1);
        },
    };

    let options = Options {
        selection: Selection {
            packages: cli.packages,
            excluded: cli.excluded,
            indep: cli.indep,
            arch: cli.arch,
        },
        no_enable: cli.no_enable,
        name: cli.name,
        no_scripts: cli.noscripts,
        units: cli.units,
    };

    if let Err(error) = systemd_enable::run(&debhelper, &options) {
        logging::report_error(&error);
        std::process::exit(1);
    }
}
