use clap::Parser;
use deb_systemd::helper::{Helper, Verb};
use deb_systemd::layout::{Instance, Layout};
use deb_systemd::logging;
use deb_systemd::types::UnitName;
use log::LevelFilter;

const PROGRAM: &str = "deb-systemd-helper";

/// Enables, disables and masks systemd units on behalf of maintainer scripts
#[derive(Parser)]
#[command(name = PROGRAM, version, about, long_about = None)]
struct Cli {
    /// Don't print the result of is-enabled
    #[arg(long)]
    quiet: bool,

    /// Act on units of the user instance
    #[arg(long, conflicts_with = "system")]
    user: bool,

    /// Act on units of the system instance (default)
    #[arg(long)]
    system: bool,

    /// enable, disable, purge, mask, unmask, is-enabled, was-enabled,
    /// debian-installed, update-state or reenable
    action: Verb,

    #[arg(required = true)]
    units: Vec<UnitName>,
}

// --help and --version are not failures
fn parse_error_status(error: &clap::Error) -> i32 {
    if error.use_stderr() { 1 } else { 0 }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            std::process::exit(parse_error_status(&error));
        },
    };

    let level = if logging::env_flag("_DEB_SYSTEMD_HELPER_DEBUG") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    logging::init(PROGRAM, level);

    if std::env::var_os("DPKG_MAINTSCRIPT_PACKAGE").is_none() {
        log::warn!("This program should only be used from maintainer scripts");
    }

    let instance = if cli.user { Instance::User } else { Instance::System };
    let mut helper = Helper::new(Layout::from_env(instance));

    let success = helper.run_all(cli.action, &cli.units, cli.quiet, std::io::stdout());

    helper.reload_if_needed();

    if !success {
        std::process::exit(1);
    }
}
