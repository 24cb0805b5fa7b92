//! `CompatManager` - command line front end
//!
//! ```text
//! compat-manager [--machine] list
//! compat-manager [--machine] show <path>
//! compat-manager [--machine] set <path> <layer>...
//! compat-manager [--machine] clear <path>...
//! compat-manager decode <layer>...
//! compat-manager elevate
//! ```

use anyhow::{Context, Result, bail};
use compat_manager::{
    codec,
    config::ConfigManager,
    error::get_user_friendly_error,
    flags::RegistryToken,
    platform::{self, Elevation, OsVersion},
    registry::Hive,
    session::{SaveReport, Session},
    settings::{Category, SettingsEdit},
    utils,
};
use tracing::{error, info, warn};

const USAGE: &str = "\
Usage: compat-manager [--machine] <command> [args]

Commands:
  list                   List applications with stored layers
  show <path>            Show the settings of one application
  set <path> <layer>...  Replace the settings of one application
  clear <path>...        Remove the settings of applications
  decode <layer>...      Decode a layer string without touching the registry
  elevate                Restart as administrator

Options:
  --machine              Use the all-users list (requires administrator)";

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Show(String),
    Set { path: String, layer: String },
    Clear(Vec<String>),
    Decode(String),
    Elevate,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<(Hive, Command)> {
    let mut hive = Hive::CurrentUser;
    let mut words = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--machine" => hive = Hive::LocalMachine,
            "-h" | "--help" => bail!("{USAGE}"),
            _ => words.push(arg),
        }
    }

    let mut words = words.into_iter();
    let Some(name) = words.next() else {
        bail!("{USAGE}");
    };
    let rest: Vec<String> = words.collect();

    let command = match (name.as_str(), rest.as_slice()) {
        ("list", []) => Command::List,
        ("show", [path]) => Command::Show(path.clone()),
        ("set", [path, layer @ ..]) if !layer.is_empty() => Command::Set {
            path: path.clone(),
            layer: layer.join(" "),
        },
        ("clear", paths) if !paths.is_empty() => Command::Clear(paths.to_vec()),
        ("decode", layer) => Command::Decode(layer.join(" ")),
        ("elevate", []) => Command::Elevate,
        _ => bail!("{USAGE}"),
    };
    Ok((hive, command))
}

fn main() -> Result<()> {
    let _log_guard = utils::init_logging(&ConfigManager::get_data_dir())
        .context("Failed to initialize logging system")?;

    let (hive, command) = parse_args(std::env::args().skip(1))?;
    info!("Running {:?} on {:?}", command, hive);

    match run(hive, command) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            if let Some(compat) = e.downcast_ref::<compat_manager::CompatError>() {
                eprintln!("{}", get_user_friendly_error(compat));
            }
            Err(e)
        }
    }
}

fn run(hive: Hive, command: Command) -> Result<()> {
    match command {
        Command::Decode(layer) => {
            let os = OsVersion::detect().unwrap_or_else(|e| {
                warn!("Assuming Windows 10: {}", e);
                OsVersion::Windows10
            });
            let flags = codec::decode(layer.as_str(), os);
            println!("{}", serde_json::to_string_pretty(&flags)?);
            Ok(())
        }
        Command::Elevate => {
            match platform::elevate().context("Failed to restart as administrator")? {
                Elevation::Relaunched => println!("Restarted as administrator"),
                Elevation::Declined => println!("Elevation was declined"),
            }
            Ok(())
        }
        command => run_session(hive, command),
    }
}

fn run_session(hive: Hive, command: Command) -> Result<()> {
    let config = ConfigManager::load().context("Failed to load preferences")?;
    let mut session = Session::open(config).context("Failed to open the compatibility layers")?;
    let os = session.os();

    if session.list(hive).is_none() {
        bail!(
            "The {} list requires administrator rights (run `compat-manager elevate`)",
            hive.label()
        );
    }

    match command {
        Command::List => {
            for list in session.lists() {
                println!("[{}]", list.title());
                for app in list.applications() {
                    println!("  {}  {}", app.path(), app.registry_string(os));
                }
            }
        }
        Command::Show(path) => {
            let list = session.list(hive).context("List unavailable")?;
            let app = list
                .get(&path)
                .with_context(|| format!("{path} has no stored settings"))?;
            let settings = app.settings().lock().clone();
            println!("{}", app.path());
            println!("  layer:               {}", settings.to_registry_string(os));
            println!("  compatibility mode:  {}", settings.compatibility_mode().label());
            println!("  color mode:          {}", settings.color_mode().label());
            println!("  DPI scaling:         {}", settings.dpi_scaling().label());
            for category in Category::ALL {
                if let Some(flag) = category.flag() {
                    println!("  {:<20} {:?}", flag.label(), settings.checked(category));
                }
            }
            println!("  additional flags:    {}", settings.additional_flags().join(" "));
        }
        Command::Set { path, layer } => {
            session.select_all(hive, false)?;
            session.add_paths(hive, [path.clone()])?;
            session.select(hive, &path, true)?;
            session.edit(SettingsEdit::Replace(codec::decode(layer.as_str(), os)))?;
            report(&session.save_selected())?;
        }
        Command::Clear(paths) => {
            session.select_all(hive, false)?;
            for path in &paths {
                if !session.select(hive, path, true)? {
                    warn!("{} is not listed", path);
                }
            }
            if !session.is_any_selected() {
                bail!("None of the given applications have stored settings");
            }
            session.clear_selected()?;
            report(&session.save_selected())?;
        }
        Command::Decode(_) | Command::Elevate => {}
    }
    Ok(())
}

fn report(report: &SaveReport) -> Result<()> {
    for path in &report.written {
        println!("saved    {path}");
    }
    for path in &report.deleted {
        println!("removed  {path}");
    }
    for failure in &report.failed {
        eprintln!("failed   {}: {}", failure.path, failure.message);
    }
    if !report.is_success() {
        bail!("{} entries could not be saved", report.failed.len());
    }
    Ok(())
}
