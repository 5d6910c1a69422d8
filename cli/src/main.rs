//! `cireg`: inspect descriptor dumps and build configuration items offline

mod commands;
mod config;

use anyhow::{Context, Result};
use cireg_core::DescriptorRegistryClient;
use cireg_registry::{SessionRegistry, StaticBackend};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use commands::Category;
use config::CliConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

fn cli() -> Command {
    Command::new("cireg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Configuration item registry client")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with a [server] table and a descriptors path"),
        )
        .arg(
            Arg::new("descriptors")
                .long("descriptors")
                .short('d')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Descriptor dump (.json, .yaml, .yml); overrides the config file"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON on stderr"),
        )
        .subcommand(
            Command::new("types")
                .about("List deployable types of a category")
                .arg(
                    Arg::new("category")
                        .required(true)
                        .value_parser(Category::NAMES)
                        .help("artifacts, resources or embedded"),
                ),
        )
        .subcommand(
            Command::new("properties")
                .about("List property names of a type")
                .arg(Arg::new("type").required(true).help("Type name, e.g. jee.War"))
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include hidden, tags and embedded properties"),
                ),
        )
        .subcommand(
            Command::new("build")
                .about("Build a configuration item and print it as JSON")
                .arg(Arg::new("type").required(true).help("Type name"))
                .arg(Arg::new("id").required(true).help("Item id"))
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .value_name("NAME=VALUE")
                        .help("Set a property from a raw string"),
                )
                .arg(
                    Arg::new("embed")
                        .long("embed")
                        .action(ArgAction::Append)
                        .value_name("TYPE:ID")
                        .help("Build and embed a child item"),
                ),
        )
        .subcommand(Command::new("descriptors").about("List every loaded type"))
}

fn init_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let layer = if json { layer.json().boxed() } else { layer.boxed() };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

fn client(matches: &ArgMatches) -> Result<DescriptorRegistryClient> {
    let config_path = matches.get_one::<PathBuf>("config");
    let config = match config_path {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };

    let dump = matches
        .get_one::<PathBuf>("descriptors")
        .cloned()
        .or_else(|| config.descriptors_path(config_path.and_then(|path| path.parent())))
        .context("no descriptor dump given; pass --descriptors or set `descriptors` in the config file")?;

    let backend = StaticBackend::from_path(&dump).with_context(|| format!("loading {}", dump.display()))?;
    tracing::debug!(key = %config.server.masked_key(), dump = %dump.display(), "Loaded descriptor dump");

    Ok(DescriptorRegistryClient::new(
        config.server,
        Arc::new(backend),
        Arc::new(SessionRegistry::new()),
    ))
}

fn run(matches: &ArgMatches) -> Result<()> {
    let client = client(matches)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match matches.subcommand() {
        Some(("types", args)) => {
            let category = args.get_one::<String>("category").map_or("", String::as_str);
            commands::types(&client, Category::parse(category)?, &mut out)
        }
        Some(("properties", args)) => {
            let type_name = args.get_one::<String>("type").map_or("", String::as_str);
            commands::properties(&client, type_name, args.get_flag("all"), &mut out)
        }
        Some(("build", args)) => {
            let type_name = args.get_one::<String>("type").map_or("", String::as_str);
            let id = args.get_one::<String>("id").map_or("", String::as_str);
            let values = |name: &str| -> Vec<String> {
                args.get_many::<String>(name).into_iter().flatten().cloned().collect()
            };
            commands::build(&client, type_name, id, &values("set"), &values("embed"), &mut out)
        }
        Some(("descriptors", _)) => commands::descriptors(&client, &mut out),
        _ => Ok(()),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("json-logs"));
    run(&matches)
}
