use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;

use ngle_analyzer::config::{self, Config};
use ngle_analyzer::credentials::{
    CredentialStore, EnvironmentCredentials, FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, BUILTIN_FALLBACK,
};
use ngle_analyzer::tree::text_render::render_text_tree;
use ngle_analyzer::{logging, ui, ControllerState, InteractionController, ModelGateway, Outcome};

#[derive(Parser, Debug)]
#[command(name = "ngle-analyzer", version, about = "Analizador sintáctico del español según la NGLE")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Keep the credential in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the desktop analyzer (default)
    Gui,
    /// Analyze a sentence and print its tree
    Analyze {
        sentence: String,
        /// Print the raw analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a sentence matching the given criteria
    Generate { criteria: String },
    /// Save an API key for later runs
    SetKey { key: String },
    /// Forget the saved API key
    ClearKey,
    /// Show where the active API key comes from
    Status,
}

fn build_credentials(config: &Config, ephemeral: bool) -> CredentialStore {
    let storage: Box<dyn KeyValueStore> = if ephemeral {
        Box::new(MemoryKeyValueStore::new())
    } else {
        Box::new(FileKeyValueStore::new(config.credentials.resolved_storage_path()))
    };
    let fallback = config.credentials.fallback.clone().or_else(|| BUILTIN_FALLBACK.map(str::to_string));
    CredentialStore::initialize(storage, EnvironmentCredentials::from_process(&config.credentials.env_vars), fallback)
}

fn print_outcome(controller: &InteractionController, json: bool) -> Result<(), Box<dyn Error>> {
    match controller.state() {
        ControllerState::Success(Outcome::Analysis(analysis)) if json => {
            println!("{}", serde_json::to_string_pretty(analysis)?);
        }
        ControllerState::Success(Outcome::Analysis(analysis)) => print!("{}", render_text_tree(analysis)),
        ControllerState::Success(Outcome::Generated(sentence)) => println!("{}", sentence),
        ControllerState::Error(message) => return Err(message.clone().into()),
        ControllerState::Idle | ControllerState::Loading => {}
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = config::load_config_from_file(&args.config)?;
    let mut credentials = build_credentials(&config, args.ephemeral);
    let gateway = ModelGateway::from_config(&config)?;
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    match args.command.unwrap_or(Command::Gui) {
        Command::Gui => ui::run(credentials, gateway, runtime)?,
        Command::Analyze { sentence, json } => {
            let mut controller = InteractionController::new();
            runtime.block_on(controller.analyze(&gateway, credentials.resolve_active(), &sentence));
            print_outcome(&controller, json)?;
        }
        Command::Generate { criteria } => {
            let mut controller = InteractionController::new();
            runtime.block_on(controller.generate(&gateway, credentials.resolve_active(), &criteria));
            print_outcome(&controller, false)?;
        }
        Command::SetKey { key } => {
            credentials.configure(&key)?;
            println!("Clave API guardada.");
        }
        Command::ClearKey => {
            credentials.clear()?;
            match credentials.active_source() {
                Some(source) => println!("Clave guardada eliminada. Clave activa: {}", source),
                None => println!("Clave guardada eliminada. No hay ninguna clave activa."),
            }
        }
        Command::Status => {
            println!("Modelo: {} ({})", config.model.name, config.model.endpoint);
            match credentials.active_source() {
                Some(source) => println!("Clave activa: {}", source),
                None => println!("No hay ninguna clave API configurada."),
            }
        }
    }
    Ok(())
}
