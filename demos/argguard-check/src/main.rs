use std::path::{Path, PathBuf};

use argguard::{Guard, GuardConfig, MatcherSet, ParsedArgs, Schemas, Value, expr::ExprCache};
use clap::Parser as ClapParser;
use log::{debug, info};

/// Validate JSON call values against argguard schemas.
#[derive(ClapParser)]
pub struct Arguments {
    /// JSON file holding the call values (array or object)
    values: PathBuf,
    /// JSON file holding a schema object or a list of schemas
    schema: PathBuf,
    /// JSON object of extra aliases, e.g. `{"int|integer": "number"}`
    #[arg(long)]
    matchers: Option<PathBuf>,
    /// TOML configuration (defaults to the user configuration file when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Reject call values left over once a schema is satisfied
    #[arg(long)]
    strict: bool,
}

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)?;
    Ok(json.into())
}

fn load_config(path: Option<&Path>) -> Result<GuardConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(GuardConfig::load_from_toml(path)?),
        None => {
            let path = GuardConfig::default_path();
            if path.is_file() {
                debug!("Using configuration at {}", path.display());
                Ok(GuardConfig::load_from_toml(&path)?)
            } else {
                Ok(GuardConfig::default())
            }
        }
    }
}

fn run(args: &Arguments) -> Result<ParsedArgs, Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let mut guard = Guard::from_config(&config);
    if let Some(path) = &args.matchers {
        guard = guard.with(&MatcherSet::from_value(&read_json(path)?)?);
    }

    let values = read_json(&args.values)?;
    let schemas = Schemas::from_value_in(&read_json(&args.schema)?, &ExprCache::new())?;

    let parsed = if args.strict {
        guard.check_strict(&values, &schemas)?
    } else {
        guard.check(&values, &schemas)?
    };
    info!("Validated {} argument(s)", parsed.len());
    Ok(parsed)
}

fn main() {
    env_logger::init();
    let args = Arguments::parse();

    match run(&args) {
        Ok(parsed) => {
            let json: serde_json::Map<_, _> = parsed
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect();
            println!("{}", serde_json::Value::Object(json));
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    }
}
