use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use geoloc_core::{Location, LocationError, LocationResolver, Settings, SettingsStore};
use inquire::{Select, Text};
use std::path::PathBuf;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoloc", version, about = "Resolve place names to coordinates")]
pub struct Cli {
    /// Settings file to use instead of the per-user default.
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enter the OpenWeather and OpenUV API keys.
    Configure,

    /// List locations matching a place name.
    Find {
        /// Place name, e.g. "Warsaw" or "Portland,US".
        name: String,

        /// Maximum number of matches to request (0 = default).
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Include the state/region in the output.
        #[arg(long)]
        state: bool,
    },

    /// Resolve a place name and store it as the default location.
    SetDefault {
        /// Place name, e.g. "Warsaw" or "Portland,US".
        name: String,

        /// Maximum number of matches to request (0 = default).
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },

    /// Show the stored settings (keys are never printed).
    Show,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let store = match self.settings {
            Some(path) => SettingsStore::new(path),
            None => SettingsStore::at_default_path()?,
        };

        match self.command {
            Command::Configure => configure(&store),
            Command::Find { name, limit, state } => {
                let settings = store.load_or_default()?;
                let Some(found) = lookup(&settings, &name, limit).await? else {
                    return Ok(());
                };

                for loc in &found {
                    println!("{}  ({:.4}, {:.4})", loc.display_name(state), loc.lat, loc.lon);
                }
                Ok(())
            }
            Command::SetDefault { name, limit } => {
                let mut settings = store.load_or_default()?;
                let Some(found) = lookup(&settings, &name, limit).await? else {
                    return Ok(());
                };

                let chosen = pick_location(found)?;
                println!("Default location set to {}", chosen.display_name(true));
                settings.default_location = Some(chosen);
                store.save(&settings)
            }
            Command::Show => {
                let settings = store.load_or_default()?;
                show(&store, &settings);
                Ok(())
            }
        }
    }
}

/// Runs the query; `Ok(None)` means nothing matched and the user was told so.
async fn lookup(settings: &Settings, name: &str, limit: usize) -> Result<Option<Vec<Location>>> {
    if !settings.has_open_weather_key() {
        return Err(anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `geoloc configure` and enter your API key."
        ));
    }

    let resolver = LocationResolver::openweather(settings.open_weather_key.clone());

    match resolver.find_location(name, limit).await {
        Ok(found) => Ok(Some(found)),
        Err(LocationError::NotFound) => {
            eprintln!(
                "No location matches '{name}'. \
                 Try a more specific name, e.g. 'City,Country'."
            );
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to look up '{name}'")),
    }
}

fn pick_location(mut found: Vec<Location>) -> Result<Location> {
    if found.len() == 1 {
        return Ok(found.remove(0));
    }

    Select::new("Several places match, pick one:", found)
        .prompt()
        .context("No location selected")
}

fn configure(store: &SettingsStore) -> Result<()> {
    let mut settings = store.load_or_default()?;

    settings.open_weather_key = Text::new("OpenWeather API key:")
        .with_default(&settings.open_weather_key)
        .prompt()
        .context("Failed to read OpenWeather API key")?;

    settings.open_uv_key = Text::new("OpenUV API key:")
        .with_default(&settings.open_uv_key)
        .prompt()
        .context("Failed to read OpenUV API key")?;

    store.save(&settings)?;
    println!("Settings saved to {}", store.path().display());

    Ok(())
}

fn show(store: &SettingsStore, settings: &Settings) {
    let configured = |set: bool| if set { "configured" } else { "missing" };

    println!("Settings file:    {}", store.path().display());
    println!("OpenWeather key:  {}", configured(settings.has_open_weather_key()));
    println!("OpenUV key:       {}", configured(settings.has_open_uv_key()));

    match &settings.default_location {
        Some(loc) => println!(
            "Default location: {}  ({:.4}, {:.4})",
            loc.display_name(true),
            loc.lat,
            loc.lon
        ),
        None => println!("Default location: none (run `geoloc set-default <NAME>`)"),
    }
}
