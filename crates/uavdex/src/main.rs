//! `uavdex` - CLI for the UAV specification catalogue
//!
//! This binary provides the command-line interface for managing the
//! catalogue's collections and running statistics and extraction over them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use uavdex::cli::{
    AircraftCommand, CaseCommand, Cli, Command, ConfigCommand, ExtractCommand, ImportCommand,
    ParamCommand, StatsCommand, SubsystemCommand,
};
use uavdex::error::Error;
use uavdex::extract::Extractor;
use uavdex::import::{sheet::workbook_from_csvs, Reconciler};
use uavdex::model::{AircraftModel, Category, NUMERIC_ATTRIBUTES};
use uavdex::store::cases::CaseStore;
use uavdex::store::params::ParamRegistry;
use uavdex::store::Catalog;
use uavdex::{assets, init_logging, stats, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Aircraft(cmd) => handle_aircraft(&config, cmd),
        Command::Subsystem(cmd) => handle_subsystem(&config, cmd),
        Command::Param(cmd) => handle_param(&config, cmd),
        Command::Case(cmd) => handle_case(&config, cmd),
        Command::Import(cmd) => handle_import(&config, &cmd),
        Command::Stats(cmd) => handle_stats(&config, &cmd),
        Command::Extract(cmd) => handle_extract(&config, cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_aircraft(config: &Config, cmd: AircraftCommand) -> anyhow::Result<()> {
    let catalog = Catalog::new(config);
    match cmd {
        AircraftCommand::List {
            category,
            manufacturer,
            json,
        } => {
            let category = category.map(|c| c.parse::<Category>()).transpose()?;
            let mut records = catalog.aircraft()?;
            if let Some(category) = category {
                records.retain(|m| m.category == category);
            }
            if let Some(manufacturer) = &manufacturer {
                records.retain(|m| m.manufacturer.eq_ignore_ascii_case(manufacturer));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No aircraft found.");
            } else {
                for model in &records {
                    println!(
                        "{:<30} {:<20} {:<12} {}",
                        model.name,
                        model.manufacturer,
                        model.category,
                        model
                            .mtow_kg
                            .map_or_else(String::new, |v| format!("{v} kg")),
                    );
                }
                println!();
                println!("{} aircraft", records.len());
            }
        }
        AircraftCommand::Show { name, json } => {
            let model = catalog
                .find_aircraft(&name)?
                .ok_or_else(|| Error::not_found("aircraft", &name))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&model)?);
            } else {
                print_aircraft(config, &model);
            }
        }
        AircraftCommand::Add { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let model: AircraftModel = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let stored = catalog.add_aircraft(model)?;
            println!("Added aircraft '{}' ({})", stored.name, stored.id);
        }
        AircraftCommand::Update { name, file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let model: AircraftModel = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let stored = catalog.update_aircraft(&name, model)?;
            println!("Updated aircraft '{}' ({})", stored.name, stored.id);
        }
        AircraftCommand::Remove { name } => {
            if catalog.remove_aircraft(&name)? {
                println!("Removed aircraft '{name}'");
            } else {
                println!("No aircraft named '{name}'");
            }
        }
    }
    Ok(())
}

fn print_aircraft(config: &Config, model: &AircraftModel) {
    println!("{}", model.name);
    println!("{}", "-".repeat(model.name.len()));
    println!("  Manufacturer: {}", model.manufacturer);
    println!("  Category:     {}", model.category);
    if !model.description.is_empty() {
        println!("  Description:  {}", model.description);
    }
    if !model.purpose.is_empty() {
        println!("  Purpose:      {}", model.purpose.join(", "));
    }
    if let Some(reference) = &model.image_url {
        match assets::resolve(reference, config) {
            Some(assets::ImageRef::Url(url)) => println!("  Image:        {url}"),
            Some(assets::ImageRef::File(path)) => println!("  Image:        {}", path.display()),
            None => println!("  Image:        {reference} (not found)"),
        }
    }
    println!();
    for (key, unit) in NUMERIC_ATTRIBUTES {
        if let Some(value) = model.attribute(key) {
            println!("  {key:<18} {value} {unit}");
        }
    }
    for (name, custom) in &model.custom_params {
        if let Some(value) = custom.value {
            println!("  {name:<18} {value} {}", custom.unit);
        }
    }
}

fn handle_subsystem(config: &Config, cmd: SubsystemCommand) -> anyhow::Result<()> {
    let catalog = Catalog::new(config);
    match cmd {
        SubsystemCommand::List { category, json } => {
            let mut records = catalog.subsystems()?;
            if let Some(category) = &category {
                records.retain(|s| s.category.eq_ignore_ascii_case(category));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No subsystems found.");
            } else {
                for subsystem in &records {
                    println!(
                        "{:<30} {:<20} {}",
                        subsystem.name, subsystem.manufacturer, subsystem.category
                    );
                }
                println!();
                println!("{} subsystems", records.len());
            }
        }
        SubsystemCommand::Show { name, json } => {
            let subsystem = catalog
                .find_subsystem(&name)?
                .ok_or_else(|| Error::not_found("subsystems", &name))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&subsystem)?);
            } else {
                println!("{}", subsystem.name);
                println!("{}", "-".repeat(subsystem.name.len()));
                println!("  Manufacturer: {}", subsystem.manufacturer);
                println!("  Category:     {}", subsystem.category);
                if !subsystem.description.is_empty() {
                    println!("  Description:  {}", subsystem.description);
                }
                if !subsystem.key_specs.is_empty() {
                    println!();
                    for (key, value) in &subsystem.key_specs {
                        println!("  {key:<18} {value}");
                    }
                }
            }
        }
    }
    Ok(())
}

fn handle_param(config: &Config, cmd: ParamCommand) -> anyhow::Result<()> {
    let registry = ParamRegistry::new(config);
    match cmd {
        ParamCommand::List { json } => {
            let params = registry.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else if params.is_empty() {
                println!("No custom parameters registered.");
            } else {
                for def in &params {
                    println!(
                        "{:<24} {:<10} registered {}",
                        def.name,
                        def.unit,
                        def.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
        ParamCommand::Add { name, unit } => {
            let def = registry.add(&name, &unit)?;
            println!("Registered parameter '{}' ({})", def.name, def.unit);
        }
        ParamCommand::Remove { name } => {
            if registry.remove(&name)? {
                println!("Removed parameter '{name}'");
            } else {
                println!("No parameter named '{name}'");
            }
        }
    }
    Ok(())
}

fn handle_case(config: &Config, cmd: CaseCommand) -> anyhow::Result<()> {
    let store = CaseStore::new(config);
    match cmd {
        CaseCommand::List => {
            let cases = store.list()?;
            if cases.is_empty() {
                println!("No cases stored.");
            } else {
                for case in &cases {
                    println!("{}", case.name);
                }
                println!();
                println!("{} cases", cases.len());
            }
        }
        CaseCommand::Show { name } => {
            let content = store.read(&name)?;
            println!("{content}");
        }
        CaseCommand::Add { name, file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let path = store.save(&name, &content)?;
            println!("Saved case '{name}' to {}", path.display());
        }
        CaseCommand::Remove { name } => {
            if store.remove(&name)? {
                println!("Removed case '{name}'");
            } else {
                println!("No case named '{name}'");
            }
        }
    }
    Ok(())
}

fn handle_import(config: &Config, cmd: &ImportCommand) -> anyhow::Result<()> {
    if cmd.uavs.is_none() && cmd.subsystems.is_none() {
        anyhow::bail!("nothing to import: pass --uavs and/or --subsystems");
    }

    let workbook = workbook_from_csvs(cmd.uavs.as_deref(), cmd.subsystems.as_deref())?;
    let catalog = Catalog::new(config);
    let registry = ParamRegistry::new(config);
    let summary = Reconciler::new(&catalog, &registry).apply(&workbook)?;

    if cmd.uavs.is_some() {
        println!(
            "Aircraft:   {} added, {} updated, {} skipped",
            summary.aircraft.added, summary.aircraft.updated, summary.aircraft.skipped
        );
    }
    if cmd.subsystems.is_some() {
        println!(
            "Subsystems: {} added, {} updated, {} skipped",
            summary.subsystems.added, summary.subsystems.updated, summary.subsystems.skipped
        );
    }
    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> anyhow::Result<()> {
    let catalog = Catalog::new(config);
    let mut records = catalog.aircraft()?;
    if let Some(category) = &cmd.category {
        let category = category.parse::<Category>()?;
        records.retain(|m| m.category == category);
    }

    if cmd.ratio {
        let ranking = stats::ratio_ranking(&records, &cmd.x, &cmd.y)?;
        if cmd.json {
            println!("{}", serde_json::to_string_pretty(&ranking)?);
        } else {
            println!("{:<30} {:>12} {:>12} {:>10}", "name", cmd.x, cmd.y, "ratio");
            for entry in &ranking {
                println!(
                    "{:<30} {:>12.2} {:>12.2} {:>10.3}",
                    entry.name, entry.x, entry.y, entry.ratio
                );
            }
        }
        return Ok(());
    }

    let analysis = stats::analyze(&records, &cmd.x, &cmd.y, cmd.model, &config.stats)?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "{} vs {}: {} usable records",
        cmd.x,
        cmd.y,
        analysis.points.len()
    );
    match &analysis.fit {
        None => println!("Not enough data to fit a model (need at least 2 records)."),
        Some(fit) => {
            println!();
            println!("  Model: {:?}", fit.kind);
            if let Some((slope, intercept)) = fit.equation {
                println!("  y = {slope:.4}x + {intercept:.4}");
            }
            println!("  R²:    {:.4}", fit.r_squared);
            println!("  MSE:   {:.4}", fit.mse);
            println!("  RMSE:  {:.4}", fit.rmse);
        }
    }
    Ok(())
}

fn handle_extract(config: &Config, cmd: ExtractCommand) -> anyhow::Result<()> {
    let store = CaseStore::new(config);
    let markdown = store.read(&cmd.case)?;

    let base_url = cmd
        .base_url
        .or_else(|| cmd.service.map(|s| s.base_url().to_string()))
        .unwrap_or_else(|| config.extract.base_url.clone());
    let model = cmd.model.unwrap_or_else(|| config.extract.model.clone());
    let api_key = cmd
        .api_key
        .or_else(|| std::env::var("UAVDEX_API_KEY").ok())
        .context("no API key: pass --api-key or set UAVDEX_API_KEY")?;

    let extractor = Extractor::new(base_url, model, api_key, config.extract_timeout())?;
    let extracted = extractor.extract(&markdown, &cmd.case)?;

    println!("{}", serde_json::to_string_pretty(&extracted)?);

    if cmd.save {
        let catalog = Catalog::new(config);
        let stored = catalog.add_aircraft(extracted)?;
        println!();
        println!("Added aircraft '{}' ({})", stored.name, stored.id);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Data]");
                println!("  Data directory:  {}", config.data_dir().display());
                println!("  Aircraft file:   {}", config.aircraft_path().display());
                println!("  Subsystems file: {}", config.subsystems_path().display());
                println!("  Params file:     {}", config.params_path().display());
                println!("  Cases directory: {}", config.cases_dir().display());
                println!();
                println!("[Extract]");
                println!("  Base URL:        {}", config.extract.base_url);
                println!("  Model:           {}", config.extract.model);
                println!("  Timeout:         {}s", config.extract.timeout_secs);
                println!();
                println!("[Stats]");
                println!("  Curve samples:   {}", config.stats.curve_samples);
                println!("  Forest trees:    {}", config.stats.forest_trees);
                println!("  Forest seed:     {}", config.stats.forest_seed);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
