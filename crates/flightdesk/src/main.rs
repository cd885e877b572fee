//! `fdesk` - CLI for flightdesk
//!
//! This binary provides the command-line interface for managing pilots,
//! destinations and flights stored in a local `SQLite` database.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::debug;

use flightdesk::cli::{Cli, Command, ConfigCommand, InsertCommand, UpdateCommand};
use flightdesk::logging::LogFile;
use flightdesk::render::{self, OutputFormat};
use flightdesk::seed::{self, SeedReport, SeedSource};
use flightdesk::{init_logging, Config, FieldRules, Session, Storage, Value};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    if let Command::Config(cmd) = cli.command {
        init_logging(verbosity, None)?;
        return handle_config(cli.config, cmd);
    }

    let mut config = Config::load_from(cli.config.clone())?;
    if let Some(name) = &cli.name {
        config.database.name.clone_from(name);
    }
    if let Some(db) = &cli.db {
        config.database.path = Some(db.clone());
    }
    config.validate()?;

    let log_file = config.logging.file_enabled.then(|| LogFile {
        directory: config.log_dir(),
        file_name: config.log_file_name(),
        level: config.logging.level.clone(),
    });
    // Held until exit so buffered file output is flushed.
    let _guard = init_logging(verbosity, log_file.as_ref())?;

    let rules = FieldRules::from_config(&config.validation)?;

    if let Command::Teardown(cmd) = &cli.command {
        return handle_teardown(&config, &rules, cmd.yes);
    }

    let auto_seed = config.database.seed_on_create
        && !matches!(&cli.command, Command::Init(cmd) if cmd.no_seed);
    let storage = open_storage(&config, &rules, auto_seed)?;
    let default_format = config.display.format;

    match cli.command {
        Command::Init(cmd) => {
            let reports = seed::initialize(&storage, &rules, &seed_source(&config), !cmd.no_seed)?;
            print_seed_reports(&reports);
            println!("Database ready at {}", storage.path().display());
        }
        Command::List(cmd) => {
            let rows = storage.select_all(cmd.table)?;
            println!("{}", render::render(&rows, cmd.format.unwrap_or(default_format))?);
        }
        Command::Show(cmd) => {
            let rows = storage.get(cmd.table, cmd.id)?;
            if rows.is_empty() {
                bail!("Cannot find this record in the database");
            }
            println!("{}", render::render(&rows, cmd.format.unwrap_or(default_format))?);
        }
        Command::Search(cmd) => {
            let value = rules
                .parse(cmd.table, &cmd.column.to_ascii_lowercase(), &cmd.value)
                .unwrap_or_else(|_| Value::from(cmd.value.trim()));
            let rows = storage.search(cmd.table, &cmd.column, &value)?;
            println!("{}", render::render(&rows, cmd.format.unwrap_or(default_format))?);
        }
        Command::Insert(cmd) => handle_insert(&storage, &rules, &cmd, default_format)?,
        Command::Update(cmd) => handle_update(&storage, &rules, cmd, default_format)?,
        Command::Delete(cmd) => {
            if storage.delete(cmd.table, cmd.id)? {
                println!("Successfully deleted from table {}", cmd.table);
            } else {
                println!("Cannot find this record in the database");
            }
        }
        Command::Board(cmd) => {
            let entries = storage.flight_board()?;
            println!(
                "{}",
                render::render_board(&entries, cmd.format.unwrap_or(default_format))?
            );
        }
        Command::Stats(cmd) => handle_stats(&storage, cmd.json)?,
        Command::Drop(cmd) => {
            if !cmd.yes {
                bail!("Dropping {} deletes all of its rows; pass --yes to confirm", cmd.table);
            }
            storage.drop_table(cmd.table)?;
            println!("Table {} dropped", cmd.table);
        }
        Command::Menu => {
            let stdin = io::stdin();
            let mut session = Session::new(&storage, &rules, stdin.lock(), io::stdout())
                .with_format(default_format);
            session.run_menu()?;
        }
        Command::Teardown(_) | Command::Config(_) => {}
    }

    Ok(())
}

fn seed_source(config: &Config) -> SeedSource {
    SeedSource::from_dir(config.database.seed_dir.as_deref())
}

/// Open the configured database, seeding it if this open created the file.
fn open_storage(config: &Config, rules: &FieldRules, seed: bool) -> anyhow::Result<Storage> {
    let path = config.database_path();
    let storage = Storage::open(&path)
        .with_context(|| format!("opening database {}", path.display()))?;
    storage.set_foreign_keys(config.database.foreign_keys)?;
    debug!("Opened database {}", path.display());
    seed::seed_if_created(&storage, rules, &seed_source(config), seed)?;
    Ok(storage)
}

fn print_seed_reports(reports: &[SeedReport]) {
    for report in reports {
        if report.already_populated {
            println!("{:<14} already populated", report.table.name());
        } else {
            println!(
                "{:<14} {} rows loaded, {} skipped",
                report.table.name(),
                report.inserted,
                report.skipped
            );
        }
    }
}

fn handle_insert(
    storage: &Storage,
    rules: &FieldRules,
    cmd: &InsertCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if cmd.assignments.is_empty() {
        let stdin = io::stdin();
        let mut session =
            Session::new(storage, rules, stdin.lock(), io::stdout()).with_format(format);
        session.insert(cmd.table)?;
        return Ok(());
    }

    let mut record = cmd.to_record();
    rules.check_record(&mut record)?;
    let id = storage.insert(&record)?;
    println!("{}", render::render(&storage.get(cmd.table, id)?, format)?);
    Ok(())
}

fn handle_update(
    storage: &Storage,
    rules: &FieldRules,
    cmd: UpdateCommand,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (Some(id), Some(column), Some(raw)) = (cmd.id, cmd.column, cmd.value) else {
        let stdin = io::stdin();
        let mut session =
            Session::new(storage, rules, stdin.lock(), io::stdout()).with_format(format);
        session.update(cmd.table)?;
        return Ok(());
    };

    let value = if raw.trim().is_empty() {
        Value::Null
    } else {
        rules.parse(cmd.table, &column.to_ascii_lowercase(), &raw)?
    };
    if storage.update(cmd.table, id, &column, &value)? {
        println!("{}", render::render(&storage.get(cmd.table, id)?, format)?);
    } else {
        println!("Cannot find this record in the database");
    }
    Ok(())
}

fn handle_stats(storage: &Storage, json: bool) -> anyhow::Result<()> {
    let stats = storage.stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("fdesk stats");
    println!("-----------");
    println!("Database:       {}", stats.path.display());
    println!("Schema version: {}", stats.schema_version);
    println!("Size:           {} bytes", stats.db_size_bytes);
    println!();
    for table in &stats.tables {
        match table.rows {
            Some(rows) => println!("  {:<14} {rows} rows", table.table.name()),
            None => println!("  {:<14} (missing)", table.table.name()),
        }
    }
    Ok(())
}

fn handle_teardown(config: &Config, rules: &FieldRules, yes: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    if !path.exists() {
        println!("No database at {}", path.display());
        return Ok(());
    }

    let storage = Storage::open(&path)?;
    if !yes {
        let stdin = io::stdin();
        let confirmed = Session::new(&storage, rules, stdin.lock(), io::stdout())
            .teardown_confirmed()?;
        if !confirmed {
            println!("Teardown cancelled.");
            return Ok(());
        }
    }

    storage.destroy()?;
    println!("Database {} removed", path.display());
    Ok(())
}

fn handle_config(
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = Config::load_from(config_path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print_config(&config, &mut io::stdout().lock())?;
            }
        }
        ConfigCommand::Path => {
            println!(
                "{}",
                config_path
                    .unwrap_or_else(Config::default_config_path)
                    .display()
            );
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => bail!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}

fn print_config(config: &Config, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Current Configuration")?;
    writeln!(out, "=====================")?;
    writeln!(out)?;
    writeln!(out, "[Database]")?;
    writeln!(out, "  Name:               {}", config.database.name)?;
    writeln!(out, "  Path:               {}", config.database_path().display())?;
    writeln!(out, "  Seed on create:     {}", config.database.seed_on_create)?;
    match &config.database.seed_dir {
        Some(dir) => writeln!(out, "  Seed directory:     {}", dir.display())?,
        None => writeln!(out, "  Seed directory:     (built-in)")?,
    }
    writeln!(out, "  Foreign keys:       {}", config.database.foreign_keys)?;
    writeln!(out)?;
    writeln!(out, "[Logging]")?;
    writeln!(out, "  File enabled:       {}", config.logging.file_enabled)?;
    writeln!(
        out,
        "  File:               {}",
        config.log_dir().join(config.log_file_name()).display()
    )?;
    writeln!(out, "  Level:              {}", config.logging.level)?;
    writeln!(out)?;
    writeln!(out, "[Validation]")?;
    writeln!(out, "  Flight number:      {}", config.validation.flight_number_pattern)?;
    writeln!(out, "  Airport code:       {}", config.validation.airport_code_pattern)?;
    writeln!(out, "  License number:     {}", config.validation.license_number_pattern)?;
    writeln!(out, "  Datetime format:    {}", config.validation.datetime_format)?;
    writeln!(out)?;
    writeln!(out, "[Display]")?;
    writeln!(out, "  Format:             {:?}", config.display.format)?;
    Ok(())
}
