use crate::cli::{Commands, Toggle};
use crate::utils::{load_rules, print_preferences};
use smartype_core::compiler::compile_preferences;
use smartype_core::hub::{FnConsumer, PreferenceHub};
use smartype_core::serialization::serialize;
use smartype_core::storage::{set_smart_dashes, set_smart_quotes, set_substitution_enabled};
use smartype_core::{
    add_substitution, delete_substitution, load_preferences_or_default, update_substitution,
    BufferField, CompiledRule, Result, SmartypeError, SubstitutionSession, TextField,
};
use smartype_daemon::{write_payload, PreferenceWatcher, WatcherConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub fn handle_command(command: Option<Commands>) -> Result<()> {
    match command {
        Some(command) => handle_subcommand(command),
        None => handle_list(), // Default: show the substitutions when no command provided
    }
}

fn handle_subcommand(command: Commands) -> Result<()> {
    match command {
        Commands::Add {
            trigger,
            replacement,
        } => add_substitution(trigger, replacement).map(|_| println!("Substitution added successfully")),
        Commands::Delete { trigger } => {
            delete_substitution(&trigger).map(|_| println!("Substitution deleted successfully"))
        }
        Commands::Update {
            trigger,
            replacement,
        } => update_substitution(&trigger, replacement)
            .map(|_| println!("Substitution updated successfully")),
        Commands::Enable { trigger } => set_substitution_enabled(&trigger, true)
            .map(|_| println!("Substitution '{}' enabled", trigger)),
        Commands::Disable { trigger } => set_substitution_enabled(&trigger, false)
            .map(|_| println!("Substitution '{}' disabled", trigger)),
        Commands::List => handle_list(),
        Commands::SmartQuotes { state } => set_smart_quotes(state.enabled())
            .map(|_| println!("Smart quotes turned {}", toggle_name(state))),
        Commands::SmartDashes { state } => set_smart_dashes(state.enabled())
            .map(|_| println!("Smart dashes turned {}", toggle_name(state))),
        Commands::Compile { output } => handle_compile(output),
        Commands::Type { payload, text } => handle_type(payload, text),
        Commands::Watch { debounce_ms } => handle_watch(debounce_ms),
    }
}

fn toggle_name(state: Toggle) -> &'static str {
    match state {
        Toggle::On => "on",
        Toggle::Off => "off",
    }
}

fn handle_list() -> Result<()> {
    print_preferences(&load_preferences_or_default()?);
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn handle_compile(output: Option<PathBuf>) -> Result<()> {
    let payload = serialize(&compile_preferences(&load_preferences_or_default()?))?;

    match output {
        Some(path) => {
            runtime()?.block_on(write_payload(&path, &payload))?;
            println!("Wrote compiled rules to {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&payload)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}

/// Type into a fresh field so each result stands on its own.
fn type_into(rules: &Arc<[CompiledRule]>, text: &str) -> Result<String> {
    let mut field = BufferField::new();
    let _session = SubstitutionSession::attach(&field, Arc::clone(rules))?;
    field.type_text(text);
    Ok(field.value().to_string())
}

fn handle_type(payload: Option<PathBuf>, text: Option<String>) -> Result<()> {
    let rules = load_rules(payload.as_deref())?;

    match text {
        Some(text) => println!("{}", type_into(&rules, &text)?),
        None => {
            for line in io::stdin().lock().lines() {
                println!("{}", type_into(&rules, &line?)?);
            }
        }
    }
    Ok(())
}

fn handle_watch(debounce_ms: Option<u64>) -> Result<()> {
    let mut config = WatcherConfig::default();
    if let Some(ms) = debounce_ms {
        config = config.with_debounce(Duration::from_millis(ms));
    }

    let hub = PreferenceHub::shared();
    hub.lock()
        .map_err(|_| SmartypeError::Other("preference hub lock poisoned".to_string()))?
        .register(Box::new(FnConsumer(|payload: &[u8]| -> Result<()> {
            let mut stdout = io::stdout().lock();
            stdout.write_all(payload)?;
            writeln!(stdout)?;
            stdout.flush()?;
            Ok(())
        })));

    runtime()?.block_on(async move {
        let watcher = PreferenceWatcher::new(config, hub)?;
        eprintln!(
            "Watching {} (Ctrl-C to stop)",
            watcher.config().preferences_path.display()
        );
        watcher.publish().await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(true);
            }
        });

        let recompiles = watcher.run(shutdown_rx).await?;
        eprintln!("Stopped after {} recompiles", recompiles);
        Ok::<(), SmartypeError>(())
    })
}
