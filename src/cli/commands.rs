// Tollgate — CLI Command Handlers
//
// Each function handles one CLI subcommand against a registry opened from
// the resolved configuration. Secrets are never printed.

use crate::config::Config;
use crate::error::TollgateError;
use crate::store::{Consumer, ConsumerRegistry, ConsumerStore, ConsumerSummary};

use super::{Cli, Commands};

/// Execute the parsed CLI command.
pub fn execute(cli: Cli) -> Result<(), TollgateError> {
    let config = Config::load(cli.db);

    match cli.command {
        Commands::Init => cmd_init(&config),
        Commands::Add {
            key,
            secret,
            name,
            approved,
            trusted,
        } => cmd_add(&config, key, secret, name, approved, trusted),
        Commands::List { json } => cmd_list(&config, json),
        Commands::Get { key } => cmd_get(&config, &key),
        Commands::Remove { key } => cmd_remove(&config, &key),
        Commands::Approve { key } => cmd_approve(&config, &key),
        Commands::Trust { key, revoke } => cmd_trust(&config, &key, !revoke),
        Commands::Check => cmd_check(&config),
    }
}

// ─── Init ────────────────────────────────────────────────────────────────────

fn cmd_init(config: &Config) -> Result<(), TollgateError> {
    config.ensure_data_dir()?;
    let registry = ConsumerRegistry::open(&config.db_path)?;

    println!("✓ Consumer store ready");
    println!("  Database:  {}", config.db_path.display());
    println!("  Consumers: {}", registry.len());
    println!();
    println!("Next: register a consumer with `tollgate add --key <key> --secret <secret> --name <name>`");

    Ok(())
}

// ─── Add ─────────────────────────────────────────────────────────────────────

fn cmd_add(
    config: &Config,
    key: String,
    secret: String,
    name: String,
    approved: bool,
    trusted: bool,
) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;
    let replacing = registry.lookup(&key).is_some();

    let consumer = registry.add_or_update(
        Consumer::new(key, secret, name)
            .with_provisional(!approved)
            .with_trusted(trusted),
    )?;

    println!("✓ Consumer {}", if replacing { "replaced" } else { "registered" });
    print_consumer(&consumer);

    Ok(())
}

// ─── List ────────────────────────────────────────────────────────────────────

fn cmd_list(config: &Config, json: bool) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;
    let summaries: Vec<ConsumerSummary> = registry.list_all().iter().map(Consumer::summary).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No consumers registered yet.");
        println!("Add one with: tollgate add --key <key> --secret <secret> --name <name>");
        return Ok(());
    }

    println!("Registered consumers ({}):\n", summaries.len());
    for summary in &summaries {
        println!(
            "  {:24} │ {:11} │ {:9} │ {}",
            summary.key,
            status_label(summary.provisional),
            if summary.trusted { "trusted" } else { "" },
            summary.name,
        );
    }

    Ok(())
}

// ─── Get ─────────────────────────────────────────────────────────────────────

fn cmd_get(config: &Config, key: &str) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;

    match registry.lookup(key) {
        Some(consumer) => {
            println!("Consumer details:\n");
            print_consumer(&consumer);
        }
        None => println!("Consumer not found: {}", key),
    }

    Ok(())
}

// ─── Remove ──────────────────────────────────────────────────────────────────

fn cmd_remove(config: &Config, key: &str) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;

    match registry.remove(key)? {
        Some(consumer) => println!("✓ Consumer {} removed", consumer),
        None => println!("Consumer not found: {}", key),
    }

    Ok(())
}

// ─── Approve / Trust ─────────────────────────────────────────────────────────

fn cmd_approve(config: &Config, key: &str) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;
    let consumer = require(&registry, key)?;

    if !consumer.provisional {
        println!("Consumer {} is already approved", consumer);
        return Ok(());
    }

    let consumer = registry.update(consumer.with_provisional(false))?;
    println!("✓ Consumer {} approved", consumer);

    Ok(())
}

fn cmd_trust(config: &Config, key: &str, trusted: bool) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;
    let consumer = require(&registry, key)?;

    let consumer = registry.update(consumer.with_trusted(trusted))?;
    if trusted {
        println!("✓ Consumer {} is now trusted", consumer);
    } else {
        println!("✓ Trust revoked for consumer {}", consumer);
    }

    Ok(())
}

// ─── Check ───────────────────────────────────────────────────────────────────

fn cmd_check(config: &Config) -> Result<(), TollgateError> {
    let registry = open_registry(config)?;
    let report = registry.load_report();

    println!("Loaded consumers: {}", report.loaded);

    if report.skipped.is_empty() {
        println!("✓ Every consumer node is readable");
        return Ok(());
    }

    println!("Unreadable consumer nodes ({}):", report.skipped.len());
    println!("{:-<80}", "");
    for skipped in &report.skipped {
        println!(
            "  node {} │ key {} │ name {} │ {}",
            skipped.node,
            skipped.key.as_deref().unwrap_or("?"),
            skipped.name.as_deref().unwrap_or("?"),
            skipped.reason,
        );
    }
    println!("{:-<80}", "");

    Err(TollgateError::Other(format!(
        "{} consumer node(s) could not be loaded",
        report.skipped.len()
    )))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open the registry, refusing to create a store outside `tollgate init`.
fn open_registry(config: &Config) -> Result<ConsumerRegistry, TollgateError> {
    if !config.db_path.exists() {
        return Err(TollgateError::Other(format!(
            "Consumer store not found at {}. Run `tollgate init` first.",
            config.db_path.display()
        )));
    }

    Ok(ConsumerRegistry::open(&config.db_path)?)
}

fn require(registry: &ConsumerRegistry, key: &str) -> Result<Consumer, TollgateError> {
    registry
        .lookup(key)
        .ok_or_else(|| TollgateError::Other(format!("Consumer not found: {}", key)))
}

fn status_label(provisional: bool) -> &'static str {
    if provisional {
        "provisional"
    } else {
        "approved"
    }
}

fn print_consumer(consumer: &Consumer) {
    println!("  Key:     {}", consumer.key());
    println!("  Name:    {}", consumer.name);
    println!("  Secret:  [REDACTED]"); // Never print the secret!
    println!("  Status:  {}", status_label(consumer.provisional));
    println!("  Trusted: {}", consumer.trusted);
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{GraphStore, NodeReader, CONSUMER_TYPE, TYPE_PROPERTY};

    fn temp_config(dir: &tempfile::TempDir) -> Config {
        Config {
            db_path: dir.path().join("store").join("consumers.db"),
        }
    }

    #[test]
    fn test_commands_require_init() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);

        let err = cmd_list(&config, false).unwrap_err();
        assert!(err.to_string().contains("tollgate init"));
        assert!(!config.db_path.exists(), "Only init may create the store");
    }

    #[test]
    fn test_admin_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);

        cmd_init(&config).unwrap();
        cmd_add(
            &config,
            "abc123".to_string(),
            "s3cr3t".to_string(),
            "Test App".to_string(),
            false,
            false,
        )
        .unwrap();
        cmd_approve(&config, "abc123").unwrap();
        cmd_trust(&config, "abc123", true).unwrap();

        let registry = ConsumerRegistry::open(&config.db_path).unwrap();
        let consumer = registry.lookup("abc123").unwrap();
        assert!(!consumer.provisional);
        assert!(consumer.trusted);
        assert_eq!(consumer.secret(), "s3cr3t");
        drop(registry);

        cmd_trust(&config, "abc123", false).unwrap();
        cmd_remove(&config, "abc123").unwrap();

        let registry = ConsumerRegistry::open(&config.db_path).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_approve_unknown_consumer_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);
        cmd_init(&config).unwrap();

        let err = cmd_approve(&config, "missing").unwrap_err();
        assert!(matches!(err, TollgateError::Other(ref msg) if msg.contains("missing")));
    }

    #[test]
    fn test_check_passes_on_clean_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);
        cmd_init(&config).unwrap();

        assert!(cmd_check(&config).is_ok());
    }

    #[test]
    fn test_check_reports_unreadable_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(&dir);
        cmd_init(&config).unwrap();
        cmd_add(
            &config,
            "abc123".to_string(),
            "s3cr3t".to_string(),
            "Test App".to_string(),
            false,
            false,
        )
        .unwrap();

        // Strip the secret behind the registry's back.
        let store = GraphStore::open(&config.db_path).unwrap();
        store
            .enter_write()
            .unwrap()
            .run_in_transaction(|tx| {
                for node in tx.find_nodes_by_property(TYPE_PROPERTY, CONSUMER_TYPE)? {
                    assert!(tx.remove_property(node, "secret")?);
                }
                Ok(())
            })
            .unwrap();
        drop(store);

        let err = cmd_check(&config).unwrap_err();
        assert!(
            matches!(err, TollgateError::Other(ref msg) if msg.contains("1 consumer node(s)")),
            "unexpected error: {}",
            err
        );
    }
}
