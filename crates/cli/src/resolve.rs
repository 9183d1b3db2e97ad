use crate::{
    commands::{RunArgs, TargetArgs},
    env::{EnvManager, STORE_VAR, TABLE_VAR, WORKERS_VAR},
    error::CliError,
};
use connectors::{adapter::Adapter, table::TableStore};
use engine_config::settings::PurgeSettings;
use std::{path::PathBuf, sync::Arc};
use tracing::info;

/// Table name from the flag, else from the environment.
pub fn table_name(target: &TargetArgs, env: &EnvManager) -> Result<String, CliError> {
    target
        .table
        .clone()
        .or_else(|| env.get(TABLE_VAR).map(str::to_string))
        .ok_or_else(|| CliError::Config(format!("No table given: pass --table or set {TABLE_VAR}")))
}

/// Store location from the flag, the environment, or the per-user data dir.
pub fn store_location(
    target: &TargetArgs,
    env: &EnvManager,
    table: &str,
) -> Result<String, CliError> {
    if let Some(store) = target.store.clone().or_else(|| env.get(STORE_VAR).map(str::to_string)) {
        return Ok(store);
    }

    let path = default_store_path(table)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(path.display().to_string())
}

fn default_store_path(table: &str) -> Result<PathBuf, CliError> {
    let base = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| CliError::Config("Could not determine a data directory".into()))?;
    Ok(base.join("purger").join(format!("{table}.json")))
}

pub async fn open_store(
    target: &TargetArgs,
    env: &EnvManager,
    table: &str,
) -> Result<Arc<dyn TableStore>, CliError> {
    let location = store_location(target, env, table)?;
    info!(location = %location, table = %table, "Opening table store");

    let mut adapter = Adapter::open(&location, table).await?;
    if let Some(page_size) = target.page_size {
        adapter = adapter.with_page_size(page_size);
    }
    Ok(adapter.into_store())
}

/// Settings file first, then environment, then flags.
pub fn settings(run: &RunArgs, table: String, env: &EnvManager) -> Result<PurgeSettings, CliError> {
    let mut settings = match &run.config {
        Some(path) => PurgeSettings::from_json_file(path)?,
        None => PurgeSettings::default(),
    };
    settings.table_name = table;

    if let Some(workers) = env.get_usize(WORKERS_VAR)? {
        settings.worker_count = workers;
    }
    if let Some(workers) = run.workers {
        settings.worker_count = workers;
    }
    if let Some(days) = run.retention_days {
        settings.retention_days = days;
    }
    if let Some(strategy) = run.strategy {
        settings.strategy = strategy;
    }
    if let Some(split) = run.split {
        settings.split = split;
    }
    if let Some(size) = run.batch_size {
        settings.max_batch_size = size;
    }
    settings.dry_run |= run.dry_run;

    settings.validate()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_config::settings::{split::SplitPolicy, strategy::Strategy};
    use std::io::Write;

    fn env_with(content: &str) -> EnvManager {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let mut env = EnvManager::new();
        env.load_from_file(file.path()).unwrap();
        env
    }

    #[test]
    fn test_table_flag_wins_over_env() {
        let env = env_with("PURGER_TABLE=from_env\n");
        let target = TargetArgs {
            table: Some("from_flag".into()),
            ..TargetArgs::default()
        };
        assert_eq!(table_name(&target, &env).unwrap(), "from_flag");
        assert_eq!(table_name(&TargetArgs::default(), &env).unwrap(), "from_env");
    }

    #[test]
    fn test_store_from_env() {
        let env = env_with("PURGER_STORE=memory://\n");
        assert_eq!(
            store_location(&TargetArgs::default(), &env, "t").unwrap(),
            "memory://"
        );
    }

    #[test]
    fn test_flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("purge.json");
        std::fs::write(
            &config,
            r#"{"retention_days": 90, "worker_count": 3, "strategy": "worker-pool"}"#,
        )
        .unwrap();

        let env = env_with("PURGER_WORKERS=5\n");
        let run = RunArgs {
            config: Some(config),
            split: Some(SplitPolicy::Count(9)),
            dry_run: true,
            ..RunArgs::default()
        };

        let settings = settings(&run, "events".into(), &env).unwrap();
        assert_eq!(settings.table_name, "events");
        assert_eq!(settings.retention_days, 90);
        assert_eq!(settings.worker_count, 5);
        assert_eq!(settings.strategy, Strategy::WorkerPool);
        assert_eq!(settings.split, SplitPolicy::Count(9));
        assert!(settings.dry_run);
    }

    #[test]
    fn test_invalid_batch_size_is_rejected() {
        let run = RunArgs {
            batch_size: Some(500),
            ..RunArgs::default()
        };
        assert!(matches!(
            settings(&run, "events".into(), &env_with("")),
            Err(CliError::Settings(_))
        ));
    }
}
