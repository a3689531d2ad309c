use anyhow::Result;
use log::info;

use tasktrack::{
    db::Database, rest, settings::Settings, single_instance::InstanceLock, tasks::TaskController,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Task tracker starting up...");

    let settings = Settings::from_env()?;

    let Some(lock) = InstanceLock::acquire(settings.lock_port).await else {
        eprintln!("Task tracker is already running.");
        return Ok(());
    };
    tokio::spawn(lock.listen());

    let database = Database::new(settings.db_path.clone())?;
    let controller = TaskController::new(database);

    rest::serve(controller, &settings).await
}
