use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);

    // SQLite serialises writes, so a modest pool is enough
    opt.max_connections(20)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) if path.starts_with("sqlite:") => path.to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://guardian.db?mode=rwc".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_variants() {
        assert_eq!(get_database_url(Some(":memory:")), "sqlite::memory:");
        assert_eq!(
            get_database_url(Some("/tmp/portal.db")),
            "sqlite:///tmp/portal.db?mode=rwc"
        );
        assert_eq!(
            get_database_url(Some("sqlite://already.db?mode=rwc")),
            "sqlite://already.db?mode=rwc"
        );
        assert_eq!(get_database_url(None), "sqlite://guardian.db?mode=rwc");
    }
}
