use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::{DatabaseManager, PgStore};
use crate::services::AdminService;

/// Promote an existing account to admin. This is how the first admin is created.
pub async fn grant(email: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("grant-admin needs DATABASE_URL; the in-memory store does not outlive this command")?;

    let admin = AdminService::new(Arc::new(PgStore::new(pool)));
    let user = admin
        .promote_by_email(email)
        .await
        .with_context(|| format!("failed to grant admin to {}", email))?;

    output_success(
        &output_format,
        &format!("{} is now an admin", user.email),
        Some(json!({ "user": user })),
    )
}
