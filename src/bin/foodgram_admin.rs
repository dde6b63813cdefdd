// ABOUTME: Administrative command-line utility for a Foodgram database
// ABOUTME: Creates superusers and loads ingredient and tag fixtures from JSON files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Foodgram Contributors

//! Usage:
//! ```bash
//! # Create an admin account
//! foodgram-admin create-superuser --email admin@example.org --username admin --password 'S3cure-pass'
//!
//! # Load the ingredient catalogue
//! foodgram-admin load-ingredients data/ingredients.json
//!
//! # Load tags
//! foodgram-admin load-tags data/tags.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use foodgram_server::{
    auth::AuthManager,
    config::{DatabaseUrl, ServerConfig},
    database::Database,
    errors::ErrorCode,
    logging,
    models::{NewIngredient, NewTag, NewUser, RegisterRequest, UserRole},
};
use serde::de::DeserializeOwned;
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "foodgram-admin",
    about = "Foodgram database administration",
    long_about = "Create administrator accounts and load ingredient and tag fixtures into a Foodgram database."
)]
struct AdminArgs {
    #[command(subcommand)]
    command: AdminCommand,

    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Create an administrator account
    CreateSuperuser {
        /// Email address
        #[arg(long)]
        email: String,

        /// Username
        #[arg(long)]
        username: String,

        /// Password
        #[arg(long)]
        password: String,

        /// Given name
        #[arg(long, default_value = "Admin")]
        first_name: String,

        /// Family name
        #[arg(long, default_value = "Foodgram")]
        last_name: String,
    },

    /// Load `[{"name", "measurement_unit"}]` into the ingredient catalogue
    LoadIngredients {
        /// JSON fixture file
        file: PathBuf,
    },

    /// Load `[{"name", "color", "slug"}]` into the tag list
    LoadTags {
        /// JSON fixture file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = AdminArgs::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(database_url) = args.database_url {
        config.database_url = DatabaseUrl::parse_url(&database_url);
    }

    logging::init_from_env()?;

    let database = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    match args.command {
        AdminCommand::CreateSuperuser {
            email,
            username,
            password,
            first_name,
            last_name,
        } => {
            let request = RegisterRequest {
                email,
                username,
                first_name,
                last_name,
                password,
            };
            create_superuser(&database, &config, request).await?;
        }
        AdminCommand::LoadIngredients { file } => {
            load_ingredients(&database, &file).await?;
        }
        AdminCommand::LoadTags { file } => {
            load_tags(&database, &file).await?;
        }
    }

    Ok(())
}

async fn create_superuser(
    database: &Database,
    config: &ServerConfig,
    request: RegisterRequest,
) -> Result<()> {
    let registration = request.validate()?;
    let auth_manager = AuthManager::new(&config.auth);
    let password_hash = auth_manager.hash_password(request.password).await?;

    let user = database
        .users()
        .create(&NewUser {
            email: registration.email,
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
            role: UserRole::Admin,
        })
        .await?;

    info!(user.id = user.id, "Superuser created");
    println!("Created superuser {} <{}> (id {})", user.username, user.email, user.id);
    Ok(())
}

async fn read_fixture<T: DeserializeOwned>(file: &Path) -> Result<Vec<T>> {
    let raw = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid fixture {}", file.display()))
}

async fn load_ingredients(database: &Database, file: &Path) -> Result<()> {
    let fixtures: Vec<NewIngredient> = read_fixture(file).await?;
    let ingredients = database.ingredients();

    let mut inserted = 0_usize;
    for fixture in &fixtures {
        let ingredient = match fixture.validate() {
            Ok(ingredient) => ingredient,
            Err(e) => {
                warn!(name = %fixture.name, "Skipping invalid ingredient: {e}");
                continue;
            }
        };
        if ingredients.insert_if_absent(&ingredient).await? {
            inserted += 1;
        }
    }

    info!(inserted, total = fixtures.len(), "Ingredients loaded");
    println!("Loaded {inserted} of {} ingredients", fixtures.len());
    Ok(())
}

async fn load_tags(database: &Database, file: &Path) -> Result<()> {
    let fixtures: Vec<NewTag> = read_fixture(file).await?;
    let tags = database.tags();

    let mut inserted = 0_usize;
    for fixture in &fixtures {
        let tag = match fixture.validate() {
            Ok(tag) => tag,
            Err(e) => {
                warn!(slug = %fixture.slug, "Skipping invalid tag: {e}");
                continue;
            }
        };
        match tags.insert_if_absent(&tag).await {
            Ok(true) => inserted += 1,
            Ok(false) => {}
            Err(e) if e.code == ErrorCode::ResourceAlreadyExists => {
                warn!(slug = %tag.slug, "Skipping conflicting tag: {e}");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, total = fixtures.len(), "Tags loaded");
    println!("Loaded {inserted} of {} tags", fixtures.len());
    Ok(())
}
