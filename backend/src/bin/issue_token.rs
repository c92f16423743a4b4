//! Register a user and print a fresh bearer token for them.
//!
//! Tokens are shown once; only their digest is stored.

use clap::Parser;
use color_eyre::eyre::{Context, Result};

use marketplace::domain::ports::UserRepository;
use marketplace::domain::{Role, ServiceRole, User, UserId, UserValidationError};
use marketplace::outbound::persistence::{
    DbPool, DieselTokenStore, DieselUserRepository, PoolConfig,
};

fn parse_user_id(raw: &str) -> Result<UserId, UserValidationError> {
    UserId::new(raw)
}

#[derive(Debug, Parser)]
#[command(about = "Issue an API bearer token for a marketplace user")]
struct Args {
    /// PostgreSQL URL of the marketplace database.
    #[arg(long)]
    database_url: String,
    /// Existing user to issue for; a new id is generated when omitted.
    #[arg(long, value_parser = parse_user_id)]
    user_id: Option<UserId>,
    #[arg(long)]
    email: String,
    #[arg(long, default_value = "regular")]
    role: Role,
    #[arg(long, default_value = "service_both")]
    service_role: ServiceRole,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let pool = DbPool::new(PoolConfig::new(&args.database_url).with_max_size(1))
        .await
        .wrap_err("failed to connect to the database")?;
    let user = User {
        id: args.user_id.unwrap_or_else(UserId::random),
        email: args.email,
        role: args.role,
        service_role: args.service_role,
    };
    DieselUserRepository::new(pool.clone())
        .upsert(&user)
        .await
        .wrap_err("failed to store user")?;
    let token = DieselTokenStore::new(pool)
        .issue(&user.id)
        .await
        .wrap_err("failed to issue token")?;

    println!("user_id={}", user.id);
    println!("token={token}");
    Ok(())
}
