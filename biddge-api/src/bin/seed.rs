//! Populate the community collection with the sample communities.
//!
//! ```bash
//! cargo run -p biddge-api --bin biddge-seed -- --yes
//! ```

use std::io::{self, BufRead, Write};

use biddge_api::telemetry;
use biddge_shared::{
    db::{
        migrations::run_migrations,
        pool::{create_pool, DatabaseConfig},
    },
    seed::{seed_communities, SeedMode, SeedOutcome},
    store::{CommunityStore, PgStore, Store},
};
use clap::Parser;
use tracing::info;

/// `biddge-seed` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "biddge-seed",
    about = "Replace the community collection with the sample communities",
    version
)]
struct Args {
    /// PostgreSQL server URL.
    #[arg(long, env = "DATABASE_URL", value_name = "url")]
    database_url: String,

    /// Database on that server.
    #[arg(long, env = "DB_NAME", default_value = "biddge_db", value_name = "name")]
    db_name: String,

    /// Overwrite existing communities without asking.
    #[arg(long, short = 'y')]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let args = Args::parse();

    let pool = create_pool(&DatabaseConfig {
        url: args.database_url,
        name: args.db_name.clone(),
        max_connections: 2,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let existing = store.count_communities().await?;
    if existing > 0 && !args.yes {
        println!("Database '{}' already has {} communities.", args.db_name, existing);
        if !confirm("overwrite? (y/n): ")? {
            println!("Seeding cancelled.");
            store.close().await;
            return Ok(());
        }
    }

    let outcome = seed_communities(&store, SeedMode::Replace).await?;
    if let SeedOutcome::Seeded { inserted } = outcome {
        info!(inserted, "Seed complete");
        println!("Inserted {} communities:", inserted);
    }

    for community in store.list_communities(None).await? {
        println!(
            "  - {} ({}) - {} members",
            community.name, community.category, community.member_count
        );
    }

    store.close().await;
    Ok(())
}

/// Asks on stdout and reads one answer from stdin; only `y` confirms
fn confirm(prompt: &str) -> io::Result<bool> {
    let mut stdout = io::stdout();
    stdout.write_all(prompt.as_bytes())?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
