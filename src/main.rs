//! Demo binary: seeds the ledger and prints each farmer's wallet summary.
//!
//! The HTTP surface of the marketplace lives outside this repository; this
//! binary exists to exercise the engine end to end against a local SQLite
//! file.

use agrofund_ledger::{
    config::{database, seed},
    core::{query, report, schedule, store},
    errors::Result,
};
use dotenvy::dotenv;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing as early as possible
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // .env is optional; env vars can be set externally
    dotenv().ok();

    let db = database::create_connection().await?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    let seed_path = env::var("SEED_PATH").unwrap_or_else(|_| "seed.toml".to_string());
    let fixture = seed::load_seed(&seed_path)?;
    store::seed_initial_data(&db, &fixture).await?;

    for farmer in store::list_farmers(&db).await? {
        let wallet = report::generate_wallet_report(&db, &farmer.id, Some(5)).await?;

        println!("== {} ({}) ==", wallet.farmer.name, wallet.farmer.id);
        println!("  balance:    {}", report::format_amount(wallet.balance));
        println!(
            "  debt:       {} paid of {} ({:.1}%)",
            report::format_amount(wallet.farmer.paid_amount),
            report::format_amount(wallet.farmer.total_debt),
            wallet.debt_progress_percent
        );
        println!(
            "  schedule:   {} months left, {} overdue",
            wallet.farmer.remaining_months, wallet.overdue_count
        );

        let pending = query::get_pending_installments(&db, &farmer.id).await?;
        if !pending.is_empty() {
            let payoff = schedule::compute_early_payoff(&pending);
            println!(
                "  early payoff: {} (saves {})",
                report::format_amount(payoff.final_amount),
                report::format_amount(payoff.discount)
            );
        }

        for transaction in &wallet.recent_transactions {
            println!("  {}", report::format_transaction_summary(transaction));
        }
    }

    Ok(())
}
