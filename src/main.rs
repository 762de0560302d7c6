//! CQT Cross-Chain Arbitrage Bot - Main Entry Point

use anyhow::Result;
use cqt_arb::*;
use std::sync::Arc;
use tracing::{info, warn};
use cqt_arb::arbitrage::HeuristicScorer;
use cqt_arb::execution::CrossChainExecutor;
use cqt_arb::monitor::MonitoringLoop;
use cqt_arb::network::{ChainClient, NetworkClients, RpcChainClient};
use cqt_arb::pools::PoolOracle;
use cqt_arb::storage::ExecutionLedger;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize logging
    let _logging_guard = utils::setup_logging()?;
    utils::setup_output_directories()?;

    // Load configuration
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.json".to_string());
    let config = Arc::new(Config::load(&config_path)?);

    info!("🪙 CQT Cross-Chain Arbitrage Bot v0.5.0");
    info!("📋 Configuration:");
    info!("   Account: {:?}", config.account_address);
    info!("   Pools: {}", config.pools.len());
    info!("   Min Profit Threshold: {}%", config.min_profit_threshold_pct);
    info!("   Max Position: {} CQT", config.max_position_size);
    info!("   Monitoring Interval: {}s", config.monitoring_interval_secs);
    info!("   Max Gas Price: {} gwei", config.max_gas_price_gwei);
    info!(
        "   Execution Gate: top {} at confidence > {}",
        config.top_k_opportunities, config.confidence_execution_threshold
    );
    info!(
        "   Bridge Wait: {}s timeout, {}s polls",
        config.bridge_confirmation_timeout_secs, config.bridge_poll_interval_secs
    );

    // Connect chain clients
    let mut clients = NetworkClients::new();
    for network in [Network::Polygon, Network::Base] {
        let settings = config.network(network);
        let client =
            RpcChainClient::connect(network, &settings.rpc_url, config.account_address).await?;
        clients.insert(Arc::new(client));
    }

    // Echo starting balances; a failed read here is not fatal
    for network in [Network::Polygon, Network::Base] {
        match clients.get(network)?.get_balance(config.account_address).await {
            Ok(balance) => info!(
                "💼 {} balance: {} {}",
                network,
                utils::from_wei(balance.try_into().unwrap_or(u128::MAX)),
                network.gas_token()
            ),
            Err(e) => warn!("⚠️ Could not read {} balance: {}", network, e),
        }
    }

    // Wire the components
    let ledger = Arc::new(ExecutionLedger::new());
    let oracle = Arc::new(PoolOracle::new(clients.clone(), config.pools.clone()));
    let scorer = Arc::new(HeuristicScorer::new());
    let executor = Arc::new(CrossChainExecutor::new(
        clients,
        ledger.clone(),
        config.clone(),
    ));
    let monitor = Arc::new(MonitoringLoop::new(
        oracle,
        scorer,
        executor,
        ledger.clone(),
        config,
    ));

    // Shutdown handler
    let shutdown_monitor = monitor.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("\n📛 Received shutdown signal (Ctrl+C)...");
            shutdown_monitor.stop();
        }
    });

    info!("\n🚀 Starting monitoring loop...\n");
    monitor.start().await;

    utils::print_final_statistics(&ledger.metrics().await);

    info!("🛑 Pending bridge transfers at shutdown: {}", ledger.get_pending().await.len());
    for tx in ledger.get_pending().await {
        warn!(
            "   {} ({} -> {}, {} CQT, {:?})",
            tx.tx_hash, tx.source_network, tx.target_network, tx.amount, tx.status
        );
    }

    Ok(())
}
