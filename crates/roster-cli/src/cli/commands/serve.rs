//! `roster serve` – run the fault-injection provider until Ctrl-C.

use anyhow::{Context, Result};
use roster_core::config::RosterConfig;
use roster_provider::FaultTable;
use std::net::SocketAddr;

pub async fn run_serve(cfg: &RosterConfig, bind: Option<SocketAddr>) -> Result<()> {
    let addr = match bind {
        Some(addr) => addr,
        None => cfg
            .provider
            .bind
            .parse()
            .with_context(|| format!("invalid provider.bind {:?}", cfg.provider.bind))?,
    };
    roster_provider::serve(addr, FaultTable::standard()).await
}
