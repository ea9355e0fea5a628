use std::path::Path;
use wheelforge_domain::services::chain::ChainSnapshot;

/// Reads an option-chain snapshot saved as JSON.
pub fn load_chain_snapshot(path: &Path) -> Result<ChainSnapshot, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read chain snapshot {}: {err}", path.display()))?;
    let snapshot: ChainSnapshot = serde_json::from_str(&raw)
        .map_err(|err| format!("failed to parse chain snapshot {}: {err}", path.display()))?;
    metrics::counter!("wheelforge.infra.chain.snapshots_total").increment(1);
    tracing::debug!(
        symbol = %snapshot.symbol,
        contracts = snapshot.contracts.len(),
        "loaded chain snapshot"
    );
    Ok(snapshot)
}
