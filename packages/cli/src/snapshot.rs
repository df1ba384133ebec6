//! Snapshot files on disk

use anyhow::{Context, Result};
use farmcalc_sdk::{parse_block_head, parse_farm_storage, parse_pool_storage, BlockHead, FarmStorage, PoolStorage};
use std::path::{Path, PathBuf};

/// Paths of the three files one farm view is built from.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    pub farm: PathBuf,
    pub pool: PathBuf,
    pub head: PathBuf,
}

/// One consistent read of farm, pool and block head.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub farm: FarmStorage,
    pub pool: PoolStorage,
    pub head: BlockHead,
}

impl Snapshot {
    /// Read and decode all three files. Any failure discards the whole read.
    pub async fn load(paths: &SnapshotPaths) -> Result<Self> {
        let (farm, pool, head) = tokio::try_join!(
            load_farm(&paths.farm),
            load_pool(&paths.pool),
            load_head(&paths.head),
        )?;
        log::debug!("snapshot loaded at level {}", head.level);
        Ok(Self { farm, pool, head })
    }
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))
}

pub async fn load_farm(path: &Path) -> Result<FarmStorage> {
    let text = read(path).await?;
    parse_farm_storage(&text).with_context(|| format!("Invalid farm snapshot: {}", path.display()))
}

pub async fn load_pool(path: &Path) -> Result<PoolStorage> {
    let text = read(path).await?;
    parse_pool_storage(&text).with_context(|| format!("Invalid pool snapshot: {}", path.display()))
}

pub async fn load_head(path: &Path) -> Result<BlockHead> {
    let text = read(path).await?;
    parse_block_head(&text).with_context(|| format!("Invalid block head snapshot: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmcalc_sdk::Decimal;
    use std::fs;

    const FARM: &str = r#"{
        "farm": {
            "lastBlockUpdate": "1500000",
            "accumulatedRewardPerShare": "2500",
            "plannedRewards": { "rewardPerBlock": "1000", "totalBlocks": "100" },
            "claimedRewards": { "paid": "0", "unpaid": "0" },
            "penalty": { "feePercentage": "5", "periodSeconds": "86400" }
        },
        "farmLpTokenBalance": "4000000",
        "delegators": {}
    }"#;
    const POOL: &str = r#"{"storage": {"tez_pool": "1000000000", "token_pool": "2000000000", "total_supply": "8000000"}}"#;
    const HEAD: &str = r#"{"level": 1500010, "timestamp": "2021-07-01T13:00:00Z"}"#;

    fn write_all(dir: &Path, farm: &str, pool: &str, head: &str) -> SnapshotPaths {
        let paths = SnapshotPaths {
            farm: dir.join("farm.json"),
            pool: dir.join("pool.json"),
            head: dir.join("head.json"),
        };
        fs::write(&paths.farm, farm).unwrap();
        fs::write(&paths.pool, pool).unwrap();
        fs::write(&paths.head, head).unwrap();
        paths
    }

    #[tokio::test]
    async fn loads_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_all(dir.path(), FARM, POOL, HEAD);
        let snapshot = Snapshot::load(&paths).await.unwrap();
        assert_eq!(snapshot.head.level, 1_500_010);
        assert_eq!(snapshot.pool.lp_total_supply, Decimal::from(8_000_000u64));
        assert_eq!(snapshot.farm.farm.total_staked_lp, Decimal::from(4_000_000u64));
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_all(dir.path(), FARM, POOL, HEAD);
        paths.pool = dir.path().join("absent.json");
        let err = Snapshot::load(&paths).await.unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }

    #[tokio::test]
    async fn malformed_snapshot_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_all(dir.path(), FARM, r#"{"storage": {"tez_pool": 1.5}}"#, HEAD);
        let err = Snapshot::load(&paths).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid pool snapshot"));
    }

    #[tokio::test]
    async fn bundled_demo_snapshots_load() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        let paths = SnapshotPaths {
            farm: demos.join("farm.json"),
            pool: demos.join("pool.json"),
            head: demos.join("head.json"),
        };
        let snapshot = Snapshot::load(&paths).await.unwrap();
        assert!(snapshot.farm.delegator("tz1alice").is_some());
        assert_eq!(snapshot.pool.reserves.fee_rate_bps, Decimal::from(30u32));
    }
}
