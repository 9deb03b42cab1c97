//! 配置管理模塊
//!
//! 負責加載和驗證演示配置

use crate::error::{ProverError, Result};
use crate::types::DemoConfig;
use config::{Config, File};
use std::path::Path;

/// 環境變量前綴
pub const ENV_PREFIX: &str = "MERKLE_PROVER";

/// 從配置文件加載演示配置
///
/// # 參數
/// - `config_path`: 配置文件路徑（支持 TOML、JSON、YAML）
///
/// # 示例
/// ```no_run
/// use merkle_prover::config::load_config;
///
/// let config = load_config("merkle-prover.toml").expect("Failed to load config");
/// println!("Leaves: {}", config.leaf_count);
/// ```
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<DemoConfig> {
    let config = Config::builder()
        .add_source(File::from(config_path.as_ref()))
        .build()
        .map_err(|e| ProverError::Config(format!("Failed to load config file: {}", e)))?;

    let demo_config: DemoConfig = config
        .try_deserialize()
        .map_err(|e| ProverError::Config(format!("Failed to parse config: {}", e)))?;

    validate_config(&demo_config)?;

    Ok(demo_config)
}

/// 從環境變量加載配置
///
/// 環境變量前綴: `MERKLE_PROVER_`
/// 示例: `MERKLE_PROVER_LEAF_COUNT`, `MERKLE_PROVER_SORT_LEAVES`
pub fn load_config_from_env() -> Result<DemoConfig> {
    let config = Config::builder()
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .map_err(|e| ProverError::Config(format!("Failed to load env vars: {}", e)))?;

    let demo_config: DemoConfig = config
        .try_deserialize()
        .map_err(|e| ProverError::Config(format!("Failed to parse env config: {}", e)))?;

    validate_config(&demo_config)?;

    Ok(demo_config)
}

/// 驗證配置的有效性
pub fn validate_config(config: &DemoConfig) -> Result<()> {
    if config.leaf_count == 0 {
        return Err(ProverError::Config(
            "leaf_count must be greater than 0".to_string(),
        ));
    }

    if config.record_size == 0 {
        return Err(ProverError::Config(
            "record_size must be greater than 0".to_string(),
        ));
    }

    // 排序後會生成不存在性證明，需要至少一條可能的缺失記錄
    if config.sort_leaves && config.leaf_count as u64 >= record_space(config.record_size) {
        return Err(ProverError::Config(format!(
            "leaf_count {} leaves no room for an absent {}-byte record",
            config.leaf_count, config.record_size
        )));
    }

    if config.sample_index >= config.leaf_count {
        return Err(ProverError::Config(format!(
            "sample_index {} must be < leaf_count {}",
            config.sample_index, config.leaf_count
        )));
    }

    Ok(())
}

/// `record_size` 字節記錄的取值個數，溢出時飽和到 `u64::MAX`
pub fn record_space(record_size: usize) -> u64 {
    u32::try_from(record_size)
        .ok()
        .and_then(|exp| 256u64.checked_pow(exp))
        .unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn small_config() -> DemoConfig {
        DemoConfig {
            leaf_count: 16,
            record_size: 8,
            sample_index: 3,
            seed: Some(1),
            sort_leaves: true,
            secret_len: 16,
            extension_suffix: "admin=true".to_string(),
        }
    }

    #[test]
    fn test_small_config_is_valid() {
        assert!(validate_config(&small_config()).is_ok());
    }

    #[test]
    fn test_invalid_leaf_count() {
        let mut config = small_config();
        config.leaf_count = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_record_size() {
        let mut config = small_config();
        config.record_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_sample_index_out_of_range() {
        let mut config = small_config();
        config.sample_index = 16;
        assert!(matches!(validate_config(&config), Err(ProverError::Config(_))));
    }

    #[test]
    fn test_record_space() {
        assert_eq!(record_space(1), 256);
        assert_eq!(record_space(2), 65_536);
        assert_eq!(record_space(7), 1 << 56);
        assert_eq!(record_space(8), u64::MAX);
        assert_eq!(record_space(32), u64::MAX);
    }

    #[test]
    fn test_tiny_record_space() {
        let mut config = small_config();
        config.record_size = 1;
        config.sample_index = 0;

        config.leaf_count = 255;
        assert!(validate_config(&config).is_ok());

        config.leaf_count = 256;
        assert!(matches!(validate_config(&config), Err(ProverError::Config(_))));

        config.leaf_count = 2000;
        assert!(matches!(validate_config(&config), Err(ProverError::Config(_))));

        // 不排序時不生成不存在性證明
        config.sort_leaves = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "leaf_count = 64\nrecord_size = 16\nsample_index = 10\nseed = 42\nsort_leaves = false"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.leaf_count, 64);
        assert_eq!(config.record_size, 16);
        assert_eq!(config.sample_index, 10);
        assert_eq!(config.seed, Some(42));
        assert!(!config.sort_leaves);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "leaf_count = 4\nsample_index = 9").unwrap();

        assert!(matches!(load_config(file.path()), Err(ProverError::Config(_))));
    }
}
