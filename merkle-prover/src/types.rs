//! 共享數據類型定義
//!
//! 演示配置與演示報告

use crate::config::ENV_PREFIX;
use serde::{Deserialize, Serialize};

/// 演示配置
///
/// 未在配置文件中出現的字段使用 `Default`（讀取環境變量）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// 葉子（隨機記錄）數量
    pub leaf_count: usize,

    /// 每條記錄的字節數
    pub record_size: usize,

    /// 用於存在性證明的葉子索引
    pub sample_index: usize,

    /// 隨機數種子（為空時使用系統熵）
    pub seed: Option<u64>,

    /// 是否按摘要排序葉子（不存在性證明需要）
    pub sort_leaves: bool,

    /// 長度擴展演示的秘密長度
    pub secret_len: usize,

    /// 長度擴展演示追加的後綴
    pub extension_suffix: String,
}

/// 讀取帶 `MERKLE_PROVER_` 前綴的環境變量，與 `load_config_from_env` 一致
fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .and_then(|s| s.parse().ok())
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            leaf_count: env_var("LEAF_COUNT").unwrap_or(100_000),
            record_size: env_var("RECORD_SIZE").unwrap_or(32),
            sample_index: env_var("SAMPLE_INDEX").unwrap_or(50_000),
            seed: env_var("SEED"),
            sort_leaves: env_var("SORT_LEAVES").unwrap_or(true),
            secret_len: env_var("SECRET_LEN").unwrap_or(32),
            extension_suffix: env_var("EXTENSION_SUFFIX")
                .unwrap_or_else(|| "__malicious_payload__".to_string()),
        }
    }
}

/// 默克爾樹演示結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerkleReport {
    /// 葉子總數
    pub leaf_count: usize,

    /// 樹高（層數）
    pub height: usize,

    /// 默克爾根（十六進制）
    pub root: String,

    /// 葉子是否按摘要排序
    pub sorted: bool,

    /// 存在性證明的葉子索引
    pub sample_index: usize,

    /// 存在性證明路徑長度
    pub inclusion_proof_depth: usize,

    /// 存在性證明是否通過
    pub inclusion_verified: bool,

    /// 篡改後的證明是否被拒絕
    pub tampered_inclusion_rejected: bool,

    /// 不存在性證明（僅在排序時生成）
    pub exclusion: Option<ExclusionReport>,
}

/// 不存在性證明演示結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExclusionReport {
    /// 插入位置
    pub position: u64,

    /// 左鄰居證明長度（沒有左鄰居時為空）
    pub left_proof_depth: Option<usize>,

    /// 右鄰居證明長度（沒有右鄰居時為空）
    pub right_proof_depth: Option<usize>,

    /// 缺失記錄的不存在性證明是否通過
    pub absent_verified: bool,

    /// 已存在記錄的不存在性證明是否被拒絕
    pub present_rejected: bool,
}

/// 長度擴展演示結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtensionReport {
    /// 秘密長度
    pub secret_len: usize,

    /// 追加的後綴
    pub suffix: String,

    /// 原始摘要 H(secret)
    pub original_digest: String,

    /// 攻擊者偽造的摘要
    pub forged_digest: String,

    /// 服務端對 secret || padding || suffix 計算的摘要
    pub real_digest: String,

    /// 偽造尾部長度（填充 + 後綴）
    pub forged_tail_len: usize,

    /// 偽造摘要與真實摘要是否一致
    pub forgery_matches: bool,

    /// 不帶填充的直接拼接是否得到不同摘要
    pub padding_required: bool,
}

/// 完整演示報告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoReport {
    pub merkle: MerkleReport,
    pub extension: ExtensionReport,
}

impl DemoReport {
    /// 所有檢查是否都符合預期
    pub fn all_passed(&self) -> bool {
        let merkle_ok = self.merkle.inclusion_verified && self.merkle.tampered_inclusion_rejected;
        let exclusion_ok = self
            .merkle
            .exclusion
            .as_ref()
            .map_or(true, |e| e.absent_verified && e.present_rejected);
        let extension_ok = self.extension.forgery_matches && self.extension.padding_required;

        merkle_ok && exclusion_ok && extension_ok
    }
}
