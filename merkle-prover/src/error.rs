//! 統一錯誤類型定義
//!
//! 使用 thiserror crate 提供良好的錯誤鏈和上下文信息。
//! 證明驗證失敗不是錯誤，驗證函數返回 `bool`。

use thiserror::Error;

use crate::crypto::merkle::MerkleError;

/// 證明器錯誤類型
#[derive(Error, Debug)]
pub enum ProverError {
    /// 默克爾樹錯誤（索引越界、空數據、葉子未排序）
    #[error("Merkle tree error: {0}")]
    Merkle(#[from] MerkleError),

    /// 配置錯誤
    ///
    /// 當配置文件格式錯誤或參數不合理時返回此錯誤
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result 類型別名
pub type Result<T> = std::result::Result<T, ProverError>;
