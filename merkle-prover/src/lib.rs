//! 基於 SM3 的默克爾樹證明器
//!
//! 本 crate 實現了:
//! 1. 以 SM3 為承諾原語的默克爾樹（域分離前綴、奇數節點自配對）
//! 2. 存在性證明的生成與驗證
//! 3. 按摘要排序葉子上的不存在性證明
//! 4. 默克爾樹與 SM3 長度擴展的端到端演示
//!
//! # 架構
//!
//! ```text
//! ┌──────────────┐
//! │   Scenario   │  ← 演示流程
//! └──────┬───────┘
//!        │
//!   ┌────┴────┬──────────┐
//!   ▼         ▼          ▼
//! MerkleTree  sm3-engine  Config
//! ```
//!
//! # 示例用法
//!
//! ```
//! use merkle_prover::MerkleTree;
//!
//! let records: Vec<Vec<u8>> = (0..10u8).map(|i| vec![i; 4]).collect();
//! let tree = MerkleTree::build_sorted(&records).unwrap();
//!
//! let proof = tree.prove_exclusion(b"absent record").unwrap();
//! assert!(tree.verify_exclusion(b"absent record", &proof));
//! ```

// 公開模塊
pub mod config;
pub mod crypto;
pub mod error;
pub mod scenario;
pub mod types;

// Re-export 常用類型
pub use crypto::merkle::{ExclusionProof, InclusionProof, MerkleError, MerkleTree};
pub use error::{ProverError, Result};
pub use types::{DemoConfig, DemoReport};
