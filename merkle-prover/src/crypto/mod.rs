//! 密碼學模塊
//!
//! 包含基於 SM3 的默克爾樹:
//! - 存在性證明
//! - 不存在性證明（按摘要排序的葉子）

pub mod merkle;

// Re-export commonly used types
pub use merkle::{
    hash_leaf, hash_node, verify_exclusion, ExclusionProof, InclusionProof, MerkleError,
    MerkleRoot, MerkleTree, NeighborProof,
};
