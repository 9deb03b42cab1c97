//! 端到端演示流程
//!
//! 1. 生成隨機記錄並構建默克爾樹
//! 2. 生成並驗證存在性證明，再驗證篡改後的證明被拒絕
//! 3. 對缺失記錄生成並驗證不存在性證明
//! 4. 對隨機秘密執行 SM3 長度擴展攻擊

use crate::crypto::merkle::MerkleTree;
use crate::error::{ProverError, Result};
use crate::types::{DemoConfig, DemoReport, ExclusionReport, ExtensionReport, MerkleReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sm3_engine::{forge, hash, to_hex};
use tracing::{debug, info, warn};

/// 尋找缺失記錄的最大嘗試次數
pub const MAX_ABSENT_ATTEMPTS: usize = 10_000;

fn random_bytes(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes
}

/// 隨機生成一條不在樹中的記錄
///
/// 記錄空間被葉子佔滿時在 `MAX_ABSENT_ATTEMPTS` 次後放棄。
fn find_absent_record(
    tree: &MerkleTree,
    rng: &mut StdRng,
    record_size: usize,
) -> Result<Vec<u8>> {
    for _ in 0..MAX_ABSENT_ATTEMPTS {
        let candidate = random_bytes(rng, record_size);
        if !tree.contains(&candidate) {
            return Ok(candidate);
        }
    }

    warn!(
        "No absent {}-byte record found after {} attempts",
        record_size, MAX_ABSENT_ATTEMPTS
    );
    Err(ProverError::Config(format!(
        "no absent {}-byte record found among {} leaves after {} attempts",
        record_size,
        tree.leaf_count(),
        MAX_ABSENT_ATTEMPTS
    )))
}

/// 執行完整演示
pub fn run_demo(config: &DemoConfig) -> Result<DemoReport> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let merkle = run_merkle_demo(config, &mut rng)?;
    let extension = run_extension_demo(config, &mut rng);

    Ok(DemoReport { merkle, extension })
}

/// 默克爾樹部分
pub fn run_merkle_demo(config: &DemoConfig, rng: &mut StdRng) -> Result<MerkleReport> {
    info!("Generating {} random records...", config.leaf_count);
    let records: Vec<Vec<u8>> = (0..config.leaf_count)
        .map(|_| random_bytes(rng, config.record_size))
        .collect();

    info!("Building Merkle tree...");
    let tree = if config.sort_leaves {
        MerkleTree::build_sorted(&records)?
    } else {
        MerkleTree::build(&records)?
    };
    info!("Merkle root: {}", to_hex(&tree.root()));
    info!("Tree height: {}", tree.height());

    // 存在性證明
    let index = config.sample_index;
    let proof = tree.prove_inclusion(index)?;
    let record = tree.record(index).unwrap_or_default().to_vec();
    let inclusion_verified = tree.verify_inclusion(&record, index, &proof);
    info!(
        "Inclusion proof for leaf {}: depth={}, verified={}",
        index,
        proof.depth(),
        inclusion_verified
    );

    // 單葉子樹的路徑為空，改為篡改記錄本身
    let tampered_inclusion_rejected = if proof.path.is_empty() {
        let mut tampered_record = record.clone();
        tampered_record.push(0);
        !tree.verify_inclusion(&tampered_record, index, &proof)
    } else {
        let mut tampered = proof.clone();
        tampered.path[0][0] ^= 0x01;
        !tree.verify_inclusion(&record, index, &tampered)
    };
    debug!("Tampered inclusion proof rejected: {}", tampered_inclusion_rejected);

    // 不存在性證明
    let exclusion = if tree.is_sorted() {
        let absent = find_absent_record(&tree, rng, config.record_size)?;

        let proof = tree.prove_exclusion(&absent)?;
        let absent_verified = tree.verify_exclusion(&absent, &proof);
        info!(
            "Exclusion proof: position={}, verified={}",
            proof.position, absent_verified
        );

        let present_proof = tree.prove_exclusion(&record)?;
        let present_rejected = !tree.verify_exclusion(&record, &present_proof);

        Some(ExclusionReport {
            position: proof.position,
            left_proof_depth: proof.left.as_ref().map(|n| n.proof.depth()),
            right_proof_depth: proof.right.as_ref().map(|n| n.proof.depth()),
            absent_verified,
            present_rejected,
        })
    } else {
        info!("Leaves not sorted by digest, skipping exclusion proof");
        None
    };

    Ok(MerkleReport {
        leaf_count: tree.leaf_count(),
        height: tree.height(),
        root: to_hex(&tree.root()),
        sorted: tree.is_sorted(),
        sample_index: index,
        inclusion_proof_depth: proof.depth(),
        inclusion_verified,
        tampered_inclusion_rejected,
        exclusion,
    })
}

/// 長度擴展部分
pub fn run_extension_demo(config: &DemoConfig, rng: &mut StdRng) -> ExtensionReport {
    let secret = random_bytes(rng, config.secret_len);
    let suffix = config.extension_suffix.as_bytes();

    let original = hash(&secret);
    let forgery = forge(&original, secret.len() as u64, suffix);

    let mut forged_message = secret.clone();
    forged_message.extend_from_slice(&forgery.forged_tail);
    let real = hash(&forged_message);

    let mut naive = secret;
    naive.extend_from_slice(suffix);
    let padding_required = hash(&naive) != forgery.digest;

    info!(
        "Length extension: forged={}, matches={}",
        to_hex(&forgery.digest),
        real == forgery.digest
    );

    ExtensionReport {
        secret_len: config.secret_len,
        suffix: config.extension_suffix.clone(),
        original_digest: to_hex(&original),
        forged_digest: to_hex(&forgery.digest),
        real_digest: to_hex(&real),
        forged_tail_len: forgery.forged_tail.len(),
        forgery_matches: real == forgery.digest,
        padding_required,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(leaf_count: usize, sort_leaves: bool) -> DemoConfig {
        DemoConfig {
            leaf_count,
            record_size: 32,
            sample_index: leaf_count / 2,
            seed: Some(2024),
            sort_leaves,
            secret_len: 16,
            extension_suffix: "admin=true".to_string(),
        }
    }

    #[test]
    fn test_sorted_demo_passes() {
        let report = run_demo(&config(257, true)).unwrap();

        assert!(report.all_passed());
        assert_eq!(report.merkle.leaf_count, 257);
        assert_eq!(report.merkle.height, 10);
        assert!(report.merkle.exclusion.is_some());
    }

    #[test]
    fn test_unsorted_demo_skips_exclusion() {
        let report = run_demo(&config(33, false)).unwrap();

        assert!(report.merkle.inclusion_verified);
        assert!(report.merkle.exclusion.is_none());
        assert!(report.extension.forgery_matches);
    }

    #[test]
    fn test_single_leaf_demo() {
        let report = run_demo(&config(1, true)).unwrap();
        assert!(report.all_passed());
        assert_eq!(report.merkle.inclusion_proof_depth, 0);
    }

    #[test]
    fn test_small_record_space_demo_passes() {
        let mut config = config(100, true);
        config.record_size = 1;
        let report = run_demo(&config).unwrap();

        assert!(report.all_passed());
        assert!(report.merkle.exclusion.is_some());
    }

    #[test]
    fn test_exhausted_record_space_gives_up() {
        // 5000 條單字節記錄幾乎必然覆蓋全部 256 個取值
        let mut config = config(5000, true);
        config.record_size = 1;

        match run_demo(&config) {
            Err(ProverError::Config(msg)) => assert!(msg.contains("no absent")),
            other => panic!("Expected Config error, got {:?}", other.map(|r| r.merkle.root)),
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let first = run_demo(&config(40, true)).unwrap();
        let second = run_demo(&config(40, true)).unwrap();

        assert_eq!(first.merkle.root, second.merkle.root);
        assert_eq!(first.extension.forged_digest, second.extension.forged_digest);
    }
}
