//! 演示不存在性證明
//!
//! 執行方式：
//! ```bash
//! cargo run -p merkle-prover --example exclusion_proof
//! ```

use merkle_prover::MerkleTree;
use sm3_engine::to_hex;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== SM3 Merkle Exclusion Proof ===\n");

    // 1. 構建按摘要排序的樹
    let records: Vec<Vec<u8>> = (0..1000u32).map(|i| format!("user-{}", i).into_bytes()).collect();
    let tree = MerkleTree::build_sorted(&records)?;

    println!("✓ Built tree");
    println!("  Leaves: {}", tree.leaf_count());
    println!("  Root: {}", to_hex(&tree.root()));
    println!();

    // 2. 對缺失記錄生成不存在性證明
    let absent = b"user-1000";
    let proof = tree.prove_exclusion(absent)?;

    println!("✓ Exclusion proof for {:?}", String::from_utf8_lossy(absent));
    println!("  Insert position: {}", proof.position);
    if let Some(left) = &proof.left {
        println!("  Left neighbor:  {}", String::from_utf8_lossy(&left.record));
    }
    if let Some(right) = &proof.right {
        println!("  Right neighbor: {}", String::from_utf8_lossy(&right.record));
    }
    println!();

    // 3. 驗證
    match tree.verify_exclusion(absent, &proof) {
        true => println!("✓ Verified: record is not in the tree"),
        false => println!("✗ Verification failed"),
    }

    // 4. 已存在的記錄不能通過不存在性驗證
    let present = b"user-42";
    let forged = tree.prove_exclusion(present)?;
    match tree.verify_exclusion(present, &forged) {
        false => println!("✓ Correct: present record was rejected"),
        true => println!("✗ Critical error: present record passed exclusion!"),
    }

    Ok(())
}
