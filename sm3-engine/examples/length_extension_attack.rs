//! Demonstrate an SM3 length-extension forgery
//!
//! ```bash
//! cargo run -p sm3-engine --example length_extension_attack
//! ```

use sm3_engine::{forge, hash, to_hex};

fn main() {
    println!("=== SM3 Length-Extension Attack ===\n");

    // 1. The server holds a secret and publishes H(secret)
    let secret = b"0123456789abcdef0123456789abcdef";
    let original = hash(secret);

    println!("✓ Server published digest");
    println!("  Secret length: {} bytes (contents unknown to attacker)", secret.len());
    println!("  Digest: {}", to_hex(&original));
    println!();

    // 2. Attacker forges a digest for secret ‖ padding ‖ suffix
    let suffix = b"__malicious_payload__";
    let forgery = forge(&original, secret.len() as u64, suffix);

    println!("✓ Forgery computed");
    println!("  Suffix: {}", String::from_utf8_lossy(suffix));
    println!("  Forged tail length: {} bytes", forgery.forged_tail.len());
    println!("  Forged digest: {}", to_hex(&forgery.digest));
    println!();

    // 3. Server recomputes the digest over the forged message
    let mut forged_message = secret.to_vec();
    forged_message.extend_from_slice(&forgery.forged_tail);
    let real = hash(&forged_message);

    println!("Step: Server hashes secret ‖ forged tail...");
    println!("  Real digest:   {}", to_hex(&real));
    if real == forgery.digest {
        println!("✓ Attack succeeded: digests match");
    } else {
        println!("✗ Attack failed: digests differ");
    }
}
