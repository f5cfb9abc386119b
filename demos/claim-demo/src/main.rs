mod config;

use anyhow::{Context, Result};
use claims::{
    AssignName, AuthorizeEthKey, AuthorizeKSignBabyJub, Basic, Claim, ClaimStore, Id, SetRootKey,
};
use merkletree::{check_proof, hash_to_hex, FileBackedStorage, InMemoryStorage, Storage};
use tracing::info;

use crate::config::DemoConfig;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cfg = DemoConfig::from_env()?;
    info!(max_levels = cfg.tree.max_levels, prefix = %cfg.tree.key_prefix, "claim-demo starting");

    match &cfg.store_path {
        Some(path) => {
            let storage = FileBackedStorage::open(path)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("Failed to open store at {}", path.display()))?;
            info!(path = %storage.path().display(), "using file-backed store");
            run(ClaimStore::new(storage, &cfg.tree)?)
        }
        None => run(ClaimStore::new(InMemoryStorage::new(), &cfg.tree)?),
    }
}

fn run<S: Storage>(mut store: ClaimStore<S>) -> Result<()> {
    println!("=== Claim Demo: identity claims in a sparse Merkle tree ===\n");

    let id = Id::from([0x2a; 31]);

    // 1. Single claims
    println!("--- Adding claims ---");
    let name: Claim = AssignName::new("alice@example.org", id)?.into();
    let hi = store.add_claim(&name)?;
    println!("AssignName hi: {}", hash_to_hex(&hi));

    let mut ksign = [0x13u8; 32];
    ksign[31] = 0x91;
    let key: Claim = AuthorizeKSignBabyJub::from_compressed(&ksign)?.into();
    store.add_claim(&key)?;
    println!("Root: {}", hash_to_hex(&store.root()));

    // 2. Batch
    println!("\n--- Batch (64 claims) ---");
    let mut batch: Vec<Claim> = Vec::new();
    for i in 0..32u8 {
        let mut index = [0u8; 50];
        index[0] = i;
        batch.push(Basic::new(index, [i; 62]).into());
        batch.push(AuthorizeEthKey::new(&[i; 20], u32::from(i))?.into());
    }
    let root = store.add_claims_batch(&batch)?;
    println!("Batch committed! Root: {}", hash_to_hex(&root));

    // 3. Proof
    println!("\n--- Existence proof ---");
    let proof = store.claim_proof(&name)?;
    let bytes = proof.proof.to_bytes();
    println!("Proof levels: {}", proof.proof.levels());
    println!("Proof siblings: {} (of {} levels)", proof.proof.siblings().len(), proof.proof.levels());
    println!("Proof size: {} bytes", bytes.len());
    let ok = ClaimStore::<S>::verify_claim_proof(&proof);
    println!("Verification: {}", if ok { "OK ✅" } else { "FAIL ❌" });

    // 4. Non-existence
    println!("\n--- Non-existence proof ---");
    let absent: Claim = SetRootKey::new(id, [0u8; 32])?.into();
    let proof = store.claim_proof(&absent)?;
    let (absent_hi, absent_hv) = (proof.entry.hi()?, proof.entry.hv()?);
    println!("Ends in: {}", if proof.proof.aux().is_some() { "other leaf" } else { "empty slot" });
    let ok = !proof.proof.is_existence()
        && check_proof(&root, &proof.proof.to_bytes(), &absent_hi, &absent_hv);
    println!("Absent claim proven absent: {}", if ok { "OK ✅" } else { "FAIL ❌" });

    // 5. Tamper resistance
    println!("\n--- Tamper Resistance ---");
    let mut tampered = bytes.clone();
    let last = tampered.len() - 1;
    tampered[last] ^= 0x01;
    let name_entry = name.to_entry();
    let ok_tamper = check_proof(&root, &tampered, &name_entry.hi()?, &name_entry.hv()?);
    println!("Tampered Verification: {}", if ok_tamper { "OK (BAD!) ❌" } else { "FAIL (GOOD) ✅" });

    println!("\nProof hex: {}", hex::encode(&bytes));
    Ok(())
}
