/*
[INPUT]:  EVM private key and login service URL from the environment
[OUTPUT]: Delegated session persisted under a local directory
[POS]:    Examples - chain-signature login demonstration
[UPDATE]: When the chain login flow changes
*/

use std::sync::Arc;

use delegate_bridge_core::*;

/// Example: Ethereum sign-in to a delegated session
///
/// 1. Restore any persisted session
/// 2. Otherwise sign the service's SIWE message with a local key
/// 3. Print the authority public key and expiration
#[tokio::main]
async fn main() {
    println!("=== Ethereum Delegated Login Example ===\n");

    let (Ok(service_url), Ok(private_key)) = (
        std::env::var("DELEGATE_BRIDGE_URL"),
        std::env::var("DELEGATE_BRIDGE_EVM_KEY"),
    ) else {
        eprintln!("Set DELEGATE_BRIDGE_URL and DELEGATE_BRIDGE_EVM_KEY to run this example");
        return;
    };

    let storage: Arc<dyn KeyValueStorage> =
        Arc::new(FileStorage::new(std::env::temp_dir().join("delegate-bridge-example")));
    let store = IdentityStore::new();

    let outcome = auth::restore_session(storage.as_ref(), &store).await;
    println!("✓ Restore finished: {:?}", outcome);
    if outcome == RestoreOutcome::Restored {
        print_identity(&store);
        return;
    }

    let wallet = match EvmWallet::new(&private_key) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Failed to load wallet: {}", e);
            return;
        }
    };
    println!("✓ Wallet loaded: {}", wallet.address());

    let service = match ServiceClient::new(&service_url, Chain::Ethereum) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };

    let login = ChainSignatureLogin::new(store.clone(), wallet, service, storage);
    match login.login().await {
        Ok(_) => print_identity(&store),
        Err(e) => eprintln!("Login failed: {}", e),
    }
}

fn print_identity(store: &IdentityStore) {
    let Some(Identity::Delegated(identity)) = store.identity() else {
        return;
    };
    println!("  Authority public key: {}", hex::encode(identity.public_key()));
    if let Some(expiration) = identity.chain().expiration() {
        println!("  Expires at (ns): {}", expiration);
    }
    println!("\n✓ Status: {}", store.status());
}
