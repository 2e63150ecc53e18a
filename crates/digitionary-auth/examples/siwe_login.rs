/*
[INPUT]:  Local private key and auth backend URL
[OUTPUT]: Authenticated wallet session
[POS]:    Examples - sign-in flow demonstration
[UPDATE]: When the sign-in flow changes
*/

use std::sync::Arc;

use digitionary_auth::*;

/// Example: Sign-In-With-Ethereum flow
///
/// 1. Create a wallet capability
/// 2. Create the authenticator and login controller
/// 3. Sign in (message is built, signed, and verified by the backend)
/// 4. Log out
#[tokio::main]
async fn main() {
    let base_url =
        std::env::var("DIGITIONARY_API").unwrap_or_else(|_| "http://localhost:8000".to_string());

    // Well-known development key; never use it for real funds
    let wallet = match LocalWallet::new(
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        1,
    ) {
        Ok(wallet) => wallet,
        Err(e) => {
            eprintln!("Failed to load wallet: {e}");
            return;
        }
    };
    println!("✓ Wallet loaded: {}", wallet.address());

    let client = match AuthClient::with_base_url(&base_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create client: {e}");
            return;
        }
    };
    let page = PageContext::new("localhost:3000", "http://localhost:3000");
    let controller = LoginController::new(SiweAuthenticator::new(
        client,
        Some(Arc::new(wallet)),
        page,
    ));

    match controller.sign_in_with_ethereum(&CancellationToken::new()).await {
        Ok(session) => println!("✓ Signed in as {:?}", session.address),
        Err(e) => {
            eprintln!("✗ {} ({e})", e.user_notice());
            return;
        }
    }

    if let Err(e) = controller.logout().await {
        eprintln!("Logout request failed: {e}");
    }
    println!("✓ Session cleared: {:?}", controller.session());
}
