/*
[INPUT]:  Parsed subcommand arguments and loaded AuthConfig
[OUTPUT]: Terminal output for each sign-in operation
[POS]:    CLI command layer
[UPDATE]: When subcommands or their output change
*/

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use console::style;
use dialoguer::Password;
use dialoguer::theme::ColorfulTheme;
use tokio_util::sync::CancellationToken;

use digitionary_auth::{
    AuthClient, AuthConfig, AuthError, LocalWallet, LoginController, SiweAuthenticator, SiweMessage,
    WalletProvider, recover_address,
};

pub async fn run_login(
    config: &AuthConfig,
    private_key: Option<String>,
    chain_id: u64,
    shutdown: &CancellationToken,
) -> Result<()> {
    let private_key = match private_key {
        Some(key) => key,
        None => Password::with_theme(&ColorfulTheme::default())
            .with_prompt("Wallet private key (hex)")
            .interact()
            .context("read private key")?,
    };
    let wallet = LocalWallet::new(&private_key, chain_id).context("load wallet")?;
    println!("{} {}", style("Wallet:").bold(), wallet.address());

    let wallet: Arc<dyn WalletProvider> = Arc::new(wallet);
    let authenticator =
        SiweAuthenticator::from_config(config, Some(wallet)).context("build authenticator")?;
    let controller = LoginController::new(authenticator);

    match controller.sign_in_with_ethereum(shutdown).await {
        Ok(session) => {
            println!(
                "{} {}",
                style("Signed in as").green().bold(),
                session.address.as_deref().unwrap_or_default()
            );
            Ok(())
        }
        Err(err) => {
            println!("{}", style(err.user_notice()).red());
            Err(anyhow!(err))
        }
    }
}

pub fn run_message(config: &AuthConfig, address: &str, chain_id: u64) -> Result<()> {
    let authenticator = SiweAuthenticator::from_config(config, None).context("build authenticator")?;
    let message = authenticator
        .prepare_message(address, chain_id)
        .context("build SIWE message")?;
    println!("{message}");
    Ok(())
}

pub fn run_verify(message_file: &Path, signature: &str) -> Result<()> {
    let message = std::fs::read_to_string(message_file)
        .with_context(|| format!("read {}", message_file.display()))?;
    let message = message.strip_suffix('\n').unwrap_or(&message);

    let parsed: SiweMessage = message.parse().context("parse SIWE message")?;
    let now = Utc::now();
    if parsed.is_expired(now) {
        println!(
            "{} {}",
            style("Message expired at").red().bold(),
            parsed.expiration_time().unwrap_or_default()
        );
        bail!("message expired");
    }
    if !parsed.is_active(now) {
        println!(
            "{} {}",
            style("Message not valid before").red().bold(),
            parsed.not_before().unwrap_or_default()
        );
        bail!("message not yet valid");
    }

    let recovered = recover_address(message, signature).context("recover signer")?;
    let matches = recovered.eq_ignore_ascii_case(parsed.address());

    println!("{} {}", style("Message address:").bold(), parsed.address());
    println!("{} {}", style("Recovered signer:").bold(), recovered);
    if matches {
        println!("{}", style("Signature valid").green().bold());
        Ok(())
    } else {
        println!("{}", style("Signature does not match message address").red().bold());
        Err(anyhow!(AuthError::InvalidSignature(
            "signer does not match message address".to_string()
        )))
    }
}

pub async fn run_sso(config: &AuthConfig, resolve: bool) -> Result<()> {
    let authenticator = SiweAuthenticator::from_config(config, None).context("build authenticator")?;
    if resolve {
        let redirect = authenticator
            .client()
            .resolve_sso_redirect()
            .await
            .context("resolve SSO redirect")?;
        println!("{redirect}");
        return Ok(());
    }

    let controller = LoginController::new(authenticator);
    let handoff = controller.sign_in_with_sso().context("start SSO")?;
    println!("{} {}", style("Open:").bold(), handoff.url);
    Ok(())
}

pub async fn run_logout(config: &AuthConfig) -> Result<()> {
    let controller = LoginController::new(
        SiweAuthenticator::from_config(config, None).context("build authenticator")?,
    );
    match controller.logout().await {
        Ok(()) => println!("{}", style("Logged out").green()),
        Err(err) => println!(
            "{} ({})",
            style("Logged out locally").yellow(),
            err.user_notice()
        ),
    }
    Ok(())
}

pub async fn run_health(config: &AuthConfig) -> Result<()> {
    let client = AuthClient::with_config(config.client_config(), &config.api_base_url)
        .context("build client")?;
    let health = client.health().await.context("query health")?;
    if health.is_ok() {
        println!("{}", style(&health.status).green());
        Ok(())
    } else {
        Err(anyhow!("backend reports status {}", health.status))
    }
}
