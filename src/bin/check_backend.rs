use std::sync::Arc;

use anyhow::Result;
use textscore::{ApiClient, CredentialStore, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    println!("===== TextScore Backend Check =====");

    let settings = Settings::load()?;
    println!("Backend: {}", settings.api_base_url);

    let credentials = Arc::new(CredentialStore::new(settings.credentials_path.clone()));
    println!(
        "Credential: {}",
        if credentials.is_authenticated() {
            "present"
        } else {
            "none"
        }
    );

    let api = ApiClient::new(&settings, credentials)?;

    match api.health_check().await {
        Ok(health) => {
            println!("Status: {}", health.status);
            for (service, state) in &health.services {
                println!("  {}: {}", service, state);
            }
        }
        Err(err) => {
            println!("Health check FAILED: {}", err);
            std::process::exit(1);
        }
    }

    println!("===== Check Complete =====");
    Ok(())
}
