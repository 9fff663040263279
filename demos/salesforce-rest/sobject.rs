//! Example of using the REST API sObject operations.
//!
//! This example demonstrates:
//! - Listing API versions (unauthenticated)
//! - Describing an object
//! - Creating, reading, updating and deleting an Account
//! - Searching Leads with SOQL
//! - Resolving a resource by name
//!
//! Set `SALESFORCE_CLIENT_ID`, `SALESFORCE_CLIENT_SECRET`, `SALESFORCE_USERNAME`,
//! `SALESFORCE_PASSWORD` and optionally `SALESFORCE_SECURITY_TOKEN` and
//! `SALESFORCE_AUTH_URL`. Use `RUST_LOG=salesforce_rest=debug` to see requests.

use salesforce_rest::client::{self, Credentials};
use salesforce_rest::sobject::Resource;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = client::Builder::new()
        .base_uri("https://login.salesforce.com")
        .credentials(Credentials {
            client_id: std::env::var("SALESFORCE_CLIENT_ID")?,
            client_secret: std::env::var("SALESFORCE_CLIENT_SECRET")?,
            username: std::env::var("SALESFORCE_USERNAME")?,
            password: std::env::var("SALESFORCE_PASSWORD")?,
            security_token: std::env::var("SALESFORCE_SECURITY_TOKEN").unwrap_or_default(),
            auth_url: std::env::var("SALESFORCE_AUTH_URL").ok(),
        })
        .version("v58.0")
        .build()?;

    let versions = client.util().versions().await?;
    info!("Available versions: {versions}");

    let account = client.account();
    let describe = account.describe().await?;
    info!("Account has {} fields", describe["fields"].as_array().map_or(0, Vec::len));

    info!("Creating an account");
    let created = account.create(&json!({"Name": "Example Account"})).await?;
    let Some(id) = created["id"].as_str() else {
        warn!("Create failed: {created}");
        return Ok(());
    };
    info!("Created account {id} on {}", client.base_uri());

    let record = account.get(id).await?;
    info!("Fetched: {record}");

    let updated = account
        .update(id, &json!({"Name": "Example Account (renamed)"}))
        .await?;
    info!("Updated: {updated}");

    let deleted = account.delete(id).await?;
    info!("Deleted (status 200): {deleted}");

    if let Some(Resource::SObject(leads)) = client.resource("lead") {
        let open = leads
            .search("Id, Name, Company", &["Status = 'Open - Not Contacted'"])
            .await?;
        info!("Open leads: {}", open["totalSize"]);
    }

    Ok(())
}
