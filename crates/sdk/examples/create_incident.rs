use chrono::Utc;
use co3_sdk::co3_types::{AuthenticationDto, HandleFormat, IncidentDto, TextContentDto};
use co3_sdk::{ClientConfig, Co3Client};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let api = std::env::var("CO3_API_URL")
        .unwrap_or_else(|_| "https://localhost/rest/".to_string());
    let email = std::env::var("CO3_EMAIL")
        .expect("set CO3_EMAIL before running the example");
    let password = std::env::var("CO3_PASSWORD")
        .expect("set CO3_PASSWORD before running the example");

    let mut config = ClientConfig::new(api);
    config.handle_format = HandleFormat::Names;
    let mut client = Co3Client::new(&config)?;

    let session = client
        .authenticate(&AuthenticationDto::new(email, password))
        .await?;
    let org_id = session
        .orgs
        .first()
        .map(|org| org.id)
        .ok_or("user has no organizations")?;

    let incident = IncidentDto::new("sdk example", Utc::now())
        .with_description(TextContentDto::text("Created by the co3-sdk example"));
    let created = client.create_incident(org_id, &incident, true, false).await?;
    println!(
        "Created incident {:?} owned by {:?}",
        created.id(),
        created.incident.owner_id
    );

    client.logout().await?;
    Ok(())
}
