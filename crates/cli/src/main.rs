//! Co3 Command Line Interface
//!
//! Create incidents and maintain select field values against a Co3 server.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use co3_sdk::{ClientConfig, Co3Client};
use co3_types::{AuthenticationDto, FieldDefDto, Handle, HandleFormat, IncidentDto, TextContentDto};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "co3-cli")]
#[command(about = "Co3 incident response REST API command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// REST API base URL, e.g. https://co3.example.com/rest/
    #[arg(long)]
    api_url: Option<String>,

    /// Handle wire format: default, ids, names or objects
    #[arg(long)]
    handle_format: Option<HandleFormat>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the organizations of the session
    Orgs,
    /// List select and multiselect incident fields
    Fields {
        #[arg(long)]
        org: i64,
    },
    /// Add values (one per line) to a select field
    AddFieldValues(AddFieldValuesCommand),
    /// Create an incident and print its id
    CreateIncident(CreateIncidentCommand),
    /// Print an incident as JSON
    ShowIncident {
        #[arg(long)]
        org: i64,
        #[arg(long)]
        id: i64,
    },
}

#[derive(Args)]
struct AddFieldValuesCommand {
    #[arg(long)]
    org: i64,
    /// Field API name or id
    #[arg(long)]
    field: String,
    /// File with one value per line
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

#[derive(Args)]
struct CreateIncidentCommand {
    #[arg(long)]
    org: i64,
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    /// Incident type id or name (repeatable)
    #[arg(long = "incident-type")]
    incident_types: Vec<String>,
    /// Discovery time in epoch milliseconds (defaults to now)
    #[arg(long, value_name = "EPOCH_MS")]
    discovered: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config)?;

    let credentials = credentials(&config)?;
    let mut client = Co3Client::new(&config).context("failed to build client")?;
    let session = client
        .authenticate(&credentials)
        .await
        .context("authentication failed")?;
    info!(
        user_id = session.user_id,
        handle_format = %config.handle_format,
        "session opened"
    );

    let outcome = run(&client, cli.command).await;

    if let Err(err) = client.logout().await {
        warn!(error = %err, "logout failed");
    }
    outcome
}

async fn run(client: &Co3Client, command: Commands) -> Result<()> {
    match command {
        Commands::Orgs => handle_orgs(client),
        Commands::Fields { org } => handle_fields(client, org).await,
        Commands::AddFieldValues(cmd) => handle_add_field_values(client, cmd).await,
        Commands::CreateIncident(cmd) => handle_create_incident(client, cmd).await,
        Commands::ShowIncident { org, id } => handle_show_incident(client, org, id).await,
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(format) = cli.handle_format {
        config.handle_format = format;
    }
    if let Some(email) = &cli.email {
        config.email = Some(email.clone());
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &ClientConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.log_format == "compact" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn credentials(config: &ClientConfig) -> Result<AuthenticationDto> {
    let email = config
        .email
        .as_deref()
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| anyhow!("no email configured; pass --email or set CO3_EMAIL"))?;
    let password = config
        .password
        .as_deref()
        .ok_or_else(|| anyhow!("no password configured; pass --password or set CO3_PASSWORD"))?;
    Ok(AuthenticationDto::new(email, password))
}

fn handle_orgs(client: &Co3Client) -> Result<()> {
    let session = client.session().ok_or_else(|| anyhow!("no session"))?;
    for org in &session.orgs {
        let state = if org.enabled { "" } else { " [disabled]" };
        println!("{org}{state}");
    }
    Ok(())
}

async fn handle_fields(client: &Co3Client, org: i64) -> Result<()> {
    let fields = client.get_field_types(org).await?;
    for field in select_fields(&fields) {
        println!("{}\t{field}\t{} values", field.id, field.values.len());
    }
    Ok(())
}

async fn handle_add_field_values(client: &Co3Client, cmd: AddFieldValuesCommand) -> Result<()> {
    let contents = tokio::fs::read_to_string(&cmd.file)
        .await
        .with_context(|| format!("failed to read {}", cmd.file.display()))?;

    let fields = client.get_field_types(cmd.org).await?;
    let mut field = find_field(&fields, &cmd.field)
        .cloned()
        .ok_or_else(|| anyhow!("no select field `{}` in org {}", cmd.field, cmd.org))?;

    let added = field.add_values(contents.lines());
    if added == 0 {
        println!("No new values for {field}");
        return Ok(());
    }

    let saved = client.save_field(cmd.org, &field).await?;
    info!(field = %saved.name, added, "field values saved");
    println!("Added {added} values to {saved} ({} total)", saved.values.len());
    Ok(())
}

async fn handle_create_incident(client: &Co3Client, cmd: CreateIncidentCommand) -> Result<()> {
    let discovered = match cmd.discovered {
        Some(millis) => parse_epoch_millis(millis)?,
        None => Utc::now(),
    };

    let mut incident = IncidentDto::new(cmd.name, discovered)
        .with_incident_types(cmd.incident_types.iter().map(|value| parse_handle(value)));
    if let Some(description) = cmd.description {
        incident = incident.with_description(TextContentDto::text(description));
    }

    let created = client.create_incident(cmd.org, &incident, true, false).await?;
    match created.id() {
        Some(id) => println!("{id}"),
        None => bail!("server did not return an incident id"),
    }
    Ok(())
}

async fn handle_show_incident(client: &Co3Client, org: i64, id: i64) -> Result<()> {
    let incident = client.get_incident(org, id).await?;
    println!("{}", client.codec().to_string_pretty(&incident)?);
    Ok(())
}

/// Select and multiselect fields an end user can edit.
fn select_fields(fields: &[FieldDefDto]) -> impl Iterator<Item = &FieldDefDto> {
    fields
        .iter()
        .filter(|field| field.input_type.is_select() && !field.internal)
}

fn find_field<'a>(fields: &'a [FieldDefDto], wanted: &str) -> Option<&'a FieldDefDto> {
    let wanted = wanted.trim();
    select_fields(fields).find(|field| field.name == wanted || field.id.to_string() == wanted)
}

/// Numeric arguments are ids, anything else a name.
fn parse_handle(value: &str) -> Handle {
    let value = value.trim();
    match value.parse::<i64>() {
        Ok(id) => Handle::from_id(id),
        Err(_) => Handle::from_name(value),
    }
}

fn parse_epoch_millis(millis: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| anyhow!("discovered time {millis} is out of range"))
}
