use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use wander_nest::config::AppConfig;
use wander_nest::error::AppError;
use wander_nest::workflows::onboarding::{domain_gate::email_domain, InstitutionalEmailPolicy};
use wander_nest::workflows::safety::{emergency_contact_for_city, emergency_contacts};

#[derive(Parser, Debug)]
#[command(
    name = "WanderNest",
    about = "Run the WanderNest student guide service and its safety tooling",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Check whether an email would pass the institutional sign-in gate
    ClassifyEmail {
        /// Email address to classify
        email: String,
    },
    /// Print emergency numbers for one city, or for every supported city
    Contacts {
        #[arg(long)]
        city: Option<String>,
    },
    /// Walk through sign-in, report intake and escalation against in-memory stores
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::ClassifyEmail { email } => classify_email(&email),
        Command::Contacts { city } => print_contacts(city.as_deref()),
        Command::Demo(args) => run_demo(args),
    }
}

fn classify_email(email: &str) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let policy = InstitutionalEmailPolicy::from_config(&config.auth)?;

    let domain = email_domain(email).unwrap_or_else(|| "<none>".to_string());
    if policy.is_institutional(email) {
        println!("{email}: institutional (domain {domain}), sign-in creates a pending student");
    } else {
        println!(
            "{email}: not institutional (domain {domain}), redirected to {}",
            config.auth.manual_verification_path
        );
    }
    Ok(())
}

fn print_contacts(city: Option<&str>) -> Result<(), AppError> {
    let payload = match city {
        Some(city) => match emergency_contact_for_city(city) {
            Some(contact) => serde_json::to_value(contact),
            None => {
                println!("No emergency contacts on file for '{city}'");
                return Ok(());
            }
        },
        None => serde_json::to_value(emergency_contacts()),
    };

    match payload.and_then(|value| serde_json::to_string_pretty(&value)) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Emergency contacts unavailable: {err}"),
    }
    Ok(())
}
