use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "registrar-cli")]
#[command(about = "Management CLI for the route registrar", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Route a domain to a container
    AddDomain {
        #[arg(long)]
        domain: String,
        #[arg(long)]
        port: u16,
        #[arg(long)]
        service_name: String,
    },
    /// Invite a user to the team
    Invite {
        #[arg(long)]
        email: String,
    },
    /// Check service status
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::AddDomain {
            domain,
            port,
            service_name,
        } => {
            client
                .post(format!("{}/add-domain", base))
                .json(&json!({
                    "domain": domain,
                    "port": port,
                    "serviceName": service_name,
                }))
                .send()
                .await?
        }
        Commands::Invite { email } => {
            client
                .post(format!("{}/invite", base))
                .json(&json!({ "email": email }))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: registrar returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
