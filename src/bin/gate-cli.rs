use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{COOKIE, LOCATION};
use serde_json::{json, Value};

use rental_gate::config::{load_config, GateServiceConfig};
use rental_gate::gate::{AccessPolicy, RoutingDecision};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Management CLI for the rental-gate route-access gate", long_about = None)]
struct Cli {
    /// Gate configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "RENTAL_GATE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the compiled rules
    Validate,
    /// Evaluate a path against the policy without a running server
    Eval {
        /// Request path, e.g. /admin/dashboard
        path: String,
        /// Treat the request as carrying a session cookie
        #[arg(short, long)]
        authenticated: bool,
    },
    /// Send a request to a running gate and report its decision
    Probe {
        /// Request path, e.g. /admin/dashboard
        path: String,
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,
        /// Raw Cookie header to send
        #[arg(long)]
        cookie: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => GateServiceConfig::default(),
    };

    let output = match cli.command {
        Commands::Validate => {
            let policy = AccessPolicy::from_config(&config.gate)?;
            let rules: Vec<Value> = policy
                .rules()
                .iter()
                .map(|rule| {
                    json!({
                        "prefix": rule.matcher.as_str(),
                        "requires_auth": rule.requires_auth,
                        "exemptions": rule.exemptions.iter().map(|e| e.as_str()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            json!({
                "valid": true,
                "login_path": policy.login_path(),
                "session_cookie": config.gate.session_cookie,
                "rules": rules,
            })
        }
        Commands::Eval { path, authenticated } => {
            let policy = AccessPolicy::from_config(&config.gate)?;
            let decision = policy.evaluate(&path, authenticated);
            let mut out = json!({
                "path": path,
                "authenticated": authenticated,
                "protected": policy.is_protected(&path),
                "exempt": policy.is_exempt(&path),
                "decision": decision.outcome(),
            });
            if let RoutingDecision::RedirectTo(redirect) = decision {
                out["location"] = json!(redirect.target);
                out["status"] = json!(redirect.status.code());
            }
            out
        }
        Commands::Probe { path, url, cookie } => probe(&url, &path, cookie.as_deref()).await?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn probe(base: &str, path: &str, cookie: Option<&str>) -> Result<Value, Box<dyn std::error::Error>> {
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;

    let mut request = client.get(format!("{}{}", base.trim_end_matches('/'), path));
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    let res = request.send().await?;

    let status = res.status();
    let location = res
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Ok(json!({
        "path": path,
        "status": status.as_u16(),
        "decision": if status.is_redirection() { "redirect" } else { "allow" },
        "location": location,
    }))
}
