use clap::Parser;
use oura_mcp::app::App;
use oura_mcp::config::ServerConfig;
use oura_mcp::constants::{env as env_keys, oauth};
use oura_mcp::services::logger::Logger;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "oura-mcp", version, about = "MCP server exposing Oura Ring data over stdio")]
struct Cli {
    /// Where refreshed tokens are read from and written to.
    #[arg(long, value_name = "PATH")]
    token_file: Option<PathBuf>,

    /// Validate the configuration and exit without serving.
    #[arg(long)]
    check: bool,
}

fn print_setup_guidance(reason: &str) {
    let rule = "=".repeat(60);
    eprintln!("Configuration error: {}", reason);
    eprintln!();
    eprintln!("{}", rule);
    eprintln!("QUICK START - Personal Access Token (Recommended)");
    eprintln!("{}", rule);
    eprintln!("1. Go to: {}", oauth::PERSONAL_TOKEN_URL);
    eprintln!("2. Create a new Personal Access Token");
    eprintln!("3. Set environment variable: {}=your_token_here", env_keys::ACCESS_TOKEN);
    eprintln!();
    eprintln!("For .env file setup:");
    eprintln!("  cp .env.example .env");
    eprintln!("  # Edit .env and add your {}", env_keys::ACCESS_TOKEN);
    eprintln!();
    eprintln!("{}", rule);
    eprintln!("ADVANCED - OAuth2 with Automatic Token Refresh");
    eprintln!("{}", rule);
    eprintln!("For production apps, set all of these:");
    for key in [
        env_keys::ACCESS_TOKEN,
        env_keys::REFRESH_TOKEN,
        env_keys::CLIENT_ID,
        env_keys::CLIENT_SECRET,
    ] {
        eprintln!("  - {}", key);
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let logger = Logger::new("oura-mcp");

    let mut config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("oura-mcp: {}", err);
            std::process::exit(1);
        }
    };
    if let Some(path) = cli.token_file {
        config.token_file = path;
    }

    let app = match App::initialize(config, logger.clone()) {
        Ok(app) => app,
        Err(err) => {
            eprintln!("oura-mcp: {}", err);
            std::process::exit(1);
        }
    };

    // A missing credential is a setup problem, not a crash: explain and exit cleanly.
    if let Err(reason) = app.credentials.validate() {
        print_setup_guidance(&reason);
        return;
    }

    if app.credentials.using_refresh_flow() {
        logger.info("Using OAuth2 with automatic token refresh", None);
    } else {
        logger.info("Using Personal Access Token", None);
    }
    if let Some(proxy) = app.oauth_proxy.as_ref() {
        logger.info(
            "OAuth session tokens accepted",
            serde_json::to_value(proxy).ok().as_ref(),
        );
    }

    if cli.check {
        logger.info("configuration is valid", None);
        return;
    }

    if let Err(err) = oura_mcp::mcp::server::run_stdio(app).await {
        eprintln!("oura-mcp: {}", err);
        std::process::exit(1);
    }
}
