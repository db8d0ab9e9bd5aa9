//! Shop CLI - a command line storefront client.
//!
//! Commands:
//! - `shop login` / `shop signup` / `shop logout` / `shop whoami` - Session
//! - `shop reviews` - List, rate, vote on and delete product reviews
//! - `shop cart add` - Add a product to the cart
//! - `shop recent` - Recently viewed products
//! - `shop config` - Manage configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{CartArgs, ConfigArgs, LoginArgs, RecentArgs, ReviewsArgs, SignupArgs, WhoamiArgs};

/// Shop CLI - browse, review and buy from the storefront
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in to your account
    Login(LoginArgs),

    /// Create an account
    Signup(SignupArgs),

    /// Log out and forget the session
    Logout,

    /// Show the logged-in user
    Whoami(WhoamiArgs),

    /// Product reviews
    Reviews(ReviewsArgs),

    /// Shopping cart
    Cart(CartArgs),

    /// Recently viewed products
    Recent(RecentArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    let filter = if cli.verbose {
        "debug".to_string()
    } else {
        ctx.config.logging.level.clone()
    };
    storefront_core::init_logging(&filter)?;

    // Execute command
    let result = match cli.command {
        Commands::Login(args) => commands::auth::login(args, &ctx).await,
        Commands::Signup(args) => commands::auth::signup(args, &ctx).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami(args) => commands::auth::whoami(args, &ctx).await,
        Commands::Reviews(args) => commands::reviews::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Recent(args) => commands::recent::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
