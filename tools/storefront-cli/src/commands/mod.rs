//! CLI command implementations.

pub mod auth;
pub mod cart;
pub mod config;
pub mod recent;
pub mod reviews;

use clap::{Args, Subcommand};

// ============================================================================
// Session Commands
// ============================================================================

#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted if omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Page to return to after login
    #[arg(long)]
    pub return_to: Option<String>,
}

#[derive(Args)]
pub struct SignupArgs {
    /// Username (prompted if omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Account email (prompted if omitted)
    #[arg(short, long)]
    pub email: Option<String>,

    /// Accept the terms and conditions without prompting
    #[arg(long)]
    pub accept_terms: bool,
}

#[derive(Args)]
pub struct WhoamiArgs {
    /// Fetch the profile from the server
    #[arg(long)]
    pub refresh: bool,
}

// ============================================================================
// Review Commands
// ============================================================================

#[derive(Args)]
pub struct ReviewsArgs {
    #[command(subcommand)]
    pub command: ReviewsCommand,
}

#[derive(Subcommand)]
pub enum ReviewsCommand {
    /// List reviews for a product
    List {
        /// Product ID
        product: String,

        /// Sort order (helpful, recent, highest, lowest)
        #[arg(short, long, default_value = "helpful")]
        sort: String,

        /// Maximum number of reviews
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show the rating summary for a product
    Stats {
        /// Product ID
        product: String,
    },

    /// Vote a review up or down
    Vote {
        /// Product ID
        product: String,

        /// Review ID
        review: String,

        /// up or down
        direction: String,
    },

    /// Delete one of your reviews
    Delete {
        /// Product ID
        product: String,

        /// Review ID
        review: String,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Write a review
    Write {
        /// Product ID
        product: String,

        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: u8,

        /// Review text (prompted if omitted)
        #[arg(short, long)]
        comment: Option<String>,
    },
}

// ============================================================================
// Cart Commands
// ============================================================================

#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Add a product to the cart
    Add {
        /// Product ID
        product: String,

        /// Size
        #[arg(short, long)]
        size: Option<String>,

        /// Quantity
        #[arg(short, long, default_value = "1")]
        quantity: i64,

        /// Units in stock, if known
        #[arg(long)]
        stock: Option<u32>,

        /// Keep the item until the next login instead of adding it now
        #[arg(long)]
        after_login: bool,
    },
}

// ============================================================================
// Recently Viewed Commands
// ============================================================================

#[derive(Args)]
pub struct RecentArgs {
    #[command(subcommand)]
    pub command: RecentCommand,
}

#[derive(Subcommand)]
pub enum RecentCommand {
    /// List recently viewed products
    List {
        /// Maximum number of entries
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Record a product view
    View {
        /// Product ID
        product: String,

        /// Product name
        #[arg(short, long)]
        name: String,

        /// Current price
        #[arg(short, long)]
        price: f64,

        /// Price before discount
        #[arg(long)]
        old_price: Option<f64>,

        /// Category
        #[arg(short, long, default_value = "")]
        category: String,

        /// Image URL
        #[arg(long, default_value = "")]
        image: String,
    },

    /// Forget one product
    Remove {
        /// Product ID
        product: String,
    },

    /// Forget all products
    Clear {
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a storefront.toml in the current directory
    Init {
        /// API base URL
        #[arg(long, default_value = "http://localhost:5000/api")]
        base_url: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
