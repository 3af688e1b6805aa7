//! Barberbook CLI - Terminal storefront for booking barbershop appointments.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! bb shops list --city Tashkent
//! bb shops show shop-1
//! bb slots shop-1 --date 2026-05-02 --service svc-cut
//!
//! # Stage and submit
//! bb auth login -e client@barber.uz
//! bb cart add shop-1 --service svc-cut --date 2026-05-02 --time 15:00
//! bb checkout --notes "short on the sides"
//!
//! # Manage
//! bb bookings list --status pending
//! bb bookings cancel b-42
//! ```
//!
//! Cart and session live in `BARBERBOOK_STATE_DIR` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use barberbook_core::models::wire::parse_time;
use barberbook_core::{
    BarberId, BookingId, BookingStatus, CartEntryId, SearchFilters, ServiceId, ShopId, ShopSortKey,
};
use barberbook_storefront::{AppError, BookingChoice, Notice, Storefront, StorefrontConfig};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "bb")]
#[command(author, version, about = "Barberbook terminal storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse barbershops
    Shops {
        #[command(subcommand)]
        action: ShopsAction,
    },
    /// Show bookable dates, or open time slots for one date
    Slots {
        /// Barbershop ID
        shop: ShopId,

        /// Date (`YYYY-MM-DD`); omit to list bookable dates
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Only slots for this service
        #[arg(short, long)]
        service: Option<ServiceId>,

        /// Only slots for this barber
        #[arg(short, long)]
        barber: Option<BarberId>,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Book everything in the cart
    Checkout {
        /// Notes for the barber, attached to every booking
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List or cancel your bookings
    Bookings {
        #[command(subcommand)]
        action: BookingsAction,
    },
    /// Log in, register or log out
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum ShopsAction {
    /// List barbershops
    List(FilterArgs),
    /// Search barbershops by name or address
    Search {
        /// Search text
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show one barbershop with its services and barbers
    Show {
        /// Barbershop ID
        shop: ShopId,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    city: Option<String>,

    #[arg(long)]
    district: Option<String>,

    /// Service name or category
    #[arg(long)]
    service: Option<String>,

    /// Minimum price (UZS)
    #[arg(long)]
    min_price: Option<u64>,

    /// Maximum price (UZS)
    #[arg(long)]
    max_price: Option<u64>,

    #[arg(long, value_enum)]
    sort: Option<SortArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Rating,
    Price,
    Name,
    Distance,
}

impl From<SortArg> for ShopSortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Rating => Self::Rating,
            SortArg::Price => Self::Price,
            SortArg::Name => Self::Name,
            SortArg::Distance => Self::Distance,
        }
    }
}

impl From<FilterArgs> for SearchFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            city: args.city,
            district: args.district,
            service: args.service,
            min_price: args.min_price,
            max_price: args.max_price,
            sort_by: args.sort.map(ShopSortKey::from),
        }
    }
}

#[derive(Subcommand)]
enum CartAction {
    /// Stage a service at a shop
    Add {
        /// Barbershop ID
        shop: ShopId,

        #[arg(short, long)]
        service: ServiceId,

        /// Preferred barber; any barber when omitted
        #[arg(short, long)]
        barber: Option<BarberId>,

        /// Date (`YYYY-MM-DD`)
        #[arg(short, long)]
        date: NaiveDate,

        /// Time of day (`HH:mm`)
        #[arg(short, long, value_parser = parse_time)]
        time: NaiveTime,
    },
    /// Show the cart and its totals
    List,
    /// Remove one entry
    Remove {
        /// Cart entry ID
        id: CartEntryId,
    },
    /// Remove every entry
    Clear,
}

#[derive(Subcommand)]
enum BookingsAction {
    /// Fetch and list your bookings
    List {
        /// Only bookings with this status
        #[arg(short, long)]
        status: Option<BookingStatus>,
    },
    /// Cancel a pending or confirmed booking
    Cancel {
        /// Booking ID
        id: BookingId,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in to an existing account
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "BARBERBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(short, long, env = "BARBERBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session
    Logout,
    /// Show the logged-in user, re-validating the session
    Whoami,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            output::notice(&Notice::from(&AppError::from(e)));
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "barberbook_storefront=info,barberbook_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            output::notice(&Notice::from(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let mut app = Storefront::new(config)?;

    match cli.command {
        Commands::Shops { action } => match action {
            ShopsAction::List(filters) => commands::shops::list(&app, &filters.into()).await?,
            ShopsAction::Search { query, filters } => {
                commands::shops::search(&app, &query, &filters.into()).await?;
            }
            ShopsAction::Show { shop } => commands::shops::show(&app, &shop).await?,
        },
        Commands::Slots {
            shop,
            date,
            service,
            barber,
        } => {
            commands::shops::slots(&app, &shop, date, service.as_ref(), barber.as_ref()).await?;
        }
        Commands::Cart { action } => match action {
            CartAction::Add {
                shop,
                service,
                barber,
                date,
                time,
            } => {
                let choice = BookingChoice {
                    service,
                    barber,
                    date,
                    time,
                };
                commands::cart::add(&mut app, &shop, choice).await?;
            }
            CartAction::List => commands::cart::list(&app),
            CartAction::Remove { id } => commands::cart::remove(&mut app, &id)?,
            CartAction::Clear => commands::cart::clear(&mut app),
        },
        Commands::Checkout { notes } => commands::checkout::run(&mut app, notes.as_deref()).await?,
        Commands::Bookings { action } => match action {
            BookingsAction::List { status } => commands::bookings::list(&app, status).await?,
            BookingsAction::Cancel { id } => commands::bookings::cancel(&app, &id).await?,
        },
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&app, &email, SecretString::from(password)).await?;
            }
            AuthAction::Register {
                name,
                email,
                phone,
                password,
            } => {
                commands::auth::register(&app, &name, &email, &phone, SecretString::from(password))
                    .await?;
            }
            AuthAction::Logout => commands::auth::logout(&app).await?,
            AuthAction::Whoami => commands::auth::whoami(&app).await?,
        },
    }
    Ok(())
}
