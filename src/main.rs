use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use parkdesk::{
    format::{format_date_time, parking_duration, reservation_duration},
    ApiClient, AuthClient, Config, DriverClient, DriverForm, Error, ParkingSpot, ParkingView, Reservation,
    ReservationClient, ReservationForm, ReservationStatus, ReservationsView, SearchCriteria, Session, SortDirection,
    SortField, SpotClient, StatusFilter, TokenStore, UserClient, UserForm, UserRole, ViewMode,
};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "parkdesk")]
#[command(about = "Operator console for a parking facility backend")]
struct Cli {
    #[arg(long, global = true, help = "Backend base URL (overrides PARKDESK_API_BASE)")]
    api_base: Option<String>,

    #[arg(long, global = true, help = "Where the login token is kept (overrides PARKDESK_TOKEN_FILE)")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and save the token
    Login {
        username: String,
        #[arg(long, help = "Read from stdin when omitted")]
        password: Option<String>,
    },
    /// Forget the saved token
    Logout,
    /// Show the current session
    Whoami,
    #[command(subcommand)]
    Spots(SpotsCommand),
    #[command(subcommand)]
    Reservations(ReservationsCommand),
    #[command(subcommand)]
    Drivers(DriversCommand),
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand)]
enum SpotsCommand {
    List {
        #[arg(long)]
        level: Option<String>,
        #[arg(long)]
        section: Option<String>,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        grid: bool,
    },
    Park {
        spot: String,
        plate: String,
    },
    Release {
        spot: String,
    },
    /// Locate the spot holding a vehicle
    Find {
        plate: String,
    },
}

#[derive(Subcommand)]
enum ReservationsCommand {
    List {
        #[arg(long)]
        status: Option<ReservationStatus>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value = "startTime")]
        sort: SortField,
        #[arg(long, help = "Ascending order (default is descending)")]
        asc: bool,
    },
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        spot: i64,
        #[arg(long)]
        driver: i64,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long, default_value = "PENDING")]
        status: ReservationStatus,
    },
    /// Move a reservation to a new status
    Status {
        id: i64,
        status: ReservationStatus,
    },
    Cancel {
        id: i64,
    },
    Search(SearchArgs),
    Stats,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long)]
    driver_name: Option<String>,
    #[arg(long)]
    plate: Option<String>,
    #[arg(long)]
    spot_number: Option<String>,
    #[arg(long)]
    start_date: Option<String>,
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    status: Option<String>,
}

#[derive(Subcommand)]
enum DriversCommand {
    List,
    Show {
        id: i64,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        plate: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
    },
    Delete {
        id: i64,
    },
    Search {
        query: String,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    List,
    Create {
        username: String,
        #[arg(long)]
        role: UserRole,
        #[arg(long, help = "Read from stdin when omitted")]
        password: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "parkdesk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.downcast_ref::<Error>().is_some_and(Error::is_authentication) {
                eprintln!("{}", e);
                eprintln!("Please run `parkdesk login` first.");
                return ExitCode::from(2);
            }
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?
        .with_api_base(cli.api_base)
        .with_token_file(cli.token_file);
    debug!("Using backend {}", config.api_base);

    let session = Session::with_store(TokenStore::new(&config.token_file))
        .with_context(|| format!("reading token file {}", config.token_file.display()))?;
    let api = ApiClient::from_config(&config, session)?;

    match cli.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password: ")?,
            };
            let credential = AuthClient::new(api).login(&username, &password).await?;
            match credential.role {
                Some(role) => println!("Logged in as {} ({})", username, role),
                None => println!("Logged in as {}", username),
            }
        }
        Command::Logout => {
            AuthClient::new(api).logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            if api.session().is_authenticated() {
                println!("Logged in, token stored at {}", config.token_file.display());
            } else {
                println!("Not logged in");
            }
            println!("Backend: {}", api.base_url());
        }
        Command::Spots(command) => spots(api, command).await?,
        Command::Reservations(command) => reservations(api, command).await?,
        Command::Drivers(command) => drivers(api, command).await?,
        Command::Users(command) => users(api, command).await?,
    }
    Ok(())
}

async fn spots(api: ApiClient, command: SpotsCommand) -> anyhow::Result<()> {
    match command {
        SpotsCommand::List {
            level,
            section,
            status,
            search,
            grid,
        } => {
            let mut view = ParkingView::new(SpotClient::new(api));
            view.refresh().await?;
            view.set_level_filter(level.unwrap_or_default());
            view.set_section_filter(section.unwrap_or_default());
            view.set_status_filter(status);
            view.set_search_query(search.unwrap_or_default());
            if grid {
                view.set_view_mode(ViewMode::Grid);
            }

            let spots = view.filtered_spots();
            match view.view_mode() {
                ViewMode::List => print_spot_table(&spots),
                ViewMode::Grid => print_spot_grid(&spots),
            }
            let levels: Vec<String> = view.unique_levels().iter().map(u32::to_string).collect();
            println!(
                "\n{} available of {} shown (levels {}; sections {})",
                view.available_spots(),
                spots.len(),
                levels.join(", "),
                view.unique_sections().join(", ")
            );
        }
        SpotsCommand::Park { spot, plate } => {
            let mut view = ParkingView::new(SpotClient::new(api));
            view.park_vehicle(&spot, &plate).await?;
            print_success(view.success());
        }
        SpotsCommand::Release { spot } => {
            let mut view = ParkingView::new(SpotClient::new(api));
            view.release_vehicle(&spot).await?;
            print_success(view.success());
        }
        SpotsCommand::Find { plate } => {
            let spot = SpotClient::new(api).find_vehicle(&plate).await?;
            println!("{} is in spot {} (level {}, section {})", plate, spot.spot_number, spot.level, spot.section);
        }
    }
    Ok(())
}

fn print_spot_table(spots: &[&ParkingSpot]) {
    let now = Utc::now();
    println!("{:>4}  {:<8} {:>5} {:<7} {:<10} {:<12} {}", "#", "SPOT", "LEVEL", "SECTION", "STATUS", "VEHICLE", "PARKED");
    for spot in spots {
        let (plate, parked) = match &spot.vehicle_data {
            Some(v) => (v.license_plate.as_str(), parking_duration(v.entry_time, now)),
            None => ("-", String::new()),
        };
        let status = if spot.occupied { "occupied" } else { "available" };
        println!(
            "{:>4}  {:<8} {:>5} {:<7} {:<10} {:<12} {}",
            spot.spot_id, spot.spot_number, spot.level, spot.section, status, plate, parked
        );
    }
}

fn print_spot_grid(spots: &[&ParkingSpot]) {
    for row in spots.chunks(8) {
        let cells: Vec<String> = row
            .iter()
            .map(|s| format!("[{}{:<6}]", if s.occupied { 'X' } else { ' ' }, s.spot_number))
            .collect();
        println!("{}", cells.join(" "));
    }
}

async fn reservations(api: ApiClient, command: ReservationsCommand) -> anyhow::Result<()> {
    let client = ReservationClient::new(api);

    match command {
        ReservationsCommand::List {
            status,
            search,
            sort,
            asc,
        } => {
            let mut view = ReservationsView::new(client);
            view.refresh().await?;
            view.set_status_filter(status);
            view.set_search_query(search.unwrap_or_default());
            let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
            view.set_sort(sort, direction);
            print_reservation_table(&view.filtered_reservations());
        }
        ReservationsCommand::Show { id } => {
            let r = client.fetch_one(id).await?;
            println!("Reservation {}", r.id);
            println!("  Spot:     {} (id {})", r.spot_number, r.spot_id);
            println!("  Driver:   {} ({})", r.driver_name, r.driver_id);
            println!("  Vehicle:  {}", r.license_plate);
            println!("  Start:    {}", format_date_time(&r.start_time));
            println!("  End:      {}", format_date_time(&r.end_time));
            if let Some(duration) = reservation_duration(&r.start_time, &r.end_time) {
                println!("  Duration: {}", duration);
            }
            println!("  Status:   {}", r.status);
            println!("  Price:    {:.2}", r.total_price);
            let allowed: Vec<&str> = r.status.allowed_transitions().iter().map(|s| s.as_str()).collect();
            if !allowed.is_empty() {
                println!("  Next:     {}", allowed.join(", "));
            }
        }
        ReservationsCommand::Create {
            spot,
            driver,
            start,
            end,
            status,
        } => {
            let request = ReservationForm {
                spot_id: Some(spot),
                driver_id: Some(driver),
                start_time: start,
                end_time: end,
                status,
            }
            .into_request()?;
            let mut view = ReservationsView::new(client);
            let created = view.create(&request).await?;
            print_success(view.success());
            println!("Reservation id {}", created.id);
        }
        ReservationsCommand::Status { id, status } => {
            let current = client.fetch_one(id).await?;
            if !current.status.can_transition_to(status) {
                bail!(
                    "Reservation {} cannot move from {} to {}",
                    id,
                    current.status,
                    status
                );
            }
            let mut view = ReservationsView::new(client);
            view.update_status(id, status).await?;
            print_success(view.success());
        }
        ReservationsCommand::Cancel { id } => {
            let mut view = ReservationsView::new(client);
            view.cancel(id).await?;
            print_success(view.success());
        }
        ReservationsCommand::Search(args) => {
            let criteria = SearchCriteria {
                driver_name: args.driver_name,
                license_plate: args.plate,
                spot_number: args.spot_number,
                start_date: args.start_date,
                end_date: args.end_date,
                status: args.status,
            };
            let found = client.search(&criteria).await?;
            print_reservation_table(&found.iter().collect::<Vec<_>>());
        }
        ReservationsCommand::Stats => {
            let mut view = ReservationsView::new(client);
            view.refresh().await?;
            let stats = view.stats();
            println!("Total:     {}", stats.total);
            println!("Pending:   {}", stats.pending);
            println!("Scheduled: {}", stats.scheduled);
            println!("Active:    {}", stats.active);
            println!("Completed: {}", stats.completed);
            println!("Cancelled: {}", stats.cancelled);
        }
    }
    Ok(())
}

fn print_reservation_table(rows: &[&Reservation]) {
    println!(
        "{:>5}  {:<8} {:<14} {:<12} {:<16} {:<16} {}",
        "ID", "SPOT", "DRIVER", "VEHICLE", "START", "END", "STATUS"
    );
    for r in rows {
        println!(
            "{:>5}  {:<8} {:<14} {:<12} {:<16} {:<16} {}",
            r.id,
            r.spot_number,
            r.driver_name,
            r.license_plate,
            format_date_time(&r.start_time),
            format_date_time(&r.end_time),
            r.status
        );
    }
}

async fn drivers(api: ApiClient, command: DriversCommand) -> anyhow::Result<()> {
    let client = DriverClient::new(api);

    match command {
        DriversCommand::List => {
            let drivers = client.list().await?;
            for d in &drivers {
                println!("{:>5}  {:<24} {:<12} {}", d.driver_id, d.name, d.license_plate, d.phone_number);
            }
            println!("\n{} active drivers", client.count_active().await?);
        }
        DriversCommand::Show { id } => {
            let d = client.get(id).await?;
            println!("{} ({})", d.name, d.driver_id);
            println!("  Plate: {}", d.license_plate);
            println!("  Phone: {}", d.phone_number);
            println!("  Email: {}", d.email.as_deref().unwrap_or("-"));
            println!("  Active: {}", d.active);
        }
        DriversCommand::Create {
            name,
            plate,
            phone,
            email,
        } => {
            let driver = client
                .create(&DriverForm {
                    name,
                    license_plate: plate,
                    phone_number: phone,
                    email,
                    active: true,
                })
                .await?;
            println!("Driver {} created", driver.driver_id);
        }
        DriversCommand::Delete { id } => {
            client.delete(id).await?;
            println!("Driver {} deleted", id);
        }
        DriversCommand::Search { query } => {
            for d in client.search(&query).await? {
                println!("{:>5}  {:<24} {}", d.driver_id, d.name, d.license_plate);
            }
        }
    }
    Ok(())
}

async fn users(api: ApiClient, command: UsersCommand) -> anyhow::Result<()> {
    let client = UserClient::new(api);

    match command {
        UsersCommand::List => {
            for u in client.list().await? {
                println!("{:>5}  {:<20} {}", u.id, u.username, u.role);
            }
        }
        UsersCommand::Create {
            username,
            role,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password for new user: ")?,
            };
            let user = client
                .create(&UserForm {
                    username,
                    password,
                    role: Some(role),
                })
                .await?;
            println!("User {} created ({})", user.username, user.role);
        }
        UsersCommand::Delete { id } => {
            client.delete(id).await?;
            println!("User {} deleted", id);
        }
    }
    Ok(())
}

fn print_success(message: Option<&str>) {
    if let Some(message) = message {
        println!("{}", message);
    }
}

fn read_secret(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let secret = line.trim_end_matches(['\r', '\n']).to_string();
    if secret.is_empty() {
        bail!("No password given");
    }
    Ok(secret)
}
