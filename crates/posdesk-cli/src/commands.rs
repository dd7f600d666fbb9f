//! Command-line parsing and dispatch.
//!
//! Every data command first navigates to the screen it belongs to, so the
//! router's guard decides whether the user has to log in before anything is
//! fetched.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::debug;

use posdesk_core::app::login_error_message;
use posdesk_core::models::{CategoryDto, ProductDto, RegisterRequest, SaleRequestDto, UserRole};
use posdesk_core::{ApiError, App, RouteName};

use crate::output;

pub const USAGE: &str = "\
Usage: posdesk <command>

Session:
  login [username]                 Log in (prompts for password)
  register <username> <email> <role>
  logout
  whoami

Inventory and sales:
  products   list | get <id> | create <file.json> | update <id> <file.json> | delete <id>
  categories list | get <id> | create <file.json> | update <id> <file.json> | delete <id> [--hard]
  sales      list | get <id> | create <file.json>

Reports (admin):
  reports monthly <year>
  reports daily <month>
  reports category <start YYYY-MM-DD> <end YYYY-MM-DD>
  reports customer <start YYYY-MM-DD> <end YYYY-MM-DD>

Environment:
  POSDESK_API_BASE_URL             API address (default http://localhost:1500/api)
  RUST_LOG                         Log filter (default warn)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Crud {
    List,
    Get(i64),
    Create(PathBuf),
    Update(i64, PathBuf),
    Delete { id: i64, hard: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleCommand {
    List,
    Get(i64),
    Create(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportCommand {
    Monthly(i32),
    Daily(String),
    Category(NaiveDate, NaiveDate),
    Customer(NaiveDate, NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Login { username: Option<String> },
    Register { username: String, email: String, role: UserRole },
    Logout,
    Whoami,
    Products(Crud),
    Categories(Crud),
    Sales(SaleCommand),
    Reports(ReportCommand),
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            [] | ["help"] | ["--help"] | ["-h"] => Command::Help,
            ["login"] => Command::Login { username: None },
            ["login", username] => Command::Login {
                username: Some(username.to_string()),
            },
            ["register", username, email, role] => Command::Register {
                username: username.to_string(),
                email: email.to_string(),
                role: role.parse::<UserRole>().map_err(anyhow::Error::msg)?,
            },
            ["logout"] => Command::Logout,
            ["whoami"] => Command::Whoami,
            ["products", rest @ ..] => Command::Products(parse_crud(rest, false)?),
            ["categories", rest @ ..] => Command::Categories(parse_crud(rest, true)?),
            ["sales", "list"] => Command::Sales(SaleCommand::List),
            ["sales", "get", id] => Command::Sales(SaleCommand::Get(parse_id(id)?)),
            ["sales", "create", file] => Command::Sales(SaleCommand::Create(PathBuf::from(file))),
            ["reports", "monthly", year] => Command::Reports(ReportCommand::Monthly(
                year.parse().with_context(|| format!("Invalid year: {}", year))?,
            )),
            ["reports", "daily", month] => Command::Reports(ReportCommand::Daily(month.to_string())),
            ["reports", "category", start, end] => {
                Command::Reports(ReportCommand::Category(parse_date(start)?, parse_date(end)?))
            }
            ["reports", "customer", start, end] => {
                Command::Reports(ReportCommand::Customer(parse_date(start)?, parse_date(end)?))
            }
            _ => bail!("Unrecognized command: {}\n\n{}", args.join(" "), USAGE),
        };
        Ok(command)
    }

    /// Screen this command belongs to
    pub fn screen(&self) -> Option<String> {
        let path = match self {
            Command::Help | Command::Whoami | Command::Logout => return None,
            Command::Login { .. } => "/login".to_string(),
            Command::Register { .. } => "/register".to_string(),
            Command::Products(Crud::Get(id)) => format!("/app/products/{}", id),
            Command::Products(Crud::Create(_)) => "/app/products/new".to_string(),
            Command::Products(Crud::Update(id, _)) => format!("/app/products/edit/{}", id),
            Command::Products(_) => "/app/products".to_string(),
            Command::Categories(_) => "/app/categories".to_string(),
            Command::Sales(_) => "/app/sales".to_string(),
            Command::Reports(_) => "/app/reports".to_string(),
        };
        Some(path)
    }

    /// Writes and reports are for admins and owners
    pub fn requires_admin(&self) -> bool {
        match self {
            Command::Products(crud) | Command::Categories(crud) => {
                !matches!(crud, Crud::List | Crud::Get(_))
            }
            Command::Reports(_) => true,
            _ => false,
        }
    }
}

fn parse_crud(args: &[&str], allow_hard_delete: bool) -> Result<Crud> {
    let crud = match args {
        ["list"] => Crud::List,
        ["get", id] => Crud::Get(parse_id(id)?),
        ["create", file] => Crud::Create(PathBuf::from(file)),
        ["update", id, file] => Crud::Update(parse_id(id)?, PathBuf::from(file)),
        ["delete", id] => Crud::Delete { id: parse_id(id)?, hard: false },
        ["delete", id, "--hard"] if allow_hard_delete => Crud::Delete {
            id: parse_id(id)?,
            hard: true,
        },
        _ => bail!("Unrecognized arguments: {}\n\n{}", args.join(" "), USAGE),
    };
    Ok(crud)
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.parse().with_context(|| format!("Invalid id: {}", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date (expected YYYY-MM-DD): {}", raw))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

// ============================================================================
// Dispatch
// ============================================================================

pub async fn run(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::Login { username } => {
            app.open("/login")?;
            if app.is_authenticated() {
                println!(
                    "Already logged in as {}. Run `posdesk logout` first to switch users.",
                    app.session.username().unwrap_or_default()
                );
                return Ok(());
            }
            login_interactive(app, username).await
        }
        Command::Register { username, email, role } => {
            let route = app.open("/register")?;
            if !route.is(RouteName::Register) {
                println!(
                    "Already logged in as {}. Run `posdesk logout` first to register a new account.",
                    app.session.username().unwrap_or_default()
                );
                return Ok(());
            }
            let password = rpassword::prompt_password("Password: ")?;
            let payload = RegisterRequest {
                username,
                password: Some(password),
                email,
                role,
            };
            let route = app.register(&payload).await?;
            debug!(to = %route.full_path, "Registered");
            println!("Registered and logged in as {}", payload.username);
            Ok(())
        }
        Command::Logout => {
            app.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            let session = app.session.snapshot();
            match (session.username(), session.role()) {
                (Some(username), Some(role)) => println!("{} ({})", username, role),
                _ => println!("Not logged in"),
            }
            Ok(())
        }
        command => run_screen(app, command).await,
    }
}

/// Open the command's screen, log in if the guard asks for it, then run it
async fn run_screen(app: &mut App, command: Command) -> Result<()> {
    if let Some(screen) = command.screen() {
        app.open(screen.as_str())?;
    }
    if app.needs_login() {
        println!("Login required.");
        login_interactive(app, None).await?;
    }
    if command.requires_admin() && !app.session.is_admin() {
        bail!("This command requires the ADMIN or OWNER role");
    }

    match execute(app, command).await {
        Err(e) if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)) => {
            bail!("Session expired. Run `posdesk login` and try again.")
        }
        other => other,
    }
}

async fn execute(app: &App, command: Command) -> Result<()> {
    let api = &app.api;
    match command {
        Command::Products(Crud::List) => {
            let (products, categories) =
                futures::try_join!(api.list_products(), api.list_categories())?;
            output::print_products(&products, &categories);
        }
        Command::Products(Crud::Get(id)) => {
            let (product, categories) =
                futures::try_join!(api.get_product(id), api.list_categories())?;
            output::print_product(&product, &categories);
        }
        Command::Products(Crud::Create(file)) => {
            let product: ProductDto = read_json(&file)?;
            let created = api.create_product(&product).await?;
            println!("Created product {} ({})", created.display_name(), id_text(created.id));
        }
        Command::Products(Crud::Update(id, file)) => {
            let product: ProductDto = read_json(&file)?;
            let updated = api.update_product(id, &product).await?;
            println!("Updated product {}", updated.display_name());
        }
        Command::Products(Crud::Delete { id, .. }) => {
            confirm(&format!("Delete product {}? This cannot be undone.", id))?;
            api.delete_product(id).await?;
            println!("Product deleted");
        }
        Command::Categories(Crud::List) => {
            output::print_categories(&api.list_categories().await?);
        }
        Command::Categories(Crud::Get(id)) => {
            output::print_categories(&[api.get_category(id).await?]);
        }
        Command::Categories(Crud::Create(file)) => {
            let category: CategoryDto = read_json(&file)?;
            let created = api.create_category(&category).await?;
            println!("Created category {} ({})", created.name, id_text(created.id));
        }
        Command::Categories(Crud::Update(id, file)) => {
            let category: CategoryDto = read_json(&file)?;
            let updated = api.update_category(id, &category).await?;
            println!("Updated category {}", updated.name);
        }
        Command::Categories(Crud::Delete { id, hard }) => {
            if hard {
                confirm(&format!("Permanently delete category {}?", id))?;
            }
            api.delete_category(id, hard).await?;
            println!("Category deleted");
        }
        Command::Sales(SaleCommand::List) => output::print_sales(&api.list_sales().await?),
        Command::Sales(SaleCommand::Get(id)) => output::print_sale(&api.get_sale(id).await?),
        Command::Sales(SaleCommand::Create(file)) => {
            let sale: SaleRequestDto = read_json(&file)?;
            let created = api.create_sale(&sale).await?;
            output::print_sale(&created);
        }
        Command::Reports(report) => run_report(app, report).await?,
        other @ (Command::Help
        | Command::Login { .. }
        | Command::Register { .. }
        | Command::Logout
        | Command::Whoami) => bail!("{:?} has no screen to run on", other),
    }
    Ok(())
}

async fn run_report(app: &App, report: ReportCommand) -> Result<()> {
    let api = &app.api;
    match report {
        ReportCommand::Monthly(year) => output::print_monthly(&api.monthly_report(year).await?),
        ReportCommand::Daily(month) => output::print_daily(&api.daily_report(&month).await?),
        ReportCommand::Category(start, end) => {
            output::print_category_report(&api.category_report(start, end).await?)
        }
        ReportCommand::Customer(start, end) => {
            output::print_customer_report(&api.customer_report(start, end).await?)
        }
    }
    Ok(())
}

fn id_text(id: Option<i64>) -> String {
    id.map(|id| format!("id {}", id))
        .unwrap_or_else(|| "no id".to_string())
}

// ============================================================================
// Prompts
// ============================================================================

async fn login_interactive(app: &mut App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_username(app.config.last_username.as_deref())?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    println!("Authenticating...");
    match app.attempt_login(&username, &password).await {
        Ok(_) => {
            println!("Logged in as {}", username);
            Ok(())
        }
        Err(e) => bail!(login_error_message(&e)),
    }
}

fn prompt_username(last: Option<&str>) -> Result<String> {
    match last {
        Some(last) => print!("Username [{}]: ", last),
        None => print!("Username: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    match (input.is_empty(), last) {
        (true, Some(last)) => Ok(last.to_string()),
        _ => Ok(input.to_string()),
    }
}

fn confirm(question: &str) -> Result<()> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    if input.trim().eq_ignore_ascii_case("y") {
        Ok(())
    } else {
        bail!("Cancelled")
    }
}
