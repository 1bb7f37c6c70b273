//! resolvenow-cli - scriptable front end for the complaint desk
//!
//! Every command that acts for a user logs in first with `--email`,
//! `--password` and `--role`, then goes through the same controllers as the TUI.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use resolvenow_core::format::format_date;
use resolvenow_core::snapshot::{self, Snapshot};
use resolvenow_core::{
    auth, Category, Complaint, ComplaintStatus, Config, CurrentUser, Dashboard, Database,
    NewAccount, NewComplaint, Priority, Role, StatusCounts,
};

#[derive(Parser)]
#[command(name = "resolvenow-cli")]
#[command(about = "Manage customer complaints from the command line")]
#[command(version)]
struct Args {
    /// Database file (defaults to the configured or XDG data path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Credentials of the acting user
#[derive(clap::Args)]
struct Actor {
    #[arg(long)]
    email: String,

    #[arg(long)]
    password: String,

    /// customer, agent or admin
    #[arg(long)]
    role: Role,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        mobile: String,
        #[arg(long)]
        role: Role,
    },

    /// Check credentials and print the account
    Login {
        #[command(flatten)]
        actor: Actor,
    },

    /// Submit a complaint (customer)
    Submit {
        #[command(flatten)]
        actor: Actor,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// product, service, billing, delivery or other
        #[arg(long, default_value = "other")]
        category: Category,
        /// low, medium, high or urgent
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
    },

    /// List the complaints visible to the acting user
    List {
        #[command(flatten)]
        actor: Actor,
        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Assign a complaint to an agent (admin)
    Assign {
        #[command(flatten)]
        actor: Actor,
        id: String,
        /// Agent display name
        agent: String,
    },

    /// Change a complaint's status (assigned agent)
    Status {
        #[command(flatten)]
        actor: Actor,
        id: String,
        /// pending, in-progress, resolved or closed
        status: ComplaintStatus,
    },

    /// Add a message to a complaint's conversation
    Message {
        #[command(flatten)]
        actor: Actor,
        id: String,
        text: String,
    },

    /// Show agents and customers (admin)
    Users {
        #[command(flatten)]
        actor: Actor,
    },

    /// Show complaint counts by status
    Stats {
        #[command(flatten)]
        actor: Actor,
        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show file locations and store size
    Info {
        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Write both collections to a JSON snapshot ("-" for stdout)
    Export { path: PathBuf },

    /// Replace both collections from a JSON snapshot ("-" for stdin)
    Import { path: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard =
        resolvenow_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = args.db.clone().unwrap_or_else(|| config.database_path());
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let prefix = config.complaints.id_prefix.as_str();

    match args.command {
        Command::Signup {
            name,
            email,
            password,
            mobile,
            role,
        } => {
            auth::sign_up(
                &db,
                NewAccount {
                    name: name.clone(),
                    email: email.clone(),
                    password,
                    mobile,
                    role,
                },
            )?;
            println!("Account created: {} <{}> ({})", name, email, role);
        }

        Command::Login { actor } => {
            let user = login(&db, &actor)?;
            println!("Logged in as {} <{}> ({})", user.name, user.email, user.role);
        }

        Command::Submit {
            actor,
            title,
            description,
            category,
            priority,
            phone,
            address,
        } => {
            let Dashboard::Customer(customer) = dashboard(&db, &actor, prefix)? else {
                bail!("only customers can submit complaints");
            };
            let complaint = customer.submit(NewComplaint {
                title,
                description,
                category,
                priority,
                contact_phone: phone,
                address,
            })?;
            println!("Complaint registered with ID: {}", complaint.id);
        }

        Command::List { actor, format } => {
            let complaints = match dashboard(&db, &actor, prefix)? {
                Dashboard::Customer(c) => c.my_complaints()?,
                Dashboard::Agent(a) => a.assigned_complaints()?,
                Dashboard::Admin(a) => a.all_complaints()?,
            };
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&complaints)?);
            } else {
                print_complaints(&complaints);
            }
        }

        Command::Assign { actor, id, agent } => {
            let Dashboard::Admin(admin) = dashboard(&db, &actor, prefix)? else {
                bail!("only admins can assign complaints");
            };
            let complaint = admin.assign(&id, &agent)?;
            println!(
                "Complaint {} has been assigned to {} ({})",
                complaint.id,
                agent,
                complaint.status.label()
            );
        }

        Command::Status { actor, id, status } => {
            let Dashboard::Agent(agent) = dashboard(&db, &actor, prefix)? else {
                bail!("only the assigned agent can change a complaint's status");
            };
            let complaint = agent.set_status(&id, status)?;
            println!("Complaint {} status changed to {}", complaint.id, complaint.status);
        }

        Command::Message { actor, id, text } => {
            let complaint = match dashboard(&db, &actor, prefix)? {
                Dashboard::Customer(c) => c.send_message(&id, &text)?,
                Dashboard::Agent(a) => a.send_message(&id, &text)?,
                Dashboard::Admin(_) => bail!("admins cannot post messages"),
            };
            println!(
                "Message sent on {} ({} messages)",
                complaint.id,
                complaint.messages.len()
            );
        }

        Command::Users { actor } => {
            let Dashboard::Admin(admin) = dashboard(&db, &actor, prefix)? else {
                bail!("only admins can manage users");
            };
            print_users(&admin)?;
        }

        Command::Stats { actor, format } => {
            let counts = match dashboard(&db, &actor, prefix)? {
                Dashboard::Customer(c) => c.stats()?,
                Dashboard::Agent(a) => StatusCounts::from_complaints(&a.assigned_complaints()?),
                Dashboard::Admin(a) => a.stats()?,
            };
            print_stats(&counts, &format)?;
        }

        Command::Info { format } => {
            let health = db.get_store_health()?;
            let log_path = resolvenow_core::logging::log_file_path();
            if format == "json" {
                let value = serde_json::json!({
                    "configPath": Config::config_path().display().to_string(),
                    "databasePath": db_path.display().to_string(),
                    "logPath": log_path.display().to_string(),
                    "databaseSizeBytes": health.database_size_bytes,
                    "schemaVersion": health.schema_version,
                    "accounts": health.account_count,
                    "complaints": health.complaint_count,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Config:     {}", Config::config_path().display());
                println!("Database:   {}", db_path.display());
                println!("Logs:       {}", log_path.display());
                println!(
                    "Size:       {} (schema v{})",
                    format_bytes(health.database_size_bytes),
                    health.schema_version
                );
                println!("Accounts:   {}", health.account_count);
                println!("Complaints: {}", health.complaint_count);
            }
        }

        Command::Export { path } => {
            let snapshot = snapshot::export(&db)?;
            if path.as_os_str() == "-" {
                println!("{}", snapshot.to_json()?);
            } else {
                snapshot
                    .write_to(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!(
                    "Exported {} accounts and {} complaints to {}",
                    snapshot.user_accounts.len(),
                    snapshot.complaints.len(),
                    path.display()
                );
            }
        }

        Command::Import { path } => {
            let snapshot = if path.as_os_str() == "-" {
                let mut json = String::new();
                io::stdin()
                    .read_to_string(&mut json)
                    .context("failed to read snapshot from stdin")?;
                Snapshot::from_json(&json)?
            } else {
                Snapshot::read_from(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?
            };
            snapshot::import(&db, &snapshot)?;
            println!(
                "Imported {} accounts and {} complaints",
                snapshot.user_accounts.len(),
                snapshot.complaints.len()
            );
        }
    }

    Ok(())
}

fn login(db: &Database, actor: &Actor) -> Result<CurrentUser> {
    auth::login(db, &actor.email, &actor.password, actor.role)
        .with_context(|| format!("login failed for {}", actor.email))
}

fn dashboard<'a>(db: &'a Database, actor: &Actor, prefix: &str) -> Result<Dashboard<'a>> {
    Ok(Dashboard::for_user(db, login(db, actor)?, prefix))
}

fn print_complaints(complaints: &[Complaint]) {
    if complaints.is_empty() {
        println!("No complaints found.");
        return;
    }

    println!(
        "{:<10} {:<12} {:<8} {:<14} {:<12} {:<10} Title",
        "ID", "Status", "Priority", "Customer", "Agent", "Created"
    );
    for c in complaints {
        println!(
            "{:<10} {:<12} {:<8} {:<14} {:<12} {:<10} {}",
            c.id,
            c.status.label(),
            c.priority.as_str(),
            truncate(&c.customer_name, 14),
            truncate(c.assigned_agent.as_deref().unwrap_or("-"), 12),
            format_date(c.created_at),
            c.title
        );
    }
    println!("\n{} complaint(s)", complaints.len());
}

fn print_users(admin: &resolvenow_core::AdminController<'_>) -> Result<()> {
    let agents = admin.agents()?;
    println!("Agents ({}):", agents.len());
    for agent in &agents {
        println!("  {:<16} {:<24} {}", agent.name, agent.email, agent.mobile);
    }

    let customers = admin.customer_summaries()?;
    println!("\nCustomers ({}):", customers.len());
    for c in &customers {
        println!(
            "  {:<16} {:<24} {:<14} {:>3} complaint(s)  joined {}  {}",
            c.name,
            c.email,
            c.phone,
            c.complaint_count,
            format_date(c.joined_at),
            c.status
        );
    }
    Ok(())
}

fn print_stats(counts: &StatusCounts, format: &str) -> Result<()> {
    if format == "json" {
        let value = serde_json::json!({
            "total": counts.total,
            "pending": counts.pending,
            "inProgress": counts.in_progress,
            "resolved": counts.resolved,
            "closed": counts.closed,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Total:        {}", counts.total);
    for status in ComplaintStatus::ALL {
        println!("{:<13} {}", format!("{}:", capitalize(status.label())), counts.get(status));
    }
    println!(
        "Completion:   {:.0}%",
        counts.completion_ratio() * 100.0
    );
    Ok(())
}

/// Format bytes as human-readable size (e.g., "42.0 KB").
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
