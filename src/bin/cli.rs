use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::path::PathBuf;
use taalim::{
    config::{DEFAULT_CONTRACTS_DIR, DEFAULT_MAX_UPLOAD_BYTES},
    db,
    models::{Role, User},
    repositories::{SqliteContractRepository, SqliteServiceRepository, SqliteUserRepository},
    services::{
        ContractService, CreateUserRequest, MockEmailService, UpdatePasswordRequest, UserService,
    },
};

#[derive(Parser)]
#[command(name = "taalim-cli")]
#[command(about = "CLI tool for managing Taalim accounts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Country of residence
        #[arg(long, default_value = "مصر")]
        country: String,

        /// Egyptian mobile number
        #[arg(long)]
        phone: String,

        /// 14-digit national ID
        #[arg(long)]
        national_id: String,

        /// Role: user, admin, supervisor or delegate
        #[arg(short, long, default_value = "user")]
        role: Role,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Mark email as verified
        #[arg(long)]
        verified: bool,
    },

    /// List users
    List {
        /// Only users with this role
        #[arg(short, long)]
        role: Option<Role>,

        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },

    /// Change a user's role
    SetRole {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New role
        #[arg(short, long)]
        role: Role,
    },

    /// Re-enable a disabled account
    Activate {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },

    /// Disable an account without deleting it
    Deactivate {
        /// Email address of the user
        #[arg(short, long)]
        email: String,
    },

    /// Delete a user
    Delete {
        /// Email address of the user to delete
        #[arg(short, long)]
        email: String,
    },

    /// Verify a user's email
    Verify {
        /// Email address of the user to verify
        #[arg(short, long)]
        email: String,
    },

    /// Set a new password for a user
    SetPassword {
        /// Email address of the user
        #[arg(short, long)]
        email: String,

        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
}

fn get_password(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    Ok(rpassword::read_password()?)
}

fn confirm_password(prompt: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    let password = get_password(prompt)?;
    let confirm = get_password("Confirm password")?;
    Ok((password, confirm))
}

async fn require_user(user_service: &UserService, email: &str) -> User {
    match user_service.find_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            eprintln!("❌ User not found: {}", email);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("❌ Failed to look up user: {}", err);
            std::process::exit(1);
        }
    }
}

fn print_user(user: &User) {
    println!("  ID: {}", user.id);
    println!("  Name: {}", user.name);
    println!("  Email: {}", user.email);
    println!("  Role: {}", user.role);
    println!("  Active: {}", user.is_active);
    println!("  Verified: {}", user.email_verified);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/taalim.db".to_string());

    // Connect to database
    let pool = db::create_pool(&database_url).await?;

    // Run migrations
    db::run_migrations(&pool).await?;

    // Accounts created here are verified by hand, nothing is mailed
    let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let user_service = UserService::new(user_repository, Arc::new(MockEmailService::default()));

    // Deleting an account also removes its uploaded contract files
    let contracts_dir = std::env::var("CONTRACTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTRACTS_DIR));
    let contract_service = ContractService::new(
        Arc::new(SqliteContractRepository::new(pool.clone())),
        Arc::new(SqliteServiceRepository::new(pool.clone())),
        contracts_dir,
        DEFAULT_MAX_UPLOAD_BYTES,
    );

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                name,
                country,
                phone,
                national_id,
                role,
                password,
                verified,
            } => {
                let (password, password_confirm) = if let Some(pw) = password {
                    (pw.clone(), pw)
                } else {
                    confirm_password("Password")?
                };

                if password != password_confirm {
                    eprintln!("❌ Passwords do not match");
                    std::process::exit(1);
                }

                let request = CreateUserRequest {
                    name,
                    country,
                    phone,
                    national_id,
                    email,
                    password,
                    password_confirm: Some(password_confirm),
                    role,
                    is_active: true,
                    email_verified: verified,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        print_user(&user);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List {
                role,
                limit,
                offset,
            } => match user_service
                .list_users(role, Some(limit), Some(offset))
                .await
            {
                Ok(users) => {
                    if users.is_empty() {
                        println!("No users found.");
                    } else {
                        println!(
                            "{:<6} {:<32} {:<11} {:<7} {:<9} Name",
                            "ID", "Email", "Role", "Active", "Verified"
                        );
                        println!("{}", "-".repeat(90));
                        for user in users {
                            println!(
                                "{:<6} {:<32} {:<11} {:<7} {:<9} {}",
                                user.id,
                                user.email,
                                user.role,
                                if user.is_active { "yes" } else { "no" },
                                if user.email_verified { "yes" } else { "no" },
                                user.name
                            );
                        }
                    }
                }
                Err(err) => {
                    eprintln!("❌ Failed to list users: {}", err);
                    std::process::exit(1);
                }
            },

            UserCommands::SetRole { email, role } => {
                let user = require_user(&user_service, &email).await;
                match user_service.set_role(user.id, role).await {
                    Ok(user) => println!("✅ {} is now {}", user.email, user.role),
                    Err(err) => {
                        eprintln!("❌ Failed to change role: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Activate { email } => {
                let user = require_user(&user_service, &email).await;
                match user_service.set_active(user.id, true).await {
                    Ok(user) => println!("✅ Account {} activated", user.email),
                    Err(err) => {
                        eprintln!("❌ Failed to activate account: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Deactivate { email } => {
                let user = require_user(&user_service, &email).await;
                match user_service.set_active(user.id, false).await {
                    Ok(user) => println!("✅ Account {} deactivated", user.email),
                    Err(err) => {
                        eprintln!("❌ Failed to deactivate account: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Delete { email } => {
                let user = require_user(&user_service, &email).await;
                match contract_service.delete_for_user(user.id).await {
                    Ok(0) => {}
                    Ok(count) => println!("🗑️  Removed {} contract(s) of {}", count, email),
                    Err(err) => {
                        eprintln!("❌ Failed to remove contracts: {}", err);
                        std::process::exit(1);
                    }
                }
                match user_service.delete_user(user.id).await {
                    Ok(()) => println!("✅ User {} deleted successfully", email),
                    Err(err) => {
                        eprintln!("❌ Failed to delete user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::Verify { email } => {
                let user = require_user(&user_service, &email).await;
                if user.email_verified {
                    println!("ℹ️  User {} is already verified", email);
                    return Ok(());
                }

                match user_service.verify_user_email(user.id).await {
                    Ok(()) => println!("✅ User {} verified successfully", email),
                    Err(err) => {
                        eprintln!("❌ Failed to verify user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::SetPassword { email, password } => {
                let user = require_user(&user_service, &email).await;

                let (password, password_confirm) = if let Some(pw) = password {
                    (pw.clone(), pw)
                } else {
                    confirm_password("New password")?
                };

                let request = UpdatePasswordRequest {
                    user_id: user.id,
                    new_password: password,
                    new_password_confirm: Some(password_confirm),
                };

                match user_service.update_password(request).await {
                    Ok(()) => println!("✅ Password updated for {}", email),
                    Err(err) => {
                        eprintln!("❌ Failed to update password: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    Ok(())
}
