//! CLI tool to manage dashboard users.
//!
//! Usage:
//!   cargo run --bin manage-users -- list [--role editor] [--search ada]
//!   cargo run --bin manage-users -- set-role --username octocat --role editor

use std::env;

use department_site::api::users::check_role_change;
use department_site::config::Config;
use department_site::db::DbPool;
use department_site::models::{ListUsersQuery, MAX_PAGE_SIZE, Role};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let command = &args[1];

    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    match command.as_str() {
        "list" | "ls" => {
            let role = flag_value(&args, &["--role", "-r"]).map(|r| parse_role(&r));
            let search = flag_value(&args, &["--search", "-s"]);
            list_users(&pool, role, search).await;
        }
        "set-role" => {
            let username = flag_value(&args, &["--username", "-u"]).unwrap_or_else(|| {
                eprintln!("Error: --username is required");
                std::process::exit(1);
            });
            let role = flag_value(&args, &["--role", "-r"])
                .map(|r| parse_role(&r))
                .unwrap_or_else(|| {
                    eprintln!("Error: --role is required");
                    std::process::exit(1);
                });
            set_role(&pool, &username, role).await;
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            std::process::exit(1);
        }
    }
}

fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    let mut i = 2;
    while i < args.len() {
        if names.contains(&args[i].as_str()) && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}

fn parse_role(value: &str) -> Role {
    Role::parse(value).unwrap_or_else(|| {
        eprintln!("Error: role must be one of: user, editor, admin");
        std::process::exit(1);
    })
}

async fn list_users(pool: &DbPool, role: Option<Role>, search: Option<String>) {
    let query = ListUsersQuery {
        search,
        role,
        limit: Some(MAX_PAGE_SIZE),
        offset: None,
    };

    let (users, total, _) = match pool.list_users(&query).await {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error listing users: {}", e);
            std::process::exit(1);
        }
    };

    if users.is_empty() {
        println!("No users found.");
        return;
    }

    println!();
    println!(
        "{:<36} {:<24} {:<8} {:<20}",
        "ID", "USERNAME", "ROLE", "LAST LOGIN"
    );
    println!("{}", "-".repeat(90));

    for user in &users {
        let last_login = user
            .last_login_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{:<36} {:<24} {:<8} {:<20}",
            user.id, user.username, user.role, last_login
        );
    }

    if total > users.len() as u64 {
        println!("... {} more (narrow with --role or --search)", total - users.len() as u64);
    }
    println!();
}

async fn set_role(pool: &DbPool, username: &str, role: Role) {
    let user = match pool.find_user_by_username(username).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            eprintln!("User '{}' not found. They must sign in once first.", username);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error looking up user: {}", e);
            std::process::exit(1);
        }
    };

    if user.role == role {
        println!("User '{}' already has role {}.", username, role);
        return;
    }

    // The CLI acts as no particular user, so only the last-admin rule applies.
    let change = pool
        .change_user_role(user.id, role, |target, admin_count| {
            check_role_change(None, target, role, admin_count)
        })
        .await;
    if let Err(e) = change {
        eprintln!("Error updating role: {}", e);
        std::process::exit(1);
    }

    match pool.revoke_user_refresh_tokens(user.id).await {
        Ok(n) => println!(
            "User '{}' is now {} ({} session(s) signed out).",
            username, role, n
        ),
        Err(e) => {
            eprintln!("Role updated, but revoking sessions failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: manage-users <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  list, ls [--role <role>] [--search <text>]   List users");
    eprintln!("  set-role --username <login> --role <role>    Change a user's role");
    eprintln!("  help                                         Show this help");
    eprintln!();
    eprintln!("Roles: user, editor, admin");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  manage-users list --role editor");
    eprintln!("  manage-users set-role --username octocat --role admin");
    eprintln!();
}
