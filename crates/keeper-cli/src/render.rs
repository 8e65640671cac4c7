//! Terminal rendering for the shell.

use console::style;
use keeper_client::{LocalSecret, SyncReport};
use keeper_core::messages::SecretTypeInfo;
use keeper_core::{SecretListing, SecretPayload};

use crate::parse::COMMANDS;

/// Print the welcome banner for the shell.
pub fn render_welcome(server_url: &str) {
    eprintln!(
        "{} {} {}",
        style("keeper").bold().cyan(),
        style("shell").dim(),
        style(format!("({server_url})")).dim(),
    );
    eprintln!("{}", style("Type help for commands, exit to quit.").dim());
    eprintln!();
}

/// Print the help message.
pub fn render_help() {
    eprintln!("{}", style("Available commands:").bold());
    for (name, usage) in COMMANDS {
        let rest = usage.strip_prefix(name).unwrap_or(usage);
        eprintln!("  {}{}", style(name).cyan(), rest);
    }
    eprintln!();
}

/// Print a decrypted secret. Sensitive fields are shown in full: the user
/// asked for them.
pub fn render_secret(secret: &LocalSecret) {
    println!(
        "{} {}  {}",
        style(format!("#{}", secret.id)).dim(),
        style(&secret.title).bold(),
        style(secret.secret_type()).dim(),
    );
    match &secret.payload {
        SecretPayload::LoginPass(p) => {
            println!("  login:    {}", p.login);
            println!("  password: {}", p.password.expose_secret());
        }
        SecretPayload::Text(p) => println!("  {}", p.text),
        SecretPayload::Card(p) => {
            println!("  number: {}", p.card_number);
            println!("  cvv:    {}", p.cvv.expose_secret());
            println!("  due:    {}", p.due);
        }
    }
    println!(
        "  {} {}",
        style("updated").dim(),
        style(secret.updated_at.to_rfc3339()).dim()
    );
}

pub fn render_listing(listing: &[SecretListing]) {
    if listing.is_empty() {
        println!("{}", style("(none)").dim());
    }
    for item in listing {
        println!("  {} {}", style(format!("#{}", item.id)).dim(), item.title);
    }
}

pub fn render_types(types: &[SecretTypeInfo]) {
    for t in types {
        println!("  {} {}", style(t.id).cyan(), t.title);
    }
}

/// Report a success line.
pub fn render_ok(message: &str) {
    println!("{} {}", style("*").green(), message);
}

pub fn render_error(message: impl std::fmt::Display) {
    eprintln!("{}: {}", style("Error").red(), message);
}

/// Warn about types that failed to sync; silent when everything synced.
pub fn render_sync_report(report: &SyncReport) {
    for (secret_type, reason) in &report.failed {
        eprintln!(
            "{} could not sync {}: {}",
            style("!").yellow(),
            secret_type,
            style(reason).dim()
        );
    }
}
