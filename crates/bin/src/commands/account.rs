//! Account commands: register, login, whoami, reset-password, users.

use notesync::directory::Session;
use serde_json::json;

use crate::cli::{LoginArgs, RegisterArgs, ResetPasswordArgs, StoreArgs, WhoamiArgs};
use crate::context::create_service;
use crate::output::{OutputFormat, print_json, print_table};

fn print_session(session: &Session, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            println!("User ID:  {}", session.account.id);
            println!("Name:     {}", session.account.name);
            println!("Email:    {}", session.account.email);
            println!("Token:    {}", session.token);
            Ok(())
        }
        OutputFormat::Json => print_json(session),
    }
}

/// Run the `register` command
pub async fn register(
    args: &RegisterArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(&args.store)?;
    let session = service
        .register(&args.name, &args.email, &args.password)
        .await?;
    print_session(&session, format)
}

/// Run the `login` command
pub async fn login(args: &LoginArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(&args.store)?;
    let session = service.login(&args.email, &args.password).await?;
    print_session(&session, format)
}

/// Run the `whoami` command
pub async fn whoami(
    args: &WhoamiArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(&args.store)?;
    let Some(claims) = service.verify_session(&args.token) else {
        return Err("Invalid or expired session token".into());
    };

    match format {
        OutputFormat::Human => {
            println!("User ID:    {}", claims.user_id);
            println!("Issued at:  {} ms", claims.issued_at);
            Ok(())
        }
        OutputFormat::Json => print_json(&claims),
    }
}

/// Run the `reset-password` command
pub async fn reset_password(
    args: &ResetPasswordArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(&args.store)?;
    let ack = service.request_password_reset(&args.email).await?;
    match format {
        OutputFormat::Human => {
            println!("{}", ack.message);
            Ok(())
        }
        OutputFormat::Json => print_json(&ack),
    }
}

/// Run the `users` command
pub async fn users(args: &StoreArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(args)?;
    let accounts = service.list_accounts().await?;

    match format {
        OutputFormat::Human => {
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = accounts
                .iter()
                .map(|a| vec![a.id.clone(), a.name.clone(), a.email.clone()])
                .collect();
            print_table(&["ID", "NAME", "EMAIL"], &rows);
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({ "accounts": accounts })),
    }
}
