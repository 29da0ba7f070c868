//! `login`, `register` and the other account commands.

use crate::cli::Context;
use crate::cli::commands::format_duration;
use crate::domain::user::User;
use crate::forms::user::{
    ChangePasswordForm, EmailCodeForm, LoginForm, RegisterForm, ResetPasswordForm,
};
use crate::services::server_config::ServerConfigStore;
use crate::services::{ServiceResult, ensure_login, users};

pub async fn run_login(context: &Context, username: String, password: String) -> ServiceResult<()> {
    let user = context
        .session
        .login(&LoginForm { username, password })
        .await?;
    println!("Logged in as {} (CID {})", user.username, user.cid);
    Ok(())
}

pub async fn run_logout(context: &Context) -> ServiceResult<()> {
    context.session.logout().await;
    println!("Logged out.");
    Ok(())
}

pub async fn run_register(
    context: &Context,
    username: String,
    email: String,
    cid: i32,
    code: String,
    password: String,
) -> ServiceResult<()> {
    let mut limits = ServerConfigStore::new();
    if let Err(err) = limits.load(&context.api).await {
        log::warn!("Using built-in limits: {err}");
    }
    limits.validate_username(&context.api, &username).await?;
    limits.validate_email(&context.api, &email).await?;
    limits.validate_cid(&context.api, &cid.to_string()).await?;
    limits.validate_password(&password)?;

    context
        .session
        .register(RegisterForm {
            username: username.clone(),
            email,
            cid,
            email_code: code,
            confirm_password: password.clone(),
            password,
        })
        .await?;
    println!("Registered {username}, you can log in now.");
    Ok(())
}

pub async fn run_send_code(context: &Context, email: String, cid: i32) -> ServiceResult<()> {
    context
        .session
        .send_email_code(&EmailCodeForm { email: email.clone(), cid })
        .await?;
    println!("Verification code sent to {email}.");
    Ok(())
}

pub async fn run_reset_password(
    context: &Context,
    email: String,
    code: String,
    password: String,
) -> ServiceResult<()> {
    context
        .session
        .reset_password(&ResetPasswordForm {
            email,
            email_code: code,
            password,
        })
        .await?;
    println!("Password reset.");
    Ok(())
}

pub async fn run_whoami(context: &Context, user: Option<&User>) -> ServiceResult<()> {
    let profile = users::current_profile(&context.api, user).await?;
    println!("{} <{}>", profile.username, profile.email);
    println!("CID:        {}", profile.cid);
    println!(
        "Rating:     {}",
        profile
            .rating()
            .map_or_else(|| profile.rating.to_string(), |rating| rating.to_string())
    );
    println!("ATC time:   {}", format_duration(profile.total_atc_time));
    println!("Pilot time: {}", format_duration(profile.total_pilot_time));
    Ok(())
}

pub fn run_permissions(user: Option<&User>) -> ServiceResult<()> {
    let user = ensure_login(user)?;
    for record in user.permission.records() {
        let mark = if record.granted { "x" } else { " " };
        println!("[{mark}] {:<30} {}", record.name, record.desc);
    }
    Ok(())
}

pub async fn run_history(context: &Context, user: Option<&User>) -> ServiceResult<()> {
    let history = users::history(&context.api, user).await?;
    println!(
        "Pilot {} / ATC {}",
        format_duration(history.total_pilot_time),
        format_duration(history.total_atc_time)
    );
    for (role, records) in [("PILOT", &history.pilots), ("ATC", &history.controllers)] {
        for record in records {
            println!(
                "{:<6} {:<12} {} {}",
                role,
                record.callsign,
                record.start_time.format("%Y-%m-%d %H:%M"),
                format_duration(record.online_time)
            );
        }
    }
    Ok(())
}

pub async fn run_change_password(
    context: &Context,
    user: Option<&User>,
    old: String,
    new: String,
) -> ServiceResult<()> {
    let form = ChangePasswordForm {
        origin_password: old,
        confirm_password: new.clone(),
        new_password: new,
    };
    users::change_password(&context.api, user, form).await?;
    println!("Password changed, please log in again.");
    context.session.logout().await;
    Ok(())
}
