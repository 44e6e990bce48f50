//! Session commands - login, register, logout, whoami

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

use cipherstudio_core::Registration;

use super::{emit_json, get_context};
use crate::output;

pub async fn login(email: Option<String>, password: Option<String>, json: bool) -> Result<()> {
    let mut ctx = get_context("login")?;
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    // Rejections display as the bare inline message
    let identity = ctx.session.login(&email, &password).await;
    if json {
        return emit_json(identity);
    }
    output::success(&format!("Welcome back, {}", identity?.username));
    Ok(())
}

pub async fn register(
    email: Option<String>,
    username: Option<String>,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let mut ctx = get_context("register")?;
    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let username = match username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };
    let (password, confirm_password) = match password {
        Some(password) => (password.clone(), password),
        None => {
            let password = Password::new().with_prompt("Password").interact()?;
            let confirm = Password::new().with_prompt("Confirm password").interact()?;
            (password, confirm)
        }
    };

    let registration = Registration {
        email,
        username,
        password,
        confirm_password,
    };

    let identity = ctx.session.register(&registration).await;
    if json {
        return emit_json(identity);
    }
    output::success(&format!("Account created for {}", identity?.username));
    Ok(())
}

pub fn logout() -> Result<()> {
    let mut ctx = get_context("logout")?;
    if !ctx.session.is_authenticated() {
        println!("{}", "Not signed in".dimmed());
        return Ok(());
    }
    ctx.session.logout()?;
    output::success("Signed out");
    Ok(())
}

pub fn whoami(json: bool) -> Result<()> {
    let ctx = get_context("whoami")?;
    let identity = ctx.session.current();

    if json {
        return emit_json(Ok(identity));
    }

    match identity {
        Some(identity) => {
            println!("{}", identity.username.bold());
            println!("  Email: {}", identity.email);
            println!("  ID: {}", identity.id.dimmed());
            println!("  Provider: {}", ctx.session.provider_name().dimmed());
        }
        None => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}
