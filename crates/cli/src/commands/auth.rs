//! Session commands.

use secrecy::SecretString;

use barberbook_storefront::{AppError, Notice, Storefront};

use crate::output;

pub async fn login(app: &Storefront, email: &str, password: SecretString) -> Result<(), AppError> {
    let user = app.auth().login(email, password).await?;
    output::notice(&Notice::success(format!("Welcome back, {}", user.name)));
    Ok(())
}

pub async fn register(
    app: &Storefront,
    name: &str,
    email: &str,
    phone: &str,
    password: SecretString,
) -> Result<(), AppError> {
    let user = app.auth().register(name, email, phone, password).await?;
    output::notice(&Notice::success(format!("Account created for {}", user.email)));
    Ok(())
}

pub async fn logout(app: &Storefront) -> Result<(), AppError> {
    app.auth().logout().await?;
    output::notice(&Notice::success("Logged out"));
    Ok(())
}

pub async fn whoami(app: &Storefront) -> Result<(), AppError> {
    match app.auth().refresh_session().await? {
        Some(user) => output::user(&user),
        None => output::notice(&Notice::info("Not logged in")),
    }
    Ok(())
}
