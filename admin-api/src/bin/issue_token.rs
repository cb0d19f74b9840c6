//! Issue a signed bearer token for local testing of the access API
//! Run with: cargo run --bin issue-token -- [role]
//!
//! Role falls back to TOKEN_ROLE, then super_admin. TOKEN_SUB and TOKEN_EMAIL
//! override the subject (random UUID) and email (<role>@ecogo.app).

use access_control::Role;
use uuid::Uuid;

use ecogo_admin_api::config::Config;
use ecogo_admin_api::middleware::issue_token;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    let role = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TOKEN_ROLE").ok())
        .unwrap_or_else(|| Role::SuperAdmin.as_str().to_string());
    let sub = std::env::var("TOKEN_SUB").unwrap_or_else(|_| Uuid::new_v4().to_string());
    let email = std::env::var("TOKEN_EMAIL").unwrap_or_else(|_| format!("{}@ecogo.app", role));

    if role.parse::<Role>().is_err() {
        eprintln!("Warning: '{}' is not a known role; the token will carry no grants", role);
    }

    let token = issue_token(&config.jwt, &sub, &email, &role)?;

    println!("\n========================================");
    println!("Subject:  {}", sub);
    println!("Email:    {}", email);
    println!("Role:     {}", role);
    println!("Expires:  {}h", config.jwt.expiry_hours);
    println!("========================================");
    println!("{}", token);

    Ok(())
}
