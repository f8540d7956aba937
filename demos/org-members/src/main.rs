//! Organization members example
//!
//! Lists the members of an organization, then the organizations of the
//! current user. Reads `HEROKU_API_KEY` and optionally `HEROKU_MANAGER_URL`.
//!
//! ```sh
//! HEROKU_API_KEY=... cargo run -p org-members-example -- acme
//! ```

#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use orgs::prelude::*;

#[tokio::main]
async fn main() -> orgs::Result<()> {
    let Some(org) = std::env::args().nth(1) else {
        eprintln!("usage: org-members <organization>");
        return Ok(());
    };

    let client = OrgsClient::from_env();

    match client.get_members(&org).await {
        Ok(members) => {
            println!("{} member(s) in {org}:", members.len());
            for member in &members {
                println!("  {:<40} {}", member.email, member.role.as_deref().unwrap_or("-"));
            }
        }
        Err(err) if err.kind() == Some(ErrorKind::NotFound) => {
            println!("no organization named {org}");
        }
        Err(err) if err.kind() == Some(ErrorKind::Unauthorized) => {
            eprintln!("the API key was rejected, check HEROKU_API_KEY");
            return Err(err);
        }
        Err(err) => return Err(err),
    }

    let orgs = client.get_orgs().await?;
    match orgs.get("organizations").and_then(|value| value.as_array()) {
        Some(list) => {
            println!("\nyour organizations:");
            for entry in list {
                let name = entry
                    .get("organization_name")
                    .and_then(|value| value.as_str())
                    .unwrap_or("?");
                println!("  {name}");
            }
        }
        None => println!("\nyou are not a member of any organization"),
    }

    Ok(())
}
