//! Print a service's OpenAPI document as JSON.
//!
//! Usage: `openapi-dump [users|tickets]` (defaults to `users`).

use color_eyre::eyre::{Result, eyre};
use helpdesk::{TicketsApiDoc, UsersApiDoc};
use utoipa::OpenApi;

fn main() -> Result<()> {
    color_eyre::install()?;
    let doc = match std::env::args().nth(1).as_deref() {
        None | Some("users") => UsersApiDoc::openapi(),
        Some("tickets") => TicketsApiDoc::openapi(),
        Some(other) => return Err(eyre!("unknown service `{other}`; expected users or tickets")),
    };
    println!("{}", doc.to_pretty_json()?);
    Ok(())
}
