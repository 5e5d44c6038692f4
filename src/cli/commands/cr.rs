//! CentralReach pass-through commands.
//!
//! Each subcommand performs exactly one request and prints the payload.

use chrono::Utc;
use std::future::Future;

use crate::centralreach::{CentralReachClient, DateWindow, FetchOptions};
use crate::cli::CrCommands;
use crate::config::load_config;
use crate::error::{Error, Result};
use crate::validate::parse_date;

/// Split `key=value` query arguments.
fn parse_query(pairs: &[String]) -> Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| Error::InvalidArgument(format!("expected KEY=VALUE, got '{pair}'")))
        })
        .collect()
}

fn date_window(from: Option<&str>, to: Option<&str>) -> Result<DateWindow> {
    let today = Utc::now().date_naive();
    Ok(DateWindow {
        start: from.map(|d| parse_date(d, today)).transpose()?,
        end: to.map(|d| parse_date(d, today)).transpose()?,
    })
}

fn block_on<F: Future<Output = Result<serde_json::Value>>>(future: F) -> Result<serde_json::Value> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create async runtime: {e}")))?;
    runtime.block_on(future)
}

/// Execute CentralReach commands.
///
/// # Errors
///
/// Returns a transport error for non-success responses, or a validation
/// error for malformed arguments.
pub fn execute(command: &CrCommands, json: bool) -> Result<()> {
    let config = load_config()?;
    let client = CentralReachClient::from_config(&config)?;

    let payload = match command {
        CrCommands::Get { path, query } => {
            let mut options = FetchOptions::get();
            options.query = parse_query(query)?;
            block_on(client.fetch_resource(path, options))?
        }
        CrCommands::Clients { search } => block_on(client.list_clients(search.as_deref()))?,
        CrCommands::Client { id } => block_on(client.get_client(id))?,
        CrCommands::Appointments { client: client_id, from, to } => {
            let window = date_window(from.as_deref(), to.as_deref())?;
            block_on(client.list_appointments(client_id.as_deref(), &window))?
        }
        CrCommands::Billing { from, to } => {
            let window = date_window(from.as_deref(), to.as_deref())?;
            block_on(client.list_billing_entries(&window))?
        }
    };

    if json {
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query() {
        let pairs = parse_query(&["page=2".to_string(), "q=a=b".to_string()]).unwrap();
        assert_eq!(pairs[0], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[1], ("q".to_string(), "a=b".to_string()));
    }

    #[test]
    fn test_parse_query_rejects_missing_equals() {
        assert!(matches!(parse_query(&["page".to_string()]), Err(Error::InvalidArgument(_))));
        assert!(matches!(parse_query(&["=2".to_string()]), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_date_window() {
        let window = date_window(Some("2024-06-01"), None).unwrap();
        assert_eq!(window.start, chrono::NaiveDate::from_ymd_opt(2024, 6, 1));
        assert!(window.end.is_none());
    }
}
