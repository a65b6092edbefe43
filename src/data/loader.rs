//! JSON loaders for dashboard exports.
//!
//! Notes are a JSON array. The client directory is either an array of
//! clients or an object keyed by client key (the dashboard's `clientsDB`).

use crate::models::{Client, SalesNote};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while reading an export file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected content in {}: expected {expected}", .path.display())]
    Shape { path: PathBuf, expected: &'static str },
}

fn read_json(path: &Path) -> Result<Value, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load sales notes from a JSON array.
///
/// Entries that aren't objects are skipped with a warning.
pub fn load_notes(path: &Path) -> Result<Vec<SalesNote>, LoadError> {
    let Value::Array(entries) = read_json(path)? else {
        return Err(LoadError::Shape {
            path: path.to_path_buf(),
            expected: "an array of sales notes",
        });
    };

    let total = entries.len();
    let notes: Vec<SalesNote> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, entry)| match serde_json::from_value(entry) {
            Ok(note) => Some(note),
            Err(e) => {
                warn!("Skipping note #{} in {}: {}", i, path.display(), e);
                None
            }
        })
        .collect();

    info!("Loaded {} of {} notes from {}", notes.len(), total, path.display());
    Ok(notes)
}

/// Load the client directory from an array or a keyed object.
///
/// In the keyed form the key becomes the client's `id` when the record has
/// none of its own.
pub fn load_clients(path: &Path) -> Result<Vec<Client>, LoadError> {
    let clients = match read_json(path)? {
        Value::Array(entries) => entries
            .into_iter()
            .enumerate()
            .filter_map(|(i, entry)| parse_client(entry, None, path, i))
            .collect::<Vec<_>>(),
        Value::Object(map) => map
            .into_iter()
            .enumerate()
            .filter_map(|(i, (key, entry))| parse_client(entry, Some(key), path, i))
            .collect::<Vec<_>>(),
        _ => {
            return Err(LoadError::Shape {
                path: path.to_path_buf(),
                expected: "an array or object of clients",
            })
        }
    };

    info!("Loaded {} clients from {}", clients.len(), path.display());
    Ok(clients)
}

fn parse_client(entry: Value, key: Option<String>, path: &Path, index: usize) -> Option<Client> {
    match serde_json::from_value::<Client>(entry) {
        Ok(mut client) => {
            if client.id.as_deref().map_or(true, str::is_empty) {
                if let Some(key) = key {
                    debug!("Client #{} has no id, using key {}", index, key);
                    client.id = Some(key);
                }
            }
            Some(client)
        }
        Err(e) => {
            warn!("Skipping client #{} in {}: {}", index, path.display(), e);
            None
        }
    }
}
