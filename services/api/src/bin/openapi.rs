//! services/api/src/bin/openapi.rs
//!
//! Dumps the timetable API document for client generation without starting
//! the server.
//!
//! Usage: `openapi [OUTPUT]`, where OUTPUT defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use std::path::{Path, PathBuf};
use utoipa::OpenApi;

fn write_document(doc: &utoipa::openapi::OpenApi, output: &Path) -> std::io::Result<usize> {
    let json = doc.to_pretty_json().map_err(std::io::Error::other)?;
    std::fs::write(output, json)?;
    Ok(doc.paths.paths.len())
}

fn main() -> std::io::Result<()> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let routes = write_document(&ApiDoc::openapi(), &output)?;
    println!("Wrote {routes} timetable routes to {}", output.display());
    Ok(())
}
