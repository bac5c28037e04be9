//! OpenAPI Specification Generator Binary
//!
//! Writes the Rolodex OpenAPI specification as JSON to stdout.
//!
//! Usage:
//!   cargo run -p rolodex-api --bin generate-openapi > openapi.json

use rolodex_api::ApiDoc;

fn main() {
    match ApiDoc::to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize OpenAPI spec: {}", e);
            std::process::exit(1);
        }
    }
}
