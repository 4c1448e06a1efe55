//! Canonicalize command implementation.

use fleetdiff_canonical::canonicalize;
use std::io::{self, Read};

pub fn run(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    // Read the policy from file or stdin
    let policy = if let Some(path) = input {
        std::fs::read(&path).map_err(|e| format!("failed to read policy {}: {}", path, e))?
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        buffer
    };

    let canonical =
        canonicalize(&policy).map_err(|e| format!("failed to canonicalize policy: {}", e))?;

    print!("{}", String::from_utf8_lossy(&canonical));
    Ok(())
}
