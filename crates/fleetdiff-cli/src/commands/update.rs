//! Update command implementation: regenerate a golden fixture.

use std::path::Path;

use fleetdiff_canonical::canonicalize;
use fleetdiff_compare::expected_path;

pub fn run(test_config: String, found: String) -> Result<(), Box<dyn std::error::Error>> {
    let policy = std::fs::read(&found)
        .map_err(|e| format!("failed to read found policy {}: {}", found, e))?;

    let canonical =
        canonicalize(&policy).map_err(|e| format!("failed to prepare policy to store: {}", e))?;

    let fixture = expected_path(Path::new(&test_config));
    std::fs::write(&fixture, canonical)
        .map_err(|e| format!("failed to write policy {}: {}", fixture.display(), e))?;

    println!("wrote {}", fixture.display());
    Ok(())
}
