//! Compare command implementation.

use fleetdiff_compare::compare_report;

pub fn run(expected: String, found: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let expected_bytes = std::fs::read(&expected)
        .map_err(|e| format!("failed to read expected policy {}: {}", expected, e))?;
    let found_bytes = std::fs::read(&found)
        .map_err(|e| format!("failed to read found policy {}: {}", found, e))?;

    let report = compare_report(&expected_bytes, &found_bytes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.equal {
        println!("policies match");
    } else {
        print!("{}", report.diff);
    }

    if report.equal {
        Ok(())
    } else {
        Err("unexpected content in policy".into())
    }
}
