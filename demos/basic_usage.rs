//! Basic usage examples for the pypic library
//!
//! Run with: `cargo run --example basic_usage`

use pypic::utils::{format_result_line, parse_batch_input};
use pypic::{normalize, PypiClient, PypicError, Result};

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== pypic Basic Usage Examples ===\n");

    // Create a new client with default settings
    let client = PypiClient::new();

    // Example 1: Name normalization
    println!("1. Normalizing package names:");
    for name in ["Zope.Interface", "Flask_SQLAlchemy", "pypic"] {
        println!("   {} -> {}", name, normalize(name));
    }
    println!();

    // Example 2: Check if a package exists
    println!("2. Checking if 'requests' exists:");
    let exists = client.exists("requests", None).await?;
    println!("   requests exists: {}\n", exists);

    // Example 3: Check a specific release
    println!("3. Checking if 'pypic' 0.1.0 exists:");
    let exists = client.exists("pypic", Some("0.1.0")).await?;
    println!("   pypic 0.1.0 exists: {}\n", exists);

    // Example 4: Search the index
    println!("4. Searching for 'http client':");
    match client.search(&["http", "client"]).await {
        Ok(results) => {
            for result in results.iter().take(5) {
                println!("   {}", format_result_line(result));
            }
        }
        Err(PypicError::SearchUnavailable(reason)) => println!("   Search unavailable: {}", reason),
        Err(e) => return Err(e),
    }
    println!();

    // Example 5: Batch check
    println!("5. Batch checking packages:");
    let input = parse_batch_input(r#"{"requests": null, "flask": "3.0.0"}"#)?;
    for check in client.check_batch(&input).await {
        println!(
            "   {} {}: {}",
            check.normalized_name,
            check.version.as_deref().unwrap_or("any"),
            if check.exists { "exists" } else { "missing" }
        );
    }

    Ok(())
}
