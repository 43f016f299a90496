//! Plugging a custom transport into the client
//!
//! Serves a canned search page instead of talking to the network.
//!
//! Run with: `cargo run --example custom_transport`

use async_trait::async_trait;
use pypic::{HttpResponse, HttpTransport, PypiClient, Result, TransportError};
use std::sync::Arc;

const PAGE: &str = "<table>\
<tr><td><a href='/pypi/pypic/0.1.0'>pypic&nbsp;0.1.0</a></td><td>9</td>\
<td>Check and search the package index</td></tr>\
</table>";

/// Answers every request from memory, in small chunks
#[derive(Debug)]
struct OfflineIndex;

#[async_trait]
impl HttpTransport for OfflineIndex {
    async fn get(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> std::result::Result<HttpResponse, TransportError> {
        println!("   GET {} {:?}", url, params);

        if url.ends_with("/pypic/json") {
            return Ok(HttpResponse::from_text(200, url, "{}"));
        }
        if params.is_empty() {
            return Ok(HttpResponse::from_text(404, url, "Not Found"));
        }

        let chunks: Vec<Vec<u8>> = PAGE.as_bytes().chunks(16).map(<[u8]>::to_vec).collect();
        Ok(HttpResponse::from_chunks(200, url, chunks))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== pypic Custom Transport Example ===\n");

    let client = PypiClient::builder()
        .base_url("http://offline.index")
        .transport(Arc::new(OfflineIndex))
        .build()?;

    println!("1. Existence checks:");
    println!("   pypic: {}", client.exists("pypic", None).await?);
    println!("   other: {}\n", client.exists("other", None).await?);

    println!("2. Search:");
    for result in client.search(&["pypic"]).await? {
        println!(
            "   {} {} (weight {}) - {}",
            result.name.unwrap_or_default(),
            result.version.unwrap_or_default(),
            result.weight.unwrap_or_default(),
            result.desc.unwrap_or_default()
        );
    }

    Ok(())
}
