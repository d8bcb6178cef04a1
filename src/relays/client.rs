use std::time::Duration;

use reqwest::{Client, header::ACCEPT};
use thiserror::Error;
use url::Url;

use super::model::Relay;

pub const DEFAULT_RELAY_LIST_URL: &str = "https://api.mullvad.net/www/relays/all/";
const USER_AGENT: &str = concat!("relayping/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("invalid relay list url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("relay list url must be http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("failed to fetch relay list: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay list request failed: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Parses and checks a relay list location.
pub fn parse_relay_list_url(url: &str) -> Result<Url, DirectoryError> {
    let parsed = Url::parse(url).map_err(|source| DirectoryError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(DirectoryError::UnsupportedScheme(other.to_string())),
    }
}

/// Builds the HTTP client used to fetch the relay directory.
pub fn build_client(timeout: Duration) -> Result<Client, DirectoryError> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetches the full relay list from the provider's directory endpoint.
///
/// # Arguments
///
/// * `client` - The HTTP client to use.
/// * `url` - The relay directory location (e.g., "https://api.mullvad.net/www/relays/all/").
pub async fn fetch_relays(client: &Client, url: &Url) -> Result<Vec<Relay>, DirectoryError> {
    log::info!("Fetching relay list from {url}");

    let response = client
        .get(url.clone())
        .header(ACCEPT, "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::error!("Failed to fetch relay list: {} - {}", status, body);
        return Err(DirectoryError::Status { status, body });
    }

    let relays: Vec<Relay> = response.json().await?;
    log::info!("Relay list contains {} entries", relays.len());
    Ok(relays)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        Url::parse(&format!("http://{addr}/relays/all/")).expect("url")
    }

    #[test]
    fn test_parse_relay_list_url() {
        assert!(parse_relay_list_url(DEFAULT_RELAY_LIST_URL).is_ok());
        assert!(matches!(
            parse_relay_list_url("not a url"),
            Err(DirectoryError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_relay_list_url("ftp://relays.example/all"),
            Err(DirectoryError::UnsupportedScheme(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_relays_decodes_list() {
        let url = serve_once(
            "HTTP/1.1 200 OK",
            r#"[{"hostname":"se-got-wg-001","country_code":"se","type":"wireguard","extra":1}]"#,
        )
        .await;
        let client = build_client(Duration::from_secs(5)).expect("client");

        let relays = fetch_relays(&client, &url).await.expect("fetch");
        assert_eq!(relays.len(), 1);
        assert_eq!(relays[0].hostname, "se-got-wg-001");
        assert_eq!(relays[0].country_code.as_deref(), Some("se"));
    }

    #[tokio::test]
    async fn test_fetch_relays_reports_status() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable", "down for maintenance").await;
        let client = build_client(Duration::from_secs(5)).expect("client");

        match fetch_relays(&client, &url).await {
            Err(DirectoryError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 503);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
