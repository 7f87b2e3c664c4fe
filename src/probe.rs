// src/probe.rs
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

// An info response larger than this is treated as malformed.
pub const MAX_INFO_BYTES: usize = 8 * 1024;

#[derive(Debug)]
pub enum ProbeError {
    Network(io::Error),
    Timeout,
    Protocol(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(err) => write!(f, "connection failed: {}", err),
            Self::Timeout => write!(f, "no response before the probe deadline"),
            Self::Protocol(msg) => write!(f, "invalid info response: {}", msg),
        }
    }
}

#[derive(Serialize)]
struct InfoRequest<'a> {
    request: &'static str,
    key: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbedInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub requires_password: bool,
    #[serde(default)]
    pub players: u32,
    pub max_players: u32,
    pub version: String,
}

// Connects back to the advertised address, sends one info request carrying
// the advertise key, and reads one newline-terminated JSON response. The
// whole exchange shares a single deadline; a single failure aborts the
// advertise, there are no retries here.
pub async fn fetch_server_info(
    addr: SocketAddr,
    key: &str,
    timeout: Duration,
) -> Result<ProbedInfo, ProbeError> {
    debug!("Probing {} for server info", addr);
    match tokio::time::timeout(timeout, exchange(addr, key)).await {
        Ok(result) => result,
        Err(_) => Err(ProbeError::Timeout),
    }
}

async fn exchange(addr: SocketAddr, key: &str) -> Result<ProbedInfo, ProbeError> {
    let mut stream = TcpStream::connect(addr).await.map_err(ProbeError::Network)?;

    let mut request = serde_json::to_vec(&InfoRequest { request: "info", key })
        .map_err(|err| ProbeError::Protocol(err.to_string()))?;
    request.push(b'\n');
    stream.write_all(&request).await.map_err(ProbeError::Network)?;

    let mut response = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = stream.read(&mut chunk).await.map_err(ProbeError::Network)?;
        if read == 0 {
            break;
        }
        response.extend_from_slice(&chunk[..read]);
        if response.len() > MAX_INFO_BYTES {
            return Err(ProbeError::Protocol(format!(
                "response exceeds {} bytes",
                MAX_INFO_BYTES
            )));
        }
        if chunk[..read].contains(&b'\n') {
            break;
        }
    }

    let line = match response.iter().position(|&b| b == b'\n') {
        Some(pos) => &response[..pos],
        None => &response[..],
    };
    serde_json::from_slice(line).map_err(|err| ProbeError::Protocol(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    const INFO_JSON: &str = concat!(
        "{\"name\":\"Park\",\"description\":\"creative build server\",",
        "\"provider\":\"host.example\",\"requiresPassword\":false,",
        "\"players\":2,\"maxPlayers\":8,\"version\":\"1.0.0\"}\n"
    );

    // A one-shot stand-in for a game server: accepts a connection, reads the
    // request, writes the canned response, and hands the request back.
    async fn spawn_game_server(response: Vec<u8>) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let read = stream.read(&mut buf).await.unwrap();
            stream.write_all(&response).await.unwrap();
            String::from_utf8_lossy(&buf[..read]).into_owned()
        });
        (addr, handle)
    }

    #[tokio::test]
    async fn probe_parses_a_full_info_response() {
        let (addr, handle) = spawn_game_server(INFO_JSON.as_bytes().to_vec()).await;

        let info = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(info.name, "Park");
        assert_eq!(info.description, "creative build server");
        assert_eq!(info.provider, "host.example");
        assert_eq!(info.players, 2);
        assert_eq!(info.max_players, 8);
        assert!(!info.requires_password);
        assert_eq!(info.version, "1.0.0");

        let request = handle.await.unwrap();
        assert!(request.contains("\"request\":\"info\""));
        assert!(request.contains("\"key\":\"k\""));
        assert!(request.ends_with('\n'));
    }

    #[tokio::test]
    async fn probe_defaults_the_optional_fields() {
        let response = b"{\"name\":\"Bare\",\"maxPlayers\":4,\"version\":\"0.2\"}\n".to_vec();
        let (addr, _handle) = spawn_game_server(response).await;

        let info = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap();
        assert_eq!(info.name, "Bare");
        assert_eq!(info.description, "");
        assert_eq!(info.provider, "");
        assert_eq!(info.players, 0);
        assert!(!info.requires_password);
    }

    #[tokio::test]
    async fn probe_rejects_a_malformed_response() {
        let (addr, _handle) = spawn_game_server(b"not json at all\n".to_vec()).await;

        let err = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Protocol(_)));
    }

    #[tokio::test]
    async fn probe_rejects_a_response_missing_required_fields() {
        let (addr, _handle) =
            spawn_game_server(b"{\"name\":\"NoMax\",\"version\":\"1.0\"}\n".to_vec()).await;

        let err = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Protocol(_)));
    }

    #[tokio::test]
    async fn probe_rejects_an_oversized_response() {
        let oversized = vec![b'a'; MAX_INFO_BYTES + 16];
        let (addr, _handle) = spawn_game_server(oversized).await;

        let err = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Protocol(_)));
    }

    #[tokio::test]
    async fn probe_times_out_on_a_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let holder = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(stream);
        });

        let err = fetch_server_info(addr, "k", Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Timeout));
        holder.abort();
    }

    #[tokio::test]
    async fn probe_reports_a_network_error_when_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetch_server_info(addr, "k", Duration::from_secs(2))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::Network(_)));
    }
}
