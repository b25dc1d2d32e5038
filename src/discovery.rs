//! Host discovery: resolves the nearest/least-loaded WebSocket endpoint to
//! connect to, rather than hardcoding one.

use serde::Deserialize;

use crate::error::DiscoveryError;

/// One candidate endpoint returned by discovery, ordered by server
/// preference: callers should try them in order.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveredHost {
    pub address: String,
}

/// Queries `discovery_url` for an ordered list of candidate hosts. The
/// endpoint returns a bare JSON array at the top level, not an enveloped
/// object.
pub async fn discover_hosts(client: &reqwest::Client, discovery_url: &str) -> Result<Vec<DiscoveredHost>, DiscoveryError> {
    let response = client.get(discovery_url).send().await?;
    let body = response.bytes().await?;
    let hosts: Vec<DiscoveredHost> = serde_json::from_slice(&body)?;
    if hosts.is_empty() {
        return Err(DiscoveryError::NoHostsFound);
    }
    Ok(hosts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_parses_into_discovered_hosts() {
        let parsed: Vec<DiscoveredHost> = serde_json::from_str(r#"[{"address":"wss://a"},{"address":"wss://b"}]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].address, "wss://a");
    }

    #[test]
    fn empty_array_parses_as_empty() {
        let parsed: Vec<DiscoveredHost> = serde_json::from_str("[]").unwrap();
        assert!(parsed.is_empty());
    }
}
