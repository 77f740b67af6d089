//! Local network interfaces a phone can reach

use serde::Serialize;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkInterface {
    /// Display label, e.g. `Wi-Fi (192.168.1.5)`
    pub name: String,
    pub ip: String,
}

/// IPv4 addresses suitable for a pairing URL
pub fn list_interfaces() -> Vec<NetworkInterface> {
    let adapters = match local_ip_address::list_afinet_netifas() {
        Ok(adapters) => adapters,
        Err(e) => {
            tracing::warn!("Failed to enumerate network interfaces: {}", e);
            Vec::new()
        }
    };
    usable_interfaces(adapters)
}

fn usable_interfaces(adapters: Vec<(String, IpAddr)>) -> Vec<NetworkInterface> {
    let mut interfaces: Vec<NetworkInterface> = adapters
        .into_iter()
        .filter_map(|(name, addr)| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() => {
                Some(NetworkInterface {
                    name: format!("{} ({})", name, v4),
                    ip: v4.to_string(),
                })
            }
            _ => None,
        })
        .collect();

    if interfaces.is_empty() {
        interfaces.push(NetworkInterface {
            name: "Localhost (127.0.0.1)".to_string(),
            ip: "127.0.0.1".to_string(),
        });
    }
    interfaces
}
