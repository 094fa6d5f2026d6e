//! Startup banner: where to reach the server and where its tables live.

use crate::ServerConfig;
use cartrack_store::TableId;
use std::net::IpAddr;
use tracing::{info, warn};

/// `http://ip:port` for each non-loopback IPv4 address, in input order.
pub fn lan_urls(addrs: impl IntoIterator<Item = IpAddr>, port: u16) -> Vec<String> {
    addrs
        .into_iter()
        .filter(|ip| ip.is_ipv4() && !ip.is_loopback())
        .map(|ip| format!("http://{ip}:{port}"))
        .collect()
}

fn interface_addrs() -> Vec<IpAddr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces.iter().map(if_addrs::Interface::ip).collect(),
        Err(e) => {
            warn!("could not determine network addresses: {e}");
            Vec::new()
        }
    }
}

pub fn log_banner(config: &ServerConfig, port: u16) {
    info!("cartrack listening on {}:{port}", config.bind);
    info!("  local:   http://localhost:{port}");
    for url in lan_urls(interface_addrs(), port) {
        info!("  network: {url}");
    }
    for table in TableId::ALL {
        info!("  {table}: {}", config.store.table_path(table).display());
    }
    info!("  public: {}", config.public_dir.display());
}
