//! Backend service command: `pipegen serve`.

use anyhow::Result;

use pipegen::config::PipegenConfig;
use pipegen::server::{ServerConfig, start_server};

pub async fn cmd_serve(config: &PipegenConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut server = ServerConfig::from_config(config);
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    start_server(config, server).await
}
