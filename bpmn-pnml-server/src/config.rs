//! Startup configuration (C9, §4.9).
//!
//! Built once in `main` and threaded into the router as shared state — no
//! other module in this crate keeps process-wide mutable state. The only
//! thing the core itself requires from the environment is the presence of
//! `FORCE_STD_XML`; this crate never reads its value, only checks it's set,
//! mirroring the lineage this server descends from.

use bpmn_pnml_core::error::PrivateError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// Set when running under Cloud Run (or similar): gates the rate limiter.
    pub k_service: Option<String>,
    pub rate_limit_per_minute: u32,
}

impl Config {
    /// Fails fast if `FORCE_STD_XML` is unset so a misconfigured deploy
    /// never binds a listener.
    pub fn from_env() -> anyhow::Result<Self> {
        std::env::var("FORCE_STD_XML")
            .map_err(|_| PrivateError::MissingEnvironmentVariable("FORCE_STD_XML".to_string()))?;

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);

        let rate_limit_per_minute = std::env::var("RATE_LIMIT_PER_MINUTE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);

        Ok(Config {
            addr,
            k_service: std::env::var("K_SERVICE").ok(),
            rate_limit_per_minute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_force_std_xml_fails_fast() {
        std::env::remove_var("FORCE_STD_XML");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("FORCE_STD_XML"));
    }

    #[test]
    fn present_force_std_xml_loads_defaults() {
        std::env::set_var("FORCE_STD_XML", "1");
        std::env::remove_var("K_SERVICE");
        std::env::remove_var("PORT");
        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert!(config.k_service.is_none());
        std::env::remove_var("FORCE_STD_XML");
    }
}
