use clap::Parser;
use std::net::{SocketAddr, ToSocketAddrs};
use std::ops::RangeInclusive;

pub const PORT_RANGE: RangeInclusive<usize> = 1..=65535;

#[derive(Parser, Debug, Clone)]
#[command(name = "renovation-tracker", version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "RENOVATION_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "RENOVATION_IP", default_value = "127.0.0.1")]
    pub ip: String,
    #[arg(long, env = "RENOVATION_PORT", value_parser = port_in_range, default_value_t = 3000)]
    pub port: u16,
    #[arg(long, env = "RENOVATION_DATABASE_PATH", default_value = "renovation.sqlite3")]
    pub database_path: String,
    #[arg(long, env = "RENOVATION_SCHEMA_PATH", default_value = "sql/schema.sql")]
    pub schema_path: String,
    #[arg(long, env = "RENOVATION_MAX_WORKERS", value_parser = greater_than_zero::<usize>, default_value = "8")]
    pub max_workers: usize,
    /// Only allow the forward workflow graph for kanban moves.
    #[arg(long, env = "RENOVATION_STRICT_TRANSITIONS", default_value = "false")]
    pub strict_transitions: bool,
}

impl Config {
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        let uri = format!("{}:{}", self.ip, self.port);
        uri.to_socket_addrs()
            .map_err(|e| format!("{uri} is not a valid address: {e}"))?
            .next()
            .ok_or(format!("{uri} is not a valid address"))
    }
}

pub fn port_in_range(s: &str) -> Result<u16, String> {
    let port: usize = s
        .parse()
        .map_err(|_| format!("`{s}` is not a port number"))?;

    if PORT_RANGE.contains(&port) {
        Ok(port as u16)
    } else {
        Err(format!(
            "port not in range {}-{}",
            PORT_RANGE.start(),
            PORT_RANGE.end()
        ))
    }
}

pub fn greater_than_zero<
    T: std::str::FromStr + std::cmp::PartialOrd + std::fmt::Display + Default,
>(
    s: &str,
) -> Result<T, String> {
    let num: T = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid number", s))?;

    if num > T::default() {
        Ok(num)
    } else {
        Err(format!("`{}` is not larger than 0", s))
    }
}
