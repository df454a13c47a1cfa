use anyhow::Context;
use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;
use std::ops::RangeInclusive;

/// Accepted token lifetimes, one hour up to a year.
pub const JWT_TTL_HOURS: RangeInclusive<i64> = 1..=8760;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    /// Fixed offset of the server's timezone, used to decide what "today" is.
    pub utc_offset: FixedOffset,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenv().is_ok();

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a valid u16 number")?,
            Err(_) => 8080,
        };

        let jwt_ttl_hours = match env::var("JWT_TTL_HOURS") {
            Ok(raw) => parse_ttl_hours(&raw)?,
            Err(_) => 24,
        };

        let utc_offset = parse_utc_offset(
            &env::var("APP_UTC_OFFSET").unwrap_or_else(|_| "+00:00".into()),
        )?;

        Ok(Self {
            host: env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port,
            database_url: env::var("DATABASE_URL").context("DATABASE_URL missing, it is required")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET missing, it is required")?,
            jwt_ttl_hours,
            utc_offset,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

pub fn parse_utc_offset(raw: &str) -> anyhow::Result<FixedOffset> {
    raw.trim()
        .parse::<FixedOffset>()
        .with_context(|| format!("APP_UTC_OFFSET must look like +02:00, got {raw:?}"))
}

pub fn parse_ttl_hours(raw: &str) -> anyhow::Result<i64> {
    let hours: i64 = raw.trim().parse().context("JWT_TTL_HOURS must be an integer")?;
    if !JWT_TTL_HOURS.contains(&hours) {
        anyhow::bail!(
            "JWT_TTL_HOURS must be between {} and {}, got {hours}",
            JWT_TTL_HOURS.start(),
            JWT_TTL_HOURS.end()
        );
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_offsets() {
        assert_eq!(parse_utc_offset("+02:00").unwrap().local_minus_utc(), 7200);
        assert_eq!(parse_utc_offset("-05:30").unwrap().local_minus_utc(), -19800);
        assert_eq!(parse_utc_offset(" +00:00 ").unwrap().local_minus_utc(), 0);
    }

    #[test]
    fn rejects_garbage_offset() {
        let err = parse_utc_offset("Europe/Paris").unwrap_err();
        assert!(err.to_string().contains("APP_UTC_OFFSET"));
    }

    #[test]
    fn ttl_hours_must_be_in_range() {
        assert_eq!(parse_ttl_hours("24").unwrap(), 24);
        assert_eq!(parse_ttl_hours("8760").unwrap(), 8760);
        for raw in ["0", "-1", "9000", "9223372036854775807"] {
            let err = parse_ttl_hours(raw).unwrap_err();
            assert!(err.to_string().contains("between 1 and 8760"), "{raw}");
        }
        assert!(parse_ttl_hours("abc").is_err());
    }

    #[test]
    fn addr_joins_host_and_port() {
        let config = Config {
            host: "0.0.0.0".into(),
            port: 3000,
            database_url: "postgres://localhost/todolist".into(),
            jwt_secret: "secret".into(),
            jwt_ttl_hours: 1,
            utc_offset: parse_utc_offset("+00:00").unwrap(),
        };
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }
}
