use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// What to do with a line-item column that has no `salary_item_meta` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownItemPolicy {
    /// Fail the whole upload and report every unknown column.
    Reject,
    /// Classify unknown columns into the given group.
    Fallback(String),
}

impl FromStr for UnknownItemPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("reject") {
            return Ok(UnknownItemPolicy::Reject);
        }
        match s.strip_prefix("fallback:") {
            Some(group) if !group.trim().is_empty() => {
                Ok(UnknownItemPolicy::Fallback(group.trim().to_string()))
            }
            _ => Err(format!(
                "expected `reject` or `fallback:<group>`, got `{}`",
                s
            )),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,

    // Classification
    pub item_groups: Vec<String>,
    pub unknown_item_policy: UnknownItemPolicy,
    pub classifier_cache_capacity: u64,
    pub classifier_cache_ttl_secs: u64,

    pub max_upload_bytes: usize,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_api_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
    pub log_level: String,
}

pub const DEFAULT_ITEM_GROUPS: [&str; 3] = ["earnings", "deductions", "summary"];

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let item_groups = parse_groups(
            &env::var("ITEM_GROUPS").unwrap_or_else(|_| DEFAULT_ITEM_GROUPS.join(",")),
        );
        assert!(!item_groups.is_empty(), "ITEM_GROUPS must name at least one group");

        let unknown_item_policy: UnknownItemPolicy = env::var("UNKNOWN_ITEM_POLICY")
            .unwrap_or_else(|_| "reject".to_string())
            .parse()
            .unwrap_or_else(|e| panic!("UNKNOWN_ITEM_POLICY: {}", e));

        if let UnknownItemPolicy::Fallback(group) = &unknown_item_policy {
            assert!(
                item_groups.contains(group),
                "UNKNOWN_ITEM_POLICY falls back to `{}`, which is not in ITEM_GROUPS",
                group
            );
        }

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a number"),

            item_groups,
            unknown_item_policy,
            classifier_cache_capacity: env::var("CLASSIFIER_CACHE_CAPACITY")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .expect("CLASSIFIER_CACHE_CAPACITY must be a number"),
            classifier_cache_ttl_secs: env::var("CLASSIFIER_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string()) // default 5 min
                .parse()
                .expect("CLASSIFIER_CACHE_TTL_SECS must be a number"),

            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
                .parse()
                .expect("MAX_UPLOAD_BYTES must be a number"),

            rate_upload_per_min: env::var("RATE_UPLOAD_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("RATE_UPLOAD_PER_MIN must be a number"),
            rate_api_per_min: env::var("RATE_API_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .expect("RATE_API_PER_MIN must be a number"),

            api_prefix: env::var("API_PREFIX").unwrap_or_default(),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "DEBUG".to_string()),
        }
    }

    pub fn is_known_group(&self, group: &str) -> bool {
        self.item_groups.iter().any(|g| g == group)
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for handler tests; the database URL is never dialled.
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://root@127.0.0.1:3306/payroll_test".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            db_max_connections: 1,
            item_groups: DEFAULT_ITEM_GROUPS.iter().map(|g| g.to_string()).collect(),
            unknown_item_policy: UnknownItemPolicy::Reject,
            classifier_cache_capacity: 100,
            classifier_cache_ttl_secs: 60,
            max_upload_bytes: 1024,
            rate_upload_per_min: 30,
            rate_api_per_min: 1000,
            api_prefix: String::new(),
            log_dir: "logs".to_string(),
            log_level: "DEBUG".to_string(),
        }
    }
}

fn parse_groups(raw: &str) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for g in raw.split(',').map(str::trim).filter(|g| !g.is_empty()) {
        if !groups.iter().any(|existing| existing == g) {
            groups.push(g.to_string());
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reject() {
        assert_eq!("reject".parse::<UnknownItemPolicy>().unwrap(), UnknownItemPolicy::Reject);
        assert_eq!(" REJECT ".parse::<UnknownItemPolicy>().unwrap(), UnknownItemPolicy::Reject);
    }

    #[test]
    fn policy_fallback() {
        assert_eq!(
            "fallback:summary".parse::<UnknownItemPolicy>().unwrap(),
            UnknownItemPolicy::Fallback("summary".to_string())
        );
    }

    #[test]
    fn policy_rejects_garbage() {
        assert!("fallback:".parse::<UnknownItemPolicy>().is_err());
        assert!("ignore".parse::<UnknownItemPolicy>().is_err());
    }

    #[test]
    fn groups_are_trimmed_and_deduplicated() {
        assert_eq!(
            parse_groups(" earnings, deductions ,,earnings,bonus"),
            vec!["earnings", "deductions", "bonus"]
        );
    }
}
