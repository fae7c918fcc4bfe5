use std::env;
use std::path::PathBuf;

/// Where the cumulative state and rendered reports are kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Github,
    Local,
    Memory,
}

impl StoreKind {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "github" => Some(StoreKind::Github),
            "local" => Some(StoreKind::Local),
            "memory" => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub kind: StoreKind,
    pub local_dir: PathBuf,
    pub github_api_url: String,
    pub github_owner: String,
    pub github_repo: String,
    pub github_branch: String,
    pub github_token: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            kind: StoreKind::Local,
            local_dir: PathBuf::from("published"),
            github_api_url: "https://api.github.com".to_string(),
            github_owner: String::new(),
            github_repo: String::new(),
            github_branch: "main".to_string(),
            github_token: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotifySettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub recipients: Vec<String>,
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            from: "results@localhost".to_string(),
            recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishSettings {
    pub default_title: String,
    pub admin_password: Option<String>,
    pub state_prefix: &'static str,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            default_title: "結果速報".to_string(),
            admin_password: None,
            state_prefix: "state",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub user_agent: &'static str,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            user_agent: "results-publisher",
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreSettings,
    pub notify: NotifySettings,
    pub publish: PublishSettings,
    pub http: HttpSettings,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each known variable
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::new();

        if let Some(kind) = get("RESULTS_STORE").and_then(|v| StoreKind::parse(&v)) {
            config.store.kind = kind;
        }
        if let Some(dir) = get("RESULTS_DIR") {
            config.store.local_dir = PathBuf::from(dir);
        }
        if let Some(owner) = get("GITHUB_OWNER") {
            config.store.github_owner = owner;
        }
        if let Some(repo) = get("GITHUB_REPO") {
            config.store.github_repo = repo;
        }
        if let Some(branch) = get("GITHUB_BRANCH") {
            config.store.github_branch = branch;
        }
        config.store.github_token = get("GITHUB_TOKEN");

        config.notify.endpoint = get("NOTIFY_ENDPOINT");
        config.notify.api_key = get("NOTIFY_API_KEY");
        if let Some(from) = get("NOTIFY_FROM") {
            config.notify.from = from;
        }
        if let Some(recipients) = get("NOTIFY_RECIPIENTS") {
            config.notify.recipients = split_list(&recipients);
        }

        if let Some(title) = get("DEFAULT_TITLE") {
            config.publish.default_title = title;
        }
        config.publish.admin_password = get("ADMIN_PASSWORD");

        config
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_environment() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.store.kind, StoreKind::Local);
        assert_eq!(config.publish.default_title, "結果速報");
        assert!(config.notify.recipients.is_empty());
        assert!(config.publish.admin_password.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RESULTS_STORE", "GitHub"),
            ("GITHUB_OWNER", "club"),
            ("GITHUB_REPO", "results"),
            ("GITHUB_TOKEN", "  "),
            ("NOTIFY_RECIPIENTS", "a@example.com, ,b@example.com"),
            ("ADMIN_PASSWORD", "hunter2"),
        ]);
        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.kind, StoreKind::Github);
        assert_eq!(config.store.github_owner, "club");
        assert_eq!(config.store.github_branch, "main");
        assert_eq!(config.store.github_token, None);
        assert_eq!(config.notify.recipients, vec!["a@example.com", "b@example.com"]);
        assert_eq!(config.publish.admin_password.as_deref(), Some("hunter2"));
    }
}
