//! warden-config - 配置加载库

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 各授权类型的启用开关
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantToggles {
    #[serde(default = "enabled")]
    pub authorization_code: bool,
    #[serde(default = "enabled")]
    pub implicit: bool,
    #[serde(default = "enabled")]
    pub password: bool,
    #[serde(default = "enabled")]
    pub client_credentials: bool,
    #[serde(default = "enabled")]
    pub refresh_token: bool,
}

fn enabled() -> bool {
    true
}

impl Default for GrantToggles {
    fn default() -> Self {
        Self {
            authorization_code: true,
            implicit: true,
            password: true,
            client_credentials: true,
            refresh_token: true,
        }
    }
}

/// OAuth2 授权服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// 请求未携带 scope 时使用的默认 scope（空格分隔）
    #[serde(default)]
    pub default_scope: String,
    #[serde(default = "default_authorization_code_ttl_secs")]
    pub authorization_code_ttl_secs: u64,
    #[serde(default = "default_access_token_ttl_secs")]
    pub access_token_ttl_secs: u64,
    #[serde(default = "default_refresh_token_ttl_secs")]
    pub refresh_token_ttl_secs: u64,
    /// 是否对 Client / Role / User 执行版本检查
    #[serde(default = "enabled")]
    pub enforce_concurrency_control: bool,
    /// 资源层读接口是否启用 HTTP 缓存
    #[serde(default)]
    pub enforce_http_caching: bool,
    /// 是否对所有客户端强制 PKCE（公开客户端始终强制）
    #[serde(default)]
    pub require_pkce: bool,
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    #[serde(default)]
    pub grants: GrantToggles,
}

/// TTL 上限（10 年）
pub const MAX_TTL_SECS: u64 = 315_360_000;

fn default_authorization_code_ttl_secs() -> u64 {
    600
}

fn default_access_token_ttl_secs() -> u64 {
    3600
}

fn default_refresh_token_ttl_secs() -> u64 {
    2592000
}

fn default_url_prefix() -> String {
    "/oauth".to_string()
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            default_scope: String::new(),
            authorization_code_ttl_secs: default_authorization_code_ttl_secs(),
            access_token_ttl_secs: default_access_token_ttl_secs(),
            refresh_token_ttl_secs: default_refresh_token_ttl_secs(),
            enforce_concurrency_control: true,
            enforce_http_caching: false,
            require_pkce: false,
            url_prefix: default_url_prefix(),
            grants: GrantToggles::default(),
        }
    }
}

impl OAuthConfig {
    /// 校验配置取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("authorization_code_ttl_secs", self.authorization_code_ttl_secs),
            ("access_token_ttl_secs", self.access_token_ttl_secs),
            ("refresh_token_ttl_secs", self.refresh_token_ttl_secs),
        ] {
            if value == 0 || value > MAX_TTL_SECS {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {}",
                    name, MAX_TTL_SECS
                )));
            }
        }
        if !self.url_prefix.is_empty() && !self.url_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "url_prefix must start with '/'".to_string(),
            ));
        }
        Ok(())
    }
}

/// 遥测配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 生产环境使用 JSON 日志
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json: false,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_app_env")]
    pub app_env: String,
    #[serde(default)]
    pub oauth: OAuthConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

fn default_app_name() -> String {
    "warden".to_string()
}

fn default_app_env() -> String {
    "development".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: default_app_name(),
            app_env: default_app_env(),
            oauth: OAuthConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 优先级：环境变量 > `{APP_ENV}.toml` > `default.toml` > 内置默认值
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("WARDEN_").split("__"));

        Self::from_figment(figment)
    }

    /// 从任意 Figment 提取并校验配置
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.oauth.validate()?;
        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
