use std::{env, fs, net::SocketAddr, path::Path, time::Duration};

use reqwest::Url;
use serde::Deserialize;

/// 默认监听地址
const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// 默认页面重新生成间隔（秒）
const DEFAULT_REVALIDATE_SECS: u64 = 60 * 30;

/// 配置加载错误。
///
/// 缺少必要配置时应在启动阶段直接失败。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 缺少必要的配置项
    #[error("missing required config: {0}")]
    Missing(&'static str),

    /// 配置项存在但无法解析
    #[error("invalid config `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// CMS 连接配置
#[derive(Debug, Clone)]
pub struct CmsConfig {
    /// Prismic API 入口，例如 `https://my-repo.cdn.prismic.io/api/v2`
    pub endpoint: Url,
    /// 访问令牌
    pub access_token: String,
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct Config {
    pub cms: CmsConfig,
    pub bind: SocketAddr,
    /// 已生成页面的有效期，超过后在下一次请求时后台重新生成
    pub revalidate: Duration,
}

/// 配置文件格式，所有字段可选，环境变量优先。
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    cms: FileCmsConfig,
    server: FileServerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileCmsConfig {
    endpoint: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileServerConfig {
    bind: Option<String>,
    revalidate_secs: Option<u64>,
}

impl Config {
    /// 从进程环境变量加载配置
    ///
    /// 如果设置了 `SPACETRAVELING_CONFIG`，先读取对应的 TOML 文件，再用环境变量覆盖。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|key| env::var(key).ok())
    }

    /// 使用给定的查找函数加载配置
    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match lookup("SPACETRAVELING_CONFIG") {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };

        let endpoint = lookup("PRISMIC_API_ENDPOINT")
            .or(file.cms.endpoint)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("PRISMIC_API_ENDPOINT"))?;

        let endpoint = Url::parse(endpoint.trim()).map_err(|e| ConfigError::Invalid {
            key: "PRISMIC_API_ENDPOINT",
            reason: e.to_string(),
        })?;

        let access_token = lookup("PRISMIC_ACCESS_TOKEN")
            .or(file.cms.access_token)
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("PRISMIC_ACCESS_TOKEN"))?;

        let bind = lookup("SPACETRAVELING_BIND")
            .or(file.server.bind)
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            key: "SPACETRAVELING_BIND",
            reason: e.to_string(),
        })?;

        let revalidate_secs = match lookup("SPACETRAVELING_REVALIDATE_SECS") {
            Some(s) => s.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "SPACETRAVELING_REVALIDATE_SECS",
                reason: e.to_string(),
            })?,
            None => file
                .server
                .revalidate_secs
                .unwrap_or(DEFAULT_REVALIDATE_SECS),
        };

        Ok(Self {
            cms: CmsConfig {
                endpoint,
                access_token: access_token.trim().to_string(),
            },
            bind,
            revalidate: Duration::from_secs(revalidate_secs),
        })
    }
}

impl FileConfig {
    fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_from_env_with_defaults() {
        let config = Config::load(lookup_from(&[
            ("PRISMIC_API_ENDPOINT", "https://space.cdn.prismic.io/api/v2"),
            ("PRISMIC_ACCESS_TOKEN", "token"),
        ]))
        .expect("配置应加载成功");

        assert_eq!(config.cms.endpoint.host_str(), Some("space.cdn.prismic.io"));
        assert_eq!(config.cms.access_token, "token");
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.revalidate, Duration::from_secs(1800));
    }

    #[test]
    fn test_missing_endpoint_fails_fast() {
        let err = Config::load(lookup_from(&[("PRISMIC_ACCESS_TOKEN", "token")]))
            .expect_err("缺少 endpoint 应失败");
        assert!(matches!(err, ConfigError::Missing("PRISMIC_API_ENDPOINT")));
    }

    #[test]
    fn test_blank_token_counts_as_missing() {
        let err = Config::load(lookup_from(&[
            ("PRISMIC_API_ENDPOINT", "https://space.cdn.prismic.io/api/v2"),
            ("PRISMIC_ACCESS_TOKEN", "  "),
        ]))
        .expect_err("空 token 应失败");
        assert!(matches!(err, ConfigError::Missing("PRISMIC_ACCESS_TOKEN")));
    }

    #[test]
    fn test_invalid_bind() {
        let err = Config::load(lookup_from(&[
            ("PRISMIC_API_ENDPOINT", "https://space.cdn.prismic.io/api/v2"),
            ("PRISMIC_ACCESS_TOKEN", "token"),
            ("SPACETRAVELING_BIND", "not an address"),
        ]))
        .expect_err("非法地址应失败");
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "SPACETRAVELING_BIND",
                ..
            }
        ));
    }

    #[test]
    fn test_file_config_overridden_by_env() {
        let mut file = tempfile::NamedTempFile::new().expect("创建临时文件失败");
        write!(
            file,
            r#"
[cms]
endpoint = "https://from-file.cdn.prismic.io/api/v2"
access_token = "file-token"

[server]
bind = "127.0.0.1:8080"
revalidate_secs = 60
"#
        )
        .expect("写入临时文件失败");

        let path = file.path().to_string_lossy().into_owned();
        let config = Config::load(lookup_from(&[
            ("SPACETRAVELING_CONFIG", path.as_str()),
            ("PRISMIC_ACCESS_TOKEN", "env-token"),
        ]))
        .expect("配置应加载成功");

        assert_eq!(
            config.cms.endpoint.host_str(),
            Some("from-file.cdn.prismic.io")
        );
        assert_eq!(config.cms.access_token, "env-token");
        assert_eq!(config.bind.to_string(), "127.0.0.1:8080");
        assert_eq!(config.revalidate, Duration::from_secs(60));
    }
}
