use std::{env, fmt, path::Path, str::FromStr};

use serde::Deserialize;

/// 存储地址
pub const STORE_URL: &str = "STORE_URL";
/// 存储访问密钥
pub const STORE_KEY: &str = "STORE_KEY";
/// 可选的 TOML 配置文件路径
pub const CONFIG_PATH: &str = "POSTDESK_CONFIG";
/// 监听地址
pub const ADDR: &str = "POSTDESK_ADDR";
/// 文章页的展示方式
pub const READER_MODE: &str = "READER_MODE";

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SITE_TITLE: &str = "Trang Quản Lý Bài Viết";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("环境变量: `{0}`: NotPresent")]
    Missing(&'static str),

    #[error("unknown reader mode `{0}`, expected `article` or `redirect`")]
    ReaderMode(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// `/posts/{slug}` 的展示方式，启动时确定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderMode {
    /// 渲染标题、图片与描述，并设置分享用的 meta 标签
    #[default]
    Article,
    /// 跳转到文章的外部链接
    Redirect,
}

impl FromStr for ReaderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "article" => Ok(Self::Article),
            "redirect" => Ok(Self::Redirect),
            _ => Err(ConfigError::ReaderMode(s.to_string())),
        }
    }
}

impl fmt::Display for ReaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Article => "article",
            Self::Redirect => "redirect",
        })
    }
}

/// 存储端凭据
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub key: String,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("key", &"***")
            .finish()
    }
}

/// 站点默认的页面信息，离开文章页后恢复为这些值
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            description: String::new(),
            image: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    addr: Option<String>,
}

/// 配置文件结构
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    reader: Option<ReaderMode>,
    server: ServerSection,
    site: SiteConfig,
}

/// 应用配置
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub addr: String,
    pub reader: ReaderMode,
    pub site: SiteConfig,
}

impl Config {
    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源加载配置
    ///
    /// 环境变量优先于配置文件；`STORE_URL` 与 `STORE_KEY` 必须存在且非空。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = match lookup(CONFIG_PATH) {
            Some(path) => FileConfig::load(&path)?,
            None => FileConfig::default(),
        };

        let store = StoreConfig {
            url: lookup(STORE_URL).ok_or(ConfigError::Missing(STORE_URL))?,
            key: lookup(STORE_KEY).ok_or(ConfigError::Missing(STORE_KEY))?,
        };

        let reader = match lookup(READER_MODE) {
            Some(mode) => mode.parse()?,
            None => file.reader.unwrap_or_default(),
        };

        let addr = lookup(ADDR)
            .or(file.server.addr)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        Ok(Self {
            store,
            addr,
            reader,
            site: file.site,
        })
    }
}

impl FileConfig {
    fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}
