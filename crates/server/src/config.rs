use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

#[derive(Debug)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    /// Externally reachable base URL. Frame buttons only post back when the
    /// deployment knows its own address.
    pub public_url: Option<String>,
    pub demo_image_url: String,
    pub frame_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/frames.db".into(),
            public_url: None,
            demo_image_url: "https://images.unsplash.com/photo-1574390353491-92705370c72e?w=800&q=60".into(),
            frame_size: 600,
        }
    }
}

/// Optional `server.toml` overrides; every key may be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    public_url: Option<String>,
    demo_image_url: Option<String>,
    frame_size: Option<u32>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.database_url {
                    settings.database_url = v;
                }
                if let Some(v) = file_cfg.public_url {
                    settings.public_url = Some(v);
                }
                if let Some(v) = file_cfg.demo_image_url {
                    settings.demo_image_url = v;
                }
                if let Some(v) = file_cfg.frame_size {
                    settings.frame_size = v;
                }
            }
            Err(error) => warn!(%error, "ignoring malformed server.toml"),
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Ok(v) = std::env::var("SERVER_PUBLIC_URL") {
        settings.public_url = Some(v);
    }
    if let Ok(v) = std::env::var("APP__PUBLIC_URL") {
        settings.public_url = Some(v);
    }

    if let Ok(v) = std::env::var("APP__DEMO_IMAGE_URL") {
        settings.demo_image_url = v;
    }

    if let Ok(v) = std::env::var("APP__FRAME_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.frame_size = parsed;
        }
    }

    settings.public_url = validated_public_url(settings.public_url);
    settings
}

/// An unparsable public URL is dropped rather than baked into every frame's
/// post_url.
fn validated_public_url(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    match Url::parse(&raw) {
        Ok(_) => Some(raw),
        Err(error) => {
            warn!(%raw, %error, "dropping invalid public url");
            None
        }
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
