//! Configuration module for boxio.
//!
//! Two sources feed a run:
//! - the credentials file, a flat properties file holding the app-user key
//!   material and the target folder ([`load_credentials`]);
//! - optional runtime settings in YAML ([`Settings`]), where every field
//!   has a default so the file may be partial or absent.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{ConfigError, Credentials};

// ---------------------------------------------------------------------------
// Credentials file
// ---------------------------------------------------------------------------

/// Parses properties text into key/value pairs.
///
/// Follows the Java properties format: `#` and `!` comment lines, keys
/// separated from values by `=`, `:` or whitespace, a trailing odd
/// backslash continuing the logical line, and `\t`, `\n`, `\r`, `\f`,
/// `\uXXXX` escapes. Later duplicates win.
pub fn parse_properties(content: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    let mut pending = String::new();

    for raw in content.lines() {
        let line = raw.trim_start();
        if pending.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!'))
        {
            continue;
        }

        let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
        if trailing % 2 == 1 {
            pending.push_str(&line[..line.len() - 1]);
            continue;
        }
        pending.push_str(line);
        insert_logical_line(&mut props, &std::mem::take(&mut pending));
    }

    // A continuation on the last line still ends the entry.
    if !pending.is_empty() {
        insert_logical_line(&mut props, &pending);
    }

    props
}

fn insert_logical_line(props: &mut HashMap<String, String>, logical: &str) {
    let mut chars = logical.trim_end().chars().peekable();
    let mut key = String::new();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    key.push(unescape(next, &mut chars));
                }
            }
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while chars.next_if(|c| c.is_whitespace()).is_some() {}
                chars.next_if(|&c| c == '=' || c == ':');
                break;
            }
            c => key.push(c),
        }
    }

    while chars.next_if(|c| c.is_whitespace()).is_some() {}
    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                value.push(unescape(next, &mut chars));
            }
        } else {
            value.push(c);
        }
    }

    if !key.is_empty() {
        props.insert(key, value);
    }
}

/// Resolves the character after a backslash
fn unescape(c: char, rest: &mut std::iter::Peekable<std::str::Chars<'_>>) -> char {
    match c {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{0c}',
        'u' => {
            let hex: String = (0..4).filter_map(|_| rest.next_if(char::is_ascii_hexdigit)).collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        }
        other => other,
    }
}

/// Reads and validates the credentials file at `path`.
///
/// # Errors
/// [`ConfigError::Unreadable`] if the file cannot be read, otherwise any
/// validation error from [`Credentials::from_properties`].
pub fn load_credentials(path: &Path) -> Result<Credentials, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Credentials::from_properties(&parse_properties(&content))
}

// ---------------------------------------------------------------------------
// Runtime settings
// ---------------------------------------------------------------------------

/// Runtime settings for the remote adapter and the listen loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the content API.
    pub api_base_url: String,
    /// Base URL of the upload API.
    pub upload_base_url: String,
    /// OAuth2 token endpoint, also used as the JWT audience.
    pub token_url: String,
    /// Seconds to idle between listen poll cycles.
    pub poll_interval_secs: u64,
    /// Items requested per folder listing page.
    pub page_size: u32,
    /// Timeout in seconds for establishing a connection.
    pub connect_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.box.com/2.0".to_string(),
            upload_base_url: "https://upload.box.com/api/2.0".to_string(),
            token_url: "https://api.box.com/oauth2/token".to_string(),
            poll_interval_secs: 2,
            page_size: 100,
            connect_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 || self.page_size > 1000 {
            anyhow::bail!("page_size must be between 1 and 1000, got {}", self.page_size);
        }
        if self.connect_timeout_secs == 0 {
            anyhow::bail!("connect_timeout_secs must be positive");
        }
        for (name, url) in [
            ("api_base_url", &self.api_base_url),
            ("upload_base_url", &self.upload_base_url),
            ("token_url", &self.token_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                anyhow::bail!("{name} must be an http(s) URL, got {url:?}");
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs)
    }

    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.connect_timeout_secs)
    }
}
