use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::schema::downloads;

/// Desktop platforms an installer is published for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Windows,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Mac, Platform::Windows];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Windows => "windows",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Mac => "macOS",
            Platform::Windows => "Windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mac" => Ok(Platform::Mac),
            "windows" => Ok(Platform::Windows),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}

#[derive(Queryable, Selectable, Clone, Debug)]
#[diesel(table_name = downloads)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DownloadEvent {
    pub id: i32,
    pub platform: String,
    pub downloaded_at: i64, // unix seconds, assigned by the database default
}

#[derive(Insertable)]
#[diesel(table_name = downloads)]
pub struct NewDownload<'a> {
    pub platform: &'a str,
}

/// Per-platform download counts. `total` is always `mac + windows`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStats {
    pub total: u64,
    pub mac: u64,
    pub windows: u64,
}

impl DownloadStats {
    pub fn zero() -> Self {
        Self::default()
    }
}
