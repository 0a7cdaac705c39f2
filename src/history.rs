use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use hmac::{Hmac, Mac};
use patience::Variant;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

const SIGNING_KEY: &[u8] = b"patience-history-v1";
const HMAC_SIZE: usize = 32;

/// Seconds since the Unix epoch.
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// One deal, as played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub variant: Variant,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub won: bool,
    pub moves: usize,
    pub auto_finished: bool,
}

impl GameRecord {
    pub fn new(seed: u64, variant: Variant, start_time: i64) -> Self {
        Self {
            seed,
            variant,
            start_time,
            end_time: None,
            won: false,
            moves: 0,
            auto_finished: false,
        }
    }
}

#[derive(Debug)]
pub enum HistoryError {
    Io(io::Error),
    Codec(bincode::Error),
    /// The file is shorter than its signature.
    Truncated,
    /// The signature does not match the contents.
    Tampered,
}

impl std::error::Error for HistoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HistoryError::Io(err) => Some(err),
            HistoryError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for HistoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryError::Io(err) => write!(f, "History file could not be accessed: {}", err),
            HistoryError::Codec(err) => write!(f, "History file could not be decoded: {}", err),
            HistoryError::Truncated => write!(f, "History file is truncated"),
            HistoryError::Tampered => write!(f, "History file signature does not match"),
        }
    }
}

impl From<io::Error> for HistoryError {
    fn from(err: io::Error) -> Self {
        HistoryError::Io(err)
    }
}

impl From<bincode::Error> for HistoryError {
    fn from(err: bincode::Error) -> Self {
        HistoryError::Codec(err)
    }
}

fn signer() -> HmacSha256 {
    // HMAC accepts keys of any length.
    HmacSha256::new_from_slice(SIGNING_KEY).unwrap_or_else(|_| unreachable!())
}

/// Every game played, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub records: Vec<GameRecord>,
}

impl History {
    /// Load from the default location. A missing, corrupt or tampered file
    /// gives an empty history rather than an error.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(history) => history,
            Err(err) => {
                warn!(path = %path.display(), %err, "starting with a fresh history");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, HistoryError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        if data.len() < HMAC_SIZE {
            return Err(HistoryError::Truncated);
        }

        let (payload, signature) = data.split_at(data.len() - HMAC_SIZE);
        let mut mac = signer();
        mac.update(payload);
        mac.verify_slice(signature).map_err(|_| HistoryError::Tampered)?;

        Ok(bincode::deserialize(payload)?)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), HistoryError> {
        match Self::file_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Write atomically: a signed temp file renamed over the target.
    pub fn save_to(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut data = bincode::serialize(self)?;
        let mut mac = signer();
        mac.update(&data);
        data.extend_from_slice(&mac.finalize().into_bytes());

        let temp_path = path.with_extension("tmp");
        let written = File::create(&temp_path).and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        fs::rename(&temp_path, path)?;
        debug!(path = %path.display(), records = self.records.len(), "history saved");
        Ok(())
    }

    /// `history.dat` in the platform data directory.
    pub fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("org", "patience", "patience")?;
        Some(dirs.data_dir().join("history.dat"))
    }

    pub fn push(&mut self, record: GameRecord) {
        self.records.push(record);
    }

    pub fn last_mut(&mut self) -> Option<&mut GameRecord> {
        self.records.last_mut()
    }

    /// (games won, games played) for one variant.
    pub fn score(&self, variant: Variant) -> (usize, usize) {
        let played = self.records.iter().filter(|r| r.variant == variant);
        let won = played.clone().filter(|r| r.won).count();
        (won, played.count())
    }
}
