use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use directories::ProjectDirs;
use hmac::{Hmac, Mac};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::board::Board;
use crate::card::Suit;
use crate::deck::Difficulty;

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &[u8] = b"spidersol_records_key_please_play_fair";
const HMAC_SIZE: usize = 32;
/// Oldest records are dropped once the file holds this many games.
pub const MAX_RECORDS: usize = 1000;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("no data directory available")]
    NoDataDir,
    #[error("record file I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("record file encoding: {0}")]
    Encoding(#[from] bincode::Error),
    #[error("record file is truncated")]
    Truncated,
    #[error("record file signature mismatch")]
    Signature,
    #[error("invalid signing key")]
    Key,
}

/// Summary of one game.  The board itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub difficulty: Difficulty,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub won: bool,
    pub moves: u32,
    pub completed: Vec<Suit>,
}

impl GameRecord {
    pub fn new(seed: u64, difficulty: Difficulty, start_time: i64) -> Self {
        Self {
            seed,
            difficulty,
            start_time,
            end_time: None,
            won: false,
            moves: 0,
            completed: Vec::new(),
        }
    }

    /// Copy the final numbers from `board` and close the record.
    pub fn finish(&mut self, board: &Board, end_time: i64) {
        self.end_time = Some(end_time);
        self.won = board.is_won();
        self.moves = board.moves();
        self.completed = board.completed_suits().to_vec();
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

/// Aggregate numbers for one difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub played: usize,
    pub won: usize,
    pub best_moves: Option<u32>,
}

/// Every recorded game.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct History {
    pub records: Vec<GameRecord>,
}

impl History {
    /// Load the records from the data directory.  A missing, corrupted or
    /// tampered file yields an empty history so the game still starts.
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(history) => history,
            Err(e) => {
                warn!("ignoring record file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, RecordError> {
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        if data.len() < HMAC_SIZE {
            return Err(RecordError::Truncated);
        }

        let (payload, signature) = data.split_at(data.len() - HMAC_SIZE);
        let mut mac = new_mac()?;
        mac.update(payload);
        mac.verify_slice(signature)
            .map_err(|_| RecordError::Signature)?;

        Ok(bincode::deserialize(payload)?)
    }

    /// Save the records to the data directory.
    pub fn save(&self) -> Result<(), RecordError> {
        let path = Self::file_path().ok_or(RecordError::NoDataDir)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.save_to(&path)
    }

    /// Write atomically: temp file, sync, then rename over the target.
    pub fn save_to(&self, path: &Path) -> Result<(), RecordError> {
        let payload = bincode::serialize(self)?;

        let mut mac = new_mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        let mut final_data = payload;
        final_data.extend_from_slice(&signature);

        let temp_path = path.with_extension("tmp");
        let written = File::create(&temp_path).and_then(|mut f| {
            f.write_all(&final_data)?;
            f.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        fs::rename(&temp_path, path)?;
        debug!("saved {} record(s) to {}", self.records.len(), path.display());
        Ok(())
    }

    /// Open a record for a freshly dealt board, dropping the oldest records
    /// beyond `MAX_RECORDS`.
    pub fn start(&mut self, board: &Board) {
        self.records
            .push(GameRecord::new(board.seed(), board.difficulty(), now()));
        if self.records.len() > MAX_RECORDS {
            let excess = self.records.len() - MAX_RECORDS;
            self.records.drain(..excess);
            debug!("dropped {} old record(s)", excess);
        }
    }

    /// Close the most recent open record with `board`'s final state.
    pub fn finish(&mut self, board: &Board) {
        if let Some(record) = self.records.last_mut().filter(|r| !r.is_finished()) {
            record.finish(board, now());
        }
    }

    pub fn summary(&self, difficulty: Difficulty) -> Summary {
        let mut summary = Summary::default();
        for record in self
            .records
            .iter()
            .filter(|r| r.difficulty == difficulty && r.is_finished())
        {
            summary.played += 1;
            if record.won {
                summary.won += 1;
                summary.best_moves = Some(
                    summary
                        .best_moves
                        .map_or(record.moves, |best| best.min(record.moves)),
                );
            }
        }
        summary
    }

    /// Path of the record file (`records.dat`).
    fn file_path() -> Option<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "spidersol", "spidersol")?;
        Some(proj_dirs.data_dir().join("records.dat"))
    }
}

fn new_mac() -> Result<HmacSha256, RecordError> {
    HmacSha256::new_from_slice(SECRET_KEY).map_err(|_| RecordError::Key)
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs() as i64)
}
