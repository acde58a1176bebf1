/// Persistent leaderboard: one record per finished session.
///
/// ## File format
///   Two lines per record, appended in session order:
///     name
///     score
///
/// Records are never rewritten or removed. Ranking happens on read.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use thiserror::Error;

use crate::domain::entity::sanitize_name;

/// Entries shown on the game over screen.
pub const SHOW_TOP: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("could not open leaderboard {}: {source}", .path.display())]
    Open { path: PathBuf, source: std::io::Error },
    #[error("could not write leaderboard: {0}")]
    Write(#[source] std::io::Error),
    #[error("could not read leaderboard: {0}")]
    Read(#[source] std::io::Error),
    #[error("leaderboard record for '{name}' has no score line")]
    MissingScore { name: String },
    #[error("leaderboard line {line}: '{text}' is not a score")]
    BadScore { line: usize, text: String },
}

pub struct Leaderboard {
    path: PathBuf,
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Leaderboard { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file if needed.
    pub fn append(&self, name: &str, score: u32) -> Result<(), LeaderboardError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| LeaderboardError::Open { path: self.path.clone(), source })?;

        let name = sanitize_name(name);
        write!(file, "{}\n{}\n", name, score).map_err(LeaderboardError::Write)?;
        info!("leaderboard: recorded {} = {}", name, score);
        Ok(())
    }

    /// All records in file (insertion) order. A missing file is empty.
    pub fn load(&self) -> Result<Vec<Entry>, LeaderboardError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("leaderboard {} not found, treating as empty", self.path.display());
                return Ok(vec![]);
            }
            Err(source) => return Err(LeaderboardError::Open { path: self.path.clone(), source }),
        };
        parse(BufReader::new(file))
    }

    pub fn load_and_rank(&self) -> Result<Vec<Entry>, LeaderboardError> {
        let mut entries = self.load()?;
        rank(&mut entries);
        Ok(entries)
    }
}

// ── Parsing / ranking ──

/// Pair up name and score lines. Blank lines where a name is expected
/// are skipped.
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<Entry>, LeaderboardError> {
    let mut entries = Vec::with_capacity(20);
    let mut pending: Option<String> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(LeaderboardError::Read)?;
        match pending.take() {
            None => {
                if !line.trim().is_empty() {
                    pending = Some(line);
                }
            }
            Some(name) => {
                let text = line.trim();
                let score = text.parse::<u32>().map_err(|_| LeaderboardError::BadScore {
                    line: idx + 1,
                    text: text.to_string(),
                })?;
                entries.push(Entry { name, score });
            }
        }
    }

    match pending {
        Some(name) => Err(LeaderboardError::MissingScore { name }),
        None => Ok(entries),
    }
}

/// Descending by score. Stable: equal scores keep file order.
pub fn rank(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.score.cmp(&a.score));
}

pub fn top(entries: &[Entry], n: usize) -> Vec<Entry> {
    entries.iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::NamedTempFile;

    fn board_in_tempfile() -> (NamedTempFile, Leaderboard) {
        let file = NamedTempFile::new().unwrap();
        let board = Leaderboard::new(file.path());
        (file, board)
    }

    #[test]
    fn appends_load_in_insertion_order() {
        let (_file, board) = board_in_tempfile();
        board.append("ada", 3).unwrap();
        board.append("bob", 7).unwrap();
        board.append("cy", 0).unwrap();
        let loaded = board.load().unwrap();
        let names: Vec<_> = loaded.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ada", "bob", "cy"]);
        assert_eq!(loaded[1].score, 7);
    }

    #[test]
    fn record_format_is_two_lines() {
        let (file, board) = board_in_tempfile();
        board.append("ada", 12).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "ada\n12\n");
    }

    #[test]
    fn names_are_sanitized_before_writing() {
        let (_file, board) = board_in_tempfile();
        board.append("evil\nname", 4).unwrap();
        let loaded = board.load().unwrap();
        assert_eq!(loaded, vec![Entry { name: "evilname".into(), score: 4 }]);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let (_file, board) = board_in_tempfile();
        for (name, score) in [("a", 2), ("b", 5), ("c", 2), ("d", 9), ("e", 5)] {
            board.append(name, score).unwrap();
        }
        let ranked = board.load_and_rank().unwrap();
        let names: Vec<_> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["d", "b", "e", "a", "c"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let board = Leaderboard::new(dir.path().join("nope.txt"));
        assert!(board.load().unwrap().is_empty());
    }

    #[test]
    fn trailing_name_without_score() {
        let err = parse(Cursor::new("ada\n3\nbob\n")).unwrap_err();
        assert!(matches!(err, LeaderboardError::MissingScore { ref name } if name == "bob"));
    }

    #[test]
    fn non_numeric_score() {
        let err = parse(Cursor::new("ada\nlots\n")).unwrap_err();
        assert!(matches!(err, LeaderboardError::BadScore { line: 2, .. }));
    }

    #[test]
    fn blank_lines_between_records_are_skipped() {
        let entries = parse(Cursor::new("ada\n3\n\nbob\n4\n")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], Entry { name: "bob".into(), score: 4 });
    }

    #[test]
    fn more_than_capacity_hint() {
        let (_file, board) = board_in_tempfile();
        for i in 0..45 {
            board.append(&format!("p{i}"), i).unwrap();
        }
        let ranked = board.load_and_rank().unwrap();
        assert_eq!(ranked.len(), 45);
        let shown = top(&ranked, SHOW_TOP);
        assert_eq!(shown.len(), 10);
        assert_eq!(shown[0], Entry { name: "p44".into(), score: 44 });
        assert_eq!(shown[9].score, 35);
    }
}
