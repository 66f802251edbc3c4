use crate::layout::CreateError;
use crate::puzzle::Puzzle;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid level {index}: {source}")]
    InvalidLevel {
        /// 1-based position of the level in the collection.
        index: usize,
        source: CreateError,
    },
}

/// A collection of puzzles in XSB format.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Puzzle>,
}

impl Levels {
    /// Parse a level collection. Lines starting with `;` are comments and,
    /// like blank lines, end the level being read.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current = String::new();

        let finish = |current: &mut String, levels: &mut Vec<Puzzle>| -> Result<(), LevelError> {
            if current.is_empty() {
                return Ok(());
            }
            let puzzle = Puzzle::from_text(current.trim_end()).map_err(|source| LevelError::InvalidLevel {
                index: levels.len() + 1,
                source,
            })?;
            levels.push(puzzle);
            current.clear();
            Ok(())
        };

        for line in contents.lines() {
            if line.trim_start().starts_with(';') || line.trim().is_empty() {
                finish(&mut current, &mut levels)?;
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
        finish(&mut current, &mut levels)?;

        Ok(Levels { levels })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// The level at `index`, counting from 0.
    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Puzzle> {
        self.levels.iter()
    }
}
