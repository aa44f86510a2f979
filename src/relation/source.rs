// src/relation/source.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;

use crate::core::error::Result;

/// A relation stream that can be read from the start more than once: every
/// pass rescans it and the final emit reads it again.
pub trait RelationSource {
    fn lines(&self) -> Result<Box<dyn Iterator<Item = io::Result<String>> + '_>>;
}

/// Relations spread over plain-text files, read in the given order.
#[derive(Debug, Clone)]
pub struct FileRelationSource {
    pub paths: Vec<PathBuf>,
}

impl FileRelationSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        FileRelationSource { paths }
    }

    /// Reads file names, one per line, from a file list.
    pub fn from_filelist<P: AsRef<Path>>(filelist: P) -> Result<Self> {
        let reader = BufReader::new(File::open(filelist)?);
        let mut paths = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                paths.push(PathBuf::from(name));
            }
        }
        Ok(FileRelationSource { paths })
    }
}

type Lines = Box<dyn Iterator<Item = io::Result<String>>>;

impl RelationSource for FileRelationSource {
    /// Files are opened one at a time as the stream reaches them. A file that
    /// cannot be opened shows up as an error item at its place in the stream.
    fn lines(&self) -> Result<Box<dyn Iterator<Item = io::Result<String>> + '_>> {
        Ok(Box::new(self.paths.iter().flat_map(|path| -> Lines {
            match File::open(path) {
                Ok(file) => {
                    info!("   Adding file {}", path.display());
                    Box::new(BufReader::new(file).lines())
                }
                Err(e) => {
                    let err = io::Error::new(e.kind(), format!("{}: {}", path.display(), e));
                    Box::new(std::iter::once(Err(err)))
                }
            }
        })))
    }
}

/// Relations held in memory, mostly for tests and small inputs.
#[derive(Debug, Clone, Default)]
pub struct MemoryRelationSource {
    pub lines: Vec<String>,
}

impl MemoryRelationSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryRelationSource {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl RelationSource for MemoryRelationSource {
    fn lines(&self) -> Result<Box<dyn Iterator<Item = io::Result<String>> + '_>> {
        Ok(Box::new(self.lines.iter().cloned().map(Ok)))
    }
}
