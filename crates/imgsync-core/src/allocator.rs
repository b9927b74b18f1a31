//! Collision-free filename allocation within one output directory.
//!
//! [`ClaimedNames`] is the set of filenames already in use for the current
//! run. It is seeded from the output directory and grows by one entry per
//! successfully written file. Allocation only proposes a name; the caller
//! claims it once the file actually exists.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Filenames considered taken in the output directory for one run.
#[derive(Debug, Clone, Default)]
pub struct ClaimedNames {
    names: HashSet<String>,
}

impl ClaimedNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the set with every entry currently in `dir`.
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut names = HashSet::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
        tracing::debug!(dir = %dir.display(), count = names.len(), "seeded claimed names");
        Ok(Self { names })
    }

    pub fn is_claimed(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Proposes a filename for `slug` + `ext` that is not yet claimed.
    ///
    /// Tries `slug.ext`, then `slug-1.ext`, `slug-2.ext`, ... and returns the
    /// first free one. Does not modify the set.
    pub fn allocate(&self, slug: &str, ext: &str) -> String {
        let candidate = format!("{slug}{ext}");
        if !self.is_claimed(&candidate) {
            return candidate;
        }
        let mut n: u64 = 1;
        loop {
            let candidate = format!("{slug}-{n}{ext}");
            if !self.is_claimed(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Marks `name` as used. Returns false if it was already claimed.
    pub fn claim(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }
}

impl<S: Into<String>> FromIterator<S> for ClaimedNames {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
