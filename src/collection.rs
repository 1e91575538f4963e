// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::PlanBook;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE_NAME: &str = "deckplan.toml";

pub const DATABASE_FILE_NAME: &str = "collection.db";

/// A collection directory: the card database and the plan book.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub book: PlanBook,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join(DATABASE_FILE_NAME);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let book = {
            log::debug!("Loading plans...");
            let start = Instant::now();
            let book = PlanBook::load(&directory.join(CONFIG_FILE_NAME))?;
            let duration = start.elapsed().as_millis();
            log::debug!("Plans loaded in {duration}ms.");
            book
        };

        Ok(Self {
            directory,
            db,
            book,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.directory.join(CONFIG_FILE_NAME)
    }

    /// Write the plan book back to the collection directory.
    pub fn save_book(&self) -> Fallible<()> {
        self.book.save(&self.config_path())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::config::plan::PlanRecord;
    use crate::types::date::Date;

    #[test]
    fn test_non_existent_directory() {
        assert!(Collection::new(Some("./derpherp".to_string())).is_err());
    }

    #[test]
    fn test_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let coll = Collection::new(Some(dir.path().display().to_string()))?;
        assert!(coll.book.plans.is_empty());
        assert!(dir.path().join(DATABASE_FILE_NAME).exists());
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().display().to_string();
        let mut coll = Collection::new(Some(path.clone()))?;
        let start: Date = "2026-01-01".parse()?;
        let deadline: Date = "2026-02-01".parse()?;
        coll.book
            .insert(PlanRecord::new("Biology", start, deadline))?;
        coll.save_book()?;
        let coll = Collection::new(Some(path))?;
        assert_eq!(coll.book.plans.len(), 1);
        assert_eq!(coll.book.plans[0].deck, "Biology");
        Ok(())
    }
}
