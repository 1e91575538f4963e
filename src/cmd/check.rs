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

use crate::collection::Collection;
use crate::error::Fallible;

pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let warnings = check(directory)?;
    for warning in &warnings {
        println!("warning: {warning}");
    }
    println!("ok");
    Ok(())
}

/// Load the collection and validate every plan. Plans for decks with no
/// cards are reported as warnings, not errors.
pub fn check(directory: Option<String>) -> Fallible<Vec<String>> {
    let coll = Collection::new(directory)?;
    let plans = coll.book.validated()?;
    let decks = coll.db.deck_names()?;
    let mut warnings = Vec::new();
    for plan in &plans {
        let prefix = format!("{}::", plan.deck);
        let has_cards = decks
            .iter()
            .any(|deck| *deck == plan.deck || deck.starts_with(&prefix));
        if !has_cards {
            warnings.push(format!("deck '{}' has no cards", plan.deck));
        }
    }
    log::debug!("Checked {} plans.", plans.len());
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;
    use crate::collection::CONFIG_FILE_NAME;
    use crate::types::card_state::CardState;

    #[test]
    fn test_non_existent_directory() {
        assert!(check(Some("./derpherp".to_string())).is_err());
    }

    #[test]
    fn test_empty_directory() -> Fallible<()> {
        let dir = tempdir()?;
        let warnings = check(Some(dir.path().display().to_string()))?;
        assert!(warnings.is_empty());
        Ok(())
    }

    #[test]
    fn test_valid_config() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().display().to_string();
        let config = "[[plan]]\ndeck = \"Bio\"\nstart_date = \"2026-01-01\"\ndeadline = \"2026-02-01\"\n\n[[plan]]\ndeck = \"Art\"\nstart_date = \"2026-01-01\"\ndeadline = \"2026-02-01\"\n";
        write(dir.path().join(CONFIG_FILE_NAME), config)?;
        let coll = Collection::new(Some(path.clone()))?;
        coll.db.add_card("Bio::Cells", CardState::New, 0, false)?;
        let warnings = check(Some(path))?;
        assert_eq!(warnings, vec!["deck 'Art' has no cards".to_string()]);
        Ok(())
    }

    #[test]
    fn test_invalid_config() -> Fallible<()> {
        let dir = tempdir()?;
        let config = "[[plan]]\ndeck = \"Bio\"\nstart_date = \"2026-03-01\"\ndeadline = \"2026-02-01\"\n";
        write(dir.path().join(CONFIG_FILE_NAME), config)?;
        assert!(check(Some(dir.path().display().to_string())).is_err());
        Ok(())
    }
}
