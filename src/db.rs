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

use std::collections::HashMap;
use std::collections::HashSet;

use rusqlite::Connection;
use rusqlite::ToSql;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::error::Fallible;
use crate::error::fail;
use crate::plan::phase::Phase;
use crate::stats::DayRecord;
use crate::types::card_state::CardState;
use crate::types::card_state::Maturity;
use crate::types::census::CardCensus;
use crate::types::census::FALLBACK_SECONDS_PER_ITEM;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

pub type CardId = i64;

pub type ReviewId = i64;

/// The collection database: the host's card states and review history, plus
/// the daily log of quotas.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating schema in {database_path}.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }

    /// Add a card to the database.
    pub fn add_card(
        &self,
        deck_name: &str,
        state: CardState,
        interval_days: u32,
        suspended: bool,
    ) -> Fallible<CardId> {
        let sql = "insert into cards (deck_name, card_state, interval_days, suspended) values (?, ?, ?, ?) returning card_id;";
        let card_id: CardId = self.conn.query_row(
            sql,
            (deck_name, state, interval_days, suspended),
            |row| row.get(0),
        )?;
        Ok(card_id)
    }

    /// Update a card's scheduling state, as the host does after a review.
    pub fn set_card_state(
        &self,
        card_id: CardId,
        state: CardState,
        interval_days: u32,
    ) -> Fallible<()> {
        let sql = "update cards set card_state = ?, interval_days = ? where card_id = ?;";
        let updated = self.conn.execute(sql, (state, interval_days, card_id))?;
        if updated == 0 {
            return fail(format!("no card with id {card_id}"));
        }
        Ok(())
    }

    /// Record a review of a card.
    pub fn add_review(
        &self,
        card_id: CardId,
        reviewed_at: Timestamp,
        duration_ms: u32,
    ) -> Fallible<ReviewId> {
        let sql = "insert into reviews (card_id, reviewed_at, duration_ms) values (?, ?, ?) returning review_id;";
        let review_id: ReviewId = self.conn.query_row(
            sql,
            (card_id, reviewed_at, duration_ms),
            |row| row.get(0),
        )?;
        Ok(review_id)
    }

    /// The names of all decks that have at least one card.
    pub fn deck_names(&self) -> Fallible<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("select distinct deck_name from cards order by deck_name;")?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(row.get(0)?);
        }
        Ok(names)
    }

    /// Count a deck's cards (subdecks included) and today's activity.
    ///
    /// Returns `None` if the deck has no cards at all, so that the planner
    /// can report the absence of data instead of an empty deck.
    pub fn census(
        &self,
        deck_name: &str,
        today: Date,
        maturity_threshold_days: u32,
    ) -> Fallible<Option<CardCensus>> {
        let pattern = subdeck_pattern(deck_name);
        let mut census = CardCensus::default();
        let mut card_count = 0;
        {
            let sql = "select card_state, interval_days, suspended from cards where deck_name = ?1 or deck_name like ?2 escape '\\';";
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.query((deck_name, &pattern))?;
            while let Some(row) = rows.next()? {
                card_count += 1;
                let state: CardState = row.get(0)?;
                let interval_days: u32 = row.get(1)?;
                let suspended: bool = row.get(2)?;
                if suspended {
                    census.suspended_count += 1;
                    continue;
                }
                match state.maturity(interval_days, maturity_threshold_days) {
                    Maturity::New => census.new_count += 1,
                    Maturity::Young => census.young_count += 1,
                    Maturity::Mature => census.mature_count += 1,
                }
            }
        }
        if card_count == 0 {
            log::debug!("Deck '{deck_name}' has no cards.");
            return Ok(None);
        }

        let mut first_review: HashMap<CardId, Date> = HashMap::new();
        let mut reviewed_today: HashSet<CardId> = HashSet::new();
        let mut total_ms: u64 = 0;
        let mut review_count: u64 = 0;
        {
            let sql = "select r.card_id, r.reviewed_at, r.duration_ms from reviews r join cards c on c.card_id = r.card_id where c.deck_name = ?1 or c.deck_name like ?2 escape '\\';";
            let mut stmt = self.conn.prepare(sql)?;
            let mut rows = stmt.query((deck_name, &pattern))?;
            while let Some(row) = rows.next()? {
                let card_id: CardId = row.get(0)?;
                let reviewed_at: Timestamp = row.get(1)?;
                let duration_ms: u32 = row.get(2)?;
                let date = reviewed_at.local_date();
                first_review
                    .entry(card_id)
                    .and_modify(|first| *first = (*first).min(date))
                    .or_insert(date);
                if date == today {
                    reviewed_today.insert(card_id);
                }
                total_ms += u64::from(duration_ms);
                review_count += 1;
            }
        }
        census.reviewed_today = reviewed_today.len() as u32;
        census.new_started_today = first_review.values().filter(|d| **d == today).count() as u32;
        census.avg_seconds_per_item = average_seconds(total_ms, review_count);
        log::debug!("Census for '{deck_name}' on {today}: {census:?}");
        Ok(Some(census))
    }

    /// Record a deck's quota and progress for a date.
    ///
    /// The first write of a date fixes the quota and phase for the rest of
    /// that day; later writes only update the count of work done. Returns
    /// the stored row.
    pub fn record_day(
        &self,
        deck_name: &str,
        date: Date,
        quota: u32,
        done: u32,
        phase: Phase,
    ) -> Fallible<DayRecord> {
        let sql = "insert into daily_log (deck_name, log_date, quota, done, phase) values (?, ?, ?, ?, ?) on conflict (deck_name, log_date) do update set done = excluded.done returning quota, done, phase;";
        let record = self.conn.query_row(
            sql,
            (deck_name, date, quota, done, phase),
            |row| {
                Ok(DayRecord {
                    date,
                    quota: row.get(0)?,
                    done: row.get(1)?,
                    phase: Some(row.get(2)?),
                })
            },
        )?;
        log::debug!(
            "Logged '{deck_name}' on {date}: quota {}, done {}.",
            record.quota,
            record.done
        );
        Ok(record)
    }

    /// The stored row for a deck and date, if any.
    pub fn get_day(&self, deck_name: &str, date: Date) -> Fallible<Option<DayRecord>> {
        let sql = "select quota, done, phase from daily_log where deck_name = ? and log_date = ?;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query((deck_name, date))?;
        if let Some(row) = rows.next()? {
            Ok(Some(DayRecord {
                date,
                quota: row.get(0)?,
                done: row.get(1)?,
                phase: Some(row.get(2)?),
            }))
        } else {
            Ok(None)
        }
    }

    /// All logged days for a deck, oldest first.
    pub fn day_records(&self, deck_name: &str) -> Fallible<Vec<DayRecord>> {
        let sql = "select log_date, quota, done, phase from daily_log where deck_name = ? order by log_date;";
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query([deck_name])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(DayRecord {
                date: row.get(0)?,
                quota: row.get(1)?,
                done: row.get(2)?,
                phase: Some(row.get(3)?),
            });
        }
        Ok(records)
    }

    /// Delete log rows older than `before`. Returns the number deleted.
    pub fn prune_log(&self, before: Date) -> Fallible<usize> {
        let deleted = self
            .conn
            .execute("delete from daily_log where log_date < ?;", [before])?;
        if deleted > 0 {
            log::debug!("Pruned {deleted} daily log rows before {before}.");
        }
        Ok(deleted)
    }

    /// Delete every log row for a deck.
    pub fn clear_log(&self, deck_name: &str) -> Fallible<usize> {
        let deleted = self
            .conn
            .execute("delete from daily_log where deck_name = ?;", [deck_name])?;
        Ok(deleted)
    }
}

fn average_seconds(total_ms: u64, count: u64) -> f64 {
    if count == 0 {
        return FALLBACK_SECONDS_PER_ITEM;
    }
    let seconds = total_ms as f64 / count as f64 / 1000.0;
    if seconds < 1.0 {
        FALLBACK_SECONDS_PER_ITEM
    } else {
        seconds
    }
}

/// A `like` pattern matching the subdecks of a deck.
fn subdeck_pattern(deck_name: &str) -> String {
    let mut pattern = String::with_capacity(deck_name.len() + 3);
    for c in deck_name.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push_str("::%");
    pattern
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["cards"], |row| row.get(0))?;
    Ok(count > 0)
}

impl ToSql for Phase {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Phase {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        Phase::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;
    use tempfile::TempDir;

    use super::*;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn open() -> Fallible<(TempDir, Database)> {
        let dir = tempdir()?;
        let path = dir.path().join("collection.db");
        let db = Database::new(path.to_str().unwrap())?;
        Ok((dir, db))
    }

    #[test]
    fn test_reopen_keeps_schema() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("collection.db");
        let path = path.to_str().unwrap();
        {
            let db = Database::new(path)?;
            db.add_card("Biology", CardState::New, 0, false)?;
        }
        let db = Database::new(path)?;
        assert_eq!(db.deck_names()?, vec!["Biology".to_string()]);
        Ok(())
    }

    #[test]
    fn test_census_counts() -> Fallible<()> {
        let (_dir, db) = open()?;
        db.add_card("Biology", CardState::New, 0, false)?;
        db.add_card("Biology", CardState::New, 0, false)?;
        db.add_card("Biology", CardState::Learning, 0, false)?;
        db.add_card("Biology", CardState::Review, 5, false)?;
        db.add_card("Biology", CardState::Review, 21, false)?;
        db.add_card("Biology", CardState::Review, 40, true)?;
        db.add_card("Chemistry", CardState::New, 0, false)?;
        let census = db.census("Biology", date("2026-01-15"), 21)?.unwrap();
        assert_eq!(census.new_count, 2);
        assert_eq!(census.young_count, 2);
        assert_eq!(census.mature_count, 1);
        assert_eq!(census.suspended_count, 1);
        assert_eq!(census.reviewed_today, 0);
        assert_eq!(census.avg_seconds_per_item, FALLBACK_SECONDS_PER_ITEM);
        Ok(())
    }

    #[test]
    fn test_census_includes_subdecks_only() -> Fallible<()> {
        let (_dir, db) = open()?;
        db.add_card("Bio", CardState::New, 0, false)?;
        db.add_card("Bio::Cells", CardState::New, 0, false)?;
        db.add_card("Biology", CardState::New, 0, false)?;
        let census = db.census("Bio", date("2026-01-15"), 21)?.unwrap();
        assert_eq!(census.new_count, 2);
        Ok(())
    }

    #[test]
    fn test_census_missing_deck() -> Fallible<()> {
        let (_dir, db) = open()?;
        assert!(db.census("Nothing", date("2026-01-15"), 21)?.is_none());
        Ok(())
    }

    #[test]
    fn test_census_today_activity() -> Fallible<()> {
        let (_dir, db) = open()?;
        let today = date("2026-01-15");
        let yesterday = date("2026-01-14");
        let a = db.add_card("Biology", CardState::Learning, 0, false)?;
        let b = db.add_card("Biology", CardState::Review, 3, false)?;
        // Started yesterday, reviewed twice today.
        db.add_review(a, Timestamp::at_local(yesterday, 10, 0)?, 10_000)?;
        db.add_review(a, Timestamp::at_local(today, 9, 0)?, 6_000)?;
        db.add_review(a, Timestamp::at_local(today, 9, 5)?, 4_000)?;
        // Started today.
        db.add_review(b, Timestamp::at_local(today, 11, 0)?, 8_000)?;
        let census = db.census("Biology", today, 21)?.unwrap();
        assert_eq!(census.reviewed_today, 2);
        assert_eq!(census.new_started_today, 1);
        assert_eq!(census.avg_seconds_per_item, 7.0);
        Ok(())
    }

    #[test]
    fn test_set_card_state() -> Fallible<()> {
        let (_dir, db) = open()?;
        let card = db.add_card("Biology", CardState::New, 0, false)?;
        db.set_card_state(card, CardState::Review, 30)?;
        let census = db.census("Biology", date("2026-01-15"), 21)?.unwrap();
        assert_eq!(census.new_count, 0);
        assert_eq!(census.mature_count, 1);
        assert!(db.set_card_state(card + 1, CardState::New, 0).is_err());
        Ok(())
    }

    #[test]
    fn test_record_day_pins_quota() -> Fallible<()> {
        let (_dir, db) = open()?;
        let today = date("2026-01-15");
        let first = db.record_day("Biology", today, 10, 0, Phase::New)?;
        assert_eq!(first.quota, 10);
        let later = db.record_day("Biology", today, 7, 6, Phase::Review)?;
        assert_eq!(later.quota, 10);
        assert_eq!(later.done, 6);
        assert_eq!(later.phase, Some(Phase::New));
        assert_eq!(db.get_day("Biology", today)?, Some(later));
        assert_eq!(db.get_day("Biology", today.succ())?, None);
        Ok(())
    }

    #[test]
    fn test_day_records_and_prune() -> Fallible<()> {
        let (_dir, db) = open()?;
        db.record_day("Biology", date("2026-01-03"), 5, 5, Phase::New)?;
        db.record_day("Biology", date("2026-01-01"), 5, 5, Phase::New)?;
        db.record_day("Chemistry", date("2026-01-02"), 5, 1, Phase::Review)?;
        let records = db.day_records("Biology")?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, date("2026-01-01"));
        assert_eq!(db.prune_log(date("2026-01-02"))?, 1);
        assert_eq!(db.day_records("Biology")?.len(), 1);
        assert_eq!(db.clear_log("Chemistry")?, 1);
        assert!(db.day_records("Chemistry")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_subdeck_pattern_escapes() {
        assert_eq!(subdeck_pattern("A_B"), "A\\_B::%");
        assert_eq!(subdeck_pattern("100%"), "100\\%::%");
    }

    #[test]
    fn test_average_seconds() {
        assert_eq!(average_seconds(0, 0), FALLBACK_SECONDS_PER_ITEM);
        assert_eq!(average_seconds(500, 1), FALLBACK_SECONDS_PER_ITEM);
        assert_eq!(average_seconds(20_000, 2), 10.0);
    }
}
