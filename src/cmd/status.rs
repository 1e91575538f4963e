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

use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use serde::Serialize;

use crate::collection::Collection;
use crate::config::plan::PlanConfig;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::plan::PlanOutcome;
use crate::plan::PlanReport;
use crate::plan::Status;
use crate::plan::done_today;
use crate::plan::evaluate;
use crate::plan::phase::Phase;
use crate::streak::current_streak;
use crate::types::census::CardCensus;
use crate::types::date::Date;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusFormat {
    /// Plain text output.
    Text,
    /// JSON output.
    Json,
}

impl Display for StatusFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFormat::Text => write!(f, "text"),
            StatusFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortKey {
    /// Nearest deadline first.
    Deadline,
    /// Alphabetical by display name.
    Name,
    /// Least overall progress first.
    Progress,
    /// Most work left today first.
    Today,
    /// Longest estimated time first.
    Time,
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SortKey::Deadline => "deadline",
            SortKey::Name => "name",
            SortKey::Progress => "progress",
            SortKey::Today => "today",
            SortKey::Time => "time",
        };
        write!(f, "{s}")
    }
}

/// One row of the status table.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStatus {
    pub deck: String,
    /// Absent when the deck has no cards in the collection.
    pub report: Option<PlanReport>,
    /// Absent when streaks are switched off.
    pub streak: Option<u32>,
}

impl DeckStatus {
    fn name(&self) -> &str {
        match &self.report {
            Some(report) => &report.display_name,
            None => &self.deck,
        }
    }
}

pub fn print_status(
    directory: Option<String>,
    date: Option<Date>,
    sort: SortKey,
    behind_only: bool,
    format: StatusFormat,
) -> Fallible<()> {
    let mut coll = Collection::new(directory)?;
    // Only a live run writes to the daily log.
    let record = date.is_none();
    let today = date.unwrap_or_else(Date::today);
    let mut rows = collect_status(&mut coll, today, record)?;
    if behind_only {
        rows.retain(|row| {
            row.report
                .as_ref()
                .is_some_and(|r| r.status == Status::Behind)
        });
    }
    sort_rows(&mut rows, sort);
    match format {
        StatusFormat::Text => {
            if rows.is_empty() {
                println!("No plans to show.");
            }
            for row in &rows {
                println!("{}", render_row(row));
            }
        }
        StatusFormat::Json => {
            let json = serde_json::to_string_pretty(&rows)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Evaluate every enabled plan for `today`.
///
/// When `record` is set, each deck's quota is written to the daily log, and
/// the quota already logged for today (if any) takes precedence over the
/// freshly computed one. Otherwise the log is only read.
pub fn collect_status(
    coll: &mut Collection,
    today: Date,
    record: bool,
) -> Fallible<Vec<DeckStatus>> {
    let settings = coll.book.settings.clone();
    let tuning = settings.tuning();
    let mut book_changed = false;
    let mut rows = Vec::new();
    for plan in coll.book.enabled()? {
        let census = coll
            .db
            .census(&plan.deck, today, settings.maturity_threshold_days)?;
        let mut outcome = evaluate(today, &plan, census.as_ref(), &tuning);
        let in_review = outcome
            .report()
            .is_some_and(|r| r.target.phase == Phase::Review);
        if let Some(census) = census.as_ref() {
            if in_review && plan.baseline.initial_young_total.is_none() {
                let plan = capture_young_baseline(coll, &plan, census)?;
                book_changed = true;
                outcome = evaluate(today, &plan, Some(census), &tuning);
            }
        }
        let report = match (outcome, census.as_ref()) {
            (PlanOutcome::NoData { deck }, _) => {
                log::warn!("Deck '{deck}' has no cards.");
                None
            }
            (PlanOutcome::Report(report), None) => Some(report),
            (PlanOutcome::Report(report), Some(census)) => {
                Some(pin_to_log(coll, &plan.deck, today, report, census, record)?)
            }
        };
        let streak = if settings.enable_streaks {
            let entries = coll.db.day_records(&plan.deck)?;
            Some(current_streak(&entries, today))
        } else {
            None
        };
        rows.push(DeckStatus {
            deck: plan.deck.clone(),
            report,
            streak,
        });
    }
    if record && settings.log_retention_days > 0 {
        let before = today.add_days(-i64::from(settings.log_retention_days));
        coll.db.prune_log(before)?;
    }
    if book_changed {
        coll.save_book()?;
    }
    Ok(rows)
}

/// Hold the report to the phase and quota first logged for the day. The
/// work done is counted the way the logged phase counts it, so a deck that
/// finishes its new cards mid-day is still measured in new cards started.
fn pin_to_log(
    coll: &Collection,
    deck: &str,
    today: Date,
    report: PlanReport,
    census: &CardCensus,
    record: bool,
) -> Fallible<PlanReport> {
    let target = report.target;
    let existing = coll.db.get_day(deck, today)?;
    let phase = existing
        .and_then(|day| day.phase)
        .unwrap_or(target.phase);
    let done = done_today(phase, census);
    let logged = if record {
        Some(coll.db.record_day(deck, today, target.quota, done, phase)?)
    } else {
        existing
    };
    Ok(match logged {
        Some(day) => report.pin(day.phase.unwrap_or(phase), day.quota, done),
        None => report,
    })
}

fn capture_young_baseline(
    coll: &mut Collection,
    plan: &PlanConfig,
    census: &CardCensus,
) -> Fallible<PlanConfig> {
    let offset = coll.book.settings.cutoff_offset_days;
    let record = coll
        .book
        .get_mut(&plan.deck)
        .ok_or_else(|| ErrorReport::new(format!("deck '{}' has no plan", plan.deck)))?;
    record.capture_young_baseline(census);
    record.validate(offset)
}

pub fn sort_rows(rows: &mut [DeckStatus], key: SortKey) {
    rows.sort_by(|a, b| {
        let by_key = match (&a.report, &b.report) {
            (Some(ra), Some(rb)) => compare_reports(ra, rb, key),
            // Decks without data go last.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_key.then_with(|| a.name().cmp(b.name()))
    });
}

fn compare_reports(a: &PlanReport, b: &PlanReport, key: SortKey) -> Ordering {
    match key {
        SortKey::Deadline => a.days_to_deadline.cmp(&b.days_to_deadline),
        SortKey::Name => a.display_name.cmp(&b.display_name),
        SortKey::Progress => a.progress.total_cmp(&b.progress),
        SortKey::Today => b.target.left.cmp(&a.target.left),
        SortKey::Time => b.estimated_minutes.cmp(&a.estimated_minutes),
    }
}

pub fn render_row(row: &DeckStatus) -> String {
    let Some(report) = &row.report else {
        return format!("{}: no cards in the collection.", row.deck);
    };
    let target = &report.target;
    let mut line = format!("{} [{}]", report.display_name, report.status.label());
    match report.status {
        Status::Pending => line.push_str(" not started"),
        Status::Rest => line.push_str(" rest day"),
        _ => {
            line.push_str(&format!(
                " {} {}/{} today, {} left",
                target.phase, target.done, target.quota, target.left
            ));
            if report.estimated_minutes > 0 {
                line.push_str(&format!(" (~{} min)", report.estimated_minutes));
            }
            if report.override_active {
                line.push_str(" [fixed target]");
            }
        }
    }
    line.push_str(&format!(
        ", progress {:.0}%, deadline in {} days",
        report.progress * 100.0,
        report.days_to_deadline
    ));
    if let Some(streak) = row.streak {
        line.push_str(&format!(", streak {streak}"));
    }
    if target.overdue_new_warning {
        line.push_str("\n  warning: new cards remain after the cutoff.");
    }
    line
}
