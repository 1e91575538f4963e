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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::stats::Window;
use crate::stats::combine;
use crate::stats::window;
use crate::streak::current_streak;
use crate::types::date::Date;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsFormat {
    /// HTML output.
    Html,
    /// JSON output.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Html => write!(f, "html"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

pub fn print_stats(
    directory: Option<String>,
    deck: Option<String>,
    days: u32,
    date: Option<Date>,
    format: StatsFormat,
) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let today = date.unwrap_or_else(Date::today);
    let stats = get_stats(&coll, deck.as_deref(), days, today)?;
    match format {
        StatsFormat::Html => {
            println!("{}", render_html(&stats).into_string());
        }
        StatsFormat::Json => {
            let json = serde_json::to_string_pretty(&stats)?;
            println!("{json}");
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub date: Date,
    pub days: u32,
    pub decks: Vec<DeckStats>,
    pub total: Window,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckStats {
    pub deck: String,
    pub display_name: String,
    pub days_met: usize,
    pub completion_percent: u32,
    pub streak: Option<u32>,
    pub window: Window,
}

/// Per-deck windows over the daily log, plus their sum. Only enabled plans
/// are included, or the one deck asked for.
pub fn get_stats(
    coll: &Collection,
    deck: Option<&str>,
    days: u32,
    today: Date,
) -> Fallible<Stats> {
    let mut plans = coll.book.enabled()?;
    if let Some(deck) = deck {
        plans.retain(|plan| plan.deck == deck);
        if plans.is_empty() {
            return fail(format!("deck '{deck}' has no enabled plan"));
        }
    }
    let mut decks = Vec::new();
    for plan in plans {
        let entries = coll.db.day_records(&plan.deck)?;
        let w = window(&entries, today, days);
        let streak = if coll.book.settings.enable_streaks {
            Some(current_streak(&entries, today))
        } else {
            None
        };
        decks.push(DeckStats {
            deck: plan.deck,
            display_name: plan.display_name,
            days_met: w.days_met(),
            completion_percent: w.completion_percent(),
            streak,
            window: w,
        });
    }
    let windows: Vec<Window> = decks.iter().map(|d| d.window.clone()).collect();
    let total = combine(&windows);
    Ok(Stats {
        date: today,
        days,
        decks,
        total,
    })
}

fn render_window(w: &Window) -> Markup {
    html! {
        table {
            thead {
                tr {
                    th { "Date" }
                    th { "Phase" }
                    th { "Done" }
                    th { "Quota" }
                }
            }
            tbody {
                @for day in &w.days {
                    tr.met[day.quota > 0 && day.done >= day.quota] {
                        td { (day.date) }
                        td {
                            @if let Some(phase) = day.phase {
                                (phase)
                            } @else {
                                "-"
                            }
                        }
                        td { (day.done) }
                        td { (day.quota) }
                    }
                }
            }
            tfoot {
                tr {
                    td colspan="2" { "Total" }
                    td { (w.total_done) }
                    td { (w.total_quota) }
                }
            }
        }
    }
}

pub fn render_html(stats: &Stats) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "deckplan stats" }
            }
            body {
                h1 { "Last " (stats.days) " days to " (stats.date) }
                @for deck in &stats.decks {
                    section {
                        h2 { (deck.display_name) }
                        p {
                            (deck.days_met) " days met, "
                            (deck.completion_percent) "% of quota done"
                            @if let Some(streak) = deck.streak {
                                ", streak " (streak)
                            }
                        }
                        (render_window(&deck.window))
                    }
                }
                @if stats.decks.len() > 1 {
                    section {
                        h2 { "All decks" }
                        p { (stats.total.completion_percent()) "% of quota done" }
                        (render_window(&stats.total))
                    }
                }
            }
        }
    }
}
