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

use clap::Parser;
use clap::Subcommand;

use crate::cmd::check::check_collection;
use crate::cmd::plan::EditFields;
use crate::cmd::plan::PlanFields;
use crate::cmd::plan::add_plan;
use crate::cmd::plan::clear_plans;
use crate::cmd::plan::edit_plan;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::status::SortKey;
use crate::cmd::status::StatusFormat;
use crate::cmd::status::print_status;
use crate::error::Fallible;
use crate::stats::DEFAULT_WINDOW_DAYS;
use crate::types::date::Date;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the collection directory. Defaults to the current directory.
    #[arg(long, global = true)]
    directory: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show today's targets for every plan.
    Status {
        /// Evaluate as of this date instead of today, without logging.
        #[arg(long)]
        date: Option<Date>,
        #[arg(long, default_value_t = SortKey::Deadline)]
        sort: SortKey,
        /// Only show decks that are behind today.
        #[arg(long)]
        behind: bool,
        #[arg(long, default_value_t = StatusFormat::Text)]
        format: StatusFormat,
    },
    /// Show recent history from the daily log.
    Stats {
        /// Only show this deck.
        #[arg(long)]
        deck: Option<String>,
        /// Length of the window, in days.
        #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
        days: u32,
        /// Last day of the window. Defaults to today.
        #[arg(long)]
        date: Option<Date>,
        #[arg(long, default_value_t = StatsFormat::Html)]
        format: StatsFormat,
    },
    /// Create, edit, or remove plans.
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
    /// Check that the collection and its plans are valid.
    Check,
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Create a plan for a deck.
    Add {
        deck: String,
        /// The date by which every card should be mature.
        #[arg(long)]
        deadline: Date,
        #[command(flatten)]
        fields: PlanFields,
    },
    /// Change an existing plan.
    Edit {
        deck: String,
        #[command(flatten)]
        edit: EditFields,
    },
    /// Remove plans and their logged history.
    Clear {
        #[arg(required = true)]
        decks: Vec<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let directory = cli.directory;
    match cli.command {
        Command::Status {
            date,
            sort,
            behind,
            format,
        } => print_status(directory, date, sort, behind, format),
        Command::Stats {
            deck,
            days,
            date,
            format,
        } => print_stats(directory, deck, days, date, format),
        Command::Plan { action } => match action {
            PlanCommand::Add {
                deck,
                deadline,
                fields,
            } => add_plan(directory, deck, deadline, fields, Date::today()),
            PlanCommand::Edit { deck, edit } => edit_plan(directory, deck, edit, Date::today()),
            PlanCommand::Clear { decks } => clear_plans(directory, decks),
        },
        Command::Check => check_collection(directory),
    }
}
