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

use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::error::ErrorReport;
use crate::error::fail;

/// The scheduling state of a card, as recorded by the host's scheduler.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CardState {
    New,
    Learning,
    Review,
    Relearning,
}

/// How far along a card is, relative to the maturity threshold.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Maturity {
    New,
    Young,
    Mature,
}

impl CardState {
    fn as_str(&self) -> &str {
        match self {
            CardState::New => "new",
            CardState::Learning => "learning",
            CardState::Review => "review",
            CardState::Relearning => "relearning",
        }
    }

    /// Classify a card. Only cards in review with an interval at or above
    /// the threshold count as mature.
    pub fn maturity(self, interval_days: u32, threshold_days: u32) -> Maturity {
        match self {
            CardState::New => Maturity::New,
            CardState::Learning | CardState::Relearning => Maturity::Young,
            CardState::Review => {
                if interval_days >= threshold_days {
                    Maturity::Mature
                } else {
                    Maturity::Young
                }
            }
        }
    }
}

impl TryFrom<String> for CardState {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "new" => Ok(CardState::New),
            "learning" => Ok(CardState::Learning),
            "review" => Ok(CardState::Review),
            "relearning" => Ok(CardState::Relearning),
            _ => fail(format!("Invalid card state: {}", value)),
        }
    }
}

impl ToSql for CardState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CardState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        CardState::try_from(string).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
