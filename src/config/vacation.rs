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

use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

use crate::error::ErrorReport;
use crate::error::fail;
use crate::types::date::Date;

/// Separators accepted between the two ends of a range.
const SEPARATORS: [&str; 2] = ["..", "/"];

/// One entry of a plan's vacation list: either a single day, or an
/// inclusive range of days written `START/END` or `START..END`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Vacation {
    Day(Date),
    Range { start: Date, end: Date },
}

impl Vacation {
    pub fn is_range(&self) -> bool {
        matches!(self, Vacation::Range { .. })
    }

    /// Every date covered by this entry.
    pub fn dates(&self) -> Vec<Date> {
        match *self {
            Vacation::Day(date) => vec![date],
            Vacation::Range { start, end } => {
                let mut dates = Vec::new();
                let mut date = start;
                loop {
                    dates.push(date);
                    if date >= end {
                        break;
                    }
                    date = date.succ();
                }
                dates
            }
        }
    }
}

/// Merge a list of vacation entries into one set of excluded dates.
pub fn expand(entries: &[Vacation]) -> BTreeSet<Date> {
    entries.iter().flat_map(|entry| entry.dates()).collect()
}

impl FromStr for Vacation {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return fail("empty vacation entry");
        }
        for sep in SEPARATORS {
            if let Some((a, b)) = s.split_once(sep) {
                let start: Date = a
                    .parse()
                    .map_err(|_| ErrorReport::new(format!("malformed vacation range '{s}'")))?;
                let end: Date = b
                    .parse()
                    .map_err(|_| ErrorReport::new(format!("malformed vacation range '{s}'")))?;
                // A reversed range covers the same days.
                let (start, end) = if end < start {
                    (end, start)
                } else {
                    (start, end)
                };
                if start == end {
                    return Ok(Vacation::Day(start));
                }
                return Ok(Vacation::Range { start, end });
            }
        }
        let date: Date = s
            .parse()
            .map_err(|_| ErrorReport::new(format!("malformed vacation date '{s}'")))?;
        Ok(Vacation::Day(date))
    }
}

impl Display for Vacation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Vacation::Day(date) => write!(f, "{date}"),
            Vacation::Range { start, end } => write!(f, "{start}/{end}"),
        }
    }
}

impl Serialize for Vacation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Vacation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let string = String::deserialize(deserializer)?;
        string
            .parse::<Vacation>()
            .map_err(|e: ErrorReport| serde::de::Error::custom(e.message().to_string()))
    }
}
