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

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Utc;
use rusqlite::ToSql;
use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::date::Date;

/// An instant in time, stored in UTC. Review events carry one of these.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The instant at the given local wall-clock time on `date`.
    pub fn at_local(date: Date, hour: u32, minute: u32) -> Fallible<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ErrorReport::new(format!("invalid time: {hour}:{minute}")))?;
        let local = Local
            .from_local_datetime(&date.into_inner().and_time(time))
            .earliest()
            .ok_or_else(|| ErrorReport::new(format!("nonexistent local time on {date}")))?;
        Ok(Self(local.with_timezone(&Utc)))
    }

    /// The calendar date this instant falls on in the local time zone.
    pub fn local_date(self) -> Date {
        let ts = self.0.with_timezone(&Local);
        Date::new(ts.date_naive())
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let str = self.0.to_rfc3339();
        Ok(ToSqlOutput::from(str))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let string: String = FromSql::column_result(value)?;
        let ts =
            DateTime::parse_from_rfc3339(&string).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        let ts = ts.with_timezone(&Utc);
        Ok(Timestamp(ts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_round_trip() -> Fallible<()> {
        let date = Date::from_ymd(2026, 1, 15)?;
        let ts = Timestamp::at_local(date, 12, 30)?;
        assert_eq!(ts.local_date(), date);
        Ok(())
    }

    #[test]
    fn test_invalid_time() -> Fallible<()> {
        let date = Date::from_ymd(2026, 1, 15)?;
        assert!(Timestamp::at_local(date, 25, 0).is_err());
        Ok(())
    }
}
