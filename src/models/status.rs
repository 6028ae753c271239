use std::fmt;
use std::str::FromStr;

use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

/// Payment state of a booking, stored as lowercase TEXT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "completed" => Ok(PaymentStatus::Completed),
            "failed" => Ok(PaymentStatus::Failed),
            other => Err(format!("Unknown payment status: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for PaymentStatus {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for PaymentStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

/// Publication state of an event, stored as lowercase TEXT
///
/// Only active events show up in search and upcoming listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(EventStatus::Active),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(format!("Unknown event status: {}", other)),
        }
    }
}

impl FromSql<Text, Sqlite> for EventStatus {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for EventStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_parse() {
        assert_eq!("pending".parse::<PaymentStatus>().unwrap(), PaymentStatus::Pending);
        assert_eq!("Completed".parse::<PaymentStatus>().unwrap(), PaymentStatus::Completed);
        assert_eq!(" failed ".parse::<PaymentStatus>().unwrap(), PaymentStatus::Failed);
        assert!("refunded".parse::<PaymentStatus>().is_err());
    }

    #[test]
    fn test_payment_status_serializes_lowercase() {
        let json = serde_json::to_string(&PaymentStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
        let parsed: PaymentStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Failed);
        assert!(serde_json::from_str::<PaymentStatus>("\"paid\"").is_err());
    }

    #[test]
    fn test_event_status_parse() {
        assert_eq!("active".parse::<EventStatus>().unwrap(), EventStatus::Active);
        assert_eq!("CANCELLED".parse::<EventStatus>().unwrap(), EventStatus::Cancelled);
        assert!("draft".parse::<EventStatus>().is_err());
        assert_eq!(EventStatus::default(), EventStatus::Active);
    }
}
