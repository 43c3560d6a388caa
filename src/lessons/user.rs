//! The `User` table shared by the object-mapping lessons.

use crate::executor::{DbError, Executor};
use crate::model::Model;
use crate::query::Statement;
use crate::value::ColumnType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// DDL for the table the lessons query.
pub const CREATE_TABLE_SQL: &str = r#"CREATE TABLE IF NOT EXISTS "User" (
    "Id" SERIAL PRIMARY KEY,
    "Name" TEXT NOT NULL DEFAULT '',
    "Age" INTEGER NOT NULL DEFAULT 0,
    "PhoneNumber" TEXT NOT NULL DEFAULT '',
    "Address" TEXT NOT NULL DEFAULT '',
    "CreateTime" TIMESTAMP
)"#;

/// One row of `"User"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct User {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub phone_number: String,
    pub address: String,
    pub create_time: Option<NaiveDateTime>,
}

impl User {
    /// A user carrying only a name, the usual lookup condition.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A user carrying only an age, used as `attrs`/`assign` input.
    pub fn aged(age: i32) -> Self {
        Self {
            age,
            ..Self::default()
        }
    }
}

/// Rows the lessons expect: `w1` and `w2` exist, `w7` and `w8` do not.
pub fn seed_users() -> Vec<User> {
    [
        ("w1", 18, "13800000001", "shanghai"),
        ("w2", 19, "13800000002", "beijing"),
        ("wangwu", 20, "13800000003", "shanghai"),
        ("lisi", 18, "13800000004", "beijing"),
    ]
    .into_iter()
    .map(|(name, age, phone_number, address)| User {
        name: name.to_string(),
        age,
        phone_number: phone_number.to_string(),
        address: address.to_string(),
        ..User::default()
    })
    .collect()
}

/// Create the table if needed and insert the seed rows it lacks, matched by
/// name. Returns the rows inserted, so a second run returns none.
pub fn seed<Ex>(db: &Ex) -> Result<Vec<User>, DbError>
where
    Ex: Executor + ?Sized,
{
    db.execute(&Statement::from_sql(CREATE_TABLE_SQL, Vec::new()))?;
    let mut inserted = Vec::new();
    for row in seed_users() {
        let existing: Option<User> = User::find()
            .filter_model(&User::named(row.name.as_str()))
            .take(db)?;
        if existing.is_some() {
            log::debug!("{} is already seeded", row.name);
            continue;
        }
        inserted.push(row.insert(db)?);
    }
    Ok(inserted)
}

impl Model for User {
    const TABLE: &'static str = "User";
    const PRIMARY_KEY: &'static str = "Id";
    const COLUMNS: &'static [&'static str] =
        &["Id", "Name", "Age", "PhoneNumber", "Address", "CreateTime"];

    fn column_type(column: &str) -> Option<ColumnType> {
        match column {
            "Id" | "Age" => Some(ColumnType::Int),
            "Name" | "PhoneNumber" | "Address" => Some(ColumnType::Text),
            "CreateTime" => Some(ColumnType::Timestamp),
            _ => None,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {} {} {}",
            self.id, self.name, self.age, self.phone_number, self.address
        )?;
        match &self.create_time {
            Some(ts) => write!(f, " {ts}}}"),
            None => write!(f, " <nil>}}"),
        }
    }
}

/// A narrow view of `"User"`: scanning into it projects just these columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct UserSummary {
    pub id: i32,
    pub name: String,
    pub phone_number: String,
}

impl Model for UserSummary {
    const TABLE: &'static str = "User";
    const PRIMARY_KEY: &'static str = "Id";
    const COLUMNS: &'static [&'static str] = &["Id", "Name", "PhoneNumber"];

    fn column_type(column: &str) -> Option<ColumnType> {
        User::column_type(column)
    }
}
