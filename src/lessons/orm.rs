//! Object-mapping lessons: projections, sub-queries, grouped conditions,
//! multi-column `IN`, named parameters, map scanning and find-or-initialize.
//!
//! Every query is built with `.debug()`, so running a lesson logs the SQL it
//! issued under the `primer::sql` target. Column names are quoted because the
//! `"User"` table uses PascalCase columns.

use super::user::{User, UserSummary};
use crate::args;
use crate::executor::{rolled_back, DbError, Executor};
use crate::model::Model;
use crate::query::{named, Arg, Condition, NamedArgs, Select};
use crate::value::{Record, Value};

/// Scan into a narrow struct; only its columns are selected.
///
/// `SELECT "User"."Id","User"."Name","User"."PhoneNumber" FROM "User"`
pub fn select_field<Ex>(db: &Ex) -> Result<Vec<UserSummary>, DbError>
where
    Ex: Executor + ?Sized,
{
    User::find().select_model::<UserSummary>().debug().all(db)
}

/// Results of [`sub_query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubQueryResult {
    /// Users older than the average
    pub above_average: Vec<User>,
    /// `avgAge` per name, for names whose average beats the `%wang%` average
    pub averages: Vec<Record>,
}

/// A sub-query in `WHERE` and one in `HAVING`.
pub fn sub_query<Ex>(db: &Ex) -> Result<SubQueryResult, DbError>
where
    Ex: Executor + ?Sized,
{
    let average_age = Select::from_table("User").select([r#"AVG("Age")"#]);
    let above_average = User::find()
        .filter(r#""Age" > (?)"#, args![average_age])
        .debug()
        .all(db)?;

    let wang_average = Select::from_table("User")
        .select([r#"AVG("Age")"#])
        .filter(r#""Name" LIKE ?"#, args!["%wang%"]);
    let averages = Select::from_table("User")
        .select([r#"AVG("Age") as "avgAge""#])
        .group_by("Name")
        .having(r#"AVG("Age") > (?)"#, args![wang_average])
        .debug()
        .records(db)?;

    Ok(SubQueryResult {
        above_average,
        averages,
    })
}

/// Results of [`from_sub_query`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromSubQueryResult {
    /// Rows of the `(SELECT "Name","Age" ...) as u` derived table aged 18
    pub aged_18: Vec<User>,
    /// The cross product of two single-column derived tables
    pub cross: Vec<Record>,
}

/// Sub-queries as the `FROM` source.
pub fn from_sub_query<Ex>(db: &Ex) -> Result<FromSubQueryResult, DbError>
where
    Ex: Executor + ?Sized,
{
    let names_and_ages = User::find().select(["Name", "Age"]);
    let aged_18 = Select::new()
        .table_with("(?) as u", args![names_and_ages])
        .filter(r#""Age" = ?"#, args![18])
        .debug()
        .all(db)?;

    let names = User::find().select(["Name"]);
    let ages = User::find().select(["Age"]);
    let cross = Select::new()
        .table_with("(?) as name, (?) as age", args![names, ages])
        .debug()
        .records(db)?;

    Ok(FromSubQueryResult { aged_18, cross })
}

/// Nested condition groups.
///
/// `WHERE ("Address" = 'shanghai' AND ("Age" = 19 OR "Age" = 20)) OR
/// ("Address" = 'beijing' AND "Age" = 18)`
pub fn where_group<Ex>(db: &Ex) -> Result<Vec<User>, DbError>
where
    Ex: Executor + ?Sized,
{
    let nineteen_or_twenty = Condition::new()
        .filter(r#""Age" = ?"#, args![19])
        .or_filter(r#""Age" = ?"#, args![20]);
    let shanghai = Condition::new()
        .filter(r#""Address" = ?"#, args!["shanghai"])
        .group(nineteen_or_twenty);
    let beijing = Condition::new()
        .filter(r#""Address" = ?"#, args!["beijing"])
        .filter(r#""Age" = ?"#, args![18]);

    User::find()
        .filter_group(shanghai)
        .or_group(beijing)
        .debug()
        .all(db)
}

/// `WHERE ("Name", "Age") IN (('w1',18),('w2',19))`
pub fn multi_column_in<Ex>(db: &Ex) -> Result<Vec<User>, DbError>
where
    Ex: Executor + ?Sized,
{
    let pairs = Arg::rows(vec![
        vec![Value::from("w1"), Value::from(18)],
        vec![Value::from("w2"), Value::from(19)],
    ]);
    User::find()
        .filter(r#"("Name", "Age") IN ?"#, vec![pairs])
        .debug()
        .all(db)
}

/// The same `@name` query bound two ways. Returns both result sets.
pub fn named_parameter<Ex>(db: &Ex) -> Result<(Vec<User>, Vec<User>), DbError>
where
    Ex: Executor + ?Sized,
{
    const SQL: &str = r#""Name" = @name OR "Address" = @address"#;

    let by_named_args = User::find()
        .filter_named(SQL, [named("name", "w1"), named("address", "shanghai")])
        .debug()
        .all(db)?;

    let by_map: NamedArgs = [("name", "w1"), ("address", "shanghai")]
        .into_iter()
        .collect();
    let by_map = User::find().filter_named(SQL, by_map).debug().all(db)?;

    Ok((by_named_args, by_map))
}

/// Results of [`result_to_map`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultToMap {
    /// The first user with id 1, if any
    pub first: Option<Record>,
    /// Every row of the `users` table
    pub rows: Vec<Record>,
}

/// Scan rows into maps instead of structs.
pub fn result_to_map<Ex>(db: &Ex) -> Result<ResultToMap, DbError>
where
    Ex: Executor + ?Sized,
{
    let first = User::find()
        .filter(r#""Id" = ?"#, args![1])
        .debug()
        .first_record(db)?;
    let rows = Select::from_table("users").debug().records(db)?;
    Ok(ResultToMap { first, rows })
}

/// One find-or-initialize case: what was asked and what came back.
#[derive(Debug, Clone, PartialEq)]
pub struct InitCase {
    pub label: &'static str,
    pub user: User,
}

/// Find-or-initialize with struct and map conditions, `attrs` and `assign`.
///
/// Nothing is written to the database. With the lesson data (`w1` exists,
/// `w7` does not) the cases come back as:
///
/// | case | result |
/// |---|---|
/// | struct condition, not found | `Name: w7` |
/// | struct condition, found | the `w1` row |
/// | map condition, found | the `w1` row |
/// | `attrs` struct, not found | `Name: w7, Age: 20` |
/// | `attrs` column, not found | `Name: w7, Age: 20` |
/// | `attrs`, found | the `w1` row, attrs ignored |
/// | `assign`, not found | `Name: w7, Age: 20` |
/// | `assign`, found | the `w1` row with `Age: 20` |
pub fn first_or_init<Ex>(db: &Ex) -> Result<Vec<InitCase>, DbError>
where
    Ex: Executor + ?Sized,
{
    let w1 = User::named("w1");
    let w7 = User::named("w7");

    let cases: Vec<(&'static str, Select)> = vec![
        ("struct condition, not found", User::find().filter_model(&w7)),
        ("struct condition, found", User::find().filter_model(&w1)),
        ("map condition, found", User::find().filter_map([("name", "w1")])),
        (
            "attrs struct, not found",
            User::find().filter_model(&w7).attrs(&User::aged(20)),
        ),
        (
            "attrs column, not found",
            User::find().filter_model(&w7).attr("age", 20),
        ),
        (
            "attrs, found",
            User::find().filter_model(&w1).attrs(&User::aged(20)),
        ),
        (
            "assign, not found",
            User::find().filter_model(&w7).assign(&User::aged(20)),
        ),
        (
            "assign, found",
            User::find().filter_model(&w1).assign(&User::aged(20)),
        ),
    ];

    cases
        .into_iter()
        .map(|(label, query)| -> Result<InitCase, DbError> {
            let user = query.debug().first_or_init(db)?;
            Ok(InitCase { label, user })
        })
        .collect()
}

/// Find-or-create: like [`first_or_init`], but a missing row is inserted and
/// a found row is updated with the `assign` attributes.
///
/// Runs in a rolled-back transaction, so the seeded rows are the same
/// afterwards and `w8` is never left behind.
pub fn first_or_create<Ex>(db: &Ex) -> Result<Vec<InitCase>, DbError>
where
    Ex: Executor + ?Sized,
{
    rolled_back(db, |db| {
        let created = User::find()
            .filter_model(&User::named("w8"))
            .attrs(&User::aged(21))
            .debug()
            .first_or_create(db)?;

        let updated = User::find()
            .filter_model(&User::named("w1"))
            .assign(&User::aged(20))
            .debug()
            .first_or_create(db)?;

        Ok(vec![
            InitCase {
                label: "attrs, created when missing",
                user: created,
            },
            InitCase {
                label: "assign, updated when found",
                user: updated,
            },
        ])
    })
}
