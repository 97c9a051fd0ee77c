//! Schema change descriptors.
//!
//! Every structural change the application has ever needed is listed here
//! once, independent of dialect. The connection's backend decides how the
//! DDL is rendered and how presence is introspected.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};

/// Meal categories enabled for a user unless they choose otherwise.
pub const DEFAULT_MEAL_CATEGORIES: [&str; 4] = ["breakfast", "lunch", "dinner", "snack"];

pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_ROLE: &str = "user";

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    #[iden = "createdAt"]
    CreatedAt,
    #[iden = "updatedAt"]
    UpdatedAt,
}

#[derive(Iden)]
enum UserSettings {
    Table,
    #[iden = "userId"]
    UserId,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    Name,
    Color,
}

/// Default carried by an added column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    /// Stored as a JSON-encoded list of strings.
    JsonList(&'static [&'static str]),
}

impl DefaultValue {
    pub fn render(&self) -> String {
        match self {
            DefaultValue::Text(value) => (*value).to_string(),
            DefaultValue::JsonList(items) => serde_json::Value::from(items.to_vec()).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ChangeKind {
    CreateTable(fn() -> TableCreateStatement),
    AddColumn {
        column: &'static str,
        default: DefaultValue,
        /// Rewrite pre-existing NULL/empty cells to the default after the add.
        backfill: bool,
    },
}

/// A named, idempotent structural change to one table.
#[derive(Debug, Clone, Copy)]
pub struct SchemaChange {
    pub name: &'static str,
    pub table: &'static str,
    pub kind: ChangeKind,
}

impl SchemaChange {
    /// `table` or `table.column`, for logs.
    pub fn target(&self) -> String {
        match self.kind {
            ChangeKind::CreateTable(_) => self.table.to_string(),
            ChangeKind::AddColumn { column, .. } => format!("{}.{}", self.table, column),
        }
    }

    pub fn ddl(&self, backend: DatabaseBackend) -> Statement {
        match self.kind {
            ChangeKind::CreateTable(build) => backend.build(&build()),
            ChangeKind::AddColumn {
                column, default, ..
            } => backend.build(
                &Table::alter()
                    .table(Alias::new(self.table))
                    .add_column(
                        ColumnDef::new(Alias::new(column))
                            .text()
                            .null()
                            .default(default.render()),
                    )
                    .to_owned(),
            ),
        }
    }

    /// Backfill statement for column adds that ask for one.
    ///
    /// Not every engine applies a column DEFAULT to rows that existed before
    /// the add, so the default is written explicitly wherever the cell is
    /// NULL or empty.
    pub fn backfill(&self, backend: DatabaseBackend) -> Option<Statement> {
        match self.kind {
            ChangeKind::AddColumn {
                column,
                default,
                backfill: true,
            } => Some(
                backend.build(
                    &Query::update()
                        .table(Alias::new(self.table))
                        .value(Alias::new(column), default.render())
                        .cond_where(
                            Cond::any()
                                .add(Expr::col(Alias::new(column)).is_null())
                                .add(Expr::col(Alias::new(column)).eq("")),
                        )
                        .to_owned(),
                ),
            ),
            _ => None,
        }
    }
}

fn create_users() -> TableCreateStatement {
    Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Users::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
        .col(
            ColumnDef::new(Users::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Users::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned()
}

fn create_user_settings() -> TableCreateStatement {
    Table::create()
        .table(UserSettings::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(UserSettings::UserId)
                .integer()
                .not_null()
                .primary_key(),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_user_settings_user")
                .from(UserSettings::Table, UserSettings::UserId)
                .to(Users::Table, Users::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn create_tags() -> TableCreateStatement {
    Table::create()
        .table(Tags::Table)
        .if_not_exists()
        .col(
            ColumnDef::new(Tags::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Tags::Name).string().not_null())
        .col(ColumnDef::new(Tags::Color).string().not_null())
        .to_owned()
}

/// All known schema changes, in declaration order.
///
/// Order is only a convenience for `up`: each entry re-derives whether it
/// is needed from live metadata and never assumes an earlier one ran.
pub fn registry() -> Vec<SchemaChange> {
    vec![
        SchemaChange {
            name: "create_users",
            table: "users",
            kind: ChangeKind::CreateTable(create_users),
        },
        SchemaChange {
            name: "create_user_settings",
            table: "user_settings",
            kind: ChangeKind::CreateTable(create_user_settings),
        },
        SchemaChange {
            name: "create_tags",
            table: "tags",
            kind: ChangeKind::CreateTable(create_tags),
        },
        SchemaChange {
            name: "add_users_role",
            table: "users",
            kind: ChangeKind::AddColumn {
                column: "role",
                default: DefaultValue::Text(DEFAULT_ROLE),
                backfill: true,
            },
        },
        SchemaChange {
            name: "add_user_settings_theme",
            table: "user_settings",
            kind: ChangeKind::AddColumn {
                column: "theme",
                default: DefaultValue::Text(DEFAULT_THEME),
                backfill: true,
            },
        },
        SchemaChange {
            name: "add_user_settings_enabled_meal_categories",
            table: "user_settings",
            kind: ChangeKind::AddColumn {
                column: "enabled_meal_categories",
                default: DefaultValue::JsonList(&DEFAULT_MEAL_CATEGORIES),
                backfill: true,
            },
        },
    ]
}

pub fn find_change(name: &str) -> Option<SchemaChange> {
    registry().into_iter().find(|change| change.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn registry_names_are_unique() {
        let names: HashSet<_> = registry().iter().map(|c| c.name).collect();
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn categories_default_renders_as_json_list() {
        let rendered = DefaultValue::JsonList(&DEFAULT_MEAL_CATEGORIES).render();
        assert_eq!(rendered, r#"["breakfast","lunch","dinner","snack"]"#);
    }

    #[test]
    fn add_column_ddl_matches_across_dialects() {
        for change in registry() {
            let ChangeKind::AddColumn { column, default, .. } = change.kind else {
                continue;
            };

            for backend in [DatabaseBackend::Sqlite, DatabaseBackend::Postgres] {
                let sql = change.ddl(backend).sql;
                assert!(
                    sql.starts_with(&format!(
                        "ALTER TABLE \"{}\" ADD COLUMN \"{column}\"",
                        change.table
                    )),
                    "{backend:?}: {sql}"
                );
                assert!(sql.to_lowercase().contains(" text "), "{backend:?}: {sql}");
                // Postgres escapes the JSON quotes, so compare on the plain text defaults only.
                match default {
                    DefaultValue::Text(value) => {
                        assert!(sql.contains(&format!("DEFAULT '{value}'")), "{backend:?}: {sql}")
                    }
                    DefaultValue::JsonList(items) => {
                        assert!(sql.contains("DEFAULT"), "{backend:?}: {sql}");
                        for item in items {
                            assert!(sql.contains(item), "{backend:?}: {sql}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn backfill_only_for_column_adds() {
        let create = find_change("create_users").unwrap();
        assert!(create.backfill(DatabaseBackend::Sqlite).is_none());

        let theme = find_change("add_user_settings_theme").unwrap();
        let stmt = theme.backfill(DatabaseBackend::Postgres).unwrap();
        assert!(stmt.sql.starts_with("UPDATE \"user_settings\" SET \"theme\""));
        assert!(stmt.sql.contains("IS NULL"));
    }

    #[test]
    fn create_table_ddl_is_guarded() {
        let users = find_change("create_users").unwrap();
        for backend in [DatabaseBackend::Sqlite, DatabaseBackend::Postgres] {
            let sql = users.ddl(backend).sql;
            assert!(sql.contains("IF NOT EXISTS"), "{backend:?}: {sql}");
            assert!(sql.contains("\"createdAt\""), "{backend:?}: {sql}");
        }
    }

    #[test]
    fn unknown_change_is_none() {
        assert!(find_change("drop_everything").is_none());
    }
}
