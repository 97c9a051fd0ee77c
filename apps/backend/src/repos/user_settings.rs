use migration::changes::{DEFAULT_MEAL_CATEGORIES, DEFAULT_THEME};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::user_settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealCategory {
    pub const ALL: [MealCategory; 4] = [
        MealCategory::Breakfast,
        MealCategory::Lunch,
        MealCategory::Dinner,
        MealCategory::Snack,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: Theme,
    pub enabled_meal_categories: Vec<MealCategory>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::parse(DEFAULT_THEME).unwrap_or(Theme::Light),
            enabled_meal_categories: DEFAULT_MEAL_CATEGORIES
                .iter()
                .filter_map(|c| MealCategory::parse(c))
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UpdateUserSettings {
    pub theme: Option<Theme>,
    pub enabled_meal_categories: Option<Vec<MealCategory>>,
}

impl UserSettings {
    /// Stored values that are blank or unreadable fall back to the defaults
    /// the schema change would have written.
    fn from_model(model: user_settings::Model) -> Self {
        let defaults = Self::default();

        let theme = match model.theme.as_deref() {
            None | Some("") => defaults.theme,
            Some(raw) => Theme::parse(raw).unwrap_or_else(|| {
                warn!(user_id = model.user_id, theme = raw, "unknown stored theme");
                defaults.theme
            }),
        };

        let enabled_meal_categories = match model.enabled_meal_categories.as_deref() {
            None | Some("") => defaults.enabled_meal_categories,
            Some(raw) => match serde_json::from_str::<Vec<String>>(raw) {
                Ok(names) => normalize(names.iter().filter_map(|n| MealCategory::parse(n))),
                Err(e) => {
                    warn!(user_id = model.user_id, error = %e, "unreadable meal categories");
                    defaults.enabled_meal_categories
                }
            },
        };

        Self {
            theme,
            enabled_meal_categories,
        }
    }
}

/// Sorted, de-duplicated.
pub fn normalize(categories: impl IntoIterator<Item = MealCategory>) -> Vec<MealCategory> {
    let mut out: Vec<MealCategory> = categories.into_iter().collect();
    out.sort();
    out.dedup();
    out
}

fn encode_categories(categories: &[MealCategory]) -> String {
    let names: Vec<&str> = categories.iter().map(MealCategory::as_str).collect();
    serde_json::Value::from(names).to_string()
}

/// Settings for a user, or the defaults when no row exists yet.
pub async fn get_settings<C: ConnectionTrait>(conn: &C, user_id: i32) -> Result<UserSettings, DbErr> {
    let model = user_settings::Entity::find_by_id(user_id).one(conn).await?;
    Ok(model.map(UserSettings::from_model).unwrap_or_default())
}

/// Merge `update` into the current settings and write the row, creating it
/// when missing.
pub async fn upsert_settings<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    update: UpdateUserSettings,
) -> Result<UserSettings, DbErr> {
    let current = get_settings(conn, user_id).await?;
    let next = UserSettings {
        theme: update.theme.unwrap_or(current.theme),
        enabled_meal_categories: update
            .enabled_meal_categories
            .map(normalize)
            .unwrap_or(current.enabled_meal_categories),
    };

    let row = user_settings::ActiveModel {
        user_id: Set(user_id),
        theme: Set(Some(next.theme.as_str().to_string())),
        enabled_meal_categories: Set(Some(encode_categories(&next.enabled_meal_categories))),
    };

    user_settings::Entity::insert(row)
        .on_conflict(
            OnConflict::column(user_settings::Column::UserId)
                .update_columns([
                    user_settings::Column::Theme,
                    user_settings::Column::EnabledMealCategories,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(next)
}
