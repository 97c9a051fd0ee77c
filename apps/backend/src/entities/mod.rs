pub mod tags;
pub mod user_settings;
pub mod users;

pub use tags::Entity as Tags;
pub use tags::Model as Tag;
pub use user_settings::Entity as UserSettings;
pub use user_settings::Model as UserSetting;
pub use users::Entity as Users;
pub use users::Model as User;
