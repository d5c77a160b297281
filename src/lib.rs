pub mod calendar;
pub mod config;
pub mod gettext;
pub mod i18n;
