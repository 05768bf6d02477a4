//! Entity classes reconciled from the published sources.

pub mod guest;
pub mod listing;
pub mod person;
