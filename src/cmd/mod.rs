pub mod login;
pub mod progress;
pub mod report;
pub mod tenant;
