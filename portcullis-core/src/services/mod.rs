//! Service layer for guard logic
//!
//! This module contains concrete service implementations that encapsulate
//! authentication guarding, audit reporting, and user management logic.

pub mod guard;
pub mod last_login;
pub mod report;
pub mod user;

pub use guard::{AuthOutcome, Denial, GuardService};
pub use last_login::{LastLoginService, RecentLogins};
pub use report::{ReportService, ReportSnapshot};
pub use user::UserService;
