/// Router Module Index
///
/// Portal routes grouped by the guard that protects them. Each group is
/// wrapped in its guard middleware in `create_router`, so a handler never
/// runs for a principal the route guard turned away.

/// Pages anyone may open, plus login and logout.
pub mod public;

/// Shared dashboard API. Needs any stored session; capability checks
/// happen per resource inside the handlers.
pub mod authenticated;

/// The admin dashboard.
pub mod admin;

/// The sub-admin dashboard.
pub mod subadmin;
