/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task board endpoints (list, create, patch, delete)
/// - `users`: User registry endpoints (list, create, patch, delete)

pub mod health;
pub mod tasks;
pub mod users;
