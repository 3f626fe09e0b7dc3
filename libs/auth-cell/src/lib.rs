//! Thin proxy over Supabase auth plus local token checks.

pub mod handlers;
pub mod router;

pub use router::auth_routes;
