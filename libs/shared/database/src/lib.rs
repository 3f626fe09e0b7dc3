pub mod supabase;

pub use supabase::{SupabaseApiError, SupabaseClient, UNIQUE_VIOLATION};
