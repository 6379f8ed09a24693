pub mod memory_store;
pub mod order_store;
pub mod supabase_client;

pub use memory_store::{MemoryOrderStore, StoredOrder};
pub use order_store::{OrderStore, OrderUpdate};
pub use supabase_client::SupabaseClient;
