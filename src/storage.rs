mod memory;
mod postgres;
mod rest;
mod store;

pub use self::{
    memory::MemoryStore,
    postgres::{DBPool, PgStore, migrate, new_db_pool},
    rest::RestStore,
    store::{PostStore, Store, StoreError},
};
