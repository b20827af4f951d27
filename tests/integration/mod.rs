//! End-to-end scenarios run through the public API against a scripted transport.

mod blocking;
mod caching;
mod data_store;
mod queries;
