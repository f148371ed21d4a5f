/// State management module
/// 
/// This module holds all UI state, independent of rendering:
/// - Filter form and the query it produces (filter.rs)
/// - Search debouncing (search.rs)
/// - Listing response cache (cache.rs)
/// - File list view: rows, empty/error states, row actions (listing.rs)
/// - Upload panel state machine (upload.rs)
/// - Toast notifications (notify.rs)

pub mod cache;
pub mod filter;
pub mod listing;
pub mod notify;
pub mod search;
pub mod upload;
