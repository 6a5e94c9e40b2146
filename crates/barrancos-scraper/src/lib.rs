pub mod client;
pub mod descente;
pub mod enrich;
pub mod error;
mod rate_limit;
pub mod search_links;
pub mod wikiloc;

pub use client::EnrichmentClient;
pub use descente::{enrich_coordinates, CoordinateOptions, DESCENTE_BASE_URL};
pub use enrich::EnrichSummary;
pub use error::ScraperError;
pub use search_links::{add_search_urls, build_search_url, WIKILOC_BASE_URL};
pub use wikiloc::{enrich_wikiloc_links, session_headers, WikilocOptions};
