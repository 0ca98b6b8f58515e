// Adapters layer: concrete implementations for external systems (catalog files, http services, location).

pub mod catalog;
pub mod location;
pub mod recommendation;
pub mod routing;

pub use catalog::load_catalog;
pub use location::FixedLocationProvider;
pub use recommendation::RecommendationClient;
pub use routing::RouteClient;
