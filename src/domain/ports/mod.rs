//! Domain ports (interfaces) for the attainment service.

pub mod catalog_repository;
pub mod mapping_repository;
pub mod score_repository;

pub use catalog_repository::CatalogRepository;
pub use mapping_repository::MappingRepository;
pub use score_repository::ScoreRepository;
