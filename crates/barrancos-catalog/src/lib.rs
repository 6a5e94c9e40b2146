pub mod collate;
pub mod difficulty;
pub mod fields;
pub mod location;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod project;

pub use collate::spanish_cmp;
pub use difficulty::{extract_component, format_difficulty, GradeAxis};
pub use merge::merge_canyons;
pub use normalize::{better_string, is_meaningful, normalize};
pub use pipeline::{build_catalog, build_catalog_from_sources, find_canyon, RawSource};
pub use project::project_record;
