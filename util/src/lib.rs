pub mod config;
pub mod exam_model;
pub mod grading_config;
pub mod paths;
pub mod test_helpers;
