pub mod fallback;
pub mod postprocess;
