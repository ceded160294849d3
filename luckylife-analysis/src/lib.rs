pub mod analyzer;
pub mod astro;
pub mod cancel;
pub mod config;
pub mod correlation;
pub mod cosmic;
pub mod environment;
pub mod patterns;
pub mod recommend;
pub mod stats;
