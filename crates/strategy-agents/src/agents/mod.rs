//! The four pipeline stages

pub mod data_synthesizer;
pub mod presenter;
pub mod researcher;
pub mod strategist;

pub use data_synthesizer::DataSynthesizer;
pub use presenter::Presenter;
pub use researcher::{NO_HEADLINES, Researcher};
pub use strategist::Strategist;
