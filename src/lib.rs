//! Fortune-style career consultation: a ten-question elemental quiz, an
//! LLM-led follow-up dialogue and a printable result card.

pub mod config;
pub mod consultation;
pub mod error;
pub mod export;
pub mod llm;
pub mod logger;
pub mod oracle;
pub mod quiz;
pub mod session;
