//! Grounded analysis: prompts and the framed stream producer

pub mod producer;
pub mod prompt;

pub use producer::{
    AnalysisProducer, FrameStream, IDLE_TIMEOUT_MESSAGE, OpenError, ProducerSettings,
    PumpOutcome, STREAM_FAILURE_MESSAGE,
};
pub use prompt::PromptSet;
