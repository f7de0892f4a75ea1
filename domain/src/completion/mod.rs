//! Completion response domain

pub mod response;

pub use response::{
    COMPOSITE_MODEL_ID, ChatCompletionChoice, ChatCompletionResponse, MODEL_OWNER, ModelInfo,
    ModelList, ResponseMessage, Usage,
};
