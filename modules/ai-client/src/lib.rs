pub mod error;
pub mod openai;
pub mod util;

pub use error::{AiError, Result};
pub use openai::{OpenAi, UploadedFile};
pub use util::chunk_by_chars;
