pub mod error;
pub mod traits;

pub use error::ForgeError;
pub use traits::{ChatPrompt, GenerativeBackend};
