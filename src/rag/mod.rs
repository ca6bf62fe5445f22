pub mod rag;

pub use self::rag::{ RagEngine, RagEngineError };
