pub mod api;

use crate::cli::Args;
use crate::rag::RagEngine;
use std::error::Error;
use std::sync::Arc;

pub use self::api::{ build_router, AppState };

pub struct Server {
    addr: String,
    rag: Arc<RagEngine>,
    args: Args,
}

impl Server {
    pub fn new(
        addr: String,
        rag: Arc<RagEngine>,
        args: Args,
    ) -> Self {
        Self {
            addr,
            rag,
            args,
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(
            &self.addr,
            self.rag.clone(),
            self.args.clone(),
        ).await
    }
}
