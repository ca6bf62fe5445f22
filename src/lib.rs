pub mod cli;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod models;
pub mod rag;
pub mod search;
pub mod server;

use cli::{ Args, Command };
use llm::chat::AzureOpenAIChatClient;
use llm::LlmConfig;
use log::info;
use rag::RagEngine;
use search::{ AzureSearchClient, EmployeeScope };
use server::Server;
use std::error::Error;
use std::sync::Arc;

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "<unset>" } else { value }
}

/// Wires the search and completion clients into a `RagEngine`.
pub fn build_rag_engine(args: &Args) -> Result<RagEngine, Box<dyn Error + Send + Sync>> {
    let prompt_config = config::prompt::load_or_default(args.prompts_path.as_deref())?;
    let scope = EmployeeScope::new(&args.storage_account_url, &args.container_name, &args.employee_folder);
    let search_client = Arc::new(AzureSearchClient::from_args(args));
    let chat_client = Arc::new(AzureOpenAIChatClient::new(&LlmConfig::from(args))?);

    Ok(RagEngine::new(search_client, chat_client, scope, prompt_config, args.top_k))
}

pub async fn serve(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Search Endpoint: {}", or_unset(&args.search_endpoint));
    info!("Search Index: {}", or_unset(&args.search_index_name));
    info!("Completion Endpoint: {}", or_unset(&args.openai_endpoint));
    info!("Completion Deployment: {}", or_unset(&args.openai_deployment));
    info!("Completion API Version: {}", or_unset(&args.openai_api_version));
    info!("Employee Folder: {}", args.employee_folder);
    info!("Documents Per Question: {}", args.top_k);
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("<built-in>"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let rag = Arc::new(build_rag_engine(&args)?);
    info!("Answering from documents under: {}", rag.scope());

    let server = Server::new(args.server_addr.clone(), rag, args.clone());
    server.run().await?;

    Ok(())
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command.clone() {
        Some(Command::Chat(chat_args)) => cli::chat::run(chat_args).await,
        Some(Command::Serve) | None => serve(args).await,
    }
}
