pub mod chat;

use clap::{ Parser, Subcommand };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Document Store Args ---
    /// Blob storage account URL the search indexer crawls (e.g., https://acct.blob.core.windows.net)
    #[arg(long, env = "AZURE_STORAGE_ACCOUNT_URL", default_value = "")]
    pub storage_account_url: String,

    /// Blob container holding the per-employee folders
    #[arg(long, env = "BLOB_CONTAINER_NAME", default_value = "")]
    pub container_name: String,

    /// Folder inside the container whose documents answers are drawn from
    #[arg(long, env = "EMPLOYEE_FOLDER", default_value = "mansur")]
    pub employee_folder: String,

    // --- Search Service Args ---
    /// Search service endpoint (e.g., https://my-search.search.windows.net)
    #[arg(long, env = "AZURE_SEARCH_ENDPOINT", default_value = "")]
    pub search_endpoint: String,

    /// Name of the search index
    #[arg(long, env = "AZURE_SEARCH_INDEX_NAME", default_value = "")]
    pub search_index_name: String,

    /// API key sent in the `api-key` header to the search service
    #[arg(long, env = "AZURE_SEARCH_API_KEY", default_value = "", hide_env_values = true)]
    pub search_api_key: String,

    /// Search REST API version
    #[arg(long, env = "AZURE_SEARCH_API_VERSION", default_value = "2023-11-01")]
    pub search_api_version: String,

    /// Number of documents retrieved per question
    #[arg(long, env = "RAG_TOP_K", default_value = "3")]
    pub top_k: usize,

    // --- Completion Service Args ---
    /// Completion service endpoint (e.g., https://my-openai.openai.azure.com)
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT", default_value = "")]
    pub openai_endpoint: String,

    /// API key sent in the `api-key` header to the completion service
    #[arg(long, env = "AZURE_OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub openai_api_key: String,

    /// Name of the chat model deployment
    #[arg(long, env = "AZURE_OPENAI_DEPLOYMENT_NAME", default_value = "")]
    pub openai_deployment: String,

    /// Completion REST API version (e.g., 2024-02-01)
    #[arg(long, env = "AZURE_OPENAI_API_VERSION", default_value = "")]
    pub openai_api_version: String,

    /// Sampling temperature for answers
    #[arg(long, env = "COMPLETION_TEMPERATURE", default_value = "0.3")]
    pub temperature: f32,

    /// Upper bound on tokens generated per answer
    #[arg(long, env = "COMPLETION_MAX_TOKENS", default_value = "1000")]
    pub max_tokens: u32,

    // --- General App Args ---
    /// Optional path to a JSON file overriding the built-in prompts.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the chat API server (default)
    Serve,

    /// Chat with a running server from the terminal
    Chat(ChatArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct ChatArgs {
    /// Base URL of the chat API server
    #[arg(long, env = "CHAT_SERVER_URL", default_value = "http://127.0.0.1:4000")]
    pub url: String,

    /// Name shown on the welcome screen
    #[arg(long, env = "EMPLOYEE_NAME", default_value = "Mansur")]
    pub employee_name: String,

    /// Employee id shown on the welcome screen
    #[arg(long, env = "EMPLOYEE_ID", default_value = "EMP-2024-0847")]
    pub employee_id: String,
}
