use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dx_mcp::{DxCli, FsOperation, ServerConfig, create_server, serve_stdio};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dx-mcp")]
#[command(about = "Developer-experience MCP bridge for Bun projects")]
struct Cli {
    /// External CLI program used by the client subcommands.
    #[arg(long, global = true, default_value = dx_mcp::DEFAULT_PROGRAM)]
    cli: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as an MCP stdio server (for use in mcp.json)
    McpStdio {
        /// Project root to inspect (defaults to the working directory)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Prefix for environment variables reported by get_runtime_info
        #[arg(long, env = "DX_MCP_ENV_PREFIX", default_value = dx_mcp::DEFAULT_ENV_PREFIX)]
        env_prefix: String,
    },
    /// Search documentation through the external CLI
    Search { query: String },
    /// Database statements through the external CLI
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Filesystem operations through the external CLI
    Fs {
        #[command(subcommand)]
        command: FsCommands,
    },
}

#[derive(Subcommand)]
enum DbCommands {
    /// Execute a statement with no result set (INSERT, UPDATE, CREATE)
    Exec { sql: String },
    /// Execute a SELECT query and print its rows
    Query { sql: String },
}

#[derive(Subcommand)]
enum FsCommands {
    /// Read a file and print its contents
    Read { path: String },
    /// List a directory
    Ls { path: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr: stdout belongs to the MCP transport.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("dx_mcp=info".parse()?),
        )
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::McpStdio { root, env_prefix } => {
            let config = match root {
                Some(root) => ServerConfig::new(root),
                None => ServerConfig::default(),
            }
            .with_env_prefix(env_prefix);

            info!(
                "Starting MCP stdio server for project root {}",
                config.root.display()
            );

            let server = create_server(config);
            serve_stdio(server).await?;

            info!("MCP stdio server session ended");
        }
        Commands::Search { query } => {
            let results = DxCli::new(cli.cli).search(&query).await?;
            for result in results {
                println!("{result}");
            }
        }
        Commands::Db { command } => {
            let client = DxCli::new(cli.cli);
            match command {
                DbCommands::Exec { sql } => {
                    client.db_exec(&sql).await?;
                    info!("Statement executed");
                }
                DbCommands::Query { sql } => {
                    for row in client.db_query(&sql).await? {
                        println!("{}", serde_json::to_string(&row)?);
                    }
                }
            }
        }
        Commands::Fs { command } => {
            let client = DxCli::new(cli.cli);
            let output = match command {
                FsCommands::Read { path } => client.fs(FsOperation::Read(&path)).await?,
                FsCommands::Ls { path } => client.fs(FsOperation::List(&path)).await?,
            };
            println!("{output}");
        }
    }

    Ok(())
}
