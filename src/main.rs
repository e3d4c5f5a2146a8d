// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PPTX RESEARCH CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI para chamar as ferramentas de busca diretamente e inspecionar o agente.
//
// Uso:
//   pptx-research-cli discover "brand tracking"
//   pptx-research-cli retrieve "Brand Tracker Q4.pptx" "awareness"
//   pptx-research-cli agent
//   pptx-research-cli agent '{"agent": "AzureSearchAgent", "query": "pricing"}'
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use pptx_research::prelude::*;
use std::path::PathBuf;

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or(path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    if dotenvy::dotenv().is_err() {
        eprintln!("⚠ Nenhum arquivo .env encontrado. Certifique-se de que AZURE_SEARCH_ENDPOINT, AZURE_SEARCH_KEY e AZURE_SEARCH_INDEX_NAME estão definidas.");
    }
}

fn print_usage(program: &str) {
    eprintln!("PPTX Research CLI v{}", pptx_research::VERSION);
    eprintln!();
    eprintln!("Uso:");
    eprintln!("  {} discover <query>", program);
    eprintln!("  {} retrieve <file_name> <query>", program);
    eprintln!("  {} agent [task]", program);
    eprintln!();
    eprintln!("Exemplos:");
    eprintln!("  {} discover \"brand tracking\"", program);
    eprintln!("  {} retrieve \"Brand Tracker Q4.pptx\" \"awareness\"", program);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pptx-research-cli");

    let Some(command) = args.get(1) else {
        print_usage(program);
        std::process::exit(1);
    };

    let client = Arc::new(AzureSearchClient::from_env()?);

    match command.as_str() {
        "discover" if args.len() >= 3 => {
            let query = args[2..].join(" ");
            let output = client.discover(&query).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "retrieve" if args.len() >= 4 => {
            let file_name = &args[2];
            let query = args[3..].join(" ");
            let output = client.retrieve(file_name, &query).await;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "agent" => {
            let agent = init_azure_search_agent(&load_llm_config(), client);

            if args.len() >= 3 {
                // Tarefa do orquestrador (JSON) ou query simples
                let task = agent.task_from_input(&args[2..].join(" "));
                println!("{}", serde_json::to_string_pretty(&task)?);

                let found = agent.discover_for(&task).await.map_err(anyhow::Error::msg)?;
                println!("{}", serde_json::to_string_pretty(&found)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&agent.describe())?);
                println!();
                println!("{}", agent.instructions());
            }
        }
        _ => {
            print_usage(program);
            std::process::exit(1);
        }
    }

    Ok(())
}
