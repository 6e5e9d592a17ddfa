//! Basic Perplexity client usage example

use perplexity_client::{ChatRequest, Message, PerplexityClient, SONAR_PRO};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = PerplexityClient::from_env()?;

    let response = client
        .chat_completion(
            ChatRequest::new(SONAR_PRO)
                .message(Message::user("Who are the co-founders of Canva?"))
                .search_domains(["crunchbase.com", "linkedin.com"])
                .max_citations(5),
        )
        .await?;

    println!("{}", response.content);
    for url in &response.citations {
        println!("  source: {}", url);
    }

    Ok(())
}
