use std::io::{self, Write};
use support_desk::agent::DraftField;
use support_desk::direct::TicketForm;
use support_desk::logging::init_logging;
use support_desk::{ClientConfig, TicketClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🎫 Support Desk - Create New Ticket");
    println!("==========================================");

    dotenvy::dotenv().ok();
    init_logging()?;

    let config = ClientConfig::from_env()?;
    let client = TicketClient::new(&config)?;
    let mut form = TicketForm::new();

    print!("Title: ");
    io::stdout().flush()?;
    let mut title = String::new();
    io::stdin().read_line(&mut title)?;
    form.set(DraftField::Title, title.trim());

    println!("Description (finish with an empty line):");
    let mut description = String::new();
    loop {
        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        description.push_str(&line);
    }
    form.set(DraftField::Description, description.trim_end());

    println!("Creating...");
    match form.submit(&client).await {
        Ok(ticket) => {
            println!("✅ {}", form.success().unwrap_or_default());
            println!("   #{} {} [{}]", ticket.id, ticket.title, ticket.status.label());
        }
        Err(e) => {
            tracing::debug!("Ticket form submission failed: {}", e);
            eprintln!("❌ {}", form.error().unwrap_or_default());
        }
    }

    Ok(())
}
