use std::io::Write;
use std::sync::Arc;
use support_desk::agent::{AgentClient, AgentTicketFlow, DraftField, FlowObserver, FlowPhase};
use support_desk::logging::init_logging;
use support_desk::models::conversation::{MessageRole, MessageType};
use support_desk::{ClientConfig, TicketClient};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /accept              this solved my issue
  /reject              this didn't work, ask again
  /retry               resend the last message after an error
  /title <text>        edit the drafted ticket title
  /description <text>  edit the drafted ticket description
  /submit              create the drafted ticket
  /cancel              close without creating a ticket
  /help                show this help
Anything else is sent to the assistant.";

struct TerminalHost;

impl FlowObserver for TerminalHost {
    fn on_ticket_created(&self) {
        println!("\n✅ All set. Closing the assistant.");
    }

    fn on_cancel(&self) {
        println!("\nAssistant closed.");
    }
}

/// Prints transcript entries appended since the last call, so the newest
/// entry is always the last thing on screen.
struct TranscriptView {
    shown: usize,
}

impl TranscriptView {
    fn render(&mut self, flow: &AgentTicketFlow) {
        let state = flow.state();
        for message in &state.transcript()[self.shown..] {
            match (message.role, message.message_type) {
                (MessageRole::User, _) => println!("You: {}", message.content),
                (MessageRole::Assistant, MessageType::Solution) => {
                    println!("AI:  {}", message.content);
                    println!("     [/accept] This solved my issue   [/reject] This didn't work");
                }
                (MessageRole::Assistant, _) => println!("AI:  {}", message.content),
                (MessageRole::System, _) => println!("  ! {}", message.content),
            }
        }
        self.shown = state.transcript().len();

        if flow.phase() == FlowPhase::DraftReady {
            if let Some(draft) = state.ticket_draft() {
                println!("     ┌ Title:       {}", draft.title);
                println!("     └ Description: {}", draft.description);
                if state.can_submit_draft() {
                    println!("     [/submit] Create Ticket");
                } else {
                    println!("     Fill in both fields with /title and /description before submitting.");
                }
            }
        }

        if let Some(error) = state.error() {
            if state.can_retry() {
                println!("⚠️  {}  [/retry]", error);
            } else {
                println!("⚠️  {}", error);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging()?;

    let config = ClientConfig::from_env()?;
    tracing::info!("Using support backend at {}", config.base_url);

    let assistant = Arc::new(AgentClient::new(&config)?);
    let tickets = Arc::new(TicketClient::new(&config)?);
    let mut flow = AgentTicketFlow::new(assistant, tickets, Arc::new(TerminalHost));
    let mut view = TranscriptView { shown: 0 };

    println!("AI Support Assistant");
    println!("====================");
    println!("How can I help you today?");
    println!("Describe your issue or question, and I'll assist you. If I can't resolve it, I'll help you create a support ticket.");
    println!("(type /help for commands)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            flow.cancel().await;
            break;
        };
        let line = line.trim();
        let (command, argument) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/help" => println!("{}", HELP),
            "/accept" => flow.accept_solution().await,
            "/reject" => {
                println!("…");
                flow.reject_solution().await;
            }
            "/retry" => {
                println!("…");
                flow.retry().await;
            }
            "/title" => flow.edit_draft(DraftField::Title, argument).await,
            "/description" => flow.edit_draft(DraftField::Description, argument).await,
            "/submit" => {
                println!("Creating...");
                flow.submit_draft().await;
            }
            "/cancel" | "/quit" => flow.cancel().await,
            _ if line.starts_with('/') => println!("Unknown command {}. Type /help.", command),
            _ => {
                if flow.state().input_enabled() && !line.is_empty() {
                    println!("…");
                }
                flow.send(line).await;
            }
        }

        view.render(&flow);
        if flow.phase().is_closed() {
            break;
        }
    }

    Ok(())
}
