use crate::cli::ChatArgs;
use crate::conversation::session::QUICK_QUESTIONS;
use crate::conversation::{ ChatSession, HttpChatBackend, SendOutcome, SessionError };
use crate::models::chat::Role;
use log::info;
use std::error::Error;
use tokio::io::{ AsyncBufReadExt, BufReader };
use uuid::Uuid;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Ask(String),
    New,
    List,
    Select(usize),
    Delete(usize),
    Quick(usize),
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return Input::Ask(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let index = parts.next().and_then(|n| n.parse::<usize>().ok());

    match (name, index) {
        ("new", _) => Input::New,
        ("list" | "ls", _) => Input::List,
        ("select", Some(n)) => Input::Select(n),
        ("delete" | "rm", Some(n)) => Input::Delete(n),
        ("quick", Some(n)) => Input::Quick(n),
        ("help" | "?", _) => Input::Help,
        ("quit" | "exit" | "q", _) => Input::Quit,
        _ => Input::Invalid(line.to_string()),
    }
}

/// Conversation id shown at 1-based position `n` of the sidebar list.
fn nth_conversation(session: &ChatSession, n: usize) -> Option<Uuid> {
    n.checked_sub(1)
        .and_then(|i| session.store().conversations().get(i))
        .map(|c| c.id)
}

fn print_help() {
    println!("Type a question and press Enter. Commands:");
    println!("  /new            start a new conversation");
    println!("  /list           list conversations");
    println!("  /select <n>     switch to conversation n");
    println!("  /delete <n>     delete conversation n");
    println!("  /quick <n>      ask quick question n");
    println!("  /help           show this help");
    println!("  /quit           leave");
}

fn print_welcome(args: &ChatArgs) {
    println!();
    println!("Welcome, {} ({})", args.employee_name, args.employee_id);
    println!("Ask me anything from the official Employee Handbook.");
    println!();
    for (i, (label, question)) in QUICK_QUESTIONS.iter().enumerate() {
        println!("  [{}] {}: {}", i + 1, label, question);
    }
    println!();
}

fn print_conversations(session: &ChatSession) {
    let store = session.store();
    if store.conversations().is_empty() {
        println!("No conversations yet.");
        return;
    }
    for (i, c) in store.conversations().iter().enumerate() {
        let marker = if store.active_id() == Some(c.id) { "*" } else { " " };
        println!(
            "{} {:>2}. {} ({} messages, {})",
            marker,
            i + 1,
            c.title,
            c.messages.len(),
            c.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_active(session: &ChatSession, args: &ChatArgs) {
    match session.store().active() {
        Some(c) if !c.messages.is_empty() => {
            println!("--- {} ---", c.title);
            for m in &c.messages {
                let who = match m.role {
                    Role::User => "You",
                    Role::Assistant => "Assistant",
                };
                println!("{}: {}\n", who, m.content);
            }
        }
        _ => print_welcome(args),
    }
}

fn print_outcome(outcome: &SendOutcome) {
    match outcome {
        SendOutcome::Answered(answer) => println!("Assistant: {}\n", answer),
        SendOutcome::Failed(apology) => println!("Assistant: {}\n", apology),
    }
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let backend = HttpChatBackend::new(&args.url)?;
    info!("Chatting with {}", backend.chat_url());

    let mut session = ChatSession::new();
    print_welcome(&args);
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let result = match parse_input(&line) {
            Input::Ask(question) => {
                if !question.is_empty() {
                    println!("Searching Employee Handbook...");
                }
                session.send(&backend, &question).await.map(|o| print_outcome(&o))
            }
            Input::Quick(n) => {
                println!("Searching Employee Handbook...");
                session.send_quick(&backend, n).await.map(|o| print_outcome(&o))
            }
            Input::New => {
                session.store_mut().create();
                print_welcome(&args);
                Ok(())
            }
            Input::List => {
                print_conversations(&session);
                Ok(())
            }
            Input::Select(n) => {
                match nth_conversation(&session, n) {
                    Some(id) => {
                        session.store_mut().select(id);
                        print_active(&session, &args);
                    }
                    None => println!("No conversation numbered {}.", n),
                }
                Ok(())
            }
            Input::Delete(n) => {
                match nth_conversation(&session, n) {
                    Some(id) => {
                        session.store_mut().delete(id);
                        println!("Deleted conversation {}.", n);
                    }
                    None => println!("No conversation numbered {}.", n),
                }
                Ok(())
            }
            Input::Help => {
                print_help();
                Ok(())
            }
            Input::Quit => break,
            Input::Invalid(text) => {
                println!("Unknown command: {} (try /help)", text);
                Ok(())
            }
        };

        match result {
            Ok(()) | Err(SessionError::EmptyMessage) => {}
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
