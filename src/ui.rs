//! Terminal menu loop: the interactive surface of the explorer.
//!
//! Three views, mirroring the original dashboard: an informational home
//! view, a read-only statistics view, and the chat view with submit and
//! reset actions. All state lives for the process lifetime only.

use std::io::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::config::Config;
use crate::corpus::{Corpus, CorpusStats};
use crate::error::Result;
use crate::integrations::ChatRole;
use crate::session::ChatSession;

/// Top-level menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Home,
    Stats,
    Chat,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "home" => Some(MenuChoice::Home),
            "2" | "stats" | "statistik" => Some(MenuChoice::Stats),
            "3" | "chat" | "chatbot" => Some(MenuChoice::Chat),
            "q" | "quit" | "exit" => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

/// Input inside the chat view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Question(String),
    Reset,
    Back,
    Empty,
}

impl ChatInput {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed {
            "" => ChatInput::Empty,
            "/reset" => ChatInput::Reset,
            "/back" => ChatInput::Back,
            question => ChatInput::Question(question.to_string()),
        }
    }
}

/// Application state: shared corpus, precomputed statistics and one
/// interactive session.
pub struct App {
    stats: CorpusStats,
    session: ChatSession,
}

impl App {
    pub fn new(config: Arc<Config>, corpus: Arc<Corpus>) -> Self {
        let stats = CorpusStats::compute(&corpus);
        let session = ChatSession::new(config, corpus);
        Self { stats, session }
    }

    /// One-shot question, used by the `ask` subcommand.
    pub async fn ask_once(&mut self, question: &str) -> Result<String> {
        self.session.ask(question).await
    }

    pub fn stats_table(&self) -> String {
        self.stats.render_table()
    }

    /// Run the interactive menu until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        loop {
            print_menu();
            let Some(line) = read_line(&mut lines).await? else {
                return Ok(());
            };

            match MenuChoice::parse(&line) {
                Some(MenuChoice::Home) => print_home(),
                Some(MenuChoice::Stats) => println!("\n{}", self.stats_table()),
                Some(MenuChoice::Chat) => self.run_chat(&mut lines).await?,
                Some(MenuChoice::Quit) => return Ok(()),
                None => println!("Pilihan tidak dikenal: {}", line.trim()),
            }
        }
    }

    async fn run_chat(&mut self, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
        println!("\n=== Chatbot Ekstraksi Sentimen ===");
        println!("Ketik pertanyaan, /reset untuk mulai ulang, /back untuk kembali.\n");
        print_transcript(&self.session);

        loop {
            prompt("anda> ")?;
            let Some(line) = read_line(lines).await? else {
                return Ok(());
            };

            match ChatInput::parse(&line) {
                ChatInput::Empty => continue,
                ChatInput::Back => return Ok(()),
                ChatInput::Reset => {
                    self.session.reset();
                    print_transcript(&self.session);
                }
                ChatInput::Question(question) => match self.session.ask(&question).await {
                    Ok(answer) => println!("bot>  {}\n", answer),
                    // Per-query failures become a single visible line;
                    // the session stays usable
                    Err(err) => println!("❌ Gagal menjawab: {}\n", err.user_message()),
                },
            }
        }
    }
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    Ok(lines.next_line().await?)
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

fn print_menu() {
    println!("\n=== Proyek Analisis Wisata Pantai ===");
    println!(" 1) Home");
    println!(" 2) Data Statistik");
    println!(" 3) Chatbot LLM Ekstraksi Sentimen");
    println!(" q) Keluar");
    let _ = prompt("menu> ");
}

fn print_home() {
    println!("\n=== Tentang Proyek ===");
    println!(
        "Eksplorasi komentar pengunjung pantai di Lampung dengan statistik \
ringkas dan chatbot retrieval-augmented berbasis Gemini.\n\
Menu 2 menampilkan statistik korpus; menu 3 membuka chatbot yang menjawab \
pertanyaan berdasarkan komentar yang terkumpul."
    );
}

fn print_transcript(session: &ChatSession) {
    for turn in session.transcript() {
        match turn.role {
            ChatRole::User => println!("anda> {}", turn.content),
            ChatRole::Assistant => println!("bot>  {}", turn.content),
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choice_parses_numbers_and_names() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Home));
        assert_eq!(MenuChoice::parse(" 2 "), Some(MenuChoice::Stats));
        assert_eq!(MenuChoice::parse("chat"), Some(MenuChoice::Chat));
        assert_eq!(MenuChoice::parse("Q"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("7"), None);
    }

    #[test]
    fn chat_input_parses_commands() {
        assert_eq!(ChatInput::parse("/reset"), ChatInput::Reset);
        assert_eq!(ChatInput::parse("/back"), ChatInput::Back);
        assert_eq!(ChatInput::parse("  "), ChatInput::Empty);
        assert_eq!(
            ChatInput::parse("Apa sentimen Pantai Mutun?"),
            ChatInput::Question("Apa sentimen Pantai Mutun?".to_string())
        );
    }

    #[test]
    fn chat_input_trims_questions() {
        assert_eq!(
            ChatInput::parse("  pertanyaan  "),
            ChatInput::Question("pertanyaan".to_string())
        );
    }
}
