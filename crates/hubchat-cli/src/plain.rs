//! Line-oriented front-ends: interactive stdin/stdout mode and one-shot `-c`

use std::io::{self, IsTerminal, Write};

use crossterm::style::Stylize;
use hubchat_ai::Assistant;
use hubchat_relay::{ChatRelay, RelayEvent};

use crate::commands::{self, CommandResult};
use crate::config::Config;

/// Prints a streaming reply as it grows.
///
/// Each update carries the whole reply so far; only the part not yet
/// printed is written.
pub struct ReplyPrinter<W: Write> {
    out: W,
    /// Chars of the current reply already written
    printed: usize,
    in_reply: bool,
}

impl<W: Write> ReplyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            in_reply: false,
        }
    }

    pub fn handle(&mut self, event: &RelayEvent) -> io::Result<()> {
        match event {
            RelayEvent::ReplyStart => {
                self.printed = 0;
                self.in_reply = true;
            }
            RelayEvent::ReplyUpdate { text } => self.write_suffix(text)?,
            RelayEvent::ReplyEnd { text } => {
                self.write_suffix(text)?;
                writeln!(self.out)?;
                self.in_reply = false;
            }
            RelayEvent::Error { .. } => {
                // Keep the error message off the end of a half-printed line
                if self.in_reply && self.printed > 0 {
                    writeln!(self.out)?;
                }
                self.in_reply = false;
            }
            RelayEvent::ConversationStarted { .. } | RelayEvent::UserTurn { .. } => {}
        }
        self.out.flush()
    }

    fn write_suffix(&mut self, text: &str) -> io::Result<()> {
        let suffix: String = text.chars().skip(self.printed).collect();
        if !suffix.is_empty() {
            write!(self.out, "{}", suffix)?;
            self.printed += suffix.chars().count();
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

/// Run one exchange, printing the reply to stdout as it streams in
pub async fn ask(relay: &mut ChatRelay, question: &str) -> hubchat_relay::Result<bool> {
    let mut events = relay.subscribe();
    let mut printer = ReplyPrinter::new(io::stdout());

    let exchange = relay.prompt(question);
    tokio::pin!(exchange);

    let result = loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                if let Ok(event) = event {
                    printer.handle(&event).ok();
                }
            }

            result = &mut exchange => break result,
        }
    };

    while let Ok(event) = events.try_recv() {
        printer.handle(&event).ok();
    }
    result
}

/// Answer a single question and exit; non-zero exit status on failure
pub async fn run_command(relay: &mut ChatRelay, question: &str) -> anyhow::Result<()> {
    if let Err(e) = ask(relay, question).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Interactive mode (simple stdin/stdout)
pub async fn run_interactive(
    relay: &mut ChatRelay,
    assistant: &Assistant,
    config: &Config,
) -> anyhow::Result<()> {
    if io::stdout().is_terminal() {
        println!("{}", config.title().bold());
    } else {
        println!("{}", config.title());
    }
    println!();
    println!("{}", config.intro().trim_end());
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        if let Some(result) = commands::execute_command(input, relay, assistant) {
            match result {
                CommandResult::Message(msg) => println!("{}", msg),
                CommandResult::Exit => break,
                CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        println!();
        if let Err(e) = ask(relay, input).await {
            eprintln!("Error: {}", e);
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn printed(events: &[RelayEvent]) -> String {
        let mut printer = ReplyPrinter::new(Vec::new());
        for event in events {
            printer.handle(event).unwrap();
        }
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn test_prints_only_new_text() {
        let out = printed(&[
            RelayEvent::UserTurn {
                text: "What is Amnesty International?".into(),
            },
            RelayEvent::ReplyStart,
            RelayEvent::ReplyUpdate {
                text: "Amnesty ".into(),
            },
            RelayEvent::ReplyUpdate {
                text: "Amnesty International is ".into(),
            },
            RelayEvent::ReplyUpdate {
                text: "Amnesty International is a human rights organization.".into(),
            },
            RelayEvent::ReplyEnd {
                text: "Amnesty International is a human rights organization.".into(),
            },
        ]);
        assert_eq!(out, "Amnesty International is a human rights organization.\n");
    }

    #[test]
    fn test_multibyte_fragments() {
        let out = printed(&[
            RelayEvent::ReplyStart,
            RelayEvent::ReplyUpdate { text: "Droits ".into() },
            RelayEvent::ReplyUpdate {
                text: "Droits humains – été".into(),
            },
            RelayEvent::ReplyEnd {
                text: "Droits humains – été".into(),
            },
        ]);
        assert_eq!(out, "Droits humains – été\n");
    }

    #[test]
    fn test_error_ends_partial_line() {
        let out = printed(&[
            RelayEvent::ReplyStart,
            RelayEvent::ReplyUpdate { text: "Amn".into() },
            RelayEvent::Error {
                message: "connection reset".into(),
            },
        ]);
        assert_eq!(out, "Amn\n");
    }

    #[test]
    fn test_second_reply_starts_fresh() {
        let out = printed(&[
            RelayEvent::ReplyStart,
            RelayEvent::ReplyEnd { text: "One.".into() },
            RelayEvent::ReplyStart,
            RelayEvent::ReplyUpdate { text: "Two".into() },
            RelayEvent::ReplyEnd { text: "Two.".into() },
        ]);
        assert_eq!(out, "One.\nTwo.\n");
    }

    #[tokio::test]
    async fn test_ask_completes_exchange() {
        let mut relay = crate::commands::tests::relay();
        assert!(ask(&mut relay, "Hello?").await.unwrap());
        assert_eq!(relay.transcript().len(), 2);
        assert!(!ask(&mut relay, "   ").await.unwrap());
        assert_eq!(relay.transcript().len(), 2);
    }
}
