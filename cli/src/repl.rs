//! REPL (Read-Eval-Print Loop) for interactive chat

use std::io::{self, Write};
use std::sync::Arc;

use confab_application::{ChatStore, ExchangeCoordinator};
use confab_domain::Session;
use confab_infrastructure::FileSettings;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

/// Interactive chat REPL
pub struct ChatRepl {
    coordinator: Arc<ExchangeCoordinator>,
    store: Arc<dyn ChatStore>,
    settings: Arc<FileSettings>,
    session: Session,
}

impl ChatRepl {
    pub fn new(
        coordinator: Arc<ExchangeCoordinator>,
        store: Arc<dyn ChatStore>,
        settings: Arc<FileSettings>,
        session: Session,
    ) -> Self {
        Self {
            coordinator,
            store,
            settings,
            session,
        }
    }

    /// Run the interactive REPL
    pub async fn run(mut self) -> rustyline::Result<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("confab").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline(">>> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err:?}");
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn session_label(&self) -> String {
        self.session
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("(unnamed {})", self.session.id()))
    }

    fn print_welcome(&self) {
        println!();
        println!("confab - streaming chat");
        println!("Session: {}", self.session_label());
        println!("Type /help for commands, Ctrl-C to cancel a response.");
        println!();
    }

    /// Handle slash commands. Returns true if the REPL should exit.
    fn handle_command(&mut self, cmd: &str) -> bool {
        let (command, arg) = match cmd.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (cmd, ""),
        };

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                return true;
            }
            "/help" | "/h" | "/?" => self.print_help(),
            "/new" => self.cmd_new(arg),
            "/name" => self.cmd_name(arg),
            "/sessions" => self.cmd_sessions(),
            "/clear" => self.cmd_clear(),
            "/context" => self.cmd_context(arg),
            "/reload" => self.cmd_reload(),
            _ => {
                println!("Unknown command: {command}");
                println!("Type /help for available commands");
            }
        }
        false
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /new [name]              - Start a fresh session and switch to it");
        println!("  /name <name>             - Rename the current session");
        println!("  /sessions                - List stored sessions");
        println!("  /clear                   - Delete the current session's messages");
        println!("  /context on|off|default  - Override context memory for this session");
        println!("  /reload                  - Re-read the configuration files");
        println!("  /help, /h, /?            - Show this help");
        println!("  /quit, /exit, /q         - Exit chat");
        println!();
    }

    fn cmd_new(&mut self, name: &str) {
        let session = if name.is_empty() {
            Session::new()
        } else {
            Session::named(name)
        };
        if let Err(e) = self.store.save_session(&session) {
            eprintln!("Error: {e}");
            return;
        }
        self.session = session;
        println!("Switched to new session {}", self.session_label());
    }

    fn cmd_name(&mut self, name: &str) {
        if name.is_empty() {
            println!("Usage: /name <name>");
            return;
        }
        if self.session.rename(Some(name.to_string()))
            && let Err(e) = self.store.save_session(&self.session)
        {
            eprintln!("Error: {e}");
            return;
        }
        println!("Session renamed to {name}");
    }

    fn cmd_sessions(&self) {
        match self.store.all_sessions() {
            Ok(sessions) => {
                println!();
                for session in sessions {
                    let marker = if session.id() == self.session.id() {
                        "*"
                    } else {
                        " "
                    };
                    let name = session.name().unwrap_or("(unnamed)");
                    println!("{marker} {name}  {}", session.id());
                }
                println!();
            }
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    fn cmd_clear(&self) {
        match self.store.clear_session_messages(self.session.id()) {
            Ok(true) => println!("Session history cleared."),
            Ok(false) => println!("Session history already empty."),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    fn cmd_context(&mut self, arg: &str) {
        let flag = match arg {
            "on" => Some(true),
            "off" => Some(false),
            "default" => None,
            _ => {
                println!("Usage: /context on|off|default");
                return;
            }
        };
        if self.session.set_enable_context(flag)
            && let Err(e) = self.store.save_session(&self.session)
        {
            eprintln!("Error: {e}");
            return;
        }
        match flag {
            Some(true) => println!("Context memory enabled for this session."),
            Some(false) => println!("Context memory disabled for this session."),
            None => println!("Context memory follows the global default."),
        }
    }

    fn cmd_reload(&self) {
        match self.settings.reload() {
            Ok(()) => println!("Configuration reloaded."),
            Err(e) => eprintln!("Error: {e}"),
        }
    }

    async fn process_question(&self, question: &str) {
        println!();

        let canceller = self.coordinator.clone();
        let ctrl_c = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                canceller.cancel();
            }
        });

        let mut printed = 0;
        let result = self
            .coordinator
            .send(self.session.id(), question, |answer| {
                print!("{}", &answer[printed..]);
                let _ = io::stdout().flush();
                printed = answer.len();
            })
            .await;
        ctrl_c.abort();

        println!();
        match result {
            Ok(_) => {}
            Err(e) if e.is_canceled() => {
                // Cancelled on purpose; nothing was persisted.
                warn!("exchange canceled");
            }
            Err(e) if e.is_timeout() => eprintln!("Response timed out."),
            Err(e) => eprintln!("Error: {e}"),
        }
        println!();
    }
}
