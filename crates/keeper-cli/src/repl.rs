//! Interactive read-eval-print loop.
//!
//! Provides `keeper shell` -- an interactive client session with rustyline
//! line editing and command-name completion.

use crate::parse::{parse_line, EditBody, ShellCommand, COMMANDS};
use crate::render;
use keeper_client::{ClientError, KeeperClient};
use keeper_core::{SecretString, SecretType};
use rustyline::error::ReadlineError;
use rustyline::highlight::MatchingBracketHighlighter;
use rustyline::hint::HistoryHinter;
use rustyline::{CompletionType, Config, EditMode, Editor};
use rustyline_derive::{Helper, Highlighter, Hinter, Validator};
use std::path::PathBuf;

/// REPL configuration.
pub struct ReplConfig {
    /// Path to history file.
    pub history_file: PathBuf,
    /// Maximum history entries.
    pub max_history: usize,
    /// Shown in the banner.
    pub server_url: String,
}

impl ReplConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        let history_file = keeper_core::paths::history_file()
            .unwrap_or_else(|_| PathBuf::from(".keeper_history"));

        Self {
            history_file,
            max_history: 1000,
            server_url: server_url.into(),
        }
    }
}

/// Tab-completion helper for command names.
#[derive(Helper, Highlighter, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Hinter)]
    hinter: HistoryHinter,
    #[rustyline(Highlighter)]
    highlighter: MatchingBracketHighlighter,
    #[rustyline(Validator)]
    validator: rustyline::validate::MatchingBracketValidator,
}

impl rustyline::completion::Completer for ReplHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let prefix = &line[..pos];
        if prefix.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let matches = COMMANDS
            .iter()
            .map(|(name, _)| *name)
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect();
        Ok((0, matches))
    }
}

/// Result of handling one command.
enum CommandResult {
    Continue,
    Quit,
}

/// The interactive shell.
pub struct Repl {
    client: KeeperClient,
    config: ReplConfig,
}

impl Repl {
    pub fn new(client: KeeperClient, config: ReplConfig) -> Self {
        Self { client, config }
    }

    /// Run the REPL loop until `exit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        render::render_welcome(&self.config.server_url);

        let rl_config = Config::builder()
            .history_ignore_space(true)
            .max_history_size(self.config.max_history)?
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let helper = ReplHelper {
            hinter: HistoryHinter::new(),
            highlighter: MatchingBracketHighlighter::new(),
            validator: rustyline::validate::MatchingBracketValidator::new(),
        };

        let mut rl: Editor<ReplHelper, rustyline::history::FileHistory> =
            Editor::with_config(rl_config)?;
        rl.set_helper(Some(helper));

        // Load history
        let _ = rl.load_history(&self.config.history_file);

        loop {
            let prompt = if self.client.session().is_logged_in() {
                console::style("keeper> ").green().bold().to_string()
            } else {
                console::style("keeper> ").dim().to_string()
            };
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    // Passwords typed inline stay out of the history file.
                    if !is_sensitive(trimmed) {
                        let _ = rl.add_history_entry(trimmed);
                    }

                    match parse_line(trimmed) {
                        Ok(Some(command)) => match self.execute(command).await {
                            Ok(CommandResult::Continue) => {}
                            Ok(CommandResult::Quit) => break,
                            Err(e) => render::render_error(e),
                        },
                        Ok(None) => {}
                        Err(message) => render::render_error(message),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl-C: cancel current input, not exit
                    eprintln!("{}", console::style("^C (type exit to quit)").dim());
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl-D: exit
                    break;
                }
                Err(err) => {
                    render::render_error(err);
                    break;
                }
            }
        }

        // Save history
        let _ = rl.save_history(&self.config.history_file);

        self.client.session().shutdown().await;
        eprintln!("{}", console::style("bye").dim());
        Ok(())
    }

    async fn execute(&self, command: ShellCommand) -> Result<CommandResult, ClientError> {
        let secrets = self.client.secrets();
        let session = self.client.session();

        match command {
            ShellCommand::Login { login, password } => {
                let password = password_or_prompt(password)?;
                let report = session.login(&login, &password).await?;
                render::render_sync_report(&report);
                render::render_ok("successfully authorized");
            }
            ShellCommand::Register { login, password } => {
                let password = password_or_prompt(password)?;
                let report = session.register(&login, &password).await?;
                render::render_sync_report(&report);
                render::render_ok("account created, you are logged in");
            }
            ShellCommand::Logout => {
                session.logout().await;
                render::render_ok("logged out");
            }
            ShellCommand::DeleteUser => {
                session.delete_account().await?;
                render::render_ok("account deleted, you are logged out");
            }
            ShellCommand::Types => {
                render::render_types(&secrets.secret_types().await?);
            }
            ShellCommand::Create { title, payload } => {
                let meta = secrets.create_payload(&title, &payload).await?;
                render::render_ok(&format!("created secret #{}", meta.id));
            }
            ShellCommand::CreateBinary { title, path } => {
                let bytes = tokio::fs::read(&path).await?;
                let meta = secrets.create_binary(&title, &bytes).await?;
                render::render_ok(&format!(
                    "created secret #{} from {} bytes",
                    meta.id,
                    bytes.len()
                ));
            }
            ShellCommand::GetSecret { id } => {
                render::render_secret(&secrets.get(id).await?);
            }
            ShellCommand::GetSecretBinary { id, path } => {
                let written = secrets.get_binary(id, &path).await?;
                render::render_ok(&format!("wrote {written} bytes to {}", path.display()));
            }
            ShellCommand::GetSecretsByType { secret_type } => {
                render::render_listing(&secrets.list(secret_type).await?);
            }
            ShellCommand::EditSecret {
                id,
                title,
                body,
                force,
            } => {
                let updated_at = secrets.version(id).await?;
                let meta = match body {
                    EditBody::Payload(payload) => {
                        secrets
                            .edit_payload(id, &title, &payload, updated_at, force)
                            .await?
                    }
                    EditBody::File(path) => {
                        let bytes = tokio::fs::read(&path).await?;
                        secrets
                            .edit(id, &title, SecretType::Binary, &bytes, updated_at, force)
                            .await?
                    }
                };
                render::render_ok(&format!("updated secret #{}", meta.id));
            }
            ShellCommand::DeleteSecret { id } => {
                secrets.delete(id).await?;
                render::render_ok(&format!("deleted secret #{id}"));
            }
            ShellCommand::Help => render::render_help(),
            ShellCommand::Exit => return Ok(CommandResult::Quit),
        }

        Ok(CommandResult::Continue)
    }
}

fn password_or_prompt(password: Option<SecretString>) -> Result<SecretString, ClientError> {
    match password {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?.into()),
    }
}

/// Lines that may carry a password or card data.
fn is_sensitive(line: &str) -> bool {
    let name = line.split_whitespace().next().unwrap_or("");
    matches!(
        name,
        "login" | "register" | "create-auth" | "create-text" | "create-card" | "edit-secret"
    )
}
