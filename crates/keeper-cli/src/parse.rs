//! Shell line parsing.
//!
//! A line is a command name followed by whitespace-separated arguments.
//! `--force` / `-f` may appear anywhere and only matters to `edit-secret`.
//! Free text (note bodies) takes the rest of the line.

use keeper_core::{Card, LoginPass, SecretPayload, SecretString, SecretType, TextNote};
use std::path::PathBuf;

/// Every command name the shell understands, with a one-line description.
pub const COMMANDS: &[(&str, &str)] = &[
    ("login", "login <login> [password]  Authenticate"),
    ("register", "register <login> [password]  Create an account and log in"),
    ("logout", "logout  Forget the session and cached secrets"),
    ("delete-user", "delete-user  Delete the account and log out"),
    ("types", "types  List secret types"),
    ("create-auth", "create-auth <title> <login> <password>  Store a login/password pair"),
    ("create-text", "create-text <title> <text...>  Store a text note"),
    ("create-binary", "create-binary <title> <path>  Store a file"),
    ("create-card", "create-card <title> <number> <cvv> <due>  Store a payment card"),
    ("get-secret", "get-secret <id>  Show a secret"),
    ("get-secret-binary", "get-secret-binary <id> <path>  Save a file secret to path"),
    ("get-secrets-by-type", "get-secrets-by-type <type>  List secrets of one type"),
    ("edit-secret", "edit-secret <id> <title> <type> <fields...> [--force]  Replace a secret"),
    ("delete-secret", "delete-secret <id>  Delete a secret"),
    ("help", "help  Show this help"),
    ("exit", "exit  Leave the shell"),
];

/// New content for `edit-secret`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditBody {
    Payload(SecretPayload),
    /// Replacement file contents are read from this path.
    File(PathBuf),
}

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Login {
        login: String,
        password: Option<SecretString>,
    },
    Register {
        login: String,
        password: Option<SecretString>,
    },
    Logout,
    DeleteUser,
    Types,
    Create {
        title: String,
        payload: SecretPayload,
    },
    CreateBinary {
        title: String,
        path: PathBuf,
    },
    GetSecret {
        id: i64,
    },
    GetSecretBinary {
        id: i64,
        path: PathBuf,
    },
    GetSecretsByType {
        secret_type: SecretType,
    },
    EditSecret {
        id: i64,
        title: String,
        body: EditBody,
        force: bool,
    },
    DeleteSecret {
        id: i64,
    },
    Help,
    Exit,
}

/// Parse one shell line. Blank lines yield `Ok(None)`.
///
/// Errors are user-facing messages naming what is missing or malformed.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut force = false;
    let words: Vec<&str> = line
        .split_whitespace()
        .filter(|w| {
            let is_flag = matches!(*w, "--force" | "-f");
            force |= is_flag;
            !is_flag
        })
        .collect();

    let Some((&name, args)) = words.split_first() else {
        return Ok(None);
    };

    let command = match name {
        "login" | "register" => {
            let login = required(args, 0, "login")?.to_string();
            let password = args.get(1).map(|p| SecretString::new(*p));
            if name == "login" {
                ShellCommand::Login { login, password }
            } else {
                ShellCommand::Register { login, password }
            }
        }
        "logout" => ShellCommand::Logout,
        "delete-user" => ShellCommand::DeleteUser,
        "types" => ShellCommand::Types,
        "create-auth" | "create-text" | "create-card" => {
            let title = required(args, 0, "title")?.to_string();
            let secret_type = match name {
                "create-auth" => SecretType::LoginPass,
                "create-text" => SecretType::Text,
                _ => SecretType::Card,
            };
            let payload = payload_fields(secret_type, &args[1..])?;
            ShellCommand::Create { title, payload }
        }
        "create-binary" => ShellCommand::CreateBinary {
            title: required(args, 0, "title")?.to_string(),
            path: PathBuf::from(required(args, 1, "file path")?),
        },
        "get-secret" => ShellCommand::GetSecret {
            id: secret_id(args, 0)?,
        },
        "get-secret-binary" => ShellCommand::GetSecretBinary {
            id: secret_id(args, 0)?,
            path: PathBuf::from(required(args, 1, "destination path")?),
        },
        "get-secrets-by-type" => ShellCommand::GetSecretsByType {
            secret_type: secret_type(args, 0)?,
        },
        "edit-secret" => {
            let id = secret_id(args, 0)?;
            let title = required(args, 1, "title")?.to_string();
            let secret_type = secret_type(args, 2)?;
            let body = if secret_type == SecretType::Binary {
                EditBody::File(PathBuf::from(required(args, 3, "file path")?))
            } else {
                EditBody::Payload(payload_fields(secret_type, &args[3..])?)
            };
            ShellCommand::EditSecret {
                id,
                title,
                body,
                force,
            }
        }
        "delete-secret" => ShellCommand::DeleteSecret {
            id: secret_id(args, 0)?,
        },
        "help" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };

    Ok(Some(command))
}

fn required<'a>(args: &[&'a str], index: usize, what: &str) -> Result<&'a str, String> {
    args.get(index)
        .copied()
        .ok_or_else(|| format!("{what} is missing"))
}

fn secret_id(args: &[&str], index: usize) -> Result<i64, String> {
    let raw = required(args, index, "secret id")?;
    raw.parse()
        .map_err(|_| format!("secret id must be a number, got {raw:?}"))
}

fn secret_type(args: &[&str], index: usize) -> Result<SecretType, String> {
    required(args, index, "secret type")?
        .parse()
        .map_err(|e: keeper_core::types::UnknownSecretType| e.to_string())
}

fn payload_fields(secret_type: SecretType, fields: &[&str]) -> Result<SecretPayload, String> {
    let payload = match secret_type {
        SecretType::LoginPass => SecretPayload::LoginPass(LoginPass {
            login: required(fields, 0, "login")?.to_string(),
            password: required(fields, 1, "password")?.into(),
        }),
        SecretType::Text => {
            if fields.is_empty() {
                return Err("text is missing".to_string());
            }
            SecretPayload::Text(TextNote {
                text: fields.join(" "),
            })
        }
        SecretType::Card => SecretPayload::Card(Card {
            card_number: required(fields, 0, "card number")?.to_string(),
            cvv: required(fields, 1, "CVV")?.into(),
            due: required(fields, 2, "due date")?.to_string(),
        }),
        SecretType::Binary => return Err("binary secrets take a file path".to_string()),
    };
    Ok(payload)
}
