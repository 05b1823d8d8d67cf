//! Bling Connect - Main Entry Point
//!
//! Wires configuration, the file-backed session store and the Bling HTTP
//! client into the session core, then runs a single command.

use std::error::Error;
use std::sync::Arc;

use bling_application::{ContactsService, NavigationGuard, TokenManager};
use bling_domain::{AuthorizationCode, ClientCredentials};
use bling_infrastructure::{
    BlingConfig, FileKeyValueStore, ReqwestBlingClient, SystemClock, init_tracing,
};

const USAGE: &str = "\
usage: bling-connect <command>

commands:
  status                              show the stored session
  authorize <code>                    store an authorization code
  credentials <client_id> <secret>    store client credentials
  exchange                            exchange the stored code for tokens
  refresh                             refresh the stored access token
  contacts                            list contacts
  test                                check the API connection
  logout                              remove the stored tokens
  guard <path>                        decide whether <path> may be opened";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Authorize(String),
    Credentials {
        client_id: String,
        client_secret: String,
    },
    Exchange,
    Refresh,
    Contacts,
    Test,
    Logout,
    Guard(String),
    Help,
}

#[derive(Debug, thiserror::Error)]
enum UsageError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),

    #[error("{command} expects {expected} argument(s)")]
    WrongArity {
        command: &'static str,
        expected: usize,
    },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, UsageError> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Self::Help);
        };

        let arity = |command: &'static str, expected: usize| {
            if rest.len() == expected {
                Ok(())
            } else {
                Err(UsageError::WrongArity { command, expected })
            }
        };

        match name.as_str() {
            "status" => arity("status", 0).map(|()| Self::Status),
            "authorize" => arity("authorize", 1).map(|()| Self::Authorize(rest[0].clone())),
            "credentials" => arity("credentials", 2).map(|()| Self::Credentials {
                client_id: rest[0].clone(),
                client_secret: rest[1].clone(),
            }),
            "exchange" => arity("exchange", 0).map(|()| Self::Exchange),
            "refresh" => arity("refresh", 0).map(|()| Self::Refresh),
            "contacts" => arity("contacts", 0).map(|()| Self::Contacts),
            "test" => arity("test", 0).map(|()| Self::Test),
            "logout" => arity("logout", 0).map(|()| Self::Logout),
            "guard" => arity("guard", 1).map(|()| Self::Guard(rest[0].clone())),
            "help" | "-h" | "--help" => Ok(Self::Help),
            other => Err(UsageError::UnknownCommand(other.to_string())),
        }
    }
}

/// Session services built once per invocation.
struct Session {
    tokens: TokenManager,
    contacts: ContactsService,
    guard: NavigationGuard,
}

impl Session {
    fn new(config: BlingConfig) -> Result<Self, Box<dyn Error>> {
        let store = Arc::new(FileKeyValueStore::new(config.store_path.clone()));
        let client = Arc::new(ReqwestBlingClient::new(config)?);
        let tokens = TokenManager::new(store, client.clone(), Arc::new(SystemClock::new()));

        Ok(Self {
            contacts: ContactsService::new(tokens.clone(), client),
            guard: NavigationGuard::new(tokens.clone()),
            tokens,
        })
    }

    async fn run(&self, command: Command) -> Result<String, Box<dyn Error>> {
        let output = match command {
            Command::Help => USAGE.to_string(),
            Command::Status => {
                let state = self.tokens.session_state().await?;
                let scope = self.tokens.granted_scope().await?;
                match scope {
                    Some(scope) => format!("{}\nscope: {scope}", state.message()),
                    None => state.message().to_string(),
                }
            }
            Command::Authorize(code) => {
                let code = AuthorizationCode::new(code)?;
                self.tokens.store_authorization_code(&code).await?;
                "Authorization code stored".to_string()
            }
            Command::Credentials {
                client_id,
                client_secret,
            } => {
                let credentials = ClientCredentials::new(client_id, client_secret)?;
                self.tokens.save_client_credentials(&credentials).await?;
                "Client credentials stored".to_string()
            }
            Command::Exchange => {
                let token = self.tokens.exchange_stored_code(None).await?;
                format!("Access token obtained, expires in {}s", token.expires_in)
            }
            Command::Refresh => {
                let token = self.tokens.refresh_stored_token(None).await?;
                format!("Access token refreshed, expires in {}s", token.expires_in)
            }
            Command::Contacts => {
                let contacts = self.contacts.list_contacts().await?;
                serde_json::to_string_pretty(&contacts)?
            }
            Command::Test => {
                let report = self.contacts.test_connection().await?;
                match report.data {
                    Some(data) => format!(
                        "{}\n{}",
                        report.message,
                        serde_json::to_string_pretty(&data)?
                    ),
                    None => report.message,
                }
            }
            Command::Logout => {
                self.tokens.clear_credentials().await?;
                "Logged out".to_string()
            }
            Command::Guard(path) => {
                let decision = self.guard.check(&path).await?;
                decision
                    .login_location()
                    .map_or_else(|| "allow".to_string(), |location| format!("redirect {location}"))
            }
        };
        Ok(output)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args).inspect_err(|_| eprintln!("{USAGE}\n"))?;

    let config = BlingConfig::from_env()?;
    tracing::debug!(base_url = %config.base_url, store = %config.store_path.display(), "configuration loaded");

    let session = Session::new(config)?;
    println!("{}", session.run(command).await?);

    Ok(())
}
