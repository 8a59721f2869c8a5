//! Resolve a job role to a concrete backend.

use crate::backend::{Backend, CloudBackend, LocalBackend, RemoteBackend, RemoteParams};
use crate::error::{Error, Result};
use crate::job::{BackendKind, DEFAULT_SFTP_PORT, JobSpec, PROMPT_SENTINEL, Role};
use crate::registry::{SessionKey, SessionRegistry};

/// Source of interactively entered credentials.
///
/// Called only for fields set to [`PROMPT_SENTINEL`].
pub trait CredentialPrompt {
    /// Ask for the login name for `endpoint` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if no answer can be collected.
    fn username(&self, endpoint: &str) -> Result<String>;

    /// Ask for the password of `username` at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Prompt`] if no answer can be collected.
    fn password(&self, username: &str, endpoint: &str) -> Result<String>;
}

/// Prompt for non-interactive contexts: every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl CredentialPrompt for NoPrompt {
    fn username(&self, endpoint: &str) -> Result<String> {
        Err(Error::Prompt(format!(
            "username for {endpoint} requested but no interactive prompt is available"
        )))
    }

    fn password(&self, username: &str, endpoint: &str) -> Result<String> {
        Err(Error::Prompt(format!(
            "password for {username}@{endpoint} requested but no interactive prompt is available"
        )))
    }
}

/// Build the backend declared for `role` in `spec`.
///
/// Unknown or missing type keys resolve to the local disk. Remote roles get
/// their connection from `registry`. A username set to `"prompt"` is asked
/// for through `prompt` first; a password set to `"prompt"` is asked for only
/// when the registry has no connection for that address, user, and port yet.
/// The returned backend is not opened yet.
///
/// # Errors
///
/// Returns [`Error::Config`] if a remote role lacks an address, username, or
/// password, and [`Error::Prompt`] if interactive entry fails.
pub fn resolve(
    role: Role,
    spec: &JobSpec,
    registry: &mut SessionRegistry,
    prompt: &dyn CredentialPrompt,
) -> Result<Backend> {
    let role_spec = spec.effective_role(role);
    let kind = role_spec.backend_kind();
    tracing::debug!(role = role.as_str(), backend = kind.as_str(), "resolving backend");

    match kind {
        BackendKind::Local => Ok(Backend::Local(LocalBackend::new())),
        BackendKind::Cloud => Ok(Backend::Cloud(CloudBackend::new())),
        BackendKind::Sftp => {
            let missing = |field: &str| {
                Error::config(format!(
                    "sftp backend for role '{}' requires '{field}'",
                    role.as_str()
                ))
            };

            let address = role_spec
                .address
                .clone()
                .filter(|a| !a.trim().is_empty())
                .ok_or_else(|| missing("address"))?;
            let port = role_spec.port.unwrap_or(DEFAULT_SFTP_PORT);
            let endpoint = format!("{address}:{port}");

            let username = match role_spec.username.as_deref() {
                Some(PROMPT_SENTINEL) => prompt.username(&endpoint)?,
                Some(name) => name.to_owned(),
                None => return Err(missing("username")),
            };
            let password = role_spec.password.as_deref().ok_or_else(|| missing("password"))?;

            let key = SessionKey {
                address,
                username,
                port,
            };
            if let Some(link) = registry.get(&key) {
                tracing::debug!(endpoint = %endpoint, "reusing registered connection");
                return Ok(Backend::Remote(RemoteBackend::new(link)));
            }

            let password = match password {
                PROMPT_SENTINEL => prompt.password(&key.username, &endpoint)?,
                secret => secret.to_owned(),
            };
            let link = registry.connection(RemoteParams {
                address: key.address,
                port: key.port,
                username: key.username,
                password,
            });
            Ok(Backend::Remote(RemoteBackend::new(link)))
        }
    }
}
