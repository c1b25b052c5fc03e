#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Current-user lookup backed by git configuration and the environment.

use std::path::{Path, PathBuf};

use git2::{Config, Repository};
use reviewpad_commands::UserResolver;
use reviewpad_registry::ReviewConfig;

const DEFAULT_ENV_VARS: &[&str] = &["USER", "USERNAME"];

/// Reads an environment variable.
pub type EnvLookup = fn(&str) -> Option<String>;

fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

/// Errors looking up the git user name.
#[derive(Debug, thiserror::Error)]
pub enum UserResolveError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: String },

    #[error("user.name is not set")]
    NotConfigured,
}

/// Where to read `user.name` from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitConfigSource {
    /// Skip git entirely.
    Disabled,
    /// The user's global and system git configuration.
    Global,
    /// The configuration of the repository containing this path, which
    /// layers the repository's own settings over the global ones.
    Repository(PathBuf),
}

/// Resolves the current user from git, then the environment, then a
/// fallback name.
#[derive(Debug, Clone)]
pub struct SystemUserResolver {
    git: GitConfigSource,
    env_vars: Vec<String>,
    env: EnvLookup,
    fallback: String,
}

impl SystemUserResolver {
    #[must_use]
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            git: GitConfigSource::Global,
            env_vars: DEFAULT_ENV_VARS.iter().map(ToString::to_string).collect(),
            env: process_env,
            fallback: fallback.into(),
        }
    }

    /// Use the configured fallback author and the workspace repository when
    /// a workspace root is set.
    #[must_use]
    pub fn from_config(config: &ReviewConfig) -> Self {
        let resolver = Self::new(config.fallback_author.clone());
        match &config.workspace_root {
            Some(root) => resolver.with_repository(root),
            None => resolver,
        }
    }

    #[must_use]
    pub fn with_repository(self, path: impl Into<PathBuf>) -> Self {
        self.with_git(GitConfigSource::Repository(path.into()))
    }

    #[must_use]
    pub fn with_git(mut self, git: GitConfigSource) -> Self {
        self.git = git;
        self
    }

    /// Replace the environment variables consulted after git.
    #[must_use]
    pub fn with_env_vars<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env_vars = vars.into_iter().map(Into::into).collect();
        self
    }

    /// Read environment variables through `env` instead of the process
    /// environment.
    #[must_use]
    pub fn with_env_lookup(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    /// Read `user.name` from the configured git source.
    ///
    /// # Errors
    ///
    /// * If git is disabled or `user.name` is unset or blank
    /// * If the repository can't be found or its config can't be read
    pub fn git_user_name(&self) -> Result<String, UserResolveError> {
        let config = match &self.git {
            GitConfigSource::Disabled => return Err(UserResolveError::NotConfigured),
            GitConfigSource::Global => Config::open_default()?,
            GitConfigSource::Repository(path) => repository_config(path)?,
        };

        let name = match config.get_string("user.name") {
            Ok(name) => name,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                return Err(UserResolveError::NotConfigured);
            }
            Err(e) => return Err(e.into()),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(UserResolveError::NotConfigured);
        }
        Ok(name.to_string())
    }

    fn env_user_name(&self) -> Option<String> {
        self.env_vars.iter().find_map(|var| {
            (self.env)(var)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
    }
}

fn repository_config(path: &Path) -> Result<Config, UserResolveError> {
    let repo = Repository::discover(path).map_err(|e| UserResolveError::NotARepository {
        path: format!("{}: {e}", path.display()),
    })?;
    Ok(repo.config()?)
}

impl UserResolver for SystemUserResolver {
    fn current_user(&self) -> String {
        match self.git_user_name() {
            Ok(name) => return name,
            Err(UserResolveError::NotConfigured) => {}
            Err(e) => log::debug!("Falling back from git user lookup: {e}"),
        }

        self.env_user_name()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
