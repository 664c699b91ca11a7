//! Runs embedded `PostgreSQL` lifecycle operations for the test cluster.
//!
//! Usage:
//!
//! ```text
//! pg_worker <operation> <config-path>
//! ```
//!
//! The `operation` is `setup`, `start`, or `stop`. The JSON file at
//! `config-path` holds a [`WorkerPayload`] with the cluster settings and the
//! environment overrides to apply before `PostgreSQL` is touched, for example:
//!
//! ```json
//! {
//!   "environment": { "PG_SUPERUSER": "postgres", "TZ": null },
//!   "settings": {
//!     "version": "=16.4.0",
//!     "port": 15433,
//!     "username": "postgres",
//!     "password": "postgres",
//!     "data_dir": "/tmp/trackwell/data",
//!     "installation_dir": "/tmp/trackwell/install",
//!     "temporary": false,
//!     "timeout_secs": 30,
//!     "configuration": { "lc_messages": "C" },
//!     "trust_installation_dir": true
//!   }
//! }
//! ```
//!
//! `PostgreSQL` refuses to run as root, so a root caller is demoted to
//! `nobody` before any lifecycle call.

#[cfg(unix)]
use camino::{Utf8Path, Utf8PathBuf};
#[cfg(unix)]
use nix::unistd::{Uid, User, initgroups, setgid, setuid};
#[cfg(unix)]
use pg_embedded_setup_unpriv::ambient_dir_and_path;
#[cfg(unix)]
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
#[cfg(unix)]
use postgresql_embedded::{PostgreSQL, Status};
#[cfg(unix)]
use std::env;
#[cfg(unix)]
use std::ffi::CString;
#[cfg(unix)]
use std::io::Read;
#[cfg(unix)]
use thiserror::Error;
#[cfg(unix)]
use tokio::runtime::Builder;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
const UNPRIVILEGED_USER: &str = "nobody";

#[cfg(unix)]
#[derive(Debug, Error)]
enum WorkerError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("failed to read worker config: {0}")]
    ConfigRead(#[source] BoxError),
    #[error("failed to parse worker config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("settings conversion failed: {0}")]
    SettingsConversion(String),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to drop privileges: {0}")]
    PrivilegeDrop(String),
    #[error("postgres operation failed: {0}")]
    PostgresOperation(String),
}

#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
enum Operation {
    Setup,
    Start,
    Stop,
}

#[cfg(unix)]
impl Operation {
    fn parse(arg: &str) -> Result<Self, WorkerError> {
        match arg {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(WorkerError::InvalidArgs(format!(
                "unknown operation '{other}'; expected setup, start, or stop"
            ))),
        }
    }
}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    let args = collect_args()?;
    run_worker(args.into_iter()).map_err(Into::into)
}

#[cfg(unix)]
fn collect_args() -> Result<Vec<Utf8PathBuf>, WorkerError> {
    env::args_os()
        .map(|arg_os| {
            arg_os
                .into_string()
                .map(Utf8PathBuf::from)
                .map_err(|_| WorkerError::InvalidArgs("argument is not valid UTF-8".into()))
        })
        .collect()
}

#[cfg(unix)]
fn run_worker(args: impl Iterator<Item = Utf8PathBuf>) -> Result<(), WorkerError> {
    let (operation, config_path) = parse_args(args)?;
    let payload = load_payload(&config_path)?;
    drop_privileges_if_root(UNPRIVILEGED_USER)?;
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| WorkerError::SettingsConversion(err.to_string()))?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(WorkerError::RuntimeInit)?;
    apply_worker_environment(&payload.environment);

    let mut postgres = PostgreSQL::new(settings);
    runtime.block_on(async move {
        match operation {
            Operation::Setup => {
                postgres
                    .setup()
                    .await
                    .map_err(|err| WorkerError::PostgresOperation(err.to_string()))?;
                ensure_started(&mut postgres).await
            }
            Operation::Start => {
                ensure_started(&mut postgres).await?;
                // The server must outlive this process.
                std::mem::forget(postgres);
                Ok(())
            }
            Operation::Stop => postgres
                .stop()
                .await
                .map_err(|err| WorkerError::PostgresOperation(err.to_string())),
        }
    })
}

#[cfg(unix)]
fn parse_args(
    mut args: impl Iterator<Item = Utf8PathBuf>,
) -> Result<(Operation, Utf8PathBuf), WorkerError> {
    let _program = args.next();
    let operation = args
        .next()
        .ok_or_else(|| WorkerError::InvalidArgs("missing operation argument".into()))
        .and_then(|arg| Operation::parse(arg.as_str()))?;
    let config_path = args
        .next()
        .ok_or_else(|| WorkerError::InvalidArgs("missing config path argument".into()))?;
    if let Some(extra) = args.next() {
        return Err(WorkerError::InvalidArgs(format!(
            "unexpected extra argument: {extra}"
        )));
    }
    Ok((operation, config_path))
}

#[cfg(unix)]
fn load_payload(config_path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
    let bytes = read_config_file(config_path).map_err(WorkerError::ConfigRead)?;
    serde_json::from_slice(&bytes).map_err(WorkerError::ConfigParse)
}

#[cfg(unix)]
fn read_config_file(path: &Utf8Path) -> Result<Vec<u8>, BoxError> {
    let (dir, relative) = ambient_dir_and_path(path)?;
    let mut file = dir.open(relative.as_std_path())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(unix)]
fn drop_privileges_if_root(username: &str) -> Result<(), WorkerError> {
    if !Uid::effective().is_root() {
        return Ok(());
    }

    let user = User::from_name(username)
        .map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?
        .ok_or_else(|| WorkerError::PrivilegeDrop(format!("user '{username}' not found")))?;
    let user_name = CString::new(user.name.clone())
        .map_err(|err| WorkerError::PrivilegeDrop(format!("invalid user name: {err}")))?;
    initgroups(&user_name, user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setgid(user.gid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;
    setuid(user.uid).map_err(|err| WorkerError::PrivilegeDrop(err.to_string()))?;

    // SAFETY: the worker is single-threaded until the runtime is built.
    unsafe {
        env::set_var("HOME", user.dir);
        env::set_var("USER", user.name.clone());
        env::set_var("LOGNAME", user.name);
    }
    Ok(())
}

#[cfg(unix)]
fn apply_worker_environment(environment: &[(String, Option<PlainSecret>)]) {
    for (key, value) in environment {
        // SAFETY: the current-thread runtime has not started any task yet.
        unsafe {
            match value {
                Some(plain) => env::set_var(key, plain.expose()),
                None => env::remove_var(key),
            }
        }
    }
}

#[cfg(unix)]
async fn ensure_started(postgres: &mut PostgreSQL) -> Result<(), WorkerError> {
    if matches!(postgres.status(), Status::Started) {
        return Ok(());
    }
    postgres
        .start()
        .await
        .map_err(|err| WorkerError::PostgresOperation(err.to_string()))
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is not supported on non-Unix platforms".into())
}
