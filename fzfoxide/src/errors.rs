use fzfoxide_frecency::FrecencyError;
use tracing::debug;

/// Print an error for the shell user without stack traces.
///
/// A failed lookup is an ordinary outcome (the wrapper falls back to a plain
/// `cd`), so it is only logged at debug level besides the message itself.
pub fn display_user_error(err: &anyhow::Error) {
    match err.downcast_ref::<FrecencyError>() {
        Some(e) if e.is_not_found() => debug!("lookup failed: {}", e),
        _ => debug!("command failed: {:?}", err),
    }
    eprintln!("fzfoxide: {}", err);
}
