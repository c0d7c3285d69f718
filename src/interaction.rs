//! User interaction for the authorization step
//!
//! The oob flow needs the human twice: once to authorize in a browser, once
//! to paste the resulting code back into the terminal. Both sides live
//! behind a trait so the flow driver can be exercised with stubs.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};

/// Bridges the human into the authorization flow.
pub trait Interaction {
    /// Surface the authorization URL to the user.
    ///
    /// A launch failure aborts the whole acquisition: with no browser there
    /// is no way to obtain a code in this flow.
    fn present_authorization(&self, url: &str) -> Result<()>;

    /// Prompt for and read the authorization code.
    ///
    /// Returns the raw line as entered, trailing newline included; trimming
    /// is the flow driver's decision, not the reader's.
    fn prompt_for_code(&self) -> Result<String>;
}

/// Production interaction: default system browser plus stdin/stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleInteraction;

impl Interaction for ConsoleInteraction {
    fn present_authorization(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| Error::Browser(format!("opening {url}: {e}")))
    }

    fn prompt_for_code(&self) -> Result<String> {
        let mut stdout = std::io::stdout();
        write!(stdout, "Enter authorization code: ")
            .and_then(|_| stdout.flush())
            .map_err(|e| Error::Io(format!("writing prompt: {e}")))?;

        let mut code = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut code)
            .map_err(|e| Error::Io(format!("reading authorization code: {e}")))?;
        Ok(code)
    }
}
