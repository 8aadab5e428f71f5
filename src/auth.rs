use anyhow::{Context, Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "PWDIGEST_PASSWORD";

/// Reads the password from the environment, piped stdin or a TTY prompt, in that order.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  PWDIGEST_PASSWORD="hunter2" pwdigest hash argon2
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    //  printf "%s" "hunter2" | pwdigest verify '$2b$...'
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin()
            .lock()
            .read_line(&mut buf)
            .context("failed to read password from stdin")?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("no password provided")
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_only_line_endings() {
        let mut s = String::from(" pass word \r\n");
        trim_newline(&mut s);
        assert_eq!(s, " pass word ");
    }
}
