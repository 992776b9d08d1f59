use colored::Colorize;

/// Terminal printer. Quiet mode suppresses decoration and status lines
/// but never errors or requested data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer {
    pub quiet: bool,
}

impl Printer {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn success(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {}", "✓".green(), msg);
        }
    }

    pub fn warning(&self, msg: &str) {
        if !self.quiet {
            println!("  {} {}", "⚠".yellow(), msg);
        }
    }

    pub fn header(&self, msg: &str) {
        if !self.quiet {
            println!("\n{}", msg.bold());
        }
    }

    /// Requested data: printed even in quiet mode.
    pub fn data(&self, line: &str) {
        println!("{line}");
    }
}

/// Print an error message. Always shown.
pub fn error(msg: &str) {
    eprintln!("  {} {}", "✗".red(), msg);
}
