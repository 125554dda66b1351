//! Display recent log entries from the application.

use anyhow::anyhow;
use std::fs;

use crate::logging::{log_dir, rotated_logs};

const DEFAULT_LINES: usize = 50;

/// Prints the last lines of the most recent log file.
///
/// # Errors
/// - If the log directory cannot be determined
/// - If the log file cannot be read
pub fn handle_logs() -> anyhow::Result<()> {
    let log_dir = log_dir()?;

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some((log_file, _)) = rotated_logs(&log_dir)?
        .into_iter()
        .max_by_key(|(_, modified)| *modified)
    else {
        println!("No log files found in: {}", log_dir.display());
        println!("Run 'sgram' to generate logs.");
        return Ok(());
    };

    let content =
        fs::read_to_string(&log_file).map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let lines: Vec<&str> = content.lines().collect();
    let tail = tail(&lines, DEFAULT_LINES);

    println!();
    if tail.len() < lines.len() {
        println!("Showing last {} of {} lines:", tail.len(), lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in tail {
        println!("{line}");
    }

    Ok(())
}

fn tail<'a, T>(lines: &'a [T], count: usize) -> &'a [T] {
    &lines[lines.len().saturating_sub(count)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail() {
        let lines: Vec<usize> = (0..120).collect();
        assert_eq!(tail(&lines, DEFAULT_LINES).len(), 50);
        assert_eq!(tail(&lines, DEFAULT_LINES)[0], 70);
        assert_eq!(tail(&lines[..3], DEFAULT_LINES), &[0, 1, 2]);
    }
}
