//! One-shot commands over the tunnel manager API

pub mod configure;
pub mod logs;
pub mod providers;
pub mod tunnels;

use console::style;
use tunnelmgr_common::StatusMessage;

/// Print a server status body; an application error is shown, not returned
pub(crate) fn print_status(status: &StatusMessage) {
    print_result(status, status.message());
}

/// Print `success` unless the server reports an error
pub(crate) fn print_result(status: &StatusMessage, success: &str) {
    println!("{}", result_line(status, success));
}

pub(crate) fn result_line(status: &StatusMessage, success: &str) -> String {
    if status.is_error() {
        format!("{} {}", style("✗").red().bold(), style(status.message()).red())
    } else {
        format!("{} {}", style("✓").green().bold(), success)
    }
}
