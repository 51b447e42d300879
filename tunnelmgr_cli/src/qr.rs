//! QR codes for tunnel URLs

use console::style;
use qrcode::QrCode;

/// Render `url` as text rows, empty if the URL cannot be encoded
pub fn render_lines(url: &str) -> Vec<String> {
    let code = match QrCode::new(url) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!("Failed to generate QR code: {}", e);
            return Vec::new();
        }
    };

    code.render::<char>()
        .quiet_zone(false)
        .module_dimensions(2, 1)
        .build()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Print a QR code for the given URL
pub fn print_qr_code(url: &str) {
    let lines = render_lines(url);
    if lines.is_empty() {
        return;
    }

    println!();
    println!("{}", style("  Scan to open:").dim());
    for line in lines {
        println!("  {}", line);
    }
}
