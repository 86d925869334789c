use std::fmt::Write;

use crate::domain::ContainerSummary;

/// Renders the `list` output table. An empty slice renders a friendly
/// message instead of a bare header.
pub fn render(rows: &[ContainerSummary]) -> String {
    if rows.is_empty() {
        return "\n  ⚠ No PostgreSQL containers found\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n  {:<20} {:<28} {:<15} {}",
        "NAME", "STATUS", "PORT", "CONTAINER ID"
    );
    let _ = writeln!(out, "  {}", "─".repeat(80));

    for row in rows {
        let status = if row.is_running() {
            let uptime = row.status.strip_prefix("Up ").unwrap_or("");
            format!("🟢 Running {uptime}")
        } else {
            "🔴 Stopped".to_string()
        };
        let _ = writeln!(
            out,
            "  {:<20} {:<28} {:<15} {}",
            row.name,
            status,
            row.port.as_deref().unwrap_or("N/A"),
            row.short_id
        );
    }

    out
}
