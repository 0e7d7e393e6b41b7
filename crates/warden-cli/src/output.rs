use console::{style, StyledObject};

use warden_core::record::{ServiceRecord, ServiceStatus};

/// Styled rendering of one status value
pub fn styled_status(status: ServiceStatus) -> StyledObject<String> {
    let text = status.to_string();
    match status {
        ServiceStatus::Running => style(text).green(),
        ServiceStatus::Starting | ServiceStatus::Stopping | ServiceStatus::Installing
        | ServiceStatus::Uninstalling => style(text).yellow(),
        ServiceStatus::Error => style(text).red(),
        ServiceStatus::Paused => style(text).cyan(),
        ServiceStatus::Stopped | ServiceStatus::NotInstalled => style(text).dim(),
    }
}

/// Print one record as a table row
pub fn print_record(record: &ServiceRecord) {
    println!(
        "{:<24} {:<14} deps:{:<2} {}",
        record.name,
        styled_status(record.status),
        record.dependencies.len(),
        style(record.id.to_string()).dim(),
    );
}

/// Print a full snapshot
pub fn print_snapshot(records: &[ServiceRecord]) {
    if records.is_empty() {
        println!("{}", style("no services registered").dim());
        return;
    }
    for record in records {
        print_record(record);
    }
}
