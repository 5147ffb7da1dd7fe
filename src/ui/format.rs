use nixlayer::Backup;

/// Human-readable byte count (`512 B`, `1.5 KiB`, `3.2 MiB`).
pub fn size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// One line of `backup list`.
pub fn backup_row(backup: &Backup) -> String {
    format!(
        "{}  {:<12}  {:>10}  {}",
        backup.timestamp.as_datetime().format("%Y-%m-%d %H:%M:%S"),
        backup.label.as_deref().unwrap_or("-"),
        size(backup.size),
        backup.file_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes() {
        assert_eq!(size(0), "0 B");
        assert_eq!(size(1023), "1023 B");
        assert_eq!(size(1536), "1.5 KiB");
        assert_eq!(size(5 * 1024 * 1024), "5.0 MiB");
    }
}
