//! Standard-error sink for `tidal-log`.

use std::fmt;
use std::io::Write;

use tidal_log::LogLevel;

/// Writes one `[LEVEL] message` line per call.
fn stderr_sink(level: LogLevel, args: fmt::Arguments<'_>) {
    let mut out = std::io::stderr().lock();
    // Nowhere left to report a failed log write.
    let _ = write_line(&mut out, level, args);
}

fn write_line(
    out: &mut impl Write,
    level: LogLevel,
    args: fmt::Arguments<'_>,
) -> std::io::Result<()> {
    writeln!(out, "[{}] {}", level.name(), args)
}

/// Routes all `tidal-log` output to standard error at `level` and below.
pub fn init(level: LogLevel) {
    tidal_log::set_max_level(level);
    // SAFETY: `stderr_sink` only takes the process-wide stderr lock.
    unsafe { tidal_log::set_log_fn(stderr_sink) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let mut buf = Vec::new();
        write_line(&mut buf, LogLevel::Warn, format_args!("ring {} of {}", 3, 4)).unwrap();
        assert_eq!(buf, b"[WARN ] ring 3 of 4\n");
    }

    #[test]
    fn fixed_width_levels() {
        let mut buf = Vec::new();
        write_line(&mut buf, LogLevel::Error, format_args!("x")).unwrap();
        write_line(&mut buf, LogLevel::Info, format_args!("x")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let widths: Vec<usize> = text.lines().map(|l| l.find(']').unwrap()).collect();
        assert_eq!(widths, [6, 6]);
    }
}
