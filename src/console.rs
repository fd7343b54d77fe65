use crate::grading::Tone;
use crossterm::style::Stylize;
use std::io::IsTerminal;
use unicode_width::UnicodeWidthStr;

pub const ANSI_REGEX_PATTERN: &str = r"\x1b\[[0-9;?]*[a-zA-Z]|\x1b].*?(\x1b\\|[\x07])";

pub fn strip_ansi_codes(s: &str) -> String {
    static RE: std::sync::LazyLock<Option<regex::Regex>> =
        std::sync::LazyLock::new(|| regex::Regex::new(ANSI_REGEX_PATTERN).ok());
    match RE.as_ref() {
        Some(re) => re.replace_all(s, "").to_string(),
        None => s.to_string(),
    }
}

pub fn get_terminal_width() -> usize {
    static TERMINAL_WIDTH: std::sync::LazyLock<usize> = std::sync::LazyLock::new(|| {
        // 1. Check XMLORG_COLUMNS
        if let Ok(w) = std::env::var("XMLORG_COLUMNS").map(|s| s.parse().unwrap_or(0))
            && w > 0
        {
            return w;
        }

        // 2. Check COLUMNS
        if let Ok(w) = std::env::var("COLUMNS").map(|s| s.parse().unwrap_or(0))
            && w > 0
        {
            return w;
        }

        // 3. System TTY (Only called if env vars are missing)
        if is_stdout_terminal()
            && let Ok((w, _)) = crossterm::terminal::size()
        {
            return w as usize;
        }

        // 4. Default Fallback
        80
    });

    *TERMINAL_WIDTH
}

/// Box-drawn panel with a centred title and centred lines.
pub fn panel_lines(title: &str, lines: &[String], width: usize) -> Vec<String> {
    let inner_width = width.saturating_sub(2);
    let title_fmt = if !title.is_empty() {
        format!(" {} ", title)
    } else {
        "".to_string()
    };

    let title_width = UnicodeWidthStr::width(title_fmt.as_str());
    let total_dashes = inner_width.saturating_sub(title_width);
    let left_dashes = total_dashes / 2;
    let right_dashes = total_dashes - left_dashes;

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!(
        "╭{}{}{}╮",
        "─".repeat(left_dashes),
        title_fmt,
        "─".repeat(right_dashes)
    ));

    for line in lines {
        let stripped = strip_ansi_codes(line);
        let visible_len = UnicodeWidthStr::width(stripped.as_str());
        let total_padding = inner_width.saturating_sub(visible_len);
        let left_padding = total_padding / 2;
        let right_padding = total_padding - left_padding;

        out.push(format!(
            "│{}{}{}│",
            " ".repeat(left_padding),
            line,
            " ".repeat(right_padding)
        ));
    }

    out.push(format!("╰{}╯", "─".repeat(inner_width)));
    out
}

pub fn is_stdout_terminal() -> bool {
    if std::env::var("XMLORG_FORCE_TTY").is_ok() {
        return true;
    }
    std::io::stdout().is_terminal()
}

pub fn is_stderr_terminal() -> bool {
    std::io::stderr().is_terminal()
}

/// Colours `text` by tone when `styled`, otherwise returns it unchanged.
pub fn paint(text: &str, tone: Tone, styled: bool) -> String {
    if !styled {
        return text.to_string();
    }
    match tone {
        Tone::Good => text.green().to_string(),
        Tone::Warn => text.yellow().to_string(),
        Tone::Bad => text.red().bold().to_string(),
    }
}

pub fn heading(text: &str, styled: bool) -> String {
    if styled {
        text.cyan().bold().to_string()
    } else {
        text.to_string()
    }
}

pub fn dim(text: &str, styled: bool) -> String {
    if styled {
        text.dim().to_string()
    } else {
        text.to_string()
    }
}

pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3 + 1);
    if n < 0 {
        result.push('-');
    }

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Human-readable byte count using binary units, one decimal above bytes.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
