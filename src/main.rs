//! regionhl - print a file with syntax highlighting

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use crossterm::queue;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use log::{LevelFilter, Log, Metadata, Record};

use regionhl::{Buffer, Color, EngineConfig, HighlightError, LanguageManager, Result, Span, Style, StyleScheme};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line
#[derive(Debug, Default)]
struct Options {
    lang: Option<String>,
    grammar: Option<PathBuf>,
    config: Option<PathBuf>,
    width: Option<usize>,
    bracket: Option<usize>,
    list: bool,
    check: bool,
    verbose: bool,
    file: Option<PathBuf>,
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let Some(opts) = parse_args(&args)? else {
        return Ok(());
    };

    init_logger(if opts.verbose { LevelFilter::Debug } else { LevelFilter::Warn });

    let config = match &opts.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load(),
    };

    let mut manager = LanguageManager::new();
    let loaded = match &opts.grammar {
        Some(path) => Some(manager.load_grammar_file(path)?),
        None => None,
    };

    if opts.list {
        for name in manager.list_languages() {
            println!("{}", name);
        }
        return Ok(());
    }

    if opts.check {
        for name in manager.list_languages() {
            manager.require_language(name)?.validate()?;
            println!("{}: ok", name);
        }
        return Ok(());
    }

    let path = opts
        .file
        .ok_or_else(|| HighlightError::Message("No input file (see --help)".to_string()))?;
    let mut buffer = Buffer::from_file(&path, config)?;

    match opts.lang.or(loaded) {
        Some(name) => buffer.set_language(&manager, &name)?,
        None => {
            if buffer.detect_language(&manager).is_none() {
                log::info!("no language for {}, printing plain", path.display());
            }
        }
    }

    if let Some(pos) = opts.bracket {
        match buffer.matching_bracket(pos) {
            Some(partner) => println!("{}", partner),
            None => println!("no match"),
        }
        return Ok(());
    }

    let len = buffer.len_chars();
    buffer.request_region(0..len);
    let quanta = buffer.run_until_idle();
    log::debug!("analysis finished in {} quanta", quanta);

    let spans = buffer.highlight(0..len);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_highlighted(&mut out, buffer.text(), &spans, &StyleScheme::default(), opts.width)?;
    out.flush()?;

    Ok(())
}

/// Parse arguments; `None` means help or version was printed
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut opts = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                print_version();
                return Ok(None);
            }
            "--verbose" | "-v" => opts.verbose = true,
            "--list" => opts.list = true,
            "--check" => opts.check = true,
            "--lang" => opts.lang = Some(value(&mut iter, arg)?.to_string()),
            "--grammar" => opts.grammar = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--config" => opts.config = Some(PathBuf::from(value(&mut iter, arg)?)),
            "--width" => opts.width = Some(number(value(&mut iter, arg)?, arg)?),
            "--bracket" => opts.bracket = Some(number(value(&mut iter, arg)?, arg)?),
            s if s.starts_with('-') => {
                return Err(HighlightError::Message(format!("Unknown option: {}", s)));
            }
            _ => {
                if opts.file.is_some() {
                    return Err(HighlightError::Message("Only one file may be given".to_string()));
                }
                opts.file = Some(PathBuf::from(arg));
            }
        }
    }

    Ok(Some(opts))
}

fn value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<&'a str> {
    iter.next()
        .map(|s| s.as_str())
        .ok_or_else(|| HighlightError::Message(format!("{} needs a value", flag)))
}

fn number(s: &str, flag: &str) -> Result<usize> {
    s.parse()
        .map_err(|_| HighlightError::Message(format!("{} expects a number, got '{}'", flag, s)))
}

/// Write `text` with ANSI styling, cutting lines at `width` display columns
fn print_highlighted(
    out: &mut impl Write,
    text: &str,
    spans: &[Span],
    scheme: &StyleScheme,
    width: Option<usize>,
) -> io::Result<()> {
    let mut spans = spans.iter().peekable();
    let mut current: Option<&Span> = None;
    let mut run = String::new();
    let mut column = 0;

    for (pos, ch) in text.chars().enumerate() {
        if current.map_or(false, |s| pos >= s.end) {
            flush_run(out, &mut run, current.map(|s| scheme.resolve(&s.style)))?;
            current = None;
        }
        while spans.peek().map_or(false, |s| s.end <= pos) {
            spans.next();
        }
        if current.is_none() && spans.peek().map_or(false, |s| s.start <= pos) {
            flush_run(out, &mut run, None)?;
            current = spans.next();
        }

        if ch == '\n' {
            column = 0;
            run.push(ch);
            continue;
        }
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(1);
        if let Some(max) = width {
            if column + ch_width > max {
                continue;
            }
        }
        column += ch_width;
        run.push(ch);
    }

    flush_run(out, &mut run, current.map(|s| scheme.resolve(&s.style)))
}

/// Emit the pending run in `style`, then reset
fn flush_run(out: &mut impl Write, run: &mut String, style: Option<Style>) -> io::Result<()> {
    if run.is_empty() {
        return Ok(());
    }
    match style {
        Some(style) if !style.is_default() => {
            if style.fg != Color::Default {
                queue!(out, SetForegroundColor(term_color(style.fg)))?;
            }
            if style.bg != Color::Default {
                queue!(out, SetBackgroundColor(term_color(style.bg)))?;
            }
            if style.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            if style.italic {
                queue!(out, SetAttribute(Attribute::Italic))?;
            }
            if style.underline {
                queue!(out, SetAttribute(Attribute::Underlined))?;
            }
            queue!(out, Print(run.as_str()), SetAttribute(Attribute::Reset), ResetColor)?;
        }
        _ => queue!(out, Print(run.as_str()))?,
    }
    run.clear();
    Ok(())
}

fn term_color(color: Color) -> TermColor {
    match color {
        Color::Default => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::White => TermColor::Grey,
        Color::BrightBlack => TermColor::DarkGrey,
        Color::BrightRed => TermColor::Red,
        Color::BrightGreen => TermColor::Green,
        Color::BrightYellow => TermColor::Yellow,
        Color::BrightBlue => TermColor::Blue,
        Color::BrightMagenta => TermColor::Magenta,
        Color::BrightCyan => TermColor::Cyan,
        Color::BrightWhite => TermColor::White,
    }
}

/// Plain stderr logger
struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}: {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

fn init_logger(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn print_usage() {
    println!("regionhl {} - incremental syntax highlighter", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: regionhl [OPTIONS] FILE");
    println!();
    println!("Options:");
    println!("  --lang NAME        Highlight as NAME instead of detecting");
    println!("  --grammar PATH     Load a grammar from a TOML file");
    println!("  --config PATH      Read engine settings from PATH");
    println!("  --width N          Cut lines at N display columns");
    println!("  --bracket OFFSET   Print the bracket matching the one before OFFSET");
    println!("  --list             List known languages");
    println!("  --check            Compile every grammar and report errors");
    println!("  -v, --verbose      Log debug output to stderr");
    println!("  -h, --help         Show this help message");
    println!("  -V, --version      Show version information");
    println!();
    println!("Engine settings are read from ~/.regionhl.toml when --config is not given.");
}

fn print_version() {
    println!("regionhl {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use regionhl::StyleId;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let opts = parse_args(&args(&["--lang", "C", "--width", "40", "-v", "a.c"]))
            .unwrap()
            .unwrap();
        assert_eq!(opts.lang.as_deref(), Some("C"));
        assert_eq!(opts.width, Some(40));
        assert!(opts.verbose);
        assert_eq!(opts.file, Some(PathBuf::from("a.c")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&["--width"])).is_err());
        assert!(parse_args(&args(&["--bracket", "x"])).is_err());
        assert!(parse_args(&args(&["--nope"])).is_err());
        assert!(parse_args(&args(&["a", "b"])).is_err());
    }

    #[test]
    fn test_plain_output_and_width() {
        let mut out = Vec::new();
        print_highlighted(&mut out, "abcdef\nxy\n", &[], &StyleScheme::empty(), Some(3)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "abc\nxy\n");
    }

    #[test]
    fn test_wide_chars_truncate() {
        let mut out = Vec::new();
        print_highlighted(&mut out, "日本語", &[], &StyleScheme::empty(), Some(5)).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "日本");
    }

    #[test]
    fn test_styled_output_keeps_text() {
        let mut out = Vec::new();
        let spans = [Span::new(0, 3, StyleId::new("keyword"))];
        print_highlighted(&mut out, "int x;", &spans, &StyleScheme::default(), None).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("int"));
        assert!(printed.ends_with(" x;"));
        assert!(printed.contains('\u{1b}'));
    }
}
