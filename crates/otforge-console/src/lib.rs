//! Colorful console output for learning and typology runs.
//!
//! Provides a custom `tracing` layer that formats ranking-engine events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Lifecycle events (learning and typology start/end)
//! - **DEBUG**: One line per learner pass and per RCD call
//! - **TRACE**: Strata placed and branches pruned

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static RUN_START_NANOS: AtomicU64 = AtomicU64::new(0);

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
/// Prints the banner and installs a subscriber unless one is already set.
/// `RUST_LOG` overrides the default `otforge_solver=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let mut builder = EnvFilter::builder();
        if let Ok(directive) = "otforge_solver=info".parse::<Directive>() {
            builder = builder.with_default_directive(directive);
        }
        let filter = builder.from_env_lossy();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(OtConsoleLayer)
            .try_init();
    });
}

fn mark_run_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    RUN_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = RUN_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
       _    __
  ___ | |_ / _| ___  _ __ __ _  ___
 / _ \| __| |_ / _ \| '__/ _` |/ _ \
| (_) | |_|  _| (_) | | | (_| |  __/
 \___/ \__|_|  \___/|_|  \__, |\___|
                         |___/
"#;

    let version_line = format!(
        "          v{} - Constraint ranking and factorial typology\n",
        VERSION
    );

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats ranking-engine events with colors.
pub struct OtConsoleLayer;

impl<S: Subscriber> Layer<S> for OtConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();

        if !target.starts_with("otforge_solver") && !target.starts_with("otforge::") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let level = *metadata.level();
        let output = format_event(&visitor, level);
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Debug, Default)]
struct EventVisitor {
    event: Option<String>,
    message: Option<String>,
    bias: Option<String>,
    reason: Option<String>,
    input: Option<String>,
    candidate: Option<u64>,
    residue: Option<u64>,
    competitions: Option<u64>,
    constraints: Option<u64>,
    pass: Option<u64>,
    passes: Option<u64>,
    mismatches: Option<u64>,
    new_ercs: Option<u64>,
    ercs: Option<u64>,
    rounds: Option<u64>,
    round: Option<u64>,
    size: Option<u64>,
    depth: Option<u64>,
    bounded: Option<u64>,
    languages: Option<u64>,
    nodes_explored: Option<u64>,
    branches_pruned: Option<u64>,
    duplicates: Option<u64>,
    elapsed_ms: Option<u64>,
    converged: Option<bool>,
    consistent: Option<bool>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        match field.name() {
            "event" => self.event = Some(s.trim_matches('"').to_string()),
            "message" => self.message = Some(s),
            "bias" => self.bias = Some(s.trim_matches('"').to_string()),
            "reason" => self.reason = Some(s.trim_matches('"').to_string()),
            "input" => self.input = Some(s.trim_matches('"').to_string()),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "competitions" => self.competitions = Some(value),
            "constraints" => self.constraints = Some(value),
            "pass" => self.pass = Some(value),
            "passes" => self.passes = Some(value),
            "mismatches" => self.mismatches = Some(value),
            "new_ercs" => self.new_ercs = Some(value),
            "ercs" => self.ercs = Some(value),
            "rounds" => self.rounds = Some(value),
            "round" => self.round = Some(value),
            "size" => self.size = Some(value),
            "depth" => self.depth = Some(value),
            "candidate" => self.candidate = Some(value),
            "residue" => self.residue = Some(value),
            "bounded" => self.bounded = Some(value),
            "languages" => self.languages = Some(value),
            "nodes_explored" => self.nodes_explored = Some(value),
            "branches_pruned" => self.branches_pruned = Some(value),
            "duplicates" => self.duplicates = Some(value),
            "elapsed_ms" => self.elapsed_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            "converged" => self.converged = Some(value),
            "consistent" => self.consistent = Some(value),
            _ => {}
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "message" => self.message = Some(value.to_string()),
            "bias" => self.bias = Some(value.to_string()),
            "reason" => self.reason = Some(value.to_string()),
            "input" => self.input = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "learn_start" => format_learn_start(v),
        "learn_end" => format_learn_end(v),
        "learn_failed" => format_learn_failed(v),
        "pass" => format_pass(v),
        "typology_start" => format_typology_start(v),
        "typology_end" => format_typology_end(v),
        "rcd" => format_rcd(v),
        "rcd_stratum" => format_stratum(v, level),
        "rcd_inconsistent" => format_inconsistent(v, level),
        "typology_prune" => format_prune(v, level),
        "" if level == Level::WARN => format_warning(v),
        _ => String::new(),
    }
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_learn_start(v: &EventVisitor) -> String {
    mark_run_start();
    format!(
        "{} {} Learning │ {} competitions │ {} constraints │ bias {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.competitions).bright_yellow(),
        count(v.constraints).bright_yellow(),
        v.bias.as_deref().unwrap_or("unknown").bright_magenta()
    )
}

fn format_learn_end(v: &EventVisitor) -> String {
    let converged = v.converged.unwrap_or(false);
    let status = if converged {
        "CONVERGED".bright_green().bold().to_string()
    } else {
        "FAILED".bright_red().bold().to_string()
    };

    format!(
        "{} {} Learning complete │ {} passes │ {} ERCs │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.passes).white(),
        count(v.ercs).white(),
        status
    )
}

fn format_learn_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} {}",
        format_elapsed(),
        "✗".bright_red(),
        v.reason.as_deref().unwrap_or("learning failed").bright_red()
    )
}

fn format_pass(v: &EventVisitor) -> String {
    let mismatches = v.mismatches.unwrap_or(0);
    let icon = if mismatches == 0 {
        "✓".bright_green().to_string()
    } else {
        "→".bright_blue().to_string()
    };

    format!(
        "{} {} Pass {:>4} │ {} mismatches │ {} new ERCs",
        format_elapsed(),
        icon,
        count(v.pass).white(),
        mismatches.to_formatted_string(&Locale::en).bright_yellow(),
        count(v.new_ercs).bright_yellow()
    )
}

fn format_typology_start(v: &EventVisitor) -> String {
    mark_run_start();
    let mut output = format!(
        "{} {} Typology │ {} competitions │ {} constraints │ bias {}",
        format_elapsed(),
        "▶".bright_green().bold(),
        count(v.competitions).bright_yellow(),
        count(v.constraints).bright_yellow(),
        v.bias.as_deref().unwrap_or("unknown").bright_magenta()
    );

    if let Some(bounded) = v.bounded.filter(|&b| b > 0) {
        output.push_str(&format!(
            " │ {} bounded",
            bounded.to_formatted_string(&Locale::en).bright_black()
        ));
    }

    output
}

fn format_typology_end(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Typology complete │ {} languages │ {} │ {} nodes │ {} pruned",
        format_elapsed(),
        "■".bright_cyan().bold(),
        count(v.languages).bright_green().bold(),
        format_duration_ms(v.elapsed_ms.unwrap_or(0)).yellow(),
        count(v.nodes_explored).white(),
        count(v.branches_pruned).white()
    );

    if let Some(duplicates) = v.duplicates.filter(|&d| d > 0) {
        output.push_str(&format!(
            " │ {} duplicates",
            duplicates.to_formatted_string(&Locale::en).bright_black()
        ));
    }

    output
}

fn format_rcd(v: &EventVisitor) -> String {
    let consistent = v.consistent.unwrap_or(true);
    let status = if consistent {
        "consistent".green().to_string()
    } else {
        "inconsistent".red().to_string()
    };

    format!(
        "{} {} RCD │ {} ERCs │ {} strata │ {}",
        format_elapsed(),
        "·".bright_black(),
        count(v.ercs).white(),
        count(v.rounds).white(),
        status
    )
}

fn format_stratum(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{}   Stratum {:>3} │ {} placed",
        format_elapsed(),
        count(v.round).bright_black(),
        count(v.size).bright_black()
    )
}

fn format_inconsistent(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{} {} Inconsistent at stratum {} │ {} ERCs left",
        format_elapsed(),
        "✗".bright_red(),
        count(v.round).white(),
        count(v.residue).bright_red()
    )
}

fn format_prune(v: &EventVisitor, level: Level) -> String {
    if level != Level::TRACE {
        return String::new();
    }

    format!(
        "{}   Pruned {} → candidate {} │ depth {}",
        format_elapsed(),
        v.input.as_deref().unwrap_or("?").bright_black(),
        count(v.candidate).bright_black(),
        count(v.depth).bright_black()
    )
}

fn format_warning(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} {}",
        format_elapsed(),
        "WARN".bright_yellow().bold(),
        v.message.as_deref().unwrap_or("").yellow()
    );

    if let Some(ref bias) = v.bias {
        output.push_str(&format!(" │ bias {}", bias.bright_magenta()));
    }
    if let Some(round) = v.round {
        output.push_str(&format!(" │ stratum {}", round.to_formatted_string(&Locale::en)));
    }

    output
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visitor(event: &str) -> EventVisitor {
        EventVisitor {
            event: Some(event.to_string()),
            ..EventVisitor::default()
        }
    }

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_learn_events() {
        let mut start = visitor("learn_start");
        start.competitions = Some(1200);
        start.constraints = Some(4);
        start.bias = Some("faithfulness_low".to_string());
        let line = format_event(&start, Level::INFO);
        assert!(line.contains("Learning"));
        assert!(line.contains("1,200"));
        assert!(line.contains("faithfulness_low"));

        let mut end = visitor("learn_end");
        end.converged = Some(false);
        end.passes = Some(3);
        let line = format_event(&end, Level::INFO);
        assert!(line.contains("FAILED"));
        assert!(line.contains("3"));
    }

    #[test]
    fn test_pass_event() {
        let mut pass = visitor("pass");
        pass.pass = Some(2);
        pass.mismatches = Some(0);
        let line = format_event(&pass, Level::DEBUG);
        assert!(line.contains("Pass"));
        assert!(line.contains("✓"));
    }

    #[test]
    fn test_typology_events() {
        let mut start = visitor("typology_start");
        start.bounded = Some(0);
        assert!(!format_event(&start, Level::INFO).contains("bounded"));
        start.bounded = Some(2);
        assert!(format_event(&start, Level::INFO).contains("bounded"));

        let mut end = visitor("typology_end");
        end.languages = Some(6);
        end.elapsed_ms = Some(12);
        end.duplicates = Some(1);
        let line = format_event(&end, Level::INFO);
        assert!(line.contains("6"));
        assert!(line.contains("12ms"));
        assert!(line.contains("duplicates"));
    }

    #[test]
    fn test_stratum_only_at_trace() {
        let stratum = visitor("rcd_stratum");
        assert!(format_event(&stratum, Level::DEBUG).is_empty());
        assert!(!format_event(&stratum, Level::TRACE).is_empty());
    }

    #[test]
    fn test_trace_events() {
        let mut inconsistent = visitor("rcd_inconsistent");
        inconsistent.round = Some(2);
        inconsistent.residue = Some(3);
        assert!(format_event(&inconsistent, Level::DEBUG).is_empty());
        assert!(format_event(&inconsistent, Level::TRACE).contains("Inconsistent"));

        let mut prune = visitor("typology_prune");
        prune.input = Some("/pat/".to_string());
        prune.candidate = Some(2);
        let line = format_event(&prune, Level::TRACE);
        assert!(line.contains("Pruned"));
        assert!(line.contains("/pat/"));
    }

    #[test]
    fn test_warning_without_event() {
        let warning = EventVisitor {
            message: Some("bias returned an invalid stratum".to_string()),
            bias: Some("constraints_low".to_string()),
            round: Some(1),
            ..EventVisitor::default()
        };
        let line = format_event(&warning, Level::WARN);
        assert!(line.contains("WARN"));
        assert!(line.contains("invalid stratum"));
        assert!(line.contains("constraints_low"));
        assert!(format_event(&warning, Level::INFO).is_empty());
    }

    #[test]
    fn test_unknown_event_is_silent() {
        assert!(format_event(&visitor("something_else"), Level::INFO).is_empty());
        assert!(format_event(&EventVisitor::default(), Level::INFO).is_empty());
    }
}
