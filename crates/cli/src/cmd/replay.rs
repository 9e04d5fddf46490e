//! Replay a timed script and print the settled timeline

use crate::config::Settings;
use crate::script::{self, Emission, ReplayScript};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::Path;

pub async fn run(settings: &Settings, script_path: &Path, delay_ms: Option<u64>) -> Result<()> {
    let script = ReplayScript::load(script_path)?;

    // Flag, then script, then config file
    let config = settings.debounce_with(delay_ms.or(script.delay_ms))?;

    let emissions = script::replay(&script, config.delay()).await?;

    let mut stdout = std::io::stdout().lock();
    print_timeline(&mut stdout, &script, config.delay_ms, &emissions)?;
    Ok(())
}

/// Write the replay summary and one line per emission
pub fn print_timeline<W: Write>(
    out: &mut W,
    script: &ReplayScript,
    delay_ms: u64,
    emissions: &[Emission],
) -> Result<()> {
    let span = match script.duration_ms() {
        Some(duration_ms) => format!(" over {}ms", duration_ms),
        None => String::new(),
    };
    writeln!(
        out,
        "{} {} steps{}, delay {}ms",
        "Replay:".bold(),
        script.steps.len(),
        span,
        delay_ms
    )?;
    writeln!(out, "  {:>8}  {}", "start".dimmed(), format!("{:?}", script.initial).dimmed())?;

    for emission in emissions {
        writeln!(
            out,
            "  {:>6}ms  {}",
            emission.at_ms.yellow(),
            format!("{:?}", emission.value).green()
        )?;
    }

    let dropped = script.steps.len().saturating_sub(emissions.len());
    writeln!(
        out,
        "{} {} settled, {} superseded",
        "Done:".bold(),
        emissions.len(),
        dropped
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_shows_script_span() {
        let script = ReplayScript::parse("[[step]]\nat_ms = 0\nvalue = \"a\"\n\n[[step]]\nat_ms = 120\nvalue = \"ab\"\n").unwrap();
        let emissions = vec![Emission {
            at_ms: 170,
            value: "ab".to_string(),
        }];

        let mut out = Vec::new();
        print_timeline(&mut out, &script, 50, &emissions).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("2 steps over 120ms, delay 50ms"));
        assert!(printed.contains("1 settled, 1 superseded"));
    }

    #[test]
    fn test_header_for_empty_script() {
        let script = ReplayScript::parse("").unwrap();

        let mut out = Vec::new();
        print_timeline(&mut out, &script, 500, &[]).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("0 steps, delay 500ms"));
        assert!(printed.contains("0 settled, 0 superseded"));
    }
}
