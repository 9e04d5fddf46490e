//! Timed replay scripts
//!
//! A script is a TOML list of updates with their offsets from the start:
//!
//! ```toml
//! delay_ms = 500   # optional
//! initial = ""     # optional
//!
//! [[step]]
//! at_ms = 0
//! value = "a"
//!
//! [[step]]
//! at_ms = 100
//! value = "ab"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use settle_core::{DebounceConfig, Debouncer};
use std::path::Path;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Parsed replay script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Delay to use unless overridden on the command line
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// Propagated value before the first step
    #[serde(default)]
    pub initial: String,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One timed update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Offset from the start of the replay
    pub at_ms: u64,
    pub value: String,
}

/// A value that settled during a replay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    /// Offset from the start of the replay
    pub at_ms: u64,
    pub value: String,
}

impl ReplayScript {
    /// Parse and validate a script
    pub fn parse(contents: &str) -> Result<Self> {
        let script: Self = toml::from_str(contents).context("Failed to parse replay script")?;
        script.validate()?;
        Ok(script)
    }

    /// Load a script from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("Invalid replay script {}", path.display()))
    }

    /// Steps must be in time order; the delay must be in range
    pub fn validate(&self) -> Result<()> {
        if let Some(delay_ms) = self.delay_ms {
            DebounceConfig::with_delay_ms(delay_ms).validate()?;
        }

        for (i, pair) in self.steps.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                anyhow::bail!(
                    "step {} at {}ms comes before step {} at {}ms",
                    i + 2,
                    pair[1].at_ms,
                    i + 1,
                    pair[0].at_ms
                );
            }
        }
        Ok(())
    }

    /// Offset of the last step, if any
    pub fn duration_ms(&self) -> Option<u64> {
        self.steps.last().map(|s| s.at_ms)
    }
}

/// Play `script` through a debouncer with `delay`, collecting every emission
///
/// Returns once the last pending value has settled.
pub async fn replay(script: &ReplayScript, delay: Duration) -> Result<Vec<Emission>> {
    let debouncer = Debouncer::new(script.initial.clone(), delay)?;
    let mut settled = debouncer.subscribe();
    let start = Instant::now();

    let recorder = tokio::spawn(async move {
        let mut emissions = Vec::new();
        while settled.changed().await.is_ok() {
            let value = settled.borrow_and_update().clone();
            emissions.push(Emission {
                at_ms: start.elapsed().as_millis() as u64,
                value,
            });
        }
        emissions
    });

    for step in &script.steps {
        sleep_until(start + Duration::from_millis(step.at_ms)).await;
        debug!("t={}ms update {:?}", step.at_ms, step.value);
        debouncer.update(step.value.clone());
    }

    // Wait out the final burst
    let mut last = debouncer.subscribe();
    if debouncer.is_pending() {
        let _ = last.changed().await;
    }
    debouncer.destroy();

    recorder.await.context("Replay recorder task failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TYPING: &str = r#"
delay_ms = 500
initial = ""

[[step]]
at_ms = 0
value = "a"

[[step]]
at_ms = 100
value = "ab"

[[step]]
at_ms = 200
value = "abc"
"#;

    #[test]
    fn test_parse_script() {
        let script = ReplayScript::parse(TYPING).unwrap();
        assert_eq!(script.delay_ms, Some(500));
        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[2].value, "abc");
        assert_eq!(script.duration_ms(), Some(200));
    }

    #[test]
    fn test_parse_empty_script() {
        let script = ReplayScript::parse("").unwrap();
        assert!(script.steps.is_empty());
        assert_eq!(script.delay_ms, None);
        assert_eq!(script.duration_ms(), None);
    }

    #[test]
    fn test_out_of_order_steps_rejected() {
        let err = ReplayScript::parse(
            "[[step]]\nat_ms = 50\nvalue = \"b\"\n\n[[step]]\nat_ms = 10\nvalue = \"a\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("comes before"));
    }

    #[test]
    fn test_out_of_range_delay_rejected() {
        assert!(ReplayScript::parse("delay_ms = 99999999999\n").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_burst_settles_once() {
        let script = ReplayScript::parse(TYPING).unwrap();
        let emissions = replay(&script, Duration::from_millis(500)).await.unwrap();

        assert_eq!(emissions.len(), 1);
        assert_eq!(emissions[0].value, "abc");
        assert!((700..=701).contains(&emissions[0].at_ms), "{:?}", emissions);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_pauses_split_bursts() {
        let script = ReplayScript::parse(
            "[[step]]\nat_ms = 0\nvalue = \"x\"\n\n[[step]]\nat_ms = 1000\nvalue = \"y\"\n",
        )
        .unwrap();
        let emissions = replay(&script, Duration::from_millis(300)).await.unwrap();

        let values: Vec<_> = emissions.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["x", "y"]);
        assert!((300..=301).contains(&emissions[0].at_ms));
        assert!((1300..=1301).contains(&emissions[1].at_ms));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_without_steps_emits_nothing() {
        let script = ReplayScript::parse("initial = \"idle\"\n").unwrap();
        let emissions = replay(&script, Duration::from_millis(100)).await.unwrap();
        assert!(emissions.is_empty());
    }
}
