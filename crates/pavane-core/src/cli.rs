//! Fallback client shelling out to `pactl`.
//!
//! A peer of the native client for hosts where the native socket is not
//! usable: volume and mute are read by parsing `pactl list sinks` text
//! and written through `set-sink-volume` / `set-sink-mute`. Volumes are
//! percent units here (100 = full scale), matching pactl's surface.

use std::sync::LazyLock;

use regex::Regex;
use tokio::process;
use tracing::error;

use crate::error::ClientError;

const PACTL: &str = "/usr/bin/pactl";

static BEGIN_SINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Sink #(\d+)").expect("static regex"));
static VOLUME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+ / +(\d+)% +/ +-?(?:\d+\.\d+|inf) dB").expect("static regex")
});

/// One sink as reported by `pactl list sinks`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliSink {
    /// Sink index
    pub index: u32,
    /// Sink name
    pub name: String,
    /// Whether the sink is muted
    pub muted: bool,
    /// Per-channel volumes in percent
    pub volumes: Vec<u32>,
}

/// Client driving `/usr/bin/pactl` for a fixed default sink.
#[derive(Debug, Clone)]
pub struct CliClient {
    default_sink: String,
}

impl CliClient {
    /// Create a fallback client targeting the named sink.
    pub fn new(default_sink: impl Into<String>) -> Self {
        Self { default_sink: default_sink.into() }
    }

    /// Current volume of the target sink as a number from 0 to 1.
    pub async fn volume(&self) -> Result<f64, ClientError> {
        let sink = self.find_default_sink().await?;
        if sink.volumes.is_empty() {
            return Ok(0.0);
        }
        Ok(f64::from(sink.volumes[0]) / 100.0)
    }

    /// Set the target sink's volume to a value from 0 to 1.
    pub async fn set_volume(&self, volume: f64) -> Result<(), ClientError> {
        let sink = self.find_default_sink().await?;
        let percent = (volume * 100.0) as u32;
        run_pactl(&["set-sink-volume", &sink.index.to_string(), &format!("{percent}%")]).await?;
        Ok(())
    }

    /// Whether the target sink is muted.
    pub async fn mute(&self) -> Result<bool, ClientError> {
        Ok(self.find_default_sink().await?.muted)
    }

    /// Mute or unmute the target sink.
    pub async fn set_mute(&self, mute: bool) -> Result<(), ClientError> {
        let sink = self.find_default_sink().await?;
        let flag = if mute { "true" } else { "false" };
        run_pactl(&["set-sink-mute", &sink.index.to_string(), flag]).await?;
        Ok(())
    }

    async fn find_default_sink(&self) -> Result<CliSink, ClientError> {
        let sinks = list_sinks().await?;
        sinks
            .into_iter()
            .find(|sink| sink.name == self.default_sink)
            .ok_or_else(|| ClientError::SinkNotFound(self.default_sink.clone()))
    }
}

async fn list_sinks() -> Result<Vec<CliSink>, ClientError> {
    let stdout = run_pactl(&["list", "sinks"]).await?;
    parse_sinks(&String::from_utf8_lossy(&stdout))
}

async fn run_pactl(args: &[&str]) -> Result<Vec<u8>, ClientError> {
    let output = process::Command::new(PACTL).args(args).output().await?;
    if !output.status.success() {
        return Err(ClientError::Pactl(format!("pactl {args:?} exited with {}", output.status)));
    }
    Ok(output.stdout)
}

/// Parse `pactl list sinks` output, grouping by `Sink #N` headers.
///
/// Only `Name`, `Mute` and `Volume` are extracted; everything else in the
/// dump (properties, formats, latency) is skipped by indent level.
pub fn parse_sinks(text: &str) -> Result<Vec<CliSink>, ClientError> {
    let mut sinks: Vec<CliSink> = Vec::new();
    let mut sink: Option<CliSink> = None;

    for line in text.lines() {
        let (token, indent, rest) = read_token(line, false);
        match indent {
            0 => {
                let Some(caps) = BEGIN_SINK_RE.captures(&token) else { continue };
                if let Some(done) = sink.take() {
                    sinks.push(done);
                }
                let index = match caps[1].parse() {
                    Ok(index) => index,
                    Err(_) => {
                        error!(index = &caps[1], "unexpected sink index format");
                        0
                    },
                };
                sink = Some(CliSink { index, ..CliSink::default() });
            },
            1 => {
                let Some(current) = sink.as_mut() else { continue };
                match token.as_str() {
                    "Volume" => {
                        let mut volumes = Vec::new();
                        for caps in VOLUME_RE.captures_iter(rest) {
                            let percent = caps[1].parse().map_err(|_| {
                                ClientError::PactlParse(format!("invalid volume value: {rest}"))
                            })?;
                            volumes.push(percent);
                        }
                        if volumes.len() < 2 {
                            return Err(ClientError::PactlParse(format!(
                                "invalid volume line: {rest}"
                            )));
                        }
                        current.volumes = volumes;
                    },
                    "Mute" => current.muted = read_token(rest, true).0 == "yes",
                    "Name" => current.name = read_token(rest, true).0,
                    _ => continue,
                }
            },
            _ => continue,
        }
    }
    if let Some(done) = sink {
        sinks.push(done);
    }
    Ok(sinks)
}

/// Split a dump line into (token, tab-indent, remainder-after-separator).
///
/// With `is_text` the separators `:` and `=` belong to the token, which
/// then runs to the end of the line.
fn read_token(line: &str, is_text: bool) -> (String, usize, &str) {
    let mut token = String::new();
    let mut indent = 0;
    for (i, ch) in line.char_indices() {
        match ch {
            '\t' => indent += 1,
            ':' | '=' if !is_text => {
                return (token.trim().to_owned(), indent, &line[i + 1..]);
            },
            _ => token.push(ch),
        }
    }
    (token.trim().to_owned(), indent, "")
}
