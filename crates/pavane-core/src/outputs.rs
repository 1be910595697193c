//! Output enumeration and activation.
//!
//! An "output" is a card port that plays audio: the flattened view a
//! volume applet presents. Activating one selects the port's best profile
//! on its card.

use pavane_proto::introspect::{AVAILABLE_NO, DIRECTION_OUTPUT};

use crate::{client::Client, error::ClientError};

/// One selectable audio output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Index of the card the port belongs to
    pub card_index: u32,
    /// Name of the card
    pub card_name: String,
    /// Name of the port
    pub port_name: String,
    /// Human-readable port description
    pub description: String,
    /// Whether something is known to be reachable through this port
    pub available: bool,
    /// The profile activation selects: the port's highest-priority one
    pub profile: String,
}

impl Client {
    /// Enumerate the selectable outputs across all cards.
    ///
    /// Returns the outputs plus the index of the currently active one,
    /// `None` when no output's profile is active. Ports without any
    /// usable profile are skipped.
    pub async fn outputs(&self) -> Result<(Vec<Output>, Option<usize>), ClientError> {
        let cards = self.cards().await?;
        let mut outputs = Vec::new();
        let mut active = None;

        for card in &cards {
            for port in &card.ports {
                if port.direction != DIRECTION_OUTPUT {
                    continue;
                }
                let Some(profile) = port
                    .profiles
                    .iter()
                    .filter_map(|name| card.profiles.get(name))
                    .max_by_key(|profile| profile.priority)
                else {
                    continue;
                };

                if active.is_none() && port.profiles.iter().any(|name| *name == card.active_profile)
                {
                    active = Some(outputs.len());
                }
                outputs.push(Output {
                    card_index: card.index,
                    card_name: card.name.clone(),
                    port_name: port.name.clone(),
                    description: port.description.clone(),
                    available: port.available != AVAILABLE_NO,
                    profile: profile.name.clone(),
                });
            }
        }

        Ok((outputs, active))
    }

    /// Route audio to the given output by activating its profile.
    pub async fn activate(&self, output: &Output) -> Result<(), ClientError> {
        self.set_card_profile(output.card_index, &output.profile).await
    }
}
