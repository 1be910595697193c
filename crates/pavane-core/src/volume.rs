//! Volume and mute operations on the default sink.

use pavane_proto::{CVolume, Command, VOLUME_NORM};

use crate::{client::Client, error::ClientError};

/// Sink index meaning "use the name that follows instead".
const SINK_BY_NAME: u32 = 0xFFFF_FFFF;

/// Scale a caller-facing volume (1.0 = 100%) to raw channel units.
///
/// Truncating, saturating at `u32::MAX`: values above 1.0 keep scaling
/// linearly past [`VOLUME_NORM`] (boosted volume), they do not wrap.
pub(crate) fn scale_volume(volume: f64) -> u32 {
    (volume * f64::from(VOLUME_NORM)) as u32
}

impl Client {
    /// Current volume of the default sink as a number from 0 to 1 (or
    /// more than 1 when the volume is boosted).
    pub async fn volume(&self) -> Result<f64, ClientError> {
        let server = self.server_info().await?;
        let sinks = self.sinks().await?;
        for sink in sinks {
            if sink.name != server.default_sink {
                continue;
            }
            return Ok(f64::from(sink.volume.first()) / f64::from(VOLUME_NORM));
        }
        Err(ClientError::SinkNotFound(server.default_sink))
    }

    /// Set the default sink's volume to a value from 0 to 1 (or more than
    /// 1 to boost).
    pub async fn set_volume(&self, volume: f64) -> Result<(), ClientError> {
        let server = self.server_info().await?;
        self.set_sink_volume(&server.default_sink, volume).await
    }

    /// Set a named sink's volume.
    pub async fn set_sink_volume(&self, sink_name: &str, volume: f64) -> Result<(), ClientError> {
        self.set_sink_cvolume(sink_name, &CVolume(vec![scale_volume(volume)])).await
    }

    async fn set_sink_cvolume(
        &self,
        sink_name: &str,
        cvolume: &CVolume,
    ) -> Result<(), ClientError> {
        self.request_with(Command::SetSinkVolume, |w| {
            w.put_u32(SINK_BY_NAME);
            w.put_string(sink_name);
            w.put_cvolume(cvolume);
        })
        .await?;
        Ok(())
    }

    /// Whether the default sink is muted.
    pub async fn mute(&self) -> Result<bool, ClientError> {
        let server = self.server_info().await?;
        let sinks = self.sinks().await?;
        for sink in sinks {
            if sink.name != server.default_sink {
                continue;
            }
            return Ok(sink.muted);
        }
        Err(ClientError::SinkNotFound(server.default_sink))
    }

    /// Mute or unmute the default sink.
    pub async fn set_mute(&self, mute: bool) -> Result<(), ClientError> {
        let server = self.server_info().await?;
        self.set_sink_mute(&server.default_sink, mute).await
    }

    /// Mute or unmute a named sink.
    ///
    /// The flag goes on the wire as a u8 carrying the ASCII byte '1' or
    /// '0', not as a bool tag.
    pub async fn set_sink_mute(&self, sink_name: &str, mute: bool) -> Result<(), ClientError> {
        self.request_with(Command::SetSinkMute, |w| {
            w.put_u32(SINK_BY_NAME);
            w.put_string(sink_name);
            w.put_u8(if mute { b'1' } else { b'0' });
        })
        .await?;
        Ok(())
    }

    /// Flip the default sink's mute state; returns the new state.
    pub async fn toggle_mute(&self) -> Result<bool, ClientError> {
        let muted = self.mute().await?;
        self.set_mute(!muted).await?;
        Ok(!muted)
    }
}
