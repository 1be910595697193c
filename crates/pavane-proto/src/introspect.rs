//! Typed decoders for the server's introspection replies.
//!
//! Each entity has a fixed recipe of tagged fields; the recipes follow the
//! protocol's introspection dumps exactly, so a decoder consumes one whole
//! entity and list replies decode by repetition until the body is
//! exhausted.
//!
//! Cards and their ports reference each other on the wire: every port
//! lists the profiles it supports by name, referring back into the card's
//! profile set. Decoding is therefore two-phase — profiles land in an
//! owned map first, and ports keep profile *names* as keys into that map.

use std::collections::BTreeMap;

use crate::{
    errors::Result,
    sample::{CVolume, ChannelMap, FormatInfo, SampleSpec},
    tagstruct::TagStructReader,
};

/// Port direction: the port plays audio out.
pub const DIRECTION_OUTPUT: u8 = 1;
/// Port direction: the port records audio.
pub const DIRECTION_INPUT: u8 = 2;

/// Port availability is unknown.
pub const AVAILABLE_UNKNOWN: u32 = 0;
/// Port is known to be unavailable (nothing plugged in).
pub const AVAILABLE_NO: u32 = 1;
/// Port is known to be available.
pub const AVAILABLE_YES: u32 = 2;

/// Global server information.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerInfo {
    /// Daemon package name (usually "pulseaudio")
    pub package_name: String,
    /// Daemon package version
    pub package_version: String,
    /// User the daemon runs as
    pub user: String,
    /// Host the daemon runs on
    pub hostname: String,
    /// Default sample specification
    pub sample_spec: SampleSpec,
    /// Name of the default sink
    pub default_sink: String,
    /// Name of the default source
    pub default_source: String,
    /// Random cookie identifying this daemon instance
    pub cookie: u32,
    /// Default channel map
    pub channel_map: ChannelMap,
}

impl ServerInfo {
    /// Decode one server-info dump.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        Ok(Self {
            package_name: ts.read_string()?,
            package_version: ts.read_string()?,
            user: ts.read_string()?,
            hostname: ts.read_string()?,
            sample_spec: ts.read_sample_spec()?,
            default_sink: ts.read_string()?,
            default_source: ts.read_string()?,
            cookie: ts.read_u32()?,
            channel_map: ts.read_channel_map()?,
        })
    }
}

/// One output endpoint (a playback device).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SinkInfo {
    /// Sink index
    pub index: u32,
    /// Sink name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Sample specification
    pub sample_spec: SampleSpec,
    /// Channel map
    pub channel_map: ChannelMap,
    /// Index of the owning module
    pub module_index: u32,
    /// Per-channel volume
    pub volume: CVolume,
    /// Whether the sink is muted
    pub muted: bool,
    /// Index of the monitor source
    pub monitor_source_index: u32,
    /// Name of the monitor source
    pub monitor_source_name: String,
    /// Current latency in microseconds
    pub latency: u64,
    /// Driver name
    pub driver: String,
    /// Sink flags
    pub flags: u32,
    /// Sink properties
    pub props: BTreeMap<String, String>,
    /// Requested latency in microseconds
    pub requested_latency: u64,
    /// Volume of a single channel at 100%
    pub base_volume: u32,
    /// Sink state (running / idle / suspended)
    pub state: u32,
    /// Number of discrete volume steps, if the hardware has them
    pub n_volume_steps: u32,
    /// Index of the owning card
    pub card_index: u32,
    /// Physical ports of this sink
    pub ports: Vec<SinkPort>,
    /// Name of the active port; empty when the sink has no ports
    pub active_port_name: String,
    /// Supported stream formats
    pub formats: Vec<FormatInfo>,
}

impl SinkInfo {
    /// Decode one sink.
    ///
    /// The tail is variable: `port_count` ports, then the active port name
    /// (a null string when there are no ports), then a u8-counted list of
    /// format infos.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        let mut sink = Self {
            index: ts.read_u32()?,
            name: ts.read_string()?,
            description: ts.read_string()?,
            sample_spec: ts.read_sample_spec()?,
            channel_map: ts.read_channel_map()?,
            module_index: ts.read_u32()?,
            volume: ts.read_cvolume()?,
            muted: ts.read_bool()?,
            monitor_source_index: ts.read_u32()?,
            monitor_source_name: ts.read_string()?,
            latency: ts.read_usec()?,
            driver: ts.read_string()?,
            flags: ts.read_u32()?,
            props: ts.read_proplist()?,
            requested_latency: ts.read_usec()?,
            base_volume: ts.read_volume()?,
            state: ts.read_u32()?,
            n_volume_steps: ts.read_u32()?,
            card_index: ts.read_u32()?,
            ..Self::default()
        };

        let port_count = ts.read_u32()?;
        sink.ports.reserve(port_count as usize);
        for _ in 0..port_count {
            sink.ports.push(SinkPort::read_from(ts)?);
        }
        if port_count == 0 {
            ts.expect_string_null()?;
        } else {
            sink.active_port_name = ts.read_string()?;
        }

        let format_count = ts.read_u8()?;
        sink.formats.reserve(usize::from(format_count));
        for _ in 0..format_count {
            sink.formats.push(ts.read_format_info()?);
        }

        Ok(sink)
    }
}

/// A physical port as listed on a sink.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SinkPort {
    /// Port name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Routing priority
    pub priority: u32,
    /// Availability (see `AVAILABLE_*`)
    pub available: u32,
}

impl SinkPort {
    /// Decode one sink port.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        Ok(Self {
            name: ts.read_string()?,
            description: ts.read_string()?,
            priority: ts.read_u32()?,
            available: ts.read_u32()?,
        })
    }
}

/// A loaded server module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleInfo {
    /// Module index
    pub index: u32,
    /// Module name
    pub name: String,
    /// Load-time argument string
    pub argument: String,
    /// Usage counter
    pub n_used: u32,
    /// Module properties
    pub props: BTreeMap<String, String>,
}

impl ModuleInfo {
    /// Decode one module.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        Ok(Self {
            index: ts.read_u32()?,
            name: ts.read_string()?,
            argument: ts.read_string()?,
            n_used: ts.read_u32()?,
            props: ts.read_proplist()?,
        })
    }
}

/// A named card configuration selecting which sinks/sources exist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardProfile {
    /// Profile name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Number of sinks this profile provides
    pub n_sinks: u32,
    /// Number of sources this profile provides
    pub n_sources: u32,
    /// Selection priority
    pub priority: u32,
    /// Availability of the profile
    pub available: u32,
}

impl CardProfile {
    /// Decode one card profile.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        Ok(Self {
            name: ts.read_string()?,
            description: ts.read_string()?,
            n_sinks: ts.read_u32()?,
            n_sources: ts.read_u32()?,
            priority: ts.read_u32()?,
            available: ts.read_u32()?,
        })
    }
}

/// A physical connector on a card.
///
/// `profiles` holds profile names; look them up in the owning card's
/// profile map.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardPort {
    /// Port name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Routing priority
    pub priority: u32,
    /// Availability (see `AVAILABLE_*`)
    pub available: u32,
    /// Direction (see `DIRECTION_*`)
    pub direction: u8,
    /// Port properties
    pub props: BTreeMap<String, String>,
    /// Names of the profiles this port is part of
    pub profiles: Vec<String>,
    /// Latency offset in microseconds
    pub latency_offset: i64,
}

impl CardPort {
    /// Decode one card port.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        let mut port = Self {
            name: ts.read_string()?,
            description: ts.read_string()?,
            priority: ts.read_u32()?,
            available: ts.read_u32()?,
            direction: ts.read_u8()?,
            props: ts.read_proplist()?,
            ..Self::default()
        };

        let profile_count = ts.read_u32()?;
        port.profiles.reserve(profile_count as usize);
        for _ in 0..profile_count {
            port.profiles.push(ts.read_string()?);
        }
        port.latency_offset = ts.read_i64()?;

        Ok(port)
    }
}

/// A physical or virtual audio device grouping profiles and ports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardInfo {
    /// Card index
    pub index: u32,
    /// Card name
    pub name: String,
    /// Index of the owning module
    pub owner_module: u32,
    /// Driver name
    pub driver: String,
    /// Profiles by name
    pub profiles: BTreeMap<String, CardProfile>,
    /// Name of the active profile
    pub active_profile: String,
    /// Card properties
    pub props: BTreeMap<String, String>,
    /// Physical ports
    pub ports: Vec<CardPort>,
}

impl CardInfo {
    /// Decode one card.
    ///
    /// Profiles are decoded before ports so that a port's profile names
    /// always resolve against the finished map.
    pub fn read_from(ts: &mut TagStructReader<'_>) -> Result<Self> {
        let mut card = Self {
            index: ts.read_u32()?,
            name: ts.read_string()?,
            owner_module: ts.read_u32()?,
            driver: ts.read_string()?,
            ..Self::default()
        };

        let profile_count = ts.read_u32()?;
        for _ in 0..profile_count {
            let profile = CardProfile::read_from(ts)?;
            card.profiles.insert(profile.name.clone(), profile);
        }

        card.active_profile = ts.read_string()?;
        card.props = ts.read_proplist()?;

        let port_count = ts.read_u32()?;
        card.ports.reserve(port_count as usize);
        for _ in 0..port_count {
            card.ports.push(CardPort::read_from(ts)?);
        }

        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::tagstruct::TagStructWriter;

    fn write_sink(w: &mut TagStructWriter<'_>, ports: &[SinkPort], active: Option<&str>) {
        w.put_u32(1);
        w.put_string("alsa_output.pci");
        w.put_string("Built-in Audio");
        w.put_sample_spec(&SampleSpec { format: 3, channels: 2, rate: 44100 });
        w.put_channel_map(&ChannelMap(vec![1, 2]));
        w.put_u32(6);
        w.put_cvolume(&CVolume(vec![0x8000, 0x8000]));
        w.put_bool(false);
        w.put_u32(2);
        w.put_string("alsa_output.pci.monitor");
        w.put_usec(15857);
        w.put_string("module-alsa-card.c");
        w.put_u32(0x0D);
        w.put_proplist(&BTreeMap::from([(
            "device.class".to_owned(),
            "sound".to_owned(),
        )]));
        w.put_usec(25000);
        w.put_volume(0x10000);
        w.put_u32(0);
        w.put_u32(65537);
        w.put_u32(0);
        w.put_u32(ports.len() as u32);
        for port in ports {
            w.put_string(&port.name);
            w.put_string(&port.description);
            w.put_u32(port.priority);
            w.put_u32(port.available);
        }
        match active {
            Some(name) => w.put_string(name),
            None => w.put_string_null(),
        }
        w.put_u8(1);
        w.put_format_info(&FormatInfo { encoding: 1, props: BTreeMap::new() });
    }

    #[test]
    fn sink_decode_recipe() {
        let ports = vec![SinkPort {
            name: "analog-output".to_owned(),
            description: "Analog Output".to_owned(),
            priority: 9900,
            available: AVAILABLE_YES,
        }];

        let mut buf = BytesMut::new();
        write_sink(&mut TagStructWriter::new(&mut buf), &ports, Some("analog-output"));

        let mut ts = TagStructReader::new(&buf);
        let sink = SinkInfo::read_from(&mut ts).expect("should decode");
        assert!(ts.is_empty());

        assert_eq!(sink.index, 1);
        assert_eq!(sink.name, "alsa_output.pci");
        assert_eq!(sink.sample_spec.rate, 44100);
        assert_eq!(sink.volume, CVolume(vec![0x8000, 0x8000]));
        assert!(!sink.muted);
        assert_eq!(sink.latency, 15857);
        assert_eq!(sink.base_volume, 0x10000);
        assert_eq!(sink.ports, ports);
        assert_eq!(sink.active_port_name, "analog-output");
        assert_eq!(sink.formats.len(), 1);
    }

    #[test]
    fn sink_without_ports_expects_null_active_port() {
        let mut buf = BytesMut::new();
        write_sink(&mut TagStructWriter::new(&mut buf), &[], None);

        let mut ts = TagStructReader::new(&buf);
        let sink = SinkInfo::read_from(&mut ts).expect("should decode");
        assert!(sink.ports.is_empty());
        assert_eq!(sink.active_port_name, "");
    }

    #[test]
    fn sink_list_decodes_by_repetition() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            write_sink(&mut w, &[], None);
            write_sink(&mut w, &[], None);
        }

        let mut ts = TagStructReader::new(&buf);
        let mut sinks = Vec::new();
        while !ts.is_empty() {
            sinks.push(SinkInfo::read_from(&mut ts).expect("should decode"));
        }
        assert_eq!(sinks.len(), 2);
    }

    #[test]
    fn card_two_phase_decode() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            w.put_u32(0);
            w.put_string("alsa_card.pci");
            w.put_u32(6);
            w.put_string("module-alsa-card.c");
            // two profiles
            w.put_u32(2);
            for (name, priority) in [("analog-stereo", 6060u32), ("off", 0u32)] {
                w.put_string(name);
                w.put_string(name);
                w.put_u32(1);
                w.put_u32(1);
                w.put_u32(priority);
                w.put_u32(AVAILABLE_YES);
            }
            w.put_string("analog-stereo");
            w.put_proplist(&BTreeMap::new());
            // one port referring back into the profile set
            w.put_u32(1);
            w.put_string("analog-output");
            w.put_string("Analog Output");
            w.put_u32(9900);
            w.put_u32(AVAILABLE_YES);
            w.put_u8(DIRECTION_OUTPUT);
            w.put_proplist(&BTreeMap::new());
            w.put_u32(1);
            w.put_string("analog-stereo");
            w.put_i64(0);
        }

        let mut ts = TagStructReader::new(&buf);
        let card = CardInfo::read_from(&mut ts).expect("should decode");
        assert!(ts.is_empty());

        assert_eq!(card.profiles.len(), 2);
        assert_eq!(card.active_profile, "analog-stereo");
        assert_eq!(card.ports.len(), 1);

        let port = &card.ports[0];
        assert_eq!(port.direction, DIRECTION_OUTPUT);
        assert_eq!(port.profiles, vec!["analog-stereo".to_owned()]);
        // profile names resolve against the owned map, no cycles
        assert!(card.profiles.contains_key(&port.profiles[0]));
    }

    #[test]
    fn server_info_decode_recipe() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            w.put_string("pulseaudio");
            w.put_string("16.1");
            w.put_string("alice");
            w.put_string("workstation");
            w.put_sample_spec(&SampleSpec { format: 3, channels: 2, rate: 48000 });
            w.put_string("alsa_output.pci");
            w.put_string("alsa_input.pci");
            w.put_u32(0xCAFE);
            w.put_channel_map(&ChannelMap(vec![1, 2]));
        }

        let mut ts = TagStructReader::new(&buf);
        let info = ServerInfo::read_from(&mut ts).expect("should decode");
        assert!(ts.is_empty());
        assert_eq!(info.default_sink, "alsa_output.pci");
        assert_eq!(info.cookie, 0xCAFE);
        assert_eq!(info.channel_map.len(), 2);
    }

    #[test]
    fn module_decode_recipe() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            w.put_u32(4);
            w.put_string("module-null-sink");
            w.put_string("sink_name=null");
            w.put_u32(0xFFFF_FFFF);
            w.put_proplist(&BTreeMap::new());
        }

        let mut ts = TagStructReader::new(&buf);
        let module = ModuleInfo::read_from(&mut ts).expect("should decode");
        assert_eq!(module.index, 4);
        assert_eq!(module.name, "module-null-sink");
        assert_eq!(module.n_used, 0xFFFF_FFFF);
    }
}
