//! Command codes for native protocol frames.
//!
//! Every control frame body begins with a u32-tagged command code followed
//! by a u32-tagged request tag. The codes are the stable constants of the
//! native protocol's canonical list; they are organized in historical
//! ranges (the protocol only ever appends).
//!
//! # Code Ranges
//!
//! - `0-2`: Generic (error / timeout / reply)
//! - `3-60`: Client-to-server commands up to protocol v8
//! - `61-66`: Server-to-client notifications (including subscription
//!   events)
//! - `67-103`: Later additions, versioned per range
//!
//! Unknown codes are rejected with
//! [`ProtocolError::UnknownCommand`](crate::ProtocolError::UnknownCommand)
//! by [`Command::parse`]; there is no default behavior for unknown frames.

use crate::errors::{ProtocolError, Result};

/// Frame command codes.
///
/// # Representation
///
/// Commands are serialized as u32-tagged Big Endian values in the frame
/// body. The `#[repr(u32)]` ensures stable numeric values for wire
/// compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    // Generic
    /// Error reply to a failed request
    Error = 0,
    /// Pseudo command (never on the wire)
    Timeout = 1,
    /// Success reply to a request
    Reply = 2,

    // CLIENT -> SERVER
    /// Create a playback stream
    CreatePlaybackStream = 3,
    /// Delete a playback stream
    DeletePlaybackStream = 4,
    /// Create a record stream
    CreateRecordStream = 5,
    /// Delete a record stream
    DeleteRecordStream = 6,
    /// Ask the daemon to exit
    Exit = 7,
    /// Authentication request (and protocol handshake)
    Auth = 8,
    /// Set client identification properties
    SetClientName = 9,
    /// Look up a sink by name
    LookupSink = 10,
    /// Look up a source by name
    LookupSource = 11,
    /// Drain a playback stream
    DrainPlaybackStream = 12,
    /// Daemon memory statistics
    Stat = 13,
    /// Playback stream latency
    GetPlaybackLatency = 14,
    /// Create a sample upload stream
    CreateUploadStream = 15,
    /// Delete a sample upload stream
    DeleteUploadStream = 16,
    /// Finish a sample upload
    FinishUploadStream = 17,
    /// Play a cached sample
    PlaySample = 18,
    /// Remove a cached sample
    RemoveSample = 19,

    /// Server info dump
    GetServerInfo = 20,
    /// Single sink info
    GetSinkInfo = 21,
    /// All sinks
    GetSinkInfoList = 22,
    /// Single source info
    GetSourceInfo = 23,
    /// All sources
    GetSourceInfoList = 24,
    /// Single module info
    GetModuleInfo = 25,
    /// All modules
    GetModuleInfoList = 26,
    /// Single client info
    GetClientInfo = 27,
    /// All clients
    GetClientInfoList = 28,
    /// Single sink input info
    GetSinkInputInfo = 29,
    /// All sink inputs
    GetSinkInputInfoList = 30,
    /// Single source output info
    GetSourceOutputInfo = 31,
    /// All source outputs
    GetSourceOutputInfoList = 32,
    /// Single cached sample info
    GetSampleInfo = 33,
    /// All cached samples
    GetSampleInfoList = 34,
    /// Subscribe to server-side change events
    Subscribe = 35,

    /// Set a sink's per-channel volume
    SetSinkVolume = 36,
    /// Set a sink input's volume
    SetSinkInputVolume = 37,
    /// Set a source's volume
    SetSourceVolume = 38,

    /// Mute or unmute a sink
    SetSinkMute = 39,
    /// Mute or unmute a source
    SetSourceMute = 40,

    /// Cork a playback stream
    CorkPlaybackStream = 41,
    /// Flush a playback stream
    FlushPlaybackStream = 42,
    /// Trigger a playback stream
    TriggerPlaybackStream = 43,

    /// Change the default sink
    SetDefaultSink = 44,
    /// Change the default source
    SetDefaultSource = 45,

    /// Rename a playback stream
    SetPlaybackStreamName = 46,
    /// Rename a record stream
    SetRecordStreamName = 47,

    /// Kill a client connection
    KillClient = 48,
    /// Kill a sink input
    KillSinkInput = 49,
    /// Kill a source output
    KillSourceOutput = 50,

    /// Load a module
    LoadModule = 51,
    /// Unload a module
    UnloadModule = 52,

    // Obsolete autoload commands (still reserve their codes)
    /// Obsolete
    AddAutoloadObsolete = 53,
    /// Obsolete
    RemoveAutoloadObsolete = 54,
    /// Obsolete
    GetAutoloadInfoObsolete = 55,
    /// Obsolete
    GetAutoloadInfoListObsolete = 56,

    /// Record stream latency
    GetRecordLatency = 57,
    /// Cork a record stream
    CorkRecordStream = 58,
    /// Flush a record stream
    FlushRecordStream = 59,
    /// Prebuffer a playback stream
    PrebufPlaybackStream = 60,

    // SERVER -> CLIENT
    /// Server requests more playback data
    Request = 61,
    /// Playback buffer overflow
    Overflow = 62,
    /// Playback buffer underflow
    Underflow = 63,
    /// Playback stream was killed
    PlaybackStreamKilled = 64,
    /// Record stream was killed
    RecordStreamKilled = 65,
    /// A subscribed-to server object changed
    SubscribeEvent = 66,

    // Supported since protocol v10
    /// Move a sink input to another sink
    MoveSinkInput = 67,
    /// Move a source output to another source
    MoveSourceOutput = 68,

    // Supported since protocol v11
    /// Mute or unmute a sink input
    SetSinkInputMute = 69,

    /// Suspend a sink
    SuspendSink = 70,
    /// Suspend a source
    SuspendSource = 71,

    // Supported since protocol v12
    /// Change playback stream buffer attributes
    SetPlaybackStreamBufferAttr = 72,
    /// Change record stream buffer attributes
    SetRecordStreamBufferAttr = 73,

    /// Change playback stream sample rate
    UpdatePlaybackStreamSampleRate = 74,
    /// Change record stream sample rate
    UpdateRecordStreamSampleRate = 75,

    // SERVER -> CLIENT
    /// Playback stream was suspended
    PlaybackStreamSuspended = 76,
    /// Record stream was suspended
    RecordStreamSuspended = 77,
    /// Playback stream was moved
    PlaybackStreamMoved = 78,
    /// Record stream was moved
    RecordStreamMoved = 79,

    // Supported since protocol v13
    /// Update record stream properties
    UpdateRecordStreamProplist = 80,
    /// Update playback stream properties
    UpdatePlaybackStreamProplist = 81,
    /// Update client properties
    UpdateClientProplist = 82,
    /// Remove record stream properties
    RemoveRecordStreamProplist = 83,
    /// Remove playback stream properties
    RemovePlaybackStreamProplist = 84,
    /// Remove client properties
    RemoveClientProplist = 85,

    // SERVER -> CLIENT
    /// Playback stream started
    Started = 86,

    // Supported since protocol v14
    /// Module extension command
    Extension = 87,

    // Supported since protocol v15
    /// Single card info
    GetCardInfo = 88,
    /// All cards
    GetCardInfoList = 89,
    /// Change a card's active profile
    SetCardProfile = 90,

    /// Client event
    ClientEvent = 91,
    /// Playback stream event
    PlaybackStreamEvent = 92,
    /// Record stream event
    RecordStreamEvent = 93,

    // SERVER -> CLIENT
    /// Playback buffer attributes changed
    PlaybackBufferAttrChanged = 94,
    /// Record buffer attributes changed
    RecordBufferAttrChanged = 95,

    // Supported since protocol v16
    /// Change a sink's active port
    SetSinkPort = 96,
    /// Change a source's active port
    SetSourcePort = 97,

    // Supported since protocol v22
    /// Set a source output's volume
    SetSourceOutputVolume = 98,
    /// Mute or unmute a source output
    SetSourceOutputMute = 99,

    // Supported since protocol v27
    /// Set a port's latency offset
    SetPortLatencyOffset = 100,

    // Supported since protocol v30 (both directions)
    /// Enable the shared ringbuffer channel
    EnableSrbchannel = 101,
    /// Disable the shared ringbuffer channel
    DisableSrbchannel = 102,

    // Supported since protocol v31 (both directions)
    /// Register a memfd shm id
    RegisterMemfdShmid = 103,
}

impl Command {
    /// Convert to the raw u32 value
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Convert from a raw u32 value
    ///
    /// Returns `None` if the value doesn't correspond to a known command.
    #[must_use]
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Error),
            1 => Some(Self::Timeout),
            2 => Some(Self::Reply),
            3 => Some(Self::CreatePlaybackStream),
            4 => Some(Self::DeletePlaybackStream),
            5 => Some(Self::CreateRecordStream),
            6 => Some(Self::DeleteRecordStream),
            7 => Some(Self::Exit),
            8 => Some(Self::Auth),
            9 => Some(Self::SetClientName),
            10 => Some(Self::LookupSink),
            11 => Some(Self::LookupSource),
            12 => Some(Self::DrainPlaybackStream),
            13 => Some(Self::Stat),
            14 => Some(Self::GetPlaybackLatency),
            15 => Some(Self::CreateUploadStream),
            16 => Some(Self::DeleteUploadStream),
            17 => Some(Self::FinishUploadStream),
            18 => Some(Self::PlaySample),
            19 => Some(Self::RemoveSample),
            20 => Some(Self::GetServerInfo),
            21 => Some(Self::GetSinkInfo),
            22 => Some(Self::GetSinkInfoList),
            23 => Some(Self::GetSourceInfo),
            24 => Some(Self::GetSourceInfoList),
            25 => Some(Self::GetModuleInfo),
            26 => Some(Self::GetModuleInfoList),
            27 => Some(Self::GetClientInfo),
            28 => Some(Self::GetClientInfoList),
            29 => Some(Self::GetSinkInputInfo),
            30 => Some(Self::GetSinkInputInfoList),
            31 => Some(Self::GetSourceOutputInfo),
            32 => Some(Self::GetSourceOutputInfoList),
            33 => Some(Self::GetSampleInfo),
            34 => Some(Self::GetSampleInfoList),
            35 => Some(Self::Subscribe),
            36 => Some(Self::SetSinkVolume),
            37 => Some(Self::SetSinkInputVolume),
            38 => Some(Self::SetSourceVolume),
            39 => Some(Self::SetSinkMute),
            40 => Some(Self::SetSourceMute),
            41 => Some(Self::CorkPlaybackStream),
            42 => Some(Self::FlushPlaybackStream),
            43 => Some(Self::TriggerPlaybackStream),
            44 => Some(Self::SetDefaultSink),
            45 => Some(Self::SetDefaultSource),
            46 => Some(Self::SetPlaybackStreamName),
            47 => Some(Self::SetRecordStreamName),
            48 => Some(Self::KillClient),
            49 => Some(Self::KillSinkInput),
            50 => Some(Self::KillSourceOutput),
            51 => Some(Self::LoadModule),
            52 => Some(Self::UnloadModule),
            53 => Some(Self::AddAutoloadObsolete),
            54 => Some(Self::RemoveAutoloadObsolete),
            55 => Some(Self::GetAutoloadInfoObsolete),
            56 => Some(Self::GetAutoloadInfoListObsolete),
            57 => Some(Self::GetRecordLatency),
            58 => Some(Self::CorkRecordStream),
            59 => Some(Self::FlushRecordStream),
            60 => Some(Self::PrebufPlaybackStream),
            61 => Some(Self::Request),
            62 => Some(Self::Overflow),
            63 => Some(Self::Underflow),
            64 => Some(Self::PlaybackStreamKilled),
            65 => Some(Self::RecordStreamKilled),
            66 => Some(Self::SubscribeEvent),
            67 => Some(Self::MoveSinkInput),
            68 => Some(Self::MoveSourceOutput),
            69 => Some(Self::SetSinkInputMute),
            70 => Some(Self::SuspendSink),
            71 => Some(Self::SuspendSource),
            72 => Some(Self::SetPlaybackStreamBufferAttr),
            73 => Some(Self::SetRecordStreamBufferAttr),
            74 => Some(Self::UpdatePlaybackStreamSampleRate),
            75 => Some(Self::UpdateRecordStreamSampleRate),
            76 => Some(Self::PlaybackStreamSuspended),
            77 => Some(Self::RecordStreamSuspended),
            78 => Some(Self::PlaybackStreamMoved),
            79 => Some(Self::RecordStreamMoved),
            80 => Some(Self::UpdateRecordStreamProplist),
            81 => Some(Self::UpdatePlaybackStreamProplist),
            82 => Some(Self::UpdateClientProplist),
            83 => Some(Self::RemoveRecordStreamProplist),
            84 => Some(Self::RemovePlaybackStreamProplist),
            85 => Some(Self::RemoveClientProplist),
            86 => Some(Self::Started),
            87 => Some(Self::Extension),
            88 => Some(Self::GetCardInfo),
            89 => Some(Self::GetCardInfoList),
            90 => Some(Self::SetCardProfile),
            91 => Some(Self::ClientEvent),
            92 => Some(Self::PlaybackStreamEvent),
            93 => Some(Self::RecordStreamEvent),
            94 => Some(Self::PlaybackBufferAttrChanged),
            95 => Some(Self::RecordBufferAttrChanged),
            96 => Some(Self::SetSinkPort),
            97 => Some(Self::SetSourcePort),
            98 => Some(Self::SetSourceOutputVolume),
            99 => Some(Self::SetSourceOutputMute),
            100 => Some(Self::SetPortLatencyOffset),
            101 => Some(Self::EnableSrbchannel),
            102 => Some(Self::DisableSrbchannel),
            103 => Some(Self::RegisterMemfdShmid),
            _ => None,
        }
    }

    /// Parse a raw code, rejecting values outside the registry.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::UnknownCommand`] for unrecognized codes.
    pub fn parse(value: u32) -> Result<Self> {
        Self::from_u32(value).ok_or(ProtocolError::UnknownCommand(value))
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
