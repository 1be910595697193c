//! The tagstruct codec: tagged values packed into frame bodies.
//!
//! The wire format is self-describing at the value level. Each value is
//! prefixed by a one-byte [`Tag`] identifying its encoding; composite types
//! (sample spec, channel map, volume vector, property list, format info)
//! carry their own tag followed by a fixed recipe of raw fields.
//!
//! Decoding is type-checked: every `read_*` method verifies the tag byte on
//! the wire against the type it was asked for and fails with
//! [`ProtocolError::TagMismatch`] instead of misinterpreting the stream.
//! Strings are NUL-terminated on the wire; the terminator is stripped on
//! decode and appended on encode. An empty string is NOT the same as an
//! absent string — absence is encoded as [`Tag::StringNull`].
//!
//! [`Value`] is the typed view over (tag, payload) pairs, used by generic
//! decode paths and by the round-trip property tests.

use std::collections::BTreeMap;

use bytes::{BufMut, BytesMut};

use crate::{
    errors::{ProtocolError, Result},
    sample::{CVolume, ChannelMap, FormatInfo, SampleSpec},
    tag::Tag,
};

/// Appends tagged values to a frame body.
///
/// The writer borrows the frame's buffer and appends in place, so a body
/// can be built incrementally by several writers (the command prefix first,
/// then the per-command arguments).
pub struct TagStructWriter<'a> {
    buf: &'a mut BytesMut,
}

impl<'a> TagStructWriter<'a> {
    /// Create a writer appending to `buf`.
    pub fn new(buf: &'a mut BytesMut) -> Self {
        Self { buf }
    }

    /// Append a tagged u32.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u8(Tag::Uint32.to_u8());
        self.buf.put_u32(value);
    }

    /// Append a tagged i32.
    pub fn put_i32(&mut self, value: i32) {
        self.buf.put_u8(Tag::Int32.to_u8());
        self.buf.put_i32(value);
    }

    /// Append a tagged u8.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(Tag::Uint8.to_u8());
        self.buf.put_u8(value);
    }

    /// Append a tagged u64.
    pub fn put_u64(&mut self, value: u64) {
        self.buf.put_u8(Tag::Uint64.to_u8());
        self.buf.put_u64(value);
    }

    /// Append a tagged i64.
    pub fn put_i64(&mut self, value: i64) {
        self.buf.put_u8(Tag::Int64.to_u8());
        self.buf.put_i64(value);
    }

    /// Append a tagged microsecond count.
    pub fn put_usec(&mut self, value: u64) {
        self.buf.put_u8(Tag::Usec.to_u8());
        self.buf.put_u64(value);
    }

    /// Append a tagged timeval (seconds, microseconds).
    pub fn put_timeval(&mut self, seconds: u32, microseconds: u32) {
        self.buf.put_u8(Tag::Timeval.to_u8());
        self.buf.put_u32(seconds);
        self.buf.put_u32(microseconds);
    }

    /// Append a boolean. The tag byte IS the value; there is no payload.
    pub fn put_bool(&mut self, value: bool) {
        let tag = if value { Tag::BoolTrue } else { Tag::BoolFalse };
        self.buf.put_u8(tag.to_u8());
    }

    /// Append a NUL-terminated string.
    ///
    /// The string must not contain interior NUL bytes; the terminator is
    /// the value's only delimiter on the wire.
    pub fn put_string(&mut self, value: &str) {
        debug_assert!(!value.as_bytes().contains(&0), "wire strings cannot contain NUL");
        self.buf.put_u8(Tag::String.to_u8());
        self.buf.put_slice(value.as_bytes());
        self.buf.put_u8(0);
    }

    /// Append an absent string.
    pub fn put_string_null(&mut self) {
        self.buf.put_u8(Tag::StringNull.to_u8());
    }

    /// Append a length-prefixed byte blob.
    pub fn put_arbitrary(&mut self, value: &[u8]) {
        self.buf.put_u8(Tag::Arbitrary.to_u8());
        self.buf.put_u32(value.len() as u32);
        self.buf.put_slice(value);
    }

    /// Append a sample specification.
    pub fn put_sample_spec(&mut self, spec: &SampleSpec) {
        self.buf.put_u8(Tag::SampleSpec.to_u8());
        self.buf.put_u8(spec.format);
        self.buf.put_u8(spec.channels);
        self.buf.put_u32(spec.rate);
    }

    /// Append a channel map.
    pub fn put_channel_map(&mut self, map: &ChannelMap) {
        debug_assert!(map.0.len() <= usize::from(u8::MAX));
        self.buf.put_u8(Tag::ChannelMap.to_u8());
        self.buf.put_u8(map.0.len() as u8);
        self.buf.put_slice(&map.0);
    }

    /// Append a per-channel volume vector.
    pub fn put_cvolume(&mut self, volume: &CVolume) {
        debug_assert!(volume.0.len() <= usize::from(u8::MAX));
        self.buf.put_u8(Tag::Cvolume.to_u8());
        self.buf.put_u8(volume.0.len() as u8);
        for &channel in &volume.0 {
            self.buf.put_u32(channel);
        }
    }

    /// Append a tagged single volume.
    pub fn put_volume(&mut self, value: u32) {
        self.buf.put_u8(Tag::Volume.to_u8());
        self.buf.put_u32(value);
    }

    /// Append a property list.
    ///
    /// Each entry is written as (string key, u32 size, arbitrary value)
    /// where the value bytes include a trailing NUL; the list is terminated
    /// by a null string.
    pub fn put_proplist(&mut self, props: &BTreeMap<String, String>) {
        self.buf.put_u8(Tag::PropList.to_u8());
        for (key, value) in props {
            self.put_string(key);
            self.put_u32(value.len() as u32 + 1);
            self.buf.put_u8(Tag::Arbitrary.to_u8());
            self.buf.put_u32(value.len() as u32 + 1);
            self.buf.put_slice(value.as_bytes());
            self.buf.put_u8(0);
        }
        self.put_string_null();
    }

    /// Append a format info.
    pub fn put_format_info(&mut self, info: &FormatInfo) {
        self.buf.put_u8(Tag::FormatInfo.to_u8());
        self.put_u8(info.encoding);
        self.put_proplist(&info.props);
    }

    /// Append a typed [`Value`].
    pub fn put_value(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.put_string(s),
            Value::StringNull => self.put_string_null(),
            Value::Uint32(v) => self.put_u32(*v),
            Value::Int32(v) => self.put_i32(*v),
            Value::Uint8(v) => self.put_u8(*v),
            Value::Uint64(v) => self.put_u64(*v),
            Value::Int64(v) => self.put_i64(*v),
            Value::SampleSpec(v) => self.put_sample_spec(v),
            Value::Arbitrary(v) => self.put_arbitrary(v),
            Value::Bool(v) => self.put_bool(*v),
            Value::Timeval(s, u) => self.put_timeval(*s, *u),
            Value::Usec(v) => self.put_usec(*v),
            Value::ChannelMap(v) => self.put_channel_map(v),
            Value::Cvolume(v) => self.put_cvolume(v),
            Value::PropList(v) => self.put_proplist(v),
            Value::FormatInfo(v) => self.put_format_info(v),
            Value::Volume(v) => self.put_volume(*v),
        }
    }
}

/// Reads tagged values from a frame body.
///
/// The reader is a cursor over the body slice; every `read_*` method
/// consumes exactly one tagged value or fails without a defined cursor
/// position (callers tear the connection down on any decode error, so
/// partial consumption is never observed).
pub struct TagStructReader<'a> {
    buf: &'a [u8],
}

impl<'a> TagStructReader<'a> {
    /// Create a reader over a frame body.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Whether the body is exhausted. List replies decode by repetition
    /// until this returns true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn peek_u8(&self) -> Result<u8> {
        self.buf
            .first()
            .copied()
            .ok_or(ProtocolError::Truncated { needed: 1, available: 0 })
    }

    fn next_u8(&mut self) -> Result<u8> {
        let byte = self.peek_u8()?;
        self.buf = &self.buf[1..];
        Ok(byte)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.buf.len() < n {
            return Err(ProtocolError::Truncated { needed: n, available: self.buf.len() });
        }
        let (head, tail) = self.buf.split_at(n);
        self.buf = tail;
        Ok(head)
    }

    fn expect(&mut self, tag: Tag) -> Result<()> {
        let actual = self.peek_u8()?;
        if actual != tag.to_u8() {
            return Err(ProtocolError::TagMismatch { expected: tag.to_u8(), actual });
        }
        self.buf = &self.buf[1..];
        Ok(())
    }

    fn raw_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn raw_u64(&mut self) -> Result<u64> {
        let b = self.take(8)?;
        Ok(u64::from_be_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    /// Read a tagged u32.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.expect(Tag::Uint32)?;
        self.raw_u32()
    }

    /// Read a tagged i32.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.expect(Tag::Int32)?;
        Ok(self.raw_u32()? as i32)
    }

    /// Read a tagged u8.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.expect(Tag::Uint8)?;
        self.next_u8()
    }

    /// Read a tagged u64.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.expect(Tag::Uint64)?;
        self.raw_u64()
    }

    /// Read a tagged i64.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.expect(Tag::Int64)?;
        Ok(self.raw_u64()? as i64)
    }

    /// Read a tagged microsecond count.
    pub fn read_usec(&mut self) -> Result<u64> {
        self.expect(Tag::Usec)?;
        self.raw_u64()
    }

    /// Read a tagged timeval as (seconds, microseconds).
    pub fn read_timeval(&mut self) -> Result<(u32, u32)> {
        self.expect(Tag::Timeval)?;
        Ok((self.raw_u32()?, self.raw_u32()?))
    }

    /// Read a boolean. The tag byte is the value.
    pub fn read_bool(&mut self) -> Result<bool> {
        let actual = self.peek_u8()?;
        let value = match actual {
            b if b == Tag::BoolTrue.to_u8() => true,
            b if b == Tag::BoolFalse.to_u8() => false,
            _ => {
                return Err(ProtocolError::TagMismatch {
                    expected: Tag::BoolTrue.to_u8(),
                    actual,
                });
            },
        };
        self.buf = &self.buf[1..];
        Ok(value)
    }

    /// Read a NUL-terminated string, stripping the terminator.
    pub fn read_string(&mut self) -> Result<String> {
        self.expect(Tag::String)?;
        self.read_string_body()
    }

    /// Read a string that may be absent ([`Tag::StringNull`]).
    pub fn read_string_maybe(&mut self) -> Result<Option<String>> {
        if self.peek_u8()? == Tag::StringNull.to_u8() {
            self.buf = &self.buf[1..];
            return Ok(None);
        }
        self.read_string().map(Some)
    }

    /// Consume an absent-string marker.
    pub fn expect_string_null(&mut self) -> Result<()> {
        self.expect(Tag::StringNull)
    }

    fn read_string_body(&mut self) -> Result<String> {
        let nul = self
            .buf
            .iter()
            .position(|&b| b == 0)
            .ok_or(ProtocolError::UnterminatedString)?;
        let bytes = &self.buf[..nul];
        self.buf = &self.buf[nul + 1..];
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| ProtocolError::InvalidUtf8)
    }

    /// Read a length-prefixed byte blob.
    pub fn read_arbitrary(&mut self) -> Result<&'a [u8]> {
        self.expect(Tag::Arbitrary)?;
        let len = self.raw_u32()? as usize;
        self.take(len)
    }

    /// Read a sample specification.
    pub fn read_sample_spec(&mut self) -> Result<SampleSpec> {
        self.expect(Tag::SampleSpec)?;
        Ok(SampleSpec {
            format: self.next_u8()?,
            channels: self.next_u8()?,
            rate: self.raw_u32()?,
        })
    }

    /// Read a channel map.
    pub fn read_channel_map(&mut self) -> Result<ChannelMap> {
        self.expect(Tag::ChannelMap)?;
        let count = usize::from(self.next_u8()?);
        Ok(ChannelMap(self.take(count)?.to_vec()))
    }

    /// Read a per-channel volume vector.
    pub fn read_cvolume(&mut self) -> Result<CVolume> {
        self.expect(Tag::Cvolume)?;
        let count = usize::from(self.next_u8()?);
        let mut channels = Vec::with_capacity(count);
        for _ in 0..count {
            channels.push(self.raw_u32()?);
        }
        Ok(CVolume(channels))
    }

    /// Read a tagged single volume.
    pub fn read_volume(&mut self) -> Result<u32> {
        self.expect(Tag::Volume)?;
        self.raw_u32()
    }

    /// Read a property list into an ordered map.
    ///
    /// Values arrive as NUL-terminated blobs; the terminator is stripped
    /// and the remainder must be UTF-8.
    pub fn read_proplist(&mut self) -> Result<BTreeMap<String, String>> {
        self.expect(Tag::PropList)?;
        let mut props = BTreeMap::new();
        loop {
            if self.peek_u8()? == Tag::StringNull.to_u8() {
                self.buf = &self.buf[1..];
                return Ok(props);
            }
            let key = self.read_string()?;
            let _size = self.read_u32()?;
            let mut value = self.read_arbitrary()?;
            if let Some((0, head)) = value.split_last() {
                value = head;
            }
            let value = std::str::from_utf8(value)
                .map_err(|_| ProtocolError::InvalidUtf8)?
                .to_owned();
            props.insert(key, value);
        }
    }

    /// Read a format info.
    pub fn read_format_info(&mut self) -> Result<FormatInfo> {
        self.expect(Tag::FormatInfo)?;
        Ok(FormatInfo { encoding: self.read_u8()?, props: self.read_proplist()? })
    }

    /// Read the next value as its typed view, whatever its tag.
    pub fn read_value(&mut self) -> Result<Value> {
        let tag = Tag::parse(self.peek_u8()?)?;
        Ok(match tag {
            Tag::String => Value::String(self.read_string()?),
            Tag::StringNull => {
                self.buf = &self.buf[1..];
                Value::StringNull
            },
            Tag::Uint32 => Value::Uint32(self.read_u32()?),
            Tag::Int32 => Value::Int32(self.read_i32()?),
            Tag::Uint8 => Value::Uint8(self.read_u8()?),
            Tag::Uint64 => Value::Uint64(self.read_u64()?),
            Tag::Int64 => Value::Int64(self.read_i64()?),
            Tag::SampleSpec => Value::SampleSpec(self.read_sample_spec()?),
            Tag::Arbitrary => Value::Arbitrary(self.read_arbitrary()?.to_vec()),
            Tag::BoolTrue | Tag::BoolFalse => Value::Bool(self.read_bool()?),
            Tag::Timeval => {
                let (s, u) = self.read_timeval()?;
                Value::Timeval(s, u)
            },
            Tag::Usec => Value::Usec(self.read_usec()?),
            Tag::ChannelMap => Value::ChannelMap(self.read_channel_map()?),
            Tag::Cvolume => Value::Cvolume(self.read_cvolume()?),
            Tag::PropList => Value::PropList(self.read_proplist()?),
            Tag::FormatInfo => Value::FormatInfo(self.read_format_info()?),
            Tag::Volume => Value::Volume(self.read_volume()?),
        })
    }
}

/// Typed view over one tagged value: the wire tag is the discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// NUL-terminated string
    String(String),
    /// Absent string
    StringNull,
    /// u32
    Uint32(u32),
    /// i32
    Int32(i32),
    /// u8
    Uint8(u8),
    /// u64
    Uint64(u64),
    /// i64
    Int64(i64),
    /// Sample specification
    SampleSpec(SampleSpec),
    /// Length-prefixed blob
    Arbitrary(Vec<u8>),
    /// Boolean
    Bool(bool),
    /// Timeval (seconds, microseconds)
    Timeval(u32, u32),
    /// Microsecond count
    Usec(u64),
    /// Channel map
    ChannelMap(ChannelMap),
    /// Per-channel volume vector
    Cvolume(CVolume),
    /// Property list
    PropList(BTreeMap<String, String>),
    /// Format info
    FormatInfo(FormatInfo),
    /// Single volume
    Volume(u32),
}

impl Value {
    /// The wire tag this value is encoded under. Booleans report
    /// [`Tag::BoolTrue`] or [`Tag::BoolFalse`] according to their value.
    #[must_use]
    pub fn tag(&self) -> Tag {
        match self {
            Value::String(_) => Tag::String,
            Value::StringNull => Tag::StringNull,
            Value::Uint32(_) => Tag::Uint32,
            Value::Int32(_) => Tag::Int32,
            Value::Uint8(_) => Tag::Uint8,
            Value::Uint64(_) => Tag::Uint64,
            Value::Int64(_) => Tag::Int64,
            Value::SampleSpec(_) => Tag::SampleSpec,
            Value::Arbitrary(_) => Tag::Arbitrary,
            Value::Bool(true) => Tag::BoolTrue,
            Value::Bool(false) => Tag::BoolFalse,
            Value::Timeval(..) => Tag::Timeval,
            Value::Usec(_) => Tag::Usec,
            Value::ChannelMap(_) => Tag::ChannelMap,
            Value::Cvolume(_) => Tag::Cvolume,
            Value::PropList(_) => Tag::PropList,
            Value::FormatInfo(_) => Tag::FormatInfo,
            Value::Volume(_) => Tag::Volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn u32_wire_layout() {
        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_u32(0xDEAD_BEEF);
        assert_eq!(&buf[..], &[b'L', 0xDE, 0xAD, 0xBE, 0xEF]);

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_u32().unwrap(), 0xDEAD_BEEF);
        assert!(ts.is_empty());
    }

    #[test]
    fn string_is_nul_terminated() {
        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_string("sink");
        assert_eq!(&buf[..], b"tsink\0");

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_string().unwrap(), "sink");
        assert!(ts.is_empty());
    }

    #[test]
    fn empty_string_is_not_absent() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            w.put_string("");
            w.put_string_null();
        }
        assert_eq!(&buf[..], &[b't', 0, b'N']);

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_string_maybe().unwrap(), Some(String::new()));
        assert_eq!(ts.read_string_maybe().unwrap(), None);
    }

    #[test]
    fn bool_is_the_tag_byte() {
        let mut buf = BytesMut::new();
        {
            let mut w = TagStructWriter::new(&mut buf);
            w.put_bool(true);
            w.put_bool(false);
        }
        assert_eq!(&buf[..], &[b'1', b'0']);

        let mut ts = TagStructReader::new(&buf);
        assert!(ts.read_bool().unwrap());
        assert!(!ts.read_bool().unwrap());
    }

    #[test]
    fn type_checked_decode_reports_both_tags() {
        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_string("oops");

        let mut ts = TagStructReader::new(&buf);
        let err = ts.read_u32().unwrap_err();
        assert_eq!(err, ProtocolError::TagMismatch { expected: b'L', actual: b't' });
    }

    #[test]
    fn truncated_value() {
        let mut ts = TagStructReader::new(&[b'L', 0x00, 0x01]);
        let err = ts.read_u32().unwrap_err();
        assert_eq!(err, ProtocolError::Truncated { needed: 4, available: 2 });
    }

    #[test]
    fn unterminated_string() {
        let mut ts = TagStructReader::new(&[b't', b'a', b'b']);
        assert_eq!(ts.read_string().unwrap_err(), ProtocolError::UnterminatedString);
    }

    #[test]
    fn proplist_wire_layout() {
        let mut props = BTreeMap::new();
        props.insert("device.class".to_owned(), "sound".to_owned());

        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_proplist(&props);

        // P, key, u32 size, blob of size bytes (value + NUL), terminator N
        let mut expected = Vec::new();
        expected.push(b'P');
        expected.extend_from_slice(b"tdevice.class\0");
        expected.extend_from_slice(&[b'L', 0, 0, 0, 6]);
        expected.extend_from_slice(&[b'x', 0, 0, 0, 6]);
        expected.extend_from_slice(b"sound\0");
        expected.push(b'N');
        assert_eq!(&buf[..], &expected[..]);

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_proplist().unwrap(), props);
        assert!(ts.is_empty());
    }

    #[test]
    fn cvolume_round_trip() {
        let volume = CVolume(vec![0x7FFF, 0xFFFF, 0x1_0000]);
        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_cvolume(&volume);

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_cvolume().unwrap(), volume);
    }

    #[test]
    fn format_info_round_trip() {
        let info = FormatInfo {
            encoding: 1,
            props: BTreeMap::from([("format.rate".to_owned(), "44100".to_owned())]),
        };
        let mut buf = BytesMut::new();
        TagStructWriter::new(&mut buf).put_format_info(&info);

        let mut ts = TagStructReader::new(&buf);
        assert_eq!(ts.read_format_info().unwrap(), info);
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        let props = proptest::collection::btree_map("[a-z.]{1,16}", "[ -~]{0,16}", 0..4);
        let scalars = prop_oneof![
            "[ -~]{0,32}".prop_map(Value::String),
            Just(Value::StringNull),
            any::<u32>().prop_map(Value::Uint32),
            any::<i32>().prop_map(Value::Int32),
            any::<u8>().prop_map(Value::Uint8),
            any::<u64>().prop_map(Value::Uint64),
            any::<i64>().prop_map(Value::Int64),
            any::<bool>().prop_map(Value::Bool),
            any::<u64>().prop_map(Value::Usec),
            any::<u32>().prop_map(Value::Volume),
        ];
        let composites = prop_oneof![
            (any::<u8>(), any::<u8>(), any::<u32>()).prop_map(|(format, channels, rate)| {
                Value::SampleSpec(SampleSpec { format, channels, rate })
            }),
            proptest::collection::vec(any::<u8>(), 0..64).prop_map(Value::Arbitrary),
            (any::<u32>(), any::<u32>()).prop_map(|(s, u)| Value::Timeval(s, u)),
            proptest::collection::vec(any::<u8>(), 0..8)
                .prop_map(|v| Value::ChannelMap(ChannelMap(v))),
            proptest::collection::vec(any::<u32>(), 0..8)
                .prop_map(|v| Value::Cvolume(CVolume(v))),
            props.clone().prop_map(Value::PropList),
            (any::<u8>(), props)
                .prop_map(|(encoding, props)| Value::FormatInfo(FormatInfo { encoding, props })),
        ];
        prop_oneof![scalars, composites]
    }

    proptest! {
        #[test]
        fn value_round_trip(value in value_strategy()) {
            let mut buf = BytesMut::new();
            TagStructWriter::new(&mut buf).put_value(&value);

            let mut ts = TagStructReader::new(&buf);
            let decoded = ts.read_value().expect("should decode");
            prop_assert_eq!(&value, &decoded);
            prop_assert!(ts.is_empty(), "decoder must consume the whole value");
        }

        #[test]
        fn sequences_round_trip(values in proptest::collection::vec(value_strategy(), 0..8)) {
            let mut buf = BytesMut::new();
            {
                let mut w = TagStructWriter::new(&mut buf);
                for value in &values {
                    w.put_value(value);
                }
            }

            let mut ts = TagStructReader::new(&buf);
            let mut decoded = Vec::new();
            while !ts.is_empty() {
                decoded.push(ts.read_value().expect("should decode"));
            }
            prop_assert_eq!(values, decoded);
        }
    }
}
