//! Minimal ZIP archive writer.
//!
//! Serializes named byte buffers into a standards-conforming, uncompressed
//! (stored) ZIP container readable by any off-the-shelf unzip tool. Written
//! from scratch so the browser build does not need a compression stack: the
//! payloads are already-encoded PNGs, which deflate cannot shrink anyway.
//!
//! Layout of the produced buffer, per the ZIP application note:
//! one (local header, name, content) triple per entry in input order, then
//! one (central directory header, name) pair per entry in the same order,
//! then a single end-of-central-directory record.

use std::sync::OnceLock;

use chrono::{Datelike, Timelike};
use thiserror::Error;

/// Errors that can occur while building an archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Entry has a zero-length name; the resulting archive would be
    /// malformed for most readers
    #[error("archive entry {index} has an empty name")]
    EmptyEntryName {
        /// Position of the offending entry in the input list
        index: usize,
    },
}

/// One file to be placed in the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path of the entry inside the archive (a simple relative filename)
    pub name: String,
    /// Raw content bytes, stored without compression
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// Create an entry from a name and its content bytes.
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

static CRC_TABLE: OnceLock<[u32; 256]> = OnceLock::new();

/// 256-entry lookup table for the reflected polynomial `0xEDB88320`,
/// built once per process.
fn crc_table() -> &'static [u32; 256] {
    CRC_TABLE.get_or_init(|| {
        let mut table = [0u32; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let mut c = i as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 {
                    0xEDB8_8320 ^ (c >> 1)
                } else {
                    c >> 1
                };
            }
            *slot = c;
        }
        table
    })
}

/// CRC-32 of a byte buffer (IEEE 802.3, the variant ZIP readers validate).
pub fn crc32(data: &[u8]) -> u32 {
    let table = crc_table();
    let mut c = 0xFFFF_FFFFu32;
    for &byte in data {
        c = table[((c ^ byte as u32) & 0xFF) as usize] ^ (c >> 8);
    }
    c ^ 0xFFFF_FFFF
}

/// MS-DOS date/time pair as stored in ZIP headers.
///
/// Two-second resolution; years before 1980 are not representable and are
/// floored to 1980.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    /// Packed time: `hour << 11 | minute << 5 | second / 2`
    pub time: u16,
    /// Packed date: `(year - 1980) << 9 | month << 5 | day`
    pub date: u16,
}

impl DosDateTime {
    /// Encode a calendar timestamp into the packed DOS representation.
    pub fn from_datetime(dt: chrono::NaiveDateTime) -> Self {
        let year = dt.year().max(1980) as u16;
        let time = ((dt.hour() as u16) << 11)
            | ((dt.minute() as u16) << 5)
            | (dt.second() as u16 / 2);
        let date = ((year - 1980) << 9) | ((dt.month() as u16) << 5) | dt.day() as u16;
        Self { time, date }
    }

    /// Capture the current local time.
    pub fn now() -> Self {
        Self::from_datetime(chrono::Local::now().naive_local())
    }
}

// Record signatures and fixed sizes from the ZIP application note.
const LOCAL_HEADER_SIGNATURE: u32 = 0x0403_4B50;
const CENTRAL_HEADER_SIGNATURE: u32 = 0x0201_4B50;
const EOCD_SIGNATURE: u32 = 0x0605_4B50;
const LOCAL_HEADER_LEN: usize = 30;
const VERSION: u16 = 20;

fn push_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Build a complete archive from `entries`, stamped with `timestamp`.
///
/// Entries are written in input order; a zero-byte entry is written like any
/// other. An empty entry list yields a valid archive containing only the
/// end-of-central-directory record.
pub fn build_archive(
    entries: &[ArchiveEntry],
    timestamp: DosDateTime,
) -> Result<Vec<u8>, ArchiveError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.name.is_empty() {
            return Err(ArchiveError::EmptyEntryName { index });
        }
    }

    let payload: usize = entries.iter().map(|e| e.data.len()).sum();
    let mut archive = Vec::with_capacity(payload + entries.len() * 128 + 22);

    // Local region. Offsets and checksums are remembered for the central
    // directory that follows.
    let mut offsets = Vec::with_capacity(entries.len());
    let mut checksums = Vec::with_capacity(entries.len());
    for entry in entries {
        let crc = crc32(&entry.data);
        offsets.push(archive.len() as u32);
        checksums.push(crc);

        push_u32(&mut archive, LOCAL_HEADER_SIGNATURE);
        push_u16(&mut archive, VERSION); // version needed to extract
        push_u16(&mut archive, 0); // general purpose flags
        push_u16(&mut archive, 0); // method 0: stored
        push_u16(&mut archive, timestamp.time);
        push_u16(&mut archive, timestamp.date);
        push_u32(&mut archive, crc);
        push_u32(&mut archive, entry.data.len() as u32); // compressed size
        push_u32(&mut archive, entry.data.len() as u32); // uncompressed size
        push_u16(&mut archive, entry.name.len() as u16);
        push_u16(&mut archive, 0); // extra field length
        archive.extend_from_slice(entry.name.as_bytes());
        archive.extend_from_slice(&entry.data);

        log::debug!(
            "archived '{}' ({} bytes, crc {:08x})",
            entry.name,
            entry.data.len(),
            crc
        );
    }

    // Central directory. Each record points back at its entry's local
    // header offset within the region written above.
    let central_start = archive.len() as u32;
    for (i, entry) in entries.iter().enumerate() {
        push_u32(&mut archive, CENTRAL_HEADER_SIGNATURE);
        push_u16(&mut archive, VERSION); // version made by
        push_u16(&mut archive, VERSION); // version needed to extract
        push_u16(&mut archive, 0); // general purpose flags
        push_u16(&mut archive, 0); // method 0: stored
        push_u16(&mut archive, timestamp.time);
        push_u16(&mut archive, timestamp.date);
        push_u32(&mut archive, checksums[i]);
        push_u32(&mut archive, entry.data.len() as u32); // compressed size
        push_u32(&mut archive, entry.data.len() as u32); // uncompressed size
        push_u16(&mut archive, entry.name.len() as u16);
        push_u16(&mut archive, 0); // extra field length
        push_u16(&mut archive, 0); // comment length
        push_u16(&mut archive, 0); // disk number start
        push_u16(&mut archive, 0); // internal attributes
        push_u32(&mut archive, 0); // external attributes
        push_u32(&mut archive, offsets[i]);
        archive.extend_from_slice(entry.name.as_bytes());
    }
    let central_size = archive.len() as u32 - central_start;

    // End of central directory.
    push_u32(&mut archive, EOCD_SIGNATURE);
    push_u16(&mut archive, 0); // this disk
    push_u16(&mut archive, 0); // disk with central directory start
    push_u16(&mut archive, entries.len() as u16); // entries on this disk
    push_u16(&mut archive, entries.len() as u16); // entries total
    push_u32(&mut archive, central_size);
    push_u32(&mut archive, central_start);
    push_u16(&mut archive, 0); // comment length

    log::info!(
        "built archive: {} entries, {} bytes",
        entries.len(),
        archive.len()
    );
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};

    use super::*;

    fn test_stamp() -> DosDateTime {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(12, 34, 56)
            .unwrap();
        DosDateTime::from_datetime(dt)
    }

    fn entry(name: &str, data: &[u8]) -> ArchiveEntry {
        ArchiveEntry::new(name, data.to_vec())
    }

    #[test]
    fn test_crc32_standard_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_empty_buffer() {
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn test_dos_datetime_packing() {
        let stamp = test_stamp();
        // 12:34:56 -> hour 12, minute 34, second 56/2 = 28
        assert_eq!(stamp.time, (12 << 11) | (34 << 5) | 28);
        // 2024-06-15 -> year offset 44, month 6, day 15
        assert_eq!(stamp.date, (44 << 9) | (6 << 5) | 15);
    }

    #[test]
    fn test_dos_datetime_floors_pre_1980() {
        let dt = chrono::NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let stamp = DosDateTime::from_datetime(dt);
        assert_eq!(stamp.date >> 9, 0);
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let err = build_archive(&[entry("", b"x")], test_stamp()).unwrap_err();
        assert!(matches!(err, ArchiveError::EmptyEntryName { index: 0 }));
    }

    #[test]
    fn test_empty_archive_is_just_eocd() {
        let bytes = build_archive(&[], test_stamp()).unwrap();
        assert_eq!(bytes.len(), 22);
        assert_eq!(&bytes[0..4], &EOCD_SIGNATURE.to_le_bytes());
    }

    #[test]
    fn test_local_header_layout() {
        let bytes = build_archive(&[entry("a.txt", b"hello")], test_stamp()).unwrap();
        assert_eq!(&bytes[0..4], &LOCAL_HEADER_SIGNATURE.to_le_bytes());
        // filename length at offset 26, name at 30, content right after
        assert_eq!(u16::from_le_bytes([bytes[26], bytes[27]]), 5);
        assert_eq!(&bytes[30..35], b"a.txt");
        assert_eq!(&bytes[35..40], b"hello");
    }

    #[test]
    fn test_offset_bookkeeping_with_zero_byte_entry() {
        // Entries of 10, 0 and 25 bytes; offsets must account for the
        // 30-byte headers and name lengths, and the zero-byte entry must
        // be recorded, not skipped.
        let entries = [
            entry("first.bin", &[1u8; 10]),
            entry("empty.bin", &[]),
            entry("third.bin", &[2u8; 25]),
        ];
        let bytes = build_archive(&entries, test_stamp()).unwrap();

        let expected0 = 0u32;
        let expected1 = expected0 + 30 + 9 + 10;
        let expected2 = expected1 + 30 + 9;
        let central_start = expected2 + 30 + 9 + 25;

        // EOCD is the last 22 bytes; central directory offset sits at
        // EOCD offset 16.
        let eocd = &bytes[bytes.len() - 22..];
        assert_eq!(&eocd[0..4], &EOCD_SIGNATURE.to_le_bytes());
        assert_eq!(
            u32::from_le_bytes([eocd[16], eocd[17], eocd[18], eocd[19]]),
            central_start
        );
        assert_eq!(u16::from_le_bytes([eocd[10], eocd[11]]), 3);

        // Walk the central records; local header offset sits at record
        // offset 42, each record is 46 bytes + name.
        let mut pos = central_start as usize;
        for expected in [expected0, expected1, expected2] {
            assert_eq!(&bytes[pos..pos + 4], &CENTRAL_HEADER_SIGNATURE.to_le_bytes());
            let offset = u32::from_le_bytes([
                bytes[pos + 42],
                bytes[pos + 43],
                bytes[pos + 44],
                bytes[pos + 45],
            ]);
            assert_eq!(offset, expected);
            let name_len =
                u16::from_le_bytes([bytes[pos + 28], bytes[pos + 29]]) as usize;
            pos += 46 + name_len;
        }
    }

    #[test]
    fn test_round_trip_through_reference_reader() {
        let entries = [entry("a.txt", b"hello"), entry("b.txt", b"world")];
        let bytes = build_archive(&entries, test_stamp()).unwrap();

        // The zip crate validates each entry's CRC while reading.
        let mut reader = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 2);
        for (i, expected) in entries.iter().enumerate() {
            let mut file = reader.by_index(i).unwrap();
            assert_eq!(file.name(), expected.name);
            let mut contents = Vec::new();
            file.read_to_end(&mut contents).unwrap();
            assert_eq!(contents, expected.data);
        }
    }

    #[test]
    fn test_stored_sizes_match() {
        let bytes = build_archive(&[entry("data.bin", &[0xAB; 64])], test_stamp()).unwrap();
        let mut reader = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let file = reader.by_index(0).unwrap();
        assert_eq!(file.compression(), zip::CompressionMethod::Stored);
        assert_eq!(file.size(), 64);
        assert_eq!(file.compressed_size(), 64);
    }
}
