// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use ylong_hpack::{ErrorKind, HeaderListener, HpackDecoder, HpackError, ReadableBytes};

const MAX_HEADER_LIST_SIZE: usize = 8192;

// `name: value`, added to the dynamic table.
const NAME_VALUE: &str = "40046e616d650576616c7565";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn hex(str: &str) -> Vec<u8> {
    (0..str.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&str[i..i + 2], 16).unwrap())
        .collect()
}

// Decodes `bytes` and returns the number of consumed octets.
fn feed<L: HeaderListener>(
    decoder: &mut HpackDecoder,
    bytes: &[u8],
    listener: &mut L,
) -> Result<usize, HpackError> {
    let mut cursor = ReadableBytes::from(bytes);
    decoder.decode(&mut cursor, listener)?;
    Ok(cursor.index())
}

// Counts emitted header fields.
#[derive(Default)]
struct Counter {
    fields: Vec<(String, String)>,
}

impl Counter {
    fn count(&self, name: &str, value: &str) -> usize {
        self.fields
            .iter()
            .filter(|(n, v)| n == name && v == value)
            .count()
    }
}

impl HeaderListener for Counter {
    fn emit_header(&mut self, name: &[u8], value: &[u8]) {
        self.fields.push((
            String::from_utf8_lossy(name).into_owned(),
            String::from_utf8_lossy(value).into_owned(),
        ));
    }
}

/// SDV test cases for incomplete input.
///
/// # Brief
/// 1. Decodes an indexed representation whose index is cut off.
/// 2. Checks that nothing is consumed or emitted.
/// 3. Feeds a literal one more byte at a time and checks it is decoded only
/// once complete.
#[test]
fn sdv_hpack_decoder_incomplete() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    let bytes = hex("fff0");
    let mut cursor = ReadableBytes::from(&bytes);
    assert!(decoder.decode(&mut cursor, &mut listener).is_ok());
    assert_eq!(cursor.cap(), 2);
    assert!(listener.fields.is_empty());

    let bytes = hex(NAME_VALUE);
    for end in 0..bytes.len() {
        assert_eq!(feed(&mut decoder, &bytes[..end], &mut listener), Ok(0));
    }
    assert!(listener.fields.is_empty());
    assert_eq!(decoder.table_len(), 0);
    assert_eq!(feed(&mut decoder, &bytes, &mut listener), Ok(bytes.len()));
    assert_eq!(listener.count("name", "value"), 1);
    assert_eq!(decoder.table_len(), 1);
}

/// SDV test cases for illegal indices and integer overflow.
///
/// # Brief
/// 1. Decodes indexed representations with index 0, an index past the end
/// of the tables and an index that overflows.
/// 2. Checks the errors.
#[test]
fn sdv_hpack_decoder_illegal_index() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    let err = feed(&mut decoder, &hex("80"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIndex(0));

    let err = feed(&mut decoder, &hex("ff00"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIndex(127));

    let err = feed(&mut decoder, &hex("ff8080808008"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IntegerOverflow);

    // Index 62 becomes legal once the dynamic table holds an entry.
    let err = feed(&mut decoder, &hex("be"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIndex(62));
    feed(&mut decoder, &hex(NAME_VALUE), &mut listener).unwrap();
    feed(&mut decoder, &hex("bebe"), &mut listener).unwrap();
    assert_eq!(listener.fields.len(), 2);
}

/// SDV test cases for literals with an empty name.
///
/// # Brief
/// 1. Decodes literals of every kind with a zero-length literal name.
/// 2. Checks that each one fails without consuming input.
#[test]
fn sdv_hpack_decoder_empty_name() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    for prefix in ["40", "00", "10"] {
        let bytes = hex(&format!("{prefix}00056e616d6565"));
        let mut cursor = ReadableBytes::from(&bytes);
        let err = decoder.decode(&mut cursor, &mut listener).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyHeaderName);
        assert_eq!(cursor.index(), 0);
    }
    assert!(listener.fields.is_empty());
    assert_eq!(decoder.table_len(), 0);
}

/// SDV test cases for invalid Huffman-coded strings.
///
/// # Brief
/// 1. Decodes a literal whose name is a single octet of padding.
/// 2. Checks the error.
#[test]
fn sdv_hpack_decoder_invalid_huffman() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    let err = feed(&mut decoder, &hex("0081ff0161"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidHuffmanCode);
}

/// SDV test cases for a header field larger than the header list.
///
/// # Brief
/// 1. Creates a `HpackDecoder` with a header list limit of 8192 octets.
/// 2. Decodes a literal with incremental indexing whose name and value are
/// 4096 octets each, then a small indexed field.
/// 3. Checks that only the small field is emitted, the table is unchanged and
/// the block is reported as truncated.
#[test]
fn sdv_hpack_decoder_large_header() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    let mut bytes = hex("407f811f");
    bytes.extend_from_slice(&[b'n'; 4096]);
    bytes.extend_from_slice(&hex("7f811f"));
    bytes.extend_from_slice(&[b'v'; 4096]);
    bytes.extend_from_slice(&hex("86"));

    assert_eq!(feed(&mut decoder, &bytes, &mut listener), Ok(bytes.len()));
    assert!(decoder.is_truncated());
    assert_eq!(decoder.table_len(), 0);
    assert!(decoder.end_header_block(&mut listener));
    assert_eq!(listener.fields.len(), 1);
    assert_eq!(listener.count(":scheme", "http"), 1);
}

/// SDV test cases for a header field larger than the dynamic table.
///
/// # Brief
/// 1. Inserts `name: value`, then a 4096 octet `:authority` value.
/// 2. Checks that both are emitted, the table is emptied and `name: value`
/// leaves the reference set.
#[test]
fn sdv_hpack_decoder_complete_eviction() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, 16 * 1024);
    let mut listener = Counter::default();

    let mut bytes = hex(NAME_VALUE);
    bytes.extend_from_slice(&hex("417f811f"));
    bytes.extend_from_slice(&[b'a'; 4096]);

    assert_eq!(feed(&mut decoder, &bytes, &mut listener), Ok(bytes.len()));
    assert_eq!(decoder.table_len(), 0);
    assert_eq!(decoder.table_size(), 0);
    assert!(!decoder.end_header_block(&mut listener));
    assert!(!decoder.end_header_block(&mut listener));

    let authority = "a".repeat(4096);
    assert_eq!(listener.count("name", "value"), 1);
    assert_eq!(listener.count(":authority", &authority), 1);
    assert_eq!(listener.fields.len(), 2);
}

/// SDV test cases for toggling an entry inserted in the same block.
///
/// # Brief
/// 1. Inserts `name: value`, then references it twice in the same block.
/// 2. Checks that it is emitted twice and not repeated at the end of the
/// block.
#[test]
fn sdv_hpack_decoder_toggle_twice_same_block() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    let mut bytes = hex(NAME_VALUE);
    bytes.extend_from_slice(&hex("bebe"));
    assert_eq!(feed(&mut decoder, &bytes, &mut listener), Ok(bytes.len()));
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 2);
}

/// SDV test cases for toggling an entry carried over from a prior block.
///
/// # Brief
/// 1. Inserts `name: value` and ends the block.
/// 2. References the entry twice in the next block and ends it.
/// 3. Checks that the second block emits the field exactly once.
#[test]
fn sdv_hpack_decoder_toggle_twice_carried_over() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    feed(&mut decoder, &hex(NAME_VALUE), &mut listener).unwrap();
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 1);

    // Removed by the first reference, added back by the second.
    let mut listener = Counter::default();
    assert_eq!(feed(&mut decoder, &hex("bebe"), &mut listener), Ok(2));
    assert_eq!(listener.count("name", "value"), 1);
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.fields.len(), 1);

    // Still a member for the block after.
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 2);
}

/// SDV test cases for partial eviction through `decode`.
///
/// # Brief
/// 1. Creates a `HpackDecoder` whose dynamic table holds two small entries.
/// 2. Inserts `a: 1`, `b: 2` and `c: 3`, which evicts `a`.
/// 3. Checks that the carry-over repeats only `b` and `c`, and that index 63
/// now refers to `b`.
#[test]
fn sdv_hpack_decoder_partial_eviction() {
    init_tracing();
    let mut decoder = HpackDecoder::builder()
        .max_header_list_size(MAX_HEADER_LIST_SIZE)
        .max_header_table_size(70)
        .build();
    let mut listener = Counter::default();

    // `a: 1`, `b: 2` and `c: 3`, 34 octets each.
    let bytes = hex("400161013140016201324001630133");
    assert_eq!(feed(&mut decoder, &bytes, &mut listener), Ok(15));
    assert_eq!(decoder.table_len(), 2);
    assert_eq!(decoder.table_size(), 68);
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.fields.len(), 3);

    let mut listener = Counter::default();
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(
        listener.fields,
        vec![
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ]
    );

    // Index 62 is `c`, index 63 is `b`; the reference toggles `b` off.
    let mut listener = Counter::default();
    assert_eq!(feed(&mut decoder, &hex("bf"), &mut listener), Ok(1));
    assert!(listener.fields.is_empty());
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.fields, vec![("c".to_string(), "3".to_string())]);

    // The evicted entry is out of range.
    let err = feed(&mut decoder, &hex("c0"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IllegalIndex(64));
}

/// SDV test cases for the reference set carry-over.
///
/// # Brief
/// 1. Inserts `name: value` and ends the block.
/// 2. Ends a second, empty block.
/// 3. Checks that the field is emitted once per block.
#[test]
fn sdv_hpack_decoder_carry_over() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut listener = Counter::default();

    feed(&mut decoder, &hex(NAME_VALUE), &mut listener).unwrap();
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 1);

    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 2);

    // Static entries and unindexed literals are not repeated.
    let mut listener = Counter::default();
    let bytes = hex("8200046e616d650576616c7565");
    feed(&mut decoder, &bytes, &mut listener).unwrap();
    assert!(!decoder.end_header_block(&mut listener));
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count(":method", "GET"), 1);
    assert_eq!(listener.count("name", "value"), 3);
}

/// SDV test cases for encoding context updates.
///
/// # Brief
/// 1. Empties the reference set, then changes the table size.
/// 2. Checks the carry-over, the dynamic table and the size ceiling.
#[test]
fn sdv_hpack_decoder_context_update() {
    init_tracing();
    let mut decoder = HpackDecoder::builder()
        .server(false)
        .max_header_list_size(MAX_HEADER_LIST_SIZE)
        .max_header_table_size(4096)
        .build();
    let mut listener = Counter::default();

    feed(&mut decoder, &hex(NAME_VALUE), &mut listener).unwrap();
    feed(&mut decoder, &hex("30"), &mut listener).unwrap();
    assert!(!decoder.end_header_block(&mut listener));
    assert!(!decoder.end_header_block(&mut listener));
    assert_eq!(listener.count("name", "value"), 1);
    assert_eq!(decoder.table_len(), 1);

    let err = feed(&mut decoder, &hex("2ff21f"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidTableSizeUpdate(4097));
    assert_eq!(decoder.table_len(), 1);

    assert_eq!(feed(&mut decoder, &hex("2ff11f20"), &mut listener), Ok(4));
    assert_eq!(decoder.header_table_size(), 0);
    assert_eq!(decoder.table_len(), 0);

    let err = feed(&mut decoder, &hex("31"), &mut listener).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidContextUpdate(0x31));
}

/// SDV test cases for Huffman-coded literals.
///
/// # Brief
/// 1. Decodes a request with a Huffman-coded `:authority` value.
/// 2. Checks the emitted header list.
#[cfg(feature = "huffman")]
#[test]
fn sdv_hpack_decoder_huffman() {
    init_tracing();
    let mut decoder = HpackDecoder::new(true, MAX_HEADER_LIST_SIZE);
    let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();

    let bytes = hex("828684418cf1e3c2e5f23a6ba0ab90f4ff");
    assert_eq!(feed(&mut decoder, &bytes, &mut headers), Ok(bytes.len()));
    assert!(!decoder.end_header_block(&mut headers));
    assert_eq!(
        headers,
        vec![
            (b":method".to_vec(), b"GET".to_vec()),
            (b":scheme".to_vec(), b"http".to_vec()),
            (b":path".to_vec(), b"/".to_vec()),
            (b":authority".to_vec(), b"www.example.com".to_vec()),
        ]
    );
}
